use std::fmt::Write;

use listkit_core::{AppViewModel, ListView, ToastLevel};

use super::records::Record;

/// Renders the whole view model as plain text for stdout.
pub fn render(view: &AppViewModel<Record>) -> String {
    let mut out = String::new();
    match &view.signed_in_as {
        Some(user) => {
            let _ = writeln!(out, "== signed in as {user}");
        }
        None => out.push_str("== signed out\n"),
    }
    if view.pending_mutations > 0 {
        let _ = writeln!(out, "   {} change(s) in progress", view.pending_mutations);
    }
    for list in &view.lists {
        render_list(&mut out, list);
    }
    for toast in &view.toasts {
        let tag = match toast.level {
            ToastLevel::Info => "info",
            ToastLevel::Error => "error",
        };
        let _ = writeln!(out, "[{tag}] {}", toast.message);
    }
    out
}

fn render_list(out: &mut String, list: &ListView<Record>) {
    let _ = writeln!(out, "-- {} (search: {:?})", list.key, list.raw_query);
    if list.is_fetching_first {
        out.push_str("   loading...\n");
        return;
    }
    for (index, item) in list.items.iter().enumerate() {
        let _ = writeln!(out, "{:>4}. {}", index + 1, item.summary());
    }
    if list.is_empty {
        out.push_str("   No data\n");
    }
    if let Some(error) = &list.error {
        let _ = writeln!(out, "   ! {error} (type `retry`)");
    } else if list.is_fetching_more {
        out.push_str("   loading more...\n");
    } else if list.has_more {
        out.push_str("   -- more available (type `more` or `show`) --\n");
    } else if !list.items.is_empty() {
        out.push_str("   -- end --\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::records::Order;
    use listkit_core::{FetchKey, ListError, ListErrorKind, Phase, Toast};

    fn order(id: &str, status: &str) -> Record {
        Record::Order(Order {
            id: id.to_string(),
            reference: format!("REF-{id}"),
            status: status.to_string(),
        })
    }

    fn list(items: Vec<Record>, phase: Phase, has_more: bool) -> ListView<Record> {
        ListView {
            list_id: 1,
            key: FetchKey::new("orders"),
            raw_query: String::new(),
            is_empty: items.is_empty() && phase == Phase::Exhausted,
            items,
            phase,
            has_more,
            is_fetching_first: phase == Phase::FetchingFirst,
            is_fetching_more: phase == Phase::FetchingMore,
            error: None,
        }
    }

    fn view(lists: Vec<ListView<Record>>) -> AppViewModel<Record> {
        AppViewModel {
            signed_in_as: Some("u-7".to_string()),
            lists,
            toasts: Vec::new(),
            pending_mutations: 0,
            dirty: true,
        }
    }

    #[test]
    fn rows_are_numbered_with_a_more_marker() {
        let text = render(&view(vec![list(
            vec![order("1", "open"), order("2", "shipped")],
            Phase::Idle,
            true,
        )]));
        assert!(text.contains("== signed in as u-7"));
        assert!(text.contains("   1. REF-1 [open]"));
        assert!(text.contains("   2. REF-2 [shipped]"));
        assert!(text.contains("more available"));
        assert!(!text.contains("-- end --"));
    }

    #[test]
    fn empty_result_says_no_data() {
        let text = render(&view(vec![list(Vec::new(), Phase::Exhausted, false)]));
        assert!(text.contains("No data"));
        assert!(!text.contains("-- end --"));
    }

    #[test]
    fn failures_and_toasts_are_shown() {
        let mut failed = list(vec![order("1", "open")], Phase::Failed, true);
        failed.error = Some(ListError::new(ListErrorKind::Transport, "timeout: slow"));
        let mut model = view(vec![failed]);
        model.toasts.push(Toast {
            level: ToastLevel::Error,
            message: "Order already shipped".to_string(),
        });

        let text = render(&model);
        assert!(text.contains("! timeout: slow (type `retry`)"));
        assert!(text.contains("[error] Order already shipped"));
        assert!(!text.contains("more available"));
    }
}
