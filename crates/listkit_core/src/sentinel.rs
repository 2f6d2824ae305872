use listkit_logging::listkit_trace;

use crate::{Accumulator, ListItem, PageRequest};

/// Loads further pages while a sentinel placed after the last item is
/// visible.
///
/// Relies on the accumulator's own flags to avoid duplicate requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentinelLoader {
    visible: bool,
    stopped_generation: Option<u64>,
}

impl SentinelLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a visibility change and loads the next page if warranted.
    pub fn set_visible<T: ListItem>(
        &mut self,
        visible: bool,
        accumulator: &mut Accumulator<T>,
    ) -> Option<PageRequest> {
        self.visible = visible;
        self.maybe_load(accumulator)
    }

    /// Called after a page settles; keeps loading while the sentinel stays
    /// on screen.
    pub fn after_page<T: ListItem>(
        &mut self,
        accumulator: &mut Accumulator<T>,
    ) -> Option<PageRequest> {
        self.maybe_load(accumulator)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the loader gave up for the accumulator's current generation.
    pub fn is_stopped_for(&self, generation: u64) -> bool {
        self.stopped_generation == Some(generation)
    }

    fn maybe_load<T: ListItem>(&mut self, accumulator: &mut Accumulator<T>) -> Option<PageRequest> {
        if !self.visible || accumulator.is_fetching() {
            return None;
        }
        let generation = accumulator.generation();
        if self.is_stopped_for(generation) {
            return None;
        }
        if accumulator.is_exhausted() {
            listkit_trace!(
                "sentinel stops for {} at generation {}",
                accumulator.key(),
                generation
            );
            self.stopped_generation = Some(generation);
            return None;
        }
        if !accumulator.has_more() {
            return None;
        }
        accumulator.request_more()
    }
}
