use listkit_engine::PAGING_PARAMS;

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the search box contents.
    Type(String),
    More,
    Show,
    Hide,
    Scope { name: String, value: String },
    Retry,
    Delete(String),
    Login { user_id: String, token: String },
    Logout,
    Dismiss,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command {0:?}; type `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
commands:
  type <text>          edit the search box (settles after the quiet period)
  more                 load the next page
  show | hide          sentinel scrolled into / out of view
  scope <name>=<value> change a scoping id (empty value removes it)
  retry                retry the failed page
  delete <id>          delete a row and refresh affected lists
  login <user> <token> sign in
  logout               sign out
  dismiss              drop the oldest notification
  quit";

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim_start();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match word {
        // Keep inner and trailing spaces: the debouncer does the trimming.
        "type" => Ok(Command::Type(rest.to_string())),
        "more" => Ok(Command::More),
        "show" => Ok(Command::Show),
        "hide" => Ok(Command::Hide),
        "scope" => parse_scope_pair(rest.trim())
            .map(|(name, value)| Command::Scope { name, value })
            .map_err(|_| CommandError::Usage("scope <name>=<value>")),
        "retry" => Ok(Command::Retry),
        "delete" => match rest.trim() {
            "" => Err(CommandError::Usage("delete <id>")),
            id => Ok(Command::Delete(id.to_string())),
        },
        "login" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(user_id), Some(token), None) => Ok(Command::Login {
                    user_id: user_id.to_string(),
                    token: token.to_string(),
                }),
                _ => Err(CommandError::Usage("login <user> <token>")),
            }
        }
        "logout" => Ok(Command::Logout),
        "dismiss" => Ok(Command::Dismiss),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Parses `name=value`, used both by `--scope` and the `scope` command.
pub fn parse_scope_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, _)) if PAGING_PARAMS.contains(&name.trim()) => {
            Err(format!("{:?} is a paging parameter, not a scope", name.trim()))
        }
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected name=value, got {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn type_keeps_raw_text() {
        assert_eq!(
            parse_command("type  para cet "),
            Ok(Command::Type(" para cet ".to_string()))
        );
        assert_eq!(parse_command("type"), Ok(Command::Type(String::new())));
    }

    #[test]
    fn scope_and_login_arguments() {
        assert_eq!(
            parse_command("scope lineId=line-B"),
            Ok(Command::Scope {
                name: "lineId".to_string(),
                value: "line-B".to_string()
            })
        );
        assert_eq!(
            parse_command("scope =x"),
            Err(CommandError::Usage("scope <name>=<value>"))
        );
        assert_eq!(
            parse_command("login u-1 tok"),
            Ok(Command::Login {
                user_id: "u-1".to_string(),
                token: "tok".to_string()
            })
        );
        assert!(parse_command("login u-1").is_err());
    }

    #[test]
    fn unknown_and_empty_delete() {
        assert_eq!(
            parse_command("frobnicate"),
            Err(CommandError::Unknown("frobnicate".to_string()))
        );
        assert_eq!(parse_command("delete  "), Err(CommandError::Usage("delete <id>")));
        assert_eq!(parse_command("delete rx-4"), Ok(Command::Delete("rx-4".to_string())));
    }

    #[test]
    fn scope_pair_rejects_paging_parameters() {
        assert!(parse_scope_pair("cursor=o-9").is_err());
        assert!(parse_scope_pair(" query = x").is_err());
        assert_eq!(
            parse_command("scope limit=500"),
            Err(CommandError::Usage("scope <name>=<value>"))
        );
    }

    #[test]
    fn scope_pair_allows_empty_value() {
        assert_eq!(
            parse_scope_pair("containerId="),
            Ok(("containerId".to_string(), String::new()))
        );
    }
}
