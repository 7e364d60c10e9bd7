use thiserror::Error;

use crate::app::model::{EditSource, Pane};
use crate::app::{Message, Model};
use crate::storage::KeyValueStore;
use crate::tab::TabId;

pub(super) const HELP: &str = "\
commands:
  new                      open a new tab
  close [TAB]              close a tab (record is kept)
  delete [TAB]             delete a tab and its record (asks first)
  switch TAB               make a tab active
  rename TAB TITLE         set a fixed title
  text CONTENT             replace the plain text (\\n for new lines)
  md CONTENT               replace the markdown (\\n for new lines)
  save                     save every tab now
  theme                    toggle dark theme
  font N                   set font size (8-48)
  move FROM TO             move a tab (positions start at 1)
  pane left|right          toggle a pane between editor and preview
  preview left|right       print a pane's rendered HTML
  list                     list tabs
  show                     show the active tab
  gc                       remove records of closed tabs
  help                     show this help
  quit                     save and exit
TAB is a tab id (tab_3) or a position (1 = first); it defaults to the active tab.";

/// One line of shell input, resolved against the current model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Hand straight to [`update`](crate::app::update)
    Update(Message),
    /// Delete after asking the user
    ConfirmDelete(TabId),
    ListTabs,
    ShowActive,
    Preview(Pane),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),
    #[error("'{0}' needs {1}")]
    MissingArgument(&'static str, &'static str),
    #[error("no tab '{0}'")]
    UnknownTab(String),
    #[error("'{0}' is not a number")]
    BadNumber(String),
    #[error("expected 'left' or 'right', got '{0}'")]
    BadPane(String),
    #[error("no active tab")]
    NoActiveTab,
}

/// Parse one shell line. Blank lines and `#` comments yield `None`.
///
/// # Errors
/// Returns an error for unknown commands, missing arguments, or tab
/// references that do not match an open tab.
pub fn parse_command<S: KeyValueStore>(
    line: &str,
    model: &Model<S>,
) -> Result<Option<Command>, InputError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    let command = match word {
        "new" => Command::Update(Message::CreateTab),
        "close" => Command::Update(Message::CloseTab(resolve_tab(rest, model)?)),
        "delete" => Command::ConfirmDelete(resolve_tab(rest, model)?),
        "switch" => {
            if rest.is_empty() {
                return Err(InputError::MissingArgument("switch", "a tab"));
            }
            Command::Update(Message::SwitchTo(resolve_tab(rest, model)?))
        }
        "rename" => {
            let Some((tab, title)) = rest.split_once(char::is_whitespace) else {
                return Err(InputError::MissingArgument("rename", "a tab and a title"));
            };
            Command::Update(Message::RenameTab(
                resolve_tab(tab, model)?,
                title.trim().to_string(),
            ))
        }
        "text" => Command::Update(Message::RecordEdit {
            content: unescape_newlines(rest),
            source: EditSource::Text,
        }),
        "md" | "markdown" => Command::Update(Message::RecordEdit {
            content: unescape_newlines(rest),
            source: EditSource::Markdown,
        }),
        "save" => Command::Update(Message::SaveAll),
        "theme" => Command::Update(Message::ToggleTheme),
        "font" => {
            if rest.is_empty() {
                return Err(InputError::MissingArgument("font", "a size"));
            }
            let size = rest
                .parse::<u16>()
                .map_err(|_| InputError::BadNumber(rest.to_string()))?;
            Command::Update(Message::SetFontSize(size))
        }
        "move" => {
            let mut args = rest.split_whitespace();
            let (Some(from), Some(to)) = (args.next(), args.next()) else {
                return Err(InputError::MissingArgument("move", "two positions"));
            };
            Command::Update(Message::ReorderTab {
                from: parse_position(from)?,
                to: parse_position(to)?,
            })
        }
        "pane" => Command::Update(Message::TogglePane(parse_pane(rest)?)),
        "preview" => Command::Preview(parse_pane(rest)?),
        "gc" => Command::Update(Message::CleanupOrphans),
        "list" | "ls" => Command::ListTabs,
        "show" => Command::ShowActive,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(InputError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

/// Resolve `tab_N`, a 1-based position, or nothing (the active tab).
fn resolve_tab<S: KeyValueStore>(arg: &str, model: &Model<S>) -> Result<TabId, InputError> {
    let store = model.store();
    if arg.is_empty() {
        return store.active_id().ok_or(InputError::NoActiveTab);
    }
    if let Ok(id) = arg.parse::<TabId>() {
        return store
            .tab(id)
            .map(|tab| tab.id)
            .ok_or_else(|| InputError::UnknownTab(arg.to_string()));
    }
    arg.parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|index| store.tabs().get(index))
        .map(|tab| tab.id)
        .ok_or_else(|| InputError::UnknownTab(arg.to_string()))
}

fn parse_position(arg: &str) -> Result<usize, InputError> {
    arg.parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .ok_or_else(|| InputError::BadNumber(arg.to_string()))
}

fn parse_pane(arg: &str) -> Result<Pane, InputError> {
    match arg {
        "left" | "l" | "text" => Ok(Pane::Left),
        "right" | "r" | "md" | "markdown" => Ok(Pane::Right),
        "" => Err(InputError::MissingArgument("pane", "'left' or 'right'")),
        other => Err(InputError::BadPane(other.to_string())),
    }
}

fn unescape_newlines(content: &str) -> String {
    content.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::model::Timing;
    use crate::storage::MemoryStore;
    use crate::store::{EmptyTabPolicy, TabStore};

    fn model_with_tabs(n: usize) -> Model<MemoryStore> {
        let store = TabStore::load(MemoryStore::new(), EmptyTabPolicy::Retain);
        let mut model = Model::new(store, Timing::default());
        for _ in 1..n {
            model.create_tab();
        }
        model
    }

    fn parse(line: &str, model: &Model<MemoryStore>) -> Command {
        parse_command(line, model).unwrap().unwrap()
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        let model = model_with_tabs(1);
        assert_eq!(parse_command("   ", &model), Ok(None));
        assert_eq!(parse_command("# note", &model), Ok(None));
    }

    #[test]
    fn test_tab_refs_by_id_and_position() {
        let model = model_with_tabs(3);
        let second = model.store().tabs()[1].id;
        assert_eq!(
            parse(&format!("switch {second}"), &model),
            Command::Update(Message::SwitchTo(second))
        );
        assert_eq!(
            parse("switch 2", &model),
            Command::Update(Message::SwitchTo(second))
        );
        assert_eq!(
            parse_command("switch 9", &model),
            Err(InputError::UnknownTab("9".into()))
        );
        assert_eq!(
            parse_command("switch tab_99", &model),
            Err(InputError::UnknownTab("tab_99".into()))
        );
    }

    #[test]
    fn test_close_defaults_to_active_tab() {
        let model = model_with_tabs(2);
        let active = model.store().active_id().unwrap();
        assert_eq!(
            parse("close", &model),
            Command::Update(Message::CloseTab(active))
        );
        assert_eq!(parse("delete", &model), Command::ConfirmDelete(active));
    }

    #[test]
    fn test_text_unescapes_newlines() {
        let model = model_with_tabs(1);
        assert_eq!(
            parse("text HELLO\\n- item", &model),
            Command::Update(Message::RecordEdit {
                content: "HELLO\n- item".into(),
                source: EditSource::Text,
            })
        );
    }

    #[test]
    fn test_rename_keeps_spaces_in_title() {
        let model = model_with_tabs(1);
        let id = model.store().active_id().unwrap();
        assert_eq!(
            parse("rename 1 Shopping list", &model),
            Command::Update(Message::RenameTab(id, "Shopping list".into()))
        );
        assert!(parse_command("rename 1", &model).is_err());
    }

    #[test]
    fn test_move_is_one_based() {
        let model = model_with_tabs(3);
        assert_eq!(
            parse("move 3 1", &model),
            Command::Update(Message::ReorderTab { from: 2, to: 0 })
        );
        assert_eq!(
            parse_command("move 0 1", &model),
            Err(InputError::BadNumber("0".into()))
        );
    }

    #[test]
    fn test_font_and_pane_arguments() {
        let model = model_with_tabs(1);
        assert_eq!(
            parse("font 20", &model),
            Command::Update(Message::SetFontSize(20))
        );
        assert!(matches!(
            parse_command("font big", &model),
            Err(InputError::BadNumber(_))
        ));
        assert_eq!(
            parse("pane right", &model),
            Command::Update(Message::TogglePane(Pane::Right))
        );
        assert_eq!(parse("preview left", &model), Command::Preview(Pane::Left));
        assert!(matches!(
            parse_command("pane up", &model),
            Err(InputError::BadPane(_))
        ));
    }

    #[test]
    fn test_unknown_command() {
        let model = model_with_tabs(1);
        assert_eq!(
            parse_command("frobnicate", &model),
            Err(InputError::UnknownCommand("frobnicate".into()))
        );
    }
}
