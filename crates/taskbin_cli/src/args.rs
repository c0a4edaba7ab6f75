//! Command-line grammar.

use clap::{ArgGroup, Args, Parser, Subcommand};
use taskbin_core::{TaskDraft, TaskId, TaskPatch};

const ENV_HELP: &str = "Environment:
  TASKBIN_DB         database file (default ./taskbin.sqlite3)
  TASKBIN_RETENTION  recycle-bin retention, e.g. 30d (default 30d)
  TASKBIN_LOG_DIR    absolute log directory; logging is off when unset
  TASKBIN_LOG_LEVEL  trace|debug|info|warn|error";

/// Task list with a recycle bin.
#[derive(Debug, Parser)]
#[command(name = "taskbin", version, about, after_help = ENV_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create an active task.
    Add(AddArgs),
    /// List active tasks in creation order.
    List {
        /// Only show tasks in this category.
        #[arg(long)]
        category: Option<String>,
    },
    /// Toggle a task between open and done.
    Done { id: TaskId },
    /// Change fields of an active task.
    Edit(EditArgs),
    /// Move a task into the recycle bin.
    Delete { id: TaskId },
    /// Move a recycled task back to the active list.
    Restore { id: TaskId },
    /// Permanently remove one recycled task.
    Purge { id: TaskId },
    /// Show the recycle bin, purging expired entries first.
    Bin,
    /// Permanently remove every recycled task.
    EmptyBin,
    /// Purge recycled tasks past the retention window.
    Sweep,
    /// Print core version and health check.
    Version,
}

#[derive(Debug, PartialEq, Eq, Args)]
pub struct AddArgs {
    pub title: String,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub due: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
}

impl AddArgs {
    pub fn into_draft(self) -> TaskDraft {
        TaskDraft {
            title: self.title,
            due_date: self.due,
            category: self.category,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Args)]
#[command(group(
    ArgGroup::new("fields")
        .required(true)
        .multiple(true)
        .args(["title", "due", "no_due", "category", "no_category"])
))]
pub struct EditArgs {
    pub id: TaskId,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, value_name = "YYYY-MM-DD", conflicts_with = "no_due")]
    pub due: Option<String>,
    /// Clear the due date.
    #[arg(long)]
    pub no_due: bool,
    #[arg(long, conflicts_with = "no_category")]
    pub category: Option<String>,
    /// Clear the category.
    #[arg(long)]
    pub no_category: bool,
}

impl EditArgs {
    pub fn patch(&self) -> TaskPatch {
        TaskPatch {
            title: self.title.clone(),
            due_date: clearable(&self.due, self.no_due),
            category: clearable(&self.category, self.no_category),
        }
    }
}

fn clearable(value: &Option<String>, clear: bool) -> Option<Option<String>> {
    if clear {
        Some(None)
    } else {
        value.clone().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::{AddArgs, Cli, Command};
    use clap::error::ErrorKind;
    use clap::{CommandFactory, Parser};
    use taskbin_core::{TaskDraft, TaskPatch};
    use uuid::Uuid;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("taskbin").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_with_flags() {
        let command = parse(&["add", "Buy milk", "--due", "2026-10-20"]).unwrap();
        let Command::Add(args) = command else {
            panic!("expected add, got {command:?}");
        };
        assert_eq!(
            args,
            AddArgs {
                title: "Buy milk".to_string(),
                due: Some("2026-10-20".to_string()),
                category: None,
            }
        );
        assert_eq!(
            args.into_draft(),
            TaskDraft::new("Buy milk").with_due_date("2026-10-20")
        );
    }

    #[test]
    fn edit_supports_clearing_fields() {
        let id = Uuid::new_v4();
        let command = parse(&["edit", &id.to_string(), "--no-due", "--title", "x"]).unwrap();
        let Command::Edit(args) = command else {
            panic!("expected edit, got {command:?}");
        };
        assert_eq!(args.id, id);
        assert_eq!(
            args.patch(),
            TaskPatch {
                title: Some("x".to_string()),
                due_date: Some(None),
                category: None,
            }
        );
    }

    #[test]
    fn edit_requires_a_field_and_rejects_contradictions() {
        let id = Uuid::new_v4().to_string();
        let err = parse(&["edit", &id]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = parse(&["edit", &id, "--due", "2026-01-01", "--no-due"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_bad_ids_and_unknown_commands() {
        assert_eq!(
            parse(&["delete", "nope"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
        assert_eq!(
            parse(&["frobnicate"]).unwrap_err().kind(),
            ErrorKind::InvalidSubcommand
        );
        assert_eq!(
            parse(&["sweep", "--now"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn empty_bin_uses_kebab_case() {
        assert_eq!(parse(&["empty-bin"]).unwrap(), Command::EmptyBin);
    }
}
