//! Slash commands for interactive mode

mod copy;
mod history;
mod options;
mod usage;

pub use copy::{CopyCommand, copy_text};
pub use history::HistoryCommand;
pub use options::{OptionKind, OptionsCommand};
pub use usage::UsageCommand;

use utsusu_core::{CopyTarget, PostConfig, RecordId, Session};

/// Result of executing a slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Back to the empty input form
    NewConversion,
    /// Show a record from history
    Open(RecordId),
    /// Remove a record from history
    Delete(RecordId),
    /// Choose one of the article title options (zero-based)
    SelectTitle(usize),
    /// Copy part of the active record
    Copy(CopyTarget),
    /// Reword the active record
    Regenerate,
    /// Show the plan prompt
    OpenUpgrade,
    /// Use different post options for the next conversion
    ChangeOptions(PostConfig),
    /// Show a message to the user
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(input: &str, session: &Session, post: PostConfig) -> Option<CommandResult> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let parts: Vec<&str> = rest.splitn(2, ' ').collect();
    let command = parts[0].to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "quit" | "exit" | "q" => CommandResult::Exit,

        "new" | "n" => CommandResult::NewConversion,

        "history" | "ls" => CommandResult::Message(HistoryCommand::list(session)),

        "open" | "o" => HistoryCommand::open(args, session),

        "delete" | "rm" => HistoryCommand::delete(args, session),

        "title" => select_title(args, session),

        "copy" | "c" => CopyCommand::execute(args, session),

        "regenerate" | "r" => {
            if session.active().is_some() {
                CommandResult::Regenerate
            } else {
                CommandResult::Message("表示中の投稿がありません。/open で履歴から選んでください".to_string())
            }
        }

        "type" => OptionsCommand::execute(OptionKind::PostType, args, post),

        "tone" => OptionsCommand::execute(OptionKind::Tone, args, post),

        "emoji" => OptionsCommand::execute(OptionKind::Emoji, args, post),

        "upgrade" | "plan" => CommandResult::OpenUpgrade,

        "usage" | "u" => CommandResult::Message(UsageCommand::execute(session)),

        _ => CommandResult::Unknown(command),
    })
}

fn select_title(args: &str, session: &Session) -> CommandResult {
    let Some(record) = session.active() else {
        return CommandResult::Message("表示中の投稿がありません".to_string());
    };
    let count = record.article_title_options().len();
    match args.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => CommandResult::SelectTitle(n - 1),
        _ => CommandResult::Message(format!("タイトル案は 1〜{} から選んでください", count)),
    }
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?         Show this help message
  /new, /n              Start a new conversion
  /history, /ls         List converted videos (newest first)
  /open, /o N           Show entry N from /history
  /delete, /rm N        Delete entry N from /history
  /title N              Use article title option N
  /copy, /c [target]    Copy "thread" (default), a post number, or "note"
  /regenerate, /r       Reword the posts on screen
  /type [learning|story|howto]
  /tone [soft|normal|biz]
  /emoji [on|off]       Show or change post options
  /usage, /u            Show remaining conversions
  /upgrade, /plan       Show the plan
  /quit, /exit, /q      Exit utsusu

Anything else is treated as a YouTube URL to convert."#
        .to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::time::Duration;
    use utsusu_core::{GateLimits, PipelineConfig, SessionOptions};

    /// Demo session with instant phases and `free_limit` trial conversions
    pub(crate) fn fast_session(free_limit: u32) -> Session {
        Session::demo(SessionOptions {
            limits: GateLimits {
                free_limit,
                ..Default::default()
            },
            pipeline: PipelineConfig {
                phase_hold: Duration::ZERO,
                regenerate_hold: Duration::ZERO,
            },
        })
    }

    fn session() -> Session {
        fast_session(1)
    }

    #[test]
    fn test_non_command_is_none() {
        assert!(execute_command("https://youtu.be/x", &session(), PostConfig::default()).is_none());
    }

    #[test]
    fn test_basic_commands() {
        let s = session();
        let post = PostConfig::default();
        assert_eq!(execute_command("/q", &s, post), Some(CommandResult::Exit));
        assert_eq!(execute_command("/new", &s, post), Some(CommandResult::NewConversion));
        assert_eq!(execute_command("/plan", &s, post), Some(CommandResult::OpenUpgrade));
        assert_eq!(
            execute_command("/frobnicate", &s, post),
            Some(CommandResult::Unknown("frobnicate".into()))
        );
    }

    #[test]
    fn test_regenerate_needs_active_record() {
        let result = execute_command("/r", &session(), PostConfig::default());
        assert!(matches!(result, Some(CommandResult::Message(_))));
    }

    #[tokio::test]
    async fn test_title_index_is_one_based() {
        let mut s = fast_session(1);
        s.submit("https://youtu.be/abc", PostConfig::default()).await.unwrap();
        let post = PostConfig::default();
        assert_eq!(execute_command("/title 2", &s, post), Some(CommandResult::SelectTitle(1)));
        assert!(matches!(
            execute_command("/title 4", &s, post),
            Some(CommandResult::Message(_))
        ));
    }
}
