//! /copy command and the text behind every copy target

use super::CommandResult;
use utsusu_core::{ConversionRecord, CopyTarget, Session, format};

pub struct CopyCommand;

impl CopyCommand {
    /// `thread` (or nothing) copies every post, a number copies one post,
    /// `note` copies the article under the selected title.
    pub fn execute(args: &str, session: &Session) -> CommandResult {
        let Some(record) = session.active() else {
            return CommandResult::Message("表示中の投稿がありません".to_string());
        };

        match args.to_lowercase().as_str() {
            "" | "thread" | "all" => CommandResult::Copy(CopyTarget::AllThreads),
            "note" | "article" => CommandResult::Copy(CopyTarget::Article),
            n => {
                let total = record.thread_segments().len();
                match n.parse::<usize>() {
                    Ok(i) if (1..=total).contains(&i) => {
                        CommandResult::Copy(CopyTarget::Thread(i - 1))
                    }
                    _ => CommandResult::Message(format!(
                        "コピーできるのは thread / note / 1〜{} です",
                        total
                    )),
                }
            }
        }
    }
}

/// Clipboard text for `target`, or `None` for a post index past the end
pub fn copy_text(record: &ConversionRecord, title: &str, target: CopyTarget) -> Option<String> {
    match target {
        CopyTarget::AllThreads => Some(format::thread_copy(record)),
        CopyTarget::Thread(i) => format::thread_segment_copy(record, i),
        CopyTarget::Article => Some(format::article_copy(title, record.article_body())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::fast_session;

    #[tokio::test]
    async fn test_copy_targets() {
        let mut session = fast_session(1);
        session
            .submit("https://youtu.be/x", Default::default())
            .await
            .unwrap();
        let r = session.active().unwrap();
        let total = r.thread_segments().len();

        let all = copy_text(r, "T", CopyTarget::AllThreads).unwrap();
        assert!(all.starts_with(&format!("1/{} ", total)));
        assert_eq!(all.split("\n\n").count(), total);

        let second = copy_text(r, "T", CopyTarget::Thread(1)).unwrap();
        assert_eq!(second, format!("2/{} {}", total, r.thread_segments()[1]));

        let article = copy_text(r, "T", CopyTarget::Article).unwrap();
        assert!(article.starts_with("# T\n\n"));
        assert!(copy_text(r, "T", CopyTarget::Thread(total)).is_none());

        assert_eq!(
            CopyCommand::execute("note", &session),
            CommandResult::Copy(CopyTarget::Article)
        );
        assert_eq!(
            CopyCommand::execute("2", &session),
            CommandResult::Copy(CopyTarget::Thread(1))
        );
        assert!(matches!(
            CopyCommand::execute("99", &session),
            CommandResult::Message(_)
        ));
    }

    #[test]
    fn test_copy_without_record() {
        let session = fast_session(1);
        assert!(matches!(
            CopyCommand::execute("", &session),
            CommandResult::Message(_)
        ));
    }
}
