//! /history, /open and /delete

use super::CommandResult;
use crate::utils::truncate_chars;
use utsusu_core::{RecordId, Session};

pub struct HistoryCommand;

impl HistoryCommand {
    /// Numbered history, newest first, with the active entry marked
    pub fn list(session: &Session) -> String {
        let history = session.store().history();
        if history.is_empty() {
            return "まだ履歴がありません".to_string();
        }

        let active = session.store().active_id();
        let mut output = String::from("履歴\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        for (i, record) in history.iter().enumerate() {
            let marker = if Some(record.id()) == active { "●" } else { " " };
            output.push_str(&format!(
                "{} {:>2}. {:<14} {}\n",
                marker,
                i + 1,
                record.derived_title(),
                truncate_chars(record.source_url(), 40)
            ));
        }
        output.push_str("\n/open N で表示、/delete N で削除");
        output
    }

    pub fn open(args: &str, session: &Session) -> CommandResult {
        match resolve(args, session) {
            Ok(id) => CommandResult::Open(id),
            Err(msg) => CommandResult::Message(msg),
        }
    }

    pub fn delete(args: &str, session: &Session) -> CommandResult {
        match resolve(args, session) {
            Ok(id) => CommandResult::Delete(id),
            Err(msg) => CommandResult::Message(msg),
        }
    }
}

/// Map a 1-based history position to a record id
fn resolve(args: &str, session: &Session) -> Result<RecordId, String> {
    let history = session.store().history();
    if history.is_empty() {
        return Err("まだ履歴がありません".to_string());
    }
    let n: usize = args
        .parse()
        .map_err(|_| format!("番号を指定してください (1〜{})", history.len()))?;
    n.checked_sub(1)
        .and_then(|i| history.get(i))
        .map(|record| record.id())
        .ok_or_else(|| format!("番号は 1〜{} です", history.len()))
}
