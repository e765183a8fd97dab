//! Shared utilities

/// Truncate a string to `max` characters, appending "..." if truncated.
/// Operates on Unicode char boundaries, not bytes.
pub fn truncate_chars(s: &str, max: usize) -> String {
    let mut chars = s.chars();
    let truncated: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

/// User-facing message for a failed conversion
pub fn error_message(err: &utsusu_core::Error) -> String {
    use utsusu_core::Error;
    match err {
        Error::InvalidInput(_) => utsusu_core::source::INVALID_URL_HINT.to_string(),
        Error::EntitlementDenied { limit, .. } => format!(
            "無料のお試しは{}回までです。続けて投稿を作るにはプランに登録してください。",
            limit
        ),
        Error::Cancelled => "キャンセルしました".to_string(),
        Error::Busy => "変換中です。終わるまでお待ちください".to_string(),
        Error::NoActiveRecord => "表示中の投稿がありません".to_string(),
        other if other.is_retryable() => format!("{}（もう一度お試しください）", other),
        other => other.to_string(),
    }
}
