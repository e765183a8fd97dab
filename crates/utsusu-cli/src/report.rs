//! Plain-text rendering of a record for line mode and `--url`

use utsusu_core::{ConversionRecord, format};

/// Thread, title options and article of `record` as printable text.
///
/// `selected_title` marks the chosen title option and heads the article.
pub fn record_report(record: &ConversionRecord, selected_title: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}  {}\n\n", record.derived_title(), record.source_url()));

    out.push_str("X スレッド\n");
    out.push_str(&"-".repeat(40));
    out.push('\n');
    for (i, segment) in record.thread_segments().iter().enumerate() {
        out.push_str(&format!("{}  {}\n\n", format::display_number(i), segment));
    }

    out.push_str("note 記事\n");
    out.push_str(&"-".repeat(40));
    out.push('\n');
    out.push_str("タイトル案\n");
    for (i, title) in record.article_title_options().iter().enumerate() {
        let marker = if i == selected_title { "●" } else { " " };
        out.push_str(&format!("  {} {}. {}\n", marker, i + 1, title));
    }
    out.push('\n');

    let title = record.title(selected_title).or_else(|| record.title(0)).unwrap_or_default();
    out.push_str(&format!("# {}\n\n", title));
    for block in format::article_blocks(record.article_body()) {
        match block {
            format::ArticleBlock::Heading(text) => out.push_str(&format!("■ {}\n\n", text)),
            format::ArticleBlock::Paragraph(text) => out.push_str(&format!("{}\n\n", text)),
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::fast_session;

    #[tokio::test]
    async fn test_report_sections() {
        let mut session = fast_session(1);
        session
            .submit("https://www.youtube.com/watch?v=abcdefghijk", Default::default())
            .await
            .unwrap();
        let record = session.active().unwrap();
        let report = record_report(record, 1);

        assert!(report.starts_with("動画 abcdefgh"));
        assert!(report.contains("01  "));
        let marked = report.lines().find(|l| l.contains('●')).unwrap();
        assert!(marked.contains(&record.article_title_options()[1]));
        assert!(report.contains(&format!("# {}", record.article_title_options()[1])));
    }
}
