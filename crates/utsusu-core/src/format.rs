//! Text shaping for display and clipboard copy.

use crate::record::ConversionRecord;

/// Blocks shorter than this (in characters) may be headings
const HEADING_MAX_CHARS: usize = 20;

/// Japanese full stop; its presence marks a sentence, not a heading
const FULL_STOP: char = '。';

/// `"{n}/{total} {text}"`, with `index` zero-based
pub fn numbered_segment(index: usize, total: usize, text: &str) -> String {
    format!("{}/{} {}", index + 1, total, text)
}

/// Two-digit display number, `01`, `02`, ...
pub fn display_number(index: usize) -> String {
    format!("{:02}", index + 1)
}

/// Copy text for one thread post
pub fn thread_segment_copy(record: &ConversionRecord, index: usize) -> Option<String> {
    let segments = record.thread_segments();
    segments
        .get(index)
        .map(|text| numbered_segment(index, segments.len(), text))
}

/// Copy text for the whole thread: numbered posts separated by blank lines
pub fn thread_copy(record: &ConversionRecord) -> String {
    let segments = record.thread_segments();
    segments
        .iter()
        .enumerate()
        .map(|(i, text)| numbered_segment(i, segments.len(), text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Copy text for the article with the chosen title as a Markdown heading
pub fn article_copy(title: &str, body: &str) -> String {
    format!("# {}\n\n{}", title, body)
}

/// A block of the article body as rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleBlock<'a> {
    Heading(&'a str),
    Paragraph(&'a str),
}

impl<'a> ArticleBlock<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            ArticleBlock::Heading(t) | ArticleBlock::Paragraph(t) => t,
        }
    }
}

/// Split a body on blank lines; short blocks without a full stop are headings.
pub fn article_blocks(body: &str) -> Vec<ArticleBlock<'_>> {
    body.split("\n\n")
        .map(|block| {
            if block.chars().count() < HEADING_MAX_CHARS && !block.contains(FULL_STOP) {
                ArticleBlock::Heading(block)
            } else {
                ArticleBlock::Paragraph(block)
            }
        })
        .collect()
}
