//! Numbered post cards and article text blocks
//!
//! Both widgets lay themselves out as plain `Line`s so callers can stack
//! them into one scrolling column and know its height up front.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// One post in a thread
#[derive(Debug, Clone)]
pub struct PostCard<'a> {
    /// Display number, e.g. "01"
    pub number: String,
    pub body: &'a str,
    /// Show the copy acknowledgement instead of the copy hint
    pub copied: bool,
    /// Keyboard focus is on this card
    pub selected: bool,
}

/// A vertical list of post cards
pub struct PostList<'a> {
    cards: &'a [PostCard<'a>],
    theme: &'a Theme,
    scroll: usize,
}

impl<'a> PostList<'a> {
    pub fn new(cards: &'a [PostCard<'a>], theme: &'a Theme) -> Self {
        Self {
            cards,
            theme,
            scroll: 0,
        }
    }

    /// Set scroll offset
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Lay out every card at `width` columns
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let content_width = width.saturating_sub(4).max(1);
        let mut lines = Vec::new();

        for card in self.cards {
            let gutter = if card.selected { "▌ " } else { "  " };
            let (status, status_style) = if card.copied {
                ("コピーしました", self.theme.copied_style())
            } else {
                ("コピー", self.theme.dim_style())
            };
            let number_style = if card.selected {
                self.theme.accent_bold()
            } else {
                self.theme.accent_style()
            };
            lines.push(Line::from(vec![
                Span::styled(gutter.to_string(), self.theme.accent_style()),
                Span::styled(card.number.clone(), number_style),
                Span::raw("  "),
                Span::styled(status.to_string(), status_style),
            ]));

            for paragraph in card.body.lines() {
                if paragraph.is_empty() {
                    lines.push(Line::from(gutter.to_string()));
                    continue;
                }
                for row in textwrap::wrap(paragraph, content_width) {
                    lines.push(Line::from(vec![
                        Span::styled(gutter.to_string(), self.theme.accent_style()),
                        Span::styled(row.into_owned(), self.theme.base_style()),
                    ]));
                }
            }
            lines.push(Line::from(""));
        }
        lines
    }
}

impl Widget for PostList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let visible: Vec<Line> = self
            .lines(area.width as usize)
            .into_iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();
        Paragraph::new(visible).render(area, buf);
    }
}

/// A block of article text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBlock<'a> {
    Heading(&'a str),
    Paragraph(&'a str),
}

/// Headings and paragraphs of an article
pub struct TextBlocks<'a> {
    blocks: &'a [TextBlock<'a>],
    theme: &'a Theme,
    scroll: usize,
}

impl<'a> TextBlocks<'a> {
    pub fn new(blocks: &'a [TextBlock<'a>], theme: &'a Theme) -> Self {
        Self {
            blocks,
            theme,
            scroll: 0,
        }
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let content_width = width.saturating_sub(2).max(1);
        let mut lines = Vec::new();
        for block in self.blocks {
            let (text, style) = match block {
                TextBlock::Heading(t) => (*t, self.theme.heading_style()),
                TextBlock::Paragraph(t) => (*t, self.theme.base_style()),
            };
            for row in textwrap::wrap(text, content_width) {
                lines.push(Line::from(Span::styled(format!("  {}", row), style)));
            }
            lines.push(Line::from(""));
        }
        lines
    }
}

impl Widget for TextBlocks<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let visible: Vec<Line> = self
            .lines(area.width as usize)
            .into_iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();
        Paragraph::new(visible).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_card_header_shows_number_and_status() {
        let theme = Theme::dark();
        let cards = vec![
            PostCard {
                number: "01".into(),
                body: "hello",
                copied: false,
                selected: false,
            },
            PostCard {
                number: "02".into(),
                body: "world",
                copied: true,
                selected: true,
            },
        ];
        let lines = PostList::new(&cards, &theme).lines(40);
        assert_eq!(line_text(&lines[0]), "  01  コピー");
        assert_eq!(line_text(&lines[1]), "  hello");
        assert_eq!(line_text(&lines[3]), "▌ 02  コピーしました");
    }

    #[test]
    fn test_long_body_wraps() {
        let theme = Theme::dark();
        let cards = vec![PostCard {
            number: "01".into(),
            body: "one two three four five six seven",
            copied: false,
            selected: false,
        }];
        let lines = PostList::new(&cards, &theme).lines(14);
        // header + wrapped rows + spacer
        assert!(lines.len() > 3);
    }

    #[test]
    fn test_text_blocks_spacing() {
        let theme = Theme::dark();
        let blocks = [TextBlock::Heading("見出し"), TextBlock::Paragraph("本文です。")];
        let lines = TextBlocks::new(&blocks, &theme).lines(40);
        assert_eq!(lines.len(), 4);
        assert_eq!(line_text(&lines[0]), "  見出し");
    }
}
