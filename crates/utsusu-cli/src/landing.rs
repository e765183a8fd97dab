//! Product page: a scrolling one-pager with sections that fade in once

use std::ops::Range;
use std::time::{Duration, Instant};

use crossterm::event::EventStream;
use futures::StreamExt;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use utsusu_tui::{
    RevealTracker, TerminalSession, Theme,
    input::{Action, event_to_action},
    widgets::{TextBlock, TextBlocks},
};

use crate::ui::{UPGRADE_FEATURES, UPGRADE_PRICE, upgrade_allowance};

/// Rows scrolled before the nav bar turns solid
const NAV_SOLID_AFTER: usize = 5;
/// How long a newly revealed section stays dimmed
const FADE: Duration = Duration::from_millis(400);
const TICK: Duration = Duration::from_millis(50);
const CONTENT_WIDTH: u16 = 76;

/// Sections of the page, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Hero,
    Problem,
    Solution,
    Output,
    HowItWorks,
    Pricing,
    Cta,
    Footer,
}

impl Section {
    const ALL: [Section; 8] = [
        Section::Hero,
        Section::Problem,
        Section::Solution,
        Section::Output,
        Section::HowItWorks,
        Section::Pricing,
        Section::Cta,
        Section::Footer,
    ];

    /// Numbered sections show "NN  Label" above their heading
    fn marker(self) -> Option<(&'static str, &'static str)> {
        match self {
            Section::Problem => Some(("01", "Problem")),
            Section::Solution => Some(("02", "Solution")),
            Section::Output => Some(("03", "Output")),
            Section::HowItWorks => Some(("04", "How it works")),
            Section::Pricing => Some(("05", "Pricing")),
            Section::Hero | Section::Cta | Section::Footer => None,
        }
    }
}

fn heading(theme: &Theme, parts: &[(&str, bool)]) -> Line<'static> {
    let spans: Vec<Span<'static>> = std::iter::once(Span::raw("  "))
        .chain(parts.iter().map(|(text, accent)| {
            let style = if *accent {
                theme.accent_bold()
            } else {
                theme.heading_style()
            };
            Span::styled(text.to_string(), style)
        }))
        .collect();
    Line::from(spans)
}

fn dim(theme: &Theme, text: &str) -> Line<'static> {
    Line::from(Span::styled(format!("  {}", text), theme.dim_style()))
}

fn paragraphs(theme: &Theme, width: usize, texts: &[&str]) -> Vec<Line<'static>> {
    let blocks: Vec<TextBlock> = texts.iter().map(|t| TextBlock::Paragraph(t)).collect();
    TextBlocks::new(&blocks, theme).lines(width)
}

fn button(theme: &Theme, label: &str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("[ {} ]", label), theme.accent_bold()),
    ])
}

/// Lines of one section, wrapped to `width`
fn section_lines(section: Section, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("")];
    if let Some((number, label)) = section.marker() {
        lines.push(Line::from(vec![
            Span::styled(format!("  {}", number), theme.accent_style()),
            Span::styled(format!("  {}", label), theme.dim_style()),
        ]));
        lines.push(Line::from(""));
    }

    match section {
        Section::Hero => {
            lines.push(dim(theme, "話した内容を、投稿に写す ─ 日本のSNSに最適化"));
            lines.push(Line::from(""));
            lines.push(dim(theme, "Utsusu"));
            lines.push(heading(theme, &[("動画を、", false)]));
            lines.push(heading(theme, &[("投稿", true), ("にうつす。", false)]));
            lines.push(Line::from(""));
            lines.extend(paragraphs(
                theme,
                width,
                &["話した内容を、日本のSNSでそのまま使える投稿に整えます。"],
            ));
            lines.push(button(theme, "無料ではじめる"));
            lines.push(Line::from(""));
            lines.push(dim(theme, "SCROLL ↓"));
        }
        Section::Problem => {
            lines.push(heading(theme, &[("動画は作れる。", false)]));
            lines.push(heading(theme, &[("でも、", false), ("書く", true), ("のが苦痛。", false)]));
            lines.push(Line::from(""));
            lines.extend(paragraphs(
                theme,
                width,
                &[
                    "話すのは得意。カメラの前なら、いくらでも言葉が出てくる。",
                    "でも、それを文章にして投稿するとなると、途端に手が止まる。Xに書くには長すぎる。noteにまとめるには構成が必要。結局、動画だけ上げて、テキスト投稿は後回し。",
                    "そのまま、投稿しないまま終わる。",
                ],
            ));
        }
        Section::Solution => {
            lines.push(heading(theme, &[("選ぶのは、", false), ("3つ", true), ("だけ。", false)]));
            lines.push(Line::from(""));
            lines.extend(paragraphs(
                theme,
                width,
                &[
                    "Utsusuは、動画の内容を日本のSNS向けに整えます。設定も調整も不要。あなたが選ぶのは、3つだけ。",
                ],
            ));
            let choices = [
                ("01", "投稿タイプ", "解説・学び / 体験談 / ノウハウ共有"),
                ("02", "トーン", "やわらか / 普通 / ビジネス"),
                ("03", "絵文字", "あり / なし"),
            ];
            for (number, title, options) in choices {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {}  ", number), theme.accent_style()),
                    Span::styled(title.to_string(), theme.heading_style()),
                ]));
                lines.push(Line::from(Span::styled(
                    format!("      {}", options),
                    theme.dim_style(),
                )));
                lines.push(Line::from(""));
            }
        }
        Section::Output => {
            lines.push(heading(theme, &[("このまま、", false), ("投稿", true), ("できる。", false)]));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("  X ", theme.heading_style()),
                Span::styled("スレッド形式", theme.dim_style()),
            ]));
            let thread = [
                "動画で話した内容を、投稿にうつすだけの話。結局いちばん時間がかかるのは書くことでした。",
                "今回の動画は、作業量を減らす工夫よりも、投稿の形を先に決めるだけでラクになる話です。",
                "ポイントは3つ。話した内容を整理する。X用に整える。note用に整える。",
            ];
            for (i, text) in thread.iter().enumerate() {
                lines.push(Line::from(Span::styled(
                    format!("  {}/4", i + 1),
                    theme.accent_style(),
                )));
                lines.extend(paragraphs(theme, width, &[*text]));
            }
            lines.push(dim(theme, "..."));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("  note ", theme.heading_style()),
                Span::styled("要約記事", theme.dim_style()),
            ]));
            lines.push(heading(theme, &[("動画を、投稿にうつす", false)]));
            lines.push(Line::from(""));
            let article = [
                TextBlock::Paragraph(
                    "動画の内容をSNS向けに書き換えるのが大変で、結局投稿が止まる。そんな悩みを抱える人は多いです。",
                ),
                TextBlock::Heading("先に「投稿の形」を決める"),
                TextBlock::Paragraph(
                    "話した内容を整理して、Xとnoteに合わせて整える。それだけで、迷いが消えます。",
                ),
            ];
            lines.extend(TextBlocks::new(&article, theme).lines(width));
        }
        Section::HowItWorks => {
            lines.push(heading(theme, &[("貼る。選ぶ。押す。", false)]));
            lines.push(Line::from(""));
            let steps = [
                ("YouTube URLを貼る", "変換したい動画のURLをコピーして貼り付けるだけ。"),
                ("3つの項目を選ぶ", "投稿タイプ、トーン、絵文字の有無。選択肢から選ぶだけ。"),
                (
                    "「投稿を作る」を押す",
                    "Xスレッドとnote記事が完成。そのままコピーして投稿できます。",
                ),
            ];
            for (i, (title, body)) in steps.iter().enumerate() {
                lines.push(Line::from(vec![
                    Span::styled(format!("  ({}) ", i + 1), theme.accent_style()),
                    Span::styled(title.to_string(), theme.heading_style()),
                ]));
                lines.extend(paragraphs(theme, width, &[*body]));
            }
        }
        Section::Pricing => {
            lines.push(heading(theme, &[("シンプルな料金", false)]));
            lines.push(Line::from(""));
            lines.push(heading(theme, &[(UPGRADE_PRICE, true)]));
            lines.push(dim(theme, &upgrade_allowance(utsusu_core::MONTHLY_LIMIT)));
            lines.push(Line::from(""));
            for feature in UPGRADE_FEATURES {
                lines.push(Line::from(Span::styled(
                    format!("  ・{}", feature),
                    theme.base_style(),
                )));
            }
            lines.push(Line::from(""));
            lines.push(button(theme, "はじめる"));
        }
        Section::Cta => {
            lines.push(heading(theme, &[("動画を作ったら、", false)]));
            lines.push(heading(theme, &[("投稿も作る。", false)]));
            lines.push(Line::from(""));
            lines.push(dim(theme, "書くのが苦手でも、発信は続けられる。"));
            lines.push(Line::from(""));
            lines.push(button(theme, "無料ではじめる"));
        }
        Section::Footer => {
            lines.push(Line::from(Span::styled(
                "  ────────────────",
                theme.border_style(),
            )));
            lines.push(dim(theme, "Utsusu"));
            lines.push(dim(theme, "動画を、投稿にうつす。"));
        }
    }

    lines.push(Line::from(""));
    lines
}

/// Laid-out page plus scroll and reveal state
pub struct LandingPage {
    theme: Theme,
    width: usize,
    lines: Vec<Line<'static>>,
    /// Row range of each section within `lines`
    ranges: Vec<Range<usize>>,
    scroll: usize,
    reveal: RevealTracker,
    revealed_at: Vec<Option<Instant>>,
}

impl LandingPage {
    pub fn new(theme: Theme, width: u16) -> Self {
        let count = Section::ALL.len();
        let mut page = Self {
            theme,
            width: 0,
            lines: Vec::new(),
            ranges: Vec::new(),
            scroll: 0,
            reveal: RevealTracker::new(count),
            revealed_at: vec![None; count],
        };
        page.layout(width);
        page
    }

    /// Re-wrap for a new width
    pub fn layout(&mut self, width: u16) {
        let width = width.min(CONTENT_WIDTH) as usize;
        if width == self.width && !self.lines.is_empty() {
            return;
        }
        self.width = width;
        self.lines.clear();
        self.ranges.clear();
        for section in Section::ALL {
            let start = self.lines.len();
            self.lines.extend(section_lines(section, &self.theme, width));
            self.ranges.push(start..self.lines.len());
        }
    }

    pub fn content_height(&self) -> usize {
        self.lines.len()
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Scroll by `delta` rows, clamped so the last row stays reachable
    pub fn scroll_by(&mut self, delta: isize, view_height: usize) {
        let max = self.content_height().saturating_sub(view_height);
        let next = self.scroll as isize + delta;
        self.scroll = next.clamp(0, max as isize) as usize;
    }

    /// Solid once the page has moved past the threshold
    pub fn nav_solid(&self) -> bool {
        self.scroll > NAV_SOLID_AFTER
    }

    /// Reveal sections touching the viewport. Returns the newly revealed ones.
    pub fn observe(&mut self, view_height: usize, now: Instant) -> Vec<usize> {
        let viewport = self.scroll..self.scroll + view_height;
        let newly = self.reveal.observe(viewport, &self.ranges);
        for index in &newly {
            self.revealed_at[*index] = Some(now);
        }
        newly
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.reveal.is_revealed(index)
    }

    fn section_style(&self, index: usize, now: Instant) -> Option<Style> {
        match self.revealed_at.get(index).copied().flatten() {
            None => None,
            Some(at) if now.duration_since(at) < FADE => Some(self.theme.dim_style()),
            Some(_) => Some(Style::default()),
        }
    }

    /// Handle a key. Returns false to leave the page.
    pub fn handle_action(&mut self, action: Action, view_height: usize) -> bool {
        let page = view_height.saturating_sub(2).max(1) as isize;
        match action {
            Action::Quit | Action::Interrupt | Action::Escape | Action::Char('q') => return false,
            Action::Up | Action::Char('k') => self.scroll_by(-1, view_height),
            Action::Down | Action::Char('j') => self.scroll_by(1, view_height),
            Action::PageUp => self.scroll_by(-page, view_height),
            Action::PageDown | Action::Char(' ') => self.scroll_by(page, view_height),
            Action::Home => self.scroll = 0,
            Action::End => self.scroll_by(isize::MAX / 2, view_height),
            Action::Resize(columns) => self.layout(columns),
            _ => {}
        }
        true
    }

    /// Draw nav bar and the visible slice of the page
    pub fn render(&mut self, frame: &mut Frame, now: Instant) {
        let area = frame.area();
        frame.render_widget(Block::default().style(self.theme.base_style()), area);
        if area.height < 2 {
            return;
        }

        let nav_height = 2;
        let body = Rect::new(area.x, area.y + nav_height, area.width, area.height - nav_height);
        self.observe(body.height as usize, now);

        let column_width = area.width.min(CONTENT_WIDTH);
        let column_x = area.x + (area.width - column_width) / 2;

        let mut visible = Vec::with_capacity(body.height as usize);
        for row in self.scroll..(self.scroll + body.height as usize).min(self.lines.len()) {
            let section = self.ranges.iter().position(|r| r.contains(&row)).unwrap_or(0);
            match self.section_style(section, now) {
                Some(style) => visible.push(self.lines[row].clone().patch_style(style)),
                None => visible.push(Line::from("")),
            }
        }
        frame.render_widget(
            Paragraph::new(visible),
            Rect::new(column_x, body.y, column_width, body.height),
        );

        let nav = Rect::new(area.x, area.y, area.width, nav_height);
        let nav_block = if self.nav_solid() {
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(self.theme.border_style())
                .style(self.theme.selected_style())
        } else {
            Block::default().style(self.theme.base_style())
        };
        let inner = nav_block.inner(nav);
        frame.render_widget(nav_block, nav);

        let brand = Span::styled(" Utsusu", self.theme.heading_style());
        let hint = Span::styled("はじめる: utsusu   q: 閉じる ", self.theme.dim_style());
        let gap = (inner.width as usize).saturating_sub(brand.width() + hint.width());
        frame.render_widget(
            Paragraph::new(Line::from(vec![brand, Span::raw(" ".repeat(gap)), hint])),
            inner,
        );
    }
}

/// Show the product page until the user leaves it
pub async fn run_landing(theme: Theme) -> anyhow::Result<()> {
    let mut term = TerminalSession::enter()?;
    let mut page = LandingPage::new(theme, term.width()?);
    let mut event_stream = EventStream::new();
    let mut tick = tokio::time::interval(TICK);

    loop {
        term.terminal().draw(|frame| page.render(frame, Instant::now()))?;
        let view_height = term.terminal().size()?.height.saturating_sub(2) as usize;

        tokio::select! {
            event = event_stream.next() => {
                match event {
                    Some(Ok(event)) => {
                        if let Some(action) = event_to_action(event) {
                            if !page.handle_action(action, view_height) {
                                return Ok(());
                            }
                        }
                    }
                    Some(Err(e)) => return Err(anyhow::anyhow!("Event error: {}", e)),
                    None => return Ok(()),
                }
            }

            _ = tick.tick() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    fn page() -> LandingPage {
        LandingPage::new(Theme::dark(), 80)
    }

    #[test]
    fn test_sections_are_contiguous() {
        let page = page();
        assert_eq!(page.ranges.len(), Section::ALL.len());
        assert_eq!(page.ranges[0].start, 0);
        for pair in page.ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(page.ranges.last().unwrap().end, page.content_height());
    }

    #[test]
    fn test_only_visible_sections_reveal() {
        let mut page = page();
        let now = Instant::now();
        let first = page.observe(10, now);
        assert_eq!(first, vec![0]);
        assert!(!page.is_revealed(Section::ALL.len() - 1));

        // Same viewport again: nothing new
        assert!(page.observe(10, now).is_empty());
    }

    #[test]
    fn test_reveal_is_one_shot() {
        let mut page = page();
        let now = Instant::now();
        page.observe(10, now);

        page.scroll_by(isize::MAX / 2, 10);
        let newly = page.observe(10, now);
        assert!(newly.contains(&(Section::ALL.len() - 1)));

        page.scroll_by(isize::MIN / 2, 10);
        assert_eq!(page.scroll(), 0);
        assert!(page.observe(10, now).is_empty());
        assert!(page.is_revealed(0));
    }

    #[test]
    fn test_nav_turns_solid_past_threshold() {
        let mut page = page();
        assert!(!page.nav_solid());
        page.scroll_by(NAV_SOLID_AFTER as isize, 10);
        assert!(!page.nav_solid());
        page.scroll_by(1, 10);
        assert!(page.nav_solid());
    }

    #[test]
    fn test_keys_scroll_and_quit() {
        let mut page = page();
        assert!(page.handle_action(Action::PageDown, 20));
        assert_eq!(page.scroll(), 18);
        assert!(page.handle_action(Action::Up, 20));
        assert_eq!(page.scroll(), 17);
        assert!(page.handle_action(Action::Home, 20));
        assert_eq!(page.scroll(), 0);
        assert!(!page.handle_action(Action::Char('q'), 20));
    }

    #[test]
    fn test_unrevealed_sections_are_blank() {
        let mut page = page();
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal
            .draw(|frame| page.render(frame, Instant::now()))
            .unwrap();
        assert!(page.is_revealed(0));
        assert!(!page.is_revealed(1));

        let buffer = terminal.backend().buffer().clone();
        let row_text = |y: u16| -> String { (0..80).map(|x| buffer[(x, y)].symbol()).collect() };
        assert!(row_text(0).contains("Utsusu"));
    }
}
