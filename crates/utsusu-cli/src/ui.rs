//! Full-screen app: history sidebar, input / loading / result, plan overlay

use tokio::sync::{broadcast, mpsc};

use crossterm::event::EventStream;
use futures::StreamExt;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use std::future::Future;
use std::io::Stdout;
use std::time::{Duration, Instant};
use utsusu_core::{
    ConversionRecord, CopyFeedback, CopyTarget, Error, GenerationEvent, GenerationHandle, Phase,
    PostConfig, RecordId, Session, SidebarState, UsageSummary, ViewState, format,
    source::{INVALID_URL_HINT, is_supported_url},
};
use utsusu_tui::{
    TerminalSession, Theme,
    input::{Action, event_to_action},
    widgets::{
        Dialog, PhaseSpinner, PostCard, PostList, Selector, SelectorItem, SelectorState,
        TextBlock, TextBlocks, UrlInput,
    },
};

use crate::clipboard;
use crate::commands::{OptionKind, copy_text};
use crate::utils::{error_message, truncate_chars};

pub const UPGRADE_HEADLINE: &str = "続けて使うには";
pub const UPGRADE_PRICE: &str = "¥1,480/月";
pub const UPGRADE_FEATURES: [&str; 3] = [
    "Xスレッド + note記事を一括作成",
    "日本のSNSに最適化された表現",
    "タイトル案を3つ提案",
];
const UPGRADE_ACTIONS: [&str; 2] = ["登録する", "あとで"];

/// "月N動画まで"
pub fn upgrade_allowance(monthly_limit: u32) -> String {
    format!("月{}動画まで", monthly_limit)
}

const SIDEBAR_WIDTH: u16 = 30;
const INPUT_MAX_WIDTH: u16 = 72;
const SCROLL_STEP: usize = 10;
const TICK: Duration = Duration::from_millis(80);

/// Messages sent from key handling to the session owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiMessage {
    /// Convert this URL
    Submit(String),
    /// Reword the record on screen
    Regenerate,
    Open(RecordId),
    Delete(RecordId),
    NewConversion,
    SelectTitle(usize),
    Copy(CopyTarget),
    OpenUpgrade,
    ConfirmUpgrade,
    DismissUpgrade,
    Quit,
}

/// What currently receives keys in the main area or sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Url,
    Option(OptionKind),
    Posts,
    Titles,
    Sidebar,
}

/// Run queued for the next loop iteration
enum PendingRun {
    Submit(String),
    Regenerate,
}

#[derive(Debug, Clone)]
struct HistoryEntry {
    id: RecordId,
    title: String,
}

#[derive(Debug, Clone, Copy)]
struct Loading {
    /// Zero-based index of the running phase
    current: Option<usize>,
    regenerate: bool,
    started: Instant,
}

/// TUI application state.
///
/// Holds a copy of what it draws so rendering never needs the session,
/// which is mutably borrowed while a run is in flight.
pub struct TuiState {
    theme: Theme,
    input: UrlInput,
    post: PostConfig,
    focus: Focus,
    sidebar: SidebarState,
    history: Vec<HistoryEntry>,
    history_selected: usize,
    active: Option<ConversionRecord>,
    selected_title: usize,
    usage: UsageSummary,
    free_limit: u32,
    monthly_limit: u32,
    upgrade_open: bool,
    upgrade_selected: usize,
    loading: Option<Loading>,
    cancelling: bool,
    picker: SelectorState,
    picker_kind: OptionKind,
    selected_post: usize,
    scroll: usize,
    copy_feedback: CopyFeedback,
    status: String,
    ui_tx: mpsc::Sender<UiMessage>,
}

impl TuiState {
    pub fn new(post: PostConfig, theme: Theme, width: u16, ui_tx: mpsc::Sender<UiMessage>) -> Self {
        let mut input = UrlInput::new().with_placeholder("YouTube URL");
        input.set_focused(true);

        Self {
            theme,
            input,
            post,
            focus: Focus::Url,
            sidebar: SidebarState::for_width(width),
            history: Vec::new(),
            history_selected: 0,
            active: None,
            selected_title: 0,
            usage: UsageSummary::Trial { remaining: 0 },
            free_limit: utsusu_core::FREE_LIMIT,
            monthly_limit: utsusu_core::MONTHLY_LIMIT,
            upgrade_open: false,
            upgrade_selected: 0,
            loading: None,
            cancelling: false,
            picker: SelectorState::default(),
            picker_kind: OptionKind::PostType,
            selected_post: 0,
            scroll: 0,
            copy_feedback: CopyFeedback::new(),
            status: String::new(),
            ui_tx,
        }
    }

    /// Refresh the drawn copy of the session
    pub fn sync(&mut self, session: &Session) {
        let store = session.store();
        self.history = store
            .history()
            .iter()
            .map(|r| HistoryEntry {
                id: r.id(),
                title: r.derived_title().to_string(),
            })
            .collect();
        self.history_selected = self.history_selected.min(self.history.len().saturating_sub(1));

        let previous = self.active.as_ref().map(|r| r.id());
        self.active = store.active().cloned();
        if self.active.as_ref().map(|r| r.id()) != previous {
            self.selected_post = 0;
            self.scroll = 0;
        }
        self.selected_title = store.selected_title_index();

        let gate = session.gate();
        self.usage = gate.summary();
        self.free_limit = gate.limits().free_limit;
        self.monthly_limit = gate.limits().monthly_limit;

        let was_open = self.upgrade_open;
        self.upgrade_open = session.is_upgrade_prompt_open();
        if self.upgrade_open && !was_open {
            self.upgrade_selected = 0;
        }

        self.fix_focus();
    }

    /// Which main view is up
    fn view_state(&self) -> ViewState {
        let phase = self
            .loading
            .and_then(|l| l.current)
            .and_then(|i| Phase::ALL.get(i).copied());
        ViewState::derive(
            self.loading.is_some(),
            phase,
            self.active.as_ref().map(|r| r.id()),
        )
    }

    fn begin_loading(&mut self, regenerate: bool) {
        self.loading = Some(Loading {
            current: None,
            regenerate,
            started: Instant::now(),
        });
        self.cancelling = false;
        self.status.clear();
    }

    fn end_loading(&mut self) {
        self.loading = None;
        self.cancelling = false;
    }

    /// Handle pipeline events
    pub fn handle_generation_event(&mut self, event: GenerationEvent) {
        match event {
            GenerationEvent::PhaseStarted { index, .. } => {
                if let Some(loading) = self.loading.as_mut() {
                    loading.current = Some(index);
                }
            }
            GenerationEvent::Failed { message } => {
                self.status = message;
            }
            GenerationEvent::Cancelled => {
                self.status = "キャンセルしました".to_string();
            }
            GenerationEvent::RegenerateFinished { changed: false, .. } => {
                self.status = "言い回しはそのままです".to_string();
            }
            GenerationEvent::Started { .. }
            | GenerationEvent::PhaseFinished { .. }
            | GenerationEvent::Completed { .. }
            | GenerationEvent::RegenerateStarted { .. }
            | GenerationEvent::RegenerateFinished { .. } => {}
        }
    }

    /// Report a new terminal width
    pub fn on_resize(&mut self, width: u16) {
        self.sidebar.sync(width);
        self.fix_focus();
    }

    fn toggle_sidebar(&mut self) {
        self.sidebar.toggle();
        self.fix_focus();
    }

    /// Keys cycle through these, in order
    fn focus_ring(&self) -> Vec<Focus> {
        let mut ring = match self.view_state() {
            ViewState::Input => {
                let mut ring = vec![Focus::Url];
                ring.extend(OptionKind::ALL.iter().map(|k| Focus::Option(*k)));
                ring
            }
            ViewState::Result { .. } => vec![Focus::Posts, Focus::Titles],
            ViewState::Loading { .. } => Vec::new(),
        };
        if self.sidebar.is_open() {
            ring.push(Focus::Sidebar);
        }
        ring
    }

    /// Keep focus on something that is on screen
    fn fix_focus(&mut self) {
        let ring = self.focus_ring();
        if !ring.contains(&self.focus) {
            if let Some(first) = ring.first() {
                self.focus = *first;
            }
        }
        self.input.set_focused(self.focus == Focus::Url);
    }

    fn cycle_focus(&mut self, forward: bool) {
        let ring = self.focus_ring();
        if ring.is_empty() {
            return;
        }
        let pos = ring.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (pos + 1) % ring.len()
        } else {
            (pos + ring.len() - 1) % ring.len()
        };
        self.focus = ring[next];
        self.input.set_focused(self.focus == Focus::Url);
    }

    fn refresh_hint(&mut self) {
        let content = self.input.content().trim();
        if !content.is_empty() && !is_supported_url(content) {
            self.input.set_hint(Some(INVALID_URL_HINT));
        } else {
            self.input.set_hint(None);
        }
    }

    fn url_ready(&self) -> bool {
        is_supported_url(self.input.content().trim())
    }

    /// Columns of the URL box for a terminal `columns` wide
    fn input_width(&self, columns: u16) -> u16 {
        let main = if self.sidebar.is_open() {
            columns.saturating_sub(SIDEBAR_WIDTH)
        } else {
            columns
        };
        main.min(INPUT_MAX_WIDTH)
    }

    /// Handle a keyboard action. Returns false when the app should quit.
    pub async fn handle_action(&mut self, action: Action, width: u16) -> bool {
        if let Action::Resize(columns) = action {
            self.on_resize(columns);
            return true;
        }

        if self.upgrade_open {
            match action {
                Action::Left | Action::Right | Action::Tab | Action::BackTab | Action::Up | Action::Down => {
                    self.upgrade_selected = 1 - self.upgrade_selected.min(1);
                }
                Action::Submit => {
                    let msg = if self.upgrade_selected == 0 {
                        UiMessage::ConfirmUpgrade
                    } else {
                        UiMessage::DismissUpgrade
                    };
                    let _ = self.ui_tx.send(msg).await;
                }
                Action::Escape => {
                    let _ = self.ui_tx.send(UiMessage::DismissUpgrade).await;
                }
                Action::Quit => {
                    let _ = self.ui_tx.send(UiMessage::Quit).await;
                    return false;
                }
                _ => {}
            }
            return true;
        }

        if self.picker.visible {
            let count = self.picker_kind.choices().len();
            match action {
                Action::Up => self.picker.up(count),
                Action::Down => self.picker.down(count),
                Action::Submit => {
                    self.post = self.picker_kind.apply(self.post, self.picker.selected);
                    self.picker.hide();
                }
                Action::Escape => self.picker.hide(),
                _ => {}
            }
            return true;
        }

        match action {
            Action::Quit => {
                let _ = self.ui_tx.send(UiMessage::Quit).await;
                return false;
            }
            Action::Interrupt => {
                // Nothing is running, so Ctrl+C leaves the app
                let _ = self.ui_tx.send(UiMessage::Quit).await;
                return false;
            }
            Action::ToggleSidebar => {
                self.toggle_sidebar();
                return true;
            }
            Action::NewConversion => {
                let _ = self.ui_tx.send(UiMessage::NewConversion).await;
                return true;
            }
            Action::OpenPlan => {
                let _ = self.ui_tx.send(UiMessage::OpenUpgrade).await;
                return true;
            }
            Action::Tab => {
                self.cycle_focus(true);
                return true;
            }
            Action::BackTab => {
                self.cycle_focus(false);
                return true;
            }
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(SCROLL_STEP);
                return true;
            }
            Action::PageDown => {
                self.scroll = self.scroll.saturating_add(SCROLL_STEP);
                return true;
            }
            _ => {}
        }

        match self.focus {
            Focus::Sidebar => self.handle_sidebar_action(action).await,
            Focus::Url => match action {
                Action::Submit if !self.view_state().accepts_submit() => {}
                Action::Submit => {
                    if self.url_ready() {
                        let url = self.input.content().trim().to_string();
                        let _ = self.ui_tx.send(UiMessage::Submit(url)).await;
                    } else {
                        self.refresh_hint();
                        if self.input.content().trim().is_empty() {
                            self.input.set_hint(Some(INVALID_URL_HINT));
                        }
                    }
                }
                other => {
                    let field = self.input_width(width);
                    if self.input.handle_action(&other, field) {
                        self.refresh_hint();
                    }
                }
            },
            Focus::Option(kind) => match action {
                Action::Submit | Action::Char(' ') | Action::Down => {
                    self.picker_kind = kind;
                    self.picker.show_at(kind.current_index(self.post));
                }
                Action::Left | Action::Right => {
                    let count = kind.choices().len();
                    let current = kind.current_index(self.post);
                    let next = if action == Action::Right {
                        (current + 1) % count
                    } else {
                        (current + count - 1) % count
                    };
                    self.post = kind.apply(self.post, next);
                }
                _ => {}
            },
            Focus::Posts | Focus::Titles => self.handle_result_action(action).await,
        }
        true
    }

    async fn handle_sidebar_action(&mut self, action: Action) {
        match action {
            Action::Up => {
                self.history_selected = self.history_selected.saturating_sub(1);
            }
            Action::Down => {
                if self.history_selected + 1 < self.history.len() {
                    self.history_selected += 1;
                }
            }
            Action::Submit => {
                if let Some(entry) = self.history.get(self.history_selected) {
                    let _ = self.ui_tx.send(UiMessage::Open(entry.id)).await;
                }
            }
            Action::Delete | Action::Backspace | Action::Char('d') => {
                if let Some(entry) = self.history.get(self.history_selected) {
                    let _ = self.ui_tx.send(UiMessage::Delete(entry.id)).await;
                }
            }
            Action::Char('u') => {
                if !matches!(self.usage, UsageSummary::Plan { .. }) {
                    let _ = self.ui_tx.send(UiMessage::OpenUpgrade).await;
                }
            }
            Action::Escape => {
                self.cycle_focus(true);
            }
            _ => {}
        }
    }

    async fn handle_result_action(&mut self, action: Action) {
        let Some(record) = self.active.as_ref() else {
            return;
        };
        let posts = record.thread_segments().len();
        let titles = record.article_title_options().len();

        let msg = match (self.focus, action) {
            (_, Action::Char('a')) => Some(UiMessage::Copy(CopyTarget::AllThreads)),
            (_, Action::Char('n')) => Some(UiMessage::Copy(CopyTarget::Article)),
            (_, Action::Char('r')) => Some(UiMessage::Regenerate),
            (Focus::Posts, Action::Up) => {
                self.selected_post = self.selected_post.saturating_sub(1);
                None
            }
            (Focus::Posts, Action::Down) => {
                if self.selected_post + 1 < posts {
                    self.selected_post += 1;
                }
                None
            }
            (Focus::Posts, Action::Submit | Action::Char('c')) => {
                Some(UiMessage::Copy(CopyTarget::Thread(self.selected_post)))
            }
            (Focus::Titles, Action::Up | Action::Left) => {
                Some(UiMessage::SelectTitle(self.selected_title.saturating_sub(1)))
            }
            (Focus::Titles, Action::Down | Action::Right) => {
                Some(UiMessage::SelectTitle((self.selected_title + 1).min(titles.saturating_sub(1))))
            }
            (Focus::Titles, Action::Submit | Action::Char('c')) => {
                Some(UiMessage::Copy(CopyTarget::Article))
            }
            _ => None,
        };

        if let Some(msg) = msg {
            let _ = self.ui_tx.send(msg).await;
        }
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();
        frame.render_widget(Block::default().style(self.theme.base_style()), size);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(size);

        let main = if self.sidebar.is_open() {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(1)])
                .split(rows[0]);
            self.render_sidebar(frame, cols[0]);
            cols[1]
        } else {
            rows[0]
        };

        match self.view_state() {
            ViewState::Input => self.render_input(frame, main),
            ViewState::Loading { .. } => self.render_loading(frame, main),
            ViewState::Result { .. } => self.render_result(frame, main),
        }

        self.render_status(frame, rows[1]);

        if self.picker.visible {
            self.render_picker(frame, size);
        }
        if self.upgrade_open {
            self.render_upgrade(frame, size);
        }
    }

    fn render_sidebar(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(if self.focus == Focus::Sidebar {
                self.theme.accent_style()
            } else {
                self.theme.border_style()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(3)])
            .split(inner);

        let width = inner.width.saturating_sub(4) as usize;
        let mut lines = vec![
            Line::from(Span::styled(" Utsusu", self.theme.heading_style())),
            Line::from(Span::styled(" 動画を、投稿にうつす。", self.theme.dim_style())),
            Line::from(""),
            Line::from(vec![
                Span::styled(" + 新しく変換", self.theme.base_style()),
                Span::styled("  Ctrl+N", self.theme.dim_style()),
            ]),
            Line::from(""),
            Line::from(Span::styled(" 履歴", self.theme.dim_style())),
        ];

        if self.history.is_empty() {
            lines.push(Line::from(Span::styled(
                "  まだ履歴がありません",
                self.theme.dim_style(),
            )));
        }
        let active = self.active.as_ref().map(|r| r.id());
        for (i, entry) in self.history.iter().enumerate() {
            let cursor = self.focus == Focus::Sidebar && i == self.history_selected;
            let style = if Some(entry.id) == active {
                self.theme.selected_style()
            } else {
                self.theme.dim_style()
            };
            let marker = if cursor { "›" } else { " " };
            lines.push(Line::from(vec![
                Span::styled(format!(" {} ", marker), self.theme.accent_style()),
                Span::styled(truncate_chars(&entry.title, width), style),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), parts[0]);

        let usage_style = match self.usage {
            UsageSummary::TrialUsed => self.theme.accent_bold(),
            _ => self.theme.dim_style(),
        };
        let footer = vec![
            Line::from(Span::styled(" ユーザー", self.theme.base_style())),
            Line::from(Span::styled(format!(" {}", self.usage.label()), usage_style)),
            Line::from(Span::styled(" Ctrl+P プラン", self.theme.dim_style())),
        ];
        frame.render_widget(Paragraph::new(footer), parts[1]);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let area = centered_column(area, INPUT_MAX_WIDTH);
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3), // headline
                Constraint::Length(1),
                Constraint::Length(self.input.height()),
                Constraint::Length(1), // options
                Constraint::Length(1),
                Constraint::Length(1), // submit
                Constraint::Min(0),
            ])
            .split(area);

        let headline = vec![
            Line::from(Span::styled("動画を、", self.theme.heading_style())),
            Line::from(vec![
                Span::styled("投稿", self.theme.accent_bold()),
                Span::styled("にうつす。", self.theme.heading_style()),
            ]),
        ];
        frame.render_widget(Paragraph::new(headline), parts[1]);

        self.input.render(parts[3], frame.buffer_mut(), &self.theme);

        let labels = [
            (OptionKind::PostType, self.post.post_type.label()),
            (OptionKind::Tone, self.post.tone.label()),
            (OptionKind::Emoji, self.post.emoji.label()),
        ];
        let mut spans = vec![Span::raw(" ")];
        for (i, (kind, label)) in labels.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" — ", self.theme.dim_style()));
            }
            let style = if self.focus == Focus::Option(*kind) {
                self.theme.selected_style()
            } else {
                self.theme.base_style()
            };
            spans.push(Span::styled(format!("{} ▾", label), style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), parts[4]);

        let button_style = if self.url_ready() {
            self.theme.accent_bold()
        } else {
            self.theme.dim_style()
        };
        let button = Line::from(vec![
            Span::styled(" [ 投稿を作る ]", button_style),
            Span::styled("  Enter", self.theme.dim_style()),
        ]);
        frame.render_widget(Paragraph::new(button), parts[6]);
    }

    fn render_loading(&self, frame: &mut Frame, area: Rect) {
        let Some(loading) = self.loading else {
            return;
        };

        let labels: Vec<&str> = if loading.regenerate {
            vec![Phase::FormattingForPosting.label()]
        } else {
            Phase::ALL.iter().map(|p| p.label()).collect()
        };
        let current = if loading.regenerate {
            0
        } else {
            loading.current.unwrap_or(0)
        };

        let spinner = PhaseSpinner::new(&labels, current, &self.theme).with_start_time(loading.started);
        let height = spinner.height() + 2;
        let column = centered_column(area, 40);
        let y = column.y + column.height.saturating_sub(height) / 2;
        let spinner_area = Rect::new(column.x, y, column.width, spinner.height().min(column.height));
        frame.render_widget(spinner, spinner_area);

        let hint = if self.cancelling {
            "キャンセルしています…"
        } else {
            "Ctrl+C でキャンセル"
        };
        let hint_y = (spinner_area.y + spinner_area.height + 1).min(area.y + area.height.saturating_sub(1));
        frame.render_widget(
            Paragraph::new(Span::styled(hint, self.theme.dim_style())),
            Rect::new(column.x, hint_y, column.width, 1),
        );
    }

    /// Every line of the result view, plus the first line of each post card
    fn result_lines(&self, record: &ConversionRecord, width: usize) -> (Vec<Line<'static>>, Vec<usize>) {
        let now = Instant::now();
        let mut lines: Vec<Line<'static>> = vec![
            Line::from(vec![
                Span::styled("● ", self.theme.accent_style()),
                Span::styled("このまま投稿できます", self.theme.dim_style()),
            ]),
            Line::from(Span::styled(
                format!("  {}  {}", record.derived_title(), record.source_url()),
                self.theme.dim_style(),
            )),
            Line::from(""),
        ];

        let copy_label = |target: CopyTarget, idle: &'static str| {
            if self.copy_feedback.is_showing(target, now) {
                Span::styled("コピーしました", self.theme.copied_style())
            } else {
                Span::styled(idle, self.theme.dim_style())
            }
        };

        lines.push(Line::from(vec![
            Span::styled("X ", self.theme.heading_style()),
            Span::styled("スレッド形式   ", self.theme.dim_style()),
            copy_label(CopyTarget::AllThreads, "[a] まとめてコピー"),
        ]));
        lines.push(Line::from(""));

        let mut card_starts = Vec::new();
        for (i, segment) in record.thread_segments().iter().enumerate() {
            let card = [PostCard {
                number: format::display_number(i),
                body: segment.as_str(),
                copied: self.copy_feedback.is_showing(CopyTarget::Thread(i), now),
                selected: self.focus == Focus::Posts && i == self.selected_post,
            }];
            card_starts.push(lines.len());
            lines.extend(PostList::new(&card, &self.theme).lines(width));
        }

        lines.push(Line::from(vec![
            Span::styled("note ", self.theme.heading_style()),
            Span::styled("要約記事   ", self.theme.dim_style()),
            copy_label(CopyTarget::Article, "[n] 本文コピー"),
        ]));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("  タイトル案", self.theme.dim_style())));
        for (i, title) in record.article_title_options().iter().enumerate() {
            let chosen = i == self.selected_title;
            let style = if chosen && self.focus == Focus::Titles {
                self.theme.selected_style()
            } else if chosen {
                self.theme.accent_style()
            } else {
                self.theme.base_style()
            };
            let marker = if chosen { "●" } else { "○" };
            lines.push(Line::from(Span::styled(format!("  {} {}", marker, title), style)));
        }
        lines.push(Line::from(""));

        let title = record.title(self.selected_title).unwrap_or_default();
        lines.push(Line::from(Span::styled(
            format!("  {}", title),
            self.theme.heading_style(),
        )));
        lines.push(Line::from(""));
        let blocks: Vec<TextBlock> = format::article_blocks(record.article_body())
            .into_iter()
            .map(|b| match b {
                format::ArticleBlock::Heading(t) => TextBlock::Heading(t),
                format::ArticleBlock::Paragraph(t) => TextBlock::Paragraph(t),
            })
            .collect();
        lines.extend(TextBlocks::new(&blocks, &self.theme).lines(width));

        lines.push(Line::from(Span::styled(
            "  [r] 言い回しを少し変える",
            self.theme.dim_style(),
        )));
        (lines, card_starts)
    }

    fn render_result(&mut self, frame: &mut Frame, area: Rect) {
        let Some(record) = self.active.clone() else {
            return;
        };
        let inner = Rect {
            x: area.x + 1,
            width: area.width.saturating_sub(2),
            ..area
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let (lines, card_starts) = self.result_lines(&record, inner.width as usize);
        let content_height = lines.len();
        let view_height = inner.height as usize;

        // Keep the selected card in view while moving through posts
        if self.focus == Focus::Posts {
            if let Some(start) = card_starts.get(self.selected_post) {
                if *start < self.scroll {
                    self.scroll = *start;
                } else if *start + 2 > self.scroll + view_height {
                    self.scroll = (*start + 2).saturating_sub(view_height);
                }
            }
        }
        self.scroll = self.scroll.min(content_height.saturating_sub(view_height));

        let visible: Vec<Line> = lines.into_iter().skip(self.scroll).take(view_height).collect();
        frame.render_widget(Paragraph::new(visible), inner);

        if content_height > view_height {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");
            let mut scrollbar_state = ScrollbarState::new(content_height)
                .position(self.scroll)
                .viewport_content_length(view_height);
            frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let left = if self.status.is_empty() {
            self.post.to_string()
        } else {
            self.status.clone()
        };
        let right = match self.view_state() {
            ViewState::Input => "Tab: 移動 │ Ctrl+B: 履歴 │ Ctrl+Q: 終了",
            ViewState::Loading { .. } => "Ctrl+C: キャンセル",
            ViewState::Result { .. } => "a/n: コピー │ r: 言い換え │ Ctrl+N: 新規 │ Ctrl+Q: 終了",
        };

        let left_line = Line::from(Span::raw(format!(" {}", left)));
        let right_line = Line::from(Span::raw(right));
        let available = area.width as usize;
        let line = if left_line.width() + right_line.width() + 2 <= available {
            let spacing = available - left_line.width() - right_line.width();
            Line::from(vec![
                Span::styled(format!(" {}", left), self.status_style()),
                Span::raw(" ".repeat(spacing)),
                Span::styled(right, self.theme.dim_style()),
            ])
        } else {
            Line::from(Span::styled(format!(" {}", left), self.status_style()))
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn status_style(&self) -> ratatui::style::Style {
        if self.status.is_empty() {
            self.theme.dim_style()
        } else {
            self.theme.error_style()
        }
    }

    fn render_picker(&self, frame: &mut Frame, area: Rect) {
        let current = self.picker_kind.current_index(self.post);
        let items: Vec<SelectorItem> = self
            .picker_kind
            .choices()
            .into_iter()
            .enumerate()
            .map(|(i, (_, label))| SelectorItem {
                label,
                description: None,
                is_current: i == current,
            })
            .collect();

        let selector = Selector::new(self.picker_kind.title(), items, &self.theme)
            .with_selected(self.picker.selected);
        selector.render_centered(area, frame.buffer_mut());
    }

    fn render_upgrade(&self, frame: &mut Frame, area: Rect) {
        let body = vec![
            Line::from(Span::styled(
                format!("無料のお試しは{}回までです。", self.free_limit),
                self.theme.dim_style(),
            )),
            Line::from(Span::styled(
                "続けて投稿を作るにはプランに登録してください。",
                self.theme.dim_style(),
            )),
            Line::from(""),
            Line::from(Span::styled(UPGRADE_PRICE, self.theme.heading_style())),
            Line::from(Span::styled(
                upgrade_allowance(self.monthly_limit),
                self.theme.dim_style(),
            )),
            Line::from(""),
        ];
        let mut body = body;
        body.extend(
            UPGRADE_FEATURES
                .iter()
                .map(|f| Line::from(Span::styled(format!("・{}", f), self.theme.base_style()))),
        );

        Dialog::new(UPGRADE_HEADLINE, body, &UPGRADE_ACTIONS, &self.theme)
            .with_selected(self.upgrade_selected)
            .render_centered(area, frame.buffer_mut());
    }
}

/// A column of at most `max_width`, centered in `area` with a small top margin
fn centered_column(area: Rect, max_width: u16) -> Rect {
    let width = area.width.min(max_width);
    let x = area.x + (area.width - width) / 2;
    let top = (area.height / 8).min(3);
    Rect::new(x, area.y + top, width, area.height.saturating_sub(top))
}

/// Poll `run` to completion while keeping the screen and keys alive.
///
/// Returns `None` if the user quit mid-run; dropping the run releases it.
async fn drive<F, T>(
    run: F,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &mut TuiState,
    handle: &GenerationHandle,
    events: &mut broadcast::Receiver<GenerationEvent>,
    event_stream: &mut EventStream,
    tick: &mut tokio::time::Interval,
) -> anyhow::Result<Option<T>>
where
    F: Future<Output = T>,
{
    let mut run = std::pin::pin!(run);
    loop {
        terminal.draw(|frame| state.render(frame))?;

        tokio::select! {
            biased;

            result = &mut run => return Ok(Some(result)),

            event = events.recv() => {
                if let Ok(event) = event {
                    state.handle_generation_event(event);
                }
            }

            event = event_stream.next() => {
                match event {
                    Some(Ok(event)) => match event_to_action(event) {
                        Some(Action::Interrupt | Action::Escape) => {
                            // Cancel using the handle (doesn't need to borrow the session)
                            handle.abort();
                            state.cancelling = true;
                        }
                        Some(Action::Quit) => return Ok(None),
                        Some(Action::Resize(columns)) => state.on_resize(columns),
                        Some(Action::ToggleSidebar) => state.toggle_sidebar(),
                        _ => {}
                    },
                    Some(Err(e)) => return Err(anyhow::anyhow!("Event error: {}", e)),
                    None => return Ok(None),
                }
            }

            _ = tick.tick() => {}
        }
    }
}

/// Run the TUI application
pub async fn run_tui(session: &mut Session, post: PostConfig, theme: Theme) -> anyhow::Result<()> {
    let mut term = TerminalSession::enter()?;
    let width = term.width()?;

    let (ui_tx, mut ui_rx) = mpsc::channel::<UiMessage>(32);
    let mut state = TuiState::new(post, theme, width, ui_tx);
    state.sync(session);

    let mut events = session.subscribe();
    let mut event_stream = EventStream::new();
    let mut tick = tokio::time::interval(TICK);
    let mut pending: Option<PendingRun> = None;

    loop {
        if let Some(run) = pending.take() {
            let handle = session.handle();
            state.begin_loading(matches!(run, PendingRun::Regenerate));

            let outcome: Option<utsusu_core::Result<Option<RecordId>>> = match run {
                PendingRun::Submit(url) => {
                    let post = state.post;
                    drive(
                        session.submit(&url, post),
                        term.terminal(),
                        &mut state,
                        &handle,
                        &mut events,
                        &mut event_stream,
                        &mut tick,
                    )
                    .await?
                    .map(|result| result.map(Some))
                }
                PendingRun::Regenerate => {
                    let post = state.post;
                    drive(
                        session.regenerate(post),
                        term.terminal(),
                        &mut state,
                        &handle,
                        &mut events,
                        &mut event_stream,
                        &mut tick,
                    )
                    .await?
                }
            };

            // Drain events sent after the last poll
            while let Ok(event) = events.try_recv() {
                state.handle_generation_event(event);
            }
            state.end_loading();

            match outcome {
                None => return Ok(()),
                Some(Ok(_)) => {
                    state.input.clear();
                }
                Some(Err(e)) => {
                    if matches!(e, Error::InvalidInput(_)) {
                        state.input.set_hint(Some(INVALID_URL_HINT));
                    }
                    if !e.requires_upgrade() {
                        state.status = error_message(&e);
                    }
                }
            }
            state.sync(session);
            continue;
        }

        term.terminal().draw(|frame| state.render(frame))?;
        let width = term.width()?;

        tokio::select! {
            biased;

            event = event_stream.next() => {
                match event {
                    Some(Ok(event)) => {
                        if let Some(action) = event_to_action(event) {
                            if !state.handle_action(action, width).await {
                                return Ok(());
                            }
                        }
                    }
                    Some(Err(e)) => return Err(anyhow::anyhow!("Event error: {}", e)),
                    None => return Ok(()),
                }
            }

            // Tick for animations and copy acknowledgements
            _ = tick.tick() => {}

            msg = ui_rx.recv() => {
                match msg {
                    Some(UiMessage::Submit(url)) => pending = Some(PendingRun::Submit(url)),
                    Some(UiMessage::Regenerate) => pending = Some(PendingRun::Regenerate),
                    Some(UiMessage::Open(id)) => {
                        session.select_active(id);
                    }
                    Some(UiMessage::Delete(id)) => {
                        session.delete_record(id);
                    }
                    Some(UiMessage::NewConversion) => {
                        session.start_new();
                        state.input.clear();
                        state.status.clear();
                    }
                    Some(UiMessage::SelectTitle(index)) => {
                        session.select_title(index);
                    }
                    Some(UiMessage::Copy(target)) => {
                        let text = session.active().and_then(|record| {
                            let title = session.store().selected_title().unwrap_or_default();
                            copy_text(record, title, target)
                        });
                        if let Some(text) = text {
                            clipboard::copy_to_clipboard(term.terminal().backend_mut(), &text)?;
                            state.copy_feedback.copied(target, Instant::now());
                        }
                    }
                    Some(UiMessage::OpenUpgrade) => session.open_upgrade_prompt(),
                    Some(UiMessage::ConfirmUpgrade) => {
                        session.confirm_upgrade();
                        state.status.clear();
                    }
                    Some(UiMessage::DismissUpgrade) => session.dismiss_upgrade_prompt(),
                    Some(UiMessage::Quit) | None => return Ok(()),
                }
                state.sync(session);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::fast_session;
    use ratatui::backend::TestBackend;

    fn state(width: u16) -> (TuiState, mpsc::Receiver<UiMessage>) {
        let (tx, rx) = mpsc::channel(32);
        (TuiState::new(PostConfig::default(), Theme::dark(), width, tx), rx)
    }

    fn screen(state: &mut TuiState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| state.render(frame)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..height {
            let mut x = 0;
            while x < width {
                let symbol = buffer[(x, y)].symbol();
                text.push_str(symbol);
                // Wide glyphs cover the following cell
                x += Span::raw(symbol).width().max(1) as u16;
            }
            text.push('\n');
        }
        text
    }

    async fn type_text(state: &mut TuiState, text: &str) {
        for c in text.chars() {
            state.handle_action(Action::Char(c), 80).await;
        }
    }

    #[tokio::test]
    async fn test_invalid_url_shows_hint_and_does_not_submit() {
        let (mut state, mut rx) = state(120);
        type_text(&mut state, "https://vimeo.com/1").await;
        assert_eq!(state.input.hint(), Some(INVALID_URL_HINT));

        state.handle_action(Action::Submit, 80).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_valid_url_submits_trimmed() {
        let (mut state, mut rx) = state(120);
        state
            .handle_action(Action::Paste("  https://youtu.be/abc  ".into()), 80)
            .await;
        assert_eq!(state.input.hint(), None);
        state.handle_action(Action::Submit, 80).await;
        assert_eq!(
            rx.try_recv().unwrap(),
            UiMessage::Submit("https://youtu.be/abc".into())
        );
    }

    #[tokio::test]
    async fn test_long_url_scrolls_within_field() {
        let (mut state, _rx) = state(120);
        let url = format!(
            "https://www.youtube.com/watch?v=abcdefghijk&list={}&index=3&END",
            "P".repeat(20)
        );
        for c in url.chars() {
            state.handle_action(Action::Char(c), 120).await;
        }

        let text = screen(&mut state, 120, 30);
        assert!(text.contains("index=3&END"), "cursor end of the URL stays visible");
        assert!(!text.contains("https://www"), "head of the URL scrolled out");
    }

    #[tokio::test]
    async fn test_submit_ignored_while_loading() {
        let (mut state, mut rx) = state(60);
        type_text(&mut state, "https://youtu.be/abc").await;
        state.begin_loading(false);

        state.handle_action(Action::Submit, 60).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_resize_behind_upgrade_dialog_updates_sidebar() {
        let (mut state, _rx) = state(120);
        state.upgrade_open = true;
        assert!(state.sidebar.is_open());

        state.handle_action(Action::Resize(80), 80).await;
        assert!(!state.sidebar.is_open());
        assert!(state.upgrade_open);
    }

    #[tokio::test]
    async fn test_option_picker_changes_tone() {
        let (mut state, _rx) = state(60);
        state.handle_action(Action::Tab, 80).await; // post type
        state.handle_action(Action::Tab, 80).await; // tone
        assert_eq!(state.focus, Focus::Option(OptionKind::Tone));

        state.handle_action(Action::Submit, 80).await;
        assert!(state.picker.visible);
        state.handle_action(Action::Down, 80).await;
        state.handle_action(Action::Submit, 80).await;
        assert!(!state.picker.visible);
        assert_eq!(state.post.tone, utsusu_core::Tone::Normal);
    }

    #[tokio::test]
    async fn test_sidebar_follows_breakpoint_and_toggle() {
        let (mut state, _rx) = state(120);
        assert!(state.sidebar.is_open());
        state.handle_action(Action::ToggleSidebar, 120).await;
        assert!(!state.sidebar.is_open());
        // Same side of the breakpoint: manual choice holds
        state.handle_action(Action::Resize(130), 130).await;
        assert!(!state.sidebar.is_open());
        state.handle_action(Action::Resize(80), 80).await;
        state.handle_action(Action::Resize(100), 100).await;
        assert!(state.sidebar.is_open());
    }

    #[tokio::test]
    async fn test_result_keys_send_copy_and_titles() {
        let mut session = fast_session(1);
        session
            .submit("https://youtu.be/abc", PostConfig::default())
            .await
            .unwrap();
        let (mut state, mut rx) = state(80);
        state.sync(&session);
        assert_eq!(state.focus, Focus::Posts);

        state.handle_action(Action::Down, 80).await;
        state.handle_action(Action::Char('c'), 80).await;
        assert_eq!(rx.try_recv().unwrap(), UiMessage::Copy(CopyTarget::Thread(1)));

        state.handle_action(Action::Tab, 80).await;
        assert_eq!(state.focus, Focus::Titles);
        state.handle_action(Action::Down, 80).await;
        assert_eq!(rx.try_recv().unwrap(), UiMessage::SelectTitle(1));

        state.handle_action(Action::Char('r'), 80).await;
        assert_eq!(rx.try_recv().unwrap(), UiMessage::Regenerate);
    }

    #[tokio::test]
    async fn test_upgrade_overlay_captures_keys() {
        let mut session = fast_session(0);
        let err = session
            .submit("https://youtu.be/abc", PostConfig::default())
            .await
            .unwrap_err();
        assert!(err.requires_upgrade());

        let (mut state, mut rx) = state(120);
        state.sync(&session);
        assert!(state.upgrade_open);

        let text = screen(&mut state, 120, 30);
        assert!(text.contains("登録する"));
        assert!(text.contains("月30動画まで"));

        state.handle_action(Action::Char('x'), 80).await;
        assert_eq!(state.input.content(), "");
        state.handle_action(Action::Right, 80).await;
        state.handle_action(Action::Submit, 80).await;
        assert_eq!(rx.try_recv().unwrap(), UiMessage::DismissUpgrade);
    }

    #[test]
    fn test_loading_view_tracks_phase() {
        let (mut state, _rx) = state(60);
        state.begin_loading(false);
        state.handle_generation_event(GenerationEvent::PhaseStarted {
            phase: Phase::OrganizingNarrative,
            index: 1,
            total: 3,
        });
        assert_eq!(
            state.view_state(),
            ViewState::Loading {
                phase: Some(Phase::OrganizingNarrative)
            }
        );
        let text = screen(&mut state, 60, 20);
        assert!(text.contains("2/3"));

        state.end_loading();
        assert_eq!(state.view_state(), ViewState::Input);
    }

    #[tokio::test]
    async fn test_result_screen_renders_posts() {
        let mut session = fast_session(1);
        session
            .submit("https://youtu.be/abc", PostConfig::default())
            .await
            .unwrap();
        let (mut state, _rx) = state(120);
        state.sync(&session);

        let text = screen(&mut state, 120, 40);
        assert!(text.contains("動画 abc"));
        assert!(text.contains("まとめてコピー"));
        assert!(text.contains("01"));
    }
}
