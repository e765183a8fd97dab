//! Presentation state derived from the session, independent of any renderer.

use std::time::{Duration, Instant};

use crate::phase::Phase;
use crate::record::RecordId;

/// How long a "copied" acknowledgement stays visible
pub const COPY_FEEDBACK: Duration = Duration::from_millis(1500);

/// Width (in terminal columns) from which the layout counts as wide
pub const WIDE_BREAKPOINT_COLUMNS: u16 = 96;

/// The main area shows exactly one of these
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// URL form
    Input,
    /// A generation or regenerate is in flight
    Loading { phase: Option<Phase> },
    /// A record is on screen
    Result { record_id: RecordId },
}

impl ViewState {
    /// Loading wins over everything; otherwise the active record decides.
    pub fn derive(loading: bool, phase: Option<Phase>, active: Option<RecordId>) -> Self {
        if loading {
            return ViewState::Loading { phase };
        }
        match active {
            Some(record_id) => ViewState::Result { record_id },
            None => ViewState::Input,
        }
    }

    /// Whether the submit action is offered
    pub fn accepts_submit(&self) -> bool {
        matches!(self, ViewState::Input)
    }
}

/// Main view plus the upgrade overlay, which can sit on top of it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View {
    pub state: ViewState,
    pub upgrade_prompt: bool,
}

/// Something that can be copied from the result view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CopyTarget {
    AllThreads,
    Thread(usize),
    Article,
}

/// Remembers the last copy so its button can say "copied" for a moment.
#[derive(Debug, Clone, Default)]
pub struct CopyFeedback {
    last: Option<(CopyTarget, Instant)>,
}

impl CopyFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copied(&mut self, target: CopyTarget, at: Instant) {
        self.last = Some((target, at));
    }

    /// Whether `target` should show the acknowledgement at `now`
    pub fn is_showing(&self, target: CopyTarget, now: Instant) -> bool {
        match self.last {
            Some((t, at)) => t == target && now.saturating_duration_since(at) < COPY_FEEDBACK,
            None => false,
        }
    }
}

/// Whether a viewport of `columns` counts as wide
pub fn is_wide(columns: u16) -> bool {
    columns >= WIDE_BREAKPOINT_COLUMNS
}

/// Open/closed state of the history sidebar.
///
/// Follows the breakpoint whenever it is crossed; manual toggles hold until
/// the next crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SidebarState {
    open: bool,
    wide: Option<bool>,
}

impl SidebarState {
    pub fn for_width(columns: u16) -> Self {
        let wide = is_wide(columns);
        Self {
            open: wide,
            wide: Some(wide),
        }
    }

    /// Report the current viewport width
    pub fn sync(&mut self, columns: u16) {
        let wide = is_wide(columns);
        if self.wide != Some(wide) {
            self.wide = Some(wide);
            self.open = wide;
        }
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_state_derivation() {
        let id = RecordId(1);
        assert_eq!(ViewState::derive(false, None, None), ViewState::Input);
        assert_eq!(
            ViewState::derive(false, None, Some(id)),
            ViewState::Result { record_id: id }
        );
        assert_eq!(
            ViewState::derive(true, Some(Phase::ReadingContent), Some(id)),
            ViewState::Loading {
                phase: Some(Phase::ReadingContent)
            }
        );
        assert!(ViewState::Input.accepts_submit());
        assert!(!ViewState::Loading { phase: None }.accepts_submit());
    }

    #[test]
    fn test_copy_feedback_expires() {
        let start = Instant::now();
        let mut feedback = CopyFeedback::new();
        feedback.copied(CopyTarget::Thread(2), start);
        assert!(feedback.is_showing(CopyTarget::Thread(2), start + Duration::from_millis(1000)));
        assert!(!feedback.is_showing(CopyTarget::Thread(1), start));
        assert!(!feedback.is_showing(CopyTarget::Thread(2), start + COPY_FEEDBACK));
    }

    #[test]
    fn test_copy_feedback_latest_target_wins() {
        let start = Instant::now();
        let mut feedback = CopyFeedback::new();
        feedback.copied(CopyTarget::AllThreads, start);
        feedback.copied(CopyTarget::Article, start);
        assert!(feedback.is_showing(CopyTarget::Article, start));
        assert!(!feedback.is_showing(CopyTarget::AllThreads, start));
    }

    #[test]
    fn test_sidebar_follows_breakpoint_crossings() {
        let mut sidebar = SidebarState::for_width(120);
        assert!(sidebar.is_open());
        sidebar.toggle();
        sidebar.sync(110);
        assert!(!sidebar.is_open(), "still wide, manual toggle holds");
        sidebar.sync(80);
        assert!(!sidebar.is_open());
        sidebar.toggle();
        assert!(sidebar.is_open());
        sidebar.sync(100);
        assert!(sidebar.is_open());
        sidebar.sync(60);
        assert!(!sidebar.is_open());
    }
}
