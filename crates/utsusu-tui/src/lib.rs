//! utsusu-tui: Terminal UI components
//!
//! Widgets and terminal plumbing for the utsusu app, built on ratatui and
//! crossterm. Nothing here knows about conversions; the CLI wires it up.

pub mod input;
pub mod reveal;
pub mod terminal;
pub mod theme;
pub mod widgets;

pub use reveal::RevealTracker;
pub use terminal::TerminalSession;
pub use theme::Theme;
