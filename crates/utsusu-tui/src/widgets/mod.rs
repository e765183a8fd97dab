//! Custom widgets for the TUI

pub mod dialog;
pub mod post_list;
pub mod selector;
pub mod spinner;
pub mod url_input;

pub use dialog::Dialog;
pub use post_list::{PostCard, PostList, TextBlock, TextBlocks};
pub use selector::{Selector, SelectorItem, SelectorState};
pub use spinner::PhaseSpinner;
pub use url_input::UrlInput;
