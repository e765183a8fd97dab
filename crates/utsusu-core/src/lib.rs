//! utsusu-core: conversion sessions for turning a video into posts
//!
//! This crate holds the history of conversions, the free-trial gate, and the
//! phased pipeline that turns a video URL into an X thread and a note article.
//! External services sit behind the [`Generator`] trait and time behind
//! [`Clock`], so everything here runs deterministically under test.

pub mod clock;
pub mod error;
pub mod events;
pub mod format;
pub mod gate;
pub mod generator;
pub mod handle;
pub mod options;
pub mod phase;
pub mod pipeline;
pub mod record;
pub mod session;
pub mod source;
pub mod store;
pub mod view;

pub use clock::{Clock, SystemClock, VirtualClock};
pub use error::{Error, Result};
pub use events::GenerationEvent;
pub use gate::{FREE_LIMIT, GateLimits, MONTHLY_LIMIT, UsageGate, UsageSummary};
pub use generator::{Generator, MockGenerator, Outline, Transcript};
pub use handle::GenerationHandle;
pub use options::{EmojiUsage, PostConfig, PostType, Tone};
pub use phase::Phase;
pub use pipeline::{Pipeline, PipelineConfig};
pub use record::{ConversionRecord, Draft, RecordId};
pub use session::{Session, SessionOptions};
pub use source::VideoSource;
pub use store::SessionStore;
pub use view::{CopyFeedback, CopyTarget, SidebarState, View, ViewState};
