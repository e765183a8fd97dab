//! Completed conversion results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Identifier of a conversion record, unique within a session.
///
/// Derived from the creation time in milliseconds; see [`RecordIdGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub(crate) i64);

impl RecordId {
    pub fn as_millis(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out time-based ids that never repeat, even when two records are
/// created within the same millisecond.
#[derive(Debug, Default)]
pub struct RecordIdGenerator {
    last: Option<i64>,
}

impl RecordIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, now: DateTime<Utc>) -> RecordId {
        let millis = now.timestamp_millis();
        let id = match self.last {
            Some(last) if millis <= last => last + 1,
            _ => millis,
        };
        self.last = Some(id);
        RecordId(id)
    }
}

/// Generated content before it is stamped with an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    /// Thread posts in order
    pub thread: Vec<String>,
    /// Candidate article titles
    pub title_options: Vec<String>,
    /// Article body, paragraphs separated by blank lines
    pub body: String,
}

/// One completed conversion. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRecord {
    id: RecordId,
    source_url: String,
    derived_title: String,
    thread_segments: Vec<String>,
    article_title_options: Vec<String>,
    article_body: String,
    created_at: DateTime<Utc>,
}

impl ConversionRecord {
    /// Build a record from a draft.
    ///
    /// Fails with [`Error::GenerationFailed`] when the draft has no thread
    /// segments or no title options.
    pub fn new(
        id: RecordId,
        source_url: impl Into<String>,
        derived_title: impl Into<String>,
        draft: Draft,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        if draft.thread.is_empty() {
            return Err(Error::GenerationFailed(
                "generated thread is empty".to_string(),
            ));
        }
        if draft.title_options.is_empty() {
            return Err(Error::GenerationFailed(
                "no article title was generated".to_string(),
            ));
        }
        Ok(Self {
            id,
            source_url: source_url.into(),
            derived_title: derived_title.into(),
            thread_segments: draft.thread,
            article_title_options: draft.title_options,
            article_body: draft.body,
            created_at,
        })
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn derived_title(&self) -> &str {
        &self.derived_title
    }

    pub fn thread_segments(&self) -> &[String] {
        &self.thread_segments
    }

    pub fn article_title_options(&self) -> &[String] {
        &self.article_title_options
    }

    pub fn article_body(&self) -> &str {
        &self.article_body
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Title option at `index`, if in range
    pub fn title(&self, index: usize) -> Option<&str> {
        self.article_title_options.get(index).map(String::as_str)
    }
}

/// Record with a three-title draft, for tests in sibling modules
#[cfg(test)]
pub(crate) fn sample_record(id: i64) -> ConversionRecord {
    use chrono::TimeZone;

    let draft = Draft {
        thread: vec!["first".into(), "second".into()],
        title_options: vec!["a".into(), "b".into(), "c".into()],
        body: "body".into(),
    };
    let created_at = Utc.timestamp_millis_opt(id).single().unwrap_or_default();
    ConversionRecord::new(
        RecordId(id),
        format!("https://youtu.be/video{}", id),
        format!("動画 video{}", id),
        draft,
        created_at,
    )
    .unwrap()
}
