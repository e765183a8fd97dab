//! Named steps of a conversion.

use serde::{Deserialize, Serialize};

/// One visible step of the generation pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Fetch what was said in the video
    ReadingContent,
    /// Reduce the transcript to the points worth posting
    OrganizingNarrative,
    /// Shape the points into a thread and an article
    FormattingForPosting,
}

impl Phase {
    pub const ALL: [Phase; 3] = [
        Phase::ReadingContent,
        Phase::OrganizingNarrative,
        Phase::FormattingForPosting,
    ];

    /// Zero-based position in [`Phase::ALL`]
    pub fn index(self) -> usize {
        match self {
            Phase::ReadingContent => 0,
            Phase::OrganizingNarrative => 1,
            Phase::FormattingForPosting => 2,
        }
    }

    /// Status line shown while the phase is running
    pub fn label(self) -> &'static str {
        match self {
            Phase::ReadingContent => "動画の内容を読み取っています",
            Phase::OrganizingNarrative => "話の流れを整理しています",
            Phase::FormattingForPosting => "投稿用に整えています",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_order() {
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
        }
    }
}
