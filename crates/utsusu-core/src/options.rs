//! The three choices a user makes before converting a video.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// What kind of post the video becomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    /// Explanation / lessons learned
    #[default]
    Learning,
    /// Personal experience
    Story,
    /// Know-how sharing
    HowTo,
}

/// Writing register of the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Soft,
    Normal,
    Biz,
}

/// Whether generated text may contain emoji
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmojiUsage {
    On,
    #[default]
    Off,
}

impl PostType {
    pub const ALL: [PostType; 3] = [PostType::Learning, PostType::Story, PostType::HowTo];

    pub fn key(self) -> &'static str {
        match self {
            PostType::Learning => "learning",
            PostType::Story => "story",
            PostType::HowTo => "howto",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PostType::Learning => "解説・学び",
            PostType::Story => "体験談",
            PostType::HowTo => "ノウハウ共有",
        }
    }
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Soft, Tone::Normal, Tone::Biz];

    pub fn key(self) -> &'static str {
        match self {
            Tone::Soft => "soft",
            Tone::Normal => "normal",
            Tone::Biz => "biz",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tone::Soft => "やわらか",
            Tone::Normal => "普通",
            Tone::Biz => "ビジネス",
        }
    }
}

impl EmojiUsage {
    pub const ALL: [EmojiUsage; 2] = [EmojiUsage::On, EmojiUsage::Off];

    pub fn key(self) -> &'static str {
        match self {
            EmojiUsage::On => "on",
            EmojiUsage::Off => "off",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EmojiUsage::On => "絵文字あり",
            EmojiUsage::Off => "絵文字なし",
        }
    }
}

fn parse_key<T: Copy>(all: &[T], key: fn(T) -> &'static str, s: &str, what: &str) -> Result<T, Error> {
    let wanted = s.trim().to_lowercase();
    all.iter()
        .copied()
        .find(|v| key(*v) == wanted)
        .ok_or_else(|| Error::InvalidInput(format!("unknown {}: {}", what, s)))
}

impl FromStr for PostType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(&Self::ALL, Self::key, s, "post type")
    }
}

impl FromStr for Tone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(&Self::ALL, Self::key, s, "tone")
    }
}

impl FromStr for EmojiUsage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(&Self::ALL, Self::key, s, "emoji setting")
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for EmojiUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Post type, tone and emoji choice, passed to every generator call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PostConfig {
    pub post_type: PostType,
    pub tone: Tone,
    pub emoji: EmojiUsage,
}

impl PostConfig {
    pub fn new(post_type: PostType, tone: Tone, emoji: EmojiUsage) -> Self {
        Self {
            post_type,
            tone,
            emoji,
        }
    }
}

impl fmt::Display for PostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} — {} — {}", self.post_type, self.tone, self.emoji)
    }
}
