//! /type, /tone and /emoji

use super::CommandResult;
use utsusu_core::{EmojiUsage, PostConfig, PostType, Tone};

/// Which post option a command or picker edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    PostType,
    Tone,
    Emoji,
}

impl OptionKind {
    pub const ALL: [OptionKind; 3] = [OptionKind::PostType, OptionKind::Tone, OptionKind::Emoji];

    /// Heading shown on the picker
    pub fn title(self) -> &'static str {
        match self {
            OptionKind::PostType => "投稿タイプ",
            OptionKind::Tone => "トーン",
            OptionKind::Emoji => "絵文字",
        }
    }

    /// `(key, label)` for every choice, in display order
    pub fn choices(self) -> Vec<(&'static str, &'static str)> {
        match self {
            OptionKind::PostType => PostType::ALL.iter().map(|v| (v.key(), v.label())).collect(),
            OptionKind::Tone => Tone::ALL.iter().map(|v| (v.key(), v.label())).collect(),
            OptionKind::Emoji => EmojiUsage::ALL.iter().map(|v| (v.key(), v.label())).collect(),
        }
    }

    /// Index of the value `post` currently uses
    pub fn current_index(self, post: PostConfig) -> usize {
        let found = match self {
            OptionKind::PostType => PostType::ALL.iter().position(|v| *v == post.post_type),
            OptionKind::Tone => Tone::ALL.iter().position(|v| *v == post.tone),
            OptionKind::Emoji => EmojiUsage::ALL.iter().position(|v| *v == post.emoji),
        };
        found.unwrap_or(0)
    }

    /// `post` with this option set to the choice at `index`
    pub fn apply(self, post: PostConfig, index: usize) -> PostConfig {
        let mut next = post;
        match self {
            OptionKind::PostType => {
                if let Some(v) = PostType::ALL.get(index) {
                    next.post_type = *v;
                }
            }
            OptionKind::Tone => {
                if let Some(v) = Tone::ALL.get(index) {
                    next.tone = *v;
                }
            }
            OptionKind::Emoji => {
                if let Some(v) = EmojiUsage::ALL.get(index) {
                    next.emoji = *v;
                }
            }
        }
        next
    }
}

pub struct OptionsCommand;

impl OptionsCommand {
    /// With no argument list the choices; otherwise switch to the named one
    pub fn execute(kind: OptionKind, args: &str, post: PostConfig) -> CommandResult {
        let choices = kind.choices();
        if args.is_empty() {
            let current = kind.current_index(post);
            let mut output = format!("{}:\n", kind.title());
            for (i, (key, label)) in choices.iter().enumerate() {
                let marker = if i == current { "●" } else { " " };
                output.push_str(&format!("  {} {:<9} {}\n", marker, key, label));
            }
            return CommandResult::Message(output.trim_end().to_string());
        }

        let wanted = args.to_lowercase();
        match choices.iter().position(|(key, _)| *key == wanted) {
            Some(index) => CommandResult::ChangeOptions(kind.apply(post, index)),
            None => {
                let keys: Vec<&str> = choices.iter().map(|(key, _)| *key).collect();
                CommandResult::Message(format!(
                    "{} は {} から選んでください",
                    kind.title(),
                    keys.join(" / ")
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_tone() {
        let post = PostConfig::default();
        match OptionsCommand::execute(OptionKind::Tone, "Biz", post) {
            CommandResult::ChangeOptions(next) => {
                assert_eq!(next.tone, Tone::Biz);
                assert_eq!(next.post_type, post.post_type);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_listing_marks_current() {
        let post = PostConfig::new(PostType::Story, Tone::Soft, EmojiUsage::Off);
        let CommandResult::Message(text) = OptionsCommand::execute(OptionKind::PostType, "", post)
        else {
            panic!("expected a listing");
        };
        let story = text.lines().find(|l| l.contains("story")).unwrap();
        assert!(story.contains('●'));
    }

    #[test]
    fn test_unknown_choice() {
        assert!(matches!(
            OptionsCommand::execute(OptionKind::Emoji, "maybe", PostConfig::default()),
            CommandResult::Message(_)
        ));
    }

    #[test]
    fn test_apply_out_of_range_keeps_value() {
        let post = PostConfig::default();
        assert_eq!(OptionKind::Emoji.apply(post, 7), post);
    }
}
