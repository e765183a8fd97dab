//! The collaborators a conversion calls out to.
//!
//! A real deployment backs [`Generator`] with a transcript service and a text
//! model. [`MockGenerator`] returns the fixed sample content of the demo.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::options::PostConfig;
use crate::record::{ConversionRecord, Draft};
use crate::source::VideoSource;

/// What was said in the video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: String,
    pub text: String,
}

/// The points worth posting, in narrative order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    pub points: Vec<String>,
}

/// External services behind the three phases.
///
/// Implementations should map transport problems of `fetch_transcript` to
/// `Error::UpstreamUnavailable` and failures of the text steps to
/// `Error::GenerationFailed`. The pipeline applies that mapping itself to any
/// other error kind.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Retrieve the transcript of the video
    async fn fetch_transcript(
        &self,
        source: &VideoSource,
        cancel: CancellationToken,
    ) -> Result<Transcript>;

    /// Organize the transcript into points
    async fn outline(
        &self,
        transcript: &Transcript,
        config: &PostConfig,
        cancel: CancellationToken,
    ) -> Result<Outline>;

    /// Write the thread, title options and article body
    async fn format(
        &self,
        outline: &Outline,
        config: &PostConfig,
        cancel: CancellationToken,
    ) -> Result<Draft>;

    /// Reword an existing record. `None` means the content stays as it is.
    async fn rephrase(
        &self,
        _record: &ConversionRecord,
        _config: &PostConfig,
        _cancel: CancellationToken,
    ) -> Result<Option<Draft>> {
        Ok(None)
    }
}

const SAMPLE_THREAD: &[&str] = &[
    "動画で話した内容を、投稿にうつすだけの話。結局いちばん時間がかかるのは書くことでした。",
    "今回の動画は、作業量を減らす工夫よりも、投稿の形を先に決めるだけでラクになる話です。",
    "ポイントは3つ。話した内容を整理する。X用に整える。note用に整える。判断はぜんぶこちらで。",
    "動画の流れを壊さずに、SNSで読まれる形だけに写します。最後に動画リンクも自然に入れました。",
];

const SAMPLE_TITLES: &[&str] = &[
    "動画を、投稿にうつす",
    "話した内容を、そのまま投稿に変える方法",
    "発信が続く人だけが知っている「書かない」技術",
];

const SAMPLE_BODY: &str = "動画の内容をSNS向けに書き換えるのが大変で、結局投稿が止まる。そんな悩みを抱える人は多いです。

先に「投稿の形」を決める

話した内容を整理して、Xとnoteに合わせて整える。それだけで、迷いが消えます。

まとめ

動画の熱量はそのままに、読みやすい投稿だけを残す。そうすることで、発信が続きます。";

/// Deterministic stand-in for the real services.
///
/// The post configuration is accepted and ignored; every call returns the
/// same sample content.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockGenerator;

impl MockGenerator {
    pub fn sample_draft() -> Draft {
        Draft {
            thread: SAMPLE_THREAD.iter().map(|s| s.to_string()).collect(),
            title_options: SAMPLE_TITLES.iter().map(|s| s.to_string()).collect(),
            body: SAMPLE_BODY.to_string(),
        }
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn fetch_transcript(
        &self,
        source: &VideoSource,
        _cancel: CancellationToken,
    ) -> Result<Transcript> {
        Ok(Transcript {
            video_id: source.video_id().to_string(),
            text: SAMPLE_THREAD.concat(),
        })
    }

    async fn outline(
        &self,
        _transcript: &Transcript,
        _config: &PostConfig,
        _cancel: CancellationToken,
    ) -> Result<Outline> {
        Ok(Outline {
            points: SAMPLE_THREAD.iter().map(|s| s.to_string()).collect(),
        })
    }

    async fn format(
        &self,
        _outline: &Outline,
        _config: &PostConfig,
        _cancel: CancellationToken,
    ) -> Result<Draft> {
        Ok(Self::sample_draft())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_draft_shape() {
        let draft = MockGenerator::sample_draft();
        assert_eq!(draft.thread.len(), 4);
        assert_eq!(draft.title_options.len(), 3);
        assert_eq!(draft.body.split("\n\n").count(), 5);
    }

    #[tokio::test]
    async fn test_mock_ignores_config() {
        use crate::options::{EmojiUsage, PostType, Tone};

        let generator = MockGenerator;
        let outline = Outline { points: vec![] };
        let a = generator
            .format(&outline, &PostConfig::default(), CancellationToken::new())
            .await
            .unwrap();
        let b = generator
            .format(
                &outline,
                &PostConfig::new(PostType::Story, Tone::Biz, EmojiUsage::On),
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_mock_transcript_carries_video_id() {
        let source = VideoSource::parse("https://youtu.be/abc123").unwrap();
        let transcript = MockGenerator
            .fetch_transcript(&source, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(transcript.video_id, "abc123");
    }
}
