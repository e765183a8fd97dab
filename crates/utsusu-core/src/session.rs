//! The per-tab session: store, gate and pipeline behind one object.

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::{
    clock::{Clock, SystemClock},
    error::{Error, Result},
    events::GenerationEvent,
    gate::{GateLimits, UsageGate},
    generator::{Generator, MockGenerator},
    handle::GenerationHandle,
    options::PostConfig,
    pipeline::{Pipeline, PipelineConfig},
    record::{ConversionRecord, RecordId},
    source::VideoSource,
    store::SessionStore,
    view::{View, ViewState},
};

/// Knobs for a new session
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    pub limits: GateLimits,
    pub pipeline: PipelineConfig,
}

/// Everything one session owns. Created empty, dropped at the end of the
/// session; nothing is persisted.
pub struct Session {
    store: SessionStore,
    gate: UsageGate,
    pipeline: Pipeline,
    upgrade_prompt: bool,
}

impl Session {
    /// Create a session with explicit collaborators
    pub fn new(options: SessionOptions, generator: Arc<dyn Generator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: SessionStore::new(),
            gate: UsageGate::new(options.limits),
            pipeline: Pipeline::new(options.pipeline, generator, clock),
            upgrade_prompt: false,
        }
    }

    /// Session backed by the sample generator and real time
    pub fn demo(options: SessionOptions) -> Self {
        Self::new(options, Arc::new(MockGenerator), Arc::new(SystemClock))
    }

    /// Validate, check the gate, run the pipeline and commit the record.
    ///
    /// A denied gate opens the upgrade prompt and starts nothing. Usage is
    /// counted only when a record is committed.
    pub async fn submit(&mut self, url: &str, post: PostConfig) -> Result<RecordId> {
        let source = VideoSource::parse(url)?;

        if let Err(e) = self.gate.check() {
            self.upgrade_prompt = true;
            return Err(e);
        }

        let record = self.pipeline.generate(&source, &post).await?;
        let id = record.id();
        tracing::info!(id = %id, title = record.derived_title(), "Conversion committed");
        self.store.add_record(record);
        self.gate.record_usage();
        Ok(id)
    }

    /// Replay the last phase for the active record.
    ///
    /// Returns the id of a new record when the generator reworded the
    /// content, `None` when it stayed the same.
    pub async fn regenerate(&mut self, post: PostConfig) -> Result<Option<RecordId>> {
        let record = self.store.active().cloned().ok_or(Error::NoActiveRecord)?;
        match self.pipeline.regenerate(&record, &post).await? {
            Some(draft) => {
                let reworded = self.pipeline.rebuild(&record, draft)?;
                let id = reworded.id();
                self.store.add_record(reworded);
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    pub fn select_active(&mut self, id: RecordId) -> bool {
        self.store.select_active(id)
    }

    pub fn delete_record(&mut self, id: RecordId) -> bool {
        self.store.delete_record(id)
    }

    pub fn start_new(&mut self) {
        self.store.start_new();
    }

    pub fn select_title(&mut self, index: usize) -> bool {
        self.store.select_title(index)
    }

    pub fn open_upgrade_prompt(&mut self) {
        self.upgrade_prompt = true;
    }

    pub fn dismiss_upgrade_prompt(&mut self) {
        self.upgrade_prompt = false;
    }

    /// Subscribe from the upgrade prompt: grant the plan and close it.
    pub fn confirm_upgrade(&mut self) {
        self.gate.grant_entitlement();
        self.upgrade_prompt = false;
    }

    pub fn is_upgrade_prompt_open(&self) -> bool {
        self.upgrade_prompt
    }

    /// What the main area and overlay should show right now
    pub fn view(&self) -> View {
        View {
            state: ViewState::derive(
                self.pipeline.is_running(),
                self.pipeline.current_phase(),
                self.store.active_id(),
            ),
            upgrade_prompt: self.upgrade_prompt,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn gate(&self) -> &UsageGate {
        &self.gate
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn active(&self) -> Option<&ConversionRecord> {
        self.store.active()
    }

    /// Handle for aborting a run while `submit` holds the session
    pub fn handle(&self) -> GenerationHandle {
        self.pipeline.handle()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GenerationEvent> {
        self.pipeline.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;
    use crate::generator::{Outline, Transcript};
    use crate::record::Draft;
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    fn session() -> Session {
        Session::new(
            SessionOptions::default(),
            Arc::new(MockGenerator),
            Arc::new(VirtualClock::default()),
        )
    }

    const URL: &str = "https://www.youtube.com/watch?v=abc";

    #[tokio::test]
    async fn test_submit_commits_and_counts_usage() {
        let mut session = session();
        let id = session.submit(URL, PostConfig::default()).await.unwrap();
        assert_eq!(session.store().active_id(), Some(id));
        assert_eq!(session.gate().usage_count(), 1);
        assert_eq!(session.view().state, ViewState::Result { record_id: id });
    }

    #[tokio::test]
    async fn test_invalid_url_neither_runs_nor_counts() {
        let mut session = session();
        let err = session.submit("https://example.com", PostConfig::default()).await;
        assert!(matches!(err, Err(Error::InvalidInput(_))));
        assert_eq!(session.gate().usage_count(), 0);
        assert!(!session.is_upgrade_prompt_open());
    }

    #[tokio::test]
    async fn test_denied_gate_opens_prompt() {
        let mut session = session();
        session.submit(URL, PostConfig::default()).await.unwrap();
        session.start_new();

        let err = session.submit(URL, PostConfig::default()).await.unwrap_err();
        assert!(err.requires_upgrade());
        let view = session.view();
        assert_eq!(view.state, ViewState::Input);
        assert!(view.upgrade_prompt);
        assert_eq!(session.store().len(), 1);

        session.dismiss_upgrade_prompt();
        assert!(!session.view().upgrade_prompt);
    }

    #[tokio::test]
    async fn test_regenerate_keeps_record_and_usage() {
        let mut session = session();
        let id = session.submit(URL, PostConfig::default()).await.unwrap();
        let before = session.active().cloned();

        assert_eq!(session.regenerate(PostConfig::default()).await, Ok(None));
        assert_eq!(session.active().cloned(), before);
        assert_eq!(session.store().active_id(), Some(id));
        assert_eq!(session.gate().usage_count(), 1);
    }

    /// Sample content, except that `rephrase` rewrites the first post
    struct RephrasingGenerator;

    #[async_trait]
    impl Generator for RephrasingGenerator {
        async fn fetch_transcript(
            &self,
            source: &VideoSource,
            cancel: CancellationToken,
        ) -> Result<Transcript> {
            MockGenerator.fetch_transcript(source, cancel).await
        }

        async fn outline(
            &self,
            transcript: &Transcript,
            config: &PostConfig,
            cancel: CancellationToken,
        ) -> Result<Outline> {
            MockGenerator.outline(transcript, config, cancel).await
        }

        async fn format(
            &self,
            outline: &Outline,
            config: &PostConfig,
            cancel: CancellationToken,
        ) -> Result<Draft> {
            MockGenerator.format(outline, config, cancel).await
        }

        async fn rephrase(
            &self,
            record: &ConversionRecord,
            _config: &PostConfig,
            _cancel: CancellationToken,
        ) -> Result<Option<Draft>> {
            let mut thread = record.thread_segments().to_vec();
            thread[0] = "言い回しを変えた一文目。".to_string();
            Ok(Some(Draft {
                thread,
                title_options: record.article_title_options().to_vec(),
                body: record.article_body().to_string(),
            }))
        }
    }

    #[tokio::test]
    async fn test_reworded_regenerate_adds_new_active_record() {
        let mut session = Session::new(
            SessionOptions::default(),
            Arc::new(RephrasingGenerator),
            Arc::new(VirtualClock::default()),
        );
        let original_id = session.submit(URL, PostConfig::default()).await.unwrap();
        assert!(session.select_title(2));
        let original = session.active().cloned().unwrap();

        let new_id = session
            .regenerate(PostConfig::default())
            .await
            .unwrap()
            .expect("reworded record");

        assert_ne!(new_id, original_id);
        assert_eq!(session.store().len(), 2);
        assert_eq!(session.store().history()[0].id(), new_id);
        assert_eq!(session.store().active_id(), Some(new_id));
        assert_eq!(session.store().selected_title_index(), 0);
        assert_eq!(session.gate().usage_count(), 1);

        let reworded = session.active().unwrap();
        assert_eq!(reworded.thread_segments()[0], "言い回しを変えた一文目。");
        assert_eq!(reworded.source_url(), original.source_url());
        assert_eq!(session.store().get(original_id), Some(&original));
    }

    #[tokio::test]
    async fn test_regenerate_without_active_record() {
        let mut session = session();
        assert_eq!(
            session.regenerate(PostConfig::default()).await,
            Err(Error::NoActiveRecord)
        );
    }

    #[test]
    fn test_confirm_upgrade_closes_prompt() {
        let mut session = session();
        session.open_upgrade_prompt();
        session.confirm_upgrade();
        assert!(session.gate().is_paid());
        assert!(!session.is_upgrade_prompt_open());
    }
}
