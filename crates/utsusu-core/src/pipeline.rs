//! Phased generation: validated URL in, conversion record out.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::{
    clock::Clock,
    error::{Error, Result},
    events::GenerationEvent,
    generator::Generator,
    handle::{GenerationHandle, RunGuard},
    options::PostConfig,
    phase::Phase,
    record::{ConversionRecord, Draft, RecordIdGenerator},
    source::VideoSource,
};

/// How long each phase stays on screen
pub const DEFAULT_PHASE_HOLD: Duration = Duration::from_millis(1200);

/// How long a regenerate stays on screen
pub const DEFAULT_REGENERATE_HOLD: Duration = Duration::from_millis(1500);

/// Pipeline timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Minimum time each phase is held
    pub phase_hold: Duration,
    /// Minimum time a regenerate is held
    pub regenerate_hold: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            phase_hold: DEFAULT_PHASE_HOLD,
            regenerate_hold: DEFAULT_REGENERATE_HOLD,
        }
    }
}

/// Runs conversions one at a time, emitting an event per phase transition
pub struct Pipeline {
    config: PipelineConfig,
    generator: Arc<dyn Generator>,
    clock: Arc<dyn Clock>,
    event_tx: broadcast::Sender<GenerationEvent>,
    handle: GenerationHandle,
    ids: Mutex<RecordIdGenerator>,
}

impl Pipeline {
    /// Create a new pipeline
    pub fn new(config: PipelineConfig, generator: Arc<dyn Generator>, clock: Arc<dyn Clock>) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            config,
            generator,
            clock,
            event_tx,
            handle: GenerationHandle::new(),
            ids: Mutex::new(RecordIdGenerator::new()),
        }
    }

    /// Subscribe to generation events
    pub fn subscribe(&self) -> broadcast::Receiver<GenerationEvent> {
        self.event_tx.subscribe()
    }

    /// Get a cloneable handle for aborting and observing from outside
    pub fn handle(&self) -> GenerationHandle {
        self.handle.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    pub fn current_phase(&self) -> Option<Phase> {
        self.handle.current_phase()
    }

    /// Abort the current run
    pub fn abort(&self) {
        self.handle.abort();
    }

    fn emit(&self, event: GenerationEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Run all phases for `source` and build the record.
    ///
    /// Fails with [`Error::Busy`] if another run is in flight. Nothing is
    /// returned until every phase has finished.
    pub async fn generate(&self, source: &VideoSource, post: &PostConfig) -> Result<ConversionRecord> {
        let guard = self.handle.begin()?;
        tracing::debug!(url = source.url(), config = %post, "Generation started");
        self.emit(GenerationEvent::Started {
            source_url: source.url().to_string(),
        });

        let result = self.run_phases(&guard, source, post).await;
        self.finish(&result.as_ref().map(|r| r.id()));
        result
    }

    fn finish(&self, outcome: &std::result::Result<crate::record::RecordId, &Error>) {
        match outcome {
            Ok(record_id) => {
                self.emit(GenerationEvent::Completed {
                    record_id: *record_id,
                });
            }
            Err(Error::Cancelled) => {
                tracing::debug!("Generation cancelled");
                self.emit(GenerationEvent::Cancelled);
            }
            Err(e) => {
                tracing::warn!("Generation failed: {}", e);
                self.emit(GenerationEvent::Failed {
                    message: e.to_string(),
                });
            }
        }
    }

    async fn run_phases(
        &self,
        guard: &RunGuard,
        source: &VideoSource,
        post: &PostConfig,
    ) -> Result<ConversionRecord> {
        let cancel = guard.token().clone();
        let hold = self.config.phase_hold;

        let transcript = self
            .hold_phase(
                guard,
                Phase::ReadingContent,
                hold,
                self.generator.fetch_transcript(source, cancel.clone()),
            )
            .await?;

        let outline = self
            .hold_phase(
                guard,
                Phase::OrganizingNarrative,
                hold,
                self.generator.outline(&transcript, post, cancel.clone()),
            )
            .await?;

        let draft = self
            .hold_phase(
                guard,
                Phase::FormattingForPosting,
                hold,
                self.generator.format(&outline, post, cancel),
            )
            .await?;

        self.build_record(source, draft)
    }

    fn build_record(&self, source: &VideoSource, draft: Draft) -> Result<ConversionRecord> {
        let now = self.clock.now();
        let id = self.ids.lock().next_id(now);
        ConversionRecord::new(id, source.url(), source.derived_title(), draft, now)
    }

    /// Enter `phase`, run `step` alongside the visible hold, and leave the
    /// phase once both are done. Cancellation wins over both.
    async fn hold_phase<T, F>(&self, guard: &RunGuard, phase: Phase, hold: Duration, step: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let token = guard.token();
        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        guard.enter(phase);
        tracing::debug!(phase = ?phase, "Entering phase");
        self.emit(GenerationEvent::PhaseStarted {
            phase,
            index: phase.index(),
            total: Phase::ALL.len(),
        });

        let work = async {
            let (out, ()) = tokio::join!(step, self.clock.sleep(hold));
            out
        };

        let out = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(Error::Cancelled),
            out = work => out.map_err(|e| classify(phase, e))?,
        };

        self.emit(GenerationEvent::PhaseFinished { phase });
        Ok(out)
    }

    /// Replay the formatting phase for an existing record.
    ///
    /// Returns the reworded draft, or `None` when the generator keeps the
    /// content as it is. Not subject to the usage gate.
    pub async fn regenerate(&self, record: &ConversionRecord, post: &PostConfig) -> Result<Option<Draft>> {
        let guard = self.handle.begin()?;
        let record_id = record.id();
        tracing::debug!(id = %record_id, "Regenerate started");
        self.emit(GenerationEvent::RegenerateStarted { record_id });

        let result = self
            .hold_phase(
                &guard,
                Phase::FormattingForPosting,
                self.config.regenerate_hold,
                self.generator.rephrase(record, post, guard.token().clone()),
            )
            .await;

        match &result {
            Ok(draft) => self.emit(GenerationEvent::RegenerateFinished {
                record_id,
                changed: draft.is_some(),
            }),
            Err(e) => self.finish(&Err(e)),
        }
        result
    }

    /// Build a fresh record from a reworded draft of `record`
    pub fn rebuild(&self, record: &ConversionRecord, draft: Draft) -> Result<ConversionRecord> {
        let now = self.clock.now();
        let id = self.ids.lock().next_id(now);
        ConversionRecord::new(id, record.source_url(), record.derived_title(), draft, now)
    }
}

/// Give collaborator errors the class of the phase they came from.
fn classify(phase: Phase, err: Error) -> Error {
    match err {
        Error::Cancelled | Error::UpstreamUnavailable(_) | Error::GenerationFailed(_) => err,
        other => match phase {
            Phase::ReadingContent => Error::UpstreamUnavailable(other.to_string()),
            Phase::OrganizingNarrative | Phase::FormattingForPosting => {
                Error::GenerationFailed(other.to_string())
            }
        },
    }
}
