//! Local timers for the guided record-and-infer workflow.
//!
//! The workflow stage itself lives in the document and is driven by the
//! server. This only owns the countdown timer that asks for `recording`
//! and the display values derived from stage timing.

use std::time::Duration;

use instant::Instant;
use mixconsole_types::mixer::{COUNTDOWN_SECONDS, ESTIMATED_INFERENCE_SECONDS, RECORDING_SECONDS};
use mixconsole_types::InferencingState;

use crate::store::MixerStore;

const COUNTDOWN: Duration = Duration::from_secs(COUNTDOWN_SECONDS);
const TOTAL_SECONDS: f64 =
    (COUNTDOWN_SECONDS + RECORDING_SECONDS + ESTIMATED_INFERENCE_SECONDS) as f64;

#[derive(Debug, Default)]
pub struct InferenceWorkflow {
    /// Running countdown timer, started locally.
    countdown_started: Option<Instant>,
    /// Last stage seen in the document and when it was entered.
    observed: InferencingState,
    stage_entered: Option<Instant>,
}

impl InferenceWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for `countdown` and start the local timer if the store accepts it.
    pub fn start(&mut self, store: &mut MixerStore, now: Instant) -> bool {
        if !store.set_inferencing_state(InferencingState::Countdown) {
            return false;
        }
        tracing::info!("Inference countdown started");
        self.countdown_started = Some(now);
        self.observe(InferencingState::Countdown, now);
        true
    }

    /// Track stage changes and request `recording` once the countdown ends.
    pub fn tick(&mut self, store: &mut MixerStore, now: Instant) {
        let stage = store.document().inferencing_state;
        self.observe(stage, now);

        if stage != InferencingState::Countdown {
            if self.countdown_started.take().is_some() {
                tracing::debug!("Countdown cancelled, stage is now {}", stage);
            }
            return;
        }

        if let Some(started) = self.countdown_started {
            if now >= started + COUNTDOWN {
                self.countdown_started = None;
                store.set_inferencing_state(InferencingState::Recording);
            }
        }
    }

    /// Whole seconds left on the countdown, for display.
    pub fn countdown_remaining(&self, now: Instant) -> Option<u64> {
        let started = self.countdown_started?;
        let left = (started + COUNTDOWN).saturating_duration_since(now);
        Some(left.as_secs() + u64::from(left.subsec_nanos() > 0))
    }

    /// Cosmetic progress in percent, from elapsed time in the current stage.
    pub fn progress(&self, now: Instant) -> f32 {
        let elapsed = self
            .stage_entered
            .map(|entered| now.saturating_duration_since(entered).as_secs_f64())
            .unwrap_or(0.0);

        let seconds = match self.observed {
            InferencingState::Idle => 0.0,
            InferencingState::Countdown => elapsed.min(COUNTDOWN_SECONDS as f64),
            InferencingState::Recording => {
                COUNTDOWN_SECONDS as f64 + elapsed.min(RECORDING_SECONDS as f64)
            }
            InferencingState::Inferencing => {
                (COUNTDOWN_SECONDS + RECORDING_SECONDS) as f64
                    + elapsed.min(ESTIMATED_INFERENCE_SECONDS as f64)
            }
        };
        (seconds / TOTAL_SECONDS * 100.0) as f32
    }

    /// When [`InferenceWorkflow::tick`] next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.countdown_started.map(|started| started + COUNTDOWN)
    }

    /// Whether the progress display is still moving.
    pub fn is_animating(&self) -> bool {
        self.observed != InferencingState::Idle
    }

    /// Drop local timers. The document stage is left alone.
    pub fn teardown(&mut self) {
        self.countdown_started = None;
    }

    fn observe(&mut self, stage: InferencingState, now: Instant) {
        if stage != self.observed || self.stage_entered.is_none() {
            self.observed = stage;
            self.stage_entered = Some(now);
        }
    }
}
