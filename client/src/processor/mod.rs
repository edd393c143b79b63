//! Video processing view
//!
//! Drives one processing attempt from upload to result:
//!
//! ```text
//! processing ──ok──▶ good | bad ──submit──▶ history
//!      │
//!      └──err──▶ poor ──(delay)──▶ Retry event
//!
//! anomaly: reported externally, offers retry / exit only
//! ```
//!
//! While the request is outstanding a simulated progress bar ticks up to its
//! cap; the real result takes it to 100. On success a reward animation
//! plays (badge, then coins, then both hidden). State is published over a
//! watch channel and one-shot effects over an event channel, so any front
//! end can render it.
//!
//! Dropping the [`ProcessingHandle`] tears the view down: timers stop, the
//! in-flight request is abandoned and no further state is committed.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use form_coach_shared::{derive_posture, format_metrics_for_display, ProcessingMode, RewardPolicy};
use form_coach_shared::{WorkoutHistoryRecord, WorkoutResult};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::WorkoutBackend;
use crate::config::ProcessingConfig;
use crate::error::{ClientError, ClientResult};
use crate::history::HistoryStore;
use crate::progress::SimulatedProgress;
use crate::upload::VideoUpload;

mod state;

pub use state::{AnalysisOutcome, ProcessingResult, RewardOverlay, ViewEvent, ViewSnapshot};

/// Timings of the processing view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewTiming {
    pub tick_interval: Duration,
    pub progress_step: u8,
    pub progress_cap: u8,
    /// From result to badge overlay
    pub reward_delay: Duration,
    /// From badge overlay to coins overlay
    pub coins_delay: Duration,
    /// From badge overlay until both overlays hide
    pub overlay_duration: Duration,
    /// From failure to the retry navigation
    pub retry_delay: Duration,
}

impl Default for ViewTiming {
    fn default() -> Self {
        Self::from(&ProcessingConfig::default())
    }
}

impl From<&ProcessingConfig> for ViewTiming {
    fn from(config: &ProcessingConfig) -> Self {
        Self {
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            progress_step: config.progress_step,
            progress_cap: config.progress_cap,
            reward_delay: Duration::from_millis(config.reward_delay_ms),
            coins_delay: Duration::from_millis(config.coins_delay_ms),
            overlay_duration: Duration::from_millis(config.overlay_duration_ms),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Factory for processing views sharing one backend and history store
pub struct VideoProcessor<B: ?Sized> {
    backend: Arc<B>,
    history: HistoryStore,
    timing: ViewTiming,
    rewards: RewardPolicy,
}

impl<B> VideoProcessor<B>
where
    B: WorkoutBackend + ?Sized + 'static,
{
    pub fn new(backend: Arc<B>, history: HistoryStore) -> Self {
        Self {
            backend,
            history,
            timing: ViewTiming::default(),
            rewards: RewardPolicy::default(),
        }
    }

    pub fn with_timing(mut self, timing: ViewTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_rewards(mut self, rewards: RewardPolicy) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn timing(&self) -> &ViewTiming {
        &self.timing
    }

    /// Open a view for `video` and start processing it.
    ///
    /// Exactly one backend call is issued per view.
    pub fn start(&self, video: VideoUpload, activity_name: impl Into<String>) -> ProcessingHandle {
        let activity_name = activity_name.into();
        let (state_tx, _) = watch::channel(ViewSnapshot::processing(activity_name.clone()));
        let state = Arc::new(state_tx);
        let (events_tx, events) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let ctx = ViewContext {
            state: Arc::clone(&state),
            events: events_tx.clone(),
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(run_view(
            Arc::clone(&self.backend),
            video,
            activity_name,
            self.timing,
            ctx,
        ));

        ProcessingHandle {
            state,
            events_tx,
            events,
            cancel,
            task: Some(task),
            history: self.history.clone(),
            rewards: self.rewards.clone(),
        }
    }
}

/// A live processing view.
///
/// Dropping the handle tears the view down.
pub struct ProcessingHandle {
    state: Arc<watch::Sender<ViewSnapshot>>,
    events_tx: mpsc::UnboundedSender<ViewEvent>,
    events: mpsc::UnboundedReceiver<ViewEvent>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    history: HistoryStore,
    rewards: RewardPolicy,
}

impl ProcessingHandle {
    /// Current state of the view
    pub fn snapshot(&self) -> ViewSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.state.subscribe()
    }

    /// Next UI effect, in emission order
    pub async fn next_event(&mut self) -> Option<ViewEvent> {
        self.events.recv().await
    }

    /// UI effect already emitted, without waiting
    pub fn try_next_event(&mut self) -> Option<ViewEvent> {
        self.events.try_recv().ok()
    }

    /// Wait until the attempt has a result (success, failure or anomaly),
    /// or the view is torn down. In the latter case the last committed
    /// snapshot is returned, which may still be processing.
    pub async fn settled(&self) -> ViewSnapshot {
        let mut rx = self.subscribe();
        let settled = tokio::select! {
            biased;
            settled = rx.wait_for(ViewSnapshot::is_settled) => {
                settled.ok().map(|snapshot| snapshot.clone())
            }
            _ = self.cancel.cancelled() => None,
        };
        settled.unwrap_or_else(|| self.snapshot())
    }

    /// Coins the current result would earn on submission
    pub fn coins_on_offer(&self) -> Option<u32> {
        self.state
            .borrow()
            .result
            .as_ref()
            .and_then(ProcessingResult::outcome)
            .map(|o| self.rewards.coins_for(o.posture))
    }

    /// Save the analysed workout to history and report completion.
    ///
    /// Only available on the results screen (good or bad posture).
    pub async fn submit_workout(&self) -> ClientResult<WorkoutHistoryRecord> {
        if self.cancel.is_cancelled() {
            return Err(ClientError::InvalidState(
                "Workout view has been closed".to_string(),
            ));
        }

        let (activity_name, outcome) = {
            let snapshot = self.state.borrow();
            let outcome = snapshot
                .result
                .as_ref()
                .and_then(ProcessingResult::outcome)
                .cloned()
                .ok_or_else(|| {
                    ClientError::InvalidState(
                        "Workout can only be submitted once results are available".to_string(),
                    )
                })?;
            (snapshot.activity_name.clone(), outcome)
        };

        let record = self.rewards.history_record(
            &activity_name,
            outcome.posture,
            &outcome.metrics,
            &outcome.formatted_metrics,
            &outcome.video_url,
            Utc::now(),
        );
        self.history.append(&record).await?;

        let _ = self.events_tx.send(ViewEvent::Completed(record.clone()));
        Ok(record)
    }

    /// Show the anomaly screen with `message`, abandoning any outstanding work.
    ///
    /// Ignored once the view has been left; returns whether it was shown.
    pub fn report_anomaly(&self, message: impl Into<String>) -> bool {
        if self.cancel.is_cancelled() {
            debug!("anomaly reported after teardown, ignoring");
            return false;
        }

        let message = message.into();
        self.cancel.cancel();
        warn!(message = %message, "anomaly reported");

        self.state.send_modify(|s| {
            s.result = Some(ProcessingResult::Anomaly { message });
            s.overlay = RewardOverlay::hidden();
        });
        true
    }

    /// User asked to upload another video
    pub fn retry(&self) {
        self.cancel.cancel();
        let _ = self.events_tx.send(ViewEvent::Retry);
    }

    /// User left the workout
    pub fn back(&self) {
        self.cancel.cancel();
        let _ = self.events_tx.send(ViewEvent::Back);
    }

    /// Tear the view down and wait for its task to finish
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "processing view exited abnormally");
            }
        }
    }
}

impl Drop for ProcessingHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// The task's side of the view: every write is dropped once torn down
struct ViewContext {
    state: Arc<watch::Sender<ViewSnapshot>>,
    events: mpsc::UnboundedSender<ViewEvent>,
    cancel: CancellationToken,
}

impl ViewContext {
    /// Apply `update` unless the view is gone. Returns whether it was applied.
    fn commit(&self, update: impl FnOnce(&mut ViewSnapshot)) -> bool {
        let cancel = &self.cancel;
        self.state.send_if_modified(|snapshot| {
            if cancel.is_cancelled() {
                return false;
            }
            update(snapshot);
            true
        })
    }

    fn emit(&self, event: ViewEvent) {
        if !self.cancel.is_cancelled() {
            let _ = self.events.send(event);
        }
    }

    /// Sleep unless torn down first. Returns whether the view is still live.
    async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}

async fn run_view<B>(
    backend: Arc<B>,
    video: VideoUpload,
    activity_name: String,
    timing: ViewTiming,
    ctx: ViewContext,
) where
    B: WorkoutBackend + ?Sized,
{
    info!(activity = %activity_name, file = video.file_name(), "processing video");

    let mut progress = SimulatedProgress::new(timing.progress_step, timing.progress_cap);
    ctx.commit(|s| {
        s.progress = progress.value();
        s.result = None;
    });

    let mut ticker = tokio::time::interval_at(
        Instant::now() + timing.tick_interval,
        timing.tick_interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let request = backend.process_workout(video, &activity_name, ProcessingMode::Video);
    tokio::pin!(request);

    let response = loop {
        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => {
                debug!("view torn down while processing");
                return;
            }
            response = &mut request => break response,
            _ = ticker.tick(), if !progress.is_capped() => {
                if progress.advance() {
                    let value = progress.value();
                    ctx.commit(|s| s.progress = value);
                }
            }
        }
    };

    match response {
        Ok(result) => {
            progress.complete();
            show_results(result, &activity_name, progress.value(), timing, &ctx).await;
        }
        Err(e) => show_failure(e, timing, &ctx).await,
    }
}

async fn show_results(
    result: WorkoutResult,
    activity_name: &str,
    progress: u8,
    timing: ViewTiming,
    ctx: &ViewContext,
) {
    let formatted_metrics = format_metrics_for_display(&result.metrics, activity_name);
    let posture = derive_posture(&result.metrics);

    let outcome = AnalysisOutcome {
        session_id: result.session_id,
        posture,
        metrics: result.metrics,
        formatted_metrics,
        video_url: result.annotated_video_url,
        csv_url: result.csv_url,
    };
    info!(
        session_id = %outcome.session_id,
        posture = %posture,
        metrics = outcome.formatted_metrics.len(),
        "analysis ready"
    );

    let processed = ProcessingResult::from_outcome(outcome);
    if !ctx.commit(|s| {
        s.progress = progress;
        s.result = Some(processed);
    }) {
        return;
    }

    // Badge first, coins a little later, then both go away
    if !ctx.sleep(timing.reward_delay).await {
        return;
    }
    ctx.commit(|s| s.overlay.badge_visible = true);

    if !ctx.sleep(timing.coins_delay).await {
        return;
    }
    ctx.commit(|s| s.overlay.coins_visible = true);

    if !ctx.sleep(timing.overlay_duration.saturating_sub(timing.coins_delay)).await {
        return;
    }
    ctx.commit(|s| s.overlay = RewardOverlay::hidden());
}

async fn show_failure(error: ClientError, timing: ViewTiming, ctx: &ViewContext) {
    let message = error.user_message();
    warn!(error = %error, "workout processing failed");

    let failed = ProcessingResult::Poor {
        message: message.clone(),
    };
    if !ctx.commit(|s| s.result = Some(failed)) {
        return;
    }
    ctx.emit(ViewEvent::Toast(message));

    if ctx.sleep(timing.retry_delay).await {
        ctx.emit(ViewEvent::Retry);
    }
}
