//! Per-subject painting sessions.
//!
//! Each session owns a [`TransitionController`] inside a small tokio task.
//! Color requests arrive over a channel; the task is the controller's only
//! writer and arms a single deadline timer, re-armed on every request.
//! Readers see [`TransitionState`] snapshots through a watch channel.

use crate::error::ApiError;
use crate::models::SubjectId;
use factory_tint::{
    RequestOutcome, ResultGate, TargetColor, TransitionController, TransitionState,
};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Queue depth for pending color requests
const COMMAND_BUFFER: usize = 16;

enum Command {
    Request {
        color: TargetColor,
        reply: oneshot::Sender<TransitionState>,
    },
}

/// Handle to a running painting session
pub struct PaintingSession {
    subject_id: SubjectId,
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<TransitionState>,
    gate: ResultGate,
    task: JoinHandle<()>,
}

impl PaintingSession {
    /// Start a session displaying `initial`
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(subject_id: SubjectId, initial: TargetColor, delay: Duration) -> Self {
        let controller = TransitionController::with_delay(initial, delay);
        let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
        let (publisher, state) = watch::channel(controller.state());
        let task = tokio::spawn(run(subject_id.clone(), controller, receiver, publisher));

        tracing::debug!(
            subject = %subject_id,
            delay_ms = delay.as_millis() as u64,
            "Started painting session"
        );

        Self {
            subject_id,
            commands,
            state,
            gate: ResultGate::new(),
            task,
        }
    }

    pub fn subject_id(&self) -> &SubjectId {
        &self.subject_id
    }

    /// Ask for `color`; returns the state right after the request
    pub async fn request(&self, color: TargetColor) -> Result<TransitionState, ApiError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Request { color, reply })
            .await
            .map_err(|_| ApiError::Internal("painting session closed".to_string()))?;
        response
            .await
            .map_err(|_| ApiError::Internal("painting session closed".to_string()))
    }

    /// Latest published state
    pub fn state(&self) -> TransitionState {
        *self.state.borrow()
    }

    /// The color renders must use
    pub fn displayed(&self) -> TargetColor {
        self.state.borrow().displayed
    }

    /// Fraction of the painting delay elapsed right now
    pub fn progress(&self) -> f32 {
        self.state().progress(now())
    }

    /// Receiver notified whenever the state changes
    pub fn subscribe(&self) -> watch::Receiver<TransitionState> {
        self.state.clone()
    }

    /// Generation gate for this session's renders
    pub fn gate(&self) -> &ResultGate {
        &self.gate
    }

    /// Stop the session; a pending deadline never fires afterwards
    pub fn close(&self) {
        self.task.abort();
        self.gate.invalidate();
        tracing::debug!(subject = %self.subject_id, "Closed painting session");
    }
}

impl Drop for PaintingSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Current time on the tokio clock, as the controller's std instant
///
/// Follows tokio's paused clock in tests.
pub fn now() -> std::time::Instant {
    Instant::now().into_std()
}

async fn run(
    subject_id: SubjectId,
    mut controller: TransitionController,
    mut commands: mpsc::Receiver<Command>,
    publisher: watch::Sender<TransitionState>,
) {
    let mut timer: Option<(Instant, u64)> = None;

    loop {
        let armed = timer;
        let deadline = async move {
            match armed {
                Some((at, _)) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            command = commands.recv() => {
                let Some(Command::Request { color, reply }) = command else {
                    break;
                };
                let outcome = controller.request(color, now());
                if let RequestOutcome::Scheduled { deadline, epoch } = outcome {
                    timer = Some((Instant::from_std(deadline), epoch));
                }
                let state = controller.state();
                publisher.send_replace(state);
                // The requester may have gone away
                let _ = reply.send(state);
            }
            _ = deadline => {
                if let Some((_, epoch)) = timer.take() {
                    if let Some(color) = controller.fire(epoch) {
                        tracing::debug!(subject = %subject_id, color = %color, "Painting color");
                    }
                    publisher.send_replace(controller.state());
                }
            }
        }
    }

    controller.cancel();
    publisher.send_replace(controller.state());
}
