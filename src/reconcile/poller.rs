//! Background task that keeps a [`SessionState`] in sync with the server.
//!
//! One task owns the state. Commands from the caller, poll ticks and
//! finished requests are handled one at a time in a `select!` loop, and
//! every change is published on a watch channel. Requests run in spawned
//! tasks so a slow response never blocks a meeting switch; when it lands it
//! goes through the same reducer and is dropped if its meeting is no longer
//! active.

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::state::{Event, Field, Outcome, SessionState};
use super::SessionClient;
use crate::summary::EditableSummary;

/// Time between background refreshes of the active meeting.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub enum Command {
    SwitchMeeting(String),
    EditTranscript(String),
    EditSummary(EditableSummary),
    Save(Field),
    Discard(Field),
    Refresh,
    Stop,
}

/// Caller side of a running session.
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow!("Session task has stopped"))
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// End the session and wait for the task to exit.
    pub async fn stop(self) -> Result<SessionState> {
        // The task may already be gone; joining below still reports panics.
        let _ = self.commands.send(Command::Stop).await;
        self.task.await.context("Session task panicked")?;
        Ok(self.state.borrow().clone())
    }
}

/// Start a session, optionally already focused on a meeting.
pub fn spawn_session(
    client: Arc<dyn SessionClient>,
    meeting_id: Option<String>,
    period: Duration,
) -> SessionHandle {
    let state = meeting_id.map(SessionState::new).unwrap_or_default();
    let (state_tx, state_rx) = watch::channel(state.clone());
    let (command_tx, command_rx) = mpsc::channel(32);

    let task = tokio::spawn(run_session(client, state, command_rx, state_tx, period));

    SessionHandle {
        commands: command_tx,
        state: state_rx,
        task,
    }
}

async fn run_session(
    client: Arc<dyn SessionClient>,
    mut state: SessionState,
    mut commands: mpsc::Receiver<Command>,
    publish: watch::Sender<SessionState>,
    period: Duration,
) {
    let (done_tx, mut done) = mpsc::unbounded_channel::<Event>();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Meeting whose refresh is currently outstanding.
    let mut in_flight: Option<String> = None;

    loop {
        let polling = state.active_meeting_id().is_some();

        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                match command {
                    Command::Stop => {
                        state.apply(Event::EndSession);
                        publish.send_replace(state.clone());
                        break;
                    }
                    Command::SwitchMeeting(meeting_id) => {
                        info!("Switching session to meeting {}", meeting_id);
                        state.apply(Event::SwitchMeeting(meeting_id.clone()));
                        ticker.reset();
                        spawn_refresh(&client, &done_tx, meeting_id.clone());
                        in_flight = Some(meeting_id);
                    }
                    Command::Refresh => {
                        if let Some(meeting_id) = state.active_meeting_id().map(str::to_string) {
                            spawn_refresh(&client, &done_tx, meeting_id.clone());
                            in_flight = Some(meeting_id);
                        }
                    }
                    Command::EditTranscript(text) => {
                        state.apply(Event::EditTranscript(text));
                    }
                    Command::EditSummary(summary) => {
                        state.apply(Event::EditSummary(summary));
                    }
                    Command::Discard(field) => {
                        state.apply(Event::Discard(field));
                    }
                    Command::Save(field) => match state.pending_save(field) {
                        Some(request) => spawn_save(&client, &done_tx, request),
                        None => debug!("No unsaved {} changes", field.as_str()),
                    },
                }
                publish.send_replace(state.clone());
            }
            _ = ticker.tick(), if polling => {
                let Some(meeting_id) = state.active_meeting_id().map(str::to_string) else {
                    continue;
                };
                if in_flight.as_deref() == Some(meeting_id.as_str()) {
                    debug!("Refresh for {} still running, skipping tick", meeting_id);
                    continue;
                }
                spawn_refresh(&client, &done_tx, meeting_id.clone());
                in_flight = Some(meeting_id);
            }
            Some(event) = done.recv() => {
                if let Some(meeting_id) = refreshed_meeting(&event) {
                    if in_flight.as_deref() == Some(meeting_id) {
                        in_flight = None;
                    }
                }
                if state.apply(event) == Outcome::Stale {
                    debug!("Dropped response for inactive meeting");
                    continue;
                }
                publish.send_replace(state.clone());
            }
        }
    }

    debug!("Session task stopped");
}

fn refreshed_meeting(event: &Event) -> Option<&str> {
    match event {
        Event::RefreshCompleted(snapshot) => Some(&snapshot.meeting_id),
        Event::RefreshFailed { meeting_id, .. } => Some(meeting_id),
        _ => None,
    }
}

fn spawn_refresh(
    client: &Arc<dyn SessionClient>,
    done: &mpsc::UnboundedSender<Event>,
    meeting_id: String,
) {
    let client = client.clone();
    let done = done.clone();
    tokio::spawn(async move {
        let event = match client.fetch_status(&meeting_id).await {
            Ok(mut snapshot) => {
                // Tag with the requested meeting, whatever the server echoed.
                snapshot.meeting_id = meeting_id;
                Event::RefreshCompleted(snapshot)
            }
            Err(e) => {
                warn!("Refresh for {} failed: {:#}", meeting_id, e);
                Event::RefreshFailed {
                    meeting_id,
                    message: e.to_string(),
                }
            }
        };
        let _ = done.send(event);
    });
}

fn spawn_save(
    client: &Arc<dyn SessionClient>,
    done: &mpsc::UnboundedSender<Event>,
    request: super::SaveRequest,
) {
    let client = client.clone();
    let done = done.clone();
    tokio::spawn(async move {
        let meeting_id = request.meeting_id().to_string();
        let field = request.field();
        let event = match client.save(&request).await {
            Ok(()) => Event::SaveSucceeded { meeting_id, field },
            Err(e) => {
                warn!("Saving {} for {} failed: {:#}", field.as_str(), meeting_id, e);
                Event::SaveFailed {
                    meeting_id,
                    field,
                    message: e.to_string(),
                }
            }
        };
        let _ = done.send(event);
    });
}
