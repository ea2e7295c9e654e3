//! Client session state and its transitions.
//!
//! Every transition is a plain function over [`SessionState`]. Background
//! refreshes never overwrite a field the user is editing for the active
//! meeting, and responses for any other meeting are dropped whole.

use serde::{Deserialize, Serialize};

use crate::summary::{EditableSummary, SummaryResult};

/// Editable field groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Transcript,
    Summary,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transcript => "transcript",
            Self::Summary => "summary",
        }
    }
}

/// One editable value with the last server copy it was derived from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldState<T> {
    pub value: T,
    pub original: T,
    pub dirty: bool,
    pub dirty_owner: Option<String>,
}

impl<T: Clone + Default> FieldState<T> {
    /// True when a local edit for `meeting_id` must survive a refresh.
    pub fn is_protected_for(&self, meeting_id: &str) -> bool {
        self.dirty && self.dirty_owner.as_deref() == Some(meeting_id)
    }

    fn edit(&mut self, value: T, owner: &str) {
        self.value = value;
        self.dirty = true;
        self.dirty_owner = Some(owner.to_string());
    }

    fn accept_server(&mut self, value: T) {
        self.original = value.clone();
        self.value = value;
        self.dirty = false;
        self.dirty_owner = None;
    }

    fn commit(&mut self) {
        self.original = self.value.clone();
        self.dirty = false;
        self.dirty_owner = None;
    }

    fn discard(&mut self) {
        self.value = self.original.clone();
        self.dirty = false;
        self.dirty_owner = None;
    }
}

/// Server view of a meeting as returned by one refresh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusSnapshot {
    /// Meeting the refresh was requested for.
    pub meeting_id: String,
    /// Newest recording carrying a transcript, if any.
    pub transcript: Option<TranscriptSnapshot>,
    pub summary: Option<SummaryResult>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranscriptSnapshot {
    pub recording_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SwitchMeeting(String),
    EditTranscript(String),
    EditSummary(EditableSummary),
    RefreshCompleted(StatusSnapshot),
    RefreshFailed { meeting_id: String, message: String },
    SaveSucceeded { meeting_id: String, field: Field },
    SaveFailed { meeting_id: String, field: Field, message: String },
    Discard(Field),
    EndSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The event belonged to a meeting that is no longer active.
    Stale,
    /// Nothing to act on (no active meeting, or nothing to save).
    Ignored,
}

/// A write the session wants persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveRequest {
    Transcript {
        meeting_id: String,
        recording_id: String,
        text: String,
    },
    Summary {
        meeting_id: String,
        summary: SummaryResult,
    },
}

impl SaveRequest {
    pub fn field(&self) -> Field {
        match self {
            Self::Transcript { .. } => Field::Transcript,
            Self::Summary { .. } => Field::Summary,
        }
    }

    pub fn meeting_id(&self) -> &str {
        match self {
            Self::Transcript { meeting_id, .. } | Self::Summary { meeting_id, .. } => meeting_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    active_meeting_id: Option<String>,
    pub recording_id: Option<String>,
    pub transcript: FieldState<String>,
    pub summary: FieldState<Option<EditableSummary>>,
    /// Last failed save. Survives refreshes until a save succeeds or the
    /// edit is discarded.
    pub save_error: Option<String>,
    /// Last failed poll. Cleared by the next successful refresh.
    pub refresh_error: Option<String>,
    pub ended: bool,
}

impl SessionState {
    pub fn new(meeting_id: impl Into<String>) -> Self {
        let mut state = Self::default();
        state.switch_meeting(meeting_id.into());
        state
    }

    pub fn active_meeting_id(&self) -> Option<&str> {
        self.active_meeting_id.as_deref()
    }

    pub fn is_active(&self, meeting_id: &str) -> bool {
        self.active_meeting_id.as_deref() == Some(meeting_id)
    }

    /// Single entry point for all transitions.
    pub fn apply(&mut self, event: Event) -> Outcome {
        match event {
            Event::SwitchMeeting(meeting_id) => {
                self.switch_meeting(meeting_id);
                Outcome::Applied
            }
            Event::EditTranscript(text) => self.edit_transcript(text),
            Event::EditSummary(summary) => self.edit_summary(summary),
            Event::RefreshCompleted(snapshot) => self.apply_refresh(snapshot),
            Event::RefreshFailed { meeting_id, message } => {
                if !self.is_active(&meeting_id) {
                    return Outcome::Stale;
                }
                self.refresh_error = Some(message);
                Outcome::Applied
            }
            Event::SaveSucceeded { meeting_id, field } => self.save_succeeded(&meeting_id, field),
            Event::SaveFailed {
                meeting_id,
                field: _,
                message,
            } => {
                if !self.is_active(&meeting_id) {
                    return Outcome::Stale;
                }
                // The edit stays dirty so it can be retried.
                self.save_error = Some(message);
                Outcome::Applied
            }
            Event::Discard(field) => self.discard(field),
            Event::EndSession => {
                *self = Self {
                    ended: true,
                    ..Self::default()
                };
                Outcome::Applied
            }
        }
    }

    /// What a save of `field` would write, if there is an unsaved edit.
    pub fn pending_save(&self, field: Field) -> Option<SaveRequest> {
        let meeting_id = self.active_meeting_id.clone()?;

        match field {
            Field::Transcript => {
                if !self.transcript.dirty {
                    return None;
                }
                Some(SaveRequest::Transcript {
                    meeting_id,
                    recording_id: self.recording_id.clone()?,
                    text: self.transcript.value.clone(),
                })
            }
            Field::Summary => {
                if !self.summary.dirty {
                    return None;
                }
                let editable = self.summary.value.as_ref()?;
                Some(SaveRequest::Summary {
                    meeting_id,
                    summary: editable.to_summary(),
                })
            }
        }
    }

    fn switch_meeting(&mut self, meeting_id: String) {
        *self = Self {
            active_meeting_id: Some(meeting_id),
            ..Self::default()
        };
    }

    fn edit_transcript(&mut self, text: String) -> Outcome {
        let Some(owner) = self.active_meeting_id.clone() else {
            return Outcome::Ignored;
        };
        self.transcript.edit(text, &owner);
        Outcome::Applied
    }

    fn edit_summary(&mut self, summary: EditableSummary) -> Outcome {
        let Some(owner) = self.active_meeting_id.clone() else {
            return Outcome::Ignored;
        };
        self.summary.edit(Some(summary), &owner);
        Outcome::Applied
    }

    fn apply_refresh(&mut self, snapshot: StatusSnapshot) -> Outcome {
        if !self.is_active(&snapshot.meeting_id) {
            return Outcome::Stale;
        }
        let meeting_id = snapshot.meeting_id;

        self.refresh_error = None;

        if let Some(transcript) = snapshot.transcript {
            if !self.transcript.is_protected_for(&meeting_id) {
                self.transcript.accept_server(transcript.text);
                self.recording_id = Some(transcript.recording_id);
            }
        }

        if !self.summary.is_protected_for(&meeting_id) {
            let editable = snapshot
                .summary
                .as_ref()
                .filter(|summary| summary.has_text())
                .map(EditableSummary::from);
            self.summary.accept_server(editable);
        }

        Outcome::Applied
    }

    fn save_succeeded(&mut self, meeting_id: &str, field: Field) -> Outcome {
        if !self.is_active(meeting_id) {
            return Outcome::Stale;
        }
        match field {
            Field::Transcript => self.transcript.commit(),
            Field::Summary => self.summary.commit(),
        }
        self.save_error = None;
        Outcome::Applied
    }

    fn discard(&mut self, field: Field) -> Outcome {
        if self.active_meeting_id.is_none() {
            return Outcome::Ignored;
        }
        match field {
            Field::Transcript => self.transcript.discard(),
            Field::Summary => self.summary.discard(),
        }
        self.save_error = None;
        Outcome::Applied
    }
}
