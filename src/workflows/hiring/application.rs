use serde::Serialize;

use super::command::Command;
use super::domain::{Action, ApplicationId, ApplicationKind, Resolution, ReviewState};

/// Effects of one accepted `(state, action)` pair.
///
/// Every accepted transition also appends the command note, prefixed with the state the
/// application was in before the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: ReviewState,
    /// Copy the command's reviewer id onto the application.
    pub assigns_reviewer: bool,
    /// Overwrite the resolution with the command's (possibly empty) resolution.
    pub records_resolution: bool,
    /// Mark paperwork processed.
    pub processes_paperwork: bool,
}

impl Transition {
    fn to(next: ReviewState) -> Self {
        Self {
            next,
            assigns_reviewer: false,
            records_resolution: true,
            processes_paperwork: false,
        }
    }

    fn assigning_reviewer(mut self) -> Self {
        self.assigns_reviewer = true;
        self
    }

    fn processing_paperwork(mut self) -> Self {
        self.processes_paperwork = true;
        self
    }

    fn keeping_resolution(mut self) -> Self {
        self.records_resolution = false;
        self
    }
}

/// The review workflow table. `kind` only matters for ACCEPT out of Interview.
pub fn transition(
    state: ReviewState,
    kind: ApplicationKind,
    action: Action,
) -> Option<Transition> {
    use Action::{Accept, Reject, Reopen, Standby};
    use ReviewState::{Closed, Interview, Offer, RefCheck, Review, Waitlist};

    let outcome = match (state, action) {
        (Review, Accept) => Transition::to(Interview).assigning_reviewer(),
        (Review, Reject) => Transition::to(Closed),
        (Review, Standby) => Transition::to(Waitlist),

        (Interview, Accept) => match kind {
            ApplicationKind::New => Transition::to(RefCheck),
            ApplicationKind::Old => Transition::to(Offer).processing_paperwork(),
        },
        (Interview, Reject) => Transition::to(Closed),
        (Interview, Standby) => Transition::to(Waitlist),

        (Waitlist, Accept) => Transition::to(Offer).processing_paperwork(),
        (Waitlist, Reject) => Transition::to(Closed),
        (Waitlist, Reopen) => Transition::to(Interview).keeping_resolution(),

        (RefCheck, Accept) => Transition::to(Offer).processing_paperwork(),
        (RefCheck, Reject) => Transition::to(Closed),

        (Offer, Accept) | (Offer, Reject) => Transition::to(Closed),

        (Review | Interview, Reopen)
        | (Waitlist | RefCheck | Offer, Standby)
        | (RefCheck | Offer, Reopen)
        | (Closed, _) => return None,
    };

    Some(outcome)
}

/// A job application moving through the review workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    id: ApplicationId,
    kind: ApplicationKind,
    state: ReviewState,
    summary: String,
    reviewer: Option<String>,
    paperwork_processed: bool,
    resolution: Option<Resolution>,
    notes: Vec<String>,
}

/// Full field set used to rebuild an application from storage.
///
/// Notes are taken verbatim: they already carry their state prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationFields {
    pub id: ApplicationId,
    pub state: ReviewState,
    pub kind: ApplicationKind,
    pub summary: String,
    pub reviewer: Option<String>,
    pub paperwork_processed: bool,
    pub resolution: Option<Resolution>,
    pub notes: Vec<String>,
}

impl Application {
    /// Create a fresh application in `Review` with one initial note.
    pub fn new(
        id: ApplicationId,
        kind: ApplicationKind,
        summary: impl Into<String>,
        note: impl Into<String>,
    ) -> Result<Self, InvalidArgument> {
        let summary = summary.into();
        let note = note.into();

        if id.0 < 1 {
            return Err(InvalidArgument::ZeroId);
        }
        if summary.is_empty() {
            return Err(InvalidArgument::EmptySummary);
        }
        if note.is_empty() {
            return Err(InvalidArgument::EmptyNote);
        }

        let state = ReviewState::Review;
        Ok(Self {
            id,
            kind,
            state,
            summary,
            reviewer: None,
            paperwork_processed: false,
            resolution: None,
            notes: vec![prefixed_note(state, &note)],
        })
    }

    /// Rebuild an application at an arbitrary point in the workflow.
    pub fn restore(fields: ApplicationFields) -> Result<Self, InvalidArgument> {
        let ApplicationFields {
            id,
            state,
            kind,
            summary,
            reviewer,
            paperwork_processed,
            resolution,
            notes,
        } = fields;

        if id.0 < 1 {
            return Err(InvalidArgument::ZeroId);
        }
        if summary.is_empty() {
            return Err(InvalidArgument::EmptySummary);
        }
        if notes.is_empty() {
            return Err(InvalidArgument::MissingNotes);
        }
        if notes.iter().any(String::is_empty) {
            return Err(InvalidArgument::EmptyNote);
        }

        Ok(Self {
            id,
            kind,
            state,
            summary,
            reviewer: reviewer.filter(|reviewer| !reviewer.is_empty()),
            paperwork_processed,
            resolution,
            notes,
        })
    }

    /// Drive the workflow with `command`.
    ///
    /// On success the application is in the returned state and carries one more note.
    /// On failure nothing about the application has changed.
    pub fn apply(&mut self, command: &Command) -> Result<ReviewState, IllegalTransition> {
        let prior = self.state;
        let step = transition(prior, self.kind, command.action()).ok_or(IllegalTransition {
            id: self.id,
            state: prior,
            action: command.action(),
        })?;

        if step.assigns_reviewer {
            if let Some(reviewer) = command.reviewer_id() {
                self.reviewer = Some(reviewer.to_string());
            }
        }
        if step.records_resolution {
            self.resolution = command.resolution();
        }
        if step.processes_paperwork {
            self.paperwork_processed = true;
        }
        self.state = step.next;
        self.notes.push(prefixed_note(prior, command.note()));

        Ok(self.state)
    }

    pub fn id(&self) -> ApplicationId {
        self.id
    }

    pub fn kind(&self) -> ApplicationKind {
        self.kind
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn reviewer(&self) -> Option<&str> {
        self.reviewer.as_deref()
    }

    pub fn is_paperwork_processed(&self) -> bool {
        self.paperwork_processed
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn is_closed(&self) -> bool {
        self.state == ReviewState::Closed
    }

    pub fn to_view(&self) -> ApplicationView {
        ApplicationView {
            id: self.id,
            state: self.state,
            state_label: self.state.name().to_string(),
            kind: self.kind,
            kind_label: self.kind.label().to_string(),
            summary: self.summary.clone(),
            reviewer: self.reviewer.clone(),
            paperwork_processed: self.paperwork_processed,
            resolution: self.resolution,
            notes: self.notes.clone(),
        }
    }
}

fn prefixed_note(state: ReviewState, note: &str) -> String {
    format!("[{}] {}", state.name(), note)
}

/// Read-only snapshot of every field, for display layers.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub state: ReviewState,
    pub state_label: String,
    pub kind: ApplicationKind,
    pub kind_label: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<String>,
    pub paperwork_processed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    pub notes: Vec<String>,
}

/// Constructor input that cannot form a valid application.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidArgument {
    #[error("application id must be at least 1")]
    ZeroId,
    #[error("application summary must not be empty")]
    EmptySummary,
    #[error("application note must not be empty")]
    EmptyNote,
    #[error("application must carry at least one note")]
    MissingNotes,
    #[error("no application ids left to assign")]
    IdsExhausted,
}

/// The current state does not define the requested action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("application {id} in state {state} cannot handle {action}")]
pub struct IllegalTransition {
    pub id: ApplicationId,
    pub state: ReviewState,
    pub action: Action,
}
