use super::domain::{Action, Resolution};

/// Validated instruction sent to an application.
///
/// Construction is all-or-nothing: a `Command` that exists already satisfies the
/// per-action requirements, so the workflow only has to decide whether the current
/// state accepts the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    action: Action,
    reviewer_id: Option<String>,
    resolution: Option<Resolution>,
    note: String,
}

impl Command {
    pub fn new(
        action: Action,
        reviewer_id: Option<String>,
        resolution: Option<Resolution>,
        note: impl Into<String>,
    ) -> Result<Self, InvalidCommand> {
        let reviewer_id = reviewer_id.filter(|reviewer| !reviewer.is_empty());
        let note = note.into();

        if action == Action::Accept && reviewer_id.is_none() {
            return Err(InvalidCommand::MissingReviewer);
        }
        if matches!(action, Action::Standby | Action::Reject) && resolution.is_none() {
            return Err(InvalidCommand::MissingResolution { action });
        }
        if note.is_empty() {
            return Err(InvalidCommand::EmptyNote);
        }

        Ok(Self {
            action,
            reviewer_id,
            resolution,
            note,
        })
    }

    pub fn accept(
        reviewer_id: impl Into<String>,
        resolution: Option<Resolution>,
        note: impl Into<String>,
    ) -> Result<Self, InvalidCommand> {
        Self::new(Action::Accept, Some(reviewer_id.into()), resolution, note)
    }

    pub fn reject(resolution: Resolution, note: impl Into<String>) -> Result<Self, InvalidCommand> {
        Self::new(Action::Reject, None, Some(resolution), note)
    }

    pub fn standby(
        resolution: Resolution,
        note: impl Into<String>,
    ) -> Result<Self, InvalidCommand> {
        Self::new(Action::Standby, None, Some(resolution), note)
    }

    pub fn reopen(note: impl Into<String>) -> Result<Self, InvalidCommand> {
        Self::new(Action::Reopen, None, None, note)
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn reviewer_id(&self) -> Option<&str> {
        self.reviewer_id.as_deref()
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    pub fn note(&self) -> &str {
        &self.note
    }
}

/// Rejected combination of command fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidCommand {
    #[error("ACCEPT requires a reviewer id")]
    MissingReviewer,
    #[error("{action} requires a resolution")]
    MissingResolution { action: Action },
    #[error("command note must not be empty")]
    EmptyNote,
}
