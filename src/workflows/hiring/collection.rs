use tracing::debug;

use super::application::{Application, IllegalTransition, InvalidArgument};
use super::command::Command;
use super::domain::{ApplicationId, ApplicationKind, ReviewState};

/// Registry of applications kept in ascending id order.
#[derive(Debug, Clone)]
pub struct ApplicationCollection {
    applications: Vec<Application>,
    /// `None` once an application holds the largest representable id.
    next_id: Option<u32>,
}

impl Default for ApplicationCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationCollection {
    pub fn new() -> Self {
        Self {
            applications: Vec::new(),
            next_id: Some(1),
        }
    }

    /// Create a fresh application and return its newly assigned id.
    ///
    /// Fails with [`InvalidArgument::IdsExhausted`] once no larger id is left to assign.
    pub fn add(
        &mut self,
        kind: ApplicationKind,
        summary: &str,
        note: &str,
    ) -> Result<ApplicationId, InvalidArgument> {
        let next = self.next_id.ok_or(InvalidArgument::IdsExhausted)?;
        let application = Application::new(ApplicationId(next), kind, summary, note)?;
        let id = application.id();
        self.insert(application);
        Ok(id)
    }

    /// Register an application built elsewhere (storage, another list).
    ///
    /// The first application registered under an id wins; later ones are dropped.
    /// Returns whether the application was inserted.
    pub fn add_existing(&mut self, application: Application) -> bool {
        if self.position(application.id()).is_ok() {
            debug!(id = %application.id(), "ignoring application with duplicate id");
            return false;
        }
        self.insert(application);
        true
    }

    /// Register every application in order. Returns how many were inserted.
    pub fn add_all<I>(&mut self, applications: I) -> usize
    where
        I: IntoIterator<Item = Application>,
    {
        applications
            .into_iter()
            .map(|application| self.add_existing(application))
            .filter(|inserted| *inserted)
            .count()
    }

    pub fn get(&self, id: ApplicationId) -> Option<&Application> {
        self.position(id).ok().map(|index| &self.applications[index])
    }

    /// Remove an application if present. Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: ApplicationId) -> Option<Application> {
        let index = self.position(id).ok()?;
        Some(self.applications.remove(index))
    }

    /// Forward `command` to the application with `id`.
    ///
    /// An unknown id is a silent no-op and yields `Ok(None)`; callers that need to tell
    /// the difference should `get` first.
    pub fn apply(
        &mut self,
        id: ApplicationId,
        command: &Command,
    ) -> Result<Option<ReviewState>, IllegalTransition> {
        match self.position(id) {
            Ok(index) => self.applications[index].apply(command).map(Some),
            Err(_) => {
                debug!(%id, action = %command.action(), "no application to apply command to");
                Ok(None)
            }
        }
    }

    /// Applications whose kind label matches `kind`, ignoring case.
    pub fn list_by_kind(&self, kind: &str) -> Vec<&Application> {
        let kind = kind.trim();
        self.applications
            .iter()
            .filter(|application| application.kind().label().eq_ignore_ascii_case(kind))
            .collect()
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn len(&self) -> usize {
        self.applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }

    /// Id the next call to [`add`](Self::add) will assign, if any is left.
    pub fn next_id(&self) -> Option<ApplicationId> {
        self.next_id.map(ApplicationId)
    }

    fn position(&self, id: ApplicationId) -> Result<usize, usize> {
        self.applications
            .binary_search_by_key(&id, |application| application.id())
    }

    fn insert(&mut self, application: Application) {
        let id = application.id();
        let index = match self.position(id) {
            Ok(_) => return,
            Err(index) => index,
        };
        self.applications.insert(index, application);

        // Ids are never handed out twice, even after the highest one is removed.
        let highest = self.applications.last().map_or(0, |last| last.id().0);
        self.next_id = match (self.next_id, highest.checked_add(1)) {
            (Some(next), Some(after)) => Some(next.max(after)),
            _ => None,
        };
    }
}
