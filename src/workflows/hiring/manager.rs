use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use super::application::{Application, IllegalTransition, InvalidArgument};
use super::codec::{self, LoadError, SaveError};
use super::collection::ApplicationCollection;
use super::command::Command;
use super::domain::{ApplicationId, ApplicationKind, ReviewState};

/// Facade that display layers drive: one collection plus file persistence and table rows.
#[derive(Debug, Default)]
pub struct ApplicationManager {
    collection: ApplicationCollection,
}

impl ApplicationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(collection: ApplicationCollection) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &ApplicationCollection {
        &self.collection
    }

    /// Discard every application and start over with an empty list.
    pub fn new_list(&mut self) {
        let dropped = self.collection.len();
        self.collection = ApplicationCollection::new();
        info!(dropped, "started a new application list");
    }

    /// Decode `path` and merge its applications into the current list.
    ///
    /// Applications whose id is already registered are skipped. Returns how many were
    /// added. Nothing is merged if the file fails to decode.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, ManagerError> {
        let path = path.as_ref();
        let loaded = codec::load(path)?;
        let total = loaded.len();
        let added = self.collection.add_all(loaded);
        info!(
            path = %path.display(),
            total,
            added,
            skipped = total - added,
            "loaded applications"
        );
        Ok(added)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ManagerError> {
        let path = path.as_ref();
        codec::save(path, self.collection.applications())?;
        info!(path = %path.display(), records = self.collection.len(), "saved applications");
        Ok(())
    }

    pub fn add(
        &mut self,
        kind: ApplicationKind,
        summary: &str,
        note: &str,
    ) -> Result<ApplicationId, ManagerError> {
        let id = self.collection.add(kind, summary, note)?;
        debug!(%id, %kind, "added application");
        Ok(id)
    }

    /// Forward `command` to `id`. Unknown ids are a no-op reported as `Ok(None)`.
    pub fn apply(
        &mut self,
        id: ApplicationId,
        command: &Command,
    ) -> Result<Option<ReviewState>, ManagerError> {
        let next = self.collection.apply(id, command)?;
        if let Some(state) = next {
            debug!(%id, action = %command.action(), %state, "applied command");
        }
        Ok(next)
    }

    pub fn remove(&mut self, id: ApplicationId) -> bool {
        let removed = self.collection.remove(id).is_some();
        if removed {
            debug!(%id, "removed application");
        }
        removed
    }

    pub fn get(&self, id: ApplicationId) -> Option<&Application> {
        self.collection.get(id)
    }

    pub fn rows(&self) -> Vec<ApplicationRow> {
        self.collection
            .applications()
            .iter()
            .map(ApplicationRow::from)
            .collect()
    }

    pub fn rows_by_kind(&self, kind: &str) -> Vec<ApplicationRow> {
        self.collection
            .list_by_kind(kind)
            .into_iter()
            .map(ApplicationRow::from)
            .collect()
    }

    /// Write the table rows (optionally filtered by kind) as CSV with a header line.
    pub fn export_rows_csv<W: Write>(
        &self,
        writer: W,
        kind: Option<&str>,
    ) -> Result<usize, ManagerError> {
        let rows = match kind {
            Some(kind) => self.rows_by_kind(kind),
            None => self.rows(),
        };

        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush().map_err(csv::Error::from)?;

        Ok(rows.len())
    }
}

/// One line of the application table shown by display layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationRow {
    pub id: ApplicationId,
    pub state: &'static str,
    pub kind: &'static str,
    pub summary: String,
}

impl From<&Application> for ApplicationRow {
    fn from(application: &Application) -> Self {
        Self {
            id: application.id(),
            state: application.state_name(),
            kind: application.kind().label(),
            summary: application.summary().to_string(),
        }
    }
}

/// Error raised by the manager facade.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
    #[error(transparent)]
    IllegalTransition(#[from] IllegalTransition),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error("failed to export rows: {0}")]
    Export(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::hiring::domain::Resolution;
    use std::fs;

    fn seeded() -> ApplicationManager {
        let mut manager = ApplicationManager::new();
        manager
            .add(ApplicationKind::New, "Backend engineer", "referred")
            .expect("adds");
        manager
            .add(ApplicationKind::Old, "Data analyst", "returning")
            .expect("adds");
        manager
            .add(ApplicationKind::New, "Designer", "portfolio")
            .expect("adds");
        manager
    }

    #[test]
    fn rows_expose_table_columns_in_id_order() {
        let manager = seeded();
        let rows = manager.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[1],
            ApplicationRow {
                id: ApplicationId(2),
                state: "Review",
                kind: "Old",
                summary: "Data analyst".to_string(),
            }
        );

        let new_rows: Vec<u32> = manager.rows_by_kind("new").iter().map(|r| r.id.0).collect();
        assert_eq!(new_rows, [1, 3]);
    }

    #[test]
    fn apply_reports_transition_errors() {
        let mut manager = seeded();
        let reopen = Command::reopen("again").expect("cmd");
        match manager.apply(ApplicationId(1), &reopen) {
            Err(ManagerError::IllegalTransition(err)) => {
                assert_eq!(err.state, ReviewState::Review)
            }
            other => panic!("expected illegal transition, got {other:?}"),
        }

        let reject = Command::reject(Resolution::ReviewCompleted, "no fit").expect("cmd");
        assert_eq!(
            manager.apply(ApplicationId(1), &reject).expect("applies"),
            Some(ReviewState::Closed)
        );
        assert_eq!(
            manager.apply(ApplicationId(99), &reject).expect("no-op"),
            None
        );
    }

    #[test]
    fn add_validates_input() {
        let mut manager = ApplicationManager::new();
        assert!(matches!(
            manager.add(ApplicationKind::New, "", "note"),
            Err(ManagerError::InvalidArgument(InvalidArgument::EmptySummary))
        ));
        assert!(manager.rows().is_empty());
    }

    #[test]
    fn new_list_discards_everything() {
        let mut manager = seeded();
        manager.new_list();
        assert!(manager.rows().is_empty());
        let id = manager
            .add(ApplicationKind::Old, "Fresh start", "n")
            .expect("adds");
        assert_eq!(id, ApplicationId(1));
    }

    #[test]
    fn remove_reports_whether_anything_changed() {
        let mut manager = seeded();
        assert!(manager.remove(ApplicationId(2)));
        assert!(!manager.remove(ApplicationId(2)));
        assert!(manager.get(ApplicationId(2)).is_none());
    }

    #[test]
    fn save_then_load_merges_into_existing_list() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("apps.txt");

        let mut source = seeded();
        source
            .apply(
                ApplicationId(2),
                &Command::accept("R1", Some(Resolution::ReviewCompleted), "strong").expect("cmd"),
            )
            .expect("review -> interview");
        source.save_to_file(&path).expect("saves");

        let mut target = ApplicationManager::new();
        target
            .add(ApplicationKind::Old, "Already here", "kept")
            .expect("adds");
        let added = target.load_from_file(&path).expect("loads");

        assert_eq!(added, 2);
        assert_eq!(target.rows().len(), 3);
        assert_eq!(
            target.get(ApplicationId(1)).map(Application::summary),
            Some("Already here")
        );
        let merged = target.get(ApplicationId(2)).expect("merged");
        assert_eq!(merged.state(), ReviewState::Interview);
        assert_eq!(merged.reviewer(), Some("R1"));

        let next = target
            .add(ApplicationKind::New, "After merge", "n")
            .expect("adds");
        assert_eq!(next, ApplicationId(4));
    }

    #[test]
    fn failed_load_leaves_list_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.txt");
        fs::write(&path, "*1,Review,New,A,,false,\n-[Review] ok\n*2,Review\n").expect("seed");

        let mut manager = seeded();
        assert!(matches!(
            manager.load_from_file(&path),
            Err(ManagerError::Load(LoadError::Malformed(_)))
        ));
        assert_eq!(manager.rows().len(), 3);
    }

    #[test]
    fn export_writes_csv_with_header() {
        let manager = seeded();
        let mut buffer = Vec::new();
        let written = manager
            .export_rows_csv(&mut buffer, Some("OLD"))
            .expect("exports");
        assert_eq!(written, 1);
        let text = String::from_utf8(buffer).expect("utf8");
        assert_eq!(text, "id,state,kind,summary\n2,Review,Old,Data analyst\n");
    }
}
