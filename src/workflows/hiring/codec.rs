//! Line-oriented persistence format for application lists.
//!
//! ```text
//! *<id>,<state>,<kind>,<summary>,<reviewer>,<paperwork>,[<resolution>,]
//! -<note>
//! -<note>
//! ```
//!
//! The reviewer slot is always written, empty when no reviewer is assigned. Records
//! written by older tools that left the slot out entirely are still accepted.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::application::{Application, ApplicationFields, InvalidArgument};
use super::domain::{ApplicationId, ApplicationKind, Resolution, ReviewState, UnknownToken};

const RECORD_MARKER: char = '*';
const NOTE_MARKER: char = '-';
const FIELD_SEPARATOR: char = ',';

/// Encode one application as a header line followed by its note lines.
///
/// The result carries no trailing newline.
pub fn encode_application(application: &Application) -> Result<String, SaveError> {
    let id = application.id();
    ensure_single_field(id, "summary", application.summary())?;
    if let Some(reviewer) = application.reviewer() {
        ensure_single_field(id, "reviewer", reviewer)?;
    }
    // Notes are trimmed on decode, so surrounding whitespace would not survive.
    if application
        .notes()
        .iter()
        .any(|note| has_line_break(note) || note.trim() != note)
    {
        return Err(SaveError::Unencodable { id, field: "note" });
    }

    let mut record = format!(
        "{RECORD_MARKER}{id},{state},{kind},{summary},{reviewer},{paperwork},",
        state = application.state_name(),
        kind = application.kind().label(),
        summary = application.summary(),
        reviewer = application.reviewer().unwrap_or_default(),
        paperwork = application.is_paperwork_processed(),
    );
    if let Some(resolution) = application.resolution() {
        record.push_str(resolution.token());
        record.push(FIELD_SEPARATOR);
    }
    for note in application.notes() {
        record.push('\n');
        record.push(NOTE_MARKER);
        record.push_str(note);
    }

    Ok(record)
}

/// Encode a whole list, one record after another, each terminated by a newline.
pub fn encode(applications: &[Application]) -> Result<String, SaveError> {
    let mut document = String::new();
    for application in applications {
        document.push_str(&encode_application(application)?);
        document.push('\n');
    }
    Ok(document)
}

/// Decode a whole document. Any malformed record fails the entire decode.
pub fn decode(input: &str) -> Result<Vec<Application>, MalformedRecord> {
    let mut applications = Vec::new();
    let mut current: Option<RecordDraft> = None;

    for (index, raw) in input.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim_end_matches('\r');

        if let Some(header) = line.strip_prefix(RECORD_MARKER) {
            if let Some(draft) = current.take() {
                applications.push(draft.finish()?);
            }
            current = Some(RecordDraft::new(
                applications.len() + 1,
                line_number,
                header,
            ));
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }

        match current.as_mut() {
            Some(draft) => draft.push_body_line(line_number, line)?,
            None => {
                return Err(MalformedRecord {
                    record: 1,
                    line: line_number,
                    reason: MalformedReason::StrayContent,
                })
            }
        }
    }

    if let Some(draft) = current {
        applications.push(draft.finish()?);
    }

    Ok(applications)
}

pub fn read_from<R: Read>(mut reader: R) -> Result<Vec<Application>, LoadError> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    Ok(decode(&input)?)
}

/// Read and decode the application list stored at `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Application>, LoadError> {
    let path = path.as_ref();
    let input = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let applications = decode(&input)?;
    debug!(path = %path.display(), records = applications.len(), "decoded application list");
    Ok(applications)
}

pub fn write_to<W: Write>(mut writer: W, applications: &[Application]) -> Result<(), SaveError> {
    let document = encode(applications)?;
    writer.write_all(document.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Write every application to `path`.
///
/// The document is encoded in full first, written to a uniquely named temporary file in
/// the destination directory and then persisted over `path`, so readers never observe a
/// half-written list. The temporary file is removed if any step fails.
pub fn save<P: AsRef<Path>>(path: P, applications: &[Application]) -> Result<(), SaveError> {
    let path = path.as_ref();
    let document = encode(applications)?;
    let directory = destination_dir(path)?;
    let write_failed = |source: io::Error| SaveError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut staging = NamedTempFile::new_in(directory).map_err(write_failed)?;
    staging
        .write_all(document.as_bytes())
        .map_err(write_failed)?;
    staging.as_file().sync_all().map_err(write_failed)?;
    staging
        .persist(path)
        .map_err(|err| write_failed(err.error))?;

    debug!(path = %path.display(), records = applications.len(), "wrote application list");
    Ok(())
}

fn destination_dir(path: &Path) -> Result<&Path, SaveError> {
    if path.file_name().is_none() {
        return Err(SaveError::InvalidDestination(path.to_path_buf()));
    }
    Ok(match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    })
}

fn has_line_break(value: &str) -> bool {
    value.contains(['\n', '\r'])
}

fn ensure_single_field(
    id: ApplicationId,
    field: &'static str,
    value: &str,
) -> Result<(), SaveError> {
    if value.contains(FIELD_SEPARATOR) || has_line_break(value) {
        return Err(SaveError::Unencodable { id, field });
    }
    Ok(())
}

struct RecordDraft<'a> {
    ordinal: usize,
    line: usize,
    header: &'a str,
    notes: Vec<String>,
}

impl<'a> RecordDraft<'a> {
    fn new(ordinal: usize, line: usize, header: &'a str) -> Self {
        Self {
            ordinal,
            line,
            header,
            notes: Vec::new(),
        }
    }

    fn push_body_line(&mut self, line_number: usize, line: &str) -> Result<(), MalformedRecord> {
        match line.strip_prefix(NOTE_MARKER) {
            Some(note) => {
                self.notes.push(note.trim().to_string());
                Ok(())
            }
            None => Err(self.malformed(MalformedReason::StrayLine { line: line_number })),
        }
    }

    fn finish(self) -> Result<Application, MalformedRecord> {
        let header = parse_header(self.header).map_err(|reason| self.malformed(reason))?;
        let fields = ApplicationFields {
            id: header.id,
            state: header.state,
            kind: header.kind,
            summary: header.summary.to_string(),
            reviewer: header.reviewer.map(str::to_string),
            paperwork_processed: header.paperwork_processed,
            resolution: header.resolution,
            notes: self.notes.clone(),
        };
        Application::restore(fields).map_err(|err| self.malformed(MalformedReason::Invalid(err)))
    }

    fn malformed(&self, reason: MalformedReason) -> MalformedRecord {
        MalformedRecord {
            record: self.ordinal,
            line: self.line,
            reason,
        }
    }
}

struct Header<'a> {
    id: ApplicationId,
    state: ReviewState,
    kind: ApplicationKind,
    summary: &'a str,
    reviewer: Option<&'a str>,
    paperwork_processed: bool,
    resolution: Option<Resolution>,
}

fn parse_header(header: &str) -> Result<Header<'_>, MalformedReason> {
    let mut fields: Vec<&str> = header.split(FIELD_SEPARATOR).collect();
    if fields.len() > 1 && fields.last().is_some_and(|field| field.trim().is_empty()) {
        fields.pop();
    }

    let (reviewer, paperwork, resolution) = match fields.as_slice() {
        [_, _, _, _, reviewer, paperwork, resolution] => {
            (Some(*reviewer), parse_flag(paperwork)?, Some(*resolution))
        }
        [_, _, _, _, reviewer, paperwork] => match parse_flag(paperwork) {
            Ok(flag) => (Some(*reviewer), flag, None),
            // Legacy layout: reviewer slot omitted, resolution present.
            Err(err) => match parse_flag(reviewer) {
                Ok(flag) => (None, flag, Some(*paperwork)),
                Err(_) => return Err(err),
            },
        },
        // Legacy layout: reviewer slot omitted, no resolution.
        [_, _, _, _, paperwork] => (None, parse_flag(paperwork)?, None),
        _ => return Err(MalformedReason::FieldCount { found: fields.len() }),
    };

    let id = fields[0]
        .trim()
        .parse::<u32>()
        .map_err(|_| MalformedReason::InvalidId(fields[0].to_string()))?;
    let resolution = match resolution.map(str::trim) {
        None | Some("") => None,
        Some(token) => Some(token.parse::<Resolution>()?),
    };

    Ok(Header {
        id: ApplicationId(id),
        state: fields[1].parse::<ReviewState>()?,
        kind: fields[2].parse::<ApplicationKind>()?,
        summary: fields[3],
        reviewer: reviewer.filter(|reviewer| !reviewer.is_empty()),
        paperwork_processed: paperwork,
        resolution,
    })
}

fn parse_flag(value: &str) -> Result<bool, MalformedReason> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(MalformedReason::InvalidFlag(value.to_string()))
    }
}

/// A record that could not be turned into an application.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("record {record} (line {line}): {reason}")]
pub struct MalformedRecord {
    /// 1-based position of the record in the document.
    pub record: usize,
    /// Line of the record header.
    pub line: usize,
    pub reason: MalformedReason,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedReason {
    #[error("content before the first record")]
    StrayContent,
    #[error("line {line} is neither a note nor a record header")]
    StrayLine { line: usize },
    #[error("expected 5 to 7 header fields, found {found}")]
    FieldCount { found: usize },
    #[error("'{0}' is not a valid application id")]
    InvalidId(String),
    #[error("'{0}' is not a valid paperwork flag")]
    InvalidFlag(String),
    #[error(transparent)]
    Token(#[from] UnknownToken),
    #[error(transparent)]
    Invalid(#[from] InvalidArgument),
}

/// Failure reading an application list.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to read application list: {0}")]
    Io(#[from] io::Error),
    #[error("malformed application list: {0}")]
    Malformed(#[from] MalformedRecord),
}

/// Failure writing an application list.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("application {id} cannot be saved: {field} does not fit the line format")]
    Unencodable {
        id: ApplicationId,
        field: &'static str,
    },
    #[error("{} is not a file path", .0.display())]
    InvalidDestination(PathBuf),
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to write application list: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::hiring::command::Command;

    fn offer_application() -> Application {
        Application::restore(ApplicationFields {
            id: ApplicationId(7),
            state: ReviewState::Offer,
            kind: ApplicationKind::Old,
            summary: "S".to_string(),
            reviewer: Some("Rev".to_string()),
            paperwork_processed: true,
            resolution: None,
            notes: vec![
                "[RefCheck] note a".to_string(),
                "[Offer] note b".to_string(),
            ],
        })
        .expect("valid application")
    }

    #[test]
    fn encodes_header_and_notes() {
        let encoded = encode_application(&offer_application()).expect("encodes");
        assert_eq!(
            encoded,
            "*7,Offer,Old,S,Rev,true,\n-[RefCheck] note a\n-[Offer] note b"
        );
    }

    #[test]
    fn encodes_resolution_and_empty_reviewer_slot() {
        let mut application =
            Application::new(ApplicationId(2), ApplicationKind::New, "Analyst", "init")
                .expect("valid");
        application
            .apply(&Command::standby(Resolution::ReviewCompleted, "hold").expect("cmd"))
            .expect("review -> waitlist");

        let encoded = encode_application(&application).expect("encodes");
        assert_eq!(
            encoded,
            "*2,Waitlist,New,Analyst,,false,ReviewCompleted,\n-[Review] init\n-[Review] hold"
        );
    }

    #[test]
    fn decode_reads_every_field() {
        let input = "*3,Interview,New,Backend role,alice,false,ReviewCompleted,\n\
                     -[Review] received\n\
                     -[Review] looks good\n";
        let applications = decode(input).expect("decodes");
        assert_eq!(applications.len(), 1);

        let application = &applications[0];
        assert_eq!(application.id(), ApplicationId(3));
        assert_eq!(application.state(), ReviewState::Interview);
        assert_eq!(application.kind(), ApplicationKind::New);
        assert_eq!(application.summary(), "Backend role");
        assert_eq!(application.reviewer(), Some("alice"));
        assert!(!application.is_paperwork_processed());
        assert_eq!(application.resolution(), Some(Resolution::ReviewCompleted));
        assert_eq!(
            application.notes(),
            ["[Review] received", "[Review] looks good"]
        );
    }

    #[test]
    fn decode_keeps_document_order_and_handles_crlf() {
        let input = "*5,Closed,Old,B,bob,false,OfferCompleted,\r\n-[Offer] done\r\n\
                     *1,Review,New,A,,false,\r\n-[Review] new\r\n";
        let applications = decode(input).expect("decodes");
        let ids: Vec<u32> = applications.iter().map(|a| a.id().0).collect();
        assert_eq!(ids, [5, 1]);
        assert_eq!(applications[1].reviewer(), None);
        assert_eq!(applications[1].resolution(), None);
        assert_eq!(applications[0].notes(), ["[Offer] done"]);
    }

    #[test]
    fn hyphens_inside_notes_are_not_delimiters() {
        let input = "*1,Review,New,A,,false,\n-[Review] well-known candidate - strong\n";
        let applications = decode(input).expect("decodes");
        assert_eq!(
            applications[0].notes(),
            ["[Review] well-known candidate - strong"]
        );
    }

    #[test]
    fn decode_accepts_records_without_reviewer_slot() {
        let input = "*1,Review,New,A,false,\n-[Review] n\n\
                     *2,Closed,Old,B,false,ReviewCompleted,\n-[Review] r\n";
        let applications = decode(input).expect("decodes legacy layout");
        assert_eq!(applications[0].reviewer(), None);
        assert_eq!(applications[0].resolution(), None);
        assert_eq!(applications[1].reviewer(), None);
        assert!(!applications[1].is_paperwork_processed());
        assert_eq!(applications[1].resolution(), Some(Resolution::ReviewCompleted));
    }

    #[test]
    fn empty_document_decodes_to_empty_list() {
        assert_eq!(decode("").expect("decodes"), Vec::new());
        assert_eq!(decode("\n\n").expect("decodes"), Vec::new());
    }

    #[test]
    fn malformed_records_abort_the_whole_decode() {
        let input = "*1,Review,New,A,,false,\n-[Review] ok\n\
                     *2,Submitted,New,B,,false,\n-[Review] bad state\n";
        let err = decode(input).expect_err("unknown state");
        assert_eq!(err.record, 2);
        assert_eq!(err.line, 3);
        assert!(matches!(err.reason, MalformedReason::Token(_)));
    }

    #[test]
    fn malformed_reasons_are_specific() {
        let cases = [
            ("stray\n*1,Review,New,A,,false,\n-[Review] n", MalformedReason::StrayContent),
            (
                "*1,Review,New,A,,false,\nnot a note",
                MalformedReason::StrayLine { line: 2 },
            ),
            ("*1,Review,New\n-[Review] n", MalformedReason::FieldCount { found: 3 }),
            (
                "*x,Review,New,A,,false,\n-[Review] n",
                MalformedReason::InvalidId("x".to_string()),
            ),
            (
                "*1,Review,New,A,,maybe,\n-[Review] n",
                MalformedReason::InvalidFlag("maybe".to_string()),
            ),
            (
                "*1,Review,New,A,,false,",
                MalformedReason::Invalid(InvalidArgument::MissingNotes),
            ),
            (
                "*0,Review,New,A,,false,\n-[Review] n",
                MalformedReason::Invalid(InvalidArgument::ZeroId),
            ),
        ];

        for (input, expected) in cases {
            let err = decode(input).expect_err("input is malformed");
            assert_eq!(err.reason, expected, "input: {input:?}");
        }
    }

    #[test]
    fn unknown_resolution_token_is_malformed() {
        let err = decode("*1,Closed,New,A,,false,Hired,\n-[Review] n").expect_err("bad token");
        match err.reason {
            MalformedReason::Token(token) => assert_eq!(token.vocabulary, "resolution"),
            other => panic!("expected token error, got {other:?}"),
        }
    }

    #[test]
    fn encode_refuses_fields_that_cannot_be_decoded() {
        let application =
            Application::new(ApplicationId(9), ApplicationKind::New, "Smith, Jane", "n")
                .expect("valid");
        match encode_application(&application) {
            Err(SaveError::Unencodable { id, field }) => {
                assert_eq!(id, ApplicationId(9));
                assert_eq!(field, "summary");
            }
            other => panic!("expected unencodable summary, got {other:?}"),
        }

        for note in ["line\nbreak", "trailing  "] {
            let application =
                Application::new(ApplicationId(9), ApplicationKind::New, "Jane", note)
                    .expect("valid");
            assert!(
                matches!(
                    encode(&[application]),
                    Err(SaveError::Unencodable { field: "note", .. })
                ),
                "note: {note:?}"
            );
        }
    }

    #[test]
    fn write_to_terminates_every_record() {
        let mut buffer = Vec::new();
        write_to(&mut buffer, &[offer_application()]).expect("writes");
        let text = String::from_utf8(buffer).expect("utf8");
        assert!(text.ends_with("-[Offer] note b\n"));
        let decoded = read_from(text.as_bytes()).expect("reads back");
        assert_eq!(decoded, vec![offer_application()]);
    }

    #[test]
    fn load_reports_missing_file_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.txt");
        match load(&path) {
            Err(LoadError::Read { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected read error, got {other:?}"),
        }
    }

    #[test]
    fn save_replaces_destination_and_leaves_no_staging_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("apps.txt");
        fs::write(&path, "stale contents").expect("seed file");

        save(&path, &[offer_application()]).expect("saves");

        let written = fs::read_to_string(&path).expect("reads");
        assert!(written.starts_with("*7,Offer,Old,S,Rev,true,"));
        let entries: Vec<_> = fs::read_dir(dir.path())
            .expect("lists dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(entries, ["apps.txt"]);
    }

    #[test]
    fn save_leaves_neighbouring_files_alone() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("apps.txt");
        let neighbour = dir.path().join(".apps.txt.tmp");
        fs::write(&neighbour, "unrelated data").expect("seed neighbour");

        save(&path, &[offer_application()]).expect("saves");

        assert_eq!(
            fs::read_to_string(&neighbour).expect("neighbour kept"),
            "unrelated data"
        );
        assert_eq!(load(&path).expect("loads"), vec![offer_application()]);
    }

    #[test]
    fn save_rejects_paths_without_a_file_name() {
        assert!(matches!(
            save("..", &[offer_application()]),
            Err(SaveError::InvalidDestination(_))
        ));
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("no-such-dir").join("apps.txt");
        assert!(matches!(
            save(&path, &[offer_application()]),
            Err(SaveError::Write { .. })
        ));
    }

    #[test]
    fn unencodable_list_does_not_touch_destination() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("apps.txt");
        fs::write(&path, "original").expect("seed file");
        let application =
            Application::new(ApplicationId(1), ApplicationKind::Old, "a,b", "n").expect("valid");

        assert!(save(&path, &[application]).is_err());
        assert_eq!(fs::read_to_string(&path).expect("reads"), "original");
    }
}
