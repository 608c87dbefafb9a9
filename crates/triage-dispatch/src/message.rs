//! Completion reports sent back to the dashboard.

use tempfile::NamedTempFile;
use triage_core::{Alert, Incident, IncidentId, Note, User};

use crate::editor::EditorError;
use crate::error::DispatchError;

/// The single completion report for one executed command.
///
/// Every dispatched command terminates with exactly one of these. Owning the
/// note-capture file handle keeps the temp file alive until the dashboard
/// decides what to do with it; dropping the message releases the file.
#[derive(Debug)]
pub enum Message {
    IncidentListUpdated(Result<Vec<Incident>, DispatchError>),
    IncidentFetched(Result<Incident, DispatchError>),
    AlertsFetched {
        incident: IncidentId,
        result: Result<Vec<Alert>, DispatchError>,
    },
    NotesFetched {
        incident: IncidentId,
        result: Result<Vec<Note>, DispatchError>,
    },
    CurrentUserFetched(Result<User, DispatchError>),
    IncidentsAcknowledged(Result<Vec<Incident>, DispatchError>),
    /// A silence request resolved into a reassignment intent. Both lists are
    /// the caller's, passed through untouched.
    ReassignmentRequested {
        incidents: Vec<Incident>,
        users: Vec<User>,
    },
    IncidentsReassigned(Result<Vec<Incident>, DispatchError>),
    NoteAdded(Result<Note, DispatchError>),
    EditorFinished {
        file: NamedTempFile,
        error: Option<EditorError>,
    },
    /// A failure that happened before any operation result existed.
    Failed(DispatchError),
}
