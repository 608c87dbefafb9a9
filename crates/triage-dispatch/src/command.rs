//! Deferred work descriptors built by the dashboard and run by `execute`.

use tempfile::NamedTempFile;
use triage_core::{Incident, IncidentId, User};
use triage_remote::ListQuery;

/// One deferred unit of work against the remote service.
///
/// Building a command is pure data assembly: no I/O happens and nothing can
/// fail until the command reaches [`crate::execute`].
#[derive(Debug)]
pub enum Command {
    FetchIncidentList {
        query: ListQuery,
    },
    FetchIncident {
        id: IncidentId,
    },
    FetchAlerts {
        id: IncidentId,
    },
    FetchNotes {
        id: IncidentId,
    },
    FetchCurrentUser,
    /// Acknowledge the given incidents as whoever the credentials resolve to.
    AcknowledgeIncidents {
        incidents: Vec<Incident>,
    },
    ReassignIncidents {
        incidents: Vec<Incident>,
        target: User,
        users: Vec<User>,
    },
    /// Silencing is reassignment to a designated user; validation happens at
    /// execution time, not here.
    SilenceIncidents {
        incidents: Vec<Incident>,
        users: Vec<User>,
    },
    /// Post the contents of a filled note-capture file as a note.
    AddNote {
        incident: IncidentId,
        user: User,
        file: NamedTempFile,
    },
    OpenEditor {
        editor: String,
    },
}

impl Command {
    /// Short name for status lines.
    pub fn label(&self) -> &'static str {
        match self {
            Command::FetchIncidentList { .. } => "fetch_incidents",
            Command::FetchIncident { .. } => "fetch_incident",
            Command::FetchAlerts { .. } => "fetch_alerts",
            Command::FetchNotes { .. } => "fetch_notes",
            Command::FetchCurrentUser => "fetch_current_user",
            Command::AcknowledgeIncidents { .. } => "acknowledge",
            Command::ReassignIncidents { .. } => "reassign",
            Command::SilenceIncidents { .. } => "silence",
            Command::AddNote { .. } => "add_note",
            Command::OpenEditor { .. } => "open_editor",
        }
    }
}
