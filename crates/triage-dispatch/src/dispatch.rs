//! Runs commands against the remote seam and folds outcomes into messages.

use std::fs;

use triage_remote::IncidentApi;

use crate::command::Command;
use crate::editor::begin_note_capture;
use crate::error::DispatchError;
use crate::message::Message;

/// Run one command to completion.
///
/// Total over every command: failures come back inside the message, never
/// as a panic or a bare `Err`. Scheduling is the caller's concern; this
/// blocks the current thread on the remote seam.
pub fn execute(command: Command, api: &dyn IncidentApi) -> Message {
    match command {
        Command::FetchIncidentList { query } => {
            Message::IncidentListUpdated(api.list_incidents(&query).map_err(DispatchError::from))
        }
        Command::FetchIncident { id } => {
            Message::IncidentFetched(api.incident(&id).map_err(DispatchError::from))
        }
        Command::FetchAlerts { id } => {
            let result = api.incident_alerts(&id).map_err(DispatchError::from);
            Message::AlertsFetched {
                incident: id,
                result,
            }
        }
        Command::FetchNotes { id } => {
            let result = api.incident_notes(&id).map_err(DispatchError::from);
            Message::NotesFetched {
                incident: id,
                result,
            }
        }
        Command::FetchCurrentUser => {
            Message::CurrentUserFetched(api.current_user().map_err(DispatchError::from))
        }
        Command::AcknowledgeIncidents { incidents } => {
            // Two sequential calls: resolve the acknowledger, then act as them.
            let user = match api.current_user() {
                Ok(user) => user,
                Err(err) => return Message::IncidentsAcknowledged(Err(err.into())),
            };
            Message::IncidentsAcknowledged(
                api.acknowledge_incidents(&incidents, &user)
                    .map_err(DispatchError::from),
            )
        }
        Command::ReassignIncidents {
            incidents,
            target,
            users,
        } => Message::IncidentsReassigned(
            api.reassign_incidents(&incidents, &target, &users)
                .map_err(DispatchError::from),
        ),
        Command::SilenceIncidents { incidents, users } => {
            if incidents.is_empty() || users.is_empty() {
                return Message::Failed(DispatchError::SilenceInvalidArgs);
            }
            Message::ReassignmentRequested { incidents, users }
        }
        Command::AddNote {
            incident,
            user,
            file,
        } => {
            // Close our handle first; the editor wrote through the path.
            // Dropping `path` at the end of the arm deletes the file on
            // every exit.
            let (handle, path) = file.into_parts();
            drop(handle);
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(source) => return Message::NoteAdded(Err(DispatchError::NoteRead { source })),
            };
            let content = String::from_utf8_lossy(&bytes).into_owned();
            Message::NoteAdded(
                api.post_note(&incident, &user, &content)
                    .map_err(DispatchError::from),
            )
        }
        Command::OpenEditor { editor } => match begin_note_capture(&editor) {
            Ok(pending) => pending.run_blocking(),
            Err(err) => Message::Failed(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    use chrono::Utc;
    use tempfile::NamedTempFile;
    use triage_core::{Alert, Incident, IncidentId, IncidentStatus, Note, ServiceId, User};
    use triage_remote::{ListQuery, RemoteError};

    fn make_incident(id: &str) -> Incident {
        Incident::new(
            IncidentId::new(id),
            format!("incident {id}"),
            ServiceId("svc-test".to_string()),
        )
    }

    struct CaptureApi {
        calls: Mutex<Vec<String>>,
        user: User,
    }

    impl CaptureApi {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                user: User::new("U-100", "Alva Okonkwo"),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("capture lock").clone()
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().expect("capture lock").push(call.into());
        }
    }

    impl IncidentApi for CaptureApi {
        fn current_user(&self) -> Result<User, RemoteError> {
            self.record("current_user");
            Ok(self.user.clone())
        }

        fn list_incidents(&self, _query: &ListQuery) -> Result<Vec<Incident>, RemoteError> {
            self.record("list_incidents");
            Ok(vec![make_incident("Q-REMOTE-LIST")])
        }

        fn incident(&self, id: &IncidentId) -> Result<Incident, RemoteError> {
            self.record(format!("incident {id}"));
            Ok(make_incident(id.as_ref()))
        }

        fn incident_alerts(&self, id: &IncidentId) -> Result<Vec<Alert>, RemoteError> {
            self.record(format!("alerts {id}"));
            Ok(Vec::new())
        }

        fn incident_notes(&self, id: &IncidentId) -> Result<Vec<Note>, RemoteError> {
            self.record(format!("notes {id}"));
            Ok(Vec::new())
        }

        fn acknowledge_incidents(
            &self,
            incidents: &[Incident],
            user: &User,
        ) -> Result<Vec<Incident>, RemoteError> {
            self.record(format!("acknowledge n={} as={}", incidents.len(), user.id));
            Ok(incidents
                .iter()
                .cloned()
                .map(|mut incident| {
                    incident.acknowledge();
                    incident
                })
                .collect())
        }

        fn reassign_incidents(
            &self,
            incidents: &[Incident],
            target: &User,
            users: &[User],
        ) -> Result<Vec<Incident>, RemoteError> {
            self.record(format!(
                "reassign n={} target={} candidates={}",
                incidents.len(),
                target.id,
                users.len()
            ));
            // The remote owns the response list; it need not echo the input.
            Ok(vec![make_incident("Q-REMOTE-REASSIGNED")])
        }

        fn post_note(
            &self,
            incident: &IncidentId,
            author: &User,
            content: &str,
        ) -> Result<Note, RemoteError> {
            self.record(format!("post_note {incident} by={} content={content}", author.id));
            Ok(Note {
                id: "N-1".to_string(),
                content: content.to_string(),
                author: Some(author.clone()),
                created_at: Utc::now(),
            })
        }
    }

    struct FailingApi {
        calls: Mutex<Vec<String>>,
    }

    impl FailingApi {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("capture lock").clone()
        }

        fn fail(&self, call: &str) -> RemoteError {
            self.calls.lock().expect("capture lock").push(call.to_string());
            RemoteError::Transport {
                message: "remote down".to_string(),
            }
        }
    }

    impl IncidentApi for FailingApi {
        fn current_user(&self) -> Result<User, RemoteError> {
            Err(self.fail("current_user"))
        }

        fn list_incidents(&self, _query: &ListQuery) -> Result<Vec<Incident>, RemoteError> {
            Err(self.fail("list_incidents"))
        }

        fn incident(&self, _id: &IncidentId) -> Result<Incident, RemoteError> {
            Err(self.fail("incident"))
        }

        fn incident_alerts(&self, _id: &IncidentId) -> Result<Vec<Alert>, RemoteError> {
            Err(self.fail("alerts"))
        }

        fn incident_notes(&self, _id: &IncidentId) -> Result<Vec<Note>, RemoteError> {
            Err(self.fail("notes"))
        }

        fn acknowledge_incidents(
            &self,
            _incidents: &[Incident],
            _user: &User,
        ) -> Result<Vec<Incident>, RemoteError> {
            Err(self.fail("acknowledge"))
        }

        fn reassign_incidents(
            &self,
            _incidents: &[Incident],
            _target: &User,
            _users: &[User],
        ) -> Result<Vec<Incident>, RemoteError> {
            Err(self.fail("reassign"))
        }

        fn post_note(
            &self,
            _incident: &IncidentId,
            _author: &User,
            _content: &str,
        ) -> Result<Note, RemoteError> {
            Err(self.fail("post_note"))
        }
    }

    #[test]
    fn silence_passes_both_lists_through_untouched() {
        let api = CaptureApi::new();
        let incidents = vec![make_incident("Q-1"), make_incident("Q-2")];
        let users = vec![User::new("U-9", "Silence Queue")];

        let message = execute(
            Command::SilenceIncidents {
                incidents: incidents.clone(),
                users: users.clone(),
            },
            &api,
        );

        match message {
            Message::ReassignmentRequested {
                incidents: got_incidents,
                users: got_users,
            } => {
                assert_eq!(got_incidents, incidents);
                assert_eq!(got_users, users);
            }
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(api.calls().is_empty(), "silence must not touch the remote");
    }

    #[test]
    fn silence_with_no_incidents_fails_fast_without_remote_calls() {
        let api = CaptureApi::new();
        let message = execute(
            Command::SilenceIncidents {
                incidents: Vec::new(),
                users: vec![User::new("U-9", "Silence Queue")],
            },
            &api,
        );

        match message {
            Message::Failed(err) => {
                assert_eq!(err.to_string(), "silenceIncidents: invalid arguments")
            }
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(api.calls().is_empty());
    }

    #[test]
    fn silence_with_no_users_fails_fast_without_remote_calls() {
        let api = CaptureApi::new();
        let message = execute(
            Command::SilenceIncidents {
                incidents: vec![make_incident("Q-1")],
                users: Vec::new(),
            },
            &api,
        );

        match message {
            Message::Failed(DispatchError::SilenceInvalidArgs) => {}
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(api.calls().is_empty());
    }

    #[test]
    fn acknowledge_resolves_the_user_then_acknowledges() {
        let api = CaptureApi::new();
        let message = execute(
            Command::AcknowledgeIncidents {
                incidents: vec![make_incident("Q-1")],
            },
            &api,
        );

        assert_eq!(api.calls(), vec!["current_user", "acknowledge n=1 as=U-100"]);
        match message {
            Message::IncidentsAcknowledged(Ok(updated)) => {
                assert_eq!(updated.len(), 1);
                assert_eq!(updated[0].status, IncidentStatus::Acknowledged);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn acknowledge_with_an_empty_selection_still_calls_the_remote() {
        let api = CaptureApi::new();
        let message = execute(
            Command::AcknowledgeIncidents {
                incidents: Vec::new(),
            },
            &api,
        );

        assert_eq!(api.calls(), vec!["current_user", "acknowledge n=0 as=U-100"]);
        match message {
            Message::IncidentsAcknowledged(Ok(updated)) => assert!(updated.is_empty()),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn acknowledge_reports_an_identity_failure_without_acknowledging() {
        let api = FailingApi::new();
        let message = execute(
            Command::AcknowledgeIncidents {
                incidents: vec![make_incident("Q-1")],
            },
            &api,
        );

        assert_eq!(api.calls(), vec!["current_user"]);
        match message {
            Message::IncidentsAcknowledged(Err(DispatchError::Remote(_))) => {}
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn reassign_passes_the_remote_list_through_unmodified() {
        let api = CaptureApi::new();
        let target = User::new("U-9", "Silence Queue");
        let users = vec![target.clone(), User::new("U-100", "Alva Okonkwo")];

        let message = execute(
            Command::ReassignIncidents {
                incidents: vec![make_incident("Q-1")],
                target,
                users,
            },
            &api,
        );

        assert_eq!(api.calls(), vec!["reassign n=1 target=U-9 candidates=2"]);
        match message {
            Message::IncidentsReassigned(Ok(list)) => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].id.as_ref(), "Q-REMOTE-REASSIGNED");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn add_note_posts_the_exact_file_contents_and_releases_the_file() {
        let api = CaptureApi::new();
        let mut file = NamedTempFile::new().expect("create note file");
        file.write_all(b"investigating root cause").expect("write note");
        let path = file.path().to_path_buf();

        let message = execute(
            Command::AddNote {
                incident: IncidentId::new("Q-1"),
                user: User::new("U-100", "Alva Okonkwo"),
                file,
            },
            &api,
        );

        assert_eq!(
            api.calls(),
            vec!["post_note Q-1 by=U-100 content=investigating root cause"]
        );
        match message {
            Message::NoteAdded(Ok(note)) => assert_eq!(note.content, "investigating root cause"),
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(!path.exists(), "note file must be released after posting");
    }

    #[test]
    fn add_note_reports_a_read_failure_without_posting() {
        let api = CaptureApi::new();
        let file = NamedTempFile::new().expect("create note file");
        let path = file.path().to_path_buf();
        // Pull the file out from under the command to force the read to fail.
        std::fs::remove_file(&path).expect("remove note file");

        let message = execute(
            Command::AddNote {
                incident: IncidentId::new("Q-1"),
                user: User::new("U-100", "Alva Okonkwo"),
                file,
            },
            &api,
        );

        match message {
            Message::NoteAdded(Err(DispatchError::NoteRead { .. })) => {}
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(api.calls().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn add_note_reports_a_remote_post_failure_and_still_releases_the_file() {
        let api = FailingApi::new();
        let mut file = NamedTempFile::new().expect("create note file");
        file.write_all(b"investigating root cause").expect("write note");
        let path = file.path().to_path_buf();

        let message = execute(
            Command::AddNote {
                incident: IncidentId::new("Q-1"),
                user: User::new("U-100", "Alva Okonkwo"),
                file,
            },
            &api,
        );

        assert_eq!(api.calls(), vec!["post_note"]);
        match message {
            Message::NoteAdded(Err(DispatchError::Remote(_))) => {}
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(!path.exists());
    }

    #[test]
    fn fetches_pass_remote_payloads_through() {
        let api = CaptureApi::new();

        match execute(
            Command::FetchIncidentList {
                query: ListQuery::default(),
            },
            &api,
        ) {
            Message::IncidentListUpdated(Ok(list)) => {
                assert_eq!(list[0].id.as_ref(), "Q-REMOTE-LIST")
            }
            other => panic!("unexpected message: {other:?}"),
        }

        match execute(Command::FetchCurrentUser, &api) {
            Message::CurrentUserFetched(Ok(user)) => assert_eq!(user.id.as_ref(), "U-100"),
            other => panic!("unexpected message: {other:?}"),
        }

        match execute(
            Command::FetchAlerts {
                id: IncidentId::new("Q-7"),
            },
            &api,
        ) {
            Message::AlertsFetched { incident, result } => {
                assert_eq!(incident.as_ref(), "Q-7");
                assert!(result.expect("alerts").is_empty());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn failed_fetch_comes_back_as_a_wrapped_remote_error() {
        let api = FailingApi::new();
        match execute(
            Command::FetchIncidentList {
                query: ListQuery::default(),
            },
            &api,
        ) {
            Message::IncidentListUpdated(Err(err)) => {
                assert!(err.to_string().starts_with("remote call failed"))
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn open_editor_runs_the_session_without_touching_the_remote() {
        let api = CaptureApi::new();
        let message = execute(
            Command::OpenEditor {
                editor: "true".to_string(),
            },
            &api,
        );

        match message {
            Message::EditorFinished { error: None, .. } => {}
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(api.calls().is_empty());
    }
}
