//! Dashboard state machine: key presses become queued commands, completion
//! messages become state changes. Pure in-memory logic; the runner owns the
//! terminal and the worker threads.

use std::collections::VecDeque;

use crossterm::event::KeyEvent;

use triage_core::{Alert, Incident, IncidentId, Note, TriageConfig, User};
use triage_dispatch::{Command, Message};
use triage_remote::ListQuery;

use crate::action::{map_key_to_command, BoardAction, UiCommand};
use crate::model::{BoardState, IncidentRow};
use crate::render::{render_incident, Dimensions, IncidentView};

/// Rows jumped per PageUp/PageDown in the detail view.
const DETAIL_SCROLL_STEP: usize = 5;

pub struct App {
    pub state: BoardState,
    pub should_quit: bool,
    /// Last full incident list from the remote, unfiltered.
    incidents: Vec<Incident>,
    command_queue: VecDeque<Command>,
    dims: Dimensions,
    current_user: Option<User>,
    silence_users: Vec<User>,
    query: ListQuery,
    editor: String,
    /// Incident a note capture is in flight for. Survives the editor
    /// round-trip and detail-view closes.
    note_target: Option<IncidentId>,
    /// Incident whose detail view is open or loading.
    focus: Option<IncidentId>,
    detail_incident: Option<Incident>,
    detail_alerts: Vec<Alert>,
    detail_notes: Vec<Note>,
    detail_view: Option<IncidentView>,
}

impl App {
    pub fn new(config: &TriageConfig, editor: String, dims: Dimensions) -> Self {
        Self {
            state: BoardState::default(),
            should_quit: false,
            incidents: Vec::new(),
            command_queue: VecDeque::new(),
            dims,
            current_user: None,
            silence_users: config.silence_users(),
            query: ListQuery::for_teams(config.team_ids()),
            editor,
            note_target: None,
            focus: None,
            detail_incident: None,
            detail_alerts: Vec::new(),
            detail_notes: Vec::new(),
            detail_view: None,
        }
    }

    /// Queue the initial fetches that populate the board.
    pub fn bootstrap(&mut self) {
        self.command_queue.push_back(Command::FetchCurrentUser);
        self.queue_refresh();
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn detail_open(&self) -> bool {
        self.focus.is_some()
    }

    pub fn detail_view(&self) -> Option<&IncidentView> {
        self.detail_view.as_ref()
    }

    pub fn focused_incident(&self) -> Option<&Incident> {
        self.detail_incident.as_ref()
    }

    /// Hand the queued commands to the runner for dispatch.
    pub fn drain_commands(&mut self) -> Vec<Command> {
        self.command_queue.drain(..).collect()
    }

    pub fn set_dimensions(&mut self, dims: Dimensions) {
        self.dims = dims;
        self.rerender_detail();
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if let Some(command) = map_key_to_command(key) {
            self.apply_ui_command(command);
        }
    }

    fn apply_ui_command(&mut self, command: UiCommand) {
        match command {
            UiCommand::MoveNext => {
                if let Some(view) = self.detail_view.as_mut() {
                    view.scroll_down(1);
                } else {
                    self.state.move_cursor_next();
                }
            }
            UiCommand::MovePrevious => {
                if let Some(view) = self.detail_view.as_mut() {
                    view.scroll_up(1);
                } else {
                    self.state.move_cursor_previous();
                }
            }
            UiCommand::ScrollDetailDown => {
                if let Some(view) = self.detail_view.as_mut() {
                    view.scroll_down(DETAIL_SCROLL_STEP);
                }
            }
            UiCommand::ScrollDetailUp => {
                if let Some(view) = self.detail_view.as_mut() {
                    view.scroll_up(DETAIL_SCROLL_STEP);
                }
            }
            UiCommand::ToggleSelect => {
                if self.focus.is_none() {
                    self.state.toggle_selected();
                }
            }
            UiCommand::OpenDetail => self.open_detail(),
            UiCommand::Back => {
                if self.focus.is_some() {
                    self.close_detail();
                    self.state.status_line = "board".to_string();
                } else {
                    self.should_quit = true;
                }
            }
            UiCommand::ToggleOnlyMine => {
                self.state.only_mine = !self.state.only_mine;
                self.rebuild_rows();
                self.state.status_line = if self.state.only_mine {
                    "showing only mine".to_string()
                } else {
                    "showing all".to_string()
                };
            }
            UiCommand::Dispatch(action) => self.dispatch_action(action),
            UiCommand::Quit => self.should_quit = true,
        }
    }

    fn open_detail(&mut self) {
        if self.focus.is_some() {
            return;
        }
        let Some(id) = self.state.cursor_row().map(|row| row.id.clone()) else {
            self.state.status_line = "no incident under cursor".to_string();
            return;
        };
        self.focus = Some(id.clone());
        self.detail_incident = None;
        self.detail_alerts.clear();
        self.detail_notes.clear();
        self.detail_view = None;
        self.state.status_line = format!("loading {id}");
        self.command_queue
            .push_back(Command::FetchIncident { id: id.clone() });
        self.command_queue
            .push_back(Command::FetchAlerts { id: id.clone() });
        self.command_queue.push_back(Command::FetchNotes { id });
    }

    fn close_detail(&mut self) {
        self.focus = None;
        self.detail_incident = None;
        self.detail_alerts.clear();
        self.detail_notes.clear();
        self.detail_view = None;
    }

    fn dispatch_action(&mut self, action: BoardAction) {
        match action {
            BoardAction::Refresh => {
                self.queue_refresh();
                self.state.status_line = "refreshing".to_string();
            }
            BoardAction::Acknowledge => {
                let incidents = self.batch_targets();
                if incidents.is_empty() {
                    self.state.status_line = "no incident selected".to_string();
                    return;
                }
                self.state.status_line =
                    format!("acknowledging {} incident(s)", incidents.len());
                self.state.clear_selection();
                self.command_queue
                    .push_back(Command::AcknowledgeIncidents { incidents });
            }
            BoardAction::Silence => {
                let incidents = self.batch_targets();
                if incidents.is_empty() {
                    self.state.status_line = "no incident selected".to_string();
                    return;
                }
                self.state.status_line = format!("silencing {} incident(s)", incidents.len());
                self.state.clear_selection();
                // An empty silence roster is still dispatched; the invalid
                // arguments failure comes back through the normal channel.
                self.command_queue.push_back(Command::SilenceIncidents {
                    incidents,
                    users: self.silence_users.clone(),
                });
            }
            BoardAction::AddNote => {
                let target = self
                    .focus
                    .clone()
                    .or_else(|| self.state.cursor_row().map(|row| row.id.clone()));
                let Some(incident) = target else {
                    self.state.status_line = "no incident selected".to_string();
                    return;
                };
                self.state.status_line = format!("capturing note for {incident}");
                self.note_target = Some(incident);
                self.command_queue.push_back(Command::OpenEditor {
                    editor: self.editor.clone(),
                });
            }
        }
    }

    /// Incidents a batch action applies to: the selection if one exists,
    /// otherwise the row under the cursor.
    fn batch_targets(&self) -> Vec<Incident> {
        if !self.state.selected.is_empty() {
            return self
                .state
                .selected
                .iter()
                .filter_map(|id| self.find_incident(id).cloned())
                .collect();
        }
        self.state
            .cursor_row()
            .and_then(|row| self.find_incident(&row.id).cloned())
            .map(|incident| vec![incident])
            .unwrap_or_default()
    }

    fn find_incident(&self, id: &IncidentId) -> Option<&Incident> {
        self.incidents.iter().find(|incident| &incident.id == id)
    }

    fn queue_refresh(&mut self) {
        self.command_queue.push_back(Command::FetchIncidentList {
            query: self.query.clone(),
        });
    }

    pub fn apply_message(&mut self, message: Message) {
        match message {
            Message::IncidentListUpdated(Ok(incidents)) => {
                self.incidents = incidents;
                self.rebuild_rows();
                self.state.status_line = format!("loaded {} incident(s)", self.incidents.len());
            }
            Message::IncidentListUpdated(Err(err)) => {
                self.state.status_line = format!("fetch_incidents failed: {err}");
            }
            Message::IncidentFetched(Ok(incident)) => {
                if self.focus.as_ref() == Some(&incident.id) {
                    self.state.status_line = format!("viewing {}", incident.id);
                    self.detail_incident = Some(incident);
                    self.rerender_detail();
                }
            }
            Message::IncidentFetched(Err(err)) => {
                self.state.status_line = format!("fetch_incident failed: {err}");
            }
            Message::AlertsFetched { incident, result } => {
                if self.focus.as_ref() != Some(&incident) {
                    return;
                }
                match result {
                    Ok(alerts) => {
                        self.detail_alerts = alerts;
                        self.rerender_detail();
                    }
                    Err(err) => {
                        self.state.status_line = format!("fetch_alerts failed: {err}");
                    }
                }
            }
            Message::NotesFetched { incident, result } => {
                if self.focus.as_ref() != Some(&incident) {
                    return;
                }
                match result {
                    Ok(notes) => {
                        self.detail_notes = notes;
                        self.rerender_detail();
                    }
                    Err(err) => {
                        self.state.status_line = format!("fetch_notes failed: {err}");
                    }
                }
            }
            Message::CurrentUserFetched(Ok(user)) => {
                self.state.status_line = format!("signed in as {}", user.name);
                self.current_user = Some(user);
                self.rebuild_rows();
            }
            Message::CurrentUserFetched(Err(err)) => {
                self.state.status_line = format!("fetch_current_user failed: {err}");
            }
            Message::IncidentsAcknowledged(Ok(updated)) => {
                self.state.status_line = format!("acknowledged {} incident(s)", updated.len());
                self.queue_refresh();
            }
            Message::IncidentsAcknowledged(Err(err)) => {
                self.state.status_line = format!("acknowledge failed: {err}");
            }
            Message::ReassignmentRequested { incidents, users } => {
                match users.first().cloned() {
                    Some(target) => {
                        self.state.status_line = format!(
                            "reassigning {} incident(s) to {}",
                            incidents.len(),
                            target.name
                        );
                        self.command_queue.push_back(Command::ReassignIncidents {
                            incidents,
                            target,
                            users,
                        });
                    }
                    None => {
                        self.state.status_line = "no silence user configured".to_string();
                    }
                }
            }
            Message::IncidentsReassigned(Ok(updated)) => {
                self.state.status_line = format!("reassigned {} incident(s)", updated.len());
                self.queue_refresh();
            }
            Message::IncidentsReassigned(Err(err)) => {
                self.state.status_line = format!("reassign failed: {err}");
            }
            Message::NoteAdded(Ok(_)) => {
                self.state.status_line = "note added".to_string();
                if let Some(incident) = self.note_target.take() {
                    if self.focus.as_ref() == Some(&incident) {
                        self.command_queue
                            .push_back(Command::FetchNotes { id: incident });
                    }
                }
            }
            Message::NoteAdded(Err(err)) => {
                self.note_target = None;
                self.state.status_line = format!("add_note failed: {err}");
            }
            Message::EditorFinished { file, error } => match error {
                Some(err) => {
                    self.note_target = None;
                    self.state.status_line = format!("note capture aborted: {err}");
                    drop(file);
                }
                None => match (self.note_target.clone(), self.current_user.clone()) {
                    (Some(incident), Some(user)) => {
                        self.state.status_line = format!("posting note to {incident}");
                        self.command_queue.push_back(Command::AddNote {
                            incident,
                            user,
                            file,
                        });
                    }
                    (None, _) => {
                        self.state.status_line = "note target lost; draft discarded".to_string();
                        drop(file);
                    }
                    (_, None) => {
                        self.note_target = None;
                        self.state.status_line = "identity unknown; note not posted".to_string();
                        drop(file);
                    }
                },
            },
            Message::Failed(err) => {
                self.state.status_line = err.to_string();
            }
        }
    }

    fn rebuild_rows(&mut self) {
        let viewer = self.current_user.as_ref().map(|user| user.id.clone());
        let rows = self
            .incidents
            .iter()
            .filter(|incident| {
                if !self.state.only_mine {
                    return true;
                }
                viewer
                    .as_ref()
                    .map(|id| incident.assigned_to(id))
                    .unwrap_or(false)
            })
            .map(|incident| IncidentRow::from_incident(incident, viewer.as_ref()))
            .collect();
        self.state.set_rows(rows);
    }

    /// Rebuild the detail buffer from whatever context has arrived so far.
    /// A surface that cannot hold it downgrades to a status-line report.
    fn rerender_detail(&mut self) {
        let Some(incident) = self.detail_incident.as_ref() else {
            return;
        };
        match render_incident(
            incident,
            &self.detail_alerts,
            &self.detail_notes,
            self.dims,
        ) {
            Ok(mut view) => {
                if let Some(previous) = &self.detail_view {
                    view.scroll_down(previous.scroll());
                }
                self.detail_view = Some(view);
            }
            Err(err) => {
                self.detail_view = None;
                self.state.status_line = err.to_string();
            }
        }
    }
}
