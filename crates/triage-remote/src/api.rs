//! Client seam for the remote incident-management service.

use triage_core::{Alert, Incident, IncidentId, IncidentStatus, Note, TeamId, User};

use crate::error::RemoteError;

/// Filter for the incident board listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListQuery {
    /// Empty means no team filter.
    pub team_ids: Vec<TeamId>,
    /// Empty means all statuses.
    pub statuses: Vec<IncidentStatus>,
}

impl ListQuery {
    pub fn for_teams(team_ids: Vec<TeamId>) -> Self {
        Self {
            team_ids,
            statuses: Vec::new(),
        }
    }

    pub fn matches(&self, incident: &Incident) -> bool {
        if !self.team_ids.is_empty() {
            let in_scope = incident
                .team
                .as_ref()
                .map(|team| self.team_ids.contains(team))
                .unwrap_or(false);
            if !in_scope {
                return false;
            }
        }
        self.statuses.is_empty() || self.statuses.contains(&incident.status)
    }
}

/// Remote incident-management client.
///
/// All calls are synchronous; callers that need concurrency run them on
/// worker threads. Timeouts and retries are the transport's concern, not
/// this seam's.
pub trait IncidentApi: Send + Sync {
    /// Identity of the operator the credentials belong to.
    fn current_user(&self) -> Result<User, RemoteError>;

    fn list_incidents(&self, query: &ListQuery) -> Result<Vec<Incident>, RemoteError>;

    fn incident(&self, id: &IncidentId) -> Result<Incident, RemoteError>;

    fn incident_alerts(&self, id: &IncidentId) -> Result<Vec<Alert>, RemoteError>;

    fn incident_notes(&self, id: &IncidentId) -> Result<Vec<Note>, RemoteError>;

    /// Acknowledge every given incident as the given user. Returns the
    /// updated incidents.
    fn acknowledge_incidents(
        &self,
        incidents: &[Incident],
        user: &User,
    ) -> Result<Vec<Incident>, RemoteError>;

    /// Reassign every given incident to `target`, chosen from `users`.
    /// Returns whatever incident list the remote reports back.
    fn reassign_incidents(
        &self,
        incidents: &[Incident],
        target: &User,
        users: &[User],
    ) -> Result<Vec<Incident>, RemoteError>;

    fn post_note(
        &self,
        incident: &IncidentId,
        author: &User,
        content: &str,
    ) -> Result<Note, RemoteError>;
}
