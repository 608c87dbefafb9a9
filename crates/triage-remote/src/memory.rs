//! In-memory incident backend for demo mode and tests.

use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use triage_core::{
    Alert, Assignment, Incident, IncidentId, IncidentStatus, Note, ServiceId, TeamId, Urgency,
    User,
};

use crate::api::{IncidentApi, ListQuery};
use crate::error::RemoteError;

#[derive(Debug, Default)]
struct MemoryState {
    current_user: Option<User>,
    incidents: Vec<Incident>,
    alerts: HashMap<String, Vec<Alert>>,
    notes: HashMap<String, Vec<Note>>,
    note_seq: u64,
}

/// Incident backend held entirely in process memory.
#[derive(Debug, Default)]
pub struct InMemoryApi {
    inner: Mutex<MemoryState>,
}

impl InMemoryApi {
    pub fn new(current_user: User) -> Self {
        Self {
            inner: Mutex::new(MemoryState {
                current_user: Some(current_user),
                ..MemoryState::default()
            }),
        }
    }

    pub fn insert_incident(&self, incident: Incident) {
        self.inner
            .lock()
            .expect("incident state lock")
            .incidents
            .push(incident);
    }

    pub fn insert_alert(&self, incident: &IncidentId, alert: Alert) {
        self.inner
            .lock()
            .expect("incident state lock")
            .alerts
            .entry(incident.0.clone())
            .or_default()
            .push(alert);
    }

    pub fn insert_note(&self, incident: &IncidentId, note: Note) {
        self.inner
            .lock()
            .expect("incident state lock")
            .notes
            .entry(incident.0.clone())
            .or_default()
            .push(note);
    }

    /// Seeded board used by `vaka --demo`.
    pub fn demo() -> Self {
        let alva = User {
            id: triage_core::UserId::new("U-100"),
            name: "Alva Okonkwo".to_string(),
            email: Some("alva@example.com".to_string()),
        };
        let reed = User::new("U-101", "Reed Calloway");
        let mina = User::new("U-102", "Mina Park");

        let api = Self::new(alva.clone());

        let mut payments = Incident::new(
            IncidentId::new("Q-1201"),
            "payments-api elevated 5xx rate".to_string(),
            ServiceId("svc-payments".to_string()),
        );
        payments.team = Some(TeamId("team-core".to_string()));
        payments.assignments = vec![Assignment { assignee: reed }];
        payments.created_at = Utc::now() - Duration::minutes(42);
        payments.body = [
            "## Impact",
            "",
            "Card captures failing for roughly **12%** of checkout traffic.",
            "",
            "## Working theory",
            "",
            "- connection pool exhaustion on the primary",
            "- retry storm from the mobile client",
            "",
            "> Paging database on-call for a second opinion.",
        ]
        .join("\n");

        let mut checkout = Incident::new(
            IncidentId::new("Q-1202"),
            "checkout latency above SLO".to_string(),
            ServiceId("svc-checkout".to_string()),
        );
        checkout.status = IncidentStatus::Acknowledged;
        checkout.team = Some(TeamId("team-core".to_string()));
        checkout.assignments = vec![Assignment {
            assignee: alva.clone(),
        }];
        checkout.created_at = Utc::now() - Duration::hours(3);
        checkout.body = [
            "p99 sitting at `2.4s` against a `800ms` objective.",
            "",
            "1. roll back the cache change",
            "2. re-run the load probe",
        ]
        .join("\n");

        let mut replica = Incident::new(
            IncidentId::new("Q-1203"),
            "reports db replica lag".to_string(),
            ServiceId("svc-reports".to_string()),
        );
        replica.urgency = Urgency::Low;
        replica.team = Some(TeamId("team-data".to_string()));
        replica.created_at = Utc::now() - Duration::hours(9);
        replica.body = "Replica is 40 minutes behind. *Nightly exports* may ship stale rows."
            .to_string();

        let mut ingest = Incident::new(
            IncidentId::new("Q-1204"),
            "alert ingest queue backing up".to_string(),
            ServiceId("svc-ingest".to_string()),
        );
        ingest.team = Some(TeamId("team-edge".to_string()));
        ingest.assignments = vec![Assignment { assignee: mina }];
        ingest.created_at = Utc::now() - Duration::minutes(7);

        api.insert_incident(payments);
        api.insert_incident(checkout);
        api.insert_incident(replica);
        api.insert_incident(ingest);

        api.insert_alert(
            &IncidentId::new("Q-1201"),
            Alert {
                id: "A-5001".to_string(),
                summary: "HTTP 5xx ratio above 5% on payments-api".to_string(),
                status: "triggered".to_string(),
                created_at: Utc::now() - Duration::minutes(42),
            },
        );
        api.insert_alert(
            &IncidentId::new("Q-1201"),
            Alert {
                id: "A-5002".to_string(),
                summary: "pgbouncer saturated connections".to_string(),
                status: "triggered".to_string(),
                created_at: Utc::now() - Duration::minutes(38),
            },
        );
        api.insert_note(
            &IncidentId::new("Q-1201"),
            Note {
                id: "N-1".to_string(),
                content: "Rolled the canary back, watching error rate.".to_string(),
                author: Some(alva),
                created_at: Utc::now() - Duration::minutes(20),
            },
        );

        api
    }
}

impl IncidentApi for InMemoryApi {
    fn current_user(&self) -> Result<User, RemoteError> {
        self.inner
            .lock()
            .expect("incident state lock")
            .current_user
            .clone()
            .ok_or(RemoteError::Unauthorized)
    }

    fn list_incidents(&self, query: &ListQuery) -> Result<Vec<Incident>, RemoteError> {
        let state = self.inner.lock().expect("incident state lock");
        Ok(state
            .incidents
            .iter()
            .filter(|incident| query.matches(incident))
            .cloned()
            .collect())
    }

    fn incident(&self, id: &IncidentId) -> Result<Incident, RemoteError> {
        let state = self.inner.lock().expect("incident state lock");
        state
            .incidents
            .iter()
            .find(|incident| &incident.id == id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound { id: id.0.clone() })
    }

    fn incident_alerts(&self, id: &IncidentId) -> Result<Vec<Alert>, RemoteError> {
        let state = self.inner.lock().expect("incident state lock");
        Ok(state.alerts.get(&id.0).cloned().unwrap_or_default())
    }

    fn incident_notes(&self, id: &IncidentId) -> Result<Vec<Note>, RemoteError> {
        let state = self.inner.lock().expect("incident state lock");
        Ok(state.notes.get(&id.0).cloned().unwrap_or_default())
    }

    fn acknowledge_incidents(
        &self,
        incidents: &[Incident],
        _user: &User,
    ) -> Result<Vec<Incident>, RemoteError> {
        let mut state = self.inner.lock().expect("incident state lock");
        let mut updated = Vec::with_capacity(incidents.len());
        for wanted in incidents {
            let stored = state
                .incidents
                .iter_mut()
                .find(|incident| incident.id == wanted.id)
                .ok_or_else(|| RemoteError::NotFound {
                    id: wanted.id.0.clone(),
                })?;
            stored.acknowledge();
            updated.push(stored.clone());
        }
        Ok(updated)
    }

    fn reassign_incidents(
        &self,
        incidents: &[Incident],
        target: &User,
        _users: &[User],
    ) -> Result<Vec<Incident>, RemoteError> {
        let mut state = self.inner.lock().expect("incident state lock");
        let mut updated = Vec::with_capacity(incidents.len());
        for wanted in incidents {
            let stored = state
                .incidents
                .iter_mut()
                .find(|incident| incident.id == wanted.id)
                .ok_or_else(|| RemoteError::NotFound {
                    id: wanted.id.0.clone(),
                })?;
            stored.reassign(target);
            updated.push(stored.clone());
        }
        Ok(updated)
    }

    fn post_note(
        &self,
        incident: &IncidentId,
        author: &User,
        content: &str,
    ) -> Result<Note, RemoteError> {
        let mut state = self.inner.lock().expect("incident state lock");
        let known = state.incidents.iter().any(|stored| &stored.id == incident);
        if !known {
            return Err(RemoteError::NotFound {
                id: incident.0.clone(),
            });
        }

        state.note_seq += 1;
        let note = Note {
            id: format!("N-{}", state.note_seq),
            content: content.to_string(),
            author: Some(author.clone()),
            created_at: Utc::now(),
        };
        state
            .notes
            .entry(incident.0.clone())
            .or_default()
            .push(note.clone());
        Ok(note)
    }
}
