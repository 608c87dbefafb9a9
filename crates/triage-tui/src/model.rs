use chrono::{DateTime, Utc};
use triage_core::{Incident, IncidentId, IncidentStatus, Urgency, UserId};

/// One incident formatted for the board table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentRow {
    pub id: IncidentId,
    pub title: String,
    pub status: IncidentStatus,
    pub urgency: Urgency,
    pub service: String,
    pub assignees: String,
    /// True when the incident is assigned to the operator viewing the board.
    pub mine: bool,
    pub created_at: DateTime<Utc>,
}

impl IncidentRow {
    pub fn from_incident(incident: &Incident, viewer: Option<&UserId>) -> Self {
        let assignees = if incident.assignments.is_empty() {
            "-".to_string()
        } else {
            let joined = incident
                .assignments
                .iter()
                .map(|a| a.assignee.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            summarize(&joined, 24)
        };
        let mine = viewer
            .map(|id| incident.assigned_to(id))
            .unwrap_or(false);

        Self {
            id: incident.id.clone(),
            title: summarize(&incident.title, 56),
            status: incident.status,
            urgency: incident.urgency,
            service: incident.service.0.clone(),
            assignees,
            mine,
            created_at: incident.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    pub rows: Vec<IncidentRow>,
    pub cursor: usize,
    /// Batch selection in the order the operator picked the incidents.
    pub selected: Vec<IncidentId>,
    pub only_mine: bool,
    pub status_line: String,
}

impl Default for BoardState {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            cursor: 0,
            selected: Vec::new(),
            only_mine: false,
            status_line: "ready".to_string(),
        }
    }
}

impl BoardState {
    /// Replace the table contents, keeping the cursor in range and dropping
    /// selections that no longer exist.
    pub fn set_rows(&mut self, rows: Vec<IncidentRow>) {
        self.rows = rows;
        if self.cursor >= self.rows.len() {
            self.cursor = self.rows.len().saturating_sub(1);
        }
        self.selected
            .retain(|id| self.rows.iter().any(|row| &row.id == id));
    }

    pub fn cursor_row(&self) -> Option<&IncidentRow> {
        self.rows.get(self.cursor)
    }

    pub fn move_cursor_next(&mut self) {
        if self.rows.is_empty() {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor + 1) % self.rows.len();
    }

    pub fn move_cursor_previous(&mut self) {
        if self.rows.is_empty() {
            self.cursor = 0;
            return;
        }
        self.cursor = if self.cursor == 0 {
            self.rows.len() - 1
        } else {
            self.cursor - 1
        };
    }

    pub fn is_selected(&self, id: &IncidentId) -> bool {
        self.selected.contains(id)
    }

    /// Toggle the incident under the cursor in or out of the selection.
    /// Insertion order is preserved for the incidents that stay selected.
    pub fn toggle_selected(&mut self) {
        let Some(id) = self.cursor_row().map(|row| row.id.clone()) else {
            return;
        };
        if self.is_selected(&id) {
            self.selected.retain(|selected| selected != &id);
        } else {
            self.selected.push(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }
}

fn summarize(value: &str, max_len: usize) -> String {
    let mut s = value.trim().replace('\n', " ");
    if s.len() <= max_len {
        return s;
    }
    // Remote titles and names are not ASCII-only; the cut must land on a
    // char boundary.
    let mut cut = max_len.saturating_sub(3);
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
    s.push_str("...");
    s
}

#[cfg(test)]
mod tests {
    use triage_core::{Assignment, Incident, IncidentId, ServiceId, User, UserId};

    use super::{BoardState, IncidentRow};

    fn mk_incident(id: &str, title: &str) -> Incident {
        Incident::new(
            IncidentId::new(id),
            title.to_string(),
            ServiceId("svc-payments".to_string()),
        )
    }

    fn mk_row(id: &str) -> IncidentRow {
        IncidentRow::from_incident(&mk_incident(id, &format!("incident {id}")), None)
    }

    #[test]
    fn row_marks_the_viewers_incidents_as_mine() {
        let mut incident = mk_incident("Q-1", "db on fire");
        incident.assignments = vec![Assignment {
            assignee: User::new("U-100", "Alva Okonkwo"),
        }];

        let viewer = UserId::new("U-100");
        let row = IncidentRow::from_incident(&incident, Some(&viewer));
        assert!(row.mine);
        assert_eq!(row.assignees, "Alva Okonkwo");

        let other = UserId::new("U-999");
        let row = IncidentRow::from_incident(&incident, Some(&other));
        assert!(!row.mine);
    }

    #[test]
    fn row_uses_dash_when_unassigned() {
        let row = IncidentRow::from_incident(&mk_incident("Q-1", "db on fire"), None);
        assert!(!row.mine);
        assert_eq!(row.assignees, "-");
    }

    #[test]
    fn row_truncates_long_titles() {
        let long = "a ".repeat(60);
        let row = IncidentRow::from_incident(&mk_incident("Q-1", &long), None);
        assert!(row.title.len() <= 56);
        assert!(row.title.ends_with("..."));
    }

    #[test]
    fn row_truncation_cuts_on_char_boundaries() {
        // A multi-byte char straddling the cut point must not split.
        let title = format!("{}é incident overflow", "a".repeat(52));
        let mut incident = mk_incident("Q-1", &title);
        incident.assignments = vec![Assignment {
            assignee: User::new("U-1", "ø".repeat(13)),
        }];

        let row = IncidentRow::from_incident(&incident, None);
        assert!(row.title.len() <= 56);
        assert!(row.title.ends_with("..."));
        assert!(row.assignees.len() <= 24);
        assert!(row.assignees.ends_with("..."));
    }

    #[test]
    fn cursor_wraps_in_both_directions() {
        let mut state = BoardState::default();
        state.set_rows(vec![mk_row("Q-1"), mk_row("Q-2")]);

        state.move_cursor_previous();
        assert_eq!(state.cursor, 1);
        state.move_cursor_next();
        assert_eq!(state.cursor, 0);
        state.move_cursor_next();
        assert_eq!(state.cursor, 1);
    }

    #[test]
    fn cursor_stays_put_on_an_empty_board() {
        let mut state = BoardState::default();
        state.move_cursor_next();
        state.move_cursor_previous();
        assert_eq!(state.cursor, 0);
        assert!(state.cursor_row().is_none());
    }

    #[test]
    fn toggle_selected_preserves_insertion_order() {
        let mut state = BoardState::default();
        state.set_rows(vec![mk_row("Q-1"), mk_row("Q-2"), mk_row("Q-3")]);

        state.toggle_selected(); // Q-1
        state.cursor = 2;
        state.toggle_selected(); // Q-3
        state.cursor = 1;
        state.toggle_selected(); // Q-2
        assert_eq!(
            state.selected,
            vec![
                IncidentId::new("Q-1"),
                IncidentId::new("Q-3"),
                IncidentId::new("Q-2")
            ]
        );

        state.cursor = 2;
        state.toggle_selected(); // drop Q-3
        assert_eq!(
            state.selected,
            vec![IncidentId::new("Q-1"), IncidentId::new("Q-2")]
        );
    }

    #[test]
    fn set_rows_clamps_cursor_and_prunes_stale_selection() {
        let mut state = BoardState::default();
        state.set_rows(vec![mk_row("Q-1"), mk_row("Q-2"), mk_row("Q-3")]);
        state.cursor = 2;
        state.toggle_selected(); // Q-3
        state.cursor = 0;
        state.toggle_selected(); // Q-1

        state.set_rows(vec![mk_row("Q-1")]);
        assert_eq!(state.cursor, 0);
        assert_eq!(state.selected, vec![IncidentId::new("Q-1")]);

        state.set_rows(Vec::new());
        assert_eq!(state.cursor, 0);
        assert!(state.selected.is_empty());
    }
}
