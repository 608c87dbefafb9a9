//! Frame layout and widget rendering for the incident board.

use chrono::{DateTime, Local, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use triage_core::Urgency;

use crate::action::{action_label, BoardAction};
use crate::app::App;
use crate::model::IncidentRow;
use crate::render::status_color;

// -- Color palette ----------------------------------------------------------

const ACCENT: Color = Color::Cyan;
const HEADER_FG: Color = Color::White;
const DIM: Color = Color::DarkGray;
const SELECTED_BG: Color = Color::Indexed(236); // dark gray background
const KEY_FG: Color = Color::Yellow;
const MUTED: Color = Color::Gray;

fn urgency_color(urgency: Urgency) -> Color {
    match urgency {
        Urgency::High => Color::Red,
        Urgency::Low => MUTED,
    }
}

fn status_line_color(message: &str) -> Color {
    let lower = message.to_ascii_lowercase();
    if lower.contains("failed")
        || lower.contains("invalid")
        || lower.contains("aborted")
        || lower.contains("too small")
        || lower.contains("unknown")
    {
        Color::Red
    } else if lower.contains("acknowledged")
        || lower.contains("reassigned")
        || lower.contains("note added")
    {
        Color::Green
    } else if lower.contains("loaded") || lower.contains("ready") || lower.contains("signed in") {
        ACCENT
    } else {
        MUTED
    }
}

fn normal_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DIM))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
}

// -- Layout -----------------------------------------------------------------

// Header (2 rows) plus footer (3 rows) is the full chrome around the body;
// the detail buffer is sized against exactly that.
pub fn render_dashboard(frame: &mut Frame<'_>, app: &App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_header(frame, root[0], app);
    if app.detail_open() {
        render_detail(frame, root[1], app);
    } else {
        render_board(frame, root[1], app);
    }
    render_footer(frame, root[2], app);
}

// -- Header -----------------------------------------------------------------

fn render_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let mine = app.state.rows.iter().filter(|row| row.mine).count();
    let user = app
        .current_user()
        .map(|user| user.name.as_str())
        .unwrap_or("-");
    let filter = if app.state.only_mine { "mine" } else { "all" };

    let mut spans = vec![
        Span::styled(
            " Vaka ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" incidents:", Style::default().fg(DIM)),
        Span::styled(
            app.state.rows.len().to_string(),
            Style::default().fg(HEADER_FG),
        ),
        Span::styled("  mine:", Style::default().fg(DIM)),
        Span::styled(mine.to_string(), Style::default().fg(HEADER_FG)),
        Span::styled("  selected:", Style::default().fg(DIM)),
        Span::styled(
            app.state.selected.len().to_string(),
            Style::default().fg(HEADER_FG),
        ),
        Span::styled("  user:", Style::default().fg(DIM)),
        Span::styled(user.to_string(), Style::default().fg(ACCENT)),
        Span::styled("  filter:", Style::default().fg(DIM)),
        Span::styled(filter, Style::default().fg(HEADER_FG)),
    ];
    if let Some(incident) = app.focused_incident() {
        spans.push(Span::styled("  viewing:", Style::default().fg(DIM)));
        spans.push(Span::styled(
            incident.id.0.clone(),
            Style::default().fg(ACCENT),
        ));
    }

    let lines = vec![Line::from(spans), divider_line(area.width)];
    frame.render_widget(Paragraph::new(lines), area);
}

// -- Board ------------------------------------------------------------------

fn render_board(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        "    incident | title | status | urgency | service | assignees | opened",
        Style::default().fg(DIM).add_modifier(Modifier::BOLD),
    )));

    for (idx, row) in app.state.rows.iter().enumerate() {
        let is_cursor = idx == app.state.cursor;
        let is_marked = app.state.is_selected(&row.id);
        lines.push(format_incident_row(is_cursor, is_marked, row));
    }

    if app.state.rows.is_empty() {
        lines.push(Line::from(Span::styled(
            " no incidents",
            Style::default().fg(DIM),
        )));
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

// -- Detail -----------------------------------------------------------------

fn render_detail(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let lines = match app.detail_view() {
        Some(view) => view.visible_lines(),
        None => vec![Line::from(Span::styled(
            "loading incident...",
            Style::default().fg(DIM),
        ))],
    };
    frame.render_widget(Paragraph::new(lines), area);
}

// -- Footer -----------------------------------------------------------------

fn render_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let mut spans = footer_key_spans(app.detail_open());

    spans.push(Span::styled(" | status: ", Style::default().fg(DIM)));
    spans.push(Span::styled(
        app.state.status_line.as_str(),
        Style::default()
            .fg(status_line_color(&app.state.status_line))
            .add_modifier(Modifier::BOLD),
    ));

    let widget = Paragraph::new(Line::from(spans))
        .block(normal_block("Actions"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn footer_key_spans(detail_open: bool) -> Vec<Span<'static>> {
    let keys: &[(&str, &str)] = if detail_open {
        &[
            ("j/k", "scroll"),
            ("PgUp/PgDn", "page"),
            ("n", action_label(BoardAction::AddNote)),
            ("esc", "back"),
            ("q", "quit"),
        ]
    } else {
        &[
            ("j/k", "move"),
            ("space", "select"),
            ("enter", "detail"),
            ("a", action_label(BoardAction::Acknowledge)),
            ("s", action_label(BoardAction::Silence)),
            ("n", action_label(BoardAction::AddNote)),
            ("r", action_label(BoardAction::Refresh)),
            ("m", "mine"),
            ("esc", "quit"),
        ]
    };

    let mut spans: Vec<Span<'static>> = vec![Span::raw(" ")];
    for (key, label) in keys {
        spans.push(Span::styled(
            (*key).to_string(),
            Style::default().fg(KEY_FG).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("={label} "),
            Style::default().fg(MUTED),
        ));
    }
    spans
}

// -- Formatting helpers -----------------------------------------------------

fn format_incident_row(is_cursor: bool, is_marked: bool, row: &IncidentRow) -> Line<'_> {
    let opened = to_local_time(row.created_at);
    let base_style = if is_cursor {
        Style::default().bg(SELECTED_BG).fg(Color::White)
    } else if row.mine {
        Style::default().fg(HEADER_FG)
    } else {
        Style::default().fg(MUTED)
    };
    let prefix = if is_cursor { "\u{25B6} " } else { "  " };
    let marker = if is_marked { "* " } else { "  " };

    Line::from(vec![
        Span::styled(
            prefix,
            if is_cursor {
                Style::default().fg(ACCENT)
            } else {
                Style::default().fg(DIM)
            },
        ),
        Span::styled(
            marker,
            Style::default().fg(KEY_FG).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            &row.id.0,
            if is_cursor {
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
                    .bg(SELECTED_BG)
            } else {
                Style::default().fg(Color::White)
            },
        ),
        separator(),
        Span::styled(&row.title, base_style),
        separator(),
        Span::styled(
            row.status.as_str(),
            Style::default()
                .fg(status_color(row.status))
                .add_modifier(Modifier::BOLD),
        ),
        separator(),
        Span::styled(
            row.urgency.as_str(),
            Style::default().fg(urgency_color(row.urgency)),
        ),
        separator(),
        Span::styled(&row.service, base_style),
        separator(),
        Span::styled(&row.assignees, base_style),
        separator(),
        Span::styled(opened, Style::default().fg(DIM)),
    ])
}

fn separator() -> Span<'static> {
    Span::styled(" | ", Style::default().fg(DIM))
}

fn divider_line(width: u16) -> Line<'static> {
    let len = width.saturating_sub(4).max(8) as usize;
    Line::from(Span::styled(
        "\u{2500}".repeat(len),
        Style::default().fg(DIM),
    ))
}

fn to_local_time(value: DateTime<Utc>) -> String {
    value
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use ratatui::style::Color;

    use triage_core::{Assignment, Incident, IncidentId, ServiceId, User, UserId};

    use crate::model::IncidentRow;

    use super::{
        divider_line, footer_key_spans, format_incident_row, status_line_color, to_local_time,
    };

    fn mk_row(id: &str, mine: bool) -> IncidentRow {
        let mut incident = Incident::new(
            IncidentId::new(id),
            format!("title for {id}"),
            ServiceId("svc-payments".to_string()),
        );
        incident.assignments = vec![Assignment {
            assignee: User::new("U-100", "Alva Okonkwo"),
        }];
        let viewer = if mine {
            UserId::new("U-100")
        } else {
            UserId::new("U-999")
        };
        IncidentRow::from_incident(&incident, Some(&viewer))
    }

    fn line_text(line: &ratatui::text::Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn format_incident_row_includes_expected_columns() {
        let row = mk_row("Q-9", false);
        let line = format_incident_row(true, false, &row);
        let text = line_text(&line);
        let expected_ts = to_local_time(row.created_at);

        assert!(text.contains("Q-9"));
        assert!(text.contains("title for Q-9"));
        assert!(text.contains("triggered"));
        assert!(text.contains("high"));
        assert!(text.contains("svc-payments"));
        assert!(text.contains("Alva Okonkwo"));
        assert!(text.contains(&expected_ts));
    }

    #[test]
    fn format_incident_row_prefixes_cursor_and_marks_selection() {
        let row = mk_row("Q-1", false);

        let line = format_incident_row(true, true, &row);
        assert!(line_text(&line).starts_with("\u{25B6} * "));

        let line = format_incident_row(false, false, &row);
        assert!(line_text(&line).starts_with("    Q-1"));
    }

    #[test]
    fn mine_rows_render_brighter_than_others() {
        let mine_row = mk_row("Q-1", true);
        let their_row = mk_row("Q-1", false);
        let mine = format_incident_row(false, false, &mine_row);
        let theirs = format_incident_row(false, false, &their_row);

        // Title column carries the base row style.
        assert_eq!(mine.spans[4].style.fg, Some(Color::White));
        assert_eq!(theirs.spans[4].style.fg, Some(Color::Gray));
    }

    #[test]
    fn status_line_color_highlights_attention_levels() {
        assert_eq!(
            status_line_color("fetch_incidents failed: remote down"),
            Color::Red
        );
        assert_eq!(
            status_line_color("silenceIncidents: invalid arguments"),
            Color::Red
        );
        assert_eq!(
            status_line_color("terminal too small for the detail view: 10x4"),
            Color::Red
        );
        assert_eq!(status_line_color("acknowledged 2 incident(s)"), Color::Green);
        assert_eq!(status_line_color("loaded 4 incident(s)"), Color::Cyan);
        assert_eq!(status_line_color("refreshing"), Color::Gray);
    }

    #[test]
    fn footer_keys_name_every_board_action() {
        let text: String = footer_key_spans(false)
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(text.contains("a=acknowledge"));
        assert!(text.contains("s=silence"));
        assert!(text.contains("n=add_note"));
        assert!(text.contains("r=refresh"));

        let text: String = footer_key_spans(true)
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(text.contains("j/k=scroll"));
        assert!(text.contains("esc=back"));
    }

    #[test]
    fn divider_line_tracks_the_terminal_width() {
        assert_eq!(line_text(&divider_line(20)).chars().count(), 16);
        assert_eq!(line_text(&divider_line(4)).chars().count(), 8);
    }

    #[test]
    fn to_local_time_uses_fixed_format() {
        let dt = chrono::DateTime::parse_from_rfc3339("2026-02-08T12:34:56Z")
            .expect("parse rfc3339")
            .with_timezone(&Utc);
        let formatted = to_local_time(dt);

        assert_eq!(formatted.len(), 19);
        assert_eq!(formatted.chars().nth(4), Some('-'));
        assert_eq!(formatted.chars().nth(7), Some('-'));
        assert_eq!(formatted.chars().nth(10), Some(' '));
        assert_eq!(formatted.chars().nth(13), Some(':'));
        assert_eq!(formatted.chars().nth(16), Some(':'));
    }
}
