//! Renders an incident into a styled, word-wrapped detail buffer.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use triage_core::{Alert, Incident, IncidentStatus, Note};

const ACCENT: Color = Color::Cyan;
const DIM: Color = Color::DarkGray;
const OUTPUT_FG: Color = Color::White;

/// Rows taken by the surrounding chrome: the two header rows plus the
/// three-row actions footer.
pub const CHROME_ROWS: u16 = 5;

const MIN_DETAIL_WIDTH: u16 = 10;

/// Terminal surface the detail buffer is sized against.
///
/// Always passed in explicitly; resize events produce a new value instead of
/// mutating an ambient one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u16,
    pub height: u16,
}

impl Dimensions {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn viewport_height(&self) -> u16 {
        self.height.saturating_sub(CHROME_ROWS)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("terminal too small for the detail view: {width}x{height}")]
    TooSmall { width: u16, height: u16 },
}

/// The styled, scrollable detail buffer for one incident.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentView {
    lines: Vec<Line<'static>>,
    scroll: usize,
    viewport_height: usize,
}

impl IncidentView {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport_height)
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll = (self.scroll + amount).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.scroll = self.scroll.saturating_sub(amount);
    }

    /// Lines currently inside the viewport.
    pub fn visible_lines(&self) -> Vec<Line<'static>> {
        self.lines
            .iter()
            .skip(self.scroll)
            .take(self.viewport_height)
            .cloned()
            .collect()
    }
}

/// Compose the incident document and style it for the detail view.
///
/// Failure is a value, not an abort: a surface that cannot hold the viewport
/// comes back as [`RenderError::TooSmall`] for the caller to report.
pub fn render_incident(
    incident: &Incident,
    alerts: &[Alert],
    notes: &[Note],
    dims: Dimensions,
) -> Result<IncidentView, RenderError> {
    if dims.width < MIN_DETAIL_WIDTH || dims.viewport_height() == 0 {
        return Err(RenderError::TooSmall {
            width: dims.width,
            height: dims.height,
        });
    }

    let width = dims.width as usize;
    let mut lines = Vec::new();

    push_markdown(&mut lines, &format!("# {}", incident.title), width);
    lines.push(meta_line(incident));
    lines.push(Line::from(""));

    if incident.body.trim().is_empty() {
        lines.push(Line::from(Span::styled(
            "(no description)".to_string(),
            Style::default().fg(DIM).add_modifier(Modifier::ITALIC),
        )));
    } else {
        for raw in incident.body.lines() {
            push_markdown(&mut lines, raw, width);
        }
    }

    if !alerts.is_empty() {
        lines.push(Line::from(""));
        push_markdown(&mut lines, "## Alerts", width);
        for alert in alerts {
            push_markdown(
                &mut lines,
                &format!("- {} ({})", alert.summary, alert.status),
                width,
            );
        }
    }

    if !notes.is_empty() {
        lines.push(Line::from(""));
        push_markdown(&mut lines, "## Notes", width);
        for note in notes {
            let author = note
                .author
                .as_ref()
                .map(|user| user.name.as_str())
                .unwrap_or("unknown");
            push_markdown(&mut lines, &format!("- {author}: {}", note.content), width);
        }
    }

    Ok(IncidentView {
        lines,
        scroll: 0,
        viewport_height: dims.viewport_height() as usize,
    })
}

pub fn status_color(status: IncidentStatus) -> Color {
    match status {
        IncidentStatus::Triggered => Color::Red,
        IncidentStatus::Acknowledged => Color::Yellow,
        IncidentStatus::Resolved => Color::Green,
    }
}

fn meta_line(incident: &Incident) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            incident.status.as_str().to_string(),
            Style::default()
                .fg(status_color(incident.status))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ".to_string(), Style::default().fg(DIM)),
        Span::styled(
            format!("urgency {}", incident.urgency),
            Style::default().fg(OUTPUT_FG),
        ),
        Span::styled(" | ".to_string(), Style::default().fg(DIM)),
        Span::styled(incident.service.0.clone(), Style::default().fg(ACCENT)),
    ])
}

fn push_markdown(output: &mut Vec<Line<'static>>, raw: &str, width: usize) {
    if raw.trim().is_empty() {
        output.push(Line::from(""));
        return;
    }
    for piece in wrap_line(raw, width) {
        output.push(Line::from(markdown_line_to_spans(&piece)));
    }
}

/// Word-wrap one raw line at `width` display columns. Leading indent sticks
/// to the first piece; words wider than a line are split hard.
fn wrap_line(raw: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let trimmed = raw.trim_start();
    let indent = &raw[..raw.len() - trimmed.len()];

    let mut pieces: Vec<String> = Vec::new();
    let mut current = indent.to_string();
    let mut used = current.chars().count();
    let mut line_has_words = false;

    for word in trimmed.split_whitespace() {
        let mut word = word;
        loop {
            let word_len = word.chars().count();
            let needed = if line_has_words { word_len + 1 } else { word_len };
            if used + needed <= width {
                if line_has_words {
                    current.push(' ');
                }
                current.push_str(word);
                used += needed;
                line_has_words = true;
                break;
            }

            if !line_has_words {
                // The word alone overflows the line; split it hard.
                let split_at = width.saturating_sub(used).max(1);
                let byte_at = word
                    .char_indices()
                    .nth(split_at)
                    .map(|(idx, _)| idx)
                    .unwrap_or(word.len());
                current.push_str(&word[..byte_at]);
                pieces.push(std::mem::take(&mut current));
                used = 0;
                word = &word[byte_at..];
                if word.is_empty() {
                    break;
                }
                continue;
            }

            pieces.push(std::mem::take(&mut current));
            used = 0;
            line_has_words = false;
        }
    }

    if !current.is_empty() || pieces.is_empty() {
        pieces.push(current);
    }
    pieces
}

// ── Inline markdown ─────────────────────────────────────────────────────────

fn markdown_line_to_spans(line: &str) -> Vec<Span<'static>> {
    let trimmed = line.trim_start();

    // Headings
    if let Some(rest) = trimmed.strip_prefix("### ") {
        return vec![Span::styled(
            format!("   {rest}"),
            Style::default()
                .fg(OUTPUT_FG)
                .add_modifier(Modifier::ITALIC),
        )];
    }
    if let Some(rest) = trimmed.strip_prefix("## ") {
        return vec![Span::styled(
            rest.to_string(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )];
    }
    if let Some(rest) = trimmed.strip_prefix("# ") {
        return vec![Span::styled(
            rest.to_string(),
            Style::default()
                .fg(OUTPUT_FG)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )];
    }

    // Blockquotes
    if let Some(rest) = trimmed.strip_prefix("> ") {
        let mut spans = vec![Span::styled("\u{2502} ", Style::default().fg(Color::Green))];
        spans.extend(parse_inline_markdown(
            rest,
            Style::default().fg(Color::Green),
        ));
        return spans;
    }

    // Unordered lists
    let list_rest = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "));
    if let Some(rest) = list_rest {
        let indent = line.len() - trimmed.len();
        let prefix = " ".repeat(indent);
        let mut spans = vec![Span::styled(
            format!("{prefix} \u{2022} "),
            Style::default().fg(ACCENT),
        )];
        spans.extend(parse_inline_markdown(rest, Style::default().fg(OUTPUT_FG)));
        return spans;
    }

    // Ordered lists
    if let Some((num_str, rest)) = try_parse_ordered_list(trimmed) {
        let indent = line.len() - trimmed.len();
        let prefix = " ".repeat(indent);
        let mut spans = vec![Span::styled(
            format!("{prefix} {num_str}. "),
            Style::default().fg(Color::Blue),
        )];
        spans.extend(parse_inline_markdown(rest, Style::default().fg(OUTPUT_FG)));
        return spans;
    }

    parse_inline_markdown(line, Style::default().fg(OUTPUT_FG))
}

fn try_parse_ordered_list(trimmed: &str) -> Option<(String, &str)> {
    let dot_pos = trimmed.find(". ")?;
    let num_part = &trimmed[..dot_pos];
    if !num_part.is_empty() && num_part.chars().all(|c| c.is_ascii_digit()) {
        Some((num_part.to_string(), &trimmed[dot_pos + 2..]))
    } else {
        None
    }
}

fn parse_inline_markdown(text: &str, base_style: Style) -> Vec<Span<'static>> {
    if !text.contains('`') && !text.contains('*') {
        return vec![Span::styled(text.to_string(), base_style)];
    }

    let mut spans = Vec::with_capacity(4);
    let mut current = String::new();
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        // Backtick code span
        if chars[i] == '`' {
            if let Some(end) = find_closing_marker(&chars, i + 1, '`') {
                if !current.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut current), base_style));
                }
                let code: String = chars[i + 1..end].iter().collect();
                spans.push(Span::styled(code, Style::default().fg(ACCENT)));
                i = end + 1;
                continue;
            }
        }

        // Bold+italic (***text***)
        if i + 2 < len && chars[i] == '*' && chars[i + 1] == '*' && chars[i + 2] == '*' {
            if let Some(end) = find_closing_triple_star(&chars, i + 3) {
                if !current.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut current), base_style));
                }
                let content: String = chars[i + 3..end].iter().collect();
                spans.push(Span::styled(
                    content,
                    base_style.add_modifier(Modifier::BOLD | Modifier::ITALIC),
                ));
                i = end + 3;
                continue;
            }
            // No closing *** found; emit the literal stars.
            current.push_str("***");
            i += 3;
            continue;
        }

        // Bold (**text**)
        if i + 1 < len && chars[i] == '*' && chars[i + 1] == '*' {
            if let Some(end) = find_closing_double_star(&chars, i + 2) {
                if !current.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut current), base_style));
                }
                let content: String = chars[i + 2..end].iter().collect();
                spans.push(Span::styled(content, base_style.add_modifier(Modifier::BOLD)));
                i = end + 2;
                continue;
            }
            current.push_str("**");
            i += 2;
            continue;
        }

        // Italic (*text*)
        if chars[i] == '*' {
            if let Some(end) = find_closing_single_star(&chars, i + 1) {
                if !current.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut current), base_style));
                }
                let content: String = chars[i + 1..end].iter().collect();
                spans.push(Span::styled(
                    content,
                    base_style.add_modifier(Modifier::ITALIC),
                ));
                i = end + 1;
                continue;
            }
        }

        current.push(chars[i]);
        i += 1;
    }

    if !current.is_empty() {
        spans.push(Span::styled(current, base_style));
    }

    if spans.is_empty() {
        spans.push(Span::styled(String::new(), base_style));
    }

    spans
}

fn find_closing_marker(chars: &[char], start: usize, marker: char) -> Option<usize> {
    (start..chars.len()).find(|&i| chars[i] == marker)
}

fn find_closing_triple_star(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start;
    while i + 2 < chars.len() {
        if chars[i] == '*' && chars[i + 1] == '*' && chars[i + 2] == '*' {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn find_closing_double_star(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start;
    while i + 1 < chars.len() {
        if chars[i] == '*' && chars[i + 1] == '*' && (i + 2 >= chars.len() || chars[i + 2] != '*') {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn find_closing_single_star(chars: &[char], start: usize) -> Option<usize> {
    (start..chars.len()).find(|&i| chars[i] == '*' && (i + 1 >= chars.len() || chars[i + 1] != '*'))
}
