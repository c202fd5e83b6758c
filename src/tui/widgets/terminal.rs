use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::transcript::{Direction, TranscriptEntry};
use crate::tui::{state::AppState, ui::visible_window};

fn direction_style(direction: Direction) -> Style {
    match direction {
        Direction::Sent => Style::default().fg(Color::Cyan),
        Direction::Received => Style::default().fg(Color::Green),
        Direction::Error => Style::default().fg(Color::Red),
    }
}

/// Split the transcript into display lines, colored by direction.
/// CR, LF, CR+LF and LF+CR each end a line; other control characters show as `.`.
pub fn transcript_lines(entries: &[TranscriptEntry]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();

    for entry in entries {
        let style = direction_style(entry.direction);
        let mut segment = String::new();
        let mut chars = entry.text.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\r' | '\n' => {
                    let partner = if c == '\r' { '\n' } else { '\r' };
                    if chars.peek() == Some(&partner) {
                        chars.next();
                    }
                    if !segment.is_empty() {
                        current.push(Span::styled(std::mem::take(&mut segment), style));
                    }
                    lines.push(Line::from(std::mem::take(&mut current)));
                }
                c if c.is_control() => segment.push('.'),
                c => segment.push(c),
            }
        }

        if !segment.is_empty() {
            current.push(Span::styled(segment, style));
        }
    }

    if !current.is_empty() {
        lines.push(Line::from(current));
    }
    lines
}

pub fn render_plain_view(f: &mut Frame, area: Rect, state: &AppState) {
    let lines = transcript_lines(state.transcript.entries());
    let height = area.height.saturating_sub(2) as usize;
    let window = visible_window(lines.len(), height, state.scroll_offset);

    let title = if state.scroll_offset > 0 {
        format!("Plain text (-{})", state.scroll_offset)
    } else {
        "Plain text".to_string()
    };

    let paragraph = Paragraph::new(lines[window].to_vec())
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(paragraph, area);
}

pub fn render_hex_view(f: &mut Frame, area: Rect, state: &AppState) {
    let rows = state.transcript.hex_dump(&state.hex_options);
    let height = area.height.saturating_sub(2) as usize;
    let window = visible_window(rows.len(), height, state.scroll_offset);

    let lines: Vec<Line> = rows[window]
        .iter()
        .map(|row| Line::from(row.as_str()))
        .collect();

    let options = &state.hex_options;
    let columns: Vec<&str> = [
        (options.offset, "offset"),
        (options.binary, "binary"),
        (options.plain_text, "text"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();
    let title = format!("Hex [{}]", columns.join(" "));

    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn entry(direction: Direction, text: &str) -> TranscriptEntry {
        TranscriptEntry {
            timestamp: SystemTime::now(),
            direction,
            text: text.to_string(),
        }
    }

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_line_breaks_split_lines() {
        let entries = vec![
            entry(Direction::Sent, "AT\r\n"),
            entry(Direction::Received, "OK\rREADY\n\rdone"),
        ];
        assert_eq!(
            plain(&transcript_lines(&entries)),
            vec!["AT", "OK", "READY", "done"]
        );
    }

    #[test]
    fn test_partial_lines_join_across_entries() {
        let entries = vec![
            entry(Direction::Received, "O"),
            entry(Direction::Received, "K\n"),
        ];
        let lines = transcript_lines(&entries);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].spans.len(), 2);
        assert_eq!(plain(&lines), vec!["OK"]);
    }

    #[test]
    fn test_control_characters_are_masked() {
        let entries = vec![entry(Direction::Received, "a\u{0}b\u{7}")];
        assert_eq!(plain(&transcript_lines(&entries)), vec!["a.b."]);
    }
}
