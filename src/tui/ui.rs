use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::core::session::SessionController;

use super::{
    state::{AppState, ViewMode},
    widgets::{
        editor::render_input_line,
        help::render_help_popup,
        history::render_history_panel,
        status::render_status_bar,
        terminal::{render_hex_view, render_plain_view},
    },
};

pub fn draw_ui(f: &mut Frame, state: &mut AppState, controller: &SessionController) {
    let size = f.size();
    state.terminal_size = (size.width, size.height);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Transcript and history
            Constraint::Length(3), // Input line
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
        .split(chunks[0]);

    match state.view_mode {
        ViewMode::Both => {
            let views = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(body[0]);
            render_plain_view(f, views[0], state);
            render_hex_view(f, views[1], state);
        }
        ViewMode::PlainText => render_plain_view(f, body[0], state),
        ViewMode::Hex => render_hex_view(f, body[0], state),
    }

    render_history_panel(f, body[1], state, controller);
    render_input_line(f, chunks[1], state, controller);
    render_status_bar(f, chunks[2], state, controller);

    if state.show_help {
        render_help_popup(f, size);
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Last `height` items of `total`, moved back by `offset`
pub fn visible_window(total: usize, height: usize, offset: usize) -> std::ops::Range<usize> {
    let end = total.saturating_sub(offset).max(height.min(total));
    let start = end.saturating_sub(height);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 40, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert_eq!(popup.x, 20);
    }

    #[test]
    fn test_visible_window_follows_tail() {
        assert_eq!(visible_window(100, 10, 0), 90..100);
        assert_eq!(visible_window(100, 10, 5), 85..95);
        assert_eq!(visible_window(5, 10, 0), 0..5);
    }

    #[test]
    fn test_visible_window_stops_at_top() {
        assert_eq!(visible_window(20, 10, 50), 0..10);
    }
}
