use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::session::SessionController;
use crate::tui::state::{AppState, Focus};

pub fn render_input_line(f: &mut Frame, area: Rect, state: &AppState, controller: &SessionController) {
    let editor = controller.editor();
    let focused = state.focus == Focus::Input;

    let title = format!(
        "Input [{} + {}]",
        controller.encoding_mode().short_name(),
        controller.line_break()
    );
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    // Keep the cursor inside the box on long input
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor = editor.cursor_position();
    let skip = (cursor + 1).saturating_sub(inner_width);
    let visible: String = editor.content().chars().skip(skip).take(inner_width).collect();

    let input = Paragraph::new(visible).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style),
    );
    f.render_widget(input, area);

    if focused {
        f.set_cursor(area.x + 1 + cursor.saturating_sub(skip) as u16, area.y + 1);
    }
}
