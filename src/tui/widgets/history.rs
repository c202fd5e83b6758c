use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::core::session::SessionController;
use crate::tui::state::{AppState, Focus};

pub fn render_history_panel(f: &mut Frame, area: Rect, state: &AppState, controller: &SessionController) {
    let history = controller.history();

    let items: Vec<ListItem> = history
        .entries()
        .iter()
        .map(|entry| ListItem::new(entry.display()))
        .collect();

    let border_style = if state.focus == Focus::History {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("History ({})", history.len()))
                .border_style(border_style),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    if history.cursor() >= 0 {
        list_state.select(Some(history.cursor() as usize));
    }

    f.render_stateful_widget(list, area, &mut list_state);
}
