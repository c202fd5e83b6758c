use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::core::session::SessionController;
use crate::tui::state::AppState;

pub fn render_status_bar(f: &mut Frame, area: Rect, state: &AppState, controller: &SessionController) {
    let (link, link_style) = if state.connected {
        ("CONNECTED", Style::default().fg(Color::Black).bg(Color::Green))
    } else {
        ("DISCONNECTED", Style::default().fg(Color::White).bg(Color::Red))
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", link), link_style),
        Span::raw(format!(" {} ", controller.config().summary())),
    ];
    if state.connected {
        spans.push(Span::styled(
            format!("| {} ", state.signals),
            Style::default().fg(Color::Cyan),
        ));
    }

    match &state.status_message {
        Some(message) => spans.push(Span::styled(
            format!("| {}", message),
            Style::default().fg(Color::Yellow),
        )),
        None => spans.push(Span::styled(
            "| F1 help | Esc quit",
            Style::default().fg(Color::Gray),
        )),
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
