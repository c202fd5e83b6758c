use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::tui::ui::centered_rect;

const KEYS: &[(&str, &str)] = &[
    ("F1", "Toggle this help"),
    ("F2", "Cycle encoding (character, binary, hex)"),
    ("F3", "Cycle line break"),
    ("F4", "Cycle view (both, plain text, hex)"),
    ("F5", "Connect or disconnect"),
    ("F6", "Clear the transcript"),
    ("F7", "Hex view: toggle offsets"),
    ("F8", "Hex view: toggle binary digits"),
    ("F9", "Hex view: toggle plain text column"),
    ("Tab", "Switch focus between input and history"),
    ("Enter", "Send input, or resend the selected history entry"),
    ("Up/Down", "Scroll transcript, or move history selection"),
    ("PgUp/PgDn", "Scroll transcript by a page"),
    ("Esc", "Quit"),
];

pub fn render_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(70, 70, area);
    f.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::from(Span::styled(
            "serialterm keys",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(KEYS.iter().map(|(key, action)| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", key), Style::default().fg(Color::Cyan)),
            Span::raw(*action),
        ])
    }));

    let help = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}
