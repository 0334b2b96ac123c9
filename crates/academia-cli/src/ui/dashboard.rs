//! Signed-in landing screen.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Sesión ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let Some(session) = &app.session else {
    return;
  };

  let label = Style::default()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD);
  let row = |name: &str, value: String| {
    Line::from(vec![Span::styled(format!("{name:<10}"), label), Span::raw(value)])
  };

  let lines = vec![
    row("Correo", session.email.clone()),
    row("Rol", session.routing_role.tag().to_string()),
    row("Inicio", session.routing_role.landing_path().to_string()),
  ];
  f.render_widget(Paragraph::new(lines), inner);
}
