//! Login form: RUT and masked password.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Focus};

const FORM_WIDTH: u16 = 44;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let [column] = Layout::horizontal([Constraint::Length(FORM_WIDTH)])
    .flex(Flex::Center)
    .areas(area);
  let [form] = Layout::vertical([Constraint::Length(8)])
    .flex(Flex::Center)
    .areas(column);

  let block = Block::default()
    .title(" Iniciar sesión ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(form);
  f.render_widget(block, form);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(3), Constraint::Length(3)])
    .split(inner);

  let masked = "•".repeat(app.password.chars().count());
  draw_field(f, rows[0], "RUT", app.rut.as_str(), app.focus == Focus::Rut);
  draw_field(f, rows[1], "Contraseña", &masked, app.focus == Focus::Password);
}

fn draw_field(f: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
  let border = if focused {
    Style::default().fg(Color::Cyan)
  } else {
    Style::default().fg(Color::DarkGray)
  };
  let block = Block::default()
    .title(format!(" {label} "))
    .borders(Borders::ALL)
    .border_style(border);

  let mut spans = vec![Span::raw(value.to_string())];
  if focused {
    spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
  }
  f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
