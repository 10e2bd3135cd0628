use std::collections::BTreeSet;

use super::KeyResult;
use crate::api::types::Status;
use crate::ui::renderfns::status_color;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Events emitted by the status filter bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterBarEvent {
  /// Membership of a status in the filter set should flip
  Toggled(Status),
}

/// Horizontal tab bar over the status set filter. Multi-select: each tab
/// toggles membership; the parent owns the actual set in its filter
/// state and refetches on every toggle.
#[derive(Debug, Clone)]
pub struct StatusFilterBar {
  active: bool,
  statuses: Vec<Status>,
  cursor: usize,
}

impl StatusFilterBar {
  /// `hidden` comes from config: lowercase status names to leave out.
  pub fn new(hidden: &BTreeSet<String>) -> Self {
    let statuses = Status::ALL
      .iter()
      .copied()
      .filter(|s| !hidden.contains(&s.label().to_lowercase()))
      .collect();
    Self {
      active: false,
      statuses,
      cursor: 0,
    }
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn toggle_active(&mut self) {
    self.active = !self.active;
    self.cursor = 0;
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FilterBarEvent> {
    if !self.active || self.statuses.is_empty() {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Char('h') | KeyCode::Left => {
        self.navigate(-1);
        KeyResult::Handled
      }
      KeyCode::Char('l') | KeyCode::Right => {
        self.navigate(1);
        KeyResult::Handled
      }
      KeyCode::Char(' ') => {
        let status = self.statuses[self.cursor];
        KeyResult::Event(FilterBarEvent::Toggled(status))
      }
      _ => KeyResult::NotHandled,
    }
  }

  /// Navigate tabs with wrapping
  fn navigate(&mut self, direction: i32) {
    let len = self.statuses.len();
    if len == 0 {
      return;
    }
    self.cursor = if direction > 0 {
      (self.cursor + 1) % len
    } else if self.cursor == 0 {
      len - 1
    } else {
      self.cursor - 1
    };
  }

  /// Render the bar; `selected` is the parent's current filter set.
  pub fn render(&self, frame: &mut Frame, area: Rect, selected: &BTreeSet<Status>) {
    if !self.active {
      return;
    }

    let mut spans = Vec::new();
    spans.push(Span::styled(
      "[Status] ",
      Style::default().fg(Color::Yellow),
    ));

    for (idx, status) in self.statuses.iter().enumerate() {
      if idx > 0 {
        spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
      }
      let mark = if selected.contains(status) { "✓" } else { " " };
      let style = if idx == self.cursor {
        Style::default().fg(Color::Black).bg(Color::Cyan)
      } else {
        Style::default().fg(status_color(*status))
      };
      spans.push(Span::styled(
        format!(" {}{} ", mark, status.label()),
        style,
      ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
  }
}
