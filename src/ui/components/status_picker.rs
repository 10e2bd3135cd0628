use super::KeyResult;
use crate::api::types::Status;
use crate::ui::renderfns::status_color;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

/// Events emitted by status picker that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusPickerEvent {
  /// Target status selected
  Selected(Status),
  /// Picker cancelled
  Cancelled,
}

/// Status picker listing the transitions legal from the current status.
/// The server is still the authority; this only shapes the affordance.
#[derive(Debug, Clone, Default)]
pub struct StatusPicker {
  active: bool,
  statuses: Vec<Status>,
  selected: usize,
  title: String,
}

impl StatusPicker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Check if picker is currently active
  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Show the picker for an entity currently in `current`. Does nothing
  /// when the status is terminal.
  pub fn show(&mut self, title: String, current: Status) {
    let targets = current.transitions();
    if targets.is_empty() {
      return;
    }
    self.active = true;
    self.statuses = targets.to_vec();
    self.selected = 0;
    self.title = title;
  }

  /// Hide the picker
  pub fn hide(&mut self) {
    self.active = false;
    self.statuses.clear();
    self.selected = 0;
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<StatusPickerEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(StatusPickerEvent::Cancelled)
      }
      KeyCode::Enter => {
        if let Some(status) = self.statuses.get(self.selected) {
          let status = *status;
          self.hide();
          KeyResult::Event(StatusPickerEvent::Selected(status))
        } else {
          self.hide();
          KeyResult::Event(StatusPickerEvent::Cancelled)
        }
      }
      KeyCode::Char('j') | KeyCode::Down => {
        if !self.statuses.is_empty() {
          self.selected = (self.selected + 1) % self.statuses.len();
        }
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        if !self.statuses.is_empty() {
          self.selected = if self.selected == 0 {
            self.statuses.len() - 1
          } else {
            self.selected - 1
          };
        }
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the status picker overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active || self.statuses.is_empty() {
      return;
    }

    let max_name_len = self
      .statuses
      .iter()
      .map(|s| s.label().len())
      .max()
      .unwrap_or(10);
    let width = (max_name_len as u16 + 6)
      .max(20)
      .min(area.width.saturating_sub(4));
    let height = (self.statuses.len() as u16 + 2)
      .max(3)
      .min(area.height.saturating_sub(4));

    // Center the overlay
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    let overlay_area = Rect::new(x, y, width, height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let items: Vec<ListItem> = self
      .statuses
      .iter()
      .map(|status| {
        let line = Line::from(vec![Span::styled(
          status.label(),
          Style::default().fg(status_color(*status)),
        )]);
        ListItem::new(line)
      })
      .collect();

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.selected));

    frame.render_stateful_widget(list, inner, &mut state);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_show_lists_only_legal_transitions() {
    let mut picker = StatusPicker::new();
    picker.show("Change status".to_string(), Status::Draft);
    assert!(picker.is_active());
    assert_eq!(picker.statuses, vec![Status::Pending]);
  }

  #[test]
  fn test_show_refuses_terminal_status() {
    let mut picker = StatusPicker::new();
    picker.show("Change status".to_string(), Status::Deleted);
    assert!(!picker.is_active());
  }

  #[test]
  fn test_select_emits_target() {
    let mut picker = StatusPicker::new();
    picker.show("Change status".to_string(), Status::Pending);
    picker.handle_key(key(KeyCode::Char('j')));

    let result = picker.handle_key(key(KeyCode::Enter));
    assert_eq!(
      result,
      KeyResult::Event(StatusPickerEvent::Selected(Status::Rejected))
    );
    assert!(!picker.is_active());
  }
}
