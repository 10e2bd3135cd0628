use super::KeyResult;
use crate::api::types::Status;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

/// Row-level operations offered by the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
  View,
  Edit,
  ChangeStatus,
  Delete,
}

impl RowAction {
  fn label(self) -> &'static str {
    match self {
      RowAction::View => "View",
      RowAction::Edit => "Edit",
      RowAction::ChangeStatus => "Change status",
      RowAction::Delete => "Delete",
    }
  }
}

/// Events emitted by the action menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionMenuEvent {
  Selected(RowAction),
  Cancelled,
}

/// Per-row action overlay. "Change status" is only offered when the row
/// has somewhere to go.
#[derive(Debug, Clone, Default)]
pub struct ActionMenu {
  active: bool,
  actions: Vec<RowAction>,
  selected: usize,
  title: String,
}

impl ActionMenu {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn show(&mut self, title: String, status: Status) {
    self.active = true;
    self.selected = 0;
    self.title = title;
    self.actions = vec![RowAction::View, RowAction::Edit];
    if !status.is_terminal() {
      self.actions.push(RowAction::ChangeStatus);
    }
    self.actions.push(RowAction::Delete);
  }

  pub fn hide(&mut self) {
    self.active = false;
    self.actions.clear();
    self.selected = 0;
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ActionMenuEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(ActionMenuEvent::Cancelled)
      }
      KeyCode::Enter => {
        if let Some(action) = self.actions.get(self.selected) {
          let action = *action;
          self.hide();
          KeyResult::Event(ActionMenuEvent::Selected(action))
        } else {
          self.hide();
          KeyResult::Event(ActionMenuEvent::Cancelled)
        }
      }
      KeyCode::Char('j') | KeyCode::Down => {
        if !self.actions.is_empty() {
          self.selected = (self.selected + 1) % self.actions.len();
        }
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        if !self.actions.is_empty() {
          self.selected = if self.selected == 0 {
            self.actions.len() - 1
          } else {
            self.selected - 1
          };
        }
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the menu overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active || self.actions.is_empty() {
      return;
    }

    let width = 24u16.min(area.width.saturating_sub(4));
    let height = (self.actions.len() as u16 + 2)
      .max(3)
      .min(area.height.saturating_sub(4));

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    let overlay_area = Rect::new(x, y, width, height);

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
      .actions
      .iter()
      .map(|action| {
        let color = if *action == RowAction::Delete {
          Color::Red
        } else {
          Color::Cyan
        };
        ListItem::new(Line::from(Span::styled(
          action.label(),
          Style::default().fg(color),
        )))
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
  fn test_terminal_status_hides_status_change() {
    let mut menu = ActionMenu::new();
    menu.show("row".to_string(), Status::Deleted);
    assert!(!menu.actions.contains(&RowAction::ChangeStatus));
    assert!(menu.actions.contains(&RowAction::Delete));
  }

  #[test]
  fn test_select_action() {
    let mut menu = ActionMenu::new();
    menu.show("row".to_string(), Status::Active);

    menu.handle_key(key(KeyCode::Char('j')));
    let result = menu.handle_key(key(KeyCode::Enter));
    assert_eq!(result, KeyResult::Event(ActionMenuEvent::Selected(RowAction::Edit)));
  }
}
