pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use ratatui::prelude::*;
use ratatui::widgets::ListState;

use crate::app::{App, Mode};

/// Clamp a list selection to the current row count.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  match state.selected() {
    Some(_) if len == 0 => state.select(None),
    Some(selected) if selected >= len => state.select(Some(len - 1)),
    None if len > 0 => state.select(Some(0)),
    _ => {}
  }
}

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let shortcuts = app
    .current_view()
    .map(|view| view.shortcuts())
    .unwrap_or_default();
  renderfns::draw_header(frame, chunks[0], app.base_url(), &app.section(), &shortcuts);

  let content_area = chunks[1];
  if let Some(view) = app.current_view_mut() {
    view.render(frame, content_area);
  }

  let pagination = app.current_view().and_then(|view| view.pagination());
  components::draw_footer(frame, chunks[2], &app.view_breadcrumb(), pagination);

  // Command overlay on top of the content
  if *app.mode() == Mode::Command {
    components::draw_command_overlay(
      frame,
      content_area,
      app.command_input(),
      &app.autocomplete_suggestions(),
      app.selected_suggestion(),
    );
  }

  // Toasts above everything
  app.toasts().render(frame, content_area);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_ensure_valid_selection_clamps() {
    let mut state = ListState::default();
    state.select(Some(10));
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(2));
  }

  #[test]
  fn test_ensure_valid_selection_empty_list() {
    let mut state = ListState::default();
    state.select(Some(0));
    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }

  #[test]
  fn test_ensure_valid_selection_defaults_to_first() {
    let mut state = ListState::default();
    ensure_valid_selection(&mut state, 5);
    assert_eq!(state.selected(), Some(0));
  }
}
