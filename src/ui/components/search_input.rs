use std::time::Duration;

use super::input::{InputResult, TextInput};
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::debounce::Debounced;

/// Events emitted by search input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
  /// Debounced query change, or an explicit submit/cancel. The parent
  /// applies this to its filter state and refetches.
  Changed(String),
}

/// Search input overlay with debounced propagation.
///
/// Keystrokes land in the debouncer; the parent polls
/// `poll_debounced()` from its tick so a typing burst produces one
/// fetch, not one per key.
#[derive(Debug)]
pub struct SearchInput {
  input: TextInput,
  active: bool,
  debounce: Debounced<String>,
}

impl SearchInput {
  pub fn new(delay: Duration) -> Self {
    Self {
      input: TextInput::new(),
      active: false,
      debounce: Debounced::new(delay),
    }
  }

  /// Check if search is currently active
  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Get the current search query
  pub fn query(&self) -> &str {
    self.input.value()
  }

  /// Activate search mode
  pub fn activate(&mut self) {
    self.active = true;
    self.input.clear();
  }

  /// Emit the debounced query if its delay has elapsed. Call from tick.
  pub fn poll_debounced(&mut self) -> Option<String> {
    self.debounce.poll()
  }

  /// Handle a key event
  /// Call this regardless of active state - it handles activation too
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<SearchEvent> {
    // If not active, check for activation key
    if !self.active {
      if key.code == KeyCode::Char('/') {
        self.activate();
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    // Active - delegate to TextInput
    match self.input.handle_key(key) {
      InputResult::Submitted(query) => {
        self.active = false;
        self.debounce.cancel();
        KeyResult::Event(SearchEvent::Changed(query))
      }
      InputResult::Cancelled => {
        self.active = false;
        self.input.clear();
        self.debounce.cancel();
        KeyResult::Event(SearchEvent::Changed(String::new()))
      }
      InputResult::Consumed => {
        self.debounce.set(self.input.value().to_string());
        KeyResult::Handled
      }
      InputResult::NotHandled => KeyResult::NotHandled,
    }
  }

  /// Render the search overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (area.width * 60 / 100).clamp(30, 60);
    let height = 3; // Just input line with borders

    // Position at top-left of content area with small margin
    let x = area.x + 1;
    let y = area.y + 1;

    let overlay_area = Rect::new(x, y, width, height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Search ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let input_line = Line::from(vec![
      Span::styled("/", Style::default().fg(Color::Yellow)),
      Span::raw(self.input.value()),
      Span::styled("_", Style::default().fg(Color::Yellow)), // Cursor
    ]);
    frame.render_widget(Paragraph::new(input_line), inner);
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
  fn test_slash_activates() {
    let mut search = SearchInput::new(Duration::from_millis(5));
    assert_eq!(search.handle_key(key(KeyCode::Char('/'))), KeyResult::Handled);
    assert!(search.is_active());
  }

  #[test]
  fn test_typing_burst_debounces_to_latest() {
    let mut search = SearchInput::new(Duration::from_millis(10));
    search.activate();

    search.handle_key(key(KeyCode::Char('a')));
    search.handle_key(key(KeyCode::Char('b')));
    search.handle_key(key(KeyCode::Char('c')));

    assert_eq!(search.poll_debounced(), None);
    std::thread::sleep(Duration::from_millis(15));
    assert_eq!(search.poll_debounced(), Some("abc".to_string()));
    assert_eq!(search.poll_debounced(), None);
  }

  #[test]
  fn test_submit_emits_immediately_and_closes() {
    let mut search = SearchInput::new(Duration::from_secs(60));
    search.activate();
    search.handle_key(key(KeyCode::Char('x')));

    let result = search.handle_key(key(KeyCode::Enter));
    assert_eq!(result, KeyResult::Event(SearchEvent::Changed("x".to_string())));
    assert!(!search.is_active());
    // The pending debounce must not fire a second change later.
    assert_eq!(search.poll_debounced(), None);
  }

  #[test]
  fn test_cancel_clears_filter() {
    let mut search = SearchInput::new(Duration::from_millis(5));
    search.activate();
    search.handle_key(key(KeyCode::Char('x')));

    let result = search.handle_key(key(KeyCode::Esc));
    assert_eq!(result, KeyResult::Event(SearchEvent::Changed(String::new())));
    assert_eq!(search.poll_debounced(), None);
  }
}
