use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::api::Pagination;
use crate::ui::components::ToastKind;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request in response to input or a tick
pub enum ViewAction {
  /// No action needed
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back)
  Pop,
  /// Surface a toast in the app chrome
  Toast(ToastKind, String),
}

/// Trait for view behavior
///
/// Views handle their own input modes (search, pickers, dialogs) and
/// return actions for the App to execute. This creates a clean
/// delegation chain: App → View → Components
///
/// Views that load data asynchronously use Query<T> internally and poll
/// it from tick().
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// Called on each tick to poll async queries, mutations and debounce
  /// timers. May surface a toast.
  fn tick(&mut self) -> ViewAction {
    ViewAction::None
  }

  /// Server-reported paging for the footer, if this view pages
  fn pagination(&self) -> Option<Pagination> {
    None
  }

  /// True while a text overlay owns the keyboard, so the app must not
  /// steal printable keys (e.g. `:` for command mode)
  fn wants_text_input(&self) -> bool {
    false
  }

  /// Get keyboard shortcuts to display in the header
  /// Override this to provide view-specific shortcuts
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}
