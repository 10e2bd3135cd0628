use ratatui::prelude::Color;

use crate::api::types::Status;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.len() <= max_len {
    s.to_string()
  } else {
    format!("{}...", &s[..max_len.saturating_sub(3)])
  }
}

/// Get the display color for an entity status badge
pub fn status_color(status: Status) -> Color {
  match status {
    Status::Active => Color::Green,
    Status::Pending => Color::Yellow,
    Status::Draft => Color::White,
    Status::Rejected => Color::Red,
    Status::Deleted => Color::DarkGray,
    Status::Archived => Color::Blue,
  }
}
