use std::time::{Duration, Instant};

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::ui::renderfns::truncate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
  Error,
  Info,
}

#[derive(Debug)]
struct Toast {
  kind: ToastKind,
  message: String,
  created: Instant,
}

/// Short-lived notifications stacked above the footer.
///
/// Every failure is scoped to the operation that raised it; a toast is
/// the whole surface, the rest of the UI stays interactive.
#[derive(Debug)]
pub struct Toasts {
  items: Vec<Toast>,
  ttl: Duration,
}

impl Default for Toasts {
  fn default() -> Self {
    Self {
      items: Vec::new(),
      ttl: Duration::from_secs(4),
    }
  }
}

impl Toasts {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) {
    self.items.push(Toast {
      kind,
      message: message.into(),
      created: Instant::now(),
    });
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// Drop expired toasts. Call from the event-loop tick.
  pub fn tick(&mut self) {
    let ttl = self.ttl;
    self.items.retain(|toast| toast.created.elapsed() < ttl);
  }

  /// Render the stack anchored to the bottom-right of `area`.
  pub fn render(&self, frame: &mut Frame, area: Rect) {
    if self.items.is_empty() {
      return;
    }

    let width = (area.width * 40 / 100).clamp(24, 60);
    let mut y_offset = 0u16;

    // Newest at the bottom
    for toast in self.items.iter().rev().take(4) {
      let height = 3;
      if y_offset + height > area.height {
        break;
      }

      let x = area.x + area.width.saturating_sub(width + 1);
      let y = area.y + area.height.saturating_sub(y_offset + height + 1);
      let toast_area = Rect::new(x, y, width, height);

      let (color, title) = match toast.kind {
        ToastKind::Error => (Color::Red, " Error "),
        ToastKind::Info => (Color::Green, " Info "),
      };

      frame.render_widget(Clear, toast_area);
      let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title);
      let inner = block.inner(toast_area);
      frame.render_widget(block, toast_area);

      let text = truncate(&toast.message, inner.width.saturating_sub(1) as usize);
      frame.render_widget(Paragraph::new(text), inner);

      y_offset += height;
    }
  }
}
