use std::collections::BTreeSet;

use super::KeyResult;
use crate::api::types::City;
use crate::ui::renderfns::truncate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

/// Events emitted by the city picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityPickerEvent {
  /// Apply the working selection as the new city filter
  Applied(BTreeSet<String>),
  Cancelled,
}

/// Multi-select overlay over the cached city list. Space toggles,
/// Enter applies the whole selection at once so the list refetches once,
/// not per toggle.
#[derive(Debug, Clone, Default)]
pub struct CityPicker {
  active: bool,
  cities: Vec<City>,
  selection: BTreeSet<String>,
  cursor: usize,
}

impl CityPicker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn show(&mut self, cities: Vec<City>, current: &BTreeSet<String>) {
    if cities.is_empty() {
      return;
    }
    self.active = true;
    self.cities = cities;
    self.selection = current.clone();
    self.cursor = 0;
  }

  pub fn hide(&mut self) {
    self.active = false;
    self.cities.clear();
    self.selection.clear();
    self.cursor = 0;
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<CityPickerEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(CityPickerEvent::Cancelled)
      }
      KeyCode::Enter => {
        let selection = std::mem::take(&mut self.selection);
        self.hide();
        KeyResult::Event(CityPickerEvent::Applied(selection))
      }
      KeyCode::Char(' ') => {
        if let Some(city) = self.cities.get(self.cursor) {
          if !self.selection.remove(&city.id) {
            self.selection.insert(city.id.clone());
          }
        }
        KeyResult::Handled
      }
      KeyCode::Char('j') | KeyCode::Down => {
        if !self.cities.is_empty() {
          self.cursor = (self.cursor + 1) % self.cities.len();
        }
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        if !self.cities.is_empty() {
          self.cursor = if self.cursor == 0 {
            self.cities.len() - 1
          } else {
            self.cursor - 1
          };
        }
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the picker overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active || self.cities.is_empty() {
      return;
    }

    let width = 34u16.min(area.width.saturating_sub(4));
    let height = (self.cities.len() as u16 + 2)
      .max(4)
      .min(area.height.saturating_sub(4));

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Cities (Space toggle, Enter apply) ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let items: Vec<ListItem> = self
      .cities
      .iter()
      .map(|city| {
        let mark = if self.selection.contains(&city.id) {
          "[x] "
        } else {
          "[ ] "
        };
        let line = Line::from(vec![
          Span::styled(mark, Style::default().fg(Color::Cyan)),
          Span::raw(truncate(&city.name, 24)),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.cursor));

    frame.render_stateful_widget(list, inner, &mut state);
  }
}
