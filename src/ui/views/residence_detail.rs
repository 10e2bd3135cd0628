use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::api::types::{Residence, ResidencePayload};
use crate::api::CachedClient;
use crate::mutation::{Mutation, MutationOutcome};
use crate::query::{Query, QueryState};
use crate::ui::components::{InputResult, TextInput, ToastKind};
use crate::ui::renderfns::{status_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};

/// Single-field edit overlay state
#[derive(Default)]
struct EditState {
  active: bool,
  input: TextInput,
  /// Inline validation message, shown in the overlay
  error: Option<String>,
}

/// Detail view for one residence, with inline rename (PUT).
pub struct ResidenceDetailView {
  api: CachedClient,
  id: String,
  query: Query<Residence>,
  /// Local copy of the loaded residence; the rename edits this
  /// optimistically and rolls back on failure.
  current: Option<Residence>,
  edit: EditState,
  /// Previous name travels as rollback context
  mutation: Mutation<String>,
  open_edit_on_load: bool,
}

impl ResidenceDetailView {
  pub fn new(id: String, api: CachedClient) -> Self {
    let query_api = api.clone();
    let query_id = id.clone();
    let mut query = Query::new(move || {
      let api = query_api.clone();
      let id = query_id.clone();
      async move { api.get_residence(&id).await.map_err(|e| e.toast_message()) }
    });
    query.fetch();

    Self {
      api,
      id,
      query,
      current: None,
      edit: EditState::default(),
      mutation: Mutation::new(),
      open_edit_on_load: false,
    }
  }

  /// Open the rename overlay as soon as the residence loads. Used by the
  /// list's "Edit" action.
  pub fn with_edit(mut self) -> Self {
    self.open_edit_on_load = true;
    self
  }

  fn open_edit(&mut self) {
    let Some(residence) = &self.current else {
      return;
    };
    self.edit.active = true;
    self.edit.error = None;
    self.edit.input.set_value(residence.name.clone());
  }

  fn submit_rename(&mut self, name: String) {
    let name = name.trim().to_string();
    if name.is_empty() {
      // Caught before any request goes out
      self.edit.error = Some("Name must not be empty".to_string());
      return;
    }

    let Some(residence) = &mut self.current else {
      return;
    };
    if self.mutation.is_pending() {
      return;
    }

    let previous = std::mem::replace(&mut residence.name, name.clone());
    let payload = ResidencePayload::rename(residence, name);

    self.edit.active = false;

    let api = self.api.clone();
    let id = self.id.clone();
    self.mutation.start(previous, async move {
      api
        .update_residence(&id, &payload)
        .await
        .map(|_| ())
        .map_err(|e| e.toast_message())
    });
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let title = match self.query.state() {
      QueryState::Loading => " Residence (loading...) ".to_string(),
      QueryState::Error(_) => " Residence (fetch failed) ".to_string(),
      _ => self
        .current
        .as_ref()
        .map(|r| format!(" {} ", truncate(&r.name, 40)))
        .unwrap_or_else(|| " Residence ".to_string()),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let Some(residence) = &self.current else {
      let content = if self.query.is_error() {
        "Failed to load residence. Press 'r' to retry."
      } else {
        "Loading..."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    };

    let field = |label: &str, value: String| {
      Line::from(vec![
        Span::styled(format!("{:<10}", label), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
      ])
    };

    let lines = vec![
      Line::from(vec![
        Span::styled("Status    ", Style::default().fg(Color::DarkGray)),
        Span::styled(
          residence.status.label(),
          Style::default().fg(status_color(residence.status)),
        ),
      ]),
      field("Brand", residence.brand.clone().unwrap_or_else(|| "-".to_string())),
      field(
        "City",
        residence.city_name.clone().unwrap_or_else(|| "-".to_string()),
      ),
      field(
        "Units",
        residence
          .units
          .map(|u| u.to_string())
          .unwrap_or_else(|| "-".to_string()),
      ),
      field(
        "Updated",
        residence.updated_at.format("%Y-%m-%d %H:%M").to_string(),
      ),
      field("Id", residence.id.clone()),
    ];

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
  }

  fn render_edit_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.edit.active {
      return;
    }

    let width = (area.width * 60 / 100).clamp(30, 60);
    let height = if self.edit.error.is_some() { 4 } else { 3 };

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Rename ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let mut lines = vec![Line::from(vec![
      Span::raw(self.edit.input.value()),
      Span::styled("_", Style::default().fg(Color::Yellow)),
    ])];
    if let Some(error) = &self.edit.error {
      lines.push(Line::from(Span::styled(
        error.clone(),
        Style::default().fg(Color::Red),
      )));
    }
    frame.render_widget(Paragraph::new(lines), inner);
  }
}

impl View for ResidenceDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.edit.active {
      match self.edit.input.handle_key(key) {
        InputResult::Submitted(name) => self.submit_rename(name),
        InputResult::Cancelled => {
          self.edit.active = false;
          self.edit.error = None;
        }
        InputResult::Consumed => self.edit.error = None,
        InputResult::NotHandled => {}
      }
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('e') => self.open_edit(),
      KeyCode::Char('r') => self.query.refetch(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_detail(frame, area);
    self.render_edit_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self
      .current
      .as_ref()
      .map(|r| truncate(&r.name, 24))
      .unwrap_or_else(|| self.id.clone())
  }

  fn wants_text_input(&self) -> bool {
    self.edit.active
  }

  fn tick(&mut self) -> ViewAction {
    if let Some(outcome) = self.mutation.poll() {
      match outcome {
        MutationOutcome::Success(_) => {
          self.query.refetch();
          return ViewAction::Toast(ToastKind::Info, "Saved".to_string());
        }
        MutationOutcome::Failure { context, error } => {
          if let Some(residence) = &mut self.current {
            residence.name = context;
          }
          return ViewAction::Toast(ToastKind::Error, error);
        }
      }
    }

    if self.query.poll() {
      match self.query.state() {
        QueryState::Success(residence) => {
          self.current = Some(residence.clone());
          if self.open_edit_on_load {
            self.open_edit_on_load = false;
            self.open_edit();
          }
        }
        QueryState::Error(error) => {
          let error = error.clone();
          return ViewAction::Toast(ToastKind::Error, error);
        }
        _ => {}
      }
    }

    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("e", "rename").with_priority(20),
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(40),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::Client;
  use crate::cache::SqliteStorage;
  use crossterm::event::KeyModifiers;
  use std::time::Duration;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  const DETAIL_BODY: &str = r#"{
    "data": {
      "id": "res-1",
      "name": "The Atelier",
      "status": "ACTIVE",
      "brand": "Aman",
      "cityId": "c-1",
      "cityName": "Lisbon",
      "units": 24,
      "updatedAt": "2025-05-01T09:30:00Z"
    },
    "statusCode": 200
  }"#;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  async fn loaded_view(server: &MockServer) -> ResidenceDetailView {
    Mock::given(method("GET"))
      .and(path("/api/v1/residences/res-1"))
      .respond_with(ResponseTemplate::new(200).set_body_string(DETAIL_BODY))
      .mount(server)
      .await;

    let client = Client::with_base_url(&server.uri());
    let api = CachedClient::with_storage(client, SqliteStorage::open_in_memory().unwrap());
    let mut view = ResidenceDetailView::new("res-1".to_string(), api);

    tokio::time::sleep(Duration::from_millis(100)).await;
    view.tick();
    assert!(view.current.is_some(), "detail should have loaded");
    view
  }

  #[tokio::test]
  async fn test_rename_failure_rolls_back_and_toasts() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
      .and(path("/api/v1/residences/res-1"))
      .respond_with(ResponseTemplate::new(500).set_body_string(
        r#"{ "data": null, "statusCode": 500, "message": "nope" }"#,
      ))
      .mount(&server)
      .await;

    let mut view = loaded_view(&server).await;

    view.handle_key(key(KeyCode::Char('e')));
    assert!(view.edit.active);

    // Replace the prefilled name wholesale
    view.edit.input.set_value("Renamed");
    view.handle_key(key(KeyCode::Enter));

    // Optimistic rename shows immediately
    assert_eq!(view.current.as_ref().unwrap().name, "Renamed");

    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut error_toasts = 0;
    for _ in 0..5 {
      if let ViewAction::Toast(ToastKind::Error, _) = view.tick() {
        error_toasts += 1;
      }
    }

    assert_eq!(error_toasts, 1);
    assert_eq!(view.current.as_ref().unwrap().name, "The Atelier");
  }

  #[tokio::test]
  async fn test_empty_name_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    let mut view = loaded_view(&server).await;

    view.handle_key(key(KeyCode::Char('e')));
    view.edit.input.set_value("   ");
    view.handle_key(key(KeyCode::Enter));

    assert!(view.edit.active, "overlay stays open on validation error");
    assert!(view.edit.error.is_some());

    tokio::time::sleep(Duration::from_millis(50)).await;
    let requests = server.received_requests().await.unwrap();
    assert!(
      !requests.iter().any(|r| r.method.as_str() == "PUT"),
      "no PUT may be sent for an invalid name"
    );
  }
}
