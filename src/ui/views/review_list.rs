use std::collections::BTreeSet;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::api::types::{Review, Status};
use crate::api::{CachedClient, Page, Pagination};
use crate::filters::{FilterHistory, FilterState};
use crate::mutation::{Mutation, MutationOutcome};
use crate::query::{Query, QueryState};
use crate::ui::components::{
  ConfirmDialog, ConfirmEvent, FilterBarEvent, KeyResult, SearchEvent, SearchInput,
  StatusFilterBar, StatusPicker, StatusPickerEvent, ToastKind,
};
use crate::ui::renderfns::{status_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::ensure_valid_selection;

enum MutationCtx {
  Status { id: String, previous: Status },
  Delete { id: String },
}

/// Review moderation queue. Same machinery as the residences table —
/// filter state, debounced search, optimistic status badge — with review
/// columns and endpoints.
pub struct ReviewListView {
  api: CachedClient,
  page_size: u32,

  filters: FilterState,
  history: FilterHistory,

  query: Query<Page<Review>>,
  rows: Vec<Review>,
  pagination: Option<Pagination>,

  list_state: ListState,
  search: SearchInput,
  filter_bar: StatusFilterBar,
  status_picker: StatusPicker,
  confirm: ConfirmDialog,

  mutation: Mutation<MutationCtx>,
  status_target: Option<String>,
  pending_delete: Option<String>,
}

impl ReviewListView {
  pub fn new(
    api: CachedClient,
    page_size: u32,
    search_debounce: Duration,
    hidden_statuses: &BTreeSet<String>,
  ) -> Self {
    let filters = FilterState::default();
    let history = FilterHistory::new(filters.to_query_string());

    let mut query = Self::build_query(&api, &filters, page_size);
    query.fetch();

    Self {
      api,
      page_size,
      filters,
      history,
      query,
      rows: Vec::new(),
      pagination: None,
      list_state: ListState::default(),
      search: SearchInput::new(search_debounce),
      filter_bar: StatusFilterBar::new(hidden_statuses),
      status_picker: StatusPicker::new(),
      confirm: ConfirmDialog::new(),
      mutation: Mutation::new(),
      status_target: None,
      pending_delete: None,
    }
  }

  fn build_query(api: &CachedClient, filters: &FilterState, page_size: u32) -> Query<Page<Review>> {
    let api = api.clone();
    let params = filters.to_list_query(page_size);
    Query::new(move || {
      let api = api.clone();
      let params = params.clone();
      async move {
        api
          .list_reviews(&params)
          .await
          .map_err(|e| e.toast_message())
      }
    })
  }

  fn spawn_fetch(&mut self) {
    self.query = Self::build_query(&self.api, &self.filters, self.page_size);
    self.query.fetch();
  }

  fn after_filter_change(&mut self) {
    self.history.record(self.filters.to_query_string());
    self.spawn_fetch();
  }

  fn restore_from_history(&mut self, entry: String) {
    self.filters = FilterState::parse(&entry);
    self.spawn_fetch();
  }

  fn selected_row(&self) -> Option<&Review> {
    self.list_state.selected().and_then(|idx| self.rows.get(idx))
  }

  fn open_status_picker(&mut self) {
    if self.mutation.is_pending() {
      return;
    }
    let Some((id, author, status)) = self
      .selected_row()
      .map(|row| (row.id.clone(), truncate(&row.author, 20), row.status))
    else {
      return;
    };

    self.status_picker.show(format!("{} → ", author), status);
    if self.status_picker.is_active() {
      self.status_target = Some(id);
    }
  }

  fn open_delete_confirm(&mut self) {
    if self.mutation.is_pending() {
      return;
    }
    let Some((id, author)) = self
      .selected_row()
      .map(|row| (row.id.clone(), truncate(&row.author, 24)))
    else {
      return;
    };

    self.pending_delete = Some(id);
    self
      .confirm
      .show("Delete review", format!("Delete review by {}?", author));
  }

  fn start_status_change(&mut self, target: Status) {
    let Some(id) = self.status_target.take() else {
      return;
    };
    let Some(row) = self.rows.iter_mut().find(|r| r.id == id) else {
      return;
    };

    let previous = row.status;
    row.status = target;

    let api = self.api.clone();
    let row_id = id.clone();
    self.mutation.start(
      MutationCtx::Status { id, previous },
      async move {
        api
          .update_review_status(&row_id, target)
          .await
          .map_err(|e| e.toast_message())
      },
    );
  }

  fn start_delete(&mut self) {
    let Some(id) = self.pending_delete.take() else {
      return;
    };

    let api = self.api.clone();
    let row_id = id.clone();
    self.mutation.start(MutationCtx::Delete { id }, async move {
      api
        .delete_review(&row_id)
        .await
        .map_err(|e| e.toast_message())
    });
  }

  fn render_rows(&mut self, frame: &mut Frame, area: Rect) {
    ensure_valid_selection(&mut self.list_state, self.rows.len());

    let total = self
      .pagination
      .map(|p| p.total_items)
      .unwrap_or(self.rows.len() as u64);

    let title = match self.query.state() {
      QueryState::Loading => " Reviews (loading...) ".to_string(),
      QueryState::Error(_) => " Reviews (fetch failed) ".to_string(),
      _ => match self.filters.summary() {
        Some(summary) => format!(" Reviews · {} ({}) ", summary, total),
        None => format!(" Reviews ({}) ", total),
      },
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.rows.is_empty() && !self.query.is_loading() {
      let content = if self.query.is_error() {
        "Failed to load reviews. Press 'r' to retry."
      } else {
        "No reviews match the current filters."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let narrow = area.width < 80;
    let items: Vec<ListItem> = self
      .rows
      .iter()
      .map(|row| {
        if narrow {
          render_card_row(row)
        } else {
          render_table_row(row)
        }
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

fn stars(rating: u8) -> String {
  let filled = rating.min(5) as usize;
  format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

fn render_table_row(row: &Review) -> ListItem<'static> {
  let line = Line::from(vec![
    Span::raw(format!("{:<18}", truncate(&row.author, 16))),
    Span::styled(
      format!("{:<7}", stars(row.rating)),
      Style::default().fg(Color::Yellow),
    ),
    Span::styled(
      format!("{:<10}", row.status.label()),
      Style::default().fg(status_color(row.status)),
    ),
    Span::styled(
      format!(
        "{:<22}",
        truncate(row.residence_name.as_deref().unwrap_or("-"), 20)
      ),
      Style::default().fg(Color::Cyan),
    ),
    Span::raw(truncate(row.excerpt.as_deref().unwrap_or(""), 40)),
  ]);
  ListItem::new(line)
}

fn render_card_row(row: &Review) -> ListItem<'static> {
  let first = Line::from(vec![
    Span::raw(truncate(&row.author, 24)),
    Span::styled(
      format!("  {}", stars(row.rating)),
      Style::default().fg(Color::Yellow),
    ),
  ]);
  let second = Line::from(vec![
    Span::raw("  "),
    Span::styled(
      row.status.label(),
      Style::default().fg(status_color(row.status)),
    ),
    Span::styled(
      format!(" · {}", row.residence_name.as_deref().unwrap_or("-")),
      Style::default().fg(Color::DarkGray),
    ),
  ]);
  ListItem::new(vec![first, second])
}

impl View for ReviewListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Accepted) => {
        self.start_delete();
        return ViewAction::None;
      }
      KeyResult::Event(ConfirmEvent::Cancelled) => {
        self.pending_delete = None;
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match self.status_picker.handle_key(key) {
      KeyResult::Event(StatusPickerEvent::Selected(target)) => {
        self.start_status_change(target);
        return ViewAction::None;
      }
      KeyResult::Event(StatusPickerEvent::Cancelled) => {
        self.status_target = None;
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(query)) => {
        self.filters.set_query(query);
        self.after_filter_change();
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    if self.search.is_active() {
      return ViewAction::None;
    }

    match self.filter_bar.handle_key(key) {
      KeyResult::Event(FilterBarEvent::Toggled(status)) => {
        self.filters.toggle_status(status);
        self.after_filter_change();
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('o') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        if let Some(entry) = self.history.back().map(String::from) {
          self.restore_from_history(entry);
        }
      }
      KeyCode::Char('i') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        if let Some(entry) = self.history.forward().map(String::from) {
          self.restore_from_history(entry);
        }
      }

      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),

      KeyCode::Char('t') | KeyCode::Enter => self.open_status_picker(),
      KeyCode::Char('d') => self.open_delete_confirm(),

      KeyCode::Char('f') => self.filter_bar.toggle_active(),

      KeyCode::Char('n') => {
        if self.pagination.map(|p| p.has_next()).unwrap_or(false) {
          self.filters.set_page(self.filters.page() + 1);
          self.after_filter_change();
        }
      }
      KeyCode::Char('p') => {
        if self.pagination.map(|p| p.has_prev()).unwrap_or(false) {
          self.filters.set_page(self.filters.page() - 1);
          self.after_filter_change();
        }
      }

      KeyCode::Char('r') => self.query.refetch(),

      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,

      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let show_filter_bar = self.filter_bar.is_active();
    let (bar_area, content_area) = if show_filter_bar {
      let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
      (Some(chunks[0]), chunks[1])
    } else {
      (None, area)
    };

    if let Some(bar_area) = bar_area {
      self.filter_bar.render(frame, bar_area, self.filters.statuses());
    }

    self.render_rows(frame, content_area);

    self.search.render_overlay(frame, area);
    self.status_picker.render_overlay(frame, area);
    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    match self.filters.summary() {
      Some(summary) => format!("Reviews [{}]", summary),
      None => "Reviews".to_string(),
    }
  }

  fn pagination(&self) -> Option<Pagination> {
    self.pagination
  }

  fn wants_text_input(&self) -> bool {
    self.search.is_active()
  }

  fn tick(&mut self) -> ViewAction {
    if let Some(query) = self.search.poll_debounced() {
      self.filters.set_query(query);
      self.after_filter_change();
    }

    if let Some(outcome) = self.mutation.poll() {
      match outcome {
        MutationOutcome::Success(MutationCtx::Status { .. }) => {
          self.spawn_fetch();
        }
        MutationOutcome::Success(MutationCtx::Delete { .. }) => {
          self.spawn_fetch();
          return ViewAction::Toast(ToastKind::Info, "Review deleted".to_string());
        }
        MutationOutcome::Failure { context, error } => {
          if let MutationCtx::Status { id, previous } = context {
            if let Some(row) = self.rows.iter_mut().find(|r| r.id == id) {
              row.status = previous;
            }
          }
          return ViewAction::Toast(ToastKind::Error, error);
        }
      }
    }

    if self.query.poll() {
      match self.query.state() {
        QueryState::Success(page) => {
          let page = page.clone();
          self.rows = page.items;
          self.pagination = Some(page.pagination);
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
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("f", "statuses").with_priority(30),
      ShortcutInfo::new("t", "moderate").with_priority(40),
      ShortcutInfo::new("d", "delete").with_priority(50),
      ShortcutInfo::new("n/p", "page").with_priority(60),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
