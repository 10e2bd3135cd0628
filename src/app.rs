use std::io::stdout;
use std::time::Duration;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;

use crate::api::{CachedClient, Client};
use crate::commands::{self, Command};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::ui;
use crate::ui::components::Toasts;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{ResidenceListView, ReviewListView};

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Command,
}

/// Main application state
pub struct App {
  /// Application configuration
  config: Config,

  /// API client shared by all views
  api: CachedClient,

  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Current input mode
  mode: Mode,

  /// Command input buffer (after pressing :)
  command_input: String,

  /// Selected autocomplete suggestion index
  selected_suggestion: usize,

  /// App-level toast stack
  toasts: Toasts,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let token = Config::get_api_token()?;
    let client = Client::new(&config.api.base_url, &token)
      .map_err(|e| color_eyre::eyre::eyre!("Failed to create API client: {}", e))?;
    let api = CachedClient::new(client)?;

    let root = Self::make_residence_list(&api, &config);

    Ok(Self {
      config,
      api,
      view_stack: vec![root],
      mode: Mode::Normal,
      command_input: String::new(),
      selected_suggestion: 0,
      toasts: Toasts::new(),
      should_quit: false,
    })
  }

  fn make_residence_list(api: &CachedClient, config: &Config) -> Box<dyn View> {
    Box::new(ResidenceListView::new(
      api.clone(),
      config.api.page_size,
      Duration::from_millis(config.ui.search_debounce_ms),
      &config.ui.hide_statuses,
    ))
  }

  fn make_review_list(api: &CachedClient, config: &Config) -> Box<dyn View> {
    Box::new(ReviewListView::new(
      api.clone(),
      config.api.page_size,
      Duration::from_millis(config.ui.search_debounce_ms),
      &config.ui.hide_statuses,
    ))
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create event handler
    let mut events = EventHandler::new(Duration::from_millis(250));

    // Main loop
    while !self.should_quit {
      // Draw UI
      terminal.draw(|frame| ui::draw(frame, self))?;

      // Handle events
      if let Some(event) = events.next().await {
        self.handle_event(event);
      }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Resize => {} // Redrawn on the next loop pass
      Event::Tick => self.tick(),
    }
  }

  fn tick(&mut self) {
    if let Some(view) = self.view_stack.last_mut() {
      let action = view.tick();
      self.apply_action(action);
    }
    self.toasts.tick();
  }

  fn handle_key(&mut self, key: KeyEvent) {
    match self.mode {
      Mode::Normal => self.handle_normal_mode_key(key),
      Mode::Command => self.handle_command_mode_key(key),
    }
  }

  fn handle_normal_mode_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    // ':' opens command mode unless a text overlay owns the keyboard
    let in_text_input = self
      .view_stack
      .last()
      .map(|view| view.wants_text_input())
      .unwrap_or(false);
    if key.code == KeyCode::Char(':') && !in_text_input {
      self.mode = Mode::Command;
      self.command_input.clear();
      self.selected_suggestion = 0;
      return;
    }

    if let Some(view) = self.view_stack.last_mut() {
      let action = view.handle_key(key);
      self.apply_action(action);
    }
  }

  fn handle_command_mode_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Enter => {
        self.execute_command();
        self.mode = Mode::Normal;
        self.selected_suggestion = 0;
      }
      KeyCode::Tab | KeyCode::Down => {
        // Navigate autocomplete suggestions
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = (self.selected_suggestion + 1) % suggestions.len();
        }
      }
      KeyCode::BackTab | KeyCode::Up => {
        // Navigate autocomplete suggestions backwards
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = if self.selected_suggestion == 0 {
            suggestions.len() - 1
          } else {
            self.selected_suggestion - 1
          };
        }
      }
      KeyCode::Backspace => {
        self.command_input.pop();
        self.selected_suggestion = 0; // Reset selection on input change
      }
      KeyCode::Char(c) => {
        self.command_input.push(c);
        self.selected_suggestion = 0; // Reset selection on input change
      }
      _ => {}
    }
  }

  fn execute_command(&mut self) {
    // Get the command to execute - either from selected suggestion or direct input
    let suggestions = commands::get_suggestions(&self.command_input);
    let cmd = if !suggestions.is_empty() && self.selected_suggestion < suggestions.len() {
      suggestions[self.selected_suggestion].name.to_string()
    } else {
      self.command_input.trim().to_lowercase()
    };

    match cmd.as_str() {
      "residences" => {
        self.view_stack.clear();
        self
          .view_stack
          .push(Self::make_residence_list(&self.api, &self.config));
      }
      "reviews" => {
        self.view_stack.clear();
        self
          .view_stack
          .push(Self::make_review_list(&self.api, &self.config));
      }
      "quit" => {
        self.should_quit = true;
      }
      other => {
        tracing::debug!("unknown command: {}", other);
      }
    }
    self.command_input.clear();
  }

  fn apply_action(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
      ViewAction::Toast(kind, message) => self.toasts.push(kind, message),
    }
  }

  // Accessors for UI rendering

  pub fn current_view(&self) -> Option<&dyn View> {
    self.view_stack.last().map(|view| view.as_ref())
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn mode(&self) -> &Mode {
    &self.mode
  }

  pub fn command_input(&self) -> &str {
    &self.command_input
  }

  pub fn base_url(&self) -> &str {
    &self.config.api.base_url
  }

  pub fn section(&self) -> String {
    self
      .config
      .title
      .clone()
      .unwrap_or_else(|| "back-office".to_string())
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|view| view.breadcrumb_label())
      .collect()
  }

  pub fn autocomplete_suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(&self.command_input)
  }

  pub fn selected_suggestion(&self) -> usize {
    self.selected_suggestion
  }

  pub fn toasts(&self) -> &Toasts {
    &self.toasts
  }
}
