use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// Custom title for the header (defaults to the API domain if not set)
  pub title: Option<String>,
  #[serde(default)]
  pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL without the /api/v1 prefix, e.g. https://api.residia.example
  pub base_url: String,
  /// Rows requested per page
  #[serde(default = "default_page_size")]
  pub page_size: u32,
}

fn default_page_size() -> u32 {
  25
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
  /// Delay before a search keystroke burst turns into a request
  #[serde(default = "default_search_debounce_ms")]
  pub search_debounce_ms: u64,
  /// Status names to hide from the filter bar (case-insensitive)
  #[serde(default, deserialize_with = "deserialize_lowercase_set")]
  pub hide_statuses: BTreeSet<String>,
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      search_debounce_ms: default_search_debounce_ms(),
      hide_statuses: BTreeSet::new(),
    }
  }
}

fn default_search_debounce_ms() -> u64 {
  300
}

fn deserialize_lowercase_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let v: Vec<String> = Vec::deserialize(deserializer)?;
  Ok(v.into_iter().map(|s| s.to_lowercase()).collect())
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./r9s.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/r9s/config.yaml
  /// 4. ~/.config/r9s/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/r9s/config.yaml\n\
                 See config.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("r9s.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("r9s").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Get the API token from environment variables.
  ///
  /// Checks R9S_API_TOKEN first, then RESIDIA_API_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("R9S_API_TOKEN")
      .or_else(|_| std::env::var("RESIDIA_API_TOKEN"))
      .map_err(|_| {
        eyre!("API token not found. Set R9S_API_TOKEN or RESIDIA_API_TOKEN environment variable.")
      })
  }
}
