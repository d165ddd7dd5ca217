use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
   error::{GudError, Result},
   types::SectionOrder,
};

pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";
pub const DEFAULT_REGION: &str = "us-east-1";

/// Config files looked up in the home directory, first match wins
pub const CONFIG_CANDIDATES: &[&str] = &[".gudcommit.json", ".gudchangelog.json"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GudConfig {
   /// Bedrock model identifier
   pub model_id:        String,
   /// HTTP request deadline in seconds
   pub timeout_seconds: u64,
   /// AWS region of the Bedrock runtime endpoint
   pub region:          String,
   /// Output token cap sent with every request
   pub max_tokens:      u32,
   /// Heading order for rendered changelog sections
   pub changelog_order: SectionOrder,
}

impl Default for GudConfig {
   fn default() -> Self {
      Self {
         model_id:        DEFAULT_MODEL_ID.to_string(),
         timeout_seconds: 60,
         region:          DEFAULT_REGION.to_string(),
         max_tokens:      2048,
         changelog_order: SectionOrder::default(),
      }
   }
}

/// On-disk shape. Every field is optional; empty strings and zero numbers
/// leave the current value alone.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
   model_id:        Option<String>,
   timeout_seconds: Option<u64>,
   region:          Option<String>,
   max_tokens:      Option<u32>,
   changelog_order: Option<SectionOrder>,
}

impl GudConfig {
   /// Resolve config: defaults, then the JSON file, then environment.
   ///
   /// The file is `explicit` when given, else `GUD_CONFIG`, else the first of
   /// [`CONFIG_CANDIDATES`] that exists in the home directory. Environment
   /// variables:
   /// - `GUD_BEDROCK_MODEL_ID` overrides `model_id`
   /// - `GUD_HTTP_TIMEOUT_SECONDS` overrides `timeout_seconds`
   /// - `AWS_REGION` overrides `region`
   /// - `GUD_CHANGELOG_ORDER` overrides `changelog_order`
   pub fn load(explicit: Option<&Path>) -> Result<Self> {
      let explicit = explicit
         .map(Path::to_path_buf)
         .or_else(|| std::env::var_os("GUD_CONFIG").map(PathBuf::from));
      Self::load_with(explicit.as_deref(), home_dir().as_deref(), |key| std::env::var(key).ok())
   }

   /// [`GudConfig::load`] with the home directory and environment supplied by
   /// the caller.
   pub fn load_with<F>(explicit: Option<&Path>, home: Option<&Path>, env: F) -> Result<Self>
   where
      F: Fn(&str) -> Option<String>,
   {
      let mut config = Self::default();

      let path = match explicit {
         Some(path) => Some(path.to_path_buf()),
         None => home.and_then(find_config_file),
      };

      if let Some(path) = path {
         tracing::debug!(path = %path.display(), "loading config file");
         config.merge_file(&path)?;
      }

      config.apply_env_overrides(env);
      Ok(config)
   }

   fn merge_file(&mut self, path: &Path) -> Result<()> {
      let error = |reason: String| GudError::ConfigError { path: path.display().to_string(), reason };

      let contents = std::fs::read_to_string(path).map_err(|e| error(e.to_string()))?;
      let file: FileConfig = serde_json::from_str(&contents).map_err(|e| error(e.to_string()))?;

      if let Some(model_id) = file.model_id.filter(|s| !s.is_empty()) {
         self.model_id = model_id;
      }
      if let Some(timeout) = file.timeout_seconds.filter(|&n| n > 0) {
         self.timeout_seconds = timeout;
      }
      if let Some(region) = file.region.filter(|s| !s.is_empty()) {
         self.region = region;
      }
      if let Some(max_tokens) = file.max_tokens.filter(|&n| n > 0) {
         self.max_tokens = max_tokens;
      }
      if let Some(order) = file.changelog_order {
         self.changelog_order = order;
      }
      Ok(())
   }

   fn apply_env_overrides<F>(&mut self, env: F)
   where
      F: Fn(&str) -> Option<String>,
   {
      if let Some(model_id) = env("GUD_BEDROCK_MODEL_ID").filter(|s| !s.is_empty()) {
         self.model_id = model_id;
      }

      if let Some(raw) = env("GUD_HTTP_TIMEOUT_SECONDS") {
         match parse_strict_seconds(&raw) {
            Some(timeout) => self.timeout_seconds = timeout,
            None => tracing::warn!(value = %raw, "ignoring invalid GUD_HTTP_TIMEOUT_SECONDS"),
         }
      }

      if let Some(region) = env("AWS_REGION").filter(|s| !s.is_empty()) {
         self.region = region;
      }

      if let Some(raw) = env("GUD_CHANGELOG_ORDER").filter(|s| !s.is_empty()) {
         match raw.parse() {
            Ok(order) => self.changelog_order = order,
            Err(reason) => tracing::warn!(%reason, "ignoring GUD_CHANGELOG_ORDER"),
         }
      }
   }
}

/// Only plain ASCII digits describing a positive number are accepted; no
/// signs, no surrounding whitespace.
fn parse_strict_seconds(raw: &str) -> Option<u64> {
   if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
      return None;
   }
   raw.parse().ok().filter(|&n| n > 0)
}

fn find_config_file(home: &Path) -> Option<PathBuf> {
   CONFIG_CANDIDATES
      .iter()
      .map(|name| home.join(name))
      .find(|path| path.is_file())
}

/// Home directory from `HOME` (Unix/macOS) or `USERPROFILE` (Windows)
pub fn home_dir() -> Option<PathBuf> {
   std::env::var_os("HOME")
      .or_else(|| std::env::var_os("USERPROFILE"))
      .filter(|home| !home.is_empty())
      .map(PathBuf::from)
}
