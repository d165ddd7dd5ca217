//! Startup and exit handling shared by both binaries.

use std::{path::Path, process::ExitCode};

use tracing_subscriber::EnvFilter;

use crate::{config::GudConfig, error::Result, style, types::SectionOrder};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "GUD_LOG";

/// Load `.env` and install the stderr log subscriber.
pub fn init() {
   // Missing .env is the common case; real environment variables win
   dotenvy::dotenv().ok();

   let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
   tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_writer(std::io::stderr)
      .without_time()
      .init();
}

/// Resolve config and apply command-line overrides on top.
pub fn load_config(
   path: Option<&Path>,
   model: Option<&str>,
   order: Option<SectionOrder>,
) -> Result<GudConfig> {
   let mut config = GudConfig::load(path)?;
   if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
      config.model_id = model.to_string();
   }
   if let Some(order) = order {
      config.changelog_order = order;
   }
   tracing::debug!(?config, "resolved config");
   Ok(config)
}

/// Report a run result; `true` when the process should exit successfully.
pub fn report(result: Result<()>) -> bool {
   match result {
      Ok(()) => true,
      Err(err) if err.is_clean_exit() => {
         style::print_info(&err.to_string());
         true
      },
      Err(err) => {
         style::print_error(&err.to_string());
         false
      },
   }
}

/// Map a run result onto the process exit status.
pub fn finish(result: Result<()>) -> ExitCode {
   if report(result) { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
