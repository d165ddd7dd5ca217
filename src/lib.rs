//! Conventional commit messages and changelog entries from git diffs
//!
//! A diff is sent to Claude on AWS Bedrock and the reply is normalized into
//! validated commit lines or Keep a Changelog sections before anything is
//! committed or written.
pub mod api;
pub mod changelog;
pub mod cli;
pub mod commit;
pub mod config;
pub mod confirm;
pub mod error;
pub mod git;
pub mod normalization;
pub mod style;
pub mod templates;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::GudConfig;
pub use error::{GudError, NormalizeError, Result};
pub use normalization::{normalize_changelog, normalize_commits};
pub use types::{ChangelogSection, CommitEntry, CommitKind, SectionOrder};
