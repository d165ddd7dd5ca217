//! Normalization of model replies into commit entries and changelog sections.
//!
//! The model is an unreliable producer: replies may be wrapped in markdown
//! fences, padded with commentary, or not JSON at all. Normalization runs in two
//! tiers. The reply is first cleaned by a fixed pipeline of pure text
//! transforms and decoded strictly. If decoding fails, the raw reply is scanned
//! for lines or blocks that already have the expected textual shape. Nothing is
//! ever invented: every result is either schema-validated or copied from the
//! reply verbatim.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
   error::NormalizeError,
   types::{ChangelogHeading, ChangelogSection, CommitEntry},
   validation::{parse_conventional_line, validate_commit},
};

const FENCE: &str = "```";

// === Cleanup pipeline ===

fn is_fence_tag_char(c: char) -> bool {
   c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+')
}

/// Remove every triple-backtick marker along with a language tag directly
/// after it and one line break. The result never contains a marker.
pub fn strip_code_fences(text: &str) -> String {
   let mut out = strip_fence_markers(text);
   // Dropping a marker can join stray backticks into a new one
   while out.contains(FENCE) {
      out = strip_fence_markers(&out);
   }
   out
}

fn strip_fence_markers(text: &str) -> String {
   let mut out = String::with_capacity(text.len());
   let mut rest = text;

   while let Some(pos) = rest.find(FENCE) {
      out.push_str(&rest[..pos]);
      let after = &rest[pos + FENCE.len()..];
      let tag_len = after
         .find(|c: char| !is_fence_tag_char(c))
         .unwrap_or(after.len());
      let after = &after[tag_len..];
      rest = after
         .strip_prefix("\r\n")
         .or_else(|| after.strip_prefix('\n'))
         .unwrap_or(after);
   }

   out.push_str(rest);
   out
}

/// Keep the span from the first `{` to the last `}`. Anything else yields an
/// empty string.
pub fn trim_to_outer_braces(text: &str) -> &str {
   match (text.find('{'), text.rfind('}')) {
      (Some(start), Some(end)) if start < end => &text[start..=end],
      _ => "",
   }
}

/// Full cleanup pipeline: fence strip, outer-brace trim, whitespace trim.
pub fn clean_response(raw: &str) -> String {
   let unfenced = strip_code_fences(raw);
   trim_to_outer_braces(&unfenced).trim().to_string()
}

// === Commits ===

#[derive(Debug, Deserialize)]
struct CommitPayload {
   #[serde(default)]
   commits: Option<Vec<CommitCandidate>>,
}

#[derive(Debug, Deserialize)]
struct CommitCandidate {
   #[serde(rename = "type", default)]
   kind:        Option<String>,
   #[serde(default)]
   scope:       Option<String>,
   #[serde(default)]
   description: Option<String>,
}

/// Successful outcome of [`normalize_commits`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitNormalization {
   /// Decoded from JSON and validated
   Structured(Vec<CommitEntry>),
   /// Conventional commit lines found in free text, verbatim
   Salvaged(Vec<String>),
}

impl CommitNormalization {
   /// Rendered commit header lines, in response order
   pub fn lines(&self) -> Vec<String> {
      match self {
         Self::Structured(entries) => entries.iter().map(CommitEntry::render).collect(),
         Self::Salvaged(lines) => lines.clone(),
      }
   }

   pub const fn is_salvaged(&self) -> bool {
      matches!(self, Self::Salvaged(_))
   }
}

/// Turn a model reply into commit entries.
///
/// A decoded batch is all-or-nothing: one invalid entry rejects the response.
pub fn normalize_commits(raw: &str) -> Result<CommitNormalization, NormalizeError> {
   if raw.trim().is_empty() {
      return Err(NormalizeError::EmptyResponse);
   }

   let cleaned = clean_response(raw);
   match serde_json::from_str::<CommitPayload>(&cleaned) {
      Ok(payload) => {
         let commits = payload.commits.unwrap_or_default();
         debug!(count = commits.len(), "decoded structured commit response");
         if commits.is_empty() {
            return Err(NormalizeError::NoCommits);
         }

         commits
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
               validate_commit(
                  index,
                  candidate.kind.as_deref(),
                  candidate.scope.as_deref(),
                  candidate.description.as_deref(),
               )
            })
            .collect::<Result<Vec<_>, _>>()
            .map(CommitNormalization::Structured)
      },
      Err(err) => {
         let salvaged = extract_fallback_commits(raw);
         if salvaged.is_empty() {
            return Err(NormalizeError::Unparseable { reason: err.to_string() });
         }
         warn!(error = %err, lines = salvaged.len(), "commit response was not JSON, salvaged lines");
         Ok(CommitNormalization::Salvaged(salvaged))
      },
   }
}

/// Collect every line of `text` that is a conventional commit header, trimmed,
/// in document order.
pub fn extract_fallback_commits(text: &str) -> Vec<String> {
   text
      .lines()
      .map(str::trim)
      .filter(|line| parse_conventional_line(line).is_some())
      .map(str::to_string)
      .collect()
}

// === Changelog ===

#[derive(Debug, Deserialize)]
struct ChangelogPayload {
   #[serde(default)]
   changelog: ChangelogLists,
}

#[derive(Debug, Default, Deserialize)]
struct ChangelogLists {
   #[serde(default)]
   added:   Option<Vec<String>>,
   #[serde(default)]
   changed: Option<Vec<String>>,
   #[serde(default)]
   removed: Option<Vec<String>>,
}

/// Successful outcome of [`normalize_changelog`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangelogNormalization {
   /// Decoded from JSON
   Structured(ChangelogSection),
   /// Preformatted `### Heading` blocks copied from free text
   Salvaged(String),
}

/// Turn a model reply into a changelog section, or salvaged markdown blocks
/// when the reply is not JSON.
pub fn normalize_changelog(raw: &str) -> Result<ChangelogNormalization, NormalizeError> {
   if raw.trim().is_empty() {
      return Err(NormalizeError::EmptyResponse);
   }

   let cleaned = clean_response(raw);
   match serde_json::from_str::<ChangelogPayload>(&cleaned) {
      Ok(payload) => {
         let lists = payload.changelog;
         let section = ChangelogSection::new(
            lists.added.unwrap_or_default(),
            lists.changed.unwrap_or_default(),
            lists.removed.unwrap_or_default(),
         );
         debug!(empty = section.is_empty(), "decoded structured changelog response");
         Ok(ChangelogNormalization::Structured(section))
      },
      Err(err) => {
         let salvaged = extract_fallback_changelog(raw);
         if salvaged.is_empty() {
            return Err(NormalizeError::Unparseable { reason: err.to_string() });
         }
         warn!(error = %err, "changelog response was not JSON, salvaged markdown blocks");
         Ok(ChangelogNormalization::Salvaged(salvaged))
      },
   }
}

fn bullet_line(line: &str) -> Option<&str> {
   let line = line.trim_end();
   line.strip_prefix("- ").filter(|item| !item.is_empty())?;
   Some(line)
}

/// Find `### Added|Changed|Removed` blocks (heading, one blank line, one or
/// more `- ` bullets) and join them in source order.
pub fn extract_fallback_changelog(text: &str) -> String {
   let lines: Vec<&str> = text.lines().collect();
   let mut blocks = Vec::new();
   let mut idx = 0;

   while idx < lines.len() {
      let Some(heading) = ChangelogHeading::from_heading_line(lines[idx]) else {
         idx += 1;
         continue;
      };

      let blank_follows = lines.get(idx + 1).is_some_and(|l| l.trim().is_empty());
      let bullets: Vec<&str> = if blank_follows {
         lines[idx + 2..]
            .iter()
            .map_while(|line| bullet_line(line))
            .collect()
      } else {
         Vec::new()
      };

      if bullets.is_empty() {
         idx += 1;
         continue;
      }

      blocks.push(format!("### {}\n\n{}", heading.as_str(), bullets.join("\n")));
      idx += 2 + bullets.len();
   }

   blocks.join("\n\n")
}
