use std::{fmt, path::PathBuf, str::FromStr};

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

// === Commit types ===

/// Conventional commit category accepted from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitKind {
   Feat,
   Fix,
   Build,
   Chore,
   Ci,
   Docs,
   Style,
   Refactor,
   Perf,
   Test,
}

impl CommitKind {
   pub const ALL: [Self; 10] = [
      Self::Feat,
      Self::Fix,
      Self::Build,
      Self::Chore,
      Self::Ci,
      Self::Docs,
      Self::Style,
      Self::Refactor,
      Self::Perf,
      Self::Test,
   ];

   pub const fn as_str(&self) -> &'static str {
      match self {
         Self::Feat => "feat",
         Self::Fix => "fix",
         Self::Build => "build",
         Self::Chore => "chore",
         Self::Ci => "ci",
         Self::Docs => "docs",
         Self::Style => "style",
         Self::Refactor => "refactor",
         Self::Perf => "perf",
         Self::Test => "test",
      }
   }

   /// Exact, case-sensitive lookup. `"Feat"` is not a kind.
   pub fn parse(s: &str) -> Option<Self> {
      Self::ALL.into_iter().find(|kind| kind.as_str() == s)
   }
}

impl fmt::Display for CommitKind {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.as_str())
   }
}

/// One validated commit line proposed by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEntry {
   kind:        CommitKind,
   scope:       String,
   description: String,
}

impl CommitEntry {
   /// Builds an entry, collapsing every whitespace run in scope and
   /// description to a single space so the header stays on one line. Returns
   /// `None` when the description is blank.
   pub fn new(
      kind: CommitKind,
      scope: impl AsRef<str>,
      description: impl AsRef<str>,
   ) -> Option<Self> {
      let description = collapse_whitespace(description.as_ref());
      if description.is_empty() {
         return None;
      }
      Some(Self { kind, scope: collapse_whitespace(scope.as_ref()), description })
   }

   pub const fn kind(&self) -> CommitKind {
      self.kind
   }

   pub fn scope(&self) -> &str {
      &self.scope
   }

   pub fn description(&self) -> &str {
      &self.description
   }

   /// Models emit the literal string `null` for "no scope" often enough that it
   /// is treated the same as an empty scope.
   pub fn has_scope(&self) -> bool {
      !self.scope.is_empty() && self.scope != "null"
   }

   /// Conventional commit header: `kind(scope): description` or
   /// `kind: description`
   pub fn render(&self) -> String {
      self.to_string()
   }
}

impl fmt::Display for CommitEntry {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      if self.has_scope() {
         write!(f, "{}({}): {}", self.kind, self.scope, self.description)
      } else {
         write!(f, "{}: {}", self.kind, self.description)
      }
   }
}

fn collapse_whitespace(text: &str) -> String {
   text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// === Changelog types ===

/// Keep a Changelog headings produced by this tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangelogHeading {
   Added,
   Changed,
   Removed,
}

impl ChangelogHeading {
   pub const fn as_str(&self) -> &'static str {
      match self {
         Self::Added => "Added",
         Self::Changed => "Changed",
         Self::Removed => "Removed",
      }
   }

   /// Parse a level-3 markdown heading line (`### Added`)
   pub fn from_heading_line(line: &str) -> Option<Self> {
      match line.trim_end().strip_prefix("### ")? {
         "Added" => Some(Self::Added),
         "Changed" => Some(Self::Changed),
         "Removed" => Some(Self::Removed),
         _ => None,
      }
   }
}

/// Order in which changelog headings are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SectionOrder {
   /// Added, Changed, Removed
   #[default]
   KeepAChangelog,
   /// Removed, Added, Changed
   RemovalsFirst,
}

impl SectionOrder {
   pub const fn headings(&self) -> [ChangelogHeading; 3] {
      match self {
         Self::KeepAChangelog => {
            [ChangelogHeading::Added, ChangelogHeading::Changed, ChangelogHeading::Removed]
         },
         Self::RemovalsFirst => {
            [ChangelogHeading::Removed, ChangelogHeading::Added, ChangelogHeading::Changed]
         },
      }
   }
}

impl FromStr for SectionOrder {
   type Err = String;

   fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
      match s.trim().to_lowercase().as_str() {
         "keep-a-changelog" => Ok(Self::KeepAChangelog),
         "removals-first" => Ok(Self::RemovalsFirst),
         other => Err(format!(
            "unknown changelog order '{other}' (expected keep-a-changelog or removals-first)"
         )),
      }
   }
}

/// Grouped change notes for one release
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangelogSection {
   added:   Vec<String>,
   changed: Vec<String>,
   removed: Vec<String>,
}

impl ChangelogSection {
   /// Items are trimmed; blank items are dropped.
   pub fn new(added: Vec<String>, changed: Vec<String>, removed: Vec<String>) -> Self {
      fn clean(items: Vec<String>) -> Vec<String> {
         items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
      }

      Self { added: clean(added), changed: clean(changed), removed: clean(removed) }
   }

   pub fn items(&self, heading: ChangelogHeading) -> &[String] {
      match heading {
         ChangelogHeading::Added => &self.added,
         ChangelogHeading::Changed => &self.changed,
         ChangelogHeading::Removed => &self.removed,
      }
   }

   pub fn is_empty(&self) -> bool {
      self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
   }

   /// Render non-empty groups as `### Heading` blocks in the given order.
   /// An empty section renders to an empty string.
   pub fn render(&self, order: SectionOrder) -> String {
      order
         .headings()
         .into_iter()
         .filter(|heading| !self.items(*heading).is_empty())
         .map(|heading| {
            let bullets = self
               .items(heading)
               .iter()
               .map(|item| format!("- {item}"))
               .collect::<Vec<_>>()
               .join("\n");
            format!("### {}\n\n{bullets}", heading.as_str())
         })
         .collect::<Vec<_>>()
         .join("\n\n")
   }
}

// === Diff selection ===

/// Which changes the diff source should produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffSelector {
   /// Changes staged for the next commit
   Staged,
   /// Changes on the current branch since `base` (`base..HEAD`)
   Since { base: String },
}

impl DiffSelector {
   pub fn git_args(&self) -> Vec<String> {
      match self {
         Self::Staged => vec!["diff".to_string(), "--staged".to_string()],
         Self::Since { base } => vec!["diff".to_string(), format!("{base}..HEAD")],
      }
   }
}

// === CLI Args ===

/// `gudcommit` arguments
#[derive(Parser, Debug, Default)]
#[command(
   name = "gudcommit",
   author,
   version,
   about = "Generate conventional commit messages for staged changes using Claude on AWS Bedrock",
   long_about = None
)]
pub struct CommitArgs {
   /// Directory to run git commands in
   #[arg(long, default_value = ".")]
   pub dir: PathBuf,

   /// Path to a JSON config file (default: ~/.gudcommit.json or
   /// ~/.gudchangelog.json)
   #[arg(long)]
   pub config: Option<PathBuf>,

   /// Bedrock model identifier, overrides config and environment
   #[arg(long, short = 'm')]
   pub model: Option<String>,

   /// Show the generated message without committing
   #[arg(long)]
   pub dry_run: bool,

   /// Commit without asking for confirmation
   #[arg(long, short = 'y')]
   pub yes: bool,
}

/// `gudchangelog` arguments
#[derive(Parser, Debug)]
#[command(
   name = "gudchangelog",
   author,
   version,
   about = "Generate Keep a Changelog entries for the current branch using Claude on AWS Bedrock",
   long_about = None
)]
pub struct ChangelogArgs {
   /// Branch or revision to compare the current HEAD against
   pub target: String,

   /// Directory to run git commands in
   #[arg(long, default_value = ".")]
   pub dir: PathBuf,

   /// Path to a JSON config file (default: ~/.gudcommit.json or
   /// ~/.gudchangelog.json)
   #[arg(long)]
   pub config: Option<PathBuf>,

   /// Bedrock model identifier, overrides config and environment
   #[arg(long, short = 'm')]
   pub model: Option<String>,

   /// Heading order for the generated section
   #[arg(long, value_enum)]
   pub order: Option<SectionOrder>,

   /// Changelog file to prepend to, relative to --dir
   #[arg(long, default_value = "CHANGELOG.md")]
   pub file: PathBuf,

   /// Show the generated changelog without writing it
   #[arg(long)]
   pub dry_run: bool,

   /// Write without asking for confirmation
   #[arg(long, short = 'y')]
   pub yes: bool,
}
