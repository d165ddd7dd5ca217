use std::path::Path;

use crate::{
   api::InferenceClient,
   error::{NormalizeError, Result},
   git::DiffSource,
   normalization::{ChangelogNormalization, normalize_changelog},
   templates,
   types::{ChangelogSection, DiffSelector, SectionOrder},
};

pub const UNRELEASED_HEADING: &str = "## [Unreleased]";

/// Separator placed between new content and the existing file
pub const ENTRY_SEPARATOR: &str = "\n---\n\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangelogDraft {
   Structured(ChangelogSection),
   /// `### Heading` blocks copied from a free-text reply
   Salvaged(String),
   /// Reply that could not be normalized, trimmed
   Raw(String),
}

impl ChangelogDraft {
   /// Markdown body under the release heading. `None` for raw replies and for
   /// structured sections without entries.
   pub fn body(&self, order: SectionOrder) -> Option<String> {
      match self {
         Self::Structured(section) if section.is_empty() => None,
         Self::Structured(section) => Some(section.render(order)),
         Self::Salvaged(text) => Some(text.clone()),
         Self::Raw(_) => None,
      }
   }

   /// Full `## [Unreleased]` block ready to prepend
   pub fn document(&self, order: SectionOrder) -> Option<String> {
      self.body(order).map(|body| unreleased_block(&body))
   }
}

pub fn unreleased_block(body: &str) -> String {
   format!("{UNRELEASED_HEADING}\n\n{body}\n")
}

pub fn draft_from_response(response: &str) -> Result<ChangelogDraft> {
   match normalize_changelog(response) {
      Ok(ChangelogNormalization::Structured(section)) => Ok(ChangelogDraft::Structured(section)),
      Ok(ChangelogNormalization::Salvaged(text)) => Ok(ChangelogDraft::Salvaged(text)),
      Err(NormalizeError::EmptyResponse) => Err(NormalizeError::EmptyResponse.into()),
      Err(err) => {
         tracing::warn!(error = %err, "changelog response could not be normalized");
         Ok(ChangelogDraft::Raw(response.trim().to_string()))
      },
   }
}

/// `base..HEAD` diff → prompt → model → draft
pub fn draft_changelog<S, C>(source: &S, client: &C, base: &str) -> Result<ChangelogDraft>
where
   S: DiffSource + ?Sized,
   C: InferenceClient + ?Sized,
{
   let selector = DiffSelector::Since { base: base.to_string() };
   let diff = source.diff(&selector)?;
   let repo_root = source.repo_root();
   tracing::debug!(%repo_root, base, diff_bytes = diff.len(), "drafting changelog");

   let prompt = templates::render_changelog_prompt(&repo_root, &diff)?;
   let response = client.invoke(&prompt)?;
   draft_from_response(&response)
}

/// New content first, then the separator and whatever the file held before.
pub fn prepend_content(block: &str, existing: &str) -> String {
   if existing.is_empty() {
      block.to_string()
   } else {
      format!("{block}{ENTRY_SEPARATOR}{existing}")
   }
}

/// Confirmation question naming the changelog file that will be written.
pub fn prepend_question(file: &Path) -> String {
   format!("Prepend this content to {}? (y/n): ", file.display())
}

/// Prepend `block` to the changelog at `path`, creating it when missing.
pub fn prepend_changelog(path: &Path, block: &str) -> Result<()> {
   let existing = match std::fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
      Err(e) => return Err(e.into()),
   };

   std::fs::write(path, prepend_content(block, &existing))?;
   tracing::debug!(path = %path.display(), "changelog written");
   Ok(())
}

#[cfg(test)]
mod tests {
   use std::fs;

   use super::*;
   use crate::error::GudError;

   struct FakeDiff;

   impl DiffSource for FakeDiff {
      fn diff(&self, selector: &DiffSelector) -> Result<String> {
         assert_eq!(selector, &DiffSelector::Since { base: "main".to_string() });
         Ok("diff --git a/README.md b/README.md\n+Install with cargo\n".to_string())
      }

      fn repo_root(&self) -> String {
         ".".to_string()
      }
   }

   struct FakeModel(&'static str);

   impl InferenceClient for FakeModel {
      fn invoke(&self, prompt: &str) -> Result<String> {
         assert!(prompt.contains("Install with cargo"));
         Ok(self.0.to_string())
      }
   }

   #[test]
   fn test_structured_document() {
      let model = FakeModel(
         r#"{"changelog": {"added": ["Install docs"], "changed": ["Tighter timeout"], "removed": ["Old flag"]}}"#,
      );
      let draft = draft_changelog(&FakeDiff, &model, "main").unwrap();

      assert_eq!(
         draft.document(SectionOrder::KeepAChangelog).unwrap(),
         "## [Unreleased]\n\n### Added\n\n- Install docs\n\n### Changed\n\n- Tighter timeout\n\n### Removed\n\n- Old flag\n"
      );
      assert_eq!(
         draft.body(SectionOrder::RemovalsFirst).unwrap(),
         "### Removed\n\n- Old flag\n\n### Added\n\n- Install docs\n\n### Changed\n\n- Tighter timeout"
      );
   }

   #[test]
   fn test_empty_structured_section_has_no_document() {
      let draft =
         draft_from_response(r#"{"changelog": {"added": [], "changed": ["  "], "removed": []}}"#)
            .unwrap();
      assert!(matches!(draft, ChangelogDraft::Structured(_)));
      assert_eq!(draft.document(SectionOrder::default()), None);
   }

   #[test]
   fn test_salvaged_document_ignores_order() {
      let draft = draft_from_response("Sure!\n\n### Changed\n\n- Faster diff\n\nThanks").unwrap();
      assert_eq!(
         draft.document(SectionOrder::RemovalsFirst).unwrap(),
         "## [Unreleased]\n\n### Changed\n\n- Faster diff\n"
      );
   }

   #[test]
   fn test_unparseable_reply_is_raw() {
      let draft = draft_from_response(" nothing useful here ").unwrap();
      assert_eq!(draft, ChangelogDraft::Raw("nothing useful here".to_string()));
      assert_eq!(draft.body(SectionOrder::default()), None);
   }

   #[test]
   fn test_blank_reply() {
      let err = draft_from_response("").unwrap_err();
      assert!(matches!(err, GudError::Normalize(NormalizeError::EmptyResponse)));
   }

   #[test]
   fn test_prepend_to_missing_file() {
      let dir = tempfile::tempdir().unwrap();
      let path = dir.path().join("CHANGELOG.md");

      prepend_changelog(&path, "## [Unreleased]\n\n### Added\n\n- First\n").unwrap();
      assert_eq!(fs::read_to_string(&path).unwrap(), "## [Unreleased]\n\n### Added\n\n- First\n");
   }

   #[test]
   fn test_prepend_keeps_existing_below_separator() {
      let dir = tempfile::tempdir().unwrap();
      let path = dir.path().join("CHANGELOG.md");
      fs::write(&path, "## [0.1.0]\n\n### Added\n\n- Initial release\n").unwrap();

      prepend_changelog(&path, "## [Unreleased]\n\n### Changed\n\n- Second\n").unwrap();
      assert_eq!(
         fs::read_to_string(&path).unwrap(),
         "## [Unreleased]\n\n### Changed\n\n- Second\n\n---\n\n## [0.1.0]\n\n### Added\n\n- Initial release\n"
      );
   }

   #[test]
   fn test_prepend_content_empty_existing() {
      assert_eq!(prepend_content("block\n", ""), "block\n");
   }

   #[test]
   fn test_prepend_question_names_target_file() {
      assert_eq!(
         prepend_question(Path::new("CHANGELOG.md")),
         "Prepend this content to CHANGELOG.md? (y/n): "
      );
      assert_eq!(
         prepend_question(Path::new("docs/HISTORY.md")),
         "Prepend this content to docs/HISTORY.md? (y/n): "
      );
   }
}
