use crate::{
   api::InferenceClient,
   error::{NormalizeError, Result},
   git::DiffSource,
   normalization::normalize_commits,
   templates,
   types::DiffSelector,
};

/// A commit message ready for review
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitDraft {
   /// Conventional commit lines from the normalizer, in response order
   Normalized(Vec<String>),
   /// The trimmed model reply, used when it could not be normalized
   Raw(String),
}

impl CommitDraft {
   pub fn lines(&self) -> Vec<&str> {
      match self {
         Self::Normalized(lines) => lines.iter().map(String::as_str).collect(),
         Self::Raw(text) => vec![text.as_str()],
      }
   }

   /// The message handed to `git commit`, one line per entry
   pub fn message(&self) -> String {
      self.lines().join("\n")
   }

   pub const fn is_raw(&self) -> bool {
      matches!(self, Self::Raw(_))
   }
}

/// Turn a model reply into a draft. A blank reply is an error; any other
/// reply that cannot be normalized is kept as-is.
pub fn draft_from_response(response: &str) -> Result<CommitDraft> {
   match normalize_commits(response) {
      Ok(normalized) => Ok(CommitDraft::Normalized(normalized.lines())),
      Err(NormalizeError::EmptyResponse) => Err(NormalizeError::EmptyResponse.into()),
      Err(err) => {
         tracing::warn!(error = %err, "using raw model response as commit message");
         Ok(CommitDraft::Raw(response.trim().to_string()))
      },
   }
}

/// Staged diff → prompt → model → draft
pub fn draft_commit<S, C>(source: &S, client: &C) -> Result<CommitDraft>
where
   S: DiffSource + ?Sized,
   C: InferenceClient + ?Sized,
{
   let diff = source.diff(&DiffSelector::Staged)?;
   let repo_root = source.repo_root();
   tracing::debug!(%repo_root, diff_bytes = diff.len(), "drafting commit message");

   let prompt = templates::render_commit_prompt(&repo_root, &diff)?;
   let response = client.invoke(&prompt)?;
   draft_from_response(&response)
}

#[cfg(test)]
mod tests {
   use std::cell::RefCell;

   use super::*;
   use crate::error::GudError;

   struct FakeDiff(&'static str);

   impl DiffSource for FakeDiff {
      fn diff(&self, selector: &DiffSelector) -> Result<String> {
         assert_eq!(selector, &DiffSelector::Staged);
         if self.0.trim().is_empty() {
            return Err(GudError::NoChanges { what: "staged changes found".to_string() });
         }
         Ok(self.0.to_string())
      }

      fn repo_root(&self) -> String {
         "/work/gud".to_string()
      }
   }

   struct FakeModel {
      reply:  &'static str,
      prompt: RefCell<Option<String>>,
   }

   impl FakeModel {
      fn replying(reply: &'static str) -> Self {
         Self { reply, prompt: RefCell::new(None) }
      }
   }

   impl InferenceClient for FakeModel {
      fn invoke(&self, prompt: &str) -> Result<String> {
         *self.prompt.borrow_mut() = Some(prompt.to_string());
         Ok(self.reply.to_string())
      }
   }

   const DIFF: &str = "diff --git a/src/api.rs b/src/api.rs\n+fn invoke() {}\n";

   #[test]
   fn test_structured_reply() {
      let model = FakeModel::replying(
         r#"```json
{"commits": [
  {"type": "feat", "scope": "src/api.rs", "description": "Add invoke"},
  {"type": "test", "scope": null, "description": "Cover invoke"}
]}
```"#,
      );
      let draft = draft_commit(&FakeDiff(DIFF), &model).unwrap();
      assert_eq!(
         draft,
         CommitDraft::Normalized(vec![
            "feat(src/api.rs): Add invoke".to_string(),
            "test: Cover invoke".to_string(),
         ])
      );
      assert_eq!(draft.message(), "feat(src/api.rs): Add invoke\ntest: Cover invoke");

      let prompt = model.prompt.borrow().clone().unwrap();
      assert!(prompt.contains("Repository root: /work/gud"));
      assert!(prompt.contains(DIFF));
   }

   #[test]
   fn test_salvaged_reply() {
      let model = FakeModel::replying(
         "Here you go:\nfix(git): Handle exit status 1\nnot a commit\nchore(deps): Bump serde\n",
      );
      let draft = draft_commit(&FakeDiff(DIFF), &model).unwrap();
      assert_eq!(draft.lines(), vec!["fix(git): Handle exit status 1", "chore(deps): Bump serde"]);
   }

   #[test]
   fn test_unusable_reply_falls_back_to_raw() {
      let model = FakeModel::replying("  I could not understand this diff.  \n");
      let draft = draft_commit(&FakeDiff(DIFF), &model).unwrap();
      assert!(draft.is_raw());
      assert_eq!(draft.message(), "I could not understand this diff.");
   }

   #[test]
   fn test_invalid_type_rejects_batch_and_keeps_raw() {
      let reply = r#"{"commits": [{"type": "feat", "scope": "a", "description": "ok"}, {"type": "bogus", "scope": "b", "description": "bad"}]}"#;
      let draft = draft_from_response(reply).unwrap();
      assert_eq!(draft, CommitDraft::Raw(reply.to_string()));
   }

   #[test]
   fn test_blank_reply_is_empty_completion() {
      let err = draft_commit(&FakeDiff(DIFF), &FakeModel::replying(" \n")).unwrap_err();
      assert!(err.is_empty_completion());
      assert!(err.is_clean_exit());
   }

   #[test]
   fn test_no_changes_skips_model() {
      let model = FakeModel::replying("feat(x): y");
      let err = draft_commit(&FakeDiff(""), &model).unwrap_err();
      assert!(matches!(err, GudError::NoChanges { .. }));
      assert!(model.prompt.borrow().is_none());
   }
}
