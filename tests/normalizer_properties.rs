//! Property-based tests for the response normalizer
//!
//! Model replies are arbitrary text, so these check that the normalizer's
//! guarantees hold for generated payloads, noise and wrappings rather than a
//! handful of fixed samples.

use gudcommit::{
   CommitKind, NormalizeError,
   normalization::{CommitNormalization, clean_response, normalize_commits},
};
use proptest::prelude::*;
use serde_json::{Value, json};

// ============================================================================
// Strategies
// ============================================================================

fn kind() -> impl Strategy<Value = CommitKind> {
   prop::sample::select(CommitKind::ALL.to_vec())
}

/// Scopes as models produce them: empty, the literal "null", or a path that
/// may wrap or carry an opening paren
fn scope() -> impl Strategy<Value = String> {
   prop_oneof![
      Just(String::new()),
      Just("null".to_string()),
      "[a-z][a-z0-9_./-]{0,24}",
      "[a-z][a-z0-9_./( \n\t-]{0,24}",
   ]
}

/// Descriptions without braces, possibly spread over several lines
fn description() -> impl Strategy<Value = String> {
   "[A-Za-z][A-Za-z0-9 ,.'()\n\t-]{0,40}[A-Za-z0-9.]"
}

fn collapse(text: &str) -> String {
   text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone)]
struct Entry {
   kind:        CommitKind,
   scope:       String,
   description: String,
}

impl Entry {
   fn expected_line(&self) -> String {
      let scope = collapse(&self.scope);
      let description = collapse(&self.description);
      if scope.is_empty() || scope == "null" {
         format!("{}: {}", self.kind, description)
      } else {
         format!("{}({}): {}", self.kind, scope, description)
      }
   }

   fn to_json(&self) -> Value {
      json!({"type": self.kind.as_str(), "scope": self.scope, "description": self.description})
   }
}

fn entry() -> impl Strategy<Value = Entry> {
   (kind(), scope(), description()).prop_map(|(kind, scope, description)| Entry {
      kind,
      scope,
      description,
   })
}

fn entries() -> impl Strategy<Value = Vec<Entry>> {
   prop::collection::vec(entry(), 1..8)
}

fn payload(entries: &[Entry]) -> String {
   let commits: Vec<Value> = entries.iter().map(Entry::to_json).collect();
   json!({ "commits": commits }).to_string()
}

/// Lines that can never be taken for a commit header: they start with an
/// upper-case letter and contain no braces.
fn noise_line() -> impl Strategy<Value = String> {
   prop_oneof![
      Just(String::new()),
      Just("Here are the commits:".to_string()),
      Just("Feat(api): capitalised kinds are not commits".to_string()),
      "[A-Z][A-Za-z0-9 :,.()-]{0,40}",
   ]
}

/// A word that is not one of the ten kinds
fn invalid_kind() -> impl Strategy<Value = String> {
   "[a-z]{1,10}".prop_filter("must not be a known kind", |s| CommitKind::parse(s).is_none())
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
   #[test]
   fn valid_payload_renders_one_line_per_entry(entries in entries()) {
      let result = normalize_commits(&payload(&entries)).unwrap();
      prop_assert!(!result.is_salvaged());

      let expected: Vec<String> = entries.iter().map(Entry::expected_line).collect();
      prop_assert_eq!(result.lines(), expected);
   }

   #[test]
   fn invalid_kind_rejects_whole_batch(
      entries in entries(),
      bad in invalid_kind(),
      position in any::<prop::sample::Index>(),
   ) {
      let index = position.index(entries.len() + 1);
      let mut commits: Vec<Value> = entries.iter().map(Entry::to_json).collect();
      commits.insert(index, json!({"type": bad.clone(), "scope": "x", "description": "bad entry"}));
      let raw = json!({ "commits": commits }).to_string();

      prop_assert_eq!(
         normalize_commits(&raw),
         Err(NormalizeError::InvalidCommitType { index, value: bad })
      );
   }

   #[test]
   fn scope_with_closing_paren_rejects_whole_batch(
      entries in entries(),
      inner in "[a-z]{1,8}",
      position in any::<prop::sample::Index>(),
   ) {
      let index = position.index(entries.len() + 1);
      let bad = format!("{inner}(x)");
      let mut commits: Vec<Value> = entries.iter().map(Entry::to_json).collect();
      commits.insert(index, json!({"type": "fix", "scope": bad.clone(), "description": "Handle it"}));
      let raw = json!({ "commits": commits }).to_string();

      prop_assert_eq!(
         normalize_commits(&raw),
         Err(NormalizeError::InvalidScope { index, value: bad })
      );
   }

   #[test]
   fn fallback_extracts_exactly_the_commit_lines(
      lines in prop::collection::vec(
         prop_oneof![
            noise_line().prop_map(|l| (l, false)),
            (entry(), "[ \t]{0,3}").prop_map(|(e, indent)| (format!("{indent}{}", e.expected_line()), true)),
         ],
         1..16,
      ),
      commit in entry(),
   ) {
      let mut lines = lines;
      lines.push((commit.expected_line(), true));

      let raw = lines.iter().map(|(l, _)| l.as_str()).collect::<Vec<_>>().join("\n");
      let expected: Vec<String> = lines
         .iter()
         .filter(|(_, is_commit)| *is_commit)
         .map(|(l, _)| l.trim().to_string())
         .collect();

      let result = normalize_commits(&raw).unwrap();
      prop_assert!(result.is_salvaged());
      prop_assert_eq!(result.lines(), expected);
   }

   #[test]
   fn code_fence_does_not_change_result(
      entries in entries(),
      tag in prop_oneof![Just(""), Just("json"), Just("JSON")],
      crlf in any::<bool>(),
      prose in prop_oneof![Just(""), Just("Here you go:\n"), Just("Sure! ")],
   ) {
      let body = payload(&entries);
      let newline = if crlf { "\r\n" } else { "\n" };
      let fenced = format!("{prose}```{tag}{newline}{body}{newline}```{newline}");

      prop_assert_eq!(normalize_commits(&fenced), normalize_commits(&body));
   }

   #[test]
   fn rendered_lines_survive_the_fallback(entries in entries()) {
      let first = normalize_commits(&payload(&entries)).unwrap().lines();
      let second = normalize_commits(&first.join("\n")).unwrap();

      prop_assert_eq!(second, CommitNormalization::Salvaged(first));
   }

   #[test]
   fn cleanup_is_idempotent(raw in prop_oneof![".{0,80}", "[`{}a-z \n]{0,60}"]) {
      let once = clean_response(&raw);
      prop_assert_eq!(clean_response(&once), once);
   }

   #[test]
   fn normalizer_never_panics(raw in ".{0,200}") {
      let _ = normalize_commits(&raw);
      let _ = gudcommit::normalize_changelog(&raw);
   }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn mixed_prose_reply_is_salvaged() {
   let raw = "I think these describe the change:\n\
              feat(src/api.rs): Add Bedrock client\n\
              Some explanation in between.\n\
              fix(src/git.rs): Treat exit status 1 as staged changes\n";
   let result = normalize_commits(raw).unwrap();
   assert_eq!(
      result.lines(),
      vec![
         "feat(src/api.rs): Add Bedrock client",
         "fix(src/git.rs): Treat exit status 1 as staged changes",
      ]
   );
}

#[test]
fn empty_commit_list_is_distinct_from_empty_reply() {
   assert_eq!(normalize_commits(r#"{"commits": []}"#), Err(NormalizeError::NoCommits));
   assert_eq!(normalize_commits("   \n"), Err(NormalizeError::EmptyResponse));
}

#[test]
fn garbage_is_unparseable() {
   assert!(matches!(
      normalize_commits("no json and no commit lines"),
      Err(NormalizeError::Unparseable { .. })
   ));
}
