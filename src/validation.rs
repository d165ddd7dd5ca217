//! Schema checks for commit entries decoded from a model response, and the
//! conventional commit line grammar used when salvaging free text.

use crate::{
   error::NormalizeError,
   types::{CommitEntry, CommitKind},
};

/// Validate one decoded entry. `index` is the entry's position in the response
/// and is carried into the error.
pub fn validate_commit(
   index: usize,
   kind: Option<&str>,
   scope: Option<&str>,
   description: Option<&str>,
) -> Result<CommitEntry, NormalizeError> {
   let kind = kind.unwrap_or_default();
   if kind.trim().is_empty() {
      return Err(NormalizeError::MissingField { index, field: "type" });
   }

   let description = description.unwrap_or_default();
   if description.trim().is_empty() {
      return Err(NormalizeError::MissingField { index, field: "description" });
   }

   let kind = CommitKind::parse(kind)
      .ok_or_else(|| NormalizeError::InvalidCommitType { index, value: kind.to_string() })?;

   // The line grammar ends a scope at the first `)`
   let scope = scope.unwrap_or_default();
   if scope.contains(')') {
      return Err(NormalizeError::InvalidScope { index, value: scope.to_string() });
   }

   CommitEntry::new(kind, scope, description)
      .ok_or(NormalizeError::MissingField { index, field: "description" })
}

/// A line in conventional commit form, borrowed from the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConventionalLine<'a> {
   pub kind:        CommitKind,
   pub scope:       Option<&'a str>,
   pub description: &'a str,
}

/// Match `kind(scope): description` or `kind: description`.
///
/// The kind must be one of the ten known kinds, a scope is a non-empty run
/// without `)`, and the header is separated from a non-empty description by
/// exactly `": "`. The line is expected to be trimmed already.
pub fn parse_conventional_line(line: &str) -> Option<ConventionalLine<'_>> {
   let kind_end = line.find(['(', ':'])?;
   let kind = CommitKind::parse(&line[..kind_end])?;
   let rest = &line[kind_end..];

   let (scope, rest) = match rest.strip_prefix('(') {
      Some(scoped) => {
         let close = scoped.find(')')?;
         if close == 0 {
            return None;
         }
         (Some(&scoped[..close]), &scoped[close + 1..])
      },
      None => (None, rest),
   };

   let description = rest.strip_prefix(": ")?;
   if description.is_empty() {
      return None;
   }

   Some(ConventionalLine { kind, scope, description })
}
