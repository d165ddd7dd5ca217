//! Operator confirmation prompts.

use std::io::{BufRead, Write};

use crate::error::Result;

pub const COMMIT_QUESTION: &str = "Proceed with the commit? (y/n or e to Edit): ";

/// What to do with a generated commit message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitDecision {
   Commit,
   /// Commit, but open the message in the editor first
   Edit,
   Abort,
}

impl CommitDecision {
   /// `y`/`yes` commits, `e`/`edit` edits, anything else aborts.
   pub fn parse(answer: &str) -> Self {
      match answer.trim().to_lowercase().as_str() {
         "y" | "yes" => Self::Commit,
         "e" | "edit" => Self::Edit,
         _ => Self::Abort,
      }
   }
}

/// `y`/`yes` is consent; anything else, including nothing, is not.
pub fn parse_yes_no(answer: &str) -> bool {
   matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Write `question`, then read one line of answer. End of input reads as an
/// empty answer.
pub fn ask<R, W>(reader: &mut R, writer: &mut W, question: &str) -> Result<String>
where
   R: BufRead,
   W: Write,
{
   write!(writer, "{question}")?;
   writer.flush()?;

   let mut answer = String::new();
   reader.read_line(&mut answer)?;
   Ok(answer)
}

/// Ask the commit question on stdin/stdout.
pub fn ask_commit_decision() -> Result<CommitDecision> {
   let answer = ask(&mut std::io::stdin().lock(), &mut std::io::stdout(), COMMIT_QUESTION)?;
   Ok(CommitDecision::parse(&answer))
}

/// Ask a yes/no question on stdin/stdout.
pub fn ask_yes_no(question: &str) -> Result<bool> {
   let answer = ask(&mut std::io::stdin().lock(), &mut std::io::stdout(), question)?;
   Ok(parse_yes_no(&answer))
}
