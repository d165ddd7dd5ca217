use std::{
   path::{Path, PathBuf},
   process::{Command, Output},
};

use crate::{
   error::{GudError, Result},
   types::DiffSelector,
};

/// Where diffs come from
pub trait DiffSource {
   /// Diff text for `selector`. Blank output is [`GudError::NoChanges`].
   fn diff(&self, selector: &DiffSelector) -> Result<String>;

   /// Top level of the working tree, shown to the model as context
   fn repo_root(&self) -> String;
}

/// A git working tree driven through the `git` binary
#[derive(Debug, Clone)]
pub struct GitRepo {
   dir: PathBuf,
}

impl GitRepo {
   pub fn new(dir: impl Into<PathBuf>) -> Self {
      Self { dir: dir.into() }
   }

   pub fn dir(&self) -> &Path {
      &self.dir
   }

   fn output(&self, args: &[&str]) -> Result<Output> {
      Command::new("git")
         .args(args)
         .current_dir(&self.dir)
         .output()
         .map_err(|e| GudError::GitError(format!("Failed to run git {}: {e}", args.join(" "))))
   }

   /// Whether anything is staged (`git diff --staged --quiet` exits 1).
   pub fn has_staged_changes(&self) -> Result<bool> {
      let output = self.output(&["diff", "--staged", "--quiet"])?;
      match output.status.code() {
         Some(0) => Ok(false),
         Some(1) => Ok(true),
         _ => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(GudError::GitError(format!("git diff --staged --quiet failed: {}", stderr.trim())))
         },
      }
   }

   /// `git commit -m <message>` with the terminal attached
   pub fn commit(&self, message: &str) -> Result<()> {
      self.run_attached(&["commit", "-m", message])
   }

   /// `git commit -e -m <message>`, letting the operator edit first
   pub fn commit_with_editor(&self, message: &str) -> Result<()> {
      self.run_attached(&["commit", "-e", "-m", message])
   }

   fn run_attached(&self, args: &[&str]) -> Result<()> {
      tracing::debug!(dir = %self.dir.display(), ?args, "running git");
      let status = Command::new("git")
         .args(args)
         .current_dir(&self.dir)
         .status()
         .map_err(|e| GudError::GitError(format!("Failed to run git commit: {e}")))?;

      if !status.success() {
         return Err(GudError::GitError(format!("git commit exited with {status}")));
      }
      Ok(())
   }
}

impl DiffSource for GitRepo {
   fn diff(&self, selector: &DiffSelector) -> Result<String> {
      let args = selector.git_args();
      let args: Vec<&str> = args.iter().map(String::as_str).collect();
      let output = self.output(&args)?;

      if !output.status.success() {
         let stderr = String::from_utf8_lossy(&output.stderr);
         return Err(GudError::GitError(format!("git {} failed: {}", args.join(" "), stderr.trim())));
      }

      let diff = String::from_utf8_lossy(&output.stdout).to_string();
      if diff.trim().is_empty() {
         let what = match selector {
            DiffSelector::Staged => "staged changes found".to_string(),
            DiffSelector::Since { base } => {
               format!("changes found between current branch and {base}")
            },
         };
         return Err(GudError::NoChanges { what });
      }

      tracing::debug!(bytes = diff.len(), "collected diff");
      Ok(diff)
   }

   fn repo_root(&self) -> String {
      match self.output(&["rev-parse", "--show-toplevel"]) {
         Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
         },
         _ => ".".to_string(),
      }
   }
}
