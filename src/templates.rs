use std::{
   path::{Path, PathBuf},
   sync::LazyLock,
};

use rust_embed::RustEmbed;
use tera::{Context, Tera};

use crate::{
   config,
   error::{GudError, Result},
   types::CommitKind,
};

pub const COMMIT_TEMPLATE: &str = "commit.md";
pub const CHANGELOG_TEMPLATE: &str = "changelog.md";

/// Embedded prompts folder (compiled into binary)
#[derive(RustEmbed)]
#[folder = "prompts/"]
struct Prompts;

/// Embedded templates, registered once
static TERA: LazyLock<Tera> = LazyLock::new(|| {
   let mut tera = Tera::default();

   for file in Prompts::iter() {
      let Some(embedded) = Prompts::get(file.as_ref()) else {
         continue;
      };
      match std::str::from_utf8(embedded.data.as_ref()) {
         Ok(content) => {
            if let Err(e) = tera.add_raw_template(file.as_ref(), content) {
               tracing::warn!(template = %file, error = %e, "failed to register embedded template");
            }
         },
         Err(e) => {
            tracing::warn!(template = %file, error = %e, "embedded template is not valid UTF-8");
         },
      }
   }

   // Prompts are markdown, never HTML
   tera.autoescape_on(vec![]);
   tera
});

/// User prompts directory (~/.gudcommit/prompts/) if a home dir exists.
pub fn user_prompts_dir() -> Option<PathBuf> {
   config::home_dir().map(|home| home.join(".gudcommit").join("prompts"))
}

/// Render `name`, preferring a same-named file in `override_dir`.
pub fn render_prompt(name: &str, context: &Context, override_dir: Option<&Path>) -> Result<String> {
   if let Some(path) = override_dir.map(|dir| dir.join(name)).filter(|p| p.is_file()) {
      tracing::debug!(path = %path.display(), "using prompt override");
      let content = std::fs::read_to_string(&path).map_err(|e| {
         GudError::TemplateError(format!("Failed to read {}: {e}", path.display()))
      })?;
      return Tera::one_off(&content, context, false).map_err(|e| {
         GudError::TemplateError(format!("Failed to render {}: {e}", path.display()))
      });
   }

   TERA
      .render(name, context)
      .map_err(|e| GudError::TemplateError(format!("Failed to render prompt '{name}': {e}")))
}

fn base_context(repo_root: &str, diff: &str) -> Context {
   let mut context = Context::new();
   context.insert("repo_root", repo_root);
   context.insert("diff", diff);
   context
}

/// Render the commit message prompt
pub fn render_commit_prompt(repo_root: &str, diff: &str) -> Result<String> {
   render_commit_prompt_in(repo_root, diff, user_prompts_dir().as_deref())
}

pub fn render_commit_prompt_in(
   repo_root: &str,
   diff: &str,
   override_dir: Option<&Path>,
) -> Result<String> {
   let mut context = base_context(repo_root, diff);
   let kinds: Vec<&str> = CommitKind::ALL.iter().map(CommitKind::as_str).collect();
   context.insert("kinds", &kinds);
   render_prompt(COMMIT_TEMPLATE, &context, override_dir)
}

/// Render the changelog prompt
pub fn render_changelog_prompt(repo_root: &str, diff: &str) -> Result<String> {
   render_changelog_prompt_in(repo_root, diff, user_prompts_dir().as_deref())
}

pub fn render_changelog_prompt_in(
   repo_root: &str,
   diff: &str,
   override_dir: Option<&Path>,
) -> Result<String> {
   let context = base_context(repo_root, diff);
   render_prompt(CHANGELOG_TEMPLATE, &context, override_dir)
}
