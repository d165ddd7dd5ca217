use std::process::ExitCode;

use clap::Parser;
use gudcommit::{
   api::BedrockClient,
   changelog::{self, ChangelogDraft},
   cli, confirm,
   error::Result,
   git::GitRepo,
   style::{self, icons},
   types::ChangelogArgs,
};

fn run(args: &ChangelogArgs) -> Result<()> {
   let config = cli::load_config(args.config.as_deref(), args.model.as_deref(), args.order)?;
   let client = BedrockClient::from_env(&config)?;
   let repo = GitRepo::new(&args.dir);

   println!("{} Generating changelog with {}", icons::ARROW, style::model(&config.model_id));
   let draft = match changelog::draft_changelog(&repo, &client, &args.target) {
      Err(err) if err.is_empty_completion() => {
         println!("Sorry. No changelog could be generated.");
         return Ok(());
      },
      result => result?,
   };

   let Some(document) = draft.document(config.changelog_order) else {
      if let ChangelogDraft::Raw(raw) = &draft {
         style::warn("Could not parse a structured reply, showing the raw response");
         println!("{raw}");
      } else {
         style::print_info("The model found no changelog entries for these changes.");
      }
      return Ok(());
   };

   let width = style::term_width();
   println!("\n{}", style::section_header("Generated changelog", width));
   println!("{document}");
   println!("{}", style::separator(width));

   if args.dry_run {
      return Ok(());
   }

   let write = args.yes || confirm::ask_yes_no(&changelog::prepend_question(&args.file))?;
   if !write {
      println!("Changelog generation completed.");
      return Ok(());
   }

   let path = args.dir.join(&args.file);
   changelog::prepend_changelog(&path, &document)?;
   println!(
      "{} Changelog written to {}",
      style::success(icons::SUCCESS),
      style::dim(&path.display().to_string())
   );
   Ok(())
}

fn main() -> ExitCode {
   cli::init();
   let args = ChangelogArgs::parse();
   cli::finish(run(&args))
}
