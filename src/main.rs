use std::process::ExitCode;

use clap::Parser;
use gudcommit::{
   api::BedrockClient,
   cli,
   commit::{self, CommitDraft},
   confirm::{self, CommitDecision},
   error::Result,
   git::GitRepo,
   style::{self, icons},
   types::CommitArgs,
};

fn show_draft(draft: &CommitDraft) {
   let width = style::term_width();
   let lines = draft.lines();

   if draft.is_raw() {
      style::warn("Could not parse a structured reply, showing the raw response");
   }

   println!("\n{}", style::section_header("Generated commit messages", width));
   if lines.len() > 1 {
      for (idx, line) in lines.iter().enumerate() {
         println!("{} {}", style::dim(&format!("{:>2}.", idx + 1)), style::commit_line(line));
      }
   } else {
      for line in &lines {
         println!("{} {}", icons::ARROW, style::commit_line(line));
      }
   }

   println!("\n{}", style::boxed_message("Commit message", &draft.message(), width));
}

fn run(args: &CommitArgs) -> Result<()> {
   let config = cli::load_config(args.config.as_deref(), args.model.as_deref(), None)?;
   let client = BedrockClient::from_env(&config)?;
   let repo = GitRepo::new(&args.dir);

   if !repo.has_staged_changes()? {
      style::print_info("No staged changes found. Stage your changes first with 'git add'.");
      return Ok(());
   }

   println!("{} Generating commit message with {}", icons::ARROW, style::model(&config.model_id));
   let draft = match commit::draft_commit(&repo, &client) {
      Err(err) if err.is_empty_completion() => {
         println!("Sorry. No commit message could be generated.");
         return Ok(());
      },
      result => result?,
   };

   show_draft(&draft);
   let message = draft.message();

   if args.dry_run {
      println!("{}", style::dim("Dry run, nothing committed."));
      return Ok(());
   }

   let decision = if args.yes {
      CommitDecision::Commit
   } else {
      confirm::ask_commit_decision()?
   };

   match decision {
      CommitDecision::Commit => {
         repo.commit(&message)?;
         println!("{} {}", style::success(icons::SUCCESS), style::success("Committed"));
      },
      CommitDecision::Edit => repo.commit_with_editor(&message)?,
      CommitDecision::Abort => println!("Commit canceled."),
   }

   Ok(())
}

fn main() -> ExitCode {
   cli::init();
   let args = CommitArgs::parse();
   cli::finish(run(&args))
}
