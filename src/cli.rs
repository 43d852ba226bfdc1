use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::aliases;
use crate::config::{self, Settings};
use crate::console::Console;
use crate::git::SystemGit;
use crate::logging::Logger;
use crate::prompts::TerminalPrompt;
use crate::tracker::PivotalClient;
use crate::workflow::{Finish, Pick, WorkflowKind, BUG, CHORE, FEATURE};

#[derive(Debug, Parser)]
#[command(name = "bushy")]
#[command(about = "Pick and finish Pivotal Tracker stories on git branches")]
#[command(
    long_about = "Pick and finish Pivotal Tracker stories on git branches.\n\nfeature, bug and chore start the next unstarted story of that type, claim it\nand switch to a <story id>-<suffix> branch. finish marks the story for the\ncurrent branch as finished and merges the branch into the integration branch.\n\nFlags fall back to git config (bushy-pivotal.api-token, project-id, full-name,\nintegration-branch, only-mine) and then to ~/.bushy/config.toml."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the next unstarted feature
    Feature(WorkflowArgs),

    /// Start the next unstarted bug
    Bug(WorkflowArgs),

    /// Start the next unstarted chore
    Chore(WorkflowArgs),

    /// Finish the story for the current branch and merge it
    Finish(WorkflowArgs),

    /// Manage git aliases for the workflow commands
    Aliases(AliasesArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct WorkflowArgs {
    /// Pivotal Tracker API key
    #[arg(short = 'k', long = "api-key", value_name = "TOKEN")]
    pub api_token: Option<String>,

    /// Pivotal Tracker project id
    #[arg(short, long)]
    pub project_id: Option<String>,

    /// Pivotal Tracker full name
    #[arg(short = 'n', long)]
    pub full_name: Option<String>,

    /// The branch to merge finished stories back down onto
    #[arg(short = 'b', long)]
    pub integration_branch: Option<String>,

    /// Only select Pivotal Tracker stories assigned to you
    #[arg(short = 'm', long)]
    pub only_mine: bool,

    /// Quiet, no-interaction mode
    #[arg(short, long)]
    pub quiet: bool,

    /// Run verbosely
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
struct AliasesArgs {
    #[command(subcommand)]
    command: AliasesCommand,
}

#[derive(Debug, Subcommand)]
enum AliasesCommand {
    /// Register `git feature`, `git bug`, `git chore` and `git finish`
    Install {
        /// Write to the global git config instead of this repository's
        #[arg(long)]
        global: bool,
    },
}

/// Run the parsed command and return the process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Feature(args) => run_pick(FEATURE, &args),
        Commands::Bug(args) => run_pick(BUG, &args),
        Commands::Chore(args) => run_pick(CHORE, &args),
        Commands::Finish(args) => run_finish(&args),
        Commands::Aliases(args) => match args.command {
            AliasesCommand::Install { global } => {
                aliases::install(global)?;
                Ok(0)
            }
        },
    }
}

fn run_pick(kind: WorkflowKind, args: &WorkflowArgs) -> Result<i32> {
    let (settings, mut console) = session(args)?;
    let tracker = PivotalClient::new(&settings.api_token, &settings.api_url)?;
    let git = SystemGit::new();

    let outcome =
        Pick::new(kind, &settings, &tracker, &git).run(&mut console, &mut TerminalPrompt)?;
    console.debug(format!("{} workflow ended: {outcome:?}", kind.story_type));
    Ok(outcome.exit_code())
}

fn run_finish(args: &WorkflowArgs) -> Result<i32> {
    let (settings, mut console) = session(args)?;
    let tracker = PivotalClient::new(&settings.api_token, &settings.api_url)?;
    let git = SystemGit::new();

    let outcome = Finish::new(&settings, &tracker, &git).run(&mut console)?;
    console.debug(format!("finish workflow ended: {outcome:?}"));
    Ok(outcome.exit_code())
}

fn session(args: &WorkflowArgs) -> Result<(Settings, Console)> {
    let settings = config::load_settings(args)?;
    let mut console = Console::stdout(settings.quiet, settings.verbose);
    // file logging is best effort
    if let Ok(logger) = Logger::for_user() {
        console = console.with_logger(logger);
    }
    Ok((settings, console))
}
