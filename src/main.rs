use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use is_terminal::IsTerminal;
use minus::Pager;
use std::io::Write;
use twig::areas::repository::Repository;
use twig::artifacts::core::PagerWriter;
use twig::errors::RepositoryError;

#[derive(Parser)]
#[command(
    name = "twig",
    version = "0.1.0",
    about = "A small local version control system",
    long_about = "twig keeps snapshots of a directory as commits on branches, \
    with a staging area, three-way merges and safe checkouts. \
    All state lives in the .twig directory of the repository root.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command creates the .twig directory in the current directory, \
        with an initial commit on the master branch."
    )]
    Init,
    #[command(name = "add", about = "Stage a file for the next commit")]
    Add {
        #[arg(index = 1, help = "The file to stage")]
        path: String,
    },
    #[command(
        name = "rm",
        about = "Unstage a file or stage its removal",
        long_about = "This command unstages a file staged for addition. If the file is tracked \
        by the current commit, it is staged for removal and deleted from the working directory."
    )]
    Rm {
        #[arg(index = 1, help = "The file to remove")]
        path: String,
    },
    #[command(name = "commit", about = "Record the staged changes")]
    Commit {
        #[arg(index = 1, help = "The commit message")]
        message: String,
    },
    #[command(name = "log", about = "Show the history of the current branch")]
    Log,
    #[command(name = "global-log", about = "Show every commit ever made")]
    GlobalLog,
    #[command(name = "find", about = "Print the IDs of commits with the given message")]
    Find {
        #[arg(index = 1, help = "The exact commit message")]
        message: String,
    },
    #[command(name = "status", about = "Show the working tree status")]
    Status,
    #[command(
        name = "checkout",
        about = "Restore a file or switch branches",
        long_about = "checkout -- <file>            restores a file from the head commit\n\
        checkout <commit> -- <file>   restores a file from the given commit\n\
        checkout <branch>             switches to the given branch"
    )]
    Checkout {
        #[arg(index = 1, help = "The branch to switch to, or the commit to restore from")]
        target: Option<String>,
        #[arg(index = 2, last = true, help = "The file to restore")]
        file: Option<String>,
    },
    #[command(name = "branch", about = "Create a branch at the current commit")]
    Branch {
        #[arg(index = 1, help = "The name of the new branch")]
        name: String,
    },
    #[command(name = "rm-branch", about = "Delete a branch pointer")]
    RmBranch {
        #[arg(index = 1, help = "The branch to delete")]
        name: String,
    },
    #[command(name = "reset", about = "Check out a commit and move the current branch to it")]
    Reset {
        #[arg(index = 1, help = "The (abbreviated) commit ID")]
        commit: String,
    },
    #[command(name = "merge", about = "Merge a branch into the current branch")]
    Merge {
        #[arg(index = 1, help = "The branch to merge in")]
        branch: String,
    },
}

impl Commands {
    fn is_paged(&self) -> bool {
        matches!(self, Commands::Log | Commands::GlobalLog)
            && std::env::var_os("NO_PAGER").is_none()
            && std::io::stdout().is_terminal()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        // repository errors are shown without the context they picked up
        let message = match error.downcast_ref::<RepositoryError>() {
            Some(repository_error) => repository_error.to_string(),
            None => format!("{:#}", error),
        };

        eprintln!("{}", message.red());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let pwd = std::env::current_dir()?;

    let pager = cli.command.is_paged().then(Pager::new);
    let writer: Box<dyn Write> = match &pager {
        Some(pager) => Box::new(PagerWriter::new(pager.clone())),
        None => Box::new(std::io::stdout()),
    };

    let mut repository = Repository::new(&pwd, writer)?;

    if !matches!(cli.command, Commands::Init) {
        repository.ensure_initialized()?;
    }

    match &cli.command {
        Commands::Init => repository.init().await?,
        Commands::Add { path } => repository.add(path).await?,
        Commands::Rm { path } => repository.rm(path).await?,
        Commands::Commit { message } => {
            repository.commit(message).await?;
        }
        Commands::Log => repository.log().await?,
        Commands::GlobalLog => repository.global_log().await?,
        Commands::Find { message } => {
            repository.find(message).await?;
        }
        Commands::Status => {
            repository.status().await?;
        }
        Commands::Checkout { target, file } => match (target, file) {
            (None, Some(file)) => repository.checkout_file(file).await?,
            (Some(commit), Some(file)) => repository.checkout_commit_file(commit, file).await?,
            (Some(branch), None) => repository.checkout_branch(branch).await?,
            (None, None) => return Err(RepositoryError::validation("Incorrect operands.").into()),
        },
        Commands::Branch { name } => repository.branch(name).await?,
        Commands::RmBranch { name } => repository.rm_branch(name).await?,
        Commands::Reset { commit } => repository.reset(commit).await?,
        Commands::Merge { branch } => {
            repository.merge(branch).await?;
        }
    }

    repository.writer().flush()?;

    if let Some(pager) = pager {
        minus::page_all(pager)?;
    }

    Ok(())
}
