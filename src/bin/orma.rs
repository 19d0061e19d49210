//! orma - a simple snapshot version control system.

use std::io::Write;
use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};
use serde::Serialize;

use orma::commit::is_null_sentinel;
use orma::{
    abbreviate, short_hash, HistoryOptions, InitOutcome, ObjectKind, OpenOptions, Repository,
    RevertOptions, TreeEntry,
};

type CliResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// orma - snapshot the working directory, list history, revert to any save
#[derive(Parser)]
#[command(name = "orma")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Working directory root (or any directory below it)
    #[arg(long, global = true, env = "ORMA_DIR", default_value = ".")]
    repo: PathBuf,

    /// Author name recorded in commits
    #[arg(long, global = true, env = "ORMA_AUTHOR_NAME")]
    author: Option<String>,

    /// Author email recorded in commits
    #[arg(long, global = true, env = "ORMA_AUTHOR_EMAIL")]
    email: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new orma repository
    #[command(alias = "start")]
    Init {
        /// Branch HEAD should point at
        #[arg(long)]
        branch: Option<String>,
    },
    /// Save the current state with a message
    Save {
        /// Commit message
        message: String,
    },
    /// Show commit history, newest first
    History {
        /// Show at most this many commits
        #[arg(long)]
        limit: Option<usize>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Restore the working directory to a commit and move HEAD to it
    Revert {
        /// Commit hash (full, or an abbreviation of at least 4 digits)
        commit: String,
        /// Also delete files tracked by HEAD that the commit does not contain
        #[arg(long)]
        prune: bool,
    },
    /// Show how HEAD has moved
    Reflog,
    /// Hash a file as a blob, optionally storing it
    HashObject {
        /// Store the blob in the object database
        #[arg(short = 'w')]
        write: bool,
        /// File to hash
        file: PathBuf,
    },
    /// Display an object
    #[command(group(ArgGroup::new("mode").required(true).args(["pretty", "show_type"])))]
    CatFile {
        /// Pretty-print the object's content
        #[arg(short = 'p')]
        pretty: bool,
        /// Print the object's kind
        #[arg(short = 't')]
        show_type: bool,
        /// Object hash
        object: String,
    },
    /// List the entries of a tree object
    LsTree {
        /// Only print entry names
        #[arg(long)]
        name_only: bool,
        /// Tree hash
        tree: String,
    },
    /// Create a tree object from the working directory
    WriteTree,
    /// Create a commit object
    CommitTree {
        /// Tree hash
        tree: String,
        /// Parent commit hash, or `null` for a root commit
        parent: String,
        /// Commit message
        message: String,
    },
}

#[derive(Serialize)]
struct HistoryRecord {
    commit: String,
    message: String,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: Cli) -> CliResult<()> {
    let options = OpenOptions {
        branch: None,
        author: cli.author,
        email: cli.email,
    };

    let command = match cli.command {
        Commands::Init { branch } => {
            let (repo, outcome) = Repository::init(&cli.repo, OpenOptions { branch, ..options })?;
            if outcome == InitOutcome::Created {
                println!("Initialized orma repository in {}", repo.meta_dir().display());
            }
            return Ok(());
        }
        command => command,
    };

    let repo = Repository::discover(&cli.repo, options)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        // Handled before a repository is opened.
        Commands::Init { .. } => {}
        Commands::Save { message } => {
            let saved = repo.save(&message)?;
            writeln!(out, "Saved snapshot: {} {}", short_hash(&saved.commit), message)?;
        }
        Commands::History { limit, json } => {
            let entries = repo.history(HistoryOptions { limit })?;
            if json {
                let records: Vec<HistoryRecord> = entries
                    .into_iter()
                    .map(|e| HistoryRecord {
                        commit: e.oid.to_string(),
                        message: e.message,
                    })
                    .collect();
                writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
            } else if entries.is_empty() {
                writeln!(out, "No history yet. Make a save first.")?;
            } else {
                for entry in entries {
                    writeln!(out, "commit {}", entry.oid)?;
                    writeln!(out, "    {}\n", entry.message)?;
                }
            }
        }
        Commands::Revert { commit, prune } => {
            let target = repo.resolve(&commit)?;
            let report = repo.revert(&target, RevertOptions { prune })?;
            for path in &report.removed {
                log::info!("removed {}", path);
            }
            writeln!(out, "Project reverted. HEAD is now at {}", short_hash(&target))?;
        }
        Commands::Reflog => {
            for (i, entry) in repo.reflog()?.iter().rev().enumerate() {
                writeln!(
                    out,
                    "{} HEAD@{{{}}}: {}",
                    abbreviate(&entry.new_sha),
                    i,
                    entry.message
                )?;
            }
        }
        Commands::HashObject { write, file } => {
            writeln!(out, "{}", repo.hash_object(&file, write)?)?;
        }
        Commands::CatFile {
            pretty: _,
            show_type,
            object,
        } => {
            let oid = repo.resolve(&object)?;
            let (kind, payload) = repo.cat_object(&oid)?;
            if show_type {
                writeln!(out, "{}", kind)?;
            } else if kind == ObjectKind::Tree {
                for entry in repo.ls_tree(&oid)? {
                    write_entry(&mut out, &entry)?;
                }
            } else {
                out.write_all(&payload)?;
            }
        }
        Commands::LsTree { name_only, tree } => {
            let oid = repo.resolve(&tree)?;
            for entry in repo.ls_tree(&oid)? {
                if name_only {
                    writeln!(out, "{}", entry.name)?;
                } else {
                    write_entry(&mut out, &entry)?;
                }
            }
        }
        Commands::WriteTree => {
            writeln!(out, "{}", repo.write_tree()?)?;
        }
        Commands::CommitTree {
            tree,
            parent,
            message,
        } => {
            let tree = repo.resolve(&tree)?;
            let parent = if is_null_sentinel(&parent) {
                None
            } else {
                Some(repo.resolve(&parent)?)
            };
            writeln!(out, "{}", repo.commit_tree(&tree, parent.as_ref(), &message)?)?;
        }
    }

    Ok(())
}

fn write_entry(out: &mut impl Write, entry: &TreeEntry) -> std::io::Result<()> {
    let kind = if entry.is_tree() { "tree" } else { "blob" };
    writeln!(out, "{:06o} {} {}\t{}", entry.mode, kind, entry.oid, entry.name)
}
