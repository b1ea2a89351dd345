//! CLI argument parsing with clap.

use std::io::{self, ErrorKind};
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use doifs_core::vfs::RemoteRef;

const CLI_AFTER_HELP: &str = "\
Remotes come from the config file (default: $DOIFS_HOME/config.toml, else ~/.doifs/config.toml):

  [remotes.mydata]
  doi = \"10.5281/zenodo.15063252\"
  provider = \"zenodo\"   # optional: zenodo or dataverse

or inline with --doi, which binds the remote name 'doi':

  doifs --doi 10.5281/zenodo.15063252 ls doi:";

/// doifs - browse DOI-addressed datasets as a read-only filesystem
#[derive(Parser, Debug)]
#[command(
    name = "doifs",
    version,
    about = "Browse DOI-addressed datasets (Zenodo, Dataverse, InvenioRDM) as a read-only filesystem",
    after_help = CLI_AFTER_HELP
)]
pub struct Cli {
    /// Config file to load remotes from
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Define an inline remote named 'doi' for this DOI
    #[arg(long, global = true, value_name = "DOI")]
    pub doi: Option<String>,

    /// Force the provider of the inline remote (zenodo or dataverse)
    #[arg(long, global = true, value_name = "NAME", requires = "doi")]
    pub provider: Option<String>,

    /// Handle API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub resolver_url: Option<String>,

    /// More logging (-v info, -vv debug). RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum CliCommand {
    /// List a directory
    Ls {
        /// REMOTE:PATH
        target: String,
    },
    /// Show metadata for a file or directory as JSON
    Stat {
        /// REMOTE:PATH
        target: String,
    },
    /// Write a file (or a byte range of it) to stdout
    Cat {
        /// REMOTE:PATH
        target: String,
        /// Start at this byte
        #[arg(long, default_value_t = 0)]
        offset: u64,
        /// Read at most this many bytes
        #[arg(long)]
        count: Option<u64>,
    },
    /// Print the MD5 digest the provider publishes for a file
    Md5sum {
        /// REMOTE:PATH
        target: String,
    },
    /// Print the raw JSON the bound endpoint returns
    ShowMetadata {
        /// REMOTE or REMOTE:
        remote: String,
    },
    /// Re-resolve a remote with updated options
    Set {
        /// REMOTE or REMOTE:
        remote: String,
        /// Option to change, as key=value (repeatable)
        #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
        options: Vec<String>,
    },
    /// Create a directory (always refused, remotes are read only)
    Mkdir {
        /// REMOTE:PATH
        target: String,
    },
    /// Remove a file (always refused, remotes are read only)
    Rm {
        /// REMOTE:PATH
        target: String,
    },
}

impl CliCommand {
    /// The remote name this command operates on.
    pub fn remote_name(&self) -> io::Result<String> {
        match self {
            CliCommand::Ls { target }
            | CliCommand::Stat { target }
            | CliCommand::Cat { target, .. }
            | CliCommand::Md5sum { target }
            | CliCommand::Mkdir { target }
            | CliCommand::Rm { target } => Ok(RemoteRef::parse(target)?.name),
            CliCommand::ShowMetadata { remote } | CliCommand::Set { remote, .. } => {
                let name = remote.strip_suffix(':').unwrap_or(remote);
                if name.is_empty() || name.contains(':') {
                    return Err(io::Error::new(
                        ErrorKind::InvalidInput,
                        format!("expected a remote name, got '{}'", remote),
                    ));
                }
                Ok(name.to_string())
            }
        }
    }
}
