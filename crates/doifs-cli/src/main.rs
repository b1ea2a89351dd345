// doifs: CLI frontend for doifs-core
// Loads remotes, mounts the one a command names, and runs the command.

mod cli;
mod config;

use std::io::{self, ErrorKind, Write};

use clap::Parser;
use doifs_core::DoiSession;
use doifs_core::config::parse_pair;
use doifs_core::http::ByteRange;
use doifs_core::vfs::{DoiBackend, RemoteRef, Vfs, VfsEntryKind};
use log::info;

use cli::{Cli, CliCommand};
use config::{config_path, load_cli_config};

/// Install env_logger: `warn` by default, raised by `-v`, overridden by `RUST_LOG`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Connect the remote `name` and mount it into a fresh `Vfs`.
async fn mount_remote(cli: &Cli, name: &str) -> io::Result<Vfs> {
    let path = config_path(cli.config.as_deref())?;
    let mut cfg = load_cli_config(&path)?;
    if let Some(doi) = &cli.doi {
        cfg.add_inline(doi, cli.provider.as_deref())?;
    }
    let options = cfg.remote(name)?;
    let client_config = cfg.client_config(cli.resolver_url.as_deref());

    let (session, _) = DoiSession::connect(name, "", options, &client_config).await?;
    info!("{} bound to {} ({})", name, session.endpoint(), session.provider());
    let mut vfs = Vfs::new();
    vfs.mount(name, Box::new(DoiBackend::new(session)));
    Ok(vfs)
}

fn print_json(value: &impl serde::Serialize) -> io::Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;
    println!("{}", text);
    Ok(())
}

async fn run(cli: Cli) -> io::Result<()> {
    let name = cli.command.remote_name()?;
    let vfs = mount_remote(&cli, &name).await?;

    match &cli.command {
        CliCommand::Ls { target } => {
            let target = RemoteRef::parse(target)?;
            let mut out = io::stdout().lock();
            for entry in vfs.list(&target).await? {
                match entry.kind {
                    VfsEntryKind::File => writeln!(out, "{:>12} {}", entry.size, entry.name)?,
                    VfsEntryKind::Directory => writeln!(out, "{:>12} {}/", "-", entry.name)?,
                }
            }
        }
        CliCommand::Stat { target } => {
            let target = RemoteRef::parse(target)?;
            print_json(&vfs.metadata(&target).await?)?;
        }
        CliCommand::Cat {
            target,
            offset,
            count,
        } => {
            let target = RemoteRef::parse(target)?;
            let range = (*offset > 0 || count.is_some())
                .then(|| ByteRange::from_offset(*offset, *count));
            let data = vfs.read(&target, range).await?;
            let mut out = io::stdout().lock();
            out.write_all(&data)?;
            out.flush()?;
        }
        CliCommand::Md5sum { target } => {
            let target = RemoteRef::parse(target)?;
            let digest = vfs.hash(&target, "md5").await?.ok_or_else(|| {
                io::Error::new(ErrorKind::Unsupported, "md5 is not supported by this remote")
            })?;
            println!("{}  {}", digest, target.path);
        }
        CliCommand::ShowMetadata { .. } => {
            print_json(&vfs.command(&name, "show-metadata", &[]).await?)?;
        }
        CliCommand::Set { options, .. } => {
            let pairs = options
                .iter()
                .map(|raw| parse_pair(raw).map(|(k, v)| (k.to_string(), v.to_string())))
                .collect::<Result<Vec<_>, _>>()?;
            vfs.command(&name, "set", &pairs).await?;
            println!("{}: {}", name, vfs.info(&name)?.description);
        }
        CliCommand::Mkdir { target } => {
            vfs.mkdir(&RemoteRef::parse(target)?).await?;
        }
        CliCommand::Rm { target } => {
            vfs.delete(&RemoteRef::parse(target)?).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("doifs: {}", e);
        std::process::exit(1);
    }
}
