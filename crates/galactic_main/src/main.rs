//! galactic - command-line access to a GalacticFS ledger

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use galactic_fs::{
    Entry, GalacticConfig, GalacticFs, ReadOptions, Tree, TreeNode, WriteData, WriteOptions,
};
use std::io::{self, Read, Write};

/// Configuration from `--config` or the default location, with CLI overrides
fn load_config(cli: &Cli) -> Result<GalacticConfig> {
    let mut config = match &cli.config {
        Some(path) => GalacticConfig::load_from(path)?,
        None => GalacticConfig::load()?,
    };
    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }
    if let Some(name) = &cli.name {
        config.storage.name = name.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli).context("failed to load configuration")?;

    // Initialize logging and panic hook first
    let _guard = galactic_log::init(&config.logging.level)?;

    if let Err(e) = galactic_log::cleanup_old_logs(config.logging.keep_days) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("galactic starting...");

    let fs = config
        .open_filesystem()
        .context("failed to open the ledger")?;

    run(&fs, cli.command).await
}

async fn run(fs: &GalacticFs, command: Command) -> Result<()> {
    match command {
        Command::Cat { path } => {
            let file = fs.read(path.as_str()).await?.into_file()?;
            io::stdout().write_all(&file.bytes().await?)?;
        }
        Command::Ls { path, depth, tree } => {
            let mut options = ReadOptions::new(path);
            if let Some(depth) = depth {
                options = options.depth(depth);
            }
            match fs.read(options).await? {
                Entry::File(file) => println!("{}\t{}", file.size(), file.path()),
                Entry::Folder(folder) if tree => print_tree(&folder.tree(), 0),
                Entry::Folder(folder) => {
                    for entry in folder.entries() {
                        print_entry(entry);
                    }
                }
            }
        }
        Command::Write {
            path,
            content,
            append,
            no_overwrite,
        } => {
            let data = match content {
                Some(content) => WriteData::from(content),
                None => {
                    let mut buf = Vec::new();
                    io::stdin().read_to_end(&mut buf)?;
                    WriteData::from(buf)
                }
            };
            let options = WriteOptions {
                append,
                overwrite: !no_overwrite,
            };
            let entry = fs.write(&path, data, options).await?;
            tracing::info!("Wrote {}", entry.path());
        }
        Command::Mkdir { path } => {
            let path = galactic_fs::codec::as_folder_path(&path);
            fs.write(&path, WriteData::Empty, WriteOptions::default())
                .await?;
        }
        Command::Cp {
            from,
            to,
            no_overwrite,
        } => {
            fs.copy(&from, &to, overwrite_options(no_overwrite)).await?;
        }
        Command::Mv {
            from,
            to,
            no_overwrite,
        } => {
            fs.move_to(&from, &to, overwrite_options(no_overwrite))
                .await?;
        }
        Command::Rm { path } => {
            let removed = fs.delete(&path).await?;
            println!("removed {} document(s)", removed);
        }
        Command::Info => {
            let info = fs.info().await?;
            let caps = fs.capabilities();
            println!("used:       {}", info.used);
            println!("quota:      {}", info.quota);
            println!("freespace:  {}", info.freespace);
            println!("persistent: {}", caps.persistent);
        }
        Command::Watch { pattern } => {
            let (subscription, mut rx) = fs.watch(&pattern)?.channel()?;
            println!("watching {} (Ctrl-C to stop)", pattern);

            loop {
                tokio::select! {
                    batch = rx.recv() => match batch {
                        Some(entries) => {
                            for entry in &entries {
                                let mark = if entry.is_deleted() { "-" } else { "+" };
                                println!("{} {}", mark, entry.path());
                            }
                        }
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            subscription.unsubscribe();
        }
    }
    Ok(())
}

fn overwrite_options(no_overwrite: bool) -> WriteOptions {
    WriteOptions {
        overwrite: !no_overwrite,
        ..Default::default()
    }
}

fn print_entry(entry: &Entry) {
    match entry {
        Entry::File(file) => println!("{:>10}  {}", file.size(), file.path()),
        Entry::Folder(folder) => println!("{:>10}  {}", "-", folder.path()),
    }
}

fn print_tree(tree: &Tree, indent: usize) {
    for (name, node) in tree {
        match node {
            TreeNode::File(file) => {
                println!("{:indent$}{} ({} bytes)", "", name, file.size(), indent = indent)
            }
            TreeNode::Folder { children, .. } => {
                println!("{:indent$}{}/", "", name, indent = indent);
                print_tree(children, indent + 2);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galactic_fs::Backend;
    use tempfile::TempDir;

    #[test]
    fn test_malformed_config_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "backend = [").unwrap();

        let cli = Cli::parse_from(["galactic", "--config", path.to_str().unwrap(), "info"]);
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn test_overrides_apply_to_loaded_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[storage]\nname = \"work\"\n").unwrap();

        let cli = Cli::parse_from([
            "galactic",
            "--config",
            path.to_str().unwrap(),
            "--backend",
            "memory",
            "info",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.storage.backend, Backend::Memory);
        assert_eq!(config.storage.name, "work");
    }
}
