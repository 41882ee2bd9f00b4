//! json-config-sync command line.
//!
//! One-shot driver around [`ConfigSync`]: each invocation loads the
//! persisted registry, applies the requested file events and writes the
//! registry back.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use json_config_sync::config::{load_config, SyncConfig};
use json_config_sync::observability::logging::init_logging;
use json_config_sync::registry::RegistryError;
use json_config_sync::value::flatten_json;
use json_config_sync::{ConfigSync, MemoryRegistry, RegistryBinding, SyncError, SyncOutcome, ORIGIN_KEY};

#[derive(Parser)]
#[command(name = "json-config-sync")]
#[command(about = "Sync JSON configuration files into a configuration registry", long_about = None)]
struct Cli {
    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Registry state file, overriding the settings
    #[arg(short, long)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install or update configuration files
    Install {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Remove the configurations bound to files
    Uninstall {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Install every handled file in a directory
    Sync {
        /// Directory to scan (defaults to the configured one)
        dir: Option<PathBuf>,
    },
    /// Print the flattened properties of a file
    Flatten { file: PathBuf },
    /// List managed configurations
    List,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => SyncConfig::default(),
    };
    init_logging(&config.observability);

    match run(cli, config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when at least one file failed.
async fn run(cli: Cli, config: SyncConfig) -> Result<bool, Box<dyn std::error::Error>> {
    if let Commands::Flatten { file } = &cli.command {
        let text = fs::read_to_string(file)?;
        for (key, value) in flatten_json(&text)? {
            println!("{}={}", key, value);
        }
        return Ok(true);
    }

    let registry = Arc::new(open_registry(&config, cli.state.as_deref())?);
    let binding = Arc::new(RegistryBinding::bound(registry.clone()));
    let sync = ConfigSync::new(binding).with_extension(config.watch.extension.clone());

    let all_ok = match cli.command {
        Commands::Install { files } => {
            let mut all_ok = true;
            for file in files {
                all_ok &= report_install(&file, sync.install(&file));
            }
            all_ok
        }
        Commands::Uninstall { files } => {
            let mut all_ok = true;
            for file in files {
                all_ok &= report_uninstall(&file, &sync);
            }
            all_ok
        }
        Commands::Sync { dir } => {
            let dir = dir.unwrap_or_else(|| config.watch.directory.clone());
            sync_directory(&sync, &dir).await?
        }
        Commands::List => {
            for entry in registry.list() {
                let origin = entry
                    .properties()
                    .and_then(|p| p.get(ORIGIN_KEY))
                    .map(ToString::to_string)
                    .unwrap_or_default();
                let count = entry.properties().map_or(0, |p| p.len().saturating_sub(1));
                match &entry.id.factory_pid {
                    Some(factory) => println!("{} (factory {}) {} properties {}", entry.id, factory, count, origin),
                    None => println!("{} {} properties {}", entry.id, count, origin),
                }
            }
            true
        }
        Commands::Flatten { .. } => true,
    };
    Ok(all_ok)
}

fn open_registry(config: &SyncConfig, state: Option<&Path>) -> Result<MemoryRegistry, RegistryError> {
    if !config.registry.persist && state.is_none() {
        return Ok(MemoryRegistry::new(None));
    }
    MemoryRegistry::load_from_file(state.unwrap_or(&config.registry.state_file))
}

/// Install every handled file in `dir`, one blocking task per file.
async fn sync_directory(sync: &ConfigSync, dir: &Path) -> Result<bool, std::io::Error> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && sync.can_handle(&path) {
            files.push(path);
        }
    }
    files.sort();
    tracing::info!(dir = %dir.display(), count = files.len(), "Syncing directory");

    let tasks: Vec<_> = files
        .into_iter()
        .map(|path| {
            let sync = sync.clone();
            tokio::task::spawn_blocking(move || {
                let result = sync.install(&path);
                (path, result)
            })
        })
        .collect();

    let mut all_ok = true;
    for task in tasks {
        match task.await {
            Ok((path, result)) => all_ok &= report_install(&path, result),
            Err(e) => {
                tracing::error!(error = %e, "Sync task failed");
                all_ok = false;
            }
        }
    }
    Ok(all_ok)
}

fn report_install(path: &Path, result: Result<SyncOutcome, SyncError>) -> bool {
    match result {
        Ok(outcome) => {
            let state = match (outcome.created, outcome.changed) {
                (true, _) => "created",
                (false, true) => "updated",
                (false, false) => "unchanged",
            };
            println!("{}: {} {}", path.display(), outcome.id, state);
            true
        }
        Err(e) => {
            eprintln!("{}: {}", path.display(), e);
            false
        }
    }
}

fn report_uninstall(path: &Path, sync: &ConfigSync) -> bool {
    match sync.uninstall(path) {
        Ok(id) => {
            println!("{}: {} deleted", path.display(), id);
            true
        }
        // Deleting something already gone is not an error for the caller.
        Err(SyncError::NotFound { .. }) => {
            println!("{}: not installed", path.display());
            true
        }
        Err(e) => {
            eprintln!("{}: {}", path.display(), e);
            false
        }
    }
}
