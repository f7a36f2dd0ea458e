//! Maintboard CLI - dashboard views over a maintenance records spreadsheet.

use chrono::{Local, NaiveDateTime};
use clap::Parser;
use maintboard::cli::{Cli, Commands, ConfigCommands};
use maintboard::commands::{self, CommandResult};
use maintboard::config::{ConfigOverrides, ConfigPaths, OutputFormat, ResolvedConfig, resolve_config};
use maintboard::dashboard::{self, Snapshot};
use maintboard::filter::Predicate;
use maintboard::form::NewRecordForm;
use maintboard::logging;
use std::env;
use std::process;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut human = cli.human_readable;
    let result = resolve(&cli).and_then(|config| {
        human |= config.output_format() == OutputFormat::Human;
        run_command(cli.command, &config, human)
    });

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// Resolve configuration for the current directory, applying CLI flags.
fn resolve(cli: &Cli) -> maintboard::Result<ResolvedConfig> {
    let cwd = env::current_dir()?;
    let paths = ConfigPaths::discover(&cwd);

    let mut overrides = ConfigOverrides::new();
    if let Some(source) = &cli.source {
        overrides = overrides.with_source(source.clone());
    }
    if cli.human_readable {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }
    match &cli.command {
        Commands::Recent { limit: Some(n), .. } => overrides = overrides.with_recent_limit(*n),
        #[cfg(feature = "watch")]
        Commands::Watch {
            interval: Some(secs),
            ..
        } => overrides = overrides.with_refresh_interval(*secs),
        _ => {}
    }

    let config = resolve_config(&paths, &overrides)?;
    tracing::debug!(
        source = %config.source().display(),
        source_from = %config.source.source,
        "configuration resolved"
    );
    Ok(config)
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn load(config: &ResolvedConfig) -> maintboard::Result<Snapshot> {
    dashboard::refresh(config.source(), now())
}

fn run_command(command: Commands, config: &ResolvedConfig, human: bool) -> maintboard::Result<()> {
    match command {
        Commands::Summary { filter } => {
            let predicate: Predicate = filter.parse()?;
            output(&commands::summary(&load(config)?, predicate), human);
        }
        Commands::Records { filter, limit } => {
            let predicate: Predicate = filter.parse()?;
            output(&commands::records(&load(config)?, predicate, limit), human);
        }
        Commands::Recent { filter, .. } => {
            let predicate: Predicate = filter.parse()?;
            output(
                &commands::recent(&load(config)?, predicate, config.recent_limit()),
                human,
            );
        }
        Commands::Drilldown { status } => {
            output(&commands::drilldown(&load(config)?, &status), human);
        }
        Commands::Breakdown { filter } => {
            let predicate: Predicate = filter.parse()?;
            output(&commands::breakdown(&load(config)?, predicate), human);
        }
        Commands::Add {
            asset_tag,
            location,
            description,
            priority,
            status,
        } => {
            let form = NewRecordForm {
                asset_tag,
                location,
                description,
                priority,
                status,
            };
            output(&commands::add_record(&form)?, human);
        }
        Commands::Sample { out } => {
            output(&commands::sample(&out, now())?, human);
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => output(&commands::config_show(config), human),
        },
        #[cfg(feature = "watch")]
        Commands::Watch {
            filter,
            no_file_watch,
            no_stdin,
            ..
        } => {
            let predicate: Predicate = filter.parse()?;
            run_watch(config, predicate, !no_file_watch, !no_stdin, human)?;
        }
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: CommandResult>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

/// Refresh until Ctrl-C, printing the summary after every refresh.
#[cfg(feature = "watch")]
fn run_watch(
    config: &ResolvedConfig,
    predicate: Predicate,
    watch_file: bool,
    manual: bool,
    human: bool,
) -> maintboard::Result<()> {
    use dashboard::{RefreshTrigger, SnapshotStore, WatchOptions};
    use std::sync::Arc;
    use std::time::Duration;

    let print = move |trigger: Option<RefreshTrigger>, snapshot: &Snapshot| {
        let summary = commands::summary(snapshot, predicate);
        if human {
            if let Some(trigger) = trigger {
                println!("--- refresh #{} ({:?}) ---", snapshot.generation, trigger);
            }
            println!("{}", summary.to_human());
        } else {
            println!(
                "{}",
                serde_json::json!({
                    "generation": snapshot.generation,
                    "trigger": trigger,
                    "summary": summary,
                })
            );
        }
    };

    let store = Arc::new(SnapshotStore::new(load(config)?));
    print(None, store.current().as_ref());

    let options = WatchOptions {
        source: config.source().to_path_buf(),
        interval: Duration::from_secs(config.refresh_interval()),
        watch_file,
        manual,
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| maintboard::Error::Other(format!("Failed to create runtime: {}", e)))?
        .block_on(dashboard::watch(options, store, shutdown_signal(), |trigger, snapshot| {
            print(Some(trigger), snapshot)
        }))
}

/// Resolves on Ctrl-C.
#[cfg(feature = "watch")]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C");
    }
}
