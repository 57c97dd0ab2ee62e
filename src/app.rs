//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the signal handler,
//! runs the remover over the given paths and reports failures.

use anyhow::{Context, Result};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use smart_rm::cli::Args;
use smart_rm::output as out;
use smart_rm::{
    BatchReport, CONFIG_ENV, LogLevel, RemovalOutcome, Remover, default_config_path, load_config,
    shutdown,
};

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<ExitCode> {
    // Handle --print-config before logging init
    if args.print_config {
        print_config_location();
        return Ok(ExitCode::SUCCESS);
    }

    let mut cfg = load_config()?;
    args.apply_overrides(&mut cfg);

    let guard_opt = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("failed to initialize logging: {e}"));
        e
    })?;

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("received interrupt; finishing the current path and stopping");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        })
        .context("failed to install signal handler")?;
    }

    debug!(?cfg, mode = ?args.mode(), "Starting smart_rm");

    let result = Remover::from_config(&cfg)
        .map_err(anyhow::Error::from)
        .and_then(|remover| {
            remover
                .remove_list(&args.paths, args.mode())
                .map_err(anyhow::Error::from)
        });

    let code = match result {
        Ok(report) => {
            report_outcomes(&report, &cfg.log_level, cfg.dry_run);
            if report.has_failures() || report.interrupted {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    };

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
    Ok(code)
}

fn print_config_location() {
    if let Ok(cfg_env) = std::env::var(CONFIG_ENV) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {cfg_env}"));
        return;
    }
    match default_config_path() {
        Some(p) => {
            out::print_info(&format!("Default smart_rm config path:\n  {}", p.display()));
            if !p.exists() {
                out::print_info("No config file exists there yet; built-in defaults are used.");
            }
        }
        None => out::print_error("could not determine a default config path"),
    }
}

/// One line per failed path; per-item lines only when verbose.
fn report_outcomes(report: &BatchReport, level: &LogLevel, dry_run: bool) {
    let verbose = matches!(level, LogLevel::Info | LogLevel::Debug);
    for (path, outcome) in &report.outcomes {
        match outcome {
            RemovalOutcome::Failed(e) => {
                out::print_error(&format!("cannot remove '{}': {e}", path.display()));
            }
            RemovalOutcome::Completed(summary) => {
                if dry_run {
                    for item in &summary.would_move {
                        out::print_user(&format!("would remove '{}'", item.path.display()));
                    }
                } else if verbose {
                    for moved in &summary.moved {
                        out::print_user(&format!("removed '{}'", moved.original.display()));
                    }
                }
                if summary.orphaned > 0 {
                    out::print_warn(&format!(
                        "{} item(s) from '{}' were moved without a restore record",
                        summary.orphaned,
                        path.display()
                    ));
                }
            }
        }
    }
    if report.interrupted {
        out::print_warn("interrupted; remaining paths were not processed");
    }
    info!(moved = report.moved_count(), failed = report.failures().count(), "Removal finished");
}
