// Purpose: Classify the host as a virtual machine or a physical user machine

use clap::Parser;
use colored::*;
use log::{debug, error, warn};
use std::path::PathBuf;
use tokio::time::timeout;

use vmcheck::engine::{Absolute, DecisionEngine, Evaluation};
use vmcheck::{config, host, probes, system};

/// Heuristic VM / sandbox detector
#[derive(Parser)]
#[command(name = "vmcheck")]
#[command(about = "Classify this machine as a virtual machine (true) or a physical user machine (false)")]
#[command(version)]
struct Cli {
    /// Path to the YAML configuration (default: vmcheck.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Comma-separated, ordered list of probes to run instead of the configured battery
    #[arg(long)]
    probes: Option<String>,
    /// List available probes and exit
    #[arg(long)]
    list_probes: bool,
    /// Output the full evaluation in JSON format
    #[arg(long)]
    json: bool,
    /// Show each probe's verdict before the result
    #[arg(long)]
    verbose: bool,
    /// Enable debug logging
    #[arg(long)]
    debug: bool,
    /// Deadline for the whole classification pass in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(serde::Serialize)]
struct JsonOutput<'a> {
    system: system::SystemInfo,
    checked_at: String,
    battery: &'a [String],
    #[serde(flatten)]
    evaluation: &'a Evaluation,
}

// Check if terminal supports colors
fn supports_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if std::env::var("TERM").is_ok() && cfg!(unix) {
        return true;
    }

    // On Windows, only modern terminals handle ANSI sequences
    if cfg!(windows) {
        if let Ok(term_program) = std::env::var("TERM_PROGRAM") {
            return term_program == "vscode" || term_program == "WindowsTerminal";
        }
        if let Ok(wt_session) = std::env::var("WT_SESSION") {
            return !wt_session.is_empty();
        }
        if let Ok(ansi_colors) = std::env::var("ANSICON") {
            return !ansi_colors.is_empty();
        }
    }

    false
}

fn init_colors() {
    if !supports_colors() {
        colored::control::set_override(false);
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), message);
    std::process::exit(2);
}

fn list_probes() {
    println!("{}", "Available probes (default battery order first):".blue().bold());
    for name in probes::ALL_PROBES {
        if probes::DEFAULT_BATTERY.contains(&name) {
            println!("  {}", name.cyan());
        } else {
            println!("  {} {}", name.cyan(), "(not in default battery)".dimmed());
        }
    }
}

fn print_report(battery: &[String], evaluation: &Evaluation) {
    println!("{}", "Probe verdicts:".blue().bold());
    for name in battery {
        let result = evaluation.results.iter().find(|r| &r.probe == name);
        let line = match result {
            Some(r) if r.verdict.definitely_user => r.verdict.to_string().green().bold(),
            Some(r) if r.verdict.definitely_vm => r.verdict.to_string().red().bold(),
            Some(r) if r.verdict.is_neutral() => r.verdict.to_string().dimmed(),
            Some(r) if r.verdict.leans_vm() => r.verdict.to_string().yellow(),
            Some(r) => r.verdict.to_string().green(),
            None => "skipped".dimmed(),
        };
        println!("  {:<24} {}", name.cyan(), line);
    }

    match &evaluation.decided_by {
        Some(short) => {
            let side = match short.verdict {
                Absolute::User => "physical user machine".green().bold(),
                Absolute::Vm => "virtual machine".red().bold(),
            };
            println!("{} {} is conclusive: {}", "Decided:".blue().bold(), short.probe.cyan(), side);
        }
        None => {
            println!(
                "{} vm {:.2} vs user {:.2}",
                "Scores:".blue().bold(),
                evaluation.accumulated.score_vm,
                evaluation.accumulated.score_user
            );
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration first to know the debug setting
    let mut cfg = match config::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(format!("Configuration error: {}", e)),
    };

    if let Some(ref list) = cli.probes {
        cfg.probes = Some(config::split_probe_list(list));
    }
    if cli.timeout.is_some() {
        cfg.deadline_secs = cli.timeout;
    }
    if cli.debug {
        cfg.debug = Some(true);
    }

    let warnings = match config::validate_config(&cfg) {
        Ok(warnings) => warnings,
        Err(e) => fail(format!("Configuration error: {}", e)),
    };

    // Warn keeps stdout limited to the answer unless debugging
    let log_level = if cfg.debug() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    for warning in &warnings {
        warn!("[CONFIG WARNING] {}", warning);
    }
    debug!("Loaded config: {:#?}", cfg);

    init_colors();

    if cli.list_probes {
        list_probes();
        return;
    }

    let deadline = cfg.deadline();
    let platform = cfg.platform();
    debug!("System volume: {}", platform.system_volume.display());

    let host = host::Host::system(platform, cfg.command_timeout(), tokio::runtime::Handle::current());
    let battery_names = cfg.probe_names();
    let battery = match probes::battery(&battery_names, &host) {
        Ok(battery) => battery,
        Err(e) => fail(e),
    };
    let engine = DecisionEngine::new(battery);

    debug!("Running {} probe(s) with a {}s deadline", battery_names.len(), deadline.as_secs());
    let evaluation = match timeout(deadline, tokio::task::spawn_blocking(move || engine.evaluate())).await {
        Ok(Ok(evaluation)) => evaluation,
        Ok(Err(e)) => {
            error!("Classification task panicked: {}", e);
            std::process::exit(2);
        }
        Err(_) => fail(format!("classification did not finish within {}s", deadline.as_secs())),
    };

    if cli.json {
        let output = JsonOutput {
            system: system::get_system_info(),
            checked_at: chrono::Local::now().to_rfc3339(),
            battery: &battery_names,
            evaluation: &evaluation,
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(format!("Failed to serialize JSON output: {}", e)),
        }
        return;
    }

    if cli.verbose {
        print_report(&battery_names, &evaluation);
    }

    println!("{}", evaluation.is_vm);
}
