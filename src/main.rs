//! Leakprobe CLI
//!
//! Drives the leak probe against a running target VM: repeated
//! load/unload cycles via a user-supplied driver command, native-memory
//! sampling via jcmd, and a three-valued verdict mapped to the exit
//! code (0 pass, 1 skipped, 2 leak found, 3 probe error).

use clap::Parser;
use leakprobe_core::{
    CommandWorkload, JcmdSampler, LeakProbe, Outcome, ParseMissPolicy, ProbeConfig, Result,
};
use std::path::PathBuf;
use tracing::{debug, warn, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "leakprobe")]
#[command(
    about = "Probe a running VM for native-memory growth across class load/unload cycles",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Target VM process id
    #[arg(long, env = "LEAKPROBE_PID")]
    pid: u32,

    /// Workload repetitions per round (overrides config file)
    #[arg(long)]
    cycles: Option<u32>,

    /// Report marker for the monitored call site (overrides config file)
    #[arg(long)]
    marker: Option<String>,

    /// Treat a report scan miss as a 0KB sample instead of an error
    #[arg(long)]
    lenient_parse: bool,

    /// Probe configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the jcmd binary (defaults to PATH lookup)
    #[arg(long)]
    jcmd: Option<PathBuf>,

    /// Print the outcome as JSON instead of a summary line
    #[arg(long)]
    json: bool,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Command run once per load/unload cycle, after `--`
    #[arg(last = true, required = true)]
    cycle_command: Vec<String>,
}

fn build_config(cli: &Cli) -> Result<ProbeConfig> {
    let mut config = match &cli.config {
        Some(path) => ProbeConfig::from_file(path)?,
        None => ProbeConfig::default(),
    };

    if let Some(cycles) = cli.cycles {
        config.cycles = cycles;
    }
    if let Some(marker) = &cli.marker {
        config.marker = marker.clone();
    }
    if cli.lenient_parse {
        config.parse_miss = ParseMissPolicy::ZeroDefault;
    }

    Ok(config)
}

fn run(cli: &Cli) -> Result<Outcome> {
    let config = build_config(cli)?;
    debug!(?config, "Probe configuration");

    let sampler = match &cli.jcmd {
        Some(jcmd) => JcmdSampler::with_jcmd(jcmd, cli.pid),
        None => JcmdSampler::new(cli.pid),
    };

    if !sampler.target_alive() {
        warn!(pid = cli.pid, "Target process does not appear to be alive");
    }

    let workload = CommandWorkload::from_command_line(&cli.cycle_command)?;

    LeakProbe::new(sampler, workload, config).run()
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::new(format!(
        "leakprobe={level},leakprobe_core={level}",
        level = level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("leakprobe v{} starting...", env!("CARGO_PKG_VERSION"));

    match run(&cli) {
        Ok(outcome) => {
            if cli.json {
                match serde_json::to_string_pretty(&outcome) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error: failed to serialize outcome: {}", e);
                        std::process::exit(3);
                    }
                }
            } else {
                println!("{}", outcome);
            }
            std::process::exit(outcome.exit_code());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(3);
        }
    }
}
