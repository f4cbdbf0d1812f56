//! exvm CLI entry point.
//!
//! Binds an engine from the registry to an in-memory host and runs calls
//! against it.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use exvm_common::{ConfigFile, Revision};
use exvm_core::EngineRegistry;
use exvm_host::{HostSession, MemoryHost};

#[derive(Debug, Parser)]
#[command(name = "exvm", version, about = "Run pluggable execution engines against an in-memory host")]
struct Cli {
    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute code with an engine.
    Run(RunArgs),
    /// List registered engines and their options.
    Engines,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// TOML configuration file.
    #[arg(long, env = "EXVM_CONFIG")]
    config: Option<PathBuf>,

    /// Code to execute, as hex text.
    #[arg(long)]
    code: Option<String>,

    /// Revision to run under (e.g. `byzantium`).
    #[arg(long)]
    revision: Option<Revision>,

    /// Engine option, applied before the first call.
    #[arg(long = "option", value_name = "NAME=VALUE", value_parser = parse_option)]
    options: Vec<(String, String)>,

    /// Number of times to run the call.
    #[arg(long, default_value_t = 1)]
    repeat: u32,
}

fn parse_option(text: &str) -> Result<(String, String), String> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{text}'"))?;
    if name.is_empty() {
        return Err(format!("missing option name in '{text}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,exvm=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.json);

    let registry = EngineRegistry::with_builtin();
    match cli.command {
        Command::Run(args) => run(&registry, args),
        Command::Engines => {
            list_engines(&registry);
            Ok(())
        }
    }
}

fn run(registry: &EngineRegistry, args: RunArgs) -> anyhow::Result<()> {
    // Load configuration, then apply command-line overrides
    let mut config = match &args.config {
        Some(path) => ConfigFile::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ConfigFile::default(),
    };

    if let Some(code) = args.code {
        config.runtime.execution.code = code;
    }
    if let Some(revision) = args.revision {
        config.runtime.engine.revision = revision;
    }
    config.runtime.engine.options.extend(args.options);

    let engine = &config.runtime.engine;
    let execution = &config.runtime.execution;
    let message = execution
        .call_message()
        .context("Invalid execution input")?;

    // Pre-load the host with the configured accounts
    let host = MemoryHost::from_accounts(&config.accounts);
    info!(
        engine = %engine.name,
        revision = %engine.revision,
        accounts = host.account_count(),
        "Configuration loaded"
    );

    // Bind the engine and configure it before the first call
    let mut session = HostSession::open(registry, &engine.name, &host, engine.revision)
        .with_context(|| format!("Failed to bind engine '{}'", engine.name))?;

    for rejected in session.apply_options(&engine.options) {
        warn!(error = %rejected, "Option ignored");
    }

    // Run the call
    for call in 1..=args.repeat {
        let outcome = session.execute(&message, execution.code_bytes());
        println!(
            "call {call}: status={} gas_left={} output=0x{}",
            outcome.status,
            outcome.gas_left,
            hex::encode(&outcome.output)
        );
    }
    session.close();

    let (reads, writes) = host.access_counts();
    info!(reads, writes, "Host callbacks");

    // Report the destination account's final storage
    println!("storage of {}:", message.address);
    match host.account(&message.address) {
        Some(account) if !account.storage.is_empty() => {
            for (key, value) in &account.storage {
                println!("  {key} = {value}");
            }
        }
        _ => println!("  (empty)"),
    }

    Ok(())
}

fn list_engines(registry: &EngineRegistry) {
    for name in registry.names() {
        // A throwaway instance reports the declared options
        let Ok(engine) = registry.create(&name) else {
            continue;
        };
        println!("{name}");
        for option in engine.options() {
            println!("  --option {}=<value>  {}", option.name, option.description);
        }
        engine.destroy();
    }
}
