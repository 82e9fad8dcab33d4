use anyhow::{bail, Context};
use appwrite_playground::config::PlaygroundConfig;
use appwrite_playground::harness::{render_entry, ActionLog, Severity};
use appwrite_playground::playground::{Playground, PlaygroundOptions, StaticInputs};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Log entries are already printed by `flush`; their tracing mirror stays silent by default.
const DEFAULT_LOG_FILTER: &str = "warn,appwrite_playground::harness::log=off";

#[derive(Parser, Debug)]
#[command(name = "playground", about = "Run Appwrite playground actions by label")]
struct Args {
    /// TOML config file; missing files are ignored
    #[arg(short, long, default_value = "playground.toml")]
    config: PathBuf,

    #[arg(long)]
    endpoint: Option<String>,

    #[arg(long)]
    project: Option<String>,

    #[arg(long)]
    dev_key: Option<String>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    password: Option<String>,

    #[arg(long)]
    name: Option<String>,

    /// Reject a second concurrent run of the same action
    #[arg(long)]
    single_flight: bool,

    /// Skip the realtime subscription at start-up
    #[arg(long)]
    no_realtime: bool,

    /// Skip the connectivity check at start-up
    #[arg(long)]
    no_ping: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every action label, grouped by section
    List,
    /// Run the given actions in order
    Run {
        #[arg(required = true)]
        labels: Vec<String>,
    },
    /// Read action labels from stdin, one per line
    Repl,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<PlaygroundConfig> {
        let mut config = PlaygroundConfig::load(&self.config)
            .with_context(|| format!("failed to load {}", self.config.display()))?;
        config.apply_env();
        if let Some(endpoint) = &self.endpoint {
            config.client.endpoint = endpoint.clone();
        }
        if let Some(project) = &self.project {
            config.client.project_id = project.clone();
        }
        if let Some(key) = &self.dev_key {
            config.client.dev_key = Some(key.clone());
        }
        Ok(config.with_defaults())
    }

    fn inputs(&self) -> StaticInputs {
        let defaults = StaticInputs::default();
        StaticInputs {
            email: self.email.clone().unwrap_or(defaults.email),
            password: self.password.clone().unwrap_or(defaults.password),
            name: self.name.clone().unwrap_or(defaults.name),
        }
    }

    fn options(&self) -> anyhow::Result<PlaygroundOptions> {
        let mut options = PlaygroundOptions::new(self.load_config()?);
        options.inputs = Arc::new(self.inputs());
        options.realtime = !self.no_realtime;
        options.ping = !self.no_ping;
        options.single_flight = self.single_flight;
        Ok(options)
    }
}

/// Prints log entries newer than `cursor` and returns the new cursor.
fn flush(log: &ActionLog, cursor: u64) -> u64 {
    let mut cursor = cursor;
    for entry in log.entries_after(cursor) {
        match entry.severity {
            Severity::Info => println!("{}", render_entry(&entry)),
            _ => eprintln!("{}", render_entry(&entry)),
        }
        cursor = entry.seq;
    }
    cursor
}

fn print_catalogue(playground: &Playground) {
    for (section, actions) in playground.registry().sections() {
        println!("{section}");
        for action in actions {
            println!("  {}", action.label());
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .with_writer(std::io::stderr)
        .init();

    let playground = Playground::new(args.options()?)?;
    if let Command::List = args.command {
        print_catalogue(&playground);
        return Ok(());
    }

    let output = Arc::clone(playground.output());
    let started = playground.start().await;
    let mut cursor = flush(&output, 0);
    if let Err(err) = started {
        bail!("{}: {err}", playground.status());
    }

    let mut failures = 0usize;
    match &args.command {
        Command::Run { labels } => {
            for label in labels {
                if !playground.invoke(label).await.is_success() {
                    failures += 1;
                }
                cursor = flush(&output, cursor);
            }
        }
        Command::Repl => {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let label = line.trim();
                match label {
                    "" => continue,
                    "quit" | "exit" => break,
                    "list" => print_catalogue(&playground),
                    _ => {
                        if !playground.invoke(label).await.is_success() {
                            failures += 1;
                        }
                        cursor = flush(&output, cursor);
                        println!("-- {}", playground.status());
                    }
                }
            }
        }
        Command::List => {}
    }

    playground.shutdown();
    // Realtime events that arrived while the last action ran.
    flush(&output, cursor);

    tracing::debug!(failures, "playground finished");
    if failures > 0 {
        bail!("{failures} action(s) failed");
    }
    Ok(())
}
