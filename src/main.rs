use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use envconfig::Envconfig;
use kafka_replica_balancer::{BalancerStrategy, ClusterSnapshot, Config, Rebalancer};

#[derive(Parser)]
#[command(
    name = "replica-balancer",
    about = "Compute a replica reassignment plan from a cluster snapshot",
    version
)]
struct Cli {
    /// Cluster snapshot JSON: broker_count, racks and per-topic assignments
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the reassignment JSON (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Balancer algorithm, overrides BALANCER_ALGORITHM
    #[arg(short, long)]
    algorithm: Option<String>,

    /// Write the full plan with per-topic outcomes instead of the
    /// kafka-reassign-partitions format
    #[arg(long)]
    full_plan: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kafka_replica_balancer=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::init_from_env().context("failed to load configuration from env")?;

    let strategy = match cli.algorithm.as_deref() {
        Some(name) => BalancerStrategy::from_name_or_default(Some(name)),
        None => config.strategy(),
    };

    let raw = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read snapshot {}", cli.input.display()))?;
    let snapshot: ClusterSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse snapshot {}", cli.input.display()))?;

    let plan = Rebalancer::new(strategy).rebalance(&snapshot);

    let rendered = if cli.full_plan {
        serde_json::to_string_pretty(&plan)?
    } else {
        serde_json::to_string_pretty(&plan.to_kafka_reassignment())?
    };

    match &cli.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write plan to {}", path.display()))?,
        None => writeln!(std::io::stdout(), "{}", rendered)?,
    }

    Ok(())
}
