use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod aggregate;
mod error;
mod extract;
mod locate;
mod log;
mod model;
mod plan;
mod render;
mod scan;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "gda-bench-plots")]
#[command(about = "Aggregate GDA benchmark logs into chart series", long_about = None)]
struct Cli {
    /// Log level (error|warn|info|debug|trace); RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate result logs and write one chart data file per chart.
    Report {
        /// Root of the results tree (contains n<NNN>_s<S>_e<E>.<suffix>/ directories).
        #[arg(long)]
        results: PathBuf,

        /// Chart plan (JSON). Defaults to the built-in presets.
        #[arg(long = "plan")]
        plan_file: Option<PathBuf>,

        /// Only build these charts (repeatable).
        #[arg(long = "chart")]
        charts: Vec<String>,

        #[arg(short = 'o', long)]
        out: PathBuf,
    },
    /// List the charts of a plan.
    List {
        #[arg(long = "plan")]
        plan_file: Option<PathBuf>,
    },
    /// List experiment directories found under a results tree.
    Scan {
        #[arg(long)]
        results: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .try_init()?;

    match cli.cmd {
        Commands::Report {
            results,
            plan_file,
            charts,
            out,
        } => {
            // 1) Load + validate the plan before touching any result file.
            let mut plans = plan::load(plan_file.as_deref())?;
            if !charts.is_empty() {
                for name in &charts {
                    if !plans.iter().any(|p| &p.name == name) {
                        anyhow::bail!("unknown chart: {}", name);
                    }
                }
                plans.retain(|p| charts.contains(&p.name));
            }
            debug!(charts = plans.len(), results = %results.display(), "plan loaded");

            // 2) Aggregate every chart; any failure aborts before output.
            let data = model::build_charts(&results, &plans)?;

            // 3) Hand off to the renderer.
            for path in render::write_charts(&out, &data)? {
                println!("Wrote {}", path.display());
            }
            info!(charts = data.len(), "done");
        }
        Commands::List { plan_file } => {
            for p in plan::load(plan_file.as_deref())? {
                println!(
                    "{:<40} {:<10} {} series",
                    p.name,
                    format!("{:?}", p.style).to_lowercase(),
                    p.series.len()
                );
            }
        }
        Commands::Scan { results } => {
            for dir in scan::scan(&results)? {
                let families: Vec<String> = dir.families.iter().map(|f| f.to_string()).collect();
                println!(
                    "{:<32} nodes={:<5} scale={:<3} ef={:<3} width={:<4} families={}",
                    dir.name,
                    dir.nodes,
                    dir.scale,
                    dir.edge_factor,
                    dir.width.map(|w| w.to_string()).unwrap_or_else(|| "-".into()),
                    if families.is_empty() {
                        "?".to_string()
                    } else {
                        families.join(",")
                    }
                );
            }
        }
    }

    Ok(())
}
