//! plughost-bench - load-time benchmark against the offline session.

use clap::{Parser, Subcommand};
use plughost::plugin::LoadStage;
use plughost::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plughost-bench")]
#[command(about = "Measure plugin load phases", long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the plugins the host can load
    List,

    /// Load a plugin repeatedly and report phase timings
    Run {
        /// Plugin name (default: the built-in gain effect)
        #[arg(default_value = "Gain")]
        plugin: String,

        /// Number of loads
        #[arg(short = 'n', long, default_value = "10")]
        iterations: usize,

        /// Pause between loads in milliseconds
        #[arg(long, default_value = "500")]
        settle_ms: u64,

        /// Instantiate in the host process
        #[arg(long)]
        in_process: bool,

        /// WAV file played into effect plugins
        #[arg(long)]
        source: Option<PathBuf>,

        /// Hardware sample rate in Hz
        #[arg(short, long, default_value = "48000")]
        sample_rate: u32,

        /// Hardware channel count
        #[arg(short, long, default_value = "2")]
        channels: u16,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::List => {
            let builder = HostEngine::builder().registry(HostEngineBuilder::builtin_registry());
            let instantiator = builder.builtin_instantiator();
            let host = builder.build_offline(instantiator, AudioFormat::stereo(48000.0))?;
            for (category, plugins) in host.scan_plugins() {
                println!("{category}:");
                for plugin in plugins {
                    println!("  {plugin}");
                }
            }
        }

        Commands::Run {
            plugin,
            iterations,
            settle_ms,
            in_process,
            source,
            sample_rate,
            channels,
            json,
        } => {
            let mut builder = HostEngine::builder().registry(HostEngineBuilder::builtin_registry());
            if let Some(path) = source {
                builder = builder.source_wav(path);
            }
            let instantiator = builder.builtin_instantiator();
            let hardware = AudioFormat::standard(f64::from(sample_rate), channels);
            let mut host = builder.build_offline(instantiator, hardware)?;

            let descriptor = HostEngineBuilder::builtin_registry()
                .find(&plugin)
                .ok_or_else(|| plughost::Error::PluginNotFound(plugin.clone()))?;

            let config = BenchmarkConfig::default()
                .iterations(iterations)
                .settle_delay(Duration::from_millis(settle_ms))
                .out_of_process(!in_process);
            let report = host.benchmark(&descriptor, &config).await;
            host.unload_plugin();

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            for (i, run) in report.runs.iter().enumerate() {
                let status = match run.failure {
                    Some(stage) => format!("failed at {stage}"),
                    None => "ok".to_string(),
                };
                println!("#{:<3} {}  [{}]", i + 1, run.summary(), status);
            }
            println!();
            for stage in [
                LoadStage::Find,
                LoadStage::Instantiate,
                LoadStage::ConnectGraph,
                LoadStage::AllocateResources,
                LoadStage::LoadView,
            ] {
                if let Some(avg) = report.average_phase(stage) {
                    println!("{:<28} {:>8.3} ms", stage.to_string(), avg.as_secs_f64() * 1000.0);
                }
            }
            println!("{report}");
        }
    }

    Ok(())
}
