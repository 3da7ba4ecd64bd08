use anyhow::Context;
use clap::Parser;
use generator::profile::{build_stream_bytes, GeneratorConfig};
use gui_bridge::bridge::{default_bind_address, GuiBridge};
use std::fs::File;
use std::io::{self, BufReader, Cursor};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::{Runner, WorkflowResult};
use workflow::sinks::{FanOut, ReportWriter};

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Detector of linearly-frequency-modulated segments in raw I/Q streams"
)]
struct Args {
    /// Sample rate of the input in Hz
    sample_rate: Option<f64>,
    /// Prefix for per-snapshot output files
    output_prefix: Option<String>,
    /// Load a workflow config from YAML (positional values override it)
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Read samples from a file instead of standard input
    #[arg(long)]
    input: Option<PathBuf>,
    /// Run on a generated recording described by this YAML file, or the built-in scenario
    #[arg(long)]
    synthetic: Option<Option<PathBuf>>,
    #[arg(long)]
    frame_len: Option<usize>,
    #[arg(long)]
    snapshot_period: Option<f64>,
    /// Only report peaks at or above this level (dB)
    #[arg(long)]
    min_level_db: Option<f32>,
    /// Added to every reported frequency (Hz)
    #[arg(long)]
    frequency_offset: Option<f64>,
    /// Also write each snapshot's raw samples next to its report
    #[arg(long, default_value_t = false)]
    write_samples: bool,
    /// Serve the latest snapshot over HTTP and keep running until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value_t = default_bind_address())]
    bind: SocketAddr,
}

fn build_config(args: &Args) -> anyhow::Result<WorkflowConfig> {
    let mut config = match &args.workflow {
        Some(path) => WorkflowConfig::load(path)?,
        None => {
            let sample_rate = args
                .sample_rate
                .context("SAMPLE_RATE is required without --workflow")?;
            let prefix = args
                .output_prefix
                .clone()
                .context("OUTPUT_PREFIX is required without --workflow")?;
            WorkflowConfig::from_args(sample_rate, prefix)
        }
    };

    if let Some(sample_rate) = args.sample_rate {
        config.sample_rate = sample_rate;
    }
    if let Some(prefix) = &args.output_prefix {
        config.output_prefix = prefix.clone();
    }
    if let Some(frame_len) = args.frame_len {
        config.frame_len = frame_len;
    }
    if let Some(period) = args.snapshot_period {
        config.snapshot_period = period;
    }
    if args.min_level_db.is_some() {
        config.min_level_db = args.min_level_db;
    }
    if let Some(offset) = args.frequency_offset {
        config.frequency_offset = offset;
    }
    config.write_samples |= args.write_samples;
    Ok(config)
}

fn load_generator(path: Option<&PathBuf>, sample_rate: f64) -> anyhow::Result<GeneratorConfig> {
    match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading generator config {}", path.display()))?;
            serde_yaml::from_str(&contents)
                .with_context(|| format!("parsing generator config {}", path.display()))
        }
        None => Ok(GeneratorConfig {
            sample_rate,
            ..Default::default()
        }),
    }
}

fn run(args: &Args, runner: &Runner, sinks: &mut FanOut) -> anyhow::Result<WorkflowResult> {
    if let Some(generator_path) = &args.synthetic {
        let generator = load_generator(generator_path.as_ref(), runner.config().sample_rate)?;
        let bytes = build_stream_bytes(&generator)?;
        return runner.execute(Cursor::new(bytes), sinks);
    }

    match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening input {}", path.display()))?;
            runner.execute(BufReader::new(file), sinks)
        }
        None => runner.execute(io::stdin().lock(), sinks),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = build_config(&args)?;
    let runner = Runner::new(workflow_config.clone()).context("validating configuration")?;

    let mut sinks = FanOut::new();
    sinks.push(Box::new(ReportWriter::new(
        workflow_config.output_prefix.clone(),
        workflow_config.write_samples,
    )));
    let gui_bridge = GuiBridge::new();
    if args.serve {
        gui_bridge.serve(args.bind);
        sinks.push(Box::new(gui_bridge.clone()));
    }

    let result = run(&args, &runner, &mut sinks)?;
    let metrics = result.metrics;
    println!(
        "Processed {:.1}s of input -> snapshots {}, skipped {}, frames {}, detections {}, malformed {}",
        result.elapsed,
        metrics.snapshots,
        metrics.skipped,
        metrics.frames,
        metrics.detections,
        metrics.malformed
    );

    if args.serve {
        gui_bridge.publish_status("Input exhausted; HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
