use anyhow::Context;
use clap::Parser;
use emicore::sa_interface::DetectorMode;
use generator::profile::{build_sweep_series_from_config, GeneratorConfig};
use gui_bridge::bridge::GuiBridge;
use gui_bridge::model::VisualizationModel;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::{format_peak_table, Runner};

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Rust-facing EMC analysis workflow driver")]
struct Args {
    /// Run a single synthetic collection offline and emit a summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Measurement preset shaping the synthetic collection
    #[arg(long, default_value = "EMC_30MHz_1GHz")]
    preset: String,
    #[arg(long, default_value_t = 50)]
    sweeps: usize,
    #[arg(long, default_value_t = 0.3)]
    interval_s: f64,
    /// Spectrum fed to the peak search: peak, quasi_peak, or average
    #[arg(long, default_value = "quasi_peak")]
    report_mode: String,
    /// Keep the GUI bridge alive for incoming series payloads
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let report_mode: DetectorMode = args
        .report_mode
        .parse()
        .map_err(|message: String| anyhow::anyhow!(message))?;

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.preset, args.sweeps, args.interval_s, report_mode)
    };

    let runner = Runner::new(workflow_config.clone());
    let gui_bridge = GuiBridge::new(Arc::new(runner.clone()));

    let generator_config = GeneratorConfig {
        preset: workflow_config.preset.clone(),
        sweeps: workflow_config.sweeps,
        interval_s: workflow_config.interval_s,
        ..GeneratorConfig::default()
    };
    let series = build_sweep_series_from_config(&generator_config)?;

    if args.offline {
        let result = runner.execute(&series)?;

        for mode in DetectorMode::ALL {
            if let Some(summary) = result.spectrum(mode).summary() {
                println!(
                    "{:<11} max {:.2} dBuV, min {:.2} dBuV, mean {:.2} dBuV over {} bins",
                    mode.to_string(),
                    summary.max_dbuv,
                    summary.min_dbuv,
                    summary.mean_dbuv,
                    summary.measured_bins
                );
            }
        }
        println!();
        print!("{}", format_peak_table(&result.report));

        let metrics = runner.metrics();
        println!(
            "Offline run -> records {}, failing {}, dropped observations {}, degenerate bins {}",
            result.report.len(),
            result.report.failures().count(),
            metrics.dropped_observations,
            metrics.degenerate_bins
        );

        let model = VisualizationModel::from_result(&result, &series);
        gui_bridge.publish(&model)?;
        gui_bridge.publish_status("Offline workflow results ready.");

        let data_dir = PathBuf::from("measurement_data");
        fs::create_dir_all(&data_dir)?;

        let summary = serde_json::json!({
            "session": series.session,
            "sampling": series.sampling_info(),
            "records": result.report.records,
            "notes": result.notes,
        });
        fs::write(
            data_dir.join("offline_summary.json"),
            serde_json::to_string_pretty(&summary)?,
        )?;

        let log_line = format!(
            "records={} dropped={} degenerate={} notes={:?}\n",
            result.report.len(),
            result.dropped_observations,
            result.degenerate_bins,
            result.notes
        );
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(data_dir.join("offline_analysis.log"))?;
        file.write_all(log_line.as_bytes())?;
    }
    if args.serve {
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
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
