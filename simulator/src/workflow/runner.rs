use std::sync::Arc;

use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use emicore::prelude::ProcessingStage;
use emicore::processing::{DetectorInput, DetectorOutput, DetectorStage, PeakSearchStage};
use emicore::sa_interface::{DetectorMode, DetectorSpectrum, PeakReport, SweepSeries};
use emicore::telemetry::{MetricsRecorder, MetricsSnapshot};
use log::info;

pub struct WorkflowResult {
    pub peak: DetectorSpectrum,
    pub quasi_peak: DetectorSpectrum,
    pub average: DetectorSpectrum,
    pub report: PeakReport,
    pub dropped_observations: usize,
    pub degenerate_bins: usize,
    pub notes: Vec<String>,
}

impl WorkflowResult {
    pub fn spectrum(&self, mode: DetectorMode) -> &DetectorSpectrum {
        match mode {
            DetectorMode::Peak => &self.peak,
            DetectorMode::QuasiPeak => &self.quasi_peak,
            DetectorMode::Average => &self.average,
        }
    }
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    metrics: Arc<MetricsRecorder>,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(MetricsRecorder::new()),
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn execute(&self, series: &SweepSeries) -> anyhow::Result<WorkflowResult> {
        let stage_config = self.config.to_stage_config();
        let snapshot = Arc::new(series.clone());

        let mut detector = DetectorStage::new();
        detector
            .initialize(&stage_config)
            .context("initializing detector stage")?;

        let mut run_mode = |mode: DetectorMode| -> anyhow::Result<DetectorOutput> {
            let output = detector
                .execute(DetectorInput {
                    series: snapshot.clone(),
                    mode,
                })
                .map_err(|err| {
                    self.metrics.record_error();
                    err
                })
                .with_context(|| format!("executing detector stage for {}", mode))?;
            self.metrics.record_spectrum(&output.metadata);
            Ok(output)
        };

        let peak_output = run_mode(DetectorMode::Peak)?;
        let quasi_peak_output = run_mode(DetectorMode::QuasiPeak)?;
        let average_output = run_mode(DetectorMode::Average)?;
        detector.cleanup();

        let mut search = PeakSearchStage::new();
        search
            .initialize(&stage_config)
            .context("initializing peak search stage")?;
        let report_input = match self.config.report_mode {
            DetectorMode::Peak => &peak_output,
            DetectorMode::QuasiPeak => &quasi_peak_output,
            DetectorMode::Average => &average_output,
        };
        let report = search
            .execute(report_input.spectrum.clone())
            .context("executing peak search stage")?;
        search.cleanup();

        info!(
            "workflow produced {} peak records ({} failing)",
            report.len(),
            report.failures().count()
        );

        let mut notes = peak_output.metadata.notes;
        notes.extend(quasi_peak_output.metadata.notes);
        notes.extend(average_output.metadata.notes);

        Ok(WorkflowResult {
            peak: peak_output.spectrum,
            dropped_observations: quasi_peak_output.metadata.dropped_observations,
            degenerate_bins: quasi_peak_output.metadata.degenerate_bins,
            quasi_peak: quasi_peak_output.spectrum,
            average: average_output.spectrum,
            report,
            notes,
        })
    }
}

/// Fixed-width console rendering of a peak report.
pub fn format_peak_table(report: &PeakReport) -> String {
    if report.is_empty() {
        return "No peaks detected\n".to_string();
    }
    let mut table = String::new();
    table.push_str(&format!(
        "{:<12} {:<12} {:<10} {:<10} {:<11} {:<11} {:<15}\n",
        "Freq (MHz)", "Amp (dBuV)", "FCC Limit", "CE Limit", "FCC Margin", "CE Margin", "Status"
    ));
    table.push_str(&"-".repeat(87));
    table.push('\n');
    for record in &report.records {
        let mut status = Vec::new();
        if record.exceeds_fcc {
            status.push("FCC Fail");
        }
        if record.exceeds_ce {
            status.push("CE Fail");
        }
        if status.is_empty() {
            status.push("Pass");
        }
        table.push_str(&format!(
            "{:<12.3} {:<12.2} {:<10.1} {:<10.1} {:<11.2} {:<11.2} {:<15}\n",
            record.frequency_mhz(),
            record.amplitude_dbuv,
            record.fcc_limit_dbuv,
            record.ce_limit_dbuv,
            record.fcc_margin_db,
            record.ce_margin_db,
            status.join(", ")
        ));
    }
    table
}
