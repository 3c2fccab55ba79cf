use crate::generator::profile::{build_sweep_series_from_config, GeneratorConfig};
use crate::gui_bridge::model::VisualizationModel;
use crate::workflow::runner::Runner;
use anyhow::Result;
use emicore::sa_interface::SweepSeries;
use serde_json::json;
use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

type SharedModel = Arc<RwLock<VisualizationModel>>;

fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Debug)]
struct BridgeError;

impl warp::reject::Reject for BridgeError {}

fn with_state(
    state: SharedModel,
) -> impl Filter<Extract = (SharedModel,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn with_runner(
    runner: Arc<Runner>,
) -> impl Filter<Extract = (Arc<Runner>,), Error = Infallible> + Clone {
    warp::any().map(move || runner.clone())
}

/// Full model as last published: three spectra, records, session context.
async fn spectrum_view(state: SharedModel) -> Result<impl warp::Reply, Infallible> {
    let model = state.read().unwrap().clone();
    Ok(warp::reply::json(&model))
}

/// Classification results only, for report tooling that skips the traces.
async fn report_view(state: SharedModel) -> Result<impl warp::Reply, Infallible> {
    let model = state.read().unwrap().clone();
    let failing = model.records.iter().filter(|record| !record.passes()).count();
    Ok(warp::reply::json(&json!({
        "records": model.records,
        "failing": failing,
        "notes": model.notes,
    })))
}

/// Aggregated counters of the runner shared with this bridge.
async fn health_view(runner: Arc<Runner>) -> Result<impl warp::Reply, Infallible> {
    Ok(warp::reply::json(&runner.metrics()))
}

async fn ingest_series(
    series: SweepSeries,
    state: SharedModel,
    runner: Arc<Runner>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match runner.execute(&series) {
        Ok(result) => {
            let records = result.report.len();
            let failing = result.report.failures().count();
            *state.write().unwrap() = VisualizationModel::from_result(&result, &series);
            Ok(warp::reply::with_status(
                warp::reply::json(&json!({
                    "status": "ok",
                    "records": records,
                    "failing": failing,
                })),
                StatusCode::OK,
            ))
        }
        Err(err) => {
            eprintln!("ingest error: {}", err);
            Err(warp::reject::custom(BridgeError))
        }
    }
}

async fn ingest_generated(
    config: GeneratorConfig,
    state: SharedModel,
    runner: Arc<Runner>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let outcome = build_sweep_series_from_config(&config)
        .and_then(|series| runner.execute(&series).map(|result| (series, result)));
    match outcome {
        Ok((series, result)) => {
            let records = result.report.len();
            if let Some(name) = config.scenario.as_ref() {
                println!("[GUI] Scenario {} -> {} peak records", name, records);
            }
            *state.write().unwrap() = VisualizationModel::from_result(&result, &series);
            Ok(warp::reply::with_status(
                warp::reply::json(&json!({
                    "status": "ok",
                    "records": records,
                    "description": config.description.unwrap_or_default(),
                })),
                StatusCode::OK,
            ))
        }
        Err(err) => {
            eprintln!("ingest-config error: {}", err);
            Err(warp::reject::custom(BridgeError))
        }
    }
}

fn routes(
    state: SharedModel,
    runner: Arc<Runner>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let spectrum = warp::path("spectrum")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(spectrum_view);
    let report = warp::path("report")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(report_view);
    let health = warp::path("health")
        .and(warp::get())
        .and(with_runner(runner.clone()))
        .and_then(health_view);
    let ingest = warp::path("ingest")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and(with_runner(runner.clone()))
        .and_then(ingest_series);
    let generated = warp::path("ingest-config")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state))
        .and(with_runner(runner))
        .and_then(ingest_generated);
    spectrum.or(report).or(health).or(ingest).or(generated)
}

/// Hosts the HTTP endpoints the GUI polls and posts series through. The
/// server owns its own single-threaded runtime on a background thread.
pub struct GuiBridge {
    state: SharedModel,
}

impl GuiBridge {
    pub fn new(runner: Arc<Runner>) -> Self {
        let state: SharedModel = Arc::new(RwLock::new(VisualizationModel::default()));
        let api = routes(state.clone(), runner);

        thread::spawn(move || {
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build runtime");
            runtime.block_on(warp::serve(api).run(gui_bind_address()));
        });

        Self { state }
    }

    /// Replaces the published model, for offline runs that bypass ingest.
    pub fn publish(&self, model: &VisualizationModel) -> Result<()> {
        let mut guard = self.state.write().unwrap();
        *guard = model.clone();
        let spectra = [&guard.peak, &guard.quasi_peak, &guard.average]
            .iter()
            .filter(|spectrum| spectrum.is_some())
            .count();
        println!(
            "[GUI] spectra published: {}, peak records: {}",
            spectra,
            guard.records.len()
        );
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> VisualizationModel {
        self.state.read().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::build_sweep_series;
    use crate::workflow::config::WorkflowConfig;
    use crate::workflow::runner::Runner;
    use emicore::sa_interface::DetectorMode;
    use std::sync::Arc;

    #[test]
    fn gui_bridge_updates_state() {
        let cfg = WorkflowConfig::from_args(
            "EMC_30MHz_1GHz".to_string(),
            3,
            0.3,
            DetectorMode::QuasiPeak,
        );
        let runner = Arc::new(Runner::new(cfg.clone()));
        let gui = GuiBridge::new(runner.clone());
        let series = build_sweep_series(&cfg.preset, cfg.sweeps, cfg.interval_s).unwrap();
        let result = runner.execute(&series).unwrap();
        let model = VisualizationModel::from_result(&result, &series);
        gui.publish(&model).unwrap();

        let snapshot = gui.snapshot();
        assert_eq!(snapshot.records.len(), result.report.len());
        assert!(snapshot.quasi_peak.is_some());
        assert_eq!(snapshot.sampling.unwrap().total_samples, 3);
    }
}
