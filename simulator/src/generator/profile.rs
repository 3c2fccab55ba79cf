use anyhow::Context;
use emicore::sa_interface::{SessionMetadata, SweepSample, SweepSeries};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::generator::template::emission_profile_db;

/// Instrument window presets shared with the acquisition tooling.
#[derive(Debug, Clone, Copy)]
pub struct MeasurementPreset {
    pub name: &'static str,
    pub label: &'static str,
    pub start_freq_hz: f64,
    pub stop_freq_hz: f64,
    pub points: usize,
    pub rbw_hz: f64,
    pub vbw_hz: f64,
}

pub static PRESETS: [MeasurementPreset; 4] = [
    MeasurementPreset {
        name: "EMC_30MHz_1GHz",
        label: "Radiated emissions (30 MHz - 1 GHz)",
        start_freq_hz: 30e6,
        stop_freq_hz: 1e9,
        points: 2001,
        rbw_hz: 100e3,
        vbw_hz: 100e3,
    },
    MeasurementPreset {
        name: "LF_9kHz_150kHz",
        label: "Conducted emissions (9 kHz - 150 kHz)",
        start_freq_hz: 9e3,
        stop_freq_hz: 150e3,
        points: 1001,
        rbw_hz: 200.0,
        vbw_hz: 1e3,
    },
    MeasurementPreset {
        name: "MF_150kHz_30MHz",
        label: "Conducted emissions (150 kHz - 30 MHz)",
        start_freq_hz: 150e3,
        stop_freq_hz: 30e6,
        points: 1501,
        rbw_hz: 10e3,
        vbw_hz: 30e3,
    },
    MeasurementPreset {
        name: "HF_1GHz_3GHz",
        label: "Radiated emissions (1 GHz - 3 GHz)",
        start_freq_hz: 1e9,
        stop_freq_hz: 3e9,
        points: 1001,
        rbw_hz: 1e6,
        vbw_hz: 3e6,
    },
];

pub fn find_preset(name: &str) -> Option<&'static MeasurementPreset> {
    PRESETS.iter().find(|preset| preset.name == name)
}

/// A synthetic narrowband emitter folded into every generated sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmitterSpec {
    pub frequency_hz: f64,
    pub amplitude_dbuv: f64,
    /// Sweep-to-sweep amplitude wobble, +/- dB.
    pub drift_db: f64,
}

/// Configuration for generating synthetic sweep collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub preset: String,
    /// Overrides the preset's point count when set.
    pub points: Option<usize>,
    pub sweeps: usize,
    pub interval_s: f64,
    /// Relative timing jitter applied to each interval.
    pub jitter: f64,
    pub noise_floor_dbuv: f64,
    pub noise_spread_db: f64,
    pub emitters: Vec<EmitterSpec>,
    pub seed: u64,
    pub description: Option<String>,
    pub scenario: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            preset: "EMC_30MHz_1GHz".to_string(),
            points: None,
            sweeps: 50,
            interval_s: 0.3,
            jitter: 0.15,
            noise_floor_dbuv: 24.0,
            noise_spread_db: 3.0,
            emitters: vec![
                EmitterSpec {
                    frequency_hz: 50e6,
                    amplitude_dbuv: 38.0,
                    drift_db: 1.5,
                },
                EmitterSpec {
                    frequency_hz: 125e6,
                    amplitude_dbuv: 44.0,
                    drift_db: 2.0,
                },
                EmitterSpec {
                    frequency_hz: 250e6,
                    amplitude_dbuv: 58.0,
                    drift_db: 2.5,
                },
            ],
            seed: 0,
            description: None,
            scenario: None,
        }
    }
}

impl GeneratorConfig {
    fn normalized_sweeps(&self) -> usize {
        self.sweeps.max(1)
    }
}

fn linear_axis(start_hz: f64, stop_hz: f64, points: usize) -> Vec<f64> {
    if points <= 1 {
        return vec![start_hz];
    }
    let step = (stop_hz - start_hz) / (points - 1) as f64;
    (0..points).map(|i| start_hz + i as f64 * step).collect()
}

fn symmetric_jitter(rng: &mut StdRng, magnitude: f64) -> f64 {
    if magnitude > 0.0 {
        rng.gen_range(-magnitude..=magnitude)
    } else {
        0.0
    }
}

pub fn build_sweep_series_from_config(config: &GeneratorConfig) -> anyhow::Result<SweepSeries> {
    let preset = find_preset(&config.preset)
        .with_context(|| format!("unknown measurement preset '{}'", config.preset))?;
    let points = config.points.unwrap_or(preset.points).max(1);
    let frequencies = linear_axis(preset.start_freq_hz, preset.stop_freq_hz, points);
    let axis_step = if points > 1 {
        (preset.stop_freq_hz - preset.start_freq_hz) / (points - 1) as f64
    } else {
        preset.rbw_hz
    };
    // Emitters render at least one bin wide regardless of the axis density.
    let sigma_hz = axis_step.max(2.0 * preset.rbw_hz);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let sweeps = config.normalized_sweeps();
    let mut samples = Vec::with_capacity(sweeps);
    let mut timestamp = 0.0;

    for _ in 0..sweeps {
        let drifts: Vec<f64> = config
            .emitters
            .iter()
            .map(|emitter| symmetric_jitter(&mut rng, emitter.drift_db))
            .collect();
        let mut amplitudes = Vec::with_capacity(points);
        for &frequency in &frequencies {
            let mut level =
                config.noise_floor_dbuv + symmetric_jitter(&mut rng, config.noise_spread_db);
            for (emitter, drift) in config.emitters.iter().zip(&drifts) {
                let peak_db = emitter.amplitude_dbuv + drift - config.noise_floor_dbuv;
                let contribution =
                    emission_profile_db(frequency, emitter.frequency_hz, sigma_hz, peak_db);
                level += contribution.max(0.0);
            }
            amplitudes.push(level);
        }
        samples.push(SweepSample::new(timestamp, amplitudes));
        timestamp += config.interval_s * (1.0 + symmetric_jitter(&mut rng, config.jitter));
    }

    let session = SessionMetadata {
        preset: preset.name.to_string(),
        start_freq_hz: preset.start_freq_hz,
        stop_freq_hz: preset.stop_freq_hz,
        points,
        rbw_hz: preset.rbw_hz,
        vbw_hz: preset.vbw_hz,
        requested_duration_s: config.interval_s * sweeps as f64,
        description: config.description.clone(),
    };

    Ok(SweepSeries::new(frequencies, samples).with_session(session))
}

pub fn build_sweep_series(
    preset: &str,
    sweeps: usize,
    interval_s: f64,
) -> anyhow::Result<SweepSeries> {
    let config = GeneratorConfig {
        preset: preset.to_string(),
        sweeps,
        interval_s,
        ..Default::default()
    };
    build_sweep_series_from_config(&config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_expected_shape() {
        let series = build_sweep_series("EMC_30MHz_1GHz", 5, 0.3).unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(series.points(), 2001);
        for sample in &series.samples {
            assert_eq!(sample.amplitudes_dbuv.len(), 2001);
        }
        let session = series.session.as_ref().unwrap();
        assert_eq!(session.preset, "EMC_30MHz_1GHz");
        assert_eq!(session.points, 2001);
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(build_sweep_series("UHF_nonsense", 3, 0.3).is_err());
    }

    #[test]
    fn same_seed_reproduces_the_series() {
        let config = GeneratorConfig {
            sweeps: 4,
            points: Some(101),
            ..Default::default()
        };
        let first = build_sweep_series_from_config(&config).unwrap();
        let second = build_sweep_series_from_config(&config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn timestamps_increase_monotonically() {
        let series = build_sweep_series("MF_150kHz_30MHz", 8, 0.25).unwrap();
        for pair in series.samples.windows(2) {
            assert!(pair[1].timestamp_s > pair[0].timestamp_s);
        }
        assert_eq!(series.samples[0].timestamp_s, 0.0);
    }

    #[test]
    fn emitters_rise_above_the_noise_floor() {
        let config = GeneratorConfig {
            sweeps: 3,
            ..Default::default()
        };
        let series = build_sweep_series_from_config(&config).unwrap();
        let strongest = &config.emitters[2];
        let mut bin = 0;
        let mut best = f64::INFINITY;
        for (i, &freq) in series.frequencies_hz.iter().enumerate() {
            let offset = (freq - strongest.frequency_hz).abs();
            if offset < best {
                best = offset;
                bin = i;
            }
        }
        for sample in &series.samples {
            assert!(sample.amplitudes_dbuv[bin] > config.noise_floor_dbuv + 15.0);
        }
    }

    #[test]
    fn preset_catalog_is_addressable() {
        for preset in &PRESETS {
            let found = find_preset(preset.name).unwrap();
            assert_eq!(found.points, preset.points);
        }
        assert!(find_preset("EMC_30MHz_1GHz").is_some());
    }
}
