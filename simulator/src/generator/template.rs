/// Gaussian rendering of a narrowband emission as a resolution filter would
/// draw it, in dB above the surrounding floor.
pub fn emission_profile_db(frequency_hz: f64, center_hz: f64, sigma_hz: f64, peak_db: f64) -> f64 {
    if sigma_hz <= 0.0 {
        return 0.0;
    }
    let normalized = (frequency_hz - center_hz) / sigma_hz;
    peak_db * (-0.5 * normalized * normalized).exp()
}
