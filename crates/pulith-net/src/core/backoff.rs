use std::time::Duration;

use rand::Rng;

/// Shapes the `tanh` ramp of the decorrelated jitter curve.
const P_FACTOR: f64 = 4.0;

/// Rescales the curve so the median first delay matches the configured value.
const RP_SCALING_FACTOR: f64 = 1.0 / 1.4;

/// Calculate a decorrelated jitter backoff schedule.
///
/// Each retry advances a random walk `t` by a uniform step in `[0, 1)` and
/// emits the growth of `2^t * tanh(sqrt(4t))` since the previous retry,
/// scaled so that the median first delay is `median_first_delay`. Delays grow
/// roughly exponentially but are randomized, so concurrent retriers do not
/// synchronize.
///
/// # Arguments
///
/// * `median_first_delay` - Median of the first delay
/// * `retries` - Number of delays to produce
/// * `rng` - Source of jitter
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use rand::SeedableRng;
/// use pulith_net::core::{decorrelated_jitter, jitter_ceiling};
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let delays = decorrelated_jitter(Duration::from_secs(1), 5, &mut rng);
///
/// assert_eq!(delays.len(), 5);
/// let total: Duration = delays.iter().sum();
/// assert!(total <= jitter_ceiling(Duration::from_secs(1), 5) + Duration::from_millis(1));
/// ```
pub fn decorrelated_jitter<R: Rng + ?Sized>(
    median_first_delay: Duration,
    retries: u32,
    rng: &mut R,
) -> Vec<Duration> {
    let target = median_first_delay.as_secs_f64();
    let mut delays = Vec::with_capacity(retries as usize);

    let mut t = 0.0_f64;
    let mut prev = 0.0_f64;

    for _ in 0..retries {
        t += rng.random::<f64>();
        let next = curve(t);
        delays.push(secs_to_duration((next - prev) * RP_SCALING_FACTOR * target));
        prev = next;
    }

    delays
}

/// Upper bound on the sum of a [`decorrelated_jitter`] schedule.
///
/// The walk advances by less than one per retry and the curve is monotonic,
/// so the delays telescope to at most `curve(retries)` scaled.
pub fn jitter_ceiling(median_first_delay: Duration, retries: u32) -> Duration {
    secs_to_duration(curve(f64::from(retries)) * RP_SCALING_FACTOR * median_first_delay.as_secs_f64())
}

/// A constant delay repeated once per retry.
pub fn fixed_delays(delay: Duration, retries: u32) -> Vec<Duration> {
    vec![delay; retries as usize]
}

fn curve(t: f64) -> f64 {
    2_f64.powf(t) * (P_FACTOR * t).sqrt().tanh()
}

fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
