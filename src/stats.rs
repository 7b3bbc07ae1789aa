use serde::Serialize;

/// Derived response-size statistics. `None` means there was no data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub mean: Option<f64>,
    pub p95: Option<f64>,
}

impl Summary {
    pub fn from_sizes(sizes: &[u64]) -> Self {
        Self {
            mean: mean(sizes),
            p95: percentile(sizes, 95.0),
        }
    }
}

pub fn mean(values: &[u64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: u128 = values.iter().map(|&v| u128::from(v)).sum();
    Some(sum as f64 / values.len() as f64)
}

/// `q`-th percentile (0..=100) with linear interpolation between the two
/// closest ranks, rank = `q / 100 * (n - 1)` over the ascending sample.
pub fn percentile(values: &[u64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let t = rank - lower as f64;

    Some(lerp(sorted[lower] as f64, sorted[upper] as f64, t))
}

// Interpolate from the nearer end so t close to 1 lands exactly on b.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    if t >= 0.5 {
        b - diff * (1.0 - t)
    } else {
        a + diff * t
    }
}
