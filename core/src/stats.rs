//! Post-hoc aggregation over tracer populations: weighted quantiles,
//! histograms and summaries of binned distributions.

/// Cumulative fraction at the low edge of the 1-sigma band.
pub const SIGMA_LOW: f64 = 0.159;
/// Cumulative fraction at the high edge of the 1-sigma band.
pub const SIGMA_HIGH: f64 = 0.841;

/// Weighted quantile `q` in [0, 1]: the smallest value whose cumulative
/// weight reaches `q` of the total.
///
/// Entries with non-positive or non-finite weight are ignored. Returns
/// `None` when no weight remains or `q` is outside [0, 1].
pub fn weighted_percentile(values: &[f64], weights: &[f64], q: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut pairs: Vec<(f64, f64)> = values
        .iter()
        .zip(weights)
        .filter(|(v, w)| v.is_finite() && w.is_finite() && **w > 0.0)
        .map(|(v, w)| (*v, *w))
        .collect();
    if pairs.is_empty() {
        return None;
    }
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let total: f64 = pairs.iter().map(|(_, w)| w).sum();
    let target = q * total;
    let mut cumulative = 0.0;
    for (value, weight) in &pairs {
        cumulative += weight;
        if cumulative >= target {
            return Some(*value);
        }
    }
    pairs.last().map(|(v, _)| *v)
}

pub fn weighted_median(values: &[f64], weights: &[f64]) -> Option<f64> {
    weighted_percentile(values, weights, 0.5)
}

/// Midpoints of consecutive edges.
pub fn bin_centers(edges: &[f64]) -> Vec<f64> {
    edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
}

/// Counts of `values` per bin. Bins are half-open `[lo, hi)` except the
/// last, which also takes its upper edge; values outside are ignored.
///
/// With `density`, counts are normalised so the histogram integrates to
/// one over the edges. An empty histogram stays all zeros.
pub fn histogram(values: &[f64], edges: &[f64], density: bool) -> Vec<f64> {
    let ones = vec![1.0; values.len()];
    weighted_histogram(values, &ones, edges, density)
}

/// `histogram` where each value contributes its weight instead of one.
pub fn weighted_histogram(values: &[f64], weights: &[f64], edges: &[f64], density: bool) -> Vec<f64> {
    let n_bins = edges.len().saturating_sub(1);
    let mut counts = vec![0.0; n_bins];
    if n_bins == 0 {
        return counts;
    }
    let lo = edges[0];
    let hi = edges[n_bins];

    for (&v, &w) in values.iter().zip(weights) {
        if !(lo..=hi).contains(&v) {
            continue;
        }
        let bin = if v == hi {
            n_bins - 1
        } else {
            // Last edge <= v.
            edges.partition_point(|e| *e <= v) - 1
        };
        counts[bin] += w;
    }

    if density {
        let total: f64 = counts.iter().sum();
        if total > 0.0 {
            for (bin, count) in counts.iter_mut().enumerate() {
                *count /= total * (edges[bin + 1] - edges[bin]);
            }
        }
    }
    counts
}

/// Centre of the highest bin of a binned distribution. The first bin wins
/// ties. Returns `None` for an empty or all-NaN distribution.
pub fn distribution_mode(pdf: &[f64], edges: &[f64]) -> Option<f64> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &p) in pdf.iter().enumerate().take(edges.len().saturating_sub(1)) {
        if p.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, b)| p > b) {
            best = Some((i, p));
        }
    }
    best.map(|(i, _)| (edges[i] + edges[i + 1]) / 2.0)
}

/// Bin centres where the cumulative integral of a normalised distribution
/// first reaches `SIGMA_LOW` and `SIGMA_HIGH`. Returns `None` if the
/// distribution never accumulates to `SIGMA_HIGH`.
pub fn percentile_dispersion(pdf: &[f64], edges: &[f64]) -> Option<(f64, f64)> {
    let mut cumulative = 0.0;
    let mut low = None;
    for (i, &p) in pdf.iter().enumerate().take(edges.len().saturating_sub(1)) {
        cumulative += (edges[i + 1] - edges[i]) * p;
        let center = (edges[i] + edges[i + 1]) / 2.0;
        if low.is_none() && cumulative >= SIGMA_LOW {
            low = Some(center);
        }
        if cumulative >= SIGMA_HIGH {
            return low.map(|l| (l, center));
        }
    }
    None
}
