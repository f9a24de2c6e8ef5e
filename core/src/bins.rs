//! Bin edges and the linear bin lookup shared by every other module.
//!
//! Lookups never fail: a value outside the binspace simply has no bin, and
//! callers decide what to do about it.

use serde::{Deserialize, Serialize};

use crate::error::{MigrationError, MigrationResult};

/// Index of the bin holding `value`, scanning linearly from bin 0.
///
/// Bin `i` is the closed interval `[edges[i], edges[i + 1]]`, so a value on
/// a shared edge lands in the lower bin. Returns `None` when the value lies
/// outside every bin (including NaN).
pub fn bin_number(edges: &[f64], value: f64) -> Option<usize> {
    edges
        .windows(2)
        .position(|w| w[0] <= value && value <= w[1])
}

/// Point-slope line through `(x1, y1)` and `(x2, y2)`, evaluated at `x`.
///
/// When the two x-coordinates coincide the line is undefined and `y2` is
/// returned.
pub fn interpolate(x1: f64, x2: f64, y1: f64, y2: f64, x: f64) -> f64 {
    if x2 == x1 {
        return y2;
    }
    (y2 - y1) / (x2 - x1) * (x - x1) + y1
}

/// Ordered, contiguous bin edges. Fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct BinEdges {
    edges: Vec<f64>,
}

impl BinEdges {
    pub fn new(edges: Vec<f64>) -> MigrationResult<Self> {
        if edges.len() < 2 {
            return Err(MigrationError::InvalidBins(format!(
                "need at least 2 edges, got {}",
                edges.len()
            )));
        }
        if let Some(bad) = edges.iter().find(|e| !e.is_finite()) {
            return Err(MigrationError::InvalidBins(format!("non-finite edge {bad}")));
        }
        if let Some(i) = edges.windows(2).position(|w| w[1] <= w[0]) {
            return Err(MigrationError::InvalidBins(format!(
                "edges not strictly increasing at index {}: {} >= {}",
                i + 1,
                edges[i],
                edges[i + 1]
            )));
        }
        Ok(Self { edges })
    }

    /// `n_edges` evenly spaced edges from `start` to `stop` inclusive.
    pub fn linspace(start: f64, stop: f64, n_edges: usize) -> MigrationResult<Self> {
        if n_edges < 2 {
            return Err(MigrationError::InvalidBins(format!(
                "need at least 2 edges, got {n_edges}"
            )));
        }
        let step = (stop - start) / (n_edges - 1) as f64;
        let mut edges: Vec<f64> = (0..n_edges).map(|i| start + step * i as f64).collect();
        // Pin the endpoint so it matches `stop` exactly.
        edges[n_edges - 1] = stop;
        Self::new(edges)
    }

    pub fn bin_number(&self, value: f64) -> Option<usize> {
        bin_number(&self.edges, value)
    }

    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn first(&self) -> f64 {
        self.edges[0]
    }

    pub fn last(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn width(&self, bin: usize) -> f64 {
        self.edges[bin + 1] - self.edges[bin]
    }

    pub fn center(&self, bin: usize) -> f64 {
        (self.edges[bin] + self.edges[bin + 1]) / 2.0
    }

    pub fn centers(&self) -> Vec<f64> {
        crate::stats::bin_centers(&self.edges)
    }
}

impl TryFrom<Vec<f64>> for BinEdges {
    type Error = MigrationError;

    fn try_from(edges: Vec<f64>) -> MigrationResult<Self> {
        Self::new(edges)
    }
}

impl From<BinEdges> for Vec<f64> {
    fn from(bins: BinEdges) -> Self {
        bins.edges
    }
}
