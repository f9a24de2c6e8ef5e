use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    bins::BinEdges,
    catalog::ColumnMap,
    diagnostics::DiagnosticLayout,
    disk_model::DiskParams,
    error::{MigrationError, MigrationResult},
    migration_table::TableOrientation,
    tracer::MigrationMode,
    types::Gyr,
};

/// Either an explicit list of edges or evenly spaced ones.
///
/// `Edges` is tried first: a three-element array would otherwise also
/// deserialize as `Linspace`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BinSpec {
    Edges(BinEdges),
    Linspace { start: f64, stop: f64, n_edges: usize },
}

impl BinSpec {
    pub fn build(&self) -> MigrationResult<BinEdges> {
        match self {
            BinSpec::Edges(edges) => Ok(edges.clone()),
            BinSpec::Linspace { start, stop, n_edges } => BinEdges::linspace(*start, *stop, *n_edges),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub seed: u64,
    pub time_bins: BinSpec,
    pub radial_bins: BinSpec,
    /// Time of the last output step.
    pub end_time: Gyr,
    pub n_steps: u64,
    /// Tracers formed per star-forming zone per step.
    pub stars_per_zone: usize,
    pub catalog: Option<PathBuf>,
    pub columns: ColumnMap,
    /// Restrict the catalog to the thin-disk subsample.
    pub height_filter: bool,
    pub mode: MigrationMode,
    pub orientation: TableOrientation,
    pub diagnostics: Option<PathBuf>,
    pub diagnostic_layout: DiagnosticLayout,
    pub disk: DiskParams,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed:              42,
            time_bins:         BinSpec::Linspace { start: 0.0, stop: 12.8, n_edges: 41 },
            radial_bins:       BinSpec::Linspace { start: 0.0, stop: 30.0, n_edges: 121 },
            end_time:          12.8,
            n_steps:           256,
            stars_per_zone:    4,
            catalog:           None,
            columns:           ColumnMap::default(),
            height_filter:     false,
            mode:              MigrationMode::All,
            orientation:       TableOrientation::Forward,
            diagnostics:       None,
            diagnostic_layout: DiagnosticLayout::WithHeight,
            disk:              DiskParams::default(),
        }
    }
}

impl RunConfig {
    /// Load a JSON run configuration. Missing fields take their defaults.
    /// In tests, use RunConfig::default_test().
    pub fn load(path: &str) -> MigrationResult<Self> {
        log::info!("Loading run configuration from {path}");
        let content = std::fs::read_to_string(path)?;
        let config: RunConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Small grid for unit tests: ten 1-Gyr time bins and ten 1-kpc zones.
    pub fn default_test() -> Self {
        Self {
            seed:           7,
            time_bins:      BinSpec::Linspace { start: 0.0, stop: 10.0, n_edges: 11 },
            radial_bins:    BinSpec::Linspace { start: 0.0, stop: 10.0, n_edges: 11 },
            end_time:       10.0,
            n_steps:        20,
            stars_per_zone: 2,
            disk: DiskParams {
                disk_age:           10.0,
                star_forming_zones: 8,
                ..DiskParams::default()
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> MigrationResult<()> {
        let time_bins = self.time_bins.build()?;
        self.radial_bins.build()?;

        if !(self.end_time.is_finite() && self.end_time > 0.0) {
            return Err(MigrationError::InvalidConfig(format!(
                "end_time must be positive, got {}",
                self.end_time
            )));
        }
        if time_bins.first() > 0.0 || time_bins.last() < self.end_time {
            return Err(MigrationError::InvalidConfig(format!(
                "time bins [{}, {}] do not span [0, {}]",
                time_bins.first(),
                time_bins.last(),
                self.end_time
            )));
        }
        if self.n_steps == 0 {
            return Err(MigrationError::InvalidConfig("n_steps must be > 0".into()));
        }
        if self.stars_per_zone == 0 {
            return Err(MigrationError::InvalidConfig("stars_per_zone must be > 0".into()));
        }
        Ok(())
    }
}
