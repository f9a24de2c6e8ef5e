//! The run driver: plays the chemical-evolution integrator's side of the
//! tracer interface.
//!
//! EXECUTION ORDER (per output step):
//!   1. Every star-forming zone forms `stars_per_zone` tracers at the step's
//!      time, each carrying `history(t) * dt / stars_per_zone` of mass.
//!   2. Each formation is appended to the diagnostic file, if enabled.
//!   3. Every tracer formed so far is sampled for its current zone.
//!
//! RULES:
//!   - The migration table is built before the first step and never
//!     touched again.
//!   - Each zone draws from its own RNG stream per step, so results do not
//!     depend on the order zones are visited.
//!   - The diagnostic file must be closed with `finish()`.

use std::fs::File;
use std::io::BufWriter;

use serde::Serialize;

use crate::{
    bins::BinEdges,
    catalog::{HydroCatalog, MigrationCensus},
    clock::SimClock,
    config::RunConfig,
    diagnostics::DiagnosticWriter,
    disk_model::{DiskModel, Evolution, History, ZoneParameters},
    error::{MigrationError, MigrationResult},
    migration_table::MigrationTable,
    rng::RngBank,
    stats,
    tracer::{MigrationMode, TracerModel, TracerTrajectory},
    types::{Gyr, Kpc, Step, Zone},
};

/// One tracer particle and the stellar mass it carries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tracer {
    pub trajectory: TracerTrajectory,
    pub mass: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneSummary {
    pub zone: Zone,
    pub radius: Kpc,
    pub n_tracers: usize,
    pub final_mass: f64,
    /// Mass-weighted median birth radius of tracers ending here.
    pub median_birth_radius: Option<Kpc>,
    /// Peak of the mass-weighted birth-radius distribution.
    pub birth_radius_mode: Option<Kpc>,
    /// 16th and 84th percentile birth radii.
    pub birth_radius_dispersion: Option<(Kpc, Kpc)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub mode: MigrationMode,
    pub end_time: Gyr,
    pub n_tracers: usize,
    pub total_mass: f64,
    /// Tracers whose outcome was synthesised by the table repair.
    pub unknown_height: usize,
    /// Origin zone vs. zone at the end of the run.
    pub census: MigrationCensus,
    pub zones: Vec<ZoneSummary>,
}

pub struct MigrationEngine {
    pub clock:    SimClock,
    pub rng_bank: RngBank,
    config:       RunConfig,
    model:        TracerModel,
    rad_bins:     BinEdges,
    zones:        Vec<ZoneParameters>,
    tracers:      Vec<Tracer>,
    occupancy:    Vec<f64>,
    diagnostics:  Option<DiagnosticWriter<BufWriter<File>>>,
}

impl MigrationEngine {
    /// Build a fully wired engine from a configuration and a catalog.
    pub fn build(config: RunConfig, catalog: &HydroCatalog) -> MigrationResult<Self> {
        config.validate()?;
        let time_bins = config.time_bins.build()?;
        let rad_bins = config.radial_bins.build()?;

        let filtered;
        let catalog = if config.height_filter {
            filtered = catalog.height_filtered();
            &filtered
        } else {
            catalog
        };

        let table = MigrationTable::build(catalog, &time_bins, &rad_bins, config.orientation);
        let model = TracerModel::new(table, time_bins, config.mode);
        let disk = DiskModel::new(config.disk, rad_bins.clone())?;
        let zones = disk.zones()?;

        let diagnostics = match &config.diagnostics {
            Some(path) => Some(DiagnosticWriter::create(path, config.diagnostic_layout)?),
            None => None,
        };

        Ok(Self {
            clock: SimClock::new(config.n_steps, config.end_time),
            rng_bank: RngBank::new(config.seed),
            occupancy: vec![0.0; rad_bins.n_bins()],
            config,
            model,
            rad_bins,
            zones,
            tracers: Vec::new(),
            diagnostics,
        })
    }

    /// Build an engine whose catalog path comes from the configuration.
    pub fn from_config(config: RunConfig) -> MigrationResult<Self> {
        let path = config.catalog.clone().ok_or_else(|| {
            MigrationError::InvalidConfig("no particle catalog configured".into())
        })?;
        let catalog = HydroCatalog::load(&path, &config.columns)?;
        Self::build(config, &catalog)
    }

    /// Run every remaining step, including the formation at t = 0.
    pub fn run(&mut self) -> MigrationResult<()> {
        let remaining = self.clock.n_steps - self.clock.current_step;
        self.run_steps(remaining)
    }

    /// Run up to `n` steps. Used for testing and partial runs.
    pub fn run_steps(&mut self, n: Step) -> MigrationResult<()> {
        if self.clock.current_step == 0 && self.tracers.is_empty() {
            log::info!(
                "Run started: seed={} zones={} steps={} mode={:?}",
                self.rng_bank.master_seed(),
                self.zones.len(),
                self.clock.n_steps,
                self.config.mode
            );
            self.form_tracers(0)?;
            self.sample_occupancy();
        }
        self.clock.resume();
        for _ in 0..n {
            if self.clock.is_finished() {
                break;
            }
            self.step()?;
        }
        self.clock.pause();
        Ok(())
    }

    /// Advance one step. Only reached through `run_steps`, which forms the
    /// t = 0 tracers first.
    fn step(&mut self) -> MigrationResult<usize> {
        let step = self.clock.advance();
        let formed = self.form_tracers(step)?;
        self.sample_occupancy();
        log::debug!(
            "step={step} t={:.3} formed={formed} total={}",
            self.clock.current_time(),
            self.tracers.len()
        );
        Ok(formed)
    }

    fn form_tracers(&mut self, step: Step) -> MigrationResult<usize> {
        let time = self.clock.time_of(step);
        let dt = self.clock.dt();
        let per_zone = self.config.stars_per_zone;
        let mut formed = 0;

        for params in &self.zones {
            if matches!(params.history, History::Quenched) {
                continue;
            }
            let mass = params.history.at(time) * dt / per_zone as f64;
            let mut rng = self.rng_bank.for_stream_at_step(params.zone as u64, step);
            for _ in 0..per_zone {
                let trajectory = self.model.assign(params.zone, time, &mut rng)?;
                if let Some(writer) = self.diagnostics.as_mut() {
                    writer.record(&trajectory)?;
                }
                self.tracers.push(Tracer { trajectory, mass });
                formed += 1;
            }
        }
        Ok(formed)
    }

    fn sample_occupancy(&mut self) {
        let time = self.clock.current_time();
        self.occupancy.iter_mut().for_each(|m| *m = 0.0);
        for tracer in &self.tracers {
            let zone = tracer.trajectory.zone_at(time);
            if let Some(slot) = self.occupancy.get_mut(zone) {
                *slot += tracer.mass;
            }
        }
    }

    pub fn tracers(&self) -> &[Tracer] {
        &self.tracers
    }

    pub fn model(&self) -> &TracerModel {
        &self.model
    }

    pub fn zone_parameters(&self) -> &[ZoneParameters] {
        &self.zones
    }

    /// Stellar mass per zone at the current step.
    pub fn occupancy(&self) -> &[f64] {
        &self.occupancy
    }

    /// Aggregate the tracer population at the end of the run.
    pub fn summary(&self) -> RunSummary {
        let end = self.clock.end_time;
        let n_zones = self.rad_bins.n_bins();
        let mut census = MigrationCensus::default();
        let mut by_zone: Vec<(Vec<f64>, Vec<f64>)> = vec![(Vec::new(), Vec::new()); n_zones];
        let mut unknown_height = 0;

        for tracer in &self.tracers {
            let t = &tracer.trajectory;
            let final_zone = t.zone_at(end);
            census.tally(t.origin_zone as f64, final_zone as f64);
            if t.has_unknown_height() {
                unknown_height += 1;
            }
            if let Some((radii, masses)) = by_zone.get_mut(final_zone) {
                radii.push(self.rad_bins.center(t.origin_zone));
                masses.push(tracer.mass);
            }
        }

        let edges = self.rad_bins.edges();
        let zones = by_zone
            .into_iter()
            .enumerate()
            .map(|(zone, (radii, masses))| {
                let pdf = stats::weighted_histogram(&radii, &masses, edges, true);
                let has_mass = masses.iter().any(|m| *m > 0.0);
                ZoneSummary {
                    zone,
                    radius: self.rad_bins.center(zone),
                    n_tracers: radii.len(),
                    final_mass: masses.iter().sum(),
                    median_birth_radius: stats::weighted_median(&radii, &masses),
                    birth_radius_mode: if has_mass {
                        stats::distribution_mode(&pdf, edges)
                    } else {
                        None
                    },
                    birth_radius_dispersion: stats::percentile_dispersion(&pdf, edges),
                }
            })
            .collect();

        RunSummary {
            seed: self.rng_bank.master_seed(),
            mode: self.config.mode,
            end_time: end,
            n_tracers: self.tracers.len(),
            total_mass: self.tracers.iter().map(|t| t.mass).sum(),
            unknown_height,
            census,
            zones,
        }
    }

    /// Close the diagnostic file. Returns the number of rows written, or 0
    /// when diagnostics are disabled or already closed.
    pub fn finish(&mut self) -> MigrationResult<usize> {
        match self.diagnostics.take() {
            Some(writer) => {
                let rows = writer.finish()?;
                log::info!("Diagnostics closed after {rows} rows");
                Ok(rows)
            }
            None => Ok(0),
        }
    }
}
