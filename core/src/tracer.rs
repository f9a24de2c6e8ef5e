//! Per-particle trajectory assignment.
//!
//! When the integrator forms a tracer in some zone at some time, the model
//! draws one empirical outcome for that (zone, time bin) and returns a
//! `TracerTrajectory`: a small value type the integrator samples at every
//! later timestep to learn which zone the tracer occupies.

use serde::{Deserialize, Serialize};

use crate::{
    bins::{interpolate, BinEdges},
    error::{MigrationError, MigrationResult},
    migration_table::{MigrationTable, Outcome, UNKNOWN_HEIGHT},
    rng::TracerRng,
    types::{Gyr, Kpc, Zone},
};

/// Which empirical outcomes a tracer may draw from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationMode {
    #[default]
    All,
    /// Only outcomes at or inside the origin zone.
    Inward,
    /// Only outcomes at or outside the origin zone.
    Outward,
}

impl MigrationMode {
    fn admits(self, origin: Zone, outcome: &Outcome) -> bool {
        match self {
            MigrationMode::All     => true,
            MigrationMode::Inward  => outcome.final_bin <= origin,
            MigrationMode::Outward => outcome.final_bin >= origin,
        }
    }
}

impl std::str::FromStr for MigrationMode {
    type Err = MigrationError;

    fn from_str(s: &str) -> MigrationResult<Self> {
        match s {
            "all"     => Ok(Self::All),
            "inward"  => Ok(Self::Inward),
            "outward" => Ok(Self::Outward),
            other => Err(MigrationError::InvalidConfig(format!(
                "unknown migration mode '{other}'"
            ))),
        }
    }
}

/// Zone occupied by one tracer as a function of time.
///
/// Positions are continuous zone coordinates: `origin_position` and
/// `final_position` each carry an independent sub-bin offset in [0, 1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TracerTrajectory {
    pub origin_zone: Zone,
    pub formation_time: Gyr,
    pub origin_position: f64,
    pub final_position: f64,
    pub final_height: Kpc,
    /// Last time-bin edge; the interpolation reaches `final_position` here.
    pub end_time: Gyr,
}

impl TracerTrajectory {
    /// Continuous zone coordinate at time `t`.
    ///
    /// Before formation the tracer sits at 0. At the formation time it is
    /// exactly in its origin zone. Afterwards it moves linearly towards
    /// `final_position`, extrapolating past `end_time`.
    pub fn position_at(&self, t: Gyr) -> f64 {
        if t < self.formation_time {
            0.0
        } else if t == self.formation_time {
            self.origin_zone as f64
        } else {
            interpolate(
                self.formation_time,
                self.end_time,
                self.origin_position,
                self.final_position,
                t,
            )
        }
    }

    /// Zone index at time `t`, truncated toward zero.
    pub fn zone_at(&self, t: Gyr) -> Zone {
        // `as` saturates negatives to 0.
        self.position_at(t).trunc() as Zone
    }

    /// Zone the tracer is heading to.
    pub fn final_zone(&self) -> Zone {
        self.final_position.trunc() as Zone
    }

    /// True when the drawn outcome was synthesised rather than observed.
    pub fn has_unknown_height(&self) -> bool {
        self.final_height == UNKNOWN_HEIGHT
    }
}

pub struct TracerModel {
    table: MigrationTable,
    time_bins: BinEdges,
    mode: MigrationMode,
}

impl TracerModel {
    pub fn new(table: MigrationTable, time_bins: BinEdges, mode: MigrationMode) -> Self {
        Self {
            table,
            time_bins,
            mode,
        }
    }

    pub fn table(&self) -> &MigrationTable {
        &self.table
    }

    pub fn time_bins(&self) -> &BinEdges {
        &self.time_bins
    }

    pub fn mode(&self) -> MigrationMode {
        self.mode
    }

    pub fn n_zones(&self) -> usize {
        self.table.n_radial_bins()
    }

    /// Draw a trajectory for a tracer formed in `zone` at `formation_time`.
    pub fn assign(
        &self,
        zone: Zone,
        formation_time: Gyr,
        rng: &mut TracerRng,
    ) -> MigrationResult<TracerTrajectory> {
        if zone >= self.n_zones() {
            return Err(MigrationError::ZoneOutOfRange {
                zone,
                n_zones: self.n_zones(),
            });
        }
        let tbin = self
            .time_bins
            .bin_number(formation_time)
            .ok_or(MigrationError::TimeOutOfRange {
                time: formation_time,
            })?;

        let outcome = self.draw(zone, tbin, rng);
        let final_position = outcome.final_bin as f64 + rng.next_f64();
        let origin_position = zone as f64 + rng.next_f64();

        Ok(TracerTrajectory {
            origin_zone: zone,
            formation_time,
            origin_position,
            final_position,
            final_height: outcome.final_height,
            end_time: self.time_bins.last(),
        })
    }

    fn draw(&self, zone: Zone, tbin: usize, rng: &mut TracerRng) -> Outcome {
        let cell = self.table.cell(zone, tbin);
        if self.mode == MigrationMode::All {
            return cell[rng.next_index(cell.len())];
        }

        let candidates: Vec<&Outcome> = cell
            .iter()
            .filter(|o| self.mode.admits(zone, o))
            .collect();
        if candidates.is_empty() {
            Outcome {
                final_bin: zone,
                final_height: UNKNOWN_HEIGHT,
            }
        } else {
            *candidates[rng.next_index(candidates.len())]
        }
    }
}
