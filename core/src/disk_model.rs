//! Closed-form radial parametrisations of the disk: star formation and
//! infall histories, mass loading, and depletion timescales.
//!
//! These configure each zone of the run. Radii are in kpc, times in Gyr.

use serde::{Deserialize, Serialize};

use crate::{
    bins::BinEdges,
    error::{MigrationError, MigrationResult},
    types::{Gyr, Kpc, Zone},
};

/// Solar oxygen mass fraction.
pub const SOLAR_Z_OXYGEN: f64 = 0.00572;
/// IMF-averaged core-collapse oxygen yield.
pub const CCSN_YIELD_OXYGEN: f64 = 0.015;

/// tau_star and eta assigned to zones outside the star-forming disk.
pub const QUENCHED_TIMESCALE: f64 = 100.0;

/// Mass-loading factor at `rgal`.
///
/// `yield_ratio` is the core-collapse oxygen yield over the solar oxygen
/// abundance; `corrective` absorbs the tau_star / tau_sfh term.
pub fn eta(rgal: Kpc, corrective: f64, yield_ratio: f64) -> f64 {
    yield_ratio * 10f64.powf(0.06 * (rgal - 4.0) - 0.3) - 0.6 + corrective
}

/// Star formation efficiency timescale, `norm * exp(r / 5 r_s)`.
pub fn tau_star(rgal: Kpc, norm: Gyr, scale: Kpc) -> Gyr {
    norm * (rgal / (5.0 * scale)).exp()
}

/// Infall (and SFH) timescale, growing linearly with radius.
pub fn tau_in(rgal: Kpc) -> Gyr {
    1.0 + (rgal + 1e-12) / 1.5
}

/// `(1/t1 - 1/t2)^-1`, or 0 when either timescale is zero.
pub fn harmonic_timescale(t1: Gyr, t2: Gyr) -> Gyr {
    if t1 != 0.0 && t2 != 0.0 {
        1.0 / (1.0 / t1 - 1.0 / t2)
    } else {
        0.0
    }
}

/// Gas depletion timescale `tau_star / (1 + eta - r)`.
pub fn depletion_time(tau_star: Gyr, eta: f64, recycling: f64) -> Gyr {
    tau_star / (1.0 + eta - recycling)
}

fn check_positive(name: &'static str, value: f64) -> MigrationResult<f64> {
    if !value.is_finite() {
        return Err(MigrationError::InvalidParameter {
            name,
            value,
            reason: "must be a finite number",
        });
    }
    if value <= 0.0 {
        return Err(MigrationError::InvalidParameter {
            name,
            value,
            reason: "must be positive",
        });
    }
    Ok(value)
}

/// A quantity that evolves with time in one zone.
pub trait Evolution {
    fn at(&self, time: Gyr) -> f64;
}

/// `norm * exp(-t / timescale)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExponentialDecay {
    norm: f64,
    timescale: Gyr,
}

impl ExponentialDecay {
    pub fn new(norm: f64, timescale: Gyr) -> MigrationResult<Self> {
        Ok(Self {
            norm: check_positive("norm", norm)?,
            timescale: check_positive("timescale", timescale)?,
        })
    }

    pub fn norm(&self) -> f64 {
        self.norm
    }

    pub fn timescale(&self) -> Gyr {
        self.timescale
    }
}

impl Evolution for ExponentialDecay {
    fn at(&self, time: Gyr) -> f64 {
        self.norm * (-time / self.timescale).exp()
    }
}

/// `norm * t * exp(-t / timescale)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearExponential {
    norm: f64,
    timescale: Gyr,
}

impl LinearExponential {
    pub fn new(norm: f64, timescale: Gyr) -> MigrationResult<Self> {
        Ok(Self {
            norm: check_positive("norm", norm)?,
            timescale: check_positive("timescale", timescale)?,
        })
    }
}

impl Evolution for LinearExponential {
    fn at(&self, time: Gyr) -> f64 {
        self.norm * time * (-time / self.timescale).exp()
    }
}

/// Linear growth up to `switch`, exponential decay afterwards. Continuous
/// at the switch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearThenExponential {
    norm: f64,
    timescale: Gyr,
    switch: Gyr,
}

impl LinearThenExponential {
    pub fn new(norm: f64, timescale: Gyr, switch: Gyr) -> MigrationResult<Self> {
        Ok(Self {
            norm: check_positive("norm", norm)?,
            timescale: check_positive("timescale", timescale)?,
            switch: check_positive("switch", switch)?,
        })
    }

    pub fn switch(&self) -> Gyr {
        self.switch
    }
}

impl Evolution for LinearThenExponential {
    fn at(&self, time: Gyr) -> f64 {
        if time <= self.switch {
            self.norm * time
        } else {
            self.norm * self.switch * (-(time - self.switch) / self.timescale).exp()
        }
    }
}

/// Shape of the history driving each star-forming zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryShape {
    /// Exponentially declining infall normalised by `infall_norm`.
    ExponentialInfall,
    /// Linear-exponential SFH normalised by `sfr_norm`.
    LinearExponential,
    /// Linear rise then exponential decline, normalised by
    /// `lintexp_sfr_norm`.
    #[default]
    LinearThenExponential,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum History {
    Quenched,
    ExponentialInfall(ExponentialDecay),
    LinearExponential(LinearExponential),
    LinearThenExponential(LinearThenExponential),
}

impl Evolution for History {
    fn at(&self, time: Gyr) -> f64 {
        match self {
            History::Quenched                 => 0.0,
            History::ExponentialInfall(h)     => h.at(time),
            History::LinearExponential(h)     => h.at(time),
            History::LinearThenExponential(h) => h.at(time),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskParams {
    /// tau_star at r = 0.
    pub tau_star_norm: Gyr,
    pub scale_radius: Kpc,
    /// CCSN oxygen yield over solar oxygen abundance.
    pub yield_ratio: f64,
    pub recycling: f64,
    /// Age of the disk at the end of the run.
    pub disk_age: Gyr,
    /// Linear-to-exponential switch of the SFH.
    pub switch_time: Gyr,
    pub history: HistoryShape,
    /// Zones with index >= this are quenched.
    pub star_forming_zones: usize,
    pub infall_k: f64,
    pub sfr_k: f64,
    pub lintexp_k: f64,
}

impl Default for DiskParams {
    fn default() -> Self {
        Self {
            tau_star_norm:      0.2,
            scale_radius:       3.0,
            yield_ratio:        CCSN_YIELD_OXYGEN / SOLAR_Z_OXYGEN,
            recycling:          0.4,
            disk_age:           12.8,
            switch_time:        1.0,
            history:            HistoryShape::LinearThenExponential,
            star_forming_zones: 62,
            infall_k:           0.1,
            sfr_k:              100.0,
            lintexp_k:          1000.0,
        }
    }
}

impl DiskParams {
    /// Normalisation of the exponential infall history, chosen so the
    /// zone's stellar surface density follows the exponential disk.
    pub fn infall_norm(&self, rgal: Kpc, zone_width: Kpc) -> f64 {
        let t_star = tau_star(rgal, self.tau_star_norm, self.scale_radius);
        let t_in = tau_in(rgal);
        let t_dep = depletion_time(
            t_star,
            eta(rgal, t_star / t_in, self.yield_ratio),
            self.recycling,
        );
        let growth = (-self.disk_age / t_dep).exp() - (-self.disk_age / t_in).exp();
        self.infall_k * rgal / zone_width * (-rgal / self.scale_radius).exp()
            / harmonic_timescale(t_in, t_dep)
            / growth
    }

    /// Normalisation of the linear-exponential SFH.
    pub fn sfr_norm(&self, rgal: Kpc) -> f64 {
        let t_in = tau_in(rgal);
        let age = self.disk_age;
        self.sfr_k / (t_in * t_in) / (1.0 - (1.0 + age / t_in) * (-age / t_in).exp())
            * 2.0
            * std::f64::consts::PI
            * rgal
            * (-rgal / self.scale_radius).exp()
            * 0.25
    }

    /// Normalisation of the linear-then-exponential SFH.
    pub fn lintexp_sfr_norm(&self, rgal: Kpc) -> f64 {
        let t = self.disk_age;
        let t_in = tau_in(rgal);
        self.lintexp_k * rgal * (-rgal / self.scale_radius).exp()
            / t
            / (0.5 * t + t_in * (1.0 - (-(t - self.switch_time) / t_in).exp()))
    }
}

/// Per-zone parameters handed to the integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneParameters {
    pub zone: Zone,
    pub radius: Kpc,
    pub tau_star: Gyr,
    pub eta: f64,
    pub history: History,
}

/// Radial layout of the disk: one `ZoneParameters` per radial bin.
#[derive(Debug, Clone)]
pub struct DiskModel {
    params: DiskParams,
    rad_bins: BinEdges,
}

impl DiskModel {
    pub fn new(params: DiskParams, rad_bins: BinEdges) -> MigrationResult<Self> {
        check_positive("tau_star_norm", params.tau_star_norm)?;
        check_positive("scale_radius", params.scale_radius)?;
        check_positive("disk_age", params.disk_age)?;
        check_positive("switch_time", params.switch_time)?;
        Ok(Self { params, rad_bins })
    }

    pub fn params(&self) -> &DiskParams {
        &self.params
    }

    pub fn n_zones(&self) -> usize {
        self.rad_bins.n_bins()
    }

    pub fn is_star_forming(&self, zone: Zone) -> bool {
        zone < self.params.star_forming_zones
    }

    pub fn zone(&self, zone: Zone) -> MigrationResult<ZoneParameters> {
        if zone >= self.n_zones() {
            return Err(MigrationError::ZoneOutOfRange {
                zone,
                n_zones: self.n_zones(),
            });
        }
        let radius = self.rad_bins.center(zone);

        if !self.is_star_forming(zone) {
            return Ok(ZoneParameters {
                zone,
                radius,
                tau_star: QUENCHED_TIMESCALE,
                eta: QUENCHED_TIMESCALE,
                history: History::Quenched,
            });
        }

        let p = &self.params;
        let t_star = tau_star(radius, p.tau_star_norm, p.scale_radius);
        let t_in = tau_in(radius);
        let history = match p.history {
            HistoryShape::ExponentialInfall => History::ExponentialInfall(ExponentialDecay::new(
                p.infall_norm(radius, self.rad_bins.width(zone)),
                t_in,
            )?),
            HistoryShape::LinearExponential => {
                History::LinearExponential(LinearExponential::new(p.sfr_norm(radius), t_in)?)
            }
            HistoryShape::LinearThenExponential => History::LinearThenExponential(
                LinearThenExponential::new(p.lintexp_sfr_norm(radius), t_in, p.switch_time)?,
            ),
        };

        Ok(ZoneParameters {
            zone,
            radius,
            tau_star: t_star,
            eta: eta(radius, t_star / t_in, p.yield_ratio),
            history,
        })
    }

    /// Parameters for every zone, innermost first.
    pub fn zones(&self) -> MigrationResult<Vec<ZoneParameters>> {
        (0..self.n_zones()).map(|z| self.zone(z)).collect()
    }
}
