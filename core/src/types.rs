//! Shared primitive types used across the entire model.

/// Simulation time in Gyr.
pub type Gyr = f64;

/// Galactocentric radius (or height above the plane) in kpc.
pub type Kpc = f64;

/// A radial zone index. Zone `i` spans radial bin `i`.
pub type Zone = usize;

/// One output step of the run driver.
pub type Step = u64;
