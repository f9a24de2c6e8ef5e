//! Tracer-particle radial migration model.
//!
//! Star particles from a hydrodynamical disk simulation are binned by
//! formation time and radius into an empirical `MigrationTable`. Tracers
//! formed by a multizone chemical-evolution run then draw their final
//! radius from that table and move linearly between the two.

pub mod bins;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod disk_model;
pub mod engine;
pub mod error;
pub mod migration_table;
pub mod rng;
pub mod stats;
pub mod tracer;
pub mod types;
