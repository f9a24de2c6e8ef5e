//! Hydrodynamical star-particle catalog.
//!
//! The catalog is a whitespace-delimited numeric table, one particle per
//! row. Column offsets are a fixed contract with the upstream producer and
//! are not self-describing; `ColumnMap` carries them.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{MigrationError, MigrationResult},
    types::{Gyr, Kpc},
};

/// Thin-disk cut applied by `HydroCatalog::height_filtered`.
pub const MAX_ABS_FINAL_HEIGHT: Kpc = 3.0;
/// Vertical velocity cut (km/s) applied by `HydroCatalog::height_filtered`.
pub const MAX_ABS_VZ: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    pub formation_time: Gyr,
    pub formation_radius: Kpc,
    pub final_radius: Kpc,
    pub final_height: Kpc,
    pub v_r: f64,
    pub v_phi: f64,
    pub v_z: f64,
}

/// Zero-based column offsets of each field in the catalog file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub formation_time: usize,
    pub formation_radius: usize,
    pub final_radius: usize,
    pub final_height: usize,
    pub v_r: usize,
    pub v_phi: usize,
    pub v_z: usize,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            formation_time:   1,
            formation_radius: 2,
            final_radius:     4,
            final_height:     5,
            v_r:              6,
            v_phi:            7,
            v_z:              8,
        }
    }
}

impl ColumnMap {
    fn widest(&self) -> usize {
        [
            self.formation_time,
            self.formation_radius,
            self.final_radius,
            self.final_height,
            self.v_r,
            self.v_phi,
            self.v_z,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Counts of particles by the sign of their radial migration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationCensus {
    pub inward: usize,
    pub outward: usize,
    pub same: usize,
}

impl MigrationCensus {
    pub fn total(&self) -> usize {
        self.inward + self.outward + self.same
    }

    /// Tally one origin/final pair.
    pub fn tally(&mut self, origin: f64, last: f64) {
        if origin > last {
            self.inward += 1;
        } else if origin < last {
            self.outward += 1;
        } else {
            self.same += 1;
        }
    }
}

/// The immutable particle set for one run.
#[derive(Debug, Clone, Default)]
pub struct HydroCatalog {
    records: Vec<ParticleRecord>,
}

impl HydroCatalog {
    pub fn new(records: Vec<ParticleRecord>) -> Self {
        Self { records }
    }

    /// Read a catalog file from disk.
    pub fn load<P: AsRef<Path>>(path: P, columns: &ColumnMap) -> MigrationResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let catalog = Self::from_reader(BufReader::new(file), columns)?;
        log::info!(
            "Loaded {} star particles from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse a catalog from any buffered reader. Blank lines and lines
    /// starting with `#` are skipped.
    pub fn from_reader<R: BufRead>(reader: R, columns: &ColumnMap) -> MigrationResult<Self> {
        let required = columns.widest() + 1;
        let mut records = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields.len() < required {
                return Err(MigrationError::MissingColumn {
                    line: line_no,
                    column: required - 1,
                    found: fields.len(),
                });
            }

            let field = |column: usize| -> MigrationResult<f64> {
                fields[column]
                    .parse::<f64>()
                    .map_err(|e| MigrationError::Parse {
                        line: line_no,
                        column,
                        message: format!("'{}': {e}", fields[column]),
                    })
            };

            records.push(ParticleRecord {
                formation_time:   field(columns.formation_time)?,
                formation_radius: field(columns.formation_radius)?,
                final_radius:     field(columns.final_radius)?,
                final_height:     field(columns.final_height)?,
                v_r:              field(columns.v_r)?,
                v_phi:            field(columns.v_phi)?,
                v_z:              field(columns.v_z)?,
            });
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ParticleRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticleRecord> {
        self.records.iter()
    }

    /// The thin-disk subsample: particles that end near the midplane with
    /// a small vertical velocity.
    pub fn height_filtered(&self) -> Self {
        let records: Vec<_> = self
            .records
            .iter()
            .filter(|p| p.final_height.abs() <= MAX_ABS_FINAL_HEIGHT && p.v_z.abs() <= MAX_ABS_VZ)
            .copied()
            .collect();
        log::debug!(
            "Height filter kept {} of {} particles",
            records.len(),
            self.records.len()
        );
        Self { records }
    }

    /// Inward / outward / stationary counts over the whole catalog.
    pub fn census(&self) -> MigrationCensus {
        let mut census = MigrationCensus::default();
        for p in &self.records {
            census.tally(p.formation_radius, p.final_radius);
        }
        census
    }
}
