//! The empirical migration table.
//!
//! For every (origin radial bin, formation time bin) the table holds the
//! outcomes that catalog particles born there actually reached. It is built
//! once per run and never mutated afterwards, so it can be shared freely
//! between readers.

use serde::{Deserialize, Serialize};

use crate::{
    bins::BinEdges,
    catalog::HydroCatalog,
    types::{Kpc, Zone},
};

/// Height recorded for synthesised outcomes. Downstream analysis drops any
/// tracer carrying it.
pub const UNKNOWN_HEIGHT: Kpc = 100.0;

/// One empirical outcome: where a particle ended up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub final_bin: Zone,
    pub final_height: Kpc,
}

/// Which radius keys the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableOrientation {
    /// Key by formation radius, store the final radius bin.
    #[default]
    Forward,
    /// Key by final radius, store the formation radius bin. Tracers then
    /// retrace the catalog's migration backwards.
    Reverse,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub scanned: usize,
    pub kept: usize,
    /// Records whose time or either radius fell outside the bins.
    pub dropped: usize,
    /// Empty cells filled from a radial neighbour.
    pub borrowed: usize,
    /// Empty cells filled with a self-referential outcome.
    pub synthesized: usize,
}

#[derive(Debug, Clone)]
pub struct MigrationTable {
    /// cells[radial_bin][time_bin]
    cells: Vec<Vec<Vec<Outcome>>>,
    n_time_bins: usize,
    stats: BuildStats,
}

impl MigrationTable {
    pub fn build(
        catalog: &HydroCatalog,
        time_bins: &BinEdges,
        rad_bins: &BinEdges,
        orientation: TableOrientation,
    ) -> Self {
        let n_rad = rad_bins.n_bins();
        let n_time = time_bins.n_bins();
        let mut cells = vec![vec![Vec::new(); n_time]; n_rad];
        let mut stats = BuildStats::default();

        for p in catalog.iter() {
            stats.scanned += 1;
            let (key_radius, outcome_radius) = match orientation {
                TableOrientation::Forward => (p.formation_radius, p.final_radius),
                TableOrientation::Reverse => (p.final_radius, p.formation_radius),
            };

            let tbin = time_bins.bin_number(p.formation_time);
            let rbin = rad_bins.bin_number(key_radius);
            let final_bin = rad_bins.bin_number(outcome_radius);

            match (rbin, tbin, final_bin) {
                (Some(r), Some(t), Some(final_bin)) => {
                    cells[r][t].push(Outcome {
                        final_bin,
                        final_height: p.final_height,
                    });
                    stats.kept += 1;
                }
                _ => stats.dropped += 1,
            }
        }

        if stats.dropped > 0 {
            log::debug!(
                "Dropped {} of {} particles outside the time/radius bins",
                stats.dropped,
                stats.scanned
            );
        }

        let (cells, borrowed, synthesized) = repair(cells);
        stats.borrowed = borrowed;
        stats.synthesized = synthesized;

        log::info!(
            "Migration table: {n_rad}x{n_time} cells, kept={} dropped={} borrowed={} synthesized={}",
            stats.kept,
            stats.dropped,
            stats.borrowed,
            stats.synthesized
        );

        Self {
            cells,
            n_time_bins: n_time,
            stats,
        }
    }

    /// Outcomes for one cell. Never empty.
    pub fn cell(&self, radial_bin: Zone, time_bin: usize) -> &[Outcome] {
        &self.cells[radial_bin][time_bin]
    }

    pub fn n_radial_bins(&self) -> usize {
        self.cells.len()
    }

    pub fn n_time_bins(&self) -> usize {
        self.n_time_bins
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }
}

/// Fill every empty cell. A cell borrows the scanned outcomes of its radial
/// neighbour at the same time bin, trying the one below first and then the
/// one above. Cells with no populated neighbour point back at themselves
/// with `UNKNOWN_HEIGHT`.
fn repair(scanned: Vec<Vec<Vec<Outcome>>>) -> (Vec<Vec<Vec<Outcome>>>, usize, usize) {
    let mut repaired = scanned.clone();
    let mut borrowed = 0;
    let mut synthesized = 0;

    for (r, row) in repaired.iter_mut().enumerate() {
        for (t, cell) in row.iter_mut().enumerate() {
            if !cell.is_empty() {
                continue;
            }
            let below = r.checked_sub(1).map(|b| &scanned[b][t]);
            let above = scanned.get(r + 1).map(|row| &row[t]);
            match below.into_iter().chain(above).find(|c| !c.is_empty()) {
                Some(neighbour) => {
                    cell.extend_from_slice(neighbour);
                    borrowed += 1;
                }
                None => {
                    cell.push(Outcome {
                        final_bin: r,
                        final_height: UNKNOWN_HEIGHT,
                    });
                    synthesized += 1;
                }
            }
        }
    }

    (repaired, borrowed, synthesized)
}
