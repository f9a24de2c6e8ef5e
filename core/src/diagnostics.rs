//! Per-assignment diagnostic file.
//!
//! One tab-separated line per tracer formation event. The writer is a
//! single-writer resource owned by the run driver, and must be closed with
//! `finish` once the run completes; dropping it loses any error raised by
//! the final flush.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{error::MigrationResult, tracer::TracerTrajectory};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticLayout {
    #[default]
    WithHeight,
    ZoneOnly,
}

impl DiagnosticLayout {
    fn header(self) -> &'static str {
        match self {
            DiagnosticLayout::WithHeight => "# zone_origin\ttime_origin\tzone_final\tzfinal",
            DiagnosticLayout::ZoneOnly   => "# zone_origin\ttime_origin\tzone_final",
        }
    }
}

pub struct DiagnosticWriter<W: Write> {
    out: W,
    layout: DiagnosticLayout,
    rows: usize,
}

impl DiagnosticWriter<BufWriter<File>> {
    /// Create (truncating) the diagnostic file at `path`.
    pub fn create<P: AsRef<Path>>(path: P, layout: DiagnosticLayout) -> MigrationResult<Self> {
        let file = File::create(path.as_ref())?;
        log::debug!("Writing tracer diagnostics to {}", path.as_ref().display());
        Self::new(BufWriter::new(file), layout)
    }
}

impl<W: Write> DiagnosticWriter<W> {
    /// Wrap a writer and emit the header line.
    pub fn new(mut out: W, layout: DiagnosticLayout) -> MigrationResult<Self> {
        writeln!(out, "{}", layout.header())?;
        Ok(Self { out, layout, rows: 0 })
    }

    pub fn record(&mut self, trajectory: &TracerTrajectory) -> MigrationResult<()> {
        match self.layout {
            DiagnosticLayout::WithHeight => writeln!(
                self.out,
                "{}\t{:.3}\t{}\t{:.3}",
                trajectory.origin_zone,
                trajectory.formation_time,
                trajectory.final_zone(),
                trajectory.final_height
            )?,
            DiagnosticLayout::ZoneOnly => writeln!(
                self.out,
                "{}\t{:.3}\t{}",
                trajectory.origin_zone,
                trajectory.formation_time,
                trajectory.final_zone()
            )?,
        }
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and close. Returns the number of rows written.
    pub fn finish(self) -> MigrationResult<usize> {
        Ok(self.into_inner()?.1)
    }

    /// Flush and hand back the underlying writer with the row count.
    pub fn into_inner(mut self) -> MigrationResult<(W, usize)> {
        self.out.flush()?;
        Ok((self.out, self.rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trajectory() -> TracerTrajectory {
        TracerTrajectory {
            origin_zone: 2,
            formation_time: 0.5,
            origin_position: 2.31,
            final_position: 7.84,
            final_height: 1.2,
            end_time: 10.0,
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let mut writer = DiagnosticWriter::new(Vec::new(), DiagnosticLayout::WithHeight).unwrap();
        writer.record(&trajectory()).unwrap();
        let (bytes, rows) = writer.into_inner().unwrap();

        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(rows, 1);
        assert_eq!(
            text,
            "# zone_origin\ttime_origin\tzone_final\tzfinal\n2\t0.500\t7\t1.200\n"
        );
    }

    #[test]
    fn zone_only_layout_drops_height() {
        let mut writer = DiagnosticWriter::new(Vec::new(), DiagnosticLayout::ZoneOnly).unwrap();
        writer.record(&trajectory()).unwrap();
        let (bytes, _) = writer.into_inner().unwrap();

        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "# zone_origin\ttime_origin\tzone_final\n2\t0.500\t7\n");
    }
}
