//! Particle catalog reader tests.

use std::io::Cursor;

use tracer_core::catalog::{ColumnMap, HydroCatalog};
use tracer_core::error::MigrationError;

const SAMPLE: &str = "\
# id tform rform x rfinal zfinal v_r v_phi v_z
0 0.5 2.5 0 7.5 1.2 10.0 220.0 5.0

1 3.2 8.1 0 6.0 -4.0 -3.0 210.0 12.0
2 9.9 4.0 0 4.0 0.2 1.0 200.0 -80.0
";

fn parse(text: &str) -> Result<HydroCatalog, MigrationError> {
    HydroCatalog::from_reader(Cursor::new(text), &ColumnMap::default())
}

#[test]
fn parses_rows_and_skips_comments_and_blanks() {
    let catalog = parse(SAMPLE).unwrap();
    assert_eq!(catalog.len(), 3);

    let first = catalog.records()[0];
    assert_eq!(first.formation_time, 0.5);
    assert_eq!(first.formation_radius, 2.5);
    assert_eq!(first.final_radius, 7.5);
    assert_eq!(first.final_height, 1.2);
    assert_eq!(first.v_phi, 220.0);
    assert_eq!(first.v_z, 5.0);
}

#[test]
fn custom_column_map_is_respected() {
    let columns = ColumnMap {
        formation_time: 0,
        formation_radius: 1,
        final_radius: 2,
        final_height: 3,
        v_r: 4,
        v_phi: 5,
        v_z: 6,
    };
    let catalog =
        HydroCatalog::from_reader(Cursor::new("1.0 2.0 3.0 0.1 0 0 0\n"), &columns).unwrap();
    let p = catalog.records()[0];
    assert_eq!((p.formation_time, p.formation_radius, p.final_radius), (1.0, 2.0, 3.0));
}

#[test]
fn short_row_is_an_error() {
    let err = parse("0 0.5 2.5 0 7.5\n").unwrap_err();
    assert!(
        matches!(err, MigrationError::MissingColumn { line: 1, column: 8, found: 5 }),
        "Unexpected error: {err}"
    );
}

#[test]
fn unparsable_field_reports_line_and_column() {
    let text = "# header\n0 0.5 abc 0 7.5 1.2 0 0 0\n";
    let err = parse(text).unwrap_err();
    assert!(
        matches!(err, MigrationError::Parse { line: 2, column: 2, .. }),
        "Unexpected error: {err}"
    );
}

#[test]
fn height_filter_keeps_thin_disk_particles() {
    let catalog = parse(SAMPLE).unwrap();
    let thin = catalog.height_filtered();

    // Particle 1 is too high above the plane, particle 2 too fast vertically.
    assert_eq!(thin.len(), 1);
    assert_eq!(thin.records()[0].formation_radius, 2.5);
    assert_eq!(catalog.len(), 3, "Filtering must not modify the source catalog");
}

#[test]
fn census_counts_migration_direction() {
    let census = parse(SAMPLE).unwrap().census();
    assert_eq!(census.outward, 1);
    assert_eq!(census.inward, 1);
    assert_eq!(census.same, 1);
    assert_eq!(census.total(), 3);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = HydroCatalog::load("/nonexistent/particles.dat", &ColumnMap::default()).unwrap_err();
    assert!(matches!(err, MigrationError::Io(_)), "Unexpected error: {err}");
}
