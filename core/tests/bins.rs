//! Bin lookup and interpolation tests.

use tracer_core::bins::{bin_number, interpolate, BinEdges};
use tracer_core::error::MigrationError;

#[test]
fn value_inside_returns_its_bin() {
    let edges = [0.0, 1.0, 2.0, 3.0];
    assert_eq!(bin_number(&edges, 0.5), Some(0));
    assert_eq!(bin_number(&edges, 2.9), Some(2));
}

/// Bins are closed on both sides, so a shared edge belongs to the lower bin.
#[test]
fn shared_edge_resolves_to_lower_bin() {
    let edges = [0.0, 1.0, 2.0, 3.0];
    assert_eq!(bin_number(&edges, 1.0), Some(0));
    assert_eq!(bin_number(&edges, 2.0), Some(1));
    assert_eq!(bin_number(&edges, 0.0), Some(0));
    assert_eq!(bin_number(&edges, 3.0), Some(2), "Upper edge is inside the last bin");
}

#[test]
fn value_outside_has_no_bin() {
    let edges = [0.0, 1.0, 2.0];
    assert_eq!(bin_number(&edges, -0.001), None);
    assert_eq!(bin_number(&edges, 2.001), None);
    assert_eq!(bin_number(&edges, f64::NAN), None);
    assert_eq!(bin_number(&[1.0], 1.0), None, "A single edge has no bins");
}

#[test]
fn linspace_matches_research_grid() {
    let radial = BinEdges::linspace(0.0, 30.0, 121).unwrap();
    assert_eq!(radial.n_bins(), 120);
    assert_eq!(radial.first(), 0.0);
    assert_eq!(radial.last(), 30.0);
    assert!((radial.width(17) - 0.25).abs() < 1e-12);
    assert!((radial.center(0) - 0.125).abs() < 1e-12);

    let time = BinEdges::linspace(0.0, 12.8, 41).unwrap();
    assert_eq!(time.n_bins(), 40);
    assert_eq!(time.last(), 12.8);
    assert_eq!(time.bin_number(12.8), Some(39));
    assert_eq!(time.centers().len(), 40);
}

#[test]
fn unsorted_or_short_edges_are_rejected() {
    assert!(matches!(
        BinEdges::new(vec![0.0, 2.0, 1.0]),
        Err(MigrationError::InvalidBins(_))
    ));
    assert!(matches!(BinEdges::new(vec![0.0]), Err(MigrationError::InvalidBins(_))));
    assert!(matches!(
        BinEdges::new(vec![0.0, f64::INFINITY]),
        Err(MigrationError::InvalidBins(_))
    ));
    assert!(BinEdges::linspace(0.0, 1.0, 1).is_err());
}

/// Zero-width bins would divide by zero in density histograms.
#[test]
fn repeated_edges_are_rejected() {
    assert!(matches!(
        BinEdges::new(vec![0.0, 1.0, 1.0, 2.0]),
        Err(MigrationError::InvalidBins(_))
    ));
    assert!(matches!(
        BinEdges::linspace(3.0, 3.0, 4),
        Err(MigrationError::InvalidBins(_))
    ));
    assert!(serde_json::from_str::<BinEdges>("[0.0, 0.0]").is_err());
}

#[test]
fn bin_edges_deserialize_with_validation() {
    let ok: BinEdges = serde_json::from_str("[0.0, 0.5, 1.0]").unwrap();
    assert_eq!(ok.n_bins(), 2);

    let bad: Result<BinEdges, _> = serde_json::from_str("[1.0, 0.0]");
    assert!(bad.is_err(), "Unsorted edges must not deserialize");
}

#[test]
fn interpolate_follows_the_line() {
    assert_eq!(interpolate(0.0, 10.0, 0.0, 5.0, 4.0), 2.0);
    // Extrapolates beyond the second point.
    assert_eq!(interpolate(0.0, 10.0, 0.0, 5.0, 20.0), 10.0);
}

#[test]
fn interpolate_with_equal_x_returns_y2() {
    let y = interpolate(3.0, 3.0, 1.0, 7.5, 4.0);
    assert_eq!(y, 7.5);
    assert!(y.is_finite());
}
