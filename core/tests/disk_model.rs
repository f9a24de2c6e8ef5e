//! Radial disk parametrisation tests.

use tracer_core::bins::BinEdges;
use tracer_core::disk_model::{
    depletion_time, eta, harmonic_timescale, tau_in, tau_star, DiskModel, DiskParams, Evolution,
    ExponentialDecay, History, HistoryShape, LinearExponential, LinearThenExponential,
    QUENCHED_TIMESCALE,
};
use tracer_core::error::MigrationError;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * b.abs().max(1.0)
}

fn research_disk(shape: HistoryShape) -> DiskModel {
    let params = DiskParams {
        history: shape,
        ..DiskParams::default()
    };
    DiskModel::new(params, BinEdges::linspace(0.0, 30.0, 121).unwrap()).unwrap()
}

#[test]
fn closed_form_relations() {
    assert!(close(tau_star(0.0, 2.0, 3.0), 2.0));
    assert!(close(tau_star(15.0, 2.0, 3.0), 2.0 * std::f64::consts::E));
    assert!(close(tau_in(1.5), 2.0));
    assert!(close(harmonic_timescale(2.0, 4.0), 4.0));
    assert!(close(depletion_time(2.0, 2.5, 0.4), 2.0 / 3.1));
    assert!(close(eta(4.0, 0.0, 2.0), 2.0 * 10f64.powf(-0.3) - 0.6));
    assert!(close(eta(4.0, 0.25, 2.0), 2.0 * 10f64.powf(-0.3) - 0.35));
}

#[test]
fn harmonic_timescale_with_zero_is_zero() {
    assert_eq!(harmonic_timescale(0.0, 3.0), 0.0);
    assert_eq!(harmonic_timescale(3.0, 0.0), 0.0);
}

#[test]
fn mass_loading_grows_with_radius() {
    let ratio = DiskParams::default().yield_ratio;
    let inner = eta(2.0, 0.0, ratio);
    let outer = eta(12.0, 0.0, ratio);
    assert!(outer > inner, "eta should increase outward: {inner} vs {outer}");
}

#[test]
fn profiles_evaluate_their_shapes() {
    let decay = ExponentialDecay::new(5.0, 2.0).unwrap();
    assert!(close(decay.at(0.0), 5.0));
    assert!(close(decay.at(2.0), 5.0 / std::f64::consts::E));

    let linexp = LinearExponential::new(3.0, 4.0).unwrap();
    assert_eq!(linexp.at(0.0), 0.0);
    assert!(close(linexp.at(4.0), 12.0 / std::f64::consts::E));

    let lte = LinearThenExponential::new(2.0, 3.0, 1.0).unwrap();
    assert!(close(lte.at(0.5), 1.0));
    assert!(close(lte.at(1.0), 2.0));
    assert!(close(lte.at(1.0 + 1e-9), 2.0), "Profile must be continuous at the switch");
    assert!(close(lte.at(4.0), 2.0 / std::f64::consts::E));
}

#[test]
fn profile_constructors_reject_bad_parameters() {
    assert!(matches!(
        ExponentialDecay::new(-1.0, 2.0),
        Err(MigrationError::InvalidParameter { name: "norm", .. })
    ));
    assert!(matches!(
        ExponentialDecay::new(1.0, f64::NAN),
        Err(MigrationError::InvalidParameter { name: "timescale", .. })
    ));
    assert!(matches!(
        LinearExponential::new(1.0, 0.0),
        Err(MigrationError::InvalidParameter { name: "timescale", .. })
    ));
    assert!(matches!(
        LinearThenExponential::new(1.0, 2.0, 0.0),
        Err(MigrationError::InvalidParameter { name: "switch", .. })
    ));
}

#[test]
fn disk_model_rejects_bad_params() {
    let params = DiskParams {
        scale_radius: 0.0,
        ..DiskParams::default()
    };
    let result = DiskModel::new(params, BinEdges::linspace(0.0, 30.0, 121).unwrap());
    assert!(matches!(
        result,
        Err(MigrationError::InvalidParameter { name: "scale_radius", .. })
    ));
}

#[test]
fn outer_zones_are_quenched() {
    let disk = research_disk(HistoryShape::LinearThenExponential);

    assert!(disk.is_star_forming(61));
    assert!(!disk.is_star_forming(62));

    let outer = disk.zone(62).unwrap();
    assert_eq!(outer.history, History::Quenched);
    assert_eq!(outer.tau_star, QUENCHED_TIMESCALE);
    assert_eq!(outer.eta, QUENCHED_TIMESCALE);
    assert_eq!(outer.history.at(5.0), 0.0);

    assert!(matches!(
        disk.zone(120),
        Err(MigrationError::ZoneOutOfRange { zone: 120, n_zones: 120 })
    ));
}

#[test]
fn star_forming_zones_use_midpoint_radius() {
    let disk = research_disk(HistoryShape::LinearThenExponential);
    let zone = disk.zone(10).unwrap();
    let params = disk.params();

    assert!(close(zone.radius, 2.625));
    assert!(close(zone.tau_star, tau_star(2.625, params.tau_star_norm, params.scale_radius)));
    assert!(close(
        zone.eta,
        eta(2.625, zone.tau_star / tau_in(2.625), params.yield_ratio)
    ));
    assert!(matches!(zone.history, History::LinearThenExponential(_)));
}

#[test]
fn every_history_shape_builds_positive_histories() {
    for shape in [
        HistoryShape::ExponentialInfall,
        HistoryShape::LinearExponential,
        HistoryShape::LinearThenExponential,
    ] {
        let disk = research_disk(shape);
        let zones = disk.zones().unwrap();
        assert_eq!(zones.len(), 120);
        for z in zones.iter().filter(|z| disk.is_star_forming(z.zone)) {
            let value = z.history.at(5.0);
            assert!(
                value.is_finite() && value > 0.0,
                "{shape:?} zone {} history {value} not positive",
                z.zone
            );
        }
    }
}

#[test]
fn infall_norm_matches_hand_computed_value() {
    let params = DiskParams::default();
    let (r, width) = (8.125, 0.25);

    let t_star = tau_star(r, params.tau_star_norm, params.scale_radius);
    let t_in = tau_in(r);
    let t_dep = depletion_time(t_star, eta(r, t_star / t_in, params.yield_ratio), params.recycling);
    let expected = params.infall_k * (r / width) * (-r / params.scale_radius).exp()
        / harmonic_timescale(t_in, t_dep)
        / ((-params.disk_age / t_dep).exp() - (-params.disk_age / t_in).exp());

    let got = params.infall_norm(r, width);
    assert!(close(got, expected), "infall_norm = {got}, expected {expected}");
    assert!(
        (got - 10.762778883183564).abs() < 1e-6,
        "infall_norm at 8.125 kpc drifted: {got}"
    );
}

#[test]
fn infall_norm_grows_with_the_constant() {
    let base = DiskParams::default();
    let doubled = DiskParams {
        infall_k: 2.0 * base.infall_k,
        ..base
    };
    assert!(close(doubled.infall_norm(5.0, 0.25), 2.0 * base.infall_norm(5.0, 0.25)));
}
