//! tracer-runner: headless driver for the tracer migration model.
//!
//! Usage:
//!   tracer-runner --catalog UWhydro_particles.dat --seed 12345
//!   tracer-runner --config run.json --diagnostics tracers.out --summary summary.json

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use tracer_core::{
    config::RunConfig,
    engine::{MigrationEngine, RunSummary},
    migration_table::TableOrientation,
    tracer::MigrationMode,
};

const VALUE_FLAGS: &[&str] = &[
    "--config",
    "--catalog",
    "--seed",
    "--steps",
    "--stars",
    "--mode",
    "--diagnostics",
    "--summary",
];
const SWITCH_FLAGS: &[&str] = &["--height-filter", "--reverse"];

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    warn_unknown_flags(&args);

    let mut config = match find_arg(&args, "--config") {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };

    if let Some(path) = find_arg(&args, "--catalog") {
        config.catalog = Some(PathBuf::from(path));
    }
    if let Some(path) = find_arg(&args, "--diagnostics") {
        config.diagnostics = Some(PathBuf::from(path));
    }
    if let Some(mode) = find_arg(&args, "--mode") {
        config.mode = mode.parse::<MigrationMode>()?;
    }
    config.seed = parse_arg(&args, "--seed", config.seed);
    config.n_steps = parse_arg(&args, "--steps", config.n_steps);
    config.stars_per_zone = parse_arg(&args, "--stars", config.stars_per_zone);
    if args.iter().any(|a| a == "--height-filter") {
        config.height_filter = true;
    }
    if args.iter().any(|a| a == "--reverse") {
        config.orientation = TableOrientation::Reverse;
    }
    config.validate()?;

    let summary_path = find_arg(&args, "--summary");

    println!("tracer-runner");
    println!("  seed:        {}", config.seed);
    println!("  steps:       {}", config.n_steps);
    println!("  stars/zone:  {}", config.stars_per_zone);
    println!("  mode:        {:?}", config.mode);
    println!("  orientation: {:?}", config.orientation);
    if let Some(catalog) = &config.catalog {
        println!("  catalog:     {}", catalog.display());
    }
    println!();

    let mut engine = MigrationEngine::from_config(config)?;
    engine.run()?;
    let rows = engine.finish()?;

    let summary = engine.summary();
    print_summary(&summary, rows);

    if let Some(path) = summary_path {
        std::fs::write(path, serde_json::to_string_pretty(&summary)?)?;
        println!("  summary written to {path}");
    }

    Ok(())
}

fn print_summary(summary: &RunSummary, diagnostic_rows: usize) {
    let stats = &summary.census;
    let total = stats.total().max(1) as f64;

    println!("=== RUN SUMMARY ===");
    println!("  tracers:         {}", summary.n_tracers);
    println!("  total mass:      {:.4e}", summary.total_mass);
    println!("  unknown height:  {}", summary.unknown_height);
    println!("  diagnostic rows: {diagnostic_rows}");
    println!(
        "  inward: {:.1}%  outward: {:.1}%  in situ: {:.1}%",
        100.0 * stats.inward as f64 / total,
        100.0 * stats.outward as f64 / total,
        100.0 * stats.same as f64 / total
    );

    println!();
    println!("=== BIRTH RADII BY FINAL ZONE (every 8th zone) ===");
    for zone in summary.zones.iter().step_by(8).filter(|z| z.n_tracers > 0) {
        let median = zone
            .median_birth_radius
            .map_or_else(|| "-".to_string(), |r| format!("{r:.2}"));
        let band = zone
            .birth_radius_dispersion
            .map_or_else(|| "-".to_string(), |(lo, hi)| format!("{lo:.2}-{hi:.2}"));
        println!(
            "  R={:5.2} kpc | mass: {:.3e} | median birth R: {median} | 16-84%: {band}",
            zone.radius, zone.final_mass
        );
    }
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn warn_unknown_flags(args: &[String]) {
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if !SWITCH_FLAGS.contains(&arg.as_str()) {
            log::warn!("Unknown argument: {arg}");
        }
    }
}
