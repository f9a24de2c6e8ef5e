use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cannot parse column {column} on line {line}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Line {line} has {found} columns, column {column} required")]
    MissingColumn {
        line: usize,
        column: usize,
        found: usize,
    },

    #[error("Invalid bin edges: {0}")]
    InvalidBins(String),

    #[error("Formation time {time} lies outside the time bins")]
    TimeOutOfRange { time: f64 },

    #[error("Zone {zone} out of range (n_zones = {n_zones})")]
    ZoneOutOfRange { zone: usize, n_zones: usize },

    #[error("Invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type MigrationResult<T> = Result<T, MigrationError>;
