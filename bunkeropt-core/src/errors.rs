use thiserror::Error;

/// Error type for invalid inputs and failed runs.
///
/// Candidate-level infeasibility is not represented here; see [`crate::candidate::Infeasible`].
#[derive(Error, Debug)]
pub enum BunkerError {
    #[error("{0}")]
    Error(String),
    #[error("Configuration validation failed:\n{}", .0.join("\n"))]
    InvalidParameters(Vec<String>),
    #[error("Unknown parameter path: {0}")]
    UnknownParameter(String),
    #[error("Parameter {path} is not numeric (found {found})")]
    NonNumericParameter { path: String, found: String },
    #[error("MCR interpolation needs at least two points, got {0}")]
    InsufficientMcrPoints(usize),
    #[error("No feasible solution found for {0}")]
    NoFeasibleSolution(String),
    #[error("Unknown distribution scenario: {0}")]
    UnknownScenario(String),
    #[error("Invalid variation set: {0}")]
    InvalidVariations(String),
    #[error("Failed to parse configuration: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("Failed to serialise configuration: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type for `Result<T, BunkerError>`.
pub type BunkerResult<T> = Result<T, BunkerError>;
