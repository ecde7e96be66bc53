use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry processing.
///
/// These cover programmer errors (malformed parameters, lookups that must
/// succeed). Degenerate user input never errors; it yields empty results.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Point not on advancing front: ({0}, {1})")]
    PointNotOnFront(f64, f64),

    #[error("Topology error: {0}")]
    Topology(#[from] deco_cad_topology::Error),
}
