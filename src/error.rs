//! Crate-wide error types.
//!
//! Per the core's error handling design, these only ever surface at
//! construction/IO boundaries (config loading, persistence). Hot paths
//! (chunk store lookups, lighting queries, mesh builds) are total functions
//! with documented fallback values and never return `Result`.

use thiserror::Error;

/// Failure loading or parsing a [`crate::config::RuntimeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Invalid generation config supplied at construction time.
///
/// Per spec, generation never fails per-call; a bad [`crate::generation::GenConfig`]
/// is only rejected when explicitly validated (e.g. by config loading), and
/// otherwise the resolved config silently falls back to defaults.
#[derive(Debug, Error)]
pub enum GenConfigError {
    #[error("sea_level {0} is outside the world height (0..{1})")]
    SeaLevelOutOfRange(i32, i32),

    #[error("octave count must be at least 1, got {0}")]
    ZeroOctaves(&'static str),
}

/// Failure from the [`crate::persistence::PersistenceAdapter`] reference
/// implementation. The scheduler logs these and keeps the chunk's
/// `modified` flag set rather than propagating the error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to write chunk ({0}, {1}): {2}")]
    Write(i32, i32, #[source] std::io::Error),

    #[error("failed to read chunk ({0}, {1}): {2}")]
    Read(i32, i32, #[source] std::io::Error),

    #[error("failed to encode chunk ({0}, {1}): {2}")]
    Encode(i32, i32, #[source] bincode::Error),

    #[error("failed to decode chunk ({0}, {1}): {2}")]
    Decode(i32, i32, #[source] bincode::Error),
}
