//! Library error type.

use std::path::PathBuf;

/// Errors surfaced while setting the engine up. Answering a question never
/// fails; see [`crate::answer`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("chart directory {} is unusable: {source}", path.display())]
    ChartDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
