//! # Settings
//!
//! Layered configuration, later layers overriding earlier ones:
//!
//! ```text
//! built-in defaults
//!   └── TOML file   (--config <path>, else ./ask360.toml if present)
//!         └── environment   ASK360_CHART_DIR, ASK360_SEED, ASK360_BIND_ADDR
//! ```
//!
//! | Key | Default |
//! |-----|---------|
//! | `chart_dir` | `<system temp>/ask360-charts` |
//! | `seed` | `42` |
//! | `bind_addr` | `0.0.0.0:3000` |

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use config::{builder::DefaultState, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

use crate::data::DEFAULT_SEED;
use crate::error::Error;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const ENV_PREFIX: &str = "ASK360";
const DEFAULT_FILE: &str = "ask360";

fn default_chart_dir() -> PathBuf {
    std::env::temp_dir().join("ask360-charts")
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Where rendered PNG charts are written.
    pub chart_dir: PathBuf,
    /// Dataset generator seed.
    pub seed: u64,
    /// HTTP listen address for `serve`.
    #[serde(deserialize_with = "deserialize_socket_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chart_dir: default_chart_dir(),
            seed: DEFAULT_SEED,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

impl Settings {
    /// Loads defaults, then `path` (required when given, otherwise the
    /// optional `ask360.toml` in the working directory), then `ASK360_*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let builder = ConfigBuilder::<DefaultState>::default()
            .set_default("chart_dir", default_chart_dir().to_string_lossy().into_owned())?
            .set_default("seed", DEFAULT_SEED as i64)?
            .set_default("bind_addr", DEFAULT_ADDR)?;

        let builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name(DEFAULT_FILE).required(false)),
        };

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;
        tracing::debug!(?settings, "settings loaded");
        Ok(settings)
    }

    /// Creates the chart directory if it does not exist yet.
    pub fn prepare_chart_dir(&self) -> Result<(), Error> {
        std::fs::create_dir_all(&self.chart_dir).map_err(|source| Error::ChartDir {
            path: self.chart_dir.clone(),
            source,
        })
    }
}

fn deserialize_socket_addr<'de, D>(deserializer: D) -> Result<SocketAddr, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}
