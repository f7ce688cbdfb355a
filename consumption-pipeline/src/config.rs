use serde::Deserialize;
use std::{fs, io, path::Path};

use crate::aggregate::UnitPolicy;
use crate::transform::RepairMode;

const DEFAULT_CONFIG_PATH: &str = "consumption-config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub repair_mode: RepairMode,
    /// Files larger than this get a heads-up before loading starts.
    pub large_file_bytes: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            repair_mode: RepairMode::ForwardFill,
            large_file_bytes: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    #[serde(flatten)]
    pub units: UnitPolicy,
    /// Display rounding only.
    pub decimals: usize,
    /// Views with more rows than this get a heads-up before rendering.
    pub large_view_rows: usize,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            units: UnitPolicy::default(),
            decimals: 3,
            large_view_rows: 300_000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub loader: LoaderConfig,
    pub presentation: PresentationConfig,
}

impl AppConfig {
    /// Reads `CONSUMPTION_CONFIG`, or `consumption-config.toml` when unset.
    /// Only the default file may be absent.
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        match env::var("CONSUMPTION_CONFIG") {
            Ok(path) => Self::from_file(path),
            Err(_) => match Self::from_file(DEFAULT_CONFIG_PATH) {
                Err(e) if is_not_found(&e) => Ok(Self::default()),
                other => other,
            },
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        Ok(cfg)
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}
