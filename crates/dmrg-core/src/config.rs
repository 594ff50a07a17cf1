use serde::Deserialize;
use std::path::PathBuf;

/// Lanczos tolerance knobs, nested under `[lancz_params]` in a `SweepParams`
/// TOML file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LanczosConfig {
    pub error: f64,
    pub max_iterations: usize,
}

impl Default for LanczosConfig {
    fn default() -> Self {
        Self {
            error: 1e-10,
            max_iterations: 50,
        }
    }
}

/// Sweep configuration, loadable from a TOML file and
/// overridable by CLI flags at the `bins/dmrg-run` boundary.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SweepParams {
    pub sweeps: usize,
    pub d_min: usize,
    pub d_max: usize,
    pub trunc_err: f64,
    pub lancz_params: LanczosConfig,
    pub mps_path: PathBuf,
    pub temp_path: PathBuf,
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            sweeps: 4,
            d_min: 1,
            d_max: 64,
            trunc_err: 1e-9,
            lancz_params: LanczosConfig::default(),
            mps_path: PathBuf::from("mps_path"),
            temp_path: PathBuf::from("temp_path"),
        }
    }
}

impl SweepParams {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
