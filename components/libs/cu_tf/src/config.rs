use crate::error::{TransformError, TransformResult};
use cu29_clock::CuDuration;
use ron::extensions::Extensions;
use ron::Options;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How long samples are kept by default (10 s).
pub const DEFAULT_CACHE_TIME_NS: u64 = 10_000_000_000;

/// Settings of a [`crate::TransformBuffer`].
///
/// ```
/// use cu_tf::BufferConfig;
///
/// let config = BufferConfig::deserialize_ron("(cache_time_ns: 2000000000)").unwrap();
/// assert_eq!(config.cache_time_ns, 2_000_000_000);
/// assert_eq!(config.max_extrapolation_ns, 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Retention window applied to every frame's history.
    pub cache_time_ns: u64,
    /// How far past the newest sample a query may reach. Zero disables future extrapolation.
    pub max_extrapolation_ns: u64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            cache_time_ns: DEFAULT_CACHE_TIME_NS,
            max_extrapolation_ns: 0,
        }
    }
}

impl BufferConfig {
    pub fn new(cache_time_ns: u64) -> Self {
        Self {
            cache_time_ns,
            ..Self::default()
        }
    }

    pub fn with_max_extrapolation(mut self, max_extrapolation_ns: u64) -> Self {
        self.max_extrapolation_ns = max_extrapolation_ns;
        self
    }

    pub fn cache_time(&self) -> CuDuration {
        CuDuration(self.cache_time_ns)
    }

    pub fn max_extrapolation(&self) -> CuDuration {
        CuDuration(self.max_extrapolation_ns)
    }

    fn get_options() -> Options {
        Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .with_default_extension(Extensions::UNWRAP_NEWTYPES)
    }

    pub fn serialize_ron(&self) -> TransformResult<String> {
        let pretty = ron::ser::PrettyConfig::default();
        Self::get_options()
            .to_string_pretty(self, pretty)
            .map_err(|e| TransformError::Other(format!("cannot serialize buffer config: {e}")))
    }

    pub fn deserialize_ron(ron: &str) -> TransformResult<Self> {
        Self::get_options()
            .from_str(ron)
            .map_err(|e| TransformError::InvalidArgument(format!("syntax error in config: {e}")))
    }
}

/// Reads a buffer configuration from a RON file.
pub fn read_configuration(config_filename: impl AsRef<Path>) -> TransformResult<BufferConfig> {
    let path = config_filename.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        TransformError::Other(format!(
            "failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;
    BufferConfig::deserialize_ron(&content)
}
