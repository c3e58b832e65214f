use std::path::Path;

use quarry_filter::FilterConfig;
use serde::{Deserialize, Serialize};

use crate::error::{RepoError, RepoResult};

/// Repository configuration, stored as TOML at [`RepoConfig::PATH`].
///
/// ```toml
/// [filters]
/// auto_crlf = "input"
///
/// [[filters.attributes]]
/// pattern = "*.sh"
/// eol = "lf"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    pub filters: FilterConfig,
}

impl RepoConfig {
    /// Location of the config file relative to the working directory.
    pub const PATH: &'static str = ".quarry/config.toml";

    /// Load `path`, or the default configuration if it does not exist.
    pub fn load(path: &Path) -> RepoResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(RepoError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&text).map_err(|e| RepoError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn to_toml_string(&self) -> RepoResult<String> {
        toml::to_string(self).map_err(|e| RepoError::Config {
            path: Self::PATH.into(),
            reason: e.to_string(),
        })
    }
}
