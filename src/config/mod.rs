use crate::error::{Result, RoutingError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Prefix of every environment variable read by [`RoutingConfig::from_env`].
pub const ENV_PREFIX: &str = "PAGEROUTE_";

/// How deep the template directory of a controller is scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ScanDepth {
    /// Only files directly inside the directory.
    #[default]
    TopLevel,
    /// Every file below the directory; subdirectories become route segments.
    Recursive,
}

/// Conventions used while synthesizing template routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Project template root used by controllers without a bundle.
    pub template_root: PathBuf,
    /// Suffix identifying template files, including the leading dot.
    pub template_extension: String,
    /// Base name that collapses onto its directory path.
    pub index_token: String,
    /// First namespace segment a page controller must live under.
    pub root_segment: String,
    /// Module name after which controller namespace segments start.
    pub controller_namespace: String,
    pub scan_depth: ScanDepth,
    /// Worker threads for the synthesis pass; `1` keeps it serial.
    pub parallelism: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            template_root: PathBuf::from("templates"),
            template_extension: ".html".to_string(),
            index_token: "index".to_string(),
            root_segment: "pages".to_string(),
            controller_namespace: "controller".to_string(),
            scan_depth: ScanDepth::TopLevel,
            parallelism: 1,
        }
    }
}

impl RoutingConfig {
    /// Defaults overlaid with `PAGEROUTE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each `PAGEROUTE_*` key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let mut config = Self::default();

        if let Some(root) = get("TEMPLATE_ROOT") {
            config.template_root = PathBuf::from(root);
        }
        if let Some(extension) = get("TEMPLATE_EXTENSION") {
            config.template_extension = extension;
        }
        if let Some(token) = get("INDEX_TOKEN") {
            config.index_token = token;
        }
        if let Some(segment) = get("ROOT_SEGMENT") {
            config.root_segment = segment;
        }
        if let Some(namespace) = get("CONTROLLER_NAMESPACE") {
            config.controller_namespace = namespace;
        }
        if let Some(depth) = get("SCAN_DEPTH") {
            config.scan_depth =
                ScanDepth::from_str(depth.trim()).map_err(|_| RoutingError::InvalidConfig {
                    message: format!("unknown scan depth `{depth}`"),
                })?;
        }
        if let Some(parallelism) = get("PARALLELISM") {
            config.parallelism = parse_parallelism(&parallelism)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// The template extension with a guaranteed leading dot.
    pub fn extension(&self) -> String {
        if self.template_extension.starts_with('.') {
            self.template_extension.clone()
        } else {
            format!(".{}", self.template_extension)
        }
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("template_extension", self.template_extension.trim_start_matches('.')),
            ("index_token", self.index_token.as_str()),
            ("root_segment", self.root_segment.as_str()),
            ("controller_namespace", self.controller_namespace.as_str()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(RoutingError::InvalidConfig {
                message: format!("`{field}` must not be empty"),
            });
        }
        if self.parallelism == 0 {
            return Err(RoutingError::InvalidConfig {
                message: "`parallelism` must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_parallelism(raw: &str) -> Result<usize> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("auto") {
        return Ok(num_cpus::get());
    }
    raw.parse::<usize>().map_err(|_| RoutingError::InvalidConfig {
        message: format!("invalid parallelism `{raw}`"),
    })
}
