//! Startup configuration: RON file, then environment, then command line.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clarifi_core::{ClassifierRules, DEFAULT_REJECTION_MARKER};
use clarifi_engine::EndpointConfig;
use engine_logging::LogDestination;
use log::LevelFilter;
use serde::Deserialize;

use crate::cli::Args;

const DEFAULT_CONFIG_FILE: &str = "clarifi.ron";
const DEFAULT_LOG_FILE: &str = "clarifi.log";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("missing {0}; set it in the config file, the environment or on the command line")]
    Missing(&'static str),
}

/// Shape of `clarifi.ron`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    pub analysis_url: Option<String>,
    pub question_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub rejection_marker: Option<String>,
    pub user: Option<String>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub endpoints: EndpointConfig,
    pub rules: ClassifierRules,
    pub user: Option<String>,
    pub log_destination: LogDestination,
    pub log_level: LevelFilter,
    pub log_path: PathBuf,
}

impl AppConfig {
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => read_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    read_file(default)?
                } else {
                    FileConfig::default()
                }
            }
        };
        Self::resolve(file, |key| std::env::var(key).ok(), args)
    }

    /// Later sources win: file, then `CLARIFI_*` variables, then flags.
    pub fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
        args: &Args,
    ) -> Result<Self, ConfigError> {
        let analysis_url = args
            .analysis_url
            .clone()
            .or_else(|| env("CLARIFI_ANALYSIS_URL"))
            .or(file.analysis_url)
            .ok_or(ConfigError::Missing("analysis endpoint URL"))?;
        let question_url = args
            .question_url
            .clone()
            .or_else(|| env("CLARIFI_QUESTION_URL"))
            .or(file.question_url)
            .ok_or(ConfigError::Missing("question endpoint URL"))?;

        let mut endpoints = EndpointConfig::new(analysis_url, question_url);
        if let Some(secs) = file.connect_timeout_secs {
            endpoints.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.request_timeout_secs {
            endpoints.request_timeout = Duration::from_secs(secs);
        }

        let rules = ClassifierRules {
            rejection_marker: file
                .rejection_marker
                .unwrap_or_else(|| DEFAULT_REJECTION_MARKER.to_string()),
        };
        let user = args
            .user
            .clone()
            .or_else(|| env("CLARIFI_USER"))
            .or(file.user);

        Ok(Self {
            endpoints,
            rules,
            user,
            log_destination: args.log.map(LogDestination::from).unwrap_or_default(),
            log_level: if args.verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
            log_path: file
                .log_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        })
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&text).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}
