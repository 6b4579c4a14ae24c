//! Configuration module for environment variable parsing.
//!
//! All settings are read once at startup into an immutable [`Config`] that is
//! shared by the webhook handlers and the build trigger.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;
use url::Url;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} does not exist")]
    MissingVar(&'static str),

    #[error("unsupported tool type: {0}, supports hugo and mdbook")]
    UnsupportedTool(String),

    #[error("input repository url error: {0}")]
    InvalidRepoUrl(String),

    #[error("invalid value for {var}: {value}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("cannot resolve current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// Static-site generators the service knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolType {
    Hugo,
    Mdbook,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::Hugo => "hugo",
            ToolType::Mdbook => "mdbook",
        }
    }
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hugo" => Ok(ToolType::Hugo),
            "mdbook" => Ok(ToolType::Mdbook),
            other => Err(ConfigError::UnsupportedTool(other.to_string())),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Clone URL of the documentation repository
    pub git_url: String,

    /// Repository name derived from the clone URL; also the checkout directory name
    pub repo_name: String,

    /// Generator used to render the documentation
    pub tool_type: ToolType,

    /// Shared webhook secret. `None` means open (unsigned) mode.
    pub secret_key: Option<String>,

    /// Directory that holds the checkout. Always absolute.
    pub work_dir: PathBuf,

    /// Directory the generator writes into. Always absolute.
    pub output_dir: PathBuf,

    /// Address the web server binds to
    pub host: String,

    /// Port for the web server to listen on
    pub port: u16,

    /// Upper bound for every external command
    pub command_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let git_url = required(&lookup, "GIT_URL")?;
        let tool_type: ToolType = required(&lookup, "TOOL_TYPE")?.parse()?;
        let repo_name = repo_name_from_url(&git_url)
            .ok_or_else(|| ConfigError::InvalidRepoUrl(git_url.clone()))?;

        let secret_key = lookup("SECRET_KEY").filter(|s| !s.is_empty());

        // Generators resolve relative paths against their own working
        // directory, so everything is made absolute here.
        let cwd = env::current_dir().map_err(ConfigError::CurrentDir)?;
        let work_dir = match lookup("WORK_DIR").filter(|s| !s.is_empty()) {
            Some(dir) => cwd.join(dir),
            None => cwd.clone(),
        };

        let output_dir = resolve_output_dir(lookup("OUTPUT"), &cwd, &work_dir, &repo_name);

        let host = lookup("HOST")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "127.0.0.1".to_string());

        let port = parse_number(&lookup, "PORT", 5001)?;
        let timeout_secs: u64 = parse_number(&lookup, "COMMAND_TIMEOUT_SECS", 60)?;

        Ok(Config {
            git_url,
            repo_name,
            tool_type,
            secret_key,
            work_dir,
            output_dir,
            host,
            port,
            command_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Path of the local checkout.
    pub fn repo_dir(&self) -> PathBuf {
        self.work_dir.join(&self.repo_name)
    }

    /// Whether webhook requests must carry a signature or token.
    pub fn secret_configured(&self) -> bool {
        self.secret_key.is_some()
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

fn parse_number<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            var: name,
            value: raw,
        }),
    }
}

/// `OUTPUT` is honoured only when it names an existing directory. A relative
/// `OUTPUT` is taken from `cwd`.
fn resolve_output_dir(
    output: Option<String>,
    cwd: &Path,
    work_dir: &Path,
    repo_name: &str,
) -> PathBuf {
    if let Some(raw) = output.filter(|s| !s.is_empty()) {
        let candidate = cwd.join(&raw);
        if candidate.is_dir() {
            return candidate;
        }
        warn!(output = %raw, "output_dir_not_a_directory");
    }
    work_dir.join(format!("{}-output", repo_name))
}

/// Take the last path segment of a clone URL, minus any extension.
///
/// `https://github.com/microsoft/DiskANN.git` yields `DiskANN`. scp-style
/// addresses such as `git@github.com:owner/repo.git` are accepted too.
pub fn repo_name_from_url(url: &str) -> Option<String> {
    let path = match Url::parse(url) {
        Ok(parsed) if parsed.has_host() || parsed.scheme() == "file" => parsed.path().to_string(),
        _ => match url.split_once(':') {
            Some((_, rest)) => rest.to_string(),
            None => url.to_string(),
        },
    };

    let last = path.trim_end_matches('/').rsplit('/').next()?;
    let stem = Path::new(last).file_stem()?.to_str()?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_repo_name_from_https_url() {
        assert_eq!(
            repo_name_from_url("https://github.com/microsoft/DiskANN.git").as_deref(),
            Some("DiskANN")
        );
        assert_eq!(
            repo_name_from_url("https://gitee.com/owner/docs").as_deref(),
            Some("docs")
        );
    }

    #[test]
    fn test_repo_name_from_scp_url() {
        assert_eq!(
            repo_name_from_url("git@github.com:owner/handbook.git").as_deref(),
            Some("handbook")
        );
    }

    #[test]
    fn test_repo_name_from_url_without_path() {
        assert_eq!(repo_name_from_url("https://github.com"), None);
        assert_eq!(repo_name_from_url("https://github.com/"), None);
    }

    #[test]
    fn test_tool_type_parse() {
        assert_eq!("hugo".parse::<ToolType>().unwrap(), ToolType::Hugo);
        assert_eq!("mdbook".parse::<ToolType>().unwrap(), ToolType::Mdbook);
        assert!(matches!(
            "jekyll".parse::<ToolType>(),
            Err(ConfigError::UnsupportedTool(t)) if t == "jekyll"
        ));
    }

    #[test]
    fn test_from_lookup_minimal() {
        let config = Config::from_lookup(lookup_from(&[
            ("GIT_URL", "https://github.com/acme/demo.git"),
            ("TOOL_TYPE", "mdbook"),
        ]))
        .unwrap();

        assert_eq!(config.repo_name, "demo");
        assert_eq!(config.tool_type, ToolType::Mdbook);
        assert!(config.secret_key.is_none());
        assert!(!config.secret_configured());
        assert_eq!(config.port, 5001);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.command_timeout, Duration::from_secs(60));

        let cwd = env::current_dir().unwrap();
        assert_eq!(config.work_dir, cwd);
        assert_eq!(config.repo_dir(), cwd.join("demo"));
        assert_eq!(config.output_dir, cwd.join("demo-output"));
    }

    #[test]
    fn test_relative_paths_become_absolute() {
        let cwd = env::current_dir().unwrap();
        let config = Config::from_lookup(lookup_from(&[
            ("GIT_URL", "https://github.com/acme/demo.git"),
            ("TOOL_TYPE", "hugo"),
            ("WORK_DIR", "sites"),
            ("OUTPUT", "."),
        ]))
        .unwrap();

        assert!(config.work_dir.is_absolute());
        assert!(config.repo_dir().is_absolute());
        assert!(config.output_dir.is_absolute());
        assert_eq!(config.repo_dir(), cwd.join("sites").join("demo"));
        assert_eq!(config.output_dir, cwd.join("."));
    }

    #[test]
    fn test_from_lookup_empty_secret_is_open_mode() {
        let config = Config::from_lookup(lookup_from(&[
            ("GIT_URL", "https://github.com/acme/demo.git"),
            ("TOOL_TYPE", "hugo"),
            ("SECRET_KEY", ""),
        ]))
        .unwrap();

        assert!(!config.secret_configured());
    }

    #[test]
    fn test_from_lookup_missing_required() {
        let err = Config::from_lookup(lookup_from(&[("TOOL_TYPE", "hugo")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("GIT_URL")));

        let err = Config::from_lookup(lookup_from(&[(
            "GIT_URL",
            "https://github.com/acme/demo.git",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("TOOL_TYPE")));
    }

    #[test]
    fn test_from_lookup_invalid_port() {
        let err = Config::from_lookup(lookup_from(&[
            ("GIT_URL", "https://github.com/acme/demo.git"),
            ("TOOL_TYPE", "hugo"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { var: "PORT", .. }));
    }

    #[test]
    fn test_output_override_requires_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().to_string_lossy().to_string();

        let config = Config::from_lookup(lookup_from(&[
            ("GIT_URL", "https://github.com/acme/demo.git"),
            ("TOOL_TYPE", "hugo"),
            ("OUTPUT", existing.as_str()),
            ("WORK_DIR", "/srv/docs"),
        ]))
        .unwrap();
        assert_eq!(config.output_dir, dir.path());

        let config = Config::from_lookup(lookup_from(&[
            ("GIT_URL", "https://github.com/acme/demo.git"),
            ("TOOL_TYPE", "hugo"),
            ("OUTPUT", "/definitely/not/here"),
            ("WORK_DIR", "/srv/docs"),
        ]))
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/srv/docs/demo-output"));
    }
}
