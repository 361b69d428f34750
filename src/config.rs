//! Settings file loading with env-var overrides.
//!
//! The config file is a small TOML document read once at startup:
//!
//! ```toml
//! auth_token = "..."        # or email + password for a login at startup
//! prompt = "> "
//!
//! [api]
//! base_url = "https://api.aidungeon.io"
//! timeout_seconds = 60      # optional, no timeout when absent
//!
//! [log]
//! level = "warn"
//! file = "~/.config/ai-dungeon-cli/client.log"
//! ```
//!
//! `AI_DUNGEON_AUTH_TOKEN`, `AI_DUNGEON_API_URL` and `AI_DUNGEON_LOG_LEVEL`
//! override the corresponding file values.

use std::{
    env,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const APP_DIR_NAME: &str = "ai-dungeon-cli";
pub const DEFAULT_PROMPT: &str = "> ";
pub const DEFAULT_API_BASE_URL: &str = "https://api.aidungeon.io";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Remote service settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Per-request timeout; `None` waits indefinitely.
    pub timeout_seconds: Option<u64>,
}

impl ApiConfig {
    /// Defaults plus env overrides, for use before any config file exists.
    pub fn from_overrides(overrides: &Overrides) -> Self {
        let base_url = non_empty(overrides.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        Self { base_url: base_url.trim_end_matches('/').to_string(), timeout_seconds: None }
    }
}

/// Logging settings.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    /// Log to this file instead of stderr (already expanded, no `~`).
    pub file: Option<PathBuf>,
}

/// How the client obtains its bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Token(String),
    Login { email: String, password: String },
}

/// Fully-resolved client settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// File the settings were read from.
    pub path: PathBuf,
    pub auth_token: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub prompt: String,
    pub api: ApiConfig,
    pub log: LogConfig,
}

impl Settings {
    /// Pick the credential source: a stored token wins, then an
    /// email/password pair. Neither is a configuration failure.
    pub fn credential_source(&self) -> Result<CredentialSource, AppError> {
        if let Some(token) = &self.auth_token {
            return Ok(CredentialSource::Token(token.clone()));
        }
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Ok(CredentialSource::Login {
                email: email.clone(),
                password: password.clone(),
            }),
            _ => Err(AppError::Config(format!(
                "{} has neither auth_token nor an email/password pair",
                self.path.display()
            ))),
        }
    }
}

/// Env-var overrides, gathered once by [`load`] and passed explicitly to
/// [`load_from`].
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub auth_token: Option<String>,
    pub api_base_url: Option<String>,
    pub log_level: Option<String>,
}

impl Overrides {
    pub fn from_env() -> Self {
        Self {
            auth_token: env::var("AI_DUNGEON_AUTH_TOKEN").ok(),
            api_base_url: env::var("AI_DUNGEON_API_URL").ok(),
            log_level: env::var("AI_DUNGEON_LOG_LEVEL").ok(),
        }
    }
}

/// Raw TOML shape. Also the shape written by the setup wizard.
#[derive(Debug, Default, Deserialize, Serialize)]
pub(crate) struct RawConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing)]
    api: RawApi,
    #[serde(default, skip_serializing)]
    log: RawLog,
}

#[derive(Debug, Default, Deserialize)]
struct RawApi {
    base_url: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLog {
    level: Option<String>,
    file: Option<String>,
}

/// Candidate config file locations, most specific first.
pub fn search_paths(explicit: Option<&str>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(p) = explicit {
        paths.push(expand_home(p));
        return paths;
    }
    if let Ok(p) = env::var("AI_DUNGEON_CONFIG") {
        paths.push(expand_home(&p));
    }
    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    if let Some(p) = user_config_path() {
        paths.push(p);
    }
    paths
}

/// `<user config dir>/ai-dungeon-cli/config.toml`, where the setup wizard
/// writes a fresh config.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load settings from the first existing file in `search_paths`.
///
/// Returns `Ok(None)` when no candidate file exists, so the caller can offer
/// the setup wizard.
pub fn load(explicit: Option<&str>) -> Result<Option<Settings>, AppError> {
    let paths = search_paths(explicit);
    let overrides = Overrides::from_env();

    if explicit.is_some() {
        // An explicit path that does not exist is an error, not a first run.
        return load_from(&paths[0], &overrides).map(Some);
    }

    match paths.iter().find(|p| p.is_file()) {
        Some(path) => load_from(path, &overrides).map(Some),
        None => Ok(None),
    }
}

/// Internal loader. Accepts an explicit path and overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(path: &Path, overrides: &Overrides) -> Result<Settings, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let auth_token = non_empty(overrides.auth_token.clone()).or(non_empty(parsed.auth_token));
    let base_url = non_empty(overrides.api_base_url.clone())
        .or(non_empty(parsed.api.base_url))
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let level = non_empty(overrides.log_level.clone())
        .or(non_empty(parsed.log.level))
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

    Ok(Settings {
        path: path.to_path_buf(),
        auth_token,
        email: non_empty(parsed.email),
        password: non_empty(parsed.password),
        prompt: non_empty(parsed.prompt).unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
        api: ApiConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_seconds: parsed.api.timeout_seconds,
        },
        log: LogConfig {
            level,
            file: non_empty(parsed.log.file).map(|f| expand_home(&f)),
        },
    })
}

/// Serialise a freshly obtained token for the setup wizard.
/// Only the token and prompt are written, never a password.
pub fn render_new_config(auth_token: &str, prompt: &str) -> Result<String, AppError> {
    let raw = RawConfig {
        auth_token: Some(auth_token.to_string()),
        prompt: Some(prompt.to_string()),
        ..RawConfig::default()
    };
    toml::to_string(&raw).map_err(|e| AppError::Config(format!("cannot serialise config: {e}")))
}

/// Empty strings count as absent. Whitespace-only values are kept.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

#[cfg(test)]
impl Settings {
    /// Token-authenticated settings pointing at an unroutable API.
    pub fn test_default() -> Self {
        Self {
            path: PathBuf::from("test-config.toml"),
            auth_token: Some("test-token".into()),
            email: None,
            password: None,
            prompt: DEFAULT_PROMPT.into(),
            api: ApiConfig { base_url: "http://localhost:0".into(), timeout_seconds: Some(1) },
            log: LogConfig { level: "warn".into(), file: None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn token_only_config_uses_defaults() {
        let f = write_toml("auth_token = \"abc\"\n");
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert_eq!(cfg.auth_token.as_deref(), Some("abc"));
        assert_eq!(cfg.prompt, "> ");
        assert_eq!(cfg.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.api.timeout_seconds, None);
        assert_eq!(cfg.log.level, "warn");
        assert!(cfg.log.file.is_none());
    }

    #[test]
    fn full_config_parses() {
        let f = write_toml(
            r#"
auth_token = "abc"
prompt = "$ "

[api]
base_url = "http://localhost:9000/"
timeout_seconds = 30

[log]
level = "debug"
file = "/tmp/dungeon.log"
"#,
        );
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert_eq!(cfg.prompt, "$ ");
        assert_eq!(cfg.api.base_url, "http://localhost:9000");
        assert_eq!(cfg.api.timeout_seconds, Some(30));
        assert_eq!(cfg.log.level, "debug");
        assert_eq!(cfg.log.file, Some(PathBuf::from("/tmp/dungeon.log")));
    }

    #[test]
    fn empty_strings_are_absent() {
        let f = write_toml("auth_token = \"\"\nprompt = \"\"\n");
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert!(cfg.auth_token.is_none());
        assert_eq!(cfg.prompt, DEFAULT_PROMPT);
    }

    #[test]
    fn whitespace_prompt_is_kept() {
        let f = write_toml("auth_token = \"abc\"\nprompt = \" \"\n");
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert_eq!(cfg.prompt, " ");
    }

    #[test]
    fn overrides_win_over_file() {
        let f = write_toml("auth_token = \"file\"\n[log]\nlevel = \"info\"\n");
        let overrides = Overrides {
            auth_token: Some("env".into()),
            api_base_url: Some("http://example.test".into()),
            log_level: Some("trace".into()),
        };
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert_eq!(cfg.auth_token.as_deref(), Some("env"));
        assert_eq!(cfg.api.base_url, "http://example.test");
        assert_eq!(cfg.log.level, "trace");
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/config.toml"), &Overrides::default());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    #[test]
    fn malformed_file_errors() {
        let f = write_toml("auth_token = [unterminated");
        let msg = load_from(f.path(), &Overrides::default()).unwrap_err().to_string();
        assert!(msg.contains("parse error"));
    }

    #[test]
    fn token_preferred_over_login() {
        let f = write_toml("auth_token = \"abc\"\nemail = \"a@b.c\"\npassword = \"pw\"\n");
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert_eq!(cfg.credential_source().unwrap(), CredentialSource::Token("abc".into()));
    }

    #[test]
    fn login_pair_used_without_token() {
        let f = write_toml("email = \"a@b.c\"\npassword = \"pw\"\n");
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert_eq!(
            cfg.credential_source().unwrap(),
            CredentialSource::Login { email: "a@b.c".into(), password: "pw".into() }
        );
    }

    #[test]
    fn no_credentials_is_config_error() {
        let f = write_toml("prompt = \"> \"\nemail = \"a@b.c\"\n");
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        let err = cfg.credential_source().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn rendered_config_never_contains_password() {
        let text = render_new_config("tok-123", "> ").unwrap();
        assert!(text.contains("auth_token = \"tok-123\""));
        assert!(text.contains("prompt = \"> \""));
        assert!(!text.contains("password"));
        assert!(!text.contains("email"));
    }

    #[test]
    fn explicit_path_is_the_only_candidate() {
        let paths = search_paths(Some("/etc/dungeon.toml"));
        assert_eq!(paths, vec![PathBuf::from("/etc/dungeon.toml")]);
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/.config/ai-dungeon-cli");
        assert!(expanded.starts_with(&home));
    }

    #[test]
    fn absolute_path_unchanged() {
        assert_eq!(expand_home("/absolute/path"), PathBuf::from("/absolute/path"));
    }
}
