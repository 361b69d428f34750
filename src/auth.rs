//! Credentials: bearer token resolution and the first-run setup wizard.
//!
//! A stored `auth_token` is used as is. Without one, an `email`/`password`
//! pair from the config file is exchanged for a token at startup. When no
//! config file exists at all the user may create one interactively; only
//! the resulting token is written, never the password.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use dialoguer::{Confirm, Input, Password};
use tracing::{info, warn};

use crate::api::http;
use crate::config::{self, ApiConfig, CredentialSource, Overrides, Settings};
use crate::error::AppError;

/// Everything the session needs from the credential store.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub bearer_token: String,
    pub prompt: String,
}

/// Turn loaded settings into credentials, logging in when needed.
pub async fn resolve(settings: &Settings) -> Result<Credentials, AppError> {
    let bearer_token = match settings.credential_source()? {
        CredentialSource::Token(token) => token,
        CredentialSource::Login { email, password } => {
            warn!(
                path = %settings.path.display(),
                "config stores a plaintext password; consider replacing it with auth_token"
            );
            let token = http::login(&settings.api, &email, &password).await?;
            info!("logged in with email/password");
            token
        }
    };
    Ok(Credentials { bearer_token, prompt: settings.prompt.clone() })
}

/// Offer to create a config file at `path`, then load it.
///
/// Declining is a configuration failure.
pub async fn first_run_setup(path: &Path, overrides: &Overrides) -> Result<Settings, AppError> {
    println!("Missing config file. Looked in:");
    for candidate in config::search_paths(None) {
        println!("  {}", candidate.display());
    }

    let create = Confirm::new()
        .with_prompt("Would you like to create a config now?")
        .interact()
        .map_err(prompt_error)?;
    if !create {
        println!("OK Quitting...");
        return Err(AppError::Config("no config file and setup was declined".into()));
    }

    let email: String = Input::new()
        .with_prompt("What is your email?")
        .interact_text()
        .map_err(prompt_error)?;
    let password = Password::new()
        .with_prompt("What is your password?")
        .interact()
        .map_err(prompt_error)?;

    let api = ApiConfig::from_overrides(overrides);
    let token = http::login(&api, email.trim(), &password).await?;

    write_new_config(path, &token, config::DEFAULT_PROMPT)?;
    println!("wrote to {}", path.display());

    config::load_from(path, overrides)
}

/// Write a token-only config, readable by the owner alone on unix.
pub fn write_new_config(path: &Path, auth_token: &str, prompt: &str) -> Result<(), AppError> {
    let text = config::render_new_config(auth_token, prompt)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Config(format!("cannot create {}: {e}", parent.display())))?;
    }
    fs::write(path, text)
        .map_err(|e| AppError::Config(format!("could not open {}: {e}", path.display())))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| {
            AppError::Config(format!("cannot set permissions on {}: {e}", path.display()))
        })?;
    }

    Ok(())
}

/// Ctrl-C at a prompt surfaces as an interrupted read, not a setup failure.
fn prompt_error(e: dialoguer::Error) -> AppError {
    match e {
        dialoguer::Error::IO(io) if io.kind() == ErrorKind::Interrupted => AppError::Interrupted,
        other => AppError::Config(format!("setup prompt failed: {other}")),
    }
}
