//! ai-dungeon: interactive story client entry point.
//!
//! Startup sequence (the whole of it raced against Ctrl-C):
//!   1. Load .env (if present)
//!   2. Parse CLI flags
//!   3. Load config (first-run setup wizard when no file exists)
//!   4. Init logger (CLI `-v` flags > `RUST_LOG` > config)
//!   5. Resolve credentials (login when no token is stored)
//!   6. Splash screen
//!   7. Play until `/quit`
//!   8. Map the outcome to a farewell and exit code

use ai_dungeon_cli::api::StoryBackend;
use ai_dungeon_cli::api::http::HttpBackend;
use ai_dungeon_cli::console::StdConsole;
use ai_dungeon_cli::error::AppError;
use ai_dungeon_cli::{auth, config, format, game, logger, splash};
use tracing::{info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // The interrupt branch is polled first so the handler is installed
    // before the setup wizard blocks on the terminal.
    let outcome = tokio::select! {
        biased;
        err = interrupted() => Err(err),
        result = run() => result,
    };

    let code = match outcome {
        Ok(()) => {
            println!("Bye Bye!");
            0
        }
        Err(e) if e.is_clean_exit() => {
            if matches!(e, AppError::Interrupted) {
                println!();
            }
            println!("{}", e.farewell());
            e.exit_code()
        }
        Err(e) => {
            eprintln!("{}", e.farewell());
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<(), AppError> {
    // .env is optional.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();
    let overrides = config::Overrides::from_env();

    let settings = match config::load(args.config_path.as_deref())? {
        Some(settings) => settings,
        None => {
            let path = config::user_config_path().ok_or_else(|| {
                AppError::Config("cannot determine the user config directory".into())
            })?;
            auth::first_run_setup(&path, &overrides).await?
        }
    };

    let effective_log_level = args.log_level.unwrap_or(settings.log.level.as_str());
    logger::init(effective_log_level, args.log_level.is_some(), settings.log.file.as_deref())?;

    info!(
        config = %settings.path.display(),
        api = %settings.api.base_url,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    let credentials = auth::resolve(&settings).await?;
    let backend = StoryBackend::Http(HttpBackend::new(&settings.api, &credentials.bearer_token)?);

    if !args.no_splash {
        splash::show();
    }

    let mut console = StdConsole::stdio(credentials.prompt, format::terminal_width());
    game::play(&mut console, backend).await
}

/// Resolves on the first Ctrl-C. Never resolves when the signal cannot be
/// listened for.
async fn interrupted() -> AppError {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("ctrl-c received");
            AppError::Interrupted
        }
        Err(e) => {
            warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<AppError>().await
        }
    }
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
    no_splash: bool,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;
    let mut no_splash = false;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: ai-dungeon [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to the config file");
                println!("      --no-splash            Do not clear the screen or show the banner");
                println!("  -v, -vv, -vvv              Increase logging verbosity");
                println!();
                println!("Type /quit at any prompt to leave.");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--no-splash" => no_splash = true,
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            other => eprintln!("warning: ignoring unknown argument {other}"),
        }
    }

    CliArgs { log_level: logger::level_for_verbosity(verbosity), config_path, no_splash }
}
