use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;

use triage_core::{load_triage_config, ConfigError, TriageConfig};
use triage_dispatch::resolve_editor;
use triage_remote::{InMemoryApi, IncidentApi};
use triage_tui::{run_tui, App, Dimensions, TuiError};

const DEFAULT_TICK_MS: u64 = 250;
const DEFAULT_CONFIG_PATH: &str = "config/triage.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
    tick_ms: u64,
    config_path: PathBuf,
    demo: bool,
}

#[derive(Debug, thiserror::Error)]
enum MainError {
    #[error("{0}")]
    Args(String),
    #[error(transparent)]
    Tui(#[from] TuiError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

fn print_banner() {
    eprint!("\x1b[36m");
    eprintln!();
    eprintln!("  \u{256d}\u{2500}\u{256e}");
    eprintln!("  \u{2502}v\u{2502} vaka");
    eprintln!("  \u{2570}\u{2500}\u{256f} incident triage board");
    eprintln!();
    eprint!("\x1b[0m");
}

fn main() {
    if let Err(err) = run() {
        eprintln!("[vaka] failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), MainError> {
    let mut argv = std::env::args();
    let program = argv.next().unwrap_or_else(|| "vaka".to_string());
    let args = parse_cli_args(argv.collect::<Vec<_>>(), &program)?;

    print_banner();

    let config = load_config(&args.config_path)?;
    let editor = resolve_editor(config.editor.as_deref());
    eprintln!("[vaka] editor: {editor}");
    if config.teams.is_empty() {
        eprintln!("[vaka] team filter: all teams");
    } else {
        eprintln!("[vaka] team filter: {}", config.teams.join(", "));
    }
    if config.silence.is_none() {
        eprintln!("[vaka] silence target not configured; the silence action will fail");
    }

    let api: Arc<dyn IncidentApi> = if args.demo {
        eprintln!("[vaka] using built-in sample incidents");
        Arc::new(InMemoryApi::demo())
    } else {
        return Err(MainError::Any(anyhow!(
            "no remote transport configured; pass --demo to use the built-in sample data"
        )));
    };

    let mut app = App::new(&config, editor, Dimensions::new(80, 24));
    app.bootstrap();

    run_tui(&mut app, api, Duration::from_millis(args.tick_ms))?;

    eprintln!("[vaka] shutdown clean");
    Ok(())
}

fn load_config(path: &Path) -> Result<TriageConfig, MainError> {
    if !path.exists() {
        eprintln!("[vaka] no config at {}; using defaults", path.display());
        return Ok(TriageConfig::default());
    }
    Ok(load_triage_config(path)?)
}

fn parse_cli_args(args: Vec<String>, program: &str) -> Result<CliArgs, MainError> {
    let mut tick_ms = DEFAULT_TICK_MS;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut demo = false;
    let mut idx = 0usize;

    while idx < args.len() {
        let arg = &args[idx];
        match arg.as_str() {
            "--help" | "-h" => return Err(MainError::Args(usage(program))),
            "--tick-ms" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| MainError::Args("missing value for --tick-ms".to_string()))?;
                tick_ms = value.parse::<u64>().map_err(|_| {
                    MainError::Args(format!("invalid --tick-ms value: {value} (expected u64)"))
                })?;
                if tick_ms == 0 {
                    return Err(MainError::Args(
                        "invalid --tick-ms value: 0 (must be > 0)".to_string(),
                    ));
                }
            }
            "--config" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| MainError::Args("missing value for --config".to_string()))?;
                config_path = PathBuf::from(value);
            }
            "--demo" => demo = true,
            other => {
                return Err(MainError::Args(format!(
                    "unknown argument: {other}\n\n{}",
                    usage(program)
                )));
            }
        }
        idx += 1;
    }

    Ok(CliArgs {
        tick_ms,
        config_path,
        demo,
    })
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [--config <path>] [--tick-ms <u64>] [--demo]\n\
Defaults:\n\
  --config {DEFAULT_CONFIG_PATH}\n\
  --tick-ms {DEFAULT_TICK_MS}"
    )
}
