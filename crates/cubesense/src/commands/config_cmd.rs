//! Config subcommand handlers.

use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "****";

/// Copy of `cfg` safe to print.
fn redacted(cfg: &Config) -> Config {
    Config {
        token: cfg.token.as_ref().map(|_| REDACTED.into()),
        ..cfg.clone()
    }
}

fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    let _ = writeln!(out, "api_url = \"{}\"", cfg.api_url);
    if cfg.token.is_some() {
        let _ = writeln!(out, "token = \"{REDACTED}\"");
    }
    if let Some(ref env) = cfg.token_env {
        let _ = writeln!(out, "token_env = \"{env}\"");
    }
    let _ = writeln!(out, "ttl = {}", cfg.ttl);
    let _ = writeln!(out, "timeout = {}", cfg.timeout);
    let _ = writeln!(out, "fetch_concurrency = {}", cfg.fetch_concurrency);
    let _ = write!(out, "single_flight = {}", cfg.single_flight);
    out
}

fn prompt_token() -> Result<String, CliError> {
    let token = rpassword::prompt_password("API token: ")?;
    let token = token.trim().to_owned();
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "token cannot be empty".into(),
        });
    }
    Ok(token)
}

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
        }

        ConfigCommand::Show => {
            let cfg = redacted(&config::apply_overrides(config::load_config()?, global));
            let out = output::render_single(&global.output, &cfg, format_config, |c| c.api_url.clone())?;
            output::print_output(&out, global.quiet);
        }

        ConfigCommand::SetToken { plaintext } => {
            let token = prompt_token()?;
            if plaintext {
                let mut cfg = config::load_config()?;
                cfg.token = Some(token);
                config::save_config(&cfg)?;
                eprintln!("Token saved to {}", config::config_path().display());
            } else {
                cubesense_config::store_token(&SecretString::from(token))?;
                eprintln!("Token stored in system keyring");
            }
        }
    }
    Ok(())
}
