//! CLI configuration: the shared `cubesense_config` file plus
//! `GlobalOpts` flag overrides.

use secrecy::SecretString;

use cubesense_core::{CloudConfig, RepositoryConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use cubesense_config::{Config, config_path, load_config, save_config};

/// Apply flag overrides (`--api-url`, `--ttl`, `--timeout`) on top of
/// the loaded file.
pub fn apply_overrides(mut cfg: Config, global: &GlobalOpts) -> Config {
    if let Some(ref url) = global.api_url {
        cfg.api_url.clone_from(url);
    }
    if let Some(ttl) = global.ttl {
        cfg.ttl = ttl;
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    cfg
}

/// Resolve the token: `--token` first, then the shared chain.
pub fn resolve_token(cfg: &Config, global: &GlobalOpts) -> Result<SecretString, CliError> {
    if let Some(ref token) = global.token {
        return Ok(SecretString::from(token.clone()));
    }
    Ok(cubesense_config::resolve_token(cfg)?)
}

/// Everything needed to build a repository.
pub fn resolve(global: &GlobalOpts) -> Result<(CloudConfig, RepositoryConfig), CliError> {
    let cfg = apply_overrides(load_config()?, global);
    let token = resolve_token(&cfg, global)?;
    let cloud = cubesense_config::to_cloud_config(&cfg, token)?;
    let repo = cubesense_config::to_repository_config(&cfg)?;
    Ok((cloud, repo))
}
