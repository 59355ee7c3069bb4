//! Force a refresh, bypassing the cache.

use serde::Serialize;

use cubesense_core::{Repository, SensorCloud};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct RefreshSummary {
    devices: usize,
    ids: Vec<String>,
}

pub async fn handle<C: SensorCloud>(
    repo: &Repository<C>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let source = repo.refresh().await?;
    let summary = RefreshSummary {
        devices: source.len(),
        ids: source.records().map(|r| r.id.to_string()).collect(),
    };

    let out = output::render_single(
        &global.output,
        &summary,
        |s| match s.devices {
            1 => "Refreshed 1 device".to_owned(),
            n => format!("Refreshed {n} devices"),
        },
        |s| s.ids.join("\n"),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
