//! Poll the repository on an interval, printing the device list each time.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use cubesense_core::{CoreError, Repository, SensorCloud};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::devices;

pub async fn handle<C>(
    repo: &Arc<Repository<C>>,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError>
where
    C: SensorCloud + 'static,
{
    let cancel = CancellationToken::new();
    let refresher = if args.background {
        let ttl = repo.config().ttl;
        if ttl.is_zero() {
            return Err(CliError::Validation {
                field: "ttl".into(),
                reason: "--background needs a non-zero ttl".into(),
            });
        }
        Some(repo.spawn_refresher(ttl, cancel.clone()))
    } else {
        None
    };

    let result = poll::<C>(repo, args, global).await;

    cancel.cancel();
    if let Some(handle) = refresher {
        let _ = handle.await;
    }
    result
}

async fn poll<C: SensorCloud>(
    repo: &Repository<C>,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let interval = Duration::from_secs(args.interval);
    let mut polls: u32 = 0;

    loop {
        match repo.load().await {
            Ok(source) => {
                let records = devices::select(&source, false);
                let out = devices::render(&records, global)?;
                if matches!(global.output, OutputFormat::Table) {
                    let stamp = chrono::Local::now().format("%H:%M:%S");
                    output::print_output(&format!("── {stamp} ──"), global.quiet);
                }
                output::print_output(&out, global.quiet);
            }
            Err(e @ CoreError::AuthenticationFailed { .. }) => return Err(e.into()),
            Err(e) => warn!(error = %e, "poll failed; retrying next interval"),
        }

        polls = polls.saturating_add(1);
        if args.count.is_some_and(|n| polls >= n) {
            return Ok(());
        }

        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            res = tokio::signal::ctrl_c() => {
                res?;
                debug!(polls, "watch interrupted");
                return Ok(());
            }
        }
    }
}
