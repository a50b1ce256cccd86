//! Transaction finality polling.
//!
//! Polls `getTransaction` until a terminal state, backing off exponentially
//! up to a cap, and gives up at a configured deadline instead of looping
//! forever. `NOT_FOUND` counts as transient: the network may simply not have
//! ingested the transaction yet.

use std::time::{Duration, Instant};

use tracing::debug;

use workshop_core::{PollConfig, Result, TxHash, TxStatus, WorkshopError};

use crate::client::SorobanClient;

/// Poll until the transaction reaches a terminal status. Returns the terminal
/// status; exceeding the deadline is a `PollTimeout` error.
pub async fn wait_for_transaction(
    client: &dyn SorobanClient,
    hash: &TxHash,
    config: &PollConfig,
) -> Result<TxStatus> {
    let started = Instant::now();
    let deadline = Duration::from_secs(config.deadline_secs);
    let mut delay = Duration::from_millis(config.initial_delay_ms);
    let cap = Duration::from_millis(config.max_delay_ms);

    loop {
        let status = client.get_transaction(hash).await?;
        if status.is_terminal() {
            debug!(hash = %hash, status = %status, "transaction finalized");
            return Ok(status);
        }
        debug!(hash = %hash, status = %status, "transaction not yet final");

        if started.elapsed() + delay > deadline {
            return Err(WorkshopError::PollTimeout {
                hash: hash.to_string(),
                waited_secs: started.elapsed().as_secs(),
            });
        }
        tokio::time::sleep(delay).await;
        delay = next_delay(delay, cap);
    }
}

/// Like [`wait_for_transaction`], but a terminal `Failed` becomes an error.
pub async fn confirm_transaction(
    client: &dyn SorobanClient,
    hash: &TxHash,
    config: &PollConfig,
) -> Result<()> {
    match wait_for_transaction(client, hash, config).await? {
        TxStatus::Success => Ok(()),
        status => Err(WorkshopError::TransactionFailed {
            hash: hash.to_string(),
            status: status.to_string(),
        }),
    }
}

fn next_delay(current: Duration, cap: Duration) -> Duration {
    (current * 2).min(cap)
}
