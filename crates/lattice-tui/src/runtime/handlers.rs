//! Async effect handlers. Each returns the event the runtime delivers.

use lattice_core::intercept::{InterceptClient, InterceptStatus};
use tracing::info;

use crate::events::UiEvent;

pub async fn run_intercept(client: InterceptClient, payload_hex: String) -> UiEvent {
    let result = client.send(&payload_hex).await;
    match &result {
        Ok(report) => info!(
            original_size = report.original_size,
            packed_size = report.packed_size,
            tx_hash = %report.tx_hash,
            "intercept succeeded"
        ),
        Err(err) => info!(error = %err, "intercept failed"),
    }
    UiEvent::InterceptFinished(result.map_err(|err| InterceptStatus::from(&err)))
}
