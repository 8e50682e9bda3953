//! Receipt reconciliation.
//!
//! Processed requests whose remote status is still open are grouped by
//! ticket number and checked against the gateway in fixed-size chunks. All
//! chunks are dispatched before any is awaited, and a chunk that fails
//! never blocks its siblings. Each chunk persists its status flips with a
//! single batched write.

use std::{collections::HashMap, sync::Arc};

use fieldbill_common::{DeliveryResponse, OutwardStatus};
use fieldbill_gateway::{GatewayError, ReceiptSource};
use fieldbill_store::{DeliveryRequest, RequestStore, StoreError};
use serde::Deserialize;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::{error::DeliveryError, traits::ResponseChannel};

#[derive(Debug, Clone, Deserialize)]
pub struct ReconcilerConfig {
    /// How many distinct ticket numbers one gateway query covers.
    #[serde(default = "defaults::chunk_size")]
    pub chunk_size: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            chunk_size: defaults::chunk_size(),
        }
    }
}

mod defaults {
    pub const fn chunk_size() -> usize {
        25
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Distinct ticket numbers awaiting a final status.
    pub tickets: usize,
    /// Gateway queries issued.
    pub chunks: usize,
    /// Requests whose final status was recorded this pass.
    pub updated_requests: usize,
    /// Chunks that failed and will be retried next pass.
    pub failed_chunks: usize,
}

#[derive(Debug, thiserror::Error)]
enum ChunkError {
    #[error("Gateway query failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Batched status write failed: {0}")]
    Store(#[from] StoreError),
}

pub struct Reconciler {
    store: Arc<dyn RequestStore>,
    receipts: Arc<dyn ReceiptSource>,
    responses: Arc<dyn ResponseChannel>,
    config: ReconcilerConfig,
}

impl Reconciler {
    #[must_use]
    pub fn new(
        store: Arc<dyn RequestStore>,
        receipts: Arc<dyn ReceiptSource>,
        responses: Arc<dyn ResponseChannel>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            store,
            receipts,
            responses,
            config,
        }
    }

    /// Run one reconciliation pass over everything awaiting a final status.
    ///
    /// # Errors
    /// Fails only when the pending work-queue cannot be read. Chunk
    /// failures are counted in the summary, not surfaced.
    pub async fn run_once(&self) -> Result<ReconcileSummary, DeliveryError> {
        let pending = self.store.pending_reconciliation().await?;
        if pending.is_empty() {
            debug!("Nothing awaiting reconciliation");
            return Ok(ReconcileSummary::default());
        }

        // Several requests may share a ticket number after a resubmission;
        // one receipt then settles all of them.
        let mut by_ticket: HashMap<String, Vec<DeliveryRequest>> = HashMap::new();
        for request in pending {
            match request.submission() {
                Ok(submission) => by_ticket
                    .entry(submission.ticket_number)
                    .or_default()
                    .push(request),
                Err(e) => {
                    warn!(request = %request.id, error = %e, "Skipping undecodable request");
                }
            }
        }

        let mut tickets: Vec<String> = by_ticket.keys().cloned().collect();
        tickets.sort_unstable();

        let mut summary = ReconcileSummary {
            tickets: tickets.len(),
            ..ReconcileSummary::default()
        };

        let mut tasks = JoinSet::new();
        for chunk in tickets.chunks(self.config.chunk_size) {
            summary.chunks += 1;

            let numbers: Vec<String> = chunk.to_vec();
            let requests: HashMap<String, Vec<DeliveryRequest>> = numbers
                .iter()
                .filter_map(|n| by_ticket.remove_entry(n))
                .collect();

            let store = Arc::clone(&self.store);
            let receipts = Arc::clone(&self.receipts);
            let responses = Arc::clone(&self.responses);
            tasks.spawn(async move {
                Self::process_chunk(store, receipts, responses, numbers, requests).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(updated)) => summary.updated_requests += updated,
                Ok(Err(e)) => {
                    error!(error = %e, "Reconciliation chunk failed");
                    summary.failed_chunks += 1;
                }
                Err(e) => {
                    error!(error = %e, "Reconciliation chunk panicked");
                    summary.failed_chunks += 1;
                }
            }
        }

        info!(
            tickets = summary.tickets,
            chunks = summary.chunks,
            updated = summary.updated_requests,
            failed = summary.failed_chunks,
            "Reconciliation pass complete"
        );
        Ok(summary)
    }

    /// Query one chunk of ticket numbers and persist every final status
    /// found, returning how many requests were settled.
    async fn process_chunk(
        store: Arc<dyn RequestStore>,
        receipts: Arc<dyn ReceiptSource>,
        responses: Arc<dyn ResponseChannel>,
        numbers: Vec<String>,
        mut requests: HashMap<String, Vec<DeliveryRequest>>,
    ) -> Result<usize, ChunkError> {
        let found = receipts.query_receipts(&numbers).await?;

        let mut updated = Vec::new();
        for receipt in found {
            let status = receipt.receipt_status();
            if !status.is_final() {
                debug!(
                    ticket = %receipt.receipt_number,
                    status = %status,
                    "Receipt not yet final"
                );
                continue;
            }

            let Some(settled) = requests.remove(&receipt.receipt_number) else {
                continue;
            };

            let outward = OutwardStatus::from(&status);
            for mut request in settled {
                request.has_reached_final_status = true;
                if let Err(e) = responses
                    .send(&request.id, DeliveryResponse::status_update(outward))
                    .await
                {
                    error!(request = %request.id, error = %e, "Failed to send status update");
                }
                updated.push(request);
            }
        }

        if !updated.is_empty() {
            store.update_all(&updated).await?;
        }
        Ok(updated.len())
    }
}
