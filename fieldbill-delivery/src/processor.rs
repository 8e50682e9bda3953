//! The delivery orchestrator.
//!
//! One request moves through a fixed pipeline: load, validate, resolve
//! configuration, enrich, map, encode, transport, respond, persist. The
//! stages before any delivery attempt fail recoverably and leave the
//! request unprocessed; once delivery is attempted the request is marked
//! processed whether or not the attempt succeeded.

use std::{collections::HashMap, sync::Arc};

use fieldbill_common::{AdapterType, DeliveryResponse};
use fieldbill_encode::EncoderSelector;
use fieldbill_store::{DeliveryRequest, RequestId, RequestStore};
use tracing::{debug, error, info, warn};

use crate::{
    context::DeliveryContext,
    error::{DeliveryError, FatalError, RecoverableError},
    traits::{
        ConfigResolver, ContextEnricher, FieldMapper, RequestValidator, ResponseChannel,
        TransportStrategy,
    },
};

pub struct DeliveryProcessor {
    store: Arc<dyn RequestStore>,
    validator: Arc<dyn RequestValidator>,
    resolver: Arc<dyn ConfigResolver>,
    enricher: Arc<dyn ContextEnricher>,
    mapper: Arc<dyn FieldMapper>,
    encoders: EncoderSelector,
    transports: HashMap<AdapterType, Arc<dyn TransportStrategy>>,
    responses: Arc<dyn ResponseChannel>,
}

impl DeliveryProcessor {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn RequestStore>,
        validator: Arc<dyn RequestValidator>,
        resolver: Arc<dyn ConfigResolver>,
        enricher: Arc<dyn ContextEnricher>,
        mapper: Arc<dyn FieldMapper>,
        encoders: EncoderSelector,
        responses: Arc<dyn ResponseChannel>,
    ) -> Self {
        Self {
            store,
            validator,
            resolver,
            enricher,
            mapper,
            encoders,
            transports: HashMap::new(),
            responses,
        }
    }

    #[must_use]
    pub fn with_transport(
        mut self,
        adapter_type: AdapterType,
        transport: Arc<dyn TransportStrategy>,
    ) -> Self {
        self.transports.insert(adapter_type, transport);
        self
    }

    /// Run one request through the full pipeline.
    ///
    /// Returns the delivery response that was (best-effort) sent back to
    /// the source platform.
    ///
    /// # Errors
    /// System errors only. Validation and configuration problems produce a
    /// failure response and `Ok`; so do failed delivery attempts.
    pub async fn process_request(
        &self,
        id: &RequestId,
    ) -> Result<DeliveryResponse, DeliveryError> {
        let mut request = match self.store.load(id).await {
            Ok(request) => request,
            Err(e) => {
                // The caller handed us an id we cannot act on. Tell the
                // source platform something went wrong, then surface it.
                let response =
                    DeliveryResponse::failure("Delivery request could not be loaded", None, false, false);
                self.respond(id, response).await;
                return Err(e.into());
            }
        };

        let submission = match request.submission() {
            Ok(submission) => submission,
            Err(e) => {
                let response =
                    DeliveryResponse::failure("Delivery request payload is malformed", None, false, false);
                self.respond(id, response).await;
                return Err(e.into());
            }
        };

        // Stages before any delivery attempt: a failure here leaves the
        // request unprocessed so a later run can retry it.
        let problems = self.validator.validate(&submission);
        if !problems.is_empty() {
            let err = RecoverableError::Validation(problems);
            info!(request = %id, error = %err, "Submission rejected by validation");
            let response = DeliveryResponse::failure(err.to_string(), None, false, false);
            self.respond(id, response.clone()).await;
            return Ok(response);
        }

        let Some(resolved) = self
            .resolver
            .resolve(&submission.platform, &submission.customer_id)
            .await
        else {
            let err = RecoverableError::NoConfiguration {
                platform: submission.platform.clone(),
                customer_id: submission.customer_id.clone(),
            };
            info!(request = %id, error = %err, "No delivery configuration");
            let response = DeliveryResponse::failure(err.to_string(), None, false, false);
            self.respond(id, response.clone()).await;
            return Ok(response);
        };

        let supports_field_tickets = resolved.supports_field_tickets();
        let Some(config) = resolved.channel(submission.kind) else {
            let err = RecoverableError::NoConfiguration {
                platform: submission.platform.clone(),
                customer_id: submission.customer_id.clone(),
            };
            info!(request = %id, kind = ?submission.kind, "No channel for submission kind");
            let response =
                DeliveryResponse::failure(err.to_string(), None, supports_field_tickets, false);
            self.respond(id, response.clone()).await;
            return Ok(response);
        };

        let supports_status_polling = config.supports_status_polling();
        // A channel that cannot be polled never waits for reconciliation.
        if !supports_status_polling {
            request.has_reached_final_status = true;
        }

        let mut context = DeliveryContext {
            request_id: id.clone(),
            submission,
            config: config.clone(),
            supports_field_tickets,
            encoded: None,
        };

        let response = match self.deliver(&mut context).await {
            Ok(()) => {
                info!(request = %id, adapter = %context.config.adapter_type, "Delivery succeeded");
                DeliveryResponse::success(supports_field_tickets, supports_status_polling)
            }
            Err(e) => {
                let err = DeliveryError::Fatal(e);
                warn!(request = %id, error = %err, "Delivery failed");
                DeliveryResponse::failure(
                    err.to_string(),
                    err.additional_detail(),
                    supports_field_tickets,
                    supports_status_polling,
                )
            }
        };

        self.respond(id, response.clone()).await;

        // Delivery was attempted, successfully or not. The request leaves
        // the inbound queue either way.
        request.is_processed = true;
        self.store.update(&request).await?;

        Ok(response)
    }

    /// Run the stages of an actual delivery attempt.
    async fn deliver(&self, context: &mut DeliveryContext) -> Result<(), FatalError> {
        self.enricher
            .enrich(context)
            .await
            .map_err(|e| FatalError::Enrichment(e.to_string()))?;

        self.mapper
            .map(context)
            .await
            .map_err(|e| FatalError::Mapping(e.to_string()))?;

        let encoder = self.encoders.select(context.config.adapter_type)?;
        let encoded = encoder.encode(&context.submission, &context.config).await?;
        debug!(
            request = %context.request_id,
            parts = encoded.parts.len(),
            bytes = encoded.total_bytes(),
            "Submission encoded"
        );
        context.encoded = Some(encoded);

        let transport = self
            .transports
            .get(&context.config.adapter_type)
            .ok_or(FatalError::NoTransport(context.config.adapter_type))?;
        transport.send(context).await?;

        Ok(())
    }

    /// Best-effort response delivery. Failures are logged, never surfaced.
    async fn respond(&self, id: &RequestId, response: DeliveryResponse) {
        if let Err(e) = self.responses.send(id, response).await {
            error!(request = %id, error = %e, "Failed to send delivery response");
        }
    }

    /// Persist a brand-new inbound request, before any processing.
    ///
    /// # Errors
    /// Fails when the store rejects the insert.
    pub async fn accept(&self, payload: serde_json::Value) -> Result<RequestId, DeliveryError> {
        let request = DeliveryRequest::new(payload);
        self.store.insert(&request).await?;
        debug!(request = %request.id, "Accepted delivery request");
        Ok(request.id)
    }
}
