//! Transformation step controller
//!
//! Allows at most one generation call in flight. A call arriving while another
//! is pending is skipped rather than queued.

use super::client::TransformClient;
use crate::error::{Error, Result};
use crate::spec_source::{resolve_spec_text, SpecFetcher};
use crate::wizard::{ConfigRecord, Converters, TransformTicket, Wizard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of asking the controller to run a transformation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    Completed(Converters),
    /// Another transformation was already in flight; no request was made
    Skipped,
}

struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct TransformController {
    client: Arc<dyn TransformClient>,
    in_flight: AtomicBool,
}

impl TransformController {
    pub fn new(client: Arc<dyn TransformClient>) -> Self {
        Self {
            client,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Generate converters from two specification texts.
    pub async fn run_transform(
        &self,
        input_spec: &str,
        output_spec: &str,
    ) -> Result<TransformOutcome> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            warn!("Transformation already in progress, skipping");
            return Ok(TransformOutcome::Skipped);
        };
        self.call(input_spec, output_spec).await
    }

    /// Resolve the record's specifications and generate converters from them.
    pub async fn generate_for(
        &self,
        record: &ConfigRecord,
        fetcher: &dyn SpecFetcher,
        camara_raw_base: &str,
    ) -> Result<TransformOutcome> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            warn!("Transformation already in progress, skipping");
            return Ok(TransformOutcome::Skipped);
        };

        let input = record
            .input_spec
            .as_ref()
            .ok_or_else(|| Error::NotFound("input specification".to_string()))?;
        let output = record
            .output_spec
            .as_ref()
            .ok_or_else(|| Error::NotFound("output specification".to_string()))?;

        let input_text = resolve_spec_text(input, fetcher, camara_raw_base).await?;
        let output_text = resolve_spec_text(output, fetcher, camara_raw_base).await?;
        self.call(&input_text, &output_text).await
    }

    /// Run the transformation for `ticket` and merge the converters into `wizard`.
    ///
    /// Returns `wizard` unchanged when the call was skipped or `ticket` does not
    /// belong to its current Transformation mount. The ticket is only checked
    /// against `wizard`; a caller that keeps advancing its own wizard while the
    /// call is pending should use `generate_for` and apply the converters with
    /// `Wizard::apply_transform_result` on its latest wizard instead.
    pub async fn run_for_ticket(
        &self,
        wizard: &Wizard,
        ticket: TransformTicket,
        fetcher: &dyn SpecFetcher,
        camara_raw_base: &str,
    ) -> Result<Wizard> {
        match self
            .generate_for(wizard.record(), fetcher, camara_raw_base)
            .await?
        {
            TransformOutcome::Completed(converters) => Ok(wizard
                .apply_transform_result(ticket, converters)
                .unwrap_or_else(|| wizard.clone())),
            TransformOutcome::Skipped => Ok(wizard.clone()),
        }
    }

    async fn call(&self, input_spec: &str, output_spec: &str) -> Result<TransformOutcome> {
        let generated = self.client.transform(input_spec, output_spec).await?;
        info!("Transformation completed");
        Ok(TransformOutcome::Completed(generated.into_converters()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec_source::{MockSpecFetcher, SpecSource};
    use crate::transform::client::{GeneratedConverters, MockTransformClient};
    use crate::transform::simulate::{converter_names, CHECK_ROAMING_REQUEST};
    use crate::wizard::{AuthConfig, StepInput, REQUEST_CONVERTER};
    use tokio::sync::Notify;

    const RAW_BASE: &str = "https://raw.example.com";

    fn wizard_at_transformation() -> Wizard {
        Wizard::new()
            .submit_step(
                0,
                StepInput::Route {
                    route: "/roaming".to_string(),
                    proxy_auth: AuthConfig::none(),
                    target_auth: AuthConfig::none(),
                    target_base_url: "https://target.example.com".to_string(),
                },
            )
            .unwrap()
            .submit_step(
                1,
                StepInput::Specs {
                    input_spec: Some(SpecSource::Url {
                        url: "https://specs.example.com/in.json".to_string(),
                        name: None,
                    }),
                    output_spec: Some(SpecSource::Url {
                        url: "https://specs.example.com/out.yaml".to_string(),
                        name: None,
                    }),
                },
            )
            .unwrap()
    }

    fn fetcher() -> MockSpecFetcher {
        MockSpecFetcher::new()
            .with_document("https://specs.example.com/in.json", "{}")
            .with_document("https://specs.example.com/out.yaml", "openapi: 3.0.0")
    }

    #[tokio::test]
    async fn test_run_transform_completes() {
        let mock = Arc::new(MockTransformClient::new());
        mock.add_success_response("req", "res").await;
        let controller = TransformController::new(mock.clone());

        let outcome = controller.run_transform("a", "b").await.unwrap();

        match outcome {
            TransformOutcome::Completed(converters) => {
                assert_eq!(converters[REQUEST_CONVERTER], "req");
            }
            TransformOutcome::Skipped => panic!("expected completion"),
        }
        assert!(!controller.is_in_flight());
    }

    #[tokio::test]
    async fn test_concurrent_call_is_skipped() {
        let gate = Arc::new(Notify::new());
        let mock = Arc::new(MockTransformClient::gated(gate.clone()));
        mock.add_success_response("req", "res").await;
        let controller = Arc::new(TransformController::new(mock.clone()));

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.run_transform("a", "b").await })
        };
        while !controller.is_in_flight() {
            tokio::task::yield_now().await;
        }

        let second = controller.run_transform("a", "b").await.unwrap();
        assert_eq!(second, TransformOutcome::Skipped);

        gate.notify_one();
        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, TransformOutcome::Completed(_)));
        assert_eq!(mock.call_count(), 1);
        assert!(!controller.is_in_flight());
    }

    #[tokio::test]
    async fn test_failure_releases_guard() {
        let mock = Arc::new(MockTransformClient::new());
        mock.add_response(Err(Error::Network("HTTP error! status: 500".to_string())))
            .await;
        let controller = TransformController::new(mock);

        let err = controller.run_transform("a", "b").await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert!(!controller.is_in_flight());
    }

    #[tokio::test]
    async fn test_run_for_ticket_merges_converters() {
        let mock = Arc::new(MockTransformClient::new());
        mock.add_success_response("req", "res").await;
        let controller = TransformController::new(mock);
        let fetcher = fetcher();

        let (wizard, ticket) = wizard_at_transformation().take_transform_ticket();
        let wizard = controller
            .run_for_ticket(&wizard, ticket.unwrap(), &fetcher, RAW_BASE)
            .await
            .unwrap();

        assert_eq!(wizard.record().converter(REQUEST_CONVERTER), "req");
        assert_eq!(fetcher.requested.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_transform_keeps_previous_converters() {
        let mock = Arc::new(MockTransformClient::new());
        mock.add_success_response("req", "res").await;
        mock.add_response(Err(Error::Network("HTTP error! status: 502".to_string())))
            .await;
        mock.add_success_response("req2", "res2").await;
        let controller = TransformController::new(mock.clone());
        let fetcher = fetcher();

        let (wizard, ticket) = wizard_at_transformation().take_transform_ticket();
        let mut latest = controller
            .run_for_ticket(&wizard, ticket.unwrap(), &fetcher, RAW_BASE)
            .await
            .unwrap();

        let (retried, ticket) = latest.retry_transformation().unwrap();
        match controller
            .run_for_ticket(&retried, ticket, &fetcher, RAW_BASE)
            .await
        {
            Ok(_) => panic!("expected the failed call to produce no wizard"),
            Err(err) => assert!(err.is_retryable()),
        }
        assert!(!controller.is_in_flight());
        assert_eq!(latest.record().converter(REQUEST_CONVERTER), "req");

        let (retried, ticket) = latest.retry_transformation().unwrap();
        latest = controller
            .run_for_ticket(&retried, ticket, &fetcher, RAW_BASE)
            .await
            .unwrap();
        assert_eq!(latest.record().converter(REQUEST_CONVERTER), "req2");
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_stale_ticket_result_is_discarded() {
        let mock = Arc::new(MockTransformClient::new());
        mock.add_success_response("old", "old").await;
        let controller = TransformController::new(mock);
        let fetcher = fetcher();

        let (wizard, first_ticket) = wizard_at_transformation().take_transform_ticket();
        let (latest, _current_ticket) = wizard.retry_transformation().unwrap();

        let applied = controller
            .run_for_ticket(&latest, first_ticket.unwrap(), &fetcher, RAW_BASE)
            .await
            .unwrap();

        assert!(applied.record().converters.is_none());
        assert_eq!(applied.transform_generation(), latest.transform_generation());
    }

    #[tokio::test]
    async fn test_generated_named_converters_are_selectable() {
        let mock = Arc::new(MockTransformClient::new());
        mock.add_response(Ok(GeneratedConverters::new("req", "res").with_converter(
            CHECK_ROAMING_REQUEST,
            "function convertCheckRoamingRequest(input) {}",
        )))
        .await;
        let controller = TransformController::new(mock);

        let (wizard, ticket) = wizard_at_transformation().take_transform_ticket();
        let wizard = controller
            .run_for_ticket(&wizard, ticket.unwrap(), &fetcher(), RAW_BASE)
            .await
            .unwrap();

        let names = converter_names(wizard.record());
        assert!(names.contains(&CHECK_ROAMING_REQUEST.to_string()));
        assert_eq!(names.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_spec_is_not_found() {
        let controller = TransformController::new(Arc::new(MockTransformClient::new()));
        let err = controller
            .generate_for(&ConfigRecord::default(), &MockSpecFetcher::new(), RAW_BASE)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
