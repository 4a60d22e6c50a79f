//! Client seam for the converter generation service

use crate::error::{Error, Result};
use crate::wizard::{Converters, REQUEST_CONVERTER, RESPONSE_CONVERTER};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, info};

/// Reply keys describing the generation rather than naming a converter
pub const METADATA_KEYS: [&str; 4] = ["explanation", "interfaces", "inputApi", "outputApi"];

/// Converter source text returned by the generation service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedConverters {
    #[serde(deserialize_with = "null_as_empty")]
    pub request_converter: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub response_converter: String,
    /// Every other key of the reply: named converters and generation metadata
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl GeneratedConverters {
    pub fn new(request_converter: impl Into<String>, response_converter: impl Into<String>) -> Self {
        Self {
            request_converter: request_converter.into(),
            response_converter: response_converter.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Add a named converter next to the request and response converters
    pub fn with_converter(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.extra.insert(name.into(), Value::String(source.into()));
        self
    }

    /// All converters keyed by name. Metadata keys and non-text entries are left out.
    pub fn into_converters(self) -> Converters {
        let mut converters = Converters::new();
        converters.insert(REQUEST_CONVERTER.to_string(), self.request_converter);
        converters.insert(RESPONSE_CONVERTER.to_string(), self.response_converter);
        for (name, value) in self.extra {
            if METADATA_KEYS.contains(&name.as_str()) {
                continue;
            }
            match value {
                Value::String(source) => {
                    converters.insert(name, source);
                }
                Value::Null => {
                    converters.insert(name, String::new());
                }
                other => debug!(name = %name, kind = ?other, "Skipping non-text converter entry"),
            }
        }
        converters
    }
}

#[derive(Debug, Serialize)]
struct TransformRequest<'a> {
    input: InputFile<'a>,
    output: OutputFile<'a>,
}

#[derive(Debug, Serialize)]
struct InputFile<'a> {
    input_file: &'a str,
}

#[derive(Debug, Serialize)]
struct OutputFile<'a> {
    output_file: &'a str,
}

/// Generates converters from a pair of API specifications
#[async_trait]
pub trait TransformClient: Send + Sync {
    async fn transform(&self, input_spec: &str, output_spec: &str) -> Result<GeneratedConverters>;
}

/// `TransformClient` posting both specifications to an HTTP endpoint
pub struct HttpTransformClient {
    client: Client,
    endpoint: String,
}

impl HttpTransformClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        url::Url::parse(&endpoint)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TransformClient for HttpTransformClient {
    async fn transform(&self, input_spec: &str, output_spec: &str) -> Result<GeneratedConverters> {
        let body = TransformRequest {
            input: InputFile {
                input_file: input_spec,
            },
            output: OutputFile {
                output_file: output_spec,
            },
        };

        info!(endpoint = %self.endpoint, "Requesting converter generation");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Transform request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!(
                "HTTP error! status: {}",
                status.as_u16()
            )));
        }

        let converters: GeneratedConverters = response
            .json()
            .await
            .map_err(|e| Error::Network(format!("Failed to parse transform response: {e}")))?;
        debug!(
            request_len = converters.request_converter.len(),
            response_len = converters.response_converter.len(),
            "Received converters"
        );
        Ok(converters)
    }
}

/// Mock implementation of `TransformClient` for testing
pub struct MockTransformClient {
    /// Predefined responses, consumed in order
    pub responses: Arc<Mutex<Vec<Result<GeneratedConverters>>>>,
    /// Number of calls received
    pub calls: Arc<AtomicUsize>,
    /// When set, each call waits for a notification before answering
    pub gate: Option<Arc<Notify>>,
}

impl MockTransformClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
            gate: None,
        }
    }

    /// Hold every call until `gate` is notified
    #[must_use]
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new()
        }
    }

    pub async fn add_response(&self, response: Result<GeneratedConverters>) {
        self.responses.lock().await.push(response);
    }

    pub async fn add_success_response(&self, request_converter: &str, response_converter: &str) {
        self.add_response(Ok(GeneratedConverters::new(
            request_converter,
            response_converter,
        )))
        .await;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockTransformClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransformClient for MockTransformClient {
    async fn transform(&self, _input_spec: &str, _output_spec: &str) -> Result<GeneratedConverters> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let mut responses = self.responses.lock().await;
        if responses.is_empty() {
            return Err(Error::Network("No mock response configured".to_string()));
        }
        responses.remove(0)
    }
}
