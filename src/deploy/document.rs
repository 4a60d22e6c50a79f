//! Deployment document rendering

use crate::error::Result;
use crate::wizard::{ConfigRecord, REQUEST_CONVERTER, RESPONSE_CONVERTER};
use tera::{Context, Tera};

const DOCUMENT_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<api-config>
  <route>{{ route }}</route>
  <input-api>{{ input_api }}</input-api>
  <output-api>{{ output_api }}</output-api>
  <transformers>
    <request>{{ request_converter }}</request>
    <response>{{ response_converter }}</response>
  </transformers>
</api-config>"#;

/// Render the deployment document for `record`.
///
/// Values are embedded verbatim without XML escaping, and identical records
/// always render to identical bytes.
pub fn generate_deployment_document(record: &ConfigRecord) -> Result<String> {
    let mut context = Context::new();
    context.insert("route", &record.route);
    context.insert("input_api", &record.input_api);
    context.insert("output_api", &record.output_api);
    context.insert("request_converter", record.converter(REQUEST_CONVERTER));
    context.insert("response_converter", record.converter(RESPONSE_CONVERTER));

    Ok(Tera::one_off(DOCUMENT_TEMPLATE, &context, false)?)
}
