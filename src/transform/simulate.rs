//! Local converter test runs
//!
//! Converter source text is never executed. A test run produces the output the
//! named converter is expected to produce for well-known converters, and a
//! generic description of the input for everything else.

use crate::error::{Error, Result};
use crate::wizard::ConfigRecord;
use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde_json::{json, Map, Value};
use tracing::debug;

pub const CHECK_ROAMING_REQUEST: &str = "convertCheckRoamingRequest";
pub const ROAMING_STATUS_RESPONSE: &str = "convertRoamingStatusResponse";

/// Names of the converters available for test runs
pub fn converter_names(record: &ConfigRecord) -> Vec<String> {
    record
        .converters
        .as_ref()
        .map(|c| c.keys().cloned().collect())
        .unwrap_or_default()
}

/// Parse `sample_json` and run a simulated test of `converter`.
pub fn simulate(converter: &str, sample_json: &str) -> Result<Value> {
    let input: Value = serde_json::from_str(sample_json).map_err(|e| {
        Error::MalformedInput(format!(
            "Invalid JSON input data. Please check the format. ({e})"
        ))
    })?;
    Ok(simulate_value(converter, &input))
}

/// Run a simulated test of `converter` against an already parsed input.
pub fn simulate_value(converter: &str, input: &Value) -> Value {
    let mut log = vec![format!("Executing {converter}...")];

    let output = match converter {
        CHECK_ROAMING_REQUEST => {
            let mut out = Map::new();
            copy_if_set(input, "phoneNumber", &mut out, "msisdn");
            out.insert("includeCountryName".to_string(), Value::Bool(true));
            log.push("Successfully converted request data".to_string());
            Value::Object(out)
        }
        ROAMING_STATUS_RESPONSE => {
            let mut out = Map::new();
            copy_if_set(input, "roaming", &mut out, "roaming");
            copy_if_set(input, "countryCode", &mut out, "countryCode");
            copy_if_set(input, "countryName", &mut out, "countryName");
            log.push("Successfully converted response data".to_string());
            Value::Object(out)
        }
        _ => {
            let keys: Vec<Value> = input
                .as_object()
                .map(|obj| obj.keys().map(|k| Value::String(k.clone())).collect())
                .unwrap_or_default();
            log.push("Generic conversion completed".to_string());
            json!({
                "converted": true,
                "originalKeys": keys,
                "processedBy": converter,
                "timestamp": now(),
            })
        }
    };
    debug!(converter, "Simulated converter run");

    json!({
        "execution": {
            "function": converter,
            "timestamp": now(),
            "success": true,
            "log": log,
        },
        "request": {
            "input": input,
        },
        "response": {
            "output": output,
            "statusCode": 200,
            "headers": {
                "Content-Type": "application/json",
                "X-Converter": converter,
            },
        },
    })
}

/// Example input for a test run of `converter`
pub fn sample_input(converter: &str) -> Value {
    if converter.contains("check") && converter.contains("Request") {
        return json!({
            "phoneNumber": "+1234567890",
            "callbackUrl": "https://example.com/callback",
        });
    }
    if converter.contains("Status") && converter.contains("Response") {
        return json!({
            "roaming": true,
            "countryCode": "US",
            "countryName": "United States",
            "lastStatusTime": "2023-08-15T14:23:45Z",
        });
    }

    let mut rng = rand::rng();
    let n: u32 = rng.random_range(0..1000);
    let lowered = converter.to_lowercase();
    if lowered.contains("request") {
        json!({
            "id": format!("req-{n}"),
            "timestamp": now(),
            "parameters": {"key1": "value1", "key2": "value2"},
        })
    } else if lowered.contains("response") {
        json!({
            "status": "success",
            "code": 200,
            "data": {
                "id": format!("res-{n}"),
                "result": "Operation completed successfully",
                "timestamp": now(),
            },
        })
    } else {
        json!({
            "operation": converter,
            "timestamp": now(),
            "data": {
                "sample": "This is sample data for testing the converter",
                "testId": format!("test-{n}"),
            },
        })
    }
}

fn copy_if_set(input: &Value, from: &str, out: &mut Map<String, Value>, to: &str) {
    if let Some(value) = input.get(from) {
        out.insert(to.to_string(), value.clone());
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::{Converters, REQUEST_CONVERTER, RESPONSE_CONVERTER};

    #[test]
    fn test_check_roaming_request() {
        let result = simulate(CHECK_ROAMING_REQUEST, r#"{"phoneNumber": "+1555"}"#).unwrap();

        assert_eq!(
            result["response"]["output"],
            json!({"msisdn": "+1555", "includeCountryName": true})
        );
        assert_eq!(
            result["execution"]["log"],
            json!([
                "Executing convertCheckRoamingRequest...",
                "Successfully converted request data"
            ])
        );
        assert_eq!(result["request"]["input"]["phoneNumber"], json!("+1555"));
    }

    #[test]
    fn test_roaming_status_response_copies_optional_fields() {
        let result = simulate(ROAMING_STATUS_RESPONSE, r#"{"roaming": false, "countryCode": "FR"}"#)
            .unwrap();
        let output = &result["response"]["output"];

        assert_eq!(output, &json!({"roaming": false, "countryCode": "FR"}));
        assert!(output.get("countryName").is_none());
    }

    #[test]
    fn test_generic_converter() {
        let result = simulate("myConverter", r#"{"b": 1, "a": 2}"#).unwrap();
        let output = &result["response"]["output"];

        assert_eq!(output["converted"], json!(true));
        assert_eq!(output["processedBy"], json!("myConverter"));
        assert_eq!(output["originalKeys"].as_array().unwrap().len(), 2);
        assert_eq!(result["response"]["statusCode"], json!(200));
        assert_eq!(
            result["response"]["headers"]["X-Converter"],
            json!("myConverter")
        );
        assert_eq!(result["execution"]["success"], json!(true));
    }

    #[test]
    fn test_generic_converter_non_object_input() {
        let result = simulate("x", "[1, 2, 3]").unwrap();
        assert_eq!(result["response"]["output"]["originalKeys"], json!([]));
    }

    #[test]
    fn test_malformed_input() {
        let err = simulate("x", "{not json").unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_sample_inputs() {
        assert_eq!(
            sample_input(CHECK_ROAMING_REQUEST)["phoneNumber"],
            json!("+1234567890")
        );
        assert_eq!(sample_input(ROAMING_STATUS_RESPONSE)["countryCode"], json!("US"));

        let request = sample_input("request_converter");
        let id = request["id"].as_str().unwrap();
        let n: u32 = id.strip_prefix("req-").unwrap().parse().unwrap();
        assert!(n < 1000);

        assert_eq!(sample_input(RESPONSE_CONVERTER)["code"], json!(200));
        assert_eq!(sample_input("mapper")["operation"], json!("mapper"));
    }

    #[test]
    fn test_converter_names_follow_record() {
        assert!(converter_names(&ConfigRecord::default()).is_empty());

        let mut converters = Converters::new();
        converters.insert(RESPONSE_CONVERTER.to_string(), String::new());
        converters.insert(REQUEST_CONVERTER.to_string(), String::new());
        let record = ConfigRecord {
            converters: Some(converters),
            ..Default::default()
        };
        assert_eq!(
            converter_names(&record),
            vec![REQUEST_CONVERTER.to_string(), RESPONSE_CONVERTER.to_string()]
        );
    }
}
