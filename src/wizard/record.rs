//! The configuration record collected by the wizard

use crate::spec_source::SpecSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Converter name for the request direction
pub const REQUEST_CONVERTER: &str = "request_converter";
/// Converter name for the response direction
pub const RESPONSE_CONVERTER: &str = "response_converter";

/// Converter name to converter source text
pub type Converters = BTreeMap<String, String>;

/// Authentication scheme of the proxy or the target service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthKind {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "apiKey")]
    ApiKey,
    #[serde(rename = "oauth2")]
    OAuth2,
    #[serde(rename = "basic")]
    Basic,
    #[serde(rename = "bearer")]
    Bearer,
}

impl AuthKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthKind::None => "none",
            AuthKind::ApiKey => "apiKey",
            AuthKind::OAuth2 => "oauth2",
            AuthKind::Basic => "basic",
            AuthKind::Bearer => "bearer",
        }
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// `None` until a type has been selected
    #[serde(rename = "type", default)]
    pub kind: Option<AuthKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl AuthConfig {
    pub fn none() -> Self {
        Self {
            kind: Some(AuthKind::None),
            key: None,
        }
    }

    pub fn api_key(key: impl Into<String>) -> Self {
        Self {
            kind: Some(AuthKind::ApiKey),
            key: Some(key.into()),
        }
    }

    /// Whether a non-empty key is supplied
    pub fn has_key(&self) -> bool {
        self.key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Human readable form with the key masked
    pub fn describe(&self) -> String {
        match (self.kind, self.key.as_deref()) {
            (None, _) => "not selected".to_string(),
            (Some(AuthKind::ApiKey), Some(key)) if !key.is_empty() => {
                format!("apiKey ({})", mask_key(key))
            }
            (Some(kind), _) => kind.to_string(),
        }
    }
}

/// Mask all but the first and last four characters of a key. Keys of eight
/// characters or fewer are masked completely.
pub fn mask_key(key: &str) -> String {
    const MASK: &str = "••••••";
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return MASK.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{MASK}{tail}")
}

/// Everything the wizard collects for one adapter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigRecord {
    pub route: String,
    pub proxy_auth: AuthConfig,
    pub target_auth: AuthConfig,
    pub target_base_url: String,
    pub input_spec: Option<SpecSource>,
    pub output_spec: Option<SpecSource>,
    pub input_api: String,
    pub output_api: String,
    pub converters: Option<Converters>,
    pub deployment_document: Option<String>,
    pub deployed: bool,
}

impl ConfigRecord {
    /// Source text of a converter, empty when not generated
    pub fn converter(&self, name: &str) -> &str {
        self.converters
            .as_ref()
            .and_then(|c| c.get(name))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Route with the first `{inputApi}` and `{outputApi}` replaced by the
    /// lower-cased API names
    pub fn formatted_route(&self) -> String {
        self.route
            .replacen("{inputApi}", &self.input_api.to_lowercase(), 1)
            .replacen("{outputApi}", &self.output_api.to_lowercase(), 1)
    }

    /// Review summary with API keys masked
    pub fn summary(&self) -> String {
        let spec_line = |spec: &Option<SpecSource>| match spec {
            Some(source) => source.display_name(),
            None => "not selected".to_string(),
        };
        let converters = match &self.converters {
            Some(c) if !c.is_empty() => c.keys().cloned().collect::<Vec<_>>().join(", "),
            _ => "not generated".to_string(),
        };

        let lines = [
            format!("Route: {}", self.formatted_route()),
            format!("Proxy authentication: {}", self.proxy_auth.describe()),
            format!("Target base URL: {}", self.target_base_url),
            format!("Target authentication: {}", self.target_auth.describe()),
            format!(
                "Input API: {} ({})",
                self.input_api,
                spec_line(&self.input_spec)
            ),
            format!(
                "Output API: {} ({})",
                self.output_api,
                spec_line(&self.output_spec)
            ),
            format!("Converters: {converters}"),
            format!(
                "Deployment document: {}",
                if self.deployment_document.is_some() {
                    "generated"
                } else {
                    "not generated"
                }
            ),
            format!(
                "Status: {}",
                if self.deployed {
                    "deployed"
                } else {
                    "not deployed"
                }
            ),
        ];
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("abcd1234wxyz"), "abcd••••••wxyz");
        assert_eq!(mask_key("12345678"), "••••••");
        assert_eq!(mask_key(""), "••••••");
    }

    #[test]
    fn test_formatted_route_lowercases_names() {
        let record = ConfigRecord {
            route: "/api/{inputApi}/to/{outputApi}".to_string(),
            input_api: "Legacy".to_string(),
            output_api: "device-roaming-status".to_string(),
            ..Default::default()
        };
        assert_eq!(
            record.formatted_route(),
            "/api/legacy/to/device-roaming-status"
        );
    }

    #[test]
    fn test_formatted_route_replaces_first_placeholder_only() {
        let record = ConfigRecord {
            route: "/{inputApi}/{inputApi}/{outputApi}".to_string(),
            input_api: "Legacy".to_string(),
            output_api: "Status".to_string(),
            ..Default::default()
        };
        assert_eq!(record.formatted_route(), "/legacy/{inputApi}/status");
    }

    #[test]
    fn test_summary_masks_keys() {
        let record = ConfigRecord {
            route: "/proxy".to_string(),
            proxy_auth: AuthConfig::api_key("secretkey-0001"),
            target_auth: AuthConfig::none(),
            target_base_url: "https://target.example.com".to_string(),
            ..Default::default()
        };
        let summary = record.summary();

        assert!(summary.contains("Proxy authentication: apiKey (secr••••••0001)"));
        assert!(summary.contains("Target authentication: none"));
        assert!(!summary.contains("secretkey-0001"));
        assert!(summary.contains("Converters: not generated"));
    }

    #[test]
    fn test_converter_lookup() {
        let mut converters = Converters::new();
        converters.insert(REQUEST_CONVERTER.to_string(), "fn a() {}".to_string());
        let record = ConfigRecord {
            converters: Some(converters),
            ..Default::default()
        };

        assert_eq!(record.converter(REQUEST_CONVERTER), "fn a() {}");
        assert_eq!(record.converter(RESPONSE_CONVERTER), "");
    }

    #[test]
    fn test_auth_config_yaml() {
        let auth: AuthConfig = serde_yaml::from_str("type: apiKey\nkey: abc\n").unwrap();
        assert_eq!(auth, AuthConfig::api_key("abc"));

        let auth: AuthConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(auth.kind, None);
    }
}
