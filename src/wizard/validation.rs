//! Step completeness predicates
//!
//! Each predicate inspects the record and returns the per-field errors that
//! keep its step from being complete. An empty map means the step is complete.

use super::record::{AuthConfig, AuthKind, ConfigRecord};
use super::step::Step;
use crate::error::FieldErrors;
use crate::spec_source::{SpecSide, SpecSource};
use once_cell::sync::Lazy;
use regex::Regex;

static ROUTE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/[A-Za-z0-9/\-_{}]*$").expect("Valid regex pattern"));

/// Field errors blocking completion of `step`
pub fn step_errors(step: Step, record: &ConfigRecord) -> FieldErrors {
    match step {
        Step::RouteConfig => route_errors(record),
        Step::SpecSelection => spec_errors(record),
        Step::Transformation => transformation_errors(record),
        Step::DeploymentConfig => deployment_errors(record),
        Step::ReviewDeploy => review_errors(record),
    }
}

pub fn is_step_complete(step: Step, record: &ConfigRecord) -> bool {
    step_errors(step, record).is_empty()
}

pub fn is_valid_route(route: &str) -> bool {
    ROUTE_PATTERN.is_match(route)
}

fn route_errors(record: &ConfigRecord) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if record.route.trim().is_empty() {
        errors.add("route", "API route is required");
    } else if !is_valid_route(&record.route) {
        errors.add(
            "route",
            "API route should start with / and contain valid characters",
        );
    }

    auth_errors(
        &mut errors,
        &record.proxy_auth,
        ("proxyAuth", "Authentication type is required"),
        ("proxyAuthKey", "API key is required for API Key authentication"),
    );
    auth_errors(
        &mut errors,
        &record.target_auth,
        ("targetAuth", "Target authentication type is required"),
        (
            "targetAuthKey",
            "Target API key is required for API Key authentication",
        ),
    );

    if record.target_base_url.trim().is_empty() {
        errors.add("targetBaseUrl", "Target Base URL is required");
    }

    errors
}

fn auth_errors(
    errors: &mut FieldErrors,
    auth: &AuthConfig,
    (type_field, type_message): (&str, &str),
    (key_field, key_message): (&str, &str),
) {
    match auth.kind {
        None => errors.add(type_field, type_message),
        Some(AuthKind::ApiKey) if !auth.has_key() => errors.add(key_field, key_message),
        Some(_) => {}
    }
}

fn spec_errors(record: &ConfigRecord) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_spec(&mut errors, record.input_spec.as_ref(), SpecSide::Input);
    check_spec(&mut errors, record.output_spec.as_ref(), SpecSide::Output);
    errors
}

fn check_spec(errors: &mut FieldErrors, spec: Option<&SpecSource>, side: SpecSide) {
    match spec {
        None => errors.add(side.field(), format!("{side} specification is required")),
        Some(source) => {
            if let Err(message) = source.check(side) {
                errors.add(side.field(), message);
            }
        }
    }
}

fn transformation_errors(record: &ConfigRecord) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if record.converters.as_ref().map_or(true, |c| c.is_empty()) {
        errors.add("converters", "Converters have not been generated");
    }
    errors
}

fn deployment_errors(record: &ConfigRecord) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if record
        .deployment_document
        .as_deref()
        .map_or(true, |doc| doc.trim().is_empty())
    {
        errors.add(
            "deploymentDocument",
            "Deployment document has not been generated",
        );
    }
    errors
}

fn review_errors(record: &ConfigRecord) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if !record.deployed {
        errors.add("deployed", "Deployment has not been performed");
    }
    errors
}
