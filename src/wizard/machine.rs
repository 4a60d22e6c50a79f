//! Wizard state machine
//!
//! Every transition takes `&self` and returns a new [`Wizard`], leaving the
//! original untouched. The current step only moves by one, or by a jump back to
//! a step that has already been reached, and never past an incomplete step.

use super::record::{AuthConfig, ConfigRecord, Converters};
use super::step::Step;
use super::validation::step_errors;
use crate::error::{Error, FieldErrors, Result};
use crate::spec_source::SpecSource;
use tracing::{debug, info, warn};

/// Data submitted for a single step
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    Route {
        route: String,
        proxy_auth: AuthConfig,
        target_auth: AuthConfig,
        target_base_url: String,
    },
    Specs {
        input_spec: Option<SpecSource>,
        output_spec: Option<SpecSource>,
    },
    Converters(Converters),
    DeploymentDocument(String),
    Deploy {
        deployed: bool,
    },
}

impl StepInput {
    /// The step this input belongs to
    pub fn step(&self) -> Step {
        match self {
            StepInput::Route { .. } => Step::RouteConfig,
            StepInput::Specs { .. } => Step::SpecSelection,
            StepInput::Converters(_) => Step::Transformation,
            StepInput::DeploymentDocument(_) => Step::DeploymentConfig,
            StepInput::Deploy { .. } => Step::ReviewDeploy,
        }
    }

    fn merge_into(self, record: &mut ConfigRecord) {
        match self {
            StepInput::Route {
                route,
                proxy_auth,
                target_auth,
                target_base_url,
            } => {
                record.route = route;
                record.proxy_auth = proxy_auth;
                record.target_auth = target_auth;
                record.target_base_url = target_base_url;
            }
            StepInput::Specs {
                input_spec,
                output_spec,
            } => {
                if let Some(spec) = &input_spec {
                    record.input_api = spec.api_name();
                }
                if let Some(spec) = &output_spec {
                    record.output_api = spec.api_name();
                }
                record.input_spec = input_spec;
                record.output_spec = output_spec;
            }
            StepInput::Converters(converters) => record.converters = Some(converters),
            StepInput::DeploymentDocument(document) => {
                record.deployment_document = Some(document)
            }
            StepInput::Deploy { deployed } => record.deployed = deployed,
        }
    }
}

/// Permission to run one transformation for the current mount of the
/// Transformation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformTicket {
    generation: u64,
}

impl TransformTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Bookkeeping for the Transformation step's single automatic trigger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TransformMount {
    generation: u64,
    ticket_issued: bool,
    pending: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wizard {
    record: ConfigRecord,
    current: Step,
    highest_reached: Step,
    transform: TransformMount,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self::with_record(ConfigRecord::default())
    }

    /// Start a wizard at the first step with a pre-filled record
    pub fn with_record(record: ConfigRecord) -> Self {
        Self {
            record,
            current: Step::INITIAL,
            highest_reached: Step::INITIAL,
            transform: TransformMount::default(),
        }
    }

    pub fn record(&self) -> &ConfigRecord {
        &self.record
    }

    pub fn into_record(self) -> ConfigRecord {
        self.record
    }

    pub fn current_step(&self) -> Step {
        self.current
    }

    pub fn current_index(&self) -> usize {
        self.current.index()
    }

    pub fn highest_reached(&self) -> Step {
        self.highest_reached
    }

    /// Transformation mount generation, bumped on every mount and manual retry
    pub fn transform_generation(&self) -> u64 {
        self.transform.generation
    }

    /// Errors keeping the current step from being complete
    pub fn current_errors(&self) -> FieldErrors {
        step_errors(self.current, &self.record)
    }

    pub fn is_current_complete(&self) -> bool {
        self.current_errors().is_empty()
    }

    pub fn formatted_route(&self) -> String {
        self.record.formatted_route()
    }

    pub fn summary(&self) -> String {
        self.record.summary()
    }

    /// Move to the next step. A no-op on the last step.
    pub fn advance(&self) -> Result<Wizard> {
        let Some(next) = self.current.next() else {
            debug!("Already on the last step, advance ignored");
            return Ok(self.clone());
        };

        let errors = self.current_errors();
        if !errors.is_empty() {
            debug!(step = %self.current, %errors, "Advance rejected");
            return Err(Error::StepIncomplete(self.current.title().to_string()));
        }

        Ok(self.move_to(next))
    }

    /// Move to the previous step. A no-op on the first step.
    pub fn retreat(&self) -> Wizard {
        match self.current.previous() {
            Some(previous) => self.move_to(previous),
            None => {
                debug!("Already on the first step, retreat ignored");
                self.clone()
            }
        }
    }

    /// Jump to any step that has already been reached.
    pub fn jump_to(&self, index: usize) -> Result<Wizard> {
        match Step::from_index(index) {
            Some(target) if target <= self.highest_reached => {
                if target == self.current {
                    Ok(self.clone())
                } else {
                    Ok(self.move_to(target))
                }
            }
            _ => Err(Error::StepNotReached {
                requested: index,
                highest: self.highest_reached.index(),
            }),
        }
    }

    /// Validate `input` for the step at `index`, merge it and advance.
    ///
    /// On failure nothing changes and the per-field errors are returned. On the
    /// last step a successful submission merges without moving.
    pub fn submit_step(&self, index: usize, input: StepInput) -> Result<Wizard> {
        if index != self.current.index() || input.step() != self.current {
            return Err(Error::StepMismatch {
                submitted: if index != self.current.index() {
                    index
                } else {
                    input.step().index()
                },
                current: self.current.index(),
            });
        }

        let mut record = self.record.clone();
        input.merge_into(&mut record);

        let errors = step_errors(self.current, &record);
        if !errors.is_empty() {
            debug!(step = %self.current, %errors, "Step submission rejected");
            return Err(Error::Validation(errors));
        }

        info!(step = %self.current, "Step completed");
        let merged = Wizard {
            record,
            ..self.clone()
        };
        Ok(match self.current.next() {
            Some(next) => merged.move_to(next),
            None => merged,
        })
    }

    /// Hand out the ticket for the automatic transformation of this mount.
    ///
    /// Yields a ticket at most once per mount, and only on the Transformation step.
    pub fn take_transform_ticket(&self) -> (Wizard, Option<TransformTicket>) {
        if self.current != Step::Transformation || self.transform.ticket_issued {
            return (self.clone(), None);
        }

        let mut next = self.clone();
        next.transform.ticket_issued = true;
        next.transform.pending = Some(next.transform.generation);
        let ticket = TransformTicket {
            generation: next.transform.generation,
        };
        debug!(generation = ticket.generation, "Issued transformation ticket");
        (next, Some(ticket))
    }

    /// Start a manual retry: supersede any outstanding ticket and issue a new one.
    pub fn retry_transformation(&self) -> Result<(Wizard, TransformTicket)> {
        if self.current != Step::Transformation {
            return Err(Error::StepMismatch {
                submitted: Step::Transformation.index(),
                current: self.current.index(),
            });
        }

        let mut next = self.clone();
        next.transform.generation += 1;
        next.transform.ticket_issued = true;
        next.transform.pending = Some(next.transform.generation);
        let ticket = TransformTicket {
            generation: next.transform.generation,
        };
        info!(generation = ticket.generation, "Retrying transformation");
        Ok((next, ticket))
    }

    /// Merge converters produced under `ticket`.
    ///
    /// Returns `None` when the result is stale: the wizard left the step, was
    /// remounted or retried since the ticket was issued, or the ticket was
    /// already used.
    pub fn apply_transform_result(
        &self,
        ticket: TransformTicket,
        converters: Converters,
    ) -> Option<Wizard> {
        if self.current != Step::Transformation || self.transform.pending != Some(ticket.generation)
        {
            warn!(
                ticket = ticket.generation,
                current = self.transform.generation,
                step = %self.current,
                "Discarding stale transformation result"
            );
            return None;
        }

        let mut next = self.clone();
        next.record.converters = Some(converters);
        next.transform.pending = None;
        info!(generation = ticket.generation, "Converters generated");
        Some(next)
    }

    fn move_to(&self, target: Step) -> Wizard {
        let mut next = self.clone();
        if target == Step::Transformation && self.current != Step::Transformation {
            next.transform = TransformMount {
                generation: self.transform.generation + 1,
                ticket_issued: false,
                pending: None,
            };
        }
        next.current = target;
        next.highest_reached = self.highest_reached.max(target);
        debug!(from = %self.current, to = %target, "Wizard step changed");
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::record::{REQUEST_CONVERTER, RESPONSE_CONVERTER};
    use std::path::PathBuf;

    fn route_input() -> StepInput {
        StepInput::Route {
            route: "/api/{inputApi}/{outputApi}".to_string(),
            proxy_auth: AuthConfig::api_key("proxy-key-000123"),
            target_auth: AuthConfig::none(),
            target_base_url: "https://target.example.com".to_string(),
        }
    }

    fn spec_input() -> StepInput {
        StepInput::Specs {
            input_spec: Some(SpecSource::File {
                path: PathBuf::from("specs/Legacy.json"),
                name: None,
            }),
            output_spec: Some(SpecSource::Camara {
                name: "device-roaming-status.yaml".to_string(),
                path: "code/API_definitions/device-roaming-status.yaml".to_string(),
                repo: "DeviceStatus".to_string(),
            }),
        }
    }

    fn converters(tag: &str) -> Converters {
        let mut converters = Converters::new();
        converters.insert(REQUEST_CONVERTER.to_string(), format!("request {tag}"));
        converters.insert(RESPONSE_CONVERTER.to_string(), format!("response {tag}"));
        converters
    }

    fn at_transformation() -> Wizard {
        Wizard::new()
            .submit_step(0, route_input())
            .unwrap()
            .submit_step(1, spec_input())
            .unwrap()
    }

    #[test]
    fn test_new_wizard_starts_at_route_config() {
        let wizard = Wizard::new();
        assert_eq!(wizard.current_step(), Step::RouteConfig);
        assert_eq!(wizard.highest_reached(), Step::RouteConfig);
        assert!(!wizard.is_current_complete());
    }

    #[test]
    fn test_submit_incomplete_route_does_not_advance() {
        let wizard = Wizard::new();
        let input = StepInput::Route {
            route: String::new(),
            proxy_auth: AuthConfig::none(),
            target_auth: AuthConfig::none(),
            target_base_url: "https://target.example.com".to_string(),
        };

        let err = wizard.submit_step(0, input).unwrap_err();
        let errors = err.field_errors().unwrap();

        assert!(!errors.is_empty());
        assert_eq!(errors.get("route"), Some("API route is required"));
        assert_eq!(wizard.current_index(), 0);
        assert_eq!(wizard.record(), &ConfigRecord::default());
    }

    #[test]
    fn test_submit_step_index_must_match() {
        let err = Wizard::new().submit_step(1, spec_input()).unwrap_err();
        assert!(matches!(
            err,
            Error::StepMismatch {
                submitted: 1,
                current: 0
            }
        ));

        let err = Wizard::new().submit_step(0, spec_input()).unwrap_err();
        assert!(matches!(err, Error::StepMismatch { submitted: 1, .. }));
    }

    #[test]
    fn test_submit_merges_and_derives_api_names() {
        let wizard = at_transformation();

        assert_eq!(wizard.current_step(), Step::Transformation);
        assert_eq!(wizard.record().input_api, "Legacy");
        assert_eq!(wizard.record().output_api, "device-roaming-status");
        assert_eq!(
            wizard.formatted_route(),
            "/api/legacy/device-roaming-status"
        );
    }

    #[test]
    fn test_transitions_leave_original_untouched() {
        let start = Wizard::new();
        let next = start.submit_step(0, route_input()).unwrap();

        assert_eq!(start.current_index(), 0);
        assert_eq!(start.record().route, "");
        assert_eq!(next.current_index(), 1);
    }

    #[test]
    fn test_jump_beyond_reached_is_rejected() {
        let wizard = Wizard::new();
        let err = wizard.jump_to(3).unwrap_err();

        assert!(matches!(
            err,
            Error::StepNotReached {
                requested: 3,
                highest: 0
            }
        ));
        assert_eq!(wizard.current_index(), 0);
        assert!(wizard.jump_to(9).is_err());
    }

    #[test]
    fn test_jump_back_and_forward_within_reached() {
        let wizard = at_transformation();
        let back = wizard.jump_to(0).unwrap();
        assert_eq!(back.current_step(), Step::RouteConfig);
        assert_eq!(back.highest_reached(), Step::Transformation);

        let forward = back.jump_to(2).unwrap();
        assert_eq!(forward.current_step(), Step::Transformation);
    }

    #[test]
    fn test_advance_requires_complete_step() {
        let err = Wizard::new().advance().unwrap_err();
        assert!(matches!(err, Error::StepIncomplete(_)));

        let wizard = at_transformation().retreat();
        assert_eq!(wizard.current_step(), Step::SpecSelection);
        let advanced = wizard.advance().unwrap();
        assert_eq!(advanced.current_step(), Step::Transformation);
    }

    #[test]
    fn test_retreat_is_noop_at_start() {
        let wizard = Wizard::new();
        assert_eq!(wizard.retreat(), wizard);
    }

    #[test]
    fn test_full_walk_to_deploy() {
        let (wizard, ticket) = at_transformation().take_transform_ticket();
        let wizard = wizard
            .apply_transform_result(ticket.unwrap(), converters("a"))
            .unwrap()
            .advance()
            .unwrap();
        assert_eq!(wizard.current_step(), Step::DeploymentConfig);

        let wizard = wizard
            .submit_step(3, StepInput::DeploymentDocument("<api-config/>".to_string()))
            .unwrap();
        assert_eq!(wizard.current_step(), Step::ReviewDeploy);

        let err = wizard
            .submit_step(4, StepInput::Deploy { deployed: false })
            .unwrap_err();
        assert!(err.field_errors().unwrap().contains("deployed"));

        let done = wizard
            .submit_step(4, StepInput::Deploy { deployed: true })
            .unwrap();
        assert_eq!(done.current_step(), Step::ReviewDeploy);
        assert!(done.record().deployed);
        assert_eq!(done.advance().unwrap(), done);
    }

    #[test]
    fn test_ticket_is_issued_once_per_mount() {
        let wizard = at_transformation();
        let (wizard, first) = wizard.take_transform_ticket();
        let (wizard, second) = wizard.take_transform_ticket();

        assert!(first.is_some());
        assert!(second.is_none());

        // leaving and re-entering mounts the step again
        let remounted = wizard.retreat().advance().unwrap();
        let (_, third) = remounted.take_transform_ticket();
        let third = third.unwrap();
        assert!(third.generation() > first.unwrap().generation());
    }

    #[test]
    fn test_no_ticket_outside_transformation() {
        let (_, ticket) = Wizard::new().take_transform_ticket();
        assert!(ticket.is_none());
        assert!(Wizard::new().retry_transformation().is_err());
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let (wizard, ticket) = at_transformation().take_transform_ticket();
        let old = ticket.unwrap();

        let (wizard, fresh) = wizard.retry_transformation().unwrap();
        assert!(fresh.generation() > old.generation());
        assert!(wizard
            .apply_transform_result(old, converters("old"))
            .is_none());

        let applied = wizard
            .apply_transform_result(fresh, converters("new"))
            .unwrap();
        assert_eq!(applied.record().converter(REQUEST_CONVERTER), "request new");

        // a ticket only applies once
        assert!(applied
            .apply_transform_result(fresh, converters("again"))
            .is_none());
    }

    #[test]
    fn test_result_after_leaving_step_is_discarded() {
        let (wizard, ticket) = at_transformation().take_transform_ticket();
        let left = wizard.retreat();

        assert!(left
            .apply_transform_result(ticket.unwrap(), converters("late"))
            .is_none());
        assert!(left.record().converters.is_none());
    }

    #[test]
    fn test_retry_overwrites_converters() {
        let (wizard, ticket) = at_transformation().take_transform_ticket();
        let wizard = wizard
            .apply_transform_result(ticket.unwrap(), converters("first"))
            .unwrap();

        let (wizard, ticket) = wizard.retry_transformation().unwrap();
        let wizard = wizard
            .apply_transform_result(ticket, converters("second"))
            .unwrap();

        assert_eq!(wizard.record().converters, Some(converters("second")));
    }
}
