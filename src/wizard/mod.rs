//! Five-step configuration wizard

pub mod machine;
pub mod record;
pub mod step;
pub mod validation;

pub use machine::{StepInput, TransformTicket, Wizard};
pub use record::{
    mask_key, AuthConfig, AuthKind, ConfigRecord, Converters, REQUEST_CONVERTER,
    RESPONSE_CONVERTER,
};
pub use step::Step;
pub use validation::{is_step_complete, is_valid_route, step_errors};
