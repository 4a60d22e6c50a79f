use serde::{Deserialize, Serialize};
use std::fmt;

/// Wizard steps in presentation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    RouteConfig,
    SpecSelection,
    Transformation,
    DeploymentConfig,
    ReviewDeploy,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::RouteConfig,
        Step::SpecSelection,
        Step::Transformation,
        Step::DeploymentConfig,
        Step::ReviewDeploy,
    ];

    pub const INITIAL: Step = Step::RouteConfig;
    pub const TERMINAL: Step = Step::ReviewDeploy;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Step> {
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Option<Step> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Step> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn is_terminal(self) -> bool {
        self == Self::TERMINAL
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::RouteConfig => "Route Configuration",
            Step::SpecSelection => "API Specifications",
            Step::Transformation => "Transformation",
            Step::DeploymentConfig => "Deployment Configuration",
            Step::ReviewDeploy => "Review & Deploy",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
