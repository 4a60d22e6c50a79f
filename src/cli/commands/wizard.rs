//! Headless wizard run driven by a session file

use crate::config::Settings;
use crate::deploy::{generate_deployment_document, Deployer};
use crate::spec_source::{HttpSpecFetcher, SpecFetcher, SpecSource};
use crate::transform::{HttpTransformClient, TransformController};
use crate::wizard::{AuthConfig, StepInput, Wizard};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Wizard inputs read from a YAML session file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WizardSession {
    pub route: String,
    #[serde(default)]
    pub proxy_auth: AuthConfig,
    #[serde(default)]
    pub target_auth: AuthConfig,
    #[serde(default)]
    pub target_base_url: String,
    pub input_spec: Option<SpecSource>,
    pub output_spec: Option<SpecSource>,
}

impl WizardSession {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read session file {}", path.display()))?;
        let mut session: WizardSession = serde_yaml::from_str(&content)
            .map_err(crate::error::Error::from)
            .with_context(|| format!("Invalid session file {}", path.display()))?;

        if let Some(base) = path.parent() {
            session.resolve_paths(base);
        }
        Ok(session)
    }

    /// Make relative specification file paths relative to `base`
    fn resolve_paths(&mut self, base: &Path) {
        for spec in [&mut self.input_spec, &mut self.output_spec]
            .into_iter()
            .flatten()
        {
            if let SpecSource::File { path, .. } = spec {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }
}

pub struct WizardParams {
    pub session: PathBuf,
    pub output: Option<PathBuf>,
    pub no_deploy: bool,
    pub settings: Settings,
}

pub async fn run_wizard_command(params: WizardParams) -> Result<()> {
    let session = WizardSession::load(&params.session).await?;
    let settings = &params.settings;

    let fetcher = HttpSpecFetcher::new(settings.request_timeout())?;
    let client = HttpTransformClient::new(&settings.transform_url, settings.request_timeout())?;
    let controller = TransformController::new(Arc::new(client));
    let deployer = Deployer::new(settings.deployment_test_delay(), settings.deploy_delay());

    let wizard = run_steps(
        session,
        &controller,
        &fetcher,
        &deployer,
        settings,
        params.no_deploy,
    )
    .await?;

    let record = wizard.record();
    println!("{}", record.summary());
    if let Some(document) = &record.deployment_document {
        println!("\n{document}");
        if let Some(output) = &params.output {
            tokio::fs::write(output, document)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(path = %output.display(), "Deployment document written");
        }
    }
    Ok(())
}

/// Drive all wizard steps for `session`.
pub async fn run_steps(
    session: WizardSession,
    controller: &TransformController,
    fetcher: &dyn SpecFetcher,
    deployer: &Deployer,
    settings: &Settings,
    no_deploy: bool,
) -> Result<Wizard> {
    let wizard = Wizard::new()
        .submit_step(
            0,
            StepInput::Route {
                route: session.route,
                proxy_auth: session.proxy_auth,
                target_auth: session.target_auth,
                target_base_url: session.target_base_url,
            },
        )?
        .submit_step(
            1,
            StepInput::Specs {
                input_spec: session.input_spec,
                output_spec: session.output_spec,
            },
        )?;

    let (wizard, ticket) = wizard.take_transform_ticket();
    let ticket = ticket.ok_or_else(|| anyhow!("Transformation was already started"))?;
    let wizard = controller
        .run_for_ticket(&wizard, ticket, fetcher, &settings.camara_raw_base)
        .await
        .context("Failed to generate converters")?
        .advance()?;

    let document = generate_deployment_document(wizard.record())?;
    deployer.test_deployment(&document).await?;
    let wizard = wizard.submit_step(
        wizard.current_index(),
        StepInput::DeploymentDocument(document),
    )?;

    if no_deploy {
        return Ok(wizard);
    }

    let result = deployer.deploy(wizard.record()).await?;
    println!(
        "Deployed {} as {} at {}",
        wizard.formatted_route(),
        result.deployment_id,
        result.deployed_at.to_rfc3339()
    );
    Ok(wizard.submit_step(
        wizard.current_index(),
        StepInput::Deploy {
            deployed: result.success,
        },
    )?)
}
