/*!
 * Deployment
 * Pushes the site to a hosting platform: locate or create the application,
 * configure it, trigger a build and wait for the result
 */
pub mod coolify;

use async_trait::async_trait;
use rand::Rng;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

pub const REPOSITORY: &str = "https://github.com/MDsniper/benniewilliams-wagtail";
pub const BRANCH: &str = "main";
pub const APPLICATION_NAME: &str = "benniewilliams-wagtail";
pub const APPLICATION_PORT: u16 = 8000;
pub const DOMAINS: &[&str] = &["benniewilliams.com", "www.benniewilliams.com"];
pub const ALLOWED_HOSTS: &str = "benniewilliams.com,www.benniewilliams.com,localhost";
pub const SECRET_KEY_LENGTH: usize = 50;

const SECRET_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("missing setting {0}")]
    MissingSetting(&'static str),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("unexpected provider response: {0}")]
    UnexpectedResponse(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

// ============================================================================
// Provider interface
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub uuid: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub uuid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentState {
    Queued,
    InProgress,
    Succeeded,
    Failed,
}

/// What to create when the application does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationSpec {
    pub name: String,
    pub repository: String,
    pub branch: String,
    pub port: u16,
}

#[async_trait]
pub trait DeploymentProvider: Send + Sync {
    /// Application bound to `repository` and `branch`, if any.
    async fn find_application(
        &self,
        repository: &str,
        branch: &str,
    ) -> Result<Option<Application>, DeployError>;

    async fn create_application(&self, spec: &ApplicationSpec) -> Result<Application, DeployError>;

    /// Create or overwrite one environment variable.
    async fn set_env(&self, app: &Application, key: &str, value: &str) -> Result<(), DeployError>;

    async fn set_domains(
        &self,
        app: &Application,
        domains: &[String],
        force_https: bool,
    ) -> Result<(), DeployError>;

    async fn trigger_deploy(&self, app: &Application) -> Result<Deployment, DeployError>;

    async fn deployment_status(&self, deployment: &Deployment)
        -> Result<DeploymentState, DeployError>;
}

// ============================================================================
// Plan
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub application: ApplicationSpec,
    pub env: Vec<(String, String)>,
    pub domains: Vec<String>,
    pub force_https: bool,
    pub poll: PollSettings,
}

impl DeployPlan {
    /// The production deployment of the site with a fresh secret.
    pub fn production(secret_key: String) -> Self {
        Self {
            application: ApplicationSpec {
                name: APPLICATION_NAME.to_string(),
                repository: REPOSITORY.to_string(),
                branch: BRANCH.to_string(),
                port: APPLICATION_PORT,
            },
            env: vec![
                ("SECRET_KEY".to_string(), secret_key),
                ("ALLOWED_HOSTS".to_string(), ALLOWED_HOSTS.to_string()),
                ("ENVIRONMENT".to_string(), "production".to_string()),
            ],
            domains: DOMAINS.iter().map(|d| d.to_string()).collect(),
            force_https: true,
            poll: PollSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    Succeeded,
    Failed,
    TimedOut,
}

/// Random secret drawn from ASCII letters, digits and punctuation.
pub fn generate_secret_key() -> String {
    let mut rng = rand::rng();
    (0..SECRET_KEY_LENGTH)
        .map(|_| SECRET_CHARSET[rng.random_range(0..SECRET_CHARSET.len())] as char)
        .collect()
}

// ============================================================================
// Orchestration
// ============================================================================

pub async fn deploy(
    provider: &dyn DeploymentProvider,
    plan: &DeployPlan,
) -> Result<DeployOutcome, DeployError> {
    let spec = &plan.application;

    let app = match provider.find_application(&spec.repository, &spec.branch).await? {
        Some(app) => {
            tracing::info!(uuid = %app.uuid, "Found existing application {}", app.name);
            app
        }
        None => {
            tracing::info!("Creating application {}", spec.name);
            provider.create_application(spec).await?
        }
    };

    for (key, value) in &plan.env {
        provider.set_env(&app, key, value).await?;
        tracing::info!(key = %key, "Environment variable set");
    }

    provider.set_domains(&app, &plan.domains, plan.force_https).await?;
    tracing::info!(domains = ?plan.domains, force_https = plan.force_https, "Domains configured");

    let deployment = provider.trigger_deploy(&app).await?;
    tracing::info!(deployment = %deployment.uuid, "Deployment triggered");

    wait_for_deployment(provider, &deployment, plan.poll).await
}

/// Poll until the deployment finishes or `poll.max_wait` elapses.
pub async fn wait_for_deployment(
    provider: &dyn DeploymentProvider,
    deployment: &Deployment,
    poll: PollSettings,
) -> Result<DeployOutcome, DeployError> {
    let deadline = Instant::now() + poll.max_wait;

    loop {
        match provider.deployment_status(deployment).await? {
            DeploymentState::Succeeded => return Ok(DeployOutcome::Succeeded),
            DeploymentState::Failed => return Ok(DeployOutcome::Failed),
            state => tracing::debug!(?state, "Deployment still running"),
        }

        if Instant::now() + poll.interval > deadline {
            return Ok(DeployOutcome::TimedOut);
        }
        tokio::time::sleep(poll.interval).await;
    }
}

// ============================================================================
// Command
// ============================================================================

#[derive(Debug, Clone)]
pub struct Credentials {
    pub url: String,
    pub token: String,
    pub project_uuid: String,
    pub server_uuid: String,
}

impl Credentials {
    /// Read from the environment, asking on the terminal for anything missing.
    pub fn from_env_or_prompt() -> Result<Self, DeployError> {
        Ok(Self {
            url: setting("COOLIFY_URL", "Enter Coolify URL (e.g., https://coolify.yourdomain.com): ")?,
            token: setting("COOLIFY_TOKEN", "Enter Coolify API token: ")?,
            project_uuid: setting("COOLIFY_PROJECT_UUID", "Enter Coolify project UUID: ")?,
            server_uuid: setting("COOLIFY_SERVER_UUID", "Enter Coolify server UUID: ")?,
        })
    }
}

fn setting(name: &'static str, prompt: &str) -> Result<String, DeployError> {
    if let Ok(value) = std::env::var(name) {
        if !value.trim().is_empty() {
            return Ok(value.trim().to_string());
        }
    }

    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    let value = line.trim();
    if value.is_empty() {
        return Err(DeployError::MissingSetting(name));
    }
    Ok(value.to_string())
}

async fn run_deploy() -> Result<DeployOutcome, DeployError> {
    let credentials = Credentials::from_env_or_prompt()?;
    let client = coolify::CoolifyClient::new(&credentials)?;

    let secret_key = generate_secret_key();
    println!("Generated SECRET_KEY: {}...", &secret_key[..10]);

    deploy(&client, &DeployPlan::production(secret_key)).await
}

/// Entry point of the `deploy-coolify` command. Errors are reported, never retried.
pub async fn run_command() -> bool {
    println!("=== Coolify Deployment ===\n");

    match run_deploy().await {
        Ok(DeployOutcome::Succeeded) => {
            println!("Deployment successful!");
            println!("Site should be available at: https://{}", DOMAINS[0]);
            println!("\nSecret key saved in the application environment - keep it secure!");
            true
        }
        Ok(DeployOutcome::Failed) => {
            println!("Deployment failed. Check the platform logs for details.");
            false
        }
        Ok(DeployOutcome::TimedOut) => {
            println!("Deployment did not finish within the wait limit. Check the platform.");
            false
        }
        Err(e) => {
            tracing::error!(error = %e, "deployment failed");
            println!("Error during deployment: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every call and replays a scripted list of statuses.
    struct FakeProvider {
        existing: Option<Application>,
        statuses: Mutex<Vec<DeploymentState>>,
        calls: Mutex<Vec<String>>,
        fail_env: bool,
    }

    impl FakeProvider {
        fn new(existing: Option<Application>, statuses: Vec<DeploymentState>) -> Self {
            Self {
                existing,
                statuses: Mutex::new(statuses),
                calls: Mutex::new(Vec::new()),
                fail_env: false,
            }
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DeploymentProvider for FakeProvider {
        async fn find_application(
            &self,
            repository: &str,
            branch: &str,
        ) -> Result<Option<Application>, DeployError> {
            self.record(format!("find {} {}", repository, branch));
            Ok(self.existing.clone())
        }

        async fn create_application(&self, spec: &ApplicationSpec) -> Result<Application, DeployError> {
            self.record(format!("create {}", spec.name));
            Ok(Application {
                uuid: "new-app".to_string(),
                name: spec.name.clone(),
            })
        }

        async fn set_env(&self, app: &Application, key: &str, _value: &str) -> Result<(), DeployError> {
            if self.fail_env {
                return Err(DeployError::Api {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            self.record(format!("env {} {}", app.uuid, key));
            Ok(())
        }

        async fn set_domains(
            &self,
            app: &Application,
            domains: &[String],
            force_https: bool,
        ) -> Result<(), DeployError> {
            self.record(format!("domains {} {} {}", app.uuid, domains.join(","), force_https));
            Ok(())
        }

        async fn trigger_deploy(&self, app: &Application) -> Result<Deployment, DeployError> {
            self.record(format!("deploy {}", app.uuid));
            Ok(Deployment {
                uuid: "dep-1".to_string(),
            })
        }

        async fn deployment_status(
            &self,
            _deployment: &Deployment,
        ) -> Result<DeploymentState, DeployError> {
            self.record("status".to_string());
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                Ok(statuses.remove(0))
            } else {
                Ok(statuses[0])
            }
        }
    }

    fn fast_plan() -> DeployPlan {
        let mut plan = DeployPlan::production(generate_secret_key());
        plan.poll = PollSettings {
            interval: Duration::from_millis(5),
            max_wait: Duration::from_millis(100),
        };
        plan
    }

    #[test]
    fn test_secret_key_shape() {
        let key = generate_secret_key();
        assert_eq!(key.chars().count(), SECRET_KEY_LENGTH);
        assert!(key.chars().all(|c| c.is_ascii_graphic()));
        assert_ne!(key, generate_secret_key());
    }

    #[test]
    fn test_production_plan() {
        let plan = DeployPlan::production("s".repeat(50));
        assert_eq!(plan.application.repository, REPOSITORY);
        assert_eq!(plan.application.port, 8000);
        assert!(plan.force_https);
        assert_eq!(plan.domains, vec!["benniewilliams.com", "www.benniewilliams.com"]);
        assert!(plan.env.iter().any(|(k, v)| k == "ALLOWED_HOSTS" && v == ALLOWED_HOSTS));
        assert_eq!(plan.poll, PollSettings::default());
    }

    #[tokio::test]
    async fn test_creates_missing_application() {
        let provider = FakeProvider::new(None, vec![DeploymentState::Succeeded]);
        let outcome = deploy(&provider, &fast_plan()).await.unwrap();
        assert_eq!(outcome, DeployOutcome::Succeeded);

        let calls = provider.calls();
        assert_eq!(calls[0], format!("find {} main", REPOSITORY));
        assert_eq!(calls[1], "create benniewilliams-wagtail");
        assert_eq!(calls[2], "env new-app SECRET_KEY");
        assert!(calls.contains(&"domains new-app benniewilliams.com,www.benniewilliams.com true".to_string()));
        assert!(calls.contains(&"deploy new-app".to_string()));
    }

    #[tokio::test]
    async fn test_reuses_existing_application() {
        let existing = Application {
            uuid: "app-1".to_string(),
            name: APPLICATION_NAME.to_string(),
        };
        let provider = FakeProvider::new(
            Some(existing),
            vec![DeploymentState::Queued, DeploymentState::InProgress, DeploymentState::Failed],
        );
        let outcome = deploy(&provider, &fast_plan()).await.unwrap();
        assert_eq!(outcome, DeployOutcome::Failed);

        let calls = provider.calls();
        assert!(!calls.iter().any(|c| c.starts_with("create")));
        assert_eq!(calls.iter().filter(|c| *c == "status").count(), 3);
    }

    #[tokio::test]
    async fn test_times_out_while_running() {
        let provider = FakeProvider::new(None, vec![DeploymentState::InProgress]);
        let outcome = deploy(&provider, &fast_plan()).await.unwrap();
        assert_eq!(outcome, DeployOutcome::TimedOut);
    }

    #[tokio::test]
    async fn test_error_stops_flow_without_deploying() {
        let mut provider = FakeProvider::new(None, vec![DeploymentState::Succeeded]);
        provider.fail_env = true;
        let err = deploy(&provider, &fast_plan()).await.unwrap_err();
        assert!(matches!(err, DeployError::Api { status: 500, .. }));
        assert!(!provider.calls().iter().any(|c| c.starts_with("deploy")));
    }
}
