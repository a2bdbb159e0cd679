//! REST client for the Coolify v1 API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use std::time::Duration;

use super::{
    Application, ApplicationSpec, Credentials, DeployError, Deployment, DeploymentProvider,
    DeploymentState,
};

#[derive(Debug, Deserialize)]
struct ApplicationRecord {
    uuid: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    git_repository: Option<String>,
    #[serde(default)]
    git_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedResource {
    uuid: String,
}

#[derive(Debug, Deserialize)]
struct DeployTriggered {
    deployments: Vec<TriggeredDeployment>,
}

#[derive(Debug, Deserialize)]
struct TriggeredDeployment {
    deployment_uuid: String,
}

#[derive(Debug, Deserialize)]
struct DeploymentRecord {
    status: String,
}

/// `owner/name` for any GitHub URL or shorthand, so stored and configured
/// repositories compare equal.
fn repository_key(repository: &str) -> String {
    let trimmed = repository.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let trimmed = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix("github.com/").unwrap_or(trimmed);
    trimmed.to_lowercase()
}

fn parse_state(status: &str) -> DeploymentState {
    match status {
        "finished" => DeploymentState::Succeeded,
        "failed" | "cancelled-by-user" | "cancelled" => DeploymentState::Failed,
        "queued" => DeploymentState::Queued,
        _ => DeploymentState::InProgress,
    }
}

pub struct CoolifyClient {
    client: Client,
    base_url: String,
    token: String,
    project_uuid: String,
    server_uuid: String,
}

impl CoolifyClient {
    pub fn new(credentials: &Credentials) -> Result<Self, DeployError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: credentials.url.trim_end_matches('/').to_string(),
            token: credentials.token.clone(),
            project_uuid: credentials.project_uuid.clone(),
            server_uuid: credentials.server_uuid.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, DeployError> {
        let response = self.authorized(request).send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(DeployError::Api { status, body })
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, DeployError> {
        Ok(self.send(request).await?.json().await?)
    }
}

#[async_trait]
impl DeploymentProvider for CoolifyClient {
    async fn find_application(
        &self,
        repository: &str,
        branch: &str,
    ) -> Result<Option<Application>, DeployError> {
        let wanted = repository_key(repository);
        let records: Vec<ApplicationRecord> =
            self.json(self.client.get(self.url("/applications"))).await?;

        Ok(records
            .into_iter()
            .find(|r| {
                r.git_repository.as_deref().map(repository_key).as_deref() == Some(wanted.as_str())
                    && r.git_branch.as_deref().unwrap_or("main") == branch
            })
            .map(|r| Application {
                uuid: r.uuid,
                name: r.name,
            }))
    }

    async fn create_application(&self, spec: &ApplicationSpec) -> Result<Application, DeployError> {
        let created: CreatedResource = self
            .json(self.client.post(self.url("/applications/public")).json(&json!({
                "project_uuid": self.project_uuid,
                "server_uuid": self.server_uuid,
                "environment_name": "production",
                "git_repository": spec.repository,
                "git_branch": spec.branch,
                "build_pack": "dockerfile",
                "ports_exposes": spec.port.to_string(),
                "name": spec.name,
                "instant_deploy": false,
            })))
            .await?;

        Ok(Application {
            uuid: created.uuid,
            name: spec.name.clone(),
        })
    }

    async fn set_env(&self, app: &Application, key: &str, value: &str) -> Result<(), DeployError> {
        let path = format!("/applications/{}/envs", app.uuid);
        let body = json!({ "key": key, "value": value, "is_preview": false });

        match self.send(self.client.post(self.url(&path)).json(&body)).await {
            Ok(_) => Ok(()),
            // already defined: overwrite
            Err(DeployError::Api { status, .. }) if status == StatusCode::CONFLICT.as_u16() => {
                self.send(self.client.patch(self.url(&path)).json(&body)).await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn set_domains(
        &self,
        app: &Application,
        domains: &[String],
        force_https: bool,
    ) -> Result<(), DeployError> {
        let scheme = if force_https { "https" } else { "http" };
        let domains = domains
            .iter()
            .map(|d| format!("{}://{}", scheme, d))
            .collect::<Vec<_>>()
            .join(",");

        self.send(
            self.client
                .patch(self.url(&format!("/applications/{}", app.uuid)))
                .json(&json!({
                    "domains": domains,
                    "is_force_https_enabled": force_https,
                })),
        )
        .await?;
        Ok(())
    }

    async fn trigger_deploy(&self, app: &Application) -> Result<Deployment, DeployError> {
        let triggered: DeployTriggered = self
            .json(
                self.client
                    .get(self.url("/deploy"))
                    .query(&[("uuid", app.uuid.as_str()), ("force", "false")]),
            )
            .await?;

        triggered
            .deployments
            .into_iter()
            .next()
            .map(|d| Deployment {
                uuid: d.deployment_uuid,
            })
            .ok_or_else(|| DeployError::UnexpectedResponse("no deployment was queued".to_string()))
    }

    async fn deployment_status(
        &self,
        deployment: &Deployment,
    ) -> Result<DeploymentState, DeployError> {
        let record: DeploymentRecord = self
            .json(
                self.client
                    .get(self.url(&format!("/deployments/{}", deployment.uuid))),
            )
            .await?;
        Ok(parse_state(&record.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode as HttpStatus},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::Value;

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "Bearer test-token")
    }

    /// Minimal stand-in for the Coolify API on a random local port.
    async fn spawn_api() -> String {
        let app = Router::new()
            .route(
                "/api/v1/applications",
                get(|headers: HeaderMap| async move {
                    if !authorized(&headers) {
                        return (HttpStatus::UNAUTHORIZED, Json(json!({"message": "Unauthenticated."})));
                    }
                    (
                        HttpStatus::OK,
                        Json(json!([
                            {"uuid": "other", "name": "other", "git_repository": "someone/else", "git_branch": "main"},
                            {"uuid": "app-1", "name": "benniewilliams-wagtail", "git_repository": "MDsniper/benniewilliams-wagtail", "git_branch": "main"}
                        ])),
                    )
                }),
            )
            .route(
                "/api/v1/applications/{uuid}/envs",
                post(|Path(uuid): Path<String>, Json(body): Json<Value>| async move {
                    if body["key"] == "SECRET_KEY" {
                        (HttpStatus::CONFLICT, Json(json!({"message": "exists"})))
                    } else {
                        (HttpStatus::CREATED, Json(json!({"uuid": uuid})))
                    }
                })
                .patch(|| async { Json(json!({"message": "updated"})) }),
            )
            .route(
                "/api/v1/deploy",
                get(|| async {
                    Json(json!({"deployments": [
                        {"message": "queued", "resource_uuid": "app-1", "deployment_uuid": "dep-9"}
                    ]}))
                }),
            )
            .route(
                "/api/v1/deployments/{uuid}",
                get(|| async { Json(json!({"status": "finished"})) }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(url: String, token: &str) -> CoolifyClient {
        CoolifyClient::new(&Credentials {
            url,
            token: token.to_string(),
            project_uuid: "project".to_string(),
            server_uuid: "server".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_repository_key() {
        assert_eq!(
            repository_key("https://github.com/MDsniper/benniewilliams-wagtail.git"),
            "mdsniper/benniewilliams-wagtail"
        );
        assert_eq!(
            repository_key("MDsniper/benniewilliams-wagtail"),
            repository_key("https://github.com/MDsniper/benniewilliams-wagtail/")
        );
    }

    #[test]
    fn test_parse_state() {
        assert_eq!(parse_state("finished"), DeploymentState::Succeeded);
        assert_eq!(parse_state("failed"), DeploymentState::Failed);
        assert_eq!(parse_state("queued"), DeploymentState::Queued);
        assert_eq!(parse_state("in_progress"), DeploymentState::InProgress);
    }

    #[tokio::test]
    async fn test_find_application_matches_repository() {
        let client = client(spawn_api().await, "test-token");
        let app = client
            .find_application("https://github.com/MDsniper/benniewilliams-wagtail", "main")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(app.uuid, "app-1");

        let none = client
            .find_application("https://github.com/MDsniper/benniewilliams-wagtail", "develop")
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_bad_token_is_api_error() {
        let client = client(spawn_api().await, "wrong");
        let err = client.find_application("a/b", "main").await.unwrap_err();
        assert!(matches!(err, DeployError::Api { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_set_env_overwrites_on_conflict() {
        let client = client(spawn_api().await, "test-token");
        let app = Application {
            uuid: "app-1".to_string(),
            name: "benniewilliams-wagtail".to_string(),
        };
        client.set_env(&app, "SECRET_KEY", "x").await.unwrap();
        client.set_env(&app, "ALLOWED_HOSTS", "localhost").await.unwrap();
    }

    #[tokio::test]
    async fn test_trigger_and_status() {
        let client = client(spawn_api().await, "test-token");
        let app = Application {
            uuid: "app-1".to_string(),
            name: "benniewilliams-wagtail".to_string(),
        };
        let deployment = client.trigger_deploy(&app).await.unwrap();
        assert_eq!(deployment.uuid, "dep-9");
        assert_eq!(
            client.deployment_status(&deployment).await.unwrap(),
            DeploymentState::Succeeded
        );
    }
}
