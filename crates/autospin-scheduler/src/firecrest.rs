use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use autospin_model::{JobId, JobState, ObservedJob};

use crate::client::{JobSubmission, SchedulerClient, SystemInfo};
use crate::config::SchedulerConfig;
use crate::errors::SchedulerError;

/// FirecREST v2 client authenticated with the OAuth2 client-credentials grant.
///
/// The token is fetched once in [`FirecrestClient::connect`] and reused for every call;
/// a reconciliation pass is short enough not to outlive it.
pub struct FirecrestClient {
    http: Client,
    base: String,
    token: String,
}

impl FirecrestClient {
    /// Build the HTTP client and perform the auth handshake.
    #[instrument(level = "debug", skip(cfg), fields(endpoint = %cfg.endpoint))]
    pub async fn connect(cfg: &SchedulerConfig) -> Result<Self, SchedulerError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()?;
        let token = fetch_token(&http, cfg).await?;
        debug!("obtained scheduler access token");

        Ok(Self {
            http,
            base: cfg.endpoint.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.token)
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

async fn fetch_token(http: &Client, cfg: &SchedulerConfig) -> Result<String, SchedulerError> {
    let form = TokenRequest {
        grant_type: "client_credentials",
        client_id: &cfg.client_id,
        client_secret: cfg.client_secret.expose(),
    };
    let response = http.post(&cfg.token_uri).form(&form).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SchedulerError::Auth(format!("token endpoint returned {status}: {body}")));
    }
    let token: TokenResponse = parse_json(response).await?;
    if token.access_token.is_empty() {
        return Err(SchedulerError::Auth("token endpoint returned an empty token".into()));
    }
    Ok(token.access_token)
}

#[derive(Deserialize)]
struct SystemsResponse {
    #[serde(default)]
    systems: Vec<SystemInfo>,
}

#[derive(Deserialize)]
struct JobsResponse {
    #[serde(default)]
    jobs: Option<Vec<JobRecord>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobRecord {
    job_id: u64,
    name: String,
    status: JobStatusRecord,
}

#[derive(Deserialize)]
struct JobStatusRecord {
    state: JobState,
}

impl From<JobRecord> for ObservedJob {
    fn from(r: JobRecord) -> Self {
        ObservedJob::new(JobId(r.job_id), r.name, r.status.state)
    }
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    job: JobDescription<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JobDescription<'a> {
    name: &'a str,
    script: &'a str,
    working_directory: &'a str,
    account: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    #[serde(default)]
    job_id: Option<u64>,
}

#[async_trait]
impl SchedulerClient for FirecrestClient {
    #[instrument(level = "debug", skip(self))]
    async fn systems(&self) -> Result<Vec<SystemInfo>, SchedulerError> {
        let response = self
            .authed(self.http.get(self.url("/status/systems")))
            .send()
            .await?;
        let body: SystemsResponse = parse_json(check(response).await?).await?;
        Ok(body.systems)
    }

    #[instrument(level = "debug", skip(self))]
    async fn list_jobs(
        &self,
        system: &str,
        all_users: bool,
    ) -> Result<Vec<ObservedJob>, SchedulerError> {
        let response = self
            .authed(self.http.get(self.url(&format!("/compute/{system}/jobs"))))
            .query(&[("allusers", all_users)])
            .send()
            .await?;
        let body: JobsResponse = parse_json(check(response).await?).await?;

        let jobs: Vec<ObservedJob> = body
            .jobs
            .unwrap_or_default()
            .into_iter()
            .map(ObservedJob::from)
            .collect();
        trace!(count = jobs.len(), "listed jobs");
        Ok(jobs)
    }

    #[instrument(level = "debug", skip(self, job), fields(system = job.system, job = %job.name))]
    async fn submit(&self, job: JobSubmission<'_>) -> Result<Option<JobId>, SchedulerError> {
        let body = SubmitBody {
            job: JobDescription {
                name: job.name.as_str(),
                script: job.script,
                working_directory: job.working_dir,
                account: job.account,
            },
        };
        let response = self
            .authed(self.http.post(self.url(&format!("/compute/{}/jobs", job.system))))
            .json(&body)
            .send()
            .await?;
        let response = check(response).await?;

        // The job is queued once the scheduler answered 2xx; an odd body only loses the id.
        match parse_json::<SubmitResponse>(response).await {
            Ok(body) => Ok(body.job_id.map(JobId)),
            Err(e) => {
                warn!(error = %e, "job accepted but submit response is unreadable");
                Ok(None)
            }
        }
    }

    #[instrument(level = "debug", skip(self))]
    async fn cancel(&self, system: &str, job_id: JobId) -> Result<(), SchedulerError> {
        let response = self
            .authed(
                self.http
                    .delete(self.url(&format!("/compute/{system}/jobs/{job_id}"))),
            )
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

async fn check(response: Response) -> Result<Response, SchedulerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SchedulerError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn parse_json<T>(response: Response) -> Result<T, SchedulerError>
where
    T: for<'de> Deserialize<'de>,
{
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        SchedulerError::InvalidResponse(format!("failed to parse response: {}, body: {}", e, body))
    })
}
