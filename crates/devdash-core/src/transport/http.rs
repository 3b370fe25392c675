//! reqwest-backed transport.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, warn};
use url::Url;

use super::{CommitActivity, RemoteCommitStat, SessionHistory, Transport};
use crate::error::TransportError;
use crate::record::{RemoteSession, SessionPayload};

const USER_AGENT: &str = "devdash";
const SESSIONS_PATH: &str = "api/pomodoro/sessions";
const COMMIT_STATS_PATH: &str = "api/github/stats";

pub struct HttpTransport {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpTransport {
    /// Build a client rooted at `base_url` (e.g. `http://localhost:8000`).
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        Ok(self.base_url.join(path)?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(TransportError::Unauthorized {
                status: status.as_u16(),
            });
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl Transport for HttpTransport {
    async fn post_session(&self, payload: &SessionPayload) -> Result<(), TransportError> {
        let url = self.endpoint(SESSIONS_PATH)?;
        let response = self
            .authorize(self.client.post(url))
            .json(payload)
            .send()
            .await?;
        Self::check(response).await?;
        debug!(duration = payload.duration, session_type = %payload.session_type, "session posted");
        Ok(())
    }

    async fn fetch_sessions(&self, limit: usize) -> Result<SessionHistory, TransportError> {
        let url = self.endpoint(SESSIONS_PATH)?;
        let response = self
            .authorize(self.client.get(url))
            .query(&[("limit", limit)])
            .send()
            .await?;
        let rows: Vec<serde_json::Value> = Self::check(response).await?.json().await?;

        let mut history = SessionHistory {
            sessions: Vec::with_capacity(rows.len()),
            malformed: 0,
        };
        for row in rows {
            match serde_json::from_value::<RemoteSession>(row) {
                Ok(session) => history.sessions.push(session),
                Err(e) => {
                    warn!(error = %e, "dropping malformed session row");
                    history.malformed += 1;
                }
            }
        }
        Ok(history)
    }

    async fn fetch_commit_activity(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CommitActivity>, TransportError> {
        let url = self.endpoint(COMMIT_STATS_PATH)?;
        let response = self
            .authorize(self.client.get(url))
            .query(&[
                ("start_date", start.to_string()),
                ("end_date", end.to_string()),
            ])
            .send()
            .await?;
        let rows: Vec<RemoteCommitStat> = Self::check(response).await?.json().await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match CommitActivity::try_from(row) {
                Ok(activity) => Some(activity),
                Err(e) => {
                    warn!(error = %e, "dropping malformed commit row");
                    None
                }
            })
            .collect())
    }
}
