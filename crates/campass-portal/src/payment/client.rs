//! Payment-platform API client.
//!
//! The platform accepts a CAS service ticket but finishes login with a
//! three-step dance: redeem the ticket (302), load a landing page whose
//! inline script names the next target, then follow that target to a final
//! redirect whose query string carries the API token. Data calls present
//! the token both in the URL path (where the endpoint wants it) and as an
//! `X-Token` header.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::StatusCode;
use reqwest::header::LOCATION;
use serde::Deserialize;
use tracing::{info, warn};

use crate::bridge::{BoxFuture, ServiceBridge};
use crate::config::PaymentConfig;
use crate::error::{PortalError, PortalResult};
use crate::session::{CasSession, header_str};

static LANDING_REDIRECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"window.location.href = "(.*)";"#).expect("Invalid landing redirect regex")
});

/// Account profile returned by the payment platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentUser {
    pub id: String,
    #[serde(rename = "idserial")]
    pub student_id: String,
    pub name: String,
    pub sex: String,
}

/// A payable project listed by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentProject {
    pub id: String,
    #[serde(rename = "projectName")]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Client for the campus payment platform.
pub struct PaymentClient {
    config: PaymentConfig,
    token: Option<String>,
}

impl PaymentClient {
    /// Creates a client with the given endpoint configuration.
    pub fn new(config: PaymentConfig) -> Self {
        Self {
            config,
            token: None,
        }
    }

    /// Fetches the logged-in account's profile.
    pub async fn user_info(&self, session: &CasSession) -> PortalResult<PaymentUser> {
        let token = self.require_token()?;
        let response = session
            .http()
            .get(self.config.user_info_url(token))
            .header("X-Token", token)
            .send()
            .await?;
        let body = read_body(response).await?;
        let envelope: DataEnvelope<PaymentUser> = decode(&body)?;
        Ok(envelope.data)
    }

    /// Fetches every payable project the platform lists.
    pub async fn projects(&self, session: &CasSession) -> PortalResult<Vec<PaymentProject>> {
        let token = self.require_token()?;
        let response = session
            .http()
            .get(self.config.projects_url())
            .header("X-Token", token)
            .send()
            .await?;
        let body = read_body(response).await?;
        let envelope: DataEnvelope<Vec<PaymentProject>> = decode(&body)?;
        Ok(envelope.data)
    }

    async fn bridge_session(&mut self, session: &CasSession) -> PortalResult<bool> {
        let Some(callback) = session.authenticate_service(&self.config.service_url()).await? else {
            return Ok(false);
        };
        if !callback.contains("ticket") {
            warn!("payment service redirect carried no ticket");
            return Ok(false);
        }

        let response = session.http().get(&callback).send().await?;
        if response.status() != StatusCode::FOUND {
            warn!(status = %response.status(), "ticket redemption did not redirect");
            return Ok(false);
        }
        let Some(landing) = header_str(response.headers().get(LOCATION)) else {
            warn!("ticket redemption redirect carried no location");
            return Ok(false);
        };

        let response = session.http().get(&landing).send().await?;
        if !response.status().is_success() {
            warn!(status = %response.status(), "payment landing page unavailable");
            return Ok(false);
        }
        let page = response.text().await?;
        let Some(target) = LANDING_REDIRECT
            .captures(&page)
            .map(|captures| captures[1].to_string())
        else {
            warn!("payment landing page carried no redirect script");
            return Ok(false);
        };

        let response = session.http().get(&target).send().await?;
        if response.status() != StatusCode::FOUND {
            warn!(status = %response.status(), "payment login target did not redirect");
            return Ok(false);
        }
        let Some(final_link) = header_str(response.headers().get(LOCATION)) else {
            warn!("payment login redirect carried no location");
            return Ok(false);
        };
        let Some(token) = token_from_link(&final_link) else {
            warn!("payment redirect carried no token parameter");
            return Ok(false);
        };

        info!("payment bridge established");
        self.token = Some(token);
        Ok(true)
    }

    fn require_token(&self) -> PortalResult<&str> {
        self.token.as_deref().ok_or_else(|| {
            PortalError::authentication("payment bridge not established").with_service("payment")
        })
    }
}

impl ServiceBridge for PaymentClient {
    fn service_name(&self) -> &str {
        "payment"
    }

    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn authenticate_by_cas<'a>(
        &'a mut self,
        session: &'a CasSession,
    ) -> BoxFuture<'a, PortalResult<bool>> {
        Box::pin(async move { self.bridge_session(session).await })
    }
}

/// Pulls the `token` query parameter out of a redirect target.
fn token_from_link(link: &str) -> Option<String> {
    let (_, query) = link.split_once('?')?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
}

async fn read_body(response: reqwest::Response) -> PortalResult<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(unexpected_status(status));
    }
    Ok(response.text().await?)
}

fn unexpected_status(status: StatusCode) -> PortalError {
    let error = if status.is_server_error() {
        PortalError::server(format!("payment platform returned {}", status))
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        PortalError::authentication(format!("payment token rejected ({})", status))
    } else {
        PortalError::invalid_response(format!("unexpected status {}", status))
    };
    error.with_service("payment")
}

fn decode<'a, T: Deserialize<'a>>(body: &'a str) -> PortalResult<T> {
    serde_json::from_str(body).map_err(|e| {
        PortalError::invalid_response("payment platform returned unexpected JSON")
            .with_service("payment")
            .with_source(e)
    })
}
