//! Identity-provider session.
//!
//! One `CasSession` owns the only HTTP transport in the process: cookie
//! store on, automatic redirects off. Every downstream service bridge
//! borrows this session, so the cookies collected during login are the
//! ones every later hop presents.
//!
//! The login protocol is the portal's own webflow, driven the way the
//! browser drives it: scrape a short-lived execution token out of the
//! form, post the credential with the password sealed by
//! [`CredentialCipher`], then require a success status before looking for
//! the success marker in the response body. Credential rejection and
//! transport oddities both come back as `Ok(false)`; `Err` is reserved for
//! the HTTP stack itself failing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, RwLock};

use regex::Regex;
use reqwest::header::{LOCATION, REFERER};
use reqwest::{Client, StatusCode, redirect};
use tracing::{debug, info, warn};

use crate::config::CasConfig;
use crate::credentials::Credential;
use crate::crypto::CredentialCipher;
use crate::error::{PortalError, PortalResult};

/// Marker the portal embeds in the post-login page.
const SUCCESS_MARKER: &str = "successRedirectUrl";

static EXECUTION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"execution" value="(e[1-9]*s[1-9]*)""#).expect("Invalid execution token regex")
});

static STUDENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<strong><span>(.*)</span>").expect("Invalid student id regex"));

/// An authenticated (or not-yet-authenticated) session against the
/// identity provider.
pub struct CasSession {
    http: Client,
    config: CasConfig,
    cipher: CredentialCipher,
    authenticated: AtomicBool,
    student_id: RwLock<Option<String>>,
}

impl CasSession {
    /// Creates a session with the provider's embedded login key.
    ///
    /// Fails with a `KeyFormat` error before any credential is read if the
    /// embedded key blob does not parse.
    pub fn new(config: CasConfig) -> PortalResult<Self> {
        let cipher = CredentialCipher::builtin()?;
        Self::with_cipher(config, cipher)
    }

    /// Creates a session with an explicit cipher (key override).
    pub fn with_cipher(config: CasConfig, cipher: CredentialCipher) -> PortalResult<Self> {
        let http = Client::builder()
            .redirect(redirect::Policy::none())
            .cookie_store(true)
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                PortalError::configuration("failed to build http client").with_source(e)
            })?;
        Ok(Self {
            http,
            config,
            cipher,
            authenticated: AtomicBool::new(false),
            student_id: RwLock::new(None),
        })
    }

    /// Logs in with a username/password credential.
    ///
    /// On success the credential is updated in place: the password field is
    /// replaced with its sealed form (so it can be stored and replayed) and
    /// the scraped student id is filled in. On rejection the credential is
    /// left untouched and the session stays unauthenticated.
    pub async fn login_with_password(&self, credential: &mut Credential) -> PortalResult<bool> {
        let Some(execution) = self.fetch_execution_token().await? else {
            warn!("login page carried no execution token");
            return Ok(false);
        };
        let sealed = self.cipher.encrypt_password(&credential.password)?;

        let form = [
            ("username", credential.username.as_str()),
            ("password", sealed.as_str()),
            ("captcha", ""),
            ("rememberMe", "true"),
            ("currentMenu", "1"),
            ("failN", "0"),
            ("mfaState", ""),
            ("execution", execution.as_str()),
            ("_eventId", "submit"),
            ("geolocation", ""),
            ("submit", "Login1"),
        ];
        let (status, body) = self.post_credential_form(&form).await?;
        if !status.is_success() {
            warn!(status = %status, "password login failed");
            return Ok(false);
        }
        if !body.contains(SUCCESS_MARKER) {
            info!(username = %credential.username, "password login rejected");
            return Ok(false);
        }

        credential.password = sealed;
        if let Some(id) = extract_student_id(&body) {
            credential.student_id = Some(id.clone());
            *self.student_id.write().unwrap() = Some(id);
        }
        self.authenticated.store(true, Ordering::SeqCst);
        info!(username = %credential.username, "password login succeeded");
        Ok(true)
    }

    /// Requests a one-time SMS code for the given phone number.
    pub async fn send_sms_code(&self, phone: &str) -> PortalResult<bool> {
        let response = self
            .http
            .post(self.config.sms_send_url())
            .header(REFERER, self.config.login_url())
            .form(&[("username", phone)])
            .send()
            .await?;
        let ok = response.status().is_success();
        if !ok {
            warn!(status = %response.status(), "sms code request failed");
        }
        Ok(ok)
    }

    /// Logs in with a phone number and a previously requested SMS code.
    pub async fn login_with_sms(&self, phone: &str, code: &str) -> PortalResult<bool> {
        let Some(execution) = self.fetch_execution_token().await? else {
            warn!("login page carried no execution token");
            return Ok(false);
        };

        let form = [
            ("username", phone),
            ("password", code),
            ("currentMenu", "2"),
            ("failN", "-1"),
            ("execution", execution.as_str()),
            ("_eventId", "submitPasswordlessToken"),
            ("geolocation", ""),
            ("submit", "Login2"),
        ];
        let (status, body) = self.post_credential_form(&form).await?;
        if !status.is_success() {
            warn!(status = %status, "sms login failed");
            return Ok(false);
        }
        if !body.contains(SUCCESS_MARKER) {
            info!(phone = %phone, "sms login rejected");
            return Ok(false);
        }

        if let Some(id) = extract_student_id(&body) {
            *self.student_id.write().unwrap() = Some(id);
        }
        self.authenticated.store(true, Ordering::SeqCst);
        info!(phone = %phone, "sms login succeeded");
        Ok(true)
    }

    /// Redeems the session for a downstream service.
    ///
    /// Returns the provider's `Location` header, which carries the service
    /// ticket, or `None` when the session is not authenticated or the
    /// provider did not redirect.
    pub async fn authenticate_service(&self, service_url: &str) -> PortalResult<Option<String>> {
        if !self.is_authenticated() {
            warn!("service ticket requested before login");
            return Ok(None);
        }
        let url = format!(
            "{}?service={}",
            self.config.login_url(),
            urlencoding::encode(service_url)
        );
        let response = self.http.get(url).send().await?;
        let location = header_str(response.headers().get(LOCATION));
        if location.is_none() {
            debug!(status = %response.status(), service = %service_url, "provider did not redirect");
        }
        Ok(location)
    }

    /// Whether a login has succeeded on this session.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Student id scraped from the post-login page, if any.
    pub fn student_id(&self) -> Option<String> {
        self.student_id.read().unwrap().clone()
    }

    /// Endpoint configuration this session was built with.
    pub fn config(&self) -> &CasConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    async fn fetch_execution_token(&self) -> PortalResult<Option<String>> {
        let response = self.http.get(self.config.login_url()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, "fetched login page");
        Ok(extract_execution_token(&body))
    }

    async fn post_credential_form(
        &self,
        form: &[(&str, &str)],
    ) -> PortalResult<(StatusCode, String)> {
        let response = self
            .http
            .post(self.config.login_url())
            .header(REFERER, self.config.login_url())
            .form(form)
            .send()
            .await?;
        let status = response.status();
        Ok((status, response.text().await?))
    }
}

pub(crate) fn header_str(value: Option<&reqwest::header::HeaderValue>) -> Option<String> {
    value.and_then(|v| v.to_str().ok()).map(|s| s.to_string())
}

fn extract_execution_token(body: &str) -> Option<String> {
    EXECUTION_TOKEN
        .captures(body)
        .map(|captures| captures[1].to_string())
}

fn extract_student_id(body: &str) -> Option<String> {
    STUDENT_ID
        .captures(body)
        .map(|captures| captures[1].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn execution_token_is_scraped_from_the_form() {
        let body = r#"<form id="login-form">
            <input type="hidden" name="execution" value="e1s1"/>
            </form>"#;
        assert_eq!(extract_execution_token(body), Some("e1s1".to_string()));
    }

    #[test]
    fn execution_token_with_larger_counters() {
        let body = r#"<input type="hidden" name="execution" value="e2s3"/>"#;
        assert_eq!(extract_execution_token(body), Some("e2s3".to_string()));
    }

    #[test]
    fn missing_execution_token_is_none() {
        assert_eq!(extract_execution_token("<html><body>503</body></html>"), None);
        assert_eq!(
            extract_execution_token(r#"<input name="execution" value="broken""#),
            None
        );
    }

    #[test]
    fn student_id_is_scraped_from_the_greeting() {
        let body = "<div class=\"user\"><strong><span>2021050506</span></strong></div>";
        assert_eq!(extract_student_id(body), Some("2021050506".to_string()));
    }

    #[test]
    fn missing_student_id_is_none() {
        assert_eq!(extract_student_id("<div>welcome</div>"), None);
    }

    #[test]
    fn fresh_session_is_unauthenticated() {
        let session = CasSession::new(CasConfig::default()).unwrap();
        assert!(!session.is_authenticated());
        assert!(session.student_id().is_none());
    }

    const LOGIN_PAGE: &str = "<form id=\"fm1\">\n\
        <input type=\"hidden\" name=\"execution\" value=\"e1s1\"/>\n\
        </form>";

    const SUCCESS_PAGE: &str = "<html>\n\
        <script>var successRedirectUrl = '/cas/index';</script>\n\
        <div class=\"lb_yi\"><strong><span>2021050506</span></strong></div>\n\
        </html>";

    fn cas_config(server: &MockServer) -> CasConfig {
        CasConfig::default().with_base_url(format!("{}/cas", server.uri()))
    }

    #[tokio::test]
    async fn password_login_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cas/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cas/login"))
            .and(body_string_contains("username=2021050506"))
            .and(body_string_contains("password=__RSA__"))
            .and(body_string_contains("execution=e1s1"))
            .and(body_string_contains("_eventId=submit"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUCCESS_PAGE))
            .mount(&server)
            .await;

        let session = CasSession::new(cas_config(&server)).unwrap();
        let mut credential = Credential::new("2021050506", "hunter2");
        assert!(session.login_with_password(&mut credential).await.unwrap());
        assert!(session.is_authenticated());
        assert_eq!(session.student_id().as_deref(), Some("2021050506"));
        assert!(credential.password.starts_with("__RSA__"));
        assert_eq!(credential.student_id.as_deref(), Some("2021050506"));
    }

    #[tokio::test]
    async fn rejected_login_leaves_the_credential_alone() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cas/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cas/login"))
            .respond_with(ResponseTemplate::new(401).set_body_string("<html>账号或密码错误</html>"))
            .mount(&server)
            .await;

        let session = CasSession::new(cas_config(&server)).unwrap();
        let mut credential = Credential::new("2021050506", "wrong");
        assert!(!session.login_with_password(&mut credential).await.unwrap());
        assert!(!session.is_authenticated());
        assert_eq!(credential.password, "wrong");
        assert!(credential.student_id.is_none());
    }

    #[tokio::test]
    async fn error_page_with_a_marker_does_not_authenticate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cas/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cas/login"))
            .respond_with(ResponseTemplate::new(500).set_body_string(SUCCESS_PAGE))
            .mount(&server)
            .await;

        let session = CasSession::new(cas_config(&server)).unwrap();
        let mut credential = Credential::new("2021050506", "hunter2");
        assert!(!session.login_with_password(&mut credential).await.unwrap());
        assert!(!session.is_authenticated());
        assert_eq!(credential.password, "hunter2");
        assert!(credential.student_id.is_none());
    }

    #[tokio::test]
    async fn login_stops_when_the_page_has_no_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cas/login"))
            .respond_with(ResponseTemplate::new(503).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cas/login"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let session = CasSession::new(cas_config(&server)).unwrap();
        let mut credential = Credential::new("2021050506", "hunter2");
        assert!(!session.login_with_password(&mut credential).await.unwrap());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn sms_login_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cas/passwordlessTokenSend"))
            .and(body_string_contains("username=13808001234"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success":true}"#))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cas/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cas/login"))
            .and(body_string_contains("_eventId=submitPasswordlessToken"))
            .and(body_string_contains("password=246810"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUCCESS_PAGE))
            .mount(&server)
            .await;

        let session = CasSession::new(cas_config(&server)).unwrap();
        assert!(session.send_sms_code("13808001234").await.unwrap());
        assert!(session.login_with_sms("13808001234", "246810").await.unwrap());
        assert!(session.is_authenticated());
        assert_eq!(session.student_id().as_deref(), Some("2021050506"));
    }

    #[tokio::test]
    async fn sms_login_rejects_an_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cas/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cas/login"))
            .respond_with(ResponseTemplate::new(502).set_body_string(SUCCESS_PAGE))
            .mount(&server)
            .await;

        let session = CasSession::new(cas_config(&server)).unwrap();
        assert!(!session.login_with_sms("13808001234", "246810").await.unwrap());
        assert!(!session.is_authenticated());
        assert!(session.student_id().is_none());
    }

    #[tokio::test]
    async fn service_ticket_rides_the_login_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cas/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cas/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUCCESS_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cas/login"))
            .and(query_param("service", "http://paym.cdut.edu.cn/casLogin/"))
            .respond_with(ResponseTemplate::new(302).insert_header(
                "Location",
                "http://paym.cdut.edu.cn/casLogin/?ticket=ST-8346",
            ))
            .mount(&server)
            .await;

        let session = CasSession::new(cas_config(&server)).unwrap();
        let mut credential = Credential::new("2021050506", "hunter2");
        assert!(session.login_with_password(&mut credential).await.unwrap());

        let location = session
            .authenticate_service("http://paym.cdut.edu.cn/casLogin/")
            .await
            .unwrap();
        assert_eq!(
            location.as_deref(),
            Some("http://paym.cdut.edu.cn/casLogin/?ticket=ST-8346")
        );
    }

    #[tokio::test]
    async fn no_ticket_without_login() {
        let server = MockServer::start().await;
        let session = CasSession::new(cas_config(&server)).unwrap();
        let location = session
            .authenticate_service("http://paym.cdut.edu.cn/casLogin/")
            .await
            .unwrap();
        assert!(location.is_none());
    }
}
