//! Service endpoint configuration.
//!
//! Defaults point at the production campus deployments; tests and
//! self-hosted mirrors override the base URLs.

use std::time::Duration;

/// Configuration for the identity-provider session.
#[derive(Debug, Clone)]
pub struct CasConfig {
    /// Base URL of the CAS deployment, up to and including the mount path.
    pub base_url: String,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent presented to every service.
    pub user_agent: String,
}

impl CasConfig {
    /// Default CAS deployment.
    pub const DEFAULT_BASE_URL: &'static str = "https://cas.paas.cdut.edu.cn/cas";

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Browser-equivalent user agent. The portal serves a reduced login page
    /// to clients it does not recognize as browsers.
    pub const DEFAULT_USER_AGENT: &'static str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
        AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36 Edg/116.0.1938.69";

    /// Sets the CAS base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL of the login form.
    pub fn login_url(&self) -> String {
        format!("{}/login", self.base_url)
    }

    /// URL of the SMS one-time-code sender.
    pub fn sms_send_url(&self) -> String {
        format!("{}/passwordlessTokenSend", self.base_url)
    }
}

impl Default for CasConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: Self::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Configuration for the academic-records service.
#[derive(Debug, Clone)]
pub struct AcademicConfig {
    /// Base URL of the academic system.
    pub base_url: String,

    /// Maximum redirects followed while bridging the session in.
    pub hop_budget: usize,
}

impl AcademicConfig {
    /// Default academic-system deployment.
    pub const DEFAULT_BASE_URL: &'static str = "https://jw.cdut.edu.cn";

    /// Default redirect hop budget for the bridge.
    pub const DEFAULT_HOP_BUDGET: usize = 10;

    /// Sets the academic-system base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the redirect hop budget.
    pub fn with_hop_budget(mut self, budget: usize) -> Self {
        self.hop_budget = budget;
        self
    }

    /// Single-sign-on entry point; responds with the first bridge redirect.
    pub fn bootstrap_url(&self) -> String {
        format!("{}/sso/login.jsp", self.base_url)
    }

    /// Landing page carrying the timetable display mode, semester and week
    /// option lists.
    pub fn context_url(&self) -> String {
        format!("{}/jsxsd/framework/xsMainV_new.htmlx?t1=1", self.base_url)
    }

    /// Weekly timetable fragment.
    pub fn timetable_url(&self) -> String {
        format!("{}/jsxsd/framework/mainV_index_loadkb.htmlx", self.base_url)
    }

    /// Exam arrangement query page (semester option list).
    pub fn exam_query_url(&self) -> String {
        format!("{}/jsxsd/xsks/xsksap_query", self.base_url)
    }

    /// Exam arrangement listing.
    pub fn exam_list_url(&self) -> String {
        format!("{}/jsxsd/xsks/xsksap_list", self.base_url)
    }

    /// Student directory search.
    pub fn student_search_url(&self) -> String {
        format!("{}/jsxsd/xskb/cxxs", self.base_url)
    }

    /// Course election round listing.
    pub fn election_url(&self) -> String {
        format!("{}/jsxsd/xsxk/xklc_list", self.base_url)
    }
}

impl Default for AcademicConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            hop_budget: Self::DEFAULT_HOP_BUDGET,
        }
    }
}

/// Configuration for the payment service.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Base URL of the payment system.
    pub base_url: String,
}

impl PaymentConfig {
    /// Default payment-system deployment.
    pub const DEFAULT_BASE_URL: &'static str = "http://paym.cdut.edu.cn";

    /// Sets the payment-system base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Service URL registered with the identity provider; tickets are
    /// redeemed against it.
    pub fn service_url(&self) -> String {
        format!("{}/casLogin/", self.base_url)
    }

    /// Account info endpoint for an authenticated token.
    pub fn user_info_url(&self, token: &str) -> String {
        format!("{}/api/pay/queryUserInfo/{}", self.base_url, token)
    }

    /// Payable project listing.
    pub fn projects_url(&self) -> String {
        format!("{}/api/pay/project/getAllProjectList", self.base_url)
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }
}
