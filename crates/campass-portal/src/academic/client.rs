//! Academic-system API client.
//!
//! Every operation borrows the one [`CasSession`] in the process; the
//! academic system recognizes the caller purely through the cookies that
//! session accumulated. Entering the system at all is a redirect chain:
//! the SSO entry point bounces through the identity provider and back,
//! setting cookies along the way, and has to be walked manually because
//! the transport never follows redirects on its own.

use reqwest::StatusCode;
use reqwest::header::LOCATION;
use serde::Deserialize;
use tracing::{debug, info, warn};

use campass_core::record::{ExamEntry, ScheduleEntry, StudentRecord};

use crate::bridge::{BoxFuture, ServiceBridge};
use crate::config::AcademicConfig;
use crate::error::{PortalError, PortalResult};
use crate::redirect::{ChainStep, RedirectChain};
use crate::session::{CasSession, header_str};

use super::extract::{self, ElectionRound, TimetableContext, WeekOption};

/// Client for the academic-records system.
pub struct AcademicClient {
    config: AcademicConfig,
    authenticated: bool,
}

impl AcademicClient {
    /// Creates a client with the given endpoint configuration.
    pub fn new(config: AcademicConfig) -> Self {
        Self {
            config,
            authenticated: false,
        }
    }

    /// Fetches the timetable context: display mode, semesters, weeks.
    pub async fn timetable_context(&self, session: &CasSession) -> PortalResult<TimetableContext> {
        let response = session.http().get(self.config.context_url()).send().await?;
        let page = read_page(response).await?;
        Ok(extract::timetable_context(&page))
    }

    /// Fetches one week of the timetable and extracts its entries.
    ///
    /// The portal keys the request on the context's display mode and first
    /// semester id plus the week's start date.
    pub async fn week_schedule(
        &self,
        session: &CasSession,
        context: &TimetableContext,
        week: &WeekOption,
    ) -> PortalResult<Vec<ScheduleEntry>> {
        let semester = context.semesters.first().map(String::as_str).unwrap_or_default();
        if semester.is_empty() {
            debug!("timetable context carried no semester id");
        }
        let week_start = week.start.format("%Y-%m-%d").to_string();
        let response = session
            .http()
            .get(self.config.timetable_url())
            .query(&[
                ("rq", week_start.as_str()),
                ("sjmsValue", context.display_mode.as_str()),
                ("xnxqid", semester),
                ("xswk", "true"),
            ])
            .send()
            .await?;
        let page = read_page(response).await?;
        Ok(extract::timetable(&page, week.start))
    }

    /// Fetches the semester ids selectable on the exam query page.
    pub async fn exam_semesters(&self, session: &CasSession) -> PortalResult<Vec<String>> {
        let response = session.http().get(self.config.exam_query_url()).send().await?;
        let page = read_page(response).await?;
        Ok(extract::exam_semesters(&page))
    }

    /// Fetches the exam arrangement for a semester.
    pub async fn exams(&self, session: &CasSession, semester: &str) -> PortalResult<Vec<ExamEntry>> {
        let response = session
            .http()
            .post(self.config.exam_list_url())
            .form(&[("xnxqid", semester)])
            .send()
            .await?;
        let page = read_page(response).await?;
        Ok(extract::exams(&page))
    }

    /// Searches the student directory by name or id.
    pub async fn search_students(
        &self,
        session: &CasSession,
        query: &str,
    ) -> PortalResult<Vec<StudentRecord>> {
        let response = session
            .http()
            .post(self.config.student_search_url())
            .form(&[("xsmc", query), ("maxRow", "100")])
            .send()
            .await?;
        let body = read_page(response).await?;
        let decoded: StudentSearchResponse = serde_json::from_str(&body).map_err(|e| {
            PortalError::invalid_response("student search returned unexpected JSON")
                .with_service("academic")
                .with_source(e)
        })?;
        if !decoded.result {
            debug!(query, "student search reported no result");
            return Ok(Vec::new());
        }
        Ok(decoded
            .list
            .into_iter()
            .map(|student| StudentRecord {
                id: student.xh,
                name: student.xsmc,
            })
            .collect())
    }

    /// Fetches the course election rounds currently listed.
    pub async fn election_rounds(&self, session: &CasSession) -> PortalResult<Vec<ElectionRound>> {
        let response = session.http().get(self.config.election_url()).send().await?;
        let page = read_page(response).await?;
        Ok(extract::election_rounds(&page))
    }

    async fn bridge_session(&mut self, session: &CasSession) -> PortalResult<bool> {
        let response = session.http().get(self.config.bootstrap_url()).send().await?;
        if response.status() != StatusCode::FOUND {
            warn!(status = %response.status(), "academic bootstrap did not redirect");
            return Ok(false);
        }
        let Some(first) = header_str(response.headers().get(LOCATION)) else {
            warn!("academic bootstrap redirect carried no location");
            return Ok(false);
        };

        let mut chain = RedirectChain::new(&first, self.config.hop_budget)?;
        loop {
            debug!(hop = chain.hops(), target = %chain.current(), "following bridge redirect");
            let response = session.http().get(chain.current().clone()).send().await?;
            let location = header_str(response.headers().get(LOCATION));
            match chain.advance(location.as_deref())? {
                ChainStep::Continue(_) => continue,
                ChainStep::Settled => break,
                ChainStep::Exhausted => {
                    warn!(
                        budget = self.config.hop_budget,
                        "academic bridge redirect budget exhausted"
                    );
                    return Ok(false);
                }
            }
        }

        self.authenticated = true;
        info!(hops = chain.hops(), "academic bridge established");
        Ok(true)
    }
}

impl ServiceBridge for AcademicClient {
    fn service_name(&self) -> &str {
        "academic"
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn authenticate_by_cas<'a>(
        &'a mut self,
        session: &'a CasSession,
    ) -> BoxFuture<'a, PortalResult<bool>> {
        Box::pin(async move { self.bridge_session(session).await })
    }
}

/// Checks the status of a data-call response and reads its body.
async fn read_page(response: reqwest::Response) -> PortalResult<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(unexpected_status(status));
    }
    Ok(response.text().await?)
}

fn unexpected_status(status: StatusCode) -> PortalError {
    let error = if status.is_server_error() {
        PortalError::server(format!("academic system returned {}", status))
    } else if status.is_redirection() || status == StatusCode::UNAUTHORIZED {
        PortalError::authentication(format!("academic session not established ({})", status))
    } else {
        PortalError::invalid_response(format!("unexpected status {}", status))
    };
    error.with_service("academic")
}

#[derive(Debug, Deserialize)]
struct StudentSearchResponse {
    result: bool,
    #[serde(default)]
    list: Vec<WireStudent>,
}

#[derive(Debug, Deserialize)]
struct WireStudent {
    #[serde(default)]
    xh: String,
    #[serde(default)]
    xsmc: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CasConfig;
    use crate::error::PortalErrorCode;
    use chrono::NaiveDate;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn status_mapping() {
        assert_eq!(
            unexpected_status(StatusCode::BAD_GATEWAY).code(),
            PortalErrorCode::ServerError
        );
        assert_eq!(
            unexpected_status(StatusCode::FOUND).code(),
            PortalErrorCode::AuthenticationFailed
        );
        assert_eq!(
            unexpected_status(StatusCode::NOT_FOUND).code(),
            PortalErrorCode::InvalidResponse
        );
    }

    #[test]
    fn search_response_decodes_hits() {
        let json = r#"{"result": true, "list": [{"xh": "202401001", "xsmc": "陈晨"}]}"#;
        let decoded: StudentSearchResponse = serde_json::from_str(json).unwrap();
        assert!(decoded.result);
        assert_eq!(decoded.list.len(), 1);
        assert_eq!(decoded.list[0].xh, "202401001");
    }

    #[test]
    fn search_response_tolerates_missing_list() {
        let json = r#"{"result": false}"#;
        let decoded: StudentSearchResponse = serde_json::from_str(json).unwrap();
        assert!(!decoded.result);
        assert!(decoded.list.is_empty());
    }

    #[test]
    fn fresh_client_is_unbridged() {
        let client = AcademicClient::new(AcademicConfig::default());
        assert!(!client.is_authenticated());
        assert_eq!(client.service_name(), "academic");
    }

    fn test_session() -> CasSession {
        CasSession::new(CasConfig::default()).unwrap()
    }

    fn one_course_page() -> String {
        let markup = "<span onmouseover='kbtc(this)' onmouseout='kbot(this)' class='box' \
             style='background:#EAF2FB'><p>1-2</p><p>李敏</p><span class='text'>1-16周\
             </span></span><div class='item-box' ><p>高等数学</p><div class='tch-name'>\
             <span>4.0</span><span>1-2节</span></div><div><span>\
             <img src='/jsxsd/assets_v1/images/item1.png'>6A-211</span>";
        format!("<table><tr><td align=\"left\">\r\n    \r\n{markup}\r\n\r\n    </td></tr></table>")
    }

    #[tokio::test]
    async fn bridge_settles_inside_the_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sso/login.jsp"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/cas-bounce", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cas-bounce"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/app/index"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/app/index"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>main</html>"))
            .mount(&server)
            .await;

        let session = test_session();
        let mut academic =
            AcademicClient::new(AcademicConfig::default().with_base_url(server.uri()));
        assert!(academic.authenticate_by_cas(&session).await.unwrap());
        assert!(academic.is_authenticated());
    }

    #[tokio::test]
    async fn bridge_gives_up_when_the_chain_never_settles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sso/login.jsp"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/loop", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/loop"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
            .mount(&server)
            .await;

        let session = test_session();
        let config = AcademicConfig::default()
            .with_base_url(server.uri())
            .with_hop_budget(3);
        let mut academic = AcademicClient::new(config);
        assert!(!academic.authenticate_by_cas(&session).await.unwrap());
        assert!(!academic.is_authenticated());
    }

    #[tokio::test]
    async fn bridge_requires_a_bootstrap_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sso/login.jsp"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let session = test_session();
        let mut academic =
            AcademicClient::new(AcademicConfig::default().with_base_url(server.uri()));
        assert!(!academic.authenticate_by_cas(&session).await.unwrap());
    }

    #[tokio::test]
    async fn week_schedule_threads_the_context_through_the_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jsxsd/framework/mainV_index_loadkb.htmlx"))
            .and(query_param("rq", "2024-03-11"))
            .and(query_param("sjmsValue", "A3B932C7"))
            .and(query_param("xnxqid", "2023-2024-2"))
            .and(query_param("xswk", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_string(one_course_page()))
            .mount(&server)
            .await;

        let session = test_session();
        let academic = AcademicClient::new(AcademicConfig::default().with_base_url(server.uri()));
        let context = TimetableContext {
            display_mode: "A3B932C7".to_string(),
            semesters: vec!["2023-2024-2".to_string()],
            weeks: Vec::new(),
        };
        let week = WeekOption {
            label: "第 3 周".to_string(),
            start: NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
        };
        let entries = academic
            .week_schedule(&session, &context, &week)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].course, "高等数学");
        assert_eq!(entries[0].teacher, "李敏");
        assert_eq!(entries[0].location, "6A-211");
        assert_eq!(entries[0].date, week.start);
        assert_eq!(entries[0].slot.index(), 0);
    }

    #[tokio::test]
    async fn exams_post_the_semester_form() {
        let server = MockServer::start().await;
        let row = "<tr>\n<td>1</td>\n<td>2023-2024-1</td>\n<td>本部</td>\n<td>KS240110</td>\n\
             <td>MATH1002</td>\n<td>高等数学</td>\n<td>王强</td>\n<td>2024-01-10 09:30~11:30</td>\n\
             <td>A101</td>\n<td>07</td>\n</tr>";
        Mock::given(method("POST"))
            .and(path("/jsxsd/xsks/xsksap_list"))
            .and(body_string_contains("xnxqid=2023-2024-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("<table>{row}</table>")))
            .mount(&server)
            .await;

        let session = test_session();
        let academic = AcademicClient::new(AcademicConfig::default().with_base_url(server.uri()));
        let exams = academic.exams(&session, "2023-2024-1").await.unwrap();
        assert_eq!(exams.len(), 1);
        assert_eq!(exams[0].exam_id, "KS240110");
        assert_eq!(exams[0].classroom, "A101");
    }

    #[tokio::test]
    async fn student_search_decodes_the_directory() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/jsxsd/xskb/cxxs"))
            .and(body_string_contains("maxRow=100"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"result": true, "list": [{"xh": "202401001", "xsmc": "陈晨"}, {"xh": "202401002", "xsmc": "陈明"}]}"#,
            ))
            .mount(&server)
            .await;

        let session = test_session();
        let academic = AcademicClient::new(AcademicConfig::default().with_base_url(server.uri()));
        let students = academic.search_students(&session, "陈").await.unwrap();
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].id, "202401001");
        assert_eq!(students[0].name, "陈晨");
    }

    #[tokio::test]
    async fn data_call_on_a_stale_session_is_an_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jsxsd/framework/xsMainV_new.htmlx"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/sso/login.jsp"))
            .mount(&server)
            .await;

        let session = test_session();
        let academic = AcademicClient::new(AcademicConfig::default().with_base_url(server.uri()));
        let error = academic.timetable_context(&session).await.unwrap_err();
        assert_eq!(error.code(), PortalErrorCode::AuthenticationFailed);
    }
}
