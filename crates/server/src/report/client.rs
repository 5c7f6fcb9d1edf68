//! HTTP client for a JasperReports-Server style REST endpoint
//!
//! The technical sheet is a report unit on the server taking the patient id
//! as its single input control. Rendering is a `GET` on
//! `{server}/rest_v2/reports{path}.pdf?{parameter}={id}`.

use std::time::Duration;

use async_trait::async_trait;
use ficha_core::{RenderError, ReportRenderer};
use serde::Deserialize;

use crate::config::ReportConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Renders technical sheets by calling the report server
#[derive(Clone)]
pub struct HttpReportRenderer {
    http: reqwest::Client,
    url: String,
    parameter: String,
    username: Option<String>,
    password: Option<String>,
}

/// Error detail returned by the report server
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiError {
    message: String,
    #[serde(default)]
    error_code: Option<String>,
}

impl HttpReportRenderer {
    pub fn new(config: &ReportConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            http,
            url: report_url(&config.server_url, &config.report_path),
            parameter: config.parameter.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    /// Full URL of the PDF export for the configured report unit
    pub fn url(&self) -> &str {
        &self.url
    }
}

fn report_url(server_url: &str, report_path: &str) -> String {
    let path = report_path.trim_matches('/');
    format!(
        "{}/rest_v2/reports/{}.pdf",
        server_url.trim_end_matches('/'),
        path
    )
}

#[async_trait]
impl ReportRenderer for HttpReportRenderer {
    async fn render(&self, patient_id: i64) -> Result<Vec<u8>, RenderError> {
        let mut request = self
            .http
            .get(&self.url)
            .query(&[(self.parameter.as_str(), patient_id.to_string())]);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| RenderError::Unavailable(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiError>(&body) {
                Ok(api_err) => match api_err.error_code {
                    Some(code) => format!("{} ({})", api_err.message, code),
                    None => api_err.message,
                },
                Err(_) => body,
            };
            return Err(RenderError::Rejected { status, message });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RenderError::Unavailable(format!("Failed to read report body: {}", e)))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        Router,
        extract::Query,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::get,
    };

    use super::*;

    #[test]
    fn url_joins_server_and_report_path() {
        assert_eq!(
            report_url("http://reports:8080/jasperserver/", "/reports/technical_sheet"),
            "http://reports:8080/jasperserver/rest_v2/reports/reports/technical_sheet.pdf"
        );
        assert_eq!(
            report_url("http://r", "sheet"),
            "http://r/rest_v2/reports/sheet.pdf"
        );
    }

    /// Fake report server: PDF for patient 1, a JSON error otherwise
    async fn fake_export(
        Query(params): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> impl IntoResponse {
        if !headers.contains_key("authorization") {
            return (StatusCode::UNAUTHORIZED, "missing credentials".to_string()).into_response();
        }
        match params.get("PATIENT_ID").map(String::as_str) {
            Some("1") => (StatusCode::OK, b"%PDF-1.4 fake".to_vec()).into_response(),
            _ => (
                StatusCode::BAD_REQUEST,
                r#"{"message":"Report failed","errorCode":"report.execution.failed"}"#.to_string(),
            )
                .into_response(),
        }
    }

    async fn serve() -> String {
        let app = Router::new().route("/rest_v2/reports/sheet.pdf", get(fake_export));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config(server_url: String) -> ReportConfig {
        ReportConfig {
            server_url,
            report_path: "/sheet".to_string(),
            parameter: "PATIENT_ID".to_string(),
            username: Some("jasperadmin".to_string()),
            password: Some("secret".to_string()),
        }
    }

    #[tokio::test]
    async fn renders_pdf_bytes() {
        let renderer = HttpReportRenderer::new(&config(serve().await));

        let pdf = renderer.render(1).await.unwrap();

        assert_eq!(pdf, b"%PDF-1.4 fake");
    }

    #[tokio::test]
    async fn surfaces_server_error_message() {
        let renderer = HttpReportRenderer::new(&config(serve().await));

        match renderer.render(2).await {
            Err(RenderError::Rejected { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Report failed (report.execution.failed)");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_unavailable() {
        let renderer = HttpReportRenderer::new(&config("http://127.0.0.1:1".to_string()));

        assert!(matches!(
            renderer.render(1).await,
            Err(RenderError::Unavailable(_))
        ));
    }
}
