//! Server configuration

use ficha_core::number::DEFAULT_MAX_ATTEMPTS;

/// Connection settings for the external report engine
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Base URL of the report server, e.g. `http://reports:8080/jasperserver`
    pub server_url: String,
    /// Repository path of the technical-sheet report unit
    pub report_path: String,
    /// Name of the report input control that receives the patient id
    pub parameter: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub api_key: Option<String>,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
    pub max_number_attempts: u32,
    /// `None` disables the report endpoint
    pub report: Option<ReportConfig>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let report = non_empty_var("REPORT_SERVER_URL").map(|server_url| ReportConfig {
            server_url,
            report_path: std::env::var("REPORT_PATH")
                .unwrap_or_else(|_| "/reports/technical_sheet".into()),
            parameter: std::env::var("REPORT_PARAMETER").unwrap_or_else(|_| "PATIENT_ID".into()),
            username: non_empty_var("REPORT_USERNAME"),
            password: non_empty_var("REPORT_PASSWORD"),
        });

        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "host=localhost user=postgres dbname=ficha".into()),
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            api_key: non_empty_var("API_KEY"),
            cors_origins: parse_origins(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".into()),
            ),
            rate_limit_rps: parse_or("RATE_LIMIT_RPS", 100).max(1),
            max_number_attempts: parse_or("PATIENT_NUMBER_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)
                .max(1),
            report,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or(name: &str, default: u32) -> u32 {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(variable = name, value = %raw, default, "Invalid number, using default");
            default
        }),
        Err(_) => default,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins("http://a.test, http://b.test ,,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(parse_origins("*"), vec!["*".to_string()]);
    }
}
