use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::screening::{EmailTemplates, RoleTrack, ScreeningPolicy};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub resend_api_key: String,
    pub mail_from: String,
    /// Receives requisition and review summaries. Admin copies are skipped when unset.
    pub admin_email: Option<String>,
    pub company_name: String,
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub assignment_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
    pub screening: ScreeningPolicy,
    pub email_templates: EmailTemplates,
    pub assignment_deadline_days: u32,
    pub analysis_timeout: Duration,
    pub max_repository_bytes: usize,
    /// Clone and read PR repositories; when off only the links are scored.
    pub repository_analysis: bool,
    /// Round-one interview links from `INTERVIEW_LINK_<TRACK>`.
    pub interview_links: Vec<(RoleTrack, String)>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let text_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let defaults = EmailTemplates::default();
        let screening = ScreeningPolicy {
            min_shortlist_score: parse_or(&get, "MIN_SHORTLIST_SCORE", 40)?,
            min_hold_score: parse_or(&get, "MIN_HOLD_SCORE", 20)?,
            force_shortlist_override: parse_bool_or(&get, "FORCE_SHORTLIST_OVERRIDE", false)?,
        };
        screening
            .validate()
            .context("Invalid screening thresholds")?;

        let mut interview_links = Vec::new();
        for track in [RoleTrack::Frontend, RoleTrack::Hr, RoleTrack::Design, RoleTrack::Other] {
            let key = format!("INTERVIEW_LINK_{}", track.as_str().to_ascii_uppercase());
            if let Some(raw) = get(&key) {
                let link = url::Url::parse(raw.trim())
                    .ok()
                    .filter(|u| matches!(u.scheme(), "http" | "https"))
                    .ok_or_else(|| anyhow!("{key} must be an http(s) URL, got '{raw}'"))?;
                interview_links.push((track, link.to_string()));
            }
        }

        Ok(Config {
            anthropic_api_key: require("ANTHROPIC_API_KEY")?,
            resend_api_key: require("RESEND_API_KEY")?,
            mail_from: text_or("MAIL_FROM", "Hiring Team <onboarding@resend.dev>"),
            admin_email: get("ADMIN_EMAIL"),
            company_name: text_or("COMPANY_NAME", "Stage"),
            data_dir: PathBuf::from(text_or("DATA_DIR", "data")),
            upload_dir: PathBuf::from(text_or("UPLOAD_DIR", "resume")),
            assignment_dir: PathBuf::from(text_or("ASSIGNMENT_DIR", "assignment")),
            port: parse_or(&get, "PORT", 3001)?,
            rust_log: text_or("RUST_LOG", "info"),
            screening,
            email_templates: EmailTemplates {
                shortlisted_subject: text_or("SHORTLISTED_EMAIL_SUBJECT", &defaults.shortlisted_subject),
                on_hold_subject: text_or("ON_HOLD_EMAIL_SUBJECT", &defaults.on_hold_subject),
                rejected_subject: text_or("REJECTED_EMAIL_SUBJECT", &defaults.rejected_subject),
            },
            assignment_deadline_days: parse_or(&get, "ASSIGNMENT_DEADLINE_DAYS", 3)?,
            analysis_timeout: Duration::from_secs(parse_or(&get, "ANALYSIS_TIMEOUT_SECS", 90)?),
            max_repository_bytes: parse_or(&get, "MAX_REPOSITORY_BYTES", 200_000)?,
            repository_analysis: parse_bool_or(&get, "REPOSITORY_ANALYSIS", true)?,
            interview_links,
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{key} has invalid value '{raw}': {e}")),
        None => Ok(default),
    }
}

fn parse_bool_or(get: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> Result<bool> {
    match get(key) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(anyhow!("{key} must be a boolean, got '{raw}'")),
        },
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    const KEYS: [(&str, &str); 2] = [("ANTHROPIC_API_KEY", "sk-test"), ("RESEND_API_KEY", "re_test")];

    #[test]
    fn test_defaults_when_only_keys_set() {
        let config = load(&KEYS).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.screening, ScreeningPolicy::default());
        assert_eq!(config.email_templates, EmailTemplates::default());
        assert_eq!(config.analysis_timeout, Duration::from_secs(90));
        assert_eq!(config.max_repository_bytes, 200_000);
        assert_eq!(config.assignment_deadline_days, 3);
        assert!(config.repository_analysis);
        assert!(config.admin_email.is_none());
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(config.interview_links.is_empty());
    }

    #[test]
    fn test_interview_links_by_track() {
        let mut vars = KEYS.to_vec();
        vars.extend([
            ("INTERVIEW_LINK_FRONTEND", "https://interview.example/fe"),
            ("INTERVIEW_LINK_DESIGN", "https://interview.example/design"),
        ]);
        let config = load(&vars).unwrap();
        assert_eq!(
            config.interview_links,
            vec![
                (RoleTrack::Frontend, "https://interview.example/fe".to_string()),
                (RoleTrack::Design, "https://interview.example/design".to_string()),
            ]
        );

        let mut bad = KEYS.to_vec();
        bad.push(("INTERVIEW_LINK_HR", "ftp://interview.example/hr"));
        assert!(load(&bad).unwrap_err().to_string().contains("INTERVIEW_LINK_HR"));
    }

    #[test]
    fn test_missing_api_key_fails() {
        let err = load(&[("RESEND_API_KEY", "re_test")]).unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_overrides_are_applied() {
        let mut vars = KEYS.to_vec();
        vars.extend([
            ("MIN_SHORTLIST_SCORE", "60"),
            ("MIN_HOLD_SCORE", "30"),
            ("FORCE_SHORTLIST_OVERRIDE", "true"),
            ("ADMIN_EMAIL", "lead@example.com"),
            ("REJECTED_EMAIL_SUBJECT", "Thanks for applying"),
            ("REPOSITORY_ANALYSIS", "off"),
        ]);
        let config = load(&vars).unwrap();
        assert_eq!(config.screening.min_shortlist_score, 60);
        assert_eq!(config.screening.min_hold_score, 30);
        assert!(config.screening.force_shortlist_override);
        assert_eq!(config.admin_email.as_deref(), Some("lead@example.com"));
        assert_eq!(config.email_templates.rejected_subject, "Thanks for applying");
        assert!(!config.repository_analysis);
    }

    #[test]
    fn test_inverted_thresholds_fail() {
        let mut vars = KEYS.to_vec();
        vars.extend([("MIN_SHORTLIST_SCORE", "10"), ("MIN_HOLD_SCORE", "30")]);
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_malformed_numbers_and_bools_fail() {
        let mut port = KEYS.to_vec();
        port.push(("PORT", "eighty"));
        assert!(load(&port).unwrap_err().to_string().contains("PORT"));

        let mut flag = KEYS.to_vec();
        flag.push(("FORCE_SHORTLIST_OVERRIDE", "maybe"));
        assert!(load(&flag).is_err());
    }
}
