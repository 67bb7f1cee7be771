//! Intake validation. Everything here runs before any side effect.

use crate::analysis::PullRequestRef;
use crate::errors::AppError;

/// Trims `value`; blank is a validation error naming `field`.
pub fn require_text(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Trimmed value, or `None` when absent or blank.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Shape check only: one `@`, a non-empty local part, a dotted domain, no whitespace.
pub fn validate_email(value: &str) -> Result<String, AppError> {
    let email = require_text("email", value)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::Validation(format!("'{email}' is not a valid email address")));
    }
    Ok(email)
}

/// Accepts only `https://github.com/<owner>/<repo>/pull/<n>`.
pub fn validate_pull_request_url(value: &str) -> Result<(String, PullRequestRef), AppError> {
    let url = require_text("prUrl", value)?;
    let pr = PullRequestRef::parse(&url).ok_or_else(|| {
        AppError::Validation(
            "Invalid PR URL format: expected https://github.com/<owner>/<repo>/pull/<number>"
                .to_string(),
        )
    })?;
    Ok((url, pr))
}

/// An absolute http(s) URL with a host.
pub fn validate_preview_url(value: &str) -> Result<String, AppError> {
    let raw = require_text("previewUrl", value)?;
    let parsed = url::Url::parse(&raw)
        .map_err(|_| AppError::Validation(format!("previewUrl '{raw}' is not a valid URL")))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(AppError::Validation(
            "previewUrl must be an http(s) URL".to_string(),
        ));
    }
    Ok(raw)
}
