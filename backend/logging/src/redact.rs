//! Log Redaction Layer
//!
//! Scrubs the PII the pipeline extracts from scanned documents — SSNs,
//! phone numbers, email addresses — from strings prior to logging. Service
//! error payloads in particular can echo recognized text back.

use once_cell::sync::Lazy;
use regex::Regex;

static SSN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b|\b\d{9}\b").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = SSN_RE.replace_all(input, "[REDACTED_SSN]");
    let redacted = PHONE_RE.replace_all(&redacted, "[REDACTED_PHONE]");
    let redacted = EMAIL_RE.replace_all(&redacted, "[REDACTED_EMAIL]");
    redacted.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_ssn_forms() {
        let clean = redact_sensitive_data("ssn 213-92-1949 raw 213921949");
        assert!(!clean.contains("213-92-1949"));
        assert!(!clean.contains("213921949"));
    }

    #[test]
    fn redacts_phone_and_email() {
        let raw = "reach skeysha41@yahoo.com at (313) 643-0180";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("skeysha41@yahoo.com"));
        assert!(!clean.contains("643-0180"));
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(
            redact_sensitive_data("recognition returned 503"),
            "recognition returned 503"
        );
    }
}
