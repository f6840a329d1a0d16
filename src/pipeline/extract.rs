//! VLM interaction: send the extraction request and coerce the response to
//! the schema contract.
//!
//! The model's compliance is never trusted. Whatever comes back is cleaned
//! of fences and surrounding prose, deserialised into
//! [`BbpouParticipation`], and run through invariant enforcement — a
//! payload that fails any of these surfaces as
//! [`ValidatorError::SchemaViolation`] or
//! [`ValidatorError::ExtractionFailed`], never as a half-parsed record.
//!
//! ## Retry strategy
//!
//! HTTP 429 / 503 errors from VLM APIs are transient. When `max_retries` is
//! raised above the default 0, each retry waits
//! `retry_backoff_ms * 2^attempt` to avoid hammering a recovering endpoint.

use crate::config::ValidationConfig;
use crate::error::ValidatorError;
use crate::schema::BbpouParticipation;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, info_span, warn, Instrument};

/// Send the extraction request and return the validated record.
///
/// Makes `1 + config.max_retries` attempts, each bounded by
/// `config.api_timeout_secs`. The surrounding span carries the
/// request-scoped observability metadata (document path, classification
/// tag, free-form tags) for whatever tracing sink is installed.
pub async fn extract_record(
    provider: &Arc<dyn LLMProvider>,
    messages: &[ChatMessage],
    config: &ValidationConfig,
    document_path: &str,
) -> Result<BbpouParticipation, ValidatorError> {
    let span = info_span!(
        "extract_record",
        document_path = %document_path,
        agent_type = "bbpou_validation",
        tags = "vlm,pdf-validation",
    );

    extract_record_inner(provider, messages, config).instrument(span).await
}

async fn extract_record_inner(
    provider: &Arc<dyn LLMProvider>,
    messages: &[ChatMessage],
    config: &ValidationConfig,
) -> Result<BbpouParticipation, ValidatorError> {
    let options = build_options(config);
    let call_timeout = Duration::from_secs(config.api_timeout_secs);
    let mut last_err: Option<String> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = backoff_ms(config.retry_backoff_ms, attempt);
            warn!(
                "Extraction retry {}/{} after {}ms",
                attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        let start = Instant::now();
        match timeout(call_timeout, provider.chat(messages, Some(&options))).await {
            Ok(Ok(response)) => {
                debug!(
                    "VLM answered: {} input tokens, {} output tokens, {:?}",
                    response.prompt_tokens,
                    response.completion_tokens,
                    start.elapsed()
                );
                return parse_response(&response.content, config);
            }
            Ok(Err(e)) => {
                let msg = format!("{}", e);
                warn!("Extraction attempt {} failed — {}", attempt + 1, msg);
                last_err = Some(msg);
            }
            Err(_) => {
                let msg = format!("VLM call timed out after {}s", config.api_timeout_secs);
                warn!("Extraction attempt {} failed — {}", attempt + 1, msg);
                last_err = Some(msg);
            }
        }
    }

    Err(ValidatorError::ExtractionFailed {
        attempts: config.max_retries + 1,
        detail: last_err.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

/// Parse and validate the raw model output into a [`BbpouParticipation`].
///
/// Cleans markdown fences and surrounding prose first, then deserialises
/// and enforces the conditional-null invariants under the configured mode.
pub fn parse_response(
    raw: &str,
    config: &ValidationConfig,
) -> Result<BbpouParticipation, ValidatorError> {
    let json = isolate_json(raw).ok_or_else(|| {
        ValidatorError::SchemaViolation(format!(
            "response contains no JSON object: \"{}\"",
            truncate(raw, 120)
        ))
    })?;

    let record: BbpouParticipation = serde_json::from_str(json)
        .map_err(|e| ValidatorError::SchemaViolation(e.to_string()))?;

    record.enforce_invariants(config.validation_mode)?;
    Ok(record)
}

/// Strip an outer ```json fence if the model disobeyed the prompt.
static FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```(?:json)?\s*\n?(.*?)\n?\s*```\s*$").expect("valid fence regex")
});

/// Locate the JSON object inside the raw response.
///
/// Models occasionally wrap the object in fences or pad it with a sentence
/// of commentary; the slice between the first `{` and the last `}` is taken
/// after fence stripping.
fn isolate_json(raw: &str) -> Option<&str> {
    let unfenced = match FENCE_RE.captures(raw) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(raw),
        None => raw,
    };

    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&unfenced[start..=end])
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Exponential backoff for retry `attempt` (1-based).
///
/// The exponent is capped and the multiply saturates so an arbitrary
/// caller-supplied `max_retries` can never overflow the delay arithmetic.
fn backoff_ms(base: u64, attempt: u32) -> u64 {
    let exp = attempt.saturating_sub(1).min(16);
    base.saturating_mul(1u64 << exp)
}

/// Build `CompletionOptions` from the validation config.
fn build_options(config: &ValidationConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AuthorizationDate, ValidationMode, YesNo};

    const VALID_JSON: &str = r#"{
        "company_name": "Acme Payments Ltd",
        "types_of_entities": "Non-Bank",
        "type_of_bbpou": "Customer BBPOU",
        "address": "42 MG Road, Bengaluru",
        "phone_number": "080-4000 1000",
        "stamped_seal": "Yes",
        "seal_description": "Round blue company seal near the signature",
        "authorized_signatory": "Yes",
        "signatory_name": "Jane Doe",
        "signatory_designation": "Director",
        "date_of_authorization": "date is not mentioned"
    }"#;

    #[test]
    fn build_options_uses_zero_temperature() {
        let config = ValidationConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.0));
        assert_eq!(opts.max_tokens, Some(2048));
    }

    #[test]
    fn parse_bare_json() {
        let config = ValidationConfig::default();
        let record = parse_response(VALID_JSON, &config).unwrap();
        assert_eq!(record.company_name, "Acme Payments Ltd");
        assert_eq!(record.stamped_seal, YesNo::Yes);
        assert_eq!(record.date_of_authorization, AuthorizationDate::NotMentioned);
    }

    #[test]
    fn parse_fenced_json() {
        let config = ValidationConfig::default();
        let fenced = format!("```json\n{VALID_JSON}\n```");
        let record = parse_response(&fenced, &config).unwrap();
        assert_eq!(record.signatory_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn parse_json_with_surrounding_prose() {
        let config = ValidationConfig::default();
        let chatty = format!("Here is the extracted record:\n{VALID_JSON}\nLet me know!");
        let record = parse_response(&chatty, &config).unwrap();
        assert_eq!(record.phone_number, "080-4000 1000");
    }

    #[test]
    fn non_json_response_is_schema_violation() {
        let config = ValidationConfig::default();
        let err = parse_response("I could not read the document.", &config).unwrap_err();
        assert!(matches!(err, ValidatorError::SchemaViolation(_)));
    }

    #[test]
    fn strict_mode_rejects_inconsistent_response() {
        let config = ValidationConfig::builder()
            .validation_mode(ValidationMode::Strict)
            .build()
            .unwrap();
        let inconsistent = VALID_JSON.replace("\"stamped_seal\": \"Yes\"", "\"stamped_seal\": \"No\"");
        let err = parse_response(&inconsistent, &config).unwrap_err();
        assert!(matches!(err, ValidatorError::SchemaViolation(_)));
    }

    #[test]
    fn lenient_mode_accepts_inconsistent_response() {
        let config = ValidationConfig::default();
        let inconsistent = VALID_JSON.replace("\"stamped_seal\": \"Yes\"", "\"stamped_seal\": \"No\"");
        let record = parse_response(&inconsistent, &config).unwrap();
        assert_eq!(record.stamped_seal, YesNo::No);
        assert!(record.seal_description.is_some());
    }

    #[test]
    fn backoff_doubles_from_the_base() {
        assert_eq!(backoff_ms(500, 1), 500);
        assert_eq!(backoff_ms(500, 2), 1000);
        assert_eq!(backoff_ms(500, 3), 2000);
    }

    #[test]
    fn backoff_never_overflows_for_huge_retry_counts() {
        assert_eq!(backoff_ms(500, 100), 500 << 16);
        assert_eq!(backoff_ms(u64::MAX, 100), u64::MAX);
        assert_eq!(backoff_ms(0, u32::MAX), 0);
    }

    #[test]
    fn isolate_json_handles_nested_braces() {
        let raw = r#"prefix {"a": {"b": 1}} suffix"#;
        assert_eq!(isolate_json(raw), Some(r#"{"a": {"b": 1}}"#));
    }
}
