//! The schema contract for a BBPOU participation letter.
//!
//! [`BbpouParticipation`] is the single structured record the pipeline
//! produces. The type plays two roles:
//!
//! 1. **Shape** — serde derives reject any payload with a missing required
//!    field, an enum value outside its allowed set, or a malformed date.
//!    The model is told this exact shape via [`crate::prompts`], but its
//!    compliance is never trusted: every response is deserialised and
//!    validated locally after the call returns.
//!
//! 2. **Conditional-null invariants** — `seal_description` must be null when
//!    `stamped_seal` is "No", and `signatory_name`/`signatory_designation`
//!    must be null when `authorized_signatory` is "No". These are *soft*
//!    invariants upstream of the model (it may emit inconsistent pairs), so
//!    enforcement is a [`ValidationMode`] choice rather than baked into
//!    deserialisation.

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::error::ValidatorError;

/// The exact sentinel the model must use when no authorization date appears
/// in the letter. Any other free-form string is a schema violation.
pub const DATE_NOT_MENTIONED: &str = "date is not mentioned";

/// Entity classification of the participating company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Bank,
    #[serde(rename = "Non-Bank")]
    NonBank,
}

/// BBPOU participation role claimed in the letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BbpouType {
    #[serde(rename = "Customer BBPOU")]
    Customer,
    #[serde(rename = "Biller BBPOU")]
    Biller,
    #[serde(rename = "Both Customer and Biller BBPOU")]
    Both,
}

/// "Yes"/"No" flags used for seal and signatory presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

/// Authorization date: a calendar date or the exact sentinel text.
///
/// Serialises as `"YYYY-MM-DD"` or `"date is not mentioned"`; anything else
/// fails to deserialise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationDate {
    Date(NaiveDate),
    NotMentioned,
}

impl Default for AuthorizationDate {
    fn default() -> Self {
        AuthorizationDate::NotMentioned
    }
}

impl Serialize for AuthorizationDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AuthorizationDate::Date(d) => {
                serializer.serialize_str(&d.format("%Y-%m-%d").to_string())
            }
            AuthorizationDate::NotMentioned => serializer.serialize_str(DATE_NOT_MENTIONED),
        }
    }
}

impl<'de> Deserialize<'de> for AuthorizationDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == DATE_NOT_MENTIONED {
            return Ok(AuthorizationDate::NotMentioned);
        }
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map(AuthorizationDate::Date)
            .map_err(|_| {
                D::Error::custom(format!(
                    "date_of_authorization must be YYYY-MM-DD or \"{DATE_NOT_MENTIONED}\", got \"{raw}\""
                ))
            })
    }
}

/// How strictly the conditional-null invariants are enforced after the model
/// responds.
///
/// The upstream system never enforced them — a populated `seal_description`
/// alongside `stamped_seal = "No"` passed through silently. `Lenient`
/// reproduces that behaviour (with a warning so the inconsistency is at
/// least visible); `Strict` rejects the record outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Log a warning on an inconsistent pair but accept the record. (default)
    #[default]
    Lenient,
    /// Reject any record whose dependent field is populated while its
    /// governing flag is "No".
    Strict,
}

/// The structured record extracted from a BBPOU participation letter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BbpouParticipation {
    /// Legal name of the company/entity.
    pub company_name: String,
    /// Entity classification: "Bank" or "Non-Bank".
    pub types_of_entities: EntityType,
    /// BBPOU participation type.
    pub type_of_bbpou: BbpouType,
    /// Registered or official address of the entity.
    pub address: String,
    /// Contact phone number; kept as a string to preserve formatting.
    pub phone_number: String,
    /// Whether a stamped seal is present on the letter.
    pub stamped_seal: YesNo,
    /// Seal details if `stamped_seal` is "Yes"; otherwise null.
    #[serde(default)]
    pub seal_description: Option<String>,
    /// Whether an authorized signatory is present.
    pub authorized_signatory: YesNo,
    /// Signatory name if `authorized_signatory` is "Yes"; otherwise null.
    #[serde(default)]
    pub signatory_name: Option<String>,
    /// Signatory designation if `authorized_signatory` is "Yes"; otherwise null.
    #[serde(default)]
    pub signatory_designation: Option<String>,
    /// Authorization date or the sentinel "date is not mentioned".
    #[serde(default)]
    pub date_of_authorization: AuthorizationDate,
}

impl BbpouParticipation {
    /// Enforce the conditional-null invariants according to `mode`.
    ///
    /// Checks performed:
    /// - `seal_description` populated while `stamped_seal = "No"`
    /// - `signatory_name` populated while `authorized_signatory = "No"`
    /// - `signatory_designation` populated while `authorized_signatory = "No"`
    ///
    /// A missing `seal_description` when `stamped_seal = "Yes"` is only ever
    /// a warning; the letter may show a seal too faint to describe.
    pub fn enforce_invariants(&self, mode: ValidationMode) -> Result<(), ValidatorError> {
        for violation in self.invariant_violations() {
            match mode {
                ValidationMode::Strict => {
                    return Err(ValidatorError::SchemaViolation(violation));
                }
                ValidationMode::Lenient => {
                    warn!("accepting inconsistent record: {violation}");
                }
            }
        }

        if self.stamped_seal == YesNo::Yes && self.seal_description.is_none() {
            warn!("stamped_seal is \"Yes\" but seal_description is null");
        }

        Ok(())
    }

    /// Collect human-readable descriptions of every hard-invariant violation.
    fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.stamped_seal == YesNo::No && self.seal_description.is_some() {
            violations
                .push("seal_description must be null when stamped_seal is \"No\"".to_string());
        }
        if self.authorized_signatory == YesNo::No {
            if self.signatory_name.is_some() {
                violations.push(
                    "signatory_name must be null when authorized_signatory is \"No\"".to_string(),
                );
            }
            if self.signatory_designation.is_some() {
                violations.push(
                    "signatory_designation must be null when authorized_signatory is \"No\""
                        .to_string(),
                );
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> serde_json::Value {
        serde_json::json!({
            "company_name": "Cashfree Payments India Private Limited",
            "types_of_entities": "Non-Bank",
            "type_of_bbpou": "Both Customer and Biller BBPOU",
            "address": "Bengaluru, Karnataka",
            "phone_number": "+91-80-1234 5678",
            "stamped_seal": "Yes",
            "seal_description": "Round company seal, blue ink",
            "authorized_signatory": "Yes",
            "signatory_name": "Jane Doe",
            "signatory_designation": "Director",
            "date_of_authorization": "2024-03-15"
        })
    }

    #[test]
    fn deserialize_complete_record() {
        let record: BbpouParticipation = serde_json::from_value(sample_json()).unwrap();
        assert_eq!(record.types_of_entities, EntityType::NonBank);
        assert_eq!(record.type_of_bbpou, BbpouType::Both);
        assert_eq!(record.stamped_seal, YesNo::Yes);
        assert_eq!(
            record.date_of_authorization,
            AuthorizationDate::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let mut v = sample_json();
        v.as_object_mut().unwrap().remove("company_name");
        let err = serde_json::from_value::<BbpouParticipation>(v).unwrap_err();
        assert!(err.to_string().contains("company_name"));
    }

    #[test]
    fn enum_value_outside_set_is_rejected() {
        let mut v = sample_json();
        v["types_of_entities"] = "NBFC".into();
        assert!(serde_json::from_value::<BbpouParticipation>(v).is_err());
    }

    #[test]
    fn date_sentinel_round_trips() {
        let mut v = sample_json();
        v["date_of_authorization"] = DATE_NOT_MENTIONED.into();
        let record: BbpouParticipation = serde_json::from_value(v).unwrap();
        assert_eq!(record.date_of_authorization, AuthorizationDate::NotMentioned);

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["date_of_authorization"], DATE_NOT_MENTIONED);
    }

    #[test]
    fn date_defaults_to_sentinel_when_absent() {
        let mut v = sample_json();
        v.as_object_mut().unwrap().remove("date_of_authorization");
        let record: BbpouParticipation = serde_json::from_value(v).unwrap();
        assert_eq!(record.date_of_authorization, AuthorizationDate::NotMentioned);
    }

    #[test]
    fn freeform_date_string_is_rejected() {
        let mut v = sample_json();
        v["date_of_authorization"] = "sometime in March".into();
        let err = serde_json::from_value::<BbpouParticipation>(v).unwrap_err();
        assert!(err.to_string().contains("date_of_authorization"));
    }

    #[test]
    fn date_serializes_as_iso() {
        let record: BbpouParticipation = serde_json::from_value(sample_json()).unwrap();
        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["date_of_authorization"], "2024-03-15");
        assert_eq!(v["types_of_entities"], "Non-Bank");
        assert_eq!(v["type_of_bbpou"], "Both Customer and Biller BBPOU");
    }

    #[test]
    fn strict_mode_rejects_seal_description_without_seal() {
        let mut v = sample_json();
        v["stamped_seal"] = "No".into();
        let record: BbpouParticipation = serde_json::from_value(v).unwrap();

        let err = record.enforce_invariants(ValidationMode::Strict).unwrap_err();
        assert!(err.to_string().contains("seal_description"));
    }

    #[test]
    fn lenient_mode_accepts_inconsistent_record() {
        // Upstream behaviour: the inconsistent pair passes through untouched.
        let mut v = sample_json();
        v["stamped_seal"] = "No".into();
        let record: BbpouParticipation = serde_json::from_value(v).unwrap();

        record.enforce_invariants(ValidationMode::Lenient).unwrap();
        assert!(record.seal_description.is_some());
    }

    #[test]
    fn strict_mode_rejects_signatory_fields_without_signatory() {
        let mut v = sample_json();
        v["authorized_signatory"] = "No".into();
        let record: BbpouParticipation = serde_json::from_value(v).unwrap();

        let err = record.enforce_invariants(ValidationMode::Strict).unwrap_err();
        assert!(err.to_string().contains("signatory_name"));
    }

    #[test]
    fn consistent_record_passes_strict_mode() {
        let record: BbpouParticipation = serde_json::from_value(sample_json()).unwrap();
        record.enforce_invariants(ValidationMode::Strict).unwrap();
    }
}
