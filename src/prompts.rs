//! Prompts for VLM-based BBPOU participation-letter extraction.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — tweaking a field's extraction rule or the
//!    declared response shape requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without
//!    spinning up a real VLM, so a renamed schema field that is forgotten
//!    here is caught immediately.
//!
//! Callers can override the policy via
//! [`crate::config::ValidationConfig::system_prompt`]; the constants here are
//! used only when no override is provided.

/// System-level extraction policy: per-field rules plus the exact JSON shape
/// the model must return.
///
/// Instructions always precede the page images in the request — model
/// accuracy depends on reading the rules before the evidence.
pub const EXTRACTION_POLICY: &str = r#"You are a meticulous document examiner. You will receive every page of a BBPOU (Bharat Bill Payment Operating Unit) participation letter as images, in page order. Extract the participation details exactly as they appear in the document.

Field-by-field rules:

1. company_name
   - The legal name of the company or entity submitting the letter,
     usually in the letterhead or the opening paragraph.

2. types_of_entities
   - "Bank" if the entity is a bank (scheduled, commercial, cooperative,
     payments bank); "Non-Bank" for every other entity (payment aggregators,
     fintechs, NBFCs).

3. type_of_bbpou
   - Exactly one of: "Customer BBPOU", "Biller BBPOU",
     "Both Customer and Biller BBPOU".
   - If the letter states participation as both customer and biller operating
     unit, use "Both Customer and Biller BBPOU".

4. address
   - The registered or official address of the entity as written.

5. phone_number
   - The contact phone number, copied verbatim. Preserve spacing, dashes,
     and country codes exactly as printed. Do not reformat.

6. stamped_seal
   - "Yes" if any stamped or embossed company seal is visible on any page
     (round stamps, rubber stamps, embossed seals); otherwise "No".

7. seal_description
   - When stamped_seal is "Yes": a short description of the seal
     (shape, colour, text, placement). When stamped_seal is "No": null.

8. authorized_signatory
   - "Yes" if the letter carries a handwritten or printed signature block
     of an authorized person; otherwise "No".

9. signatory_name
   - The signatory's name when authorized_signatory is "Yes"; otherwise null.

10. signatory_designation
    - The signatory's designation or title (e.g. "Director",
      "Chief Executive Officer") when authorized_signatory is "Yes";
      otherwise null.

11. date_of_authorization
    - The date the letter was signed or authorized, normalised to YYYY-MM-DD.
    - If no date appears anywhere in the document, use the exact text
      "date is not mentioned". Never invent a date and never use any other
      placeholder text.

Respond with a single JSON object of exactly this shape and nothing else
(no markdown fences, no commentary):

{
  "company_name": "<string>",
  "types_of_entities": "Bank" | "Non-Bank",
  "type_of_bbpou": "Customer BBPOU" | "Biller BBPOU" | "Both Customer and Biller BBPOU",
  "address": "<string>",
  "phone_number": "<string>",
  "stamped_seal": "Yes" | "No",
  "seal_description": "<string>" | null,
  "authorized_signatory": "Yes" | "No",
  "signatory_name": "<string>" | null,
  "signatory_designation": "<string>" | null,
  "date_of_authorization": "YYYY-MM-DD" | "date is not mentioned"
}"#;

/// User-level task instruction sent alongside the page images.
pub const TASK_INSTRUCTION: &str =
    "Extract BBPOU participation details from this document and return the structured response.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_names_every_schema_field() {
        for field in [
            "company_name",
            "types_of_entities",
            "type_of_bbpou",
            "address",
            "phone_number",
            "stamped_seal",
            "seal_description",
            "authorized_signatory",
            "signatory_name",
            "signatory_designation",
            "date_of_authorization",
        ] {
            assert!(
                EXTRACTION_POLICY.contains(field),
                "extraction policy is missing field: {field}"
            );
        }
    }

    #[test]
    fn policy_declares_the_date_sentinel() {
        assert!(EXTRACTION_POLICY.contains(crate::schema::DATE_NOT_MENTIONED));
    }

    #[test]
    fn policy_declares_all_enum_values() {
        for value in [
            "\"Bank\"",
            "\"Non-Bank\"",
            "Customer BBPOU",
            "Biller BBPOU",
            "Both Customer and Biller BBPOU",
        ] {
            assert!(EXTRACTION_POLICY.contains(value), "missing value: {value}");
        }
    }
}
