//! Request assembly: build the multimodal message sequence for extraction.
//!
//! The request layout is fixed and its ordering matters:
//!
//! 1. **System message** — the field-by-field extraction policy, including
//!    the JSON shape the model must return
//! 2. **User message** — the task instruction text followed by the encoded
//!    page images, in page order
//!
//! Text always precedes evidence: model accuracy degrades noticeably when
//! images arrive before the instructions that explain what to look for.

use crate::config::ValidationConfig;
use crate::prompts::{EXTRACTION_POLICY, TASK_INSTRUCTION};
use edgequake_llm::{ChatMessage, ImageData};

/// The assembled extraction request, before conversion to provider messages.
///
/// Holding the three parts explicitly keeps the layout checkable: the policy
/// (or its override), the instruction, and the image parts in page order.
pub struct ExtractionRequest {
    /// System-level extraction policy; the configured override when set.
    pub policy: String,
    /// User-level task instruction.
    pub instruction: String,
    /// Encoded page images, page order preserved.
    pub image_parts: Vec<ImageData>,
}

impl ExtractionRequest {
    /// Assemble the request from the ordered page image parts.
    pub fn new(image_parts: Vec<ImageData>, config: &ValidationConfig) -> Self {
        let policy = config
            .system_prompt
            .clone()
            .unwrap_or_else(|| EXTRACTION_POLICY.to_string());

        Self {
            policy,
            instruction: TASK_INSTRUCTION.to_string(),
            image_parts,
        }
    }

    /// Convert into the provider message sequence: policy first, then the
    /// instruction with the images attached.
    pub fn into_messages(self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.policy),
            ChatMessage::user_with_images(self.instruction, self.image_parts),
        ]
    }
}

/// Assemble the extraction request from the ordered page image parts.
///
/// `image_parts` must already be in page order; this function preserves it.
pub fn build_messages(image_parts: Vec<ImageData>, config: &ValidationConfig) -> Vec<ChatMessage> {
    ExtractionRequest::new(image_parts, config).into_messages()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(n: usize) -> Vec<ImageData> {
        (0..n)
            .map(|i| ImageData::new(format!("payload-{i}"), "image/jpeg"))
            .collect()
    }

    #[test]
    fn request_carries_policy_then_instruction_then_images() {
        let config = ValidationConfig::default();
        let request = ExtractionRequest::new(parts(3), &config);

        assert_eq!(request.policy, EXTRACTION_POLICY);
        assert_eq!(request.instruction, TASK_INSTRUCTION);

        let payloads: Vec<&str> = request.image_parts.iter().map(|p| p.data.as_str()).collect();
        assert_eq!(payloads, vec!["payload-0", "payload-1", "payload-2"]);

        let messages = request.into_messages();
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn system_prompt_override_replaces_the_default_policy() {
        let config = ValidationConfig::builder()
            .system_prompt("custom policy")
            .build()
            .unwrap();
        let request = ExtractionRequest::new(parts(1), &config);

        assert_eq!(request.policy, "custom policy");
        assert_eq!(request.instruction, TASK_INSTRUCTION);
    }

    #[test]
    fn empty_page_set_still_builds_two_messages() {
        let config = ValidationConfig::default();
        let messages = build_messages(parts(0), &config);
        assert_eq!(messages.len(), 2);
    }
}
