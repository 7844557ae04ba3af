//! Visual-language-model annotation.
//!
//! [`VlmAnnotator`] sends a shot's representative still, together with a
//! user prompt, to an OpenAI-compatible `/v1/chat/completions` endpoint and
//! records the model's reply as the shot's label. Local inference servers
//! (LM Studio, Ollama, llama.cpp and friends) all serve this surface, so no
//! vendor SDK is needed.
//!
//! The request embeds the still as a base64 JPEG data URI. The reply's text
//! content becomes the annotation label verbatim (trimmed), which is why the
//! prompt should instruct the model to answer with the classification only.
//!
//! # Example
//!
//! ```no_run
//! use shotscribe::{VlmAnnotator, VlmOptions};
//!
//! let detector = VlmAnnotator::new(
//!     VlmOptions::new("qwen2-vl-7b-instruct")
//!         .base_url("http://127.0.0.1:1234")
//!         .prompt("Classify the camera framing of this shot. \
//!                  Answer with one of: close-up, medium, wide."),
//! );
//! ```

use std::io::Cursor;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::{
    annotate::{Annotation, Annotator},
    error::ShotscribeError,
    shot::Shot,
};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:1234";
const DEFAULT_PROMPT: &str = "You are an expert annotator of videos and cinematography. \
    You are given the representative frame of one shot from a longer video. \
    Classify the shot's content. Only return the classification.";

/// Configuration for a [`VlmAnnotator`].
#[derive(Debug, Clone)]
#[must_use]
pub struct VlmOptions {
    /// Base URL of the OpenAI-compatible server (no trailing `/v1`).
    pub base_url: String,
    /// Model name, as known to the server.
    pub model: String,
    /// Prompt sent alongside each still.
    pub prompt: String,
    /// Optional detector identifier override.
    ///
    /// Defaults to `vlm:{model}`. Override this when running the same model
    /// twice with different prompts, so the two runs land in different
    /// export columns.
    pub detector_id: Option<String>,
    /// Maximum tokens requested from the model. Default: 256.
    pub max_tokens: u32,
    /// Per-request timeout. Default: 120 seconds.
    pub timeout: Duration,
}

impl VlmOptions {
    /// Create options for the given model with defaults for everything else.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            prompt: DEFAULT_PROMPT.to_string(),
            detector_id: None,
            max_tokens: 256,
            timeout: Duration::from_secs(120),
        }
    }

    /// Set the server base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the prompt sent with each still.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Override the detector identifier.
    pub fn detector_id(mut self, detector_id: impl Into<String>) -> Self {
        self.detector_id = Some(detector_id.into());
        self
    }

    /// Set the maximum tokens requested from the model.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Chat-completions request payload.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrlPayload },
}

#[derive(Serialize)]
struct ImageUrlPayload {
    url: String,
}

/// Chat-completions reply payload (only the fields we read).
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// A detector backed by a remote visual-language model.
///
/// The reported confidence is always 1.0 — the chat-completions protocol
/// returns no calibrated probability — and the detector identifier encodes
/// the model name so downstream analysis can tell detectors apart.
pub struct VlmAnnotator {
    options: VlmOptions,
    detector_id: String,
    agent: ureq::Agent,
}

impl VlmAnnotator {
    /// Create an annotator from the given options.
    pub fn new(options: VlmOptions) -> Self {
        let detector_id = options
            .detector_id
            .clone()
            .unwrap_or_else(|| format!("vlm:{}", options.model));
        let agent = ureq::AgentBuilder::new()
            .timeout(options.timeout)
            .build();
        Self {
            options,
            detector_id,
            agent,
        }
    }

    /// The endpoint URL requests are sent to.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.options.base_url.trim_end_matches('/')
        )
    }

    fn request_error(&self, reason: String) -> ShotscribeError {
        ShotscribeError::AnnotatorRequest {
            detector: self.detector_id.clone(),
            reason,
        }
    }

    fn reply_error(&self, reason: String) -> ShotscribeError {
        ShotscribeError::AnnotatorReply {
            detector: self.detector_id.clone(),
            reason,
        }
    }

    /// Encode a still as a base64 JPEG data URI.
    fn encode_still(&self, image: &DynamicImage) -> Result<String, ShotscribeError> {
        let mut jpeg_bytes = Cursor::new(Vec::new());
        image.write_to(&mut jpeg_bytes, image::ImageFormat::Jpeg)?;
        Ok(format!(
            "data:image/jpeg;base64,{}",
            BASE64.encode(jpeg_bytes.into_inner())
        ))
    }
}

impl Annotator for VlmAnnotator {
    fn id(&self) -> &str {
        &self.detector_id
    }

    fn annotate(
        &self,
        shot: &Shot,
        image: &DynamicImage,
    ) -> Result<Vec<Annotation>, ShotscribeError> {
        let data_uri = self.encode_still(image)?;

        let request = ChatRequest {
            model: &self.options.model,
            max_tokens: self.options.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: &self.options.prompt,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrlPayload { url: data_uri },
                    },
                ],
            }],
        };

        log::debug!(
            "Requesting VLM annotation for {} (model={})",
            shot.id(),
            self.options.model,
        );

        let response = self
            .agent
            .post(&self.endpoint())
            .send_json(&request)
            .map_err(|error| match error {
                ureq::Error::Status(status, response) => {
                    let body = response.into_string().unwrap_or_default();
                    self.request_error(format!("server returned HTTP {status}: {body}"))
                }
                ureq::Error::Transport(transport) => self.request_error(transport.to_string()),
            })?;

        let reply: ChatResponse = response
            .into_json()
            .map_err(|error| self.reply_error(format!("malformed JSON reply: {error}")))?;

        let content = reply
            .choices
            .first()
            .map(|choice| choice.message.content.trim())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| self.reply_error("reply contained no choices".to_string()))?;

        log::debug!("VLM reply for {}: {}", shot.id(), content);

        Ok(vec![Annotation {
            label: content.to_string(),
            confidence: 1.0,
            detector: self.detector_id.clone(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detector_id_defaults_to_model_name() {
        let annotator = VlmAnnotator::new(VlmOptions::new("qwen2-vl-7b-instruct"));
        assert_eq!(annotator.id(), "vlm:qwen2-vl-7b-instruct");
    }

    #[test]
    fn detector_id_can_be_overridden() {
        let annotator =
            VlmAnnotator::new(VlmOptions::new("qwen2-vl-7b-instruct").detector_id("framing"));
        assert_eq!(annotator.id(), "framing");
    }

    #[test]
    fn endpoint_normalises_trailing_slash() {
        let annotator =
            VlmAnnotator::new(VlmOptions::new("m").base_url("http://localhost:1234/"));
        assert_eq!(
            annotator.endpoint(),
            "http://localhost:1234/v1/chat/completions"
        );
    }

    #[test]
    fn request_payload_shape() {
        let request = ChatRequest {
            model: "m",
            max_tokens: 16,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: "classify" },
                    ContentPart::ImageUrl {
                        image_url: ImageUrlPayload {
                            url: "data:image/jpeg;base64,AAAA".to_string(),
                        },
                    },
                ],
            }],
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["messages"][0]["content"][0]["type"], "text");
        assert_eq!(value["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(
            value["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,AAAA"
        );
    }
}
