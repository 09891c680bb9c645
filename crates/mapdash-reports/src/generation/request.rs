use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ClientError;
use crate::report::LlmInput;

/// Largest reference image accepted for image generation (1 MiB).
pub const MAX_IMAGE_BYTES: usize = 1024 * 1024;

const CONTROL_FIELDS: [&str; 3] = ["output_type", "text_instructions", "image_instructions"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Text,
    Image,
    TextImage,
}

impl OutputKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::TextImage => "text_image",
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Text => "/api/text_new",
            Self::Image => "/api/image_new",
            Self::TextImage => "/api/image_and_text_new",
        }
    }

    /// Whether a reference image must accompany the request.
    #[must_use]
    pub fn needs_image(self) -> bool {
        matches!(self, Self::Image | Self::TextImage)
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputKind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "text_image" => Ok(Self::TextImage),
            other => Err(ClientError::Validation(format!(
                "unknown output_type '{other}' (expected text, image or text_image)"
            ))),
        }
    }
}

/// Base64-encodes a reference image for a generation request.
///
/// # Errors
///
/// [`ClientError::Validation`] if `bytes` is empty or larger than
/// [`MAX_IMAGE_BYTES`].
pub fn encode_image(bytes: &[u8]) -> Result<String, ClientError> {
    if bytes.is_empty() {
        return Err(ClientError::Validation("reference image is empty".to_string()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ClientError::Validation(format!(
            "reference image is {} bytes, limit is {MAX_IMAGE_BYTES}",
            bytes.len()
        )));
    }
    Ok(STANDARD.encode(bytes))
}

/// A validated generation request.
///
/// Only constructible through checked constructors, so an image kind always
/// carries non-empty image data.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    output_kind: OutputKind,
    text_prompt: Option<String>,
    image_prompt: Option<String>,
    image_data: Option<String>,
    product_metadata: Map<String, Value>,
}

impl GenerationRequest {
    /// Builds a request from explicit parts.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] if `output_kind` needs an image and
    /// `image_data` is missing or blank.
    pub fn new(
        output_kind: OutputKind,
        text_prompt: Option<String>,
        image_prompt: Option<String>,
        image_data: Option<String>,
        product_metadata: Map<String, Value>,
    ) -> Result<Self, ClientError> {
        let image_data = image_data.filter(|data| !data.trim().is_empty());
        if output_kind.needs_image() && image_data.is_none() {
            return Err(ClientError::Validation(format!(
                "output_type '{output_kind}' requires a reference image"
            )));
        }
        Ok(Self {
            output_kind,
            text_prompt,
            image_prompt,
            image_data,
            product_metadata,
        })
    }

    /// Classifies an arbitrary JSON brief.
    ///
    /// `output_type`, `text_instructions` and `image_instructions` steer the
    /// request; every other field is forwarded as product metadata.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] if `payload` is not an object, if
    /// `output_type` is missing or unknown, if an instruction field is not a
    /// string, or if a required image is missing.
    pub fn from_payload(payload: Value, image_data: Option<String>) -> Result<Self, ClientError> {
        let Value::Object(fields) = payload else {
            return Err(ClientError::Validation(
                "generation payload must be a JSON object".to_string(),
            ));
        };

        let output_kind = match fields.get("output_type") {
            Some(Value::String(kind)) => kind.parse::<OutputKind>()?,
            Some(Value::Null) | None => {
                return Err(ClientError::Validation("output_type is missing".to_string()))
            }
            Some(other) => {
                return Err(ClientError::Validation(format!(
                    "output_type must be a string, got {other}"
                )))
            }
        };
        let text_prompt = take_string(&fields, "text_instructions")?;
        let image_prompt = take_string(&fields, "image_instructions")?;
        let product_metadata: Map<String, Value> = fields
            .into_iter()
            .filter(|(key, _)| !CONTROL_FIELDS.contains(&key.as_str()))
            .collect();

        Self::new(output_kind, text_prompt, image_prompt, image_data, product_metadata)
    }

    /// Classifies a brief fetched from the LLM-input report, after any edits.
    /// `language` stays in the product metadata.
    ///
    /// # Errors
    ///
    /// Same as [`GenerationRequest::from_payload`].
    pub fn from_llm_input(input: &LlmInput, image_data: Option<String>) -> Result<Self, ClientError> {
        let payload = serde_json::to_value(input).map_err(|e| ClientError::Deserialize {
            context: "llm input".to_string(),
            source: e,
        })?;
        Self::from_payload(payload, image_data)
    }

    #[must_use]
    pub fn output_kind(&self) -> OutputKind {
        self.output_kind
    }

    #[must_use]
    pub fn text_prompt(&self) -> Option<&str> {
        self.text_prompt.as_deref()
    }

    #[must_use]
    pub fn image_prompt(&self) -> Option<&str> {
        self.image_prompt.as_deref()
    }

    #[must_use]
    pub fn product_metadata(&self) -> &Map<String, Value> {
        &self.product_metadata
    }

    /// Wire body for the endpoint matching the output kind.
    pub(crate) fn body(&self) -> RequestBody<'_> {
        let image = self.image_data.as_deref().unwrap_or_default();
        match self.output_kind {
            OutputKind::Text => RequestBody::Text(TextBody {
                text_prompt: self.text_prompt.as_deref(),
                product_data: &self.product_metadata,
            }),
            OutputKind::Image => RequestBody::Image(ImageBody {
                image_prompt: self.image_prompt.as_deref(),
                product_data: &self.product_metadata,
                image,
            }),
            OutputKind::TextImage => RequestBody::TextImage(TextImageBody {
                image_prompt: self.image_prompt.as_deref(),
                text_prompt: self.text_prompt.as_deref(),
                product_data: &self.product_metadata,
                image,
            }),
        }
    }
}

fn take_string(fields: &Map<String, Value>, key: &str) -> Result<Option<String>, ClientError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ClientError::Validation(format!(
            "{key} must be a string, got {other}"
        ))),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TextBody<'a> {
    text_prompt: Option<&'a str>,
    product_data: &'a Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ImageBody<'a> {
    image_prompt: Option<&'a str>,
    product_data: &'a Map<String, Value>,
    image: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct TextImageBody<'a> {
    image_prompt: Option<&'a str>,
    text_prompt: Option<&'a str>,
    product_data: &'a Map<String, Value>,
    image: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum RequestBody<'a> {
    Text(TextBody<'a>),
    Image(ImageBody<'a>),
    TextImage(TextImageBody<'a>),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn brief(output_type: &str) -> Value {
        json!({
            "output_type": output_type,
            "text_instructions": "Three captions",
            "image_instructions": "Bright kitchen scene",
            "language": "English",
            "brand": "Salit",
            "category": "Cooking Oil"
        })
    }

    #[test]
    fn text_request_splits_control_fields_from_metadata() {
        let request = GenerationRequest::from_payload(brief("text"), None).unwrap();
        assert_eq!(request.output_kind(), OutputKind::Text);
        assert_eq!(request.text_prompt(), Some("Three captions"));
        let keys: Vec<&str> = request.product_metadata().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["language", "brand", "category"]);

        let body = serde_json::to_value(request.body()).unwrap();
        assert_eq!(
            body,
            json!({
                "text_prompt": "Three captions",
                "product_data": {"language": "English", "brand": "Salit", "category": "Cooking Oil"}
            })
        );
    }

    #[test]
    fn text_image_body_carries_all_four_fields() {
        let request =
            GenerationRequest::from_payload(brief("text_image"), Some("aGVsbG8=".to_string()))
                .unwrap();
        let body = serde_json::to_value(request.body()).unwrap();
        let keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["image_prompt", "text_prompt", "product_data", "image"]);
        assert_eq!(body["image"], "aGVsbG8=");
    }

    #[test]
    fn image_kinds_require_image_data() {
        for kind in ["image", "text_image"] {
            let err = GenerationRequest::from_payload(brief(kind), None).unwrap_err();
            assert!(matches!(err, ClientError::Validation(_)), "{kind}");
            let err = GenerationRequest::from_payload(brief(kind), Some("  ".to_string()))
                .unwrap_err();
            assert!(matches!(err, ClientError::Validation(_)), "{kind}");
        }
    }

    #[test]
    fn unknown_or_missing_output_type_is_rejected() {
        let err = GenerationRequest::from_payload(brief("video"), None).unwrap_err();
        assert!(matches!(err, ClientError::Validation(msg) if msg.contains("video")));
        let err = GenerationRequest::from_payload(json!({"brand": "Salit"}), None).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        let err = GenerationRequest::from_payload(json!(["text"]), None).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn llm_input_keeps_language_as_metadata() {
        let mut input = LlmInput {
            output_type: Some("image".to_string()),
            image_instructions: Some("Market stall".to_string()),
            language: Some("Swahili".to_string()),
            ..LlmInput::default()
        };
        input
            .product_fields
            .insert("brand".to_string(), json!("Fresh Fri"));
        let request =
            GenerationRequest::from_llm_input(&input, Some("aGVsbG8=".to_string())).unwrap();
        assert_eq!(request.image_prompt(), Some("Market stall"));
        assert_eq!(request.product_metadata()["language"], "Swahili");
        assert_eq!(request.product_metadata()["brand"], "Fresh Fri");
    }

    #[test]
    fn encode_image_enforces_size_limits() {
        assert_eq!(encode_image(b"hello").unwrap(), "aGVsbG8=");
        assert!(matches!(encode_image(&[]), Err(ClientError::Validation(_))));
        let too_big = vec![0u8; MAX_IMAGE_BYTES + 1];
        assert!(matches!(encode_image(&too_big), Err(ClientError::Validation(_))));
    }
}
