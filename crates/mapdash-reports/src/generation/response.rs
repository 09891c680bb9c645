use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::Error as _;
use serde_json::Value;

use super::request::OutputKind;
use crate::error::ClientError;

/// How many variants the generation service returns per call.
const VARIANTS: usize = 3;

/// One generated text variant: titled sections in response order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextVariant {
    /// Response key, e.g. `output_2`.
    pub label: String,
    pub sections: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Response key, e.g. `result1`.
    pub label: String,
    pub bytes: Vec<u8>,
}

/// Decoded generation result, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayResult {
    Text(Vec<TextVariant>),
    Image(Vec<DecodedImage>),
    TextImage {
        text: Vec<TextVariant>,
        images: Vec<DecodedImage>,
    },
}

impl DisplayResult {
    #[must_use]
    pub fn text_variants(&self) -> &[TextVariant] {
        match self {
            Self::Text(text) | Self::TextImage { text, .. } => text,
            Self::Image(_) => &[],
        }
    }

    #[must_use]
    pub fn images(&self) -> &[DecodedImage] {
        match self {
            Self::Image(images) | Self::TextImage { images, .. } => images,
            Self::Text(_) => &[],
        }
    }
}

/// A successful [`GenerationClient::run_with_retry`](crate::GenerationClient::run_with_retry).
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutput {
    pub display: DisplayResult,
    /// Attempts made, including the successful one.
    pub attempts: u32,
    /// Wall time across all attempts and backoff sleeps.
    pub elapsed: Duration,
}

pub(crate) fn decode(kind: OutputKind, body: &Value) -> Result<DisplayResult, ClientError> {
    match kind {
        OutputKind::Text => decode_text(body, kind.name()).map(DisplayResult::Text),
        OutputKind::Image => decode_images(body, kind.name()).map(DisplayResult::Image),
        OutputKind::TextImage => {
            let text = match body.get("text") {
                None | Some(Value::Null) => Vec::new(),
                Some(text) => decode_text(text, "text_image.text")?,
            };
            let images = match body.get("image_result") {
                None | Some(Value::Null) => Vec::new(),
                Some(images) => decode_images(images, "text_image.image_result")?,
            };
            Ok(DisplayResult::TextImage { text, images })
        }
    }
}

fn shape_error(context: &str, message: &str) -> ClientError {
    ClientError::Deserialize {
        context: context.to_string(),
        source: serde_json::Error::custom(message),
    }
}

/// `{output_1: {title: body, ...}, ...}`; absent variants are skipped.
fn decode_text(body: &Value, context: &str) -> Result<Vec<TextVariant>, ClientError> {
    let object = body
        .as_object()
        .ok_or_else(|| shape_error(context, "expected a JSON object"))?;

    let mut variants = Vec::new();
    for idx in 1..=VARIANTS {
        let label = format!("output_{idx}");
        let sections = match object.get(&label) {
            None | Some(Value::Null) => continue,
            Some(Value::Object(sections)) => sections,
            Some(_) => {
                return Err(shape_error(
                    context,
                    &format!("`{label}` is not an object of titled sections"),
                ))
            }
        };
        let sections = sections
            .iter()
            .map(|(title, body)| {
                let body = match body {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (title.clone(), body)
            })
            .collect();
        variants.push(TextVariant { label, sections });
    }
    Ok(variants)
}

/// `{result1: "<base64>", ...}`; absent or empty variants are skipped.
fn decode_images(body: &Value, context: &str) -> Result<Vec<DecodedImage>, ClientError> {
    let object = body
        .as_object()
        .ok_or_else(|| shape_error(context, "expected a JSON object"))?;

    let mut images = Vec::new();
    for idx in 1..=VARIANTS {
        let label = format!("result{idx}");
        let encoded = match object.get(&label) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) if s.trim().is_empty() => continue,
            Some(Value::String(s)) => s.trim(),
            Some(_) => {
                return Err(shape_error(
                    context,
                    &format!("`{label}` is not a base64 string"),
                ))
            }
        };
        let bytes = STANDARD.decode(encoded).map_err(|e| ClientError::Decode {
            context: format!("{context}.{label}"),
            source: e,
        })?;
        images.push(DecodedImage { label, bytes });
    }
    Ok(images)
}
