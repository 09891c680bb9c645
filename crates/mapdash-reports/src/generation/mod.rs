//! Text/image content generation from an LLM input brief.

mod client;
mod request;
mod response;

pub use client::GenerationClient;
pub use request::{encode_image, GenerationRequest, OutputKind, MAX_IMAGE_BYTES};
pub use response::{DecodedImage, DisplayResult, GenerationOutput, TextVariant};
