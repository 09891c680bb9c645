//! HTTP clients for the report service and the content-generation service.
//!
//! [`ReportClient`] dispatches a closed set of report kinds and returns either
//! raw document bytes or decoded JSON. [`GenerationClient`] turns an
//! edited LLM input payload into a text/image generation call, retrying
//! transport failures with exponential backoff.

pub mod error;
pub mod generation;
mod http;
pub mod report;
pub mod retry;

pub use error::ClientError;
pub use generation::{
    encode_image, DecodedImage, DisplayResult, GenerationClient, GenerationOutput,
    GenerationRequest, OutputKind, TextVariant, MAX_IMAGE_BYTES,
};
pub use report::{
    BinaryReport, JsonReport, LlmInput, ReportClient, ReportKind, ReportPayload, ReportResponse,
};
pub use retry::RetryPolicy;
