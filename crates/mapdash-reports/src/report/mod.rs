//! Report dispatch: a closed set of report kinds served by the report API.

mod client;
mod types;

pub use client::ReportClient;
pub use types::{BinaryReport, JsonReport, LlmInput, ReportKind, ReportPayload, ReportResponse};
