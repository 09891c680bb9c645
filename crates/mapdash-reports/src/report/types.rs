use std::fmt;
use std::str::FromStr;

use mapdash_core::slugify;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClientError;

/// Reports delivered as an opaque document (PDF bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryReport {
    MtExecutiveSummary,
    MtTerritoryReport,
    GtExecutiveSummary,
    GtTerritoryReport,
}

impl BinaryReport {
    pub const ALL: [Self; 4] = [
        Self::MtExecutiveSummary,
        Self::MtTerritoryReport,
        Self::GtExecutiveSummary,
        Self::GtTerritoryReport,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::MtExecutiveSummary => "mt_executive_summary",
            Self::MtTerritoryReport => "mt_territory_report",
            Self::GtExecutiveSummary => "gt_executive_summary",
            Self::GtTerritoryReport => "gt_territory_report",
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::MtExecutiveSummary => "/api/mt/executive_summary",
            Self::MtTerritoryReport => "/api/mt/territory_report",
            Self::GtExecutiveSummary => "/api/gt/executive_summary",
            Self::GtTerritoryReport => "/api/gt/territory_report",
        }
    }
}

/// Reports delivered as structured JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonReport {
    GtLlmInput,
}

impl JsonReport {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GtLlmInput => "gt_llm_input",
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::GtLlmInput => "/api/gt/llm_input",
        }
    }
}

/// Every report the service exposes, tagged by response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Binary(BinaryReport),
    Json(JsonReport),
}

impl ReportKind {
    pub const ALL: [Self; 5] = [
        Self::Binary(BinaryReport::MtExecutiveSummary),
        Self::Json(JsonReport::GtLlmInput),
        Self::Binary(BinaryReport::MtTerritoryReport),
        Self::Binary(BinaryReport::GtExecutiveSummary),
        Self::Binary(BinaryReport::GtTerritoryReport),
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Binary(r) => r.name(),
            Self::Json(r) => r.name(),
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Binary(r) => r.path(),
            Self::Json(r) => r.path(),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportKind {
    type Err = ClientError;

    /// Unknown names are a [`ClientError::Configuration`], never a silent
    /// default endpoint.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| ClientError::Configuration(format!("unknown report kind '{name}'")))
    }
}

/// Selection sent as the JSON body of every report request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub brand: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub territory: Option<String>,
}

impl ReportPayload {
    #[must_use]
    pub fn new(brand: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            category: category.into(),
            territory: None,
        }
    }

    #[must_use]
    pub fn with_territory(mut self, territory: impl Into<String>) -> Self {
        self.territory = Some(territory.into());
        self
    }

    /// Download name for `report`, e.g.
    /// `gt_territory_report_salit_cooking-oil_rift-valley.pdf`.
    #[must_use]
    pub fn file_name(&self, report: BinaryReport) -> String {
        let mut name = format!(
            "{}_{}_{}",
            report.name(),
            slugify(&self.brand),
            slugify(&self.category)
        );
        if let Some(territory) = self.territory.as_deref().filter(|t| !t.trim().is_empty()) {
            name.push('_');
            name.push_str(&slugify(territory));
        }
        name.push_str(".pdf");
        name
    }
}

/// Result of [`ReportClient::fetch_report`](crate::ReportClient::fetch_report).
#[derive(Debug, Clone, PartialEq)]
pub enum ReportResponse {
    Binary(Vec<u8>),
    Json(Value),
}

/// The generation brief returned by the LLM-input report.
///
/// Everything other than the instruction fields is product metadata and is
/// kept verbatim in `product_fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(flatten)]
    pub product_fields: Map<String, Value>,
}
