//! Result types returned by a conversion.

use serde::{Deserialize, Serialize};

/// Confirmation text placed in [`ExportReceipt::info`].
pub const EXPORT_INFO: &str = "The PDF file has been saved to your local file system";

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConvertResult {
    /// The PDF bytes returned by the service.
    Pdf(Vec<u8>),
    /// A JSON body returned by the service without an `error` field.
    Json(serde_json::Value),
    /// The PDF was written to the requested `export` path.
    Exported(ExportReceipt),
}

impl ConvertResult {
    /// The PDF bytes, when the result was returned rather than exported.
    pub fn as_pdf(&self) -> Option<&[u8]> {
        match self {
            ConvertResult::Pdf(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_receipt(&self) -> Option<&ExportReceipt> {
        match self {
            ConvertResult::Exported(receipt) => Some(receipt),
            _ => None,
        }
    }
}

/// Acknowledgment returned in place of the PDF when it was exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReceipt {
    pub success: bool,
    pub info: String,
    pub file_name: String,
}

impl ExportReceipt {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            success: true,
            info: EXPORT_INFO.to_string(),
            file_name: file_name.into(),
        }
    }
}
