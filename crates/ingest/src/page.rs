use serde::{Deserialize, Serialize};

/// Extracted text of one document page.
///
/// Plain-text formats without page structure load as a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub text: String,
    /// Name of the owning document file.
    pub source: String,
    /// 1-indexed page number, absent for sources without page structure.
    pub page_number: Option<u32>,
}

impl Page {
    pub fn new(text: String, source: String, page_number: Option<u32>) -> Self {
        Self {
            text,
            source,
            page_number,
        }
    }
}
