use serde::{Deserialize, Serialize};

/// Uniform result of one product lookup, regardless of provider.
///
/// `Found` carries the provider's field values in the provider's declared
/// column order; `NotFound` carries a human-readable reason that ends up
/// visible in the output spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupOutcome {
    Found { fields: Vec<String> },
    NotFound { reason: String },
}

impl LookupOutcome {
    pub fn found(fields: Vec<String>) -> Self {
        LookupOutcome::Found { fields }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        LookupOutcome::NotFound { reason: reason.into() }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found { .. })
    }
}
