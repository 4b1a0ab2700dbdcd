use async_trait::async_trait;
use shelfscan_core::LookupOutcome;
use std::collections::HashMap;
use std::time::Duration;

/// Abstraction over a product-lookup API.
///
/// Variants differ in endpoint, auth scheme (query-param key/secret, bearer
/// token, app-code header) and response field names; each issues one HTTP
/// request per barcode and folds every failure mode (transport, HTTP status,
/// provider status field, missing data) into a `NotFound` outcome so the
/// pipeline never aborts on a single row.
#[async_trait]
pub trait ProductProvider: Send + Sync + std::fmt::Debug {
    /// Short name used in logs and default output file names.
    fn name(&self) -> &'static str;

    /// Column headers appended to the output sheet, in write order.
    fn headers(&self) -> &'static [&'static str];

    /// Index within `headers()` of the column that holds the barcode itself,
    /// when the provider echoes one back.
    fn gtin_column(&self) -> Option<usize>;

    /// Minimum pause between consecutive requests (provider QPS terms).
    fn min_interval(&self) -> Duration;

    /// Pre-lookup normalization. Default is a plain trim; GDS overrides this
    /// to left-pad 13-digit values to GTIN-14.
    fn normalize(&self, barcode: &str) -> String {
        barcode.trim().to_string()
    }

    async fn lookup(&self, barcode: &str) -> LookupOutcome;
}

// ── Mock provider (used for pipeline tests) ───────────────────────────────────

/// Deterministic in-memory provider: a fixed barcode → fields table.
/// Unknown barcodes come back `NotFound`, which makes re-runs byte-stable.
#[derive(Debug)]
pub struct MockProvider {
    records: HashMap<String, Vec<String>>,
}

impl MockProvider {
    pub fn new(records: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        Self { records: records.into_iter().collect() }
    }

    pub fn empty() -> Self {
        Self { records: HashMap::new() }
    }
}

#[async_trait]
impl ProductProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn headers(&self) -> &'static [&'static str] {
        &["Product Name", "GTIN", "Brand"]
    }

    fn gtin_column(&self) -> Option<usize> {
        Some(1)
    }

    fn min_interval(&self) -> Duration {
        Duration::ZERO
    }

    async fn lookup(&self, barcode: &str) -> LookupOutcome {
        match self.records.get(barcode) {
            Some(fields) => LookupOutcome::found(fields.clone()),
            None => LookupOutcome::not_found("no matching product"),
        }
    }
}
