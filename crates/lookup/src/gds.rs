use async_trait::async_trait;
use serde::Deserialize;
use shelfscan_core::{gtin, LookupOutcome};
use std::time::Duration;

use crate::provider::ProductProvider;

pub const DEFAULT_API_URL: &str =
    "https://bff.gds.org.cn/gds/searching-api/ProductService/ProductListByGTIN";

// The GDS endpoint is the one backing their own web UI and rejects plain
// API-client requests, so we send the headers their frontend sends.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";

/// China national product-information platform (GDS), bearer-token auth.
#[derive(Debug)]
pub struct GdsProvider {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl GdsProvider {
    pub fn new(token: impl Into<String>, api_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token: token.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GdsResponse {
    #[serde(rename = "Code", default)]
    code: i64,
    #[serde(rename = "Msg", default)]
    msg: Option<String>,
    #[serde(rename = "Data", default)]
    data: Option<GdsData>,
}

#[derive(Debug, Deserialize, Default)]
struct GdsData {
    #[serde(rename = "Items", default)]
    items: Vec<GdsItem>,
}

#[derive(Debug, Deserialize, Default)]
struct GdsItem {
    #[serde(rename = "RegulatedProductName", default)]
    product_name: String,
    #[serde(default)]
    gtin: String,
    #[serde(default)]
    brandcn: String,
    #[serde(default)]
    firm_name: String,
    #[serde(default)]
    specification: String,
    #[serde(default)]
    description: String,
}

/// `Code == 1` with a non-empty item list is the only success shape; the
/// first item wins. An empty echoed GTIN falls back to the query barcode.
fn map_response(body: GdsResponse, barcode: &str) -> LookupOutcome {
    if body.code != 1 {
        let msg = body.msg.unwrap_or_else(|| "unknown error".to_string());
        return LookupOutcome::not_found(format!("GDS error: {msg}"));
    }
    let Some(item) = body.data.and_then(|d| d.items.into_iter().next()) else {
        return LookupOutcome::not_found("no matching product");
    };
    let echoed_gtin = if item.gtin.is_empty() { barcode.to_string() } else { item.gtin };
    LookupOutcome::found(vec![
        item.product_name,
        echoed_gtin,
        item.brandcn,
        item.firm_name,
        item.specification,
        item.description,
    ])
}

#[async_trait]
impl ProductProvider for GdsProvider {
    fn name(&self) -> &'static str {
        "gds"
    }

    fn headers(&self) -> &'static [&'static str] {
        &["Product Name", "GTIN", "Brand", "Company", "Net Content", "Description"]
    }

    fn gtin_column(&self) -> Option<usize> {
        Some(1)
    }

    fn min_interval(&self) -> Duration {
        Duration::from_secs(1)
    }

    fn normalize(&self, barcode: &str) -> String {
        gtin::pad_gtin14(barcode)
    }

    async fn lookup(&self, barcode: &str) -> LookupOutcome {
        tracing::info!(barcode, "querying GDS");
        let request = self
            .client
            .get(&self.api_url)
            .query(&[("PageSize", "30"), ("PageIndex", "1"), ("SearchItem", barcode)])
            .bearer_auth(&self.token)
            .header("Accept", "application/json, text/plain, */*")
            .header("Origin", "https://www.gds.org.cn")
            .header("currentRole", "Mine")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(Duration::from_secs(15));

        let response = match request.send().await.and_then(|r| r.error_for_status()) {
            Ok(r) => r,
            Err(e) => return LookupOutcome::not_found(format!("request failed: {e}")),
        };
        match response.json::<GdsResponse>().await {
            Ok(body) => map_response(body, barcode),
            Err(e) => LookupOutcome::not_found(format!("invalid response: {e}")),
        }
    }
}
