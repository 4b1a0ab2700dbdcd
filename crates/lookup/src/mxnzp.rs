use async_trait::async_trait;
use serde::Deserialize;
use shelfscan_core::LookupOutcome;
use std::time::Duration;

use crate::provider::ProductProvider;
use crate::util::Text;

pub const DEFAULT_API_URL: &str = "https://www.mxnzp.com/api/barcode/goods/details";

/// MXNZP aggregated goods API, app-id/app-secret query-parameter auth.
#[derive(Debug)]
pub struct MxnzpProvider {
    client: reqwest::Client,
    api_url: String,
    app_id: String,
    app_secret: String,
}

impl MxnzpProvider {
    pub fn new(
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
        api_url: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MxnzpResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<MxnzpGoods>,
}

#[derive(Debug, Deserialize, Default)]
struct MxnzpGoods {
    #[serde(rename = "goodsName", default)]
    goods_name: String,
    #[serde(default)]
    barcode: String,
    #[serde(default)]
    price: Text,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    supplier: String,
    #[serde(default)]
    standard: String,
}

fn map_response(body: MxnzpResponse) -> LookupOutcome {
    match body {
        MxnzpResponse { code: 1, data: Some(goods), .. } => LookupOutcome::found(vec![
            goods.goods_name,
            goods.barcode,
            goods.price.0,
            goods.brand,
            goods.supplier,
            goods.standard,
        ]),
        MxnzpResponse { msg, .. } => {
            let msg = msg.unwrap_or_else(|| "unknown error".to_string());
            LookupOutcome::not_found(format!("MXNZP error: {msg}"))
        }
    }
}

#[async_trait]
impl ProductProvider for MxnzpProvider {
    fn name(&self) -> &'static str {
        "mxnzp"
    }

    fn headers(&self) -> &'static [&'static str] {
        &["Product Name", "Barcode", "Price", "Brand", "Supplier", "Spec"]
    }

    fn gtin_column(&self) -> Option<usize> {
        Some(1)
    }

    fn min_interval(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn lookup(&self, barcode: &str) -> LookupOutcome {
        tracing::info!(barcode, "querying MXNZP");
        let request = self
            .client
            .get(&self.api_url)
            .query(&[
                ("barcode", barcode),
                ("app_id", &self.app_id),
                ("app_secret", &self.app_secret),
            ])
            .timeout(Duration::from_secs(10));

        let response = match request.send().await.and_then(|r| r.error_for_status()) {
            Ok(r) => r,
            Err(e) => return LookupOutcome::not_found(format!("request failed: {e}")),
        };
        match response.json::<MxnzpResponse>().await {
            Ok(body) => map_response(body),
            Err(e) => LookupOutcome::not_found(format!("invalid response: {e}")),
        }
    }
}
