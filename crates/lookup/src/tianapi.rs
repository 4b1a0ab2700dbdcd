use async_trait::async_trait;
use serde::Deserialize;
use shelfscan_core::LookupOutcome;
use std::time::Duration;

use crate::provider::ProductProvider;
use crate::util::Text;

pub const DEFAULT_API_URL: &str = "https://apis.tianapi.com/barcode/index";

/// TianAPI barcode lookup, single-key query-parameter auth. Returns the
/// widest field set of the supported providers, including physical package
/// dimensions.
#[derive(Debug)]
pub struct TianApiProvider {
    client: reqwest::Client,
    api_url: String,
    key: String,
}

impl TianApiProvider {
    pub fn new(key: impl Into<String>, api_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            key: key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TianApiResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    result: Option<TianApiGoods>,
}

#[derive(Debug, Deserialize, Default)]
struct TianApiGoods {
    #[serde(default)]
    name: String,
    #[serde(default)]
    barcode: String,
    #[serde(default)]
    spec: String,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    firm_name: String,
    #[serde(default)]
    firm_address: String,
    #[serde(default)]
    firm_status: String,
    #[serde(default)]
    gross_weight: Text,
    #[serde(default)]
    width: Text,
    #[serde(default)]
    height: Text,
    #[serde(default)]
    depth: Text,
    #[serde(default)]
    goods_type: String,
    #[serde(default)]
    goods_pic: String,
}

fn map_response(body: TianApiResponse) -> LookupOutcome {
    match body {
        TianApiResponse { code: 200, result: Some(goods), .. } => LookupOutcome::found(vec![
            goods.name,
            goods.barcode,
            goods.spec,
            goods.brand,
            goods.firm_name,
            goods.firm_address,
            goods.firm_status,
            goods.gross_weight.0,
            goods.width.0,
            goods.height.0,
            goods.depth.0,
            goods.goods_type,
            goods.goods_pic,
        ]),
        TianApiResponse { msg, .. } => {
            let msg = msg.unwrap_or_else(|| "unknown error".to_string());
            LookupOutcome::not_found(format!("TianAPI error: {msg}"))
        }
    }
}

#[async_trait]
impl ProductProvider for TianApiProvider {
    fn name(&self) -> &'static str {
        "tianapi"
    }

    fn headers(&self) -> &'static [&'static str] {
        &[
            "Product Name",
            "Barcode",
            "Spec",
            "Brand",
            "Manufacturer",
            "Manufacturer Address",
            "Manufacturer Status",
            "Gross Weight",
            "Width",
            "Height",
            "Depth",
            "Goods Type",
            "Goods Picture",
        ]
    }

    fn gtin_column(&self) -> Option<usize> {
        Some(1)
    }

    fn min_interval(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn lookup(&self, barcode: &str) -> LookupOutcome {
        tracing::info!(barcode, "querying TianAPI");
        let request = self
            .client
            .get(&self.api_url)
            .query(&[("key", self.key.as_str()), ("barcode", barcode)])
            .timeout(Duration::from_secs(10));

        let response = match request.send().await.and_then(|r| r.error_for_status()) {
            Ok(r) => r,
            Err(e) => return LookupOutcome::not_found(format!("request failed: {e}")),
        };
        match response.json::<TianApiResponse>().await {
            Ok(body) => map_response(body),
            Err(e) => LookupOutcome::not_found(format!("invalid response: {e}")),
        }
    }
}
