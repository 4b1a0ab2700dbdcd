use async_trait::async_trait;
use serde::Deserialize;
use shelfscan_core::LookupOutcome;
use std::time::Duration;

use crate::provider::ProductProvider;

pub const DEFAULT_API_URL: &str = "https://barcode100.market.alicloudapi.com/getBarcode";

/// Aliyun marketplace barcode API, `APPCODE` header auth. Leaner field set
/// and a much looser rate limit than the other providers.
#[derive(Debug)]
pub struct AliMarketProvider {
    client: reqwest::Client,
    api_url: String,
    appcode: String,
}

impl AliMarketProvider {
    pub fn new(appcode: impl Into<String>, api_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            appcode: appcode.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AliMarketResponse {
    // This API reports status as a string, not a number.
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(rename = "ItemName", default)]
    item_name: String,
    #[serde(default)]
    gpcname: String,
    #[serde(rename = "ItemClassName", default)]
    item_class_name: String,
}

fn map_response(body: AliMarketResponse) -> LookupOutcome {
    if body.status != "200" {
        let msg = body.message.unwrap_or_else(|| "unknown error".to_string());
        return LookupOutcome::not_found(format!("Ali market error: {msg}"));
    }
    LookupOutcome::found(vec![body.item_name, body.gpcname, body.item_class_name])
}

#[async_trait]
impl ProductProvider for AliMarketProvider {
    fn name(&self) -> &'static str {
        "alimarket"
    }

    fn headers(&self) -> &'static [&'static str] {
        &["Product Name", "GPC Category", "Item Class"]
    }

    fn gtin_column(&self) -> Option<usize> {
        None
    }

    fn min_interval(&self) -> Duration {
        Duration::from_millis(100)
    }

    async fn lookup(&self, barcode: &str) -> LookupOutcome {
        tracing::info!(barcode, "querying Ali market");
        let request = self
            .client
            .get(&self.api_url)
            .query(&[("Code", barcode)])
            .header("Authorization", format!("APPCODE {}", self.appcode))
            .timeout(Duration::from_secs(10));

        let response = match request.send().await.and_then(|r| r.error_for_status()) {
            Ok(r) => r,
            Err(e) => return LookupOutcome::not_found(format!("request failed: {e}")),
        };
        match response.json::<AliMarketResponse>().await {
            Ok(body) => map_response(body),
            Err(e) => LookupOutcome::not_found(format!("invalid response: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> AliMarketResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn string_status_200_is_success() {
        let body = parse(json!({
            "status": "200",
            "ItemName": "Hand Soap",
            "gpcname": "Personal Care",
            "ItemClassName": "Soap"
        }));
        assert_eq!(
            map_response(body),
            LookupOutcome::found(vec![
                "Hand Soap".into(),
                "Personal Care".into(),
                "Soap".into()
            ])
        );
    }

    #[test]
    fn numeric_looking_error_status_is_not_found() {
        let body = parse(json!({ "status": "404", "message": "no record" }));
        assert_eq!(
            map_response(body),
            LookupOutcome::not_found("Ali market error: no record")
        );
    }

    #[test]
    fn missing_status_is_not_found() {
        let body = parse(json!({ "ItemName": "x" }));
        assert!(!map_response(body).is_found());
    }
}
