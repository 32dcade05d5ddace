use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ToolError;
use crate::normalize::normalize;
use crate::protocol::CoinInfoParams;
use crate::upstream::{CoinGeckoApi, UpstreamRequest};

/// Full `/coins/{id}` record, reduced to the fields the projection reads.
///
/// Every field is optional: an absent or wrongly typed field projects to an
/// absent field and never fails the record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoinDetail {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<Localized>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<CoinImage>,
    #[serde(default, deserialize_with = "lenient")]
    pub market_data: Option<MarketData>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Localized {
    #[serde(default, deserialize_with = "lenient")]
    pub en: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CoinImage {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub small: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub large: Option<String>,
}

/// Per-currency market data maps plus the unfiltered change percentages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketData {
    #[serde(default, deserialize_with = "lenient")]
    pub current_price: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub market_cap: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_volume: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub high_24h: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub low_24h: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "present")]
    pub price_change_percentage_24h: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub price_change_percentage_7d: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub price_change_percentage_30d: Option<Value>,
}

/// Keep an explicit `null` as `Some(Value::Null)` so it is passed through.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// Decode a field, treating `null` or a type mismatch as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// The record returned to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoinInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<CoinImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_data: Option<ProjectedMarketData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectedMarketData {
    pub current_price: Map<String, Value>,
    pub market_cap: Map<String, Value>,
    pub total_volume: Map<String, Value>,
    pub high_24h: Map<String, Value>,
    pub low_24h: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_change_percentage_24h: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_change_percentage_7d: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_change_percentage_30d: Option<Value>,
}

/// Build the `/coins/{id}` request. Only market data is requested.
pub fn request(params: &CoinInfoParams) -> UpstreamRequest {
    UpstreamRequest::new(format!("/coins/{}", urlencoding::encode(&params.id)))
        .param("localization", "false")
        .param("tickers", "false")
        .param("market_data", "true")
        .param("community_data", "false")
        .param("developer_data", "false")
        .param("sparkline", "false")
}

/// Handle a `get_coin_info` tool call.
pub async fn handle(params: CoinInfoParams, api: &dyn CoinGeckoApi) -> Result<Value, ToolError> {
    let payload = normalize(api.get(&request(&params)).await)?;
    let detail = match payload {
        Value::Object(_) => serde_json::from_value(payload)?,
        _ => CoinDetail::default(),
    };
    let info = project(&detail, &params.vs_currencies);
    Ok(serde_json::to_value(info)?)
}

/// Reduce a full coin record to the requested currencies.
///
/// A currency survives only if its `current_price` entry is truthy; when it
/// does not, it is dropped from all five per-currency maps, even those that
/// hold a value for it.
pub fn project(detail: &CoinDetail, vs_currencies: &[String]) -> CoinInfo {
    CoinInfo {
        id: detail.id.clone(),
        symbol: detail.symbol.clone(),
        name: detail.name.clone(),
        description: detail.description.as_ref().and_then(|d| d.en.clone()),
        image: detail.image.clone(),
        market_data: detail
            .market_data
            .as_ref()
            .map(|md| project_market_data(md, vs_currencies)),
        last_updated: detail.last_updated.clone(),
    }
}

fn project_market_data(md: &MarketData, vs_currencies: &[String]) -> ProjectedMarketData {
    let mut out = ProjectedMarketData {
        price_change_percentage_24h: md.price_change_percentage_24h.clone(),
        price_change_percentage_7d: md.price_change_percentage_7d.clone(),
        price_change_percentage_30d: md.price_change_percentage_30d.clone(),
        ..Default::default()
    };

    for currency in vs_currencies {
        let priced = md
            .current_price
            .as_ref()
            .and_then(|prices| prices.get(currency))
            .is_some_and(is_truthy);
        if !priced {
            continue;
        }

        copy_entry(&md.current_price, &mut out.current_price, currency);
        copy_entry(&md.market_cap, &mut out.market_cap, currency);
        copy_entry(&md.total_volume, &mut out.total_volume, currency);
        copy_entry(&md.high_24h, &mut out.high_24h, currency);
        copy_entry(&md.low_24h, &mut out.low_24h, currency);
    }

    out
}

fn copy_entry(source: &Option<Map<String, Value>>, target: &mut Map<String, Value>, key: &str) {
    if let Some(value) = source.as_ref().and_then(|m| m.get(key)) {
        target.insert(key.to_string(), value.clone());
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
