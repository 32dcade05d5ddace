//! Integration tests for the four tool handlers.
//!
//! Handlers are exercised directly against a stub upstream, then wrapped in
//! the result envelope the dispatcher returns.

mod common;

use common::{shared, Reply, StubApi};
use mcp_coingecko_server::handlers::{self, coin_info, coins_list, price, trending};
use mcp_coingecko_server::protocol::{
    CoinInfoParams, CoinsListParams, PriceParams, ToolCallParams, ToolResult,
};
use serde_json::json;

fn price_params(ids: &[&str], vs: &[&str]) -> PriceParams {
    PriceParams {
        ids: ids.iter().map(|s| s.to_string()).collect(),
        vs_currencies: vs.iter().map(|s| s.to_string()).collect(),
        include_market_cap: false,
        include_24hr_vol: false,
        include_24hr_change: false,
    }
}

fn coin_params(id: &str, vs: &[&str]) -> CoinInfoParams {
    CoinInfoParams {
        id: id.to_string(),
        vs_currencies: vs.iter().map(|s| s.to_string()).collect(),
    }
}

// ---------------------------------------------------------------------------
// get_price
// ---------------------------------------------------------------------------

#[tokio::test]
async fn price_joins_lists_and_omits_false_flags() {
    let stub = StubApi::ok_json(json!({"bitcoin": {"usd": 1.5, "eur": 1.25}}));
    let params = price_params(&["bitcoin"], &["usd", "eur"]);

    let result = ToolResult::from_outcome(price::handle(params, &stub).await);
    assert!(!result.is_error);

    let req = stub.last_request();
    assert_eq!(req.path, "/simple/price");
    assert_eq!(req.query_string(), "ids=bitcoin&vs_currencies=usd,eur");
    assert!(req.get("include_market_cap").is_none());
    assert!(req.get("include_24hr_vol").is_none());
    assert!(req.get("include_24hr_change").is_none());
}

#[tokio::test]
async fn price_sends_only_true_flags() {
    let stub = StubApi::ok_json(json!({}));
    let mut params = price_params(&["bitcoin", "ethereum"], &["usd"]);
    params.include_24hr_change = true;

    price::handle(params, &stub).await.unwrap();

    let req = stub.last_request();
    assert_eq!(req.get("ids"), Some("bitcoin,ethereum"));
    assert_eq!(req.get("include_24hr_change"), Some("true"));
    assert!(req.get("include_market_cap").is_none());
    assert!(req.get("include_24hr_vol").is_none());
    assert_eq!(
        req.query_string(),
        "ids=bitcoin,ethereum&vs_currencies=usd&include_24hr_change=true"
    );
}

#[tokio::test]
async fn price_success_is_pretty_printed_payload() {
    let payload = json!({"bitcoin": {"usd": 100, "usd_market_cap": 2000}});
    let stub = StubApi::ok_json(payload.clone());

    let result = ToolResult::from_outcome(
        price::handle(price_params(&["bitcoin"], &["usd"]), &stub).await,
    );

    assert!(!result.is_error);
    assert_eq!(result.content.len(), 1);
    assert_eq!(result.content[0].content_type, "text");
    assert_eq!(result.body(), serde_json::to_string_pretty(&payload).unwrap());
    assert!(result.body().contains("\n  \"bitcoin\": {\n    \"usd\": 100"));
}

// ---------------------------------------------------------------------------
// get_coins_list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn coins_list_without_platform_sends_no_query() {
    let stub = StubApi::ok_json(json!([{"id": "bitcoin", "symbol": "btc", "name": "Bitcoin"}]));

    coins_list::handle(CoinsListParams::default(), &stub).await.unwrap();

    let req = stub.last_request();
    assert_eq!(req.path, "/coins/list");
    assert!(req.get("include_platform").is_none());
    assert_eq!(req.url("https://api.coingecko.com/api/v3"), "https://api.coingecko.com/api/v3/coins/list");
}

#[tokio::test]
async fn coins_list_with_platform_sends_true() {
    let stub = StubApi::ok_json(json!([]));

    coins_list::handle(CoinsListParams { include_platform: true }, &stub)
        .await
        .unwrap();

    assert_eq!(stub.last_request().get("include_platform"), Some("true"));
}

// ---------------------------------------------------------------------------
// get_coin_info
// ---------------------------------------------------------------------------

fn bitcoin_detail() -> serde_json::Value {
    json!({
        "id": "bitcoin",
        "symbol": "btc",
        "name": "Bitcoin",
        "description": {"en": "Digital gold.", "de": "Digitales Gold."},
        "image": {
            "thumb": "https://img/thumb.png",
            "small": "https://img/small.png",
            "large": "https://img/large.png"
        },
        "links": {"homepage": ["https://bitcoin.org"]},
        "market_data": {
            "current_price": {"usd": 100, "eur": 90},
            "market_cap": {"usd": 1000},
            "total_volume": {"usd": 50, "eur": 45},
            "high_24h": {"usd": 110, "eur": 99},
            "low_24h": {"usd": 95, "eur": 85},
            "price_change_percentage_24h": 1.5,
            "price_change_percentage_7d": -2.25,
            "price_change_percentage_30d": 10.0,
            "ath": {"usd": 120}
        },
        "last_updated": "2024-01-01T00:00:00.000Z"
    })
}

#[tokio::test]
async fn coin_info_requests_market_data_only() {
    let stub = StubApi::ok_json(bitcoin_detail());

    coin_info::handle(coin_params("bitcoin", &["usd"]), &stub).await.unwrap();

    let req = stub.last_request();
    assert_eq!(req.path, "/coins/bitcoin");
    assert_eq!(req.get("market_data"), Some("true"));
    for suppressed in ["localization", "tickers", "community_data", "developer_data", "sparkline"] {
        assert_eq!(req.get(suppressed), Some("false"), "{suppressed} must be false");
    }
}

#[tokio::test]
async fn coin_info_projects_requested_currency() {
    let stub = StubApi::ok_json(bitcoin_detail());

    let value = coin_info::handle(coin_params("bitcoin", &["usd"]), &stub).await.unwrap();

    assert_eq!(
        value,
        json!({
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "description": "Digital gold.",
            "image": {
                "thumb": "https://img/thumb.png",
                "small": "https://img/small.png",
                "large": "https://img/large.png"
            },
            "market_data": {
                "current_price": {"usd": 100},
                "market_cap": {"usd": 1000},
                "total_volume": {"usd": 50},
                "high_24h": {"usd": 110},
                "low_24h": {"usd": 95},
                "price_change_percentage_24h": 1.5,
                "price_change_percentage_7d": -2.25,
                "price_change_percentage_30d": 10.0
            },
            "last_updated": "2024-01-01T00:00:00.000Z"
        })
    );
}

#[tokio::test]
async fn coin_info_drops_currency_missing_from_current_price() {
    let mut detail = bitcoin_detail();
    detail["market_data"]["total_volume"]["gbp"] = json!(40);
    detail["market_data"]["market_cap"]["gbp"] = json!(800);
    let stub = StubApi::ok_json(detail);

    let value = coin_info::handle(coin_params("bitcoin", &["usd", "gbp"]), &stub)
        .await
        .unwrap();

    let md = &value["market_data"];
    for field in ["current_price", "market_cap", "total_volume", "high_24h", "low_24h"] {
        assert!(md[field].get("gbp").is_none(), "gbp must be absent from {field}");
        assert!(md[field].get("eur").is_none(), "eur was not requested ({field})");
    }
    assert_eq!(md["market_cap"], json!({"usd": 1000}));
}

#[tokio::test]
async fn coin_info_keeps_requested_currency_absent_elsewhere_out_of_that_map() {
    let stub = StubApi::ok_json(bitcoin_detail());

    let value = coin_info::handle(coin_params("bitcoin", &["eur"]), &stub).await.unwrap();

    let md = &value["market_data"];
    assert_eq!(md["current_price"], json!({"eur": 90}));
    assert_eq!(md["market_cap"], json!({}));
    assert_eq!(md["total_volume"], json!({"eur": 45}));
}

#[test]
fn projection_treats_zero_price_as_missing() {
    let detail: coin_info::CoinDetail = serde_json::from_value(json!({
        "id": "deadcoin",
        "market_data": {
            "current_price": {"usd": 0, "eur": null},
            "market_cap": {"usd": 5, "eur": 6}
        }
    }))
    .unwrap();

    let info = coin_info::project(&detail, &["usd".to_string(), "eur".to_string()]);
    let md = info.market_data.expect("market data present");
    assert!(md.current_price.is_empty());
    assert!(md.market_cap.is_empty());
    assert!(info.symbol.is_none());
}

#[test]
fn projection_of_sparse_record_omits_absent_fields() {
    let detail: coin_info::CoinDetail = serde_json::from_value(json!({"id": "x"})).unwrap();

    let info = coin_info::project(&detail, &["usd".to_string()]);

    assert_eq!(serde_json::to_value(&info).unwrap(), json!({"id": "x"}));
}

#[tokio::test]
async fn coin_info_wrongly_typed_fields_are_dropped_not_fatal() {
    let stub = StubApi::ok_json(json!({
        "id": "bitcoin",
        "symbol": 42,
        "name": "Bitcoin",
        "description": "not a map",
        "image": {"thumb": null, "small": "s", "large": 7},
        "market_data": {
            "current_price": {"usd": 100},
            "market_cap": [1, 2, 3],
            "total_volume": {"usd": 5}
        },
        "last_updated": false
    }));

    let result = ToolResult::from_outcome(
        coin_info::handle(coin_params("bitcoin", &["usd"]), &stub).await,
    );

    assert!(!result.is_error, "{}", result.body());
    let value: serde_json::Value = serde_json::from_str(result.body()).unwrap();
    assert_eq!(
        value,
        json!({
            "id": "bitcoin",
            "name": "Bitcoin",
            "image": {"small": "s"},
            "market_data": {
                "current_price": {"usd": 100},
                "market_cap": {},
                "total_volume": {"usd": 5},
                "high_24h": {},
                "low_24h": {}
            }
        })
    );
}

#[tokio::test]
async fn coin_info_non_object_payload_projects_to_empty_record() {
    let stub = StubApi::ok_json(json!(["bitcoin"]));

    let value = coin_info::handle(coin_params("bitcoin", &["usd"]), &stub).await.unwrap();

    assert_eq!(value, json!({}));
}

// ---------------------------------------------------------------------------
// get_trending
// ---------------------------------------------------------------------------

#[tokio::test]
async fn trending_passes_payload_through() {
    let payload = json!({
        "coins": [
            {"item": {"id": "pepe", "coin_id": 29850, "name": "Pepe", "market_cap_rank": 40, "score": 0}},
            {"item": {"id": "sui", "coin_id": 26375, "name": "Sui", "market_cap_rank": 20, "score": 1}}
        ],
        "nfts": [],
        "categories": []
    });
    let stub = StubApi::ok_json(payload.clone());

    let value = trending::handle(&stub).await.unwrap();

    assert_eq!(value, payload);
    assert_eq!(stub.last_request().path, "/search/trending");
    assert!(stub.last_request().query.is_empty());
}

// ---------------------------------------------------------------------------
// Upstream failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upstream_error_field_becomes_message() {
    let stub = StubApi::raw(404, "Not Found", r#"{"error":"coin not found"}"#);

    let result = ToolResult::from_outcome(
        coin_info::handle(coin_params("nope", &["usd"]), &stub).await,
    );

    assert!(result.is_error);
    assert_eq!(result.body(), "coin not found");
}

#[tokio::test]
async fn upstream_error_without_error_field_uses_status_text() {
    for body in ["<html>busy</html>", r#"{"status":{"error_code":429}}"#, ""] {
        let stub = StubApi::raw(429, "Too Many Requests", body);

        let result = ToolResult::from_outcome(trending::handle(&stub).await);

        assert!(result.is_error);
        assert_eq!(result.body(), "Too Many Requests", "body: {body:?}");
    }
}

#[tokio::test]
async fn network_failure_becomes_error_envelope() {
    let stub = StubApi::new(Reply::NetworkFailure("fetch failed: connection refused".into()));

    let result = ToolResult::from_outcome(
        coins_list::handle(CoinsListParams::default(), &stub).await,
    );

    assert!(result.is_error);
    assert_eq!(result.body(), "fetch failed: connection refused");
}

#[tokio::test]
async fn malformed_success_body_becomes_error_envelope() {
    let stub = StubApi::raw(200, "OK", "{not json");

    let result = ToolResult::from_outcome(
        price::handle(price_params(&["bitcoin"], &["usd"]), &stub).await,
    );

    assert!(result.is_error);
    assert!(!result.body().is_empty());
    assert_eq!(stub.requests().len(), 1, "no retry on failure");
}

// ---------------------------------------------------------------------------
// Every tool through the dispatcher
// ---------------------------------------------------------------------------

fn every_tool() -> Vec<ToolCallParams> {
    [
        ("get_price", Some(json!({"ids": ["bitcoin"], "vs_currencies": ["usd"]}))),
        ("get_coins_list", None),
        ("get_coin_info", Some(json!({"id": "bitcoin"}))),
        ("get_trending", None),
    ]
    .into_iter()
    .map(|(name, arguments)| ToolCallParams {
        name: name.to_string(),
        arguments,
    })
    .collect()
}

#[tokio::test]
async fn every_tool_reports_upstream_errors_the_same_way() {
    let cases = [
        (r#"{"error":"coin not found"}"#, "coin not found"),
        (r#"{"error":""}"#, "Bad Request"),
        (r#"{"error":null}"#, "Bad Request"),
        (r#"{"error":{"code":1}}"#, r#"{"code":1}"#),
        ("not json", "Bad Request"),
    ];

    for params in every_tool() {
        for (body, expected) in cases {
            let (stub, api) = shared(StubApi::raw(400, "Bad Request", body));

            let result = handlers::dispatch_tool_call(&params, &api).await;

            assert!(result.is_error, "{} with {body}", params.name);
            assert_eq!(result.content.len(), 1);
            assert_eq!(result.body(), expected, "{} with {body}", params.name);
            assert_eq!(stub.requests().len(), 1);
        }
    }
}

#[tokio::test]
async fn pass_through_tools_pretty_print_any_payload() {
    let payloads = [
        json!([{"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "platforms": {}}]),
        json!({"bitcoin": {"usd": 1}}),
        json!([]),
        json!("plain string"),
    ];

    for params in every_tool().into_iter().filter(|p| p.name != "get_coin_info") {
        for payload in &payloads {
            let (_, api) = shared(StubApi::ok_json(payload.clone()));

            let result = handlers::dispatch_tool_call(&params, &api).await;

            assert!(!result.is_error, "{}: {}", params.name, result.body());
            assert_eq!(result.body(), serde_json::to_string_pretty(payload).unwrap());
        }
    }
}

#[tokio::test]
async fn coins_list_success_text_is_indented_two_spaces() {
    let stub = StubApi::ok_json(json!([{"id": "bitcoin", "symbol": "btc", "name": "Bitcoin"}]));

    let result = ToolResult::from_outcome(
        coins_list::handle(CoinsListParams::default(), &stub).await,
    );

    assert!(!result.is_error);
    assert_eq!(
        result.body(),
        "[\n  {\n    \"id\": \"bitcoin\",\n    \"symbol\": \"btc\",\n    \"name\": \"Bitcoin\"\n  }\n]"
    );
}
