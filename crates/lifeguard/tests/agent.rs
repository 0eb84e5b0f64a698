use std::sync::Arc;
use std::time::Duration;

use lifeguard::agent::Agent;
use lifeguard::capabilities::CapabilityRegistry;
use lifeguard::clients::{GoogleGeocoder, PoolApiClient};
use lifeguard::errors::TurnError;
use lifeguard::models::role::Role;
use lifeguard::providers::configs::OpenAiProviderConfig;
use lifeguard::providers::openai::OpenAiProvider;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Stands up the model, the store API and the geocoder behind one agent
struct Harness {
    model: MockServer,
    store: MockServer,
    maps: MockServer,
}

impl Harness {
    async fn start() -> Self {
        Self {
            model: MockServer::start().await,
            store: MockServer::start().await,
            maps: MockServer::start().await,
        }
    }

    fn agent(&self) -> Agent {
        let mut config = OpenAiProviderConfig::new("test-key");
        config.host = self.model.uri();
        let provider = OpenAiProvider::new(config).unwrap();

        let client = PoolApiClient::new(self.store.uri(), Duration::from_secs(5)).unwrap();
        let geocoder = GoogleGeocoder::new(
            format!("{}/geocode/json", self.maps.uri()),
            "maps-key",
            Duration::from_secs(5),
        )
        .unwrap();
        let registry =
            CapabilityRegistry::pool_store(client, Arc::new(geocoder), Duration::from_secs(5))
                .unwrap();

        Agent::new(Box::new(provider), registry)
    }

    async fn model_round(&self, tool_choice: &str, message: Value, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({"tool_choice": tool_choice})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(message)))
            .expect(expected_calls)
            .mount(&self.model)
            .await;
    }
}

fn completion(message: Value) -> Value {
    json!({
        "choices": [{"index": 0, "message": message, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150}
    })
}

fn tool_call(id: &str, name: &str, arguments: Value) -> Value {
    json!({
        "id": id,
        "type": "function",
        "function": {"name": name, "arguments": arguments.to_string()}
    })
}

fn last_request_body(requests: &[wiremock::Request]) -> Value {
    serde_json::from_slice(&requests.last().unwrap().body).unwrap()
}

#[tokio::test]
async fn test_pricing_question_answers_in_two_rounds() {
    let harness = Harness::start().await;

    harness
        .model_round(
            "auto",
            json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [tool_call(
                    "call_price",
                    "get_pricing",
                    json!({"items": [{"item_code": "LZA406103A"}]})
                )]
            }),
            1,
        )
        .await;
    harness
        .model_round(
            "none",
            json!({"role": "assistant", "content": "The filter is $24.99 each."}),
            1,
        )
        .await;

    Mock::given(method("POST"))
        .and(path("/api/pricing"))
        .and(body_json(json!({
            "items": [{"item_code": "LZA406103A", "unit": "EA"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "prices": [{"item_code": "LZA406103A", "price": 24.99}]
        })))
        .expect(1)
        .mount(&harness.store)
        .await;

    let agent = harness.agent();
    let mut session = agent.new_session(None).unwrap();
    let answer = agent
        .reply(&mut session, "How much is LZA406103A?")
        .await
        .unwrap();

    assert_eq!(answer, "The filter is $24.99 each.");

    let roles: Vec<Role> = session.messages().iter().map(|m| m.role()).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::Assistant, Role::Tool, Role::Assistant]
    );

    let requests = harness.model.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let final_round = last_request_body(&requests);
    assert_eq!(final_round["tool_choice"], "none");
    assert!(final_round["tools"].as_array().is_some_and(|t| t.len() == 6));

    let tool_message = final_round["messages"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["role"] == "tool")
        .unwrap();
    assert_eq!(tool_message["tool_call_id"], "call_price");
    let content: Value = serde_json::from_str(tool_message["content"].as_str().unwrap()).unwrap();
    assert_eq!(content["prices"][0]["price"], 24.99);
}

#[tokio::test]
async fn test_store_search_geocodes_then_queries_stores() {
    let harness = Harness::start().await;

    harness
        .model_round(
            "auto",
            json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [tool_call(
                    "call_stores",
                    "search_stores",
                    json!({"location": "Austin, TX", "radius": 25})
                )]
            }),
            1,
        )
        .await;
    harness
        .model_round(
            "none",
            json!({"role": "assistant", "content": "The closest store is on Lamar Blvd."}),
            1,
        )
        .await;

    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .and(query_param("address", "Austin, TX"))
        .and(query_param("key", "maps-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [{"geometry": {"location": {"lat": 30.25, "lng": -97.75}}}]
        })))
        .expect(1)
        .mount(&harness.maps)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/stores/search"))
        .and(query_param("latitude", "30.25"))
        .and(query_param("longitude", "-97.75"))
        .and(query_param("radius", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stores": [{"id": "ATX-1", "address": "1200 N Lamar Blvd"}]
        })))
        .expect(1)
        .mount(&harness.store)
        .await;

    let agent = harness.agent();
    let mut session = agent.new_session(None).unwrap();
    let answer = agent
        .reply(&mut session, "Any stores near Austin, TX?")
        .await
        .unwrap();

    assert_eq!(answer, "The closest store is on Lamar Blvd.");
}

#[tokio::test]
async fn test_failed_lookup_is_reported_to_the_model() {
    let harness = Harness::start().await;

    harness
        .model_round(
            "auto",
            json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [
                    tool_call("call_a", "get_product_details", json!({"part_number": "MISSING"})),
                    tool_call("call_b", "check_inventory", json!({}))
                ]
            }),
            1,
        )
        .await;
    harness
        .model_round(
            "none",
            json!({"role": "assistant", "content": "I could not find that part."}),
            1,
        )
        .await;

    Mock::given(method("GET"))
        .and(path("/api/products/MISSING"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&harness.store)
        .await;

    let agent = harness.agent();
    let mut session = agent.new_session(None).unwrap();
    let answer = agent.reply(&mut session, "Details for MISSING?").await.unwrap();
    assert_eq!(answer, "I could not find that part.");

    let requests = harness.model.received_requests().await.unwrap();
    let final_round = last_request_body(&requests);
    let tool_messages: Vec<&Value> = final_round["messages"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["role"] == "tool")
        .collect();

    assert_eq!(tool_messages.len(), 2);
    assert_eq!(tool_messages[0]["tool_call_id"], "call_a");
    assert_eq!(tool_messages[1]["tool_call_id"], "call_b");

    let failed: Value = serde_json::from_str(tool_messages[0]["content"].as_str().unwrap()).unwrap();
    assert_eq!(failed["kind"], "HandlerFailed");
    let unknown: Value = serde_json::from_str(tool_messages[1]["content"].as_str().unwrap()).unwrap();
    assert_eq!(unknown["kind"], "UnknownCapability");
}

#[tokio::test]
async fn test_model_outage_leaves_session_unchanged() {
    let harness = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&harness.model)
        .await;

    let agent = harness.agent();
    let mut session = agent.new_session(None).unwrap();
    let result = agent.reply(&mut session, "Hello?").await;

    assert!(matches!(result, Err(TurnError::Provider(_))));
    assert_eq!(session.len(), 1);
}
