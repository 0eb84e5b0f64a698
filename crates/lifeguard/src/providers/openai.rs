use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::base::{Provider, ToolChoice, Usage};
use super::configs::OpenAiProviderConfig;
use super::utils::{
    check_openai_context_length_error, messages_to_openai_spec, openai_response_to_message,
    tools_to_openai_spec,
};
use crate::models::message::{AssistantMessage, Message};
use crate::models::tool::Tool;

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    fn get_usage(data: &Value) -> Result<Usage> {
        let usage = data
            .get("usage")
            .ok_or_else(|| anyhow!("No usage data in response"))?;

        let input_tokens = token_count(usage, "prompt_tokens");
        let output_tokens = token_count(usage, "completion_tokens");
        let total_tokens = token_count(usage, "total_tokens").or_else(|| {
            match (input_tokens, output_tokens) {
                (Some(input), Some(output)) => input.checked_add(output),
                _ => None,
            }
        });

        Ok(Usage::new(input_tokens, output_tokens, total_tokens))
    }

    fn build_payload(
        &self,
        messages: &[Message],
        tools: &[Tool],
        tool_choice: ToolChoice,
    ) -> Result<Value> {
        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_to_openai_spec(messages),
        });
        let object = payload
            .as_object_mut()
            .ok_or_else(|| anyhow!("payload is not an object"))?;

        if !tools.is_empty() {
            object.insert("tools".to_string(), json!(tools_to_openai_spec(tools)?));
            object.insert("tool_choice".to_string(), json!(tool_choice));
            if tool_choice == ToolChoice::Auto {
                object.insert("parallel_tool_calls".to_string(), json!(true));
            }
        }
        if let Some(temp) = self.config.temperature {
            object.insert("temperature".to_string(), json!(temp));
        }
        if let Some(tokens) = self.config.max_tokens {
            object.insert("max_tokens".to_string(), json!(tokens));
        }

        Ok(payload)
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            status => {
                // The body usually carries an error object worth surfacing
                let body: Value = response.json().await.unwrap_or(Value::Null);
                match body.get("error") {
                    Some(error) => Err(Self::api_error(error)),
                    None => Err(anyhow!("Request failed: {}", status)),
                }
            }
        }
    }

    fn api_error(error: &Value) -> anyhow::Error {
        match check_openai_context_length_error(error) {
            Some(err) => err.into(),
            None => anyhow!("OpenAI API error: {}", error),
        }
    }
}

/// A token count from the usage block, or `None` when absent or out of range
fn token_count(usage: &Value, key: &str) -> Option<i32> {
    usage
        .get(key)
        .and_then(Value::as_i64)
        .and_then(|count| i32::try_from(count).ok())
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[Tool],
        tool_choice: ToolChoice,
    ) -> Result<(AssistantMessage, Usage)> {
        let payload = self.build_payload(messages, tools, tool_choice)?;
        tracing::debug!(model = %self.config.model, messages = messages.len(), "requesting completion");

        let response = self.post(payload).await?;

        if let Some(error) = response.get("error") {
            return Err(Self::api_error(error));
        }

        let message = openai_response_to_message(&response)?;
        let usage = Self::get_usage(&response).unwrap_or_default();

        Ok((message, usage))
    }
}
