use std::path::PathBuf;

use anyhow::Result;

use crate::capabilities::CapabilityRegistry;
use crate::errors::TurnError;
use crate::models::message::{AssistantMessage, Message, ToolRequest, ToolResponse};
use crate::prompt_template::system_prompt;
use crate::providers::base::{Provider, ToolChoice, Usage};
use crate::session::Session;

/// Agent integrates a foundational LLM with the capabilities it may call
///
/// Each user turn is at most two model rounds: the first may request any number of
/// capability calls, which run concurrently, and the second turns their results into
/// the final answer. Tool use is never offered a second time in the same turn.
pub struct Agent {
    provider: Box<dyn Provider>,
    registry: CapabilityRegistry,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider>, registry: CapabilityRegistry) -> Self {
        Self { provider, registry }
    }

    /// Start a session whose system instruction describes this agent's capabilities
    pub fn new_session(&self, template_file: Option<&PathBuf>) -> Result<Session> {
        let prompt = system_prompt(self.registry.list_capabilities(), template_file)?;
        Ok(Session::new(prompt))
    }

    /// Answer one user message, recording the whole exchange in the session.
    ///
    /// The session is only updated once the final answer is in hand. If the model fails,
    /// or the returned future is dropped part way, the session is left as it was.
    #[tracing::instrument(skip_all, fields(session = %session.id()))]
    pub async fn reply(&self, session: &mut Session, user_text: &str) -> Result<String, TurnError> {
        let mut turn = vec![Message::user(user_text)];

        let (response, usage) = self.complete(session, &turn, ToolChoice::Auto).await?;
        log_usage(1, &usage);

        if !response.has_tool_requests() {
            let text = response.text().to_string();
            turn.push(response.into());
            session.commit(turn);
            tracing::info!(rounds = 1, "turn complete");
            return Ok(text);
        }

        let requests = response.tool_requests.clone();
        turn.push(response.into());

        tracing::info!(
            count = requests.len(),
            tools = ?requests.iter().map(|r| r.tool_call.name.as_str()).collect::<Vec<_>>(),
            "dispatching tool requests"
        );
        let responses = self.dispatch_tool_requests(&requests).await;
        turn.extend(responses.into_iter().map(Message::Tool));

        let (response, usage) = self.complete(session, &turn, ToolChoice::None).await?;
        log_usage(2, &usage);

        if response.has_tool_requests() {
            tracing::warn!(
                count = response.tool_requests.len(),
                "ignoring tool requests in final round"
            );
        }
        let response = response.without_tool_requests();
        let text = response.text().to_string();
        turn.push(response.into());

        session.commit(turn);
        tracing::info!(rounds = 2, "turn complete");
        Ok(text)
    }

    async fn complete(
        &self,
        session: &Session,
        turn: &[Message],
        tool_choice: ToolChoice,
    ) -> Result<(AssistantMessage, Usage), TurnError> {
        let messages: Vec<Message> = session
            .messages()
            .iter()
            .chain(turn.iter())
            .cloned()
            .collect();

        self.provider
            .complete(&messages, self.registry.list_capabilities(), tool_choice)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "model request failed");
                TurnError::Provider(e)
            })
    }

    /// Run every request at once and wait for all of them, keeping request order
    async fn dispatch_tool_requests(&self, requests: &[ToolRequest]) -> Vec<ToolResponse> {
        let futures: Vec<_> = requests
            .iter()
            .map(|request| {
                self.registry
                    .execute(&request.tool_call.name, &request.tool_call.arguments)
            })
            .collect();

        let outputs = futures::future::join_all(futures).await;

        requests
            .iter()
            .zip(outputs)
            .map(|(request, output)| ToolResponse::new(request.id.clone(), output))
            .collect()
    }
}

fn log_usage(round: u8, usage: &Usage) {
    tracing::info!(
        round,
        input_tokens = usage.input_tokens,
        output_tokens = usage.output_tokens,
        total_tokens = usage.total_tokens,
        "model round complete"
    );
}
