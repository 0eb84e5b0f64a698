use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use lifeguard::agent::Agent;
use lifeguard::capabilities::CapabilityRegistry;
use lifeguard::clients::{GoogleGeocoder, PoolApiClient};
use lifeguard::config::Settings;
use lifeguard::providers::openai::OpenAiProvider;

use crate::prompt::cliclack::CliclackPrompt;
use crate::session::ChatSession;

pub fn build_session<'a>(
    settings: Settings,
    session_file: Option<PathBuf>,
) -> Result<ChatSession<'a>> {
    let client = PoolApiClient::new(&settings.api.base_url, settings.api_timeout())?;
    let geocoder = GoogleGeocoder::new(
        &settings.geocoding.url,
        &settings.geocoding.api_key,
        settings.api_timeout(),
    )?;
    let registry =
        CapabilityRegistry::pool_store(client, Arc::new(geocoder), settings.tool_timeout())?;

    let provider = OpenAiProvider::new(settings.provider.into_config())?;
    let agent = Agent::new(Box::new(provider), registry);
    let session = agent.new_session(settings.system_prompt_path.as_ref())?;

    tracing::info!(session = %session.id(), "session started");

    Ok(ChatSession::new(
        agent,
        session,
        Box::new(CliclackPrompt::new()),
        session_file,
    ))
}
