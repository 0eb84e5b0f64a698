use anyhow::Result;
use std::path::PathBuf;

use lifeguard::agent::Agent;
use lifeguard::session::Session;

use crate::prompt::{InputType, Prompt};

pub mod session_file;

/// What became of one user message
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Answered(String),
    Failed(String),
    Interrupted,
}

pub struct ChatSession<'a> {
    agent: Agent,
    session: Session,
    prompt: Box<dyn Prompt + 'a>,
    session_file: Option<PathBuf>,
}

impl<'a> ChatSession<'a> {
    pub fn new(
        agent: Agent,
        session: Session,
        prompt: Box<dyn Prompt + 'a>,
        session_file: Option<PathBuf>,
    ) -> Self {
        ChatSession {
            agent,
            session,
            prompt,
            session_file,
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        self.prompt.greet();

        loop {
            let input = self.prompt.get_input()?;
            match input.input_type {
                InputType::Exit => break,
                InputType::AskAgain => continue,
                InputType::Message => {
                    if let Some(content) = input.content {
                        self.show(&content).await?;
                    }
                }
            }
        }

        self.prompt.close();
        Ok(())
    }

    /// Answer a single message and print the result, without the interactive loop
    pub async fn headless(&mut self, text: &str) -> Result<Outcome> {
        let outcome = self.process(text).await?;
        match &outcome {
            Outcome::Answered(answer) => println!("{}", answer),
            Outcome::Failed(message) => eprintln!("{}", message),
            Outcome::Interrupted => eprintln!("Interrupted"),
        }
        Ok(outcome)
    }

    async fn show(&mut self, text: &str) -> Result<()> {
        self.prompt.show_busy();
        let outcome = self.process(text).await;
        self.prompt.hide_busy();

        match outcome? {
            Outcome::Answered(answer) => self.prompt.render(&answer),
            Outcome::Failed(message) => self.prompt.render_error(&message),
            Outcome::Interrupted => self
                .prompt
                .render_error("Interrupted. The conversation is unchanged, ask again when ready."),
        }
        Ok(())
    }

    /// Run one turn, abandoning it on Ctrl-C
    pub async fn process(&mut self, text: &str) -> Result<Outcome> {
        let result = tokio::select! {
            result = self.agent.reply(&mut self.session, text) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };

        let outcome = match result {
            Some(Ok(answer)) => {
                self.persist()?;
                Outcome::Answered(answer)
            }
            Some(Err(e)) => {
                tracing::error!(error = %e, "turn failed");
                Outcome::Failed(format!("Sorry, I could not get an answer: {}", e))
            }
            None => Outcome::Interrupted,
        };
        Ok(outcome)
    }

    fn persist(&self) -> Result<()> {
        if let Some(path) = &self.session_file {
            session_file::persist_messages(path, self.session.messages())?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session {
        &self.session
    }
}
