use std::io::{self, ErrorKind, Write};

use anyhow::Result;
use cliclack::{input, spinner};
use console::style;

use super::{Input, Prompt};

pub struct CliclackPrompt {
    spinner: Option<cliclack::ProgressBar>,
    input_mode: InputMode,
}

enum InputMode {
    Singleline,
    Multiline,
}

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt {
            spinner: None,
            input_mode: InputMode::Singleline,
        }
    }

    fn handle_command(&mut self, text: &str) -> Option<Input> {
        match text.to_ascii_lowercase().as_str() {
            "/exit" | "/quit" | "exit" | "quit" => Some(Input::exit()),
            "/m" => {
                self.input_mode = InputMode::Multiline;
                Some(Input::ask_again())
            }
            "/s" => {
                self.input_mode = InputMode::Singleline;
                Some(Input::ask_again())
            }
            "/?" | "/help" => {
                println!("Commands:");
                println!("/exit - Exit the session");
                println!("/m - Switch to multiline input mode");
                println!("/s - Switch to singleline input mode");
                println!("/? - Display this help message");
                println!("Ctrl+C - Interrupt a reply (the conversation is kept as it was before the request)");
                Some(Input::ask_again())
            }
            "" => Some(Input::ask_again()),
            _ => None,
        }
    }
}

impl Default for CliclackPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for CliclackPrompt {
    fn render(&mut self, text: &str) {
        println!("{}", text);
        println!();
        let _ = io::stdout().flush();
    }

    fn render_error(&mut self, message: &str) {
        println!("{}", style(message).red());
        println!();
    }

    fn get_input(&mut self) -> Result<Input> {
        let mut prompt = input("Lifeguard:  [Help: /?]").placeholder("");
        if let InputMode::Multiline = self.input_mode {
            prompt = prompt.multiline();
        }

        let message_text: String = match prompt.interact() {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::Interrupted => return Ok(Input::exit()),
            Err(e) => return Err(e.into()),
        };
        let message_text = message_text.trim();

        Ok(self
            .handle_command(message_text)
            .unwrap_or_else(|| Input::message(message_text)))
    }

    fn show_busy(&mut self) {
        let spin = spinner();
        spin.start("checking with the pool store");
        self.spinner = Some(spin);
    }

    fn hide_busy(&mut self) {
        if let Some(spin) = self.spinner.take() {
            spin.stop("");
        }
    }

    fn close(&self) {
        println!("{}", style("Goodbye!").dim());
    }
}
