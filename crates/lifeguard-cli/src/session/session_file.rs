use anyhow::Result;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use lifeguard::models::message::Message;

/// Rewrite the transcript as one JSON message per line
pub fn persist_messages(session_file: &Path, messages: &[Message]) -> Result<()> {
    if let Some(parent) = session_file.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(session_file)?; // Create or truncate the file
    write_messages(file, messages)
}

fn write_messages(session_file: File, messages: &[Message]) -> Result<()> {
    let mut writer = std::io::BufWriter::new(session_file);

    for message in messages {
        serde_json::to_writer(&mut writer, &message)?;
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}
