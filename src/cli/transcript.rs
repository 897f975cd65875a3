//! Transcript file writer: one message content per line, as produced.

use std::path::Path;

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::types::Message;

pub struct TranscriptWriter {
    file: File,
}

impl TranscriptWriter {
    /// Create (or truncate) the transcript file.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .await?;
        Ok(Self { file })
    }

    pub async fn append(&mut self, message: &Message) -> Result<()> {
        self.file.write_all(message.content.as_bytes()).await?;
        self.file.write_all(b"\n").await?;
        self.file.flush().await?;
        Ok(())
    }
}
