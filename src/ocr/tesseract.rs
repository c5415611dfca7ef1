//! Local Tesseract OCR provider (spawns the `tesseract` CLI).

use super::{OcrInput, OcrOutput, OcrProvider, ProviderError};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

/// Characters Tesseract may emit. Keeps the MRZ filler `<` so those lines can
/// be recognized and dropped later.
const CHAR_WHITELIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789:/-.,()'\" <>";

pub struct TesseractProvider {
    binary: String,
    language: String,
}

impl TesseractProvider {
    pub fn new(binary: String) -> Self {
        Self {
            binary,
            language: "eng".to_string(),
        }
    }

    fn args(&self) -> Vec<String> {
        vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.language.clone(),
            "-c".to_string(),
            format!("tessedit_char_whitelist={}", CHAR_WHITELIST),
            "-c".to_string(),
            "preserve_interword_spaces=1".to_string(),
        ]
    }
}

#[async_trait::async_trait]
impl OcrProvider for TesseractProvider {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn process(&self, input: &OcrInput) -> Result<OcrOutput, ProviderError> {
        info!(
            "TesseractProvider: recognizing {} ({} bytes)",
            input.filename,
            input.data.len()
        );

        let mut child = Command::new(&self.binary)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProviderError::Engine(format!("failed to start {}: {}", self.binary, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&input.data)
                .await
                .map_err(|e| ProviderError::Engine(format!("failed to write image: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ProviderError::Engine(format!("tesseract did not finish: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::Engine(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("TesseractProvider: {} chars recognized", text.len());
        Ok(OcrOutput::Text(text))
    }
}
