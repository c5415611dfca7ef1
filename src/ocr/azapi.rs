//! Azapi ID-card OCR provider.

use super::{read_json, OcrInput, OcrOutput, OcrProvider, ProviderError};
use reqwest::multipart::{Form, Part};
use tracing::info;

pub const DEFAULT_ENDPOINT: &str = "https://ocr.azapi.ai/ind0006b";

pub struct AzapiProvider {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl AzapiProvider {
    pub fn new(client: reqwest::Client, api_key: String, endpoint: String) -> Self {
        Self {
            api_key,
            endpoint,
            client,
        }
    }
}

#[async_trait::async_trait]
impl OcrProvider for AzapiProvider {
    fn name(&self) -> &'static str {
        "azapi"
    }

    async fn process(&self, input: &OcrInput) -> Result<OcrOutput, ProviderError> {
        let part = Part::bytes(input.data.clone())
            .file_name(input.filename.clone())
            .mime_str(&input.mime_type)
            .map_err(|source| ProviderError::Transport {
                provider: self.name(),
                source,
            })?;
        let form = Form::new().part("file", part);

        info!(
            "AzapiProvider: sending {} ({} bytes)",
            input.filename,
            input.data.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: self.name(),
                source,
            })?;

        read_json(self.name(), response).await.map(OcrOutput::Json)
    }
}
