//! Nanonets OCR model provider.

use super::{read_json, OcrInput, OcrOutput, OcrProvider, ProviderError};
use reqwest::multipart::{Form, Part};
use tracing::info;

pub struct NanonetsProvider {
    api_key: String,
    model_id: String,
    client: reqwest::Client,
}

impl NanonetsProvider {
    pub fn new(client: reqwest::Client, api_key: String, model_id: String) -> Self {
        Self {
            api_key,
            model_id,
            client,
        }
    }

    fn url(&self) -> String {
        format!(
            "https://app.nanonets.com/api/v2/OCR/Model/{}/LabelFile/",
            self.model_id
        )
    }
}

#[async_trait::async_trait]
impl OcrProvider for NanonetsProvider {
    fn name(&self) -> &'static str {
        "nanonets"
    }

    async fn process(&self, input: &OcrInput) -> Result<OcrOutput, ProviderError> {
        let transport = |source| ProviderError::Transport {
            provider: "nanonets",
            source,
        };

        let part = Part::bytes(input.data.clone())
            .file_name(input.filename.clone())
            .mime_str(&input.mime_type)
            .map_err(transport)?;
        let form = Form::new().part("file", part);

        info!("NanonetsProvider: labelling {} with model {}", input.filename, self.model_id);

        let response = self
            .client
            .post(self.url())
            .basic_auth(&self.api_key, Some(""))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        read_json(self.name(), response).await.map(OcrOutput::Json)
    }
}
