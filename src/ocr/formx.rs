//! FormX extractor provider.

use super::{read_json, OcrInput, OcrOutput, OcrProvider, ProviderError};
use reqwest::multipart::{Form, Part};
use tracing::info;

const FORMX_EXTRACT_URL: &str = "https://worker.formextractorai.com/v2/extract";

pub struct FormXProvider {
    api_key: String,
    extractor_id: String,
    client: reqwest::Client,
}

impl FormXProvider {
    pub fn new(client: reqwest::Client, api_key: String, extractor_id: String) -> Self {
        Self {
            api_key,
            extractor_id,
            client,
        }
    }

    fn form(&self, input: &OcrInput) -> Result<Form, reqwest::Error> {
        let part = Part::bytes(input.data.clone())
            .file_name(input.filename.clone())
            .mime_str(&input.mime_type)?;

        Ok(Form::new()
            .text("pdf_dpi", "150")
            .text("async", "false")
            .text("auto_adjust_image_size", "true")
            .text("output_ocr", "false")
            .text("processing_mode", "per-page")
            .text("extractor_id", self.extractor_id.clone())
            .part("image", part))
    }
}

#[async_trait::async_trait]
impl OcrProvider for FormXProvider {
    fn name(&self) -> &'static str {
        "formx"
    }

    async fn process(&self, input: &OcrInput) -> Result<OcrOutput, ProviderError> {
        let transport = |source| ProviderError::Transport {
            provider: "formx",
            source,
        };
        let form = self.form(input).map_err(transport)?;

        info!(
            "FormXProvider: extracting {} with extractor {}",
            input.filename, self.extractor_id
        );

        let response = self
            .client
            .post(FORMX_EXTRACT_URL)
            .header("X-WORKER-TOKEN", &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        read_json(self.name(), response).await.map(OcrOutput::Json)
    }
}
