//! AWS Translate client (`TranslateText`) on the AWS SDK.
//!
//! Credentials come from the SDK's default provider chain (env, shared profile, web identity,
//! ECS and instance roles) and are refreshed by the SDK as they expire.

use super::{TranslateError, TranslateRequest, Translator};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_sdk_translate::config::{BehaviorVersion, Region};
use aws_sdk_translate::error::{DisplayErrorContext, SdkError};

/// Process-wide AWS Translate client.
#[derive(Debug, Clone)]
pub struct AwsTranslateClient {
    client: aws_sdk_translate::Client,
}

impl AwsTranslateClient {
    /// Load shared AWS config for `region` with the default credential chain.
    /// `endpoint` overrides `https://translate.{region}.amazonaws.com`. Requests are not retried.
    pub async fn load(region: &str, endpoint: Option<String>) -> Result<Self, TranslateError> {
        let region = region.trim();
        if region.is_empty() {
            return Err(TranslateError::Config("AWS region not set".to_string()));
        }
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .retry_config(RetryConfig::disabled());
        if let Some(url) = endpoint {
            loader = loader.endpoint_url(url);
        }
        let shared = loader.load().await;
        if shared.credentials_provider().is_none() {
            return Err(TranslateError::Config(
                "no AWS credentials provider available".to_string(),
            ));
        }
        Ok(Self::from_client(aws_sdk_translate::Client::new(&shared)))
    }

    /// Wrap an already-configured SDK client.
    pub fn from_client(client: aws_sdk_translate::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Translator for AwsTranslateClient {
    async fn translate_text(&self, request: &TranslateRequest<'_>) -> Result<String, TranslateError> {
        let output = self
            .client
            .translate_text()
            .source_language_code(request.source)
            .target_language_code(request.target)
            .text(request.text)
            .set_terminology_names(request.terminology.map(|t| vec![t.to_string()]))
            .send()
            .await
            .map_err(|e| match &e {
                SdkError::ServiceError(_) => TranslateError::Api(DisplayErrorContext(&e).to_string()),
                _ => TranslateError::Request(DisplayErrorContext(&e).to_string()),
            })?;
        log::debug!(
            "translated {} chars {} -> {}",
            request.text.len(),
            request.source,
            request.target
        );
        Ok(output.translated_text().to_string())
    }
}
