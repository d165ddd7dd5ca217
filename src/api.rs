use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
   config::GudConfig,
   error::{GudError, Result},
   style,
};

/// Environment variable holding the Bedrock API key
pub const API_KEY_VAR: &str = "GUD_BEDROCK_API_KEY";

/// Anthropic message format version accepted by Bedrock
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Something that turns a prompt into model text
pub trait InferenceClient {
   fn invoke(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
   pub role:    String,
   pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeRequest {
   pub anthropic_version: String,
   pub max_tokens:        u32,
   pub messages:          Vec<Message>,
}

impl InvokeRequest {
   /// Single-turn request carrying `prompt` as the user message
   pub fn user(prompt: &str, max_tokens: u32) -> Self {
      Self {
         anthropic_version: ANTHROPIC_VERSION.to_string(),
         max_tokens,
         messages: vec![Message { role: "user".to_string(), content: prompt.to_string() }],
      }
   }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
   #[serde(rename = "type", default)]
   pub block_type: String,
   #[serde(default)]
   pub text:       String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
   #[serde(default)]
   pub input_tokens:  u64,
   #[serde(default)]
   pub output_tokens: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvokeResponse {
   #[serde(default)]
   pub content: Vec<ContentBlock>,
   #[serde(default)]
   pub usage:   Usage,
}

impl InvokeResponse {
   /// Text of the first content block
   pub fn into_text(self) -> Result<String> {
      self
         .content
         .into_iter()
         .next()
         .map(|block| block.text)
         .ok_or(GudError::EmptyCompletion)
   }
}

/// Bedrock runtime invoke endpoint for a region and model
pub fn endpoint_url(region: &str, model_id: &str) -> String {
   format!("https://bedrock-runtime.{region}.amazonaws.com/model/{model_id}/invoke")
}

/// Read the API key through `env`; a missing or empty value is fatal.
pub fn resolve_api_key<F>(env: F) -> Result<String>
where
   F: Fn(&str) -> Option<String>,
{
   env(API_KEY_VAR)
      .filter(|key| !key.trim().is_empty())
      .ok_or(GudError::MissingApiKey { var: API_KEY_VAR })
}

/// Claude on AWS Bedrock with bearer API key authentication
pub struct BedrockClient {
   api_key:    String,
   endpoint:   String,
   max_tokens: u32,
   http:       reqwest::blocking::Client,
}

impl std::fmt::Debug for BedrockClient {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("BedrockClient")
         .field("endpoint", &self.endpoint)
         .field("max_tokens", &self.max_tokens)
         .finish_non_exhaustive()
   }
}

impl BedrockClient {
   pub fn new(api_key: impl Into<String>, config: &GudConfig) -> Result<Self> {
      let http = reqwest::blocking::Client::builder()
         .timeout(Duration::from_secs(config.timeout_seconds))
         .build()?;

      Ok(Self {
         api_key: api_key.into(),
         endpoint: endpoint_url(&config.region, &config.model_id),
         max_tokens: config.max_tokens,
         http,
      })
   }

   /// Build a client with the key from `GUD_BEDROCK_API_KEY`
   pub fn from_env(config: &GudConfig) -> Result<Self> {
      let api_key = resolve_api_key(|key| std::env::var(key).ok())?;
      Self::new(api_key, config)
   }

   pub fn endpoint(&self) -> &str {
      &self.endpoint
   }

   fn send(&self, prompt: &str) -> Result<String> {
      let request = InvokeRequest::user(prompt, self.max_tokens);
      tracing::debug!(endpoint = %self.endpoint, prompt_chars = prompt.len(), "invoking model");

      let response = self
         .http
         .post(&self.endpoint)
         .header("content-type", "application/json")
         .header("Authorization", format!("Bearer {}", self.api_key))
         .json(&request)
         .send()?;

      let status = response.status();
      if !status.is_success() {
         let body = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
         return Err(GudError::ApiError { status: status.as_u16(), body });
      }

      let parsed: InvokeResponse = response.json()?;
      tracing::debug!(
         input_tokens = parsed.usage.input_tokens,
         output_tokens = parsed.usage.output_tokens,
         "model responded"
      );
      parsed.into_text()
   }
}

impl InferenceClient for BedrockClient {
   fn invoke(&self, prompt: &str) -> Result<String> {
      style::with_spinner_result("Awaiting response from Bedrock", || self.send(prompt))
   }
}
