use super::base::ProviderConfig;
use anyhow::Result;

pub const OPENAI_DEFAULT_HOST: &str = "https://api.openai.com/";
// gpt-3.5-turbo has no structured output support
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub api_key: String,
    pub host: String,
    pub model: String,
}

impl OpenAiProviderConfig {
    pub fn new(api_key: String, host: String, model: String) -> Self {
        Self {
            api_key,
            host,
            model,
        }
    }
}

impl ProviderConfig for OpenAiProviderConfig {
    fn from_env() -> Result<Self> {
        let api_key = Self::get_env("OPENAI_API_KEY", true, None)?
            .ok_or_else(|| anyhow::anyhow!("OpenAI API key should be present"))?;

        let host = Self::get_env(
            "OPENAI_API_HOST",
            false,
            Some(OPENAI_DEFAULT_HOST.to_string()),
        )?
        .unwrap_or_else(|| OPENAI_DEFAULT_HOST.to_string());

        let model = Self::get_env(
            "OPENAI_MODEL",
            false,
            Some(OPENAI_DEFAULT_MODEL.to_string()),
        )?
        .unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string());

        Ok(Self::new(api_key, host, model))
    }
}
