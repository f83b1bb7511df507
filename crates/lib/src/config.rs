//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.relay/config.json`) and environment.
//! The resolved [`BridgeSettings`] value is built once at startup and handed to every
//! component; nothing reads the environment after that.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings (webhook listener).
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Bot engine (Botpress) endpoint.
    #[serde(default)]
    pub bot: BotConfig,

    /// Support platform (Chatwoot) endpoint and token.
    #[serde(default)]
    pub support: SupportConfig,

    /// Translation service settings.
    #[serde(default)]
    pub translation: TranslationConfig,
}

/// Gateway bind, port, and webhook route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 15152).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,

    /// Route Chatwoot POSTs webhook events to (default "/webhook").
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
}

fn default_gateway_port() -> u16 {
    15152
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_webhook_path() -> String {
    "/webhook".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
            webhook_path: default_webhook_path(),
        }
    }
}

/// Botpress installation. Overridden by BOT_BASE_URL / BOT_ID env.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    pub base_url: Option<String>,
    pub bot_id: Option<String>,
}

/// Chatwoot installation. Overridden by SUPPORT_BASE_URL / SUPPORT_API_TOKEN env.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportConfig {
    pub base_url: Option<String>,
    /// Account the bot posts into (default 1).
    #[serde(default = "default_account_id")]
    pub account_id: u64,
    /// Agent-bot access token, sent as `api_access_token`.
    pub api_token: Option<String>,
}

fn default_account_id() -> u64 {
    1
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            account_id: default_account_id(),
            api_token: None,
        }
    }
}

/// AWS Translate settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationConfig {
    /// AWS region. Overridden by AWS_REGION env.
    pub region: Option<String>,
    /// Custom terminology name. Overridden by TRANSLATE_TERMINOLOGY env.
    pub terminology: Option<String>,
    /// Language the bot speaks (default "en").
    #[serde(default = "default_source_language")]
    pub source_language: String,
    /// Endpoint override (e.g. a local test double). Defaults to the regional AWS endpoint.
    pub endpoint: Option<String>,
}

fn default_source_language() -> String {
    "en".to_string()
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            region: None,
            terminology: None,
            source_language: default_source_language(),
            endpoint: None,
        }
    }
}

/// Trimmed value; empty counts as unset.
fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Env value if set, otherwise the trimmed, non-empty config value.
fn resolve_value(
    env: &impl Fn(&str) -> Option<String>,
    name: &str,
    configured: Option<&String>,
) -> Option<String> {
    env(name)
        .as_deref()
        .and_then(non_empty)
        .or_else(|| configured.and_then(|s| non_empty(s)))
}

/// Process-wide immutable settings, resolved once from [`Config`] and env.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    pub bot_base_url: String,
    pub bot_id: String,
    pub support_base_url: String,
    pub support_account_id: u64,
    pub support_token: String,
    pub source_language: String,
    pub terminology: Option<String>,
    pub region: Option<String>,
    pub translate_endpoint: Option<String>,
}

impl BridgeSettings {
    /// Resolve settings from config and the process environment.
    pub fn resolve(config: &Config) -> Result<Self> {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    /// Resolve settings with `env` as the variable lookup: env overrides config, blank values
    /// count as unset. Missing endpoints or token fail startup.
    pub fn resolve_with(config: &Config, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_base_url = resolve_value(&env, "BOT_BASE_URL", config.bot.base_url.as_ref())
            .context("bot base URL not configured (bot.baseUrl or BOT_BASE_URL)")?;
        let bot_id = resolve_value(&env, "BOT_ID", config.bot.bot_id.as_ref())
            .context("bot id not configured (bot.botId or BOT_ID)")?;
        let support_base_url =
            resolve_value(&env, "SUPPORT_BASE_URL", config.support.base_url.as_ref())
                .context("support base URL not configured (support.baseUrl or SUPPORT_BASE_URL)")?;
        let support_token = resolve_value(&env, "SUPPORT_API_TOKEN", config.support.api_token.as_ref())
            .context("support API token not configured (support.apiToken or SUPPORT_API_TOKEN)")?;
        let source_language = {
            let s = config.translation.source_language.trim();
            if s.is_empty() {
                default_source_language()
            } else {
                s.to_string()
            }
        };
        Ok(Self {
            bot_base_url: bot_base_url.trim_end_matches('/').to_string(),
            bot_id,
            support_base_url: support_base_url.trim_end_matches('/').to_string(),
            support_account_id: config.support.account_id,
            support_token,
            source_language,
            terminology: resolve_value(
                &env,
                "TRANSLATE_TERMINOLOGY",
                config.translation.terminology.as_ref(),
            ),
            region: resolve_value(&env, "AWS_REGION", config.translation.region.as_ref()),
            translate_endpoint: config
                .translation
                .endpoint
                .as_ref()
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty()),
        })
    }
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("RELAY_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".relay").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the given path, the default path, or RELAY_CONFIG_PATH. Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_config() -> Config {
        serde_json::from_str(
            r#"{
                "bot": { "baseUrl": "http://bot.local/", "botId": "support-bot" },
                "support": { "baseUrl": "https://chat.example.com/", "apiToken": " tok " },
                "translation": { "region": "eu-west-1", "terminology": "brand-terms" }
            }"#,
        )
        .expect("parse config")
    }

    #[test]
    fn defaults_for_gateway_support_and_translation() {
        let config = Config::default();
        assert_eq!(config.gateway.port, 15152);
        assert_eq!(config.gateway.bind, "127.0.0.1");
        assert_eq!(config.gateway.webhook_path, "/webhook");
        assert_eq!(config.support.account_id, 1);
        assert_eq!(config.translation.source_language, "en");
    }

    #[test]
    fn empty_json_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").expect("parse");
        assert_eq!(config.gateway.port, 15152);
        assert!(config.bot.base_url.is_none());
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn resolve_trims_urls_and_token() {
        let settings = BridgeSettings::resolve_with(&full_config(), no_env).expect("resolve");
        assert_eq!(settings.bot_base_url, "http://bot.local");
        assert_eq!(settings.support_base_url, "https://chat.example.com");
        assert_eq!(settings.support_token, "tok");
        assert_eq!(settings.support_account_id, 1);
        assert_eq!(settings.source_language, "en");
        assert_eq!(settings.region.as_deref(), Some("eu-west-1"));
        assert_eq!(settings.terminology.as_deref(), Some("brand-terms"));
    }

    #[test]
    fn resolve_fails_without_bot_id() {
        let mut config = full_config();
        config.bot.bot_id = Some("   ".to_string());
        let err = BridgeSettings::resolve_with(&config, no_env).unwrap_err();
        assert!(err.to_string().contains("bot id"));
    }

    #[test]
    fn env_values_override_config() {
        let env = env_of(&[
            ("BOT_BASE_URL", "http://env-bot:3000/"),
            ("BOT_ID", "env-bot"),
            ("SUPPORT_BASE_URL", "https://env-chat"),
            ("SUPPORT_API_TOKEN", "env-token"),
            ("AWS_REGION", " us-west-2 "),
            ("TRANSLATE_TERMINOLOGY", "env-terms"),
        ]);
        let settings = BridgeSettings::resolve_with(&full_config(), env).expect("resolve");
        assert_eq!(settings.bot_base_url, "http://env-bot:3000");
        assert_eq!(settings.bot_id, "env-bot");
        assert_eq!(settings.support_base_url, "https://env-chat");
        assert_eq!(settings.support_token, "env-token");
        assert_eq!(settings.region.as_deref(), Some("us-west-2"));
        assert_eq!(settings.terminology.as_deref(), Some("env-terms"));
    }

    #[test]
    fn blank_env_values_fall_back_to_config() {
        let env = env_of(&[("BOT_ID", ""), ("SUPPORT_API_TOKEN", "   "), ("AWS_REGION", "")]);
        let settings = BridgeSettings::resolve_with(&full_config(), env).expect("resolve");
        assert_eq!(settings.bot_id, "support-bot");
        assert_eq!(settings.support_token, "tok");
        assert_eq!(settings.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn env_alone_supplies_region_and_terminology() {
        let mut config = full_config();
        config.translation.region = None;
        config.translation.terminology = None;
        let settings = BridgeSettings::resolve_with(&config, no_env).expect("resolve");
        assert_eq!(settings.region, None);
        assert_eq!(settings.terminology, None);

        let env = env_of(&[("AWS_REGION", "ap-south-1"), ("TRANSLATE_TERMINOLOGY", "glossary")]);
        let settings = BridgeSettings::resolve_with(&config, env).expect("resolve");
        assert_eq!(settings.region.as_deref(), Some("ap-south-1"));
        assert_eq!(settings.terminology.as_deref(), Some("glossary"));
    }
}
