//! User settings: explainer credentials, image provider and daily goal.

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Daily goal used when none is configured.
pub const DEFAULT_DAILY_GOAL: u32 = 40;

/// Explainer backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI or any OpenAI-compatible endpoint.
    #[default]
    OpenAI,
    Anthropic,
}

/// Source of per-word illustration URLs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImageProvider {
    None,
    #[default]
    Dicebear,
    Pollinations,
}

/// Persisted user settings.
///
/// Field names on the wire follow the flat keys used by exported backups
/// (`openai_api_key`, `image_provider`, `daily_goal`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub llm_provider: LlmProvider,
    #[serde(rename = "openai_api_key", alias = "api_key")]
    pub api_key: String,
    /// Custom endpoint; empty means the provider default.
    #[serde(rename = "openai_base_url", alias = "base_url")]
    pub base_url: String,
    #[serde(rename = "openai_model", alias = "model")]
    pub model: String,
    pub image_provider: ImageProvider,
    pub pollinations_api_key: String,
    pub pollinations_model: String,
    #[serde(deserialize_with = "lenient_goal")]
    pub daily_goal: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm_provider: LlmProvider::default(),
            api_key: String::new(),
            base_url: String::new(),
            model: "gpt-4o".to_string(),
            image_provider: ImageProvider::default(),
            pollinations_api_key: String::new(),
            pollinations_model: "flux".to_string(),
            daily_goal: DEFAULT_DAILY_GOAL,
        }
    }
}

impl Settings {
    /// Whether an explainer credential is configured.
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Custom base URL, if set.
    pub fn base_url(&self) -> Option<&str> {
        Some(self.base_url.trim()).filter(|u| !u.is_empty())
    }

    /// Apply every field present in `patch`.
    pub fn merge(&mut self, patch: SettingsPatch) {
        if let Some(provider) = patch.llm_provider {
            self.llm_provider = provider;
        }
        if let Some(key) = patch.api_key {
            self.api_key = key;
        }
        if let Some(url) = patch.base_url {
            self.base_url = url;
        }
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(provider) = patch.image_provider {
            self.image_provider = provider;
        }
        if let Some(key) = patch.pollinations_api_key {
            self.pollinations_api_key = key;
        }
        if let Some(model) = patch.pollinations_model {
            self.pollinations_model = model;
        }
        if let Some(goal) = patch.daily_goal {
            self.daily_goal = goal;
        }
    }
}

/// A partial settings update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_provider: Option<LlmProvider>,
    #[serde(rename = "openai_api_key", alias = "api_key", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(rename = "openai_base_url", alias = "base_url", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(rename = "openai_model", alias = "model", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_provider: Option<ImageProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pollinations_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pollinations_model: Option<String>,
    #[serde(
        deserialize_with = "lenient_goal_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub daily_goal: Option<u32>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn parse_goal(value: serde_json::Value) -> Option<u32> {
    let goal = match value {
        serde_json::Value::Number(n) => n.as_u64().map(|n| n as u32),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    goal.filter(|goal| *goal > 0)
}

/// Daily goals were historically stored as strings ("40").
fn lenient_goal<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(parse_goal(value).unwrap_or(DEFAULT_DAILY_GOAL))
}

fn lenient_goal_opt<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(parse_goal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.image_provider, ImageProvider::Dicebear);
        assert_eq!(settings.daily_goal, 40);
        assert_eq!(settings.model, "gpt-4o");
        assert!(!settings.has_credential());
        assert!(settings.base_url().is_none());
    }

    #[test]
    fn test_reads_flat_backup_keys() {
        let settings: Settings = serde_json::from_value(json!({
            "openai_api_key": "sk-test",
            "openai_model": "deepseek-chat",
            "image_provider": "none",
            "daily_goal": "25"
        }))
        .unwrap();
        assert!(settings.has_credential());
        assert_eq!(settings.model, "deepseek-chat");
        assert_eq!(settings.image_provider, ImageProvider::None);
        assert_eq!(settings.daily_goal, 25);
        assert_eq!(settings.pollinations_model, "flux");
    }

    #[test]
    fn test_invalid_goal_falls_back() {
        let settings: Settings = serde_json::from_value(json!({"daily_goal": "lots"})).unwrap();
        assert_eq!(settings.daily_goal, DEFAULT_DAILY_GOAL);
    }

    #[test]
    fn test_merge_only_touches_present_fields() {
        let mut settings = Settings::default();
        let patch: SettingsPatch =
            serde_json::from_value(json!({"image_provider": "pollinations", "daily_goal": 60}))
                .unwrap();
        settings.merge(patch);

        assert_eq!(settings.image_provider, ImageProvider::Pollinations);
        assert_eq!(settings.daily_goal, 60);
        assert_eq!(settings.model, "gpt-4o");
    }

    #[test]
    fn test_empty_patch() {
        assert!(SettingsPatch::default().is_empty());
        let patch: SettingsPatch = serde_json::from_value(json!({"model": "x"})).unwrap();
        assert!(!patch.is_empty());
    }
}
