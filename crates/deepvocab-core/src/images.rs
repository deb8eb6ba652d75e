//! Illustration URLs per image provider.

use crate::config::{ImageProvider, Settings};
use crate::types::ExplanationRecord;

const DICEBEAR_BASE: &str = "https://api.dicebear.com/9.x/icons/svg";
const POLLINATIONS_KEYED_BASE: &str = "https://gen.pollinations.ai/image";
const POLLINATIONS_PUBLIC_BASE: &str = "https://image.pollinations.ai/prompt";
const DEFAULT_POLLINATIONS_MODEL: &str = "flux";

/// Stable seed for a word: 31-multiplier string hash, folded to six digits.
pub fn pollinations_seed(word: &str) -> u32 {
    let hash = word
        .encode_utf16()
        .fold(0i32, |h, c| h.wrapping_shl(5).wrapping_sub(h).wrapping_add(c as i32));
    (i64::from(hash).abs() % 1_000_000) as u32
}

/// URL for `word` under the configured provider; `None` when disabled.
pub fn image_url(settings: &Settings, word: &str) -> Option<String> {
    match settings.image_provider {
        ImageProvider::None => None,
        ImageProvider::Dicebear => Some(format!(
            "{}?seed={}",
            DICEBEAR_BASE,
            urlencoding::encode(word)
        )),
        ImageProvider::Pollinations => {
            let prompt = format!("minimalist vector illustration of action {} white background", word);
            let model = Some(settings.pollinations_model.trim())
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_POLLINATIONS_MODEL);
            let base = if settings.pollinations_api_key.trim().is_empty() {
                POLLINATIONS_PUBLIC_BASE
            } else {
                POLLINATIONS_KEYED_BASE
            };
            Some(format!(
                "{}/{}?model={}&nologo=true&seed={}",
                base,
                urlencoding::encode(&prompt),
                model,
                pollinations_seed(word)
            ))
        }
    }
}

/// Whether `url` was produced by `provider`.
pub fn matches_provider(url: &str, provider: ImageProvider) -> bool {
    match provider {
        ImageProvider::None => false,
        ImageProvider::Dicebear => url.contains("dicebear.com"),
        ImageProvider::Pollinations => url.contains("pollinations.ai"),
    }
}

/// Image for `word` given what the cache already holds.
///
/// Keeps a cached URL from the current provider, then prefers a stored
/// per-provider URL, then generates a fresh one.
pub fn resolve_image(
    settings: &Settings,
    word: &str,
    cached: Option<&ExplanationRecord>,
) -> Option<String> {
    let provider = settings.image_provider;
    if provider == ImageProvider::None {
        return None;
    }

    if let Some(record) = cached {
        let stored = [
            record.image_url.as_deref(),
            record.image_dicebear.as_deref(),
            record.image_pollinations.as_deref(),
        ];
        if let Some(url) = stored
            .into_iter()
            .flatten()
            .find(|url| !url.is_empty() && matches_provider(url, provider))
        {
            return Some(url.to_string());
        }
    }

    image_url(settings, word)
}
