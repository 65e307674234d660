//! Pure ingest normalization: the donation filter, the title transform, and
//! asset resolution. No I/O here — every rule is testable in isolation, and
//! the gateway only composes these functions around the identity lookup.

use crate::config::{AssetsConfig, CURRENCY_MARKER};
use crate::types::{AlertPayload, IdentityProfile, IngestEvent};

/// Result of normalizing one raw ingest event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Title carried the currency marker; payload is ready to persist.
    Accepted(AlertPayload),
    /// Title lacked the marker — accepted and discarded, no state change.
    Ignored,
}

/// Validate-filter-canonicalize one event against a known identity.
///
/// The caller has already established that `event.identifier` is present and
/// that `profile` exists for it; everything left is deterministic.
pub fn normalize(
    event: IngestEvent,
    profile: &IdentityProfile,
    defaults: &AssetsConfig,
    received_at_ms: i64,
) -> Outcome {
    if !event.title.contains(CURRENCY_MARKER) {
        return Outcome::Ignored;
    }

    let title = canonicalize_title(&event.title);
    let (alert_gif, alert_audio) = resolve_assets(profile, defaults);

    Outcome::Accepted(AlertPayload {
        identifier: event.identifier,
        title,
        text: event.text,
        source: event.source,
        timestamp: event.timestamp.unwrap_or(received_at_ms),
        alert_gif,
        alert_audio,
    })
}

/// Capitalize each space-separated word, then rewrite the payment phrase.
///
/// The order is load-bearing: capitalization runs first, so only the
/// title-cased "Paid You" variant can still match afterwards. The lowercase
/// replace stays in the chain so the transform sequence is observable; the
/// tests below pin both facts.
pub fn canonicalize_title(title: &str) -> String {
    let capitalized = title
        .split(' ')
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join(" ");

    capitalized
        .replace("paid you", "donated")
        .replace("Paid You", "Donated")
}

/// Uppercase the first character, lowercase the rest.
fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Per-identity overrides win; otherwise the configured system defaults.
pub fn resolve_assets(profile: &IdentityProfile, defaults: &AssetsConfig) -> (String, String) {
    let gif = profile
        .alert_gif
        .clone()
        .unwrap_or_else(|| defaults.gif_url.clone());
    let audio = profile
        .alert_audio
        .clone()
        .unwrap_or_else(|| defaults.audio_url.clone());
    (gif, audio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_ALERT_AUDIO, DEFAULT_ALERT_GIF};

    fn profile(gif: Option<&str>, audio: Option<&str>) -> IdentityProfile {
        IdentityProfile {
            identifier: "u1".into(),
            provider: None,
            provider_id: None,
            display_name: None,
            avatar: None,
            alert_gif: gif.map(String::from),
            alert_audio: audio.map(String::from),
            created_at: "2026-01-01T00:00:00Z".into(),
            updated_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    fn event(title: &str) -> IngestEvent {
        IngestEvent {
            identifier: "u1".into(),
            title: title.into(),
            text: "thanks!".into(),
            source: Some("com.example.pay".into()),
            timestamp: None,
        }
    }

    #[test]
    fn donation_title_is_canonicalized_with_default_assets() {
        let out = normalize(
            event("john paid you ₹50"),
            &profile(None, None),
            &AssetsConfig::default(),
            1_700_000_000_000,
        );
        match out {
            Outcome::Accepted(p) => {
                assert_eq!(p.title, "John Donated ₹50");
                assert_eq!(p.alert_gif, DEFAULT_ALERT_GIF);
                assert_eq!(p.alert_audio, DEFAULT_ALERT_AUDIO);
                assert_eq!(p.timestamp, 1_700_000_000_000);
            }
            Outcome::Ignored => panic!("expected Accepted"),
        }
    }

    #[test]
    fn title_without_marker_is_ignored() {
        let out = normalize(
            event("Hello"),
            &profile(None, None),
            &AssetsConfig::default(),
            0,
        );
        assert_eq!(out, Outcome::Ignored);
    }

    #[test]
    fn client_timestamp_is_preserved() {
        let mut ev = event("tip ₹5");
        ev.timestamp = Some(42);
        match normalize(ev, &profile(None, None), &AssetsConfig::default(), 999) {
            Outcome::Accepted(p) => assert_eq!(p.timestamp, 42),
            Outcome::Ignored => panic!("expected Accepted"),
        }
    }

    #[test]
    fn identity_overrides_beat_defaults() {
        let out = normalize(
            event("tip ₹5"),
            &profile(Some("https://example.com/custom.gif"), None),
            &AssetsConfig::default(),
            0,
        );
        match out {
            Outcome::Accepted(p) => {
                assert_eq!(p.alert_gif, "https://example.com/custom.gif");
                assert_eq!(p.alert_audio, DEFAULT_ALERT_AUDIO);
            }
            Outcome::Ignored => panic!("expected Accepted"),
        }
    }

    // Regression: capitalization runs before the phrase replacement, so the
    // lowercase pattern never fires and only "Paid You" is rewritten.
    #[test]
    fn capitalize_runs_before_phrase_replacement() {
        assert_eq!(canonicalize_title("x paid you ₹9"), "X Donated ₹9");
        // Shouting input is folded to title case first, then rewritten.
        assert_eq!(canonicalize_title("JOHN PAID YOU ₹5"), "John Donated ₹5");
    }

    #[test]
    fn replacement_fires_across_adjacent_punctuation() {
        // "you," capitalizes to "You," and the substring still matches.
        assert_eq!(canonicalize_title("mo paid you, thanks"), "Mo Donated, Thanks");
    }

    #[test]
    fn hyphenated_phrase_is_not_rewritten() {
        // Only the space-separated phrase is targeted.
        assert_eq!(canonicalize_title("mo paid-you ₹1"), "Mo Paid-you ₹1");
    }

    #[test]
    fn empty_and_multi_space_titles_survive() {
        assert_eq!(canonicalize_title(""), "");
        assert_eq!(canonicalize_title("a  b"), "A  B");
    }
}
