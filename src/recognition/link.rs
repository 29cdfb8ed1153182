//! Link extraction from free-form message text.
//!
//! Recognition is purely syntactic: nothing here checks that a link is
//! reachable. Both scheme-qualified links (`https://...`) and bare domains
//! with a known top-level domain (`youtu.be/xyz`) are recognised; bare links
//! are normalised with an `https://` prefix.

use std::sync::LazyLock;

use regex::Regex;

use crate::recognition::domain::SourceLink;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?:https?://[^\s<>"'`]+)|(?:\b(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+([a-z]{2,24})\b(?:[/?#][^\s<>"'`]*)?)"#,
    )
    .expect("URL pattern is valid")
});

/// Top-level domains accepted for links written without a scheme.
///
/// Keeps `file.txt` or `end.Next` in ordinary prose from being taken as links.
/// Scheme-qualified links are accepted whatever their TLD. File-extension
/// lookalikes (`sh`, `py`, `md`, `rs`) are not listed.
const BARE_TLDS: &[&str] = &[
    // Generic
    "com", "net", "org", "info", "biz", "edu", "gov", "io", "co", "me", "app", "dev", "ai",
    "xyz", "link", "site", "online", "store", "shop", "live", "music", "video", "media", "top",
    "club", "page", "news", "blog", "art", "fun", "world", "social", "studio", "audio",
    // Short-link and creator favourites
    "be", "am", "ly", "tv", "fm", "to", "gg", "gl", "cc", "ws", "im", "la", "vc",
    "ee", "st", "lt", "lv", "su",
    // Country codes
    "ua", "ru", "by", "kz", "de", "at", "ch", "uk", "ie", "fr", "es", "pt", "it", "pl", "cz",
    "sk", "hu", "ro", "bg", "gr", "tr", "nl", "se", "dk", "fi", "jp", "kr", "cn", "tw",
    "hk", "sg", "th", "vn", "ph", "br", "ar", "cl", "mx", "pe", "in", "pk", "us",
    "ca", "au", "nz", "za", "ng", "eg", "il", "ae", "sa", "eu",
];

/// Characters that end a sentence rather than a link.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"', ']', '}'];

/// Find the first link in `text`, scanning left to right.
pub fn find_first_url(text: &str) -> Option<SourceLink> {
    URL_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            // Skip the domain half of an email address
            if text[..whole.start()].ends_with('@') {
                return None;
            }
            let bare_tld = caps.get(1).map(|m| m.as_str().to_lowercase());
            if let Some(tld) = &bare_tld
                && !BARE_TLDS.contains(&tld.as_str())
            {
                return None;
            }

            let candidate = trim_trailing(whole.as_str());
            let normalized = if bare_tld.is_some() {
                format!("https://{candidate}")
            } else {
                candidate.to_string()
            };

            url::Url::parse(&normalized)
                .ok()
                .filter(|url| url.host_str().is_some())
                .map(|_| SourceLink::new(normalized))
        })
        .next()
}

/// Strip sentence punctuation glued to the end of a link.
///
/// A closing parenthesis is kept when it balances one inside the link, as in
/// wiki-style `.../Song_(band)` links.
fn trim_trailing(candidate: &str) -> &str {
    let mut end = candidate;
    loop {
        let trimmed = end.trim_end_matches(TRAILING_PUNCTUATION);
        let trimmed = if trimmed.ends_with(')')
            && trimmed.matches('(').count() < trimmed.matches(')').count()
        {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };
        if trimmed.len() == end.len() {
            return end;
        }
        end = trimmed;
    }
}
