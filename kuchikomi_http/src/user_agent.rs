//! User-agent policy for outgoing requests.
//!
//! Some review sites reject requests that carry no browser-like user agent.
//! That is a property of the site, so the header stays under caller control:
//! a fixed string, a rotating pool, or no header at all.

use rand::seq::SliceRandom;

/// Desktop browser strings used by [`UserAgent::Rotating`].
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

/// How the `user-agent` header is chosen for each request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UserAgent {
    /// Pick a random desktop browser string per request.
    #[default]
    Rotating,
    /// Always send this exact string.
    Fixed(String),
    /// Send no `user-agent` header.
    Omit,
}

impl UserAgent {
    /// Parses a configuration value: empty means rotating, `none` means omit,
    /// anything else is used verbatim.
    pub fn from_setting(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Self::Rotating
        } else if trimmed.eq_ignore_ascii_case("none") {
            Self::Omit
        } else {
            Self::Fixed(trimmed.to_string())
        }
    }

    /// The header value for the next request, if any.
    pub fn header_value(&self) -> Option<String> {
        match self {
            Self::Rotating => Some(get_user_agent().to_string()),
            Self::Fixed(ua) => Some(ua.clone()),
            Self::Omit => None,
        }
    }

    pub fn is_omitted(&self) -> bool {
        matches!(self, Self::Omit)
    }
}

/// Returns a random desktop browser user agent.
pub fn get_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_parsing() {
        assert_eq!(UserAgent::from_setting(""), UserAgent::Rotating);
        assert_eq!(UserAgent::from_setting("  "), UserAgent::Rotating);
        assert_eq!(UserAgent::from_setting("None"), UserAgent::Omit);
        assert_eq!(
            UserAgent::from_setting("my-bot/1.0"),
            UserAgent::Fixed("my-bot/1.0".to_string())
        );
    }

    #[test]
    fn rotating_picks_from_pool() {
        let ua = UserAgent::Rotating.header_value().unwrap();
        assert!(USER_AGENTS.contains(&ua.as_str()));
    }

    #[test]
    fn omit_has_no_header() {
        assert_eq!(UserAgent::Omit.header_value(), None);
        assert!(UserAgent::Omit.is_omitted());
    }
}
