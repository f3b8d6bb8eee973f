//! Proxy bypass rules.
//!
//! No-proxy hosts are configured as shell globs (`*.corp.local`, `build-??`).
//! They are compiled into anchored regular expressions and matched against
//! the host of the webhook endpoint.

use regex::{Regex, RegexBuilder};
use reqwest::Url;
use tracing::warn;

use crate::error::ConfigError;

/// Translate a no-proxy glob into an anchored regular expression.
///
/// `*` matches any run of characters, `?` exactly one, everything else
/// matches itself.
#[must_use]
pub fn create_regex_from_glob(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 2);
    out.push('^');
    for c in glob.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    out.push('$');
    out
}

/// Compile a no-proxy glob. Host names compare case-insensitively.
///
/// # Errors
///
/// Returns [`ConfigError::BypassPattern`] if the generated expression does not compile.
pub fn compile_glob(glob: &str) -> Result<Regex, ConfigError> {
    RegexBuilder::new(&create_regex_from_glob(glob))
        .case_insensitive(true)
        .build()
        .map_err(|source| ConfigError::BypassPattern {
            glob: glob.to_string(),
            source,
        })
}

/// Hosts that are reached directly instead of through the proxy.
#[derive(Debug, Clone, Default)]
pub struct ProxyRule {
    patterns: Vec<Regex>,
}

impl ProxyRule {
    /// Parse a no-proxy host list as found in proxy settings.
    ///
    /// Entries are separated by commas, semicolons, pipes or whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if any entry does not compile.
    pub fn from_no_proxy_hosts(list: &str) -> Result<Self, ConfigError> {
        Self::from_globs(
            list.split(|c: char| c == ',' || c == ';' || c == '|' || c.is_whitespace())
                .filter(|s| !s.is_empty()),
        )
    }

    /// Compile each glob into a bypass pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob does not compile.
    pub fn from_globs<I, S>(globs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = globs
            .into_iter()
            .map(|g| compile_glob(g.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Build a rule from already compiled expressions.
    #[must_use]
    pub const fn from_patterns(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether `host` matches one of the bypass patterns.
    #[must_use]
    pub fn bypasses(&self, host: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(host))
    }

    /// Decide whether requests to `endpoint` go through the proxy.
    ///
    /// An endpoint that cannot be parsed keeps the proxy in place.
    #[must_use]
    pub fn is_proxy_required(&self, endpoint: &str) -> bool {
        let host = match Url::parse(endpoint) {
            Ok(url) => url.host_str().map(str::to_string),
            Err(e) => {
                warn!(
                    endpoint = %endpoint,
                    error = %e,
                    "A malformed URL is defined as endpoint, please check your settings"
                );
                return true;
            }
        };

        match host {
            Some(host) => !self.bypasses(&host),
            None => true,
        }
    }
}
