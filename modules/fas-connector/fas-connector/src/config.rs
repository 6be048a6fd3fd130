//! Configuration for the FAS connector.

use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::{Deserialize, Serialize};

/// Section holding the connector settings.
pub const CONFIG_SECTION: &str = "fedoracommunity.connector.fas";
/// Shared client setting controlling TLS certificate verification.
pub const CHECK_CERTS_KEY: &str = "fedora.clients.check_certs";
/// Prefix of environment overrides, e.g. `FAS__FEDORACOMMUNITY__CONNECTOR__FAS__BASEURL`.
pub const ENV_PREFIX: &str = "FAS__";

const DEFAULT_BASE_URL: &str = "https://admin.fedoraproject.org/accounts";
const DEFAULT_CHECK_CERTS: &str = "True";

/// How the end of a membership page is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageEndMode {
    /// `end = min(offset + limit, count)`.
    #[default]
    Exclusive,
    /// `end = count - 1` once `offset + limit` reaches `count`, dropping the
    /// last row of the final page. Kept for clients that depend on it.
    Legacy,
}

/// FAS connector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FasConnectorConfig {
    /// Base URL of the account service.
    #[serde(rename = "baseurl")]
    pub base_url: String,

    /// Lifetime of cached user views.
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,

    /// Maximum number of cached user views.
    pub cache_max_entries: u64,

    /// Per-request timeout of remote calls.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    pub page_end: PageEndMode,

    pub user_agent: String,

    /// Name of the cookie carrying the remote session.
    pub session_cookie: String,

    /// Skip TLS certificate verification. Derived from [`CHECK_CERTS_KEY`].
    #[serde(skip)]
    pub insecure: bool,
}

impl Default for FasConnectorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            cache_ttl: Duration::from_secs(5 * 60),
            cache_max_entries: 10_000,
            timeout: Duration::from_secs(30),
            page_end: PageEndMode::default(),
            user_agent: concat!("fas-connector/", env!("CARGO_PKG_VERSION")).to_owned(),
            session_cookie: "tg-visit".to_owned(),
            insecure: false,
        }
    }
}

/// `check_certs` as it may appear in YAML or the environment.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CheckCerts {
    Flag(bool),
    Number(i64),
    Text(String),
}

impl CheckCerts {
    fn into_text(self) -> String {
        match self {
            Self::Flag(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

/// Whether a raw `check_certs` value keeps certificate verification on.
///
/// Only `false`, `0` and `no` (any case) turn it off; anything else,
/// including unrecognised values, keeps it on.
#[must_use]
pub fn verify_certs(check_certs: &str) -> bool {
    !matches!(check_certs.to_lowercase().as_str(), "false" | "0" | "no")
}

impl FasConnectorConfig {
    /// Read the connector settings out of an application figment.
    ///
    /// Missing sections fall back to defaults.
    ///
    /// # Errors
    /// Returns a figment error when a present section has the wrong shape.
    pub fn from_figment(figment: &Figment) -> Result<Self, figment::Error> {
        let mut cfg: Self = if figment.contains(CONFIG_SECTION) {
            figment.extract_inner(CONFIG_SECTION)?
        } else {
            Self::default()
        };

        let check_certs = if figment.contains(CHECK_CERTS_KEY) {
            figment
                .extract_inner::<CheckCerts>(CHECK_CERTS_KEY)?
                .into_text()
        } else {
            DEFAULT_CHECK_CERTS.to_owned()
        };
        cfg.insecure = !verify_certs(&check_certs);

        Ok(cfg)
    }
}

/// Layered configuration: YAML file (if any), then `FAS__*` environment overrides.
#[must_use]
pub fn layered_figment(path: Option<&Path>) -> Figment {
    let mut figment = Figment::new();
    if let Some(path) = path {
        figment = figment.merge(Yaml::file(path));
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Durations as humantime strings (`"5m"`) or plain integer seconds.
mod humantime_serde {
    use std::fmt;
    use std::time::Duration;

    use serde::{Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&humantime::format_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        d.deserialize_any(DurationVisitor)
    }

    struct DurationVisitor;

    impl de::Visitor<'_> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a duration such as \"5m\" or a number of seconds")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
            humantime::parse_duration(v)
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Duration, E> {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Duration, E> {
            u64::try_from(v)
                .map(Duration::from_secs)
                .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
        }
    }
}
