//! Short-lived delivery-report queue credential.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, de};
use std::time::Duration;

/// Remaining validity at or below which a token is refreshed.
pub const DEFAULT_REFRESH_WINDOW: Duration = Duration::from_secs(120);

/// Offset of the provider's `ExpireTime` values (China Standard Time).
const PROVIDER_UTC_OFFSET_SECS: i32 = 8 * 3600;
const PROVIDER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Credential used to open a queue session, as returned by
/// `QueryTokenForMnsQueue` (`MessageTokenDTO`).
#[derive(Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueueToken {
    /// Temporary access key id (usually `STS.` prefixed).
    pub access_key_id: String,
    /// Temporary access key secret.
    #[serde(deserialize_with = "deserialize_secret")]
    pub access_key_secret: SecretString,
    /// Security token accompanying the temporary key.
    #[serde(deserialize_with = "deserialize_secret")]
    pub security_token: SecretString,
    /// Instant after which the credential is rejected.
    #[serde(deserialize_with = "deserialize_expire_time")]
    pub expire_time: DateTime<Utc>,
}

impl std::fmt::Debug for QueueToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueToken")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"[REDACTED]")
            .field("security_token", &"[REDACTED]")
            .field("expire_time", &self.expire_time)
            .finish()
    }
}

impl QueueToken {
    pub fn new(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        security_token: impl Into<String>,
        expire_time: DateTime<Utc>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: SecretString::from(access_key_secret.into()),
            security_token: SecretString::from(security_token.into()),
            expire_time,
        }
    }

    /// Validity left at `now`; negative once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.expire_time.signed_duration_since(now)
    }

    /// Returns true if at most `window` of validity is left at `now`.
    pub fn needs_refresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match chrono::Duration::from_std(window) {
            Ok(window) => self.remaining(now) <= window,
            Err(_) => true,
        }
    }
}

/// Parse a provider `ExpireTime`.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` in China Standard Time, as the provider
/// sends it, and RFC 3339 timestamps.
pub fn parse_expire_time(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, PROVIDER_TIME_FORMAT) {
        let offset = FixedOffset::east_opt(PROVIDER_UTC_OFFSET_SECS)
            .ok_or_else(|| "invalid provider offset".to_string())?;
        return naive
            .and_local_timezone(offset)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| format!("ambiguous expire time '{raw}'"));
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid expire time '{raw}': {e}"))
}

fn deserialize_expire_time<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(d)?;
    parse_expire_time(&raw).map_err(de::Error::custom)
}

fn deserialize_secret<'de, D: Deserializer<'de>>(d: D) -> Result<SecretString, D::Error> {
    String::deserialize(d).map(SecretString::from)
}
