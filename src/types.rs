//! Core types for Dysms requests and delivery reports.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// PhoneNumber
// =============================================================================

/// Error when parsing a phone number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneNumberError {
    /// Phone number is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// Phone number contains characters other than digits.
    #[error("phone number must contain only digits and an optional leading '+'")]
    NonDigit,
    /// Phone number has invalid length.
    #[error("phone number must be between 5 and 20 digits")]
    InvalidLength,
}

/// Recipient phone number (e.g., "13800138000" or "+8613800138000").
///
/// Mainland China numbers are sent without a prefix; international numbers
/// carry the country code, optionally with a leading '+'.
///
/// # Example
///
/// ```rust
/// use dysms_gateway::PhoneNumber;
///
/// let phone = PhoneNumber::new(" 13800138000 ").unwrap();
/// assert_eq!(phone.as_str(), "13800138000");
///
/// assert!(PhoneNumber::new("138-0013").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Create a new PhoneNumber, trimming surrounding whitespace.
    pub fn new(s: impl AsRef<str>) -> Result<Self, PhoneNumberError> {
        let s = s.as_ref().trim();
        if s.is_empty() {
            return Err(PhoneNumberError::Empty);
        }
        let digits = s.strip_prefix('+').unwrap_or(s);
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneNumberError::NonDigit);
        }
        if !(5..=20).contains(&digits.len()) {
            return Err(PhoneNumberError::InvalidLength);
        }
        Ok(Self(s.to_string()))
    }

    /// Get the number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for PhoneNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for PhoneNumber {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PhoneNumber {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        PhoneNumber::new(raw).map_err(de::Error::custom)
    }
}

// =============================================================================
// Plain string identifiers
// =============================================================================

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new value from a string.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the value is empty after trimming.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_newtype!(
    /// SMS signature name registered in the console (e.g., "Aliyun").
    SignName
);

string_newtype!(
    /// Approved SMS template code (e.g., "SMS_123456789").
    TemplateCode
);

string_newtype!(
    /// Caller-defined correlation id echoed back in delivery reports.
    OutId
);

string_newtype!(
    /// Upstream extension code appended to the sender number.
    ExtendCode
);

string_newtype!(
    /// Send receipt id returned by `SendSms`, used to narrow send detail queries.
    BizId
);

string_newtype!(
    /// Delivery-report queue name (e.g., "Alicom-Queue-1234567890-SmsReport").
    QueueName
);

string_newtype!(
    /// Opaque handle identifying a received queue message for deletion.
    ReceiptHandle
);

// =============================================================================
// MessageType
// =============================================================================

/// Kind of message posted to a delivery-report queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// SMS delivery receipts.
    SmsReport,
    /// Upstream (mobile-originated) SMS.
    SmsUp,
    /// Any other message type enabled in the console.
    Other(String),
}

impl MessageType {
    /// Returns the provider name for this message type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::SmsReport => "SmsReport",
            Self::SmsUp => "SmsUp",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl From<&str> for MessageType {
    fn from(raw: &str) -> Self {
        match raw {
            "SmsReport" => Self::SmsReport,
            "SmsUp" => Self::SmsUp,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for MessageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// TemplateParams
// =============================================================================

/// Template variables substituted into an SMS template.
///
/// Keys are kept in sorted order so the encoded JSON is deterministic.
///
/// # Example
///
/// ```rust
/// use dysms_gateway::TemplateParams;
///
/// let params = TemplateParams::new().with("code", "1234").with("product", "云通信");
/// assert_eq!(params.to_json().unwrap(), r#"{"code":"1234","product":"云通信"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateParams(BTreeMap<String, String>);

impl TemplateParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, returning the updated set.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a variable, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a variable.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Encode as compact JSON. Non-ASCII characters are written unescaped.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_number_valid() {
        assert!(PhoneNumber::new("13800138000").is_ok());
        assert!(PhoneNumber::new("+85291234567").is_ok());
        assert_eq!(
            PhoneNumber::new("  13800138000\n").unwrap().as_str(),
            "13800138000"
        );
    }

    #[test]
    fn test_phone_number_empty() {
        assert_eq!(PhoneNumber::new(""), Err(PhoneNumberError::Empty));
        assert_eq!(PhoneNumber::new("   "), Err(PhoneNumberError::Empty));
    }

    #[test]
    fn test_phone_number_non_digit() {
        assert_eq!(
            PhoneNumber::new("138a0013800"),
            Err(PhoneNumberError::NonDigit)
        );
        assert_eq!(PhoneNumber::new("++8613800"), Err(PhoneNumberError::NonDigit));
    }

    #[test]
    fn test_phone_number_invalid_length() {
        assert_eq!(PhoneNumber::new("1234"), Err(PhoneNumberError::InvalidLength));
        assert_eq!(
            PhoneNumber::new("123456789012345678901"),
            Err(PhoneNumberError::InvalidLength)
        );
    }

    #[test]
    fn test_phone_number_serde() {
        let phone = PhoneNumber::new("13800138000").unwrap();
        assert_eq!(serde_json::to_string(&phone).unwrap(), r#""13800138000""#);
        assert!(serde_json::from_str::<PhoneNumber>(r#""abc""#).is_err());
    }

    #[test]
    fn test_string_newtypes() {
        let sign = SignName::from("Aliyun");
        assert_eq!(sign.to_string(), "Aliyun");
        assert!(!sign.is_blank());
        assert!(OutId::new("  ").is_blank());
        assert_eq!(
            serde_json::to_string(&BizId::new("900619746936498440^0")).unwrap(),
            r#""900619746936498440^0""#
        );
    }

    #[test]
    fn test_message_type() {
        assert_eq!(MessageType::from("SmsReport"), MessageType::SmsReport);
        assert_eq!(MessageType::from("SmsUp").as_str(), "SmsUp");
        assert_eq!(
            MessageType::from("VoiceReport"),
            MessageType::Other("VoiceReport".to_string())
        );
    }

    #[test]
    fn test_template_params_json_is_sorted_and_unescaped() {
        let params = TemplateParams::new()
            .with("name", "张三")
            .with("code", "9527");
        assert_eq!(params.to_json().unwrap(), r#"{"code":"9527","name":"张三"}"#);
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("code"), Some("9527"));
    }

    #[test]
    fn test_template_params_from_iter() {
        let params: TemplateParams = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(params.get("b"), Some("2"));
        assert!(TemplateParams::new().is_empty());
    }
}
