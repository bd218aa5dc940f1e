//! User accounts and the contact fields they carry.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|err| panic!("email pattern: {err}"))
});

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9]{6,15}$").unwrap_or_else(|err| panic!("phone pattern: {err}"))
});

/// Validation errors for user contact fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactFieldError {
    /// The email address is malformed.
    #[error("email address is invalid")]
    InvalidEmail,
    /// The phone number is malformed.
    #[error("phone number must be 6 to 15 digits with an optional leading +")]
    InvalidPhone,
    /// A display name was blank.
    #[error("display name must not be empty")]
    EmptyDisplayName,
}

/// Lower-cased, trimmed email address.
///
/// # Examples
/// ```
/// use fournil::domain::EmailAddress;
///
/// let email = EmailAddress::parse("  Awa@Example.GN ").expect("valid");
/// assert_eq!(email.as_str(), "awa@example.gn");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, format = Email)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalise and validate an address.
    pub fn parse(raw: &str) -> Result<Self, ContactFieldError> {
        let normalized = raw.trim().to_lowercase();
        if EMAIL_PATTERN.is_match(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(ContactFieldError::InvalidEmail)
        }
    }

    /// Address as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ContactFieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Phone number reduced to digits with an optional leading `+`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Strip spaces, dashes, and dots, then validate.
    pub fn parse(raw: &str) -> Result<Self, ContactFieldError> {
        let compact: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();
        if PHONE_PATTERN.is_match(&compact) {
            Ok(Self(compact))
        } else {
            Err(ContactFieldError::InvalidPhone)
        }
    }

    /// Number as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ContactFieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

/// Trim a display name and reject blanks.
pub fn normalize_display_name(raw: &str) -> Result<String, ContactFieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ContactFieldError::EmptyDisplayName)
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Registered user account. The password hash never leaves persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier.
    pub id: UserId,
    /// Name shown to colleagues.
    pub display_name: String,
    /// Login address.
    pub email: EmailAddress,
    /// Optional mobile number.
    pub phone: Option<PhoneNumber>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("awa@example.gn")]
    #[case(" MAMADOU@Boulangerie.GN ")]
    fn accepts_plausible_emails(#[case] raw: &str) {
        let email = EmailAddress::parse(raw).expect("valid email");
        assert_eq!(email.as_str(), raw.trim().to_lowercase());
    }

    #[rstest]
    #[case("")]
    #[case("no-at-sign")]
    #[case("two words@example.gn")]
    fn rejects_malformed_emails(#[case] raw: &str) {
        assert_eq!(EmailAddress::parse(raw), Err(ContactFieldError::InvalidEmail));
    }

    #[rstest]
    #[case("+224 620-12-34-56", "+224620123456")]
    #[case("620.12.34.56", "620123456")]
    fn phone_numbers_are_compacted(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(PhoneNumber::parse(raw).expect("valid").as_str(), expected);
    }

    #[rstest]
    #[case("12")]
    #[case("call me")]
    fn rejects_malformed_phones(#[case] raw: &str) {
        assert_eq!(PhoneNumber::parse(raw), Err(ContactFieldError::InvalidPhone));
    }
}
