//! Authentication primitives such as login credentials and registrations.
//!
//! Inbound payload parsing stays outside the domain: handlers call these
//! constructors, which validate raw strings before any port is touched.
//! Passwords are held in [`Zeroizing`] buffers so they are wiped on drop.

use std::fmt;

use zeroize::Zeroizing;

use super::{ContactFieldError, EmailAddress, PhoneNumber, normalize_display_name};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// A contact field was malformed.
    Contact(ContactFieldError),
    /// Password was blank.
    EmptyPassword,
    /// Password shorter than [`MIN_PASSWORD_CHARS`].
    PasswordTooShort,
}

impl CredentialValidationError {
    /// Name of the offending payload field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Contact(ContactFieldError::InvalidEmail) => "email",
            Self::Contact(ContactFieldError::InvalidPhone) => "phone",
            Self::Contact(ContactFieldError::EmptyDisplayName) => "displayName",
            Self::EmptyPassword | Self::PasswordTooShort => "password",
        }
    }
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contact(err) => write!(f, "{err}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort => write!(
                f,
                "password must be at least {MIN_PASSWORD_CHARS} characters"
            ),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

impl From<ContactFieldError> for CredentialValidationError {
    fn from(value: ContactFieldError) -> Self {
        Self::Contact(value)
    }
}

/// Validated login credentials.
///
/// # Examples
/// ```
/// use fournil::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Awa@Example.gn", "pain-chaud").expect("valid");
/// assert_eq!(creds.email().as_str(), "awa@example.gn");
/// assert_eq!(creds.password(), "pain-chaud");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        let email = EmailAddress::parse(email)?;
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated self-registration request.
///
/// ## Invariants
/// - `display_name` is trimmed and non-empty.
/// - `password` has at least [`MIN_PASSWORD_CHARS`] characters; whitespace
///   is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    display_name: String,
    email: EmailAddress,
    phone: Option<PhoneNumber>,
    password: Zeroizing<String>,
}

impl Registration {
    /// Construct a registration from raw inputs.
    pub fn try_from_parts(
        display_name: &str,
        email: &str,
        password: &str,
        phone: Option<&str>,
    ) -> Result<Self, CredentialValidationError> {
        let display_name = normalize_display_name(display_name)?;
        let email = EmailAddress::parse(email)?;
        let phone = phone
            .filter(|raw| !raw.trim().is_empty())
            .map(PhoneNumber::parse)
            .transpose()?;
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(CredentialValidationError::PasswordTooShort);
        }
        Ok(Self {
            display_name,
            email,
            phone,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Trimmed display name.
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Normalised email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Optional phone number.
    pub fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    /// Plain-text password, to be hashed before storage.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", "pw", "email")]
    #[case("not-an-email", "pw", "email")]
    #[case("awa@example.gn", "", "password")]
    fn invalid_login(#[case] email: &str, #[case] password: &str, #[case] field: &str) {
        let err = LoginCredentials::try_from_parts(email, password).expect_err("must fail");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    #[case("  ", "awa@example.gn", "longenough", None, "displayName")]
    #[case("Awa", "awa@example.gn", "short", None, "password")]
    #[case("Awa", "awa@example.gn", "longenough", Some("12"), "phone")]
    fn invalid_registration(
        #[case] name: &str,
        #[case] email: &str,
        #[case] password: &str,
        #[case] phone: Option<&str>,
        #[case] field: &str,
    ) {
        let err =
            Registration::try_from_parts(name, email, password, phone).expect_err("must fail");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn blank_phone_is_treated_as_absent() {
        let registration =
            Registration::try_from_parts(" Awa ", "Awa@example.gn", "croissant", Some("  "))
                .expect("valid");
        assert_eq!(registration.display_name(), "Awa");
        assert!(registration.phone().is_none());
    }
}
