//! Declarative helpers for identifier newtypes and string-coded enums.
//!
//! Both shapes repeat across every aggregate: UUID identifiers that must not
//! be mixed up, and closed sets of codes stored as text in the database and
//! exchanged as snake_case strings over HTTP.

/// Define a UUID-backed identifier newtype.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::utoipa::ToSchema,
        )]
        #[serde(transparent)]
        #[schema(value_type = String, format = Uuid)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: ::uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &::uuid::Uuid {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                ::uuid::Uuid::parse_str(value).map(Self)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(value: ::uuid::Uuid) -> Self {
                Self(value)
            }
        }
    };
}

/// Define a closed enum exchanged as snake_case codes.
///
/// Generates `as_str`, `Display`, `FromStr`, serde and OpenAPI support, plus
/// a parse error type carrying the rejected value.
macro_rules! define_code_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident / $error:ident ($what:literal) {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $code:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::utoipa::ToSchema,
        )]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stable code used on the wire and in storage.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        #[doc = concat!("Error returned when parsing an unknown ", $what, " code.")]
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $error {
            /// The rejected input.
            pub value: String,
        }

        impl ::std::fmt::Display for $error {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, concat!("unknown ", $what, " '{}'"), self.value)
            }
        }

        impl ::std::error::Error for $error {}

        impl ::std::str::FromStr for $name {
            type Err = $error;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($code => Ok(Self::$variant),)+
                    _ => Err($error {
                        value: value.to_owned(),
                    }),
                }
            }
        }
    };
}

pub(crate) use {define_code_enum, define_id};

#[cfg(test)]
mod tests {
    //! Regression coverage for the generated impls.
    use std::str::FromStr;

    use rstest::rstest;

    define_code_enum! {
        /// Sample enum.
        pub enum Flavour / ParseFlavourError ("flavour") {
            /// Plain.
            Plain => "plain",
            /// Pain au chocolat.
            PainAuChocolat => "pain_au_chocolat",
        }
    }

    define_id! {
        /// Sample id.
        SampleId
    }

    #[rstest]
    #[case("plain", Flavour::Plain)]
    #[case("pain_au_chocolat", Flavour::PainAuChocolat)]
    fn codes_parse_and_display(#[case] code: &str, #[case] expected: Flavour) {
        let parsed = Flavour::from_str(code).expect("known code");
        assert_eq!(parsed, expected);
        assert_eq!(parsed.to_string(), code);
        assert_eq!(
            serde_json::to_value(parsed).expect("serialise"),
            serde_json::Value::String(code.to_owned())
        );
    }

    #[rstest]
    fn unknown_code_reports_value() {
        let err = Flavour::from_str("croissant").expect_err("unknown");
        assert_eq!(err.to_string(), "unknown flavour 'croissant'");
    }

    #[rstest]
    fn ids_serialise_as_bare_uuid_strings() {
        let id = SampleId::random();
        let json = serde_json::to_value(id).expect("serialise");
        assert_eq!(json, serde_json::Value::String(id.to_string()));
        assert_eq!(SampleId::from_str(&id.to_string()).expect("parse"), id);
    }
}
