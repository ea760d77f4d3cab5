/// Errors that can occur when creating validated identifier types.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// The input was empty or contained only whitespace
    #[error("identifier cannot be empty")]
    Empty,
}

fn validated(input: &str) -> Result<String, IdError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IdError::Empty);
    }
    Ok(trimmed.to_owned())
}

macro_rules! identifier {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        ///
        /// The inner string is trimmed on construction and guaranteed to
        /// contain at least one non-whitespace character.
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns [`IdError::Empty`] if the trimmed input is empty.
            pub fn new(input: impl AsRef<str>) -> Result<Self, IdError> {
                validated(input.as_ref()).map(Self)
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $name::new(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

identifier! {
    /// A patient identifier as entered at intake (e.g. `P-001`).
    PatientId
}

identifier! {
    /// A staff sign-in identifier (e.g. `nur_01`, `doc_cardio`).
    HospitalId
}
