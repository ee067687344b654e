//! API key handling
//!
//! Atlas programmatic keys come as a public/private pair and sign every
//! request with HTTP digest. Keys are resolved once (flags, environment or
//! config file) and passed into the transport constructor; there is no
//! ambient credential state.

use std::fmt;

use crate::error::{Error, Result};

pub const PUBLIC_KEY_ENV: &str = "ATLAS_PUBLIC_KEY";
pub const PRIVATE_KEY_ENV: &str = "ATLAS_PRIVATE_KEY";

/// A programmatic API key pair.
#[derive(Clone)]
pub struct ApiKey {
    pub public_key: String,
    pub private_key: String,
}

impl ApiKey {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }

    /// Read the key pair from `ATLAS_PUBLIC_KEY` / `ATLAS_PRIVATE_KEY`.
    pub fn from_env() -> Result<Self> {
        let public_key = std::env::var(PUBLIC_KEY_ENV).map_err(|_| {
            Error::Config(format!(
                "no public key: set the {PUBLIC_KEY_ENV} environment variable"
            ))
        })?;
        let private_key = std::env::var(PRIVATE_KEY_ENV).map_err(|_| {
            Error::Config(format!(
                "no private key: set the {PRIVATE_KEY_ENV} environment variable"
            ))
        })?;
        Ok(Self::new(public_key, private_key))
    }
}

/// Mask all but the last three characters of a key for display.
pub fn obfuscate(key: &str) -> String {
    if key.len() > 3 {
        let masked = "X".repeat(key.len() - 3);
        format!("{}{}", masked, &key[key.len() - 3..])
    } else {
        key.to_string()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("public_key", &obfuscate(&self.public_key))
            .field("private_key", &obfuscate(&self.private_key))
            .finish()
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "public key: '{}' private key: '{}'",
            obfuscate(&self.public_key),
            obfuscate(&self.private_key)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obfuscate_masks_all_but_last_three() {
        assert_eq!(obfuscate("abcdefgh"), "XXXXXfgh");
    }

    #[test]
    fn obfuscate_leaves_short_keys_alone() {
        assert_eq!(obfuscate("abc"), "abc");
        assert_eq!(obfuscate(""), "");
    }

    #[test]
    fn display_never_leaks_the_private_key() {
        let key = ApiKey::new("someuser", "very-secret-key");
        let shown = format!("{key} {key:?}");
        assert!(!shown.contains("very-secret-key"));
        assert!(shown.contains("XXXXXXXXXXXXkey"));
    }
}
