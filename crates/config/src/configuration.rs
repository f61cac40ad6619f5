use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Current on-disk schema version. Bumped whenever the [`Configuration`] shape changes
/// in a way that would require a migration.
pub const SCHEMA_VERSION: &str = "1";

/// The process-wide configuration record described in the specification's data model.
///
/// Loaded once at startup (from CLI/environment defaults or an existing persisted
/// document), then mutated only through the admin surface and persisted atomically.
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Absolute `https` URL of the upstream Generative Language provider.
    pub upstream_base_url: url::Url,
    /// Opaque secret placed on outbound requests as the `key` query parameter.
    pub upstream_api_key: SecretString,
    /// Model name used when a client request omits one, and by the connectivity probe.
    pub default_model: String,
    /// 32-byte hex token clients present via `Authorization: Bearer`.
    pub local_api_key: SecretString,
    /// Salted password hash for the admin surface, or a plaintext bootstrap value
    /// that gets rehashed on first successful login.
    pub admin_secret: AdminSecret,
    /// Schema version of this record.
    pub schema_version: String,
}

/// The admin password, either still in its plaintext bootstrap form or already hashed.
#[derive(Debug, Clone)]
pub enum AdminSecret {
    /// A bootstrap password supplied at startup, not yet hashed.
    Plaintext(SecretString),
    /// A bcrypt hash (cost >= 10), produced after the first successful login.
    Hashed(String),
}

const BCRYPT_COST: u32 = 12;

impl AdminSecret {
    /// Verify `candidate` against this secret, returning whether it matched and, if the
    /// secret was still plaintext, the hash it should be upgraded to.
    pub fn verify(&self, candidate: &str) -> (bool, Option<String>) {
        match self {
            AdminSecret::Plaintext(expected) => {
                let matches = candidate == expected.expose_secret();
                if matches {
                    let hash = bcrypt::hash(candidate, BCRYPT_COST).ok();
                    (true, hash)
                } else {
                    (false, None)
                }
            }
            AdminSecret::Hashed(hash) => (bcrypt::verify(candidate, hash).unwrap_or(false), None),
        }
    }
}

/// Patch payload accepted by the admin "put config" operation: every field optional,
/// merged onto the current configuration.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigPatch {
    pub upstream_base_url: Option<String>,
    pub upstream_api_key: Option<String>,
    pub default_model: Option<String>,
}

/// Configuration view returned to the admin UI with `admin_secret` omitted.
#[derive(Debug, Serialize)]
pub struct ConfigurationView {
    pub upstream_base_url: String,
    pub default_model: String,
    pub schema_version: String,
}

impl Configuration {
    /// Build a new configuration from initial values (CLI/environment defaults),
    /// validating as the admin "put config" path would.
    pub fn new(
        upstream_base_url: String,
        upstream_api_key: String,
        default_model: String,
        local_api_key: String,
        admin_bootstrap_password: String,
    ) -> Result<Self> {
        let upstream_base_url = validate_https_url(&upstream_base_url)?;

        Ok(Self {
            upstream_base_url,
            upstream_api_key: SecretString::from(upstream_api_key),
            default_model,
            local_api_key: SecretString::from(local_api_key),
            admin_secret: AdminSecret::Plaintext(SecretString::from(admin_bootstrap_password)),
            schema_version: SCHEMA_VERSION.to_string(),
        })
    }

    /// Apply an admin config patch, validating the merged result.
    pub fn apply_patch(&mut self, patch: ConfigPatch) -> Result<()> {
        if let Some(url) = patch.upstream_base_url {
            self.upstream_base_url = validate_https_url(&url)?;
        }

        if let Some(key) = patch.upstream_api_key
            && !key.is_empty()
        {
            self.upstream_api_key = SecretString::from(key);
        }

        if let Some(model) = patch.default_model
            && !model.is_empty()
        {
            self.default_model = model;
        }

        Ok(())
    }

    /// Generate a fresh 32-byte (64 hex character) local API key.
    pub fn regenerate_local_api_key(&mut self) -> String {
        let key = random_hex_token(32);
        self.local_api_key = SecretString::from(key.clone());
        key
    }

    /// Replace the admin secret with a freshly hashed password.
    pub fn set_password(&mut self, new_password: &str) {
        let hash = bcrypt::hash(new_password, BCRYPT_COST).expect("bcrypt hashing cannot fail for valid UTF-8 input");
        self.admin_secret = AdminSecret::Hashed(hash);
    }

    /// Upgrade a plaintext bootstrap secret to a hash, called after a successful first login.
    pub fn upgrade_admin_secret(&mut self, hash: String) {
        self.admin_secret = AdminSecret::Hashed(hash);
    }

    /// Redacted view suitable for the admin "get config" response.
    pub fn view(&self) -> ConfigurationView {
        ConfigurationView {
            upstream_base_url: self.upstream_base_url.to_string(),
            default_model: self.default_model.clone(),
            schema_version: self.schema_version.clone(),
        }
    }

    /// Convert to the plain, fully-serializable on-disk representation.
    pub(crate) fn to_document(&self) -> ConfigDocument {
        ConfigDocument {
            upstream_base_url: self.upstream_base_url.to_string(),
            upstream_api_key: self.upstream_api_key.expose_secret().to_string(),
            default_model: self.default_model.clone(),
            local_api_key: self.local_api_key.expose_secret().to_string(),
            admin_secret: match &self.admin_secret {
                AdminSecret::Plaintext(s) => AdminSecretDocument::Plaintext(s.expose_secret().to_string()),
                AdminSecret::Hashed(h) => AdminSecretDocument::Hashed(h.clone()),
            },
            schema_version: self.schema_version.clone(),
        }
    }

    pub(crate) fn from_document(doc: ConfigDocument) -> Result<Self> {
        Ok(Self {
            upstream_base_url: validate_https_url(&doc.upstream_base_url)?,
            upstream_api_key: SecretString::from(doc.upstream_api_key),
            default_model: doc.default_model,
            local_api_key: SecretString::from(doc.local_api_key),
            admin_secret: match doc.admin_secret {
                AdminSecretDocument::Plaintext(s) => AdminSecret::Plaintext(SecretString::from(s)),
                AdminSecretDocument::Hashed(h) => AdminSecret::Hashed(h),
            },
            schema_version: doc.schema_version,
        })
    }
}

/// Plain, fully (de)serializable mirror of [`Configuration`] used only for the on-disk
/// JSON document. Kept separate so secrets never derive `Serialize` directly off the
/// in-memory [`Configuration`] type, the way `secrecy::SecretString` intentionally omits
/// `Serialize` to avoid accidental logging or leakage through unrelated codepaths.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ConfigDocument {
    pub upstream_base_url: String,
    pub upstream_api_key: String,
    pub default_model: String,
    pub local_api_key: String,
    pub admin_secret: AdminSecretDocument,
    pub schema_version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) enum AdminSecretDocument {
    Plaintext(String),
    Hashed(String),
}

fn validate_https_url(raw: &str) -> Result<url::Url> {
    let url = url::Url::parse(raw).map_err(|e| ConfigError::Validation(format!("invalid upstream URL: {e}")))?;

    if url.scheme() != "https" {
        return Err(ConfigError::Validation(
            "upstream base URL must use the https scheme".to_string(),
        ));
    }

    Ok(url)
}

/// Generate `len` random bytes and hex-encode them.
pub fn random_hex_token(len: usize) -> String {
    use rand::RngCore;

    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_https_upstream() {
        let err = Configuration::new(
            "http://example.com".to_string(),
            "key".to_string(),
            "gemini-2.0-flash".to_string(),
            random_hex_token(32),
            "bootstrap".to_string(),
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn plaintext_secret_matches_and_yields_upgrade_hash() {
        let secret = AdminSecret::Plaintext(SecretString::from("hunter2".to_string()));
        let (matched, hash) = secret.verify("hunter2");
        assert!(matched);
        assert!(hash.is_some());
        assert!(bcrypt::verify("hunter2", &hash.unwrap()).unwrap());
    }

    #[test]
    fn hashed_secret_verifies_without_upgrade() {
        let hash = bcrypt::hash("hunter2", 10).unwrap();
        let secret = AdminSecret::Hashed(hash);
        let (matched, upgrade) = secret.verify("hunter2");
        assert!(matched);
        assert!(upgrade.is_none());
    }

    #[test]
    fn round_trips_through_document() {
        let config = Configuration::new(
            "https://generativelanguage.googleapis.com/v1beta".to_string(),
            "upstream-secret".to_string(),
            "gemini-2.0-flash".to_string(),
            random_hex_token(32),
            "bootstrap".to_string(),
        )
        .unwrap();

        let doc = config.to_document();
        let restored = Configuration::from_document(doc).unwrap();
        assert_eq!(restored.default_model, config.default_model);
        assert_eq!(restored.upstream_base_url, config.upstream_base_url);
    }
}
