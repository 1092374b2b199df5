use crate::error::WalletError;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use zeroize::Zeroizing;

/// Hex private key of the operating account, wiped from memory on drop.
pub struct SignerKey(Zeroizing<String>);

impl SignerKey {
    /// `0x`-prefixed, lowercase, 64 hex chars.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SignerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SignerKey").field(&"***REDACTED***").finish()
    }
}

/// Loads the signer key from an environment variable, falling back to the
/// first non-comment line of a key file.
#[derive(Debug, Clone)]
pub struct KeyLoader {
    env_var: String,
    key_file: PathBuf,
}

impl Default for KeyLoader {
    fn default() -> Self {
        Self {
            env_var: Self::DEFAULT_ENV_VAR.to_string(),
            key_file: PathBuf::from(Self::PV_FILE),
        }
    }
}

impl KeyLoader {
    pub const DEFAULT_ENV_VAR: &'static str = "PRIVATE_KEY";
    pub const PV_FILE: &'static str = "pv.txt";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_env_var(mut self, env_var: &str) -> Self {
        self.env_var = env_var.to_string();
        self
    }

    pub fn with_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_file = path.into();
        self
    }

    pub fn load(&self) -> Result<SignerKey, WalletError> {
        if let Ok(raw) = std::env::var(&self.env_var) {
            let raw = Zeroizing::new(raw);
            if !raw.trim().is_empty() {
                debug!("Loading signer key from ${}", self.env_var);
                return normalize_private_key(&raw);
            }
        }

        if self.key_file.exists() {
            debug!("Loading signer key from {:?}", self.key_file);
            let content = Zeroizing::new(fs::read_to_string(&self.key_file).map_err(|e| {
                WalletError::KeyFileUnreadable {
                    file: self.key_file.display().to_string(),
                    msg: e.to_string(),
                }
            })?);
            if let Some(line) = content
                .lines()
                .map(str::trim)
                .find(|l| !l.is_empty() && !l.starts_with('#'))
            {
                return normalize_private_key(line);
            }
        }

        Err(WalletError::MissingKey {
            env_var: self.env_var.clone(),
            file: self.key_file.display().to_string(),
        })
    }
}

/// Validates a raw hex key and returns it as `0x` + 64 lowercase hex chars.
pub fn normalize_private_key(raw: &str) -> Result<SignerKey, WalletError> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if body.len() != 64 {
        return Err(WalletError::InvalidKeyLength { length: body.len() });
    }

    let bytes = Zeroizing::new(hex::decode(body).map_err(|_| WalletError::InvalidKeyFormat)?);
    let mut normalized = Zeroizing::new(String::with_capacity(66));
    normalized.push_str("0x");
    normalized.push_str(&hex::encode(bytes.as_slice()));
    Ok(SignerKey(normalized))
}
