//! Issuer key handling.
//!
//! Issuer keys are held only as salted SHA-256 digests and compared in
//! constant time.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hash a secret for logging or storage. Returns lowercase hex.
pub fn hash_secret(input: &str) -> String {
    hex::encode(digest(input))
}

/// The set of keys allowed to mint licenses. Cheaply cloneable.
#[derive(Clone, Default)]
pub struct IssuerKeys {
    digests: Vec<[u8; 32]>,
}

impl IssuerKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let digests = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .map(|k| digest(&k))
            .collect();
        Self { digests }
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    /// Check a presented key against every configured key.
    ///
    /// All digests are compared so the time taken does not depend on which
    /// key (if any) matched.
    pub fn verify(&self, presented: &str) -> bool {
        let presented = digest(presented);
        self.digests
            .iter()
            .fold(0u8, |matched, d| matched | d.ct_eq(&presented).unwrap_u8())
            == 1
    }
}

impl std::fmt::Debug for IssuerKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuerKeys")
            .field("count", &self.digests.len())
            .finish()
    }
}

fn digest(key: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"devicelock-v1:");
    hasher.update(key.as_bytes());
    hasher.finalize().into()
}
