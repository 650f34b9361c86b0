//! Password reset codes.
//!
//! A reset code is a short, human-enterable secret mailed to the account
//! owner. Only its SHA-256 digest is stored; possession of the plaintext
//! code within the expiry window proves control of the mailbox.

use rand::distributions::Uniform;
use rand::Rng;
use sha2::Digest;
use sha2::Sha256;

const CODE_MIN: u32 = 100_000;
const CODE_MAX: u32 = 999_999;

/// A freshly generated reset code and its digest-at-rest.
///
/// The plaintext `code` goes into the email and is then dropped; only
/// `digest` is ever persisted.
#[derive(Debug, Clone)]
pub struct GeneratedCode {
    pub code: String,
    pub digest: String,
}

/// Generate a 6-digit reset code uniformly in [100000, 999999].
pub fn generate() -> GeneratedCode {
    let code = rand::thread_rng()
        .sample(Uniform::new_inclusive(CODE_MIN, CODE_MAX))
        .to_string();
    let digest = digest(&code);

    GeneratedCode { code, digest }
}

/// SHA-256 hex digest of a submitted code.
pub fn digest(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}
