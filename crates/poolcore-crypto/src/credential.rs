//! Password credential hashing: a salted SHA-256 scheme, with a fallback
//! path for accounts created before salting existed.
//!
//! The value stored as a user's password is itself already a SHA-256 digest
//! of their plaintext password, computed client-side and handed to us as
//! 64 lowercase hex characters. We never see the plaintext. Salting works
//! by decoding that hex digest back to its 32 raw bytes, appending the raw
//! bytes of a 16-byte per-user salt, and hashing the concatenation again.

use poolcore_core::PoolError;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

const PASSWORDHASH_HEX_LEN: usize = 64;
const SALT_BIN_LEN: usize = 16;
const SALT_HEX_LEN: usize = SALT_BIN_LEN * 2;

/// Generates a fresh 16-byte salt, rendered as 32 lowercase hex characters.
pub fn make_salt() -> String {
    let mut bytes = [0u8; SALT_BIN_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hashes a client-supplied password digest together with a user's salt,
/// returning the result as 64 lowercase hex characters.
///
/// `passwordhash` and `salt` are both expected in hex; either one being the
/// wrong length is an input error, not a reason to abort the process, since
/// it can be triggered by a malformed client message rather than a schema
/// mismatch.
pub fn password_hash(passwordhash: &str, salt: &str) -> Result<String, PoolError> {
    if passwordhash.len() != PASSWORDHASH_HEX_LEN {
        return Err(PoolError::BadCredentialLength {
            field: "passwordhash".to_string(),
            expected: PASSWORDHASH_HEX_LEN,
            got: passwordhash.len(),
        });
    }
    if salt.len() != SALT_HEX_LEN {
        return Err(PoolError::BadCredentialLength {
            field: "salt".to_string(),
            expected: SALT_HEX_LEN,
            got: salt.len(),
        });
    }

    let mut tohash = hex::decode(passwordhash)
        .map_err(|_| PoolError::BadCredentialLength {
            field: "passwordhash".to_string(),
            expected: PASSWORDHASH_HEX_LEN,
            got: passwordhash.len(),
        })?;
    let mut salt_bytes = hex::decode(salt).map_err(|_| PoolError::BadCredentialLength {
        field: "salt".to_string(),
        expected: SALT_HEX_LEN,
        got: salt.len(),
    })?;
    tohash.extend_from_slice(&salt_bytes);
    salt_bytes.zeroize();

    let digest = Sha256::digest(&tohash);
    tohash.zeroize();
    Ok(hex::encode(digest))
}

/// Checks a candidate password digest against a stored user record.
///
/// Accounts that predate salting carry an empty `salt` and compare the
/// candidate digest directly against the stored one; all others go through
/// [`password_hash`] first. Comparison is case-insensitive since hex
/// digests may have been stored in either case historically.
pub fn check_hash(
    stored_passwordhash: &str,
    salt: &str,
    candidate_passwordhash: &str,
) -> Result<bool, PoolError> {
    if salt.is_empty() {
        return Ok(stored_passwordhash.eq_ignore_ascii_case(candidate_passwordhash));
    }
    let hashed = password_hash(candidate_passwordhash, salt)?;
    Ok(hashed.eq_ignore_ascii_case(stored_passwordhash))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest_hex(s: &str) -> String {
        hex::encode(Sha256::digest(s.as_bytes()))
    }

    #[test]
    fn salt_is_32_lowercase_hex_chars() {
        let salt = make_salt();
        assert_eq!(salt.len(), SALT_HEX_LEN);
        assert!(salt.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn salted_round_trip_checks_out() {
        let salt = make_salt();
        let candidate = digest_hex("hunter2");
        let stored = password_hash(&candidate, &salt).unwrap();
        assert!(check_hash(&stored, &salt, &candidate).unwrap());
    }

    #[test]
    fn wrong_password_fails_salted_check() {
        let salt = make_salt();
        let stored = password_hash(&digest_hex("hunter2"), &salt).unwrap();
        assert!(!check_hash(&stored, &salt, &digest_hex("wrong")).unwrap());
    }

    #[test]
    fn legacy_unsalted_accounts_compare_directly() {
        let candidate = digest_hex("hunter2");
        assert!(check_hash(&candidate, "", &candidate).unwrap());
    }

    #[test]
    fn comparison_is_case_insensitive() {
        let salt = make_salt();
        let candidate = digest_hex("hunter2");
        let stored = password_hash(&candidate, &salt).unwrap().to_uppercase();
        assert!(check_hash(&stored, &salt, &candidate).unwrap());
    }

    #[test]
    fn malformed_passwordhash_length_is_rejected() {
        let err = password_hash("short", &make_salt()).unwrap_err();
        assert!(matches!(err, PoolError::BadCredentialLength { .. }));
    }
}
