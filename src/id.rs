//! License identifier generation.
//!
//! The license id doubles as the activation link, so it must be unguessable.
//! Ids are UUID v4 (122 random bits from the OS CSPRNG) with an `lk_` prefix.
//!
//! Format: `lk_{uuid_simple}` (32 hex chars, no hyphens)

use uuid::Uuid;

pub const LICENSE_ID_PREFIX: &str = "lk_";

const HEX_LEN: usize = 32;

/// Generates a new license id.
pub fn gen_license_id() -> String {
    format!("{}{}", LICENSE_ID_PREFIX, Uuid::new_v4().as_simple())
}

/// Validate that a string looks like a license id.
///
/// This is a cheap check to reject garbage before hitting the store.
pub fn is_valid_license_id(s: &str) -> bool {
    let Some(hex_part) = s.strip_prefix(LICENSE_ID_PREFIX) else {
        return false;
    };

    hex_part.len() == HEX_LEN
        && hex_part
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}
