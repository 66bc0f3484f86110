//! bcrypt password hashes (`$2b$<cost>$<salt+digest>`).

use crate::errors::{AppError, AppResult};

const COST: u32 = 10;

pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, COST)
        .map_err(|e| AppError::Other(format!("password hashing failed: {e}")))
}

/// False for a wrong password and for anything that is not a bcrypt hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_only_the_hashed_password() {
        let h = hash_password("Secret123").unwrap();
        assert!(h.starts_with("$2b$10$"));
        assert!(verify_password("Secret123", &h));
        assert!(!verify_password("Secret124", &h));
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(
            hash_password("Secret123").unwrap(),
            hash_password("Secret123").unwrap()
        );
    }

    #[test]
    fn hashes_from_other_bcrypt_implementations_verify() {
        // OpenBSD reference vector
        let stored = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";
        assert!(verify_password("U*U", stored));
        assert!(!verify_password("U*V", stored));
    }

    #[test]
    fn malformed_hashes_never_verify() {
        let samples = [
            "",
            "plain",
            "$2b$10$short",
            "sha256$1$00$00",
            "$9z$10$abcdefghijklmnopqrstuu",
        ];
        for bad in samples {
            assert!(!verify_password("pw", bad), "{bad}");
        }
    }
}
