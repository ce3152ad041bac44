//! Access-code generation and validation.
//!
//! Two secrets gate a booking: the verification code (front-desk
//! check-in) and the unlock code (PIN entered at the door lock).
//! Both are drawn from the OS random source; an RNG failure is an
//! error, never a degraded fallback.

use rand::rngs::OsRng;
use rand::RngCore;

use super::error::{DomainError, DomainResult};

/// Verification code prefix
const VERIFICATION_PREFIX: char = 'V';

/// Path prefix of the staff-facing scan URL. Wire contract with the
/// QR scanner clients; changing it breaks deployed scanners.
const VERIFY_PATH: &str = "/hotel/verify";

fn rng_err(e: rand::Error) -> DomainError {
    DomainError::CodeGeneration(format!("OS RNG unavailable: {}", e))
}

/// Generate a front-desk verification code: `V` followed by 19 hex
/// characters (10 random bytes, hex-encoded, truncated).
pub fn generate_verification_code() -> DomainResult<String> {
    let mut bytes = [0u8; 10];
    OsRng.try_fill_bytes(&mut bytes).map_err(rng_err)?;

    let hex = hex::encode(bytes);
    Ok(format!("{}{}", VERIFICATION_PREFIX, &hex[..19]))
}

/// Generate a 6-digit unlock PIN, zero-padded.
///
/// The code space is only one million values, so uniqueness is not
/// global; callers must scope collision checks to the target device.
pub fn generate_unlock_code() -> DomainResult<String> {
    let mut bytes = [0u8; 4];
    OsRng.try_fill_bytes(&mut bytes).map_err(rng_err)?;

    let n = u32::from_be_bytes(bytes) % 1_000_000;
    Ok(format!("{:06}", n))
}

/// Generate a human-facing booking number: `R` + UTC timestamp + 6
/// random digits.
pub fn generate_booking_no() -> DomainResult<String> {
    let mut bytes = [0u8; 4];
    OsRng.try_fill_bytes(&mut bytes).map_err(rng_err)?;

    let suffix = u32::from_be_bytes(bytes) % 1_000_000;
    let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
    Ok(format!("R{}{:06}", stamp, suffix))
}

/// An unlock code is exactly 6 ASCII digits.
pub fn validate_unlock_code(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

/// A verification code is 10-20 characters, each a digit, a hex letter
/// (a-f/A-F) or the literal `V`.
///
/// Deliberately does not require a leading `V`; existing scanner
/// integrations rely on this permissiveness.
pub fn validate_verification_code(code: &str) -> bool {
    (10..=20).contains(&code.len())
        && code
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c) || ('A'..='F').contains(&c) || c == 'V')
}

/// Build the staff-facing scan URL for a booking. Deterministic and
/// reconstructable from the two inputs alone.
pub fn qr_code_url(booking_no: &str, verification_code: &str) -> String {
    format!("{}/{}?code={}", VERIFY_PATH, booking_no, verification_code)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_code_shape() {
        let code = generate_verification_code().unwrap();
        assert_eq!(code.len(), 20);
        assert!(code.starts_with('V'));
        assert!(code[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_verification_code_validates() {
        for _ in 0..50 {
            let code = generate_verification_code().unwrap();
            assert!(validate_verification_code(&code), "rejected: {}", code);
        }
    }

    #[test]
    fn generated_unlock_code_validates() {
        for _ in 0..50 {
            let code = generate_unlock_code().unwrap();
            assert!(validate_unlock_code(&code), "rejected: {}", code);
        }
    }

    #[test]
    fn unlock_code_vectors() {
        assert!(validate_unlock_code("123456"));
        assert!(validate_unlock_code("000000"));
        assert!(!validate_unlock_code("12345"));
        assert!(!validate_unlock_code("1234567"));
        assert!(!validate_unlock_code("12345a"));
        assert!(!validate_unlock_code(""));
    }

    #[test]
    fn verification_code_accepts_no_leading_v() {
        // Permissive contract: any 10-20 char hex/V string passes.
        assert!(validate_verification_code("abcdef1234"));
        assert!(validate_verification_code("1234567890ABCDEF"));
        assert!(validate_verification_code("VVVVVVVVVV"));
    }

    #[test]
    fn verification_code_rejects_bad_input() {
        assert!(!validate_verification_code(""));
        assert!(!validate_verification_code("V12345678")); // 9 chars
        assert!(!validate_verification_code("V123456789012345678901")); // 22 chars
        assert!(!validate_verification_code("V12345678g")); // 'g' not hex
        assert!(!validate_verification_code("V123 45678"));
    }

    #[test]
    fn qr_url_is_deterministic() {
        let url = qr_code_url("R20250301120000123456", "Vabc123def456abc123d");
        assert_eq!(
            url,
            "/hotel/verify/R20250301120000123456?code=Vabc123def456abc123d"
        );
    }

    #[test]
    fn booking_no_shape() {
        let no = generate_booking_no().unwrap();
        assert!(no.starts_with('R'));
        assert_eq!(no.len(), 21);
        assert!(no[1..].chars().all(|c| c.is_ascii_digit()));
    }
}
