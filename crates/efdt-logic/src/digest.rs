//! Non-cryptographic 32-bit string digest.
//!
//! One accumulate-and-wrap primitive backs two unrelated uses: deriving the
//! generator seed from a city name, and fingerprinting audit entries. Neither
//! use is collision resistant. They are kept as separate named functions so
//! either can be replaced without touching the other.

/// Accumulate `h = h * 31 + c` over the UTF-16 code units of `s`, wrapping
/// at 32 bits.
///
/// Code units rather than chars so that values match across platforms that
/// hash UTF-16 strings.
pub fn string_digest(s: &str) -> i32 {
    s.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32)
    })
}

/// Generator seed for a city name: the absolute value of its digest.
///
/// `i32::MIN` has no positive counterpart in `i32`, so the magnitude is
/// returned as `u32`.
pub fn seed_for(name: &str) -> u32 {
    string_digest(name).unsigned_abs()
}

/// Audit-chain fingerprint of a serialized entry, as lowercase hex.
pub fn chain_digest(serialized: &str) -> String {
    format!("{:x}", string_digest(serialized).unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string_is_zero() {
        assert_eq!(string_digest(""), 0);
        assert_eq!(seed_for(""), 0);
        assert_eq!(chain_digest(""), "0");
    }

    #[test]
    fn test_matches_polynomial_for_short_input() {
        // "ab" = 97 * 31 + 98
        assert_eq!(string_digest("ab"), 97 * 31 + 98);
        assert_eq!(string_digest("a"), 97);
    }

    #[test]
    fn test_wraps_at_32_bits() {
        // Long enough to overflow many times; must not panic and must
        // match an i64 reference reduced mod 2^32.
        let s = "Visakhapatnam Visakhapatnam Visakhapatnam";
        let mut reference: i64 = 0;
        for unit in s.encode_utf16() {
            reference = (reference * 31 + unit as i64) & 0xffff_ffff;
        }
        assert_eq!(string_digest(s) as u32 as i64, reference);
    }

    #[test]
    fn test_known_city_seeds() {
        // "Pune" = ((80*31 + 117)*31 + 110)*31 + 101
        assert_eq!(seed_for("Pune"), 2_499_228);
        assert_eq!(seed_for("Delhi"), 65_915_436);
        // Mumbai's digest is negative after wrapping
        assert_eq!(string_digest("Mumbai"), -1_979_126_203);
        assert_eq!(seed_for("Mumbai"), 1_979_126_203);
    }

    #[test]
    fn test_seed_is_absolute_value() {
        for name in ["Mumbai", "Delhi", "Visakhapatnam", "Ghaziabad"] {
            let d = string_digest(name);
            assert_eq!(seed_for(name) as i64, (d as i64).abs());
        }
    }

    #[test]
    fn test_chain_digest_is_hex_of_magnitude() {
        let d = string_digest("{\"index\":1}");
        assert_eq!(
            chain_digest("{\"index\":1}"),
            format!("{:x}", (d as i64).unsigned_abs())
        );
    }

    #[test]
    fn test_non_ascii_uses_utf16_units() {
        // '₹' is U+20B9, a single UTF-16 unit
        assert_eq!(string_digest("₹"), 0x20B9);
        // U+1F600 is a surrogate pair
        let expected = 0xD83Di32.wrapping_mul(31).wrapping_add(0xDE00);
        assert_eq!(string_digest("😀"), expected);
    }
}
