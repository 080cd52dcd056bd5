//! Validation of the XOR checksum trailing every *NMEA 0183* sentence.

/// Check the declared checksum of `sentence` against the computed one.
///
/// A sentence is well formed for checksum purposes only if it starts with
/// `$` and its last three bytes are `*HH` where `HH` are two hex digits.
/// The checksum is the XOR of every byte strictly between `$` and `*`.
/// Any other layout fails without a checksum being computed.
pub fn is_valid(sentence: &str) -> bool {
    let bytes = sentence.as_bytes();
    if bytes.first() != Some(&b'$') {
        return false;
    }
    let star = match sentence.rfind('*') {
        Some(i) if i + 3 == bytes.len() => i,
        _ => return false,
    };
    let declared = match u8::from_str_radix(&sentence[star + 1..], 16) {
        Ok(v) => v,
        Err(_) => return false,
    };
    declared == compute(&bytes[1..star])
}

/// XOR-fold `body`, the bytes between `$` and `*`.
fn compute(body: &[u8]) -> u8 {
    body.iter().fold(0, |acc, &b| acc ^ b)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "$GPRMC,040302.663,A,3939.7,N,10506.6,W,0.27,358.86,200804,,*1F";

    #[test]
    fn accepts_matching_checksum() {
        assert!(is_valid(GOOD));
    }

    #[test]
    fn rejects_tampered_body_byte() {
        // Flip the status field from A to V without fixing the checksum.
        let tampered = GOOD.replace(",A,", ",V,");
        assert!(!is_valid(&tampered));
    }

    #[test]
    fn rejects_tampered_checksum_digit() {
        let tampered = GOOD.replace("*1F", "*1E");
        assert!(!is_valid(&tampered));
    }

    #[test]
    fn rejects_missing_dollar() {
        assert!(!is_valid(&GOOD[1..]));
    }

    #[test]
    fn rejects_mispositioned_star() {
        assert!(!is_valid("$GPRMC,foo*4"));
        assert!(!is_valid("$GPRMC,foo*412"));
        assert!(!is_valid("$GPRMC,foo"));
    }

    #[test]
    fn rejects_non_hex_declaration() {
        assert!(!is_valid("$GPRMC,foo*GG"));
    }

    #[test]
    fn rejects_empty_and_tiny_input() {
        assert!(!is_valid(""));
        assert!(!is_valid("$"));
        assert!(!is_valid("$*0"));
    }

    #[test]
    fn body_between_sentinels_is_folded() {
        // XOR of "A" is 0x41.
        assert!(is_valid("$A*41"));
        // Empty body folds to zero.
        assert!(is_valid("$*00"));
    }
}
