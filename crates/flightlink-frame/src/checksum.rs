//! 16-bit additive checksum.

/// Checksum over a frame's kind, length and payload.
///
/// The header contributes `(kind + size) & 0xFF`; each payload byte in
/// `payload[offset..offset + size]` is added on top. Only the low 16 bits of
/// the running sum are kept. Panics if the range is out of bounds.
pub fn compute(kind: u8, size: u8, payload: &[u8], offset: usize) -> u16 {
    let header = (u16::from(kind) + u16::from(size)) & 0xFF;
    payload[offset..offset + usize::from(size)]
        .iter()
        .fold(header, |sum, &byte| sum.wrapping_add(u16::from(byte)))
}

/// Header-less checksum over the first `length` bytes of a buffer.
///
/// Bytes are widened as signed values, so `0x80..=0xFF` contribute negatively.
pub fn compute_bytes(bytes: &[u8], length: usize) -> u16 {
    bytes[..length]
        .iter()
        .fold(0u16, |sum, &byte| sum.wrapping_add(byte as i8 as u16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_only_checksum() {
        assert_eq!(compute(0x12, 0, &[], 0), 0x12);
        assert_eq!(compute(0x07, 0, &[0xAA, 0xBB], 2), 0x07);
    }

    #[test]
    fn header_sum_is_masked_to_a_byte() {
        // 0xF0 + 0x20 overflows a byte; only the low byte survives.
        let payload = vec![0u8; 0x20];
        assert_eq!(compute(0xF0, 0x20, &payload, 0), 0x10);
    }

    #[test]
    fn payload_bytes_are_added() {
        let payload = [0x01, 0x02, 0xFF];
        assert_eq!(compute(0x07, 3, &payload, 0), 0x07 + 3 + 1 + 2 + 0xFF);
    }

    #[test]
    fn offset_selects_payload_window() {
        let buf = [0xFF, 0xFF, 0x07, 0x02, 0x10, 0x20, 0x00, 0x00];
        assert_eq!(compute(0x07, 2, &buf, 4), 0x07 + 2 + 0x10 + 0x20);
    }

    #[test]
    fn single_byte_change_changes_checksum() {
        let payload: Vec<u8> = (0..64u8).collect();
        let base = compute(0x01, 64, &payload, 0);
        for idx in 0..payload.len() {
            let mut changed = payload.clone();
            changed[idx] = changed[idx].wrapping_add(1);
            assert_ne!(compute(0x01, 64, &changed, 0), base, "byte {idx}");
        }
    }

    #[test]
    fn full_payload_accumulates() {
        let payload = vec![0xFFu8; 127];
        let expected = (0x01u32 + 127 + 127 * 0xFF) as u16;
        assert_eq!(compute(0x01, 127, &payload, 0), expected);
    }

    #[test]
    fn raw_checksum_sign_extends() {
        assert_eq!(compute_bytes(&[0x01, 0x02], 2), 3);
        assert_eq!(compute_bytes(&[0xFF], 1), 0xFFFF);
        assert_eq!(compute_bytes(&[0x80, 0x80], 2), (-256i16) as u16);
        assert_eq!(compute_bytes(&[0x05, 0x06, 0x07], 2), 11);
    }
}
