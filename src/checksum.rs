/// Internet checksum (RFC 1071) over `bytes`.
///
/// Words are read in network byte order, a trailing odd byte is padded as the
/// high byte of a final word. Write the result back with `to_be_bytes`.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u16 {
    let mut chunks = bytes.chunks_exact(2);
    let mut sum: u64 = chunks.by_ref().map(|word| u64::from(u16::from_be_bytes([word[0], word[1]]))).sum();
    if let [last] = chunks.remainder() {
        sum += u64::from(*last) << 8;
    }
    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    // the loop leaves at most 16 significant bits
    #[allow(clippy::cast_possible_truncation)]
    let folded = sum as u16;
    !folded
}
