//! LZW-MSB codec, 8-bit literal width, per §3.3 and §4.1.

/// Minimum code size (literal width) the selector always uses: 8 bits,
/// matching every byte value being a valid literal.
const LITERAL_WIDTH: u8 = 8;

/// Compresses `raw` with LZW, MSB-first bit packing, 8-bit literal width.
///
/// Returns `None` if compression fails — treated by the selector as
/// "unavailable", never a hard error (§4.1).
pub fn compress(raw: &[u8]) -> Option<Vec<u8>> {
    let mut encoder = weezl::encode::Encoder::new(weezl::BitOrder::Msb, LITERAL_WIDTH);
    encoder.encode(raw).ok()
}

/// Decompresses an LZW-MSB blob produced by [`compress`].
pub fn decompress(blob: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = weezl::decode::Decoder::new(weezl::BitOrder::Msb, LITERAL_WIDTH);
    decoder
        .decode(blob)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let data = b"aaaaaaaaaaaaaaaabbbbbbbbbbbbbbbbccccccccccccccccdddddddddddddddd";
        let compressed = compress(data).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn empty_input_roundtrips() {
        let compressed = compress(b"").unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert!(decompressed.is_empty());
    }
}
