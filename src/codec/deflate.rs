//! DEFLATE codec, used at best-compression level per §4.1.

use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

/// Compresses `raw` with DEFLATE at level 9 (best compression).
///
/// Returns `None` if compression fails for any reason — a failed
/// compressor is simply "unavailable" to the selector (§4.1), never a hard
/// error.
pub fn compress(raw: &[u8]) -> Option<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(9));
    if encoder.write_all(raw).is_err() {
        return None;
    }
    encoder.finish().ok()
}

/// Decompresses a DEFLATE blob produced by [`compress`].
pub fn decompress(blob: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(blob);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let data = b"Hello, World! This is a test of Deflate compression. \
                     Hello, World! This is a test of Deflate compression.";
        let compressed = compress(data).unwrap();
        assert!(compressed.len() < data.len());
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
