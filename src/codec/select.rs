//! Compression selector (§4.2): picks the most compact encoding of a file
//! among `{raw, deflate, lzw}`.

/// Tag selecting a save's blob encoding (§3.3). Also its on-disk byte
/// value, so `tag as u8` and `CompressionTag::try_from(byte)` round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CompressionTag {
    /// Stored verbatim.
    Uncompressed = b'U',
    /// Stored as a DEFLATE stream.
    Deflate = b'F',
    /// Stored as an LZW-MSB stream.
    Lzw = b'L',
}

impl CompressionTag {
    /// The on-disk byte for this tag.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Parses a byte into a tag; `None` for anything outside `{U,F,L}`
    /// (§7's `CorruptEntry`).
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'U' => Some(Self::Uncompressed),
            b'F' => Some(Self::Deflate),
            b'L' => Some(Self::Lzw),
            _ => None,
        }
    }
}

/// Chooses among `{U, F, L}` given the three candidate sizes, where `0`
/// means "unavailable" for `flate_size`/`lzw_size`.
///
/// Implements the rule in §4.2: prefer raw unless a compressor saves at
/// least 5%, breaking ties toward DEFLATE.
pub fn choose(raw_size: usize, flate_size: usize, lzw_size: usize) -> CompressionTag {
    let threshold = (raw_size as f64 * 0.95).floor() as usize;

    let both_unavailable = flate_size == 0 && lzw_size == 0;
    let both_too_big = flate_size > threshold && lzw_size > threshold;
    if both_unavailable || both_too_big {
        return CompressionTag::Uncompressed;
    }

    let flate_wins = flate_size > 0
        && flate_size < threshold
        && (lzw_size == 0 || flate_size < lzw_size);
    if flate_wins {
        return CompressionTag::Deflate;
    }

    if lzw_size > 0 && lzw_size < threshold {
        return CompressionTag::Lzw;
    }

    CompressionTag::Uncompressed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_table_from_spec() {
        assert_eq!(choose(1000, 997, 998), CompressionTag::Uncompressed);
        assert_eq!(choose(1000, 945, 998), CompressionTag::Deflate);
        assert_eq!(choose(1000, 998, 949), CompressionTag::Lzw);
        assert_eq!(choose(1000, 0, 990), CompressionTag::Uncompressed);
        assert_eq!(choose(1000, 990, 0), CompressionTag::Uncompressed);
        assert_eq!(choose(1000, 889, 0), CompressionTag::Deflate);
        assert_eq!(choose(1000, 0, 889), CompressionTag::Lzw);
    }

    #[test]
    fn byte_round_trip() {
        for tag in [
            CompressionTag::Uncompressed,
            CompressionTag::Deflate,
            CompressionTag::Lzw,
        ] {
            assert_eq!(CompressionTag::from_byte(tag.as_byte()), Some(tag));
        }
    }

    #[test]
    fn unknown_byte_is_none() {
        assert_eq!(CompressionTag::from_byte(b'X'), None);
    }

    proptest::proptest! {
        #[test]
        fn choice_never_exceeds_threshold_when_chosen(
            raw in 1usize..10_000,
            flate in 0usize..10_000,
            lzw in 0usize..10_000,
        ) {
            let threshold = (raw as f64 * 0.95).floor() as usize;
            let tag = choose(raw, flate, lzw);
            match tag {
                CompressionTag::Deflate => proptest::prop_assert!(flate > 0 && flate < threshold),
                CompressionTag::Lzw => proptest::prop_assert!(lzw > 0 && lzw < threshold),
                CompressionTag::Uncompressed => {}
            }
        }
    }
}
