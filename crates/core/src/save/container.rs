//! Output container framing: one version byte, then a Snappy-compressed
//! payload (`spec.md` §4.6, §6 "Output container").

use super::SaveError;

/// The format version this writer emits.
pub const FORMAT_VERSION: u8 = 6;

/// Wrap an already-encoded payload in the container: version byte
/// followed by its Snappy-compressed bytes.
pub fn compress(payload: &[u8]) -> Result<Vec<u8>, SaveError> {
    let mut encoder = snap::raw::Encoder::new();
    let compressed = encoder
        .compress_vec(payload)
        .map_err(|e| SaveError::Compression(e.to_string()))?;
    let mut out = Vec::with_capacity(1 + compressed.len());
    out.push(FORMAT_VERSION);
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Inverse of [`compress`]: split off the version byte and decompress
/// the rest. Used to verify the round-trip law in `spec.md` §8.
pub fn decompress(container: &[u8]) -> Result<(u8, Vec<u8>), SaveError> {
    let (&version, compressed) = container
        .split_first()
        .ok_or_else(|| SaveError::Compression("container is empty".to_string()))?;
    let mut decoder = snap::raw::Decoder::new();
    let payload = decoder
        .decompress_vec(compressed)
        .map_err(|e| SaveError::Compression(e.to_string()))?;
    Ok((version, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_payload() {
        let payload = b"some payload bytes, not all of them compressible \x00\x00\x00".to_vec();
        let container = compress(&payload).unwrap();
        assert_eq!(container[0], FORMAT_VERSION);
        let (version, decompressed) = decompress(&container).unwrap();
        assert_eq!(version, FORMAT_VERSION);
        assert_eq!(decompressed, payload);
    }

    #[test]
    fn empty_container_is_rejected() {
        assert!(decompress(&[]).is_err());
    }
}
