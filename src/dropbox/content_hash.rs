use sha2::{Digest, Sha256};

/// Block size fixed by Dropbox's content-hash definition.
const BLOCK_SIZE: usize = 4 * 1024 * 1024;

/// Compute the Dropbox content hash of a byte buffer.
///
/// The input is split into 4 MiB blocks, each block is SHA-256 hashed, and
/// the concatenation of the block digests is SHA-256 hashed again. The
/// result is lowercase hex, directly comparable with the `content_hash`
/// field Dropbox returns in file metadata. An empty input has zero blocks,
/// so its hash is the SHA-256 of the empty string.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut overall = Sha256::new();
    for block in bytes.chunks(BLOCK_SIZE) {
        overall.update(Sha256::digest(block));
    }
    overall
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
