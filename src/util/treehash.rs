use sha2::{Digest, Sha256};

const CHUNK_SIZE: usize = 1024 * 1024;

/// SHA-256 tree hash over 1 MiB leaves, hex encoded.
pub fn tree_hash(data: &[u8]) -> String {
    if data.is_empty() {
        return hex::encode(Sha256::digest(data));
    }

    let mut level: Vec<[u8; 32]> = data
        .chunks(CHUNK_SIZE)
        .map(|chunk| digest_bytes(Sha256::digest(chunk).as_slice()))
        .collect();

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                if pair.len() == 1 {
                    return pair[0];
                }

                let mut hasher = Sha256::new();
                hasher.update(pair[0]);
                hasher.update(pair[1]);
                digest_bytes(hasher.finalize().as_slice())
            })
            .collect();
    }

    hex::encode(level[0])
}

fn digest_bytes(digest: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(digest);
    out
}
