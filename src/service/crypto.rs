use sha3::{Digest, Sha3_256};

pub fn get_sha3_256_hash(data: &str) -> String {
    let mut hasher = Sha3_256::default();
    hasher.update(data.as_bytes());
    format!("{:X}", hasher.finalize())
}

pub fn verify(data: &str, hash: &str) -> bool {
    get_sha3_256_hash(data).eq_ignore_ascii_case(hash)
}
