use sha1::{Digest, Sha1};
use std::io::Read;
use std::path::Path;

/// Hex-encoded SHA-1 digest of a file's contents.
pub fn file_sha1(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha1::new();
    let mut buf = [0u8; 8192];

    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Whether `path` exists and its SHA-1 digest equals `expected`.
pub fn sha1_matches(path: &Path, expected: &str) -> bool {
    match file_sha1(path) {
        Ok(computed) => computed.eq_ignore_ascii_case(expected),
        Err(_) => false,
    }
}
