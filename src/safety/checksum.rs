//! SHA-256 checksums for backup verification.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Buffer size for reading files (8KB)
const BUFFER_SIZE: usize = 8192;

/// Hex-encoded SHA-256 of a file's contents
pub fn compute_file_checksum(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; BUFFER_SIZE];

    // Read and hash in chunks
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// True when both files hash identically
pub fn verify_copy(original: &Path, copy: &Path) -> io::Result<bool> {
    Ok(compute_file_checksum(original)? == compute_file_checksum(copy)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_known_digest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("abc.txt");
        fs::write(&path, "abc").unwrap();

        assert_eq!(
            compute_file_checksum(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_verify_copy() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        let c = dir.path().join("c.bin");
        fs::write(&a, vec![7u8; 20_000]).unwrap();
        fs::copy(&a, &b).unwrap();
        fs::write(&c, vec![8u8; 20_000]).unwrap();

        assert!(verify_copy(&a, &b).unwrap());
        assert!(!verify_copy(&a, &c).unwrap());
    }

    #[test]
    fn test_missing_file_errors() {
        assert!(compute_file_checksum(Path::new("/no/such/file")).is_err());
    }
}
