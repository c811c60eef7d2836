//! Pluggable services the store calls out to: content fingerprints and
//! timestamp labels.

use sha2::{Digest, Sha256};

pub trait Fingerprinter {
    fn fingerprint(&self, content: &str) -> String;
}

pub trait Clock {
    fn now(&self) -> String;
}

/// Lowercase hex SHA-256 of the UTF-8 content.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Fingerprinter;

impl Fingerprinter for Sha256Fingerprinter {
    fn fingerprint(&self, content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Local wall-clock time, `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> String {
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_fingerprint() {
        let fp = Sha256Fingerprinter.fingerprint("");
        assert_eq!(
            fp,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(fp, Sha256Fingerprinter.fingerprint("a"));
    }

    #[test]
    fn test_local_clock_format() {
        let label = LocalClock.now();
        assert!(chrono::NaiveDateTime::parse_from_str(&label, "%Y-%m-%d %H:%M:%S").is_ok());
    }
}
