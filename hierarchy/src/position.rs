//! Display coordinates.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A 2D display position on the 0..100 campus canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const CENTER: Point = Point { x: 50.0, y: 50.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Hash of a string that is identical across runs, platforms and builds.
///
/// The first eight bytes of the SHA-256 digest, read big-endian.
pub fn stable_hash(key: &str) -> u64 {
    let digest = Sha256::digest(key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_hash_is_deterministic() {
        assert_eq!(stable_hash("R1"), stable_hash("R1"));
        assert_ne!(stable_hash("R1"), stable_hash("R2"));
    }

    #[test]
    fn test_stable_hash_known_value() {
        // sha256("") = e3b0c44298fc1c14...
        assert_eq!(stable_hash(""), 0xe3b0_c442_98fc_1c14);
    }
}
