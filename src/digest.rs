use std::fmt;

use clap::ValueEnum;
use sha2::{Digest as _, Sha224, Sha256, Sha384, Sha512};

use crate::error::{CrackError, Result};

/// Largest digest any supported algorithm produces (SHA-512).
pub const MAX_DIGEST_LEN: usize = 64;

/// A fixed-size digest value, stored inline so the hot loop never allocates.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest {
    bytes: [u8; MAX_DIGEST_LEN],
    len: usize,
}

impl Digest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() || bytes.len() > MAX_DIGEST_LEN {
            return Err(CrackError::invalid(format!(
                "digest must be 1 to {MAX_DIGEST_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut buf = [0u8; MAX_DIGEST_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            bytes: buf,
            len: bytes.len(),
        })
    }

    /// Parse a hex-encoded digest. Upper and lower case hex are both accepted.
    pub fn from_hex(text: &str) -> Result<Self> {
        let bytes = hex::decode(text.trim())?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

/// Maps candidate bytes to a digest.
///
/// Implementations must be deterministic and free of side effects. The search
/// shares one digester across worker threads, hence the `Sync` bound.
pub trait Digester: Sync {
    /// Number of bytes every digest produced by `digest` has.
    fn output_len(&self) -> usize;

    fn digest(&self, input: &[u8]) -> Result<Digest>;

    fn name(&self) -> &str {
        "custom"
    }
}

/// Built-in hash algorithms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum Algorithm {
    #[value(name = "md5")]
    Md5,
    #[value(name = "sha224")]
    Sha224,
    #[default]
    #[value(name = "sha256")]
    Sha256,
    #[value(name = "sha384")]
    Sha384,
    #[value(name = "sha512")]
    Sha512,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Md5,
        Algorithm::Sha224,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha512,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Md5 => "md5",
            Algorithm::Sha224 => "sha224",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha384 => "sha384",
            Algorithm::Sha512 => "sha512",
        }
    }

    pub fn digest_len(&self) -> usize {
        match self {
            Algorithm::Md5 => 16,
            Algorithm::Sha224 => 28,
            Algorithm::Sha256 => 32,
            Algorithm::Sha384 => 48,
            Algorithm::Sha512 => 64,
        }
    }

    /// Hash `input` with this algorithm. Never fails.
    pub fn compute(&self, input: &[u8]) -> Digest {
        let mut bytes = [0u8; MAX_DIGEST_LEN];
        let len = self.digest_len();
        match self {
            Algorithm::Md5 => bytes[..len].copy_from_slice(&md5::compute(input).0),
            Algorithm::Sha224 => bytes[..len].copy_from_slice(&Sha224::digest(input)),
            Algorithm::Sha256 => bytes[..len].copy_from_slice(&Sha256::digest(input)),
            Algorithm::Sha384 => bytes[..len].copy_from_slice(&Sha384::digest(input)),
            Algorithm::Sha512 => bytes[..len].copy_from_slice(&Sha512::digest(input)),
        }
        Digest { bytes, len }
    }

    /// Hex digest of a string, the form targets are usually given in.
    pub fn hex_digest(&self, input: &str) -> String {
        self.compute(input.as_bytes()).to_hex()
    }
}

impl Digester for Algorithm {
    fn output_len(&self) -> usize {
        self.digest_len()
    }

    fn digest(&self, input: &[u8]) -> Result<Digest> {
        Ok(self.compute(input))
    }

    fn name(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
