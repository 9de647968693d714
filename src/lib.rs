//! Exhaustive brute-force recovery of a password from its digest.
//!
//! Every string over a [`Charset`] up to a maximum length is enumerated in a
//! fixed order (see [`Keyspace`]), hashed, and compared with the target. The
//! first candidate in that order whose digest matches is returned.

pub mod charset;
pub mod digest;
pub mod error;
pub mod keyspace;
pub mod progress;
pub mod search;

pub use charset::{Charset, DEFAULT_CHARSET};
pub use digest::{Algorithm, Digest, Digester, MAX_DIGEST_LEN};
pub use error::{CrackError, Result};
pub use keyspace::{Candidates, Keyspace, Partition};
pub use progress::{NoProgress, Progress};
pub use search::{search, CancelToken, Cracker, Outcome, SearchReport};

// How many candidates does one parallel work unit cover?
pub const BATCH_SIZE: u64 = 65536;
// Workers flush progress and look for cancellation this often.
pub const CHECK_INTERVAL: u64 = 4096;

pub const DEFAULT_MAX_LENGTH: usize = 6;
// Longest candidate a keyspace may hold.
pub const MAX_LENGTH: usize = 64;
