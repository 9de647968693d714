use rustbrute::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

fn keyspace(chars: &str, max_length: usize) -> Keyspace {
    Keyspace::new(Charset::new(chars).unwrap(), max_length).unwrap()
}

/// Digest is the number of times `needle` occurs in the candidate, so many
/// candidates collide.
struct CountDigest {
    needle: char,
}

impl Digester for CountDigest {
    fn output_len(&self) -> usize {
        1
    }

    fn digest(&self, input: &[u8]) -> Result<Digest> {
        let text = std::str::from_utf8(input).unwrap();
        let count = text.chars().filter(|&c| c == self.needle).count();
        Digest::from_slice(&[count as u8])
    }
}

/// Fails on one specific candidate.
struct FailingDigest {
    poison: &'static str,
}

impl Digester for FailingDigest {
    fn output_len(&self) -> usize {
        Algorithm::Md5.digest_len()
    }

    fn digest(&self, input: &[u8]) -> Result<Digest> {
        if input == self.poison.as_bytes() {
            return Err(CrackError::Digest(format!("cannot hash {}", self.poison)));
        }
        Ok(Algorithm::Md5.compute(input))
    }
}

#[derive(Default)]
struct CountingProgress {
    total: AtomicU64,
    processed: AtomicU64,
}

impl Progress for CountingProgress {
    fn start(&self, total: u64) {
        self.total.store(total, Ordering::SeqCst);
    }

    fn advance(&self, processed: u64) {
        self.processed.fetch_add(processed, Ordering::SeqCst);
    }
}

/// Cancels the search the first time any work is reported.
struct CancelOnProgress {
    token: CancelToken,
}

impl Progress for CancelOnProgress {
    fn advance(&self, processed: u64) {
        if processed > 0 {
            self.token.cancel();
        }
    }
}

#[test]
fn test_verify_known_hashes() {
    let test_cases = vec![
        ("password", "5f4dcc3b5aa765d61d8327deb882cf99"),
        ("hello", "5d41402abc4b2a76b9719d911017c592"),
        ("123456", "e10adc3949ba59abbe56e057f20f883e"),
        ("test", "098f6bcd4621d373cade4e832627b4f6"),
        ("admin", "21232f297a57a5a743894a0e4a801fc3"),
    ];

    for (password, expected_hash) in test_cases {
        let computed = Algorithm::Md5.hex_digest(password);
        assert_eq!(computed, expected_hash, "MD5 mismatch for '{password}'");
    }

    assert_eq!(
        Algorithm::Sha512.hex_digest("abc"),
        "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
         2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
    );
}

#[test]
fn test_scenario_a_two_char_charset() {
    let target = Algorithm::Sha256.compute(b"ba");
    let report = search(&target, 2, "ab", Algorithm::Sha256).unwrap();

    assert_eq!(
        report.outcome,
        Outcome::Found {
            candidate: "ba".to_string(),
            index: 4
        }
    );
    assert_eq!(report.processed, 5);
    assert_eq!(report.total, 6);
}

#[test]
fn test_scenario_b_last_candidate() {
    let target = Digest::from_hex(&Algorithm::Sha256.hex_digest("9999")).unwrap();
    let report = search(&target, 4, "0123456789", Algorithm::Sha256).unwrap();

    assert_eq!(report.found(), Some("9999"));
    assert_eq!(report.processed, 11110);
    assert_eq!(report.total, 11110);
}

#[test]
fn test_scenario_c_unreachable() {
    let target = Algorithm::Sha256.compute(b"not-reachable-digest");
    let progress = CountingProgress::default();
    let report = Cracker::new(Algorithm::Sha256, keyspace("xyz", 3))
        .crack_with(&target, &progress, &CancelToken::new())
        .unwrap();

    assert_eq!(report.outcome, Outcome::NotFound);
    assert!(report.elapsed > Duration::ZERO);
    assert_eq!(report.processed, 39);
    assert_eq!(report.total, 39);
    assert_eq!(progress.total.load(Ordering::SeqCst), 39);
    assert_eq!(progress.processed.load(Ordering::SeqCst), 39);
}

#[test]
fn test_zero_max_length_is_invalid_input() {
    let target = Algorithm::Sha256.compute(b"a");
    let err = search(&target, 0, "abc", Algorithm::Sha256).unwrap_err();
    assert!(matches!(err, CrackError::InvalidInput(_)));
}

#[test]
fn test_empty_and_duplicate_charset_are_invalid_input() {
    let target = Algorithm::Sha256.compute(b"a");
    assert!(matches!(
        search(&target, 3, "", Algorithm::Sha256),
        Err(CrackError::InvalidInput(_))
    ));
    assert!(matches!(
        search(&target, 3, "aba", Algorithm::Sha256),
        Err(CrackError::InvalidInput(_))
    ));
}

#[test]
fn test_enumeration_has_no_duplicates_or_omissions() {
    for (chars, max_length) in [("a", 5), ("ab", 4), ("xyz", 3), ("0123456789", 3)] {
        let ks = keyspace(chars, max_length);
        let n = chars.chars().count() as u64;
        let expected: u64 = (1..=max_length as u32).map(|l| n.pow(l)).sum();

        let all: Vec<String> = ks.iter().collect();
        let distinct: HashSet<&String> = all.iter().collect();

        assert_eq!(ks.total(), expected, "{chars}/{max_length}");
        assert_eq!(all.len() as u64, expected, "{chars}/{max_length}");
        assert_eq!(distinct.len(), all.len(), "{chars}/{max_length}");
        assert!(all
            .iter()
            .all(|c| c.chars().all(|ch| chars.contains(ch))));
    }
}

#[test]
fn test_enumeration_is_deterministic() {
    let ks = keyspace("qwe", 4);
    let first: Vec<String> = ks.iter().collect();
    let second: Vec<String> = ks.iter().collect();
    assert_eq!(first, second);
}

#[test]
fn test_shorter_candidates_come_first() {
    let ks = keyspace("abcd", 4);
    let lengths: Vec<usize> = ks.iter().map(|c| c.len()).collect();
    assert!(lengths.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(lengths.first(), Some(&1));
    assert_eq!(lengths.last(), Some(&4));
}

#[test]
fn test_earliest_collision_wins() {
    // candidates with exactly two 'b's: "bb" (index 5) is the first of many
    let cracker = Cracker::new(CountDigest { needle: 'b' }, keyspace("ab", 3));
    let target = Digest::from_slice(&[2]).unwrap();
    let report = cracker.crack(&target).unwrap();

    assert_eq!(
        report.outcome,
        Outcome::Found {
            candidate: "bb".to_string(),
            index: 5
        }
    );
}

#[test]
fn test_earliest_collision_wins_in_parallel() {
    // Five '9's first occurs as "99999" at index 111109; thousands of
    // six-character candidates in later chunks collide too.
    let ks = keyspace("0123456789", 6);
    let target = Digest::from_slice(&[5]).unwrap();
    let expected = ks.index_of("99999").unwrap();

    let report = Cracker::new(CountDigest { needle: '9' }, ks)
        .with_threads(4)
        .crack(&target)
        .unwrap();

    assert_eq!(
        report.outcome,
        Outcome::Found {
            candidate: "99999".to_string(),
            index: expected
        }
    );
}

#[test]
fn test_parallel_matches_sequential() {
    let target = Algorithm::Md5.compute(b"31415");
    let sequential = Cracker::new(Algorithm::Md5, keyspace("0123456789", 5))
        .crack(&target)
        .unwrap();
    let parallel = Cracker::new(Algorithm::Md5, keyspace("0123456789", 5))
        .with_threads(4)
        .crack(&target)
        .unwrap();

    assert_eq!(sequential.found(), Some("31415"));
    assert_eq!(sequential.outcome, parallel.outcome);
}

#[test]
fn test_parallel_exhaustion_counts_everything() {
    let target = Algorithm::Md5.compute(b"not in here");
    let progress = CountingProgress::default();
    let report = Cracker::new(Algorithm::Md5, keyspace("0123456789", 5))
        .with_threads(3)
        .crack_with(&target, &progress, &CancelToken::new())
        .unwrap();

    assert_eq!(report.outcome, Outcome::NotFound);
    assert_eq!(report.processed, 111110);
    assert_eq!(progress.processed.load(Ordering::SeqCst), 111110);
}

#[test]
fn test_cancellation_is_prompt_and_distinct() {
    let token = CancelToken::new();
    let progress = CancelOnProgress {
        token: token.clone(),
    };
    let target = Algorithm::Md5.compute(b"unreachable!");
    let report = Cracker::new(Algorithm::Md5, keyspace("0123456789", 6))
        .crack_with(&target, &progress, &token)
        .unwrap();

    assert!(report.is_cancelled());
    assert_eq!(report.found(), None);
    assert_eq!(report.processed, CHECK_INTERVAL);
}

#[test]
fn test_cancellation_in_parallel() {
    let token = CancelToken::new();
    token.cancel();
    let target = Algorithm::Md5.compute(b"unreachable!");
    let report = Cracker::new(Algorithm::Md5, keyspace("0123456789", 6))
        .with_threads(4)
        .crack_with(&target, &NoProgress, &token)
        .unwrap();

    assert_eq!(report.outcome, Outcome::Cancelled);
    assert_eq!(report.processed, 0);
}

#[test]
fn test_cancellation_mid_run_in_parallel() {
    let token = CancelToken::new();
    let progress = CancelOnProgress {
        token: token.clone(),
    };
    let target = Algorithm::Md5.compute(b"unreachable!");
    let report = Cracker::new(Algorithm::Md5, keyspace("0123456789", 6))
        .with_threads(4)
        .crack_with(&target, &progress, &token)
        .unwrap();

    assert_eq!(report.outcome, Outcome::Cancelled);
    assert!(report.processed >= CHECK_INTERVAL);
    assert!(report.processed < report.total);
}

#[test]
fn test_observer_does_not_change_outcome() {
    let cases = [
        (Algorithm::Md5.compute(b"31415"), 1),
        (Algorithm::Md5.compute(b"31415"), 4),
        (Algorithm::Md5.compute(b"not in here"), 1),
        (Algorithm::Md5.compute(b"not in here"), 4),
    ];

    for (target, threads) in cases {
        let cracker = Cracker::new(Algorithm::Md5, keyspace("0123456789", 5)).with_threads(threads);
        let observed = cracker
            .crack_with(&target, &CountingProgress::default(), &CancelToken::new())
            .unwrap();
        let silent = cracker
            .crack_with(&target, &NoProgress, &CancelToken::new())
            .unwrap();

        assert_eq!(observed.outcome, silent.outcome, "{threads} thread(s)");
        assert_eq!(observed.total, silent.total);
        if threads == 1 || silent.outcome == Outcome::NotFound {
            assert_eq!(observed.processed, silent.processed, "{threads} thread(s)");
        }
    }
}

#[test]
fn test_digest_error_aborts_search() {
    let target = Algorithm::Md5.compute(b"bbb");
    let err = Cracker::new(FailingDigest { poison: "ab" }, keyspace("ab", 3))
        .crack(&target)
        .unwrap_err();
    assert!(matches!(err, CrackError::Digest(_)));
}

#[test]
fn test_digest_error_aborts_parallel_search() {
    let target = Algorithm::Md5.compute(b"unreachable!");
    let err = Cracker::new(FailingDigest { poison: "5000" }, keyspace("0123456789", 5))
        .with_threads(4)
        .crack(&target)
        .unwrap_err();
    assert!(matches!(err, CrackError::Digest(_)));
}

#[test]
fn test_match_before_error_still_found() {
    // "b" (index 1) matches before the poisoned "ab" is reached
    let target = Algorithm::Md5.compute(b"b");
    let report = Cracker::new(FailingDigest { poison: "ab" }, keyspace("ab", 3))
        .crack(&target)
        .unwrap();
    assert_eq!(report.found(), Some("b"));
}

#[test]
fn test_crack_range_limits_search() {
    let cracker = Cracker::new(Algorithm::Sha256, keyspace("ab", 2));
    let target = Algorithm::Sha256.compute(b"ba");

    let before = cracker
        .crack_range(&target, 0..4, &NoProgress, &CancelToken::new())
        .unwrap();
    assert_eq!(before.outcome, Outcome::NotFound);
    assert_eq!(before.processed, 4);

    let within = cracker
        .crack_range(&target, 4..6, &NoProgress, &CancelToken::new())
        .unwrap();
    assert_eq!(within.found(), Some("ba"));
    assert_eq!(within.total, 2);
}

#[test]
fn test_multibyte_charset() {
    let target = Algorithm::Sha256.compute("bä".as_bytes());
    let report = search(&target, 2, "äb", Algorithm::Sha256).unwrap();
    assert_eq!(report.found(), Some("bä"));
}

#[test]
fn test_uppercase_target_hex() {
    let hex = Algorithm::Md5.hex_digest("zz").to_uppercase();
    let target = Digest::from_hex(&hex).unwrap();
    let report = search(&target, 2, "xyz", Algorithm::Md5).unwrap();
    assert_eq!(report.found(), Some("zz"));
}

#[test]
fn test_partition_pieces_cover_keyspace_in_order() {
    let ks = keyspace("abc", 4);
    let partition = ks.partition(7);
    let stitched: Vec<String> = partition.iter().flat_map(|r| ks.range(r)).collect();
    let full: Vec<String> = ks.iter().collect();
    assert_eq!(stitched, full);
}
