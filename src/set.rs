use std::convert::TryFrom;
use std::fmt;

use tracing::{debug, trace};

use crate::mark;
use crate::wheel::{iteration_row, MASK30, SLOTS};

/// Number of integers sieved per growth step. The chunk's bytes are marked
/// with strided access, so it should fit in cache.
pub const CHUNK: u64 = 30 * (1 << 15);

const CHUNK_BYTES: usize = (CHUNK / 30) as usize;

/// A lazily computed set of all prime numbers.
///
/// Each byte of the sieve covers 30 consecutive integers, so answering
/// queries up to `n` costs about `n / 30` bytes. The sieve is extended one
/// chunk at a time as queries reach past it.
///
/// Queries take `&mut self` since they may grow the sieve; share a `Set`
/// across threads behind a lock.
pub struct Set {
    // Bit j of sieve[b] is set iff 30 * b + SLOTS[j] is prime.
    sieve: Vec<u8>,
}

impl Set {
    pub fn new() -> Self {
        Self { sieve: vec![] }
    }

    /// `max` is the largest value you expect to query. It only decides how
    /// much to reserve up front.
    pub fn with_capacity(max: u64) -> Self {
        let bytes = max.saturating_add(CHUNK) / 30;
        let bytes = usize::try_from(bytes).unwrap_or(usize::MAX);
        let mut sieve = Vec::new();
        if sieve.try_reserve(bytes).is_err() {
            // Too big to reserve up front; growth will allocate as it goes.
            trace!(max, bytes, "skipping sieve reservation");
        } else {
            trace!(max, bytes, "reserved sieve");
        }
        Self { sieve }
    }

    pub fn contains(&mut self, n: i64) -> bool {
        if n < 0 {
            return false;
        }
        if n == 2 || n == 3 || n == 5 {
            return true;
        }
        let n = n as u64;
        let b = usize::try_from(n / 30).unwrap_or(usize::MAX);
        while b >= self.sieve.len() {
            self.grow();
        }
        self.sieve[b] & MASK30[(n % 30) as usize] != 0
    }

    /// Number of sieve bytes computed so far. Never decreases.
    pub fn frontier(&self) -> usize {
        self.sieve.len()
    }

    /// The smallest value not yet covered by the sieve.
    pub fn bound(&self) -> u64 {
        self.sieve.len() as u64 * 30
    }

    fn grow(&mut self) {
        let start = self.bound();
        let end = start + CHUNK;
        self.sieve.resize(self.sieve.len() + CHUNK_BYTES, 0xff);
        if start == 0 {
            // 1 isn't prime, and nothing below would ever clear it.
            self.sieve[0] = 0xfe;
        }
        debug!(start, end, frontier = self.sieve.len(), "growing sieve");

        // Primes come out of this scan in increasing order, including ones
        // found earlier in this very chunk, so the first prime whose square
        // is past `end` ends the pass.
        for base in 0..self.sieve.len() {
            let mut bits = self.sieve[base];
            while bits != 0 {
                let slot = bits.trailing_zeros() as usize;
                bits &= bits - 1;

                let p = base as u64 * 30 + SLOTS[slot] as u64;
                let mut i = p * p;
                if i >= end {
                    return;
                }
                if i < start {
                    // First multiple of p at or after start.
                    i = (start + p - 1) / p * p;
                }

                let row = iteration_row((i % 30) as usize, slot);
                let mut starts = [0usize; 8];
                let mut masks = [0u8; 8];
                for (k, e) in row.iter().enumerate() {
                    starts[k] = ((i + e.multiple as u64 * p) / 30) as usize;
                    masks[k] = e.mask;
                }
                mark::clear_strided(&mut self.sieve, &starts, &masks, p as usize);
            }
        }
    }
}

impl Default for Set {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Set {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Set")
            .field("frontier", &self.sieve.len())
            .field("bound", &self.bound())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Set, CHUNK};

    fn is_prime(p: i64) -> bool {
        if p < 2 {
            return false;
        }
        let mut d = 2;
        while d * d <= p {
            if p % d == 0 {
                return false;
            }
            d += 1;
        }
        true
    }

    fn count_below(s: &mut Set, n: i64) -> usize {
        (0..n).filter(|&i| s.contains(i)).count()
    }

    const PI: &[(i64, usize)] = &[
        (10, 4),
        (100, 25),
        (1_000, 168),
        (10_000, 1_229),
        (100_000, 9_592),
        (1_000_000, 78_498),
        (10_000_000, 664_579),
        (100_000_000, 5_761_455),
    ];

    #[test]
    fn test_small_primes() {
        let mut s = Set::new();
        for p in -10..10_000 {
            assert_eq!(s.contains(p), is_prime(p), "prime({})", p);
        }
    }

    #[test]
    fn test_known_values() {
        let mut s = Set::default();
        assert!(!s.contains(-5));
        assert!(s.contains(2));
        assert!(s.contains(3));
        assert!(s.contains(5));
        assert!(!s.contains(0));
        assert!(!s.contains(1));
        assert!(!s.contains(4));
        assert!(!s.contains(49));
        assert!(s.contains(97));
        assert!(!s.contains(i64::MIN));
    }

    #[test]
    fn test_prime_counts() {
        let mut s = Set::new();
        for &(n, c) in PI {
            assert_eq!(count_below(&mut s, n), c, "pi({})", n);
        }
    }

    #[test]
    fn test_prime_counts_with_capacity() {
        let mut s = Set::with_capacity(100_000_000);
        for &(n, c) in PI.iter().rev() {
            assert_eq!(count_below(&mut s, n), c, "pi({})", n);
        }
    }

    #[test]
    fn test_oversized_hint() {
        let mut s = Set::with_capacity(u64::MAX);
        assert_eq!(s.frontier(), 0);
        assert!(s.contains(97));
        assert!(!s.contains(91));
    }

    #[test]
    #[ignore]
    fn test_prime_count_1e9() {
        let mut s = Set::with_capacity(1_000_000_000);
        assert_eq!(count_below(&mut s, 1_000_000_000), 50_847_534);
    }

    #[test]
    fn test_chunk_boundaries() {
        let mut s = Set::new();
        let edge = CHUNK as i64;
        for n in (edge - 200)..(edge + 200) {
            assert_eq!(s.contains(n), is_prime(n), "prime({})", n);
        }
        for n in (3 * edge - 200)..(3 * edge + 200) {
            assert_eq!(s.contains(n), is_prime(n), "prime({})", n);
        }
    }

    #[test]
    fn test_large_values() {
        let mut s = Set::new();
        // Largest prime below 10^8, and 7 * 13 * 769 * 1429 just after it.
        assert!(s.contains(99_999_989));
        assert!(!s.contains(99_999_991));
        // 9973^2.
        assert!(!s.contains(99_460_729));
    }

    #[test]
    fn test_growth_is_monotonic() {
        let mut s = Set::new();
        assert_eq!(s.frontier(), 0);
        assert_eq!(s.bound(), 0);

        // 2, 3 and 5 are answered without touching the sieve.
        assert!(s.contains(5));
        assert_eq!(s.frontier(), 0);

        s.contains(10 * CHUNK as i64 + 1);
        let frontier = s.frontier();
        assert_eq!(frontier, 11 * (CHUNK as usize / 30));
        assert!(s.bound() > 10 * CHUNK + 1);

        for n in (0..s.bound() as i64).step_by(9_973) {
            s.contains(n);
            assert_eq!(s.frontier(), frontier);
        }
        s.contains(s.bound() as i64 - 1);
        assert_eq!(s.frontier(), frontier);

        s.contains(s.bound() as i64);
        assert!(s.frontier() > frontier);
    }

    #[test]
    fn test_repeated_queries() {
        let mut s = Set::new();
        for _ in 0..3 {
            assert!(s.contains(1_000_003));
            assert!(!s.contains(1_000_001));
        }
        assert_eq!(count_below(&mut s, 10_000), 1_229);
    }

    #[test]
    fn test_debug() {
        let s = Set::new();
        assert_eq!(format!("{:?}", s), "Set { frontier: 0, bound: 0 }");
    }
}
