// A lazily grown set of the primes, packed 30 integers to a byte.
//
// ```
// let mut s = primeset::Set::with_capacity(1_000_000);
// assert!(s.contains(999_983));
// assert!(!s.contains(999_985));
// ```
//
// 2, 3 and 5 are answered directly. Every other candidate must be coprime to
// 30, so only 8 residues mod 30 (the wheel slots) are stored, one bit each.

pub mod mark;
mod set;
pub mod wheel;


pub use set::{Set, CHUNK};
