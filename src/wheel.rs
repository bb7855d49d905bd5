use std::fmt;
use std::sync::LazyLock;

/// The residues mod 30 that are coprime to 2, 3 and 5. Slot `j` of a sieve
/// byte holds the candidate `30 * byte + SLOTS[j]`.
pub const SLOTS: [u8; 8] = [1, 7, 11, 13, 17, 19, 23, 29];

// MASK30[r] is the bit for residue r, or 0 if r isn't a slot.
pub const MASK30: [u8; 30] = [
    0, 1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 4, 0, 8, 0, 0, 0, 16, 0, 32, 0, 0, 0, 64, 0, 0, 0, 0, 0, 128,
];

pub fn slot_value(slot: usize) -> u8 {
    SLOTS[slot]
}

pub fn mask_for_residue(residue: usize) -> u8 {
    MASK30[residue]
}

/// One of the eight multiples of a prime `p` worth visiting when marking from
/// a start value `i`: the candidate `i + multiple * p` lands on a slot, and
/// `mask` clears that slot's bit.
///
/// Advancing by `30 * p` keeps a candidate on the same slot, so each entry
/// describes a stream of bytes spaced `p` apart.
#[derive(Clone, Copy, Default, Eq, PartialEq)]
pub struct IterEntry {
    pub multiple: u8,
    pub mask: u8,
}

impl fmt::Debug for IterEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{:08b}", self.multiple, self.mask)
    }
}

type IterTable = [[[IterEntry; 8]; 8]; 30];

static ITER_INFO: LazyLock<IterTable> = LazyLock::new(build_iter_info);

fn build_iter_info() -> IterTable {
    let mut table = [[[IterEntry::default(); 8]; 8]; 30];
    for start in 0..30 {
        for slot in 0..8 {
            let row = &mut table[start][slot];
            let mut n = 0;
            for j in 0..30 {
                let x = start + j * SLOTS[slot] as usize;
                if x % 2 == 0 || x % 3 == 0 || x % 5 == 0 {
                    continue;
                }
                assert!(n < 8, "too many multiples for start {} slot {}", start, slot);
                row[n] = IterEntry {
                    multiple: j as u8,
                    mask: !MASK30[x % 30],
                };
                n += 1;
            }
            if n != 8 {
                panic!("found {} multiples for start {} slot {}, expected 8", n, start, slot);
            }
        }
    }
    table
}

/// Marking row for a prime in `slot`, starting from a value congruent to
/// `start_residue` mod 30. Entries are ordered by `multiple`.
pub fn iteration_row(start_residue: usize, slot: usize) -> &'static [IterEntry; 8] {
    &ITER_INFO[start_residue][slot]
}
