//! The composite marking loop. Everything else in the crate is bookkeeping
//! around this: given eight byte streams that all advance by `stride`, AND
//! each stream's mask into every byte it visits.
//!
//! `clear_strided` resolves to the fastest variant enabled for the build.
//! All variants leave the sieve bit-for-bit identical.

#[cfg(not(feature = "simd"))]
pub use self::portable::clear_strided;

#[cfg(feature = "simd")]
pub use self::lockstep::clear_strided;

pub mod portable {
    pub fn clear_strided(sieve: &mut [u8], starts: &[usize; 8], masks: &[u8; 8], stride: usize) {
        for k in 0..8 {
            let m = masks[k];
            let mut i = starts[k];
            while i < sieve.len() {
                sieve[i] &= m;
                i += stride;
            }
        }
    }
}

#[cfg(feature = "simd")]
pub mod lockstep {
    use packed_simd::usizex8;

    use super::portable;

    // Walk all eight streams together while every lane is in bounds, then let
    // the portable loop finish whatever is left of each stream.
    pub fn clear_strided(sieve: &mut [u8], starts: &[usize; 8], masks: &[u8; 8], stride: usize) {
        let bound = usizex8::splat(sieve.len());
        let step = usizex8::splat(stride);
        let mut idx = usizex8::from_slice_unaligned(&starts[..]);

        while idx.lt(bound).all() {
            for k in 0..8 {
                sieve[idx.extract(k)] &= masks[k];
            }
            idx += step;
        }

        let mut rest = [0usize; 8];
        idx.write_to_slice_unaligned(&mut rest[..]);
        portable::clear_strided(sieve, &rest, masks, stride);
    }
}
