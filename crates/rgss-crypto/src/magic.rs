//! Magic key schedule shared by every RGSS archive version
//!
//! All three archive versions derive their masks from the same affine step
//! `k' = k * 7 + 3 (mod 2^32)`. V1/V2 advance the key while walking the file
//! table; V3 derives a single table key from a stored base and never advances it.

/// Initial table key of V1/V2 archives.
pub const V1_TABLE_SEED: u32 = 0xDEAD_CAFE;

const MULTIPLIER: u32 = 7;
const INCREMENT: u32 = 3;

/// Advance a magic key by one step.
#[inline]
pub const fn advance(key: u32) -> u32 {
    key.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT)
}

/// Advance a magic key by `steps` steps in O(log steps).
///
/// The step is an affine map, so `steps` applications collapse into a single
/// `a * k + b` computed by square-and-multiply.
pub const fn jump(key: u32, mut steps: u64) -> u32 {
    // Accumulated map (identity) and the current power of the step
    let (mut acc_mul, mut acc_add) = (1u32, 0u32);
    let (mut base_mul, mut base_add) = (MULTIPLIER, INCREMENT);

    while steps > 0 {
        if steps & 1 == 1 {
            acc_add = base_mul.wrapping_mul(acc_add).wrapping_add(base_add);
            acc_mul = base_mul.wrapping_mul(acc_mul);
        }
        base_add = base_mul.wrapping_mul(base_add).wrapping_add(base_add);
        base_mul = base_mul.wrapping_mul(base_mul);
        steps >>= 1;
    }

    acc_mul.wrapping_mul(key).wrapping_add(acc_add)
}

/// Derive the V3 table key from the base value stored after the header.
#[inline]
pub const fn v3_base_key(stored: u32) -> u32 {
    stored.wrapping_mul(9).wrapping_add(3)
}

/// Mask for byte `index` of a V3 file name.
#[inline]
pub const fn v3_name_mask(key: u32, index: usize) -> u8 {
    (key >> (8 * (index % 4))) as u8
}

/// Sequential mask source for the V1/V2 file table.
///
/// Every masked field consumes one key step: a `u32` is XORed with the whole key,
/// a name byte with its low byte.
#[derive(Debug, Clone)]
pub struct TableCipher {
    key: u32,
}

impl TableCipher {
    /// Start a table walk from `seed` (normally [`V1_TABLE_SEED`]).
    pub const fn new(seed: u32) -> Self {
        Self { key: seed }
    }

    /// Current key. After a record's size field this is the payload seed.
    pub const fn key(&self) -> u32 {
        self.key
    }

    /// Mask (or unmask) a 32-bit table field.
    pub fn mask_u32(&mut self, value: u32) -> u32 {
        let masked = value ^ self.key;
        self.key = advance(self.key);
        masked
    }

    /// Mask (or unmask) name bytes in place.
    pub fn mask_name(&mut self, name: &mut [u8]) {
        for byte in name {
            *byte ^= self.key as u8;
            self.key = advance(self.key);
        }
    }
}

impl Default for TableCipher {
    fn default() -> Self {
        Self::new(V1_TABLE_SEED)
    }
}
