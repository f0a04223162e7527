//! Payload keystream for RGSS archive entries
//!
//! Each entry payload is XORed with a stream of 32-bit key words taken
//! little-endian: payload byte `p` uses byte `p % 4` of word `p / 4`, where word 0
//! is the entry seed and each following word is one [`advance`] step further.
//!
//! The stream is sequential by construction, so [`Keystream`] carries an explicit
//! cursor. Moving forward jumps from the current word; moving backward re-derives
//! the word from the seed. Both are O(log distance) thanks to [`jump`].

use crate::magic::{advance, jump};

/// Seekable keystream cursor for one entry payload.
#[derive(Debug, Clone)]
pub struct Keystream {
    /// Word 0 of the stream
    seed: u32,
    /// Key word covering `position`
    key: u32,
    /// Byte offset into the payload
    position: u64,
}

impl Keystream {
    /// Create a keystream positioned at payload offset 0.
    pub const fn new(seed: u32) -> Self {
        Self {
            seed,
            key: seed,
            position: 0,
        }
    }

    /// Payload offset the next [`apply`](Self::apply) starts at.
    pub const fn position(&self) -> u64 {
        self.position
    }

    /// Move the cursor to payload offset `position`.
    pub fn seek(&mut self, position: u64) {
        if position == self.position {
            return;
        }

        let target_word = position / 4;
        if position > self.position {
            self.key = jump(self.key, target_word - self.position / 4);
        } else {
            // The schedule cannot run backwards
            self.key = jump(self.seed, target_word);
        }
        self.position = position;
    }

    /// XOR `data` with the keystream and advance the cursor past it.
    pub fn apply(&mut self, data: &mut [u8]) {
        for byte in data {
            let lane = (self.position % 4) as u32;
            *byte ^= (self.key >> (8 * lane)) as u8;
            self.position += 1;
            if lane == 3 {
                self.key = advance(self.key);
            }
        }
    }
}
