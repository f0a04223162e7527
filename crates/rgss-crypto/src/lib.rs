//! Keystream primitives for RGSS encrypted archives
//!
//! RGSS archives (`.rgssad`, `.rgss2a`, `.rgss3a`) hide both their file table and
//! their payloads behind a trivial XOR scheme driven by a 32-bit "magic" key. The
//! key is advanced with a fixed affine step (`k * 7 + 3`), which makes the stream
//! cheap to generate but strictly sequential. This crate owns that arithmetic so
//! the format parsers never have to reason about key positions themselves.
//!
//! # Components
//!
//! - **Key schedule**: [`advance`], [`jump`] and the archive seed constants
//! - **Table masks**: [`TableCipher`] for the sequential V1/V2 file table and
//!   [`v3_name_mask`] for the fixed-key V3 table
//! - **Payload keystream**: [`Keystream`], a seekable cursor over an entry's
//!   payload mask
//!
//! # Examples
//!
//! ```
//! use rgss_crypto::Keystream;
//!
//! let plaintext = b"Graphics/Battlers/hero".to_vec();
//! let mut data = plaintext.clone();
//!
//! // Obfuscate with an entry seed
//! Keystream::new(0x1234_5678).apply(&mut data);
//! assert_ne!(data, plaintext);
//!
//! // Deobfuscation is the same operation
//! Keystream::new(0x1234_5678).apply(&mut data);
//! assert_eq!(data, plaintext);
//! ```

#![warn(missing_docs)]

pub mod keystream;
pub mod magic;

pub use keystream::Keystream;
pub use magic::{TableCipher, V1_TABLE_SEED, advance, jump, v3_base_key, v3_name_mask};
