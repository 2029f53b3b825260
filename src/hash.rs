//! Key hashing strategies.
//!
//! A [`HashTable`](crate::HashTable) hashes each key exactly once, on
//! insertion, and caches the 32-bit digest in the slot. Every strategy here is
//! deterministic within one process and depends only on the key bytes; none of
//! them is stable across versions, so digests must never be persisted.
//!
//! [`DefaultKeyHasher`] is picked at compile time from the target's pointer
//! width: a 64-bit multiply-mix hash on 64-bit targets, CRC-32 on 32-bit
//! targets, and CRC-16 everywhere else.

use core::hash::BuildHasher;

/// Computes the cached 32-bit digest of a key.
pub trait KeyHasher {
    /// Hashes `key`. Equal byte strings must produce equal digests.
    fn hash_key(&self, key: &[u8]) -> u32;
}

cfg_if::cfg_if! {
    if #[cfg(target_pointer_width = "64")] {
        /// The hasher used when none is given, selected by pointer width.
        pub type DefaultKeyHasher = Mix64;
    } else if #[cfg(target_pointer_width = "32")] {
        /// The hasher used when none is given, selected by pointer width.
        pub type DefaultKeyHasher = Crc32;
    } else {
        /// The hasher used when none is given, selected by pointer width.
        pub type DefaultKeyHasher = Crc16;
    }
}

/// Seed shared with 32-bit FNV-1a; only the starting state, the mixing is not
/// FNV.
const MIX64_SEED: u64 = 0x811c_9dc5;
const MIX64_BLOCK_MULTIPLIER: u64 = 0xbf58_476d_1ce4_e5b9;
const MIX64_TAIL_MULTIPLIER: u64 = 0xd6e8_feb8_6659_fd93;

/// Word-at-a-time multiply-mix hash for 64-bit targets.
///
/// Each 8-byte little-endian block is xored into the state and multiplied. A
/// partial trailing block is packed together with the low byte of the key
/// length before a final multiply, and the 64-bit state is folded to 32 bits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Mix64;

impl KeyHasher for Mix64 {
    #[inline]
    fn hash_key(&self, key: &[u8]) -> u32 {
        let mut hash = MIX64_SEED;

        let mut blocks = key.chunks_exact(8);
        for block in &mut blocks {
            let mut word = [0u8; 8];
            word.copy_from_slice(block);
            hash ^= u64::from_le_bytes(word);
            hash = hash.wrapping_mul(MIX64_BLOCK_MULTIPLIER);
        }

        let tail = blocks.remainder();
        if !tail.is_empty() {
            let mut last = (key.len() & 0xff) as u64;
            for (i, &byte) in tail.iter().enumerate() {
                last |= (byte as u64) << ((i + 1) * 8);
            }
            hash ^= last;
            hash = hash.wrapping_mul(MIX64_TAIL_MULTIPLIER);
        }

        fold(hash)
    }
}

/// Reflected CRC-32 (polynomial `0xEDB88320`), the checksum used by zlib.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Crc32;

impl KeyHasher for Crc32 {
    #[inline]
    fn hash_key(&self, key: &[u8]) -> u32 {
        let mut crc = u32::MAX;
        for &byte in key {
            crc ^= byte as u32;
            for _ in 0..8 {
                let mask = (crc & 1).wrapping_neg();
                crc = (crc >> 1) ^ (0xedb8_8320 & mask);
            }
        }
        !crc
    }
}

/// CRC-16/CCITT (polynomial `0x1021`, initial value `0xFFFF`), computed a
/// byte at a time without a lookup table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Crc16;

impl KeyHasher for Crc16 {
    #[inline]
    fn hash_key(&self, key: &[u8]) -> u32 {
        let mut crc: u16 = 0xffff;
        for &byte in key {
            let mut x = (crc >> 8) as u8 ^ byte;
            x ^= x >> 4;
            let x = x as u16;
            crc = (crc << 8) ^ (x << 12) ^ (x << 5) ^ x;
        }
        crc as u32
    }
}

/// Adapts any [`BuildHasher`] into a [`KeyHasher`] by folding its 64-bit
/// output to 32 bits.
///
/// # Examples
///
/// ```rust
/// # use std::collections::hash_map::RandomState;
/// #
/// # use seq_hash::HashTable;
/// # use seq_hash::hash::BuildKeyHasher;
/// #
/// let mut table = HashTable::with_hasher(BuildKeyHasher::new(RandomState::new()));
/// table.set("answer", 42);
/// assert_eq!(table.get("answer"), Some(42));
/// ```
#[derive(Debug, Default, Clone)]
pub struct BuildKeyHasher<S>(S);

impl<S: BuildHasher> BuildKeyHasher<S> {
    /// Wraps `build_hasher`.
    pub fn new(build_hasher: S) -> Self {
        Self(build_hasher)
    }

    /// Returns the wrapped hasher builder.
    pub fn into_inner(self) -> S {
        self.0
    }
}

impl<S: BuildHasher> KeyHasher for BuildKeyHasher<S> {
    #[inline]
    fn hash_key(&self, key: &[u8]) -> u32 {
        fold(self.0.hash_one(key))
    }
}

/// A [`KeyHasher`] backed by foldhash's fixed-seed fast hasher.
#[cfg(feature = "foldhash")]
pub type FoldKeyHasher = BuildKeyHasher<foldhash::fast::FixedState>;

#[inline(always)]
fn fold(hash: u64) -> u32 {
    (hash ^ (hash >> 32)) as u32
}

#[cfg(test)]
mod tests {
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone, Default)]
    struct SipHashBuilder;

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(0x0706_0504_0302_0100, 0x0f0e_0d0c_0b0a_0908)
        }
    }

    #[test]
    fn crc32_check_value() {
        assert_eq!(Crc32.hash_key(b"123456789"), 0xcbf4_3926);
        assert_eq!(Crc32.hash_key(b""), 0);
    }

    #[test]
    fn crc16_check_value() {
        assert_eq!(Crc16.hash_key(b"123456789"), 0x29b1);
        assert_eq!(Crc16.hash_key(b""), 0xffff);
        assert!(Crc16.hash_key(b"any key at all") <= u16::MAX as u32);
    }

    #[test]
    fn mix64_empty_key_is_folded_seed() {
        assert_eq!(Mix64.hash_key(b""), MIX64_SEED as u32);
    }

    #[test]
    fn mix64_covers_blocks_and_tails() {
        let keys: [&[u8]; 6] = [
            b"a",
            b"ab",
            b"abcdefgh",
            b"abcdefghi",
            b"abcdefghijklmnop",
            b"abcdefghijklmnopq",
        ];
        for key in keys {
            assert_eq!(Mix64.hash_key(key), Mix64.hash_key(&key.to_vec()));
        }
        assert_ne!(Mix64.hash_key(b"abcdefgh"), Mix64.hash_key(b"abcdefgi"));
        assert_ne!(Mix64.hash_key(b"x"), Mix64.hash_key(b"y"));
    }

    #[test]
    fn default_hasher_follows_pointer_width() {
        let name = core::any::type_name::<DefaultKeyHasher>();
        #[cfg(target_pointer_width = "64")]
        assert!(name.ends_with("Mix64"), "{name}");
        #[cfg(target_pointer_width = "32")]
        assert!(name.ends_with("Crc32"), "{name}");
        #[cfg(target_pointer_width = "16")]
        assert!(name.ends_with("Crc16"), "{name}");
    }

    #[test]
    fn build_hasher_adapter_is_deterministic() {
        let hasher = BuildKeyHasher::new(SipHashBuilder);
        assert_eq!(hasher.hash_key(b"symbol"), hasher.hash_key(b"symbol"));
        assert_ne!(hasher.hash_key(b"symbol"), hasher.hash_key(b"symbols"));

        let again = BuildKeyHasher::new(SipHashBuilder);
        assert_eq!(hasher.hash_key(b"symbol"), again.hash_key(b"symbol"));
    }

    #[test]
    #[cfg(feature = "foldhash")]
    fn foldhash_adapter_is_deterministic() {
        let hasher = FoldKeyHasher::default();
        assert_eq!(hasher.hash_key(b"value"), hasher.hash_key(b"value"));
        assert_eq!(
            hasher.hash_key(b"value"),
            hasher.clone().hash_key(b"value")
        );
    }
}
