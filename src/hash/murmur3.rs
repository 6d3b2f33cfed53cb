//! # Murmur3 x64-128
//!
//! Deterministic 128-bit hashing of primitive values and byte ranges,
//! little-endian throughout. There is no randomized seeding: the seed is
//! caller-supplied, typically one fixed constant per schema-hash session.
//!
//! ## Word Ordering
//!
//! The accumulator wiring matches the reference implementation exactly, since
//! schema identity depends on it: the seed's `low` word initializes `h1` and
//! `high` initializes `h2`; the completed hash carries the final `h2` in
//! `low` and the final `h1` in `high`.
//!
//! ## Equivalences
//!
//! A `null` string, the empty string, and an empty byte range all hash from a
//! zero-length buffer and therefore produce the same value.

use crate::hash::HashCode128;

const C1: u64 = 0x87c3_7b91_1142_53d5;
const C2: u64 = 0x4cf5_ad43_2745_937f;
const CHUNK_SIZE: usize = 16;

/// Computes the Murmur3 x64-128 hash of a byte range.
pub fn hash128_bytes(data: &[u8], seed: HashCode128) -> HashCode128 {
    let mut hasher = Hasher::new(seed);
    let mut chunks = data.chunks_exact(CHUNK_SIZE);
    for chunk in &mut chunks {
        hasher.process(chunk);
    }
    hasher.process_remaining(chunks.remainder());
    hasher.complete()
}

/// Hashes a boolean as a single byte (1 for true, 0 for false).
pub fn hash128_bool(item: bool, seed: HashCode128) -> HashCode128 {
    hash128_bytes(&[item as u8], seed)
}

pub fn hash128_u8(item: u8, seed: HashCode128) -> HashCode128 {
    hash128_bytes(&[item], seed)
}

pub fn hash128_i16(item: i16, seed: HashCode128) -> HashCode128 {
    hash128_bytes(&item.to_le_bytes(), seed)
}

pub fn hash128_i32(item: i32, seed: HashCode128) -> HashCode128 {
    hash128_bytes(&item.to_le_bytes(), seed)
}

pub fn hash128_u32(item: u32, seed: HashCode128) -> HashCode128 {
    hash128_bytes(&item.to_le_bytes(), seed)
}

/// Hashes the UTF-8 bytes of a string. The empty string hashes as a
/// zero-length buffer.
pub fn hash128_str(item: &str, seed: HashCode128) -> HashCode128 {
    hash128_bytes(item.as_bytes(), seed)
}

struct Hasher {
    h1: u64,
    h2: u64,
    length: usize,
}

impl Hasher {
    fn new(seed: HashCode128) -> Self {
        Self {
            h1: seed.low(),
            h2: seed.high(),
            length: 0,
        }
    }

    fn process(&mut self, chunk: &[u8]) {
        debug_assert_eq!(chunk.len(), CHUNK_SIZE);
        let k1 = u64::from_le_bytes(chunk[0..8].try_into().unwrap());
        let k2 = u64::from_le_bytes(chunk[8..16].try_into().unwrap());

        self.h1 ^= mix_k1(k1);
        self.h1 = self.h1.rotate_left(27);
        self.h1 = self.h1.wrapping_add(self.h2);
        self.h1 = self.h1.wrapping_mul(5).wrapping_add(0x52dc_e729);

        self.h2 ^= mix_k2(k2);
        self.h2 = self.h2.rotate_left(31);
        self.h2 = self.h2.wrapping_add(self.h1);
        self.h2 = self.h2.wrapping_mul(5).wrapping_add(0x3849_5ab5);

        self.length += CHUNK_SIZE;
    }

    fn process_remaining(&mut self, remainder: &[u8]) {
        if remainder.is_empty() {
            return;
        }
        debug_assert!(remainder.len() < CHUNK_SIZE);
        self.length += remainder.len();

        let mut k1: u64 = 0;
        let mut k2: u64 = 0;
        for (i, &byte) in remainder.iter().enumerate() {
            if i < 8 {
                k1 ^= (byte as u64) << (8 * i);
            } else {
                k2 ^= (byte as u64) << (8 * (i - 8));
            }
        }

        self.h1 ^= mix_k1(k1);
        self.h2 ^= mix_k2(k2);
    }

    fn complete(mut self) -> HashCode128 {
        self.h1 ^= self.length as u64;
        self.h2 ^= self.length as u64;

        self.h1 = self.h1.wrapping_add(self.h2);
        self.h2 = self.h2.wrapping_add(self.h1);

        self.h1 = fmix64(self.h1);
        self.h2 = fmix64(self.h2);

        self.h1 = self.h1.wrapping_add(self.h2);
        self.h2 = self.h2.wrapping_add(self.h1);

        HashCode128::of(self.h2, self.h1)
    }
}

fn mix_k1(mut k1: u64) -> u64 {
    k1 = k1.wrapping_mul(C1);
    k1 = k1.rotate_left(31);
    k1.wrapping_mul(C2)
}

fn mix_k2(mut k2: u64) -> u64 {
    k2 = k2.wrapping_mul(C2);
    k2 = k2.rotate_left(33);
    k2.wrapping_mul(C1)
}

fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}
