//! Deterministic seed derivation.
//!
//! One region seed fans out into independent streams per purpose, so a change
//! in how one stage consumes randomness never shifts another stage's output.
//! Cell hashes are pure integer arithmetic and reproduce bit-for-bit on every
//! platform.

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// What a derived seed is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedPurpose {
    Height,
    Biome,
    Texture,
    Objects,
}

impl SeedPurpose {
    fn salt(self) -> u64 {
        match self {
            SeedPurpose::Height => 0x4845_4947_4854,
            SeedPurpose::Biome => 0x4249_4f4d_45,
            SeedPurpose::Texture => 0x5445_5854_5552_45,
            SeedPurpose::Objects => 0x4f42_4a45_4354_53,
        }
    }
}

/// Seed 0 means "pick a fresh seed"; anything else is used as-is
pub fn resolve_seed(seed: u32) -> u32 {
    if seed != 0 {
        return seed;
    }
    loop {
        let fresh: u32 = rand::random();
        if fresh != 0 {
            return fresh;
        }
    }
}

/// SplitMix64 finalizer
pub fn mix64(mut value: u64) -> u64 {
    value = value.wrapping_add(0x9e37_79b9_7f4a_7c15);
    value = (value ^ (value >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    value = (value ^ (value >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    value ^ (value >> 31)
}

/// FNV-1a over the region id bytes
pub fn hash_region_id(region_id: &str) -> u64 {
    region_id.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
    })
}

/// Derive the seed for one purpose of one region
pub fn salt_seed(seed: u32, region_id: &str, purpose: SeedPurpose) -> u64 {
    mix64(seed as u64 ^ hash_region_id(region_id).rotate_left(17) ^ purpose.salt())
}

/// Same as [`salt_seed`], folded to 32 bits for noise sources that take `u32`
pub fn salt_seed_u32(seed: u32, region_id: &str, purpose: SeedPurpose) -> u32 {
    let salted = salt_seed(seed, region_id, purpose);
    (salted ^ (salted >> 32)) as u32
}

/// Integer hash of a cell, independent per `channel`
pub fn hash_cell(x: u32, z: u32, seed: u64, channel: u32) -> u32 {
    let packed = ((x as u64) << 32) | z as u64;
    let mixed = mix64(packed ^ mix64(seed ^ ((channel as u64) << 48)));
    (mixed >> 32) as u32
}

/// Cell hash mapped to [0, 1)
pub fn hash_unit(x: u32, z: u32, seed: u64, channel: u32) -> f32 {
    // 24 bits keep the result exactly representable and strictly below 1.0
    (hash_cell(x, z, seed, channel) >> 8) as f32 / (1u32 << 24) as f32
}
