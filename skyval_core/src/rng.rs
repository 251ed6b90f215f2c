use hmac::{Hmac, Mac};
use sha2::Sha256;

// Two deterministic sources share the `Entropy` seam:
// - Mulberry32 seeded from an FNV-1a hash, used for stable sticker layouts
// - SeedStream: server_seed (secret) + client_seed + nonce -> HMAC-SHA256 -> floats in [0,1)

pub type HmacSha256 = Hmac<Sha256>;

/// A source of uniform floats in `[0, 1)`.
pub trait Entropy {
    fn next_f64(&mut self) -> f64;
}

impl<E: Entropy + ?Sized> Entropy for &mut E {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1a over the UTF-8 bytes of `s`.
pub fn fnv1a32(s: &str) -> u32 {
    s.bytes().fold(FNV_OFFSET_BASIS, |h, b| (h ^ b as u32).wrapping_mul(FNV_PRIME))
}

fn unit_from_u32(v: u32) -> f64 {
    (v as f64) / (u32::MAX as f64 + 1.0)
}

/// mulberry32: tiny 32-bit generator, bit-compatible with the browser version.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Seeded from `fnv1a32(key)`.
    pub fn from_key(key: &str) -> Self {
        Self::new(fnv1a32(key))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let t = self.state;
        let mut r = (t ^ (t >> 15)).wrapping_mul(1 | t);
        r ^= r.wrapping_add((r ^ (r >> 7)).wrapping_mul(61 | r));
        r ^ (r >> 14)
    }
}

impl Entropy for Mulberry32 {
    fn next_f64(&mut self) -> f64 {
        unit_from_u32(self.next_u32())
    }
}

pub fn derive_hash_hex(input: &[u8]) -> String {
    hex::encode(derive_hash(input))
}

fn derive_hash(input: &[u8]) -> [u8; 32] {
    use sha2::Digest;
    let mut hasher = Sha256::new();
    hasher.update(input);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

pub fn derive_floats(hmac_bytes: &[u8], count: usize) -> Vec<f64> {
    let mut stream = ByteStream::new(hmac_bytes.to_vec());
    (0..count).map(|_| stream.next_f64()).collect()
}

// Successive big-endian 4-byte chunks; the buffer is re-hashed when it runs dry.
#[derive(Debug, Clone)]
struct ByteStream {
    buffer: Vec<u8>,
    pos: usize,
}

impl ByteStream {
    fn new(buffer: Vec<u8>) -> Self {
        Self { buffer, pos: 0 }
    }
}

impl Entropy for ByteStream {
    fn next_f64(&mut self) -> f64 {
        if self.pos + 4 > self.buffer.len() {
            self.buffer = derive_hash(&self.buffer).to_vec();
            self.pos = 0;
        }
        let chunk = &self.buffer[self.pos..self.pos + 4];
        self.pos += 4;
        unit_from_u32(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
    }
}

/// Provably-fair draw stream for one spin.
///
/// Publishing `server_seed_hash_hex()` up front and the seed afterwards lets a
/// player recompute every landing.
#[derive(Debug, Clone)]
pub struct SeedStream {
    pub server_seed: String, // secret
    pub client_seed: String,
    pub nonce: u64,
    bytes: ByteStream,
}

impl SeedStream {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        let server_seed = server_seed.into();
        let client_seed = client_seed.into();
        let bytes = ByteStream::new(hmac_bytes(&server_seed, &client_seed, nonce).to_vec());
        Self {
            server_seed,
            client_seed,
            nonce,
            bytes,
        }
    }

    pub fn server_seed_hash_hex(&self) -> String {
        derive_hash_hex(self.server_seed.as_bytes())
    }

    pub fn hmac_bytes(&self) -> [u8; 32] {
        hmac_bytes(&self.server_seed, &self.client_seed, self.nonce)
    }
}

impl Entropy for SeedStream {
    fn next_f64(&mut self) -> f64 {
        self.bytes.next_f64()
    }
}

fn hmac_bytes(server_seed: &str, client_seed: &str, nonce: u64) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(server_seed.as_bytes()).expect("HMAC key");
    mac.update(format!("{client_seed}:{nonce}").as_bytes());
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// Replays a fixed list of draws, cycling when exhausted. Meant for tests and
/// for reproducing a reported landing.
#[derive(Debug, Clone)]
pub struct ScriptedEntropy {
    draws: Vec<f64>,
    pos: usize,
}

impl ScriptedEntropy {
    pub fn new(draws: impl Into<Vec<f64>>) -> Self {
        Self {
            draws: draws.into(),
            pos: 0,
        }
    }

    pub fn consumed(&self) -> usize {
        self.pos
    }
}

impl Entropy for ScriptedEntropy {
    fn next_f64(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let v = self.draws[self.pos % self.draws.len()];
        self.pos += 1;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a_reference_values() {
        assert_eq!(fnv1a32(""), 2_166_136_261);
        assert_eq!(fnv1a32("a"), 0xE40C_292C);
        assert_eq!(fnv1a32("foobar"), 0xBF9C_F968);
    }

    #[test]
    fn mulberry32_reference_values() {
        // First outputs of mulberry32(0) and mulberry32(1).
        let mut rng = Mulberry32::new(0);
        assert_eq!(rng.next_u32(), 1_144_304_738);
        let mut rng = Mulberry32::new(1);
        assert_eq!(rng.next_u32(), 2_693_262_067);
    }

    #[test]
    fn mulberry32_stays_in_unit_interval() {
        let mut rng = Mulberry32::from_key("rose:0");
        for _ in 0..10_000 {
            let f = rng.next_f64();
            assert!((0.0..1.0).contains(&f));
        }
    }

    #[test]
    fn test_determinism() {
        let mut s1 = SeedStream::new("server", "client", 1);
        let mut s2 = SeedStream::new("server", "client", 1);
        assert_eq!(s1.server_seed_hash_hex(), s2.server_seed_hash_hex());
        assert_eq!(s1.hmac_bytes(), s2.hmac_bytes());
        let a: Vec<f64> = (0..20).map(|_| s1.next_f64()).collect();
        let b: Vec<f64> = (0..20).map(|_| s2.next_f64()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn seed_stream_matches_batch_helper() {
        let mut stream = SeedStream::new("server", "client", 9);
        let batch = derive_floats(&stream.hmac_bytes(), 12);
        let streamed: Vec<f64> = (0..12).map(|_| stream.next_f64()).collect();
        assert_eq!(batch, streamed);
    }

    #[test]
    fn nonce_changes_the_stream() {
        let mut a = SeedStream::new("server", "client", 1);
        let mut b = SeedStream::new("server", "client", 2);
        assert_ne!(a.next_f64(), b.next_f64());
    }

    #[test]
    fn scripted_entropy_cycles() {
        let mut e = ScriptedEntropy::new(vec![0.1, 0.2]);
        assert_eq!(e.next_f64(), 0.1);
        assert_eq!(e.next_f64(), 0.2);
        assert_eq!(e.next_f64(), 0.1);
        assert_eq!(e.consumed(), 3);
    }
}
