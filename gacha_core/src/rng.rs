use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::Rng;
use sha2::Sha256;

pub type HmacSha256 = Hmac<Sha256>;

/// Source of uniform integers for draws. Injected into every selector so the
/// engine itself holds no random state.
pub trait RandomSource {
    /// Uniform integer in `[0, upper)`. Returns 0 when `upper` is 0.
    fn next_below(&mut self, upper: u64) -> u64;
}

pub fn derive_hash_hex(input: &[u8]) -> String {
    use sha2::Digest;
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

/// Operating-system CSPRNG. This is what live draws use.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecureRng;

impl SecureRng {
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for SecureRng {
    fn next_below(&mut self, upper: u64) -> u64 {
        if upper == 0 {
            return 0;
        }
        OsRng.gen_range(0..upper)
    }
}

// Deterministic stream for simulations and audit replays:
// HMAC-SHA256(server_seed, "client_seed:nonce:block") -> 4 u64 words per block
pub struct SeededRng {
    pub server_seed: String, // secret
    pub client_seed: String,
    pub nonce: u64,
    block: u64,
    words: Vec<u64>,
}

impl SeededRng {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce,
            block: 0,
            words: Vec::new(),
        }
    }

    pub fn server_seed_hash_hex(&self) -> String {
        derive_hash_hex(self.server_seed.as_bytes())
    }

    fn hmac_block(&self, block: u64) -> [u8; 32] {
        let mut mac = HmacSha256::new_from_slice(self.server_seed.as_bytes()).expect("HMAC key");
        let msg = format!("{}:{}:{}", self.client_seed, self.nonce, block);
        mac.update(msg.as_bytes());
        let res = mac.finalize().into_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&res);
        out
    }

    pub fn next_u64(&mut self) -> u64 {
        if self.words.is_empty() {
            let bytes = self.hmac_block(self.block);
            self.block += 1;
            // popped from the back, so store in reverse to keep stream order
            self.words = bytes
                .chunks_exact(8)
                .rev()
                .map(|c| u64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                .collect();
        }
        self.words.pop().unwrap_or_default()
    }
}

impl RandomSource for SeededRng {
    fn next_below(&mut self, upper: u64) -> u64 {
        if upper == 0 {
            return 0;
        }
        // reject the tail so every residue is equally likely
        let rem = (u64::MAX % upper + 1) % upper;
        let limit = u64::MAX - rem;
        loop {
            let v = self.next_u64();
            if v <= limit {
                return v % upper;
            }
        }
    }
}
