use zeroize::{Zeroize, ZeroizeOnDrop};

use super::constants::*;
use super::hash::Hash;
use super::utils::{load_word, store_word};

/// BLAKE2s (RFC 7693) with up to 32 bytes of output.
///
/// Supports the native keyed mode through [`Blake2s::reset_keyed`] and the
/// classic HMAC construction through [`Hash::reset_hmac`]. The two give
/// different digests for the same key; use whichever the protocol names.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Blake2s {
    h: [u32; 8],
    m: [u8; BLAKE2S_BLOCK_SIZE],
    chunk_size: usize,
    length: u64,
}

impl Blake2s {
    pub fn new() -> Self {
        let mut b = Blake2s {
            h: [0; 8],
            m: [0; BLAKE2S_BLOCK_SIZE],
            chunk_size: 0,
            length: 0,
        };
        b.reset();
        b
    }

    /// Keyed hasher; see [`Blake2s::reset_keyed`].
    pub fn new_keyed(key: &[u8], output_len: usize) -> Self {
        let mut b = Self::new();
        b.reset_keyed(key, output_len);
        b
    }

    /// Unkeyed 32-byte digest of `data`.
    pub fn digest(data: &[u8]) -> [u8; BLAKE2S_HASH_SIZE] {
        let mut b = Self::new();
        b.update(data);
        let mut out = [0u8; BLAKE2S_HASH_SIZE];
        b.finalize(&mut out);
        out
    }

    /// Resets for an unkeyed digest of `output_len` bytes, clamped to 1..=32.
    pub fn reset_with_output(&mut self, output_len: usize) {
        self.init(0, output_len);
    }

    /// Resets for a keyed digest. The key (at most 32 bytes are used) is
    /// padded to a full block and hashed ahead of the message.
    pub fn reset_keyed(&mut self, key: &[u8], output_len: usize) {
        let key = &key[..key.len().min(BLAKE2S_HASH_SIZE)];
        self.init(key.len(), output_len);

        if !key.is_empty() {
            self.m[..key.len()].copy_from_slice(key);
            self.m[key.len()..].fill(0);
            self.chunk_size = BLAKE2S_BLOCK_SIZE;
            self.length = BLAKE2S_BLOCK_SIZE as u64;
        }
    }

    fn init(&mut self, key_len: usize, output_len: usize) {
        let output_len = output_len.clamp(1, BLAKE2S_HASH_SIZE);

        self.h = BLAKE2S_IV;
        self.h[0] ^= BLAKE2S_PARAM | ((key_len as u32) << 8) | output_len as u32;
        self.chunk_size = 0;
        self.length = 0;
    }

    fn load_hmac_block(&mut self, key: &[u8], pad: u8) {
        let mut block = [0u8; BLAKE2S_BLOCK_SIZE];
        self.format_hmac_key(&mut block, key, pad);
        self.m = block;
        block.zeroize();

        self.length += BLAKE2S_BLOCK_SIZE as u64;
        self.process_chunk(0);
    }

    fn process_chunk(&mut self, f0: u32) {
        let mut m = [0u32; 16];
        for (word, bytes) in m.iter_mut().zip(self.m.chunks_exact(4)) {
            *word = load_word(bytes);
        }

        let mut v = [0u32; 16];
        v[..8].copy_from_slice(&self.h);
        v[8..12].copy_from_slice(&BLAKE2S_IV[..4]);
        v[12] = BLAKE2S_IV[4] ^ (self.length as u32);
        v[13] = BLAKE2S_IV[5] ^ ((self.length >> 32) as u32);
        v[14] = BLAKE2S_IV[6] ^ f0;
        v[15] = BLAKE2S_IV[7];

        for s in SIGMA.iter() {
            // columns
            quarter_round(&mut v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
            quarter_round(&mut v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
            quarter_round(&mut v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
            quarter_round(&mut v, 3, 7, 11, 15, m[s[6]], m[s[7]]);

            // diagonals
            quarter_round(&mut v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
            quarter_round(&mut v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
            quarter_round(&mut v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
            quarter_round(&mut v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
        }

        for i in 0..8 {
            self.h[i] ^= v[i] ^ v[i + 8];
        }

        m.zeroize();
        v.zeroize();
    }
}

#[inline(always)]
fn quarter_round(v: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize, x: u32, y: u32) {
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(x);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(12);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(y);
    v[d] = (v[d] ^ v[a]).rotate_right(8);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(7);
}

impl Default for Blake2s {
    fn default() -> Self {
        Self::new()
    }
}

impl Hash for Blake2s {
    fn hash_size(&self) -> usize {
        BLAKE2S_HASH_SIZE
    }

    fn block_size(&self) -> usize {
        BLAKE2S_BLOCK_SIZE
    }

    fn reset(&mut self) {
        self.init(0, BLAKE2S_HASH_SIZE);
    }

    fn update(&mut self, data: &[u8]) {
        let mut data = data;
        while !data.is_empty() {
            // A full buffer is only compressed once more input shows it
            // was not the last block.
            if self.chunk_size == BLAKE2S_BLOCK_SIZE {
                self.process_chunk(0);
                self.chunk_size = 0;
            }

            let size = (BLAKE2S_BLOCK_SIZE - self.chunk_size).min(data.len());
            self.m[self.chunk_size..self.chunk_size + size].copy_from_slice(&data[..size]);
            self.chunk_size += size;
            self.length += size as u64;
            data = &data[size..];
        }
    }

    fn finalize(&mut self, hash: &mut [u8]) {
        self.m[self.chunk_size..].fill(0);
        self.process_chunk(BLAKE2S_FINAL_FLAG);

        for (word, bytes) in self.h.iter().zip(self.m.chunks_exact_mut(4)) {
            store_word(*word, bytes);
        }

        let len = hash.len().min(BLAKE2S_HASH_SIZE);
        hash[..len].copy_from_slice(&self.m[..len]);
    }

    fn clear(&mut self) {
        log::trace!("clearing BLAKE2s state");
        self.zeroize();
        self.reset();
    }

    fn reset_hmac(&mut self, key: &[u8]) {
        self.load_hmac_block(key, HMAC_IPAD);
    }

    fn finalize_hmac(&mut self, key: &[u8], hash: &mut [u8]) {
        let mut temp = [0u8; BLAKE2S_HASH_SIZE];
        self.finalize(&mut temp);

        self.load_hmac_block(key, HMAC_OPAD);
        self.update(&temp);
        self.finalize(hash);

        temp.zeroize();
    }
}
