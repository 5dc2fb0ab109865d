/// Incremental hash with an HMAC construction on top.
///
/// `reset` → `update`* → `finalize`. After `finalize` the state is spent
/// until the next `reset`.
pub trait Hash {
    fn hash_size(&self) -> usize;
    fn block_size(&self) -> usize;
    fn reset(&mut self);
    fn update(&mut self, data: &[u8]);

    /// Writes `min(hash.len(), hash_size())` bytes of the digest.
    fn finalize(&mut self, hash: &mut [u8]);

    /// Erases the state, then resets.
    fn clear(&mut self);

    /// Resets and absorbs the inner HMAC pad for `key`.
    fn reset_hmac(&mut self, key: &[u8]);

    /// Finishes the inner hash and computes the outer one with the same `key`.
    fn finalize_hmac(&mut self, key: &[u8], hash: &mut [u8]);

    /// Fills `block[..block_size()]` with `key` XOR `pad`, padded with `pad`.
    /// Keys longer than a block are hashed first. Leaves the hash reset.
    fn format_hmac_key(&mut self, block: &mut [u8], key: &[u8], pad: u8) {
        let size = self.block_size();
        self.reset();

        let len = if key.len() <= size {
            block[..key.len()].copy_from_slice(key);
            key.len()
        } else {
            self.update(key);
            let len = self.hash_size();
            self.finalize(&mut block[..len]);
            self.reset();
            len
        };

        block[len..size].fill(pad);
        for b in block[..len].iter_mut() {
            *b ^= pad;
        }
    }
}

/// One-shot HMAC of `data` under `key`.
pub fn hmac<H: Hash + ?Sized>(hash: &mut H, key: &[u8], data: &[u8], out: &mut [u8]) {
    hash.reset_hmac(key);
    hash.update(data);
    hash.finalize_hmac(key, out);
}


#[cfg(test)]
mod hash_test {
    use crate::blake2s::Blake2s;
    use super::*;

    #[test]
    fn short_key_is_padded() {
        let mut b = Blake2s::new();
        let mut block = [0u8; 64];
        b.format_hmac_key(&mut block, &[0x36, 0x00, 0xff], 0x36);

        assert_eq!(&block[..3], &[0x00, 0x36, 0xc9]);
        assert!(block[3..].iter().all(|&x| x == 0x36));
    }

    #[test]
    fn block_sized_key_is_used_directly() {
        let mut b = Blake2s::new();
        let key = [0x5cu8; 64];
        let mut block = [0xAAu8; 64];
        b.format_hmac_key(&mut block, &key, 0x5c);

        assert_eq!(block, [0u8; 64]);
    }

    #[test]
    fn long_key_is_hashed() {
        let key = [0x01u8; 65];
        let digest = Blake2s::digest(&key);

        let mut b = Blake2s::new();
        let mut block = [0u8; 64];
        b.format_hmac_key(&mut block, &key, 0x36);

        for (x, d) in block[..32].iter().zip(digest.iter()) {
            assert_eq!(*x, d ^ 0x36);
        }
        assert!(block[32..].iter().all(|&x| x == 0x36));
    }

    #[test]
    fn hmac_through_trait_object() {
        let mut expected = [0u8; 32];
        hmac(&mut Blake2s::new(), b"k", b"data", &mut expected);

        let mut b = Blake2s::new();
        let hash: &mut dyn Hash = &mut b;
        let mut out = [0u8; 32];
        hmac(hash, b"k", b"data", &mut out);

        assert_eq!(out, expected);
    }
}
