use zeroize::Zeroize;

use super::constants::BLOCK_SIZE;
use super::utils::{check_block_size, load_iv};
use super::{Block, BlockCipher, CipherError, CipherProcessor};

/// Cipher feedback mode with a full 128-bit shift register.
///
/// The register holds the keystream for the current block and is
/// overwritten byte by byte with ciphertext, which then feeds the next
/// block. Any length is accepted.
pub struct Cfb<'a, C: BlockCipher + ?Sized> {
    block: &'a mut C,
    iv: Block,
    posn: usize,
}

impl<'a, C: BlockCipher + ?Sized> Cfb<'a, C> {
    pub fn new(block: &'a mut C) -> Self {
        Cfb {
            block,
            iv: [0; BLOCK_SIZE],
            posn: BLOCK_SIZE,
        }
    }

    pub fn cipher(&self) -> &C {
        &*self.block
    }

    fn refill(&mut self) {
        if self.posn >= BLOCK_SIZE {
            self.block.encrypt_block_in_place(&mut self.iv);
            self.posn = 0;
        }
    }
}

impl<C: BlockCipher + ?Sized> CipherProcessor for Cfb<'_, C> {
    fn key_size(&self) -> usize {
        self.block.key_size()
    }

    fn iv_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn set_key(&mut self, key: &[u8]) -> Result<(), CipherError> {
        check_block_size(&*self.block)?;
        self.block.set_key(key)
    }

    fn set_iv(&mut self, iv: &[u8]) -> Result<(), CipherError> {
        load_iv(&mut self.iv, iv)?;
        self.posn = BLOCK_SIZE;
        Ok(())
    }

    fn encrypt_in_place(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            self.refill();
            self.iv[self.posn] ^= *byte;
            *byte = self.iv[self.posn];
            self.posn += 1;
        }
    }

    fn decrypt_in_place(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            self.refill();
            let ciphertext = *byte;
            *byte ^= self.iv[self.posn];
            self.iv[self.posn] = ciphertext;
            self.posn += 1;
        }
    }

    fn clear(&mut self) {
        self.block.clear();
        self.iv.zeroize();
        self.posn = BLOCK_SIZE;
    }
}

impl<C: BlockCipher + ?Sized> Drop for Cfb<'_, C> {
    fn drop(&mut self) {
        self.iv.zeroize();
    }
}


#[cfg(test)]
mod cfb_test {
    use crate::aes::{Aes128, Aes192};
    use super::*;

    #[test]
    fn check_res() {
        // NIST SP 800-38A F.3.13
        let mut aes = Aes128::new();
        let mut cfb = Cfb::new(&mut aes);
        cfb.set_key(&hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap()).unwrap();
        cfb.set_iv(&hex::decode("000102030405060708090a0b0c0d0e0f").unwrap()).unwrap();

        let mut data = hex::decode(
            "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51"
        ).unwrap();
        cfb.encrypt_in_place(&mut data);

        assert_eq!(
            hex::encode(&data),
            "3b3fd92eb72dad20333449f8e83cfb4ac8a64537a0b3a93fcde3cdad9f1ce58b"
        );
    }

    #[test]
    fn byte_at_a_time_matches_bulk() {
        let key: Vec<u8> = (0..24).collect();
        let iv: Vec<u8> = (16..32).collect();
        let plaintext: Vec<u8> = (0..53).map(|i| (i * 31) as u8).collect();

        let mut aes = Aes192::new();
        let mut cfb = Cfb::new(&mut aes);
        cfb.set_key(&key).unwrap();

        cfb.set_iv(&iv).unwrap();
        let mut bulk = plaintext.clone();
        cfb.encrypt_in_place(&mut bulk);

        cfb.set_iv(&iv).unwrap();
        let mut pieces = plaintext.clone();
        for chunk in pieces.chunks_mut(7) {
            cfb.encrypt_in_place(chunk);
        }
        assert_eq!(bulk, pieces);

        cfb.set_iv(&iv).unwrap();
        let mut decrypted = vec![0u8; bulk.len()];
        for (out, inp) in decrypted.chunks_mut(5).zip(bulk.chunks(5)) {
            cfb.decrypt(out, inp);
        }
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn ciphertext_feeds_back() {
        let mut aes = Aes128::new();
        let mut cfb = Cfb::new(&mut aes);
        cfb.set_key(&[9u8; 16]).unwrap();
        cfb.set_iv(&[3u8; 16]).unwrap();

        let mut data = [0u8; 16];
        cfb.encrypt_in_place(&mut data);

        assert_eq!(cfb.iv, data);
        assert_eq!(cfb.posn, 16);
    }

    #[test]
    fn set_iv_errors() {
        let mut aes = Aes128::new();
        let mut cfb = Cfb::new(&mut aes);

        assert_eq!(cfb.set_iv(&[0u8; 8]).unwrap_err(), CipherError::InvalidIVLength);
        assert_eq!(cfb.set_key(&[0u8; 8]).unwrap_err(), CipherError::InvalidKeyLength);
    }

    #[test]
    fn clear_zeroes_state_and_cipher() {
        let mut aes = Aes128::new();
        let mut cfb = Cfb::new(&mut aes);
        cfb.set_key(&[0x11u8; 16]).unwrap();
        cfb.set_iv(&[0x22u8; 16]).unwrap();

        let mut data = [0x33u8; 21];
        cfb.encrypt_in_place(&mut data);

        cfb.clear();

        assert_eq!(cfb.iv, [0u8; BLOCK_SIZE]);
        assert_eq!(cfb.posn, BLOCK_SIZE);
        assert!(cfb.cipher().schedule().iter().all(|&b| b == 0));
    }
}
