use zeroize::Zeroize;

use super::constants::BLOCK_SIZE;
use super::utils::{check_block_size, load_iv};
use super::{Block, BlockCipher, CipherError, CipherProcessor};

/// Counter mode.
///
/// The IV is the initial counter block. Only the last `counter size` bytes
/// of it are incremented (all 16 by default); the rest stay fixed, so a
/// protocol can put a nonce there. Encryption and decryption are the same
/// operation.
pub struct Ctr<'a, C: BlockCipher + ?Sized> {
    block: &'a mut C,
    counter: Block,
    state: Block,
    posn: usize,
    counter_start: usize,
}

impl<'a, C: BlockCipher + ?Sized> Ctr<'a, C> {
    pub fn new(block: &'a mut C) -> Self {
        Ctr {
            block,
            counter: [0; BLOCK_SIZE],
            state: [0; BLOCK_SIZE],
            posn: BLOCK_SIZE,
            counter_start: 0,
        }
    }

    pub fn cipher(&self) -> &C {
        &*self.block
    }

    /// Sets how many trailing bytes of the counter block take part in
    /// incrementing, between 1 and 16.
    pub fn set_counter_size(&mut self, size: usize) -> Result<(), CipherError> {
        if !(1..=BLOCK_SIZE).contains(&size) {
            log::debug!("rejected a counter size of {}", size);
            return Err(CipherError::InvalidCounterSize);
        }

        self.counter_start = BLOCK_SIZE - size;
        Ok(())
    }

    // Walks the whole counter region even once the carry is gone, so the
    // time taken does not depend on the counter value.
    fn increment_counter(&mut self) {
        let mut carry: u16 = 1;
        for byte in self.counter[self.counter_start..].iter_mut().rev() {
            carry += *byte as u16;
            *byte = carry as u8;
            carry >>= 8;
        }
    }
}

impl<C: BlockCipher + ?Sized> CipherProcessor for Ctr<'_, C> {
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
        load_iv(&mut self.counter, iv)?;
        self.posn = BLOCK_SIZE;
        Ok(())
    }

    fn encrypt_in_place(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            if self.posn >= BLOCK_SIZE {
                self.block.encrypt_block(&mut self.state, &self.counter);
                self.posn = 0;
                self.increment_counter();
            }
            *byte ^= self.state[self.posn];
            self.posn += 1;
        }
    }

    fn decrypt_in_place(&mut self, data: &mut [u8]) {
        self.encrypt_in_place(data);
    }

    fn clear(&mut self) {
        self.block.clear();
        self.counter.zeroize();
        self.state.zeroize();
        self.posn = BLOCK_SIZE;
    }
}

impl<C: BlockCipher + ?Sized> Drop for Ctr<'_, C> {
    fn drop(&mut self) {
        self.counter.zeroize();
        self.state.zeroize();
    }
}


#[cfg(test)]
mod ctr_test {
    use crate::aes::{Aes128, Aes192};
    use super::*;

    #[test]
    fn check_res() {
        // NIST SP 800-38A F.5.1
        let mut aes = Aes128::new();
        let mut ctr = Ctr::new(&mut aes);
        ctr.set_key(&hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap()).unwrap();
        ctr.set_iv(&hex::decode("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff").unwrap()).unwrap();

        let mut data = hex::decode(
            "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51"
        ).unwrap();
        ctr.encrypt_in_place(&mut data);

        assert_eq!(
            hex::encode(&data),
            "874d6191b620e3261bef6864990db6ce9806f66b7970fdff8617187bb9fffdff"
        );
    }

    #[test]
    fn set_counter_size_errors() {
        let mut aes = Aes128::new();
        let mut ctr = Ctr::new(&mut aes);

        assert_eq!(ctr.set_counter_size(0).unwrap_err(), CipherError::InvalidCounterSize);
        assert_eq!(ctr.set_counter_size(17).unwrap_err(), CipherError::InvalidCounterSize);
        assert_eq!(ctr.counter_start, 0);

        ctr.set_counter_size(4).unwrap();
        assert_eq!(ctr.counter_start, 12);
        ctr.set_counter_size(16).unwrap();
        assert_eq!(ctr.counter_start, 0);
    }

    #[test]
    fn counter_carries_into_higher_bytes() {
        let mut aes = Aes128::new();
        let mut ctr = Ctr::new(&mut aes);
        ctr.set_key(&[7u8; 16]).unwrap();
        ctr.set_counter_size(3).unwrap();

        let mut iv = [0xeeu8; 16];
        iv[13] = 0x01;
        iv[14] = 0xff;
        iv[15] = 0xff;
        ctr.set_iv(&iv).unwrap();

        let mut data = [0u8; 1];
        ctr.encrypt_in_place(&mut data);

        assert_eq!(&ctr.counter[13..], &[0x02, 0x00, 0x00]);
        assert_eq!(&ctr.counter[..13], &iv[..13]);
    }

    #[test]
    fn counter_wraps_inside_region() {
        let mut aes = Aes128::new();
        let mut ctr = Ctr::new(&mut aes);
        ctr.set_key(&[7u8; 16]).unwrap();
        ctr.set_counter_size(2).unwrap();

        let mut iv = [0x5au8; 16];
        iv[14] = 0xff;
        iv[15] = 0xff;
        ctr.set_iv(&iv).unwrap();

        let mut data = [0u8; 16 * 3];
        ctr.encrypt_in_place(&mut data);

        // three blocks: ffff -> 0000 -> 0001 -> 0002
        assert_eq!(&ctr.counter[14..], &[0x00, 0x02]);
        assert_eq!(&ctr.counter[..14], &iv[..14]);
    }

    #[test]
    fn keystream_is_encrypted_counter() {
        let key: Vec<u8> = (0..24).collect();
        let iv: Vec<u8> = (0..16).collect();

        let mut aes = Aes192::new();
        aes.set_key(&key).unwrap();
        let mut expected = [0u8; BLOCK_SIZE];
        aes.encrypt_block(&mut expected, &iv.clone().try_into().unwrap());

        let mut ctr = Ctr::new(&mut aes);
        ctr.set_iv(&iv).unwrap();
        let mut data = [0u8; BLOCK_SIZE];
        ctr.encrypt_in_place(&mut data);

        assert_eq!(data, expected);
    }

    #[test]
    fn odd_length_round_trip() {
        let key: Vec<u8> = (0..16).collect();
        let iv = [0x80u8; 16];
        let plaintext: Vec<u8> = (0..77).map(|i| (i * 13 + 1) as u8).collect();

        let mut aes = Aes128::new();
        let mut ctr = Ctr::new(&mut aes);
        ctr.set_key(&key).unwrap();
        ctr.set_counter_size(4).unwrap();

        ctr.set_iv(&iv).unwrap();
        let mut data = plaintext.clone();
        for chunk in data.chunks_mut(11) {
            ctr.encrypt_in_place(chunk);
        }
        assert_ne!(data, plaintext);

        ctr.set_iv(&iv).unwrap();
        ctr.decrypt_in_place(&mut data);
        assert_eq!(data, plaintext);
    }

    #[test]
    fn clear_zeroes_state_and_cipher() {
        let mut aes = Aes128::new();
        let mut ctr = Ctr::new(&mut aes);
        ctr.set_key(&[0x11u8; 16]).unwrap();
        ctr.set_iv(&[0x22u8; 16]).unwrap();

        let mut data = [0x33u8; 19];
        ctr.encrypt_in_place(&mut data);

        ctr.clear();

        assert_eq!(ctr.counter, [0u8; BLOCK_SIZE]);
        assert_eq!(ctr.state, [0u8; BLOCK_SIZE]);
        assert_eq!(ctr.posn, BLOCK_SIZE);
        assert!(ctr.cipher().schedule().iter().all(|&b| b == 0));
    }
}
