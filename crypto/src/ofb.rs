use zeroize::Zeroize;

use super::constants::BLOCK_SIZE;
use super::utils::{check_block_size, load_iv};
use super::{Block, BlockCipher, CipherError, CipherProcessor};

/// Output feedback mode. The register is re-encrypted to form each
/// keystream block; encryption and decryption are the same operation.
pub struct Ofb<'a, C: BlockCipher + ?Sized> {
    block: &'a mut C,
    iv: Block,
    posn: usize,
}

impl<'a, C: BlockCipher + ?Sized> Ofb<'a, C> {
    pub fn new(block: &'a mut C) -> Self {
        Ofb {
            block,
            iv: [0; BLOCK_SIZE],
            posn: BLOCK_SIZE,
        }
    }

    pub fn cipher(&self) -> &C {
        &*self.block
    }
}

impl<C: BlockCipher + ?Sized> CipherProcessor for Ofb<'_, C> {
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
            if self.posn >= BLOCK_SIZE {
                self.block.encrypt_block_in_place(&mut self.iv);
                self.posn = 0;
            }
            *byte ^= self.iv[self.posn];
            self.posn += 1;
        }
    }

    fn decrypt_in_place(&mut self, data: &mut [u8]) {
        self.encrypt_in_place(data);
    }

    fn clear(&mut self) {
        self.block.clear();
        self.iv.zeroize();
        self.posn = BLOCK_SIZE;
    }
}

impl<C: BlockCipher + ?Sized> Drop for Ofb<'_, C> {
    fn drop(&mut self) {
        self.iv.zeroize();
    }
}
