use zeroize::Zeroize;

use super::constants::BLOCK_SIZE;
use super::utils::{check_block_size, load_iv, xor_in_place};
use super::{Block, BlockCipher, CipherError, CipherProcessor};

/// Cipher block chaining over a borrowed 128-bit block cipher.
///
/// Only whole blocks are transformed. A trailing partial block is left as
/// it is: in place it keeps the caller's bytes, and the out-of-place
/// `encrypt`/`decrypt` never write it. Padding is up to the caller.
pub struct Cbc<'a, C: BlockCipher + ?Sized> {
    block: &'a mut C,
    iv: Block,
    temp: Block,
}

impl<'a, C: BlockCipher + ?Sized> Cbc<'a, C> {
    pub fn new(block: &'a mut C) -> Self {
        Cbc {
            block,
            iv: [0; BLOCK_SIZE],
            temp: [0; BLOCK_SIZE],
        }
    }

    pub fn cipher(&self) -> &C {
        &*self.block
    }
}

fn whole_blocks(len: usize) -> usize {
    len - len % BLOCK_SIZE
}

impl<C: BlockCipher + ?Sized> CipherProcessor for Cbc<'_, C> {
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
        load_iv(&mut self.iv, iv)
    }

    fn encrypt_in_place(&mut self, data: &mut [u8]) {
        for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
            xor_in_place(&mut self.iv, chunk);
            self.block.encrypt_block_in_place(&mut self.iv);
            chunk.copy_from_slice(&self.iv);
        }
    }

    fn decrypt_in_place(&mut self, data: &mut [u8]) {
        let mut input = [0u8; BLOCK_SIZE];
        for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
            input.copy_from_slice(chunk);
            self.block.decrypt_block(&mut self.temp, &input);

            chunk.copy_from_slice(&self.temp);
            xor_in_place(chunk, &self.iv);
            self.iv = input;
        }
    }

    fn encrypt(&mut self, output: &mut [u8], input: &[u8]) {
        let len = whole_blocks(output.len().min(input.len()));
        output[..len].copy_from_slice(&input[..len]);
        self.encrypt_in_place(&mut output[..len]);
    }

    fn decrypt(&mut self, output: &mut [u8], input: &[u8]) {
        let len = whole_blocks(output.len().min(input.len()));
        output[..len].copy_from_slice(&input[..len]);
        self.decrypt_in_place(&mut output[..len]);
    }

    fn clear(&mut self) {
        self.block.clear();
        self.iv.zeroize();
        self.temp.zeroize();
    }
}

impl<C: BlockCipher + ?Sized> Drop for Cbc<'_, C> {
    fn drop(&mut self) {
        self.iv.zeroize();
        self.temp.zeroize();
    }
}
