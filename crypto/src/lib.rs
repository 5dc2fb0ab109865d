use zeroize::Zeroize;

mod utils;
mod constants;
pub mod aes;
pub mod cbc;
pub mod cfb;
pub mod ofb;
pub mod ctr;
pub mod hash;
pub mod blake2s;

pub use aes::{Aes128, Aes192, Aes256};
pub use blake2s::Blake2s;
pub use cbc::Cbc;
pub use cfb::Cfb;
pub use ctr::Ctr;
pub use hash::{hmac, Hash};
pub use ofb::Ofb;

pub use constants::BLOCK_SIZE;

/// A single cipher block.
pub type Block = [u8; BLOCK_SIZE];

/// Keyed permutation over 16-byte blocks.
///
/// A freshly constructed cipher has no key; `encrypt_block` and
/// `decrypt_block` produce garbage until `set_key` succeeds.
pub trait BlockCipher {
    fn block_size(&self) -> usize;
    fn key_size(&self) -> usize;
    fn set_key(&mut self, key: &[u8]) -> Result<(), CipherError>;
    fn encrypt_block(&self, output: &mut Block, input: &Block);
    fn decrypt_block(&self, output: &mut Block, input: &Block);

    /// Erases all key material held by the cipher.
    fn clear(&mut self);

    fn encrypt_block_in_place(&self, block: &mut Block) {
        let mut input = *block;
        self.encrypt_block(block, &input);
        input.zeroize();
    }

    fn decrypt_block_in_place(&self, block: &mut Block) {
        let mut input = *block;
        self.decrypt_block(block, &input);
        input.zeroize();
    }
}

/// Stream interface shared by the chaining modes.
pub trait CipherProcessor {
    fn key_size(&self) -> usize;
    fn iv_size(&self) -> usize;
    fn set_key(&mut self, key: &[u8]) -> Result<(), CipherError>;
    fn set_iv(&mut self, iv: &[u8]) -> Result<(), CipherError>;
    fn encrypt_in_place(&mut self, data: &mut [u8]);
    fn decrypt_in_place(&mut self, data: &mut [u8]);
    fn clear(&mut self);

    /// Encrypts `min(output.len(), input.len())` bytes from `input` into `output`.
    fn encrypt(&mut self, output: &mut [u8], input: &[u8]) {
        let len = output.len().min(input.len());
        output[..len].copy_from_slice(&input[..len]);
        self.encrypt_in_place(&mut output[..len]);
    }

    /// Decrypts `min(output.len(), input.len())` bytes from `input` into `output`.
    fn decrypt(&mut self, output: &mut [u8], input: &[u8]) {
        let len = output.len().min(input.len());
        output[..len].copy_from_slice(&input[..len]);
        self.decrypt_in_place(&mut output[..len]);
    }
}

/// Extendable-output function.
///
/// Interface only; no hash in this crate implements it yet.
pub trait Xof {
    fn block_size(&self) -> usize;
    fn reset(&mut self);
    fn absorb(&mut self, data: &[u8]);
    fn squeeze(&mut self, output: &mut [u8]);
    fn clear(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CipherError {
    #[error("key length does not match the cipher")]
    InvalidKeyLength,
    #[error("IV must be exactly 16 bytes")]
    InvalidIVLength,
    #[error("chaining modes require a 16-byte block cipher")]
    UnsupportedBlockSize,
    #[error("counter size must be between 1 and 16 bytes")]
    InvalidCounterSize,
}
