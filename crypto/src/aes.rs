use zeroize::Zeroize;

use super::constants::*;
use super::utils::{xor_in_place, xtime};
use super::{Block, BlockCipher, CipherError};

/// AES with a `KEY_SIZE`-byte key expanded into a `SCHEDULE_SIZE`-byte schedule.
///
/// Use the [`Aes128`], [`Aes192`] and [`Aes256`] aliases rather than naming
/// the parameters directly. The schedule is erased by [`BlockCipher::clear`]
/// and when the cipher is dropped.
pub struct Aes<const KEY_SIZE: usize, const SCHEDULE_SIZE: usize> {
    schedule: [u8; SCHEDULE_SIZE],
}

pub type Aes128 = Aes<AES128_KEY_SIZE, AES128_SCHEDULE_SIZE>;
pub type Aes192 = Aes<AES192_KEY_SIZE, AES192_SCHEDULE_SIZE>;
pub type Aes256 = Aes<AES256_KEY_SIZE, AES256_SCHEDULE_SIZE>;

impl<const KEY_SIZE: usize, const SCHEDULE_SIZE: usize> Aes<KEY_SIZE, SCHEDULE_SIZE> {
    const ROUNDS: usize = SCHEDULE_SIZE / BLOCK_SIZE - 1;

    /// Creates a cipher with no key. `set_key` must succeed before use.
    pub fn new() -> Self {
        Self {
            schedule: [0; SCHEDULE_SIZE],
        }
    }

    pub fn rounds(&self) -> usize {
        Self::ROUNDS
    }

    #[cfg(test)]
    pub(crate) fn schedule(&self) -> &[u8] {
        &self.schedule
    }

    fn round_key(&self, round: usize) -> &[u8] {
        &self.schedule[round * BLOCK_SIZE..(round + 1) * BLOCK_SIZE]
    }
}

impl<const KEY_SIZE: usize, const SCHEDULE_SIZE: usize> Default for Aes<KEY_SIZE, SCHEDULE_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const KEY_SIZE: usize, const SCHEDULE_SIZE: usize> Drop for Aes<KEY_SIZE, SCHEDULE_SIZE> {
    fn drop(&mut self) {
        self.schedule.zeroize();
    }
}

impl<const KEY_SIZE: usize, const SCHEDULE_SIZE: usize> BlockCipher for Aes<KEY_SIZE, SCHEDULE_SIZE> {
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn key_size(&self) -> usize {
        KEY_SIZE
    }

    fn set_key(&mut self, key: &[u8]) -> Result<(), CipherError> {
        if key.len() != KEY_SIZE {
            log::debug!("AES-{} rejected a {}-byte key", KEY_SIZE * 8, key.len());
            return Err(CipherError::InvalidKeyLength);
        }

        expand_key(&mut self.schedule, key);
        Ok(())
    }

    fn encrypt_block(&self, output: &mut Block, input: &Block) {
        output.copy_from_slice(input);
        self.encrypt_block_in_place(output);
    }

    fn decrypt_block(&self, output: &mut Block, input: &Block) {
        output.copy_from_slice(input);
        self.decrypt_block_in_place(output);
    }

    fn encrypt_block_in_place(&self, state: &mut Block) {
        xor_in_place(state, self.round_key(0));

        for round in 1..Self::ROUNDS {
            sub_bytes(state);
            shift_rows(state);
            mix_columns(state);
            xor_in_place(state, self.round_key(round));
        }

        sub_bytes(state);
        shift_rows(state);
        xor_in_place(state, self.round_key(Self::ROUNDS));
    }

    fn decrypt_block_in_place(&self, state: &mut Block) {
        xor_in_place(state, self.round_key(Self::ROUNDS));

        for round in (1..Self::ROUNDS).rev() {
            inv_shift_rows(state);
            inv_sub_bytes(state);
            xor_in_place(state, self.round_key(round));
            inv_mix_columns(state);
        }

        inv_shift_rows(state);
        inv_sub_bytes(state);
        xor_in_place(state, self.round_key(0));
    }

    fn clear(&mut self) {
        log::trace!("clearing AES-{} key schedule", KEY_SIZE * 8);
        self.schedule.zeroize();
    }
}

/// Rijndael key expansion. The key length picks the variant: the schedule
/// is filled word by word from the word `key.len()` bytes back.
fn expand_key(schedule: &mut [u8], key: &[u8]) {
    let nk = key.len();
    schedule[..nk].copy_from_slice(key);

    let mut word = [0u8; 4];
    let mut iteration = 1;
    let mut n = nk;
    while n < schedule.len() {
        word.copy_from_slice(&schedule[n - 4..n]);

        if n % nk == 0 {
            key_schedule_core(&mut word, iteration);
            iteration += 1;
        } else if nk == AES256_KEY_SIZE && n % nk == 16 {
            apply_sbox(&mut word);
        }

        for i in 0..4 {
            schedule[n + i] = schedule[n - nk + i] ^ word[i];
        }
        n += 4;
    }

    word.zeroize();
}

fn key_schedule_core(word: &mut [u8; 4], iteration: usize) {
    word.rotate_left(1);
    apply_sbox(word);
    word[0] ^= RCON[iteration];
}

fn apply_sbox(word: &mut [u8; 4]) {
    for byte in word.iter_mut() {
        *byte = SBOX[*byte as usize];
    }
}

fn sub_bytes(state: &mut Block) {
    for byte in state.iter_mut() {
        *byte = SBOX[*byte as usize];
    }
}

fn inv_sub_bytes(state: &mut Block) {
    for byte in state.iter_mut() {
        *byte = INV_SBOX[*byte as usize];
    }
}

// The state is column-major: byte `r + 4 * c` is row r, column c.
fn shift_rows(state: &mut Block) {
    let s = *state;
    for c in 0..4 {
        for r in 1..4 {
            state[r + 4 * c] = s[r + 4 * ((c + r) % 4)];
        }
    }
}

fn inv_shift_rows(state: &mut Block) {
    let s = *state;
    for c in 0..4 {
        for r in 1..4 {
            state[r + 4 * ((c + r) % 4)] = s[r + 4 * c];
        }
    }
}

fn mix_columns(state: &mut Block) {
    for col in state.chunks_exact_mut(4) {
        let (a0, a1, a2, a3) = (col[0], col[1], col[2], col[3]);
        let t = a0 ^ a1 ^ a2 ^ a3;
        col[0] = a0 ^ t ^ xtime(a0 ^ a1);
        col[1] = a1 ^ t ^ xtime(a1 ^ a2);
        col[2] = a2 ^ t ^ xtime(a2 ^ a3);
        col[3] = a3 ^ t ^ xtime(a3 ^ a0);
    }
}

fn inv_mix_columns(state: &mut Block) {
    for col in state.chunks_exact_mut(4) {
        let u = xtime(xtime(col[0] ^ col[2]));
        let v = xtime(xtime(col[1] ^ col[3]));
        col[0] ^= u;
        col[1] ^= v;
        col[2] ^= u;
        col[3] ^= v;
    }
    mix_columns(state);
}
