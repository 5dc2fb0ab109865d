use byteorder::{ByteOrder, LittleEndian};

use super::constants::BLOCK_SIZE;
use super::{Block, BlockCipher, CipherError};

pub fn load_word(src: &[u8]) -> u32 {
    LittleEndian::read_u32(src)
}

pub fn store_word(src: u32, dst: &mut [u8]) {
    LittleEndian::write_u32(dst, src);
}

pub fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    dst.iter_mut()
        .zip(src.iter())
        .for_each(|(x1, x2)| *x1 ^= x2);
}

/// Chaining modes only work with 128-bit block ciphers.
pub fn check_block_size<C: BlockCipher + ?Sized>(cipher: &C) -> Result<(), CipherError> {
    if cipher.block_size() != BLOCK_SIZE {
        log::debug!("rejected a cipher with {}-byte blocks", cipher.block_size());
        return Err(CipherError::UnsupportedBlockSize);
    }

    Ok(())
}

pub fn load_iv(dst: &mut Block, iv: &[u8]) -> Result<(), CipherError> {
    if iv.len() != BLOCK_SIZE {
        log::debug!("rejected a {}-byte IV", iv.len());
        return Err(CipherError::InvalidIVLength);
    }

    dst.copy_from_slice(iv);
    Ok(())
}

/// Multiplication by x in GF(2^8), without branching on the high bit.
#[inline]
pub fn xtime(a: u8) -> u8 {
    (a << 1) ^ ((a >> 7).wrapping_neg() & 0x1b)
}


#[cfg(test)]
mod utils_tests {
    use super::*;

    #[test]
    #[should_panic]
    fn load_word_incorrect_size() {
        let v = vec![1,2,3];
        load_word(&v);
    }

    #[test]
    fn load_word_check_res() {
        let v = vec![0x1,0x1,0x1,0x4];
        let r = load_word(&v);
        assert_eq!(r, 0x4010101);
    }

    #[test]
    fn store_word_check_res() {
        let mut bytes = [0u8; 4];
        let value: u32 = 0x04030201;

        store_word(value, &mut bytes);
        let expected: [u8; 4] = [1,2,3,4];

        assert_eq!(bytes, expected);
    }

    #[test]
    fn xor_in_place_shortest_wins() {
        let mut dst = [0xffu8; 4];
        xor_in_place(&mut dst, &[0x0f, 0xf0]);

        assert_eq!(dst, [0xf0, 0x0f, 0xff, 0xff]);
    }

    #[test]
    fn load_iv_errors() {
        let mut dst = [7u8; BLOCK_SIZE];
        let iv: Vec<u8> = (0..15).collect();

        let r = load_iv(&mut dst, &iv);

        assert_eq!(r.unwrap_err(), CipherError::InvalidIVLength);
        assert_eq!(dst, [7u8; BLOCK_SIZE]);
    }

    #[test]
    fn load_iv_check_res() {
        let mut dst = [0u8; BLOCK_SIZE];
        let iv: Vec<u8> = (0..16).collect();

        load_iv(&mut dst, &iv).unwrap();

        assert_eq!(dst.to_vec(), iv);
    }

    #[test]
    fn xtime_check_res() {
        // FIPS-197 section 4.2.1
        assert_eq!(xtime(0x57), 0xae);
        assert_eq!(xtime(0xae), 0x47);
        assert_eq!(xtime(0x47), 0x8e);
        assert_eq!(xtime(0x8e), 0x07);
    }
}
