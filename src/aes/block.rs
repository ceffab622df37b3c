//! AES key schedule and single-block transform (FIPS-197).
//!
//! ## Table construction
//!
//! The implementation is table-driven. Instead of embedding the published
//! tables as opaque constants, everything is derived in `const fn` from the
//! field GF(2⁸) with the AES reduction polynomial `x⁸ + x⁴ + x³ + x + 1`:
//!
//! - `SBOX` / `INV_SBOX`: multiplicative inverse followed by the affine
//!   transform, and its inversion,
//! - `TE`: four 256-entry tables of 32-bit words fusing SubBytes,
//!   ShiftRows and MixColumns for one byte position each,
//! - `TD`: the same for the inverse cipher (InvSubBytes + InvMixColumns).
//!
//! Each round of the cipher then reduces to four table lookups and XORs per
//! column, the classic construction used for performance parity with
//! hardware AES.
//!
//! ## Key schedule
//!
//! `expand_key_for_encrypting` implements the FIPS-197 expansion for
//! Nk ∈ {4, 6, 8}. `expand_key_for_decrypting` produces the equivalent
//! inverse cipher keys: the encryption schedule reversed per round, with
//! InvMixColumns applied to every round key except the first and last.

use crate::error::{Error, Result};

/// AES block size in bytes. Fixed by the specification.
pub const BLOCK_LENGTH: usize = 16;

/// Multiplication by `x` in GF(2⁸) modulo `x⁸ + x⁴ + x³ + x + 1`.
const fn xtime(a: u8) -> u8 {
    (a << 1) ^ (((a >> 7) & 1) * 0x1b)
}

/// Full multiplication in GF(2⁸).
const fn gf_mul(a: u8, b: u8) -> u8 {
    let mut a = a;
    let mut b = b;
    let mut product = 0u8;

    let mut bit = 0;
    while bit < 8 {
        product ^= a * (b & 1);
        a = xtime(a);
        b >>= 1;
        bit += 1;
    }

    product
}

/// Multiplicative inverse in GF(2⁸), with `inv(0) = 0` as AES requires.
const fn gf_inv(a: u8) -> u8 {
    if a == 0 {
        return 0;
    }

    let mut candidate = 1u8;
    loop {
        if gf_mul(a, candidate) == 1 {
            return candidate;
        }
        candidate = candidate.wrapping_add(1);
    }
}

const fn build_sbox() -> [u8; 256] {
    let mut sbox = [0u8; 256];

    let mut x = 0usize;
    while x < 256 {
        let inv = gf_inv(x as u8);

        // Affine transform: b ⊕ (b <<< 1) ⊕ (b <<< 2) ⊕ (b <<< 3) ⊕ (b <<< 4) ⊕ 0x63
        sbox[x] = inv
            ^ inv.rotate_left(1)
            ^ inv.rotate_left(2)
            ^ inv.rotate_left(3)
            ^ inv.rotate_left(4)
            ^ 0x63;

        x += 1;
    }

    sbox
}

const fn build_inv_sbox(sbox: &[u8; 256]) -> [u8; 256] {
    let mut inv = [0u8; 256];

    let mut x = 0usize;
    while x < 256 {
        inv[sbox[x] as usize] = x as u8;
        x += 1;
    }

    inv
}

const SBOX: [u8; 256] = build_sbox();
const INV_SBOX: [u8; 256] = build_inv_sbox(&SBOX);

/// Encryption tables: `TE[0][x] = S(x) · (02, 01, 01, 03)` as a big-endian
/// word, `TE[i]` rotated right by `8·i` bits for byte position `i`.
const fn build_enc_tables() -> [[u32; 256]; 4] {
    let mut tables = [[0u32; 256]; 4];

    let mut x = 0usize;
    while x < 256 {
        let s = SBOX[x];
        let word = u32::from_be_bytes([gf_mul(s, 0x02), s, s, gf_mul(s, 0x03)]);

        tables[0][x] = word;
        tables[1][x] = word.rotate_right(8);
        tables[2][x] = word.rotate_right(16);
        tables[3][x] = word.rotate_right(24);

        x += 1;
    }

    tables
}

/// Decryption tables: `TD[0][x] = S⁻¹(x) · (0e, 09, 0d, 0b)`, rotated per
/// byte position as for `TE`.
const fn build_dec_tables() -> [[u32; 256]; 4] {
    let mut tables = [[0u32; 256]; 4];

    let mut x = 0usize;
    while x < 256 {
        let s = INV_SBOX[x];
        let word = u32::from_be_bytes([
            gf_mul(s, 0x0e),
            gf_mul(s, 0x09),
            gf_mul(s, 0x0d),
            gf_mul(s, 0x0b),
        ]);

        tables[0][x] = word;
        tables[1][x] = word.rotate_right(8);
        tables[2][x] = word.rotate_right(16);
        tables[3][x] = word.rotate_right(24);

        x += 1;
    }

    tables
}

const TE: [[u32; 256]; 4] = build_enc_tables();
const TD: [[u32; 256]; 4] = build_dec_tables();

/// Round constants for the key schedule, `RCON[j] = x^j` in GF(2⁸).
const fn build_rcon() -> [u32; 10] {
    let mut rcon = [0u32; 10];

    let mut value = 1u8;
    let mut j = 0usize;
    while j < 10 {
        rcon[j] = (value as u32) << 24;
        value = xtime(value);
        j += 1;
    }

    rcon
}

const RCON: [u32; 10] = build_rcon();

/// An expanded AES key schedule.
///
/// Holds `4·(rounds + 1)` 32-bit round-key words; `rounds` is 10, 12 or 14
/// depending on the key length. A schedule is direction-specific: use
/// [`expand_key_for_encrypting`] with [`encrypt_block`] and
/// [`expand_key_for_decrypting`] with [`decrypt_block`].
#[derive(Clone)]
pub struct RoundKeys {
    words: [u32; 60],
    rounds: usize,
}

impl RoundKeys {
    /// Number of cipher rounds (10, 12 or 14).
    pub fn rounds(&self) -> usize {
        self.rounds
    }
}

fn key_word_count(key: &[u8]) -> Result<usize> {
    match key.len() {
        16 => Ok(4),
        24 => Ok(6),
        32 => Ok(8),
        got => Err(Error::InvalidKeyLength {
            got,
            expected: "16, 24 or 32 bytes",
        }),
    }
}

fn sub_word(word: u32) -> u32 {
    let [a, b, c, d] = word.to_be_bytes();
    u32::from_be_bytes([
        SBOX[a as usize],
        SBOX[b as usize],
        SBOX[c as usize],
        SBOX[d as usize],
    ])
}

fn inv_mix_column(word: u32) -> u32 {
    let [a, b, c, d] = word.to_be_bytes();
    u32::from_be_bytes([
        gf_mul(a, 0x0e) ^ gf_mul(b, 0x0b) ^ gf_mul(c, 0x0d) ^ gf_mul(d, 0x09),
        gf_mul(a, 0x09) ^ gf_mul(b, 0x0e) ^ gf_mul(c, 0x0b) ^ gf_mul(d, 0x0d),
        gf_mul(a, 0x0d) ^ gf_mul(b, 0x09) ^ gf_mul(c, 0x0e) ^ gf_mul(d, 0x0b),
        gf_mul(a, 0x0b) ^ gf_mul(b, 0x0d) ^ gf_mul(c, 0x09) ^ gf_mul(d, 0x0e),
    ])
}

/// Expands a 16-, 24- or 32-byte key into encryption round keys.
///
/// Any other key length fails with [`Error::InvalidKeyLength`] before any
/// expansion work.
pub fn expand_key_for_encrypting(key: &[u8]) -> Result<RoundKeys> {
    let nk = key_word_count(key)?;
    let rounds = nk + 6;

    let mut words = [0u32; 60];

    for (i, chunk) in key.chunks_exact(4).enumerate() {
        words[i] = u32::from_be_bytes(chunk.try_into().expect("chunk is 4 bytes"));
    }

    for i in nk..4 * (rounds + 1) {
        let mut temp = words[i - 1];

        if i % nk == 0 {
            temp = sub_word(temp.rotate_left(8)) ^ RCON[i / nk - 1];
        } else if nk == 8 && i % nk == 4 {
            temp = sub_word(temp);
        }

        words[i] = words[i - nk] ^ temp;
    }

    Ok(RoundKeys { words, rounds })
}

/// Expands a key into round keys for the equivalent inverse cipher.
///
/// The encryption schedule is reversed round-by-round and InvMixColumns is
/// applied to every round key except the outermost two, as FIPS-197 §5.3.5
/// prescribes.
pub fn expand_key_for_decrypting(key: &[u8]) -> Result<RoundKeys> {
    let enc = expand_key_for_encrypting(key)?;
    let rounds = enc.rounds;

    let mut words = [0u32; 60];

    for round in 0..=rounds {
        for column in 0..4 {
            words[4 * round + column] = enc.words[4 * (rounds - round) + column];
        }
    }

    for word in words.iter_mut().take(4 * rounds).skip(4) {
        *word = inv_mix_column(*word);
    }

    Ok(RoundKeys { words, rounds })
}

/// Encrypts a single 16-byte block.
pub fn encrypt_block(round_keys: &RoundKeys, input: &[u8; BLOCK_LENGTH]) -> [u8; BLOCK_LENGTH] {
    let w = &round_keys.words;

    let mut s0 = u32::from_be_bytes(input[0..4].try_into().expect("4 bytes")) ^ w[0];
    let mut s1 = u32::from_be_bytes(input[4..8].try_into().expect("4 bytes")) ^ w[1];
    let mut s2 = u32::from_be_bytes(input[8..12].try_into().expect("4 bytes")) ^ w[2];
    let mut s3 = u32::from_be_bytes(input[12..16].try_into().expect("4 bytes")) ^ w[3];

    let mut k = 4;
    for _ in 1..round_keys.rounds {
        let t0 = TE[0][(s0 >> 24) as usize]
            ^ TE[1][((s1 >> 16) & 0xff) as usize]
            ^ TE[2][((s2 >> 8) & 0xff) as usize]
            ^ TE[3][(s3 & 0xff) as usize]
            ^ w[k];
        let t1 = TE[0][(s1 >> 24) as usize]
            ^ TE[1][((s2 >> 16) & 0xff) as usize]
            ^ TE[2][((s3 >> 8) & 0xff) as usize]
            ^ TE[3][(s0 & 0xff) as usize]
            ^ w[k + 1];
        let t2 = TE[0][(s2 >> 24) as usize]
            ^ TE[1][((s3 >> 16) & 0xff) as usize]
            ^ TE[2][((s0 >> 8) & 0xff) as usize]
            ^ TE[3][(s1 & 0xff) as usize]
            ^ w[k + 2];
        let t3 = TE[0][(s3 >> 24) as usize]
            ^ TE[1][((s0 >> 16) & 0xff) as usize]
            ^ TE[2][((s1 >> 8) & 0xff) as usize]
            ^ TE[3][(s2 & 0xff) as usize]
            ^ w[k + 3];

        s0 = t0;
        s1 = t1;
        s2 = t2;
        s3 = t3;
        k += 4;
    }

    // Final round: SubBytes + ShiftRows only
    let t0 = final_word(s0, s1, s2, s3, &SBOX) ^ w[k];
    let t1 = final_word(s1, s2, s3, s0, &SBOX) ^ w[k + 1];
    let t2 = final_word(s2, s3, s0, s1, &SBOX) ^ w[k + 2];
    let t3 = final_word(s3, s0, s1, s2, &SBOX) ^ w[k + 3];

    serialize_state(t0, t1, t2, t3)
}

/// Decrypts a single 16-byte block.
pub fn decrypt_block(round_keys: &RoundKeys, input: &[u8; BLOCK_LENGTH]) -> [u8; BLOCK_LENGTH] {
    let w = &round_keys.words;

    let mut s0 = u32::from_be_bytes(input[0..4].try_into().expect("4 bytes")) ^ w[0];
    let mut s1 = u32::from_be_bytes(input[4..8].try_into().expect("4 bytes")) ^ w[1];
    let mut s2 = u32::from_be_bytes(input[8..12].try_into().expect("4 bytes")) ^ w[2];
    let mut s3 = u32::from_be_bytes(input[12..16].try_into().expect("4 bytes")) ^ w[3];

    let mut k = 4;
    for _ in 1..round_keys.rounds {
        let t0 = TD[0][(s0 >> 24) as usize]
            ^ TD[1][((s3 >> 16) & 0xff) as usize]
            ^ TD[2][((s2 >> 8) & 0xff) as usize]
            ^ TD[3][(s1 & 0xff) as usize]
            ^ w[k];
        let t1 = TD[0][(s1 >> 24) as usize]
            ^ TD[1][((s0 >> 16) & 0xff) as usize]
            ^ TD[2][((s3 >> 8) & 0xff) as usize]
            ^ TD[3][(s2 & 0xff) as usize]
            ^ w[k + 1];
        let t2 = TD[0][(s2 >> 24) as usize]
            ^ TD[1][((s1 >> 16) & 0xff) as usize]
            ^ TD[2][((s0 >> 8) & 0xff) as usize]
            ^ TD[3][(s3 & 0xff) as usize]
            ^ w[k + 2];
        let t3 = TD[0][(s3 >> 24) as usize]
            ^ TD[1][((s2 >> 16) & 0xff) as usize]
            ^ TD[2][((s1 >> 8) & 0xff) as usize]
            ^ TD[3][(s0 & 0xff) as usize]
            ^ w[k + 3];

        s0 = t0;
        s1 = t1;
        s2 = t2;
        s3 = t3;
        k += 4;
    }

    // Final round: InvSubBytes + InvShiftRows only
    let t0 = final_word(s0, s3, s2, s1, &INV_SBOX) ^ w[k];
    let t1 = final_word(s1, s0, s3, s2, &INV_SBOX) ^ w[k + 1];
    let t2 = final_word(s2, s1, s0, s3, &INV_SBOX) ^ w[k + 2];
    let t3 = final_word(s3, s2, s1, s0, &INV_SBOX) ^ w[k + 3];

    serialize_state(t0, t1, t2, t3)
}

#[inline(always)]
fn final_word(a: u32, b: u32, c: u32, d: u32, sbox: &[u8; 256]) -> u32 {
    u32::from_be_bytes([
        sbox[(a >> 24) as usize],
        sbox[((b >> 16) & 0xff) as usize],
        sbox[((c >> 8) & 0xff) as usize],
        sbox[(d & 0xff) as usize],
    ])
}

#[inline(always)]
fn serialize_state(t0: u32, t1: u32, t2: u32, t3: u32) -> [u8; BLOCK_LENGTH] {
    let mut out = [0u8; BLOCK_LENGTH];
    out[0..4].copy_from_slice(&t0.to_be_bytes());
    out[4..8].copy_from_slice(&t1.to_be_bytes());
    out[8..12].copy_from_slice(&t2.to_be_bytes());
    out[12..16].copy_from_slice(&t3.to_be_bytes());

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn sbox_matches_fips_197_corners() {
        assert_eq!(SBOX[0x00], 0x63);
        assert_eq!(SBOX[0x01], 0x7c);
        assert_eq!(SBOX[0x53], 0xed);
        assert_eq!(SBOX[0xff], 0x16);
        assert_eq!(INV_SBOX[0x63], 0x00);
        assert_eq!(INV_SBOX[0xed], 0x53);
    }

    #[test]
    fn fips_197_appendix_c_vectors() {
        let plaintext = hex!("00112233445566778899aabbccddeeff");

        let cases: [(&[u8], [u8; 16]); 3] = [
            (
                &hex!("000102030405060708090a0b0c0d0e0f"),
                hex!("69c4e0d86a7b0430d8cdb78070b4c55a"),
            ),
            (
                &hex!("000102030405060708090a0b0c0d0e0f1011121314151617"),
                hex!("dda97ca4864cdfe06eaf70a0ec0d7191"),
            ),
            (
                &hex!("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"),
                hex!("8ea2b7ca516745bfeafc49904b496089"),
            ),
        ];

        for (key, expected) in cases {
            let enc = expand_key_for_encrypting(key).unwrap();
            let dec = expand_key_for_decrypting(key).unwrap();

            let cipher_text = encrypt_block(&enc, &plaintext);
            assert_eq!(cipher_text, expected);
            assert_eq!(decrypt_block(&dec, &cipher_text), plaintext);
        }
    }

    #[test]
    fn rejects_bad_key_lengths() {
        for len in [0usize, 8, 15, 17, 31, 33, 64] {
            let key = vec![0u8; len];
            assert!(matches!(
                expand_key_for_encrypting(&key),
                Err(Error::InvalidKeyLength { .. })
            ));
            assert!(matches!(
                expand_key_for_decrypting(&key),
                Err(Error::InvalidKeyLength { .. })
            ));
        }
    }

    #[test]
    fn round_counts_follow_key_length() {
        assert_eq!(expand_key_for_encrypting(&[0u8; 16]).unwrap().rounds(), 10);
        assert_eq!(expand_key_for_encrypting(&[0u8; 24]).unwrap().rounds(), 12);
        assert_eq!(expand_key_for_encrypting(&[0u8; 32]).unwrap().rounds(), 14);
    }
}
