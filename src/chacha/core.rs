//! ChaCha20 block function and keystream (RFC 8439), plus HChaCha20.
//!
//! This module generates raw ChaCha20 keystream. It performs no
//! authentication by itself; the AEAD constructions in [`super::aead`] are
//! responsible for pairing it with Poly1305 and for nonce discipline.
//!
//! The state is a 4×4 matrix of 32-bit words seeded from a fixed constant,
//! the 256-bit key, a 32-bit block counter and a 96-bit nonce. Twenty
//! rounds (ten column/diagonal double-rounds) of add-rotate-XOR quarter
//! rounds produce a 64-byte block after the feed-forward addition.
//!
//! HChaCha20 runs the same rounds over a 128-bit nonce but skips the
//! feed-forward, returning words 0..4 and 12..16 as a derived sub-key; this
//! is the extension step that gives XChaCha20 its 192-bit nonce.
//!
//! All operations are branch-free and constant-time with respect to key
//! and data.

/// ChaCha20 constants: `"expand 32-byte k"` as little-endian words.
const SIGMA: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

/// One quarter round over four words of the state.
#[inline(always)]
fn quarter_round(state: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(16);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(12);

    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(8);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(7);
}

/// The full 20-round ChaCha permutation: ten iterations of four column
/// rounds followed by four diagonal rounds.
fn rounds(state: &mut [u32; 16]) {
    for _ in 0..10 {
        quarter_round(state, 0, 4, 8, 12);
        quarter_round(state, 1, 5, 9, 13);
        quarter_round(state, 2, 6, 10, 14);
        quarter_round(state, 3, 7, 11, 15);

        quarter_round(state, 0, 5, 10, 15);
        quarter_round(state, 1, 6, 11, 12);
        quarter_round(state, 2, 7, 8, 13);
        quarter_round(state, 3, 4, 9, 14);
    }
}

fn seed_state(key: &[u8; 32], counter: u32, nonce: &[u8; 12]) -> [u32; 16] {
    let mut state = [0u32; 16];
    state[0..4].copy_from_slice(&SIGMA);

    for (word, chunk) in state[4..12].iter_mut().zip(key.chunks_exact(4)) {
        *word = u32::from_le_bytes(chunk.try_into().expect("chunk is 4 bytes"));
    }

    state[12] = counter;

    for (word, chunk) in state[13..16].iter_mut().zip(nonce.chunks_exact(4)) {
        *word = u32::from_le_bytes(chunk.try_into().expect("chunk is 4 bytes"));
    }

    state
}

/// Generates one 64-byte keystream block.
///
/// Reusing a `(key, nonce, counter)` triple reuses keystream; preventing
/// that is the caller's job.
pub fn block(key: &[u8; 32], counter: u32, nonce: &[u8; 12]) -> [u8; 64] {
    let mut state = seed_state(key, counter, nonce);
    let seeded = state;

    rounds(&mut state);

    // Feed-forward
    for (word, original) in state.iter_mut().zip(&seeded) {
        *word = word.wrapping_add(*original);
    }

    let mut out = [0u8; 64];
    for (chunk, word) in out.chunks_exact_mut(4).zip(&state) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }

    out
}

/// Derives an HChaCha20 sub-key from a key and a 16-byte nonce.
///
/// Identical to the block function except that the counter/nonce row is
/// seeded with all 16 nonce bytes and the feed-forward addition is skipped;
/// the output is words 0..4 and 12..16 of the permuted state.
pub fn hchacha20(key: &[u8; 32], nonce: &[u8; 16]) -> [u8; 32] {
    let mut state = [0u32; 16];
    state[0..4].copy_from_slice(&SIGMA);

    for (word, chunk) in state[4..12].iter_mut().zip(key.chunks_exact(4)) {
        *word = u32::from_le_bytes(chunk.try_into().expect("chunk is 4 bytes"));
    }

    for (word, chunk) in state[12..16].iter_mut().zip(nonce.chunks_exact(4)) {
        *word = u32::from_le_bytes(chunk.try_into().expect("chunk is 4 bytes"));
    }

    rounds(&mut state);

    let mut out = [0u8; 32];
    for (chunk, word) in out[..16].chunks_exact_mut(4).zip(&state[0..4]) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    for (chunk, word) in out[16..].chunks_exact_mut(4).zip(&state[12..16]) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }

    out
}

/// XORs `input` against the keystream, starting `key_stream_index` bytes
/// into the stream that begins at block `counter`.
///
/// Generation starts at block `counter + key_stream_index / 64` and the
/// first `key_stream_index % 64` bytes of that block are discarded.
/// Encryption and decryption are the same operation.
pub fn keystream_xor(
    key: &[u8; 32],
    nonce: &[u8; 12],
    counter: u32,
    key_stream_index: usize,
    input: &[u8],
) -> Vec<u8> {
    let mut block_counter = counter.wrapping_add((key_stream_index / 64) as u32);
    let mut skip = key_stream_index % 64;

    let mut output = Vec::with_capacity(input.len());
    let mut offset = 0usize;

    while offset < input.len() {
        let keystream = block(key, block_counter, nonce);
        block_counter = block_counter.wrapping_add(1);

        let take = (input.len() - offset).min(64 - skip);
        for i in 0..take {
            output.push(input[offset + i] ^ keystream[skip + i]);
        }

        offset += take;
        skip = 0;
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // RFC 8439 §2.3.2: block function with counter 1.
    #[test]
    fn rfc_8439_block_vector() {
        let key: [u8; 32] = (0u8..32).collect::<Vec<_>>().try_into().unwrap();
        let nonce = hex!("000000090000004a00000000");

        let keystream = block(&key, 1, &nonce);
        assert_eq!(
            keystream,
            hex!(
                "10f1e7e4d13b5915500fdd1fa32071c4"
                "c7d1f4c733c068030422aa9ac3d46c4e"
                "d2826446079faa0914c2d705d98b02a2"
                "b5129cd1de164eb9cbd083e8a2503c4e"
            )
        );
    }

    // RFC 8439 §2.4.2: encrypting the sunscreen text with counter 1.
    #[test]
    fn rfc_8439_encryption_vector() {
        let key: [u8; 32] = (0u8..32).collect::<Vec<_>>().try_into().unwrap();
        let nonce = hex!("000000000000004a00000000");
        let plaintext: &[u8] = b"Ladies and Gentlemen of the class of '99: \
                                 If I could offer you only one tip for the future, \
                                 sunscreen would be it.";

        let cipher_text = keystream_xor(&key, &nonce, 1, 0, plaintext);
        assert_eq!(
            &cipher_text[..64],
            hex!(
                "6e2e359a2568f98041ba0728dd0d6981"
                "e97e7aec1d4360c20a27afccfd9fae0b"
                "f91b65c5524733ab8f593dabcd62b357"
                "1639d624e65152ab8f530c359f0861d8"
            )
        );

        let recovered = keystream_xor(&key, &nonce, 1, 0, &cipher_text);
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn keystream_offset_matches_whole_stream() {
        let key = [0x11u8; 32];
        let nonce = [0x22u8; 12];
        let message: Vec<u8> = (0..200).map(|i| i as u8).collect();

        let whole = keystream_xor(&key, &nonce, 0, 0, &message);

        for split in [1usize, 63, 64, 65, 129, 199] {
            let tail = keystream_xor(&key, &nonce, 0, split, &message[split..]);
            assert_eq!(tail, whole[split..]);
        }
    }

    // draft-irtf-cfrg-xchacha §2.2.1.
    #[test]
    fn hchacha20_subkey_vector() {
        let key: [u8; 32] = (0u8..32).collect::<Vec<_>>().try_into().unwrap();
        let nonce = hex!("000000090000004a0000000031415927");

        assert_eq!(
            hchacha20(&key, &nonce),
            hex!("82413b4227b27bfed30e42508a877d73a0f9e4d58a74a853c12ec41326d3ecdc")
        );
    }

    #[test]
    fn hchacha20_matches_the_permutation() {
        // Cross-check against the block function: the feed-forward can be
        // subtracted out to recover the bare permutation.
        let key = [0x42u8; 32];
        let nonce16 = [0x24u8; 16];

        let counter = u32::from_le_bytes(nonce16[0..4].try_into().unwrap());
        let nonce12: [u8; 12] = nonce16[4..16].try_into().unwrap();

        let fed_forward = block(&key, counter, &nonce12);
        let seeded = seed_state(&key, counter, &nonce12);

        let mut expected = [0u8; 32];
        for (i, chunk) in expected[..16].chunks_exact_mut(4).enumerate() {
            let word = u32::from_le_bytes(fed_forward[4 * i..4 * i + 4].try_into().unwrap());
            chunk.copy_from_slice(&word.wrapping_sub(seeded[i]).to_le_bytes());
        }
        for (i, chunk) in expected[16..].chunks_exact_mut(4).enumerate() {
            let pos = 12 + i;
            let word =
                u32::from_le_bytes(fed_forward[4 * pos..4 * pos + 4].try_into().unwrap());
            chunk.copy_from_slice(&word.wrapping_sub(seeded[pos]).to_le_bytes());
        }

        assert_eq!(hchacha20(&key, &nonce16), expected);
    }
}
