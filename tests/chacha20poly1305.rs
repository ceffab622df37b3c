use hex_literal::hex;

use sable::chacha::{ChaCha20Poly1305, Poly1305, XChaCha20Poly1305};
use sable::error::Error;
use sable::material::{Mac, Nonce, SecretBox, SecretKey};
use sable::traits::{Cipher, MacAlgorithm, StreamingCipher};

const SUNSCREEN: &[u8] = b"Ladies and Gentlemen of the class of '99: \
                           If I could offer you only one tip for the future, \
                           sunscreen would be it.";

fn rfc_key() -> SecretKey {
    SecretKey::from_bytes(hex!(
        "808182838485868788898a8b8c8d8e8f909192939495969798999a9b9c9d9e9f"
    ))
}

// RFC 8439 §2.8.2.
#[test]
fn rfc_8439_aead_test_vector() {
    let aead = ChaCha20Poly1305;
    let nonce = Nonce::new(hex!("070000004041424344454647"));
    let aad = hex!("50515253c0c1c2c3c4c5c6c7");

    let sealed = aead.encrypt(SUNSCREEN, &rfc_key(), &nonce, &aad).unwrap();

    assert_eq!(
        &sealed.cipher_text()[..32],
        hex!("d31a8d34648e60db7b86afbc53ef7ec2a4aded51296e08fea9e2b5a736ee62d6")
    );
    assert_eq!(
        sealed.mac().as_bytes(),
        hex!("1ae10b594f09e26a7e902ecbd0600691")
    );

    assert_eq!(aead.decrypt(&sealed, &rfc_key(), &aad).unwrap(), SUNSCREEN);
}

// RFC 8439 §2.5.2.
#[test]
fn poly1305_test_vector() {
    let key = SecretKey::from_bytes(hex!(
        "85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b"
    ));

    let mac = Poly1305
        .calculate_mac(b"Cryptographic Forum Research Group", &key, &[], &[])
        .unwrap();
    assert_eq!(mac.as_bytes(), hex!("a8061dc1305136c6c22b8baf0c0127a9"));
}

// draft-irtf-cfrg-xchacha §A.3.
#[test]
fn xchacha20poly1305_test_vector() {
    let aead = XChaCha20Poly1305;
    let nonce = Nonce::new(hex!("404142434445464748494a4b4c4d4e4f5051525354555657"));
    let aad = hex!("50515253c0c1c2c3c4c5c6c7");

    let sealed = aead.encrypt(SUNSCREEN, &rfc_key(), &nonce, &aad).unwrap();

    assert_eq!(
        sealed.cipher_text(),
        hex!(
            "bd6d179d3e83d43b9576579493c0e939"
            "572a1700252bfaccbed2902c21396cbb"
            "731c7f1b0b4aa6440bf3a82f4eda7e39"
            "ae64c6708c54c216cb96b72e1213b452"
            "2f8c9ba40db5d945b11b69b982c1bb9e"
            "3f3fac2bc369488f76b2383565d3fff9"
            "21f9664c97637da9768812f615c68b13"
            "b52e"
        )
        .as_slice()
    );
    assert_eq!(
        sealed.mac().as_bytes(),
        hex!("c0875924c1c7987947deafd8780acf49")
    );

    assert_eq!(aead.decrypt(&sealed, &rfc_key(), &aad).unwrap(), SUNSCREEN);
}

#[test]
fn round_trips_for_message_lengths() {
    let key = rfc_key();

    for length in [0usize, 1, 63, 64, 65, 128, 500] {
        let message = vec![0x21u8; length];

        let aead = ChaCha20Poly1305;
        let nonce = aead.new_nonce().unwrap();
        assert_eq!(nonce.len(), 12);
        let sealed = aead.encrypt(&message, &key, &nonce, b"ctx").unwrap();
        assert_eq!(aead.decrypt(&sealed, &key, b"ctx").unwrap(), message);

        let xaead = XChaCha20Poly1305;
        let nonce = xaead.new_nonce().unwrap();
        assert_eq!(nonce.len(), 24);
        let sealed = xaead.encrypt(&message, &key, &nonce, b"ctx").unwrap();
        assert_eq!(xaead.decrypt(&sealed, &key, b"ctx").unwrap(), message);
    }
}

#[test]
fn wrong_aad_and_tampered_bytes_fail_closed() {
    let aead = XChaCha20Poly1305;
    let key = rfc_key();
    let nonce = Nonce::new([0x44u8; 24]);

    let sealed = aead.encrypt(SUNSCREEN, &key, &nonce, b"right").unwrap();

    assert_eq!(
        aead.decrypt(&sealed, &key, b"wrong"),
        Err(Error::AuthenticationFailed)
    );

    let mut corrupted = sealed.cipher_text().to_vec();
    corrupted[17] ^= 0x40;
    let forged = SecretBox::new(corrupted, sealed.nonce().clone(), sealed.mac().clone());
    assert_eq!(
        aead.decrypt(&forged, &key, b"right"),
        Err(Error::AuthenticationFailed)
    );

    let mut corrupted_mac = sealed.mac().as_bytes().to_vec();
    corrupted_mac[15] ^= 0x01;
    let forged = SecretBox::new(
        sealed.cipher_text().to_vec(),
        sealed.nonce().clone(),
        Mac::new(corrupted_mac),
    );
    assert_eq!(
        aead.decrypt(&forged, &key, b"right"),
        Err(Error::AuthenticationFailed)
    );
}

#[test]
fn keystream_offsets_are_consistent() {
    let aead = ChaCha20Poly1305;
    let key = rfc_key();
    let nonce = Nonce::new([0x55u8; 12]);
    let message = vec![0x99u8; 300];

    for offset in [1usize, 64, 100, 4096] {
        let sealed = aead.encrypt_at(&message, &key, &nonce, &[], offset).unwrap();
        assert_eq!(
            aead.decrypt_at(&sealed, &key, &[], offset).unwrap(),
            message
        );
    }

    // Distinct offsets shift the keystream.
    let a = aead.encrypt_at(&message, &key, &nonce, &[], 0).unwrap();
    let b = aead.encrypt_at(&message, &key, &nonce, &[], 64).unwrap();
    assert_ne!(a.cipher_text(), b.cipher_text());
    assert_eq!(&a.cipher_text()[64..], &b.cipher_text()[..300 - 64]);
}

#[test]
fn key_and_nonce_lengths_are_validated() {
    let short_key = SecretKey::from_bytes([0u8; 16]);

    assert!(matches!(
        ChaCha20Poly1305.encrypt(b"x", &short_key, &Nonce::new([0u8; 12]), &[]),
        Err(Error::InvalidKeyLength { .. })
    ));
    assert!(matches!(
        XChaCha20Poly1305.encrypt(b"x", &rfc_key(), &Nonce::new([0u8; 12]), &[]),
        Err(Error::InvalidNonceLength { .. })
    ));
}

#[test]
fn destroyed_key_never_encrypts() {
    let mut key = rfc_key();
    key.destroy();

    assert_eq!(
        ChaCha20Poly1305.encrypt(b"x", &key, &Nonce::new([0u8; 12]), &[]),
        Err(Error::KeyDestroyed)
    );
}
