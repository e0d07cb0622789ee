//! Fixture vectors for the full derivation pipeline.
//!
//! Signature: 32 bytes of 0x01 followed by 32 bytes of 0x02.
//! Any change to these values is a change to the key space.

use crate::{
    compute_shared_secret, derive_dh_keypair, derive_meta_address, derive_meta_keys,
    derive_stealth_address, derive_stealth_keypair, spend_public_key,
};
use proptest::prelude::*;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn fixture_signature() -> Vec<u8> {
    let mut sig = vec![0x01u8; 32];
    sig.extend_from_slice(&[0x02u8; 32]);
    sig
}

#[test]
fn test_vector_scan_keypair() {
    let kp = derive_dh_keypair(&[0x01; 32]);
    assert_eq!(
        hex::encode(kp.secret.as_array()),
        "58e86efb75fa4e2c410f46e16de9f6acae1a1703528651b69bc176c088bef36e"
    );
    assert_eq!(
        kp.public.to_hex(),
        "1b1b58dd50ea14b60da17b790cd02754d970c9bab864ebb3c0f3016fe51d3f57"
    );
}

#[test]
fn test_vector_ephemeral_public_key() {
    let eph = derive_dh_keypair(&[0x03; 32]);
    assert_eq!(
        eph.public.to_hex(),
        "75e270df2952c57ba8367ba8618c178f9fe50db2799d304e74e918d985686146"
    );
    assert_eq!(eph.public.to_base58(), "8wAy336b7gkm79Yx1p1GPXRe5KpTWhrG2nDBuMjTh5jK");
}

#[test]
fn test_vector_shared_secret_both_sides() {
    let scan = derive_dh_keypair(&[0x01; 32]);
    let eph = derive_dh_keypair(&[0x03; 32]);

    let sender = compute_shared_secret(&eph.secret, scan.public.as_bytes()).unwrap();
    let recipient = compute_shared_secret(&scan.secret, eph.public.as_bytes()).unwrap();

    assert_eq!(
        hex::encode(sender.as_bytes()),
        "eac5960bca4742e475f85d653f7a8088e6942e7b9527533d2292cd4b9925a539"
    );
    assert_eq!(sender, recipient);
}

#[test]
fn test_vector_stealth_address() {
    let seeds = derive_meta_keys(&fixture_signature()).unwrap();
    let meta = derive_meta_address(&seeds);

    let eph = derive_dh_keypair(&[0x03; 32]);
    let shared = compute_shared_secret(&eph.secret, meta.scan_public_key.as_bytes()).unwrap();
    let address = derive_stealth_address(&shared, &meta.spend_public_key);
    assert_eq!(
        address.to_hex(),
        "df6ea45eca72e2c80322035b74c11fecfb81fb0c26e010566fe37eefcabe6a42"
    );
    assert_eq!(address.to_base58(), "G3BmbwztpLAj5eJcyScmFEVG6mRr8YBxJGjbKiyCc7TX");

    let eph2 = derive_dh_keypair(&[0x04; 32]);
    assert_eq!(eph2.public.to_base58(), "H1KnqQsYSSP7oaseCAjqioVUq9h1j4u5F5ctUf9qq7HY");
    let shared2 = compute_shared_secret(&eph2.secret, meta.scan_public_key.as_bytes()).unwrap();
    assert_eq!(
        derive_stealth_address(&shared2, &meta.spend_public_key).to_base58(),
        "6WWJxVYtXfk8aPPJrARh2tHVGtTWCVpFbb8TnxUGURFn"
    );
}

#[test]
fn test_unlinkability_random_trials() {
    let mut rng = ChaCha20Rng::seed_from_u64(0x5eed);
    let scan = derive_dh_keypair(&[0x01; 32]);
    let spend = spend_public_key(&[0x02; 32]);

    let mut seen = std::collections::HashSet::new();
    for _ in 0..16 {
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        let eph = derive_dh_keypair(&seed);
        let shared = compute_shared_secret(&eph.secret, scan.public.as_bytes()).unwrap();
        assert!(seen.insert(derive_stealth_address(&shared, &spend)));
    }
}

proptest! {
    #[test]
    fn prop_recipient_recovers_sender_address(
        scan_seed in prop::array::uniform32(any::<u8>()),
        spend_seed in prop::array::uniform32(any::<u8>()),
        eph_seed in prop::array::uniform32(any::<u8>()),
    ) {
        let scan = derive_dh_keypair(&scan_seed);
        let spend = spend_public_key(&spend_seed);
        let eph = derive_dh_keypair(&eph_seed);

        let sent = compute_shared_secret(&eph.secret, scan.public.as_bytes()).unwrap();
        let address = derive_stealth_address(&sent, &spend);

        let received = compute_shared_secret(&scan.secret, eph.public.as_bytes()).unwrap();
        let keypair = derive_stealth_keypair(&received, &spend);
        prop_assert_eq!(keypair.address(), address);
    }

    #[test]
    fn prop_wrong_scan_key_misses(
        (scan_a, scan_b) in (prop::array::uniform32(any::<u8>()), prop::array::uniform32(any::<u8>()))
            .prop_filter("distinct seeds", |(a, b)| a != b),
        eph_seed in prop::array::uniform32(any::<u8>()),
    ) {
        let spend = spend_public_key(&[0x02; 32]);
        let a = derive_dh_keypair(&scan_a);
        let b = derive_dh_keypair(&scan_b);
        let eph = derive_dh_keypair(&eph_seed);

        let sent = compute_shared_secret(&eph.secret, a.public.as_bytes()).unwrap();
        let wrong = compute_shared_secret(&b.secret, eph.public.as_bytes()).unwrap();
        prop_assert_ne!(derive_stealth_address(&sent, &spend), derive_stealth_address(&wrong, &spend));
    }
}
