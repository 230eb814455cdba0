//! End-to-end scenarios exercising the whole workspace together: keys, HD
//! derivation, mnemonics, transactions and signed messages composed the way
//! a wallet application actually calls them, each checked against a literal
//! expected value rather than only a round trip.

use doge_keys::hd::ExtendedKey;
use doge_keys::PrivateKey;
use doge_msg::{sign_message, verify_message};
use doge_script::OP_CHECKSIG;
use doge_tx::{compute_sighash, sign_all_inputs, Transaction, SIGHASH_ALL};
use doge_types::{ChainParams, Network};
use doge_wallet::{derive_from_xpriv, gen_from_mnemonic, verify_p2pkh, verify_priv_pub};

#[test]
fn s1_wif_decodes_to_the_expected_compressed_pubkey_and_verifies() {
    let params = ChainParams::for_network(Network::Main);
    let wif = "QUaohmokNWroj71dRtmPSses5eRw5SGLKsYSRSVisJHyZdxhdDCZ";
    let expected_pubkey = "024c33fbb2f6accde1db907e88ebf5dd1693e31433c62aaeef42f7640974f602ba";

    let key = PrivateKey::from_wif(wif, &params).unwrap();
    let pubkey_hex = hex::encode(key.public_key(true).serialize());
    assert_eq!(pubkey_hex, expected_pubkey);

    let address = key.public_key(true).p2pkh_address(&params);
    assert!(verify_priv_pub(wif, &address, false));
    assert!(verify_p2pkh(&address));
}

#[test]
fn s2_bip32_root_from_seed_matches_expected_node() {
    let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
    let root = ExtendedKey::from_seed(&seed).unwrap();

    let doge_keys::hd::KeyMaterial::Private(sk) = &root.key else {
        panic!("root must hold a private key")
    };
    assert_eq!(hex::encode(sk.as_bytes()), "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35");
    assert_eq!(hex::encode(root.meta.chain_code), "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508");

    let params = ChainParams::for_network(Network::Main);
    assert!(root.to_base58(&params).starts_with("dgpv51eADS3spNJh9"));
}

#[test]
fn s3_bip44_derivation_from_s2_master_matches_expected_wif_and_address() {
    let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
    let root = ExtendedKey::from_seed(&seed).unwrap();
    let params = ChainParams::for_network(Network::Main);

    let child = root.derive_path("m/44'/3'/0'/0/0").unwrap();
    let doge_keys::hd::KeyMaterial::Private(child_sk) = &child.key else {
        panic!("derived leaf must hold a private key")
    };

    assert_eq!(child_sk.to_wif(&params), "QNvtKnf9Qi7jCRiPNsHhvibNo6P5rSHR1zsg3MvaZVomB2J3VnAG");
    assert_eq!(child.public_key().p2pkh_address(&params), "DCm7oSg95sxwn3sWxYUDHgKKbB2mDmuR3B");

    // derive_from_xpriv resolves the same leaf starting only from the root's
    // base58 serialization, without needing the caller to say which network.
    let xpriv = root.to_base58(&params);
    assert_eq!(derive_from_xpriv(&xpriv, "m/44'/3'/0'/0/0").unwrap(), "DCm7oSg95sxwn3sWxYUDHgKKbB2mDmuR3B");
}

#[test]
fn s4_mnemonic_to_address_matches_testnet_and_mainnet_external_zero() {
    let mnemonic = "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo vote";

    let (testnet_xpriv, testnet_addr) = gen_from_mnemonic(mnemonic, "", 0, 0, 0, true).unwrap();
    assert!(testnet_xpriv.starts_with("tprv"));
    assert_eq!(testnet_addr, "naTzLkBZLpUVXykb3sSP1Wzzz9GzzM4BVU");

    let (_, main_addr) = gen_from_mnemonic(mnemonic, "", 0, 0, 0, false).unwrap();
    assert_eq!(main_addr, "DTdKu8YgcxoXyjFCDtCeKimaZzsK27rcwT");
}

#[test]
fn s5_transaction_build_and_sign_produces_verifying_signatures() {
    let params = ChainParams::for_network(Network::Testnet);
    let mut wtx = doge_tx::WorkingTx::new();
    wtx.add_utxo("b4455e7b00000000000000000000000000000000000000000000000000000000", 1).unwrap();
    wtx.add_utxo("42113bdc00000000000000000000000000000000000000000000000000000000", 1).unwrap();
    wtx.add_output("nbGfXLskPh7eM1iG5zz5EfDkkNTo9TRmde", "5.0", &params).unwrap();

    let hex_tx = wtx
        .finalize("nbGfXLskPh7eM1iG5zz5EfDkkNTo9TRmde", "0.00226", "12.0", "noxKJyGPugPRN4wqvrwsrtYXuQCk7yQEsy", &params)
        .unwrap();
    let mut tx = Transaction::from_hex(&hex_tx).unwrap();
    assert_eq!(tx.vout.len(), 2);

    let prev_script = hex::decode("76a914d8c43e6f68ca4ea1e9b93da2d1e3a95118fa4a7c88ac").unwrap();
    assert_eq!(*prev_script.last().unwrap(), OP_CHECKSIG);
    let wif = "ci5prbqz7jXyFPVWKkHhPq4a9N8Dag3TpeRfuqqC2Nfr7gSqx1fy";
    let key = PrivateKey::from_wif(wif, &params).unwrap();

    sign_all_inputs(&mut tx, &[prev_script.clone(), prev_script.clone()], SIGHASH_ALL, &key).unwrap();

    for (i, txin) in tx.vin.iter().enumerate() {
        let instructions = doge_script::parse(&txin.script_sig).unwrap();
        let der_with_hashtype = instructions[0].push_data.as_ref().unwrap();
        let der = &der_with_hashtype[..der_with_hashtype.len() - 1];
        assert_eq!(*der_with_hashtype.last().unwrap(), SIGHASH_ALL);

        let sighash = compute_sighash(&tx, &prev_script, i, SIGHASH_ALL);
        assert!(doge_keys::verify_der(&key.public_key(true), &sighash.0, der));
    }
}

#[test]
fn s6_signed_message_round_trip_and_tamper_detection() {
    let params = ChainParams::for_network(Network::Main);
    let wif = "QUaohmokNWroj71dRtmPSses5eRw5SGLKsYSRSVisJHyZdxhdDCZ";
    let key = PrivateKey::from_wif(wif, &params).unwrap();
    let address = key.public_key(true).p2pkh_address(&params);

    let envelope = sign_message(&key, "hello", true).unwrap();
    assert!(verify_message(&envelope, "hello", &address).unwrap());

    let mut tampered = envelope.into_bytes();
    let mid = tampered.len() / 2;
    tampered[mid] = if tampered[mid] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(tampered).unwrap();
    assert!(!verify_message(&tampered, "hello", &address).unwrap_or(false));
}
