mod dkg;

#[generic_tests::define(attrs(test, test_case::case))]
mod generic {
    use frostgate::{
        error::ErrorKind,
        generic_ec::{Point, Scalar},
        signing::{aggregate::Signature, session::SessionState, CommitmentEntry},
        Ciphersuite,
    };
    use frostgate_tests::ExternalVerifier;
    use rand::{seq::SliceRandom, Rng, RngCore};

    #[test_case::case(2, 3, 2; "t2n3")]
    #[test_case::case(3, 3, 3; "t3n3")]
    #[test_case::case(1, 3, 1; "t1n3")]
    #[test_case::case(3, 5, 3; "t3n5")]
    #[test_case::case(3, 5, 4; "t3n5_4signers")]
    #[test_case::case(5, 5, 5; "t5n5")]
    fn keygen_sign<C: Ciphersuite + ExternalVerifier>(t: u16, n: u16, signers_count: usize) {
        let mut rng = rand_dev::DevRng::new();

        let key_shares = frostgate_tests::simulate_dkg::<C>(&mut rng, n, t);
        let key_info = key_shares[0].key_info();
        for key_share in &key_shares {
            assert_eq!(key_share.key_info(), key_info);
            assert_eq!(
                Point::generator() * &key_share.x,
                key_info.public_share(&key_share.id)
            );
        }
        let pk = key_info.group_public_key();

        // Choose signers to perform signing
        let key_holders = (0..usize::from(n)).collect::<Vec<_>>();
        let signers = key_holders
            .choose_multiple(&mut rng, signers_count)
            .copied()
            .collect::<Vec<_>>();

        let message_len = rng.gen_range(20..=100);
        let mut message = vec![0u8; message_len];
        rng.fill_bytes(&mut message);

        let sig_shares =
            frostgate_tests::issue_sig_shares::<C>(&mut rng, &key_shares, &signers, &message);
        let sig = frostgate::signing::aggregate::aggregate::<C>(key_info, &sig_shares, &message)
            .expect("aggregation failed");

        sig.verify(pk, &message).expect("invalid signature");
        C::verify_sig(pk, &sig, &message).expect("external verifier: invalid signature")
    }

    #[test]
    fn hello_world_2_out_of_3<C: Ciphersuite + ExternalVerifier>() {
        let mut rng = rand_dev::DevRng::new();

        let key_shares = frostgate_tests::simulate_dkg::<C>(&mut rng, 3, 2);
        for (i, key_share) in key_shares.iter().enumerate() {
            assert_eq!(*key_share.id, Scalar::from(i as u64 + 1));
        }
        let key_info = key_shares[0].key_info();
        let pk = key_info.group_public_key();

        let msg = b"hello world";
        let sig_shares = frostgate_tests::issue_sig_shares::<C>(&mut rng, &key_shares, &[0, 1], msg);
        let sig = frostgate::signing::aggregate::aggregate::<C>(key_info, &sig_shares, msg)
            .expect("aggregation failed");

        sig.verify(pk, msg).expect("invalid signature");
        C::verify_sig(pk, &sig, msg).expect("external verifier: invalid signature");

        let mut tampered = *msg;
        tampered[0] ^= 1;
        assert!(sig.verify(pk, &tampered).is_err());
        assert!(C::verify_sig(pk, &sig, &tampered).is_err());
    }

    #[test]
    fn each_session_uses_fresh_nonces<C: Ciphersuite + ExternalVerifier>() {
        let mut rng = rand_dev::DevRng::new();

        let key_shares = frostgate_tests::simulate_dkg::<C>(&mut rng, 3, 2);
        let key_info = key_shares[0].key_info();
        let msg = b"same message signed twice";

        let sigs = [(); 2].map(|_| {
            let sig_shares =
                frostgate_tests::issue_sig_shares::<C>(&mut rng, &key_shares, &[0, 2], msg);
            frostgate::signing::aggregate::aggregate::<C>(key_info, &sig_shares, msg)
                .expect("aggregation failed")
        });

        assert_ne!(sigs[0].r, sigs[1].r);
        assert_ne!(sigs[0].z, sigs[1].z);
        for sig in &sigs {
            sig.verify(key_info.group_public_key(), msg)
                .expect("invalid signature");
        }
    }

    #[test]
    fn order_of_signers_doesnt_matter<C: Ciphersuite + ExternalVerifier>() {
        let mut rng = rand_dev::DevRng::new();

        let key_shares = frostgate_tests::simulate_dkg::<C>(&mut rng, 5, 3);
        let key_info = key_shares[0].key_info();
        let msg = b"order of signers doesn't matter";

        // Signers receive commitments in descending order
        let mut sig_shares =
            frostgate_tests::issue_sig_shares::<C>(&mut rng, &key_shares, &[4, 1, 3], msg);
        let sig = frostgate::signing::aggregate::aggregate::<C>(key_info, &sig_shares, msg)
            .expect("aggregation failed");

        sig_shares.reverse();
        let sig2 = frostgate::signing::aggregate::aggregate::<C>(key_info, &sig_shares, msg)
            .expect("aggregation failed");

        assert_eq!(sig.r, sig2.r);
        assert_eq!(sig.z, sig2.z);
        C::verify_sig(key_info.group_public_key(), &sig, msg)
            .expect("external verifier: invalid signature");
    }

    #[test]
    fn invalid_sig_share_is_identified<C: Ciphersuite + ExternalVerifier>() {
        let mut rng = rand_dev::DevRng::new();

        let key_shares = frostgate_tests::simulate_dkg::<C>(&mut rng, 3, 2);
        let key_info = key_shares[0].key_info();
        let msg = b"hello world";

        let mut sig_shares =
            frostgate_tests::issue_sig_shares::<C>(&mut rng, &key_shares, &[0, 1], msg);
        sig_shares[1].2 .0 = sig_shares[1].2 .0 + Scalar::one();

        let err = frostgate::signing::aggregate::aggregate::<C>(key_info, &sig_shares, msg)
            .expect_err("aggregation must fail");
        assert_eq!(err.kind(), ErrorKind::SignatureVerificationFailed);
        assert_eq!(err.culprits(), &[1]);

        let commitments: Vec<CommitmentEntry<C::Curve>> = sig_shares
            .iter()
            .map(|(id, comm, _)| (*id, *comm))
            .collect();
        let (honest_id, _, honest_share) = &sig_shares[0];
        frostgate::signing::aggregate::verify_sig_share::<C>(
            key_info,
            honest_id,
            honest_share,
            &commitments,
            msg,
        )
        .expect("honest share must be valid");
        let (culprit_id, _, culprit_share) = &sig_shares[1];
        let err = frostgate::signing::aggregate::verify_sig_share::<C>(
            key_info,
            culprit_id,
            culprit_share,
            &commitments,
            msg,
        )
        .expect_err("tampered share must be invalid");
        assert_eq!(err.kind(), ErrorKind::SignatureVerificationFailed);
        assert_eq!(err.culprits(), &[1]);
    }

    #[test]
    fn sig_share_on_other_message_fails_aggregation<C: Ciphersuite + ExternalVerifier>() {
        let mut rng = rand_dev::DevRng::new();

        let key_shares = frostgate_tests::simulate_dkg::<C>(&mut rng, 3, 2);
        let key_info = key_shares[0].key_info();
        let msg = b"hello world";

        let (nonces, commitments): (Vec<_>, Vec<CommitmentEntry<C::Curve>>) = key_shares[..2]
            .iter()
            .map(|key_share| {
                let (nonces, comm) = frostgate::signing::round1::commit::<C>(&mut rng, key_share);
                (nonces, (key_share.id, comm))
            })
            .unzip();

        // Signer 1 signs a different message than the one commitments were collected for
        let sig_shares = key_shares[..2]
            .iter()
            .zip(nonces)
            .zip([&msg[..], &b"goodbye world"[..]])
            .zip(&commitments)
            .map(|(((key_share, nonces), signed_msg), &(id, comm))| {
                let sig_share =
                    frostgate::signing::round2::sign::<C>(key_share, nonces, signed_msg, &commitments)
                        .expect("signing failed");
                (id, comm, sig_share)
            })
            .collect::<Vec<_>>();

        let err = frostgate::signing::aggregate::aggregate::<C>(key_info, &sig_shares, msg)
            .expect_err("aggregation must fail");
        assert_eq!(err.kind(), ErrorKind::SignatureVerificationFailed);
        assert_eq!(err.culprits(), &[1]);
    }

    #[test]
    fn signer_rejects_nonce_reuse<C: Ciphersuite + ExternalVerifier>() {
        let mut rng = rand_dev::DevRng::new();

        let key_shares = frostgate_tests::simulate_dkg::<C>(&mut rng, 3, 2);
        let key_info = key_shares[0].key_info();
        let msg = b"hello world";

        let mut signers = key_shares[..2]
            .iter()
            .map(frostgate::signing::session::Signer::<C>::new)
            .collect::<Vec<_>>();

        // Round 2 before Round 1
        let err = signers[0]
            .round2(msg, &[])
            .expect_err("round 2 without round 1 must fail");
        assert_eq!(err.kind(), ErrorKind::IncompleteSession);
        assert_eq!(signers[0].state(), SessionState::Idle);

        let commitments = key_shares[..2]
            .iter()
            .zip(&mut signers)
            .map(|(key_share, signer)| (key_share.id, signer.round1(&mut rng)))
            .collect::<Vec<_>>();
        assert!(signers
            .iter()
            .all(|signer| signer.state() == SessionState::Round1Done));
        assert_eq!(signers[0].commitments(), Some(commitments[0].1));

        let sig_shares = signers
            .iter_mut()
            .zip(&commitments)
            .map(|(signer, &(id, comm))| {
                let sig_share = signer.round2(msg, &commitments).expect("signing failed");
                (id, comm, sig_share)
            })
            .collect::<Vec<_>>();
        assert_eq!(signers[0].state(), SessionState::Round2Done);
        assert_eq!(signers[0].commitments(), None);

        let sig: Signature<C> =
            frostgate::signing::aggregate::aggregate(key_info, &sig_shares, msg)
                .expect("aggregation failed");
        C::verify_sig(key_info.group_public_key(), &sig, msg)
            .expect("external verifier: invalid signature");

        // The same nonces can't be used to sign another message
        let err = signers[0]
            .round2(b"another message", &commitments)
            .expect_err("nonce reuse must be rejected");
        assert_eq!(err.kind(), ErrorKind::NonceReuse);

        // New session starts from Round 1
        signers[0].round1(&mut rng);
        assert_eq!(signers[0].state(), SessionState::Round1Done);
    }

    #[test]
    fn repeated_round1_invalidates_previous_commitments<C: Ciphersuite + ExternalVerifier>() {
        let mut rng = rand_dev::DevRng::new();

        let key_shares = frostgate_tests::simulate_dkg::<C>(&mut rng, 3, 2);
        let msg = b"hello world";

        let mut signer = frostgate::signing::session::Signer::<C>::new(&key_shares[0]);
        let stale = signer.round1(&mut rng);
        let fresh = signer.round1(&mut rng);
        assert_ne!(stale, fresh);
        assert_eq!(signer.commitments(), Some(fresh));
        assert_eq!(signer.state(), SessionState::Round1Done);

        let (_, other) = frostgate::signing::round1::commit::<C>(&mut rng, &key_shares[1]);
        let commitments = [(key_shares[0].id, stale), (key_shares[1].id, other)];
        let err = signer
            .round2(msg, &commitments)
            .expect_err("stale commitment must be rejected");
        assert_eq!(err.kind(), ErrorKind::InvalidParticipant);
        assert_eq!(signer.state(), SessionState::Round2Done);
    }

    #[test]
    fn signing_rejects_invalid_signers_list<C: Ciphersuite + ExternalVerifier>() {
        let mut rng = rand_dev::DevRng::new();

        let key_shares = frostgate_tests::simulate_dkg::<C>(&mut rng, 3, 2);
        let msg = b"hello world";

        let (nonces, comm) = frostgate::signing::round1::commit::<C>(&mut rng, &key_shares[0]);
        let err = frostgate::signing::round2::sign::<C>(&key_shares[0], nonces, msg, &[])
            .expect_err("empty list of signers");
        assert_eq!(err.kind(), ErrorKind::EmptyCommitmentSet);

        let (nonces, _) = frostgate::signing::round1::commit::<C>(&mut rng, &key_shares[0]);
        let err = frostgate::signing::round2::sign::<C>(
            &key_shares[0],
            nonces,
            msg,
            &[(key_shares[0].id, comm)],
        )
        .expect_err("too few signers");
        assert_eq!(err.kind(), ErrorKind::InvalidParticipant);

        let (nonces, comm) = frostgate::signing::round1::commit::<C>(&mut rng, &key_shares[0]);
        let err = frostgate::signing::round2::sign::<C>(
            &key_shares[0],
            nonces,
            msg,
            &[(key_shares[0].id, comm), (key_shares[0].id, comm)],
        )
        .expect_err("same signer twice");
        assert_eq!(err.kind(), ErrorKind::InvalidParticipant);

        let err = frostgate::signing::aggregate::aggregate::<C>(key_shares[0].key_info(), &[], msg)
            .expect_err("empty list of signers");
        assert_eq!(err.kind(), ErrorKind::EmptyCommitmentSet);
    }

    #[test]
    fn reconstruct_secret_key<C: Ciphersuite + ExternalVerifier>() {
        let mut rng = rand_dev::DevRng::new();

        let mut key_shares = frostgate_tests::simulate_dkg::<C>(&mut rng, 5, 3);
        key_shares.shuffle(&mut rng);
        let pk = *key_shares[0].group_public_key();

        let sk = frostgate::reconstruct_secret_key(&key_shares[..3]).expect("reconstruct key");
        assert_eq!(Point::generator() * &sk, *pk);

        let err = frostgate::reconstruct_secret_key(&key_shares[..2])
            .expect_err("not enough key shares");
        assert_eq!(err.kind(), ErrorKind::InvalidParticipant);
    }

    #[test]
    fn signature_serialization<C: Ciphersuite + ExternalVerifier>() {
        let mut rng = rand_dev::DevRng::new();

        let key_shares = frostgate_tests::simulate_dkg::<C>(&mut rng, 2, 2);
        let key_info = key_shares[0].key_info();
        let msg = b"hello world";

        let sig_shares = frostgate_tests::issue_sig_shares::<C>(&mut rng, &key_shares, &[0, 1], msg);
        let sig = frostgate::signing::aggregate::aggregate::<C>(key_info, &sig_shares, msg)
            .expect("aggregation failed");

        let bytes = sig.to_bytes();
        assert_eq!(bytes.len(), Signature::<C>::serialized_len());
        let mut written = vec![0u8; Signature::<C>::serialized_len()];
        sig.write_to_slice(&mut written).expect("write signature");
        assert_eq!(bytes, written);

        let parsed = Signature::<C>::read_from_slice(&bytes).expect("parse signature");
        assert_eq!(parsed.r, sig.r);
        assert_eq!(parsed.z, sig.z);
        assert!(Signature::<C>::read_from_slice(&bytes[1..]).is_none());

        let json = serde_json::to_string(key_info).expect("serialize key info");
        let key_info2: frostgate::KeyInfo<C::Curve> =
            serde_json::from_str(&json).expect("deserialize key info");
        assert_eq!(*key_info, key_info2);
    }

    #[test]
    fn tampered_key_info_is_rejected<C: Ciphersuite + ExternalVerifier>() {
        let mut rng = rand_dev::DevRng::new();

        let key_shares = frostgate_tests::simulate_dkg::<C>(&mut rng, 3, 2);
        let other_key_shares = frostgate_tests::simulate_dkg::<C>(&mut rng, 3, 2);
        let json = serde_json::to_value(key_shares[0].key_info()).unwrap();

        let parse = |json: serde_json::Value| {
            serde_json::from_value::<frostgate::KeyInfo<C::Curve>>(json)
        };
        assert_eq!(&parse(json.clone()).unwrap(), key_shares[0].key_info());

        // Identifiers aren't sorted
        let mut tampered = json.clone();
        tampered["ids"].as_array_mut().unwrap().reverse();
        assert!(parse(tampered).is_err());

        // Identifiers aren't distinct
        let mut tampered = json.clone();
        let ids = tampered["ids"].as_array_mut().unwrap();
        ids[1] = ids[0].clone();
        assert!(parse(tampered).is_err());

        // Group public key doesn't match the commitments
        let mut tampered = json.clone();
        tampered["group_public_key"] =
            serde_json::to_value(other_key_shares[0].group_public_key()).unwrap();
        assert!(parse(tampered).is_err());

        // Threshold is out of range
        for threshold in [0, 4] {
            let mut tampered = json.clone();
            tampered["threshold"] = threshold.into();
            assert!(parse(tampered).is_err());
        }

        // Number of commitments doesn't match threshold
        let mut tampered = json;
        tampered["commitments"].as_array_mut().unwrap().pop();
        assert!(parse(tampered).is_err());
    }

    #[instantiate_tests(<frostgate::ciphersuite::Secp256k1Keccak>)]
    mod secp256k1_keccak {}
    #[instantiate_tests(<frostgate::ciphersuite::Ed25519>)]
    mod ed25519 {}
}
