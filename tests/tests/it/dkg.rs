use frostgate::{
    keygen::{participant_id, Participant},
    Ciphersuite,
};

fn participants<C: Ciphersuite>(rng: &mut rand_dev::DevRng, n: u16, t: u16) -> Vec<Participant<C>> {
    (0..n)
        .map(|i| {
            let id = participant_id::<C::Curve>(i).unwrap();
            Participant::<C>::new(&mut *rng, *id, t).unwrap()
        })
        .collect()
}

#[generic_tests::define(attrs(test))]
mod generic {
    use frostgate::{
        error::ErrorKind,
        generic_ec::{Point, Scalar, SecretScalar},
        keygen::{participant_id, Ceremony, Participant},
        pok::ProofOfKnowledge,
        Ciphersuite,
    };

    #[test]
    fn ceremony_rejects_invalid_dealers<C: Ciphersuite>() {
        let mut rng = rand_dev::DevRng::new();
        let participants = super::participants::<C>(&mut rng, 3, 2);

        let mut ceremony = Ceremony::<C>::new(3, 2).unwrap();

        // Proof of knowledge doesn't verify
        let mut forged = participants[0].commitment().clone();
        forged.proof.response = forged.proof.response + Scalar::one();
        let err = ceremony.accept(forged).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidProof);

        // Proof is valid, but for another key
        let mut forged = participants[0].commitment().clone();
        forged.proof = participants[1].commitment().proof;
        let err = ceremony.accept(forged).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidProof);

        // Polynomial of wrong degree
        let id = participant_id::<C::Curve>(0).unwrap();
        let wrong_degree = Participant::<C>::new(&mut rng, *id, 3).unwrap();
        let err = ceremony
            .accept(wrong_degree.commitment().clone())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParticipant);

        ceremony
            .accept(participants[0].commitment().clone())
            .unwrap();
        assert_eq!(ceremony.admitted(), 1);

        // Same dealer twice
        let err = ceremony
            .accept(participants[0].commitment().clone())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParticipant);
        assert_eq!(ceremony.admitted(), 1);

        // Not all dealers are admitted
        let err = ceremony.finish().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParticipant);
    }

    #[test]
    fn invalid_threshold<C: Ciphersuite>() {
        let mut rng = rand_dev::DevRng::new();

        assert!(Ceremony::<C>::new(3, 0).is_err());
        assert!(Ceremony::<C>::new(3, 4).is_err());

        let err = Participant::<C>::new(&mut rng, Scalar::one(), 0)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidParticipant);
        let err = Participant::<C>::new(&mut rng, Scalar::zero(), 2)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidParticipant);
    }

    #[test]
    fn tampered_share_is_rejected<C: Ciphersuite>() {
        let mut rng = rand_dev::DevRng::new();
        let participants = super::participants::<C>(&mut rng, 3, 2);

        let mut ceremony = Ceremony::<C>::new(3, 2).unwrap();
        for participant in &participants {
            ceremony.accept(participant.commitment().clone()).unwrap();
        }
        let transcript = ceremony.finish().unwrap();

        let recipient = participants[2].id();
        let shares = participants
            .iter()
            .map(|dealer| (dealer.id(), dealer.share_for(&recipient)))
            .collect::<Vec<_>>();
        for (dealer, share) in &shares {
            transcript
                .verify_share(dealer, &recipient, share.as_ref())
                .unwrap();
        }

        let mut tampered = shares.clone();
        let mut share = *tampered[0].1.as_ref() + Scalar::one();
        tampered[0].1 = SecretScalar::new(&mut share);
        let err = transcript.combine(recipient, tampered).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidShare);

        // Share destined to another participant
        let wrong_recipient = participants[0].share_for(&participants[1].id());
        let err = transcript
            .verify_share(&participants[0].id(), &recipient, wrong_recipient.as_ref())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidShare);

        let err = transcript
            .combine(recipient, shares[..2].iter().cloned())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParticipant);

        let key_share = transcript.combine(recipient, shares).unwrap();
        assert_eq!(key_share.id, recipient);
        assert_eq!(
            *key_share.group_public_key(),
            *transcript.key_info().unwrap().group_public_key()
        );
    }

    #[test]
    fn group_key_is_sum_of_dealers_keys<C: Ciphersuite>() {
        let mut rng = rand_dev::DevRng::new();
        let participants = super::participants::<C>(&mut rng, 4, 3);

        let mut ceremony = Ceremony::<C>::new(4, 3).unwrap();
        // Dealers are admitted in arbitrary order
        for participant in participants.iter().rev() {
            ceremony.accept(participant.commitment().clone()).unwrap();
        }
        let transcript = ceremony.finish().unwrap();
        let key_info = transcript.key_info().unwrap();

        let expected = participants
            .iter()
            .map(|p| p.public_key())
            .fold(Point::zero(), |acc, pk| acc + pk);
        assert_eq!(**key_info.group_public_key(), expected);
        assert_eq!(key_info.threshold(), 3);
        assert_eq!(key_info.n(), 4);
        assert_eq!(key_info.ids()[0], participants[0].id());
        let json = serde_json::to_string(&transcript).unwrap();
        let transcript2: frostgate::keygen::Transcript<C::Curve> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(transcript, transcript2);
    }

    #[test]
    fn tampered_transcript_is_rejected<C: Ciphersuite>() {
        let mut rng = rand_dev::DevRng::new();
        let participants = super::participants::<C>(&mut rng, 3, 2);

        let mut ceremony = Ceremony::<C>::new(3, 2).unwrap();
        for participant in &participants {
            ceremony.accept(participant.commitment().clone()).unwrap();
        }
        let transcript = ceremony.finish().unwrap();
        let json = serde_json::to_value(&transcript).unwrap();

        let parse = |json: serde_json::Value| {
            serde_json::from_value::<frostgate::keygen::Transcript<C::Curve>>(json)
        };
        assert_eq!(parse(json.clone()).unwrap(), transcript);

        // Dealers aren't sorted by identifier
        let mut tampered = json.clone();
        tampered["dealers"].as_array_mut().unwrap().reverse();
        assert!(parse(tampered).is_err());

        // Same dealer twice
        let mut tampered = json.clone();
        let dealers = tampered["dealers"].as_array_mut().unwrap();
        dealers[1] = dealers[0].clone();
        assert!(parse(tampered).is_err());

        // Threshold exceeds number of dealers
        let mut tampered = json.clone();
        tampered["threshold"] = 4.into();
        assert!(parse(tampered).is_err());

        // Dealer polynomial of wrong degree
        let mut tampered = json;
        tampered["dealers"][2]["commitments"]
            .as_array_mut()
            .unwrap()
            .pop();
        assert!(parse(tampered).is_err());
    }

    #[test]
    fn proof_of_knowledge<C: Ciphersuite>() {
        let mut rng = rand_dev::DevRng::new();

        let secret = SecretScalar::<C::Curve>::random(&mut rng);
        let public_key = Point::generator() * &secret;
        let proof = ProofOfKnowledge::prove::<C>(&mut rng, &secret);
        proof.verify::<C>(&public_key).unwrap();

        let another_key = public_key + Point::generator() * Scalar::<C::Curve>::one();
        let err = proof.verify::<C>(&another_key).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidProof);
    }

    #[instantiate_tests(<frostgate::ciphersuite::Secp256k1Keccak>)]
    mod secp256k1_keccak {}
    #[instantiate_tests(<frostgate::ciphersuite::Ed25519>)]
    mod ed25519 {}
}
