use frostgate::{
    generic_ec::{NonZero, Point},
    keygen::{participant_id, Ceremony, Participant},
    signing::{aggregate::Signature, aggregate::SignerEntry},
    Ciphersuite, KeyShare,
};
use rand_core::{CryptoRng, RngCore};

pub trait ExternalVerifier: Ciphersuite {
    type InvalidSig: core::fmt::Debug;

    fn verify_sig(
        pk: &NonZero<Point<Self::Curve>>,
        sig: &Signature<Self>,
        msg: &[u8],
    ) -> Result<(), Self::InvalidSig>;
}

#[derive(Debug)]
pub enum InvalidSignature {
    Point(k256::elliptic_curve::Error),
    Scalar,
    Mismatch,
}

impl ExternalVerifier for frostgate::ciphersuite::Ed25519 {
    type InvalidSig = ed25519::SignatureError;

    fn verify_sig(
        pk: &NonZero<Point<Self::Curve>>,
        sig: &Signature<Self>,
        msg: &[u8],
    ) -> Result<(), ed25519::SignatureError> {
        let pk = ed25519::VerifyingKey::from_bytes(
            &Self::serialize_point(pk)
                .as_bytes()
                .try_into()
                .expect("wrong size of pk"),
        )
        .expect("invalid pk");
        let sig = ed25519::Signature::from_slice(&sig.to_bytes())?;

        pk.verify_strict(msg, &sig)
    }
}

/// Verifies the signature the way an EVM contract does: `z * G == R + keccak256(R || P || msg) * P`,
/// points being encoded as 64 bytes `x || y`
impl ExternalVerifier for frostgate::ciphersuite::Secp256k1Keccak {
    type InvalidSig = InvalidSignature;

    fn verify_sig(
        pk: &NonZero<Point<Self::Curve>>,
        sig: &Signature<Self>,
        msg: &[u8],
    ) -> Result<(), Self::InvalidSig> {
        use k256::elliptic_curve::{ops::Reduce, sec1::ToEncodedPoint, PrimeField};
        use sha3::Digest;

        let pk = k256::PublicKey::from_sec1_bytes(pk.to_bytes(false).as_ref())
            .map_err(InvalidSignature::Point)?;
        let r = k256::PublicKey::from_sec1_bytes(sig.r.to_bytes(false).as_ref())
            .map_err(InvalidSignature::Point)?;
        let z = k256::FieldBytes::clone_from_slice(sig.z.to_be_bytes().as_ref());
        let z = Option::<k256::Scalar>::from(k256::Scalar::from_repr(z))
            .ok_or(InvalidSignature::Scalar)?;

        let challenge = sha3::Keccak256::new()
            .chain_update(&r.to_encoded_point(false).as_bytes()[1..])
            .chain_update(&pk.to_encoded_point(false).as_bytes()[1..])
            .chain_update(msg)
            .finalize();
        let challenge = <k256::Scalar as Reduce<k256::U256>>::reduce_bytes(&challenge);

        let lhs = k256::ProjectivePoint::GENERATOR * z;
        let rhs = r.to_projective() + pk.to_projective() * challenge;
        if lhs == rhs {
            Ok(())
        } else {
            Err(InvalidSignature::Mismatch)
        }
    }
}

/// Carries out DKG among `n` parties in one place
///
/// Returns key shares ordered by participant index
pub fn simulate_dkg<C: Ciphersuite>(
    rng: &mut (impl RngCore + CryptoRng),
    n: u16,
    t: u16,
) -> Vec<KeyShare<C::Curve>> {
    let participants = (0..n)
        .map(|i| {
            let id = participant_id::<C::Curve>(i).expect("id overflow");
            Participant::<C>::new(&mut *rng, *id, t).expect("create participant")
        })
        .collect::<Vec<_>>();

    let mut ceremony = Ceremony::<C>::new(n, t).expect("start ceremony");
    for participant in &participants {
        ceremony
            .accept(participant.commitment().clone())
            .expect("admit dealer");
    }
    let transcript = ceremony.finish().expect("finish ceremony");

    participants
        .iter()
        .map(|recipient| {
            let received = participants
                .iter()
                .map(|dealer| (dealer.id(), dealer.share_for(&recipient.id())));
            transcript
                .combine(recipient.id(), received)
                .expect("combine shares")
        })
        .collect()
}

/// Executes round 1 and round 2 of signing for each of `signers`
///
/// `signers` are indexes of key shares. Returns signers entries ready to be aggregated, in the
/// same order as `signers`.
pub fn issue_sig_shares<C: Ciphersuite>(
    rng: &mut (impl RngCore + CryptoRng),
    key_shares: &[KeyShare<C::Curve>],
    signers: &[usize],
    msg: &[u8],
) -> Vec<SignerEntry<C::Curve>> {
    let (secret_nonces, public_commitments): (Vec<_>, Vec<_>) = signers
        .iter()
        .map(|&j| {
            let key_share = &key_shares[j];
            let (nonces, commitments) =
                frostgate::signing::round1::commit::<C>(&mut *rng, key_share);
            (nonces, (key_share.id, commitments))
        })
        .unzip();

    public_commitments
        .iter()
        .zip(secret_nonces)
        .zip(signers)
        .map(|((&(id, comm), nonces), &j)| {
            let sig_share = frostgate::signing::round2::sign::<C>(
                &key_shares[j],
                nonces,
                msg,
                &public_commitments,
            )
            .expect("signing failed");
            (id, comm, sig_share)
        })
        .collect()
}
