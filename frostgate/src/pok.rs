//! Schnorr proof of knowledge of a discrete logarithm
//!
//! DKG participant attaches the proof to its public key to show that it knows the secret behind
//! it. It prevents rogue-key attacks where a participant picks its public key as a function
//! of other participants' keys.

use core::fmt;

use generic_ec::{Point, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};

use crate::Ciphersuite;

/// Proof of knowledge of a secret `x` such that `P = x * G`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
pub struct ProofOfKnowledge<E: generic_ec::Curve> {
    /// Commitment `R = r * G`
    pub commitment: Point<E>,
    /// Response `s = r + c * x`
    pub response: Scalar<E>,
}

impl<E: generic_ec::Curve> ProofOfKnowledge<E> {
    /// Proves knowledge of `secret`
    ///
    /// Challenge is derived as `c = H2(R || P)`, no message is bound.
    pub fn prove<C: Ciphersuite<Curve = E>>(
        rng: &mut (impl RngCore + CryptoRng),
        secret: &SecretScalar<E>,
    ) -> Self {
        let r = SecretScalar::<E>::random(rng);
        let commitment = Point::generator() * &r;
        let public_key = Point::generator() * secret;

        let challenge = C::compute_challenge(&public_key, &commitment, None);
        let response = r.as_ref() + challenge * secret.as_ref();

        Self {
            commitment,
            response,
        }
    }

    /// Verifies the proof against `public_key`
    ///
    /// Checks that `s * G == R + c * P`
    pub fn verify<C: Ciphersuite<Curve = E>>(
        &self,
        public_key: &Point<E>,
    ) -> Result<(), InvalidProof> {
        let challenge = C::compute_challenge(public_key, &self.commitment, None);

        let lhs = Point::generator() * self.response;
        let rhs = self.commitment + public_key * challenge;

        if lhs == rhs {
            Ok(())
        } else {
            Err(InvalidProof)
        }
    }
}

/// Proof of knowledge is invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidProof;

impl InvalidProof {
    /// Kind of the error, always [`ErrorKind::InvalidProof`](crate::error::ErrorKind::InvalidProof)
    pub fn kind(&self) -> crate::error::ErrorKind {
        crate::error::ErrorKind::InvalidProof
    }
}

impl fmt::Display for InvalidProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid proof of knowledge")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidProof {}
