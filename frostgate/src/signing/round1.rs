//! Round 1 - Commitment
//!
//! In the first round, each signer samples a pair of secret nonces and publishes commitments to them.
//! Message to be signed doesn't need to be known at this point.

use core::fmt;

use generic_ec::{Curve, Point, SecretScalar};
use rand_core::{CryptoRng, RngCore};

use crate::{Ciphersuite, KeyShare};

/// Secret nonces `(d, e)`
///
/// Nonces are zeroized on drop. They can not be cloned or copied: [round 2](super::round2::sign)
/// takes them by value, so the same nonces can never be used twice.
pub struct SecretNonces<E: Curve> {
    /// Hiding nonce `d`
    pub hiding_nonce: SecretScalar<E>,
    /// Binding nonce `e`
    pub binding_nonce: SecretScalar<E>,
}

impl<E: Curve> SecretNonces<E> {
    /// Returns public commitments to the nonces
    pub fn public_commitments(&self) -> PublicCommitments<E> {
        PublicCommitments {
            hiding_comm: Point::generator() * &self.hiding_nonce,
            binding_comm: Point::generator() * &self.binding_nonce,
        }
    }
}

impl<E: Curve> fmt::Debug for SecretNonces<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretNonces")
    }
}

/// Public commitments `(D, E)` to the [secret nonces](SecretNonces)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
pub struct PublicCommitments<E: Curve> {
    /// Hiding commitment `D = d * G`
    pub hiding_comm: Point<E>,
    /// Binding commitment `E = e * G`
    pub binding_comm: Point<E>,
}

/// Commits nonces
///
/// Nonces are derived from fresh randomness and the key share, see [`generate_nonce`](crate::ciphersuite::generate_nonce).
///
/// Outputs secret nonces that must be kept secret and used exactly once, and public
/// commitments that need to be sent to other signers.
pub fn commit<C: Ciphersuite>(
    rng: &mut (impl RngCore + CryptoRng),
    key_share: &KeyShare<C::Curve>,
) -> (SecretNonces<C::Curve>, PublicCommitments<C::Curve>) {
    let nonces = SecretNonces {
        hiding_nonce: crate::ciphersuite::generate_nonce::<C>(rng, key_share),
        binding_nonce: crate::ciphersuite::generate_nonce::<C>(rng, key_share),
    };
    let commitments = nonces.public_commitments();
    (nonces, commitments)
}
