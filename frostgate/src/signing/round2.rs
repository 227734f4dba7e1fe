//! Round 2 - Signing
//!
//! In the second round, each signer signs a message and obtains a [signature share](SigShare).
//!
//! For more details, refer to [parent module](super) docs.

use alloc::vec::Vec;
use core::fmt;

use generic_ec::{Curve, Scalar};

use crate::{
    ciphersuite::Ciphersuite, error::ErrorKind, lagrange::InterpolationSingularity, KeyShare,
};

use super::{
    round1::SecretNonces,
    utils::{self, CommitmentEntry},
};

/// Partial signature
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
pub struct SigShare<E: Curve>(pub Scalar<E>);

/// Issues a partial signature on the `msg`
///
/// Inputs:
/// * `key_share` which will be used for signing
/// * Secret `nonce` from [round 1](super::round1), consumed by this function
/// * `msg` to be signed
/// * List of `signers`: their identifiers and their commitments to the nonces obtained
///   at [round 1](super::round1). Must include this signer. Order doesn't matter.
///
/// Computes `z_i = d_i + e_i * rho_i + lambda_i * x_i * c`, where `rho_i` is the signer's
/// binding factor, `lambda_i` is its Lagrange coefficient over identifiers of the signers,
/// and `c` is the challenge.
///
/// **Never reuse nonces!** Using the same nonce to sign two different messages leaks the secret share.
pub fn sign<C: Ciphersuite>(
    key_share: &KeyShare<C::Curve>,
    nonce: SecretNonces<C::Curve>,
    msg: &[u8],
    signers: &[CommitmentEntry<C::Curve>],
) -> Result<SigShare<C::Curve>, SigningError> {
    // --- Retrieve and Validate Data
    if signers.is_empty() {
        return Err(Reason::EmptyCommitmentSet.into());
    }
    if signers.len() < usize::from(key_share.threshold()) {
        return Err(Reason::TooFewSigners {
            min_signers: key_share.threshold(),
            n: signers.len(),
        }
        .into());
    }
    let signer_id = key_share.id;
    for (j, comm) in signers {
        if !key_share.contains(j) {
            return Err(Reason::UnknownSigner.into());
        }
        if *j == signer_id && nonce.public_commitments() != *comm {
            // Commitments don't match provided nonces - invalid inputs
            return Err(Reason::NoncesDontMatchComm.into());
        }
    }
    let mut comm_list = signers.to_vec();
    utils::sort_commitment_list(&mut comm_list).map_err(|_| Reason::SameSignerTwice)?;
    let i = comm_list
        .binary_search_by_key(&signer_id, |(j, _)| *j)
        .map_err(|_| Reason::SignerNotInList)?;

    // --- The Signing
    let group_public_key = key_share.group_public_key();
    let binding_factor_list =
        utils::compute_binding_factors::<C>(group_public_key, &comm_list, msg);
    let binding_factor = binding_factor_list.get(i).ok_or(Bug::OwnBindingFactor)?.1;
    debug_assert_eq!(binding_factor_list[i].0, signer_id);

    let group_commitment = utils::compute_group_commitment(&comm_list, &binding_factor_list);

    let others = comm_list
        .iter()
        .map(|(j, _)| *j)
        .filter(|j| *j != signer_id)
        .collect::<Vec<_>>();
    let lambda_i = crate::lagrange::lagrange_coefficient(&signer_id, &others)?;

    let challenge = C::compute_challenge(group_public_key, &group_commitment, Some(msg));

    Ok(SigShare(
        nonce.hiding_nonce.as_ref()
            + (nonce.binding_nonce.as_ref() * binding_factor)
            + (lambda_i * key_share.x.as_ref() * challenge),
    ))
}

/// Signing error
#[derive(Debug)]
pub struct SigningError(Reason);

#[derive(Debug)]
pub(super) enum Reason {
    EmptyCommitmentSet,
    TooFewSigners { min_signers: u16, n: usize },
    UnknownSigner,
    SameSignerTwice,
    SignerNotInList,
    NoncesDontMatchComm,
    DeriveInterpolationValue(InterpolationSingularity),
    NoncesNotCommitted,
    NoncesConsumed,
    Bug(Bug),
}

#[derive(Debug)]
pub(super) enum Bug {
    OwnBindingFactor,
}

impl SigningError {
    /// Kind of the error
    pub fn kind(&self) -> ErrorKind {
        match &self.0 {
            Reason::EmptyCommitmentSet => ErrorKind::EmptyCommitmentSet,
            Reason::TooFewSigners { .. }
            | Reason::UnknownSigner
            | Reason::SameSignerTwice
            | Reason::SignerNotInList
            | Reason::NoncesDontMatchComm => ErrorKind::InvalidParticipant,
            Reason::DeriveInterpolationValue(_) => ErrorKind::InterpolationSingularity,
            Reason::NoncesNotCommitted => ErrorKind::IncompleteSession,
            Reason::NoncesConsumed => ErrorKind::NonceReuse,
            Reason::Bug(_) => ErrorKind::Bug,
        }
    }
}

impl fmt::Display for SigningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Reason::EmptyCommitmentSet => f.write_str("list of signers is empty"),
            Reason::TooFewSigners { min_signers, n } => write!(
                f,
                "signers list contains {n} singners, although at \
                least {min_signers} must take part in the signing"
            ),
            Reason::UnknownSigner => f.write_str("signer is not a key holder"),
            Reason::SameSignerTwice => f.write_str(
                "same signer appears more than once in the list \
                of signers",
            ),
            Reason::SignerNotInList => f.write_str("signer not in the list of participants"),
            Reason::NoncesDontMatchComm => f.write_str("nonces don't match signer commitments"),
            Reason::DeriveInterpolationValue(_) => {
                f.write_str("derive interpolation value")
            }
            Reason::NoncesNotCommitted => f.write_str("round 1 wasn't completed: no nonces committed"),
            Reason::NoncesConsumed => f.write_str("nonces were already used in round 2"),
            Reason::Bug(_) => f.write_str("bug occurred"),
        }
    }
}

impl fmt::Display for Bug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bug::OwnBindingFactor => f.write_str("retrieve own binding factor"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SigningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.0 {
            Reason::EmptyCommitmentSet
            | Reason::TooFewSigners { .. }
            | Reason::UnknownSigner
            | Reason::NoncesDontMatchComm
            | Reason::SameSignerTwice
            | Reason::SignerNotInList
            | Reason::NoncesNotCommitted
            | Reason::NoncesConsumed => None,
            Reason::DeriveInterpolationValue(err) => Some(err),
            Reason::Bug(bug) => Some(bug),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Bug {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Bug::OwnBindingFactor => None,
        }
    }
}

impl From<Reason> for SigningError {
    fn from(err: Reason) -> Self {
        SigningError(err)
    }
}
impl From<Bug> for SigningError {
    fn from(err: Bug) -> Self {
        SigningError(Reason::Bug(err))
    }
}
impl From<InterpolationSingularity> for SigningError {
    fn from(err: InterpolationSingularity) -> Self {
        SigningError(Reason::DeriveInterpolationValue(err))
    }
}
