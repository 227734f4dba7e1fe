//! Signature shares aggregation
//!
//! In this phase, Coordinator aggregates signature shares into a regular signature. The
//! signature is verified against the group public key before it's released, and if it doesn't
//! verify, signers who sent invalid shares are identified.
//!
//! For more details, refer to [parent module](super) docs.

use alloc::vec::Vec;
use core::fmt;

use generic_ec::{NonZero, Point, Scalar};

use crate::{error::ErrorKind, Ciphersuite, KeyInfo};

use super::{round1::PublicCommitments, round2::SigShare, utils, CommitmentEntry};

#[derive(Debug, Clone, Copy)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
/// Schnorr Signature
pub struct Signature<C: Ciphersuite> {
    /// $R$ component of the signature
    pub r: Point<C::Curve>,
    /// $z$ component of the signature
    pub z: Scalar<C::Curve>,
}

impl<C: Ciphersuite> Signature<C> {
    /// Verifies signature against a public key and a message
    ///
    /// Checks that `z * G == R + c * PK` where `c = H2(R || PK || msg)`
    pub fn verify(&self, public_key: &Point<C::Curve>, msg: &[u8]) -> Result<(), InvalidSignature> {
        let challenge = C::compute_challenge(public_key, &self.r, Some(msg));

        let lhs = Point::generator() * self.z;
        let rhs = self.r + public_key * challenge;

        if lhs == rhs {
            Ok(())
        } else {
            Err(InvalidSignature)
        }
    }

    /// Size of serialized signature in bytes
    pub fn serialized_len() -> usize {
        C::POINT_SIZE + C::SCALAR_SIZE
    }

    /// Writes serialized signature `R || z` into the slice
    ///
    /// Returns error if slice length doesn't equal to [`serialized_len`](Self::serialized_len)
    pub fn write_to_slice(&self, out: &mut [u8]) -> Result<(), InvalidSignature> {
        if out.len() != Self::serialized_len() {
            return Err(InvalidSignature);
        }
        let (r_out, z_out) = out.split_at_mut(C::POINT_SIZE);
        r_out.copy_from_slice(C::serialize_point(&self.r).as_ref());
        z_out.copy_from_slice(C::serialize_scalar(&self.z).as_ref());
        Ok(())
    }

    /// Serializes signature as `R || z`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::serialized_len());
        bytes.extend_from_slice(C::serialize_point(&self.r).as_ref());
        bytes.extend_from_slice(C::serialize_scalar(&self.z).as_ref());
        bytes
    }

    /// Deserializes signature from `R || z`
    pub fn read_from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::serialized_len() {
            return None;
        }
        let (r, z) = bytes.split_at(C::POINT_SIZE);
        Some(Self {
            r: C::deserialize_point(r).ok()?,
            z: C::deserialize_scalar(z).ok()?,
        })
    }
}

/// Signer identifier, its commitments and its signature share
pub type SignerEntry<E> = (NonZero<Scalar<E>>, PublicCommitments<E>, SigShare<E>);

/// Aggregate [signature shares](SigShare) into a regular [Schnorr signature](Signature)
///
/// Inputs:
/// * Public `key_info`
/// * List of signers, their commitments and signature shares. Must be the same set of
///   commitments that signers received in Round 2.
/// * `msg` being signed
///
/// Outputs [Schnorr signature](Signature) verified against the group public key.
pub fn aggregate<C: Ciphersuite>(
    key_info: &KeyInfo<C::Curve>,
    signers: &[SignerEntry<C::Curve>],
    msg: &[u8],
) -> Result<Signature<C>, AggregateError> {
    // --- Retrieve and Validate Data
    if signers.is_empty() {
        return Err(Reason::EmptyCommitmentSet.into());
    }
    if signers.len() < usize::from(key_info.threshold()) {
        return Err(Reason::TooFewSigners {
            min_signers: key_info.threshold(),
            n: signers.len(),
        }
        .into());
    }
    if signers.iter().any(|(j, _, _)| !key_info.contains(j)) {
        return Err(Reason::UnknownSigner.into());
    }
    let mut comm_list = signers
        .iter()
        .map(|(j, comm, _)| (*j, *comm))
        .collect::<Vec<_>>();
    utils::sort_commitment_list(&mut comm_list).map_err(|_| Reason::SameSignerTwice)?;

    // --- The Aggregation
    let group_public_key = key_info.group_public_key();
    let binding_factor_list =
        utils::compute_binding_factors::<C>(group_public_key, &comm_list, msg);
    let group_commitment = utils::compute_group_commitment(&comm_list, &binding_factor_list);
    let z = signers
        .iter()
        .map(|(_j, _comm, sig_share)| sig_share.0)
        .fold(Scalar::zero(), |acc, z_i| acc + z_i);

    let sig = Signature {
        r: group_commitment,
        z,
    };

    // --- Verification
    if sig.verify(group_public_key, msg).is_ok() {
        return Ok(sig);
    }

    let challenge = C::compute_challenge(group_public_key, &group_commitment, Some(msg));
    let ids = comm_list.iter().map(|(j, _)| *j).collect::<Vec<_>>();
    let mut culprits = Vec::new();
    for (index, (j, comm, sig_share)) in signers.iter().enumerate() {
        let binding_factor = binding_factor_list
            .binary_search_by_key(j, |(i, _)| *i)
            .ok()
            .and_then(|pos| binding_factor_list.get(pos))
            .ok_or(Bug::RetrieveBindingFactor)?
            .1;
        let lambda = crate::lagrange::lagrange_coefficient_at(j, &ids)
            .map_err(|_| Bug::DeriveInterpolationValue)?;
        let valid = sig_share_is_valid(key_info, j, comm, sig_share, &binding_factor, &lambda, &challenge);
        if !valid {
            culprits.push(index);
        }
    }
    tracing::warn!(?culprits, "aggregated signature is invalid");

    Err(Reason::InvalidSignature { culprits }.into())
}

/// Verifies a signature share of signer `id`
///
/// `signers` must be the same list of commitments that was used in Round 2. Returns `Ok(())`
/// if the share satisfies `z_i * G == D_i + rho_i * E_i + lambda_i * c * Y_i`, where `Y_i`
/// is signer's public share. Otherwise, the error lists position of `id` in `signers` as a culprit.
pub fn verify_sig_share<C: Ciphersuite>(
    key_info: &KeyInfo<C::Curve>,
    id: &NonZero<Scalar<C::Curve>>,
    sig_share: &SigShare<C::Curve>,
    signers: &[CommitmentEntry<C::Curve>],
    msg: &[u8],
) -> Result<(), AggregateError> {
    if signers.is_empty() {
        return Err(Reason::EmptyCommitmentSet.into());
    }
    if signers.iter().any(|(j, _)| !key_info.contains(j)) {
        return Err(Reason::UnknownSigner.into());
    }
    let mut comm_list = signers.to_vec();
    utils::sort_commitment_list(&mut comm_list).map_err(|_| Reason::SameSignerTwice)?;
    let pos = comm_list
        .binary_search_by_key(id, |(j, _)| *j)
        .map_err(|_| Reason::UnknownSigner)?;
    let comm = comm_list.get(pos).ok_or(Reason::UnknownSigner)?.1;

    let group_public_key = key_info.group_public_key();
    let binding_factor_list =
        utils::compute_binding_factors::<C>(group_public_key, &comm_list, msg);
    let binding_factor = binding_factor_list.get(pos).ok_or(Bug::RetrieveBindingFactor)?.1;
    let group_commitment = utils::compute_group_commitment(&comm_list, &binding_factor_list);
    let challenge = C::compute_challenge(group_public_key, &group_commitment, Some(msg));

    let ids = comm_list.iter().map(|(j, _)| *j).collect::<Vec<_>>();
    let lambda = crate::lagrange::lagrange_coefficient_at(id, &ids)
        .map_err(|_| Bug::DeriveInterpolationValue)?;

    if sig_share_is_valid(key_info, id, &comm, sig_share, &binding_factor, &lambda, &challenge) {
        Ok(())
    } else {
        let culprits = signers.iter().position(|(j, _)| j == id);
        Err(Reason::InvalidSignature {
            culprits: culprits.into_iter().collect(),
        }
        .into())
    }
}

fn sig_share_is_valid<E: generic_ec::Curve>(
    key_info: &KeyInfo<E>,
    id: &NonZero<Scalar<E>>,
    comm: &PublicCommitments<E>,
    sig_share: &SigShare<E>,
    binding_factor: &Scalar<E>,
    lambda: &Scalar<E>,
    challenge: &Scalar<E>,
) -> bool {
    let public_share = key_info.public_share(id);
    let lhs = Point::generator() * sig_share.0;
    let rhs = comm.hiding_comm + comm.binding_comm * binding_factor + public_share * (lambda * challenge);
    lhs == rhs
}

/// Aggregation error
#[derive(Debug)]
pub struct AggregateError(Reason);

#[derive(Debug)]
enum Reason {
    EmptyCommitmentSet,
    TooFewSigners { min_signers: u16, n: usize },
    UnknownSigner,
    SameSignerTwice,
    InvalidSignature { culprits: Vec<usize> },
    Bug(Bug),
}

#[derive(Debug)]
enum Bug {
    RetrieveBindingFactor,
    DeriveInterpolationValue,
}

impl AggregateError {
    /// Kind of the error
    pub fn kind(&self) -> ErrorKind {
        match &self.0 {
            Reason::EmptyCommitmentSet => ErrorKind::EmptyCommitmentSet,
            Reason::TooFewSigners { .. } | Reason::UnknownSigner | Reason::SameSignerTwice => {
                ErrorKind::InvalidParticipant
            }
            Reason::InvalidSignature { .. } => ErrorKind::SignatureVerificationFailed,
            Reason::Bug(_) => ErrorKind::Bug,
        }
    }

    /// Signers who sent invalid signature shares
    ///
    /// Contains indexes of entries in the list of signers given to [aggregate]. Empty if error
    /// isn't caused by invalid shares.
    pub fn culprits(&self) -> &[usize] {
        match &self.0 {
            Reason::InvalidSignature { culprits } => culprits,
            _ => &[],
        }
    }
}

impl From<Reason> for AggregateError {
    fn from(err: Reason) -> Self {
        Self(err)
    }
}
impl From<Bug> for AggregateError {
    fn from(err: Bug) -> Self {
        Self(Reason::Bug(err))
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Reason::EmptyCommitmentSet => f.write_str("list of signers is empty"),
            Reason::TooFewSigners { min_signers, n } => write!(
                f,
                "signers list contains {n} signers, although at \
                least {min_signers} must take part in the signing"
            ),
            Reason::UnknownSigner => f.write_str("unknown signer"),
            Reason::SameSignerTwice => {
                f.write_str("same signer appears more than once in the list")
            }
            Reason::InvalidSignature { culprits } if culprits.is_empty() => {
                f.write_str("invalid signature")
            }
            Reason::InvalidSignature { culprits } => {
                write!(f, "invalid signature: signers {culprits:?} sent invalid shares")
            }
            Reason::Bug(_) => f.write_str("bug occurred"),
        }
    }
}

impl fmt::Display for Bug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bug::RetrieveBindingFactor => f.write_str("retrieve binding factor"),
            Bug::DeriveInterpolationValue => f.write_str("derive interpolation value"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AggregateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.0 {
            Reason::EmptyCommitmentSet
            | Reason::TooFewSigners { .. }
            | Reason::UnknownSigner
            | Reason::SameSignerTwice
            | Reason::InvalidSignature { .. } => None,
            Reason::Bug(bug) => Some(bug),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Bug {}

/// Signature verification failed
#[derive(Debug)]
pub struct InvalidSignature;

impl fmt::Display for InvalidSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid signature")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidSignature {}
