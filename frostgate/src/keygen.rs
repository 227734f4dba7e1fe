//! Distributed Key Generation (DKG)
//!
//! Every participant acts as a dealer of its own random polynomial $f_i$ of degree $t-1$. The
//! group polynomial $F = \sum_i f_i$ is never held by anyone: participant $j$ only learns
//! $F(j) = \sum_i f_i(j)$, and the group public key is $F(0) \cdot G = \sum_i f_i(0) \cdot G$.
//!
//! ## Manual execution
//! 1. Each participant creates a [`Participant`] and broadcasts its [`DealerCommitment`].
//! 2. Ceremony driver (any party, or every party independently) admits commitments into a
//!    [`Ceremony`], which verifies proofs of knowledge, and finishes it into a public [`Transcript`].
//! 3. Each participant sends [`Participant::share_for`] to every other participant over
//!    a private channel.
//! 4. Each participant [combines](Transcript::combine) received shares into its [`KeyShare`].
//!
//! ## Interactively
//! When `full-keygen` feature is enabled, [`keygen`](crate::keygen()) carries out the whole
//! protocol over [`round_based`] framework.

use alloc::vec::Vec;
use core::fmt;

use generic_ec::{Curve, NonZero, Point, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};

use crate::{
    error::ErrorKind,
    polynomial::{self, Polynomial},
    pok::ProofOfKnowledge,
    Ciphersuite, SignerIndex,
};

#[cfg(feature = "full-keygen")]
pub mod interactive;

/// Converts participant index `0 <= i < n` into its identifier `i + 1`
pub fn participant_id<E: Curve>(i: SignerIndex) -> Option<NonZero<Scalar<E>>> {
    NonZero::from_scalar(Scalar::from(i) + Scalar::one())
}

/// DKG participant acting as a dealer of its polynomial
///
/// Holds secret polynomial coefficients which are zeroized on drop. Must be exclusively owned
/// by the party it represents.
pub struct Participant<C: Ciphersuite> {
    id: NonZero<Scalar<C::Curve>>,
    polynomial: Polynomial<C::Curve>,
    commitment: DealerCommitment<C::Curve>,
}

impl<C: Ciphersuite> Participant<C> {
    /// Creates a participant with identifier `id` for `t`-out-of-`n` key
    ///
    /// Samples polynomial with `t` random coefficients, the free coefficient being participant's
    /// long-term secret, and proves knowledge of the secret.
    ///
    /// Returns error if `id` is zero or `t == 0`
    pub fn new(
        rng: &mut (impl RngCore + CryptoRng),
        id: Scalar<C::Curve>,
        t: u16,
    ) -> Result<Self, KeygenError> {
        let id = NonZero::from_scalar(id).ok_or(Reason::ZeroIdentifier)?;
        let polynomial = Polynomial::random(rng, t).ok_or(Reason::InvalidThreshold { n: None, t })?;
        let proof = ProofOfKnowledge::prove::<C>(rng, polynomial.secret());
        let commitment = DealerCommitment {
            id,
            commitments: polynomial.commit(),
            proof,
        };

        Ok(Self {
            id,
            polynomial,
            commitment,
        })
    }

    /// Participant identifier
    pub fn id(&self) -> NonZero<Scalar<C::Curve>> {
        self.id
    }

    /// Long-term public key `f(0) * G`
    pub fn public_key(&self) -> Point<C::Curve> {
        self.commitment.public_key()
    }

    /// Public commitment to be broadcasted to other participants
    pub fn commitment(&self) -> &DealerCommitment<C::Curve> {
        &self.commitment
    }

    /// Secret share `f(recipient)` destined to participant `recipient`
    ///
    /// Must be sent to the recipient over a private channel.
    pub fn share_for(&self, recipient: &NonZero<Scalar<C::Curve>>) -> SecretScalar<C::Curve> {
        self.polynomial.evaluate(recipient)
    }
}

/// Public commitment of a DKG dealer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
pub struct DealerCommitment<E: Curve> {
    /// Dealer identifier
    pub id: NonZero<Scalar<E>>,
    /// Feldman commitments to each coefficient of dealer polynomial, `commitments[0]` is
    /// dealer's public key
    pub commitments: Vec<Point<E>>,
    /// Proof of knowledge of the secret behind `commitments[0]`
    pub proof: ProofOfKnowledge<E>,
}

impl<E: Curve> DealerCommitment<E> {
    /// Dealer's long-term public key
    pub fn public_key(&self) -> Point<E> {
        self.commitments.first().copied().unwrap_or_else(Point::zero)
    }

    /// Verifies proof of knowledge attached to the commitment
    pub fn verify_proof<C: Ciphersuite<Curve = E>>(&self) -> Result<(), KeygenError> {
        if self.commitments.is_empty() {
            return Err(Reason::WrongDegree {
                expected: None,
                actual: 0,
            }
            .into());
        }
        self.proof
            .verify::<C>(&self.public_key())
            .map_err(|_| Reason::InvalidProof.into())
    }
}

/// Sums up the public keys
///
/// Returns `None` if the sum is point at infinity
pub fn aggregate_public_keys<'p, E: Curve>(
    public_keys: impl IntoIterator<Item = &'p Point<E>>,
) -> Option<NonZero<Point<E>>> {
    let sum = public_keys
        .into_iter()
        .fold(Point::zero(), |acc, public_key| acc + public_key);
    NonZero::from_point(sum)
}

/// DKG ceremony driver
///
/// Admits dealers into the ceremony after validating their commitments.
pub struct Ceremony<C: Ciphersuite> {
    n: u16,
    t: u16,
    dealers: Vec<DealerCommitment<C::Curve>>,
}

impl<C: Ciphersuite> Ceremony<C> {
    /// Starts a `t`-out-of-`n` ceremony
    ///
    /// Returns error if `t == 0` or `t > n`
    pub fn new(n: u16, t: u16) -> Result<Self, KeygenError> {
        if t == 0 || t > n {
            return Err(Reason::InvalidThreshold { n: Some(n), t }.into());
        }
        Ok(Self {
            n,
            t,
            dealers: Vec::with_capacity(n.into()),
        })
    }

    /// Admits a dealer into the ceremony
    ///
    /// Checks that polynomial has `t` coefficients, that proof of knowledge is valid and
    /// that no other dealer with the same identifier has been admitted.
    pub fn accept(&mut self, dealer: DealerCommitment<C::Curve>) -> Result<(), KeygenError> {
        if self.dealers.len() >= usize::from(self.n) {
            return Err(Reason::TooManyParticipants { n: self.n }.into());
        }
        if dealer.commitments.len() != usize::from(self.t) {
            tracing::warn!(id = ?dealer.id, "dealer polynomial has wrong degree");
            return Err(Reason::WrongDegree {
                expected: Some(self.t),
                actual: dealer.commitments.len(),
            }
            .into());
        }
        if self.dealers.iter().any(|d| d.id == dealer.id) {
            return Err(Reason::SameParticipantTwice.into());
        }
        if let Err(err) = dealer.verify_proof::<C>() {
            tracing::warn!(id = ?dealer.id, "dealer proof of knowledge is invalid");
            return Err(err);
        }

        tracing::debug!(id = ?dealer.id, admitted = self.dealers.len() + 1, n = self.n, "dealer admitted");
        self.dealers.push(dealer);
        Ok(())
    }

    /// Number of dealers admitted so far
    pub fn admitted(&self) -> usize {
        self.dealers.len()
    }

    /// Finishes the ceremony
    ///
    /// Returns error if fewer than `n` dealers were admitted
    pub fn finish(mut self) -> Result<Transcript<C::Curve>, KeygenError> {
        if self.dealers.len() != usize::from(self.n) {
            return Err(Reason::TooFewParticipants {
                n: self.n,
                admitted: self.dealers.len(),
            }
            .into());
        }
        self.dealers.sort_unstable_by_key(|d| d.id);
        tracing::debug!(n = self.n, t = self.t, "ceremony finished");
        Ok(Transcript {
            threshold: self.t,
            dealers: self.dealers,
        })
    }
}

/// Public transcript of DKG: commitments of all admitted dealers sorted by identifier
///
/// Deserialization validates the transcript: dealers must be sorted by distinct identifiers
/// and every dealer must commit to exactly `threshold` coefficients. Proofs of knowledge are
/// not re-verified as they're checked by [`Ceremony`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "", try_from = "TranscriptParts<E>")
)]
pub struct Transcript<E: Curve> {
    threshold: u16,
    dealers: Vec<DealerCommitment<E>>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(bound = "")]
struct TranscriptParts<E: Curve> {
    threshold: u16,
    dealers: Vec<DealerCommitment<E>>,
}

#[cfg(feature = "serde")]
impl<E: Curve> TryFrom<TranscriptParts<E>> for Transcript<E> {
    type Error = KeygenError;

    fn try_from(parts: TranscriptParts<E>) -> Result<Self, Self::Error> {
        let TranscriptParts { threshold, dealers } = parts;
        let n = u16::try_from(dealers.len()).map_err(|_| Inconsistency::TooManyKeyHolders)?;
        if threshold == 0 || threshold > n {
            return Err(Reason::InvalidThreshold { n: Some(n), t: threshold }.into());
        }
        if !dealers.windows(2).all(|win| win[0].id < win[1].id) {
            return Err(Inconsistency::UnsortedIds.into());
        }
        if let Some(dealer) = dealers
            .iter()
            .find(|d| d.commitments.len() != usize::from(threshold))
        {
            return Err(Reason::WrongDegree {
                expected: Some(threshold),
                actual: dealer.commitments.len(),
            }
            .into());
        }
        Ok(Self { threshold, dealers })
    }
}

impl<E: Curve> Transcript<E> {
    /// Threshold `t`
    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Dealers commitments sorted by identifier
    pub fn dealers(&self) -> &[DealerCommitment<E>] {
        &self.dealers
    }

    fn dealer(&self, id: &NonZero<Scalar<E>>) -> Option<&DealerCommitment<E>> {
        self.dealers
            .binary_search_by_key(id, |d| d.id)
            .ok()
            .and_then(|pos| self.dealers.get(pos))
    }

    /// Verifies that `share` sent by `dealer` to `recipient` matches dealer's commitments
    pub fn verify_share(
        &self,
        dealer: &NonZero<Scalar<E>>,
        recipient: &NonZero<Scalar<E>>,
        share: &Scalar<E>,
    ) -> Result<(), KeygenError> {
        let commitments = &self.dealer(dealer).ok_or(Reason::UnknownDealer)?.commitments;
        if polynomial::verify_secret_share(share, commitments, recipient) {
            Ok(())
        } else {
            tracing::warn!(dealer = ?dealer, recipient = ?recipient, "secret share doesn't match dealer commitments");
            Err(Reason::InvalidShare.into())
        }
    }

    /// Public key info of the generated key
    pub fn key_info(&self) -> Result<KeyInfo<E>, KeygenError> {
        let commitments =
            polynomial::sum_commitments(self.dealers.iter().map(|d| d.commitments.as_slice()))
                .ok_or(Bug::SumCommitments)?;
        let group_public_key =
            aggregate_public_keys(self.dealers.iter().filter_map(|d| d.commitments.first()))
                .ok_or(Reason::ZeroGroupKey)?;
        debug_assert_eq!(commitments.first(), Some(&*group_public_key));

        Ok(KeyInfo {
            threshold: self.threshold,
            ids: self.dealers.iter().map(|d| d.id).collect(),
            commitments,
            group_public_key,
        })
    }

    /// Combines received secret shares into participant's key share
    ///
    /// `received` must contain exactly one share from every dealer (including the participant
    /// itself), each share is verified against the dealer commitments. Computes
    /// $F(id) = \sum_i f_i(id)$.
    pub fn combine(
        &self,
        own_id: NonZero<Scalar<E>>,
        received: impl IntoIterator<Item = (NonZero<Scalar<E>>, SecretScalar<E>)>,
    ) -> Result<KeyShare<E>, KeygenError> {
        if self.dealer(&own_id).is_none() {
            return Err(Reason::UnknownDealer.into());
        }

        let mut seen = Vec::with_capacity(self.dealers.len());
        let mut x = Scalar::<E>::zero();
        for (dealer, share) in received {
            if seen.contains(&dealer) {
                return Err(Reason::SameParticipantTwice.into());
            }
            self.verify_share(&dealer, &own_id, share.as_ref())?;
            x = x + share.as_ref();
            seen.push(dealer);
        }
        if seen.len() != self.dealers.len() {
            return Err(Reason::MissingShare {
                expected: self.dealers.len(),
                received: seen.len(),
            }
            .into());
        }
        let x = SecretScalar::new(&mut x);

        let key_info = self.key_info()?;
        if Point::generator() * &x != key_info.public_share(&own_id) {
            return Err(Bug::CombinedShareMismatch.into());
        }

        tracing::debug!(id = ?own_id, "key share combined");
        Ok(KeyShare {
            id: own_id,
            x,
            key_info,
        })
    }
}

/// Public information about the generated key
///
/// Deserialization validates the key info: `1 <= threshold <= n`, identifiers are sorted and
/// distinct, there are `threshold` commitments and the free one is the group public key.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "", try_from = "KeyInfoParts<E>")
)]
pub struct KeyInfo<E: Curve> {
    threshold: u16,
    ids: Vec<NonZero<Scalar<E>>>,
    commitments: Vec<Point<E>>,
    group_public_key: NonZero<Point<E>>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(bound = "")]
struct KeyInfoParts<E: Curve> {
    threshold: u16,
    ids: Vec<NonZero<Scalar<E>>>,
    commitments: Vec<Point<E>>,
    group_public_key: NonZero<Point<E>>,
}

#[cfg(feature = "serde")]
impl<E: Curve> TryFrom<KeyInfoParts<E>> for KeyInfo<E> {
    type Error = KeygenError;

    fn try_from(parts: KeyInfoParts<E>) -> Result<Self, Self::Error> {
        let KeyInfoParts {
            threshold,
            ids,
            commitments,
            group_public_key,
        } = parts;
        let n = u16::try_from(ids.len()).map_err(|_| Inconsistency::TooManyKeyHolders)?;
        if threshold == 0 || threshold > n {
            return Err(Reason::InvalidThreshold { n: Some(n), t: threshold }.into());
        }
        if !ids.windows(2).all(|win| win[0] < win[1]) {
            return Err(Inconsistency::UnsortedIds.into());
        }
        if commitments.len() != usize::from(threshold) {
            return Err(Reason::WrongDegree {
                expected: Some(threshold),
                actual: commitments.len(),
            }
            .into());
        }
        if commitments.first() != Some(&*group_public_key) {
            return Err(Inconsistency::GroupKeyMismatch.into());
        }
        Ok(Self {
            threshold,
            ids,
            commitments,
            group_public_key,
        })
    }
}

impl<E: Curve> KeyInfo<E> {
    /// Threshold `t`: minimal number of signers required to sign
    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Total number of key holders `n`
    pub fn n(&self) -> usize {
        self.ids.len()
    }

    /// Identifiers of all key holders sorted in ascending order
    pub fn ids(&self) -> &[NonZero<Scalar<E>>] {
        &self.ids
    }

    /// Checks whether `id` is one of the key holders
    pub fn contains(&self, id: &NonZero<Scalar<E>>) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Returns identifier of `j`-th key holder
    pub fn share_preimage(&self, j: SignerIndex) -> Option<NonZero<Scalar<E>>> {
        self.ids.get(usize::from(j)).copied()
    }

    /// Group public key $F(0) \cdot G$
    pub fn group_public_key(&self) -> &NonZero<Point<E>> {
        &self.group_public_key
    }

    /// Feldman commitments to the group polynomial $F$
    pub fn commitments(&self) -> &[Point<E>] {
        &self.commitments
    }

    /// Public share $F(id) \cdot G$ of key holder `id`
    pub fn public_share(&self, id: &NonZero<Scalar<E>>) -> Point<E> {
        polynomial::evaluate_commitments(&self.commitments, id)
    }
}

/// Key share of a DKG participant
///
/// Existence of the key share means that DKG was completed for its owner.
#[derive(Clone)]
pub struct KeyShare<E: Curve> {
    /// Identifier of the key holder
    pub id: NonZero<Scalar<E>>,
    /// Secret share $F(id)$
    pub x: SecretScalar<E>,
    key_info: KeyInfo<E>,
}

impl<E: Curve> KeyShare<E> {
    /// Constructs a key share from its parts
    ///
    /// Validates that `id` is a key holder and that `x` matches its public share.
    pub fn from_parts(
        key_info: KeyInfo<E>,
        id: NonZero<Scalar<E>>,
        x: SecretScalar<E>,
    ) -> Result<Self, KeygenError> {
        if !key_info.contains(&id) {
            return Err(Reason::UnknownDealer.into());
        }
        if Point::generator() * &x != key_info.public_share(&id) {
            return Err(Reason::InvalidShare.into());
        }
        Ok(Self { id, x, key_info })
    }

    /// Public key info
    pub fn key_info(&self) -> &KeyInfo<E> {
        &self.key_info
    }
}

impl<E: Curve> core::ops::Deref for KeyShare<E> {
    type Target = KeyInfo<E>;
    fn deref(&self) -> &Self::Target {
        &self.key_info
    }
}

impl<E: Curve> AsRef<KeyInfo<E>> for KeyShare<E> {
    fn as_ref(&self) -> &KeyInfo<E> {
        &self.key_info
    }
}

impl<E: Curve> fmt::Debug for KeyShare<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyShare")
            .field("id", &self.id)
            .field("key_info", &self.key_info)
            .finish_non_exhaustive()
    }
}

/// Key generation error
#[derive(Debug)]
pub struct KeygenError(Reason);

#[derive(Debug)]
enum Reason {
    ZeroIdentifier,
    InvalidThreshold { n: Option<u16>, t: u16 },
    WrongDegree { expected: Option<u16>, actual: usize },
    InvalidProof,
    SameParticipantTwice,
    TooManyParticipants { n: u16 },
    TooFewParticipants { n: u16, admitted: usize },
    UnknownDealer,
    InvalidShare,
    MissingShare { expected: usize, received: usize },
    ZeroGroupKey,
    Inconsistent(Inconsistency),
    Bug(Bug),
}

#[derive(Debug)]
#[cfg_attr(not(feature = "serde"), allow(dead_code))]
enum Inconsistency {
    TooManyKeyHolders,
    UnsortedIds,
    GroupKeyMismatch,
}

#[derive(Debug)]
enum Bug {
    SumCommitments,
    CombinedShareMismatch,
}

impl KeygenError {
    /// Kind of the error
    pub fn kind(&self) -> ErrorKind {
        match &self.0 {
            Reason::ZeroIdentifier
            | Reason::InvalidThreshold { .. }
            | Reason::WrongDegree { .. }
            | Reason::SameParticipantTwice
            | Reason::TooManyParticipants { .. }
            | Reason::TooFewParticipants { .. }
            | Reason::UnknownDealer
            | Reason::MissingShare { .. }
            | Reason::ZeroGroupKey
            | Reason::Inconsistent(_) => ErrorKind::InvalidParticipant,
            Reason::InvalidProof => ErrorKind::InvalidProof,
            Reason::InvalidShare => ErrorKind::InvalidShare,
            Reason::Bug(_) => ErrorKind::Bug,
        }
    }
}

impl fmt::Display for KeygenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Reason::ZeroIdentifier => f.write_str("participant identifier is zero"),
            Reason::InvalidThreshold { n: Some(n), t } => {
                write!(f, "invalid threshold: t={t}, n={n} (it must be 1 <= t <= n)")
            }
            Reason::InvalidThreshold { n: None, t } => {
                write!(f, "invalid threshold: t={t} (it must be t >= 1)")
            }
            Reason::WrongDegree {
                expected: Some(expected),
                actual,
            } => write!(
                f,
                "dealer polynomial has {actual} coefficients, expected {expected}"
            ),
            Reason::WrongDegree {
                expected: None,
                actual,
            } => write!(f, "dealer polynomial has {actual} coefficients"),
            Reason::InvalidProof => f.write_str("invalid proof of knowledge"),
            Reason::SameParticipantTwice => {
                f.write_str("same participant appears more than once")
            }
            Reason::TooManyParticipants { n } => {
                write!(f, "ceremony already has all {n} participants")
            }
            Reason::TooFewParticipants { n, admitted } => write!(
                f,
                "only {admitted} participants admitted, although {n} are expected"
            ),
            Reason::UnknownDealer => f.write_str("participant is not part of the ceremony"),
            Reason::InvalidShare => f.write_str("secret share doesn't match dealer commitments"),
            Reason::MissingShare { expected, received } => write!(
                f,
                "received {received} secret shares, although {expected} are expected"
            ),
            Reason::ZeroGroupKey => f.write_str("group public key is zero"),
            Reason::Inconsistent(Inconsistency::TooManyKeyHolders) => {
                f.write_str("number of key holders overflows u16")
            }
            Reason::Inconsistent(Inconsistency::UnsortedIds) => {
                f.write_str("identifiers are not sorted or not distinct")
            }
            Reason::Inconsistent(Inconsistency::GroupKeyMismatch) => {
                f.write_str("group public key doesn't match the commitments")
            }
            Reason::Bug(_) => f.write_str("bug occurred"),
        }
    }
}

impl fmt::Display for Bug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bug::SumCommitments => f.write_str("sum dealers commitments"),
            Bug::CombinedShareMismatch => {
                f.write_str("combined share doesn't match its public share")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for KeygenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.0 {
            Reason::Bug(bug) => Some(bug),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Bug {}

impl From<Reason> for KeygenError {
    fn from(err: Reason) -> Self {
        Self(err)
    }
}
impl From<Bug> for KeygenError {
    fn from(err: Bug) -> Self {
        Self(Reason::Bug(err))
    }
}
impl From<Inconsistency> for KeygenError {
    fn from(err: Inconsistency) -> Self {
        Self(Reason::Inconsistent(err))
    }
}
