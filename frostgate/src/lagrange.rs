//! Lagrange interpolation
//!
//! Interpolation coefficients are computed over participants' identifiers (the same points at
//! which DKG polynomials were evaluated), both when combining signature shares and when
//! reconstructing the secret.

use core::fmt;

use generic_ec::{Curve, NonZero, Scalar};

/// Computes Lagrange coefficient $\lambda_i = \prod_{j \in S} \frac{j}{j - i}$
///
/// `others` is the set $S$ of identifiers of all other points, it must not contain `i` and must
/// not contain duplicates, otherwise the denominator reduces to zero and
/// [`InterpolationSingularity`] is returned.
pub fn lagrange_coefficient<E: Curve>(
    i: &NonZero<Scalar<E>>,
    others: &[NonZero<Scalar<E>>],
) -> Result<Scalar<E>, InterpolationSingularity> {
    let mut num = Scalar::<E>::one();
    let mut denom = Scalar::<E>::one();

    for (k, j) in others.iter().enumerate() {
        if others[..k].contains(j) {
            return Err(InterpolationSingularity);
        }
        num = num * j.as_ref();
        denom = denom * (j.as_ref() - i.as_ref());
    }

    let denom = NonZero::from_scalar(denom).ok_or(InterpolationSingularity)?;
    Ok(num * denom.invert().as_ref())
}

/// Computes Lagrange coefficient of `i` within the `set` that includes `i`
///
/// `set` must contain `i` exactly once and have no duplicates.
pub fn lagrange_coefficient_at<E: Curve>(
    i: &NonZero<Scalar<E>>,
    set: &[NonZero<Scalar<E>>],
) -> Result<Scalar<E>, InterpolationSingularity> {
    let others = set.iter().filter(|j| *j != i).copied().collect::<alloc::vec::Vec<_>>();
    if others.len() + 1 != set.len() {
        // `i` is either not in the set or appears more than once
        return Err(InterpolationSingularity);
    }
    lagrange_coefficient(i, &others)
}

/// Lagrange denominator reduces to zero
///
/// Happens when interpolation set contains the target point or a duplicated point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpolationSingularity;

impl InterpolationSingularity {
    /// Kind of the error, always [`ErrorKind::InterpolationSingularity`](crate::error::ErrorKind::InterpolationSingularity)
    pub fn kind(&self) -> crate::error::ErrorKind {
        crate::error::ErrorKind::InterpolationSingularity
    }
}

impl fmt::Display for InterpolationSingularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("division by zero in lagrange interpolation")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InterpolationSingularity {}

/// Reconstructs the secret key from key shares
///
/// Interpolates the group polynomial at zero from at least `threshold` key shares issued by
/// the same DKG and checks that the result matches the group public key.
///
/// It creates a single point of failure: whoever runs it learns the key.
#[cfg(feature = "spof")]
pub fn reconstruct_secret_key<E: Curve>(
    key_shares: &[crate::KeyShare<E>],
) -> Result<generic_ec::SecretScalar<E>, ReconstructError> {
    use alloc::vec::Vec;
    use generic_ec::{Point, SecretScalar};

    let Some(first) = key_shares.first() else {
        return Err(ReconstructReason::NoKeyShares.into());
    };
    if key_shares.len() < usize::from(first.threshold()) {
        return Err(ReconstructReason::TooFewKeyShares {
            threshold: first.threshold(),
            n: key_shares.len(),
        }
        .into());
    }
    if key_shares
        .iter()
        .any(|share| share.group_public_key() != first.group_public_key())
    {
        return Err(ReconstructReason::DifferentKeys.into());
    }

    let ids = key_shares.iter().map(|share| share.id).collect::<Vec<_>>();
    let mut secret = Scalar::<E>::zero();
    for share in key_shares {
        let lambda = lagrange_coefficient_at(&share.id, &ids)?;
        secret = secret + lambda * share.x.as_ref();
    }
    let secret = SecretScalar::new(&mut secret);

    if Point::generator() * &secret != **first.group_public_key() {
        return Err(ReconstructReason::Mismatch.into());
    }
    Ok(secret)
}

/// Secret key reconstruction error
#[cfg(feature = "spof")]
#[derive(Debug)]
pub struct ReconstructError(ReconstructReason);

#[cfg(feature = "spof")]
#[derive(Debug)]
enum ReconstructReason {
    NoKeyShares,
    TooFewKeyShares { threshold: u16, n: usize },
    DifferentKeys,
    Interpolation(InterpolationSingularity),
    Mismatch,
}

#[cfg(feature = "spof")]
impl ReconstructError {
    /// Kind of the error
    pub fn kind(&self) -> crate::error::ErrorKind {
        use crate::error::ErrorKind;
        match self.0 {
            ReconstructReason::NoKeyShares
            | ReconstructReason::TooFewKeyShares { .. }
            | ReconstructReason::DifferentKeys => ErrorKind::InvalidParticipant,
            ReconstructReason::Interpolation(_) => ErrorKind::InterpolationSingularity,
            ReconstructReason::Mismatch => ErrorKind::InvalidShare,
        }
    }
}

#[cfg(feature = "spof")]
impl From<ReconstructReason> for ReconstructError {
    fn from(err: ReconstructReason) -> Self {
        Self(err)
    }
}

#[cfg(feature = "spof")]
impl From<InterpolationSingularity> for ReconstructError {
    fn from(err: InterpolationSingularity) -> Self {
        Self(ReconstructReason::Interpolation(err))
    }
}

#[cfg(feature = "spof")]
impl fmt::Display for ReconstructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            ReconstructReason::NoKeyShares => f.write_str("no key shares provided"),
            ReconstructReason::TooFewKeyShares { threshold, n } => write!(
                f,
                "{n} key shares provided, although at least {threshold} are required"
            ),
            ReconstructReason::DifferentKeys => {
                f.write_str("key shares belong to different keys")
            }
            ReconstructReason::Interpolation(_) => f.write_str("interpolation failed"),
            ReconstructReason::Mismatch => {
                f.write_str("reconstructed key doesn't match group public key")
            }
        }
    }
}

#[cfg(all(feature = "spof", feature = "std"))]
impl std::error::Error for ReconstructError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.0 {
            ReconstructReason::Interpolation(err) => Some(err),
            ReconstructReason::NoKeyShares
            | ReconstructReason::TooFewKeyShares { .. }
            | ReconstructReason::DifferentKeys
            | ReconstructReason::Mismatch => None,
        }
    }
}
