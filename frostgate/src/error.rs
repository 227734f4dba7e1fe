//! Error kinds shared by all protocol errors

use core::fmt;

#[cfg(feature = "std")]
pub use std::error::Error as StdError;

/// Minimal replacement of [`std::error::Error`] in `no_std` environment
#[cfg(not(feature = "std"))]
pub trait StdError: fmt::Display + fmt::Debug {}
#[cfg(not(feature = "std"))]
impl<E: fmt::Display + fmt::Debug> StdError for E {}

/// Kind of the error
///
/// Every error returned by this crate can be classified into one of these kinds via
/// `.kind()` method. It allows orchestration layer to tell misuse of the API apart from
/// misbehaving participants without matching on error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Participant is invalid: zero identifier, identifier that's unknown or appears twice,
    /// or wrong number of polynomial coefficients
    InvalidParticipant,
    /// Round 2 was invoked before Round 1, or without key share
    IncompleteSession,
    /// Secret nonces were already consumed by previous Round 2
    NonceReuse,
    /// Round 2 or aggregation invoked with no commitments
    EmptyCommitmentSet,
    /// Lagrange denominator reduces to zero
    InterpolationSingularity,
    /// Aggregated signature doesn't pass Schnorr verification
    SignatureVerificationFailed,
    /// Secret share doesn't match dealer's commitments
    InvalidShare,
    /// Proof of knowledge doesn't verify
    InvalidProof,
    /// Sending or receiving a message failed (interactive protocols only)
    Io,
    /// Bug occurred
    Bug,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::InvalidParticipant => "invalid participant",
            ErrorKind::IncompleteSession => "incomplete session",
            ErrorKind::NonceReuse => "nonce reuse",
            ErrorKind::EmptyCommitmentSet => "empty commitment set",
            ErrorKind::InterpolationSingularity => "interpolation singularity",
            ErrorKind::SignatureVerificationFailed => "signature verification failed",
            ErrorKind::InvalidShare => "invalid share",
            ErrorKind::InvalidProof => "invalid proof of knowledge",
            ErrorKind::Io => "i/o error",
            ErrorKind::Bug => "bug",
        })
    }
}
