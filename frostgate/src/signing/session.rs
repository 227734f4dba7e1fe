//! Signing session of a single signer
//!
//! [`Signer`] owns the signer's secret nonces between the rounds and tracks whether they were
//! already consumed, so that Round 2 without Round 1, or a second Round 2 with the same
//! nonces, is rejected instead of leaking the key share.

use core::mem;

use rand_core::{CryptoRng, RngCore};

use crate::{Ciphersuite, KeyShare};

use super::{
    round1::{self, PublicCommitments, SecretNonces},
    round2::{self, Reason, SigShare, SigningError},
    utils::CommitmentEntry,
};

/// Observable state of a signing session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Round 1 wasn't carried out yet
    Idle,
    /// Nonces are committed, waiting for Round 2
    Round1Done,
    /// Nonces were consumed by Round 2
    Round2Done,
}

enum NonceState<C: Ciphersuite> {
    Idle,
    Ready {
        nonces: SecretNonces<C::Curve>,
        commitments: PublicCommitments<C::Curve>,
    },
    Consumed,
}

/// Signer taking part in a signing session
pub struct Signer<'k, C: Ciphersuite> {
    key_share: &'k KeyShare<C::Curve>,
    nonces: NonceState<C>,
}

impl<'k, C: Ciphersuite> Signer<'k, C> {
    /// Constructs an idle signer
    pub fn new(key_share: &'k KeyShare<C::Curve>) -> Self {
        Self {
            key_share,
            nonces: NonceState::Idle,
        }
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        match self.nonces {
            NonceState::Idle => SessionState::Idle,
            NonceState::Ready { .. } => SessionState::Round1Done,
            NonceState::Consumed => SessionState::Round2Done,
        }
    }

    /// Commitments produced at Round 1, if nonces are not consumed yet
    pub fn commitments(&self) -> Option<PublicCommitments<C::Curve>> {
        match &self.nonces {
            NonceState::Ready { commitments, .. } => Some(*commitments),
            NonceState::Idle | NonceState::Consumed => None,
        }
    }

    /// Round 1: commits fresh nonces
    ///
    /// If there are committed nonces that weren't consumed yet, they're discarded (and zeroized)
    /// and replaced with fresh ones. Calling it after Round 2 starts a new session.
    pub fn round1(&mut self, rng: &mut (impl RngCore + CryptoRng)) -> PublicCommitments<C::Curve> {
        let (nonces, commitments) = round1::commit::<C>(rng, self.key_share);
        let previous = mem::replace(
            &mut self.nonces,
            NonceState::Ready {
                nonces,
                commitments,
            },
        );
        if matches!(previous, NonceState::Ready { .. }) {
            tracing::debug!(id = ?self.key_share.id, "unconsumed nonces replaced with fresh ones");
        }
        tracing::debug!(id = ?self.key_share.id, "round 1 done");
        commitments
    }

    /// Round 2: issues a signature share on `msg`
    ///
    /// `signers` is the list of identifiers and commitments of all signers, including this one.
    ///
    /// Nonces are consumed even if signing fails: a failure is terminal for the session, a new
    /// session must start from Round 1.
    pub fn round2(
        &mut self,
        msg: &[u8],
        signers: &[CommitmentEntry<C::Curve>],
    ) -> Result<SigShare<C::Curve>, SigningError> {
        let nonces = match mem::replace(&mut self.nonces, NonceState::Consumed) {
            NonceState::Ready { nonces, .. } => nonces,
            NonceState::Idle => {
                self.nonces = NonceState::Idle;
                return Err(Reason::NoncesNotCommitted.into());
            }
            NonceState::Consumed => return Err(Reason::NoncesConsumed.into()),
        };
        let sig_share = round2::sign::<C>(self.key_share, nonces, msg, signers);
        match &sig_share {
            Ok(_) => tracing::debug!(id = ?self.key_share.id, "round 2 done"),
            Err(err) => tracing::warn!(id = ?self.key_share.id, %err, "round 2 failed"),
        }
        sig_share
    }
}
