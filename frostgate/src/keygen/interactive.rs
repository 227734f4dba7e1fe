//! Interactive Distributed Key Generation

use alloc::{boxed::Box, vec::Vec};
use core::{fmt, marker::PhantomData};

use generic_ec::{Curve, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};
use round_based::{
    rounds_router::{simple_store::RoundInput, RoundsRouter},
    Delivery, SinkExt,
};

use crate::{error::ErrorKind, Ciphersuite, KeyShare, SignerIndex};

use super::{participant_id, Ceremony, DealerCommitment, KeygenError, Participant};

/// Message of Interactive DKG Protocol
#[derive(Debug, Clone, round_based::ProtocolMessage)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
pub enum Msg<E: Curve> {
    /// Round 1 message: broadcasted dealer commitment
    Round1(DealerCommitment<E>),
    /// Round 2 message: secret share sent over a private channel
    Round2(SecretShareMsg<E>),
}

/// Secret share `f_i(j)` sent by dealer `i` to participant `j`
///
/// Must be delivered over a private channel
#[derive(Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
pub struct SecretShareMsg<E: Curve> {
    /// Secret share
    pub share: Scalar<E>,
}

impl<E: Curve> fmt::Debug for SecretShareMsg<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretShareMsg")
    }
}

/// Builder for Interactive DKG Protocol
pub struct KeygenBuilder<C: Ciphersuite> {
    i: SignerIndex,
    n: u16,
    t: u16,
    _ciphersuite: PhantomData<C>,
}

impl<C: Ciphersuite> KeygenBuilder<C> {
    /// Constructs a builder of `n`-out-of-`n` keygen
    ///
    /// It could be easier to use [keygen](crate::keygen()) function located in the crate root.
    pub fn new(i: SignerIndex, n: u16) -> Self {
        Self {
            i,
            n,
            t: n,
            _ciphersuite: PhantomData,
        }
    }

    /// Sets threshold `t`: any `t` key holders will be able to sign
    pub fn set_threshold(self, t: u16) -> Self {
        Self { t, ..self }
    }

    /// Executes Interactive DKG protocol
    ///
    /// Outputs a key share of party `i` with identifier `i + 1`
    pub async fn start<R, M>(
        self,
        rng: &mut R,
        party: M,
    ) -> Result<KeyShare<C::Curve>, InteractiveKeygenError>
    where
        R: RngCore + CryptoRng,
        M: round_based::Mpc<ProtocolMessage = Msg<C::Curve>>,
    {
        let Self { i, n, t, .. } = self;
        if i >= n {
            return Err(Reason::INotInRange.into());
        }
        let own_id = participant_id::<C::Curve>(i).ok_or(Reason::IdOverflow)?;
        let mut ceremony = Ceremony::<C>::new(n, t).map_err(Reason::Keygen)?;

        let round_based::MpcParty { delivery, .. } = party.into_party();
        let (incoming, mut outgoing) = delivery.split();

        let mut rounds = RoundsRouter::<Msg<C::Curve>>::builder();
        let round1 = rounds.add_round(RoundInput::<DealerCommitment<C::Curve>>::broadcast(i, n));
        let round2 = rounds.add_round(RoundInput::<SecretShareMsg<C::Curve>>::p2p(i, n));
        let mut rounds = rounds.listen(incoming);

        // Round 1
        let participant = Participant::<C>::new(rng, *own_id, t).map_err(Reason::Keygen)?;
        outgoing
            .send(round_based::Outgoing::broadcast(Msg::Round1(
                participant.commitment().clone(),
            )))
            .await
            .map_err(IoError::send)?;
        tracing::debug!(i, "keygen round 1: commitment sent");

        let commitments = rounds.complete(round1).await.map_err(IoError::recv)?;
        for (j, dealer) in (0..n).zip(commitments.iter_including_me(participant.commitment())) {
            let expected_id = participant_id::<C::Curve>(j).ok_or(Reason::IdOverflow)?;
            if dealer.id != expected_id {
                return Err(Reason::MismatchedId { j }.into());
            }
            ceremony
                .accept(dealer.clone())
                .map_err(|err| Reason::Dealer { j, err })?;
        }
        let transcript = ceremony.finish().map_err(Reason::Keygen)?;

        // Round 2
        for j in (0..n).filter(|j| *j != i) {
            let recipient = participant_id::<C::Curve>(j).ok_or(Reason::IdOverflow)?;
            let share = participant.share_for(&recipient);
            outgoing
                .send(round_based::Outgoing::p2p(
                    j,
                    Msg::Round2(SecretShareMsg {
                        share: *share.as_ref(),
                    }),
                ))
                .await
                .map_err(IoError::send)?;
        }
        tracing::debug!(i, "keygen round 2: secret shares sent");

        let own_share = SecretShareMsg {
            share: *participant.share_for(&own_id).as_ref(),
        };
        let shares = rounds.complete(round2).await.map_err(IoError::recv)?;
        let received = (0..n)
            .zip(shares.iter_including_me(&own_share))
            .map(|(j, msg)| {
                let dealer = participant_id::<C::Curve>(j).ok_or(Reason::IdOverflow)?;
                let mut share = msg.share;
                Ok((dealer, SecretScalar::new(&mut share)))
            })
            .collect::<Result<Vec<_>, Reason>>()?;

        // Output
        let key_share = transcript
            .combine(own_id, received)
            .map_err(Reason::Keygen)?;
        tracing::debug!(i, "keygen finished");
        Ok(key_share)
    }
}

/// Interactive DKG error
#[derive(Debug)]
pub struct InteractiveKeygenError(Reason);

#[derive(Debug)]
enum Reason {
    INotInRange,
    IdOverflow,
    MismatchedId { j: SignerIndex },
    Dealer { j: SignerIndex, err: KeygenError },
    Keygen(KeygenError),
    IoError(IoError),
}

#[derive(Debug)]
enum IoError {
    Send(Box<dyn crate::error::StdError + Send + Sync>),
    Recv(Box<dyn crate::error::StdError + Send + Sync>),
}

impl IoError {
    fn send(err: impl crate::error::StdError + Send + Sync + 'static) -> Self {
        Self::Send(Box::new(err))
    }
    fn recv(err: impl crate::error::StdError + Send + Sync + 'static) -> Self {
        Self::Recv(Box::new(err))
    }
}

impl InteractiveKeygenError {
    /// Kind of the error
    pub fn kind(&self) -> ErrorKind {
        match &self.0 {
            Reason::INotInRange | Reason::IdOverflow | Reason::MismatchedId { .. } => {
                ErrorKind::InvalidParticipant
            }
            Reason::Dealer { err, .. } | Reason::Keygen(err) => err.kind(),
            Reason::IoError(_) => ErrorKind::Io,
        }
    }

    /// Index of the party that misbehaved at Round 1, if it was identified
    pub fn culprit(&self) -> Option<SignerIndex> {
        match &self.0 {
            Reason::MismatchedId { j } | Reason::Dealer { j, .. } => Some(*j),
            _ => None,
        }
    }
}

impl fmt::Display for InteractiveKeygenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Reason::INotInRange => f.write_str("party index not in range (it must be 0 <= i < n)"),
            Reason::IdOverflow => f.write_str("participant identifier overflows the scalar field"),
            Reason::MismatchedId { j } => {
                write!(f, "party {j} broadcasted commitment with unexpected identifier")
            }
            Reason::Dealer { j, .. } => write!(f, "commitment of party {j} is rejected"),
            Reason::Keygen(_) => f.write_str("keygen failed"),
            Reason::IoError(IoError::Send(_)) => f.write_str("i/o error: send message"),
            Reason::IoError(IoError::Recv(_)) => f.write_str("i/o error: recv message"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InteractiveKeygenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.0 {
            Reason::INotInRange | Reason::IdOverflow | Reason::MismatchedId { .. } => None,
            Reason::Dealer { err, .. } | Reason::Keygen(err) => Some(err),
            Reason::IoError(IoError::Send(err)) | Reason::IoError(IoError::Recv(err)) => {
                Some(&**err)
            }
        }
    }
}

impl From<Reason> for InteractiveKeygenError {
    fn from(err: Reason) -> Self {
        Self(err)
    }
}
impl From<IoError> for InteractiveKeygenError {
    fn from(err: IoError) -> Self {
        Self(Reason::IoError(err))
    }
}
