//! FROST Threshold Signing Protocol
//!
//! This crate provides three options how the protocol can be carried out: manually, via a
//! per-signer session object, or interactively.
//! ## Manually
//! You can manually carry out each phase of the protocol by using [round1], [round2], [aggregate] modules.
//! This gives greater flexibility, but you must be carefull not to do anything that could harm security.
//!
//! Manual signing is done as described below. We assume presence of Coordinator, it can be either some entity
//! in the system, or it could be implemented as some sort of consensus protocol between the signers.
//! 1. Each signer commits nonces via [round1::commit] \
//!    Outputs:
//!    * [round1::SecretNonces] that need to be kept secret
//!    * [round1::PublicCommitments] that need to be sent to Coordinator
//! 2. Coordinator chooses a set of at least `threshold` signers and forwards the signing request
//!    along with the list of their commitments to each of them.
//! 3. Each signer signs a message via [round2::sign], which consumes its [round1::SecretNonces],
//!    and sends the resulting [round2::SigShare] to Coordinator.
//! 4. Coordinator receives [round2::SigShare] from each Signer, and aggregates them via [aggregate::aggregate]
//!    into a regular [aggregate::Signature]. The signature is verified before it's returned.
//!
//! Order in which commitments are listed doesn't matter: the list is always sorted by signers
//! identifiers, so every signer and the Coordinator derive the same group commitment.
//!
//! ## Session
//! [session::Signer] tracks a session state of one signer (`Idle → Round1Done → Round2Done`) and
//! rejects Round 2 without Round 1 or with nonces that were already consumed.
//!
//! ## Interactivelly
//! When `full-signing` feature is enabled, you can use [`signing`](crate::signing()) function to carry out
//! full signing protocol based on [`round_based`] framework.

pub mod aggregate;
#[cfg(feature = "full-signing")]
pub mod full_signing;
pub mod round1;
pub mod round2;
pub mod session;
mod utils;

pub use utils::CommitmentEntry;
