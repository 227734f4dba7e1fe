//! Threshold Schnorr signatures based on [FROST][paper] with a built-in Distributed Key Generation
//!
//! FROST lets any `t` out of `n` key holders jointly produce a regular Schnorr signature which
//! verifies against a single group public key. No party ever learns the group secret key.
//!
//! This crate provides:
//! * Distributed Key Generation (DKG) \
//!   Pedersen-style DKG with Feldman verifiable secret sharing and proofs of knowledge of
//!   dealers secrets, see [mod@keygen] module. It can be carried out manually, or over
//!   [`round_based`] framework when `full-keygen` feature is enabled.
//! * FROST Signing \
//!   We provide API for manual signing execution (for better flexibility and efficiency),
//!   a [stateful signer](signing::session::Signer) that rules out nonce reuse, and interactive
//!   protocol (for easier usability and fool-proof design), see [mod@signing] module for details.
//! * Identification of signers who sent invalid signature shares
//! * [reconstruct_secret_key] (exporting key from TSS) when `spof` feature is enabled
//!
//! Two ciphersuites are available, see [mod@ciphersuite]:
//! * secp256k1 with keccak256, producing signatures that can be verified by EVM contracts
//! * Ed25519 with SHA-512, producing signatures accepted by RFC 8032 verifiers
//!
//! [paper]: https://eprint.iacr.org/2020/852.pdf

#![no_std]
#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(unused_crate_dependencies))]
#![deny(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
#![deny(missing_docs)]
#![allow(clippy::type_complexity)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub use generic_ec;
#[cfg(any(feature = "full-signing", feature = "full-keygen"))]
pub use round_based;

pub mod ciphersuite;
pub mod error;
pub mod keygen;
pub mod lagrange;
pub mod pok;
pub mod polynomial;
pub mod signing;

#[cfg(feature = "spof")]
#[doc(inline)]
pub use lagrange::reconstruct_secret_key;

pub use self::{
    ciphersuite::Ciphersuite,
    keygen::{KeyInfo, KeyShare},
};

/// Signer index
///
/// Index `i` of a key holder corresponds to its identifier `i + 1`, see
/// [`keygen::participant_id`].
pub type SignerIndex = u16;

/// Interactive Signing
///
/// Can be used to carry out the full signing protocol in which each signer commits nonces,
/// produces a signature share and, optionally, aggregates all signature shares into the
/// final signature.
///
/// This can be less efficient than doing signing manually, when you can commit nonces before
/// a message to be signed is known, but more secure, as using this function ensures that
/// protocol isn't misused (e.g. that nonce is never resused).
///
/// ## Inputs
/// * Signer index in *signing protocol* $0 \le i < |\\text{signers}|$
/// * Signer secret key share
/// * List of signers that participate in the signing, must have at least threshold amount of
///   signers \
///   `signers[j]` is index which j-th signer occupied at keygen
/// * `msg` to be signed
///
/// ## Example
/// ```rust,no_run
/// use frostgate::round_based;
/// use frostgate::ciphersuite::Secp256k1Keccak;
/// #
/// # fn retrieve_key_share() -> frostgate::KeyShare<<Secp256k1Keccak as frostgate::Ciphersuite>::Curve> { unimplemented!() }
/// # fn join_network<M>() -> (u16, impl round_based::Delivery<M>) {
/// #     (0, (futures::stream::pending::<Result<_, std::convert::Infallible>>(), futures::sink::drain()))
/// # }
/// # async fn __doc() -> Result<(), frostgate::signing::full_signing::FullSigningError> {
///
/// let key_share = retrieve_key_share();
/// let (i, delivery) = join_network();
/// let signers = [0, 2];
/// let msg = b"Hello, TSS World!";
///
/// let party = round_based::MpcParty::connected(delivery);
/// let sig = frostgate::signing::<Secp256k1Keccak>(i, &key_share, &signers, msg)
///     .sign(&mut rand_core::OsRng, party)
///     .await?;
/// # Ok(()) }
/// ```
#[cfg(feature = "full-signing")]
pub fn signing<'a, C: Ciphersuite>(
    i: SignerIndex,
    key_share: &'a KeyShare<C::Curve>,
    signers: &'a [SignerIndex],
    msg: &'a [u8],
) -> signing::full_signing::SigningBuilder<'a, C> {
    signing::full_signing::SigningBuilder::new(i, key_share, signers, msg)
}

/// Interactive Distributed Key Generation
///
/// Carries out the whole DKG among `n` parties: each party deals its polynomial, proves
/// knowledge of its secret, distributes secret shares over private channels and combines
/// received shares into its [`KeyShare`].
///
/// Threshold defaults to `n`, use [`set_threshold`](keygen::interactive::KeygenBuilder::set_threshold)
/// to generate `t`-out-of-`n` key.
///
/// ## Example
/// ```rust,no_run
/// use frostgate::round_based;
/// use frostgate::ciphersuite::Ed25519;
/// #
/// # fn join_network<M>() -> (u16, impl round_based::Delivery<M>) {
/// #     (0, (futures::stream::pending::<Result<_, std::convert::Infallible>>(), futures::sink::drain()))
/// # }
/// # async fn __doc() -> Result<(), frostgate::keygen::interactive::InteractiveKeygenError> {
///
/// let (i, delivery) = join_network();
/// let party = round_based::MpcParty::connected(delivery);
///
/// let key_share = frostgate::keygen::<Ed25519>(i, 3)
///     .set_threshold(2)
///     .start(&mut rand_core::OsRng, party)
///     .await?;
/// # Ok(()) }
/// ```
#[cfg(feature = "full-keygen")]
pub fn keygen<C: Ciphersuite>(i: SignerIndex, n: u16) -> keygen::interactive::KeygenBuilder<C> {
    keygen::interactive::KeygenBuilder::new(i, n)
}
