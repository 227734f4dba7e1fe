//! FROST Ciphersuite
//!
//! Ciphersuite specifies which curve and hash primitives to use during key generation and signing.
//! It's an immutable bundle of constants and functions passed into every operation as a type
//! parameter, so several ciphersuites can coexist in one process.
//!
//! Out of the box, we provide:
//! * [Secp256k1Keccak], requires `ciphersuite-secp256k1-keccak` feature \
//!   Produces signatures verifiable by EVM contracts: points are encoded as 64 bytes `x || y`,
//!   challenge is a plain Keccak-256 hash.
//! * [Ed25519], requires `ciphersuite-ed25519` feature \
//!   Produces Ed25519-compliant signatures.

use generic_ec::{
    errors::{InvalidPoint, InvalidScalar},
    Curve, Point, Scalar, SecretScalar,
};
use rand_core::{CryptoRng, RngCore};

#[cfg(feature = "ciphersuite-ed25519")]
mod ed25519;
#[cfg(feature = "ciphersuite-secp256k1-keccak")]
mod secp256k1_keccak;

#[cfg(feature = "ciphersuite-ed25519")]
pub use ed25519::Ed25519;
#[cfg(feature = "ciphersuite-secp256k1-keccak")]
pub use secp256k1_keccak::Secp256k1Keccak;

/// Ciphersuite determines an underlying curve and set of cryptographic primitives
/// used in the protocol
///
/// All participants and the external verifier must use the same ciphersuite: any difference in
/// point/scalar encoding silently produces unverifiable signatures.
pub trait Ciphersuite: Sized + Clone + Copy + core::fmt::Debug {
    /// Name of the ciphersuite, used for domain separation of hash functions
    const NAME: &'static str;

    /// Underlying curve on which signatures will be produced
    type Curve: Curve;

    /// Digest that's used to feed data into [H4](Self::h4) and [H5](Self::h5) hash functions
    type Digest: digest::Update + digest::FixedOutput + Clone;

    /// `H1` hash function used to derive binding factors
    ///
    /// Accepts a list of bytestring, that'll be concatenated before hashing.
    /// Returns `H1(data[0] || data[1] || ... || data[data.len() - 1])`.
    fn h1(msg: &[&[u8]]) -> Scalar<Self::Curve>;
    /// `H2` hash function used to derive Schnorr challenge
    ///
    /// Must be exactly the hash that external verifier computes, so it's typically not domain
    /// separated.
    fn h2(msg: &[&[u8]]) -> Scalar<Self::Curve>;
    /// `H3` hash function used in [nonce generation](generate_nonce)
    fn h3(msg: &[&[u8]]) -> Scalar<Self::Curve>;
    /// `H4` hash function used to hash the message when deriving binding factors
    fn h4() -> Self::Digest;
    /// `H5` hash function used to hash the list of commitments when deriving binding factors
    fn h5() -> Self::Digest;

    /// Computes the challenge according to Schnorr scheme
    ///
    /// Returns `H2(R || P || msg)`, where points are encoded via [serialize_point](Self::serialize_point).
    /// `msg` is absent for a proof of knowledge.
    fn compute_challenge(
        public_key: &Point<Self::Curve>,
        commitment: &Point<Self::Curve>,
        msg: Option<&[u8]>,
    ) -> Scalar<Self::Curve> {
        let commitment = Self::serialize_point(commitment);
        let public_key = Self::serialize_point(public_key);
        Self::h2(&[
            commitment.as_ref(),
            public_key.as_ref(),
            msg.unwrap_or_default(),
        ])
    }

    /// Byte array that contains bytes representation of the point
    type PointBytes: AsRef<[u8]>;
    /// Size of serialized point in bytes
    const POINT_SIZE: usize;
    /// Serializes point
    ///
    /// Encoding is fixed-length for any point including the point at infinity.
    fn serialize_point(point: &Point<Self::Curve>) -> Self::PointBytes;
    /// Deserializes point
    fn deserialize_point(bytes: &[u8]) -> Result<Point<Self::Curve>, InvalidPoint>;

    /// Byte array that contains bytes representation of the scalar
    type ScalarBytes: AsRef<[u8]>;
    /// Size of serialized scalar in bytes
    const SCALAR_SIZE: usize;
    /// Serializes scalar
    fn serialize_scalar(scalar: &Scalar<Self::Curve>) -> Self::ScalarBytes;
    /// Deserializes scalar
    fn deserialize_scalar(bytes: &[u8]) -> Result<Scalar<Self::Curve>, InvalidScalar>;
    /// Deserializes secret scalar
    fn deserialize_secret_scalar(bytes: &[u8]) -> Result<SecretScalar<Self::Curve>, InvalidScalar> {
        let mut scalar = Self::deserialize_scalar(bytes)?;
        Ok(SecretScalar::new(&mut scalar))
    }
}

/// Nonce generation
///
/// Hashes 32 bytes of fresh randomness together with `additional_entropy` known only to the
/// signer (like its key share), so that a weak randomness source alone doesn't reveal the nonce.
pub fn generate_nonce<C: Ciphersuite>(
    rng: &mut (impl RngCore + CryptoRng),
    additional_entropy: impl AdditionalEntropy<C>,
) -> SecretScalar<C::Curve> {
    let mut random_bytes = [0u8; 32];
    rng.fill_bytes(&mut random_bytes);

    let additional_entropy = additional_entropy.to_bytes();

    let mut hash = C::h3(&[random_bytes.as_slice(), additional_entropy.as_ref()]);

    SecretScalar::new(&mut hash)
}

/// Additional entropy to [nonce generation](generate_nonce)
pub trait AdditionalEntropy<C: Ciphersuite> {
    /// Bytes arrays that fits the whole bytes representation of the entropy
    type Bytes<'b>: AsRef<[u8]>
    where
        Self: 'b;

    /// Returns bytes representation of the entropy encoded in compliance with [`C`](Ciphersuite)
    fn to_bytes(&self) -> Self::Bytes<'_>;
}

impl<C: Ciphersuite<Curve = E>, E: Curve> AdditionalEntropy<C> for crate::KeyShare<E> {
    type Bytes<'b> = <SecretScalar<E> as AdditionalEntropy<C>>::Bytes<'b>;
    fn to_bytes(&self) -> Self::Bytes<'_> {
        AdditionalEntropy::<C>::to_bytes(&self.x)
    }
}
impl<C: Ciphersuite<Curve = E>, E: Curve> AdditionalEntropy<C> for Scalar<E> {
    type Bytes<'b> = C::ScalarBytes;
    fn to_bytes(&self) -> Self::Bytes<'_> {
        C::serialize_scalar(self)
    }
}
impl<C: Ciphersuite<Curve = E>, E: Curve> AdditionalEntropy<C> for SecretScalar<E> {
    type Bytes<'b> = <Scalar<E> as AdditionalEntropy<C>>::Bytes<'b>;
    fn to_bytes(&self) -> Self::Bytes<'_> {
        AdditionalEntropy::<C>::to_bytes(self.as_ref())
    }
}
impl<C: Ciphersuite> AdditionalEntropy<C> for [u8] {
    type Bytes<'b> = &'b [u8];
    fn to_bytes(&self) -> Self::Bytes<'_> {
        self
    }
}
impl<C: Ciphersuite, const N: usize> AdditionalEntropy<C> for [u8; N] {
    type Bytes<'b> = &'b [u8; N];
    fn to_bytes(&self) -> Self::Bytes<'_> {
        self
    }
}
impl<C: Ciphersuite, T: AdditionalEntropy<C> + ?Sized> AdditionalEntropy<C> for &T {
    type Bytes<'b> = <T as AdditionalEntropy<C>>::Bytes<'b> where Self: 'b;
    fn to_bytes(&self) -> Self::Bytes<'_> {
        (*self).to_bytes()
    }
}
