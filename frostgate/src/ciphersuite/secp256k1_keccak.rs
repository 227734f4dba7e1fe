use digest::Digest;
use sha3::Keccak256;

use crate::Ciphersuite;

/// FROST(secp256k1, Keccak-256) ciphersuite that produces EVM-verifiable signatures
///
/// Points are encoded as 64 bytes: big-endian `x` coordinate followed by big-endian `y`
/// coordinate (the point at infinity is encoded as 64 zero bytes). Scalars are encoded
/// as 32 bytes big-endian.
///
/// Challenge is computed as `keccak256(R.x || R.y || P.x || P.y || msg) mod q` without any
/// domain separation, so a contract can recompute it with a single `keccak256` call.
/// Binding factors and nonces are derived via domain-separated Keccak-256.
#[derive(Debug, Clone, Copy)]
pub struct Secp256k1Keccak;

impl Ciphersuite for Secp256k1Keccak {
    const NAME: &'static str = "FROST-secp256k1-KECCAK256-v1";

    type Curve = generic_ec::curves::Secp256k1;
    type Digest = Keccak256;

    fn h1(msg: &[&[u8]]) -> generic_ec::Scalar<Self::Curve> {
        hash_to_scalar(msg, &[Self::NAME.as_bytes(), b"rho"])
    }

    fn h2(msg: &[&[u8]]) -> generic_ec::Scalar<Self::Curve> {
        hash_to_scalar(msg, &[])
    }

    fn h3(msg: &[&[u8]]) -> generic_ec::Scalar<Self::Curve> {
        hash_to_scalar(msg, &[Self::NAME.as_bytes(), b"nonce"])
    }

    fn h4() -> Self::Digest {
        Keccak256::new()
            .chain_update(Self::NAME)
            .chain_update(b"msg")
    }

    fn h5() -> Self::Digest {
        Keccak256::new()
            .chain_update(Self::NAME)
            .chain_update(b"com")
    }

    type PointBytes = [u8; 64];
    const POINT_SIZE: usize = 64;
    fn serialize_point(point: &generic_ec::Point<Self::Curve>) -> Self::PointBytes {
        let mut bytes = [0u8; 64];
        let encoded = point.to_bytes(false);
        // Uncompressed point is `0x04 || x || y`, point at infinity has shorter encoding
        if let Some(xy) = encoded.as_ref().get(1..) {
            if xy.len() == bytes.len() {
                bytes.copy_from_slice(xy);
            }
        }
        bytes
    }
    fn deserialize_point(
        bytes: &[u8],
    ) -> Result<generic_ec::Point<Self::Curve>, generic_ec::errors::InvalidPoint> {
        if bytes.len() != Self::POINT_SIZE {
            return Err(generic_ec::errors::InvalidPoint);
        }
        if bytes.iter().all(|b| *b == 0) {
            return Ok(generic_ec::Point::zero());
        }
        let mut uncompressed = [0u8; 65];
        uncompressed[0] = 0x04;
        uncompressed[1..].copy_from_slice(bytes);
        generic_ec::Point::from_bytes(uncompressed)
    }

    type ScalarBytes = generic_ec::EncodedScalar<Self::Curve>;
    const SCALAR_SIZE: usize = 32;
    fn serialize_scalar(scalar: &generic_ec::Scalar<Self::Curve>) -> Self::ScalarBytes {
        scalar.to_be_bytes()
    }
    fn deserialize_scalar(
        bytes: &[u8],
    ) -> Result<generic_ec::Scalar<Self::Curve>, generic_ec::errors::InvalidScalar> {
        generic_ec::Scalar::from_be_bytes(bytes)
    }
}

fn hash_to_scalar(
    msgs: &[&[u8]],
    dsts: &[&[u8]],
) -> generic_ec::Scalar<<Secp256k1Keccak as Ciphersuite>::Curve> {
    let mut hash = Keccak256::new();
    for dst in dsts {
        hash.update(dst);
    }
    for msg in msgs {
        hash.update(msg);
    }
    let hash = hash.finalize();

    generic_ec::Scalar::from_be_bytes_mod_order(hash)
}
