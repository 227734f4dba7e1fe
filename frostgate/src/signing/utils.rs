use alloc::vec::Vec;

use digest::{FixedOutput, Update};
use generic_ec::{Curve, NonZero, Point, Scalar};

use crate::ciphersuite::Ciphersuite;

use super::round1::PublicCommitments;

/// Signer identifier along with its commitments
pub type CommitmentEntry<E> = (NonZero<Scalar<E>>, PublicCommitments<E>);

/// Sorts the commitment list by signer identifier
///
/// Returns `Err(id)` if some signer appears in the list more than once.
pub fn sort_commitment_list<E: Curve>(
    commitment_list: &mut [CommitmentEntry<E>],
) -> Result<(), NonZero<Scalar<E>>> {
    commitment_list.sort_unstable_by_key(|(i, _)| *i);
    match commitment_list
        .windows(2)
        .find(|win| win[0].0 == win[1].0)
    {
        Some(win) => Err(win[0].0),
        None => Ok(()),
    }
}

/// Encodes a list of commitments as `id_1 || D_1 || E_1 || ... || id_k || D_k || E_k`
///
/// Instead of returning encoded data as a string, it rather feeds it directly into the hash
pub fn encode_group_commitment_list<C: Ciphersuite>(
    mut output: C::Digest,
    commitment_list: &[CommitmentEntry<C::Curve>],
) -> C::Digest {
    for (
        i,
        PublicCommitments {
            hiding_comm,
            binding_comm,
        },
    ) in commitment_list
    {
        output.update(C::serialize_scalar(i).as_ref());
        output.update(C::serialize_point(hiding_comm).as_ref());
        output.update(C::serialize_point(binding_comm).as_ref());
    }
    output
}

/// Computes binding factors of all signers
///
/// Binding factor of signer `i` is `H1(PK || H4(msg) || H5(commitment_list) || i)`, it binds
/// signer's nonces to the message and to the full set of commitments of this session.
///
/// `commitments_list` must be sorted in ascending order by identifier. The implementation
/// makes debug assertation to make sure it holds. Output list is sorted by signer ID as well.
pub fn compute_binding_factors<C: Ciphersuite>(
    group_public_key: &Point<C::Curve>,
    commitment_list: &[CommitmentEntry<C::Curve>],
    msg: &[u8],
) -> Vec<(NonZero<Scalar<C::Curve>>, Scalar<C::Curve>)> {
    debug_assert!(
        is_sorted_by_key(commitment_list, |(i, _)| i),
        "commitments list must be sorted"
    );

    let pk_bytes = C::serialize_point(group_public_key);
    let msg_hash = C::h4().chain(msg).finalize_fixed();
    let encoded_commitment_hash =
        encode_group_commitment_list::<C>(C::h5(), commitment_list).finalize_fixed();

    commitment_list
        .iter()
        .map(|(i, _)| {
            let binding_factor = C::h1(&[
                pk_bytes.as_ref(),
                &msg_hash,
                &encoded_commitment_hash,
                C::serialize_scalar(i).as_ref(),
            ]);
            (*i, binding_factor)
        })
        .collect()
}

/// Computes a group commitment `R = sum_k (D_k + rho_k * E_k)`
///
/// Assumes that commitments and binding factors come in the same order, i.e. `commitment_list[i].0 == binding_factor_list[i].0`
/// for all i. Assumtion is enforced via debug assertation.
pub fn compute_group_commitment<'a, E: Curve>(
    commitment_list: impl IntoIterator<Item = &'a CommitmentEntry<E>>,
    binding_factor_list: impl IntoIterator<Item = &'a (NonZero<Scalar<E>>, Scalar<E>)>,
) -> Point<E> {
    commitment_list
        .into_iter()
        .zip(binding_factor_list)
        .fold(Point::zero(), |acc, ((i, comm), (_i, binding_factor))| {
            debug_assert_eq!(i, _i);
            acc + comm.hiding_comm + comm.binding_comm * binding_factor
        })
}

pub fn is_sorted_by_key<T, B, F>(slice: &[T], f: F) -> bool
where
    F: Fn(&T) -> &B,
    B: Ord,
{
    slice.windows(2).all(|win| f(&win[0]) <= f(&win[1]))
}
