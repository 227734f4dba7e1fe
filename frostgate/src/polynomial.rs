//! Polynomial secret sharing
//!
//! Each DKG participant samples a random polynomial $f(x) = c_0 + c_1 x + \dots + c_{t-1} x^{t-1}$,
//! where $c_0$ is its long-term secret, and hands out $f(j)$ to participant with identifier $j$.
//! Feldman commitments $C_k = c_k \cdot G$ let a recipient check the share without learning the
//! polynomial.

use alloc::vec::Vec;

use generic_ec::{Curve, NonZero, Point, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};

/// Polynomial with secret coefficients
///
/// Coefficients are zeroized on drop.
pub struct Polynomial<E: Curve> {
    coefficients: Vec<SecretScalar<E>>,
}

impl<E: Curve> Polynomial<E> {
    /// Samples a polynomial with `t` uniformly random coefficients, i.e. of degree `t - 1`
    ///
    /// Returns `None` if `t == 0`
    pub fn random(rng: &mut (impl RngCore + CryptoRng), t: u16) -> Option<Self> {
        if t == 0 {
            return None;
        }
        let coefficients = (0..t).map(|_| SecretScalar::random(&mut *rng)).collect();
        Some(Self { coefficients })
    }

    /// Free coefficient $c_0$ which is the secret being shared
    pub fn secret(&self) -> &SecretScalar<E> {
        // `coefficients` is never empty, see the constructor
        &self.coefficients[0]
    }

    /// Number of coefficients (threshold)
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Always returns `false` as polynomial has at least one coefficient
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Evaluates the polynomial at point `x`
    ///
    /// Alias to [calculate_secret_share]
    pub fn evaluate(&self, x: &Scalar<E>) -> SecretScalar<E> {
        let mut share = calculate_secret_share(self.coefficients.iter().map(|c_k| c_k.as_ref()), x);
        SecretScalar::new(&mut share)
    }

    /// Feldman commitments `[c_k * G]` to all coefficients
    pub fn commit(&self) -> Vec<Point<E>> {
        self.coefficients
            .iter()
            .map(|c_k| Point::generator() * c_k)
            .collect()
    }
}

/// Evaluates the polynomial defined by `coefficients` at `id`
///
/// Computes $\sum_k c_k \cdot id^k$ by direct summation with a running power of `id`.
pub fn calculate_secret_share<'c, E: Curve>(
    coefficients: impl IntoIterator<Item = &'c Scalar<E>>,
    id: &Scalar<E>,
) -> Scalar<E> {
    let mut share = Scalar::zero();
    let mut id_to_the_k = Scalar::one();
    for c_k in coefficients {
        share = share + c_k * id_to_the_k;
        id_to_the_k = id_to_the_k * id;
    }
    share
}

/// Evaluates committed polynomial at point `id`
///
/// Given Feldman commitments $C_k = c_k \cdot G$, returns $f(id) \cdot G = \sum_k id^k \cdot C_k$
pub fn evaluate_commitments<E: Curve>(commitments: &[Point<E>], id: &Scalar<E>) -> Point<E> {
    let (_, result) = commitments.iter().fold(
        (Scalar::<E>::one(), Point::<E>::zero()),
        |(id_to_the_k, sum_so_far), comm_k| (id_to_the_k * id, sum_so_far + comm_k * id_to_the_k),
    );
    result
}

/// Verifies secret share against dealer commitments
///
/// Checks that `share * G == sum_k id^k * commitments[k]`, i.e. that the share is evaluation
/// of committed polynomial at point `id`. Commitments must contain all `t` coefficient
/// commitments, not only the free term.
pub fn verify_secret_share<E: Curve>(
    share: &Scalar<E>,
    commitments: &[Point<E>],
    id: &NonZero<Scalar<E>>,
) -> bool {
    !commitments.is_empty() && Point::generator() * share == evaluate_commitments(commitments, id)
}

/// Sums up commitments degree-wise
///
/// Output commitments commit to the sum of committed polynomials. Returns `None` if
/// polynomials are of different degree or list is empty.
pub fn sum_commitments<'c, E: Curve>(
    polynomials: impl IntoIterator<Item = &'c [Point<E>]>,
) -> Option<Vec<Point<E>>> {
    let mut polynomials = polynomials.into_iter();
    let mut sum = polynomials.next()?.to_vec();
    for commitments in polynomials {
        if commitments.len() != sum.len() {
            return None;
        }
        for (acc, comm_k) in sum.iter_mut().zip(commitments) {
            *acc = *acc + comm_k;
        }
    }
    Some(sum)
}
