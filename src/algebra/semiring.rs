//! Compile-time semirings.

use super::Scalar;

/// A semiring `(S, ⊕, ⊗, 0, 1)` over a scalar type, named at the type level.
///
/// Implementors are zero-sized markers: the operations work on plain
/// scalars, so a semiring turns into an [`Arithmetic`](super::Arithmetic)
/// table without wrapping or unwrapping values.
///
/// | Semiring | ⊕   | ⊗ | 0   | 1 |
/// |----------|-----|---|-----|---|
/// | Standard | +   | × | 0   | 1 |
/// | MaxPlus  | max | + | min | 0 |
/// | MinPlus  | min | + | max | 0 |
/// | MaxMul   | max | × | 0   | 1 |
///
/// `0` must annihilate under ⊗ and ⊗ must distribute over ⊕ for
/// contractions to be independent of evaluation order.
pub trait Semiring: Copy + Send + Sync + 'static {
    type Scalar: Scalar;

    /// Identity of ⊕.
    fn zero() -> Self::Scalar;

    /// Identity of ⊗.
    fn one() -> Self::Scalar;

    fn add(a: Self::Scalar, b: Self::Scalar) -> Self::Scalar;

    fn mul(a: Self::Scalar, b: Self::Scalar) -> Self::Scalar;
}
