//! Expression trees built from labeled views.

use std::ops::{Add, Mul, Neg, Sub};

use num_complex::{Complex32, Complex64};

use super::view::LabeledView;
use crate::algebra::{Arithmetic, Element};
use crate::backend::Backend;

/// An unevaluated tensor expression.
///
/// Built by the arithmetic operators on [`LabeledView`]s and consumed by
/// exactly one destination trigger.
///
/// # Example
///
/// ```rust
/// use ctf::{Term, Tensor, World};
///
/// let world = World::new(1).unwrap();
/// let a = Tensor::<f64>::zeros(&[2, 2], &world).unwrap();
/// let b = Tensor::<f64>::zeros(&[2, 2], &world).unwrap();
///
/// let t = a.idx("ij") * b.idx("jk") + a.idx("ik");
/// assert!(matches!(t, Term::Sum { .. }));
/// assert_eq!(t.labels(), vec!['i', 'j', 'k']);
/// ```
#[derive(Clone)]
pub enum Term<'a, T: Element, B: Backend> {
    Leaf(LabeledView<'a, T, B>),
    Sum {
        left: Box<Term<'a, T, B>>,
        right: Box<Term<'a, T, B>>,
        scale: Option<T>,
    },
    Contract {
        left: Box<Term<'a, T, B>>,
        right: Box<Term<'a, T, B>>,
        scale: Option<T>,
    },
}

impl<'a, T: Element, B: Backend> Term<'a, T, B> {
    pub fn sum(left: Term<'a, T, B>, right: Term<'a, T, B>) -> Self {
        Term::Sum {
            left: Box::new(left),
            right: Box::new(right),
            scale: None,
        }
    }

    pub fn contract(left: Term<'a, T, B>, right: Term<'a, T, B>) -> Self {
        Term::Contract {
            left: Box::new(left),
            right: Box::new(right),
            scale: None,
        }
    }

    /// Every label of every leaf, in first-occurrence order.
    pub fn labels(&self) -> Vec<char> {
        let mut out = Vec::new();
        self.for_each_leaf(&mut |v| {
            for &l in &v.labels {
                if !out.contains(&l) {
                    out.push(l);
                }
            }
        });
        out
    }

    /// Leaves from left to right.
    pub fn leaves(&self) -> Vec<&LabeledView<'a, T, B>> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'t>(&'t self, out: &mut Vec<&'t LabeledView<'a, T, B>>) {
        match self {
            Term::Leaf(v) => out.push(v),
            Term::Sum { left, right, .. } | Term::Contract { left, right, .. } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }

    pub(crate) fn for_each_leaf(&self, f: &mut impl FnMut(&LabeledView<'a, T, B>)) {
        match self {
            Term::Leaf(v) => f(v),
            Term::Sum { left, right, .. } | Term::Contract { left, right, .. } => {
                left.for_each_leaf(f);
                right.for_each_leaf(f);
            }
        }
    }

    pub(crate) fn has_contraction(&self) -> bool {
        match self {
            Term::Leaf(_) => false,
            Term::Contract { .. } => true,
            Term::Sum { left, right, .. } => left.has_contraction() || right.has_contraction(),
        }
    }

    /// Arithmetic of the leftmost leaf.
    fn arithmetic(&self) -> Arithmetic<T> {
        match self {
            Term::Leaf(v) => *v.tensor.arithmetic(),
            Term::Sum { left, .. } | Term::Contract { left, .. } => left.arithmetic(),
        }
    }

    /// Fold `alpha` into the outermost multiplier.
    pub fn scaled(self, alpha: T) -> Self {
        let ar = self.arithmetic();
        self.map_scale(|s| ar.mul(s.unwrap_or(ar.one()), alpha))
    }

    pub(crate) fn negated_in(self, ar: &Arithmetic<T>) -> Self {
        let one = ar.one();
        self.map_scale(|s| -s.unwrap_or(one))
    }

    fn map_scale(self, f: impl FnOnce(Option<T>) -> T) -> Self {
        match self {
            Term::Leaf(mut v) => {
                v.scale = Some(f(v.scale));
                Term::Leaf(v)
            }
            Term::Sum { left, right, scale } => Term::Sum {
                left,
                right,
                scale: Some(f(scale)),
            },
            Term::Contract { left, right, scale } => Term::Contract {
                left,
                right,
                scale: Some(f(scale)),
            },
        }
    }
}

impl<'a, T: Element, B: Backend> From<LabeledView<'a, T, B>> for Term<'a, T, B> {
    fn from(view: LabeledView<'a, T, B>) -> Self {
        Term::Leaf(view)
    }
}

impl<'a, T: Element, B: Backend> Neg for Term<'a, T, B> {
    type Output = Self;

    fn neg(self) -> Self {
        let ar = self.arithmetic();
        self.negated_in(&ar)
    }
}

macro_rules! impl_binary_ops {
    ($lhs:ident, $rhs:ident) => {
        impl<'a, T: Element, B: Backend> Add<$rhs<'a, T, B>> for $lhs<'a, T, B> {
            type Output = Term<'a, T, B>;

            fn add(self, rhs: $rhs<'a, T, B>) -> Term<'a, T, B> {
                Term::sum(self.into(), rhs.into())
            }
        }

        impl<'a, T: Element, B: Backend> Sub<$rhs<'a, T, B>> for $lhs<'a, T, B> {
            type Output = Term<'a, T, B>;

            fn sub(self, rhs: $rhs<'a, T, B>) -> Term<'a, T, B> {
                Term::sum(self.into(), -Term::from(rhs))
            }
        }

        impl<'a, T: Element, B: Backend> Mul<$rhs<'a, T, B>> for $lhs<'a, T, B> {
            type Output = Term<'a, T, B>;

            fn mul(self, rhs: $rhs<'a, T, B>) -> Term<'a, T, B> {
                Term::contract(self.into(), rhs.into())
            }
        }
    };
}

impl_binary_ops!(LabeledView, LabeledView);
impl_binary_ops!(LabeledView, Term);
impl_binary_ops!(Term, LabeledView);
impl_binary_ops!(Term, Term);

macro_rules! impl_scalar_mul {
    ($($t:ty),*) => {$(
        impl<'a, B: Backend> Mul<$t> for Term<'a, $t, B> {
            type Output = Self;

            fn mul(self, alpha: $t) -> Self {
                self.scaled(alpha)
            }
        }

        impl<'a, B: Backend> Mul<Term<'a, $t, B>> for $t {
            type Output = Term<'a, $t, B>;

            fn mul(self, term: Term<'a, $t, B>) -> Term<'a, $t, B> {
                term.scaled(self)
            }
        }
    )*};
}

impl_scalar_mul!(f32, f64, Complex32, Complex64);
