//! Recursive evaluation of expression trees.
//!
//! Evaluating a term into a destination `D` with destination multiplier `β`
//! and outer multiplier `α`:
//!
//! - a leaf becomes one `sum` into `D`;
//! - a sum evaluates its left side with `β`, then its right side on top;
//! - a contraction runs one `contract` into `D`, after materializing each
//!   non-leaf side into an intermediate tensor.
//!
//! Every leaf is validated against the destination before any data is
//! written, so a failing expression leaves `D` untouched.

use std::borrow::Cow;

use tracing::{debug, debug_span};

use super::term::Term;
use super::view::LabeledView;
use crate::algebra::Element;
use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::tensor::ops::{bind_extents, check_unique};
use crate::tensor::sym::{check_term_flow, PairTag};
use crate::tensor::{Sym, Tensor, TensorOptions};

pub(crate) fn evaluate<T: Element, B: Backend>(
    dest: &mut Tensor<T, B>,
    labels: &[char],
    term: Term<'_, T, B>,
    beta: T,
) -> Result<()> {
    validate(dest, labels, &term)?;

    let target: String = labels.iter().collect();
    let span = debug_span!("evaluate", dest = dest.name().unwrap_or("-"), labels = %target);
    let _enter = span.enter();

    let one = dest.arithmetic().one();
    eval(dest, labels, term, one, beta, labels)
}

/// Check every leaf against the destination.
fn validate<T: Element, B: Backend>(
    dest: &Tensor<T, B>,
    labels: &[char],
    term: &Term<'_, T, B>,
) -> Result<()> {
    dest.check_labels(labels)?;
    if term.has_contraction() {
        check_unique(labels)?;
    }

    let leaves = term.leaves();
    let mut extents: Vec<(&[char], &[usize])> = vec![(labels, dest.lens())];
    for v in &leaves {
        v.tensor.check_labels(&v.labels)?;
        if v.tensor.world() != dest.world() {
            return Err(Error::WorldMismatch);
        }
        extents.push((&v.labels, v.tensor.lens()));
    }
    bind_extents(&extents)?;

    check_term_flow(labels, dest.sym(), |x, y| pair_tag(term, x, y))
}

/// How `term` relates the labels `x` and `y`: products multiply the
/// relations of their sides, sums must agree on them.
fn pair_tag<T: Element, B: Backend>(term: &Term<'_, T, B>, x: char, y: char) -> PairTag {
    match term {
        Term::Leaf(v) => PairTag::of(&v.labels[..], v.tensor.sym(), x, y),
        Term::Sum { left, right, .. } => pair_tag(left, x, y).sum(pair_tag(right, x, y)),
        Term::Contract { left, right, .. } => pair_tag(left, x, y).product(pair_tag(right, x, y)),
    }
}

/// `dest[labels] = β·dest[labels] + α·term`.
///
/// `outer` lists the labels needed outside `term`: the destination's and
/// those of every sibling on the way up.
fn eval<T: Element, B: Backend>(
    dest: &mut Tensor<T, B>,
    labels: &[char],
    term: Term<'_, T, B>,
    alpha: T,
    beta: T,
    outer: &[char],
) -> Result<()> {
    let ar = *dest.arithmetic();
    let one = ar.one();
    match term {
        Term::Leaf(v) => {
            let a = ar.mul(alpha, v.scale.unwrap_or(one));
            dest.sum_kernel(a, &v.tensor, &v.labels, beta, labels, None);
            Ok(())
        }
        Term::Sum { left, right, scale } => {
            let a = ar.mul(alpha, scale.unwrap_or(one));
            eval(dest, labels, *left, a, beta, outer)?;
            eval(dest, labels, *right, a, one, outer)
        }
        Term::Contract { left, right, scale } => {
            let (left_labels, right_labels) = (left.labels(), right.labels());
            let l = operand(dest, *left, &with(outer, &right_labels))?;
            let r = operand(dest, *right, &with(outer, &left_labels))?;

            let a = ar.mul(alpha, scale.unwrap_or(one));
            let a = ar.mul(ar.mul(a, l.scale.unwrap_or(one)), r.scale.unwrap_or(one));
            dest.contract_kernel(a, &l.tensor, &l.labels, &r.tensor, &r.labels, beta, labels, None);
            Ok(())
        }
    }
}

/// A contraction operand: leaves as they are, anything else materialized.
fn operand<'t, T: Element, B: Backend>(
    dest: &Tensor<T, B>,
    term: Term<'t, T, B>,
    outer: &[char],
) -> Result<LabeledView<'t, T, B>> {
    let term = match term {
        Term::Leaf(v) => return Ok(v),
        term => term,
    };

    let labels = free_labels(&term, outer);
    let (lens, sym) = layout(&term, &labels);
    let ar = *dest.arithmetic();
    let options = TensorOptions::new().arithmetic(ar);
    let mut tmp = Tensor::with_backend(&lens, &sym, dest.world(), options, dest.backend().clone())?;
    debug!(labels = %labels.iter().collect::<String>(), ?lens, ?sym, "materializing intermediate");

    eval(&mut tmp, &labels, term, ar.one(), ar.zero(), &labels)?;
    Ok(LabeledView {
        tensor: Cow::Owned(tmp),
        labels,
        scale: None,
    })
}

fn with(outer: &[char], more: &[char]) -> Vec<char> {
    let mut out = outer.to_vec();
    out.extend(more.iter().filter(|l| !outer.contains(l)));
    out
}

fn push_unique(out: &mut Vec<char>, labels: &[char]) {
    for &l in labels {
        if !out.contains(&l) {
            out.push(l);
        }
    }
}

/// Labels a term leaves open, given the labels needed outside it.
///
/// Leaves contribute their labels, sums the union of both sides, and a
/// contraction everything except the labels shared by both sides and not
/// needed outside.
pub(crate) fn free_labels<T: Element, B: Backend>(term: &Term<'_, T, B>, outer: &[char]) -> Vec<char> {
    let mut out = Vec::new();
    match term {
        Term::Leaf(v) => push_unique(&mut out, &v.labels),
        Term::Sum { left, right, .. } => {
            push_unique(&mut out, &free_labels(left, outer));
            push_unique(&mut out, &free_labels(right, outer));
        }
        Term::Contract { left, right, .. } => {
            let fl = free_labels(left, &with(outer, &right.labels()));
            let fr = free_labels(right, &with(outer, &left.labels()));
            for &l in fl.iter().chain(fr.iter()) {
                let shared = fl.contains(&l) && fr.contains(&l);
                if (!shared || outer.contains(&l)) && !out.contains(&l) {
                    out.push(l);
                }
            }
        }
    }
    out
}

/// Extents and symmetry of an intermediate holding `term` over `labels`.
fn layout<T: Element, B: Backend>(term: &Term<'_, T, B>, labels: &[char]) -> (Vec<usize>, Vec<Sym>) {
    let leaves = term.leaves();
    let lens = labels
        .iter()
        .map(|&l| {
            let (n, p) = first_carrier(&leaves, l).expect("free label comes from a leaf");
            leaves[n].tensor.lens()[p]
        })
        .collect();
    let mut sym: Vec<Sym> = labels
        .windows(2)
        .map(|w| pair_tag(term, w[0], w[1]).kept())
        .collect();
    // a run carries one tag
    for d in 1..sym.len() {
        if sym[d - 1] != Sym::NS && sym[d] != sym[d - 1] {
            sym[d] = Sym::NS;
        }
    }
    if !labels.is_empty() {
        sym.push(Sym::NS);
    }
    (lens, sym)
}

fn first_carrier<T: Element, B: Backend>(leaves: &[&LabeledView<'_, T, B>], l: char) -> Option<(usize, usize)> {
    leaves
        .iter()
        .enumerate()
        .find_map(|(n, v)| v.labels.iter().position(|&x| x == l).map(|p| (n, p)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::World;

    #[test]
    fn test_free_labels() {
        let world = World::new(1).unwrap();
        let a = Tensor::<f64>::zeros(&[2, 2], &world).unwrap();

        // (A[ij] B[jk]) C[kl] into [il]: j is internal, k is needed by C
        let t = a.idx("ij") * a.idx("jk");
        assert_eq!(free_labels(&t, &['i', 'l', 'k', 'l']), vec!['i', 'k']);

        // a label needed outside survives the inner contraction
        assert_eq!(free_labels(&t, &['j']), vec!['i', 'j', 'k']);

        let t = a.idx("ij") + a.idx("jk");
        assert_eq!(free_labels(&t, &[]), vec!['i', 'j', 'k']);
    }

    #[test]
    fn test_intermediate_symmetry() {
        let world = World::new(1).unwrap();
        let s = Tensor::<f64>::matrix(3, 3, Sym::SY, &world).unwrap();
        let n = Tensor::<f64>::zeros(&[3, 3], &world).unwrap();
        let v = Tensor::<f64>::vector(3, &world).unwrap();

        let t = s.idx("ij") * v.idx("k");
        let (lens, sym) = layout(&t, &['i', 'j', 'k']);
        assert_eq!(lens, vec![3, 3, 3]);
        assert_eq!(sym, vec![Sym::SY, Sym::NS, Sym::NS]);

        // a second carrier of i and j without the tag drops it
        let t = s.idx("ij") + n.idx("ij");
        let (_, sym) = layout(&t, &['i', 'j']);
        assert_eq!(sym, vec![Sym::NS, Sym::NS]);

        // the relation does not depend on the order of the pair
        let t = s.idx("ij") * v.idx("k");
        let (_, sym) = layout(&t, &['j', 'i', 'k']);
        assert_eq!(sym, vec![Sym::SY, Sym::NS, Sym::NS]);

        // a factor holding only one label of the pair drops it
        let t = s.idx("ij") * v.idx("i");
        let (_, sym) = layout(&t, &['i', 'j']);
        assert_eq!(sym, vec![Sym::NS, Sym::NS]);
    }

    #[test]
    fn test_antisymmetric_factors_multiply_to_symmetric() {
        let world = World::new(1).unwrap();
        let a = Tensor::<f64>::matrix(3, 3, Sym::AS, &world).unwrap();
        let s = Tensor::<f64>::matrix(3, 3, Sym::SY, &world).unwrap();

        let (_, sym) = layout(&(a.idx("ij") * a.idx("ij")), &['i', 'j']);
        assert_eq!(sym, vec![Sym::SH, Sym::NS]);
        let (_, sym) = layout(&(a.idx("ij") * s.idx("ji")), &['i', 'j']);
        assert_eq!(sym, vec![Sym::AS, Sym::NS]);
        let (_, sym) = layout(&(a.idx("ij") + a.idx("ij")), &['i', 'j']);
        assert_eq!(sym, vec![Sym::AS, Sym::NS]);
    }

    #[test]
    fn test_product_of_antisymmetric_intermediate() {
        let world = World::new(1).unwrap();
        let mut a = Tensor::<f64>::matrix(3, 3, Sym::AS, &world).unwrap();
        let mut b = Tensor::<f64>::matrix(3, 3, Sym::AS, &world).unwrap();
        // A(0,1) = 1, B(0,1) = 2
        a.write(&[3], &[1.0]).unwrap();
        b.write(&[3], &[2.0]).unwrap();
        let ones = Tensor::from_data(&[1.0], &[1], &world).unwrap();

        let mut d = Tensor::<f64>::zeros(&[3, 3], &world).unwrap();
        d.idx_mut("ij")
            .assign((a.idx("ij") * b.idx("ij")) * ones.idx("k"))
            .unwrap();
        // (-1)·(-2) below the diagonal
        assert_eq!(d.read(&[3, 1]).unwrap(), vec![2.0, 2.0]);

        // the element-wise product cannot land in an antisymmetric tensor
        let mut c = Tensor::<f64>::matrix(3, 3, Sym::AS, &world).unwrap();
        let err = c.idx_mut("ij").assign(a.idx("ij") * b.idx("ij")).unwrap_err();
        assert!(matches!(err, Error::SymmetryViolation(_)));
        assert_eq!(c.data(), &[0.0; 9]);

        // but a symmetric one holds it exactly
        let mut s = Tensor::<f64>::matrix(3, 3, Sym::SY, &world).unwrap();
        s.idx_mut("ij").assign(a.idx("ij") * b.idx("ij")).unwrap();
        assert_eq!(s.read(&[3, 1, 0]).unwrap(), vec![2.0, 2.0, 0.0]);
    }

    #[test]
    fn test_both_sides_materialized() {
        let world = World::new(1).unwrap();
        // A = [[1, 2], [3, 4]], B = I, C = 2I, D = [[0, 1], [1, 0]]
        let a = Tensor::from_data(&[1.0, 3.0, 2.0, 4.0], &[2, 2], &world).unwrap();
        let b = Tensor::from_data(&[1.0, 0.0, 0.0, 1.0], &[2, 2], &world).unwrap();
        let c = Tensor::from_data(&[2.0, 0.0, 0.0, 2.0], &[2, 2], &world).unwrap();
        let d = Tensor::from_data(&[0.0, 1.0, 1.0, 0.0], &[2, 2], &world).unwrap();

        let mut out = Tensor::<f64>::zeros(&[2, 2], &world).unwrap();
        out.idx_mut("im")
            .assign((a.idx("ij") * b.idx("jk")) * (c.idx("kl") * d.idx("lm")))
            .unwrap();
        // A · 2D = 2·[[2, 1], [4, 3]]
        assert_eq!(out.data(), &[4.0, 8.0, 2.0, 6.0]);

        let mut direct = Tensor::<f64>::zeros(&[2, 2], &world).unwrap();
        let mut cd = Tensor::<f64>::zeros(&[2, 2], &world).unwrap();
        cd.contract(1.0, &c, "kl", &d, "lm", 0.0, "km").unwrap();
        direct.contract(1.0, &a, "ik", &cd, "km", 0.0, "im").unwrap();
        assert_eq!(out.data(), direct.data());
    }

    #[test]
    fn test_failed_validation_leaves_destination() {
        let world = World::new(1).unwrap();
        let a = Tensor::from_data(&[1.0, 2.0], &[2], &world).unwrap();
        let b = Tensor::<f64>::zeros(&[3], &world).unwrap();
        let mut c = Tensor::from_data(&[5.0, 5.0], &[2], &world).unwrap();

        let err = c.idx_mut("i").assign(a.idx("i") + b.idx("i")).unwrap_err();
        assert_eq!(
            err,
            Error::ExtentMismatch {
                label: 'i',
                first: 2,
                second: 3
            }
        );
        assert_eq!(c.data(), &[5.0, 5.0]);

        let other = World::new(1).unwrap();
        let d = Tensor::<f64>::zeros(&[2], &other).unwrap();
        let err = c.idx_mut("i").add_assign(a.idx("i") * d.idx("i")).unwrap_err();
        assert_eq!(err, Error::WorldMismatch);

        let err = c.idx_mut("ij").assign(a.idx("i")).unwrap_err();
        assert_eq!(err, Error::LabelCount { ndim: 1, got: 2 });
    }

    #[test]
    fn test_nested_contraction() {
        let world = World::new(1).unwrap();
        // A = [[1, 2], [3, 4]], v = [1, 1], w = [1, 2]
        let a = Tensor::from_data(&[1.0, 3.0, 2.0, 4.0], &[2, 2], &world).unwrap();
        let v = Tensor::from_data(&[1.0, 1.0], &[2], &world).unwrap();
        let w = Tensor::from_data(&[1.0, 2.0], &[2], &world).unwrap();
        let mut s = Tensor::scalar(0.0, &world).unwrap();

        // w^T A v = [1, 2] . [3, 7] = 17
        s.idx_mut("").assign(w.idx("i") * (a.idx("ij") * v.idx("j"))).unwrap();
        assert_eq!(s.get_val().unwrap(), 17.0);

        // (A + A) v scaled by one half gives A v
        let mut out = Tensor::<f64>::zeros(&[2], &world).unwrap();
        out.idx_mut("i")
            .assign((a.idx("ij") + a.idx("ij")) * v.idx("j") * 0.5)
            .unwrap();
        assert_eq!(out.data(), &[3.0, 7.0]);
    }
}
