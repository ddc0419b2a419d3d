//! Property tests for expressions, coordinate I/O and symmetry.

use ctf::{Sym, Tensor, World};
use proptest::prelude::*;

/// A `(m, k, n)` matmul shape with column-major data for both operands.
fn arb_matmul() -> impl Strategy<Value = ((usize, usize, usize), Vec<f64>, Vec<f64>)> {
    (1usize..5, 1usize..5, 1usize..5).prop_flat_map(|(m, k, n)| {
        (
            Just((m, k, n)),
            prop::collection::vec(-8i32..8, m * k).prop_map(to_f64),
            prop::collection::vec(-8i32..8, k * n).prop_map(to_f64),
        )
    })
}

fn to_f64(v: Vec<i32>) -> Vec<f64> {
    v.into_iter().map(f64::from).collect()
}

fn arb_tag() -> impl Strategy<Value = Sym> {
    prop_oneof![Just(Sym::SY), Just(Sym::AS), Just(Sym::SH)]
}

/// Global coordinates and values for a 4x4 matrix.
fn arb_writes() -> impl Strategy<Value = Vec<(usize, i32)>> {
    prop::collection::vec((0usize..16, -50i32..50), 1..20)
}

fn tagged(tag: Sym, writes: &[(usize, i32)], world: &World) -> Tensor<f64> {
    let mut t = Tensor::<f64>::matrix(4, 4, tag, world).unwrap();
    for &(g, v) in writes {
        t.write(&[g], &[f64::from(v)]).unwrap();
    }
    t
}

fn check_images(t: &Tensor<f64>, tag: Sym) -> Result<(), TestCaseError> {
    for i in 0..4 {
        for j in 0..4 {
            let a = t.read(&[i + 4 * j]).unwrap()[0];
            let b = t.read(&[j + 4 * i]).unwrap()[0];
            if tag == Sym::AS {
                prop_assert_eq!(a, -b);
            } else {
                prop_assert_eq!(a, b);
            }
            if i == j && tag.is_hollow() {
                prop_assert_eq!(a, 0.0);
            }
        }
    }
    Ok(())
}

proptest! {
    /// Leaf-only contraction through an expression equals a direct contract.
    #[test]
    fn expression_matches_contract(((m, k, n), a, b) in arb_matmul()) {
        let world = World::new(2).unwrap();
        let a = Tensor::from_data(&a, &[m, k], &world).unwrap();
        let b = Tensor::from_data(&b, &[k, n], &world).unwrap();

        let mut direct = Tensor::<f64>::zeros(&[m, n], &world).unwrap();
        direct.contract(1.0, &a, "ik", &b, "kj", 0.0, "ij").unwrap();

        let mut expr = Tensor::<f64>::zeros(&[m, n], &world).unwrap();
        expr.idx_mut("ij").assign(a.idx("ik") * b.idx("kj")).unwrap();

        prop_assert_eq!(direct.data(), expr.data());
    }

    /// Evaluating the same tree twice gives the same result.
    #[test]
    fn rebuilt_tree_is_deterministic(((m, k, n), a, b) in arb_matmul()) {
        let world = World::new(1).unwrap();
        let a = Tensor::from_data(&a, &[m, k], &world).unwrap();
        let b = Tensor::from_data(&b, &[k, n], &world).unwrap();

        let mut first = Tensor::<f64>::zeros(&[m, n], &world).unwrap();
        let mut second = Tensor::<f64>::zeros(&[m, n], &world).unwrap();
        first.idx_mut("ij").assign((a.idx("ik") * b.idx("kj")) * 2.0 - a.idx("ik") * b.idx("kj")).unwrap();
        second.idx_mut("ij").assign((a.idx("ik") * b.idx("kj")) * 2.0 - a.idx("ik") * b.idx("kj")).unwrap();

        prop_assert_eq!(first.data(), second.data());
    }

    /// Written values read back unchanged.
    #[test]
    fn write_read_roundtrip(
        values in prop::collection::vec(-100i32..100, 12).prop_map(to_f64),
        order in Just((0..12usize).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let world = World::new(3).unwrap();
        let mut t = Tensor::<f64>::zeros(&[3, 4], &world).unwrap();
        let vals: Vec<f64> = order.iter().map(|&g| values[g]).collect();
        t.write(&order, &vals).unwrap();
        prop_assert_eq!(t.read(&order).unwrap(), vals);
        prop_assert_eq!(t.read_all(), values);
    }

    /// `α = 0, β = 1` leaves both sides of a blended transfer untouched.
    #[test]
    fn identity_blend_is_noop(
        stored in prop::collection::vec(-100i32..100, 6).prop_map(to_f64),
        supplied in prop::collection::vec(-100i32..100, 6).prop_map(to_f64),
    ) {
        let world = World::new(1).unwrap();
        let mut t = Tensor::from_data(&stored, &[6], &world).unwrap();
        let coords: Vec<usize> = (0..6).collect();

        t.write_scaled(0.0, 1.0, &coords, &supplied).unwrap();
        prop_assert_eq!(t.data(), &stored[..]);

        let mut out = supplied.clone();
        t.read_scaled(0.0, 1.0, &coords, &mut out).unwrap();
        prop_assert_eq!(out, supplied);
    }

    /// Symmetric images agree after any sequence of writes.
    #[test]
    fn symmetric_images_agree(writes in arb_writes(), tag in arb_tag()) {
        let world = World::new(1).unwrap();
        let t = tagged(tag, &writes, &world);
        check_images(&t, tag)?;
    }

    /// A same-tag sum keeps the images of the destination in step.
    #[test]
    fn symmetric_images_agree_after_sum(
        src in arb_writes(),
        dst in arb_writes(),
        tag in arb_tag(),
        alpha in -3i32..3,
        beta in -3i32..3,
    ) {
        let world = World::new(1).unwrap();
        let a = tagged(tag, &src, &world);
        let mut b = tagged(tag, &dst, &world);
        b.sum(f64::from(alpha), &a, "ij", f64::from(beta), "ij").unwrap();
        check_images(&b, tag)?;
    }

    /// An outer product lands projected onto the destination symmetry.
    #[test]
    fn symmetric_images_agree_after_contract(
        v in prop::collection::vec(-8i32..8, 4).prop_map(to_f64),
        w in prop::collection::vec(-8i32..8, 4).prop_map(to_f64),
        tag in arb_tag(),
    ) {
        let world = World::new(1).unwrap();
        let v = Tensor::from_data(&v, &[4], &world).unwrap();
        let w = Tensor::from_data(&w, &[4], &world).unwrap();
        let mut c = Tensor::<f64>::matrix(4, 4, tag, &world).unwrap();
        c.contract(1.0, &v, "i", &w, "j", 0.0, "ij").unwrap();
        check_images(&c, tag)?;
    }

    /// Copying a diagonal block between same-tag tensors keeps the images.
    #[test]
    fn symmetric_images_agree_after_slice_assign(
        src in arb_writes(),
        dst in arb_writes(),
        tag in arb_tag(),
        (lo, hi) in (0usize..4).prop_flat_map(|lo| (Just(lo), lo + 1..=4)),
        beta in -3i32..3,
    ) {
        let world = World::new(1).unwrap();
        let a = tagged(tag, &src, &world);
        let mut b = tagged(tag, &dst, &world);
        b.slice_assign(&[lo, lo], &[hi, hi], f64::from(beta), &a, &[lo, lo], &[hi, hi], 1.0)
            .unwrap();
        check_images(&b, tag)?;
    }

    /// The work estimate never shrinks when an extent grows.
    #[test]
    fn cost_estimate_is_monotone(m in 1usize..6, k in 1usize..6, n in 1usize..6, grow in 1usize..4) {
        let world = World::new(4).unwrap();
        let cost = |m: usize| {
            let a = Tensor::<f64>::zeros(&[m, k], &world).unwrap();
            let b = Tensor::<f64>::zeros(&[k, n], &world).unwrap();
            let c = Tensor::<f64>::zeros(&[m, n], &world).unwrap();
            c.estimate_cost_contract(&a, "ik", &b, "kj", "ij").unwrap()
        };
        prop_assert!(cost(m + grow) >= cost(m));
    }
}
