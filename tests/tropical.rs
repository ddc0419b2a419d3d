//! Tests for tropical arithmetic on tensors.
//! Run with: cargo test --test tropical --features tropical

#![cfg(feature = "tropical")]

use ctf::{Arithmetic, MaxMul, MaxPlus, MinPlus, Sym, Tensor, TensorOptions, World};

fn with_arithmetic(data: &[f64], len: &[usize], world: &World, ar: Arithmetic<f64>) -> Tensor<f64> {
    let sym = vec![Sym::NS; len.len()];
    let mut t = Tensor::with_options(len, &sym, world, TensorOptions::new().arithmetic(ar)).unwrap();
    let coords: Vec<usize> = (0..data.len()).collect();
    t.write(&coords, data).unwrap();
    t
}

#[test]
fn test_minplus_shortest_path() {
    // Graph:
    //   0 --1--> 1 --2--> 2
    //   |                 ^
    //   +------3----------+
    let inf = f64::INFINITY;
    let world = World::new(2).unwrap();
    let ar = Arithmetic::of::<MinPlus<f64>>();
    // column-major: column j holds the edges into node j
    let dist = with_arithmetic(
        &[0.0, inf, inf, 1.0, 0.0, inf, 3.0, 2.0, 0.0],
        &[3, 3],
        &world,
        ar,
    );
    let mut d2 = with_arithmetic(&[0.0; 9], &[3, 3], &world, ar);

    d2.idx_mut("ij").assign(dist.idx("ik") * dist.idx("kj")).unwrap();

    // d2[0,2] = min(0 + 3, 1 + 2, 3 + 0) = 3
    assert_eq!(d2.read(&[6]).unwrap(), vec![3.0]);
    assert_eq!(d2.read(&[3]).unwrap(), vec![1.0]);
    assert_eq!(d2.read(&[0]).unwrap(), vec![0.0]);
    // no path from 1 back to 0: the semiring zero, not infinity
    assert_eq!(d2.read(&[1]).unwrap(), vec![f64::MAX]);
}

#[test]
fn test_maxplus_associativity() {
    let world = World::new(1).unwrap();
    let ar = Arithmetic::of::<MaxPlus<f64>>();
    let a = with_arithmetic(&[1.0, 2.0, 3.0, 4.0], &[2, 2], &world, ar);
    let b = with_arithmetic(&[5.0, 6.0, 7.0, 8.0], &[2, 2], &world, ar);
    let c = with_arithmetic(&[1.0, 1.0, 1.0, 1.0], &[2, 2], &world, ar);

    let mut left = with_arithmetic(&[0.0; 4], &[2, 2], &world, ar);
    left.idx_mut("il")
        .assign((a.idx("ij") * b.idx("jk")) * c.idx("kl"))
        .unwrap();

    let mut right = with_arithmetic(&[0.0; 4], &[2, 2], &world, ar);
    right
        .idx_mut("il")
        .assign(a.idx("ij") * (b.idx("jk") * c.idx("kl")))
        .unwrap();

    assert_eq!(left.data(), right.data());
    // max over j, k of a[0,j] + b[j,k] + 1 = 3 + 8 + 1
    assert_eq!(left.read(&[0]).unwrap(), vec![12.0]);
}

#[test]
fn test_maxplus_sum_is_max() {
    let world = World::new(1).unwrap();
    let ar = Arithmetic::of::<MaxPlus<f64>>();
    let a = with_arithmetic(&[1.0, 7.0, 3.0, 2.0], &[2, 2], &world, ar);

    // row maxima
    let mut rows = with_arithmetic(&[0.0; 2], &[2], &world, ar);
    rows.idx_mut("i").assign(a.idx("ij")).unwrap();
    assert_eq!(rows.data(), &[3.0, 7.0]);

    assert_eq!(a.reduce(ctf::ReduceOp::Sum), 7.0);
}

#[test]
fn test_maxmul_contract() {
    let world = World::new(1).unwrap();
    let ar = Arithmetic::of::<MaxMul<f64>>();
    let a = with_arithmetic(&[0.5, 0.2, 0.9, 0.4], &[2, 2], &world, ar);
    let v = with_arithmetic(&[1.0, 0.5], &[2], &world, ar);

    let mut out = with_arithmetic(&[0.0; 2], &[2], &world, ar);
    out.idx_mut("i").assign(a.idx("ij") * v.idx("j")).unwrap();
    // max(0.5 * 1, 0.9 * 0.5), max(0.2 * 1, 0.4 * 0.5)
    assert_eq!(out.data(), &[0.5, 0.2]);
}
