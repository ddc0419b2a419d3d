//! CPU backend implementation.

mod contract;
mod loops;

use std::any::TypeId;

use super::traits::{Backend, ContractFn, ScaleFn, SumFn};
use crate::algebra::{Arithmetic, Element};
use loops::LabelSpace;

/// CPU backend over dense column-major buffers.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cpu;

impl Backend for Cpu {
    fn name() -> &'static str {
        "cpu"
    }

    #[allow(clippy::too_many_arguments)]
    fn sum<T: Element>(
        &self,
        arithmetic: &Arithmetic<T>,
        alpha: T,
        a: &[T],
        shape_a: &[usize],
        modes_a: &[i32],
        c: &mut [T],
        shape_c: &[usize],
        modes_c: &[i32],
        f: Option<SumFn<T>>,
    ) {
        let space = LabelSpace::new(&[(shape_a, modes_a), (shape_c, modes_c)]);
        match f {
            Some(f) => space.for_each(|off| f(alpha, a[off[0]], &mut c[off[1]])),
            None => space.for_each(|off| {
                let term = arithmetic.mul(alpha, a[off[0]]);
                c[off[1]] = arithmetic.add(c[off[1]], term);
            }),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn contract<T: Element>(
        &self,
        arithmetic: &Arithmetic<T>,
        alpha: T,
        a: &[T],
        shape_a: &[usize],
        modes_a: &[i32],
        b: &[T],
        shape_b: &[usize],
        modes_b: &[i32],
        c: &mut [T],
        shape_c: &[usize],
        modes_c: &[i32],
        f: Option<ContractFn<T>>,
    ) {
        if f.is_none() && contract::gemm_eligible(modes_a, modes_b, modes_c) {
            let product = contract::contract_gemm(
                arithmetic, a, shape_a, modes_a, b, shape_b, modes_b, shape_c, modes_c,
            );
            for (dst, p) in c.iter_mut().zip(product) {
                *dst = arithmetic.add(*dst, arithmetic.mul(alpha, p));
            }
            return;
        }

        let space = LabelSpace::new(&[(shape_a, modes_a), (shape_b, modes_b), (shape_c, modes_c)]);
        match f {
            Some(f) => space.for_each(|off| f(alpha, a[off[0]], b[off[1]], &mut c[off[2]])),
            None => space.for_each(|off| {
                let term = arithmetic.mul(alpha, arithmetic.mul(a[off[0]], b[off[1]]));
                c[off[2]] = arithmetic.add(c[off[2]], term);
            }),
        }
    }

    fn scale<T: Element>(
        &self,
        arithmetic: &Arithmetic<T>,
        alpha: T,
        a: &mut [T],
        shape: &[usize],
        modes: &[i32],
        f: Option<ScaleFn<T>>,
    ) {
        let space = LabelSpace::new(&[(shape, modes)]);
        match f {
            Some(f) => space.for_each(|off| f(alpha, &mut a[off[0]])),
            None if alpha == arithmetic.one() => {}
            None if alpha == arithmetic.zero() => {
                let zero = arithmetic.zero();
                space.for_each(|off| a[off[0]] = zero);
            }
            None => space.for_each(|off| a[off[0]] = arithmetic.mul(alpha, a[off[0]])),
        }
    }
}

/// Matrix product `A (m×k) · B (k×n)` in column-major layout.
///
/// Plain `f32`/`f64` arithmetic goes through faer.
pub(super) fn gemm<T: Element>(
    arithmetic: &Arithmetic<T>,
    a: &[T],
    m: usize,
    k: usize,
    b: &[T],
    n: usize,
) -> Vec<T> {
    if arithmetic.is_standard() {
        if TypeId::of::<T>() == TypeId::of::<f64>() {
            let c = faer_gemm_f64(bytemuck::cast_slice(a), m, k, bytemuck::cast_slice(b), n);
            return bytemuck::cast_slice::<f64, T>(&c).to_vec();
        }
        if TypeId::of::<T>() == TypeId::of::<f32>() {
            let c = faer_gemm_f32(bytemuck::cast_slice(a), m, k, bytemuck::cast_slice(b), n);
            return bytemuck::cast_slice::<f32, T>(&c).to_vec();
        }
    }

    generic_gemm(arithmetic, a, m, k, b, n)
}

macro_rules! faer_gemm {
    ($name:ident, $t:ty) => {
        fn $name(a: &[$t], m: usize, k: usize, b: &[$t], n: usize) -> Vec<$t> {
            use faer::Mat;

            // Column-major: element (i, j) is at index j * nrows + i
            let a_mat = Mat::<$t>::from_fn(m, k, |i, j| a[j * m + i]);
            let b_mat = Mat::<$t>::from_fn(k, n, |i, j| b[j * k + i]);

            let c_mat = &a_mat * &b_mat;

            let mut c = Vec::with_capacity(m * n);
            for j in 0..n {
                for i in 0..m {
                    c.push(c_mat[(i, j)]);
                }
            }
            c
        }
    };
}

faer_gemm!(faer_gemm_f32, f32);
faer_gemm!(faer_gemm_f64, f64);

/// Generic GEMM in an arbitrary arithmetic (column-major layout).
fn generic_gemm<T: Element>(
    arithmetic: &Arithmetic<T>,
    a: &[T],
    m: usize,
    k: usize,
    b: &[T],
    n: usize,
) -> Vec<T> {
    let mut c = vec![arithmetic.zero(); m * n];

    for j in 0..n {
        for i in 0..m {
            let mut acc = arithmetic.zero();
            for kk in 0..k {
                // A[i, kk] and B[kk, j]
                acc = arithmetic.add(acc, arithmetic.mul(a[kk * m + i], b[j * k + kk]));
            }
            c[j * m + i] = acc;
        }
    }

    c
}
