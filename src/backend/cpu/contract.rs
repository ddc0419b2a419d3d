//! CPU tensor contraction via reshape→GEMM→reshape.
//!
//! Applies to plain pairwise contractions: no mode repeats inside an operand
//! and every mode found in only one operand survives into the output.
//! Everything else goes through the label loops in [`super::loops`].

use std::collections::HashSet;

use crate::algebra::{Arithmetic, Element};
use crate::tensor::compute_contiguous_strides;

use super::gemm;

/// Classify modes into batch, left-only, right-only, and contracted.
///
/// - batch: in both A and B, and in output C
/// - left: only in A (free indices from A)
/// - right: only in B (free indices from B)
/// - contracted: in both A and B, but NOT in output C
pub(super) fn classify_modes(
    modes_a: &[i32],
    modes_b: &[i32],
    modes_c: &[i32],
) -> (Vec<i32>, Vec<i32>, Vec<i32>, Vec<i32>) {
    let a_set: HashSet<i32> = modes_a.iter().copied().collect();
    let b_set: HashSet<i32> = modes_b.iter().copied().collect();
    let c_set: HashSet<i32> = modes_c.iter().copied().collect();

    let mut batch = Vec::new();
    let mut left = Vec::new();
    let mut contracted = Vec::new();

    for &m in modes_a {
        if b_set.contains(&m) && c_set.contains(&m) {
            if !batch.contains(&m) {
                batch.push(m);
            }
        } else if b_set.contains(&m) {
            if !contracted.contains(&m) {
                contracted.push(m);
            }
        } else if !left.contains(&m) {
            left.push(m);
        }
    }

    let right: Vec<i32> = modes_b
        .iter()
        .filter(|m| !a_set.contains(m))
        .copied()
        .collect();

    (batch, left, right, contracted)
}

/// Whether `modes_a, modes_b -> modes_c` can run as a (batched) GEMM.
pub(super) fn gemm_eligible(modes_a: &[i32], modes_b: &[i32], modes_c: &[i32]) -> bool {
    let unique = |modes: &[i32]| {
        let set: HashSet<i32> = modes.iter().copied().collect();
        set.len() == modes.len()
    };
    if !unique(modes_a) || !unique(modes_b) || !unique(modes_c) {
        return false;
    }
    let outputs_covered = modes_c
        .iter()
        .all(|m| modes_a.contains(m) || modes_b.contains(m));
    let a_kept = modes_a
        .iter()
        .all(|m| modes_b.contains(m) || modes_c.contains(m));
    let b_kept = modes_b
        .iter()
        .all(|m| modes_a.contains(m) || modes_c.contains(m));
    outputs_covered && a_kept && b_kept
}

/// Find the position of a mode in a modes array.
pub(super) fn mode_position(modes: &[i32], mode: i32) -> usize {
    modes
        .iter()
        .position(|&m| m == mode)
        .expect("mode not found")
}

/// Compute the product of dimensions for given modes.
pub(super) fn product_of_dims(modes: &[i32], all_modes: &[i32], shape: &[usize]) -> usize {
    modes
        .iter()
        .map(|&m| shape[mode_position(all_modes, m)])
        .product::<usize>()
}

/// Compute permutation to reorder modes to [first..., second..., third...].
pub(super) fn compute_permutation(
    current: &[i32],
    first: &[i32],
    second: &[i32],
    third: &[i32],
) -> Vec<usize> {
    first
        .iter()
        .chain(second.iter())
        .chain(third.iter())
        .map(|m| mode_position(current, *m))
        .collect()
}

/// `Σ a[modes_a] ⊗ b[modes_b]` laid out as `modes_c`, via GEMM.
///
/// Column-major, so operands are permuted to put the batch modes last:
/// A to `[left, contracted, batch]`, B to `[contracted, right, batch]`, and
/// the product comes out as `[left, right, batch]`.
#[allow(clippy::too_many_arguments)]
pub(super) fn contract_gemm<T: Element>(
    arithmetic: &Arithmetic<T>,
    a: &[T],
    shape_a: &[usize],
    modes_a: &[i32],
    b: &[T],
    shape_b: &[usize],
    modes_b: &[i32],
    shape_c: &[usize],
    modes_c: &[i32],
) -> Vec<T> {
    let (batch, left, right, contracted) = classify_modes(modes_a, modes_b, modes_c);

    let batch_size = product_of_dims(&batch, modes_a, shape_a);
    let left_size = product_of_dims(&left, modes_a, shape_a);
    let right_size = product_of_dims(&right, modes_b, shape_b);
    let contract_size = product_of_dims(&contracted, modes_a, shape_a);

    let a_perm = compute_permutation(modes_a, &left, &contracted, &batch);
    let a_permuted = permute_data(a, shape_a, &a_perm);

    let b_perm = compute_permutation(modes_b, &contracted, &right, &batch);
    let b_permuted = permute_data(b, shape_b, &b_perm);

    let c_data = if batch.is_empty() {
        gemm(arithmetic, &a_permuted, left_size, contract_size, &b_permuted, right_size)
    } else {
        gemm_batched(
            arithmetic,
            &a_permuted,
            batch_size,
            left_size,
            contract_size,
            &b_permuted,
            right_size,
        )
    };

    let current_order: Vec<i32> = left
        .iter()
        .chain(right.iter())
        .chain(batch.iter())
        .copied()
        .collect();

    if current_order == modes_c {
        c_data
    } else {
        let c_shape_current: Vec<usize> = current_order
            .iter()
            .map(|&m| shape_c[mode_position(modes_c, m)])
            .collect();
        let out_perm: Vec<usize> = modes_c
            .iter()
            .map(|&m| mode_position(&current_order, m))
            .collect();
        permute_data(&c_data, &c_shape_current, &out_perm)
    }
}

fn gemm_batched<T: Element>(
    arithmetic: &Arithmetic<T>,
    a: &[T],
    batch_size: usize,
    m: usize,
    k: usize,
    b: &[T],
    n: usize,
) -> Vec<T> {
    let a_batch_stride = m * k;
    let b_batch_stride = k * n;
    let c_batch_stride = m * n;

    let mut c = vec![arithmetic.zero(); batch_size * c_batch_stride];

    for batch in 0..batch_size {
        let a_offset = batch * a_batch_stride;
        let b_offset = batch * b_batch_stride;
        let c_offset = batch * c_batch_stride;

        let c_batch = gemm(
            arithmetic,
            &a[a_offset..a_offset + a_batch_stride],
            m,
            k,
            &b[b_offset..b_offset + b_batch_stride],
            n,
        );
        c[c_offset..c_offset + c_batch_stride].copy_from_slice(&c_batch);
    }

    c
}

/// Permute data according to axis permutation.
///
/// Output dimension `d` is input dimension `perm[d]`.
pub(super) fn permute_data<T: Copy>(data: &[T], shape: &[usize], perm: &[usize]) -> Vec<T> {
    if perm.iter().enumerate().all(|(i, &p)| i == p) {
        return data.to_vec();
    }

    let new_shape: Vec<usize> = perm.iter().map(|&p| shape[p]).collect();
    let old_strides = compute_contiguous_strides(shape);
    let numel: usize = shape.iter().product();
    let mut result = Vec::with_capacity(numel);

    let mut new_coords = vec![0usize; new_shape.len()];
    let mut old_idx = 0usize;
    for _ in 0..numel {
        result.push(data[old_idx]);

        // column-major odometer over the new shape
        for (dim, coord) in new_coords.iter_mut().enumerate() {
            let stride = old_strides[perm[dim]];
            *coord += 1;
            old_idx += stride;
            if *coord < new_shape[dim] {
                break;
            }
            old_idx -= stride * new_shape[dim];
            *coord = 0;
        }
    }

    result
}
