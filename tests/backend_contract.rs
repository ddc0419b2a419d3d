//! Tests for the local `Backend` kernels.

use ctf::backend::Backend;
use ctf::{Arithmetic, Cpu};

fn standard() -> Arithmetic<f64> {
    Arithmetic::standard()
}

#[test]
fn test_cpu_contract_matmul() {
    // ij,jk->ik (matrix multiplication)
    let cpu = Cpu;

    let a = vec![1.0f64, 2.0, 3.0, 4.0]; // 2x2 column-major
    let b = vec![5.0, 6.0, 7.0, 8.0];
    let mut c = vec![0.0; 4];

    cpu.contract(
        &standard(),
        1.0,
        &a, &[2, 2], &[0, 1],
        &b, &[2, 2], &[1, 2],
        &mut c, &[2, 2], &[0, 2],
        None,
    );

    // A = [[1,3],[2,4]], B = [[5,7],[6,8]]
    // A @ B = [[23, 31], [34, 46]]
    assert_eq!(c, vec![23.0, 34.0, 31.0, 46.0]);
}

#[test]
fn test_cpu_contract_accumulates() {
    let cpu = Cpu;

    let a = vec![1.0f64, 2.0, 3.0];
    let b = vec![4.0, 5.0, 6.0];
    let mut c = vec![100.0];

    // i,i-> with α = 2 on top of what c already holds
    cpu.contract(
        &standard(),
        2.0,
        &a, &[3], &[0],
        &b, &[3], &[0],
        &mut c, &[], &[],
        None,
    );

    // 100 + 2·32
    assert_eq!(c, vec![164.0]);
}

#[test]
fn test_cpu_contract_outer_product() {
    // i,j->ij
    let cpu = Cpu;

    let a = vec![1.0f64, 2.0];
    let b = vec![3.0, 4.0, 5.0];
    let mut c = vec![0.0; 6];

    cpu.contract(
        &standard(),
        1.0,
        &a, &[2], &[0],
        &b, &[3], &[1],
        &mut c, &[2, 3], &[0, 1],
        None,
    );

    // [[3,4,5], [6,8,10]] column-major
    assert_eq!(c, vec![3.0, 6.0, 4.0, 8.0, 5.0, 10.0]);
}

#[test]
fn test_cpu_contract_custom_arithmetic() {
    let cpu = Cpu;
    let max_plus = Arithmetic::custom(f64::NEG_INFINITY, 0.0, f64::max, |a, b| a + b);

    let a = vec![1.0f64, 2.0, 3.0, 4.0];
    let b = vec![0.0, 10.0];
    let mut c = vec![f64::NEG_INFINITY; 2];

    // ij,j->i with (max, +)
    cpu.contract(
        &max_plus,
        0.0,
        &a, &[2, 2], &[0, 1],
        &b, &[2], &[1],
        &mut c, &[2], &[0],
        None,
    );

    // max(1 + 0, 3 + 10), max(2 + 0, 4 + 10)
    assert_eq!(c, vec![13.0, 14.0]);
}

#[test]
fn test_cpu_sum_reduce_and_broadcast() {
    let cpu = Cpu;
    let a = vec![1.0f64, 2.0, 3.0, 4.0];

    // ij->i
    let mut rows = vec![0.0; 2];
    cpu.sum(&standard(), 1.0, &a, &[2, 2], &[0, 1], &mut rows, &[2], &[0], None);
    assert_eq!(rows, vec![4.0, 6.0]);

    // i->ij
    let mut wide = vec![0.0; 6];
    cpu.sum(&standard(), 1.0, &rows, &[2], &[0], &mut wide, &[2, 3], &[0, 1], None);
    assert_eq!(wide, vec![4.0, 6.0, 4.0, 6.0, 4.0, 6.0]);

    // ii-> (trace)
    let mut tr = vec![0.0];
    cpu.sum(&standard(), 1.0, &a, &[2, 2], &[0, 0], &mut tr, &[], &[], None);
    assert_eq!(tr, vec![5.0]);
}

#[test]
fn test_cpu_sum_override() {
    fn keep_min(_alpha: f64, a: f64, b: &mut f64) {
        if a < *b {
            *b = a;
        }
    }

    let cpu = Cpu;
    let a = vec![3.0f64, 1.0, 2.0];
    let mut m = vec![f64::INFINITY];
    cpu.sum(&standard(), 1.0, &a, &[3], &[0], &mut m, &[], &[], Some(keep_min));
    assert_eq!(m, vec![1.0]);
}

#[test]
fn test_cpu_scale_diagonal() {
    let cpu = Cpu;
    let mut a = vec![1.0f64, 2.0, 3.0, 4.0];

    cpu.scale(&standard(), 3.0, &mut a, &[2, 2], &[0, 0], None);
    assert_eq!(a, vec![3.0, 2.0, 3.0, 12.0]);

    cpu.scale(&standard(), 0.0, &mut a, &[2, 2], &[0, 1], None);
    assert_eq!(a, vec![0.0; 4]);
}

#[test]
fn test_backend_name() {
    assert_eq!(Cpu::name(), "cpu");
}
