//! Profiling benchmark for contractions and expression trees
//!
//! Run benchmark:    cargo bench --bench profile_contraction
//! Smaller sizes:    cargo bench --bench profile_contraction -- --small
//! Profile:          samply record cargo bench --bench profile_contraction

use std::time::Instant;

use ctf::{Sym, Tensor, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_tensor(len: &[usize], world: &World, rng: &mut StdRng) -> Tensor<f64> {
    let size: usize = len.iter().product();
    let data: Vec<f64> = (0..size).map(|_| rng.gen_range(-1.0..1.0)).collect();
    Tensor::from_data(&data, len, world).unwrap()
}

/// Time `n_iterations` runs of `f` after one warmup run.
fn time(name: &str, n_iterations: usize, mut f: impl FnMut()) {
    let warmup_start = Instant::now();
    f();
    let warmup = warmup_start.elapsed();

    let start = Instant::now();
    for _ in 0..n_iterations {
        f();
    }
    let elapsed = start.elapsed();
    println!(
        "{:<28} warmup {:>8.3}ms, per iteration {:>8.3}ms",
        name,
        warmup.as_secs_f64() * 1000.0,
        elapsed.as_secs_f64() * 1000.0 / n_iterations as f64
    );
}

fn run_benchmark(n: usize, n_iterations: usize) {
    let world = World::new(4).unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    let a = random_tensor(&[n, n], &world, &mut rng);
    let b = random_tensor(&[n, n], &world, &mut rng);
    let c = random_tensor(&[n, n], &world, &mut rng);
    let v = random_tensor(&[n], &world, &mut rng);
    println!("Matrices {n}x{n}, {n_iterations} iterations");

    let mut out = Tensor::<f64>::zeros(&[n, n], &world).unwrap();
    time("contract ik,kj->ij", n_iterations, || {
        out.contract(1.0, &a, "ik", &b, "kj", 0.0, "ij").unwrap();
    });

    // the transposed operand leaves the GEMM path
    time("contract ki,kj->ij (loops)", n_iterations, || {
        out.contract(1.0, &a, "ki", &b, "jk", 0.0, "ij").unwrap();
    });

    time("expression A·(B·C)", n_iterations, || {
        out.idx_mut("il")
            .assign(a.idx("ij") * (b.idx("jk") * c.idx("kl")))
            .unwrap();
    });

    time("expression 2A + B - C", n_iterations, || {
        out.idx_mut("ij")
            .assign(a.idx("ij") * 2.0 + b.idx("ij") - c.idx("ij"))
            .unwrap();
    });

    let mut s = Tensor::<f64>::matrix(n, n, Sym::SY, &world).unwrap();
    time("symmetric outer v vᵀ", n_iterations, || {
        s.idx_mut("ij").assign(v.idx("i") * v.idx("j")).unwrap();
    });

    let coords: Vec<usize> = (0..n * n).map(|_| rng.gen_range(0..n * n)).collect();
    let values: Vec<f64> = coords.iter().map(|&g| g as f64).collect();
    time("write + read n² coordinates", n_iterations, || {
        s.write(&coords, &values).unwrap();
        let _ = s.read(&coords).unwrap();
    });

    println!("Result: {}", out.norm2());
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--small") {
        println!("Running small test...");
        run_benchmark(16, 10);
    } else if args.iter().any(|a| a == "--large") {
        println!("Running large test...");
        run_benchmark(256, 3);
    } else {
        run_benchmark(96, 5);
    }
}
