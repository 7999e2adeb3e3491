use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use symkern::utils::max_relative_error;
use symkern::{
    init_trmm, trmm, Diag, LowerTriangular, Matrix, TrmmOperands, Variant, SENTINEL,
};

const TOLERANCE: f64 = 1e-9;

fn after(variant: Variant, mut ops: TrmmOperands) -> Matrix {
    trmm::run(variant, &mut ops);
    ops.b().clone()
}

fn random_operands(m: usize, n: usize, seed: u64) -> TrmmOperands {
    let mut rng = StdRng::seed_from_u64(seed);
    let a = LowerTriangular::from_fn(m, Diag::Unit, |_, _| rng.random_range(-1.0..1.0));
    let b = Matrix::from_fn(m, n, |_, _| rng.random_range(-1.0..1.0));
    TrmmOperands::new(0.8, a, b).unwrap()
}

#[test]
fn test_all_variants_match_reference() {
    for &(m, n) in &[(1, 1), (2, 5), (4, 3), (9, 70), (31, 129), (64, 64)] {
        let ops = init_trmm(m, n).unwrap();
        let expected = after(Variant::Reference, ops.clone());
        for variant in Variant::ALL {
            let got = after(variant, ops.clone());
            let err = max_relative_error(got.as_slice(), expected.as_slice());
            assert!(err < TOLERANCE, "{variant} m={m} n={n}: err {err}");
        }
    }
}

#[test]
fn test_matches_dense_transposed_product() {
    for seed in 0..3 {
        let ops = random_operands(13 + seed as usize, 10, seed);
        let expected = ops.a().to_lower_array2().t().dot(&ops.b().to_array2()) * ops.alpha();
        let expected = Matrix::from(expected);
        for variant in Variant::COMMON {
            let got = after(variant, ops.clone());
            let err = max_relative_error(got.as_slice(), expected.as_slice());
            assert!(err < TOLERANCE, "{variant} seed={seed}: err {err}");
        }
    }
}

#[test]
fn test_single_row_only_scales() {
    let ops = init_trmm(1, 7).unwrap();
    for variant in Variant::ALL {
        let got = after(variant, ops.clone());
        for j in 0..7 {
            assert_eq!(got[(0, j)], ops.alpha() * ops.b()[(0, j)], "{variant}");
        }
    }
}

#[test]
fn test_upper_triangle_and_diagonal_of_a_are_never_read() {
    let ops = init_trmm(10, 11).unwrap();
    let (alpha, a, b) = ops.clone().into_parts();

    let mut dense = a.into_dense();
    for i in 0..10 {
        for j in i..10 {
            dense[(i, j)] = f64::NAN;
        }
    }
    let poisoned = LowerTriangular::from_dense(dense, Diag::Unit).unwrap();
    let poisoned = TrmmOperands::new(alpha, poisoned, b).unwrap();

    for variant in Variant::ALL {
        assert_eq!(
            after(variant, poisoned.clone()),
            after(variant, ops.clone()),
            "{variant}"
        );
    }
}

#[test]
fn test_repeated_application_accumulates() {
    let ops = init_trmm(6, 5).unwrap();
    for variant in Variant::COMMON {
        let once = after(variant, ops.clone());
        let mut twice = ops.clone();
        trmm::run(variant, &mut twice);
        trmm::run(variant, &mut twice);
        assert_ne!(twice.b(), &once, "{variant}");
    }
}

#[test]
fn test_m_not_multiple_of_unroll() {
    for m in [2, 3, 5, 6, 7, 10, 11] {
        let ops = random_operands(m, 9, m as u64);
        let expected = after(Variant::Reference, ops.clone());
        for variant in [Variant::Unrolled, Variant::Combined] {
            let got = after(variant, ops.clone());
            assert!(
                max_relative_error(got.as_slice(), expected.as_slice()) < TOLERANCE,
                "{variant} m={m}"
            );
        }
    }
}

#[test]
fn test_literal_buffers_small_product() {
    // A = [1 *; 2 1] (upper entry unused), B = [1 2; 3 4]
    let a = Matrix::from_vec(2, 2, vec![1.0, SENTINEL, 2.0, 1.0]).unwrap();
    let a = LowerTriangular::from_dense(a, Diag::Unit).unwrap();
    let b = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    let ops = TrmmOperands::new(1.5, a, b).unwrap();

    // alpha * A^T * B = 1.5 * [1 + 2*3, 2 + 2*4; 3, 4]
    let expected = Matrix::from_vec(2, 2, vec![10.5, 15.0, 4.5, 6.0]).unwrap();
    for variant in Variant::ALL {
        assert_eq!(after(variant, ops.clone()), expected, "{variant}");
    }
}

#[test]
fn test_literal_buffer_length_is_checked() {
    assert!(Matrix::from_vec(2, 3, vec![0.0; 5]).is_err());
}
