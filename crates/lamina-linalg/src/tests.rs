//! Integration tests for lamina-linalg.

#[cfg(test)]
mod integration_tests {
    use lamina_core::config::update_smp_config;
    use rand::distributions::Uniform;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::prelude::*;
    use crate::random::{random_sparse_vector, random_symmetric, randomize_dense};
    use crate::{declare_upper, mat_mat_mult, multiply, smp, Error, EvalMode};

    // Results never depend on the chosen path, so lowering the thresholds
    // from concurrently running tests is harmless.
    fn lower_thresholds() {
        update_smp_config(|config| {
            config.tsvec_dmat_mult_threshold = 8;
            config.dmat_dmat_mult_threshold = 16;
            config.dvec_assign_threshold = 8;
        });
    }

    fn operands<SO: StorageOrder>(
        seed: u64,
        rows: usize,
        columns: usize,
    ) -> (CompressedVector<i64, RowVector>, DynamicMatrix<i64, SO>) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let dist = Uniform::new(-9i64, 10);
        let x = random_sparse_vector(rows, rows / 4, &mut rng, &dist);
        let mut a = DynamicMatrix::zeros(rows, columns);
        randomize_dense(&mut a, &mut rng, &dist);
        (x, a)
    }

    fn reference<M: MatrixExpr<Element = i64>>(
        x: &CompressedVector<i64, RowVector>,
        a: &M,
    ) -> Vec<i64> {
        (0..a.columns())
            .map(|j| x.entries().map(|(i, v)| v * a.at(i, j)).sum())
            .collect()
    }

    #[test]
    fn test_serial_and_smp_agree() {
        lower_thresholds();
        let (x, a) = operands::<ColumnMajor>(1, 120, 200);
        let want = reference(&x, &a);

        let parallel = DynamicVector::from_expr(&(&x * &a));
        let forced = DynamicVector::from_expr(&serial(&x * &a));
        let sectioned = smp::serial_section(|| DynamicVector::from_expr(&(&x * &a)));

        assert_eq!(parallel.as_slice(), want.as_slice());
        assert_eq!(forced, parallel);
        assert_eq!(sectioned, parallel);
    }

    #[test]
    fn test_storage_orders_agree() {
        lower_thresholds();
        let (x, a) = operands::<RowMajor>(2, 64, 90);
        let b = DynamicMatrix::<i64, ColumnMajor>::from_expr(&a);

        let y = (&x * &a).eval();
        let z = (&x * &b).eval();
        assert_eq!(y, z);
        assert_eq!(y.as_slice(), reference(&x, &a).as_slice());
    }

    #[test]
    fn test_compound_assignment() {
        lower_thresholds();
        let (x, a) = operands::<ColumnMajor>(3, 40, 50);
        let want = reference(&x, &a);
        let expr = &x * &a;

        let mut y = DynamicVector::<i64, RowVector>::from_vec(vec![2; 50]);
        y.add_assign_expr(&expr).unwrap();
        for (j, value) in y.as_slice().iter().enumerate() {
            assert_eq!(*value, 2 + want[j]);
        }

        y.sub_assign_expr(&expr).unwrap();
        assert_eq!(y.as_slice(), &[2; 50][..]);

        y.mult_assign_expr(&expr).unwrap();
        let doubled: Vec<i64> = want.iter().map(|v| 2 * v).collect();
        assert_eq!(y.as_slice(), doubled.as_slice());

        let mut short = DynamicVector::<i64, RowVector>::new(3);
        assert_eq!(
            short.assign(&expr),
            Err(Error::SizeMismatch {
                expected: 3,
                found: 50
            })
        );
    }

    #[test]
    fn test_product_operand_is_evaluated_first() {
        lower_thresholds();
        let (x, a) = operands::<RowMajor>(4, 30, 30);
        let (_, b) = operands::<ColumnMajor>(5, 30, 24);
        let ab = DynamicMatrix::<i64>::from_expr(&mat_mat_mult(&a, &b).unwrap());

        let lazy = multiply(&x, mat_mat_mult(&a, &b).unwrap()).unwrap().eval();
        let eager = (&x * &ab).eval();
        assert_eq!(lazy, eager);
    }

    #[test]
    fn test_symmetric_operands() {
        lower_thresholds();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let dist = Uniform::new(-5i64, 6);
        let sparse = random_symmetric::<i64, RowMajor, _, _>(40, 100, &mut rng, &dist);
        let x: CompressedVector<i64, RowVector> = random_sparse_vector(40, 12, &mut rng, &dist);
        let want = reference(&x, &sparse);

        let rm =
            SymmetricMatrix::<DynamicMatrix<i64, RowMajor>>::try_from_matrix(&sparse).unwrap();
        let cm =
            SymmetricMatrix::<DynamicMatrix<i64, ColumnMajor>>::try_from_matrix(&sparse).unwrap();

        assert_eq!((&x * &rm).eval().as_slice(), want.as_slice());
        assert_eq!((&x * &cm).eval().as_slice(), want.as_slice());
    }

    #[test]
    fn test_declared_upper_skips_lower_part() {
        let (x, mut a) = operands::<ColumnMajor>(7, 25, 25);
        for j in 0..25 {
            for i in j + 1..25 {
                a[(i, j)] = 0;
            }
        }
        let plain = (&x * &a).eval();
        let declared = multiply(&x, declare_upper(&a)).unwrap().eval();
        assert_eq!(plain, declared);
    }

    #[test]
    fn test_sparse_target() {
        lower_thresholds();
        let (x, a) = operands::<ColumnMajor>(8, 20, 30);
        let want = DynamicVector::<i64, RowVector>::from_vec(reference(&x, &a));

        let mut y = CompressedVector::<i64, RowVector>::from_expr(&(&x * &a));
        assert_eq!(y, CompressedVector::from_dense(&want));

        y.sub_assign_expr(&(&x * &a)).unwrap();
        assert_eq!(y.non_zeros(), 0);
    }

    #[test]
    fn test_symmetric_invariant_survives_updates() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let dist = Uniform::new(1i32, 9);
        let mut s = random_symmetric::<i32, ColumnMajor, _, _>(12, 30, &mut rng, &dist);

        s.entry(3, 7).add(4);
        s.erase(0, 11);
        s.reset_line(5);
        let end = s.non_zeros_line(2);
        s.erase_at(2, end);
        s.erase_range(4, 0, 2);
        let mut it = s.line_mut(6);
        while !it.is_end() {
            it.element().value_mut().mul(3);
            it.advance();
        }
        s.scale_diagonal(2);
        s.resize(10, true);

        for i in 0..s.rows() {
            for j in 0..s.columns() {
                assert_eq!(s.get(i, j), s.get(j, i), "asymmetry at ({i}, {j})");
                assert_eq!(s.find(i, j).is_some(), s.find(j, i).is_some());
            }
        }
    }

    #[test]
    fn test_parallel_product_matches_serial() {
        lower_thresholds();
        let (_, a) = operands::<RowMajor>(10, 48, 48);
        let (_, b) = operands::<ColumnMajor>(11, 48, 48);
        let product = mat_mat_mult(&a, &b).unwrap();
        let parallel = product.evaluate(EvalMode::Parallel).into_owned();
        let serial = smp::serial_section(|| product.evaluate(EvalMode::Parallel).into_owned());
        assert_eq!(parallel, serial);
    }
}
