//! Property-based tests for expressions and the symmetric adaptor.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::prelude::*;
    use crate::{declare_symmetric, multiply};

    // Sparse row vector with small integer entries, given as (index, value)
    fn sparse_vector(size: usize) -> impl Strategy<Value = CompressedVector<i64, RowVector>> {
        let entries = proptest::collection::btree_map(0..size, -20i64..20, 0..=size.div_ceil(2));
        entries.prop_map(move |entries| {
            let mut x = CompressedVector::new(size);
            for (i, value) in entries {
                x.append(i, value, true);
            }
            x
        })
    }

    fn dense_matrix(rows: usize, columns: usize) -> impl Strategy<Value = Vec<Vec<i64>>> {
        proptest::collection::vec(proptest::collection::vec(-20i64..20, columns), rows)
    }

    fn operands() -> impl Strategy<Value = (CompressedVector<i64, RowVector>, Vec<Vec<i64>>)> {
        (1usize..8, 1usize..8)
            .prop_flat_map(|(rows, columns)| (sparse_vector(rows), dense_matrix(rows, columns)))
    }

    // Symmetric (row, column, value) updates of an n x n matrix
    fn updates(n: usize) -> impl Strategy<Value = Vec<(usize, usize, i64)>> {
        proptest::collection::vec((0..n, 0..n, -3i64..4), 0..40)
    }

    proptest! {
        #[test]
        fn elementwise_matches_bulk((x, rows) in operands()) {
            let a = DynamicMatrix::<i64, ColumnMajor>::from_rows(rows);
            let expr = &x * &a;
            let bulk = expr.eval();
            for j in 0..expr.size() {
                prop_assert_eq!(expr.at(j), bulk[j]);
            }
        }

        #[test]
        fn storage_order_is_invisible((x, rows) in operands()) {
            let rm = DynamicMatrix::<i64, RowMajor>::from_rows(rows.clone());
            let cm = DynamicMatrix::<i64, ColumnMajor>::from_rows(rows);
            prop_assert_eq!((&x * &rm).eval(), (&x * &cm).eval());
        }

        #[test]
        fn restructured_symmetric_matches_plain_storage(
            x in sparse_vector(5),
            entries in updates(5),
        ) {
            let mut s = SymmetricMatrix::<DynamicMatrix<i64, ColumnMajor>>::new(5);
            for (i, j, value) in entries {
                s.set(i, j, value);
            }
            let routed = (&x * &s).eval();
            let declared = multiply(&x, declare_symmetric(s.storage())).unwrap().eval();
            prop_assert_eq!(&routed, &declared);

            // The plain storage is not restructured
            let plain = (&x * s.storage()).eval();
            prop_assert_eq!(&routed, &plain);
            for j in 0..5 {
                let want: i64 = (0..5).map(|i| x.get(i) * s.get(i, j)).sum();
                prop_assert_eq!(plain[j], want);
            }
        }

        #[test]
        fn symmetric_writes_keep_mirrors(entries in updates(6)) {
            let mut s = SymmetricMatrix::<CompressedMatrix<i64, RowMajor>>::new(6);
            for (i, j, value) in entries {
                s.entry(i, j).add(value);
            }
            for i in 0..6 {
                for j in 0..6 {
                    prop_assert_eq!(s.get(i, j), s.get(j, i));
                    prop_assert_eq!(s.find(i, j).is_some(), s.find(j, i).is_some());
                }
            }
        }
    }
}
