//! Compile-time tags describing storage layout and matrix structure.
//!
//! Containers and expressions carry these tags as type parameters or
//! associated constants, so kernel selection happens during monomorphization.

mod sealed {
    pub trait Sealed {}
}

/// Storage order of a matrix.
pub trait StorageOrder: sealed::Sealed + Copy + Default + Send + Sync + 'static {
    /// The order with rows and columns swapped.
    type Opposite: StorageOrder<Opposite = Self>;

    /// True for row-major storage.
    const IS_ROW_MAJOR: bool;

    /// True for column-major storage.
    const IS_COLUMN_MAJOR: bool = !Self::IS_ROW_MAJOR;

    /// Splits `(row, column)` into `(line, minor)` coordinates.
    #[inline]
    #[must_use]
    fn to_line(row: usize, column: usize) -> (usize, usize) {
        if Self::IS_ROW_MAJOR {
            (row, column)
        } else {
            (column, row)
        }
    }

    /// Joins `(line, minor)` coordinates back into `(row, column)`.
    #[inline]
    #[must_use]
    fn from_line(line: usize, minor: usize) -> (usize, usize) {
        Self::to_line(line, minor)
    }
}

/// Row-major storage: each line is a row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RowMajor;

/// Column-major storage: each line is a column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ColumnMajor;

impl sealed::Sealed for RowMajor {}
impl sealed::Sealed for ColumnMajor {}

impl StorageOrder for RowMajor {
    type Opposite = ColumnMajor;
    const IS_ROW_MAJOR: bool = true;
}

impl StorageOrder for ColumnMajor {
    type Opposite = RowMajor;
    const IS_ROW_MAJOR: bool = false;
}

/// Orientation of a vector.
pub trait TransposeFlag: sealed::Sealed + Copy + Default + Send + Sync + 'static {
    /// The other orientation.
    type Opposite: TransposeFlag<Opposite = Self>;

    /// True for row vectors.
    const IS_ROW_VECTOR: bool;
}

/// A row vector (`1 x n`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RowVector;

/// A column vector (`n x 1`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ColumnVector;

impl sealed::Sealed for RowVector {}
impl sealed::Sealed for ColumnVector {}

impl TransposeFlag for RowVector {
    type Opposite = ColumnVector;
    const IS_ROW_VECTOR: bool = true;
}

impl TransposeFlag for ColumnVector {
    type Opposite = RowVector;
    const IS_ROW_VECTOR: bool = false;
}

/// Structural property of a matrix known at compile time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Structure {
    /// No known structure.
    #[default]
    General,
    /// `A(i,j) == A(j,i)`.
    Symmetric,
    /// Zero above the diagonal.
    Lower,
    /// Zero below the diagonal.
    Upper,
    /// Zero on and above the diagonal.
    StrictlyLower,
    /// Zero on and below the diagonal.
    StrictlyUpper,
}

impl Structure {
    /// Returns true for symmetric matrices.
    #[must_use]
    pub const fn is_symmetric(self) -> bool {
        matches!(self, Self::Symmetric)
    }

    /// Returns true for (strictly) lower triangular matrices.
    #[must_use]
    pub const fn is_lower(self) -> bool {
        matches!(self, Self::Lower | Self::StrictlyLower)
    }

    /// Returns true for (strictly) upper triangular matrices.
    #[must_use]
    pub const fn is_upper(self) -> bool {
        matches!(self, Self::Upper | Self::StrictlyUpper)
    }

    /// Returns true if the diagonal is known to be zero.
    #[must_use]
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::StrictlyLower | Self::StrictlyUpper)
    }

    /// Returns true for any triangular structure.
    #[must_use]
    pub const fn is_triangular(self) -> bool {
        self.is_lower() || self.is_upper()
    }

    /// Structure of the transposed matrix.
    #[must_use]
    pub const fn transposed(self) -> Self {
        match self {
            Self::General => Self::General,
            Self::Symmetric => Self::Symmetric,
            Self::Lower => Self::Upper,
            Self::Upper => Self::Lower,
            Self::StrictlyLower => Self::StrictlyUpper,
            Self::StrictlyUpper => Self::StrictlyLower,
        }
    }
}

/// Type-level carrier for a [`Structure`].
pub trait StructureTag: sealed::Sealed + Copy + Default + Send + Sync + 'static {
    /// The carried structure.
    const STRUCTURE: Structure;
}

macro_rules! structure_tag {
    ($($(#[$doc:meta])* $name:ident => $variant:ident;)*) => {
        $(
            $(#[$doc])*
            #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
            pub struct $name;

            impl sealed::Sealed for $name {}

            impl StructureTag for $name {
                const STRUCTURE: Structure = Structure::$variant;
            }
        )*
    };
}

structure_tag! {
    /// Declares a matrix symmetric.
    SymmetricTag => Symmetric;
    /// Declares a matrix lower triangular.
    LowerTag => Lower;
    /// Declares a matrix upper triangular.
    UpperTag => Upper;
    /// Declares a matrix strictly lower triangular.
    StrictlyLowerTag => StrictlyLower;
    /// Declares a matrix strictly upper triangular.
    StrictlyUpperTag => StrictlyUpper;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_coordinates() {
        assert_eq!(RowMajor::to_line(2, 5), (2, 5));
        assert_eq!(ColumnMajor::to_line(2, 5), (5, 2));
        assert_eq!(ColumnMajor::from_line(5, 2), (2, 5));
    }

    #[test]
    fn test_transposed_structure() {
        assert_eq!(Structure::Lower.transposed(), Structure::Upper);
        assert_eq!(Structure::StrictlyUpper.transposed(), Structure::StrictlyLower);
        assert_eq!(Structure::Symmetric.transposed(), Structure::Symmetric);
    }

    #[test]
    fn test_predicates() {
        assert!(Structure::StrictlyLower.is_lower());
        assert!(Structure::StrictlyLower.is_strict());
        assert!(Structure::Upper.is_triangular());
        assert!(!Structure::Symmetric.is_triangular());
        assert!(!Structure::General.is_symmetric());
        assert_eq!(UpperTag::STRUCTURE, Structure::Upper);
    }
}
