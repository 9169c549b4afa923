//! Cursor over one line of a symmetric matrix.

use lamina_core::StorageOrder;

use super::proxy::{mirror_of, SymmetricElement, SymmetricValue};
use crate::storage::MatrixStorage;

/// Mutable cursor over the stored elements of a line.
///
/// The mirror of the current element is looked up when
/// [`element`](Self::element) is called, so moving the cursor costs nothing.
#[derive(Debug)]
pub struct SymmetricIterMut<'a, MT> {
    matrix: &'a mut MT,
    line: usize,
    pos: usize,
}

impl<'a, MT: MatrixStorage> SymmetricIterMut<'a, MT> {
    pub(crate) fn new(matrix: &'a mut MT, line: usize) -> Self {
        Self {
            matrix,
            line,
            pos: 0,
        }
    }

    /// Returns true once every element was visited.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.pos >= self.matrix.line_len(self.line)
    }

    /// Position inside the line.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Minor index of the current element.
    #[must_use]
    pub fn index(&self) -> usize {
        self.matrix.index_at(self.line, self.pos)
    }

    /// Value of the current element.
    #[must_use]
    pub fn get(&self) -> MT::Element {
        self.matrix.value_at(self.line, self.pos)
    }

    /// Moves to the next element.
    pub fn advance(&mut self) {
        self.pos += 1;
    }

    /// The current element with write access to its mirror.
    ///
    /// # Panics
    ///
    /// Panics if the mirror of the current element is not stored.
    pub fn element(&mut self) -> SymmetricElement<'_, MT::Element> {
        debug_assert!(!self.is_end(), "invalid access to end position");
        let minor = self.index();
        let mirror = if minor == self.line {
            (self.line, self.pos)
        } else {
            let (row, column) = mirror_of::<MT::Order>(self.line, minor);
            let pos = self
                .matrix
                .find(row, column)
                .expect("symmetric storage lost a mirror element");
            (<MT::Order as StorageOrder>::to_line(row, column).0, pos)
        };
        let (first, second) = self.matrix.value_pair_mut((self.line, self.pos), mirror);
        SymmetricElement::new(minor, SymmetricValue::new(first, second))
    }
}
