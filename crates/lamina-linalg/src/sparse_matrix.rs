//! Compressed sparse matrix with per-line capacity.
//!
//! Each line (a row for row-major, a column for column-major storage) owns a
//! contiguous range of slots and keeps its elements sorted by minor index at
//! the front of that range. Spare slots behind a line allow insertions
//! without moving the following lines.

use std::marker::PhantomData;

use lamina_core::{Error, Numeric, Result, RowMajor, StorageOrder};

use crate::storage::{pair_mut, MatrixStorage, SparseStorage};
use crate::traits::{address_of, MatrixExpr, Operand};

/// Sparse matrix in compressed row or column format.
///
/// # Memory Layout
///
/// For a matrix with `L` lines:
/// - `begin`: `L + 1` slot offsets; line `l` owns slots `begin[l]..begin[l + 1]`
/// - `end`: `L` offsets; the elements of line `l` occupy `begin[l]..end[l]`
/// - `indices`, `values`: one entry per slot
///
/// Slots from `begin[L]` to the end of the vectors are free.
#[derive(Debug, Clone)]
pub struct CompressedMatrix<T, SO = RowMajor> {
    /// Number of rows.
    rows: usize,
    /// Number of columns.
    columns: usize,
    /// First slot of each line, plus the first free slot.
    begin: Vec<usize>,
    /// One past the last element of each line.
    end: Vec<usize>,
    /// Minor index per slot.
    indices: Vec<usize>,
    /// Value per slot.
    values: Vec<T>,
    _order: PhantomData<SO>,
}

impl<T: Numeric, SO: StorageOrder> CompressedMatrix<T, SO> {
    /// Creates a new empty sparse matrix.
    #[must_use]
    pub fn new(rows: usize, columns: usize) -> Self {
        Self::with_capacity(rows, columns, 0)
    }

    /// Creates an empty matrix with `nonzeros` free slots.
    #[must_use]
    pub fn with_capacity(rows: usize, columns: usize, nonzeros: usize) -> Self {
        let lines = SO::to_line(rows, columns).0;
        Self {
            rows,
            columns,
            begin: vec![0; lines + 1],
            end: vec![0; lines],
            indices: vec![0; nonzeros],
            values: vec![T::zero(); nonzeros],
            _order: PhantomData,
        }
    }

    /// Creates a sparse matrix from triplets `(row, column, value)`.
    ///
    /// Duplicate entries are summed and zero results dropped.
    #[must_use]
    pub fn from_triplets(rows: usize, columns: usize, triplets: &[(usize, usize, T)]) -> Self {
        let mut sorted: Vec<(usize, usize, T)> = triplets
            .iter()
            .map(|&(row, column, value)| {
                debug_assert!(row < rows && column < columns, "triplet out of bounds");
                let (line, minor) = SO::to_line(row, column);
                (line, minor, value)
            })
            .collect();
        sorted.sort_by_key(|&(line, minor, _)| (line, minor));

        let mut merged: Vec<(usize, usize, T)> = Vec::with_capacity(sorted.len());
        for (line, minor, value) in sorted {
            match merged.last_mut() {
                Some(last) if last.0 == line && last.1 == minor => last.2 += value,
                _ => merged.push((line, minor, value)),
            }
        }

        let mut m = Self::with_capacity(rows, columns, merged.len());
        let mut current = 0;
        for (line, minor, value) in merged {
            while current < line {
                m.finalize(current);
                current += 1;
            }
            let (row, column) = SO::from_line(line, minor);
            m.append(row, column, value, true);
        }
        m
    }

    /// Creates a sparse matrix from a list of rows, skipping zeros.
    #[must_use]
    pub fn from_dense(dense: &[Vec<T>]) -> Self {
        let rows = dense.len();
        let columns = dense.first().map_or(0, Vec::len);
        let triplets: Vec<_> = dense
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().enumerate().map(move |(j, &v)| (i, j, v)))
            .filter(|(_, _, v)| !v.is_default())
            .collect();
        Self::from_triplets(rows, columns, &triplets)
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Returns the number of lines.
    #[must_use]
    pub fn lines(&self) -> usize {
        self.end.len()
    }

    /// Returns the stored `(minor, value)` pairs of `line`.
    pub fn line_iter(&self, line: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        let range = self.begin[line]..self.end[line];
        self.indices[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Returns every stored element as `(row, column, value)`.
    #[must_use]
    pub fn triplets(&self) -> Vec<(usize, usize, T)> {
        (0..self.lines())
            .flat_map(|line| {
                self.line_iter(line).map(move |(minor, value)| {
                    let (row, column) = SO::from_line(line, minor);
                    (row, column, value)
                })
            })
            .collect()
    }

    /// Converts to a list of dense rows.
    #[must_use]
    pub fn to_dense(&self) -> Vec<Vec<T>> {
        let mut dense = vec![vec![T::zero(); self.columns]; self.rows];
        for (row, column, value) in self.triplets() {
            dense[row][column] = value;
        }
        dense
    }

    fn stored(&self, line: usize) -> &[usize] {
        &self.indices[self.begin[line]..self.end[line]]
    }

    fn is_line_full(&self, line: usize) -> bool {
        self.end[line] == self.begin[line + 1]
    }

    /// Doubles the capacity of `line`, at least by one slot.
    fn make_room(&mut self, line: usize) {
        let extra = MatrixStorage::capacity_line(self, line).max(1);
        self.shift_lines_after(line, extra);
    }

    /// Moves every line after `line` `extra` slots to the right.
    fn shift_lines_after(&mut self, line: usize, extra: usize) {
        let lines = self.lines();
        let used = self.begin[lines];
        let needed = used + extra;
        if needed > self.values.len() {
            self.indices.resize(needed, 0);
            self.values.resize(needed, T::zero());
        }

        let from = self.begin[line + 1];
        self.indices.copy_within(from..used, from + extra);
        self.values.copy_within(from..used, from + extra);
        for k in line + 1..lines {
            self.begin[k] += extra;
            self.end[k] += extra;
        }
        self.begin[lines] += extra;
    }

    /// Inserts at `pos` of `line`, which must not be stored yet.
    fn insert_at(&mut self, line: usize, pos: usize, minor: usize, value: T) -> usize {
        if self.is_line_full(line) {
            self.make_room(line);
        }
        let at = self.begin[line] + pos;
        let end = self.end[line];
        self.indices.copy_within(at..end, at + 1);
        self.values.copy_within(at..end, at + 1);
        self.indices[at] = minor;
        self.values[at] = value;
        self.end[line] += 1;
        pos
    }
}

impl<T: Numeric, SO: StorageOrder> PartialEq for CompressedMatrix<T, SO> {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
            && self.columns == other.columns
            && (0..self.lines()).all(|line| self.line_iter(line).eq(other.line_iter(line)))
    }
}

impl<T: Numeric, SO: StorageOrder> Operand for CompressedMatrix<T, SO> {
    const SMP_ASSIGNABLE: bool = true;

    fn is_aliased(&self, alias: *const ()) -> bool {
        address_of(self) == alias
    }
}

impl<T: Numeric, SO: StorageOrder> MatrixExpr for CompressedMatrix<T, SO> {
    type Element = T;
    type Order = SO;

    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn at(&self, row: usize, column: usize) -> T {
        MatrixStorage::get(self, row, column)
    }

    fn for_each_non_zero<F>(&self, mut f: F)
    where
        F: FnMut(usize, usize, T),
    {
        for line in 0..self.lines() {
            for (minor, value) in self.line_iter(line) {
                if !value.is_default() {
                    let (row, column) = SO::from_line(line, minor);
                    f(row, column, value);
                }
            }
        }
    }
}

impl<T: Numeric, SO: StorageOrder> MatrixStorage for CompressedMatrix<T, SO> {
    const IS_SPARSE: bool = true;
    const IS_RESIZABLE: bool = true;

    fn with_dimensions(rows: usize, columns: usize) -> Self {
        Self::new(rows, columns)
    }

    fn lines(&self) -> usize {
        self.end.len()
    }

    fn line_len(&self, line: usize) -> usize {
        self.end[line] - self.begin[line]
    }

    fn index_at(&self, line: usize, pos: usize) -> usize {
        self.indices[self.begin[line] + pos]
    }

    fn value_at(&self, line: usize, pos: usize) -> T {
        self.values[self.begin[line] + pos]
    }

    fn find(&self, row: usize, column: usize) -> Option<usize> {
        let (line, minor) = SO::to_line(row, column);
        self.stored(line).binary_search(&minor).ok()
    }

    fn lower_bound(&self, row: usize, column: usize) -> usize {
        let (line, minor) = SO::to_line(row, column);
        self.stored(line).partition_point(|&i| i < minor)
    }

    fn upper_bound(&self, row: usize, column: usize) -> usize {
        let (line, minor) = SO::to_line(row, column);
        self.stored(line).partition_point(|&i| i <= minor)
    }

    fn get(&self, row: usize, column: usize) -> T {
        let (line, _) = SO::to_line(row, column);
        self.find(row, column)
            .map_or_else(T::zero, |pos| self.value_at(line, pos))
    }

    fn set(&mut self, row: usize, column: usize, value: T) -> usize {
        debug_assert!(row < self.rows, "invalid row access index");
        debug_assert!(column < self.columns, "invalid column access index");
        let (line, minor) = SO::to_line(row, column);
        match self.stored(line).binary_search(&minor) {
            Ok(pos) => {
                self.values[self.begin[line] + pos] = value;
                pos
            }
            Err(pos) => self.insert_at(line, pos, minor, value),
        }
    }

    fn erase_element(&mut self, row: usize, column: usize) {
        SparseStorage::erase(self, row, column);
    }

    fn value_pair_mut(
        &mut self,
        first: (usize, usize),
        second: (usize, usize),
    ) -> (&mut T, Option<&mut T>) {
        let a = self.begin[first.0] + first.1;
        let b = self.begin[second.0] + second.1;
        pair_mut(&mut self.values, a, b)
    }

    fn reset(&mut self) {
        let lines = self.lines();
        self.end.copy_from_slice(&self.begin[..lines]);
    }

    fn reset_line(&mut self, line: usize) {
        self.end[line] = self.begin[line];
    }

    fn clear(&mut self) {
        *self = Self::new(0, 0);
    }

    fn resize(&mut self, rows: usize, columns: usize, preserve: bool) {
        if !preserve {
            *self = Self::new(rows, columns);
            return;
        }
        let kept: Vec<_> = self
            .triplets()
            .into_iter()
            .filter(|&(row, column, _)| row < rows && column < columns)
            .collect();
        *self = Self::from_triplets(rows, columns, &kept);
    }

    fn scale(&mut self, scalar: T) {
        for line in 0..self.lines() {
            for value in &mut self.values[self.begin[line]..self.end[line]] {
                *value *= scalar;
            }
        }
    }

    fn div_scalar(&mut self, scalar: T) {
        for line in 0..self.lines() {
            for value in &mut self.values[self.begin[line]..self.end[line]] {
                *value /= scalar;
            }
        }
    }

    fn scale_diagonal(&mut self, scalar: T) {
        for i in 0..self.rows.min(self.columns) {
            if let Some(pos) = self.find(i, i) {
                self.values[self.begin[i] + pos] *= scalar;
            }
        }
    }

    fn non_zeros(&self) -> usize {
        (0..self.lines()).map(|line| self.line_len(line)).sum()
    }

    fn non_zeros_line(&self, line: usize) -> usize {
        self.line_len(line)
    }

    fn capacity(&self) -> usize {
        self.values.len()
    }

    fn capacity_line(&self, line: usize) -> usize {
        self.begin[line + 1] - self.begin[line]
    }
}

impl<T: Numeric, SO: StorageOrder> SparseStorage for CompressedMatrix<T, SO> {
    fn with_capacity(rows: usize, columns: usize, nonzeros: usize) -> Self {
        Self::with_capacity(rows, columns, nonzeros)
    }

    fn insert(&mut self, row: usize, column: usize, value: T) -> Result<usize> {
        debug_assert!(row < self.rows, "invalid row access index");
        debug_assert!(column < self.columns, "invalid column access index");
        let (line, minor) = SO::to_line(row, column);
        match self.stored(line).binary_search(&minor) {
            Ok(_) => Err(Error::DuplicateElement { row, column }),
            Err(pos) => Ok(self.insert_at(line, pos, minor, value)),
        }
    }

    fn erase(&mut self, row: usize, column: usize) {
        if let Some(pos) = self.find(row, column) {
            let (line, _) = SO::to_line(row, column);
            self.erase_at(line, pos);
        }
    }

    fn erase_at(&mut self, line: usize, pos: usize) -> usize {
        let at = self.begin[line] + pos;
        let end = self.end[line];
        if at >= end {
            return pos;
        }
        self.indices.copy_within(at + 1..end, at);
        self.values.copy_within(at + 1..end, at);
        self.end[line] -= 1;
        pos
    }

    fn erase_range(&mut self, line: usize, first: usize, last: usize) -> usize {
        let end = self.end[line];
        let from = self.begin[line] + last.min(self.line_len(line));
        let to = self.begin[line] + first;
        if to >= from {
            return first;
        }
        self.indices.copy_within(from..end, to);
        self.values.copy_within(from..end, to);
        self.end[line] -= from - to;
        first
    }

    fn append(&mut self, row: usize, column: usize, value: T, check: bool) {
        debug_assert!(row < self.rows, "invalid row access index");
        debug_assert!(column < self.columns, "invalid column access index");
        let (line, minor) = SO::to_line(row, column);
        debug_assert!(
            self.stored(line).last().map_or(true, |&last| last < minor),
            "appended element is not behind the last one"
        );
        if check && value.is_default() {
            return;
        }
        if self.is_line_full(line) {
            self.make_room(line);
        }
        let at = self.end[line];
        self.indices[at] = minor;
        self.values[at] = value;
        self.end[line] += 1;
    }

    fn finalize(&mut self, line: usize) {
        let lines = self.lines();
        if (line + 1..lines).any(|k| self.end[k] != self.begin[k]) {
            return;
        }
        let edge = self.end[line];
        for k in line + 1..lines {
            self.begin[k] = edge;
            self.end[k] = edge;
        }
        self.begin[lines] = edge;
    }

    fn reserve(&mut self, nonzeros: usize) {
        if nonzeros > self.values.len() {
            self.indices.resize(nonzeros, 0);
            self.values.resize(nonzeros, T::zero());
        }
    }

    fn reserve_line(&mut self, line: usize, nonzeros: usize) {
        let capacity = self.capacity_line(line);
        if nonzeros > capacity {
            self.shift_lines_after(line, nonzeros - capacity);
        }
    }

    fn trim(&mut self) {
        let lines = self.lines();
        let mut write = 0;
        for line in 0..lines {
            let (begin, end) = (self.begin[line], self.end[line]);
            self.indices.copy_within(begin..end, write);
            self.values.copy_within(begin..end, write);
            self.begin[line] = write;
            write += end - begin;
            self.end[line] = write;
        }
        self.begin[lines] = write;
        self.indices.truncate(write);
        self.values.truncate(write);
    }

    fn trim_line(&mut self, line: usize) {
        let lines = self.lines();
        let spare = self.begin[line + 1] - self.end[line];
        if spare == 0 {
            return;
        }
        let from = self.begin[line + 1];
        let used = self.begin[lines];
        self.indices.copy_within(from..used, from - spare);
        self.values.copy_within(from..used, from - spare);
        for k in line + 1..lines {
            self.begin[k] -= spare;
            self.end[k] -= spare;
        }
        self.begin[lines] -= spare;
    }
}
