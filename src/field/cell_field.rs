//! Cell-centred scalar field.

use serde::{Deserialize, Serialize};

use crate::types::CellIndex;

/// One scalar per cell, in the mesh's cell order.
///
/// A field carries no time history. The current and previous density of a
/// step are two separate `CellField`s owned by the solver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellField {
    values: Vec<f64>,
}

impl CellField {
    /// Wrap per-cell values.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Field of `n_cells` copies of `value`.
    pub fn uniform(n_cells: usize, value: f64) -> Self {
        Self {
            values: vec![value; n_cells],
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the field has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value in cell `k`.
    #[inline]
    pub fn get(&self, k: CellIndex) -> f64 {
        self.values[k.get()]
    }

    /// Overwrite the value in cell `k`.
    #[inline]
    pub fn set(&mut self, k: CellIndex, value: f64) {
        self.values[k.get()] = value;
    }

    /// Raw values.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Mutable raw values.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Iterate over values in cell order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &f64> {
        self.values.iter()
    }

    /// Volume integral `Σ value_k * volume_k`.
    ///
    /// Lengths are not checked here; callers validate alignment first.
    pub fn integrate(&self, volumes: &[f64]) -> f64 {
        self.values
            .iter()
            .zip(volumes)
            .map(|(v, vol)| v * vol)
            .sum()
    }
}

impl From<Vec<f64>> for CellField {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl std::ops::Index<CellIndex> for CellField {
    type Output = f64;

    #[inline]
    fn index(&self, k: CellIndex) -> &f64 {
        &self.values[k.get()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut rho = CellField::uniform(3, 1000.0);
        rho.set(CellIndex::new(1), 1.2);
        assert_eq!(rho.get(CellIndex::new(1)), 1.2);
        assert_eq!(rho[CellIndex::new(0)], 1000.0);
        assert_eq!(rho.len(), 3);
    }

    #[test]
    fn test_integrate() {
        let rho = CellField::new(vec![1.0, 2.0, 3.0]);
        let m = rho.integrate(&[0.5, 0.5, 2.0]);
        assert!((m - 7.5).abs() < 1e-14);
    }
}
