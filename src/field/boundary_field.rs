//! Boundary-face scalar field.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::types::FaceIndex;

/// One scalar per boundary face, over all patches of a mesh.
///
/// Used for face fluxes such as the mass flux `rho * phi`. Values are signed
/// with the outward-normal convention: positive leaves the domain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryField {
    values: Vec<f64>,
}

impl BoundaryField {
    /// Wrap per-face values.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Field of `n_faces` copies of `value`.
    pub fn uniform(n_faces: usize, value: f64) -> Self {
        Self {
            values: vec![value; n_faces],
        }
    }

    /// Number of boundary faces.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the field covers no faces.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value on face `f`.
    #[inline]
    pub fn get(&self, f: FaceIndex) -> f64 {
        self.values[f.get()]
    }

    /// Overwrite the value on face `f`.
    #[inline]
    pub fn set(&mut self, f: FaceIndex, value: f64) {
        self.values[f.get()] = value;
    }

    /// Raw values.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Mutable raw values.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Values of the faces in `faces`, usually a patch range.
    pub fn patch_values(&self, faces: Range<usize>) -> &[f64] {
        &self.values[faces]
    }

    /// Sum over the faces in `faces`.
    pub fn patch_sum(&self, faces: Range<usize>) -> f64 {
        self.patch_values(faces).iter().sum()
    }
}

impl From<Vec<f64>> for BoundaryField {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_sum() {
        let phi = BoundaryField::new(vec![1.0, -2.0, 0.5, 0.25]);
        assert_eq!(phi.patch_values(1..3), &[-2.0, 0.5]);
        assert!((phi.patch_sum(1..4) - (-1.25)).abs() < 1e-15);
        assert_eq!(phi.patch_sum(2..2), 0.0);
    }

    #[test]
    fn test_set_face() {
        let mut phi = BoundaryField::uniform(2, 0.0);
        phi.set(FaceIndex::new(1), 3.0);
        assert_eq!(phi.get(FaceIndex::new(1)), 3.0);
    }
}
