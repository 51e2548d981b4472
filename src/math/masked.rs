// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Arrays with invalid elements.
//!
//! Numerical degeneracies (empty bins, zero weights) are not errors; the
//! affected elements are masked instead of being filled with NaN or infinity.

use ndarray::{prelude::*, Dimension, NdIndex, Zip};

/// An array of `f64` values alongside a mask. A `true` mask element marks the
/// corresponding value as invalid; its stored value is meaningless.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray<D: Dimension> {
    data: Array<f64, D>,
    mask: Array<bool, D>,
}

pub type MaskedArray1 = MaskedArray<Ix1>;
pub type MaskedArray2 = MaskedArray<Ix2>;

impl<D: Dimension> MaskedArray<D> {
    /// Pair `data` with `mask`. Masked values are zeroed so that they can
    /// never leak non-finite numbers.
    ///
    /// # Panics
    ///
    /// Panics if the shapes of `data` and `mask` differ.
    pub fn new(mut data: Array<f64, D>, mask: Array<bool, D>) -> MaskedArray<D> {
        assert_eq!(
            data.shape(),
            mask.shape(),
            "MaskedArray data and mask shapes differ"
        );
        Zip::from(&mut data).and(&mask).for_each(|d, &m| {
            if m {
                *d = 0.0;
            }
        });
        MaskedArray { data, mask }
    }

    /// Mask every element of `data` that is not finite.
    pub fn from_finite(data: Array<f64, D>) -> MaskedArray<D> {
        let mask = data.mapv(|d| !d.is_finite());
        MaskedArray::new(data, mask)
    }

    /// Get the value at `index`, or `None` if it is masked.
    pub fn get<I: NdIndex<D> + Copy>(&self, index: I) -> Option<f64> {
        match self.mask.get(index) {
            Some(false) => self.data.get(index).copied(),
            _ => None,
        }
    }

    pub fn is_masked<I: NdIndex<D> + Copy>(&self, index: I) -> bool {
        self.mask.get(index).copied().unwrap_or(true)
    }

    /// The raw values. Masked elements hold zero.
    pub fn data(&self) -> &Array<f64, D> {
        &self.data
    }

    pub fn mask(&self) -> &Array<bool, D> {
        &self.mask
    }

    pub fn dim(&self) -> D::Pattern {
        self.data.dim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn count_valid(&self) -> usize {
        self.mask.iter().filter(|&&m| !m).count()
    }

    /// A copy of the values with masked elements replaced by `fill`.
    pub fn filled(&self, fill: f64) -> Array<f64, D> {
        let mut out = self.data.clone();
        Zip::from(&mut out).and(&self.mask).for_each(|d, &m| {
            if m {
                *d = fill;
            }
        });
        out
    }

    /// The valid values, in logical order.
    pub fn compressed(&self) -> Vec<f64> {
        self.data
            .iter()
            .zip(self.mask.iter())
            .filter(|(_, &m)| !m)
            .map(|(&d, _)| d)
            .collect()
    }

    /// Iterate over the elements, yielding `None` for masked ones.
    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.data
            .iter()
            .zip(self.mask.iter())
            .map(|(&d, &m)| if m { None } else { Some(d) })
    }
}
