// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rectilinear (plate carrée) projection of a patch of sky.
//!
//! The sphere is rotated so that the patch centre sits at local longitude and
//! latitude (0, 0), then a square grid of equal-angle cells is laid over the
//! local longitude/latitude plane. Rows run along latitude, columns along
//! longitude.

use ndarray::prelude::*;

use super::{normalise, vec2ang, Healpix, HealpixError};
use crate::constants::FRAC_PI_2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianProjection {
    /// Longitude of the patch centre \[radians\].
    centre_lon: f64,
    /// Latitude of the patch centre \[radians\].
    centre_lat: f64,
    /// Half the angular width of the grid \[radians\].
    half_width: f64,
    /// Number of cells along each side of the grid.
    num_cells: usize,
}

impl CartesianProjection {
    pub fn new(centre: [f64; 3], half_width: f64, num_cells: usize) -> CartesianProjection {
        let (theta, phi) = vec2ang(centre);
        CartesianProjection {
            centre_lon: phi,
            centre_lat: FRAC_PI_2 - theta,
            half_width,
            num_cells: num_cells.max(1),
        }
    }

    /// A projection covering a disc of angular `radius` around `centre`, with
    /// cells about as large as the map's pixels.
    pub fn for_disc(
        healpix: &Healpix,
        centre: [f64; 3],
        radius: f64,
    ) -> Result<CartesianProjection, HealpixError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(HealpixError::InvalidRadius(radius));
        }
        let num_cells = (2.0 * radius / healpix.resolution()).floor() as usize;
        Ok(CartesianProjection::new(centre, radius, num_cells))
    }

    pub fn num_cells(&self) -> usize {
        self.num_cells
    }

    fn cell_width(&self) -> f64 {
        2.0 * self.half_width / self.num_cells as f64
    }

    /// Rotate a world vector into the local frame, where the patch centre is
    /// along +x.
    fn to_local(&self, v: [f64; 3]) -> [f64; 3] {
        let (s_lon, c_lon) = self.centre_lon.sin_cos();
        let (s_lat, c_lat) = self.centre_lat.sin_cos();
        let x1 = c_lon * v[0] + s_lon * v[1];
        let y1 = -s_lon * v[0] + c_lon * v[1];
        let z1 = v[2];
        [c_lat * x1 + s_lat * z1, y1, -s_lat * x1 + c_lat * z1]
    }

    fn to_world(&self, v: [f64; 3]) -> [f64; 3] {
        let (s_lon, c_lon) = self.centre_lon.sin_cos();
        let (s_lat, c_lat) = self.centre_lat.sin_cos();
        let x1 = c_lat * v[0] - s_lat * v[2];
        let z1 = s_lat * v[0] + c_lat * v[2];
        [c_lon * x1 - s_lon * v[1], s_lon * x1 + c_lon * v[1], z1]
    }

    /// The grid cell (row, column) containing the direction `v`, or `None` if
    /// it falls outside the grid.
    pub fn vec2ij(&self, v: [f64; 3]) -> Option<(usize, usize)> {
        let local = self.to_local(normalise(v));
        let lat = local[2].clamp(-1.0, 1.0).asin();
        let lon = local[1].atan2(local[0]);
        let width = self.cell_width();
        let to_index = |angle: f64| -> Option<usize> {
            let f = ((angle + self.half_width) / width).floor();
            if f < 0.0 || f > self.num_cells as f64 {
                None
            } else {
                // A direction exactly on the far edge belongs to the last cell.
                Some((f as usize).min(self.num_cells - 1))
            }
        };
        Some((to_index(lat)?, to_index(lon)?))
    }

    /// The direction of the centre of cell (row, column).
    pub fn ij2vec(&self, i: usize, j: usize) -> [f64; 3] {
        let width = self.cell_width();
        let lat = -self.half_width + (i as f64 + 0.5) * width;
        let lon = -self.half_width + (j as f64 + 0.5) * width;
        let (s_lat, c_lat) = lat.sin_cos();
        let (s_lon, c_lon) = lon.sin_cos();
        self.to_world([c_lat * c_lon, c_lat * s_lon, s_lat])
    }

    /// The HEALPix pixel under the centre of every grid cell.
    pub fn pixel_grid(&self, healpix: &Healpix) -> Array2<usize> {
        Array2::from_shape_fn((self.num_cells, self.num_cells), |(i, j)| {
            healpix.vec2pix(self.ij2vec(i, j))
        })
    }

    /// Sample a map on the grid, given the grid's pixel lookup from
    /// [`CartesianProjection::pixel_grid`].
    pub fn project(&self, map: ArrayView1<f64>, pixel_grid: ArrayView2<usize>) -> Array2<f64> {
        pixel_grid.mapv(|pix| map[pix])
    }
}
