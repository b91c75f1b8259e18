//! Exact nearest-neighbor index over squared Euclidean distance.
//!
//! Vectors are stored flat, one row per knowledge entry, in load order.
//! Queries scan every row; for FAQ-sized collections that is fast enough
//! and keeps results exact.

use askdesk_core::error::{AskDeskError, Result};

/// One query hit: the entry position and its squared L2 distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

#[derive(Debug, Clone)]
pub struct FlatIndex {
    dims: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Build an index from vectors in entry order.
    ///
    /// Every vector must have exactly `dims` components.
    pub fn build(dims: usize, vectors: Vec<Vec<f32>>) -> Result<Self> {
        let mut data = Vec::with_capacity(dims * vectors.len());
        for (i, v) in vectors.into_iter().enumerate() {
            if v.len() != dims {
                return Err(AskDeskError::Index(format!(
                    "vector {i} has {} dimensions, expected {dims}",
                    v.len()
                )));
            }
            data.extend(v);
        }
        Ok(Self { dims, data })
    }

    pub fn len(&self) -> usize {
        if self.dims == 0 { 0 } else { self.data.len() / self.dims }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return up to `k` neighbors ordered by ascending distance.
    ///
    /// Equal distances keep entry order, so the earliest entry wins a tie.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if vector.len() != self.dims {
            return Err(AskDeskError::Index(format!(
                "query has {} dimensions, expected {}",
                vector.len(),
                self.dims
            )));
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dims)
            .enumerate()
            .map(|(position, row)| Neighbor {
                position,
                distance: squared_l2(row, vector),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        hits.truncate(k);
        Ok(hits)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
