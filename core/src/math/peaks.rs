use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1};
use std::collections::VecDeque;

/// Parameters of the 2D local-maximum search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakParams {
    /// Accepted peaks are at least this far apart (Chebyshev distance), and a
    /// peak must dominate the square of this radius around it.
    pub min_distance: usize,
    /// Drop maxima closer than `min_distance` to any edge of the field.
    pub exclude_border: bool,
    /// Absolute floor; the field minimum is always a floor as well.
    pub threshold: Option<f32>,
}

impl Default for PeakParams {
    fn default() -> Self {
        Self {
            min_distance: 1,
            exclude_border: true,
            threshold: None,
        }
    }
}

/// Local-maximum search over a dense 2D field.
pub struct LocalMaxima;

impl LocalMaxima {
    /// Returns `(row, column)` pairs of accepted maxima, strongest first.
    pub fn find(field: ArrayView2<f32>, params: &PeakParams) -> Vec<(usize, usize)> {
        let (rows, cols) = field.dim();
        if rows == 0 || cols == 0 {
            return Vec::new();
        }

        let field_min = field.iter().copied().fold(f32::INFINITY, f32::min);
        let threshold = params
            .threshold
            .map_or(field_min, |floor| floor.max(field_min));

        let radius = params.min_distance;
        let dominated = Self::maximum_filter(field, radius);

        let border = if params.exclude_border { radius } else { 0 };
        let mut candidates = Vec::new();
        for row in border..rows.saturating_sub(border) {
            for col in border..cols.saturating_sub(border) {
                let value = field[[row, col]];
                if value == dominated[[row, col]] && value > threshold {
                    candidates.push((value, row, col));
                }
            }
        }
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut accepted: Vec<(usize, usize)> = Vec::with_capacity(candidates.len());
        for (_, row, col) in candidates {
            let crowded = accepted
                .iter()
                .any(|&(r, c)| row.abs_diff(r).max(col.abs_diff(c)) < radius);
            if !crowded {
                accepted.push((row, col));
            }
        }
        accepted
    }

    /// Maximum over the `(2·radius+1)²` square around each cell, clamped at the edges.
    fn maximum_filter(field: ArrayView2<f32>, radius: usize) -> Array2<f32> {
        let mut by_row = Array2::<f32>::zeros(field.dim());
        for (src, dst) in field.rows().into_iter().zip(by_row.rows_mut()) {
            sliding_max(src, radius, dst);
        }
        let mut result = Array2::<f32>::zeros(field.dim());
        for (src, dst) in by_row.columns().into_iter().zip(result.columns_mut()) {
            sliding_max(src, radius, dst);
        }
        result
    }
}

fn sliding_max(input: ArrayView1<f32>, radius: usize, mut out: ArrayViewMut1<f32>) {
    let len = input.len();
    let mut window: VecDeque<usize> = VecDeque::new();
    let mut next = 0;
    for idx in 0..len {
        let hi = (idx + radius).min(len - 1);
        while next <= hi {
            while let Some(&back) = window.back() {
                if input[back] <= input[next] {
                    window.pop_back();
                } else {
                    break;
                }
            }
            window.push_back(next);
            next += 1;
        }
        let lo = idx.saturating_sub(radius);
        while let Some(&front) = window.front() {
            if front < lo {
                window.pop_front();
            } else {
                break;
            }
        }
        out[idx] = input[window[0]];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn field_with(points: &[(usize, usize, f32)], rows: usize, cols: usize) -> Array2<f32> {
        let mut field = Array2::<f32>::zeros((rows, cols));
        for &(r, c, v) in points {
            field[[r, c]] = v;
        }
        field
    }

    #[test]
    fn flat_field_has_no_maxima() {
        let field = Array2::<f32>::from_elem((20, 20), 3.0);
        let params = PeakParams {
            min_distance: 2,
            ..Default::default()
        };
        assert!(LocalMaxima::find(field.view(), &params).is_empty());
    }

    #[test]
    fn maxima_are_ordered_strongest_first() {
        let field = field_with(&[(5, 5, 1.0), (14, 14, 2.0)], 20, 20);
        let params = PeakParams {
            min_distance: 3,
            ..Default::default()
        };
        assert_eq!(
            LocalMaxima::find(field.view(), &params),
            vec![(14, 14), (5, 5)]
        );
    }

    #[test]
    fn weaker_neighbour_is_suppressed() {
        let field = field_with(&[(10, 10, 2.0), (10, 13, 1.0)], 20, 20);
        let params = PeakParams {
            min_distance: 4,
            ..Default::default()
        };
        assert_eq!(LocalMaxima::find(field.view(), &params), vec![(10, 10)]);
    }

    #[test]
    fn plateau_yields_a_single_peak() {
        let field = field_with(&[(8, 8, 1.0), (8, 9, 1.0)], 20, 20);
        let params = PeakParams {
            min_distance: 3,
            ..Default::default()
        };
        assert_eq!(LocalMaxima::find(field.view(), &params), vec![(8, 8)]);
    }

    #[test]
    fn border_exclusion_drops_edge_maxima() {
        let field = field_with(&[(1, 10, 5.0), (10, 10, 1.0)], 20, 20);
        let params = PeakParams {
            min_distance: 3,
            exclude_border: true,
            threshold: None,
        };
        assert_eq!(LocalMaxima::find(field.view(), &params), vec![(10, 10)]);

        let params = PeakParams {
            exclude_border: false,
            ..params
        };
        assert_eq!(
            LocalMaxima::find(field.view(), &params),
            vec![(1, 10), (10, 10)]
        );
    }

    #[test]
    fn threshold_discards_weak_maxima() {
        let field = field_with(&[(5, 5, 0.5), (14, 14, 2.0)], 20, 20);
        let params = PeakParams {
            min_distance: 3,
            exclude_border: true,
            threshold: Some(1.0),
        };
        assert_eq!(LocalMaxima::find(field.view(), &params), vec![(14, 14)]);
    }

    #[test]
    fn empty_field_has_no_maxima() {
        let field = Array2::<f32>::zeros((0, 8));
        assert!(LocalMaxima::find(field.view(), &PeakParams::default()).is_empty());
    }
}
