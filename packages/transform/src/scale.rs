//! Min-max rescaling of a numeric column into an integer range.

use thiserror::Error;

/// Errors from [`scale_to_range`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScaleError {
    /// The input sequence was empty; there is no range to map from.
    #[error("cannot scale an empty sequence")]
    EmptyInput,

    /// The target range was empty or inverted.
    #[error("invalid target range: new_max ({new_max}) must be greater than new_min ({new_min})")]
    InvalidRange {
        /// The requested lower bound.
        new_min: i64,
        /// The requested upper bound.
        new_max: i64,
    },
}

/// Linearly rescales `values` into `[new_min, new_max]`, preserving
/// length and order.
///
/// Each value maps to
/// `round((v - min) / (max - min) * (new_max - new_min) + new_min)`,
/// where `min`/`max` are taken over the whole input, so a value's scaled
/// result depends on the entire dataset, and rescaling a different
/// subset changes every output.
///
/// Rounding is **half away from zero** (`f64::round`): an input exactly
/// between two integers moves away from zero, so `[10, 20, 30]` over
/// `[1, 100]` yields `[1, 51, 100]`.
///
/// When every input is identical the source range is empty; rather than
/// divide by zero, every output is `new_min`.
///
/// Inputs must be finite. Pure: no side effects, identical input yields
/// identical output.
///
/// # Errors
///
/// Returns [`ScaleError::EmptyInput`] for an empty input and
/// [`ScaleError::InvalidRange`] unless `new_max > new_min`.
pub fn scale_to_range(
    values: &[f64],
    new_min: i64,
    new_max: i64,
) -> Result<Vec<i64>, ScaleError> {
    if values.is_empty() {
        return Err(ScaleError::EmptyInput);
    }
    if new_max <= new_min {
        return Err(ScaleError::InvalidRange { new_min, new_max });
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // Degenerate input: all values equal, nothing to interpolate over.
    if (max - min).abs() < f64::EPSILON {
        return Ok(vec![new_min; values.len()]);
    }

    #[allow(clippy::cast_precision_loss)]
    let span = (new_max - new_min) as f64;

    let scaled = values
        .iter()
        .map(|&v| {
            #[allow(clippy::cast_precision_loss)]
            let offset = new_min as f64;
            #[allow(clippy::cast_possible_truncation)]
            let out = ((v - min) / (max - min) * span + offset).round() as i64;
            out
        })
        .collect();

    Ok(scaled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_extremes_to_range_bounds() {
        let scaled = scale_to_range(&[10.0, 20.0, 30.0], 1, 100).unwrap();
        assert_eq!(scaled, vec![1, 51, 100]);
    }

    #[test]
    fn output_stays_within_range() {
        let values: Vec<f64> = vec![3.0, 7.0, 19.0, 250.0, 1.0, 42.0];
        let scaled = scale_to_range(&values, 5, 40).unwrap();
        assert_eq!(scaled.len(), values.len());
        assert!(scaled.iter().all(|&s| (5..=40).contains(&s)));
        // min input -> new_min, max input -> new_max
        assert_eq!(scaled[4], 5);
        assert_eq!(scaled[3], 40);
    }

    #[test]
    fn identical_values_all_map_to_new_min() {
        let scaled = scale_to_range(&[5.0, 5.0, 5.0], 1, 100).unwrap();
        assert_eq!(scaled, vec![1, 1, 1]);
    }

    #[test]
    fn single_value_maps_to_new_min() {
        let scaled = scale_to_range(&[42.0], 1, 100).unwrap();
        assert_eq!(scaled, vec![1]);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(scale_to_range(&[], 1, 100), Err(ScaleError::EmptyInput));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert_eq!(
            scale_to_range(&[1.0, 2.0], 100, 1),
            Err(ScaleError::InvalidRange {
                new_min: 100,
                new_max: 1
            })
        );
        assert_eq!(
            scale_to_range(&[1.0, 2.0], 7, 7),
            Err(ScaleError::InvalidRange {
                new_min: 7,
                new_max: 7
            })
        );
    }

    #[test]
    fn scaling_is_idempotent_on_identical_input() {
        let values = vec![12.0, 99.0, 4.0, 57.0];
        let first = scale_to_range(&values, 1, 100).unwrap();
        let second = scale_to_range(&values, 1, 100).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn preserves_input_order() {
        let scaled = scale_to_range(&[30.0, 10.0, 20.0], 1, 100).unwrap();
        assert_eq!(scaled, vec![100, 1, 51]);
    }
}
