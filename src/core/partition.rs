use crate::utils::error::{Result, SmokeError};
use std::ops::Range;

/// Splits `data` into `num_slices` contiguous slices.
///
/// Slice `i` covers positions `[i*len/n, (i+1)*len/n)`, so slice lengths
/// differ by at most one and the slices cover `data` exactly, in order.
/// Slices may be empty when `num_slices` exceeds the range length.
pub fn slice_range(data: Range<i64>, num_slices: usize) -> Result<Vec<Range<i64>>> {
    if num_slices == 0 {
        return Err(SmokeError::InvalidConfigValueError {
            field: "num_slices".to_string(),
            value: "0".to_string(),
            reason: "Number of slices must be positive".to_string(),
        });
    }

    let len = (data.end - data.start).max(0) as i128;
    let n = num_slices as i128;

    Ok((0..n)
        .map(|i| {
            let start = data.start + (i * len / n) as i64;
            let end = data.start + ((i + 1) * len / n) as i64;
            start..end
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        let slices = slice_range(0..100_000, 10).unwrap();
        assert_eq!(slices.len(), 10);
        assert_eq!(slices[0], 0..10_000);
        assert_eq!(slices[9], 90_000..100_000);
    }

    #[test]
    fn test_uneven_split_covers_range() {
        let slices = slice_range(5..15, 3).unwrap();
        assert_eq!(slices, vec![5..8, 8..11, 11..15]);

        let mut expected_start = 5;
        for slice in &slices {
            assert_eq!(slice.start, expected_start);
            expected_start = slice.end;
        }
        assert_eq!(expected_start, 15);
    }

    #[test]
    fn test_more_slices_than_elements() {
        let slices = slice_range(0..3, 5).unwrap();
        assert_eq!(slices.len(), 5);
        assert_eq!(slices.iter().map(|s| s.end - s.start).sum::<i64>(), 3);
        assert!(slices.iter().all(|s| s.end - s.start <= 1));
    }

    #[test]
    fn test_zero_slices_rejected() {
        assert!(slice_range(0..10, 0).is_err());
    }
}
