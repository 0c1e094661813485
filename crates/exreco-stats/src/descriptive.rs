/// Descriptive statistics summarizing a dataset.
///
/// Holds the measures of central tendency and dispersion that the GA reports for each
/// generation's fitness distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    /// Number of values in the dataset.
    pub count: usize,
    /// The minimum value in the dataset.
    pub min: f32,
    /// The maximum value in the dataset.
    pub max: f32,
    /// The arithmetic mean of the dataset.
    pub mean: f32,
    /// The median value of the dataset (upper median for even counts).
    pub median: f32,
    /// The population variance of the dataset.
    pub variance: f32,
    /// The population standard deviation of the dataset.
    pub std_dev: f32,
    /// The standard deviation divided by the range, or 0 for a degenerate range.
    pub normalized_std_dev: f32,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// Values are collected and sorted with [`f32::total_cmp`] before summarizing.
    ///
    /// Returns `None` if the dataset is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use exreco_stats::descriptive::DescriptiveStats;
    /// let values = [0.5, 0.2, 0.4, 0.1, 0.3];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.min, 0.1);
    /// assert_eq!(stats.max, 0.5);
    /// assert_eq!(stats.median, 0.3);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f32::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from values already sorted in ascending order.
    ///
    /// Returns `None` if the dataset is empty.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use exreco_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::from_sorted(&[0.5, 0.5, 0.5]).unwrap();
    /// assert_eq!(stats.variance, 0.0);
    /// assert_eq!(stats.normalized_std_dev, 0.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f32]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f32;
        let mean = sorted_values.iter().copied().sum::<f32>() / n;
        let median = sorted_values[count / 2];
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f32>()
            / n;
        let std_dev = variance.sqrt();
        let range = max - min;
        let normalized_std_dev = if range <= f32::EPSILON * mean.abs().max(1.0) {
            0.0
        } else {
            std_dev / range
        };

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev,
            normalized_std_dev,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(DescriptiveStats::new(Vec::new()).is_none());
    }

    #[test]
    fn test_single_value() {
        let stats = DescriptiveStats::new([0.42]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.min, 0.42);
        assert_eq!(stats.max, 0.42);
        assert_eq!(stats.median, 0.42);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.normalized_std_dev, 0.0);
    }

    #[test]
    fn test_variance_of_spread_values() {
        let stats = DescriptiveStats::new([0.0, 1.0]).unwrap();
        assert!((stats.mean - 0.5).abs() < 1e-6);
        assert!((stats.variance - 0.25).abs() < 1e-6);
        assert!((stats.std_dev - 0.5).abs() < 1e-6);
        assert!((stats.normalized_std_dev - 0.5).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "values must be sorted")]
    fn test_from_sorted_rejects_unsorted() {
        let _ = DescriptiveStats::from_sorted(&[0.3, 0.1]);
    }
}
