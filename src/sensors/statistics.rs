use crate::string_error::StringError;

pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }

    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Unbiased standard deviation (divisor `n - 1`). `None` below two samples.
pub fn sample_std_dev(samples: &[f64], mean: f64) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }

    let sum_sq: f64 = samples.iter().map(|x| (x - mean).powi(2)).sum();
    Some((sum_sq / (samples.len() - 1) as f64).sqrt())
}

/// Keep the samples whose z-score is within `threshold` (inclusive).
pub fn zscore_filter(samples: &[f64], mean: f64, std_dev: f64, threshold: f64) -> Vec<f64> {
    samples
        .iter()
        .copied()
        .filter(|x| ((x - mean) / std_dev).abs() <= threshold)
        .collect()
}

/// Mean of `samples` once outliers beyond `threshold` standard deviations are dropped.
///
/// Identical samples (zero deviation) skip the filter.
pub fn filtered_mean(samples: &[f64], threshold: f64) -> Result<f64, StringError> {
    let v_mean = mean(samples).ok_or(StringError("no sample to average"))?;
    let st_dev = sample_std_dev(samples, v_mean)
        .ok_or(StringError("not enough samples for a standard deviation"))?;

    if st_dev == 0.0 {
        return Ok(v_mean);
    }

    let kept = zscore_filter(samples, v_mean, st_dev, threshold);
    log::debug!(
        "mean {:.6} s, st_dev {:.6} s, {} outlier(s) dropped",
        v_mean,
        st_dev,
        samples.len() - kept.len()
    );

    mean(&kept).ok_or(StringError("filter dropped every sample"))
}
