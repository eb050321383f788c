use statrs::statistics::Statistics;
use std::cmp::Ordering;

/// Median of a slice; 0.0 when empty. Even lengths average the middle pair.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population variance; 0.0 for fewer than two values.
pub fn population_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    values.population_variance()
}

/// Average with linearly increasing weights 1, 2, ..., n over the given order.
pub fn weighted_average(values: &[f64]) -> f64 {
    match values {
        [] => 0.0,
        [only] => *only,
        _ => {
            let (num, den) = values
                .iter()
                .enumerate()
                .fold((0.0, 0.0), |(num, den), (i, v)| {
                    let w = (i + 1) as f64;
                    (num + v * w, den + w)
                });
            num / den
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

/// Least-squares line of `values` against their index 0, 1, 2, ...
///
/// Returns `None` for fewer than two values.
pub fn fit_against_index(values: &[f64]) -> Option<LinearFit> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;

    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        sum_xy += (x - x_mean) * (y - y_mean);
        sum_xx += (x - x_mean) * (x - x_mean);
    }

    let slope = sum_xy / sum_xx;
    Some(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

/// Rounds to `places` decimals using the exact binary value, ties to even.
///
/// `0.125` is a true tie and rounds to `0.12`; `1.115` is stored just below the
/// tie and rounds to `1.11`.
pub fn round_to(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.places$}").parse().unwrap_or(value)
}
