use crate::models::Observation;
use crate::timeseries;
use serde::Serialize;

/// Pearson correlation between two series, inner-joined on date.
/// Returns (correlation, count of overlapping points).
pub fn pearson_correlation(
    series_a: &[Observation],
    series_b: &[Observation],
) -> (Option<f64>, usize) {
    let joined = timeseries::inner_join(series_a, series_b);
    let n = joined.len();
    if n < 2 {
        return (None, n);
    }

    let mean_x = joined.iter().map(|(_, x, _)| x).sum::<f64>() / n as f64;
    let mean_y = joined.iter().map(|(_, _, y)| y).sum::<f64>() / n as f64;

    let mut numer = 0.0;
    let mut denom_x = 0.0;
    let mut denom_y = 0.0;

    for (_, x, y) in &joined {
        let dx = x - mean_x;
        let dy = y - mean_y;
        numer += dx * dy;
        denom_x += dx * dx;
        denom_y += dy * dy;
    }

    if denom_x == 0.0 || denom_y == 0.0 {
        return (Some(0.0), n);
    }

    // Clamp to [-1, 1] to absorb floating point error.
    let correlation = (numer / (denom_x.sqrt() * denom_y.sqrt())).clamp(-1.0, 1.0);
    (Some(correlation), n)
}

/// Descriptive statistics of one stored series.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesSummary {
    pub records: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
    pub latest: f64,
}

pub fn summarize(series: &[Observation]) -> Option<SeriesSummary> {
    let latest = series.last()?.value;
    let values: Vec<f64> = series.iter().map(|obs| obs.value).collect();

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let std = timeseries::mean_std(&values).map(|(_, s)| s).unwrap_or(0.0);

    Some(SeriesSummary {
        records: series.len(),
        mean,
        min,
        max,
        std,
        latest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: &str, value: f64) -> Observation {
        Observation::new(date.parse().unwrap(), value)
    }

    #[test]
    fn test_pearson_correlation() {
        let a = vec![
            obs("2023-01-01", 1.0),
            obs("2023-01-02", 2.0),
            obs("2023-01-03", 3.0),
        ];
        let b = vec![
            obs("2023-01-01", 2.0),
            obs("2023-01-02", 4.0),
            obs("2023-01-03", 6.0),
        ];

        let (corr, count) = pearson_correlation(&a, &b);
        assert_eq!(count, 3);
        assert!((corr.unwrap() - 1.0).abs() < 1e-9);

        let c = vec![
            obs("2023-01-01", 3.0),
            obs("2023-01-02", 2.0),
            obs("2023-01-03", 1.0),
        ];
        let (corr_neg, _) = pearson_correlation(&a, &c);
        assert!((corr_neg.unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_needs_overlap() {
        let a = vec![obs("2023-01-01", 1.0)];
        let b = vec![obs("2023-02-01", 1.0)];
        let (corr, count) = pearson_correlation(&a, &b);
        assert!(corr.is_none());
        assert_eq!(count, 0);
    }

    #[test]
    fn test_summarize() {
        let series = vec![
            obs("2023-01-01", 10.0),
            obs("2023-01-02", 20.0),
            obs("2023-01-03", 30.0),
        ];

        let summary = summarize(&series).unwrap();
        assert_eq!(summary.records, 3);
        assert!((summary.mean - 20.0).abs() < 1e-9);
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 30.0);
        assert!((summary.std - 10.0).abs() < 1e-9);
        assert_eq!(summary.latest, 30.0);

        assert!(summarize(&[]).is_none());
    }
}
