//! Cycle-top heuristics: local-maxima detection with tunable sensitivity and
//! lead/lag pairing of peak dates across two series. Pure functions over a
//! queried series; nothing here touches the store.

use crate::models::Observation;
use crate::timeseries;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy)]
pub struct PeakParams {
    /// Minimum peak prominence as a multiple of the series' standard
    /// deviation.
    pub prominence: f64,
    /// Minimum spacing between reported peaks, in calendar days.
    pub min_distance_days: i64,
}

impl Default for PeakParams {
    fn default() -> Self {
        Self {
            prominence: 0.1,
            min_distance_days: 180,
        }
    }
}

/// Indices of significant local maxima in `series`, ascending. The series is
/// assumed sorted by date (the store's query order).
pub fn find_peaks(series: &[Observation], params: &PeakParams) -> Vec<usize> {
    if series.len() < 3 {
        return Vec::new();
    }

    let values: Vec<f64> = series.iter().map(|obs| obs.value).collect();
    let Some((_, std)) = timeseries::mean_std(&values) else {
        return Vec::new();
    };
    let threshold = params.prominence * std;

    let mut candidates: Vec<usize> = Vec::new();
    for i in 1..values.len() - 1 {
        if values[i] > values[i - 1] && values[i] >= values[i + 1] {
            if prominence_at(&values, i) >= threshold {
                candidates.push(i);
            }
        }
    }

    // Enforce minimum spacing, keeping the tallest peak of any cluster.
    candidates.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    let mut kept: Vec<usize> = Vec::new();
    for idx in candidates {
        let far_enough = kept.iter().all(|&k| {
            (series[idx].date - series[k].date).num_days().abs() >= params.min_distance_days
        });
        if far_enough {
            kept.push(idx);
        }
    }

    kept.sort_unstable();
    kept
}

/// Topographic prominence of the local maximum at `i`: height above the
/// higher of the two valley floors separating it from taller terrain.
fn prominence_at(values: &[f64], i: usize) -> f64 {
    let peak = values[i];

    let mut left_min = peak;
    for &v in values[..i].iter().rev() {
        if v > peak {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = peak;
    for &v in &values[i + 1..] {
        if v > peak {
            break;
        }
        right_min = right_min.min(v);
    }

    peak - left_min.max(right_min)
}

/// A matched pair of peaks across two series. `lag_days` is positive when
/// the second series peaks after the first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakPair {
    pub first: NaiveDate,
    pub second: NaiveDate,
    pub lag_days: i64,
}

/// Pairs each peak date of the first series with the closest peak date of
/// the second within `max_days`. Unmatched peaks are dropped.
pub fn lead_lag(
    first_peaks: &[NaiveDate],
    second_peaks: &[NaiveDate],
    max_days: i64,
) -> Vec<PeakPair> {
    first_peaks
        .iter()
        .filter_map(|&first| {
            second_peaks
                .iter()
                .map(|&second| (second, (second - first).num_days()))
                .filter(|(_, days)| days.abs() <= max_days)
                .min_by_key(|(_, days)| days.abs())
                .map(|(second, lag_days)| PeakPair {
                    first,
                    second,
                    lag_days,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn daily(start: &str, values: &[f64]) -> Vec<Observation> {
        let start: NaiveDate = start.parse().unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Observation::new(start.checked_add_days(Days::new(i as u64)).unwrap(), v))
            .collect()
    }

    #[test]
    fn test_two_separated_peaks() {
        let series = daily(
            "2023-01-01",
            &[0.0, 1.0, 5.0, 1.0, 0.0, 1.0, 4.0, 1.0, 0.0],
        );
        let params = PeakParams {
            prominence: 0.5,
            min_distance_days: 2,
        };

        let peaks = find_peaks(&series, &params);
        assert_eq!(peaks, vec![2, 6]);
    }

    #[test]
    fn test_distance_filter_keeps_tallest() {
        // Two peaks one day apart: only the taller survives.
        let series = daily("2023-01-01", &[0.0, 3.0, 1.0, 5.0, 0.0]);
        let params = PeakParams {
            prominence: 0.1,
            min_distance_days: 5,
        };

        let peaks = find_peaks(&series, &params);
        assert_eq!(peaks, vec![3]);
    }

    #[test]
    fn test_prominence_filters_noise() {
        // A tiny wobble on the shoulder of a big peak is not a peak.
        let series = daily("2023-01-01", &[0.0, 10.0, 2.0, 2.1, 2.0, 0.0, 0.0]);
        let params = PeakParams {
            prominence: 0.5,
            min_distance_days: 1,
        };

        let peaks = find_peaks(&series, &params);
        assert_eq!(peaks, vec![1]);
    }

    #[test]
    fn test_lead_lag_pairs_closest() {
        let first = vec!["2021-04-01".parse().unwrap(), "2023-01-01".parse().unwrap()];
        let second = vec![
            "2021-05-15".parse().unwrap(),
            "2021-11-01".parse().unwrap(),
            "2023-01-20".parse().unwrap(),
        ];

        let pairs = lead_lag(&first, &second, 60);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].lag_days, 44);
        assert_eq!(pairs[1].lag_days, 19);
    }

    #[test]
    fn test_lead_lag_respects_max_days() {
        let first = vec!["2021-01-01".parse::<NaiveDate>().unwrap()];
        let second = vec!["2021-12-01".parse::<NaiveDate>().unwrap()];
        assert!(lead_lag(&first, &second, 120).is_empty());
    }
}
