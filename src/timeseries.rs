use crate::models::Observation;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Sorts a series ascending by date and collapses duplicate dates.
/// When the input carries the same date twice, the later entry in iteration
/// order wins.
pub fn normalize(series: &[Observation]) -> BTreeMap<NaiveDate, f64> {
    series.iter().map(|obs| (obs.date, obs.value)).collect()
}

/// Strict inner join of two series on date. Dates present in only one input
/// are dropped. Output is sorted ascending by date.
pub fn inner_join(
    series_a: &[Observation],
    series_b: &[Observation],
) -> Vec<(NaiveDate, f64, f64)> {
    let map_b = normalize(series_b);

    normalize(series_a)
        .into_iter()
        .filter_map(|(date, val_a)| map_b.get(&date).map(|&val_b| (date, val_a, val_b)))
        .collect()
}

/// Strict inner join of N series on date: a row is emitted only for dates
/// present in every input. Output is sorted ascending by date and each row's
/// values follow the input order.
pub fn inner_join_multi(series_list: &[&[Observation]]) -> Vec<(NaiveDate, Vec<f64>)> {
    let mut maps = series_list.iter().map(|s| normalize(s));

    let Some(first) = maps.next() else {
        return Vec::new();
    };

    let rest: Vec<BTreeMap<NaiveDate, f64>> = maps.collect();

    first
        .into_iter()
        .filter_map(|(date, first_val)| {
            let mut row = Vec::with_capacity(rest.len() + 1);
            row.push(first_val);
            for map in &rest {
                row.push(*map.get(&date)?);
            }
            Some((date, row))
        })
        .collect()
}

/// Sample mean and standard deviation (n - 1 denominator).
/// Returns None for fewer than two values.
pub fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1.0);

    Some((mean, variance.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: &str, value: f64) -> Observation {
        Observation::new(date.parse().unwrap(), value)
    }

    #[test]
    fn test_inner_join_drops_unmatched_dates() {
        let a = vec![
            obs("2023-01-01", 10.0),
            obs("2023-01-02", 20.0),
            obs("2023-01-03", 30.0),
        ];
        let b = vec![
            obs("2023-01-02", 2.0),
            obs("2023-01-03", 5.0),
            obs("2023-01-04", 6.0),
        ];

        let joined = inner_join(&a, &b);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0], ("2023-01-02".parse().unwrap(), 20.0, 2.0));
        assert_eq!(joined[1], ("2023-01-03".parse().unwrap(), 30.0, 5.0));
    }

    #[test]
    fn test_inner_join_sorts_unordered_input() {
        let a = vec![obs("2023-01-03", 3.0), obs("2023-01-01", 1.0)];
        let b = vec![obs("2023-01-01", 1.0), obs("2023-01-03", 3.0)];

        let joined = inner_join(&a, &b);
        assert_eq!(joined[0].0, "2023-01-01".parse::<chrono::NaiveDate>().unwrap());
        assert_eq!(joined[1].0, "2023-01-03".parse::<chrono::NaiveDate>().unwrap());
    }

    #[test]
    fn test_inner_join_multi() {
        let a = vec![obs("2023-01-01", 1.0), obs("2023-01-02", 2.0)];
        let b = vec![obs("2023-01-02", 20.0), obs("2023-01-03", 30.0)];
        let c = vec![obs("2023-01-02", 200.0), obs("2023-01-04", 400.0)];

        let joined = inner_join_multi(&[&a, &b, &c]);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].1, vec![2.0, 20.0, 200.0]);
    }

    #[test]
    fn test_normalize_later_duplicate_wins() {
        let series = vec![obs("2023-01-01", 1.0), obs("2023-01-01", 9.0)];
        let map = normalize(&series);
        assert_eq!(map.len(), 1);
        assert_eq!(map[&"2023-01-01".parse::<chrono::NaiveDate>().unwrap()], 9.0);
    }

    #[test]
    fn test_mean_std() {
        // Mean 20, sample std 10
        let (mean, std) = mean_std(&[10.0, 20.0, 30.0]).unwrap();
        assert!((mean - 20.0).abs() < 1e-9);
        assert!((std - 10.0).abs() < 1e-9);

        assert!(mean_std(&[1.0]).is_none());
    }
}
