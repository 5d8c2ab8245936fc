//! Derived series: ratios, percent changes and z-score composites computed
//! from stored indicators. Every derivation joins its inputs strictly on
//! date, stores its result under the output name with `Calculated`
//! provenance, and returns the stored series.

use crate::error::{Error, Result};
use crate::models::{Observation, Provenance};
use crate::store::IndicatorStore;
use crate::timeseries;
use tracing::warn;

/// One input of a composite index.
#[derive(Debug, Clone)]
pub struct CompositeComponent {
    pub name: String,
    pub weight: f64,
    pub sign: Sign,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    fn factor(self) -> f64 {
        match self {
            Sign::Positive => 1.0,
            Sign::Negative => -1.0,
        }
    }
}

impl CompositeComponent {
    pub fn new(name: &str, weight: f64, sign: Sign) -> Self {
        Self {
            name: name.to_string(),
            weight,
            sign,
        }
    }
}

impl IndicatorStore {
    /// Stores `numerator / denominator` under `output_name`, inner-joined on
    /// date. Dates where the denominator is exactly zero are dropped with a
    /// warning rather than stored as ±inf.
    pub async fn derive_ratio(
        &self,
        numerator_name: &str,
        denominator_name: &str,
        output_name: &str,
    ) -> Result<Vec<Observation>> {
        let numerator = self.query(numerator_name, None, None).await?;
        let denominator = self.query(denominator_name, None, None).await?;

        let joined = timeseries::inner_join(&numerator, &denominator);

        let series: Vec<Observation> = joined
            .into_iter()
            .filter_map(|(date, num, den)| {
                if den == 0.0 {
                    warn!(
                        "dropping {}: zero denominator '{}' in ratio '{}'",
                        date, denominator_name, output_name
                    );
                    None
                } else {
                    Some(Observation::new(date, num / den))
                }
            })
            .collect();

        if series.is_empty() {
            return Err(Error::NoOverlap {
                inputs: format!("'{}' and '{}'", numerator_name, denominator_name),
            });
        }

        let provenance = Provenance::calculated(
            None,
            &format!("Ratio of {} to {}", numerator_name, denominator_name),
        );
        self.insert(output_name, &series, &provenance).await?;

        Ok(series)
    }

    /// Stores the period-over-period percent change of `name` under
    /// `output_name`.
    ///
    /// `periods` counts observations, not calendar time: the caller must know
    /// the series' native frequency to pick a count matching the intended
    /// window (12 for year-over-year on monthly data, ~252 on daily trading
    /// data). The first `periods` observations produce no output.
    pub async fn derive_percent_change(
        &self,
        name: &str,
        periods: usize,
        output_name: &str,
    ) -> Result<Vec<Observation>> {
        let input = self.query(name, None, None).await?;

        let series: Vec<Observation> = input
            .iter()
            .enumerate()
            .skip(periods)
            .filter_map(|(i, obs)| {
                let base = input[i - periods].value;
                let change = (obs.value - base) / base * 100.0;
                if change.is_finite() {
                    Some(Observation::new(obs.date, change))
                } else {
                    warn!(
                        "dropping {}: zero base value in percent change '{}'",
                        obs.date, output_name
                    );
                    None
                }
            })
            .collect();

        if series.is_empty() {
            return Err(Error::InsufficientHistory {
                name: name.to_string(),
                have: input.len(),
                need: periods + 1,
            });
        }

        let provenance = Provenance::calculated(
            Some(&format!("{}_PCT{}", name.to_uppercase(), periods)),
            &format!("{}-period percent change of {}", periods, name),
        );
        self.insert(output_name, &series, &provenance).await?;

        Ok(series)
    }

    /// Stores a weighted sum of z-scores under `output_name`: each component
    /// is inner-joined on date with the others, normalized independently over
    /// the joined window (sample standard deviation), then summed as
    /// `sign * weight * z`.
    pub async fn derive_composite(
        &self,
        components: &[CompositeComponent],
        output_name: &str,
    ) -> Result<Vec<Observation>> {
        let mut inputs = Vec::with_capacity(components.len());
        for component in components {
            inputs.push(self.query(&component.name, None, None).await?);
        }

        let input_refs: Vec<&[Observation]> = inputs.iter().map(|s| s.as_slice()).collect();
        let joined = timeseries::inner_join_multi(&input_refs);

        let names = || {
            components
                .iter()
                .map(|c| format!("'{}'", c.name))
                .collect::<Vec<_>>()
                .join(", ")
        };

        if joined.is_empty() {
            return Err(Error::NoOverlap { inputs: names() });
        }

        // Per-component mean/std over the joined window only.
        let mut stats = Vec::with_capacity(components.len());
        for (idx, component) in components.iter().enumerate() {
            let column: Vec<f64> = joined.iter().map(|(_, row)| row[idx]).collect();
            let (mean, std) =
                timeseries::mean_std(&column).ok_or_else(|| Error::InsufficientHistory {
                    name: component.name.clone(),
                    have: column.len(),
                    need: 2,
                })?;
            if std == 0.0 {
                return Err(Error::ZeroVariance {
                    name: component.name.clone(),
                });
            }
            stats.push((mean, std));
        }

        let series: Vec<Observation> = joined
            .iter()
            .map(|(date, row)| {
                let value = components
                    .iter()
                    .zip(row.iter().zip(stats.iter()))
                    .map(|(component, (x, (mean, std)))| {
                        component.sign.factor() * component.weight * (x - mean) / std
                    })
                    .sum();
                Observation::new(*date, value)
            })
            .collect();

        let provenance =
            Provenance::calculated(None, &format!("Weighted z-score composite of {}", names()));
        self.insert(output_name, &series, &provenance).await?;

        Ok(series)
    }
}
