//! Catalog of the series tracked for the copper/gold thesis. The batch
//! binary drives its fetch loop off this list; the store itself stays
//! string-keyed so ad-hoc series can still be inserted.

use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceKind {
    Fred,
    Yahoo,
}

#[derive(Debug, Clone)]
pub struct SeriesDef {
    pub name: &'static str,
    pub source: SourceKind,
    pub external_id: &'static str,
    pub description: &'static str,
}

const fn def(
    name: &'static str,
    source: SourceKind,
    external_id: &'static str,
    description: &'static str,
) -> SeriesDef {
    SeriesDef {
        name,
        source,
        external_id,
        description,
    }
}

static SERIES: Lazy<Vec<SeriesDef>> = Lazy::new(|| {
    vec![
        def(
            "copper_price",
            SourceKind::Fred,
            "PCOPPUSDM",
            "Global price of Copper (USD per metric ton)",
        ),
        def(
            "gold_price",
            SourceKind::Fred,
            "IR14270",
            "Import Price Index (End Use): Nonmonetary Gold",
        ),
        def(
            "ten_year_yield",
            SourceKind::Fred,
            "DGS10",
            "Market Yield on U.S. Treasury Securities at 10-Year Constant Maturity",
        ),
        def(
            "taiwan_exports",
            SourceKind::Fred,
            "XTEXVA01TWM667S",
            "Taiwan Exports of Goods and Services",
        ),
        def(
            "audusd",
            SourceKind::Fred,
            "DEXUSAL",
            "Australian Dollar / US Dollar Exchange Rate",
        ),
        def(
            "cadusd",
            SourceKind::Fred,
            "DEXCAUS",
            "Canadian Dollar / US Dollar Exchange Rate",
        ),
        def(
            "bitcoin_price",
            SourceKind::Yahoo,
            "BTC-USD",
            "Bitcoin price in USD",
        ),
        def(
            "russell_2000",
            SourceKind::Yahoo,
            "^RUT",
            "Russell 2000 Index",
        ),
    ]
});

static BY_NAME: Lazy<HashMap<&'static str, &'static SeriesDef>> =
    Lazy::new(|| SERIES.iter().map(|s| (s.name, s)).collect());

pub struct Registry;

impl Registry {
    pub fn all() -> &'static [SeriesDef] {
        &SERIES
    }

    pub fn find(name: &str) -> Option<&'static SeriesDef> {
        BY_NAME.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_series() {
        let copper = Registry::find("copper_price").unwrap();
        assert_eq!(copper.external_id, "PCOPPUSDM");
        assert_eq!(copper.source, SourceKind::Fred);
    }

    #[test]
    fn test_unknown_series() {
        assert!(Registry::find("copper_pric").is_none());
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = Registry::all().iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Registry::all().len());
    }
}
