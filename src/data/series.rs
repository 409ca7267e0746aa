use serde::{Deserialize, Serialize};

use super::model::Table;

// ---------------------------------------------------------------------------
// Gap policy
// ---------------------------------------------------------------------------

/// What to do when a requested year has no column in the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GapPolicy {
    /// Append nothing; the country's sequence ends up shorter than `years`.
    #[default]
    Skip,
    /// Append a missing value so every sequence stays aligned to `years`.
    FillMissing,
}

// ---------------------------------------------------------------------------
// CountrySeries – country → values aligned to a year list
// ---------------------------------------------------------------------------

/// Per-country value sequences, in first-encounter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountrySeries {
    years: Vec<String>,
    entries: Vec<(String, Vec<Option<f64>>)>,
}

/// One bar-chart group: a country label and its values across years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarRow {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

/// One pie wedge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
}

impl CountrySeries {
    /// The years the series was extracted for.
    pub fn years(&self) -> &[String] {
        &self.years
    }

    pub fn get(&self, country: &str) -> Option<&[Option<f64>]> {
        self.entries
            .iter()
            .find(|(name, _)| name == country)
            .map(|(_, values)| values.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when every country has exactly one value per year.
    pub fn is_aligned(&self) -> bool {
        self.entries
            .iter()
            .all(|(_, values)| values.len() == self.years.len())
    }

    fn push(&mut self, country: &str, value: Option<f64>) {
        match self.entries.iter_mut().find(|(name, _)| name == country) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((country.to_string(), vec![value])),
        }
    }

    /// Named bar-chart rows, one per country.
    pub fn to_bar_rows(&self) -> Vec<BarRow> {
        self.entries
            .iter()
            .map(|(label, values)| BarRow {
                label: label.clone(),
                values: values.clone(),
            })
            .collect()
    }

    /// Every country's value at position `index`, for a pie chart.
    ///
    /// Countries whose sequence is too short or whose value is missing or
    /// not positive contribute no wedge.
    pub fn slice_at(&self, index: usize) -> Vec<PieSlice> {
        self.entries
            .iter()
            .filter_map(|(label, values)| {
                let value = values.get(index).copied().flatten()?;
                (value > 0.0).then(|| PieSlice {
                    label: label.clone(),
                    value,
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract per-country value sequences for one indicator.
///
/// Values are appended year-major: for each year, every matching row
/// contributes in table order. A country listed more than once contributes
/// once per listing. The matching rows are located once, so the scan is
/// linear in the table plus `years × matches`.
pub fn extract_series<S: AsRef<str>, C: AsRef<str>>(
    table: &Table,
    indicator_code: &str,
    years: &[S],
    countries: &[C],
    gaps: GapPolicy,
) -> CountrySeries {
    // (country, row) for every row of the indicator and every listing of its country.
    let matches: Vec<(&str, usize)> = table
        .rows()
        .enumerate()
        .filter(|(_, row)| row.indicator_code() == Some(indicator_code))
        .filter_map(|(i, row)| row.country().map(|country| (country, i)))
        .flat_map(move |(country, i)| {
            countries
                .iter()
                .filter(move |c| (*c).as_ref() == country)
                .map(move |_| (country, i))
        })
        .collect();

    let mut series = CountrySeries {
        years: years.iter().map(|y| y.as_ref().to_string()).collect(),
        entries: Vec::new(),
    };

    for year in years.iter().map(AsRef::as_ref) {
        let Some(col) = table.column_index(year) else {
            log::debug!("Year {year} not present in table ({gaps:?})");
            if gaps == GapPolicy::FillMissing {
                for &(country, _) in &matches {
                    series.push(country, None);
                }
            }
            continue;
        };
        for &(country, i) in &matches {
            let value = table
                .row(i)
                .and_then(|row| row.cells().get(col))
                .and_then(|cell| cell.as_f64());
            series.push(country, value);
        }
    }

    if !series.is_aligned() {
        log::warn!(
            "Series for {indicator_code} is not aligned to its {} years",
            series.years.len()
        );
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Cell, COUNTRY_NAME, INDICATOR_CODE, INDICATOR_NAME};

    fn table() -> Table {
        let row = |country: &str, code: &str, a: Cell, b: Cell| {
            vec![
                Cell::Text(country.into()),
                Cell::Text("name".into()),
                Cell::Text(code.into()),
                a,
                b,
            ]
        };
        Table::new(
            vec![
                COUNTRY_NAME.into(),
                INDICATOR_NAME.into(),
                INDICATOR_CODE.into(),
                "1980".into(),
                "1990".into(),
            ],
            vec![
                row("United States", "SP.POP.TOTL", Cell::Number(100.0), Cell::Number(110.0)),
                row("India", "AG.LND.AGRI.ZS", Cell::Number(60.0), Cell::Number(61.0)),
                row("India", "SP.POP.TOTL", Cell::Number(700.0), Cell::Missing),
                row("Canada", "SP.POP.TOTL", Cell::Number(24.0), Cell::Number(27.0)),
            ],
        )
        .expect("table")
    }

    #[test]
    fn extracts_single_country() {
        let s = extract_series(
            &table(),
            "SP.POP.TOTL",
            &["1980", "1990"],
            &["United States"],
            GapPolicy::Skip,
        );
        assert_eq!(s.len(), 1);
        assert_eq!(s.get("United States"), Some(&[Some(100.0), Some(110.0)][..]));
    }

    #[test]
    fn order_follows_table_rows_not_country_list() {
        let s = extract_series(
            &table(),
            "SP.POP.TOTL",
            &["1980", "1990"],
            &["Canada", "India", "United States"],
            GapPolicy::Skip,
        );
        let order: Vec<_> = s.countries().collect();
        assert_eq!(order, vec!["United States", "India", "Canada"]);
        assert!(s.is_aligned());
        assert_eq!(s.get("India"), Some(&[Some(700.0), None][..]));
    }

    #[test]
    fn unknown_country_is_absent() {
        let s = extract_series(
            &table(),
            "SP.POP.TOTL",
            &["1980"],
            &["Atlantis"],
            GapPolicy::Skip,
        );
        assert!(s.is_empty());
    }

    #[test]
    fn skip_policy_shortens_sequences_for_unknown_years() {
        let s = extract_series(
            &table(),
            "SP.POP.TOTL",
            &["1980", "2050", "1990"],
            &["Canada"],
            GapPolicy::Skip,
        );
        assert_eq!(s.get("Canada"), Some(&[Some(24.0), Some(27.0)][..]));
        assert!(!s.is_aligned());
    }

    #[test]
    fn fill_policy_keeps_sequences_aligned() {
        let s = extract_series(
            &table(),
            "SP.POP.TOTL",
            &["1980", "2050", "1990"],
            &["Canada"],
            GapPolicy::FillMissing,
        );
        assert_eq!(s.get("Canada"), Some(&[Some(24.0), None, Some(27.0)][..]));
        assert!(s.is_aligned());
    }

    #[test]
    fn bar_rows_and_pie_slices() {
        let s = extract_series(
            &table(),
            "SP.POP.TOTL",
            &["1980", "1990"],
            &["United States", "India", "Canada"],
            GapPolicy::Skip,
        );
        let bars = s.to_bar_rows();
        assert_eq!(bars[0].label, "United States");
        assert_eq!(bars[0].values, vec![Some(100.0), Some(110.0)]);

        let pie = s.slice_at(1);
        let labels: Vec<_> = pie.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["United States", "Canada"]);
        assert!(s.slice_at(5).is_empty());
    }

    #[test]
    fn repeated_country_contributes_once_per_listing() {
        let s = extract_series(
            &table(),
            "SP.POP.TOTL",
            &["1980", "1990"],
            &["Canada", "Canada"],
            GapPolicy::Skip,
        );
        assert_eq!(s.len(), 1);
        assert_eq!(
            s.get("Canada"),
            Some(&[Some(24.0), Some(24.0), Some(27.0), Some(27.0)][..])
        );
        assert!(!s.is_aligned());
    }

    #[test]
    fn zero_and_negative_values_get_no_wedge() {
        let table = Table::new(
            vec![
                COUNTRY_NAME.into(),
                INDICATOR_NAME.into(),
                INDICATOR_CODE.into(),
                "2000".into(),
            ],
            ["Chad", "Peru", "Fiji"]
                .iter()
                .zip([0.0, -3.5, 12.0])
                .map(|(country, v)| {
                    vec![
                        Cell::Text((*country).into()),
                        Cell::Text("Net inflows".into()),
                        Cell::Text("BX.KLT".into()),
                        Cell::Number(v),
                    ]
                })
                .collect(),
        )
        .expect("table");
        let s = extract_series(
            &table,
            "BX.KLT",
            &["2000"],
            &["Chad", "Peru", "Fiji"],
            GapPolicy::Skip,
        );
        assert_eq!(s.get("Peru"), Some(&[Some(-3.5)][..]));
        assert_eq!(
            s.slice_at(0),
            vec![PieSlice {
                label: "Fiji".into(),
                value: 12.0
            }]
        );
    }
}
