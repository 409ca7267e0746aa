use std::collections::HashSet;

use super::model::{is_year_column, Table};

// ---------------------------------------------------------------------------
// Row filters
// ---------------------------------------------------------------------------

/// Keep only rows whose `Indicator Code` equals `indicator_code`.
///
/// Row order is preserved. Zero matches yields an empty table with the
/// same columns, not an error.
pub fn filter_by_indicator(table: &Table, indicator_code: &str) -> Table {
    let filtered = table.retain_rows(|row| row.indicator_code() == Some(indicator_code));
    if filtered.is_empty() {
        log::warn!("No rows for indicator {indicator_code}");
    }
    filtered
}

/// Keep only rows whose `Country Name` is one of `countries`.
pub fn filter_by_countries<S: AsRef<str>>(table: &Table, countries: &[S]) -> Table {
    let wanted: HashSet<&str> = countries.iter().map(AsRef::as_ref).collect();
    table.retain_rows(|row| row.country().is_some_and(|c| wanted.contains(c)))
}

// ---------------------------------------------------------------------------
// Column projection
// ---------------------------------------------------------------------------

/// Drop every year column not listed in `keep_years`.
///
/// Metadata columns are always kept and columns stay in table order, so
/// projecting twice with the same years is the same as projecting once.
pub fn project_years<S: AsRef<str>>(table: &Table, keep_years: &[S]) -> Table {
    let keep: HashSet<&str> = keep_years.iter().map(AsRef::as_ref).collect();
    let positions: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| !is_year_column(name) || keep.contains(name.as_str()))
        .map(|(i, _)| i)
        .collect();
    table.select_columns(&positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Cell, COUNTRY_NAME, INDICATOR_CODE, INDICATOR_NAME};

    fn row(country: &str, code: &str, a: f64, b: f64) -> Vec<Cell> {
        vec![
            Cell::Text(country.into()),
            Cell::Text(format!("{code} name")),
            Cell::Text(code.into()),
            Cell::Number(a),
            Cell::Number(b),
        ]
    }

    fn table() -> Table {
        Table::new(
            vec![
                COUNTRY_NAME.into(),
                INDICATOR_NAME.into(),
                INDICATOR_CODE.into(),
                "1980".into(),
                "1990".into(),
            ],
            vec![
                row("India", "SP.POP.TOTL", 1.0, 2.0),
                row("India", "AG.LND.AGRI.ZS", 3.0, 4.0),
                row("Canada", "SP.POP.TOTL", 5.0, 6.0),
            ],
        )
        .expect("table")
    }

    #[test]
    fn indicator_filter_keeps_matching_rows_in_order() {
        let out = filter_by_indicator(&table(), "SP.POP.TOTL");
        assert_eq!(out.len(), 2);
        assert!(out.rows().all(|r| r.indicator_code() == Some("SP.POP.TOTL")));
        let countries: Vec<_> = out.rows().filter_map(|r| r.country()).collect();
        assert_eq!(countries, vec!["India", "Canada"]);
    }

    #[test]
    fn indicator_filter_with_no_match_is_empty() {
        let out = filter_by_indicator(&table(), "NOPE");
        assert!(out.is_empty());
        assert_eq!(out.columns(), table().columns());
    }

    #[test]
    fn country_filter() {
        let out = filter_by_countries(&table(), &["Canada"]);
        assert_eq!(out.len(), 1);
        assert_eq!(out.row(0).and_then(|r| r.country()), Some("Canada"));
    }

    #[test]
    fn projection_keeps_metadata_and_is_idempotent() {
        let once = project_years(&table(), &["1990"]);
        assert_eq!(
            once.columns(),
            &[COUNTRY_NAME, INDICATOR_NAME, INDICATOR_CODE, "1990"]
        );
        assert_eq!(once.row(2).and_then(|r| r.number("1990")), Some(6.0));
        assert_eq!(project_years(&once, &["1990"]), once);
    }
}
