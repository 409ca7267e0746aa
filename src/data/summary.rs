use std::fmt;

use super::error::{DataError, Result};
use super::model::Table;

/// Rows and years shown in the summary table.
pub const SUMMARY_SIZE: usize = 5;

// ---------------------------------------------------------------------------
// SummaryTable – fixed 5 × 5 country/year lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    /// Row labels, one per summarised row.
    pub labels: Vec<String>,
    /// `(year, values across the rows)` in year order.
    pub columns: Vec<(String, Vec<Option<f64>>)>,
}

impl SummaryTable {
    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(year, _)| year.as_str())
    }

    pub fn get(&self, year: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(y, _)| y == year)
            .map(|(_, values)| values.as_slice())
    }
}

/// Build the summary from the first five rows and the first five years.
///
/// Rows are labelled with `labels` when given, otherwise with each row's
/// own `Country Name`.
pub fn build_summary<S: AsRef<str>>(
    filtered: &Table,
    years: &[S],
    labels: Option<&[String]>,
) -> Result<SummaryTable> {
    if filtered.len() < SUMMARY_SIZE {
        return Err(DataError::InsufficientRows {
            required: SUMMARY_SIZE,
            available: filtered.len(),
        });
    }
    if years.len() < SUMMARY_SIZE {
        return Err(DataError::InsufficientData {
            required: SUMMARY_SIZE,
            available: years.len(),
        });
    }

    let rows: Vec<_> = filtered.rows().take(SUMMARY_SIZE).collect();
    let labels = match labels {
        Some(fixed) if fixed.len() >= SUMMARY_SIZE => fixed[..SUMMARY_SIZE].to_vec(),
        Some(fixed) => {
            return Err(DataError::Config(format!(
                "summary needs {SUMMARY_SIZE} row labels, got {}",
                fixed.len()
            )))
        }
        None => rows
            .iter()
            .map(|row| row.country().unwrap_or_default().to_string())
            .collect(),
    };

    let columns = years
        .iter()
        .take(SUMMARY_SIZE)
        .map(|year| {
            let year = year.as_ref();
            let values = rows.iter().map(|row| row.number(year)).collect();
            (year.to_string(), values)
        })
        .collect();

    Ok(SummaryTable { labels, columns })
}

fn fmt_value(v: Option<f64>) -> String {
    v.map_or_else(|| "NaN".to_string(), |v| format!("{v:.2}"))
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.labels.iter().map(String::len).max().unwrap_or(0);
        write!(f, "{:width$}", "")?;
        for year in self.years() {
            write!(f, " {year:>16}")?;
        }
        writeln!(f)?;
        for (i, label) in self.labels.iter().enumerate() {
            write!(f, "{label:width$}")?;
            for (_, values) in &self.columns {
                write!(f, " {:>16}", fmt_value(values.get(i).copied().flatten()))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Describe – per-year descriptive statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStats {
    fn from_values(column: &str, mut values: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);
        let count = values.len();
        let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
        let std = mean.filter(|_| count > 1).map(|m| {
            let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });
        ColumnStats {
            column: column.to_string(),
            count,
            mean,
            std,
            min: values.first().copied(),
            q25: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q75: quantile(&values, 0.75),
            max: values.last().copied(),
        }
    }
}

/// Linear-interpolated quantile of sorted values.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Reads one statistic from a column.
pub type StatGetter = fn(&ColumnStats) -> Option<f64>;

/// Statistic rows in `describe()` display order.
pub const STAT_ROWS: [(&str, StatGetter); 8] = [
    ("count", |c| Some(c.count as f64)),
    ("mean", |c| c.mean),
    ("std", |c| c.std),
    ("min", |c| c.min),
    ("25%", |c| c.q25),
    ("50%", |c| c.median),
    ("75%", |c| c.q75),
    ("max", |c| c.max),
];

/// Statistics for every year column of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Description {
    pub columns: Vec<ColumnStats>,
}

/// Describe the year columns of `table`. Empty tables give zero counts.
pub fn describe(table: &Table) -> Description {
    let columns = table
        .year_columns()
        .map(|year| {
            let values = table.rows().filter_map(|row| row.number(year)).collect();
            ColumnStats::from_values(year, values)
        })
        .collect();
    Description { columns }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:6}", "")?;
        for c in &self.columns {
            write!(f, " {:>16}", c.column)?;
        }
        writeln!(f)?;
        for (name, get) in STAT_ROWS {
            write!(f, "{name:6}")?;
            for c in &self.columns {
                write!(f, " {:>16}", fmt_value(get(c)))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Cell, COUNTRY_NAME, INDICATOR_CODE};

    const YEARS: [&str; 6] = ["1980", "1990", "2000", "2010", "2015", "2020"];

    fn table(n: usize) -> Table {
        let mut columns = vec![COUNTRY_NAME.to_string(), INDICATOR_CODE.to_string()];
        columns.extend(YEARS.iter().map(|y| y.to_string()));
        let rows = (0..n)
            .map(|i| {
                let mut row = vec![
                    Cell::Text(format!("Country {i}")),
                    Cell::Text("SP.POP.TOTL".into()),
                ];
                row.extend((0..YEARS.len()).map(|y| Cell::Number((i * 10 + y) as f64)));
                row
            })
            .collect();
        Table::new(columns, rows).expect("table")
    }

    #[test]
    fn five_rows_give_five_by_five() {
        let s = build_summary(&table(5), &YEARS, None).expect("summary");
        assert_eq!(s.years().count(), 5);
        assert!(s.columns.iter().all(|(_, v)| v.len() == 5));
        assert_eq!(s.labels[4], "Country 4");
        // Year 1990 maps to that year's value across the rows.
        assert_eq!(
            s.get("1990"),
            Some(&[Some(1.0), Some(11.0), Some(21.0), Some(31.0), Some(41.0)][..])
        );
        assert!(s.get("2020").is_none());
    }

    #[test]
    fn four_rows_are_insufficient() {
        let err = build_summary(&table(4), &YEARS, None).unwrap_err();
        assert!(matches!(
            err,
            DataError::InsufficientRows {
                required: 5,
                available: 4
            }
        ));
    }

    #[test]
    fn fixed_labels_replace_country_names() {
        let labels: Vec<String> = ["UK", "US", "IN", "AU", "CA", "SG"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let s = build_summary(&table(7), &YEARS, Some(labels.as_slice())).expect("summary");
        assert_eq!(s.labels, labels[..5]);
        assert!(s.to_string().contains("US"));

        let err = build_summary(&table(7), &YEARS, Some(&labels[..2])).unwrap_err();
        assert!(matches!(err, DataError::Config(_)));
    }

    #[test]
    fn describe_matches_sample_statistics() {
        let d = describe(&table(4));
        assert_eq!(d.columns.len(), 6);
        let first = &d.columns[0];
        // 0, 10, 20, 30
        assert_eq!(first.count, 4);
        assert_eq!(first.mean, Some(15.0));
        assert!((first.std.expect("std") - 12.909944487358056).abs() < 1e-9);
        assert_eq!(first.q25, Some(7.5));
        assert_eq!(first.median, Some(15.0));
        assert_eq!(first.max, Some(30.0));
    }

    #[test]
    fn describe_empty_table_does_not_fail() {
        let d = describe(&table(0));
        assert!(d.columns.iter().all(|c| c.count == 0 && c.mean.is_none()));
        assert!(d.to_string().contains("NaN"));
    }
}
