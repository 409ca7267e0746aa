use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::error::{DataError, Result};
use super::model::Table;

/// How the attribute label of a long-form record is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeLabeling {
    /// Indicator Name of the matched row.
    #[default]
    MatchedRow,
    /// Indicator Name of the table row at the position of the matched code
    /// in the indicator list. Labels drift when the list and table orders differ.
    IndicatorPosition,
}

/// One (country, attribute, value) triple.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub country: String,
    pub attribute: String,
    pub value: Option<f64>,
}

// ---------------------------------------------------------------------------
// Long form
// ---------------------------------------------------------------------------

/// Collect the `reference_year` value of every row that belongs to one of
/// `countries` and carries one of `indicator_codes`, in table order.
///
/// Both lists are walked as given: a row matching a code listed twice (or
/// a country listed twice) yields one record per listed occurrence, and
/// those duplicates are summed by [`pivot`].
pub fn long_form<S: AsRef<str>, C: AsRef<str>>(
    table: &Table,
    countries: &[C],
    indicator_codes: &[S],
    reference_year: &str,
    labeling: AttributeLabeling,
) -> Result<Vec<LongRecord>> {
    let mut records = Vec::new();

    for row in table.rows() {
        let (Some(country), Some(code)) = (row.country(), row.indicator_code()) else {
            continue;
        };
        let country_hits = countries.iter().filter(|c| (*c).as_ref() == country).count();
        if country_hits == 0 {
            continue;
        }
        let positions = indicator_codes
            .iter()
            .enumerate()
            .filter(|(_, c)| (*c).as_ref() == code)
            .map(|(position, _)| position);
        for position in positions {
            let attribute = match labeling {
                AttributeLabeling::MatchedRow => row.indicator_name().unwrap_or(code),
                AttributeLabeling::IndicatorPosition => table
                    .row(position)
                    .ok_or(DataError::InsufficientRows {
                        required: position + 1,
                        available: table.len(),
                    })?
                    .indicator_name()
                    .unwrap_or(code),
            };
            for _ in 0..country_hits {
                records.push(LongRecord {
                    country: country.to_string(),
                    attribute: attribute.to_string(),
                    value: row.number(reference_year),
                });
            }
        }
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Pivot
// ---------------------------------------------------------------------------

/// Country × attribute matrix, rows and columns sorted by name.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub countries: Vec<String>,
    pub attributes: Vec<String>,
    /// `cells[country][attribute]`
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
    /// Values of one attribute column, one per country.
    pub fn column(&self, attribute: usize) -> Vec<Option<f64>> {
        self.cells.iter().map(|row| row[attribute]).collect()
    }
}

/// Pivot long-form records, summing duplicate (country, attribute) pairs.
/// A cell with no populated value stays missing.
pub fn pivot(records: &[LongRecord]) -> PivotTable {
    let mut sums: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    let mut countries = BTreeSet::new();
    let mut attributes = BTreeSet::new();

    for rec in records {
        countries.insert(rec.country.as_str());
        attributes.insert(rec.attribute.as_str());
        if let Some(v) = rec.value {
            *sums
                .entry((rec.country.as_str(), rec.attribute.as_str()))
                .or_insert(0.0) += v;
        }
    }

    let cells = countries
        .iter()
        .map(|c| {
            attributes
                .iter()
                .map(|a| sums.get(&(*c, *a)).copied())
                .collect()
        })
        .collect();

    PivotTable {
        countries: countries.into_iter().map(String::from).collect(),
        attributes: attributes.into_iter().map(String::from).collect(),
        cells,
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Symmetric attribute × attribute Pearson correlation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// `values[i][j]`, NaN where the correlation is undefined.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied()
    }
}

/// Pairwise Pearson correlation between pivot columns.
///
/// Each pair uses the countries where both values are present. Fewer than
/// two such countries, or a constant column, gives NaN.
pub fn correlate(pivot: &PivotTable) -> Result<CorrelationMatrix> {
    let columns: Vec<Vec<Option<f64>>> = (0..pivot.attributes.len())
        .map(|a| pivot.column(a))
        .collect();
    let populated = columns
        .iter()
        .filter(|col| col.iter().any(Option::is_some))
        .count();
    if populated < 2 {
        return Err(DataError::InsufficientData {
            required: 2,
            available: populated,
        });
    }

    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    Ok(CorrelationMatrix {
        labels: pivot.attributes.clone(),
        values,
    })
}

fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Long form → pivot → correlation in one step.
pub fn build_correlation<S: AsRef<str>, C: AsRef<str>>(
    table: &Table,
    countries: &[C],
    indicator_codes: &[S],
    reference_year: &str,
    labeling: AttributeLabeling,
) -> Result<CorrelationMatrix> {
    let records = long_form(table, countries, indicator_codes, reference_year, labeling)?;
    let pivoted = pivot(&records);
    log::debug!(
        "Pivoted {} records into {} countries × {} attributes",
        records.len(),
        pivoted.countries.len(),
        pivoted.attributes.len()
    );
    correlate(&pivoted)
}
