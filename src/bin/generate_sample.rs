use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Builder, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const FIRST_YEAR: u32 = 1960;
const LAST_YEAR: u32 = 2022;

/// (country, ISO code, size factor)
const COUNTRIES: [(&str, &str, f64); 9] = [
    ("United Kingdom", "GBR", 0.9),
    ("United States", "USA", 4.5),
    ("India", "IND", 13.0),
    ("Australia", "AUS", 0.35),
    ("Canada", "CAN", 0.5),
    ("Singapore", "SGP", 0.06),
    ("Germany", "DEU", 1.1),
    ("Brazil", "BRA", 2.8),
    ("Kenya", "KEN", 0.7),
];

/// (code, name, base value, yearly drift, noise, first year with data)
const INDICATORS: [(&str, &str, f64, f64, f64, u32); 10] = [
    ("SP.POP.TOTL", "Population, total", 6.0e7, 0.012, 0.002, 1960),
    ("AG.LND.ARBL.ZS", "Arable land (% of land area)", 22.0, -0.002, 0.02, 1961),
    ("AG.LND.AGRI.ZS", "Agricultural land (% of land area)", 45.0, -0.001, 0.01, 1961),
    ("AG.LND.AGRI.K2", "Agricultural land (sq. km)", 5.0e5, -0.001, 0.01, 1961),
    ("AG.LND.FRST.ZS", "Forest area (% of land area)", 30.0, -0.002, 0.01, 1990),
    ("AG.LND.IRIG.AG.ZS", "Agricultural irrigated land (% of total agricultural land)", 8.0, 0.01, 0.05, 2001),
    ("AG.LND.PRCP.MM", "Average precipitation in depth (mm per year)", 900.0, 0.0, 0.0, 1961),
    ("AG.YLD.CREL.KG", "Cereal yield (kg per hectare)", 2500.0, 0.015, 0.06, 1961),
    ("EG.ELC.ACCS.ZS", "Access to electricity (% of population)", 70.0, 0.01, 0.01, 1990),
    ("BX.KLT.DINV.WD.GD.ZS", "Foreign direct investment, net inflows (% of GDP)", 2.0, 0.02, 0.4, 1970),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Row {
    country: &'static str,
    country_code: &'static str,
    indicator_name: &'static str,
    indicator_code: &'static str,
    values: Vec<Option<f64>>,
}

fn generate_rows(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();
    for &(country, country_code, size) in &COUNTRIES {
        // Per-country offset so correlations are not trivially perfect.
        let tilt = rng.gauss(1.0, 0.25).max(0.2);
        for &(code, name, base, drift, noise, first) in &INDICATORS {
            let scale = if code.ends_with(".ZS") || code.ends_with(".MM") || code.ends_with(".KG") {
                tilt
            } else {
                size * tilt
            };
            let values = (FIRST_YEAR..=LAST_YEAR)
                .map(|year| {
                    if year < first {
                        return None;
                    }
                    let t = (year - FIRST_YEAR) as f64;
                    let trend = base * scale * (1.0 + drift).powf(t);
                    let v = trend * (1.0 + rng.gauss(0.0, noise));
                    Some(if code.ends_with(".ZS") { v.clamp(0.0, 100.0) } else { v.max(0.0) })
                })
                .collect();
            rows.push(Row {
                country,
                country_code,
                indicator_name: name,
                indicator_code: code,
                values,
            });
        }
    }
    rows
}

fn year_headers() -> Vec<String> {
    (FIRST_YEAR..=LAST_YEAR).map(|y| y.to_string()).collect()
}

/// World Bank export layout: three preamble lines, header, trailing commas.
fn write_csv(path: &str, rows: &[Row]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path).context("creating CSV")?);
    writeln!(out, "\"Data Source\",\"World Development Indicators\",")?;
    writeln!(out)?;
    writeln!(out, "\"Last Updated Date\",\"2023-12-18\",")?;
    out.flush()?;

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(out);
    let mut header = vec![
        "Country Name".to_string(),
        "Country Code".to_string(),
        "Indicator Name".to_string(),
        "Indicator Code".to_string(),
    ];
    header.extend(year_headers());
    header.push(String::new());
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.country.to_string(),
            row.country_code.to_string(),
            row.indicator_name.to_string(),
            row.indicator_code.to_string(),
        ];
        record.extend(row.values.iter().map(|v| v.map(|v| v.to_string()).unwrap_or_default()));
        record.push(String::new());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[Row]) -> Result<()> {
    let mut fields = vec![
        Field::new("Country Name", DataType::Utf8, false),
        Field::new("Country Code", DataType::Utf8, false),
        Field::new("Indicator Name", DataType::Utf8, false),
        Field::new("Indicator Code", DataType::Utf8, false),
    ];
    fields.extend(year_headers().into_iter().map(|y| Field::new(y, DataType::Float64, true)));
    let schema = Arc::new(Schema::new(fields));

    let text = |f: fn(&Row) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let mut columns: Vec<ArrayRef> = vec![
        text(|r| r.country),
        text(|r| r.country_code),
        text(|r| r.indicator_name),
        text(|r| r.indicator_code),
    ];
    for year_idx in 0..year_headers().len() {
        let mut builder = Float64Builder::with_capacity(rows.len());
        for row in rows {
            builder.append_option(row.values[year_idx]);
        }
        columns.push(Arc::new(builder.finish()));
    }

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);

    write_csv("climate.csv", &rows)?;
    println!("Wrote climate.csv ({} rows)", rows.len());

    write_parquet("climate.parquet", &rows)?;
    println!("Wrote climate.parquet ({} rows)", rows.len());
    Ok(())
}
