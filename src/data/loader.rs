use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::{DataError, LoadContext, Result};
use super::model::{is_year_column, Cell, Table, TransposedTable, REQUIRED_COLUMNS};

/// Preamble lines in a World Bank indicator export before the header row.
pub const DEFAULT_HEADER_LINES: usize = 3;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an indicator table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – World Bank layout: `header_lines` preamble lines, then a
///   header row `Country Name, Country Code, Indicator Name, Indicator Code, 1960, ...`
/// * `.parquet` – same wide shape; Utf8 metadata columns, numeric year columns
///
/// Returns the row table and its transposed view.
pub fn load_file(path: &Path, header_lines: usize) -> Result<(Table, TransposedTable)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => {
            let file =
                File::open(path).load_context(|| format!("opening {}", path.display()))?;
            load_csv(file, header_lines)?
        }
        "parquet" | "pq" => load_parquet(path)?,
        other => {
            return Err(DataError::load(format!(
                "unsupported file extension: .{other}"
            )))
        }
    };

    log::info!(
        "Loaded {} rows × {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    let transposed = table.transpose();
    Ok((table, transposed))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read a World Bank style CSV stream.
///
/// The first `header_lines` lines are skipped; the next line is the header
/// row. Columns with an empty header (the trailing comma of the export) are
/// dropped. Year columns are numeric with empty cells read as missing.
pub fn load_csv<R: Read>(source: R, header_lines: usize) -> Result<Table> {
    let mut reader = BufReader::new(source);
    let mut line = String::new();
    for n in 0..header_lines {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .load_context(|| format!("reading preamble line {}", n + 1))?;
        if read == 0 {
            return Err(DataError::load(format!(
                "expected {header_lines} preamble lines before the header row, found {n}"
            )));
        }
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()
        .load_context(|| "reading CSV header row".to_string())?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    if headers.is_empty() {
        return Err(DataError::load("missing CSV header row"));
    }

    let kept: Vec<usize> = (0..headers.len())
        .filter(|&i| !headers[i].is_empty())
        .collect();
    let columns: Vec<String> = kept.iter().map(|&i| headers[i].clone()).collect();

    let mut rows = Vec::new();
    for (row_no, result) in csv_reader.records().enumerate() {
        let record = result.load_context(|| format!("CSV row {row_no}"))?;
        let row = kept
            .iter()
            .map(|&i| parse_cell(record.get(i).unwrap_or(""), &headers[i], row_no))
            .collect::<Result<Vec<Cell>>>()?;
        rows.push(row);
    }

    finish(columns, rows)
}

fn parse_cell(raw: &str, column: &str, row: usize) -> Result<Cell> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(Cell::Missing);
    }
    if !is_year_column(column) {
        return Ok(Cell::Text(s.to_string()));
    }
    s.parse::<f64>()
        .map(Cell::Number)
        .load_context(|| format!("row {row}, column {column}: '{s}' is not a number"))
}

fn finish(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Table> {
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|c| !columns.iter().any(|h| h == *c))
    {
        return Err(DataError::load(format!("missing required column '{missing}'")));
    }
    Table::new(columns, rows)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the wide indicator table.
///
/// Text columns may be stored as `Utf8`, `LargeUtf8`, `Utf8View` or a
/// dictionary of any of those; numeric columns as 32/64-bit floats or ints.
fn load_parquet(path: &Path) -> Result<Table> {
    let file = File::open(path).load_context(|| format!("opening {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .load_context(|| "reading parquet metadata".to_string())?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder
        .build()
        .load_context(|| "building parquet reader".to_string())?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.load_context(|| "reading parquet record batch".to_string())?;
        let arrays = batch
            .columns()
            .iter()
            .zip(&columns)
            .map(|(col, name)| {
                decode_dictionary(col)
                    .map_err(|e| DataError::load(format!("column {name}: {e}")))
            })
            .collect::<Result<Vec<ArrayRef>>>()?;
        for row in 0..batch.num_rows() {
            let cells = (0..arrays.len())
                .map(|c| {
                    extract_cell(&arrays[c], row)
                        .map_err(|e| DataError::load(format!("row {row}, column {}: {e}", columns[c])))
                })
                .collect::<Result<Vec<Cell>>>()?;
            rows.push(cells);
        }
    }

    finish(columns, rows)
}

/// Dictionary-encoded columns are expanded to their value type.
fn decode_dictionary(col: &ArrayRef) -> std::result::Result<ArrayRef, String> {
    match col.data_type() {
        DataType::Dictionary(_, value) => cast(col, value).map_err(|e| e.to_string()),
        _ => Ok(Arc::clone(col)),
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> std::result::Result<Cell, String> {
    if col.is_null(row) {
        return Ok(Cell::Missing);
    }
    fn downcast<'a, T: 'static>(col: &'a Arc<dyn Array>) -> std::result::Result<&'a T, String> {
        col.as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| format!("unexpected array layout for {:?}", col.data_type()))
    }
    let cell = match col.data_type() {
        DataType::Utf8 => Cell::Text(downcast::<StringArray>(col)?.value(row).to_string()),
        DataType::LargeUtf8 => Cell::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Utf8View => Cell::Text(col.as_string_view().value(row).to_string()),
        DataType::Float64 => Cell::Number(downcast::<Float64Array>(col)?.value(row)),
        DataType::Float32 => Cell::Number(downcast::<Float32Array>(col)?.value(row) as f64),
        DataType::Int64 => Cell::Number(downcast::<Int64Array>(col)?.value(row) as f64),
        DataType::Int32 => Cell::Number(downcast::<Int32Array>(col)?.value(row) as f64),
        other => return Err(format!("unsupported column type {other:?}")),
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{BooleanArray, DictionaryArray, LargeStringArray, StringViewArray};
    use arrow::datatypes::{Field, Int32Type, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    const SAMPLE: &str = "\"Data Source\",\"World Development Indicators\",\n\
\n\
\"Last Updated Date\",\"2023-12-18\",\n\
\"Country Name\",\"Country Code\",\"Indicator Name\",\"Indicator Code\",\"1980\",\"1990\",\n\
\"India\",\"IND\",\"Population, total\",\"SP.POP.TOTL\",\"696828385\",\"870452165\",\n\
\"Canada\",\"CAN\",\"Population, total\",\"SP.POP.TOTL\",\"\",\"27691138\",\n";

    #[test]
    fn skips_preamble_and_drops_unnamed_columns() {
        let table = load_csv(SAMPLE.as_bytes(), DEFAULT_HEADER_LINES).expect("load");
        assert_eq!(
            table.columns(),
            &["Country Name", "Country Code", "Indicator Name", "Indicator Code", "1980", "1990"]
        );
        assert_eq!(table.len(), 2);
        let india = table.row(0).expect("row");
        assert_eq!(india.number("1980"), Some(696828385.0));
        assert_eq!(india.text("Indicator Name"), Some("Population, total"));
        assert!(table.row(1).expect("row").get("1980").expect("cell").is_missing());
    }

    #[test]
    fn short_source_is_a_load_error() {
        let err = load_csv("\"Data Source\"\n\n".as_bytes(), DEFAULT_HEADER_LINES).unwrap_err();
        assert!(matches!(err, DataError::Load { .. }), "{err}");
    }

    #[test]
    fn preamble_only_source_has_no_header_row() {
        let err = load_csv("a\nb\nc\n".as_bytes(), DEFAULT_HEADER_LINES).unwrap_err();
        assert!(err.to_string().contains("header"), "{err}");
    }

    #[test]
    fn non_numeric_year_cell_is_rejected() {
        let src = "Country Name,Indicator Name,Indicator Code,1990\nIndia,Pop,SP.POP.TOTL,lots\n";
        let err = load_csv(src.as_bytes(), 0).unwrap_err();
        assert!(err.to_string().contains("row 0"), "{err}");
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let src = "Country Name,Indicator Code,1990\nIndia,SP.POP.TOTL,1\n";
        let err = load_csv(src.as_bytes(), 0).unwrap_err();
        assert!(err.to_string().contains("Indicator Name"), "{err}");
    }

    #[test]
    fn ragged_data_row_is_a_load_error() {
        let src = "Country Name,Indicator Name,Indicator Code,1990\nIndia,Pop,SP.POP.TOTL\n";
        let err = load_csv(src.as_bytes(), 0).unwrap_err();
        assert!(matches!(err, DataError::Load { .. }), "{err}");
        assert!(err.to_string().contains("CSV row"), "{err}");
    }

    fn write_parquet(path: &Path, fields: Vec<Field>, columns: Vec<ArrayRef>) {
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns).expect("record batch");
        let file = File::create(path).expect("create parquet");
        let mut writer = ArrowWriter::try_new(file, schema, None).expect("parquet writer");
        writer.write(&batch).expect("write batch");
        writer.close().expect("close writer");
    }

    #[test]
    fn reads_parquet_with_every_string_layout_and_nulls() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("climate.parquet");
        let codes: DictionaryArray<Int32Type> =
            vec!["IND", "CAN"].into_iter().collect();
        write_parquet(
            &path,
            vec![
                Field::new("Country Name", DataType::Utf8, false),
                Field::new(
                    "Country Code",
                    DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8)),
                    false,
                ),
                Field::new("Indicator Name", DataType::LargeUtf8, false),
                Field::new("Indicator Code", DataType::Utf8View, false),
                Field::new("1990", DataType::Float64, true),
                Field::new("2000", DataType::Int64, true),
            ],
            vec![
                Arc::new(StringArray::from(vec!["India", "Canada"])),
                Arc::new(codes),
                Arc::new(LargeStringArray::from(vec!["Population, total"; 2])),
                Arc::new(StringViewArray::from(vec!["SP.POP.TOTL"; 2])),
                Arc::new(Float64Array::from(vec![Some(870.0), None])),
                Arc::new(Int64Array::from(vec![Some(1059), Some(31)])),
            ],
        );

        let (table, transposed) = load_file(&path, DEFAULT_HEADER_LINES).expect("load parquet");
        assert_eq!(table.len(), 2);
        assert_eq!(transposed.len(), 6);
        let india = table.row(0).expect("row 0");
        assert_eq!(india.country(), Some("India"));
        assert_eq!(india.text("Country Code"), Some("IND"));
        assert_eq!(india.indicator_name(), Some("Population, total"));
        assert_eq!(india.indicator_code(), Some("SP.POP.TOTL"));
        assert_eq!(india.number("1990"), Some(870.0));
        let canada = table.row(1).expect("row 1");
        assert_eq!(canada.text("Country Code"), Some("CAN"));
        assert!(canada.get("1990").expect("cell").is_missing());
        assert_eq!(canada.number("2000"), Some(31.0));
    }

    #[test]
    fn parquet_with_unsupported_column_type_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("flags.parquet");
        write_parquet(
            &path,
            vec![
                Field::new("Country Name", DataType::Utf8, false),
                Field::new("Indicator Name", DataType::Utf8, false),
                Field::new("Indicator Code", DataType::Utf8, false),
                Field::new("1990", DataType::Boolean, false),
            ],
            vec![
                Arc::new(StringArray::from(vec!["India"])),
                Arc::new(StringArray::from(vec!["Flag"])),
                Arc::new(StringArray::from(vec!["X.FLAG"])),
                Arc::new(BooleanArray::from(vec![true])),
            ],
        );
        let err = load_file(&path, DEFAULT_HEADER_LINES).unwrap_err();
        assert!(matches!(err, DataError::Load { .. }), "{err}");
        assert!(err.to_string().contains("1990"), "{err}");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("climate.xlsx"), DEFAULT_HEADER_LINES).unwrap_err();
        assert!(err.to_string().contains(".xlsx"), "{err}");
    }
}
