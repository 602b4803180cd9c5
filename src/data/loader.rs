//! Delimited-text loader producing a validated [`Dataset`].
//!
//! Expected layout (one row per isolate):
//! - metadata columns `SNO`, `SAMPLE_TYPE`, `GENDER`, `ESBL`, `MDR`, `MAR_INDEX`
//! - every other column is an antibiotic holding S, I, R, SDD or blank
//!
//! Header names are standardized before matching, so `Sample Type` and
//! `sample/type` both resolve to `SAMPLE_TYPE`.

use super::dataset::Dataset;
use super::isolate::{parse_yes_no, Call, Gender, Isolate};
use crate::error::{AmrError, Result};
use csv::{ReaderBuilder, StringRecord};
use regex::Regex;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Metadata columns every input file must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = ["SNO", "SAMPLE_TYPE", "GENDER", "ESBL", "MDR", "MAR_INDEX"];

/// Options controlling how an input table is read.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field delimiter. When `None`, inferred from the file extension.
    pub delimiter: Option<u8>,
    /// Reject ESBL/MDR values other than YES/NO. When false, anything that is
    /// not YES reads as NO.
    pub strict_flags: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            strict_flags: true,
        }
    }
}

impl LoadOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn lenient_flags(mut self) -> Self {
        self.strict_flags = false;
        self
    }
}

/// Standardize a header cell: trim, upper-case, spaces and slashes to `_`.
pub fn standardize_header(raw: &str) -> String {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let re = SEPARATORS.get_or_init(|| Regex::new(r"[ /]").unwrap());
    re.replace_all(&raw.trim().to_uppercase(), "_").into_owned()
}

struct Columns {
    sno: usize,
    sample_type: usize,
    gender: usize,
    esbl: usize,
    mdr: usize,
    mar_index: usize,
    /// (column index, antibiotic name) in header order.
    antibiotics: Vec<(usize, String)>,
    /// Columns with a blank header; their cells must be blank too.
    unnamed: Vec<usize>,
    width: usize,
}

impl Columns {
    fn resolve(header: &[String]) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in header.iter().filter(|h| !h.is_empty()) {
            if !seen.insert(name.as_str()) {
                return Err(AmrError::DuplicateColumn(name.clone()));
            }
        }

        let find = |name: &str| header.iter().position(|h| h == name);

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| find(*c).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(AmrError::MissingColumn(missing.join(", ")));
        }

        let antibiotics = header
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_empty() && !REQUIRED_COLUMNS.contains(&h.as_str()))
            .map(|(i, h)| (i, h.clone()))
            .collect();
        let unnamed = header
            .iter()
            .enumerate()
            .filter(|(_, h)| h.is_empty())
            .map(|(i, _)| i)
            .collect();

        // All required columns were found above.
        let idx = |name: &str| find(name).unwrap_or_default();
        Ok(Self {
            sno: idx("SNO"),
            sample_type: idx("SAMPLE_TYPE"),
            gender: idx("GENDER"),
            esbl: idx("ESBL"),
            mdr: idx("MDR"),
            mar_index: idx("MAR_INDEX"),
            antibiotics,
            unnamed,
            width: header.len(),
        })
    }
}

impl Dataset {
    /// Load a dataset from a CSV or TSV file.
    ///
    /// `.tsv` and `.txt` files are read tab-delimited, everything else
    /// comma-delimited, unless `options.delimiter` is set.
    pub fn from_csv<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let delimiter = options.delimiter.unwrap_or_else(|| {
            match path.extension().and_then(|e| e.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("txt") => b'\t',
                _ => b',',
            }
        });
        let file = File::open(path)?;
        let options = LoadOptions {
            delimiter: Some(delimiter),
            ..options.clone()
        };
        Self::from_reader(file, &options)
    }

    /// Load a dataset from any reader. Defaults to comma-delimited.
    ///
    /// The whole load fails on the first row that violates the data model,
    /// including rows whose field count differs from the header's. Columns
    /// with a blank header (a trailing delimiter) are skipped as long as
    /// every cell under them is blank.
    pub fn from_reader<R: Read>(reader: R, options: &LoadOptions) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(options.delimiter.unwrap_or(b','))
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header: Vec<String> = rdr.headers()?.iter().map(standardize_header).collect();
        if header.iter().all(|h| h.is_empty()) {
            return Err(AmrError::EmptyData("Input has no header row".to_string()));
        }
        let columns = Columns::resolve(&header)?;

        let mut isolates = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            isolates.push(parse_row(&record, i + 1, &columns, options)?);
        }

        let antibiotics = columns.antibiotics.into_iter().map(|(_, name)| name).collect();
        let dataset = Self::with_antibiotics(antibiotics, isolates)?;
        debug!(
            isolates = dataset.n_isolates(),
            antibiotics = dataset.n_antibiotics(),
            "loaded dataset"
        );
        Ok(dataset)
    }
}

fn parse_row(record: &StringRecord, row: usize, columns: &Columns, options: &LoadOptions) -> Result<Isolate> {
    let field = |idx: usize| record.get(idx).unwrap_or("");
    let id = field(columns.sno).trim().to_string();

    if record.len() != columns.width {
        return Err(AmrError::RowLength {
            row,
            id,
            expected: columns.width,
            found: record.len(),
        });
    }
    if let Some(&column) = columns.unnamed.iter().find(|&&c| !field(c).trim().is_empty()) {
        return Err(AmrError::BlankHeader {
            column: column + 1,
            row,
            value: field(column).to_string(),
        });
    }

    let flag = |name: &str, idx: usize| -> Result<bool> {
        let raw = field(idx);
        match parse_yes_no(raw) {
            Some(v) => Ok(v),
            None if !options.strict_flags => Ok(false),
            None => Err(AmrError::InvalidFlag {
                row,
                id: id.clone(),
                field: name.to_string(),
                value: raw.to_string(),
            }),
        }
    };
    let esbl = flag("ESBL", columns.esbl)?;
    let mdr = flag("MDR", columns.mdr)?;

    let raw_mar = field(columns.mar_index);
    let mar_index = raw_mar
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && (0.0..=1.0).contains(v))
        .ok_or_else(|| AmrError::InvalidMarIndex {
            row,
            id: id.clone(),
            value: raw_mar.to_string(),
        })?;

    let mut isolate = Isolate::new(
        id.clone(),
        field(columns.sample_type).trim(),
        Gender::parse(field(columns.gender)),
        esbl,
        mdr,
        mar_index,
    );

    for (idx, antibiotic) in &columns.antibiotics {
        let raw = field(*idx);
        if raw.trim().is_empty() {
            continue;
        }
        let call = Call::from_code(raw).ok_or_else(|| AmrError::InvalidCall {
            row,
            id: id.clone(),
            antibiotic: antibiotic.clone(),
            value: raw.to_string(),
        })?;
        isolate = isolate.with_result(antibiotic.clone(), call);
    }

    Ok(isolate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
SNO,Sample Type,Gender,ESBL,MDR,MAR Index,AMP,CIP,Amoxicillin/Clavulanate
1,Urine,F,YES,YES,0.67,R,R,
2,BLOOD,M,no,No,0.0,S,sdd,S
3,urine,F,NO,YES,0.2,R,S,R
";

    fn load(text: &str) -> Result<Dataset> {
        Dataset::from_reader(text.as_bytes(), &LoadOptions::default())
    }

    #[test]
    fn test_standardize_header() {
        assert_eq!(standardize_header(" Sample Type "), "SAMPLE_TYPE");
        assert_eq!(standardize_header("amoxicillin/clavulanate"), "AMOXICILLIN_CLAVULANATE");
        assert_eq!(standardize_header("MAR  INDEX"), "MAR__INDEX");
    }

    #[test]
    fn test_load_csv() {
        let ds = load(SAMPLE).unwrap();

        assert_eq!(ds.n_isolates(), 3);
        assert_eq!(ds.antibiotics(), &["AMP", "CIP", "AMOXICILLIN_CLAVULANATE"]);

        let first = &ds.isolates()[0];
        assert_eq!(first.id, "1");
        assert_eq!(first.sample_type, "Urine");
        assert!(first.esbl && first.mdr);
        assert_eq!(ds.call(0, 2), None);

        // SDD folds to I
        assert_eq!(ds.call(1, 1), Some(Call::I));
        assert_eq!(ds.isolates()[1].gender, Gender::Male);
    }

    #[test]
    fn test_missing_required_column() {
        let err = load("SNO,GENDER,ESBL,MDR\n1,F,YES,NO\n").unwrap_err();
        match err {
            AmrError::MissingColumn(cols) => assert_eq!(cols, "SAMPLE_TYPE, MAR_INDEX"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_call_reports_location() {
        let text = "SNO,SAMPLE_TYPE,GENDER,ESBL,MDR,MAR_INDEX,AMP\n1,Urine,F,NO,NO,0.1,S\n2,Urine,F,NO,NO,0.1,X\n";
        let err = load(text).unwrap_err();
        match err {
            AmrError::InvalidCall { row, id, antibiotic, value } => {
                assert_eq!(row, 2);
                assert_eq!(id, "2");
                assert_eq!(antibiotic, "AMP");
                assert_eq!(value, "X");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_flag_strictness() {
        let text = "SNO,SAMPLE_TYPE,GENDER,ESBL,MDR,MAR_INDEX\n1,Urine,F,maybe,NO,0.1\n";
        let err = load(text).unwrap_err();
        assert!(matches!(err, AmrError::InvalidFlag { ref field, .. } if field == "ESBL"));
        assert!(err.is_validation());

        let ds = Dataset::from_reader(text.as_bytes(), &LoadOptions::default().lenient_flags()).unwrap();
        assert!(!ds.isolates()[0].esbl);
    }

    #[test]
    fn test_mar_index_validation() {
        let text = "SNO,SAMPLE_TYPE,GENDER,ESBL,MDR,MAR_INDEX\n1,Urine,F,NO,NO,1.5\n";
        assert!(matches!(load(text).unwrap_err(), AmrError::InvalidMarIndex { .. }));

        let text = "SNO,SAMPLE_TYPE,GENDER,ESBL,MDR,MAR_INDEX\n1,Urine,F,NO,NO,\n";
        assert!(matches!(load(text).unwrap_err(), AmrError::InvalidMarIndex { .. }));
    }

    #[test]
    fn test_unknown_gender_retained() {
        let text = "SNO,SAMPLE_TYPE,GENDER,ESBL,MDR,MAR_INDEX\n1,Urine,unknown,NO,NO,0.1\n";
        let ds = load(text).unwrap();
        assert_eq!(ds.isolates()[0].gender.as_str(), "unknown");
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(load("").unwrap_err(), AmrError::EmptyData(_)));
    }

    #[test]
    fn test_duplicate_standardized_header() {
        let text = "SNO,SAMPLE_TYPE,GENDER,ESBL,MDR,MAR_INDEX,AMP,Amp\n1,Urine,F,NO,NO,0.1,R,S\n";
        let err = load(text).unwrap_err();
        assert!(err.is_validation());
        match err {
            AmrError::DuplicateColumn(name) => assert_eq!(name, "AMP"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_trailing_delimiter_column_skipped() {
        let text = "SNO,SAMPLE_TYPE,GENDER,ESBL,MDR,MAR_INDEX,AMP,\n1,Urine,F,NO,NO,0.1,R,\n";
        let ds = load(text).unwrap();
        assert_eq!(ds.antibiotics(), &["AMP"]);
        assert_eq!(crate::profile::profile_co_resistance(&ds).dim(), 1);
    }

    #[test]
    fn test_value_under_blank_header_rejected() {
        let text = "SNO,SAMPLE_TYPE,GENDER,ESBL,MDR,MAR_INDEX,AMP,\n1,Urine,F,NO,NO,0.1,R,\n2,Urine,F,NO,NO,0.1,S,R\n";
        match load(text).unwrap_err() {
            AmrError::BlankHeader { column, row, value } => {
                assert_eq!(column, 8);
                assert_eq!(row, 2);
                assert_eq!(value, "R");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_row_length_mismatch_rejected() {
        let long = "SNO,SAMPLE_TYPE,GENDER,ESBL,MDR,MAR_INDEX,AMP\n1,Urine,F,NO,NO,0.1,R,X,Y\n";
        match load(long).unwrap_err() {
            AmrError::RowLength { row, id, expected, found } => {
                assert_eq!(row, 1);
                assert_eq!(id, "1");
                assert_eq!(expected, 7);
                assert_eq!(found, 9);
            }
            other => panic!("unexpected error: {other}"),
        }

        let short = "SNO,SAMPLE_TYPE,GENDER,ESBL,MDR,MAR_INDEX,AMP,CIP\n1,Urine,F,NO,NO,0.1,R\n";
        let err = load(short).unwrap_err();
        assert!(matches!(err, AmrError::RowLength { found: 7, .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn test_from_tsv_file() {
        let mut file = NamedTempFile::with_suffix(".tsv").unwrap();
        writeln!(file, "SNO\tSAMPLE_TYPE\tGENDER\tESBL\tMDR\tMAR_INDEX\tAMP\tCIP").unwrap();
        writeln!(file, "1\tPus\tM\tYES\tNO\t0.5\tR\t").unwrap();
        writeln!(file, "2\tPus\tF\tNO\tNO\t0.0\tS\tS").unwrap();
        file.flush().unwrap();

        let ds = Dataset::from_csv(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(ds.n_isolates(), 2);
        assert_eq!(ds.call(0, 1), None);
        assert_eq!(ds.call(1, 1), Some(Call::S));
    }
}
