/// CSV ingestion: turns an uploaded file into claim records.
///
/// The header row is checked for every required column before any data row
/// is read. Cell values are passed through as raw text; whether they are
/// well-formed is the rule evaluator's business, not ours.
use std::collections::HashMap;

use claims_engine::model::{ClaimRecord, DEFAULT_PROVIDER_NAME};
use csv::{ReaderBuilder, StringRecord, Trim};

pub const REQUIRED_COLUMNS: [&str; 9] = [
    "claim_id",
    "patient_id",
    "service_date",
    "cpt_code",
    "icd10_code",
    "provider_npi",
    "network_status",
    "prior_auth_required",
    "prior_auth_provided",
];

const AMOUNT_COLUMN: &str = "amount";
const PROVIDER_NAME_COLUMN: &str = "provider_name";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid amount {value:?} in row {row}")]
    InvalidAmount { row: usize, value: String },
}

/// Column positions resolved from the header row.
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self, IngestError> {
        let mut index = HashMap::new();
        for (i, name) in header.iter().enumerate() {
            // first occurrence wins on duplicate names
            index.entry(name.to_string()).or_insert(i);
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !index.contains_key(**col))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(IngestError::MissingColumns(missing));
        }
        Ok(Self { index })
    }

    /// Cell text, or `None` when the column is absent or the row is short.
    fn cell<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        self.index.get(column).and_then(|&i| record.get(i))
    }

    fn text(&self, record: &StringRecord, column: &str) -> String {
        self.cell(record, column).unwrap_or_default().to_string()
    }
}

/// Parse CSV bytes into claim records, preserving row order.
pub fn parse_claims(data: &[u8]) -> Result<Vec<ClaimRecord>, IngestError> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(data);

    let columns = Columns::from_header(reader.headers()?)?;

    let mut claims = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        claims.push(to_claim(&columns, &record, i + 1)?);
    }
    Ok(claims)
}

fn to_claim(columns: &Columns, record: &StringRecord, row: usize) -> Result<ClaimRecord, IngestError> {
    let amount = match columns.cell(record, AMOUNT_COLUMN).map(str::trim) {
        None | Some("") => 0.0,
        Some(raw) => raw.parse::<f64>().map_err(|_| IngestError::InvalidAmount {
            row,
            value: raw.to_string(),
        })?,
    };
    let provider_name = match columns.cell(record, PROVIDER_NAME_COLUMN) {
        None | Some("") => DEFAULT_PROVIDER_NAME.to_string(),
        Some(name) => name.to_string(),
    };

    Ok(ClaimRecord {
        claim_id: columns.text(record, "claim_id"),
        patient_id: columns.text(record, "patient_id"),
        service_date: columns.text(record, "service_date"),
        cpt_code: columns.text(record, "cpt_code"),
        icd10_code: columns.text(record, "icd10_code"),
        provider_npi: columns.text(record, "provider_npi"),
        network_status: columns.text(record, "network_status"),
        prior_auth_required: columns.text(record, "prior_auth_required"),
        prior_auth_provided: columns.text(record, "prior_auth_provided"),
        amount,
        provider_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "claim_id,patient_id,service_date,cpt_code,icd10_code,provider_npi,network_status,prior_auth_required,prior_auth_provided";

    #[test]
    fn parses_rows_in_order() {
        let csv = format!(
            "{HEADER}\nC1,P1,2024-01-02,99213,E11.9,1234567890,in,No,No\nC2,P2,2024-01-03,0123,Z00,123,out,Yes,No\n"
        );
        let claims = parse_claims(csv.as_bytes()).unwrap();
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0].claim_id, "C1");
        assert_eq!(claims[1].claim_id, "C2");
        assert_eq!(claims[1].cpt_code, "0123", "leading zeros are kept");
        assert_eq!(claims[1].prior_auth_required, "Yes");
        assert_eq!(claims[0].amount, 0.0);
        assert_eq!(claims[0].provider_name, "N/A");
    }

    #[test]
    fn reads_optional_columns() {
        let csv = format!(
            "{HEADER},amount,provider_name\nC1,P1,d,99213,E11.9,1234567890,in,No,No,125.50,Dr. Who\nC2,P2,d,99213,E11.9,1234567890,in,No,No,,\n"
        );
        let claims = parse_claims(csv.as_bytes()).unwrap();
        assert_eq!(claims[0].amount, 125.5);
        assert_eq!(claims[0].provider_name, "Dr. Who");
        assert_eq!(claims[1].amount, 0.0);
        assert_eq!(claims[1].provider_name, "N/A");
    }

    #[test]
    fn columns_can_come_in_any_order() {
        let csv = "network_status,extra,prior_auth_provided,prior_auth_required,provider_npi,icd10_code,cpt_code,service_date,patient_id,claim_id\nout,x,No,Yes,1234567890,E11.9,99213,2024-01-01,P9,C9\n";
        let claims = parse_claims(csv.as_bytes()).unwrap();
        assert_eq!(claims[0].claim_id, "C9");
        assert_eq!(claims[0].patient_id, "P9");
        assert_eq!(claims[0].network_status, "out");
    }

    #[test]
    fn reports_every_missing_column() {
        let csv = "claim_id,patient_id,service_date,cpt_code,icd10_code,network_status,prior_auth_required\n";
        let err = parse_claims(csv.as_bytes()).unwrap_err();
        match &err {
            IngestError::MissingColumns(cols) => {
                assert_eq!(cols, &["provider_npi", "prior_auth_provided"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            err.to_string(),
            "Missing required columns: provider_npi, prior_auth_provided"
        );
    }

    #[test]
    fn empty_file_is_missing_columns() {
        assert!(matches!(
            parse_claims(b""),
            Err(IngestError::MissingColumns(cols)) if cols.len() == REQUIRED_COLUMNS.len()
        ));
    }

    #[test]
    fn header_only_is_an_empty_batch() {
        let claims = parse_claims(format!("{HEADER}\n").as_bytes()).unwrap();
        assert!(claims.is_empty());
    }

    #[test]
    fn short_rows_read_as_empty_cells() {
        let csv = format!("{HEADER}\nC1,P1,2024-01-01,99213\n");
        let claims = parse_claims(csv.as_bytes()).unwrap();
        assert_eq!(claims[0].cpt_code, "99213");
        assert_eq!(claims[0].icd10_code, "");
        assert_eq!(claims[0].prior_auth_provided, "");
    }

    #[test]
    fn cells_are_not_trimmed() {
        let csv = format!("{HEADER}\nC1,P1,d,99213,E11.9,1234567890, out,No,No\n");
        let claims = parse_claims(csv.as_bytes()).unwrap();
        assert_eq!(claims[0].network_status, " out");
    }

    #[test]
    fn strips_byte_order_mark() {
        let csv = format!("\u{feff}{HEADER}\nC1,P1,d,99213,E11.9,1234567890,in,No,No\n");
        let claims = parse_claims(csv.as_bytes()).unwrap();
        assert_eq!(claims[0].claim_id, "C1");
    }

    #[test]
    fn rejects_unparseable_amount() {
        let csv = format!("{HEADER},amount\nC1,P1,d,99213,E11.9,1234567890,in,No,No,12.0\nC2,P2,d,99213,E11.9,1234567890,in,No,No,lots\n");
        match parse_claims(csv.as_bytes()) {
            Err(IngestError::InvalidAmount { row, value }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
