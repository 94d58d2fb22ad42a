use super::RawTable;
use crate::error::CsrsError;

/// Read a CSV table. The first record is the header row.
///
/// Rows may be shorter or longer than the header; missing cells read as empty.
pub fn read_csv(bytes: &[u8]) -> Result<RawTable, CsrsError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_ragged_rows() {
        let data = "Case No,Charge,Victim\nCB-1, Theft ,John\nCB-2,Assault\n";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["Case No", "Charge", "Victim"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][1], "Theft");
        assert_eq!(table.rows[1].len(), 2);
    }

    #[test]
    fn test_read_csv_quoted_commas() {
        let data = "CaseID,Charge\n\"CB-9\",\"Theft, of goods\"\n";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(table.rows[0][1], "Theft, of goods");
    }
}
