//! Bulk participant import from CSV.
//!
//! Expects a header row with a `display_name` (or `name`) column; other columns are ignored.

use crate::models::TournamentError;
use serde::Deserialize;
use std::io::Read;

#[derive(Deserialize)]
struct ParticipantRow {
    #[serde(alias = "name")]
    display_name: String,
}

/// Read participant names from CSV, trimmed, in file order.
pub fn read_participant_names<R: Read>(reader: R) -> Result<Vec<String>, TournamentError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut names = Vec::new();
    for (i, row) in rdr.deserialize::<ParticipantRow>().enumerate() {
        let row = row.map_err(|e| TournamentError::Import(format!("row {}: {}", i + 1, e)))?;
        names.push(row.display_name);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_display_name_column() {
        let data = "display_name,email\n Alice ,a@example.com\nBob,b@example.com\n";
        let names = read_participant_names(data.as_bytes()).unwrap();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[test]
    fn accepts_name_header() {
        let names = read_participant_names("name\nCarol\nDave\n".as_bytes()).unwrap();
        assert_eq!(names, vec!["Carol", "Dave"]);
    }

    #[test]
    fn missing_column_is_an_import_error() {
        let err = read_participant_names("email\nx@example.com\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TournamentError::Import(_)));
    }
}
