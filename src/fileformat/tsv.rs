use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::debug;

use crate::runtime::{require_input, Error};

///////////////////////////////
/// Open a tab-separated table with a header row. Rows may have differing numbers of fields
pub fn open_tsv<P: AsRef<Path>>(path: P) -> anyhow::Result<csv::Reader<Box<dyn Read>>> {
    let path = path.as_ref();
    require_input(path)?;

    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader: Box<dyn Read> = match niffler::get_reader(Box::new(file)) {
        Ok((reader, compression)) => {
            debug!("Opened table {} with compression {:?}", path.display(), compression);
            reader
        }
        //Too short for a header row; the missing columns are reported by the caller
        Err(niffler::Error::FileTooShort) => Box::new(std::io::empty()),
        Err(e) => return Err(Error::input_not_valid(path, Some(e.to_string())).into()),
    };

    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader))
}

///////////////////////////////
/// Create a tab-separated table and write its header row right away,
/// so that the file has a header even if no rows follow
pub fn create_tsv<P: AsRef<Path>>(path: P, header: &[&str]) -> anyhow::Result<csv::Writer<File>> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(file);
    writer.write_record(header)?;
    Ok(writer)
}

///////////////////////////////
/// Position of a named column
pub fn column_index(headers: &StringRecord, column: &str, path: &Path) -> Result<usize, Error> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| Error::schema_mismatch(path, column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_only_table() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("t.tsv");
        let mut writer = create_tsv(&p, &["a", "b"]).unwrap();
        writer.flush().unwrap();
        drop(writer);
        assert_eq!(std::fs::read_to_string(&p).unwrap(), "a\tb\n");

        let mut reader = open_tsv(&p).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(column_index(&headers, "b", &p).unwrap(), 1);
        assert!(matches!(
            column_index(&headers, "c", &p),
            Err(Error::SchemaMismatch { .. })
        ));
        assert_eq!(reader.records().count(), 0);
    }

    #[test]
    fn test_tiny_table_lacks_columns() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("t.tsv");
        std::fs::write(&p, "a\n").unwrap();

        let mut reader = open_tsv(&p).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert!(matches!(
            column_index(&headers, "descrsR1", &p),
            Err(Error::SchemaMismatch { .. })
        ));
    }
}
