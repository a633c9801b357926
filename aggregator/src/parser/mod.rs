//! Source table loader with encoding and delimiter auto-detection.
//!
//! Spreadsheet exports come in whatever encoding and list separator the
//! exporting machine used, so both are sniffed before the CSV reader runs.
//! Only the `Crops` and `States` columns are kept; everything else is ignored.

use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::{SourceRecord, SourceTable, CROPS_COLUMN, STATES_COLUMN};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Zip local-file signature, which is how `.xlsx`/`.ods` workbooks start.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    if bytes.starts_with(UTF8_BOM) {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes using the given encoding, dropping a leading BOM.
///
/// Latin-1 is read as Windows-1252, which agrees with it on every printable
/// byte. Unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Detect the delimiter by counting candidates in the header line.
///
/// Falls back to `,` when the line contains none of them.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Load the source table from `path`.
///
/// # Errors
/// - [`LoadError::NotFound`] if the file cannot be read
/// - [`LoadError::Format`] if it is empty, binary, or malformed
/// - [`LoadError::Schema`] if `Crops` or `States` is missing
pub fn load(path: impl AsRef<Path>) -> LoadResult<SourceTable> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoadError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;

    parse_bytes(&bytes, path)
}

/// Parse raw bytes; `origin` is only used in error messages.
pub fn parse_bytes(bytes: &[u8], origin: &Path) -> LoadResult<SourceTable> {
    if bytes.starts_with(ZIP_MAGIC) {
        return Err(LoadError::format(
            origin,
            "looks like a zipped workbook (.xlsx/.ods); export the sheet as CSV",
        ));
    }

    // A BOM settles the encoding, including UTF-16 "Unicode Text" exports
    let (encoding, content) = match encoding_rs::Encoding::for_bom(bytes) {
        Some((enc, bom_len)) => {
            let text = enc.decode_without_bom_handling(&bytes[bom_len..]).0.into_owned();
            (enc.name().to_lowercase(), text)
        }
        None => {
            if bytes.contains(&0) {
                return Err(LoadError::format(origin, "binary content, not delimited text"));
            }
            let encoding = detect_encoding(bytes);
            let content = decode_content(bytes, &encoding);
            (encoding, content)
        }
    };
    let delimiter = detect_delimiter(&content);

    parse_str(&content, delimiter, encoding, origin)
}

/// Parse decoded text with an explicit delimiter.
pub fn parse_str(
    content: &str,
    delimiter: char,
    encoding: String,
    origin: &Path,
) -> LoadResult<SourceTable> {
    if content.trim().is_empty() {
        return Err(LoadError::format(origin, "file is empty"));
    }
    if !delimiter.is_ascii() {
        return Err(LoadError::format(
            origin,
            format!("unsupported delimiter {:?}", delimiter),
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::format(origin, format!("cannot read header row: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::format(origin, "no header row"));
    }

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::Schema {
                path: origin.to_path_buf(),
                column: name.to_string(),
                found: headers.clone(),
            })
    };
    let crop_idx = column(CROPS_COLUMN)?;
    let state_idx = column(STATES_COLUMN)?;

    let mut records = Vec::new();

    for result in reader.records() {
        let row = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            LoadError::format(origin, format!("line {}: {}", line, e))
        })?;

        // Blank spreadsheet rows come through as a run of empty fields
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let cell = |idx: usize| row.get(idx).unwrap_or("").to_string();
        records.push(SourceRecord {
            crop: cell(crop_idx),
            state: cell(state_idx),
        });
    }

    Ok(SourceTable {
        records,
        encoding,
        delimiter,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(csv: &str) -> LoadResult<SourceTable> {
        parse_bytes(csv.as_bytes(), Path::new("test.csv"))
    }

    #[test]
    fn test_simple_table() {
        let table = parse("Crops,States\nCorn,Iowa\nCorn,Nebraska\nWheat,Iowa").unwrap();

        assert_eq!(table.delimiter, ',');
        assert_eq!(table.headers, vec!["Crops", "States"]);
        assert_eq!(
            table.records,
            vec![
                SourceRecord::new("Corn", "Iowa"),
                SourceRecord::new("Corn", "Nebraska"),
                SourceRecord::new("Wheat", "Iowa"),
            ]
        );
    }

    #[test]
    fn test_extra_columns_ignored_and_order_independent() {
        let table = parse("Id;States;Notes;Crops\n1;Ohio;x;Soy\n2;Utah;;Oats").unwrap();

        assert_eq!(table.delimiter, ';');
        assert_eq!(table.records[0], SourceRecord::new("Soy", "Ohio"));
        assert_eq!(table.records[1], SourceRecord::new("Oats", "Utah"));
    }

    #[test]
    fn test_quoted_values_keep_commas() {
        let table = parse("Crops,States\n\"Beans, dry\",Idaho").unwrap();
        assert_eq!(table.records[0].crop, "Beans, dry");
    }

    #[test]
    fn test_missing_cells_become_empty() {
        let table = parse("Crops,States,Notes\nCorn,,n\n,Iowa,n\nRice").unwrap();

        assert_eq!(table.records.len(), 3);
        assert_eq!(table.records[0], SourceRecord::new("Corn", ""));
        assert_eq!(table.records[1], SourceRecord::new("", "Iowa"));
        assert_eq!(table.records[2], SourceRecord::new("Rice", ""));
    }

    #[test]
    fn test_blank_rows_skipped() {
        let table = parse("Crops,States\nCorn,Iowa\n\n,\nWheat,Kansas\n").unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_headers_trimmed() {
        let table = parse(" Crops , States \nCorn,Iowa").unwrap();
        assert_eq!(table.records[0], SourceRecord::new("Corn", "Iowa"));
    }

    #[test]
    fn test_missing_crops_column_is_schema_error() {
        let err = parse("Crop,States\nCorn,Iowa").unwrap_err();
        match err {
            LoadError::Schema { column, found, .. } => {
                assert_eq!(column, "Crops");
                assert_eq!(found, vec!["Crop", "States"]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_states_column_is_schema_error() {
        let err = parse("Crops\nCorn").unwrap_err();
        assert!(matches!(err, LoadError::Schema { ref column, .. } if column == "States"));
    }

    #[test]
    fn test_empty_file_is_format_error() {
        assert!(matches!(parse("").unwrap_err(), LoadError::Format { .. }));
        assert!(matches!(parse("\n  \n").unwrap_err(), LoadError::Format { .. }));
    }

    #[test]
    fn test_workbook_is_format_error() {
        let err = parse_bytes(b"PK\x03\x04\x14\x00\x06\x00", Path::new("db.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::Format { .. }));
        assert!(err.to_string().contains("CSV"));
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("Crops,States\nCorn,Iowa".as_bytes());

        let table = parse_bytes(&bytes, Path::new("bom.csv")).unwrap();
        assert_eq!(table.encoding, "utf-8");
        assert_eq!(table.headers[0], "Crops");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Café" in ISO-8859-1
        let decoded = decode_content(&[0x43, 0x61, 0x66, 0xE9], "iso-8859-1");
        assert_eq!(decoded, "Café");
    }

    #[test]
    fn test_latin1_keeps_symbols_distinct_from_latin9() {
        assert_eq!(decode_content(&[0xBD], "iso-8859-1"), "½");
        assert_eq!(decode_content(&[0xA4], "latin1"), "¤");
        assert_eq!(decode_content(&[0xBD], "iso-8859-15"), "œ");
    }

    #[test]
    fn test_utf16_unicode_text_export() {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend("Crops\tStates\r\nMaïs\tIowa\r\n".encode_utf16().flat_map(|u| u.to_le_bytes()));

        let table = parse_bytes(&bytes, Path::new("unicode.txt")).unwrap();
        assert_eq!(table.encoding, "utf-16le");
        assert_eq!(table.delimiter, '\t');
        assert_eq!(table.records, vec![SourceRecord::new("Maïs", "Iowa")]);
    }

    #[test]
    fn test_nul_bytes_without_bom_are_format_error() {
        let err = parse_bytes(b"Crops,States\n\0\0", Path::new("blob.bin")).unwrap_err();
        assert!(matches!(err, LoadError::Format { .. }));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }

    #[test]
    fn test_load_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Crops,States\nApples,Washington\n").unwrap();

        let table = load(file.path()).unwrap();
        assert_eq!(table.records, vec![SourceRecord::new("Apples", "Washington")]);
    }
}
