//! Utility functions and structures.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::io::{self, BufRead, BufReader, Read};

use flate2::read::MultiGzDecoder;

use tracing_subscriber::EnvFilter;

//-----------------------------------------------------------------------------

/// Returns the full file name for a specific test file.
pub fn get_test_data(filename: &'static str) -> PathBuf {
    let mut buf = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    buf.push("test-data");
    buf.push(filename);
    buf
}

/// Installs a logger writing to stderr.
///
/// The default level is `info`; `RUST_LOG` overrides it.
/// Does nothing if a logger has already been installed.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

//-----------------------------------------------------------------------------

// Utilities for working with files.

const SIZE_UNITS: [(f64, &str); 6] = [
    (1.0, "B"),
    (1024.0, "KiB"),
    (1024.0 * 1024.0, "MiB"),
    (1024.0 * 1024.0 * 1024.0, "GiB"),
    (1024.0 * 1024.0 * 1024.0 * 1024.0, "TiB"),
    (1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0, "PiB"),
];

/// Returns a human-readable representation of the given number of bytes.
pub fn human_readable_size(bytes: usize) -> String {
    let mut unit = 0;
    let value = bytes as f64;
    while unit + 1 < SIZE_UNITS.len() && value >= SIZE_UNITS[unit + 1].0 {
        unit += 1;
    }
    format!("{:.3} {}", value / SIZE_UNITS[unit].0, SIZE_UNITS[unit].1)
}

/// Returns a human-readable size of the file.
pub fn file_size<P: AsRef<Path>>(filename: P) -> Option<String> {
    let metadata = fs::metadata(filename).ok()?;
    Some(human_readable_size(metadata.len() as usize))
}

/// Returns `true` if the file exists.
pub fn file_exists<P: AsRef<Path>>(filename: P) -> bool {
    fs::metadata(filename).is_ok()
}

/// Returns `true` if the file appears to be gzip-compressed.
pub fn is_gzipped<P: AsRef<Path>>(filename: P) -> bool {
    let file = match File::open(filename) {
        Ok(file) => file,
        Err(_) => return false,
    };
    let mut reader = BufReader::new(file);
    let mut magic = [0; 2];
    let len = reader.read(&mut magic).ok();
    len == Some(2) && magic == [0x1F, 0x8B]
}

/// Returns a buffered reader for the file, which may be gzip-compressed.
pub fn open_file<P: AsRef<Path>>(filename: P) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(&filename)?;
    let inner = BufReader::new(file);
    if is_gzipped(&filename) {
        let inner = MultiGzDecoder::new(inner);
        Ok(Box::new(BufReader::new(inner)))
    } else {
        Ok(Box::new(inner))
    }
}

//-----------------------------------------------------------------------------

// Text handling for delimited input and SQL statements.

/// Character encoding of a delimited input file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8; invalid byte sequences are errors.
    #[default]
    Utf8,
    /// ISO 8859-1, where each byte is a character.
    Latin1,
}

impl Encoding {
    /// Decodes a field in this encoding.
    ///
    /// Returns [`None`] if the bytes are not valid in the encoding.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Encoding::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
            Encoding::Latin1 => Some(bytes.iter().map(|&byte| byte as char).collect()),
        }
    }
}

/// Parses a field delimiter given on the command line.
///
/// Accepts a single ASCII character or `tab` / `\t` for the tab character.
pub fn parse_delimiter(value: &str) -> Option<u8> {
    match value {
        "tab" | "\\t" => Some(b'\t'),
        _ if value.len() == 1 && value.is_ascii() => Some(value.as_bytes()[0]),
        _ => None,
    }
}

/// Quotes an SQL identifier such as a table or a column name.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

//-----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_units() {
        assert_eq!(human_readable_size(0), "0.000 B");
        assert_eq!(human_readable_size(1536), "1.500 KiB");
        assert_eq!(human_readable_size(3 * 1024 * 1024), "3.000 MiB");
    }

    #[test]
    fn decode_fields() {
        let utf8 = "Þingvallavatn".as_bytes();
        assert_eq!(Encoding::Utf8.decode(utf8).as_deref(), Some("Þingvallavatn"));
        let latin1 = b"\xDEingvallavatn";
        assert_eq!(Encoding::Utf8.decode(latin1), None, "Decoded invalid UTF-8");
        assert_eq!(Encoding::Latin1.decode(latin1).as_deref(), Some("Þingvallavatn"));
    }

    #[test]
    fn delimiters() {
        assert_eq!(parse_delimiter(";"), Some(b';'));
        assert_eq!(parse_delimiter(","), Some(b','));
        assert_eq!(parse_delimiter("tab"), Some(b'\t'));
        assert_eq!(parse_delimiter("\\t"), Some(b'\t'));
        assert_eq!(parse_delimiter(";;"), None);
        assert_eq!(parse_delimiter("þ"), None);
        assert_eq!(parse_delimiter(""), None);
    }

    #[test]
    fn quoted_identifiers() {
        assert_eq!(quote_identifier("Samples"), "\"Samples\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn plain_and_gzipped_files() {
        for name in ["herring_samples.csv", "salmon_genotypes.csv.gz"] {
            let filename = get_test_data(name);
            assert!(file_exists(&filename), "Missing test file {}", name);
            assert_eq!(is_gzipped(&filename), name.ends_with(".gz"), "Wrong compression for {}", name);
            let reader = match open_file(&filename) {
                Ok(reader) => reader,
                Err(err) => panic!("Failed to open {}: {}", name, err),
            };
            let mut lines = reader.lines();
            let header = lines.next();
            assert!(matches!(header, Some(Ok(ref line)) if line.starts_with("Sample_")), "Wrong header in {}", name);
        }
    }
}

//-----------------------------------------------------------------------------
