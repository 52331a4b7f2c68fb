use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

/// Reads transaction lines from a file, or stdin when no path is given.
///
/// Blank lines carry no transaction and are skipped, everything else is
/// passed on untouched so rejected lines keep their original text.
pub fn read_transaction_lines(path: Option<&Path>) -> io::Result<Vec<String>> {
    match path {
        Some(path) => collect_lines(BufReader::new(File::open(path)?)),
        None => collect_lines(io::stdin().lock()),
    }
}

/// Bytes that are not UTF-8 are replaced rather than failing the read, the
/// line they are on still reaches the ledger and is turned down there.
pub fn collect_lines(reader: impl BufRead) -> io::Result<Vec<String>> {
    let mut lines = Vec::new();
    for raw in reader.split(b'\n') {
        let raw = raw?;
        let raw = raw.strip_suffix(b"\r").unwrap_or(&raw[..]);
        let line = String::from_utf8_lossy(raw);
        if !line.trim().is_empty() {
            lines.push(line.into_owned());
        }
    }
    Ok(lines)
}
