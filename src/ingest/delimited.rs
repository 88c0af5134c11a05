//! Delimited text (`.csv`, `.txt`) reader with delimiter sniffing
use crate::error::DashboardError;
use crate::helpers::text::decode_utf8;
use csv::ReaderBuilder;
use tracing::debug;

/// Candidate delimiters, in order of preference.
const DELIMITERS: [u8; 5] = [b',', b';', b'\t', b'|', b':'];

/// Number of leading non-empty lines inspected when sniffing.
const SNIFF_LINES: usize = 10;

/// Counts `delimiter` outside double-quoted sections of a line.
fn count_outside_quotes(line: &str, delimiter: u8) -> usize {
    let mut is_quoted = false;
    let mut count = 0usize;
    for byte in line.bytes() {
        match byte {
            b'"' => is_quoted = !is_quoted,
            _ if byte == delimiter && !is_quoted => count += 1,
            _ => (),
        }
    }
    count
}

/// Picks the delimiter of a text sample.
///
/// A candidate is consistent when it occurs the same, non-zero number of times on every
/// sampled line. The consistent candidate with the highest count wins, ties going to the
/// earlier candidate. Without a consistent candidate the one most frequent in the header
/// line is used, and a header without any candidate means a single-column file.
pub(crate) fn sniff_delimiter(text: &str) -> u8 {
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();
    let Some(header) = lines.first() else {
        return DELIMITERS[0];
    };

    let mut best: Option<(u8, usize)> = None;
    for delimiter in DELIMITERS {
        let count = count_outside_quotes(header, delimiter);
        let is_consistent = count > 0
            && lines.iter().all(|line| count_outside_quotes(line, delimiter) == count);
        if is_consistent && best.map(|(_, best_count)| count > best_count).unwrap_or(true) {
            best = Some((delimiter, count));
        }
    }
    if let Some((delimiter, _)) = best {
        return delimiter;
    }

    DELIMITERS
        .iter()
        .map(|delimiter| (*delimiter, count_outside_quotes(header, *delimiter)))
        .filter(|(_, count)| *count > 0)
        .fold(None::<(u8, usize)>, |best, candidate| match best {
            Some((_, best_count)) if best_count >= candidate.1 => best,
            _ => Some(candidate),
        })
        .map(|(delimiter, _)| delimiter)
        .unwrap_or(DELIMITERS[0])
}

/// Reads delimited UTF-8 text into rows, header first.
/// Short records are padded with `None`; a record longer than the header is an error.
pub(crate) fn read_rows(bytes: &[u8]) -> Result<Vec<Vec<Option<String>>>, DashboardError> {
    let text = decode_utf8(bytes)?;
    let delimiter = sniff_delimiter(&text);
    debug!(delimiter = %(delimiter as char).escape_default(), "sniffed delimiter");

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    let mut width = 0usize;
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        if index == 0 {
            width = record.len();
        } else if record.len() > width {
            let line = record.position().map(|position| position.line()).unwrap_or(index as u64 + 1);
            Err(DashboardError::ParseError(format!(
                "expected {} fields in line {}, saw {}",
                width,
                line,
                record.len()
            )))?
        }
        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|field| if field.is_empty() { None } else { Some(field.to_owned()) })
            .collect();
        row.resize(width, None);
        rows.push(row);
    }
    Ok(rows)
}
