//! Header-row format sniffing.

use super::normalize::{parse_decimal, parse_instant};
use super::tabular::split_line;

/// Where an uploaded document gets routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedFormat {
    /// One row per closed round trip, canonical column names present.
    CompletedTrades,
    /// One row per fill, positional columns.
    RawExecutions,
    /// Neither shape matched; needs a manual column mapping.
    Unresolved,
}

/// Headers come from a naive comma split of the first line, each cleaned of
/// whitespace and of a leading or trailing quote independently. Quoted
/// header cells never contain commas in practice, so the tolerant splitter
/// is reserved for data rows.
pub fn parse_headers(first_line: &str) -> Vec<String> {
    first_line.split(',').map(clean_header).collect()
}

fn clean_header(raw: &str) -> String {
    let mut cleaned = raw.trim();
    cleaned = cleaned.strip_prefix('"').unwrap_or(cleaned);
    cleaned = cleaned.strip_suffix('"').unwrap_or(cleaned);
    cleaned.to_string()
}

/// Decision rule, in order: canonical completed-trade headers win; otherwise
/// the document is raw executions if any line looks like a fill (at least 5
/// columns, numeric price in column 3, parseable timestamp in column 2);
/// otherwise unresolved. Never fails.
pub fn detect(headers: &[String], lines: &[&str]) -> DetectedFormat {
    let has = |name: &str| headers.iter().any(|h| h == name);
    if has("ContractName") && has("PnL") {
        return DetectedFormat::CompletedTrades;
    }
    let looks_like_fill = |line: &&str| {
        let cells = split_line(line);
        cells.len() >= 5
            && parse_decimal(&cells[3]).is_some()
            && parse_instant(&cells[2]).is_some()
    };
    if lines.iter().any(looks_like_fill) {
        return DetectedFormat::RawExecutions;
    }
    DetectedFormat::Unresolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_of(line: &str) -> Vec<String> {
        parse_headers(line)
    }

    #[test]
    fn canonical_headers_mean_completed_trades() {
        let headers = headers_of("Id,ContractName,EnteredAt,ExitedAt,EntryPrice,ExitPrice,Size,Type,PnL");
        assert_eq!(detect(&headers, &[]), DetectedFormat::CompletedTrades);
    }

    #[test]
    fn completed_detection_needs_both_columns() {
        let headers = headers_of("ContractName,EnteredAt,Size");
        assert_eq!(detect(&headers, &[]), DetectedFormat::Unresolved);
    }

    #[test]
    fn quoted_headers_are_cleaned() {
        let headers = headers_of(r#""ContractName", "PnL""#);
        assert_eq!(headers, vec!["ContractName", "PnL"]);
        assert_eq!(detect(&headers, &[]), DetectedFormat::CompletedTrades);
    }

    #[test]
    fn fill_shaped_rows_mean_raw_executions() {
        let lines = vec![
            "Symbol,Side,Time,Price,Qty",
            "NQ,Buy,2024-03-01 09:30:00,15000,1",
        ];
        let headers = headers_of(lines[0]);
        assert_eq!(detect(&headers, &lines), DetectedFormat::RawExecutions);
    }

    #[test]
    fn headerless_fill_data_still_detects() {
        let lines = vec!["NQ,Buy,2024-03-01 09:30:00,15000,1"];
        let headers = headers_of(lines[0]);
        assert_eq!(detect(&headers, &lines), DetectedFormat::RawExecutions);
    }

    #[test]
    fn unrecognized_shape_is_unresolved() {
        let lines = vec!["alpha,beta", "1,2"];
        let headers = headers_of(lines[0]);
        assert_eq!(detect(&headers, &lines), DetectedFormat::Unresolved);
    }
}
