/// Data rows shown when previewing a spreadsheet.
pub const MAX_PREVIEW_ROWS: usize = 20;

const COLUMN_GAP: &str = "  ";
const MISSING: &str = "NaN";

/// Renders rows as a fixed-width text table with a 0-based row index.
///
/// The index column is left-aligned, data columns are right-aligned to the
/// widest of their header and values, and missing cells print as `NaN`.
pub fn render_table(headers: &[String], rows: &[Vec<Option<String>>]) -> String {
    if rows.is_empty() {
        return format!(
            "Empty DataFrame\nColumns: [{}]\nIndex: []",
            headers.join(", ")
        );
    }

    let labels: Vec<String> = (0..rows.len()).map(|i| i.to_string()).collect();
    let index_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(column, header)| {
            rows.iter()
                .map(|row| cell(row, column).chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);

    let mut header_line = " ".repeat(index_width);
    for (header, width) in headers.iter().zip(&widths) {
        header_line.push_str(COLUMN_GAP);
        header_line.push_str(&format!("{:>width$}", header, width = *width));
    }
    lines.push(header_line);

    for (label, row) in labels.iter().zip(rows) {
        let mut line = format!("{:<width$}", label, width = index_width);
        for (column, width) in widths.iter().enumerate() {
            line.push_str(COLUMN_GAP);
            line.push_str(&format!("{:>width$}", cell(row, column), width = *width));
        }
        lines.push(line);
    }

    lines.join("\n")
}

fn cell(row: &[Option<String>], column: usize) -> &str {
    row.get(column)
        .and_then(|c| c.as_deref())
        .unwrap_or(MISSING)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn given_rows_when_rendering_then_aligns_columns() {
        let headers = strings(&["Part", "Value"]);
        let rows = vec![
            vec![Some("R1".to_string()), Some("100".to_string())],
            vec![Some("C12".to_string()), None],
        ];

        let table = render_table(&headers, &rows);

        assert_eq!(table, "   Part  Value\n0    R1    100\n1   C12    NaN");
    }

    #[test]
    fn given_no_rows_when_rendering_then_reports_empty_frame() {
        let table = render_table(&strings(&["Part", "Value"]), &[]);

        assert_eq!(table, "Empty DataFrame\nColumns: [Part, Value]\nIndex: []");
    }

    #[test]
    fn given_more_than_ten_rows_when_rendering_then_index_column_widens() {
        let headers = strings(&["n"]);
        let rows: Vec<Vec<Option<String>>> =
            (0..11).map(|i| vec![Some(i.to_string())]).collect();

        let table = render_table(&headers, &rows);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "     n");
        assert_eq!(lines[1], "0    0");
        assert_eq!(lines[11], "10  10");
    }
}
