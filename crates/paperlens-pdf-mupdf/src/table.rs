//! Row/cell reconstruction for pages that carry a text grid.

/// One positioned run of text on a page (PDF points, y grows downward).
#[derive(Debug, Clone, PartialEq)]
pub struct CellBox {
    pub x0: f32,
    pub y0: f32,
    pub y1: f32,
    pub text: String,
}

impl CellBox {
    fn center(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    fn height(&self) -> f32 {
        (self.y1 - self.y0).abs()
    }
}

/// Minimum consecutive multi-cell rows before a grid counts as a table.
const MIN_TABLE_ROWS: usize = 2;

/// Longest mean cell length (in chars) a table run may have. Two-column
/// prose also lines up in rows, but its "cells" are whole lines.
const MAX_MEAN_CELL_CHARS: usize = 30;

/// Group boxes into rows by vertical center, cells ordered left to right.
fn group_rows(mut cells: Vec<CellBox>) -> Vec<Vec<CellBox>> {
    cells.retain(|c| !c.text.trim().is_empty());
    cells.sort_by(|a, b| a.center().total_cmp(&b.center()));

    let mut rows: Vec<Vec<CellBox>> = Vec::new();
    for cell in cells {
        let joins_last = rows.last().is_some_and(|row| {
            let anchor = &row[0];
            let tolerance = (anchor.height().min(cell.height()) / 2.0).max(2.0);
            (cell.center() - anchor.center()).abs() <= tolerance
        });
        if joins_last {
            if let Some(row) = rows.last_mut() {
                row.push(cell);
            }
        } else {
            rows.push(vec![cell]);
        }
    }
    for row in &mut rows {
        row.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    }
    rows
}

fn is_tabular(run: &[Vec<CellBox>]) -> bool {
    if run.len() < MIN_TABLE_ROWS {
        return false;
    }
    let (cells, chars) = run
        .iter()
        .flatten()
        .fold((0, 0), |(n, len), c| (n + 1, len + c.text.trim().chars().count()));
    cells > 0 && chars / cells <= MAX_MEAN_CELL_CHARS
}

/// Rebuild the page from positioned lines, serializing grid regions as
/// `| a | b |` rows and every other row as plain text.
///
/// Returns `None` when no run of at least two multi-cell rows with short
/// cells is found; the caller then keeps its ordinary block text.
pub fn rows_to_table(cells: Vec<CellBox>) -> Option<String> {
    let rows = group_rows(cells);

    // Mark each row that belongs to a tabular run of multi-cell rows.
    let mut in_table = vec![false; rows.len()];
    let mut start = 0;
    while start < rows.len() {
        if rows[start].len() < 2 {
            start += 1;
            continue;
        }
        let mut end = start;
        while end < rows.len() && rows[end].len() >= 2 {
            end += 1;
        }
        if is_tabular(&rows[start..end]) {
            in_table[start..end].fill(true);
        }
        start = end;
    }
    if !in_table.contains(&true) {
        return None;
    }

    let mut out = String::new();
    for (row, tabular) in rows.iter().zip(in_table) {
        let cells: Vec<&str> = row.iter().map(|c| c.text.trim()).collect();
        if tabular {
            out.push_str("| ");
            out.push_str(&cells.join(" | "));
            out.push_str(" |");
        } else {
            out.push_str(&cells.join(" "));
        }
        out.push('\n');
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(x0: f32, y0: f32, text: &str) -> CellBox {
        CellBox {
            x0,
            y0,
            y1: y0 + 10.0,
            text: text.to_string(),
        }
    }

    #[test]
    fn builds_pipe_rows_in_reading_order() {
        let cells = vec![
            cell(200.0, 100.0, "Yield (%)"),
            cell(50.0, 100.0, "Catalyst"),
            cell(50.0, 120.0, "Pd/C"),
            cell(200.0, 121.0, "92"),
        ];
        let table = rows_to_table(cells).unwrap();
        assert_eq!(table, "| Catalyst | Yield (%) |\n| Pd/C | 92 |\n");
    }

    #[test]
    fn single_column_is_not_a_table() {
        let cells = vec![
            cell(50.0, 100.0, "Abstract"),
            cell(50.0, 120.0, "We study"),
            cell(50.0, 140.0, "the effect"),
        ];
        assert!(rows_to_table(cells).is_none());
    }

    #[test]
    fn one_wide_row_is_not_a_table() {
        let cells = vec![cell(50.0, 100.0, "a"), cell(150.0, 100.0, "b")];
        assert!(rows_to_table(cells).is_none());
    }

    #[test]
    fn two_column_prose_is_not_a_table() {
        let cells = vec![
            cell(50.0, 100.0, "Enzyme kinetics were measured at five substrate"),
            cell(320.0, 100.0, "The fitted constants agree with earlier reports"),
            cell(50.0, 120.0, "concentrations using a continuous assay at 25 C."),
            cell(320.0, 120.0, "for the wild-type enzyme within experimental error."),
        ];
        assert!(rows_to_table(cells).is_none());
    }

    #[test]
    fn caption_and_grid_keep_reading_order() {
        let cells = vec![
            cell(50.0, 80.0, "Table 1. Hydrogenation yields"),
            cell(50.0, 100.0, "Catalyst"),
            cell(200.0, 100.0, "Yield (%)"),
            cell(50.0, 120.0, "Pd/C"),
            cell(200.0, 120.0, "92"),
            cell(50.0, 150.0, "Yields were determined by NMR."),
        ];
        assert_eq!(
            rows_to_table(cells).unwrap(),
            "Table 1. Hydrogenation yields\n\
             | Catalyst | Yield (%) |\n\
             | Pd/C | 92 |\n\
             Yields were determined by NMR.\n"
        );
    }

    #[test]
    fn blank_cells_are_ignored() {
        assert!(rows_to_table(vec![cell(0.0, 0.0, "  ")]).is_none());
        assert!(rows_to_table(Vec::new()).is_none());
    }
}
