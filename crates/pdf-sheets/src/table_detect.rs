use crate::model::{ExtractedTable, PageText, Row};
use crate::table_parse::{soft_split_line_into_cells, split_line_into_cells};

/// Most single-space-separated words a line may have and still count as a
/// row when none of them contain digits.
const MAX_SOFT_TEXT_CELLS: usize = 6;

fn line_cells(line: &str, min_cols: usize) -> Vec<String> {
    let cells = split_line_into_cells(line);
    if cells.len() >= min_cols {
        return cells;
    }

    let soft_cells = soft_split_line_into_cells(line);
    let has_numeric = soft_cells
        .iter()
        .any(|cell| cell.chars().any(|ch| ch.is_ascii_digit()));
    let looks_like_sentence = ['.', '!', '?']
        .iter()
        .any(|punctuation| line.trim_end().ends_with(*punctuation));
    if soft_cells.len() >= min_cols
        && !looks_like_sentence
        && (has_numeric || soft_cells.len() <= MAX_SOFT_TEXT_CELLS)
    {
        soft_cells
    } else {
        cells
    }
}

/// Runs of two or more consecutive lines that each split into `min_cols` or
/// more cells.
pub(crate) fn detect_tables_in_page(page: &PageText, min_cols: usize) -> Vec<Vec<Vec<String>>> {
    let mut tables = Vec::new();
    let mut current_rows: Vec<Vec<String>> = Vec::new();

    let flush_current = |rows: &mut Vec<Vec<String>>, tables: &mut Vec<Vec<Vec<String>>>| {
        if rows.len() >= 2 {
            tables.push(std::mem::take(rows));
        } else {
            rows.clear();
        }
    };

    for line in page.text.lines() {
        let cells = line_cells(line, min_cols);
        if cells.len() >= min_cols {
            current_rows.push(cells);
        } else {
            flush_current(&mut current_rows, &mut tables);
        }
    }

    flush_current(&mut current_rows, &mut tables);
    tables
}

/// The page's largest table by cell count; the earliest one wins ties.
pub(crate) fn extract_page_table(page: &PageText, min_cols: usize) -> Option<ExtractedTable> {
    let tables = detect_tables_in_page(page, min_cols);
    let largest = tables.into_iter().rev().max_by_key(|rows| {
        rows.iter().map(Vec::len).sum::<usize>()
    })?;

    let mut grid = largest
        .into_iter()
        .map(|row| row.into_iter().map(Some).collect::<Row>());
    let header = grid.next()?;
    let width = header.len();
    let rows = grid
        .map(|mut row| {
            if row.len() < width {
                row.resize(width, None);
            }
            row
        })
        .collect();

    Some(ExtractedTable::new(header, rows))
}

#[cfg(test)]
mod tests {
    use super::{detect_tables_in_page, extract_page_table};
    use crate::model::{PageText, text_row};

    fn page(text: &str) -> PageText {
        PageText {
            page_number: 1,
            text: text.to_string(),
        }
    }

    #[test]
    fn detects_separate_tables_split_by_prose() {
        let tables = detect_tables_in_page(
            &page("A  B\n1  2\nSome prose here.\nX  Y  Z\n3  4  5\n6  7  8"),
            2,
        );
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].len(), 3);
    }

    #[test]
    fn single_multi_cell_line_is_not_a_table() {
        assert!(detect_tables_in_page(&page("Total  42\nThe end."), 2).is_empty());
        assert!(extract_page_table(&page("Just a paragraph of text."), 2).is_none());
    }

    #[test]
    fn picks_largest_table_and_splits_header() {
        let table = extract_page_table(
            &page("A  B\n1  2\n\nName  Qty  Price\nPen  3  1.5\nBook  1  9.9"),
            2,
        )
        .expect("page has a table");

        assert_eq!(table.header, text_row(&["Name", "Qty", "Price"]));
        assert_eq!(
            table.rows,
            vec![text_row(&["Pen", "3", "1.5"]), text_row(&["Book", "1", "9.9"])]
        );
    }

    #[test]
    fn earliest_table_wins_a_size_tie() {
        let table = extract_page_table(&page("A  B\n1  2\n\nC  D\n3  4"), 2)
            .expect("page has a table");
        assert_eq!(table.header, text_row(&["A", "B"]));
    }

    #[test]
    fn pads_short_rows_with_null_cells() {
        let table = extract_page_table(&page("A  B  C\n1  2  3\n4  5\n6  7  8  9"), 2)
            .expect("page has a table");

        assert_eq!(
            table.rows[1],
            vec![Some("4".to_string()), Some("5".to_string()), None]
        );
        assert_eq!(table.rows[2].len(), 4);
    }
}
