use crate::database::{Column, Table};

const MIN_WIDTH: usize = 5;

fn width(column: &Column) -> usize {
    column
        .values
        .iter()
        .map(|v| v.chars().count())
        .chain(std::iter::once(column.name.chars().count()))
        .fold(MIN_WIDTH, usize::max)
}

fn row(cells: &[(&str, usize)]) -> String {
    let cells = cells
        .iter()
        .map(|(text, width)| format!("{:<width$}", text, width = *width))
        .collect::<Vec<_>>();
    format!("| {} |", cells.join(" | "))
}

/// Fixed-width grid of a table: header, rule, then one line per row index.
/// Short columns contribute blank cells.
pub fn render_table(table: &Table) -> String {
    let widths = table.columns.iter().map(width).collect::<Vec<_>>();

    let header = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| (c.name.as_str(), *w))
        .collect::<Vec<_>>();

    let rule = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("|");

    let mut lines = vec![row(&header), format!("|{}|", rule)];
    for i in 0..table.row_count() {
        let cells = table
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| (c.values.get(i).map(String::as_str).unwrap_or(""), *w))
            .collect::<Vec<_>>();
        lines.push(row(&cells));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ColumnType;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn test_name_floor_width() {
        let mut table = Table::new("t", None).unwrap();
        table
            .add_column(Column::new("id", ColumnType::Int, 2, strings(&["1", "22"]), None).unwrap())
            .unwrap();
        let out = render_table(&table);
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "| id    |");
        assert!(lines[0].contains("id   "));
        assert_eq!(lines[1], "|-------|");
        assert_eq!(lines[2], "| 1     |");
        assert_eq!(lines[3], "| 22    |");
    }

    #[test]
    fn test_widest_value_wins() {
        let mut table = Table::new("t", None).unwrap();
        table
            .add_column(
                Column::new("name", ColumnType::String, 2, strings(&["abcdefgh"]), None).unwrap(),
            )
            .unwrap();
        table
            .add_column(Column::new("quantity", ColumnType::Int, 2, strings(&["3"]), None).unwrap())
            .unwrap();
        assert_eq!(
            render_table(&table),
            "| name     | quantity |\n|----------|----------|\n| abcdefgh | 3        |\n"
        );
    }

    #[test]
    fn test_short_column_renders_blank_cells() {
        // Bypass add_column so the columns stay unequal.
        let mut table = Table::new("t", None).unwrap();
        table.columns.push(Column::new("a", ColumnType::Int, 1, strings(&["1", "2"]), None).unwrap());
        table.columns.push(Column::new("b", ColumnType::Int, 1, strings(&["x"]), None).unwrap());
        let out = render_table(&table);
        assert_eq!(out.lines().last().unwrap(), "| 2     |       |");
    }
}
