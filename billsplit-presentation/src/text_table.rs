use std::{borrow::Cow, fmt::Write};

const COLUMN_GAP: usize = 2;

/// Renders rows of cells as a fixed-width text table. Column widths are
/// sized to the widest cell; alignment is per column.
#[derive(Default)]
pub struct TextTableBuilder<'a, Seq> {
    headers: &'a [Cow<'a, str>],
    rows: Vec<Seq>,
    alignments: Cow<'a, [Alignment]>,
}

#[derive(Clone, Copy, Default)]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

impl<'a, Seq> TextTableBuilder<'a, Seq>
where
    Seq: AsRef<[Cow<'a, str>]> + Default,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alignments(mut self, alignments: &'a [Alignment]) -> Self {
        self.alignments = Cow::Borrowed(alignments);
        self
    }

    pub fn headers(mut self, headers: &'a [Cow<'a, str>]) -> Self {
        self.headers = headers;
        if self.alignments.is_empty() {
            self.alignments = Cow::Owned(vec![Alignment::default(); self.headers.len()]);
        }
        self
    }

    pub fn row(mut self, row: Seq) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Seq>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn build(self) -> String {
        let col_count = self.headers.len();
        if col_count == 0 {
            return String::new();
        }

        let mut col_widths: Vec<usize> =
            self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.as_ref().iter().enumerate() {
                if i < col_widths.len() {
                    col_widths[i] = col_widths[i].max(cell.chars().count());
                }
            }
        }

        let mut output = String::with_capacity(1024);
        write_line(&mut output, self.headers, &col_widths, &self.alignments);
        let rule_width: usize =
            col_widths.iter().sum::<usize>() + COLUMN_GAP * (col_count - 1);
        let _ = writeln!(&mut output, "{}", "-".repeat(rule_width));
        for row in &self.rows {
            write_line(&mut output, row.as_ref(), &col_widths, &self.alignments);
        }

        output
    }
}

fn write_line(
    output: &mut String,
    cells: &[Cow<'_, str>],
    col_widths: &[usize],
    alignments: &[Alignment],
) {
    for (i, width) in col_widths.iter().enumerate() {
        if i > 0 {
            output.push_str(&" ".repeat(COLUMN_GAP));
        }
        let cell = cells.get(i).map_or("", |cell| cell.as_ref());
        let padding = width.saturating_sub(cell.chars().count());
        match alignments.get(i).copied().unwrap_or_default() {
            Alignment::Left => {
                output.push_str(cell);
                // No trailing spaces after the last column.
                if i + 1 < col_widths.len() {
                    output.push_str(&" ".repeat(padding));
                }
            }
            Alignment::Right => {
                output.push_str(&" ".repeat(padding));
                output.push_str(cell);
            }
        }
    }
    output.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_to_the_widest_cell() {
        let table: String = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&[Cow::Borrowed("Item"), Cow::Borrowed("Total")])
            .row([Cow::Borrowed("Coffee"), Cow::Borrowed("10.00")])
            .row([Cow::Borrowed("Bagel"), Cow::Borrowed("3.00")])
            .build();

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Item    Total");
        assert_eq!(lines[1], "-------------");
        assert_eq!(lines[2], "Coffee  10.00");
        assert_eq!(lines[3], "Bagel    3.00");
    }

    #[test]
    fn empty_headers_build_nothing() {
        let table: String = TextTableBuilder::<[Cow<'_, str>; 0]>::new().build();
        assert!(table.is_empty());
    }
}
