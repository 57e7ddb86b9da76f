use std::borrow::Cow;

const COLUMN_GAP: &str = "  ";

/// Plain-text table with one header row and a dashed rule beneath it.
#[derive(Default)]
pub struct TextTableBuilder<'a, Seq> {
    headers: &'a [Cow<'a, str>],
    rows: Vec<Seq>,
    alignments: Cow<'a, [Alignment]>,
}

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
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

        let mut col_widths: Vec<usize> = self.headers.iter().map(|h| display_width(h)).collect();
        for row in &self.rows {
            for (width, cell) in col_widths.iter_mut().zip(row.as_ref()) {
                *width = (*width).max(display_width(cell));
            }
        }

        let mut out = String::new();
        self.push_line(&mut out, self.headers, &col_widths);
        let rule: Vec<Cow<'_, str>> = col_widths
            .iter()
            .map(|width| Cow::Owned("-".repeat(*width)))
            .collect();
        push_cells(&mut out, &rule, &col_widths, |_| Alignment::Left);
        for row in &self.rows {
            self.push_line(&mut out, row.as_ref(), &col_widths);
        }
        out
    }

    fn push_line(&self, out: &mut String, cells: &[Cow<'_, str>], col_widths: &[usize]) {
        push_cells(out, cells, col_widths, |i| {
            self.alignments.get(i).copied().unwrap_or_default()
        });
    }
}

fn push_cells(
    out: &mut String,
    cells: &[Cow<'_, str>],
    col_widths: &[usize],
    alignment: impl Fn(usize) -> Alignment,
) {
    let mut line = String::new();
    for (i, width) in col_widths.iter().enumerate() {
        if i > 0 {
            line.push_str(COLUMN_GAP);
        }
        let cell = cells.get(i).map_or("", |cell| cell.as_ref());
        pad(&mut line, cell, *width, alignment(i));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn pad(line: &mut String, text: &str, width: usize, alignment: Alignment) {
    let fill = width.saturating_sub(display_width(text));
    let (left, right) = match alignment {
        Alignment::Left => (0, fill),
        Alignment::Center => (fill / 2, fill - fill / 2),
        Alignment::Right => (fill, 0),
    };
    line.extend(std::iter::repeat_n(' ', left));
    line.push_str(text);
    line.extend(std::iter::repeat_n(' ', right));
}

// Wide characters take two terminal cells.
fn display_width(text: &str) -> usize {
    text.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
}
