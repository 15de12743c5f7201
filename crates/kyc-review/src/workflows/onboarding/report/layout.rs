use crate::workflows::onboarding::status::StatusTone;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb(pub f32, pub f32, pub f32);

pub const BODY_TEXT: Rgb = Rgb(0.13, 0.15, 0.18);
pub const MUTED_TEXT: Rgb = Rgb(0.42, 0.45, 0.50);
pub const BAND_FILL: Rgb = Rgb(0.09, 0.16, 0.29);
pub const BAND_TEXT: Rgb = Rgb(1.0, 1.0, 1.0);
pub const RULE: Rgb = Rgb(0.82, 0.84, 0.87);
pub const TABLE_HEADER_FILL: Rgb = Rgb(0.93, 0.94, 0.96);

pub const fn tone_color(tone: StatusTone) -> Rgb {
    match tone {
        StatusTone::Positive => Rgb(0.09, 0.55, 0.25),
        StatusTone::Negative => Rgb(0.80, 0.16, 0.16),
        StatusTone::InProgress => Rgb(0.85, 0.55, 0.05),
        StatusTone::Neutral => Rgb(0.42, 0.45, 0.50),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// Average Helvetica advance width as a fraction of the font size.
    const fn average_advance(self) -> f32 {
        match self {
            Font::Regular => 0.5,
            Font::Bold => 0.55,
        }
    }
}

/// Page size and the fixed bands every page reserves, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_x: f32,
    pub header_height: f32,
    pub footer_height: f32,
    pub bottom_margin: f32,
}

impl PageGeometry {
    pub const A4: Self = Self {
        width: 595.0,
        height: 842.0,
        margin_x: 40.0,
        header_height: 56.0,
        footer_height: 44.0,
        bottom_margin: 64.0,
    };

    pub fn content_top(&self) -> f32 {
        self.height - self.header_height - 24.0
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin_x
    }

    fn usable_height(&self) -> f32 {
        self.content_top() - self.bottom_margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        font: Font,
        color: Rgb,
        text: String,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Rgb,
    },
    Logo {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutPage {
    pub number: usize,
    pub ops: Vec<DrawOp>,
}

/// Fully paginated report, ready for encoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLayout {
    pub geometry_width: f32,
    pub geometry_height: f32,
    pub pages: Vec<LayoutPage>,
}

impl ReportLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All text drawn on the document, page by page.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|page| {
            page.ops.iter().filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrgMark {
    Text(String),
    /// Embedded image, width divided by height.
    Logo { aspect: f32 },
}

/// Band drawn at the top of every page.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderBand {
    pub mark: OrgMark,
    pub title: String,
    pub generated_on: String,
}

impl HeaderBand {
    pub fn draw(&self, geometry: &PageGeometry) -> Vec<DrawOp> {
        let band_y = geometry.height - geometry.header_height;
        let baseline = band_y + geometry.header_height / 2.0 - 4.0;
        let mut ops = vec![DrawOp::Rect {
            x: 0.0,
            y: band_y,
            width: geometry.width,
            height: geometry.header_height,
            color: BAND_FILL,
        }];

        match &self.mark {
            OrgMark::Text(name) => ops.push(DrawOp::Text {
                x: geometry.margin_x,
                y: baseline,
                size: 13.0,
                font: Font::Bold,
                color: BAND_TEXT,
                text: truncate_to_width(name, 13.0, Font::Bold, 170.0),
            }),
            OrgMark::Logo { aspect } => {
                let height = geometry.header_height - 20.0;
                let width = (height * aspect).clamp(height * 0.5, 160.0);
                ops.push(DrawOp::Logo {
                    x: geometry.margin_x,
                    y: band_y + 10.0,
                    width,
                    height,
                });
            }
        }

        let title_size = 12.0;
        let title_width = text_width(&self.title, title_size, Font::Bold);
        ops.push(DrawOp::Text {
            x: (geometry.width - title_width) / 2.0,
            y: baseline,
            size: title_size,
            font: Font::Bold,
            color: BAND_TEXT,
            text: self.title.clone(),
        });

        let date_size = 9.0;
        ops.push(DrawOp::Text {
            x: geometry.width
                - geometry.margin_x
                - text_width(&self.generated_on, date_size, Font::Regular),
            y: baseline,
            size: date_size,
            font: Font::Regular,
            color: BAND_TEXT,
            text: self.generated_on.clone(),
        });

        ops
    }
}

/// Attribution, page counter and confidentiality line at the bottom of every page.
#[derive(Debug, Clone, PartialEq)]
pub struct FooterBand {
    pub attribution: String,
    pub notice: String,
}

impl FooterBand {
    pub fn draw(&self, geometry: &PageGeometry, page: usize, total: usize) -> Vec<DrawOp> {
        let top = geometry.footer_height;
        let counter = format!("Page {page} of {total}");
        let size = 8.0;
        vec![
            DrawOp::Line {
                from: (geometry.margin_x, top),
                to: (geometry.width - geometry.margin_x, top),
                width: 0.5,
                color: RULE,
            },
            DrawOp::Text {
                x: geometry.margin_x,
                y: top - 14.0,
                size,
                font: Font::Regular,
                color: MUTED_TEXT,
                text: self.attribution.clone(),
            },
            DrawOp::Text {
                x: geometry.width - geometry.margin_x - text_width(&counter, size, Font::Regular),
                y: top - 14.0,
                size,
                font: Font::Regular,
                color: MUTED_TEXT,
                text: counter,
            },
            DrawOp::Text {
                x: geometry.margin_x,
                y: top - 28.0,
                size: 7.0,
                font: Font::Regular,
                color: MUTED_TEXT,
                text: self.notice.clone(),
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub text: String,
    pub color: Rgb,
}

const LINE_HEIGHT: f32 = 13.0;
const ROW_PADDING: f32 = 5.0;
const LABEL_WIDTH: f32 = 150.0;
const BODY_SIZE: f32 = 9.5;

/// Stateful page builder. Owns the vertical cursor and is the only place that
/// starts pages and redraws the header band.
pub struct ReportBuilder {
    geometry: PageGeometry,
    header: HeaderBand,
    finished: Vec<LayoutPage>,
    current: LayoutPage,
    cursor: f32,
}

impl ReportBuilder {
    pub fn new(geometry: PageGeometry, header: HeaderBand) -> Self {
        let current = LayoutPage {
            number: 1,
            ops: header.draw(&geometry),
        };
        Self {
            cursor: geometry.content_top(),
            geometry,
            header,
            finished: Vec::new(),
            current,
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn page_count(&self) -> usize {
        self.finished.len() + 1
    }

    pub fn remaining(&self) -> f32 {
        self.cursor - self.geometry.bottom_margin
    }

    fn page_is_fresh(&self) -> bool {
        self.cursor >= self.geometry.content_top()
    }

    fn start_page(&mut self) {
        let next = LayoutPage {
            number: self.current.number + 1,
            ops: self.header.draw(&self.geometry),
        };
        let done = std::mem::replace(&mut self.current, next);
        self.finished.push(done);
        self.cursor = self.geometry.content_top();
    }

    /// Starts a new page when `height` does not fit above the bottom margin.
    /// Returns whether a page break happened.
    pub fn ensure_space(&mut self, height: f32) -> bool {
        if height <= self.remaining() || self.page_is_fresh() {
            return false;
        }
        self.start_page();
        true
    }

    pub fn add_spacing(&mut self, amount: f32) {
        self.cursor -= amount;
    }

    fn push(&mut self, op: DrawOp) {
        self.current.ops.push(op);
    }

    fn text(&mut self, x: f32, size: f32, font: Font, color: Rgb, text: impl Into<String>) {
        let y = self.cursor;
        self.push(DrawOp::Text {
            x,
            y,
            size,
            font,
            color,
            text: text.into(),
        });
    }

    /// Section heading with a rule underneath. Keeps at least one row with the
    /// heading so it never ends a page on its own.
    pub fn add_section(&mut self, title: &str) {
        self.ensure_space(30.0 + LINE_HEIGHT + ROW_PADDING);
        self.add_spacing(14.0);
        let x = self.geometry.margin_x;
        self.text(x, 13.0, Font::Bold, BAND_FILL, title);
        self.add_spacing(6.0);
        let y = self.cursor;
        let right = self.geometry.width - self.geometry.margin_x;
        self.push(DrawOp::Line {
            from: (x, y),
            to: (right, y),
            width: 0.8,
            color: BAND_FILL,
        });
        self.add_spacing(10.0 + LINE_HEIGHT - BODY_SIZE);
    }

    pub fn add_subsection(&mut self, title: &str) {
        self.ensure_space(18.0 + LINE_HEIGHT + ROW_PADDING);
        self.add_spacing(8.0);
        let x = self.geometry.margin_x;
        self.text(x, 10.5, Font::Bold, BODY_TEXT, title);
        self.add_spacing(LINE_HEIGHT + 2.0);
    }

    /// Label/value row; long values wrap under the value column.
    pub fn add_key_value(&mut self, label: &str, value: &str, color: Rgb) {
        let value_x = self.geometry.margin_x + LABEL_WIDTH;
        let value_width = self.geometry.content_width() - LABEL_WIDTH;
        let lines = wrap_text(value, BODY_SIZE, Font::Regular, value_width);
        let row_height = lines.len() as f32 * LINE_HEIGHT + ROW_PADDING;
        self.ensure_space(row_height.min(self.geometry.usable_height()));

        let label_x = self.geometry.margin_x;
        let label = truncate_to_width(label, BODY_SIZE, Font::Bold, LABEL_WIDTH - 8.0);
        self.text(label_x, BODY_SIZE, Font::Bold, MUTED_TEXT, label);
        for (index, line) in lines.into_iter().enumerate() {
            if index > 0 {
                self.add_spacing(LINE_HEIGHT);
                if self.ensure_space(LINE_HEIGHT) {
                    self.add_spacing(LINE_HEIGHT - BODY_SIZE);
                }
            }
            self.text(value_x, BODY_SIZE, Font::Regular, color, line);
        }
        self.add_spacing(LINE_HEIGHT + ROW_PADDING);
    }

    /// Coloured pill carrying a status label, preceded by its caption.
    pub fn add_status_pill(&mut self, caption: &str, label: &str, fill: Rgb) {
        let pill_height = 18.0;
        self.ensure_space(pill_height + ROW_PADDING * 2.0);
        let label_x = self.geometry.margin_x;
        self.text(label_x, BODY_SIZE, Font::Bold, MUTED_TEXT, caption);

        let pill_x = self.geometry.margin_x + LABEL_WIDTH;
        let pill_width = text_width(label, 10.0, Font::Bold) + 20.0;
        let y = self.cursor - 5.0;
        self.push(DrawOp::Rect {
            x: pill_x,
            y,
            width: pill_width,
            height: pill_height,
            color: fill,
        });
        self.push(DrawOp::Text {
            x: pill_x + 10.0,
            y: y + 5.0,
            size: 10.0,
            font: Font::Bold,
            color: BAND_TEXT,
            text: label.to_string(),
        });
        self.add_spacing(pill_height + ROW_PADDING * 2.0);
    }

    /// Table with a shaded header row. Space is checked before every row and
    /// the header row is repeated after a page break.
    pub fn add_table(&mut self, headers: &[&str], widths: &[f32], rows: &[Vec<TableCell>]) {
        let row_height = LINE_HEIGHT + ROW_PADDING * 2.0;
        self.ensure_space(row_height * 2.0);
        self.table_header(headers, widths, row_height);

        for row in rows {
            if self.ensure_space(row_height) {
                self.table_header(headers, widths, row_height);
            }
            let mut x = self.geometry.margin_x;
            let baseline = self.cursor - ROW_PADDING - BODY_SIZE + 2.0;
            for (cell, width) in row.iter().zip(column_widths(&self.geometry, widths)) {
                self.push(DrawOp::Text {
                    x: x + 6.0,
                    y: baseline,
                    size: BODY_SIZE,
                    font: Font::Regular,
                    color: cell.color,
                    text: truncate_to_width(&cell.text, BODY_SIZE, Font::Regular, width - 12.0),
                });
                x += width;
            }
            self.cursor -= row_height;
            let y = self.cursor;
            let (left, right) = (
                self.geometry.margin_x,
                self.geometry.width - self.geometry.margin_x,
            );
            self.push(DrawOp::Line {
                from: (left, y),
                to: (right, y),
                width: 0.4,
                color: RULE,
            });
        }
        self.add_spacing(ROW_PADDING);
    }

    fn table_header(&mut self, headers: &[&str], widths: &[f32], row_height: f32) {
        let top = self.cursor;
        self.push(DrawOp::Rect {
            x: self.geometry.margin_x,
            y: top - row_height,
            width: self.geometry.content_width(),
            height: row_height,
            color: TABLE_HEADER_FILL,
        });
        let baseline = top - ROW_PADDING - BODY_SIZE + 2.0;
        let mut x = self.geometry.margin_x;
        for (header, width) in headers.iter().zip(column_widths(&self.geometry, widths)) {
            self.push(DrawOp::Text {
                x: x + 6.0,
                y: baseline,
                size: BODY_SIZE,
                font: Font::Bold,
                color: BODY_TEXT,
                text: (*header).to_string(),
            });
            x += width;
        }
        self.cursor -= row_height;
    }

    /// Wrapped paragraph, checked line by line.
    pub fn add_paragraph(&mut self, text: &str, size: f32, color: Rgb) {
        let line_height = size + 3.5;
        let width = self.geometry.content_width();
        let x = self.geometry.margin_x;
        for line in wrap_text(text, size, Font::Regular, width) {
            self.ensure_space(line_height);
            self.text(x, size, Font::Regular, color, line);
            self.add_spacing(line_height);
        }
    }

    /// Closes the last page and stamps every footer now that the total is known.
    pub fn finish(self, footer: &FooterBand) -> ReportLayout {
        let mut pages = self.finished;
        pages.push(self.current);
        let total = pages.len();
        for page in &mut pages {
            let ops = footer.draw(&self.geometry, page.number, total);
            page.ops.extend(ops);
        }

        ReportLayout {
            geometry_width: self.geometry.width,
            geometry_height: self.geometry.height,
            pages,
        }
    }
}

fn column_widths(geometry: &PageGeometry, fractions: &[f32]) -> Vec<f32> {
    let total: f32 = fractions.iter().sum();
    let total = if total > 0.0 { total } else { 1.0 };
    fractions
        .iter()
        .map(|fraction| geometry.content_width() * fraction / total)
        .collect()
}

pub(crate) fn text_width(text: &str, size: f32, font: Font) -> f32 {
    text.chars().count() as f32 * size * font.average_advance()
}

fn truncate_to_width(text: &str, size: f32, font: Font, max_width: f32) -> String {
    if text_width(text, size, font) <= max_width {
        return text.to_string();
    }
    let max_chars = (max_width / (size * font.average_advance())).floor() as usize;
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// Greedy word wrap; words longer than a line are split.
pub(crate) fn wrap_text(text: &str, size: f32, font: Font, max_width: f32) -> Vec<String> {
    let max_chars = ((max_width / (size * font.average_advance())).floor() as usize).max(1);
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let word: String = word.into_iter().collect();
        let needed = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&word);
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}
