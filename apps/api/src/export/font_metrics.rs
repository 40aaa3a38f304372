//! Static Helvetica metrics and the page geometry used for export.
//!
//! Widths are the standard Helvetica AFM advance widths divided by 1000, in em
//! units. The table covers ASCII 0x20..=0x7E; index = (char as usize) - 32.
//! Anything else measures as `AVERAGE_CHAR_WIDTH`.

// ────────────────────────────────────────────────────────────────────────────
// Page configuration
// ────────────────────────────────────────────────────────────────────────────

const PT_PER_MM: f32 = 72.0 / 25.4;

/// Geometry of an exported page.
#[derive(Debug, Clone)]
pub struct PageConfig {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    /// Applied on all four sides.
    pub margin_mm: f32,
    pub font_size_pt: f32,
    /// Baseline-to-baseline distance as a multiple of the font size.
    pub line_height: f32,
}

impl Default for PageConfig {
    /// A4, 20 mm margins, 11 pt text at 1.4 line height.
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 20.0,
            font_size_pt: 11.0,
            line_height: 1.4,
        }
    }
}

impl PageConfig {
    /// Usable text width in em units at the configured font size.
    pub fn text_width_em(&self) -> f32 {
        let width_mm = self.page_width_mm - 2.0 * self.margin_mm;
        width_mm * PT_PER_MM / self.font_size_pt
    }

    pub fn font_size_mm(&self) -> f32 {
        self.font_size_pt / PT_PER_MM
    }

    pub fn line_height_mm(&self) -> f32 {
        self.font_size_mm() * self.line_height
    }

    /// Number of text lines that fit between the top and bottom margins.
    pub fn lines_per_page(&self) -> usize {
        let usable_mm = self.page_height_mm - 2.0 * self.margin_mm;
        ((usable_mm / self.line_height_mm()).floor() as usize).max(1)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Width table
// ────────────────────────────────────────────────────────────────────────────

const AVERAGE_CHAR_WIDTH: f32 = 0.556;

#[rustfmt::skip]
static HELVETICA_WIDTHS: [f32; 95] = [
    // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
    0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
    // 0      1      2      3      4      5      6      7      8      9
    0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
    // :      ;      <      =      >      ?      @
    0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
    // A      B      C      D      E      F      G      H      I      J      K      L      M
    0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
    // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
    0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
    // [      \      ]      ^      _      `
    0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
    // a      b      c      d      e      f      g      h      i      j      k      l      m
    0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
    // n      o      p      q      r      s      t      u      v      w      x      y      z
    0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
    // {      |      }      ~
    0.334, 0.260, 0.334, 0.584,
];

/// Rendered width of a string in em units.
pub fn measure_str(s: &str) -> f32 {
    s.chars().map(char_width).sum()
}

fn char_width(c: char) -> f32 {
    let code = c as usize;
    if (32..=126).contains(&code) {
        HELVETICA_WIDTHS[code - 32]
    } else {
        AVERAGE_CHAR_WIDTH
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wrapping
// ────────────────────────────────────────────────────────────────────────────

/// Greedy word wrap of one paragraph. Words wider than a full line are split
/// at the character that would overflow.
pub fn wrap_paragraph(paragraph: &str, max_width_em: f32) -> Vec<String> {
    let space_w = char_width(' ');
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in paragraph.split_whitespace() {
        let word_w = measure_str(word);

        if word_w > max_width_em {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            for c in word.chars() {
                let w = char_width(c);
                if current_width + w > max_width_em && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                current.push(c);
                current_width += w;
            }
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_width = word_w;
        } else if current_width + space_w + word_w > max_width_em {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_width = word_w;
        } else {
            current.push(' ');
            current.push_str(word);
            current_width += space_w + word_w;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wraps a whole letter. Every source line is wrapped on its own; blank source
/// lines become empty output lines so paragraph spacing survives.
pub fn layout_lines(text: &str, config: &PageConfig) -> Vec<String> {
    let max_width = config.text_width_em();
    let mut out = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            out.push(String::new());
        } else {
            out.extend(wrap_paragraph(line, max_width));
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
