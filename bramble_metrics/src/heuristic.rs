// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A deterministic fallback measurer.

use kurbo::Size;

use crate::{Font, FontWeight, MeasurementUnavailable, TextMeasurer};

/// Estimates text extents from per-glyph-class advances.
///
/// This is not a shaper: advances come from a small table of glyph classes
/// (narrow, wide, uppercase, digit, space, everything else) expressed in
/// ems, with a flat multiplier for bold. Lines wrap greedily at word
/// boundaries against the wrap limit; a single word wider than the limit is
/// broken mid-word rather than overflowing. The result is stable across
/// calls and platforms, which is what the renderer needs from a fallback —
/// plausible boxes, not typographic truth.
#[derive(Clone, Copy, Debug)]
pub struct HeuristicMeasurer {
    /// Line height as a multiple of the font size.
    pub line_height: f64,
}

impl Default for HeuristicMeasurer {
    fn default() -> Self {
        Self { line_height: 1.3 }
    }
}

/// Advance of one glyph in ems.
fn advance_em(c: char) -> f64 {
    match c {
        ' ' => 0.33,
        'i' | 'j' | 'l' | 't' | 'f' | 'r' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' => 0.30,
        'm' | 'w' | 'M' | 'W' | '@' => 0.85,
        '0'..='9' => 0.55,
        'A'..='Z' => 0.70,
        c if c.is_ascii() => 0.52,
        // Treat everything outside ASCII as a full-width glyph; a
        // conservative overestimate beats clipped CJK captions.
        _ => 1.0,
    }
}

impl HeuristicMeasurer {
    fn word_width(&self, word: &str, em: f64) -> f64 {
        word.chars().map(|c| advance_em(c) * em).sum()
    }
}

impl TextMeasurer for HeuristicMeasurer {
    fn measure(
        &self,
        font: &Font,
        text: &str,
        max_width: f64,
    ) -> Result<Size, MeasurementUnavailable> {
        if text.is_empty() {
            return Ok(Size::ZERO);
        }

        let mut em = font.size;
        if font.weight == FontWeight::Bold {
            em *= 1.05;
        }
        let space = 0.33 * em;

        let mut lines = 0_u32;
        let mut widest = 0.0_f64;
        let mut line_width = 0.0_f64;

        let flush = |line_width: &mut f64, lines: &mut u32, widest: &mut f64| {
            if *line_width > 0.0 {
                *widest = widest.max(*line_width);
                *lines += 1;
                *line_width = 0.0;
            }
        };

        for raw_line in text.split('\n') {
            for word in raw_line.split_whitespace() {
                let mut width = self.word_width(word, em);
                if width > max_width {
                    // Hard-break an overlong word into wrap-limit chunks.
                    flush(&mut line_width, &mut lines, &mut widest);
                    while width > max_width {
                        widest = widest.max(max_width);
                        lines += 1;
                        width -= max_width;
                    }
                    line_width = width;
                    continue;
                }

                let needed = if line_width > 0.0 {
                    line_width + space + width
                } else {
                    width
                };
                if needed > max_width {
                    flush(&mut line_width, &mut lines, &mut widest);
                    line_width = width;
                } else {
                    line_width = needed;
                }
            }
            flush(&mut line_width, &mut lines, &mut widest);
            // An explicit empty line still takes vertical space.
            if raw_line.is_empty() {
                lines += 1;
            }
        }

        Ok(Size::new(
            widest,
            f64::from(lines) * self.line_height * font.size,
        ))
    }
}
