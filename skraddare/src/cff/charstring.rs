//! Type 2 charstring encoding.
//!
//! Outlines are written with absolute-to-relative conversion only; no hints
//! and no subroutines.

use crate::model::{Path, PathCommand};

const RLINETO: u8 = 5;
const RRCURVETO: u8 = 8;
const ENDCHAR: u8 = 14;
const RMOVETO: u8 = 21;

/// Encode `path` as a charstring.
///
/// `width` is the advance width operand, already made relative to
/// nominalWidthX, or `None` when the glyph uses defaultWidthX.
pub(crate) fn encode(path: &Path, width: Option<f64>) -> Vec<u8> {
    let mut writer = CharstringWriter {
        out: Vec::new(),
        width,
        x: 0.0,
        y: 0.0,
    };
    for command in &path.commands {
        match *command {
            PathCommand::MoveTo { x, y } => {
                let (dx, dy) = writer.delta(x, y);
                writer.operator(&[dx, dy], RMOVETO);
            }
            PathCommand::LineTo { x, y } => {
                let (dx, dy) = writer.delta(x, y);
                writer.operator(&[dx, dy], RLINETO);
            }
            PathCommand::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                let (dx1, dy1) = writer.delta(x1, y1);
                let (dx2, dy2) = writer.delta(x2, y2);
                let (dx3, dy3) = writer.delta(x, y);
                writer.operator(&[dx1, dy1, dx2, dy2, dx3, dy3], RRCURVETO);
            }
            // contours close implicitly
            PathCommand::Close => (),
        }
    }
    writer.operator(&[], ENDCHAR);
    writer.out
}

struct CharstringWriter {
    out: Vec<u8>,
    width: Option<f64>,
    x: f64,
    y: f64,
}

impl CharstringWriter {
    /// The offset from the current point, rounded to what the encoding can
    /// represent, so that rounding error does not accumulate.
    fn delta(&mut self, x: f64, y: f64) -> (f64, f64) {
        let dx = quantize(x - self.x);
        let dy = quantize(y - self.y);
        self.x += dx;
        self.y += dy;
        (dx, dy)
    }

    fn operator(&mut self, operands: &[f64], op: u8) {
        // the width goes before the first stack clearing operator
        if let Some(width) = self.width.take() {
            write_number(width, &mut self.out);
        }
        for operand in operands {
            write_number(*operand, &mut self.out);
        }
        self.out.push(op);
    }
}

fn quantize(value: f64) -> f64 {
    (value * 65536.0).round() / 65536.0
}

fn write_number(value: f64, out: &mut Vec<u8>) {
    if value.fract() != 0.0 || !(-32768.0..=32767.0).contains(&value) {
        let fixed = (value * 65536.0).round() as i32;
        out.push(255);
        out.extend(fixed.to_be_bytes());
        return;
    }
    let value = value as i32;
    match value {
        -107..=107 => out.push((value + 139) as u8),
        108..=1131 => {
            let value = value - 108;
            out.extend([(value / 256 + 247) as u8, (value % 256) as u8]);
        }
        -1131..=-108 => {
            let value = -value - 108;
            out.extend([(value / 256 + 251) as u8, (value % 256) as u8]);
        }
        _ => {
            out.push(28);
            out.extend((value as i16).to_be_bytes());
        }
    }
}
