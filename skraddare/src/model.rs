//! The decoded, mutable view of one font.

use write_fonts::read::{tables::postscript::charstring::CommandSink, types::Fixed};

use crate::{cff::CffFont, layout::Gsub, names::NameTable};

/// A font held in memory for the length of one transformation run.
///
/// Optional tables are `None` when the source font does not carry them;
/// every transform skips whatever is absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FontModel {
    /// Indexed by glyph id. The pipeline never adds or removes glyphs.
    pub glyphs: Vec<Glyph>,
    pub gsub: Option<Gsub>,
    pub head: Option<HeadMetrics>,
    pub hhea: Option<HheaMetrics>,
    pub os2: Option<Os2Metrics>,
    pub post: Option<PostInfo>,
    pub names: Option<NameTable>,
    pub cff: Option<CffFont>,
}

impl FontModel {
    pub fn num_glyphs(&self) -> usize {
        self.glyphs.len()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Glyph {
    pub outline: Path,
    pub advance_width: u16,
    pub left_side_bearing: i16,
}

/// The fields of `head` the pipeline reads or writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeadMetrics {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: u16,
}

/// The fields of `hhea` the pipeline reads or writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HheaMetrics {
    pub ascender: i16,
    pub descender: i16,
    pub advance_width_max: u16,
    pub min_left_side_bearing: i16,
    pub min_right_side_bearing: i16,
    pub x_max_extent: i16,
}

/// The fields of `OS/2` the pipeline reads or writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Os2Metrics {
    pub x_avg_char_width: i16,
    pub us_weight_class: u16,
    pub fs_selection: u16,
    pub s_typo_ascender: i16,
    pub s_typo_descender: i16,
    pub us_win_ascent: u16,
    pub us_win_descent: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PostInfo {
    pub is_fixed_pitch: u32,
}

/// One outline command, in absolute font units.
///
/// Coordinates hold any 16.16 value exactly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo {
        x: f64,
        y: f64,
    },
    LineTo {
        x: f64,
        y: f64,
    },
    CurveTo {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    },
    Close,
}

/// A glyph outline.
///
/// Collects commands as a charstring [`CommandSink`], so a glyph can be
/// evaluated straight into it. Hints are dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    pub commands: Vec<PathCommand>,
}

impl Path {
    pub fn new(commands: Vec<PathCommand>) -> Self {
        Path { commands }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Shift every x coordinate, control points included.
    pub fn translate_x(&mut self, dx: f64) {
        for command in &mut self.commands {
            match command {
                PathCommand::MoveTo { x, .. } | PathCommand::LineTo { x, .. } => *x += dx,
                PathCommand::CurveTo { x1, x2, x, .. } => {
                    *x1 += dx;
                    *x2 += dx;
                    *x += dx;
                }
                PathCommand::Close => (),
            }
        }
    }
}

impl CommandSink for Path {
    fn move_to(&mut self, x: Fixed, y: Fixed) {
        self.commands.push(PathCommand::MoveTo {
            x: x.to_f64(),
            y: y.to_f64(),
        });
    }

    fn line_to(&mut self, x: Fixed, y: Fixed) {
        self.commands.push(PathCommand::LineTo {
            x: x.to_f64(),
            y: y.to_f64(),
        });
    }

    fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed) {
        self.commands.push(PathCommand::CurveTo {
            x1: cx0.to_f64(),
            y1: cy0.to_f64(),
            x2: cx1.to_f64(),
            y2: cy1.to_f64(),
            x: x.to_f64(),
            y: y.to_f64(),
        });
    }

    fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }
}
