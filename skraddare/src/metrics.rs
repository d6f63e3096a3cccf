//! Letter spacing and line height.
//!
//! Both adjustments touch several tables that cache the same value for
//! different consumers (the CFF Private DICT, `hmtx`, `hhea`, `OS/2` and
//! `head`); every copy is updated together.

use crate::model::FontModel;

/// The advance width every glyph of the family is designed on.
pub const REFERENCE_ADVANCE_WIDTH: f64 = 600.0;

/// Font units added to the advance per unit of letter spacing.
pub const LETTER_SPACING_SCALE: f64 = 10.0;

/// Font units the ascender and descender move per unit of line height.
pub const LINE_HEIGHT_SCALE: f64 = 500.0;

/// Widen (or narrow) every glyph by `spacing * LETTER_SPACING_SCALE` units,
/// keeping the outlines centred in the new advance.
///
/// A spacing of zero leaves the font untouched.
pub fn apply_letter_spacing(font: &mut FontModel, spacing: f64) {
    if spacing == 0.0 {
        return;
    }
    let delta = spacing * LETTER_SPACING_SCALE;
    let shift = delta / 2.0;
    let advance = round_u16(REFERENCE_ADVANCE_WIDTH + delta);
    log::debug!("Letter spacing {spacing}: advance {advance}, outlines shifted by {shift}");

    for glyph in &mut font.glyphs {
        glyph.outline.translate_x(shift);
        glyph.left_side_bearing = round_i16(glyph.left_side_bearing as f64 + shift);
        glyph.advance_width = advance;
    }
    if let Some(cff) = font.cff.as_mut() {
        cff.set_default_width(advance as f64);
        cff.shift_font_bbox_x(shift);
    }
    if let Some(head) = font.head.as_mut() {
        head.x_min = round_i16(head.x_min as f64 + shift);
        head.x_max = round_i16(head.x_max as f64 + shift);
    }
    if let Some(hhea) = font.hhea.as_mut() {
        hhea.advance_width_max = advance;
        hhea.min_left_side_bearing = round_i16(hhea.min_left_side_bearing as f64 + shift);
        // the advance grows by delta, the outline moves by half of it
        hhea.min_right_side_bearing = round_i16(hhea.min_right_side_bearing as f64 + shift);
        hhea.x_max_extent = round_i16(hhea.x_max_extent as f64 + shift);
    }
    if let Some(os2) = font.os2.as_mut() {
        os2.x_avg_char_width = i16::try_from(advance).unwrap_or(i16::MAX);
    }
}

/// Move the ascender up and the descender down by
/// `line_height * LINE_HEIGHT_SCALE - LINE_HEIGHT_SCALE` units each.
///
/// A line height of one leaves the font untouched.
pub fn apply_line_height(font: &mut FontModel, line_height: f64) {
    if line_height == 1.0 {
        return;
    }
    let offset = line_height * LINE_HEIGHT_SCALE - LINE_HEIGHT_SCALE;
    log::debug!("Line height {line_height}: vertical metrics offset by {offset}");

    if let Some(hhea) = font.hhea.as_mut() {
        hhea.ascender = round_i16(hhea.ascender as f64 + offset);
        hhea.descender = round_i16(hhea.descender as f64 - offset);
    }
    if let Some(os2) = font.os2.as_mut() {
        os2.s_typo_ascender = round_i16(os2.s_typo_ascender as f64 + offset);
        os2.s_typo_descender = round_i16(os2.s_typo_descender as f64 - offset);
        // usWinDescent is positive below the baseline
        os2.us_win_ascent = round_u16(os2.us_win_ascent as f64 + offset);
        os2.us_win_descent = round_u16(os2.us_win_descent as f64 + offset);
    }
}

// float to int casts saturate, which is the clamping we want
fn round_i16(value: f64) -> i16 {
    value.round() as i16
}

fn round_u16(value: f64) -> u16 {
    value.round() as u16
}
