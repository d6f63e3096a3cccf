//! Turning font bytes into a [`FontModel`] and back.

use write_fonts::{
    from_obj::ToOwnedTable,
    read::{
        tables::{cff::Cff, compute_checksum, head::Head, os2::Os2, post::Post},
        FontRef, ReadError, TableProvider, TopLevelTable,
    },
    tables::{
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
    },
    types::{FWord, GlyphId, Tag, UfWord},
    FontBuilder,
};

use crate::{
    cff::CffFont,
    layout::Gsub,
    model::{FontModel, Glyph, HeadMetrics, HheaMetrics, Os2Metrics, Path, PostInfo},
    names::NameTable,
    Error,
};

/// The digital signature can't survive any edit.
const DSIG: Tag = Tag::new(b"DSIG");
const CFF_SFNT_VERSION: [u8; 4] = *b"OTTO";
const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;

/// Decode a CFF-flavoured OpenType font.
pub fn decode(data: &[u8]) -> Result<FontModel, Error> {
    let font = FontRef::new(data)?;
    if font.table_data(Cff::TAG).is_none() {
        return Err(Error::MissingTable(Cff::TAG));
    }
    let num_glyphs = font.maxp()?.num_glyphs() as usize;
    let (cff, outlines) = CffFont::read(&font.cff()?, num_glyphs)?;
    let glyphs = read_glyphs(&font, outlines)?;

    let head = optional(font.head())?.map(|head| HeadMetrics {
        x_min: head.x_min(),
        y_min: head.y_min(),
        x_max: head.x_max(),
        y_max: head.y_max(),
        mac_style: head.mac_style().bits(),
    });
    let hhea = optional(font.hhea())?.map(|hhea| HheaMetrics {
        ascender: hhea.ascender().to_i16(),
        descender: hhea.descender().to_i16(),
        advance_width_max: hhea.advance_width_max().to_u16(),
        min_left_side_bearing: hhea.min_left_side_bearing().to_i16(),
        min_right_side_bearing: hhea.min_right_side_bearing().to_i16(),
        x_max_extent: hhea.x_max_extent().to_i16(),
    });
    let os2 = optional(font.os2())?.map(|os2| Os2Metrics {
        x_avg_char_width: os2.x_avg_char_width(),
        us_weight_class: os2.us_weight_class(),
        fs_selection: os2.fs_selection().bits(),
        s_typo_ascender: os2.s_typo_ascender(),
        s_typo_descender: os2.s_typo_descender(),
        us_win_ascent: os2.us_win_ascent(),
        us_win_descent: os2.us_win_descent(),
    });
    let post = optional(font.post())?.map(|post| PostInfo {
        is_fixed_pitch: post.is_fixed_pitch(),
    });
    let names = optional(font.name())?.map(|name| NameTable::from_table(&name.to_owned_table()));
    let gsub = optional(font.gsub())?.map(|gsub| Gsub::from_table(&gsub.to_owned_table()));

    Ok(FontModel {
        glyphs,
        gsub,
        head,
        hhea,
        os2,
        post,
        names,
        cff: Some(cff),
    })
}

/// Encode `font`, taking every table it does not model from `source`.
pub fn encode(font: &FontModel, source: &[u8]) -> Result<Vec<u8>, Error> {
    let source = FontRef::new(source)?;
    let cff = font.cff.as_ref().ok_or(Error::MissingTable(Cff::TAG))?;

    let mut builder = FontBuilder::new();
    builder.add_raw(Cff::TAG, cff.compile(&font.glyphs)?);
    if let Some(metrics) = &font.hhea {
        let (hhea, hmtx) = horizontal_metrics(&source, metrics, &font.glyphs)?;
        builder.add_table(&hhea)?;
        builder.add_table(&hmtx)?;
    }
    if let Some(metrics) = &font.head {
        builder.add_raw(Head::TAG, patch_head(&source.head()?, metrics));
    }
    if let Some(metrics) = &font.os2 {
        builder.add_raw(Os2::TAG, patch_os2(&source.os2()?, metrics));
    }
    if let Some(info) = &font.post {
        builder.add_raw(Post::TAG, patch_post(&source.post()?, info));
    }
    if let Some(names) = &font.names {
        builder.add_table(&names.to_table())?;
    }
    if let Some(gsub) = &font.gsub {
        builder.add_table(&gsub.to_table())?;
    }

    for record in source.table_directory().table_records() {
        let tag = record.tag();
        if builder.contains(tag) {
            continue;
        }
        if tag == DSIG {
            log::info!("Dropping table {tag}");
            continue;
        }
        if let Some(data) = source.table_data(tag) {
            builder.add_raw(tag, data.as_bytes());
        }
    }

    let mut bytes = builder.build();
    bytes[..4].copy_from_slice(&CFF_SFNT_VERSION);
    update_checksum_adjustment(&mut bytes)?;
    Ok(bytes)
}

fn optional<T>(table: Result<T, ReadError>) -> Result<Option<T>, Error> {
    match table {
        Ok(table) => Ok(Some(table)),
        Err(ReadError::TableIsMissing(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn read_glyphs(font: &FontRef, outlines: Vec<Path>) -> Result<Vec<Glyph>, Error> {
    let hmtx = optional(font.hmtx())?;
    Ok(outlines
        .into_iter()
        .enumerate()
        .map(|(gid, outline)| {
            let gid = GlyphId::new(gid as u32);
            let (advance_width, left_side_bearing) = hmtx
                .as_ref()
                .map(|hmtx| {
                    (
                        hmtx.advance(gid).unwrap_or(0),
                        hmtx.side_bearing(gid).unwrap_or(0),
                    )
                })
                .unwrap_or_default();
            Glyph {
                outline,
                advance_width,
                left_side_bearing,
            }
        })
        .collect())
}

/// The number of long metrics needed once trailing equal advances are folded.
fn num_long_metrics(glyphs: &[Glyph]) -> usize {
    let mut count = glyphs.len();
    while count > 1 && glyphs[count - 1].advance_width == glyphs[count - 2].advance_width {
        count -= 1;
    }
    count
}

fn horizontal_metrics(
    source: &FontRef,
    metrics: &HheaMetrics,
    glyphs: &[Glyph],
) -> Result<(Hhea, Hmtx), Error> {
    let num_long = num_long_metrics(glyphs);
    let hmtx = Hmtx {
        h_metrics: glyphs[..num_long]
            .iter()
            .map(|glyph| LongMetric {
                advance: glyph.advance_width,
                side_bearing: glyph.left_side_bearing,
            })
            .collect(),
        left_side_bearings: glyphs[num_long..]
            .iter()
            .map(|glyph| glyph.left_side_bearing)
            .collect(),
    };

    let mut hhea: Hhea = source.hhea()?.to_owned_table();
    hhea.ascender = FWord::new(metrics.ascender);
    hhea.descender = FWord::new(metrics.descender);
    hhea.advance_width_max = UfWord::new(metrics.advance_width_max);
    hhea.min_left_side_bearing = FWord::new(metrics.min_left_side_bearing);
    hhea.min_right_side_bearing = FWord::new(metrics.min_right_side_bearing);
    hhea.x_max_extent = FWord::new(metrics.x_max_extent);
    hhea.number_of_h_metrics = num_long as u16;
    Ok((hhea, hmtx))
}

fn write_at<const N: usize>(out: &mut [u8], start: usize, bytes: [u8; N]) {
    if let Some(slot) = out.get_mut(start..start + N) {
        slot.copy_from_slice(&bytes);
    }
}

fn patch_head(head: &Head, metrics: &HeadMetrics) -> Vec<u8> {
    let mut out = head.offset_data().as_bytes().to_owned();
    // recomputed once the whole font is assembled
    write_at(&mut out, head.checksum_adjustment_byte_range().start, [0; 4]);
    write_at(&mut out, head.x_min_byte_range().start, metrics.x_min.to_be_bytes());
    write_at(&mut out, head.y_min_byte_range().start, metrics.y_min.to_be_bytes());
    write_at(&mut out, head.x_max_byte_range().start, metrics.x_max.to_be_bytes());
    write_at(&mut out, head.y_max_byte_range().start, metrics.y_max.to_be_bytes());
    write_at(&mut out, head.mac_style_byte_range().start, metrics.mac_style.to_be_bytes());
    out
}

fn patch_os2(os2: &Os2, metrics: &Os2Metrics) -> Vec<u8> {
    let mut out = os2.offset_data().as_bytes().to_owned();
    write_at(
        &mut out,
        os2.x_avg_char_width_byte_range().start,
        metrics.x_avg_char_width.to_be_bytes(),
    );
    write_at(
        &mut out,
        os2.us_weight_class_byte_range().start,
        metrics.us_weight_class.to_be_bytes(),
    );
    write_at(
        &mut out,
        os2.fs_selection_byte_range().start,
        metrics.fs_selection.to_be_bytes(),
    );
    write_at(
        &mut out,
        os2.s_typo_ascender_byte_range().start,
        metrics.s_typo_ascender.to_be_bytes(),
    );
    write_at(
        &mut out,
        os2.s_typo_descender_byte_range().start,
        metrics.s_typo_descender.to_be_bytes(),
    );
    write_at(
        &mut out,
        os2.us_win_ascent_byte_range().start,
        metrics.us_win_ascent.to_be_bytes(),
    );
    write_at(
        &mut out,
        os2.us_win_descent_byte_range().start,
        metrics.us_win_descent.to_be_bytes(),
    );
    out
}

fn patch_post(post: &Post, info: &PostInfo) -> Vec<u8> {
    let mut out = post.offset_data().as_bytes().to_owned();
    write_at(
        &mut out,
        post.is_fixed_pitch_byte_range().start,
        info.is_fixed_pitch.to_be_bytes(),
    );
    out
}

fn update_checksum_adjustment(bytes: &mut [u8]) -> Result<(), Error> {
    let head_offset = FontRef::new(bytes)?
        .table_directory()
        .table_records()
        .iter()
        .find(|record| record.tag() == Head::TAG)
        .map(|record| record.offset() as usize);
    let Some(head_offset) = head_offset else {
        return Ok(());
    };
    // checkSumAdjustment sits after version and fontRevision
    let field = head_offset + 8;
    write_at(bytes, field, [0; 4]);
    let adjustment = CHECKSUM_MAGIC.wrapping_sub(compute_checksum(bytes));
    write_at(bytes, field, adjustment.to_be_bytes());
    Ok(())
}
