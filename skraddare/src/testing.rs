//! Small CFF fonts built in memory for tests.
//!
//! The font has the shape of a Commit Mono source: a handful of glyphs with
//! one stylistic set (`ss01`), two character variants (`cv01`, `cv02`) and
//! an existing `calt` feature.

use write_fonts::{types::GlyphId16, types::NameId, types::Tag, FontBuilder};

use crate::{
    cff::{CffFont, Operand, Operator},
    codec,
    layout::{Coverage, FeatureRecord, GlyphRange, Gsub, LangSys, Lookup, ScriptRecord, Subtable},
    model::{FontModel, Glyph, HeadMetrics, HheaMetrics, Os2Metrics, Path, PathCommand, PostInfo},
    names::{NameTable, Platform},
};

pub const A: u16 = 1;
pub const A_SS01: u16 = 2;
pub const G: u16 = 3;
pub const G_CV01: u16 = 4;
pub const ZERO: u16 = 5;
pub const ZERO_CV02: u16 = 6;
pub const SPACE: u16 = 7;

const GLYPH_NAMES: [&str; 7] = ["a", "a.ss01", "g", "g.cv01", "zero", "zero.cv02", "space"];

pub const CALT_LOOKUP: u16 = 3;

fn line_glyph(points: &[(f64, f64)]) -> Path {
    let mut commands = Vec::new();
    for (i, &(x, y)) in points.iter().enumerate() {
        commands.push(match i {
            0 => PathCommand::MoveTo { x, y },
            _ => PathCommand::LineTo { x, y },
        });
    }
    commands.push(PathCommand::Close);
    Path::new(commands)
}

fn outlines() -> Vec<Path> {
    let mut zero = line_glyph(&[(100.0, 0.0), (500.0, 0.0), (500.0, 700.0), (100.0, 700.0)]);
    zero.commands.extend(
        line_glyph(&[(200.0, 100.0), (200.0, 600.0), (400.0, 600.0), (400.0, 100.0)]).commands,
    );
    vec![
        line_glyph(&[(50.0, 0.0), (550.0, 0.0), (550.0, 700.0), (50.0, 700.0)]),
        line_glyph(&[(100.0, 0.0), (500.0, 0.0), (500.0, 500.0), (100.0, 500.0)]),
        line_glyph(&[(100.0, 0.0), (500.0, 0.0), (300.0, 500.0)]),
        Path::new(vec![
            PathCommand::MoveTo { x: 100.0, y: 0.0 },
            PathCommand::CurveTo {
                x1: 100.0,
                y1: 300.0,
                x2: 300.0,
                y2: 500.0,
                x: 500.0,
                y: 500.0,
            },
            PathCommand::LineTo { x: 500.0, y: 0.0 },
            PathCommand::Close,
        ]),
        line_glyph(&[(150.0, -200.0), (450.0, -200.0), (450.0, 400.0)]),
        zero,
        line_glyph(&[(120.0, 0.0), (480.0, 0.0), (480.0, 700.0), (120.0, 700.0)]),
        Path::default(),
    ]
}

fn gids(ids: &[u16]) -> Vec<GlyphId16> {
    ids.iter().copied().map(GlyphId16::new).collect()
}

/// `calt`, `cv01`, `cv02` and `ss01`, registered on DFLT and latn.
pub fn gsub() -> Gsub {
    let mut gsub = Gsub::default();
    let ss01 = gsub.lookups.push(Lookup::single(vec![Subtable::new(
        Coverage::Format1(gids(&[A])),
        gids(&[A_SS01]),
    )]));
    let cv01 = gsub.lookups.push(Lookup::single(vec![Subtable::new(
        Coverage::Format1(gids(&[G])),
        gids(&[G_CV01]),
    )]));
    let cv02 = gsub.lookups.push(Lookup::single(vec![Subtable::new(
        Coverage::Format2(vec![GlyphRange::new(ZERO, ZERO)]),
        gids(&[ZERO_CV02]),
    )]));
    let calt = gsub.lookups.push(Lookup::single(vec![Subtable::new(
        Coverage::Format1(gids(&[SPACE])),
        gids(&[SPACE]),
    )]));
    assert_eq!(calt.to_u16(), CALT_LOOKUP);
    gsub.push_feature(FeatureRecord::new(Tag::new(b"calt"), vec![calt]));
    gsub.push_feature(FeatureRecord::new(Tag::new(b"cv01"), vec![cv01]));
    gsub.push_feature(FeatureRecord::new(Tag::new(b"cv02"), vec![cv02]));
    gsub.push_feature(FeatureRecord::new(Tag::new(b"ss01"), vec![ss01]));
    gsub.scripts = vec![
        ScriptRecord {
            tag: Tag::new(b"DFLT"),
            default_lang_sys: Some(LangSys::new(vec![0, 1, 2, 3])),
            lang_sys: Vec::new(),
        },
        ScriptRecord {
            tag: Tag::new(b"latn"),
            default_lang_sys: Some(LangSys::new(vec![0, 1, 2, 3])),
            lang_sys: vec![(Tag::new(b"TRK "), LangSys::new(vec![0, 3]))],
        },
    ];
    gsub
}

fn style(weight: u16, italic: bool) -> String {
    format!("{weight}{}", if italic { "Italic" } else { "Regular" })
}

/// The model a source font decodes to.
pub fn source_model(weight: u16, italic: bool) -> FontModel {
    let style = style(weight, italic);
    let glyphs = outlines()
        .into_iter()
        .map(|outline| {
            let x_min = outline
                .commands
                .iter()
                .filter_map(|command| match command {
                    PathCommand::MoveTo { x, .. } | PathCommand::LineTo { x, .. } => Some(*x),
                    PathCommand::CurveTo { x, x1, x2, .. } => Some(x.min(*x1).min(*x2)),
                    PathCommand::Close => None,
                })
                .fold(None, |min: Option<f64>, x| Some(min.map_or(x, |min| min.min(x))))
                .unwrap_or(0.0);
            Glyph {
                outline,
                advance_width: 600,
                left_side_bearing: x_min as i16,
            }
        })
        .collect();

    let mut names = NameTable::default();
    for platform in Platform::ALL {
        names.set(platform, NameId::FAMILY_NAME, "Commit Mono V143");
        names.set(platform, NameId::SUBFAMILY_NAME, "Regular");
        names.set(platform, NameId::UNIQUE_ID, "1.143;COMM;CommitMono");
        names.set(platform, NameId::FULL_NAME, format!("Commit Mono V143 {style}"));
        names.set(platform, NameId::VERSION_STRING, "Version 1.143");
        names.set(platform, NameId::POSTSCRIPT_NAME, format!("CommitMonoV143-{style}"));
    }

    let mut cff = CffFont::new(&format!("CommitMonoV143-{style}"), &GLYPH_NAMES);
    cff.set_top_dict_string(Operator::FullName, &format!("Commit Mono V143 {style}"));
    cff.set_top_dict_string(Operator::FamilyName, "Commit Mono V143");
    cff.set_top_dict_string(Operator::Weight, "Regular");
    cff.top_dict.set(
        Operator::FontBbox,
        [50, -200, 550, 700].map(Operand::Int).to_vec(),
    );
    cff.private_dict.set(
        Operator::BlueValues,
        [-10, 10, 500, 10].map(Operand::Int).to_vec(),
    );
    cff.private_dict
        .set(Operator::DefaultWidthX, vec![Operand::Int(600)]);
    cff.private_dict
        .set(Operator::NominalWidthX, vec![Operand::Int(0)]);

    FontModel {
        glyphs,
        gsub: Some(gsub()),
        head: Some(HeadMetrics {
            x_min: 50,
            y_min: -200,
            x_max: 550,
            y_max: 700,
            mac_style: if italic { 2 } else { 0 },
        }),
        hhea: Some(HheaMetrics {
            ascender: 1050,
            descender: -350,
            advance_width_max: 600,
            min_left_side_bearing: 0,
            min_right_side_bearing: 50,
            x_max_extent: 550,
        }),
        os2: Some(Os2Metrics {
            x_avg_char_width: 600,
            us_weight_class: weight,
            fs_selection: if italic { 1 } else { 64 },
            s_typo_ascender: 1050,
            s_typo_descender: -350,
            us_win_ascent: 1050,
            us_win_descent: 350,
        }),
        post: Some(PostInfo { is_fixed_pitch: 0 }),
        names: Some(names),
        cff: Some(cff),
    }
}

/// Big-endian table data.
#[derive(Default)]
struct Be(Vec<u8>);

impl Be {
    fn u16(mut self, value: u16) -> Self {
        self.0.extend(value.to_be_bytes());
        self
    }

    fn i16(self, value: i16) -> Self {
        self.u16(value as u16)
    }

    fn u32(mut self, value: u32) -> Self {
        self.0.extend(value.to_be_bytes());
        self
    }

    fn zeros(mut self, len: usize) -> Self {
        self.0.extend(std::iter::repeat(0).take(len));
        self
    }
}

pub fn maxp(num_glyphs: u16) -> Vec<u8> {
    Be::default().u32(0x0000_5000).u16(num_glyphs).0
}

fn head(metrics: &HeadMetrics) -> Vec<u8> {
    Be::default()
        .u32(0x0001_0000)
        .u32(0x0001_0000)
        .u32(0)
        .u32(0x5F0F_3CF5)
        .u16(3)
        .u16(1000)
        .zeros(16)
        .i16(metrics.x_min)
        .i16(metrics.y_min)
        .i16(metrics.x_max)
        .i16(metrics.y_max)
        .u16(metrics.mac_style)
        .u16(8)
        .i16(2)
        .i16(0)
        .i16(0)
        .0
}

fn hhea(metrics: &HheaMetrics, num_glyphs: u16) -> Vec<u8> {
    Be::default()
        .u32(0x0001_0000)
        .i16(metrics.ascender)
        .i16(metrics.descender)
        .i16(0)
        .u16(metrics.advance_width_max)
        .i16(metrics.min_left_side_bearing)
        .i16(metrics.min_right_side_bearing)
        .i16(metrics.x_max_extent)
        .i16(1)
        .i16(0)
        .i16(0)
        .zeros(8)
        .i16(0)
        .u16(num_glyphs)
        .0
}

fn hmtx(glyphs: &[Glyph]) -> Vec<u8> {
    glyphs
        .iter()
        .fold(Be::default(), |be, glyph| {
            be.u16(glyph.advance_width).i16(glyph.left_side_bearing)
        })
        .0
}

fn os2(metrics: &Os2Metrics) -> Vec<u8> {
    Be::default()
        .u16(4)
        .i16(metrics.x_avg_char_width)
        .u16(metrics.us_weight_class)
        .u16(5)
        .u16(0)
        // sub/superscript, strikeout, family class, panose, unicode ranges
        .zeros(22 + 10 + 16)
        .zeros(4)
        .u16(metrics.fs_selection)
        .u16(0x20)
        .u16(0x7A)
        .i16(metrics.s_typo_ascender)
        .i16(metrics.s_typo_descender)
        .i16(0)
        .u16(metrics.us_win_ascent)
        .u16(metrics.us_win_descent)
        .zeros(8)
        .i16(500)
        .i16(700)
        .u16(0)
        .u16(0x20)
        .u16(1)
        .0
}

fn post(info: &PostInfo) -> Vec<u8> {
    Be::default()
        .u32(0x0003_0000)
        .u32(0)
        .i16(-100)
        .i16(50)
        .u32(info.is_fixed_pitch)
        .zeros(16)
        .0
}

/// The tables the model doesn't carry, plus a signature that has to go.
pub fn skeleton(model: &FontModel) -> Vec<u8> {
    let num_glyphs = model.glyphs.len() as u16;
    let mut builder = FontBuilder::new();
    builder
        .add_raw(Tag::new(b"maxp"), maxp(num_glyphs))
        .add_raw(Tag::new(b"hmtx"), hmtx(&model.glyphs))
        .add_raw(Tag::new(b"DSIG"), Be::default().u32(1).u16(0).u16(0).0);
    if let Some(metrics) = &model.head {
        builder.add_raw(Tag::new(b"head"), head(metrics));
    }
    if let Some(metrics) = &model.hhea {
        builder.add_raw(Tag::new(b"hhea"), hhea(metrics, num_glyphs));
    }
    if let Some(metrics) = &model.os2 {
        builder.add_raw(Tag::new(b"OS/2"), os2(metrics));
    }
    if let Some(info) = &model.post {
        builder.add_raw(Tag::new(b"post"), post(info));
    }
    builder.build()
}

/// The bytes of a source font.
pub fn source_font(weight: u16, italic: bool) -> Vec<u8> {
    let model = source_model(weight, italic);
    codec::encode(&model, &skeleton(&model)).unwrap()
}

/// Glyph 1: `0 20 hstem hintmask 100.5 0 rmoveto` then local subr 0.
const HINTED_CHARSTRING: [u8; 15] = [
    139, 159, 1, 19, 0x80, 255, 0x00, 0x64, 0x80, 0x00, 139, 21, 32, 10, 14,
];
/// Glyph 2: `50 200 100 rmoveto` (a width of 50 over nominal) then global subr 0.
const GLOBAL_SUBR_CHARSTRING: [u8; 8] = [189, 247, 92, 239, 21, 32, 29, 14];
/// Glyph 3: `12.75 hmoveto 10 20 rlineto`.
const FRACTION_CHARSTRING: [u8; 10] = [255, 0x00, 0x0C, 0xC0, 0x00, 22, 149, 159, 5, 14];
/// `400 0 rlineto 0 500 rlineto return`
const LOCAL_SUBR: [u8; 9] = [248, 36, 139, 5, 139, 248, 136, 5, 11];
/// `0 100 50 50 100 0 rrcurveto return`
const GLOBAL_SUBR: [u8; 8] = [139, 239, 189, 189, 239, 139, 8, 11];

/// An INDEX with one byte offsets.
fn cff_index(items: &[&[u8]]) -> Vec<u8> {
    let mut out = Be::default().u16(items.len() as u16).0;
    if items.is_empty() {
        return out;
    }
    out.push(1);
    let mut offset = 1;
    out.push(offset);
    for item in items {
        offset += item.len() as u8;
        out.push(offset);
    }
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

fn offset_operand(value: usize, out: &mut Vec<u8>) {
    out.push(29);
    out.extend((value as i32).to_be_bytes());
}

/// A CFF table as a foreign tool writes it: subroutines, hints, a range
/// charset, a custom Encoding, a non-zero nominalWidthX and fractional
/// coordinates.
pub fn subroutinized_cff() -> Vec<u8> {
    let names = cff_index(&[b"CommitMonoV143-400Regular".as_slice()]);
    let strings = cff_index(&[b"a.hint".as_slice(), b"b.subr", b"c.frac"]);
    let global_subrs = cff_index(&[GLOBAL_SUBR.as_slice()]);
    let local_subrs = cff_index(&[LOCAL_SUBR.as_slice()]);
    // SIDs 391 to 393, as one range
    let charset = [2, 0x01, 0x87, 0x00, 0x02];
    let encoding = [0, 3, b'a', b'b', b'c'];
    let charstrings = cff_index(&[
        [14].as_slice(),
        &HINTED_CHARSTRING,
        &GLOBAL_SUBR_CHARSTRING,
        &FRACTION_CHARSTRING,
    ]);
    // 600 defaultWidthX 500 nominalWidthX 12 Subrs
    let mut private = vec![248, 236, 20, 248, 136, 21];
    offset_operand(12, &mut private);
    private.push(19);

    let top_dict = |charset_at, charstrings_at, private_at| {
        // 0 -200 600 700 FontBBox -9.5 ItalicAngle
        let mut dict = vec![139, 251, 92, 248, 236, 249, 80, 5, 30, 0xE9, 0xA5, 0xFF, 12, 2];
        offset_operand(charset_at, &mut dict);
        dict.push(15);
        offset_operand(charset_at + charset.len(), &mut dict);
        dict.push(16);
        offset_operand(charstrings_at, &mut dict);
        dict.push(17);
        offset_operand(private.len(), &mut dict);
        offset_operand(private_at, &mut dict);
        dict.push(18);
        cff_index(&[dict.as_slice()])
    };
    let charset_at =
        4 + names.len() + top_dict(0, 0, 0).len() + strings.len() + global_subrs.len();
    let charstrings_at = charset_at + charset.len() + encoding.len();
    let private_at = charstrings_at + charstrings.len();

    let mut out = vec![1, 0, 4, 1];
    out.extend(names);
    out.extend(top_dict(charset_at, charstrings_at, private_at));
    out.extend(strings);
    out.extend(global_subrs);
    out.extend(charset);
    out.extend(encoding);
    out.extend(charstrings);
    out.extend(private);
    out.extend(local_subrs);
    out
}

/// What the glyphs of [`subroutinized_font`] decode to.
pub fn subroutinized_glyphs() -> Vec<Glyph> {
    let glyph = |commands, advance_width, left_side_bearing| Glyph {
        outline: Path::new(commands),
        advance_width,
        left_side_bearing,
    };
    vec![
        glyph(Vec::new(), 600, 0),
        glyph(
            vec![
                PathCommand::MoveTo { x: 100.5, y: 0.0 },
                PathCommand::LineTo { x: 500.5, y: 0.0 },
                PathCommand::LineTo { x: 500.5, y: 500.0 },
                PathCommand::Close,
            ],
            600,
            100,
        ),
        glyph(
            vec![
                PathCommand::MoveTo { x: 200.0, y: 100.0 },
                PathCommand::CurveTo {
                    x1: 200.0,
                    y1: 200.0,
                    x2: 250.0,
                    y2: 250.0,
                    x: 350.0,
                    y: 250.0,
                },
                PathCommand::Close,
            ],
            550,
            200,
        ),
        glyph(
            vec![
                PathCommand::MoveTo { x: 12.75, y: 0.0 },
                PathCommand::LineTo { x: 22.75, y: 20.0 },
                PathCommand::Close,
            ],
            600,
            12,
        ),
    ]
}

/// A font around [`subroutinized_cff`], with no GSUB, OS/2, post or name.
pub fn subroutinized_font() -> Vec<u8> {
    let glyphs = subroutinized_glyphs();
    let metrics = source_model(400, false);
    let mut builder = FontBuilder::new();
    builder
        .add_raw(Tag::new(b"CFF "), subroutinized_cff())
        .add_raw(Tag::new(b"maxp"), maxp(glyphs.len() as u16))
        .add_raw(Tag::new(b"hmtx"), hmtx(&glyphs));
    if let (Some(head_metrics), Some(hhea_metrics)) = (&metrics.head, &metrics.hhea) {
        builder
            .add_raw(Tag::new(b"head"), head(head_metrics))
            .add_raw(Tag::new(b"hhea"), hhea(hhea_metrics, glyphs.len() as u16));
    }
    let mut bytes = builder.build();
    bytes[..4].copy_from_slice(b"OTTO");
    bytes
}
