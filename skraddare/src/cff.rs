//! The CFF table.
//!
//! Only the parts the pipeline edits are kept: the Top and Private DICTs,
//! the String INDEX and the charset. Charstrings are evaluated into
//! [`Path`]s on read, and on output the table is rebuilt around fresh
//! charstrings.

mod charstring;
mod dict;
mod index;

use write_fonts::read::tables::{
    cff::Cff,
    postscript::{charstring as evaluator, Index},
};

use crate::{
    model::{Glyph, Path},
    Error,
};

pub use dict::{Dict, Operand, Operator};

/// Strings with an id below this are predefined by the CFF format.
const STANDARD_STRING_COUNT: usize = 391;

/// The editable parts of a (non CID-keyed) CFF font.
#[derive(Clone, Debug, PartialEq)]
pub struct CffFont {
    /// The PostScript name stored in the Name INDEX.
    pub name: String,
    /// Offsets (charset, CharStrings, Private) and Encoding are not kept
    /// here; they are regenerated on compile.
    pub top_dict: Dict,
    /// Without Subrs, since outlines are written without subroutines.
    pub private_dict: Dict,
    strings: Vec<Vec<u8>>,
    /// String ids of the names of glyphs 1.., `.notdef` being implicit.
    charset: Vec<u16>,
}

impl CffFont {
    /// A font with no strings other than the glyph names.
    ///
    /// `glyph_names` starts at glyph 1.
    pub fn new(name: &str, glyph_names: &[&str]) -> Self {
        let mut font = CffFont {
            name: name.to_owned(),
            top_dict: Dict::default(),
            private_dict: Dict::default(),
            strings: Vec::new(),
            charset: Vec::new(),
        };
        let charset = glyph_names
            .iter()
            .map(|glyph_name| font.add_string(glyph_name))
            .collect();
        font.charset = charset;
        font
    }

    /// Read the font and the outline of each of its `num_glyphs` glyphs.
    pub(crate) fn read(cff: &Cff, num_glyphs: usize) -> Result<(Self, Vec<Path>), Error> {
        let name = cff
            .names()
            .get(0)
            .map(latin1_to_string)
            .map_err(|e| Error::Cff(format!("name index: {e}")))?;
        let top_dict = cff
            .top_dicts()
            .get(0)
            .map_err(|e| Error::Cff(format!("top dict index: {e}")))?;
        let mut top_dict = Dict::parse(top_dict)?;
        if top_dict.contains(Operator::Ros) {
            return Err(Error::Cff("CID-keyed fonts are not supported".into()));
        }

        let string_index = cff.strings();
        let strings = (0..string_index.count() as usize)
            .map(|i| string_index.get(i).map(<[u8]>::to_vec))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Error::Cff(format!("string index: {e}")))?;

        let data = cff.offset_data();
        let data = data.as_bytes();
        let (mut private_dict, private_start) = match top_dict.get(Operator::PrivateDictRange) {
            Some([size, offset]) => {
                let start = offset.to_f64() as usize;
                let end = start + size.to_f64() as usize;
                let bytes = data
                    .get(start..end)
                    .ok_or_else(|| Error::Cff("private dict out of bounds".into()))?;
                (Dict::parse(bytes)?, start)
            }
            _ => (Dict::default(), 0),
        };

        let charset = read_charset(cff, num_glyphs)?;
        let outlines = read_outlines(cff, &top_dict, &private_dict, private_start, num_glyphs)?;

        for op in [
            Operator::Charset,
            Operator::Encoding,
            Operator::CharstringsOffset,
            Operator::PrivateDictRange,
        ] {
            top_dict.remove(op);
        }
        private_dict.remove(Operator::SubrsOffset);

        let font = CffFont {
            name,
            top_dict,
            private_dict,
            strings,
            charset,
        };
        Ok((font, outlines))
    }

    /// Look up a non-standard string.
    pub fn string(&self, sid: u16) -> Option<String> {
        let index = (sid as usize).checked_sub(STANDARD_STRING_COUNT)?;
        self.strings.get(index).map(|bytes| latin1_to_string(bytes))
    }

    /// The string a Top DICT operator (such as FamilyName) points to.
    pub fn top_dict_string(&self, op: Operator) -> Option<String> {
        let sid = self.top_dict.get_int(op)?;
        self.string(u16::try_from(sid).ok()?)
    }

    /// Point a Top DICT operator at `value`, adding it to the strings if needed.
    pub fn set_top_dict_string(&mut self, op: Operator, value: &str) {
        let sid = self.add_string(value);
        self.top_dict.set(op, vec![Operand::Int(sid as i32)]);
    }

    pub fn default_width(&self) -> f64 {
        self.private_width(Operator::DefaultWidthX)
    }

    pub fn nominal_width(&self) -> f64 {
        self.private_width(Operator::NominalWidthX)
    }

    pub fn set_default_width(&mut self, width: f64) {
        self.private_dict
            .set(Operator::DefaultWidthX, vec![Operand::from_f64(width)]);
    }

    /// Move the horizontal edges of FontBBox.
    pub fn shift_font_bbox_x(&mut self, dx: f64) {
        if let Some([x_min, y_min, x_max, y_max]) = self.top_dict.get(Operator::FontBbox) {
            let bbox = vec![
                Operand::from_f64(x_min.to_f64() + dx),
                *y_min,
                Operand::from_f64(x_max.to_f64() + dx),
                *y_max,
            ];
            self.top_dict.set(Operator::FontBbox, bbox);
        }
    }

    fn private_width(&self, op: Operator) -> f64 {
        self.private_dict
            .get(op)
            .and_then(|operands| operands.first())
            .map(|value| value.to_f64())
            .unwrap_or(0.0)
    }

    fn add_string(&mut self, value: &str) -> u16 {
        let bytes: Vec<u8> = value
            .chars()
            .map(|c| u8::try_from(c as u32).unwrap_or(b'?'))
            .collect();
        let index = match self.strings.iter().position(|s| *s == bytes) {
            Some(index) => index,
            None => {
                self.strings.push(bytes);
                self.strings.len() - 1
            }
        };
        (STANDARD_STRING_COUNT + index) as u16
    }

    /// Build the table, with one charstring per glyph.
    pub(crate) fn compile(&self, glyphs: &[Glyph]) -> Result<Vec<u8>, Error> {
        if glyphs.len() != self.charset.len() + 1 {
            return Err(Error::Cff(format!(
                "{} glyphs but {} charset entries",
                glyphs.len(),
                self.charset.len()
            )));
        }
        let default_width = self.default_width();
        let nominal_width = self.nominal_width();
        let charstrings: Vec<Vec<u8>> = glyphs
            .iter()
            .map(|glyph| {
                let width = glyph.advance_width as f64;
                let width = (width != default_width).then_some(width - nominal_width);
                charstring::encode(&glyph.outline, width)
            })
            .collect();

        let private_dict = self.private_dict.to_bytes();
        let mut charset = vec![0u8];
        for sid in &self.charset {
            charset.extend(sid.to_be_bytes());
        }

        // offsets are written at a fixed width, so the top dict size is
        // known before the offsets are
        let name_index = [self.name.as_bytes()];
        let header_len = 4;
        let top_dict_len = index::index_len(&[self.top_dict_bytes(0, 0, 0, 0)]);
        let charset_offset = header_len
            + index::index_len(&name_index)
            + top_dict_len
            + index::index_len(&self.strings)
            + index::index_len::<&[u8]>(&[]);
        let charstrings_offset = charset_offset + charset.len();
        let private_offset = charstrings_offset + index::index_len(&charstrings);

        let top_dict = self.top_dict_bytes(
            charset_offset,
            charstrings_offset,
            private_dict.len(),
            private_offset,
        );
        // major, minor, header size, absolute offset size
        let mut out = vec![1, 0, header_len as u8, 4];
        index::write_index(&name_index, &mut out);
        index::write_index(&[top_dict], &mut out);
        index::write_index(&self.strings, &mut out);
        index::write_index::<&[u8]>(&[], &mut out);
        debug_assert_eq!(out.len(), charset_offset);
        out.extend(charset);
        index::write_index(&charstrings, &mut out);
        out.extend(private_dict);
        Ok(out)
    }

    fn top_dict_bytes(
        &self,
        charset: usize,
        charstrings: usize,
        private_len: usize,
        private: usize,
    ) -> Vec<u8> {
        let mut out = self.top_dict.to_bytes();
        dict::write_fixed_width_int(charset as i32, &mut out);
        dict::write_operator(Operator::Charset, &mut out);
        dict::write_fixed_width_int(charstrings as i32, &mut out);
        dict::write_operator(Operator::CharstringsOffset, &mut out);
        dict::write_fixed_width_int(private_len as i32, &mut out);
        dict::write_fixed_width_int(private as i32, &mut out);
        dict::write_operator(Operator::PrivateDictRange, &mut out);
        out
    }
}

fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| *b as char).collect()
}

/// The glyph name string ids of glyphs 1..num_glyphs.
fn read_charset(cff: &Cff, num_glyphs: usize) -> Result<Vec<u16>, Error> {
    let wanted = num_glyphs.saturating_sub(1);
    let sids: Vec<u16> = match cff
        .charset(0)
        .map_err(|e| Error::Cff(format!("charset: {e}")))?
    {
        Some(charset) => charset
            .iter()
            .skip(1)
            .map(|(_, sid)| sid.to_u16())
            .collect(),
        // no charset entry means ISOAdobe, where string id equals glyph id
        None => (1..=wanted as u16).collect(),
    };
    if sids.len() != wanted {
        return Err(Error::Cff(format!(
            "charset names {} glyphs, expected {wanted}",
            sids.len()
        )));
    }
    Ok(sids)
}

/// Evaluate every charstring, subroutines and hints included, keeping
/// coordinates at full 16.16 precision.
fn read_outlines(
    cff: &Cff,
    top_dict: &Dict,
    private_dict: &Dict,
    private_start: usize,
    num_glyphs: usize,
) -> Result<Vec<Path>, Error> {
    let data = cff.offset_data();
    let data = data.as_bytes();
    let index_at = |offset: usize, what: &'static str| {
        Index::new(data.get(offset..).unwrap_or_default(), false)
            .map_err(|e| Error::Cff(format!("{what}: {e}")))
    };
    let charstrings_offset = top_dict
        .get_int(Operator::CharstringsOffset)
        .ok_or_else(|| Error::Cff("no CharStrings".into()))?;
    let charstrings = index_at(charstrings_offset as usize, "charstrings")?;
    if charstrings.count() as usize != num_glyphs {
        return Err(Error::Cff(format!(
            "{} charstrings for {num_glyphs} glyphs",
            charstrings.count()
        )));
    }
    let global_subrs: Index = cff.global_subrs().into();
    // relative to the start of the Private DICT
    let subrs = private_dict
        .get_int(Operator::SubrsOffset)
        .map(|offset| index_at(private_start + offset as usize, "local subrs"))
        .transpose()?;

    let subrs = subrs.unwrap_or_default();
    let context = (data, &charstrings, &global_subrs, &subrs);

    (0..num_glyphs)
        .map(|gid| {
            let outline_error = |reason: String| Error::Outline {
                glyph: gid as u32,
                reason,
            };
            let charstring = charstrings
                .get(gid)
                .map_err(|e| outline_error(e.to_string()))?;
            let mut path = Path::default();
            evaluator::evaluate(&context, None, charstring, &mut path)
            .map_err(|e| outline_error(e.to_string()))?;
            Ok(path)
        })
        .collect()
}
