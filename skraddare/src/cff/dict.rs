//! CFF DICT data.
//!
//! Tokenizing is done by read-fonts; this keeps the entries in order so
//! they can be edited and written back.
//! See "DICT Data" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=9>

use write_fonts::read::{
    tables::postscript::{
        dict::{self, BcdComponents, Token},
        Number,
    },
    types::Fixed,
};

use crate::Error;

pub use write_fonts::read::tables::postscript::dict::Operator;

/// Prefix for two-byte operators.
const ESCAPE: u8 = 12;

/// Reals with a magnitude below this are read scaled by 1000, for the
/// extra fraction bits.
const SMALL_REAL_LIMIT: f64 = 32.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operand {
    Int(i32),
    Real(f64),
}

impl Operand {
    pub fn to_f64(self) -> f64 {
        match self {
            Operand::Int(value) => value as f64,
            Operand::Real(value) => value,
        }
    }

    /// An integer if the value has no fractional part.
    pub fn from_f64(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() <= i32::MAX as f64 {
            Operand::Int(value as i32)
        } else {
            Operand::Real(value)
        }
    }

    fn from_token(number: Number, bcd: Option<BcdComponents>) -> Self {
        match (number, bcd) {
            (_, Some(bcd)) => Operand::Real(bcd_value(&bcd)),
            (Number::I32(value), None) => Operand::Int(value),
            (Number::Fixed(value), None) => Operand::Real(value.to_f64()),
        }
    }

    fn write(self, out: &mut Vec<u8>) {
        match self {
            Operand::Int(value) => write_int(value, out),
            Operand::Real(value) => write_real(value, out),
        }
    }
}

/// An ordered list of operator entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dict {
    entries: Vec<(Operator, Vec<Operand>)>,
}

impl Dict {
    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        let mut entries = Vec::new();
        let mut operands = Vec::new();
        for token in dict::tokens(data) {
            match token.map_err(|e| Error::Cff(format!("DICT: {e}")))? {
                Token::Operator(op) => entries.push((op, std::mem::take(&mut operands))),
                Token::Operand(number, bcd) => operands.push(Operand::from_token(number, bcd)),
            }
        }
        Ok(Dict { entries })
    }

    pub fn get(&self, op: Operator) -> Option<&[Operand]> {
        self.entries
            .iter()
            .find(|(entry_op, _)| *entry_op == op)
            .map(|(_, operands)| operands.as_slice())
    }

    /// The first operand of `op` as an integer.
    pub fn get_int(&self, op: Operator) -> Option<i32> {
        self.get(op)?.first().map(|value| value.to_f64() as i32)
    }

    /// Replace the operands of `op`, appending it if it is not present.
    pub fn set(&mut self, op: Operator, operands: Vec<Operand>) {
        match self.entries.iter_mut().find(|(entry_op, _)| *entry_op == op) {
            Some((_, existing)) => *existing = operands,
            None => self.entries.push((op, operands)),
        }
    }

    pub fn remove(&mut self, op: Operator) {
        self.entries.retain(|(entry_op, _)| *entry_op != op);
    }

    pub fn contains(&self, op: Operator) -> bool {
        self.get(op).is_some()
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        for (op, operands) in &self.entries {
            for operand in operands {
                operand.write(out);
            }
            write_operator(*op, out);
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write(&mut out);
        out
    }
}

/// The shortest decimal that a 16.16 reader sees as the same value.
fn bcd_value(bcd: &BcdComponents) -> f64 {
    let plain = bcd.value(false);
    let (fixed, scale) = if plain.to_f64().abs() < SMALL_REAL_LIMIT {
        (bcd.value(true), 1000.0)
    } else {
        (plain, 1.0)
    };
    let exact = fixed.to_f64() / scale;
    (0..=12)
        .map(|digits| {
            let factor = 10f64.powi(digits);
            (exact * factor).round() / factor
        })
        .find(|candidate| Fixed::from_f64(candidate * scale) == fixed)
        .unwrap_or(exact)
}

pub(crate) fn write_operator(op: Operator, out: &mut Vec<u8>) {
    let code = opcode(op);
    if code >> 8 == ESCAPE as u16 {
        out.push(ESCAPE);
    }
    out.push(code as u8);
}

const fn escaped(op: u8) -> u16 {
    ((ESCAPE as u16) << 8) | op as u16
}

fn opcode(op: Operator) -> u16 {
    use Operator::*;
    match op {
        Version => 0,
        Notice => 1,
        FullName => 2,
        FamilyName => 3,
        Weight => 4,
        FontBbox => 5,
        BlueValues => 6,
        OtherBlues => 7,
        FamilyBlues => 8,
        FamilyOtherBlues => 9,
        StdHw => 10,
        StdVw => 11,
        UniqueId => 13,
        Xuid => 14,
        Charset => 15,
        Encoding => 16,
        CharstringsOffset => 17,
        PrivateDictRange => 18,
        SubrsOffset => 19,
        DefaultWidthX => 20,
        NominalWidthX => 21,
        VariationStoreIndex => 22,
        Blend => 23,
        VariationStoreOffset => 24,
        Copyright => escaped(0),
        IsFixedPitch => escaped(1),
        ItalicAngle => escaped(2),
        UnderlinePosition => escaped(3),
        UnderlineThickness => escaped(4),
        PaintType => escaped(5),
        CharstringType => escaped(6),
        FontMatrix => escaped(7),
        StrokeWidth => escaped(8),
        BlueScale => escaped(9),
        BlueShift => escaped(10),
        BlueFuzz => escaped(11),
        StemSnapH => escaped(12),
        StemSnapV => escaped(13),
        ForceBold => escaped(14),
        LanguageGroup => escaped(17),
        ExpansionFactor => escaped(18),
        InitialRandomSeed => escaped(19),
        SyntheticBase => escaped(20),
        PostScript => escaped(21),
        BaseFontName => escaped(22),
        BaseFontBlend => escaped(23),
        Ros => escaped(30),
        CidFontVersion => escaped(31),
        CidFontRevision => escaped(32),
        CidFontType => escaped(33),
        CidCount => escaped(34),
        UidBase => escaped(35),
        FdArrayOffset => escaped(36),
        FdSelectOffset => escaped(37),
        FontName => escaped(38),
    }
}

/// Write `value` in the five byte form, so its size doesn't depend on it.
pub(crate) fn write_fixed_width_int(value: i32, out: &mut Vec<u8>) {
    out.push(29);
    out.extend(value.to_be_bytes());
}

fn write_int(value: i32, out: &mut Vec<u8>) {
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
        -32768..=32767 => {
            out.push(28);
            out.extend((value as i16).to_be_bytes());
        }
        _ => write_fixed_width_int(value, out),
    }
}

fn write_real(value: f64, out: &mut Vec<u8>) {
    // f64's Display never uses exponent notation
    let text = if value.is_finite() {
        value.to_string()
    } else {
        "0".to_string()
    };
    let mut nibbles: Vec<u8> = text
        .bytes()
        .map(|byte| match byte {
            b'.' => 0xA,
            b'-' => 0xE,
            digit => digit - b'0',
        })
        .collect();
    nibbles.push(0xF);
    if nibbles.len() % 2 == 1 {
        nibbles.push(0xF);
    }
    out.push(30);
    out.extend(nibbles.chunks(2).map(|pair| (pair[0] << 4) | pair[1]));
}
