//! Family, style and weight metadata.

use write_fonts::types::NameId;

use crate::{
    cff::{Operand, Operator},
    model::FontModel,
    names::Platform,
};

/// Style labels with a legacy `macStyle` value; the value is the position.
const MAC_STYLE_LABELS: [&str; 4] = ["Regular", "Bold", "Italic", "Bold Italic"];

/// OS/2 fsSelection bits derived from the style label.
const FS_ITALIC: u16 = 1 << 0;
const FS_BOLD: u16 = 1 << 5;
const FS_REGULAR: u16 = 1 << 6;

/// Appended to unique identifiers: the year and tool the family was first built with.
const UNIQUE_ID_TAG: &str = "2023;FL820";

/// Every name a variant is known by, derived from a family name and a
/// style label such as `700Italic`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontNames {
    pub family: String,
    pub style: String,
    pub full_name: String,
    pub postscript_name: String,
}

impl FontNames {
    pub fn derive(family: &str, style: &str) -> Self {
        let style_no_space: String = style.split(' ').collect();
        FontNames {
            family: family.to_owned(),
            style: style.to_owned(),
            full_name: format!("{family} {style}"),
            postscript_name: format!("{family}-{style_no_space}"),
        }
    }

    /// `<version>;;<PostScript name>;2023;FL820`.
    pub fn unique_id(&self, version: &str) -> String {
        format!("{version};;{};{UNIQUE_ID_TAG}", self.postscript_name)
    }
}

/// The fsSelection italic and bold bits for a style label.
///
/// Only the label is looked at: `700Italic` is not bold.
pub fn style_selection_flags(style: &str) -> u16 {
    let mut flags = 0;
    if style.contains("Italic") {
        flags |= FS_ITALIC;
    }
    if style.contains("Bold") {
        flags |= FS_BOLD;
    }
    flags
}

/// The `macStyle` of one of the four canonical style labels.
pub fn mac_style_index(style: &str) -> Option<u16> {
    MAC_STYLE_LABELS
        .iter()
        .position(|label| *label == style)
        .map(|index| index as u16)
}

/// Write `names` and `weight` into every table that records them.
pub fn apply_names(font: &mut FontModel, names: &FontNames, weight: u16) {
    if let Some(table) = font.names.as_mut() {
        let version = table
            .get(Platform::Windows, NameId::VERSION_STRING)
            .or_else(|| table.get(Platform::Macintosh, NameId::VERSION_STRING))
            .unwrap_or_default()
            .to_owned();
        let unique_id = names.unique_id(&version);
        for platform in Platform::ALL {
            for (name_id, value) in [
                (NameId::FAMILY_NAME, &names.family),
                (NameId::SUBFAMILY_NAME, &names.style),
                (NameId::UNIQUE_ID, &unique_id),
                (NameId::FULL_NAME, &names.full_name),
                (NameId::POSTSCRIPT_NAME, &names.postscript_name),
                (NameId::TYPOGRAPHIC_FAMILY_NAME, &names.family),
                (NameId::TYPOGRAPHIC_SUBFAMILY_NAME, &names.style),
            ] {
                table.set(platform, name_id, value.as_str());
            }
        }
    }

    if let Some(cff) = font.cff.as_mut() {
        cff.name = names.postscript_name.clone();
        cff.set_top_dict_string(Operator::FamilyName, &names.family);
        cff.set_top_dict_string(Operator::FullName, &names.full_name);
        cff.set_top_dict_string(
            Operator::Weight,
            if weight == 700 { "Bold" } else { "Regular" },
        );
        cff.top_dict.set(Operator::IsFixedPitch, vec![Operand::Int(1)]);
        // a numeric id from the source would now name a different font
        cff.top_dict.remove(Operator::UniqueId);
    }

    if let Some(post) = font.post.as_mut() {
        post.is_fixed_pitch = 1;
    }

    if let Some(os2) = font.os2.as_mut() {
        os2.us_weight_class = weight;
        let kept = os2.fs_selection & !(FS_ITALIC | FS_BOLD | FS_REGULAR);
        os2.fs_selection = kept | style_selection_flags(&names.style);
    }

    if let Some(head) = font.head.as_mut() {
        match mac_style_index(&names.style) {
            Some(mac_style) => head.mac_style = mac_style,
            None => log::warn!(
                "Style '{}' has no macStyle value, keeping {:#06x}",
                names.style,
                head.mac_style
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing;

    #[test]
    fn derived_names() {
        let names = FontNames::derive("CommitMono", "700Italic");
        assert_eq!(names.family, "CommitMono");
        assert_eq!(names.full_name, "CommitMono 700Italic");
        assert_eq!(names.postscript_name, "CommitMono-700Italic");

        let names = FontNames::derive("CommitMono-Work", "Bold Italic");
        assert_eq!(names.full_name, "CommitMono-Work Bold Italic");
        assert_eq!(names.postscript_name, "CommitMono-Work-BoldItalic");
        assert_eq!(
            names.unique_id("Version 1.143"),
            "Version 1.143;;CommitMono-Work-BoldItalic;2023;FL820"
        );
    }

    #[test]
    fn style_flags_only_read_the_label() {
        assert_eq!(style_selection_flags("700Italic"), 1);
        assert_eq!(style_selection_flags("700Regular"), 0);
        assert_eq!(style_selection_flags("Bold"), 32);
        assert_eq!(style_selection_flags("Bold Italic"), 33);
    }

    #[test]
    fn mac_style_of_canonical_labels() {
        assert_eq!(mac_style_index("Regular"), Some(0));
        assert_eq!(mac_style_index("Bold"), Some(1));
        assert_eq!(mac_style_index("Italic"), Some(2));
        assert_eq!(mac_style_index("Bold Italic"), Some(3));
        assert_eq!(mac_style_index("700Italic"), None);
        assert_eq!(mac_style_index("bold"), None);
    }

    #[test]
    fn bold_italic_named_700() {
        let mut font = testing::source_model(700, true);
        let names = FontNames::derive("CommitMono", "700Italic");
        apply_names(&mut font, &names, 700);

        let table = font.names.as_ref().unwrap();
        for platform in Platform::ALL {
            let get = |name_id| table.get(platform, name_id).unwrap();
            assert_eq!(get(NameId::FAMILY_NAME), "CommitMono");
            assert_eq!(get(NameId::SUBFAMILY_NAME), "700Italic");
            assert_eq!(get(NameId::FULL_NAME), "CommitMono 700Italic");
            assert_eq!(get(NameId::POSTSCRIPT_NAME), "CommitMono-700Italic");
            assert_eq!(get(NameId::TYPOGRAPHIC_FAMILY_NAME), "CommitMono");
            assert_eq!(get(NameId::TYPOGRAPHIC_SUBFAMILY_NAME), "700Italic");
            assert_eq!(
                get(NameId::UNIQUE_ID),
                "Version 1.143;;CommitMono-700Italic;2023;FL820"
            );
            assert_eq!(get(NameId::VERSION_STRING), "Version 1.143");
        }

        let cff = font.cff.as_ref().unwrap();
        assert_eq!(cff.name, "CommitMono-700Italic");
        assert_eq!(cff.top_dict_string(Operator::FamilyName).unwrap(), "CommitMono");
        assert_eq!(
            cff.top_dict_string(Operator::FullName).unwrap(),
            "CommitMono 700Italic"
        );
        assert_eq!(cff.top_dict_string(Operator::Weight).unwrap(), "Bold");
        assert_eq!(cff.top_dict.get_int(Operator::IsFixedPitch), Some(1));
        assert_eq!(font.post.unwrap().is_fixed_pitch, 1);

        let os2 = font.os2.unwrap();
        assert_eq!(os2.us_weight_class, 700);
        assert_eq!(os2.fs_selection & FS_ITALIC, FS_ITALIC);
        // the label has no "Bold" in it
        assert_eq!(os2.fs_selection & FS_BOLD, 0);
        // not a canonical label, so the source value stays
        assert_eq!(font.head.unwrap().mac_style, 2);
    }

    #[test]
    fn regular_bit_is_cleared_and_weight_label_set() {
        let mut font = testing::source_model(450, false);
        assert_eq!(font.os2.unwrap().fs_selection, FS_REGULAR);
        apply_names(&mut font, &FontNames::derive("CommitMono", "450Regular"), 450);
        assert_eq!(font.os2.unwrap().fs_selection, 0);
        assert_eq!(font.os2.unwrap().us_weight_class, 450);
        let cff = font.cff.as_ref().unwrap();
        assert_eq!(cff.top_dict_string(Operator::Weight).unwrap(), "Regular");

        let mut font = testing::source_model(700, false);
        apply_names(&mut font, &FontNames::derive("CommitMono", "Bold"), 700);
        assert_eq!(font.head.unwrap().mac_style, 1);
        assert_eq!(font.os2.unwrap().fs_selection, FS_BOLD);
    }

    #[test]
    fn missing_tables_are_skipped() {
        let mut font = FontModel::default();
        apply_names(&mut font, &FontNames::derive("CommitMono", "400Regular"), 400);
        assert_eq!(font, FontModel::default());
    }
}
