//! Baking character variants into the default glyphs.

use std::mem;

use write_fonts::types::Tag;

use crate::{config::TagSelection, model::FontModel};

/// For every enabled tag, swap the outline of each glyph its substitutions
/// cover with the outline of the glyph it would be replaced by.
///
/// Applying the same selection twice restores the source outlines.
/// Advance widths and side bearings are left alone.
pub fn bake_alternates(font: &mut FontModel, alternates: &TagSelection) {
    let FontModel { glyphs, gsub, .. } = font;
    let Some(gsub) = gsub else {
        return;
    };
    for tag in alternates.enabled() {
        let tag = Tag::new_checked(tag.as_bytes()).unwrap_or_default();
        for feature in gsub.features_with_tag(tag) {
            for &id in &feature.lookups {
                let Some(lookup) = gsub.lookups.get(id) else {
                    log::warn!("Feature '{tag}' references missing lookup {}", id.to_u16());
                    continue;
                };
                let pairs = lookup.subtables().iter().flat_map(|sub| sub.pairs());
                for (from, to) in pairs {
                    let (from, to) = (from.to_u16() as usize, to.to_u16() as usize);
                    if from.max(to) >= glyphs.len() {
                        log::warn!(
                            "Feature '{tag}' substitutes glyph {from} with {to}, \
                             but the font has {} glyphs",
                            glyphs.len()
                        );
                        continue;
                    }
                    if from == to {
                        continue;
                    }
                    let outline = mem::take(&mut glyphs[from].outline);
                    glyphs[from].outline = mem::replace(&mut glyphs[to].outline, outline);
                }
            }
        }
    }
}
