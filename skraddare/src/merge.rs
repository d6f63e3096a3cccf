//! Folding stylistic sets into an always-on feature.

use write_fonts::types::Tag;

use crate::{
    config::TagSelection,
    layout::{FeatureRecord, LookupId},
    model::FontModel,
};

/// The tag of the synthetic feature; shapers apply it by default.
pub const CONTEXTUAL_ALTERNATES: Tag = Tag::new(b"calt");

/// Append a `calt` feature replaying the lookups of every enabled stylistic
/// set, and enable it on the default language system of every script.
///
/// Lookups are collected in vocabulary order of the enabled tags, then in
/// the order each source feature lists them; a lookup shared by two sets is
/// only listed once. Existing features, including any existing `calt`, are
/// left as they are. With nothing enabled the new feature is empty.
pub fn merge_features_into_calt(font: &mut FontModel, features: &TagSelection) {
    let Some(gsub) = font.gsub.as_mut() else {
        return;
    };
    let mut lookups: Vec<LookupId> = Vec::new();
    for tag in features.enabled() {
        let tag = Tag::new_checked(tag.as_bytes()).unwrap_or_default();
        for feature in gsub.features_with_tag(tag) {
            for &id in &feature.lookups {
                if gsub.lookups.get(id).is_none() {
                    log::warn!("Feature '{tag}' references missing lookup {}", id.to_u16());
                    continue;
                }
                if !lookups.contains(&id) {
                    lookups.push(id);
                }
            }
        }
    }
    log::debug!("Merging {} lookups into '{CONTEXTUAL_ALTERNATES}'", lookups.len());

    let index = gsub.push_feature(FeatureRecord::new(CONTEXTUAL_ALTERNATES, lookups));
    for script in &mut gsub.scripts {
        if let Some(lang_sys) = script.default_lang_sys.as_mut() {
            lang_sys.feature_indices.push(index);
        }
    }
}
