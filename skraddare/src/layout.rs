//! An editable model of the GSUB table.
//!
//! Lookups live in an append-only [`LookupArena`] and are referenced by
//! [`LookupId`] handles, so appending a feature or a lookup can never
//! invalidate a reference held elsewhere in the table.

use write_fonts::{
    tables::{
        gsub::{self as write_gsub, ExtensionSubtable, SingleSubst, SubstitutionLookup},
        layout::{
            self as write_layout, CoverageTable, FeatureParams, FeatureVariations, LookupFlag,
            RangeRecord,
        },
    },
    types::{GlyphId16, Tag},
    NullableOffsetMarker, OffsetMarker,
};

/// A stable handle to a lookup in a [`LookupArena`].
///
/// The handle is the lookup's position in the encoded lookup list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LookupId(u16);

impl LookupId {
    pub fn new(index: u16) -> Self {
        LookupId(index)
    }

    pub fn to_u16(self) -> u16 {
        self.0
    }
}

/// The lookup list. Lookups can be added, never removed or reordered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LookupArena {
    lookups: Vec<Lookup>,
}

impl LookupArena {
    pub fn push(&mut self, lookup: Lookup) -> LookupId {
        let id = LookupId(self.lookups.len() as u16);
        self.lookups.push(lookup);
        id
    }

    pub fn get(&self, id: LookupId) -> Option<&Lookup> {
        self.lookups.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.lookups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LookupId, &Lookup)> + '_ {
        self.lookups
            .iter()
            .enumerate()
            .map(|(i, lookup)| (LookupId(i as u16), lookup))
    }
}

/// One substitution lookup.
///
/// Single substitutions are exposed as decoded [`Subtable`]s; every lookup
/// also keeps its compiled form, so lookups the pipeline never edits are
/// written back unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct Lookup {
    subtables: Vec<Subtable>,
    encoded: SubstitutionLookup,
}

impl Lookup {
    /// A single substitution lookup with one format 2 subtable per entry.
    pub fn single(subtables: Vec<Subtable>) -> Self {
        let compiled = subtables
            .iter()
            .map(|sub| SingleSubst::format_2(sub.coverage.to_table(), sub.substitutes.clone()))
            .collect();
        Lookup {
            encoded: SubstitutionLookup::Single(write_layout::Lookup::new(
                LookupFlag::empty(),
                compiled,
            )),
            subtables,
        }
    }

    pub(crate) fn from_table(lookup: SubstitutionLookup) -> Self {
        let subtables = match &lookup {
            SubstitutionLookup::Single(single) => single
                .subtables
                .iter()
                .map(|sub| Subtable::from_table(sub))
                .collect(),
            SubstitutionLookup::Extension(ext) => ext
                .subtables
                .iter()
                .filter_map(|sub| match &**sub {
                    ExtensionSubtable::Single(inner) => Some(Subtable::from_table(&inner.extension)),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        Lookup {
            subtables,
            encoded: lookup,
        }
    }

    /// The single substitution subtables of this lookup.
    ///
    /// Empty for every other lookup type.
    pub fn subtables(&self) -> &[Subtable] {
        &self.subtables
    }

    pub(crate) fn to_table(&self) -> SubstitutionLookup {
        self.encoded.clone()
    }
}

/// A coverage list paired positionally with its substitutes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subtable {
    pub coverage: Coverage,
    pub substitutes: Vec<GlyphId16>,
}

impl Subtable {
    pub fn new(coverage: Coverage, substitutes: Vec<GlyphId16>) -> Self {
        Subtable {
            coverage,
            substitutes,
        }
    }

    fn from_table(subst: &SingleSubst) -> Self {
        match subst {
            SingleSubst::Format1(table) => {
                let coverage = Coverage::from_table(&table.coverage);
                let delta = table.delta_glyph_id as i32;
                // deltas wrap modulo 65536
                let substitutes = coverage
                    .glyphs()
                    .map(|gid| GlyphId16::new((gid.to_u16() as i32 + delta) as u16))
                    .collect();
                Subtable {
                    coverage,
                    substitutes,
                }
            }
            SingleSubst::Format2(table) => Subtable {
                coverage: Coverage::from_table(&table.coverage),
                substitutes: table.substitute_glyph_ids.clone(),
            },
        }
    }

    /// Each covered glyph with the substitute at the same position.
    ///
    /// Stops at the shorter of the two lists.
    pub fn pairs(&self) -> impl Iterator<Item = (GlyphId16, GlyphId16)> + '_ {
        self.coverage.glyphs().zip(self.substitutes.iter().copied())
    }
}

/// An inclusive run of glyph ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphRange {
    pub start: GlyphId16,
    pub end: GlyphId16,
}

impl GlyphRange {
    pub fn new(start: u16, end: u16) -> Self {
        GlyphRange {
            start: GlyphId16::new(start),
            end: GlyphId16::new(end),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Coverage {
    /// An explicit, ordered glyph list.
    Format1(Vec<GlyphId16>),
    /// Ranges, each expanding to consecutive glyph ids.
    Format2(Vec<GlyphRange>),
}

impl Coverage {
    /// The covered glyphs in coverage index order.
    pub fn glyphs(&self) -> impl Iterator<Item = GlyphId16> + '_ {
        let (list, ranges) = match self {
            Coverage::Format1(glyphs) => (glyphs.as_slice(), &[][..]),
            Coverage::Format2(ranges) => (&[][..], ranges.as_slice()),
        };
        list.iter().copied().chain(
            ranges
                .iter()
                .flat_map(|range| (range.start.to_u16()..=range.end.to_u16()).map(GlyphId16::new)),
        )
    }

    fn from_table(table: &CoverageTable) -> Self {
        match table {
            CoverageTable::Format1(table) => Coverage::Format1(table.glyph_array.clone()),
            CoverageTable::Format2(table) => Coverage::Format2(
                table
                    .range_records
                    .iter()
                    .map(|record| GlyphRange {
                        start: record.start_glyph_id,
                        end: record.end_glyph_id,
                    })
                    .collect(),
            ),
        }
    }

    fn to_table(&self) -> CoverageTable {
        match self {
            Coverage::Format1(glyphs) => CoverageTable::format_1(glyphs.clone()),
            Coverage::Format2(ranges) => {
                let mut start_index = 0u16;
                let records = ranges
                    .iter()
                    .map(|range| {
                        let record = RangeRecord::new(range.start, range.end, start_index);
                        start_index = start_index.wrapping_add(
                            range
                                .end
                                .to_u16()
                                .saturating_sub(range.start.to_u16())
                                .wrapping_add(1),
                        );
                        record
                    })
                    .collect();
                CoverageTable::format_2(records)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FeatureRecord {
    pub tag: Tag,
    /// Handles into the lookup arena, in application order.
    pub lookups: Vec<LookupId>,
    params: Option<FeatureParams>,
}

impl FeatureRecord {
    pub fn new(tag: Tag, lookups: Vec<LookupId>) -> Self {
        FeatureRecord {
            tag,
            lookups,
            params: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LangSys {
    pub required_feature_index: u16,
    pub feature_indices: Vec<u16>,
}

impl LangSys {
    pub fn new(feature_indices: Vec<u16>) -> Self {
        LangSys {
            required_feature_index: 0xFFFF,
            feature_indices,
        }
    }

    fn from_table(table: &write_layout::LangSys) -> Self {
        LangSys {
            required_feature_index: table.required_feature_index,
            feature_indices: table.feature_indices.clone(),
        }
    }

    fn to_table(&self) -> write_layout::LangSys {
        write_layout::LangSys {
            required_feature_index: self.required_feature_index,
            feature_indices: self.feature_indices.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptRecord {
    pub tag: Tag,
    pub default_lang_sys: Option<LangSys>,
    pub lang_sys: Vec<(Tag, LangSys)>,
}

/// The GSUB table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Gsub {
    pub scripts: Vec<ScriptRecord>,
    pub features: Vec<FeatureRecord>,
    pub lookups: LookupArena,
    feature_variations: Option<FeatureVariations>,
}

impl Gsub {
    /// Append a feature, returning its index in the feature list.
    pub fn push_feature(&mut self, feature: FeatureRecord) -> u16 {
        self.features.push(feature);
        (self.features.len() - 1) as u16
    }

    /// Every feature with the given tag, in feature list order.
    pub fn features_with_tag(&self, tag: Tag) -> impl Iterator<Item = &FeatureRecord> + '_ {
        self.features.iter().filter(move |feature| feature.tag == tag)
    }

    pub(crate) fn from_table(table: &write_gsub::Gsub) -> Self {
        let scripts = table
            .script_list
            .script_records
            .iter()
            .map(|record| ScriptRecord {
                tag: record.script_tag,
                default_lang_sys: Option::as_ref(&record.script.default_lang_sys)
                    .map(|lang_sys| LangSys::from_table(lang_sys)),
                lang_sys: record
                    .script
                    .lang_sys_records
                    .iter()
                    .map(|rec| (rec.lang_sys_tag, LangSys::from_table(&rec.lang_sys)))
                    .collect(),
            })
            .collect();
        let features = table
            .feature_list
            .feature_records
            .iter()
            .map(|record| FeatureRecord {
                tag: record.feature_tag,
                lookups: record
                    .feature
                    .lookup_list_indices
                    .iter()
                    .copied()
                    .map(LookupId)
                    .collect(),
                params: Option::as_ref(&record.feature.feature_params)
                    .map(|params| (**params).clone()),
            })
            .collect();
        let mut lookups = LookupArena::default();
        for lookup in table.lookup_list.lookups.iter() {
            lookups.push(Lookup::from_table((**lookup).clone()));
        }
        Gsub {
            scripts,
            features,
            lookups,
            feature_variations: Option::as_ref(&table.feature_variations)
                .map(|variations| (**variations).clone()),
        }
    }

    pub(crate) fn to_table(&self) -> write_gsub::Gsub {
        let script_list = write_layout::ScriptList::new(
            self.scripts
                .iter()
                .map(|script| {
                    write_layout::ScriptRecord::new(
                        script.tag,
                        write_layout::Script::new(
                            script.default_lang_sys.as_ref().map(LangSys::to_table),
                            script
                                .lang_sys
                                .iter()
                                .map(|(tag, lang_sys)| {
                                    write_layout::LangSysRecord::new(*tag, lang_sys.to_table())
                                })
                                .collect(),
                        ),
                    )
                })
                .collect(),
        );
        let feature_list = write_layout::FeatureList::new(
            self.features
                .iter()
                .map(|feature| write_layout::FeatureRecord {
                    feature_tag: feature.tag,
                    feature: OffsetMarker::new(write_layout::Feature {
                        feature_params: NullableOffsetMarker::new(feature.params.clone()),
                        lookup_list_indices: feature.lookups.iter().map(|id| id.0).collect(),
                    }),
                })
                .collect(),
        );
        let lookup_list = write_layout::LookupList::new(
            self.lookups
                .lookups
                .iter()
                .map(Lookup::to_table)
                .collect(),
        );
        let mut table = write_gsub::Gsub::new(script_list, feature_list, lookup_list);
        table.feature_variations = NullableOffsetMarker::new(self.feature_variations.clone());
        table
    }
}
