//! The naming table, keyed for editing.

use std::collections::BTreeMap;

use write_fonts::{
    read::tables::name::{Encoding, MacRomanMapping},
    tables::name::{Name, NameRecord},
    types::NameId,
};

/// The two platforms names are written for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Mac Roman, English.
    Macintosh,
    /// Unicode BMP, US English.
    Windows,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Macintosh, Platform::Windows];

    fn key(self, name_id: NameId) -> NameKey {
        match self {
            Platform::Macintosh => NameKey {
                platform_id: 1,
                encoding_id: 0,
                language_id: 0,
                name_id,
            },
            Platform::Windows => NameKey {
                platform_id: 3,
                encoding_id: 1,
                language_id: 0x409,
                name_id,
            },
        }
    }
}

// field order matches the sort order the name table requires
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct NameKey {
    platform_id: u16,
    encoding_id: u16,
    language_id: u16,
    name_id: NameId,
}

/// Every record of a `name` table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameTable {
    records: BTreeMap<NameKey, String>,
}

impl NameTable {
    pub fn get(&self, platform: Platform, name_id: NameId) -> Option<&str> {
        self.records
            .get(&platform.key(name_id))
            .map(String::as_str)
    }

    pub fn set(&mut self, platform: Platform, name_id: NameId, value: impl Into<String>) {
        self.records.insert(platform.key(name_id), value.into());
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn from_table(table: &Name) -> Self {
        let mut records = BTreeMap::new();
        for record in &table.name_record {
            if matches!(
                Encoding::new(record.platform_id, record.encoding_id),
                Encoding::Unknown
            ) {
                log::warn!(
                    "Dropping name {} for platform {} encoding {}: unsupported encoding",
                    record.name_id,
                    record.platform_id,
                    record.encoding_id
                );
                continue;
            }
            let key = NameKey {
                platform_id: record.platform_id,
                encoding_id: record.encoding_id,
                language_id: record.language_id,
                name_id: record.name_id,
            };
            records.insert(key, record.string.as_str().to_owned());
        }
        NameTable { records }
    }

    pub(crate) fn to_table(&self) -> Name {
        let mut table = Name::default();
        table.name_record = self
            .records
            .iter()
            .map(|(key, value)| {
                let value = match Encoding::new(key.platform_id, key.encoding_id) {
                    Encoding::MacRoman => to_mac_roman(key.name_id, value),
                    _ => value.clone(),
                };
                NameRecord::new(
                    key.platform_id,
                    key.encoding_id,
                    key.language_id,
                    key.name_id,
                    value.into(),
                )
            })
            .collect();
        table
    }
}

/// Replace characters Mac Roman can't encode, which would fail compilation.
fn to_mac_roman(name_id: NameId, value: &str) -> String {
    if value.chars().all(|c| MacRomanMapping.encode(c).is_some()) {
        return value.to_owned();
    }
    log::warn!("Name {name_id} {value:?} is not representable in Mac Roman");
    value
        .chars()
        .map(|c| match MacRomanMapping.encode(c) {
            Some(_) => c,
            None => '?',
        })
        .collect()
}
