use std::collections::HashMap;

use super::oto::TimingRecord;

/// Timing records grouped by alias.
///
/// Records keep the order they were inserted in. When one alias is defined
/// more than once (for example by two folders of a multi-folder voicebank)
/// every definition is kept, but lookups through [`AliasIndex::first`] only
/// ever see the first one.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    entries: HashMap<String, Vec<TimingRecord>>,
    record_count: usize,
}

impl AliasIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from records in encounter order.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = TimingRecord>,
    {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Append a record under its alias, or its asset path if the alias is empty.
    pub fn insert(&mut self, record: TimingRecord) {
        let key = if record.alias.is_empty() {
            record.asset_path.clone()
        } else {
            record.alias.clone()
        };
        self.entries.entry(key).or_default().push(record);
        self.record_count += 1;
    }

    /// All records registered for `alias`. Empty for unknown aliases.
    pub fn get(&self, alias: &str) -> &[TimingRecord] {
        self.entries.get(alias).map(Vec::as_slice).unwrap_or_default()
    }

    /// The record used for playback: the first one registered.
    pub fn first(&self, alias: &str) -> Option<&TimingRecord> {
        self.get(alias).first()
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    /// All aliases in sorted order.
    pub fn aliases(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Number of distinct aliases.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of records across all aliases.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn iter_records(&self) -> impl Iterator<Item = &TimingRecord> {
        self.entries.values().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(asset: &str, alias: &str, offset_ms: f64) -> TimingRecord {
        TimingRecord {
            asset_path: asset.to_string(),
            alias: alias.to_string(),
            offset_ms,
            ..Default::default()
        }
    }

    #[test]
    fn keeps_duplicates_in_insertion_order() {
        let index = AliasIndex::from_records(vec![
            record("A/la.wav", "la", 10.0),
            record("B/la.wav", "la", 20.0),
            record("A/li.wav", "li", 0.0),
        ]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.record_count(), 3);
        let la = index.get("la");
        assert_eq!(la.len(), 2);
        assert_eq!(la[0].asset_path, "A/la.wav");
        assert_eq!(la[1].asset_path, "B/la.wav");
        assert_eq!(index.first("la").unwrap().offset_ms, 10.0);
    }

    #[test]
    fn unknown_alias_is_no_match() {
        let index = AliasIndex::from_records(vec![record("a.wav", "a", 0.0)]);
        assert!(index.get("missing").is_empty());
        assert!(index.first("missing").is_none());
        assert!(!index.contains("missing"));
    }

    #[test]
    fn empty_alias_is_keyed_by_asset_path() {
        let index = AliasIndex::from_records(vec![record("voice/ka.wav", "", 0.0)]);
        assert!(index.contains("voice/ka.wav"));
    }

    #[test]
    fn aliases_are_sorted() {
        let index = AliasIndex::from_records(vec![
            record("c.wav", "c", 0.0),
            record("a.wav", "a", 0.0),
            record("b.wav", "b", 0.0),
        ]);
        assert_eq!(index.aliases(), vec!["a", "b", "c"]);
        assert_eq!(index.iter_records().count(), 3);
    }
}
