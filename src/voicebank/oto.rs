/// Timing metadata for one recorded unit, parsed from an `oto.ini` line.
///
/// Only `offset_ms` affects playback. The remaining timing fields are kept so
/// callers can inspect them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimingRecord {
    /// Asset path. Relative to the metadata file when parsed, relative to the
    /// container root once loaded.
    pub asset_path: String,
    /// Lookup key. Equal to `asset_path` when the line leaves it empty.
    pub alias: String,
    pub offset_ms: f64,
    pub consonant_ms: f64,
    /// Negative values are measured from the end of the asset.
    pub cutoff_ms: f64,
    pub preutterance_ms: f64,
    pub overlap_ms: f64,
}

/// Parse `oto.ini` text into timing records.
///
/// Each line has the form
/// `filename=alias,offset,consonant,cutoff,preutterance,overlap`. Blank lines,
/// `#` comments and lines without `=` are skipped. Missing or non-numeric
/// fields read as `0`. This never fails: voicebank files in the wild are
/// inconsistently formatted, so anything unusable is dropped.
pub fn parse(text: &str) -> Vec<TimingRecord> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<TimingRecord> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (asset_path, rest) = line.split_once('=')?;
    let asset_path = asset_path.trim().to_string();

    let mut fields = rest.split(',').map(str::trim);
    let alias = fields.next().unwrap_or_default();
    let mut number = || fields.next().map_or(0.0, parse_number);

    let offset_ms = number();
    let consonant_ms = number();
    let cutoff_ms = number();
    let preutterance_ms = number();
    let overlap_ms = number();

    let alias = if alias.is_empty() {
        asset_path.clone()
    } else {
        alias.to_string()
    };

    Some(TimingRecord {
        asset_path,
        alias,
        offset_ms,
        consonant_ms,
        cutoff_ms,
        preutterance_ms,
        overlap_ms,
    })
}

fn parse_number(field: &str) -> f64 {
    field
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
