// In: src/testing/table_ops.rs

//! Table-level behavior of the reference engine: storage, TDTQL WHERE
//! evaluation, filter specs, processors, compression, diff and export.
//!
//! Every failure is an engine-style message string with the prefix a real
//! engine build uses, so the client's classification runs for real.

use crate::bridge::format::{
    DiffResult, DiffStats, ExportOptions, ExportResult, FieldChange, FieldJson, Header,
    ModifiedRow, PacketData, SchemaJson,
};
use crate::types::Compression;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::fs;

pub(crate) type OpResult<T> = std::result::Result<T, String>;

/// Rows per part written by `export_all`.
pub(crate) const EXPORT_PART_ROWS: usize = 4;

//==================================================================================
// I. The Table
//==================================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Table {
    pub fields: Vec<FieldJson>,
    pub header: Header,
    pub rows: Vec<Vec<String>>,
    /// `""` or `"zstd"`.
    pub compression: String,
}

impl Table {
    pub fn from_packet_data(pkt: PacketData) -> Self {
        let compression = pkt
            .extra
            .get("compression")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        Self {
            fields: pkt.schema.fields,
            header: pkt.header,
            rows: pkt.data,
            compression,
        }
    }

    pub fn to_packet_data(&self) -> PacketData {
        let mut extra = Map::new();
        if !self.compression.is_empty() {
            let tag = Value::String(self.compression.clone());
            extra.insert("compression".into(), tag);
        }
        PacketData {
            schema: SchemaJson {
                fields: self.fields.clone(),
            },
            header: self.header.clone(),
            data: self.rows.clone(),
            extra,
            ..PacketData::default()
        }
    }

    pub fn with_rows(&self, rows: Vec<Vec<String>>) -> Self {
        Self {
            rows,
            ..self.clone()
        }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    fn filter_index(&self, name: &str) -> OpResult<usize> {
        self.index_of(name)
            .ok_or_else(|| format!("filter error: unknown field {}", name))
    }
}

pub(crate) fn parse_packet_json(text: &str) -> OpResult<Table> {
    serde_json::from_str::<PacketData>(text)
        .map(Table::from_packet_data)
        .map_err(|e| format!("parse error: invalid packet JSON: {}", e))
}

pub(crate) fn load(path: &str) -> OpResult<Table> {
    let text =
        fs::read_to_string(path).map_err(|e| format!("parse error: cannot read {}: {}", path, e))?;
    parse_packet_json(&text)
}

pub(crate) fn store(table: &Table, path: &str) -> OpResult<()> {
    let text = serde_json::to_string_pretty(&table.to_packet_data())
        .map_err(|e| format!("write error: {}", e))?;
    fs::write(path, text).map_err(|e| format!("write error: cannot write {}: {}", path, e))
}

//==================================================================================
// II. Comparison Helpers
//==================================================================================

/// Numeric when both sides parse as numbers, lexicographic otherwise.
fn compare(cell: &str, value: &str) -> Ordering {
    match (cell.trim().parse::<f64>(), value.trim().parse::<f64>()) {
        (Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => cell.cmp(value),
    }
}

/// SQL LIKE with `%` and `_`.
fn like_match(text: &str, pattern: &str) -> bool {
    let t: Vec<char> = text.chars().collect();
    let p: Vec<char> = pattern.chars().collect();
    // dp[j] == pattern[..j] matches text[..i]
    let mut dp = vec![false; p.len() + 1];
    dp[0] = true;
    for j in 1..=p.len() {
        dp[j] = dp[j - 1] && p[j - 1] == '%';
    }
    for &tc in &t {
        let mut next = vec![false; p.len() + 1];
        for j in 1..=p.len() {
            next[j] = match p[j - 1] {
                '%' => next[j - 1] || dp[j],
                '_' => dp[j - 1],
                pc => dp[j - 1] && pc == tc,
            };
        }
        dp = next;
    }
    dp[p.len()]
}

//==================================================================================
// III. TDTQL WHERE
//==================================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    fn holds(&self, ord: Ordering) -> bool {
        match self {
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Ne => ord != Ordering::Equal,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Gte => ord != Ordering::Less,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Lte => ord != Ordering::Greater,
        }
    }
}

#[derive(Debug, Clone)]
struct Condition {
    field: String,
    op: CmpOp,
    value: String,
}

fn split_and(clause: &str) -> Vec<&str> {
    let bytes = clause.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quote = false;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            in_quote = !in_quote;
        } else if !in_quote
            && bytes[i] == b' '
            && i + 5 <= bytes.len()
            && bytes[i..i + 5].eq_ignore_ascii_case(b" and ")
        {
            parts.push(&clause[start..i]);
            i += 5;
            start = i;
            continue;
        }
        i += 1;
    }
    parts.push(&clause[start..]);
    parts
}

fn parse_condition(part: &str) -> OpResult<Condition> {
    let invalid = |why: &str| format!("invalid WHERE clause: {} in '{}'", why, part.trim());

    let pos = part
        .find(['=', '<', '>', '!'])
        .ok_or_else(|| invalid("missing operator"))?;
    let rest = &part[pos..];
    let (op, len) = if rest.starts_with(">=") {
        (CmpOp::Gte, 2)
    } else if rest.starts_with("<=") {
        (CmpOp::Lte, 2)
    } else if rest.starts_with("<>") || rest.starts_with("!=") {
        (CmpOp::Ne, 2)
    } else if rest.starts_with('=') {
        (CmpOp::Eq, 1)
    } else if rest.starts_with('>') {
        (CmpOp::Gt, 1)
    } else if rest.starts_with('<') {
        (CmpOp::Lt, 1)
    } else {
        return Err(invalid("bad operator"));
    };

    let field = part[..pos].trim();
    let raw = part[pos + len..].trim();
    if field.is_empty() || field.contains(char::is_whitespace) {
        return Err(invalid("bad field name"));
    }
    if raw.is_empty() {
        return Err(invalid("missing value"));
    }
    if raw.starts_with(['=', '<', '>', '!']) {
        return Err(invalid("bad operator"));
    }
    let value = if let Some(stripped) = raw.strip_prefix('\'') {
        stripped
            .strip_suffix('\'')
            .ok_or_else(|| invalid("unterminated string"))?
    } else {
        raw
    };

    Ok(Condition {
        field: field.to_string(),
        op,
        value: value.to_string(),
    })
}

fn parse_where(clause: &str) -> OpResult<Vec<Condition>> {
    let clause = clause.trim();
    if clause.is_empty() {
        return Ok(Vec::new());
    }
    split_and(clause).into_iter().map(parse_condition).collect()
}

/// All rows matching `clause`, in order.
pub(crate) fn filter_where(table: &Table, clause: &str) -> OpResult<Vec<Vec<String>>> {
    let conditions = parse_where(clause)?;
    let resolved = conditions
        .iter()
        .map(|c| table.filter_index(&c.field).map(|idx| (idx, c)))
        .collect::<OpResult<Vec<_>>>()?;

    Ok(table
        .rows
        .iter()
        .filter(|row| {
            resolved.iter().all(|(idx, c)| {
                let cell = row.get(*idx).map(String::as_str).unwrap_or("");
                c.op.holds(compare(cell, &c.value))
            })
        })
        .cloned()
        .collect())
}

//==================================================================================
// IV. Direct Filter Specs
//==================================================================================

#[derive(Debug, Clone)]
pub(crate) struct SpecIn {
    pub field: String,
    pub op: String,
    pub value: String,
    pub value2: String,
}

fn spec_matches(spec: &SpecIn, cell: &str) -> OpResult<bool> {
    let ord = || compare(cell, &spec.value);
    let in_list = || spec.value.split(',').any(|v| v.trim() == cell);
    Ok(match spec.op.as_str() {
        "eq" => ord() == Ordering::Equal,
        "ne" => ord() != Ordering::Equal,
        "gt" => ord() == Ordering::Greater,
        "gte" => ord() != Ordering::Less,
        "lt" => ord() == Ordering::Less,
        "lte" => ord() != Ordering::Greater,
        "in" => in_list(),
        "not_in" => !in_list(),
        "between" => ord() != Ordering::Less && compare(cell, &spec.value2) != Ordering::Greater,
        "like" => like_match(cell, &spec.value),
        "not_like" => !like_match(cell, &spec.value),
        "is_null" => cell.is_empty(),
        "is_not_null" => !cell.is_empty(),
        other => return Err(format!("filter error: unknown operator {}", other)),
    })
}

pub(crate) fn filter_specs(
    table: &Table,
    specs: &[SpecIn],
    limit: usize,
) -> OpResult<Vec<Vec<String>>> {
    let resolved = specs
        .iter()
        .map(|s| table.filter_index(&s.field).map(|idx| (idx, s)))
        .collect::<OpResult<Vec<_>>>()?;

    let mut out = Vec::new();
    for row in &table.rows {
        let mut keep = true;
        for (idx, spec) in &resolved {
            let cell = row.get(*idx).map(String::as_str).unwrap_or("");
            if !spec_matches(spec, cell)? {
                keep = false;
                break;
            }
        }
        if keep {
            out.push(row.clone());
            if limit > 0 && out.len() == limit {
                break;
            }
        }
    }
    Ok(out)
}

//==================================================================================
// V. Masking & Processors
//==================================================================================

/// Replaces all but the last `visible` characters. Values no longer than
/// `visible` are masked entirely; empty values stay empty.
pub(crate) fn mask_value(value: &str, mask_char: char, visible: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    let keep = if chars.len() > visible { visible } else { 0 };
    let hidden = chars.len() - keep;
    std::iter::repeat(mask_char)
        .take(hidden)
        .chain(chars[hidden..].iter().copied())
        .collect()
}

pub(crate) fn mask_fields(
    table: &Table,
    fields: &[String],
    mask_char: char,
    visible: usize,
) -> Table {
    let targets: Vec<usize> = fields.iter().filter_map(|f| table.index_of(f)).collect();
    let rows = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(i, v)| {
                    if targets.contains(&i) {
                        mask_value(v, mask_char, visible)
                    } else {
                        v.clone()
                    }
                })
                .collect()
        })
        .collect();
    table.with_rows(rows)
}

fn mask_pattern(value: &str, pattern: &str) -> String {
    match pattern {
        "partial" => match value.split_once('@') {
            Some((local, domain)) if !local.is_empty() => {
                format!("{}***@{}", local.chars().next().unwrap_or('*'), domain)
            }
            _ => {
                let chars: Vec<char> = value.chars().collect();
                match (chars.first(), chars.last()) {
                    (Some(first), Some(last)) if chars.len() > 2 => format!("{}***{}", first, last),
                    _ => "***".to_string(),
                }
            }
        },
        _ => value
            .chars()
            .map(|c| {
                if matches!(c, ' ' | '-' | '(' | ')' | '.' | '/') {
                    c
                } else {
                    '*'
                }
            })
            .collect(),
    }
}

fn field_rules(config: &Value) -> OpResult<Vec<(String, String)>> {
    let fields = config
        .get("fields")
        .and_then(Value::as_object)
        .ok_or_else(|| "processor error: config needs a \"fields\" object".to_string())?;
    fields
        .iter()
        .map(|(name, rule)| {
            rule.as_str()
                .map(|r| (name.clone(), r.to_string()))
                .ok_or_else(|| format!("processor error: rule for {} must be a string", name))
        })
        .collect()
}

fn map_columns(
    table: &Table,
    rules: &[(String, String)],
    f: impl Fn(&str, &str) -> OpResult<String>,
) -> OpResult<Table> {
    let targets: Vec<(usize, &str)> = rules
        .iter()
        .filter_map(|(name, rule)| table.index_of(name).map(|i| (i, rule.as_str())))
        .collect();
    let mut rows = table.rows.clone();
    for row in rows.iter_mut() {
        for &(idx, rule) in &targets {
            if let Some(cell) = row.get_mut(idx) {
                *cell = f(cell, rule)?;
            }
        }
    }
    Ok(table.with_rows(rows))
}

fn normalize(value: &str, rule: &str) -> OpResult<String> {
    Ok(match rule {
        "uppercase" => value.to_uppercase(),
        "lowercase" => value.to_lowercase(),
        "whitespace" => value.split_whitespace().collect::<Vec<_>>().join(" "),
        "email" => value.trim().to_lowercase(),
        other => return Err(format!("processor error: unknown normalize rule {}", other)),
    })
}

fn looks_like_email(cell: &str) -> bool {
    cell.split_once('@')
        .is_some_and(|(l, d)| !l.is_empty() && d.contains('.'))
}

fn validate(table: &Table, rules: &[(String, String)]) -> OpResult<()> {
    for (name, rule) in rules {
        let Some(idx) = table.index_of(name) else {
            return Err(format!("processor error: validation field {} not in schema", name));
        };
        for (row_no, row) in table.rows.iter().enumerate() {
            let cell = row.get(idx).map(String::as_str).unwrap_or("");
            let ok = match rule.as_str() {
                "required" => !cell.is_empty(),
                "email" => cell.is_empty() || looks_like_email(cell),
                "numeric" => cell.is_empty() || cell.parse::<f64>().is_ok(),
                other => return Err(format!("processor error: unknown validation rule {}", other)),
            };
            if !ok {
                return Err(format!(
                    "processor error: validation failed: row {} field {} is not {}",
                    row_no + 1,
                    name,
                    rule
                ));
            }
        }
    }
    Ok(())
}

pub(crate) fn apply_processor(table: &Table, proc_type: &str, config: &Value) -> OpResult<Table> {
    match proc_type {
        "field_masker" => {
            let rules = field_rules(config)?;
            map_columns(table, &rules, |v, p| Ok(mask_pattern(v, p)))
        }
        "field_normalizer" => {
            let rules = field_rules(config)?;
            map_columns(table, &rules, normalize)
        }
        "field_validator" => {
            validate(table, &field_rules(config)?)?;
            Ok(table.clone())
        }
        "compress" => {
            let level = config.get("level").and_then(Value::as_i64).unwrap_or(3);
            compress(table, level)
        }
        "decompress" => decompress(table),
        other => Err(format!("processor error: unknown processor type '{}'", other)),
    }
}

pub(crate) fn apply_chain(table: &Table, chain: &Value) -> OpResult<Table> {
    let steps = chain
        .as_array()
        .ok_or_else(|| "chain error: chain must be a JSON array".to_string())?;
    let mut current = table.clone();
    for (i, step) in steps.iter().enumerate() {
        let kind = step.get("type").and_then(Value::as_str).unwrap_or("");
        let params = step.get("params").cloned().unwrap_or(Value::Null);
        current = apply_processor(&current, kind, &params)
            .map_err(|e| format!("chain step {} ({}): {}", i, kind, e))?;
    }
    Ok(current)
}

//==================================================================================
// VI. Compression
//==================================================================================

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn from_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(text.get(i..i + 2)?, 16).ok())
        .collect()
}

pub(crate) fn compress(table: &Table, level: i64) -> OpResult<Table> {
    if !(1..=22).contains(&level) {
        return Err(format!("processor error: compression level {} out of range", level));
    }
    if Compression::from_tag(&table.compression).is_compressed() {
        return Err("processor error: packet is already compressed".to_string());
    }
    let payload = serde_json::to_vec(&table.rows).map_err(|e| format!("processor error: {}", e))?;
    let packed = zstd::encode_all(&payload[..], level as i32)
        .map_err(|e| format!("processor error: {}", e))?;
    Ok(Table {
        rows: vec![vec![to_hex(&packed)]],
        compression: "zstd".to_string(),
        ..table.clone()
    })
}

pub(crate) fn decompress(table: &Table) -> OpResult<Table> {
    if Compression::from_tag(&table.compression) != Compression::Zstd {
        return Err("decompress error: packet is not compressed".to_string());
    }
    let blob = match table.rows.as_slice() {
        [row] if row.len() == 1 => &row[0],
        _ => return Err("decompress error: expected exactly one blob row".to_string()),
    };
    let packed = from_hex(blob).ok_or_else(|| "decompress error: blob is not hex".to_string())?;
    let payload = zstd::decode_all(&packed[..]).map_err(|e| format!("decompress error: {}", e))?;
    let rows: Vec<Vec<String>> =
        serde_json::from_slice(&payload).map_err(|e| format!("decompress error: {}", e))?;
    Ok(Table {
        rows,
        compression: String::new(),
        ..table.clone()
    })
}

//==================================================================================
// VII. Diff & Export
//==================================================================================

pub(crate) fn diff(old: &Table, new: &Table) -> OpResult<DiffResult> {
    let names = |t: &Table| t.fields.iter().map(|f| f.name.clone()).collect::<Vec<_>>();
    if names(old) != names(new) {
        return Err("diff error: schemas differ".to_string());
    }
    let key_idx = old.fields.iter().position(|f| f.key).unwrap_or(0);
    let key_of = |row: &Vec<String>| row.get(key_idx).cloned().unwrap_or_default();
    let find = |t: &Table, key: &str| t.rows.iter().find(|r| key_of(r) == key).cloned();

    let mut result = DiffResult::default();
    for row in &new.rows {
        if find(old, &key_of(row)).is_none() {
            result.added.push(row.clone());
        }
    }
    let mut unchanged = 0;
    for row in &old.rows {
        match find(new, &key_of(row)) {
            None => result.removed.push(row.clone()),
            Some(other) if other == *row => unchanged += 1,
            Some(other) => {
                let mut changes = hashbrown::HashMap::new();
                for (i, field) in old.fields.iter().enumerate() {
                    let a = row.get(i).cloned().unwrap_or_default();
                    let b = other.get(i).cloned().unwrap_or_default();
                    if a != b {
                        changes.insert(
                            i.to_string(),
                            FieldChange {
                                field_name: field.name.clone(),
                                old_value: a,
                                new_value: b,
                            },
                        );
                    }
                }
                result.modified.push(ModifiedRow {
                    key: key_of(row),
                    old_row: row.clone(),
                    new_row: other,
                    changes,
                });
            }
        }
    }
    result.stats = DiffStats {
        total_in_a: old.rows.len() as i64,
        total_in_b: new.rows.len() as i64,
        added: result.added.len() as i64,
        removed: result.removed.len() as i64,
        modified: result.modified.len() as i64,
        unchanged,
    };
    Ok(result)
}

fn part_path(base: &str, part: usize, total: usize) -> String {
    let (dir, file) = match base.rfind('/') {
        Some(i) => (&base[..=i], &base[i + 1..]),
        None => ("", base),
    };
    let (stem, ext) = match file.find('.') {
        Some(i) => (&file[..i], &file[i..]),
        None => (file, ""),
    };
    format!("{}{}_part_{}_of_{}{}", dir, stem, part, total, ext)
}

pub(crate) fn export_all(
    table: &Table,
    base: &str,
    options: &ExportOptions,
) -> OpResult<ExportResult> {
    let chunks: Vec<&[Vec<String>]> = if table.rows.is_empty() {
        vec![&table.rows[..]]
    } else {
        table.rows.chunks(EXPORT_PART_ROWS).collect()
    };
    let total = chunks.len();
    let mut files = Vec::with_capacity(total);

    for (i, chunk) in chunks.into_iter().enumerate() {
        let mut part = table.with_rows(chunk.to_vec());
        part.header.part_number = (i + 1) as i64;
        part.header.total_parts = total as i64;
        part.header.records_in_part = chunk.len() as i64;
        if options.compress {
            part = compress(&part, options.level.into())?;
        }
        let path = if total == 1 {
            base.to_string()
        } else {
            part_path(base, i + 1, total)
        };
        store(&part, &path)?;
        files.push(path);
    }

    Ok(ExportResult {
        files,
        total_parts: total as i64,
        ..ExportResult::default()
    })
}

//==================================================================================
// VIII. Value Serialization
//==================================================================================

fn base64(bytes: &[u8]) -> String {
    const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);
    for chunk in bytes.chunks(3) {
        let n = chunk
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, &b)| acc | (b as u32) << (16 - 8 * i));
        for i in 0..4 {
            if i <= chunk.len() {
                out.push(ALPHABET[((n >> (18 - 6 * i)) & 0x3f) as usize] as char);
            } else {
                out.push('=');
            }
        }
    }
    out
}

pub(crate) fn serialize_value(type_name: &str, value: &str) -> OpResult<Value> {
    let canonical = match type_name.to_ascii_uppercase().as_str() {
        "BLOB" => {
            let raw = from_hex(value).ok_or_else(|| "BLOB: invalid hex input".to_string())?;
            base64(&raw)
        }
        "TIMESTAMP" | "DATETIME" => {
            let parsed = chrono::DateTime::parse_from_rfc3339(value)
                .map(|ts| ts.with_timezone(&chrono::Utc))
                .or_else(|_| {
                    chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                        .map(|n| n.and_utc())
                })
                .map_err(|e| format!("TIMESTAMP: cannot parse {:?}: {}", value, e))?;
            parsed.format("%Y-%m-%dT%H:%M:%SZ").to_string()
        }
        "JSON" | "JSONB" => {
            let parsed: Value =
                serde_json::from_str(value).map_err(|e| format!("JSON: invalid input: {}", e))?;
            parsed.to_string()
        }
        _ => value.to_string(),
    };
    Ok(json!({ "value": canonical }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_match() {
        assert!(like_match("john@example.com", "%@example.com"));
        assert!(like_match("Omsk", "_msk"));
        assert!(!like_match("Omsk", "_sk"));
        assert!(like_match("", "%"));
    }

    #[test]
    fn test_where_parser_handles_quotes_and_and() {
        let conds = parse_where("City = 'New and Old' AND Balance >= 10").unwrap();
        assert_eq!(conds.len(), 2);
        assert_eq!(conds[0].value, "New and Old");
        assert_eq!(conds[1].op, CmpOp::Gte);
    }

    #[test]
    fn test_where_parser_rejects_garbage() {
        let err = parse_where("Balance >>").unwrap_err();
        assert!(err.starts_with("invalid WHERE clause"));
        assert!(parse_where("Name = 'open").is_err());
        assert!(parse_where("Balance >= <5").is_err());
        assert!(parse_where("City = ").is_err());
    }

    #[test]
    fn test_compress_accepts_none_tag() {
        let table = Table {
            rows: vec![vec!["1".into(), "Ann".into()]],
            compression: "none".to_string(),
            ..Table::default()
        };

        let packed = compress(&table, 3).unwrap();
        assert_eq!(packed.compression, "zstd");
        let err = compress(&packed, 3).unwrap_err();
        assert!(err.contains("already compressed"));

        let restored = decompress(&packed).unwrap();
        assert_eq!(restored.rows, table.rows);
        assert!(restored.compression.is_empty());
    }

    #[test]
    fn test_mask_value() {
        assert_eq!(mask_value("john@example.com", '*', 4), "************.com");
        assert_eq!(mask_value("abc", '#', 4), "###");
        assert_eq!(mask_value("", '*', 4), "");
    }

    #[test]
    fn test_base64() {
        assert_eq!(base64(b"Man"), "TWFu");
        assert_eq!(base64(b"Ma"), "TWE=");
        assert_eq!(base64(&[0xde, 0xad, 0xbe, 0xef]), "3q2+7w==");
    }

    #[test]
    fn test_part_path() {
        assert_eq!(
            part_path("/tmp/Users.tdtp.xml", 1, 2),
            "/tmp/Users_part_1_of_2.tdtp.xml"
        );
        assert_eq!(part_path("out", 2, 3), "out_part_2_of_3");
    }
}
