//! Symbol and data-type tables: the decoded form of `SYM_UPLOAD`, `SYM_DT_UPLOAD`, and
//! `SYM_UPLOADINFO2` payloads, used by the tag resolver to turn a path into a
//! `(group, offset, size, type_name, primitive_kind)` tuple.

use crate::errors::ClientError;
use crate::value::PrimitiveKind;
use std::collections::HashMap;

/// A single entry from the symbol upload (`SYM_UPLOAD`), one per declared PLC variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub group: u32,
    pub offset: u32,
    pub size: u32,
    pub data_type_id: u32,
    pub flags: u32,
    pub name: String,
    /// Upper-cased `name`, used for case-insensitive lookup.
    pub upper_case_name: String,
    pub type_name: String,
    pub comment: String,
}

/// Symbols keyed by their upper-cased name. Populated once per connection; dropped on
/// disconnect and repopulated on reconnect.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(&name.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub(crate) fn insert(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol.upper_case_name.clone(), symbol);
    }
}

/// A decoded data-type entry from `SYM_DT_UPLOAD`: either a named top-level type or a
/// sub-item within one. `array_dimensions` is outermost-to-innermost, as decoded from
/// the wire; `sub_items` are full nested entries, decoded directly from the wire's
/// recursive layout (not looked up by name — the name-keyed [`DataTypeTable`] is only
/// consulted when a sub-item's `primitive_kind` is [`PrimitiveKind::BigType`] and its
/// `type_name` names another top-level type).
#[derive(Debug, Clone, PartialEq)]
pub struct DataType {
    pub version: u32,
    pub hash: u32,
    pub type_hash: u32,
    pub size: u32,
    pub offset: u32,
    pub primitive_kind: PrimitiveKind,
    pub flags: u32,
    pub name: String,
    pub type_name: String,
    pub comment: String,
    pub array_dimensions: Vec<(i32, u32)>,
    pub sub_items: Vec<DataType>,
}

/// Data types keyed by their `type_name`. A struct field typed `ST_Alarms` is decoded
/// inline as a `DataType` tree by [`parse_data_type_entry`]; this table exists so the
/// value codec can resolve a type referenced *by name* (e.g. a symbol's own type, or a
/// self-referential field) without embedding owning cycles.
#[derive(Debug, Clone, Default)]
pub struct DataTypeTable {
    types: HashMap<String, DataType>,
}

impl DataTypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, type_name: &str) -> Option<&DataType> {
        self.types.get(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub(crate) fn insert(&mut self, data_type: DataType) {
        self.types.insert(data_type.type_name.clone(), data_type);
    }
}

impl crate::value::TypeLookup for DataTypeTable {
    fn lookup(&self, type_name: &str) -> Option<&DataType> {
        self.get(type_name)
    }
}

/// The 24-byte `SYM_UPLOADINFO2` record: table sizes ahead of fetching the tables
/// themselves. Cached by the caller for a short TTL since successive tag resolutions
/// rarely need a fresh copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadInfo {
    pub symbol_count: u32,
    pub symbol_length: u32,
    pub data_type_count: u32,
    pub data_type_length: u32,
    pub extra_count: u32,
    pub extra_length: u32,
}

impl UploadInfo {
    /// Size of the `SYM_UPLOADINFO2` record on the wire: six `u32` fields.
    pub const WIRE_SIZE: usize = 24;
}

pub fn parse_upload_info(data: &[u8]) -> Result<UploadInfo, ClientError> {
    if data.len() < UploadInfo::WIRE_SIZE {
        return Err(ClientError::FrameTooShort {
            expected: UploadInfo::WIRE_SIZE,
            got: data.len(),
        });
    }
    let mut fields = data.chunks_exact(4).map(|c| u32::from_le_bytes(c.try_into().unwrap()));
    Ok(UploadInfo {
        symbol_count: fields.next().unwrap(),
        symbol_length: fields.next().unwrap(),
        data_type_count: fields.next().unwrap(),
        data_type_length: fields.next().unwrap(),
        extra_count: fields.next().unwrap(),
        extra_length: fields.next().unwrap(),
    })
}

/// Parses the full `SYM_UPLOAD` payload into a [`SymbolTable`]. Entries are
/// length-prefixed (`entry_length u32`, itself included in the count) and packed back
/// to back with no padding between them.
pub fn parse_symbol_table(data: &[u8]) -> Result<SymbolTable, ClientError> {
    let mut table = SymbolTable::new();
    let mut cursor = 0usize;
    while cursor < data.len() {
        let entry = data
            .get(cursor..)
            .ok_or_else(|| ClientError::DecodeInvalid("symbol table truncated".into()))?;
        let entry_length = read_u32(entry, 0)? as usize;
        if entry_length == 0 {
            return Err(ClientError::DecodeInvalid("zero-length symbol entry".into()));
        }
        let record = entry
            .get(..entry_length)
            .ok_or_else(|| ClientError::DecodeInvalid("symbol entry extends past buffer".into()))?;
        table.insert(parse_symbol_entry(record)?);
        cursor += entry_length;
    }
    Ok(table)
}

fn parse_symbol_entry(record: &[u8]) -> Result<Symbol, ClientError> {
    const PRELUDE: usize = 30; // entry_length(4) + group(4) + offset(4) + size(4) + data_type_id(4) + flags(4) + 3x u16
    if record.len() < PRELUDE {
        return Err(ClientError::FrameTooShort {
            expected: PRELUDE,
            got: record.len(),
        });
    }
    let group = read_u32(record, 4)?;
    let offset = read_u32(record, 8)?;
    let size = read_u32(record, 12)?;
    let data_type_id = read_u32(record, 16)?;
    let flags = read_u32(record, 20)?;
    let name_len = read_u16(record, 24)? as usize;
    let type_len = read_u16(record, 26)? as usize;
    let comment_len = read_u16(record, 28)? as usize;

    let mut pos = PRELUDE;
    let name = read_fixed_string(record, &mut pos, name_len)?;
    let type_name = read_fixed_string(record, &mut pos, type_len)?;
    let comment = read_fixed_string(record, &mut pos, comment_len)?;

    Ok(Symbol {
        group,
        offset,
        size,
        data_type_id,
        flags,
        upper_case_name: name.to_ascii_uppercase(),
        name,
        type_name,
        comment,
    })
}

/// Parses the full `SYM_DT_UPLOAD` payload into a [`DataTypeTable`], keyed by each
/// top-level entry's `type_name`.
pub fn parse_data_type_table(data: &[u8]) -> Result<DataTypeTable, ClientError> {
    let mut table = DataTypeTable::new();
    let mut cursor = 0usize;
    while cursor < data.len() {
        let entry = data
            .get(cursor..)
            .ok_or_else(|| ClientError::DecodeInvalid("data type table truncated".into()))?;
        let entry_length = read_u32(entry, 0)? as usize;
        if entry_length == 0 {
            return Err(ClientError::DecodeInvalid("zero-length data type entry".into()));
        }
        let record = entry.get(..entry_length).ok_or_else(|| {
            ClientError::DecodeInvalid("data type entry extends past buffer".into())
        })?;
        table.insert(parse_data_type_entry(record)?);
        cursor += entry_length;
    }
    Ok(table)
}

/// Parses one length-prefixed data-type entry, recursing into `sub_items`. `record`
/// includes its own `entry_length` prefix.
fn parse_data_type_entry(record: &[u8]) -> Result<DataType, ClientError> {
    const PRELUDE: usize = 42;
    if record.len() < PRELUDE {
        return Err(ClientError::FrameTooShort {
            expected: PRELUDE,
            got: record.len(),
        });
    }
    let version = read_u32(record, 4)?;
    let hash = read_u32(record, 8)?;
    let type_hash = read_u32(record, 12)?;
    let size = read_u32(record, 16)?;
    let offset = read_u32(record, 20)?;
    let primitive_kind = PrimitiveKind::from(read_u32(record, 24)?);
    let flags = read_u32(record, 28)?;
    let name_len = read_u16(record, 32)? as usize;
    let type_len = read_u16(record, 34)? as usize;
    let comment_len = read_u16(record, 36)? as usize;
    let array_dim_count = read_u16(record, 38)? as usize;
    let sub_item_count = read_u16(record, 40)? as usize;

    let mut pos = PRELUDE;
    let name = read_fixed_string(record, &mut pos, name_len)?;
    let type_name = read_fixed_string(record, &mut pos, type_len)?;
    let comment = read_fixed_string(record, &mut pos, comment_len)?;

    let mut array_dimensions = Vec::with_capacity(array_dim_count);
    for _ in 0..array_dim_count {
        let start = read_i32(record, pos)?;
        let length = read_u32(record, pos + 4)?;
        array_dimensions.push((start, length));
        pos += 8;
    }

    let mut sub_items = Vec::with_capacity(sub_item_count);
    for _ in 0..sub_item_count {
        let remaining = record
            .get(pos..)
            .ok_or_else(|| ClientError::DecodeInvalid("sub-item table truncated".into()))?;
        let sub_len = read_u32(remaining, 0)? as usize;
        if sub_len == 0 {
            return Err(ClientError::DecodeInvalid("zero-length sub-item entry".into()));
        }
        let sub_record = remaining
            .get(..sub_len)
            .ok_or_else(|| ClientError::DecodeInvalid("sub-item entry extends past buffer".into()))?;
        sub_items.push(parse_data_type_entry(sub_record)?);
        pos += sub_len;
    }

    Ok(DataType {
        version,
        hash,
        type_hash,
        size,
        offset,
        primitive_kind,
        flags,
        name,
        type_name,
        comment,
        array_dimensions,
        sub_items,
    })
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32, ClientError> {
    data.get(offset..offset + 4)
        .and_then(|s| s.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| ClientError::DecodeInvalid(format!("truncated u32 at offset {offset}")))
}

fn read_i32(data: &[u8], offset: usize) -> Result<i32, ClientError> {
    read_u32(data, offset).map(|v| v as i32)
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16, ClientError> {
    data.get(offset..offset + 2)
        .and_then(|s| s.try_into().ok())
        .map(u16::from_le_bytes)
        .ok_or_else(|| ClientError::DecodeInvalid(format!("truncated u16 at offset {offset}")))
}

/// Reads a NUL-terminated ASCII string of declared length `len` (not counting the
/// terminator) starting at `*pos`, then advances `*pos` past the terminator.
fn read_fixed_string(data: &[u8], pos: &mut usize, len: usize) -> Result<String, ClientError> {
    let end = *pos + len;
    let slice = data
        .get(*pos..end)
        .ok_or_else(|| ClientError::DecodeInvalid("string field extends past buffer".into()))?;
    let s = String::from_utf8_lossy(slice).into_owned();
    *pos = end + 1; // skip the NUL terminator
    Ok(s)
}
