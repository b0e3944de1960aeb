//! Tag path resolution: turns a dotted path like `.Program.Var[3][1].Field[0]` into a
//! [`FindTag`] record sufficient to issue a read/write.

use crate::errors::ClientError;
use crate::tables::{DataType, DataTypeTable, SymbolTable};
use crate::value::PrimitiveKind;

/// The result of resolving a tag path: everything needed to read, write, or subscribe.
#[derive(Debug, Clone, PartialEq)]
pub struct FindTag {
    pub group: u32,
    pub offset: u32,
    pub size: u32,
    pub type_name: String,
    pub primitive_kind: PrimitiveKind,
}

struct Segment {
    name: String,
    indices: Vec<i64>,
}

fn parse_segment(raw: &str, path: &str) -> Result<Segment, ClientError> {
    match raw.find('[') {
        None => Ok(Segment {
            name: raw.to_string(),
            indices: Vec::new(),
        }),
        Some(first_bracket) => {
            let name = raw[..first_bracket].to_string();
            let mut indices = Vec::new();
            let mut rest = &raw[first_bracket..];
            while !rest.is_empty() {
                let close = rest.find(']').ok_or_else(|| ClientError::TagPathInvalid {
                    path: path.to_string(),
                    reason: format!("unterminated index group in {raw:?}"),
                })?;
                let digits = &rest[1..close];
                let index: i64 = digits.trim().parse().map_err(|_| ClientError::TagPathInvalid {
                    path: path.to_string(),
                    reason: format!("non-numeric index {digits:?} in {raw:?}"),
                })?;
                indices.push(index);
                rest = &rest[close + 1..];
            }
            Ok(Segment { name, indices })
        }
    }
}

/// Folds `indices` into `(offset, size, type_name, primitive_kind)` against
/// `array_dimensions`, innermost-first as supplied, paired from the tail of
/// `array_dimensions`.
fn fold_indices(
    indices: &[i64],
    array_dimensions: &[(i32, u32)],
    offset: &mut u32,
    size: &mut u32,
) -> Result<(), ClientError> {
    if array_dimensions.is_empty() {
        return Err(ClientError::ArrayDimensionMismatch {
            tag_dims: 0,
            supplied: indices.len(),
        });
    }
    if indices.len() > array_dimensions.len() {
        return Err(ClientError::ArrayDimensionMismatch {
            tag_dims: array_dimensions.len(),
            supplied: indices.len(),
        });
    }

    let len = array_dimensions.len();
    for (k, &index) in indices.iter().enumerate() {
        let (start, length) = array_dimensions[len - 1 - k];
        let end = start as i64 + length as i64;
        if index < start as i64 || index >= end {
            return Err(ClientError::IndexOutOfBounds {
                index,
                start,
                end,
            });
        }
        *size /= length.max(1);
        *offset += *size * (index - start as i64) as u32;
    }
    Ok(())
}

/// Resolves `path` against the given symbol and data-type tables.
pub fn resolve(path: &str, symbols: &SymbolTable, types: &DataTypeTable) -> Result<FindTag, ClientError> {
    let raw_segments: Vec<&str> = path.split('.').collect();
    if raw_segments.len() < 2 {
        return Err(ClientError::TagPathInvalid {
            path: path.to_string(),
            reason: "path must contain at least two dot-separated segments".into(),
        });
    }

    let seg0 = parse_segment(raw_segments[0], path)?;
    let seg1 = parse_segment(raw_segments[1], path)?;
    let symbol_key = format!("{}.{}", seg0.name, seg1.name);

    let symbol = symbols
        .get(&symbol_key)
        .ok_or_else(|| ClientError::SymbolNotFound(symbol_key.clone()))?;

    let mut group = symbol.group;
    let mut offset = symbol.offset;
    let mut size = symbol.size;
    let mut type_name = symbol.type_name.clone();
    let mut primitive_kind = PrimitiveKind::from(symbol.data_type_id);
    let mut current_type: Option<&DataType> = types.get(&type_name);

    if !seg1.indices.is_empty() {
        let dims = current_type
            .map(|dt| dt.array_dimensions.as_slice())
            .unwrap_or(&[]);
        fold_indices(&seg1.indices, dims, &mut offset, &mut size)?;
        if let Some(dt) = current_type {
            type_name = dt.type_name.clone();
            primitive_kind = dt.primitive_kind;
            current_type = if dt.sub_items.is_empty() {
                types.get(&type_name)
            } else {
                Some(dt)
            };
        }
    }

    for raw in &raw_segments[2..] {
        let segment = parse_segment(raw, path)?;
        let upper = segment.name.to_ascii_uppercase();
        let dt = current_type.ok_or_else(|| ClientError::SubItemNotFound(segment.name.clone()))?;
        let sub = dt
            .sub_items
            .iter()
            .find(|s| s.name.to_ascii_uppercase() == upper)
            .ok_or_else(|| ClientError::SubItemNotFound(segment.name.clone()))?;

        group = symbol.group;
        offset += sub.offset;
        size = sub.size;
        type_name = sub.type_name.clone();
        primitive_kind = sub.primitive_kind;

        if !segment.indices.is_empty() {
            fold_indices(&segment.indices, &sub.array_dimensions, &mut offset, &mut size)?;
        }

        current_type = if sub.sub_items.is_empty() {
            types.get(&type_name)
        } else {
            Some(sub)
        };
    }

    Ok(FindTag {
        group,
        offset,
        size,
        type_name,
        primitive_kind,
    })
}
