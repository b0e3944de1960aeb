//! Decoded value representation and the primitive/structure/array codec.

use crate::errors::ClientError;
use crate::tables::DataType;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;

/// The runtime's numeric primitive type tag (`ADST_*` constants), carried by every
/// [`DataType`] entry as `primitive_kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Void,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Real32,
    Real64,
    Real80,
    Bit,
    String,
    WString,
    BigType,
    Unknown(u32),
}

impl From<u32> for PrimitiveKind {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Void,
            2 => Self::Int16,
            3 => Self::Int32,
            4 => Self::Real32,
            5 => Self::Real64,
            16 => Self::Int8,
            17 => Self::Uint8,
            18 => Self::Uint16,
            19 => Self::Uint32,
            20 => Self::Int64,
            21 => Self::Uint64,
            30 => Self::String,
            31 => Self::WString,
            32 => Self::Real80,
            33 => Self::Bit,
            65 => Self::BigType,
            n => Self::Unknown(n),
        }
    }
}

impl From<PrimitiveKind> for u32 {
    fn from(value: PrimitiveKind) -> Self {
        match value {
            PrimitiveKind::Void => 0,
            PrimitiveKind::Int16 => 2,
            PrimitiveKind::Int32 => 3,
            PrimitiveKind::Real32 => 4,
            PrimitiveKind::Real64 => 5,
            PrimitiveKind::Int8 => 16,
            PrimitiveKind::Uint8 => 17,
            PrimitiveKind::Uint16 => 18,
            PrimitiveKind::Uint32 => 19,
            PrimitiveKind::Int64 => 20,
            PrimitiveKind::Uint64 => 21,
            PrimitiveKind::String => 30,
            PrimitiveKind::WString => 31,
            PrimitiveKind::Real80 => 32,
            PrimitiveKind::Bit => 33,
            PrimitiveKind::BigType => 65,
            PrimitiveKind::Unknown(n) => n,
        }
    }
}

/// A decoded ADS value. Callers pattern-match on this; only [`AdsValue::Blob`] exposes
/// raw bytes, and only for data types the codec cannot otherwise interpret.
#[derive(Debug, Clone, PartialEq)]
pub enum AdsValue {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    DateTime(DateTime<Utc>),
    /// `TIME`/`TOD`/`TIME_OF_DAY`, rendered `HH:MM` per local wall clock.
    Time(String),
    /// Insertion-ordered, matching sub-item declaration order.
    Struct(Vec<(String, AdsValue)>),
    /// Dense, zero-based. Callers wanting the PLC-visible index add the dimension's `start`.
    Array(Vec<AdsValue>),
    Blob(Vec<u8>),
}

/// Resolves a named data type, recursing through [`DataTypeTable`](crate::tables::DataTypeTable) by name.
pub trait TypeLookup {
    fn lookup(&self, type_name: &str) -> Option<&DataType>;
}

impl<S: std::hash::BuildHasher> TypeLookup for HashMap<String, DataType, S> {
    fn lookup(&self, type_name: &str) -> Option<&DataType> {
        self.get(type_name)
    }
}

/// Decodes `data` at a tag whose runtime type is `primitive_kind`/`type_name`, consulting
/// `types` for `BIGTYPE` dispatch.
pub fn decode(
    primitive_kind: PrimitiveKind,
    type_name: &str,
    data: &[u8],
    types: &dyn TypeLookup,
) -> Result<AdsValue, ClientError> {
    match primitive_kind {
        PrimitiveKind::Bit => Ok(AdsValue::Bool(data.first().copied().unwrap_or(0) != 0)),
        PrimitiveKind::Int8 => Ok(AdsValue::I8(read_i8(data)?)),
        PrimitiveKind::Uint8 => Ok(AdsValue::U8(read_u8(data)?)),
        PrimitiveKind::Int16 => Ok(AdsValue::I16(i16::from_le_bytes(read_n(data)?))),
        PrimitiveKind::Uint16 => Ok(AdsValue::U16(u16::from_le_bytes(read_n(data)?))),
        PrimitiveKind::Int32 => Ok(AdsValue::I32(i32::from_le_bytes(read_n(data)?))),
        PrimitiveKind::Uint32 => Ok(AdsValue::U32(u32::from_le_bytes(read_n(data)?))),
        PrimitiveKind::Int64 => Ok(AdsValue::I64(i64::from_le_bytes(read_n(data)?))),
        PrimitiveKind::Uint64 => Ok(AdsValue::U64(u64::from_le_bytes(read_n(data)?))),
        PrimitiveKind::Real32 => Ok(AdsValue::F32(f32::from_le_bytes(read_n(data)?))),
        PrimitiveKind::Real64 => Ok(AdsValue::F64(f64::from_le_bytes(read_n(data)?))),
        PrimitiveKind::Real80 => Err(ClientError::UnsupportedType("REAL80".into())),
        PrimitiveKind::Void => Ok(AdsValue::U32(u32::from_le_bytes(read_n(data)?))),
        PrimitiveKind::String | PrimitiveKind::WString => Ok(AdsValue::String(decode_string(data))),
        PrimitiveKind::BigType => decode_big_type(type_name, data, types),
        PrimitiveKind::Unknown(_) => Err(ClientError::UnsupportedType(type_name.to_string())),
    }
}

/// Encodes `value` against a tag whose runtime type is `primitive_kind`/`type_name` into a
/// buffer exactly `size` bytes long.
pub fn encode(
    primitive_kind: PrimitiveKind,
    type_name: &str,
    size: usize,
    value: &AdsValue,
    types: &dyn TypeLookup,
) -> Result<Vec<u8>, ClientError> {
    match primitive_kind {
        PrimitiveKind::Bit => match value {
            AdsValue::Bool(b) => Ok(vec![if *b { 1 } else { 0 }]),
            _ => Err(type_mismatch("BIT", value)),
        },
        PrimitiveKind::Int8 => match value {
            AdsValue::I8(v) => Ok(vec![*v as u8]),
            _ => Err(type_mismatch("INT8", value)),
        },
        PrimitiveKind::Uint8 => match value {
            AdsValue::U8(v) => Ok(vec![*v]),
            _ => Err(type_mismatch("UINT8", value)),
        },
        PrimitiveKind::Int16 => match value {
            AdsValue::I16(v) => Ok(v.to_le_bytes().to_vec()),
            _ => Err(type_mismatch("INT16", value)),
        },
        PrimitiveKind::Uint16 => match value {
            AdsValue::U16(v) => Ok(v.to_le_bytes().to_vec()),
            _ => Err(type_mismatch("UINT16", value)),
        },
        PrimitiveKind::Int32 => match value {
            AdsValue::I32(v) => Ok(v.to_le_bytes().to_vec()),
            _ => Err(type_mismatch("INT32", value)),
        },
        PrimitiveKind::Uint32 => match value {
            AdsValue::U32(v) => Ok(v.to_le_bytes().to_vec()),
            _ => Err(type_mismatch("UINT32", value)),
        },
        PrimitiveKind::Int64 => match value {
            AdsValue::I64(v) => Ok(v.to_le_bytes().to_vec()),
            _ => Err(type_mismatch("INT64", value)),
        },
        PrimitiveKind::Uint64 => match value {
            AdsValue::U64(v) => Ok(v.to_le_bytes().to_vec()),
            _ => Err(type_mismatch("UINT64", value)),
        },
        PrimitiveKind::Real32 => match value {
            AdsValue::F32(v) => Ok(v.to_le_bytes().to_vec()),
            _ => Err(type_mismatch("REAL32", value)),
        },
        PrimitiveKind::Real64 => match value {
            AdsValue::F64(v) => Ok(v.to_le_bytes().to_vec()),
            _ => Err(type_mismatch("REAL64", value)),
        },
        PrimitiveKind::Real80 => Err(ClientError::UnsupportedType("REAL80".into())),
        PrimitiveKind::Void => Err(ClientError::UnsupportedType("VOID".into())),
        PrimitiveKind::String | PrimitiveKind::WString => match value {
            AdsValue::String(s) => Ok(encode_string(s, size)),
            _ => Err(type_mismatch("STRING", value)),
        },
        PrimitiveKind::BigType => encode_big_type(type_name, value, types),
        PrimitiveKind::Unknown(_) => Err(ClientError::UnsupportedType(type_name.to_string())),
    }
}

fn type_mismatch(expected: &str, got: &AdsValue) -> ClientError {
    ClientError::UnsupportedType(format!("expected {expected}, got {got:?}"))
}

fn read_n<const N: usize>(data: &[u8]) -> Result<[u8; N], ClientError> {
    data.get(..N)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| ClientError::DecodeInvalid(format!("expected {N} bytes, got {}", data.len())))
}

fn read_i8(data: &[u8]) -> Result<i8, ClientError> {
    Ok(read_u8(data)? as i8)
}

fn read_u8(data: &[u8]) -> Result<u8, ClientError> {
    data.first()
        .copied()
        .ok_or_else(|| ClientError::DecodeInvalid("expected 1 byte, got 0".into()))
}

fn decode_string(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&data[..end]);
    decoded.into_owned()
}

fn encode_string(s: &str, size: usize) -> Vec<u8> {
    let (encoded, _, _) = encoding_rs::WINDOWS_1252.encode(s);
    let mut buf = vec![0u8; size];
    let n = encoded.len().min(size.saturating_sub(1));
    buf[..n].copy_from_slice(&encoded[..n]);
    buf
}

fn decode_big_type(
    type_name: &str,
    data: &[u8],
    types: &dyn TypeLookup,
) -> Result<AdsValue, ClientError> {
    match type_name {
        "DATE" | "DT" | "DATE_AND_TIME" => {
            let secs = u32::from_le_bytes(read_n(data)?) as i64;
            Utc.timestamp_opt(secs, 0)
                .single()
                .map(AdsValue::DateTime)
                .ok_or_else(|| ClientError::DecodeInvalid("invalid DATE_AND_TIME timestamp".into()))
        }
        "TIME" | "TOD" | "TIME_OF_DAY" => {
            let millis = u32::from_le_bytes(read_n(data)?) as i64;
            let total_minutes = millis / 60_000;
            let hh = (total_minutes / 60) % 24;
            let mm = total_minutes % 60;
            Ok(AdsValue::Time(format!("{hh:02}:{mm:02}")))
        }
        _ => {
            let Some(dt) = types.lookup(type_name) else {
                return Ok(AdsValue::Blob(data.to_vec()));
            };
            if !dt.array_dimensions.is_empty() {
                decode_array(dt, data, types)
            } else if !dt.sub_items.is_empty() {
                decode_struct(dt, data, types)
            } else {
                Ok(AdsValue::Blob(data.to_vec()))
            }
        }
    }
}

fn encode_big_type(
    type_name: &str,
    value: &AdsValue,
    types: &dyn TypeLookup,
) -> Result<Vec<u8>, ClientError> {
    match type_name {
        "DATE" | "DT" | "DATE_AND_TIME" => match value {
            AdsValue::DateTime(dt) => Ok((dt.timestamp() as u32).to_le_bytes().to_vec()),
            _ => Err(type_mismatch("DATE_AND_TIME", value)),
        },
        "TIME" | "TOD" | "TIME_OF_DAY" => match value {
            AdsValue::Time(s) => {
                let (hh, mm) = s
                    .split_once(':')
                    .ok_or_else(|| ClientError::DecodeInvalid(format!("invalid TIME value {s:?}")))?;
                let hh: i64 = hh
                    .parse()
                    .map_err(|_| ClientError::DecodeInvalid(format!("invalid TIME value {s:?}")))?;
                let mm: i64 = mm
                    .parse()
                    .map_err(|_| ClientError::DecodeInvalid(format!("invalid TIME value {s:?}")))?;
                let millis = ((hh * 60 + mm) * 60_000) as u32;
                Ok(millis.to_le_bytes().to_vec())
            }
            _ => Err(type_mismatch("TIME", value)),
        },
        _ => {
            let Some(dt) = types.lookup(type_name) else {
                return Err(ClientError::UnsupportedType(type_name.to_string()));
            };
            if !dt.array_dimensions.is_empty() {
                encode_array(dt, value, types)
            } else if !dt.sub_items.is_empty() {
                encode_struct(dt, value, types)
            } else {
                Err(ClientError::UnsupportedType(type_name.to_string()))
            }
        }
    }
}

fn decode_struct(
    dt: &DataType,
    data: &[u8],
    types: &dyn TypeLookup,
) -> Result<AdsValue, ClientError> {
    let mut fields = Vec::with_capacity(dt.sub_items.len());
    for sub in &dt.sub_items {
        let end = sub.offset as usize + sub.size as usize;
        let slice = data.get(sub.offset as usize..end).ok_or_else(|| {
            ClientError::DecodeInvalid(format!(
                "sub-item {} extends past parent buffer",
                sub.name
            ))
        })?;
        let value = decode(sub.primitive_kind, &sub.type_name, slice, types)?;
        fields.push((sub.name.clone(), value));
    }
    Ok(AdsValue::Struct(fields))
}

fn encode_struct(
    dt: &DataType,
    value: &AdsValue,
    types: &dyn TypeLookup,
) -> Result<Vec<u8>, ClientError> {
    let AdsValue::Struct(fields) = value else {
        return Err(type_mismatch(&dt.name, value));
    };

    let expected: Vec<String> = dt.sub_items.iter().map(|s| s.name.clone()).collect();
    let got: Vec<String> = fields.iter().map(|(k, _)| k.clone()).collect();
    if got.len() != expected.len() || !expected.iter().all(|k| got.contains(k)) {
        return Err(ClientError::StructureShapeMismatch { expected, got });
    }

    let mut buf = vec![0u8; dt.size as usize];
    for sub in &dt.sub_items {
        let (_, v) = fields
            .iter()
            .find(|(k, _)| k == &sub.name)
            .ok_or_else(|| ClientError::SubItemNotFound(sub.name.clone()))?;
        let encoded = encode(sub.primitive_kind, &sub.type_name, sub.size as usize, v, types)?;
        let end = sub.offset as usize + sub.size as usize;
        buf.get_mut(sub.offset as usize..end)
            .ok_or_else(|| {
                ClientError::DecodeInvalid(format!(
                    "sub-item {} extends past parent buffer",
                    sub.name
                ))
            })?
            .copy_from_slice(&encoded);
    }
    Ok(buf)
}

fn decode_array(
    dt: &DataType,
    data: &[u8],
    types: &dyn TypeLookup,
) -> Result<AdsValue, ClientError> {
    let Some((&(_start, length), rest_dims)) = dt.array_dimensions.split_first() else {
        return decode_element(dt, data, types);
    };
    let length = length as usize;
    let element_size = data.len() / length.max(1);

    let mut elements = Vec::with_capacity(length);
    for i in 0..length {
        let start = i * element_size;
        let end = start + element_size;
        let slice = data.get(start..end).ok_or_else(|| {
            ClientError::DecodeInvalid("array element extends past parent buffer".into())
        })?;
        if rest_dims.is_empty() {
            elements.push(decode_element(dt, slice, types)?);
        } else {
            let inner = DataType {
                array_dimensions: rest_dims.to_vec(),
                size: element_size as u32,
                ..dt.clone()
            };
            elements.push(decode_array(&inner, slice, types)?);
        }
    }
    Ok(AdsValue::Array(elements))
}

fn encode_array(
    dt: &DataType,
    value: &AdsValue,
    types: &dyn TypeLookup,
) -> Result<Vec<u8>, ClientError> {
    let AdsValue::Array(elements) = value else {
        return Err(type_mismatch(&dt.name, value));
    };

    let Some((&(_start, length), rest_dims)) = dt.array_dimensions.split_first() else {
        return encode_element(dt, elements.first().ok_or_else(|| {
            ClientError::ArrayShapeMismatch {
                expected: 1,
                got: 0,
            }
        })?, types);
    };
    let length = length as usize;
    let defined: Vec<&AdsValue> = elements
        .iter()
        .skip(elements.len().saturating_sub(length))
        .collect();
    if defined.len() != length {
        return Err(ClientError::ArrayShapeMismatch {
            expected: length,
            got: defined.len(),
        });
    }

    let mut buf = Vec::new();
    for element in defined {
        let encoded = if rest_dims.is_empty() {
            encode_element(dt, element, types)?
        } else {
            let inner = DataType {
                array_dimensions: rest_dims.to_vec(),
                ..dt.clone()
            };
            encode_array(&inner, element, types)?
        };
        buf.extend_from_slice(&encoded);
    }
    Ok(buf)
}

fn decode_element(dt: &DataType, data: &[u8], types: &dyn TypeLookup) -> Result<AdsValue, ClientError> {
    if dt.sub_items.is_empty() {
        decode(dt.primitive_kind, &dt.type_name, data, types)
    } else {
        decode_struct(dt, data, types)
    }
}

fn encode_element(dt: &DataType, value: &AdsValue, types: &dyn TypeLookup) -> Result<Vec<u8>, ClientError> {
    if dt.sub_items.is_empty() {
        encode(dt.primitive_kind, &dt.type_name, dt.size as usize, value, types)
    } else {
        encode_struct(dt, value, types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyTypes;
    impl TypeLookup for EmptyTypes {
        fn lookup(&self, _type_name: &str) -> Option<&DataType> {
            None
        }
    }

    #[test]
    fn decodes_bit_true() {
        let v = decode(PrimitiveKind::Bit, "BOOL", &[0x01], &EmptyTypes).unwrap();
        assert_eq!(v, AdsValue::Bool(true));
    }

    #[test]
    fn decodes_bit_false() {
        let v = decode(PrimitiveKind::Bit, "BOOL", &[0x00], &EmptyTypes).unwrap();
        assert_eq!(v, AdsValue::Bool(false));
    }

    #[test]
    fn encode_then_decode_i32_roundtrips() {
        let value = AdsValue::I32(-42);
        let bytes = encode(PrimitiveKind::Int32, "DINT", 4, &value, &EmptyTypes).unwrap();
        let decoded = decode(PrimitiveKind::Int32, "DINT", &bytes, &EmptyTypes).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn string_decode_truncates_at_nul() {
        let mut data = b"hello".to_vec();
        data.extend_from_slice(&[0u8, 0xFF, 0xFF]);
        let v = decode(PrimitiveKind::String, "STRING(80)", &data, &EmptyTypes).unwrap();
        assert_eq!(v, AdsValue::String("hello".into()));
    }

    #[test]
    fn string_encode_pads_with_zeros() {
        let bytes = encode_string("hi", 5);
        assert_eq!(bytes, vec![b'h', b'i', 0, 0, 0]);
    }

    #[test]
    fn real80_is_unsupported() {
        let err = decode(PrimitiveKind::Real80, "LREAL80", &[0u8; 10], &EmptyTypes).unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedType(_)));
    }

    #[test]
    fn time_of_day_renders_hh_mm() {
        let millis: u32 = (13 * 60 + 30) * 60_000;
        let v = decode_big_type("TIME_OF_DAY", &millis.to_le_bytes(), &EmptyTypes).unwrap();
        assert_eq!(v, AdsValue::Time("13:30".into()));
    }

    #[test]
    fn time_of_day_roundtrips_through_encode() {
        let value = AdsValue::Time("08:05".into());
        let bytes = encode_big_type("TOD", &value, &EmptyTypes).unwrap();
        let decoded = decode_big_type("TOD", &bytes, &EmptyTypes).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn unknown_bigtype_without_table_entry_decodes_as_blob() {
        let v = decode_big_type("MyFB", &[1, 2, 3], &EmptyTypes).unwrap();
        assert_eq!(v, AdsValue::Blob(vec![1, 2, 3]));
    }

    fn alarms_struct() -> DataType {
        DataType {
            version: 1,
            hash: 0,
            type_hash: 0,
            size: 3,
            offset: 0,
            primitive_kind: PrimitiveKind::BigType,
            flags: 0,
            name: "st".into(),
            type_name: "Alarms".into(),
            comment: String::new(),
            array_dimensions: vec![],
            sub_items: vec![
                sub_item("IBJFB_KYL", 0),
                sub_item("IBJFB_FRYS", 1),
                sub_item("IBJFB_UTOMHUS", 2),
            ],
        }
    }

    fn sub_item(name: &str, offset: u32) -> DataType {
        DataType {
            version: 1,
            hash: 0,
            type_hash: 0,
            size: 1,
            offset,
            primitive_kind: PrimitiveKind::Bit,
            flags: 0,
            name: name.into(),
            type_name: "BOOL".into(),
            comment: String::new(),
            array_dimensions: vec![],
            sub_items: vec![],
        }
    }

    #[test]
    fn structure_write_matches_scenario() {
        let dt = alarms_struct();
        let value = AdsValue::Struct(vec![
            ("IBJFB_KYL".into(), AdsValue::Bool(true)),
            ("IBJFB_FRYS".into(), AdsValue::Bool(false)),
            ("IBJFB_UTOMHUS".into(), AdsValue::Bool(true)),
        ]);
        let bytes = encode_struct(&dt, &value, &EmptyTypes).unwrap();
        assert_eq!(bytes, vec![0x01, 0x00, 0x01]);
    }

    #[test]
    fn structure_decode_roundtrips() {
        let dt = alarms_struct();
        let decoded = decode_struct(&dt, &[0x01, 0x00, 0x01], &EmptyTypes).unwrap();
        let AdsValue::Struct(fields) = decoded else {
            panic!("expected struct");
        };
        assert_eq!(fields[0], ("IBJFB_KYL".into(), AdsValue::Bool(true)));
        assert_eq!(fields[1], ("IBJFB_FRYS".into(), AdsValue::Bool(false)));
        assert_eq!(fields[2], ("IBJFB_UTOMHUS".into(), AdsValue::Bool(true)));
    }

    #[test]
    fn structure_shape_mismatch_on_missing_key() {
        let dt = alarms_struct();
        let value = AdsValue::Struct(vec![("IBJFB_KYL".into(), AdsValue::Bool(true))]);
        let err = encode_struct(&dt, &value, &EmptyTypes).unwrap_err();
        assert!(matches!(err, ClientError::StructureShapeMismatch { .. }));
    }

    fn bool_array_1d(length: u32) -> DataType {
        DataType {
            version: 1,
            hash: 0,
            type_hash: 0,
            size: length,
            offset: 0,
            primitive_kind: PrimitiveKind::Bit,
            flags: 0,
            name: "arr".into(),
            type_name: "BOOL".into(),
            comment: String::new(),
            array_dimensions: vec![(1, length)],
            sub_items: vec![],
        }
    }

    #[test]
    fn array_decode_is_dense_zero_based() {
        let dt = bool_array_1d(2);
        let decoded = decode_array(&dt, &[0x00, 0x01], &EmptyTypes).unwrap();
        assert_eq!(
            decoded,
            AdsValue::Array(vec![AdsValue::Bool(false), AdsValue::Bool(true)])
        );
    }

    #[test]
    fn array_encode_skips_leading_empty_slots() {
        let dt = bool_array_1d(2);
        let value = AdsValue::Array(vec![
            AdsValue::Bool(false),
            AdsValue::Bool(false),
            AdsValue::Bool(true),
            AdsValue::Bool(false),
        ]);
        let bytes = encode_array(&dt, &value, &EmptyTypes).unwrap();
        assert_eq!(bytes, vec![0x01, 0x00]);
    }

    #[test]
    fn array_encode_count_mismatch_is_shape_error() {
        let dt = bool_array_1d(2);
        let value = AdsValue::Array(vec![AdsValue::Bool(true)]);
        let err = encode_array(&dt, &value, &EmptyTypes).unwrap_err();
        assert!(matches!(err, ClientError::ArrayShapeMismatch { .. }));
    }
}
