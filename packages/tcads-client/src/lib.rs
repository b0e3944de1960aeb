//! Async client for the Beckhoff TwinCAT ADS/AMS protocol.
//!
//! Resolves dotted tag paths against a PLC's symbol and data-type tables, issues
//! typed reads/writes, and keeps change notifications alive across reconnects.

pub mod client;
pub mod config;
pub mod connection;
pub mod errors;
pub mod events;
pub mod notifications;
pub mod resolver;
pub mod tables;
pub mod value;

pub use client::Client;
pub use config::{ClientConfig, SourceConfig, TargetConfig};
pub use errors::{ClientError, Result};
pub use events::{ClientEvent, EventEmitter};
pub use notifications::{Callback, CallbackId};
pub use resolver::FindTag;
pub use tables::{DataType, DataTypeTable, Symbol, SymbolTable, UploadInfo};
pub use value::{AdsValue, PrimitiveKind};

pub use tcads_core::{
    ads::{AdsReturnCode, IndexGroup, IndexOffset},
    ams::{AmsAddr, AmsNetId, AmsPort},
};
