//! Typed request/response pairs for every ADS command, built directly on top
//! of [`crate::ads`] and [`crate::ams`].
//!
//! Every command type comes in a zero-copy view that borrows from the parsed
//! [`AmsFrame`](crate::io::AmsFrame) and an owned variant for construction and
//! storage, following the same pattern throughout: `new`/`with_reserved` to
//! build one, `to_frame`/`into_frame` to serialize, `TryFrom<&AmsFrame>` to parse.

mod ads_add_device_notification;
mod ads_delete_device_notification;
mod ads_device_notification;
mod ads_read;
mod ads_read_device_info;
mod ads_read_state;
mod ads_read_write;
mod ads_write;
mod ads_write_control;
mod error;
pub mod index_groups;
mod utils;

pub use ads_add_device_notification::{
    AdsAddDeviceNotificationRequest, AdsAddDeviceNotificationResponse,
};
pub use ads_delete_device_notification::{
    AdsDeleteDeviceNotificationRequest, AdsDeleteDeviceNotificationResponse,
};
pub use ads_device_notification::{
    AdsDeviceNotification, AdsDeviceNotificationOwned, AdsNotificationSample,
    AdsNotificationSampleOwned, AdsStampHeader, AdsStampHeaderOwned,
};
pub use ads_read::{AdsReadRequest, AdsReadResponse, AdsReadResponseOwned};
pub use ads_read_device_info::{AdsReadDeviceInfoRequest, AdsReadDeviceInfoResponse};
pub use ads_read_state::{AdsReadStateRequest, AdsReadStateResponse};
pub use ads_read_write::{
    AdsReadWriteRequest, AdsReadWriteRequestOwned, AdsReadWriteResponse,
    AdsReadWriteResponseOwned,
};
pub use ads_write::{AdsWriteRequest, AdsWriteRequestOwned, AdsWriteResponse};
pub use ads_write_control::{AdsWriteControlRequest, AdsWriteControlResponse};
pub use error::ProtocolError;
pub use index_groups::ReservedIndexGroup;
pub(crate) use utils::parse_ads_frame;
