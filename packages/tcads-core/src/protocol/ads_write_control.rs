use super::{ProtocolError, parse_ads_frame};
use crate::ads::{AdsCommand, AdsError, AdsHeader, AdsReturnCode, AdsState, DeviceState, StateFlag};
use crate::ams::{AmsAddr, AmsCommand};
use crate::io::AmsFrame;

/// Represents an ADS Write Control Request (Command `0x0005`).
///
/// Requests a change of the ADS and device state of the target, optionally
/// carrying device-specific data (e.g. a reset reason code).
///
/// # Usage
/// * **Client:** Sends this to change the target's run state (e.g. Run -> Stop).
/// * **Server:** Receives this, applies the new state, and replies with
///   [`AdsWriteControlResponse`].
///
/// # Protocol Details
/// * **AMS Command:** [`AdsCommand`](AmsCommand::AdsCommand) (`0x0000`)
/// * **ADS Command:** [`AdsWriteControl`](AdsCommand::AdsWriteControl) (`0x0005`)
/// * **ADS Payload Length:** 8 + n bytes
/// * **ADS Payload Layout:**
///   * **ADS State:** 2 bytes ([`AdsState`]) - the requested ADS state.
///   * **Device State:** 2 bytes ([`DeviceState`]) - the requested device state.
///   * **Length:** 4 bytes (u32) - length of the data that follows.
///   * **Data:** n bytes - device-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdsWriteControlRequest {
    header: AdsHeader,
    ads_state: AdsState,
    device_state: DeviceState,
    data: Vec<u8>,
}

impl AdsWriteControlRequest {
    /// Minimum size of the ADS payload (ADS State + Device State + Length).
    pub const MIN_PAYLOAD_SIZE: usize = 8;

    /// Creates a new Write Control Request.
    pub fn new(
        target: AmsAddr,
        source: AmsAddr,
        invoke_id: u32,
        ads_state: AdsState,
        device_state: DeviceState,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        let data = data.into();

        let header = AdsHeader::new(
            target,
            source,
            AdsCommand::AdsWriteControl,
            StateFlag::tcp_ads_request(),
            (Self::MIN_PAYLOAD_SIZE + data.len()) as u32,
            AdsReturnCode::Ok,
            invoke_id,
        );

        Self {
            header,
            ads_state,
            device_state,
            data,
        }
    }

    /// Tries to parse a request from an AMS Frame.
    pub fn try_from_frame(frame: &AmsFrame) -> Result<Self, ProtocolError> {
        Self::try_from(frame)
    }

    /// Returns the ADS header.
    pub fn header(&self) -> &AdsHeader {
        &self.header
    }

    /// Returns the requested ADS state.
    pub fn ads_state(&self) -> AdsState {
        self.ads_state
    }

    /// Returns the requested device state.
    pub fn device_state(&self) -> DeviceState {
        self.device_state
    }

    /// Returns the device-specific data accompanying the request.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the request and converts it into an AMS Frame.
    pub fn into_frame(self) -> AmsFrame {
        AmsFrame::from(&self)
    }

    /// Serializes the request into an AMS Frame.
    pub fn to_frame(&self) -> AmsFrame {
        AmsFrame::from(self)
    }

    /// Parses only the ADS payload portion (8 + n bytes).
    pub fn parse_payload(
        payload: &[u8],
    ) -> Result<(AdsState, DeviceState, Vec<u8>), ProtocolError> {
        if payload.len() < Self::MIN_PAYLOAD_SIZE {
            return Err(AdsError::UnexpectedDataLength {
                expected: Self::MIN_PAYLOAD_SIZE,
                got: payload.len(),
            })?;
        }

        let ads_state = AdsState::try_from_slice(&payload[0..2]).map_err(AdsError::from)?;
        let device_state = DeviceState::from_le_bytes(payload[2..4].try_into().unwrap());
        let length = u32::from_le_bytes(payload[4..8].try_into().unwrap()) as usize;

        if payload.len() < Self::MIN_PAYLOAD_SIZE + length {
            return Err(AdsError::UnexpectedDataLength {
                expected: Self::MIN_PAYLOAD_SIZE + length,
                got: payload.len(),
            })?;
        }

        let data = payload[Self::MIN_PAYLOAD_SIZE..Self::MIN_PAYLOAD_SIZE + length].to_vec();

        Ok((ads_state, device_state, data))
    }
}

impl From<&AdsWriteControlRequest> for AmsFrame {
    fn from(value: &AdsWriteControlRequest) -> Self {
        let mut payload = Vec::with_capacity(
            AdsHeader::LENGTH + AdsWriteControlRequest::MIN_PAYLOAD_SIZE + value.data.len(),
        );

        payload.extend_from_slice(&value.header.to_bytes());
        payload.extend_from_slice(&value.ads_state.to_bytes());
        payload.extend_from_slice(&value.device_state.to_le_bytes());
        payload.extend_from_slice(&(value.data.len() as u32).to_le_bytes());
        payload.extend_from_slice(&value.data);

        AmsFrame::new(AmsCommand::AdsCommand, payload)
    }
}

impl From<AdsWriteControlRequest> for AmsFrame {
    fn from(value: AdsWriteControlRequest) -> Self {
        AmsFrame::from(&value)
    }
}

impl TryFrom<&AmsFrame> for AdsWriteControlRequest {
    type Error = ProtocolError;

    fn try_from(value: &AmsFrame) -> Result<Self, Self::Error> {
        let (header, data) = parse_ads_frame(value, AdsCommand::AdsWriteControl, true)?;

        let (ads_state, device_state, data) = Self::parse_payload(data)?;

        Ok(Self {
            header,
            ads_state,
            device_state,
            data,
        })
    }
}

/// Represents an ADS Write Control Response (Command `0x0005`).
///
/// # Protocol Details
/// * **ADS Payload Length:** 4 bytes (ADS Return Code only)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdsWriteControlResponse {
    header: AdsHeader,
    result: AdsReturnCode,
}

impl AdsWriteControlResponse {
    /// Size of the ADS payload (ADS Return Code).
    pub const PAYLOAD_SIZE: usize = 4;

    /// Creates a new Write Control Response.
    pub fn new(target: AmsAddr, source: AmsAddr, invoke_id: u32, result: AdsReturnCode) -> Self {
        let header = AdsHeader::new(
            target,
            source,
            AdsCommand::AdsWriteControl,
            StateFlag::tcp_ads_response(),
            Self::PAYLOAD_SIZE as u32,
            result,
            invoke_id,
        );

        Self { header, result }
    }

    /// Tries to parse a response from an AMS Frame.
    pub fn try_from_frame(frame: &AmsFrame) -> Result<Self, ProtocolError> {
        Self::try_from(frame)
    }

    /// Returns the ADS header.
    pub fn header(&self) -> &AdsHeader {
        &self.header
    }

    /// Returns the [ADS Return Code](AdsReturnCode).
    pub fn result(&self) -> AdsReturnCode {
        self.result
    }

    /// Consumes the response and converts it into an AMS Frame.
    pub fn into_frame(self) -> AmsFrame {
        AmsFrame::from(&self)
    }

    /// Serializes the response into an AMS Frame.
    pub fn to_frame(&self) -> AmsFrame {
        AmsFrame::from(self)
    }
}

impl From<&AdsWriteControlResponse> for AmsFrame {
    fn from(value: &AdsWriteControlResponse) -> Self {
        let mut payload =
            Vec::with_capacity(AdsHeader::LENGTH + AdsWriteControlResponse::PAYLOAD_SIZE);

        payload.extend_from_slice(&value.header.to_bytes());
        payload.extend_from_slice(&value.result.to_bytes());

        AmsFrame::new(AmsCommand::AdsCommand, payload)
    }
}

impl From<AdsWriteControlResponse> for AmsFrame {
    fn from(value: AdsWriteControlResponse) -> Self {
        AmsFrame::from(&value)
    }
}

impl TryFrom<&AmsFrame> for AdsWriteControlResponse {
    type Error = ProtocolError;

    fn try_from(value: &AmsFrame) -> Result<Self, Self::Error> {
        let (header, data) = parse_ads_frame(value, AdsCommand::AdsWriteControl, false)?;

        if data.len() != Self::PAYLOAD_SIZE {
            return Err(AdsError::UnexpectedDataLength {
                expected: Self::PAYLOAD_SIZE,
                got: data.len(),
            })?;
        }

        let result = AdsReturnCode::try_from_slice(&data[0..4]).map_err(AdsError::from)?;

        Ok(Self { header, result })
    }
}
