use crate::ams::{AMS_TCP_HEADER_LEN, AmsCommand, AmsTcpHeader};

/// Maximum allowed AMS frame/packet size (64KB) to prevent allocation attacks.
pub const AMS_FRAME_MAX_LEN: usize = 65535 - AMS_TCP_HEADER_LEN;

/// A single AMS frame/packet consisting of a header and a payload.
///
/// This struct is I/O-agnostic and simply holds the frame data.
/// Reading and writing frames is handled by the I/O layer
/// ([`blocking`](crate::io::blocking) or [`tokio`](crate::io::tokio)).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AmsFrame {
    header: AmsTcpHeader,
    payload: Vec<u8>,
}

impl AmsFrame {
    /// Creates a new frame with the given command and payload.
    ///
    /// # Panics
    ///
    /// Panics if the payload exceeds [`AMS_FRAME_MAX_LEN`].
    /// Use [`AmsFrame::try_new`] for fallible construction.
    pub fn new(command: AmsCommand, payload: impl Into<Vec<u8>>) -> Self {
        let payload = payload.into();
        assert!(
            payload.len() <= AMS_FRAME_MAX_LEN,
            "Payload too large: {} bytes (max {})",
            payload.len(),
            AMS_FRAME_MAX_LEN
        );
        Self {
            header: AmsTcpHeader::new(command, payload.len() as u32),
            payload,
        }
    }

    /// Creates a new frame with the given command and payload.
    ///
    /// Returns `None` if the payload exceeds [`AMS_FRAME_MAX_LEN`].
    pub fn try_new(command: AmsCommand, payload: impl Into<Vec<u8>>) -> Option<Self> {
        let payload = payload.into();
        if payload.len() > AMS_FRAME_MAX_LEN {
            return None;
        }

        Some(Self {
            header: AmsTcpHeader::new(command, payload.len() as u32),
            payload,
        })
    }

    /// Creates a new frame with the given command and empty payload.
    pub fn empty(command: AmsCommand) -> Self {
        Self::new(command, Vec::new())
    }

    /// Constructs a frame directly from a header and payload.
    ///
    /// # Safety
    ///
    /// This does NOT validate that `payload.len()` matches `header.length()`.
    /// It's the caller's responsibility to ensure consistency.
    ///
    /// This is primarily intended for use by I/O readers that have already
    /// read the exact payload length specified in the header.
    pub fn from_parts(header: AmsTcpHeader, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            header,
            payload: payload.into(),
        }
    }

    /// Constructs a frame from a header and payload, validating consistency.
    ///
    /// Returns `None` if the payload length doesn't match the header length.
    pub fn try_from_parts(header: AmsTcpHeader, payload: impl Into<Vec<u8>>) -> Option<Self> {
        let payload = payload.into();
        if payload.len() != header.length() as usize {
            return None;
        }
        Some(Self { header, payload })
    }

    /// Returns the frame's header.
    pub fn header(&self) -> AmsTcpHeader {
        self.header
    }

    /// Returns the frame's payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Splits the frame into its header and payload.
    pub fn into_parts(self) -> (AmsTcpHeader, Vec<u8>) {
        (self.header, self.payload)
    }

    /// Returns the total size of this frame in bytes (header + payload).
    pub fn total_size(&self) -> usize {
        AMS_TCP_HEADER_LEN + self.payload.len()
    }

    /// Serializes the frame into a byte vector.
    ///
    /// This is useful for testing or when you need the raw bytes.
    /// For I/O, prefer using an `AmsWriter` which can use vectored I/O
    /// depending on implementation.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut vec = Vec::with_capacity(AMS_TCP_HEADER_LEN + self.payload.len());
        vec.extend_from_slice(&self.header.to_bytes());
        vec.extend_from_slice(&self.payload);
        vec
    }

    /// Writes the frame (header followed by payload) into the given writer.
    pub fn write_to<W: std::io::Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_all(&self.header.to_bytes())?;
        w.write_all(&self.payload)
    }
}

impl From<(AmsCommand, Vec<u8>)> for AmsFrame {
    fn from((command, payload): (AmsCommand, Vec<u8>)) -> Self {
        Self::new(command, payload)
    }
}

impl From<AmsFrame> for (AmsCommand, Vec<u8>) {
    fn from(frame: AmsFrame) -> Self {
        (frame.header.command(), frame.payload)
    }
}

impl From<AmsFrame> for Vec<u8> {
    fn from(frame: AmsFrame) -> Self {
        frame.to_vec()
    }
}
