use crate::ads::NotificationHandle;

/// A zero-copy view of a single ADS notification sample.
///
/// Each sample represents the value of a watched variable at a point in time,
/// identified by the [`NotificationHandle`] that was assigned when the subscription
/// was created via `AdsAddDeviceNotification`.
///
/// Samples are always parsed as part of an [`AdsStampHeader`](super::stamp::AdsStampHeader),
/// which groups samples that share the same timestamp. The `data` field borrows
/// directly from the [`AmsFrame`](crate::io::AmsFrame) that was parsed, thus no copy is made.
///
/// For storage or use after the frame is dropped, convert to [`AdsNotificationSampleOwned`]
/// via [`into_owned`](Self::into_owned) or [`to_owned`](Self::to_owned).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdsNotificationSample<'a> {
    handle: NotificationHandle,
    data: &'a [u8],
}

impl<'a> AdsNotificationSample<'a> {
    /// The minimum number of bytes a sample occupies on the wire: Handle (4) + Sample Size (4).
    pub const MIN_SAMPLE_SIZE: usize = NotificationHandle::LENGTH + 4;

    /// Creates a new `AdsNotificationSample` from a handle and a data slice.
    ///
    /// The data slice must borrow from the frame that contains this sample.
    pub fn new(handle: NotificationHandle, data: &'a [u8]) -> Self {
        Self { handle, data }
    }

    /// Returns the [`NotificationHandle`] identifying the subscription this sample
    /// belongs to.
    ///
    /// Use this to dispatch the sample to the correct handler, e.g. as a key into
    /// a `HashMap<NotificationHandle, _>`.
    pub fn handle(&self) -> NotificationHandle {
        self.handle
    }

    /// Returns the size of the sample data.
    pub fn sample_size(&self) -> usize {
        self.data.len()
    }

    /// Returns a zero-copy slice of the sample data.
    ///
    /// The slice borrows from the originating [`AmsFrame`](crate::io::AmsFrame) —
    /// interpret it according to the data type of the watched variable.
    pub fn data(&self) -> &[u8] {
        self.data
    }

    /// Converts this view into an owned [`AdsNotificationSampleOwned`], copying the data.
    pub fn into_owned(self) -> AdsNotificationSampleOwned {
        AdsNotificationSampleOwned {
            handle: self.handle,
            data: self.data.to_vec(),
        }
    }

    /// Clones this view into an owned [`AdsNotificationSampleOwned`], copying the data.
    pub fn to_owned(&self) -> AdsNotificationSampleOwned {
        AdsNotificationSampleOwned {
            handle: self.handle,
            data: self.data.to_vec(),
        }
    }
}

/// A fully owned ADS notification sample.
///
/// Owns its data buffer, making it suitable for storage, sending across channels,
/// or constructing outgoing [`AdsDeviceNotification`](super::AdsDeviceNotification)
/// frames on a server.
///
/// Obtain one by:
/// * Calling [`AdsNotificationSampleOwned::new`] to construct a sample to send.
/// * Calling [`AdsNotificationSample::into_owned`] or [`AdsNotificationSample::to_owned`]
///   after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdsNotificationSampleOwned {
    handle: NotificationHandle,
    data: Vec<u8>,
}

impl AdsNotificationSampleOwned {
    /// Creates a new owned notification sample.
    ///
    /// Use this on a **server** to construct notification samples to send to a client.
    pub fn new(handle: NotificationHandle, data: impl Into<Vec<u8>>) -> Self {
        Self {
            handle,
            data: data.into(),
        }
    }

    /// Returns the [`NotificationHandle`] identifying the subscription this sample
    /// belongs to.
    pub fn handle(&self) -> NotificationHandle {
        self.handle
    }

    /// Returns the size of the sample data.
    pub fn sample_size(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of bytes this sample occupies on the wire.
    ///
    /// Wire layout: Handle (4) + Sample Size (4) + Data (n).
    pub fn wire_size(&self) -> usize {
        AdsNotificationSample::MIN_SAMPLE_SIZE + self.sample_size()
    }

    /// Returns the sample data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Serializes this sample into `buf`.
    pub fn write_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.handle.to_bytes());
        buf.extend_from_slice(&(self.data.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.data);
    }

    /// Borrows this sample as a zero-copy [`AdsNotificationSample`].
    pub fn as_view(&self) -> AdsNotificationSample<'_> {
        AdsNotificationSample {
            handle: self.handle,
            data: &self.data,
        }
    }
}

impl<'a> From<AdsNotificationSample<'a>> for AdsNotificationSampleOwned {
    fn from(value: AdsNotificationSample<'a>) -> Self {
        value.into_owned()
    }
}

impl<'a> From<&'a AdsNotificationSampleOwned> for AdsNotificationSample<'a> {
    fn from(value: &'a AdsNotificationSampleOwned) -> Self {
        value.as_view()
    }
}
