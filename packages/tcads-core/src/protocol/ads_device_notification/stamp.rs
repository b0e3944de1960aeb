use super::sample::{AdsNotificationSample, AdsNotificationSampleOwned};
use crate::ads::{AdsError, NotificationHandle, WindowsFileTime};

/// A group of [`AdsNotificationSample`]s that share a single server-side timestamp.
///
/// The ADS device notification wire format batches samples this way so that a
/// single notification frame can deliver changes for many variables that happened
/// to become due at the same scan cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdsStampHeader<'a> {
    timestamp: WindowsFileTime,
    samples: Vec<AdsNotificationSample<'a>>,
}

impl<'a> AdsStampHeader<'a> {
    /// Minimum wire size of a stamp header: Timestamp (8) + Samples count (4).
    pub const MIN_STAMP_SIZE: usize = WindowsFileTime::LENGTH + 4;

    /// Returns the server-side timestamp shared by all samples in this stamp.
    pub fn timestamp(&self) -> WindowsFileTime {
        self.timestamp
    }

    /// Returns the samples belonging to this stamp.
    pub fn samples(&self) -> &[AdsNotificationSample<'a>] {
        &self.samples
    }

    /// Parses a single stamp header, including its samples, from `bytes`.
    ///
    /// Returns the parsed stamp and the remaining, unparsed bytes.
    pub fn parse(bytes: &'a [u8]) -> Result<(Self, &'a [u8]), AdsError> {
        if bytes.len() < Self::MIN_STAMP_SIZE {
            return Err(AdsError::UnexpectedDataLength {
                expected: Self::MIN_STAMP_SIZE,
                got: bytes.len(),
            });
        }

        let timestamp = WindowsFileTime::from_bytes(bytes[0..8].try_into().unwrap());
        let sample_count = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;

        let mut remaining = &bytes[Self::MIN_STAMP_SIZE..];
        let mut samples = Vec::with_capacity(sample_count);

        for _ in 0..sample_count {
            if remaining.len() < AdsNotificationSample::MIN_SAMPLE_SIZE {
                return Err(AdsError::UnexpectedDataLength {
                    expected: AdsNotificationSample::MIN_SAMPLE_SIZE,
                    got: remaining.len(),
                });
            }

            let handle = NotificationHandle::from_bytes(remaining[0..4].try_into().unwrap());
            let sample_size = u32::from_le_bytes(remaining[4..8].try_into().unwrap()) as usize;
            let sample_start = AdsNotificationSample::MIN_SAMPLE_SIZE;

            if remaining.len() < sample_start + sample_size {
                return Err(AdsError::UnexpectedDataLength {
                    expected: sample_start + sample_size,
                    got: remaining.len(),
                });
            }

            let data = &remaining[sample_start..sample_start + sample_size];
            samples.push(AdsNotificationSample::new(handle, data));
            remaining = &remaining[sample_start + sample_size..];
        }

        Ok((
            Self {
                timestamp,
                samples,
            },
            remaining,
        ))
    }

    /// Converts this view into an owned [`AdsStampHeaderOwned`], copying all sample data.
    pub fn into_owned(self) -> AdsStampHeaderOwned {
        AdsStampHeaderOwned {
            timestamp: self.timestamp,
            samples: self.samples.into_iter().map(|s| s.into_owned()).collect(),
        }
    }

    /// Clones this view into an owned [`AdsStampHeaderOwned`], copying all sample data.
    pub fn to_owned(&self) -> AdsStampHeaderOwned {
        AdsStampHeaderOwned {
            timestamp: self.timestamp,
            samples: self.samples.iter().map(|s| s.to_owned()).collect(),
        }
    }
}

/// A fully owned group of notification samples sharing a single timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdsStampHeaderOwned {
    timestamp: WindowsFileTime,
    samples: Vec<AdsNotificationSampleOwned>,
}

impl AdsStampHeaderOwned {
    /// Creates a new owned stamp header.
    ///
    /// Use this on a **server** to construct a notification to push to a client.
    pub fn new(timestamp: WindowsFileTime, samples: impl Into<Vec<AdsNotificationSampleOwned>>) -> Self {
        Self {
            timestamp,
            samples: samples.into(),
        }
    }

    /// Returns the timestamp shared by all samples in this stamp.
    pub fn timestamp(&self) -> WindowsFileTime {
        self.timestamp
    }

    /// Returns the samples belonging to this stamp.
    pub fn samples(&self) -> &[AdsNotificationSampleOwned] {
        &self.samples
    }

    /// Returns the number of bytes this stamp occupies on the wire, including its samples.
    pub fn wire_size(&self) -> usize {
        AdsStampHeader::MIN_STAMP_SIZE
            + self.samples.iter().map(|s| s.wire_size()).sum::<usize>()
    }

    /// Serializes this stamp, including its samples, into `buf`.
    pub fn write_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.timestamp.to_bytes());
        buf.extend_from_slice(&(self.samples.len() as u32).to_le_bytes());
        for sample in &self.samples {
            sample.write_into(buf);
        }
    }

    /// Borrows this stamp as a zero-copy [`AdsStampHeader`].
    pub fn as_view(&self) -> AdsStampHeader<'_> {
        AdsStampHeader {
            timestamp: self.timestamp,
            samples: self.samples.iter().map(|s| s.as_view()).collect(),
        }
    }
}
