//! The live transport: owns the socket, multiplexes requests by invoke ID, and runs
//! the background read loop that demultiplexes responses from unsolicited notifications.

use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::events::{ClientEvent, EventEmitter};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tcads_core::ads::{AdsHeader, InvokeId};
use tcads_core::ams::{AmsAddr, AmsNetId};
use tcads_core::io::AmsFrame;
use tcads_core::io::tokio::{AmsReader, AmsWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, error, trace, warn};

/// How long a single request waits for its matching response before giving up.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

type PendingMap = Arc<Mutex<HashMap<InvokeId, oneshot::Sender<AmsFrame>>>>;

/// An unsolicited device notification frame, handed off to the notification
/// demultiplexer running outside this module.
pub struct RawNotification(pub AmsFrame);

/// A live, reconnecting connection to one ADS target.
///
/// Cloning shares the same socket and pending-request table; every clone can issue
/// requests concurrently.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

struct Inner {
    target: AmsAddr,
    source: AmsAddr,
    writer: Mutex<AmsWriter<OwnedWriteHalf>>,
    pending: PendingMap,
    invoke_counter: AtomicU32,
    events: EventEmitter,
}

impl Connection {
    /// Connects to the configured target and starts the background read loop.
    ///
    /// `notifications` receives every `AdsDeviceNotification` frame as it arrives;
    /// the caller (the notification registry) owns demultiplexing by handle.
    pub async fn connect(
        config: &ClientConfig,
        events: EventEmitter,
        notifications: mpsc::UnboundedSender<RawNotification>,
    ) -> Result<Self, ClientError> {
        config.validate()?;

        let stream = TcpStream::connect((config.target.host.as_str(), config.target.port)).await?;
        stream.set_nodelay(true)?;
        let local_addr = stream.local_addr()?;

        let target_net_id = config
            .target
            .net_id
            .unwrap_or_else(|| default_net_id(local_addr.ip()));
        let target = AmsAddr::new(target_net_id, config.target.ams_port);

        let source_net_id = config
            .source
            .net_id
            .unwrap_or_else(|| default_net_id(local_addr.ip()));
        let source_port = config.source.ams_port.unwrap_or(crate::config::DEFAULT_SOURCE_AMS_PORT);
        let source = AmsAddr::new(source_net_id, source_port);

        let (read_half, write_half) = stream.into_split();
        let reader = AmsReader::new(read_half);
        let writer = AmsWriter::new(write_half);

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        let inner = Arc::new(Inner {
            target,
            source,
            writer: Mutex::new(writer),
            pending: pending.clone(),
            invoke_counter: AtomicU32::new(1),
            events: events.clone(),
        });

        debug!(%target, %source, "ADS connection established");
        tokio::spawn(read_loop(reader, pending, notifications, events));

        Ok(Self { inner })
    }

    pub fn target(&self) -> AmsAddr {
        self.inner.target
    }

    pub fn source(&self) -> AmsAddr {
        self.inner.source
    }

    /// Allocates the next invoke ID, wrapping `u32::MAX` back to `1` (`0` is reserved
    /// and never assigned to an outgoing request).
    pub fn next_invoke_id(&self) -> InvokeId {
        next_invoke_id_from(&self.inner.invoke_counter)
    }

    /// Sends `frame` and awaits the response frame carrying the same invoke ID as
    /// `request_invoke_id`, up to [`REQUEST_TIMEOUT`].
    pub async fn request(&self, request_invoke_id: InvokeId, frame: &AmsFrame) -> Result<AmsFrame, ClientError> {
        trace!(invoke_id = request_invoke_id, "sending ADS request");
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.inner.pending.lock().await;
            if pending.insert(request_invoke_id, tx).is_some() {
                warn!(invoke_id = request_invoke_id, "duplicate invoke ID in flight");
                return Err(ClientError::DuplicateInvokeId(request_invoke_id));
            }
        }

        {
            let mut writer = self.inner.writer.lock().await;
            if let Err(err) = writer.write_frame(frame).await {
                error!(invoke_id = request_invoke_id, %err, "failed to write ADS request");
                self.inner.pending.lock().await.remove(&request_invoke_id);
                return Err(ClientError::Io(err));
            }
        }

        match tokio::time::timeout(REQUEST_TIMEOUT, rx).await {
            Ok(Ok(frame)) => Ok(frame),
            Ok(Err(_)) => Err(ClientError::Disconnected),
            Err(_) => {
                warn!(invoke_id = request_invoke_id, "ADS request timed out");
                self.inner.pending.lock().await.remove(&request_invoke_id);
                Err(ClientError::RequestTimeout)
            }
        }
    }
}

/// Allocates the next invoke ID from `counter`, skipping `0` (reserved, never assigned
/// to an outgoing request) on wraparound.
fn next_invoke_id_from(counter: &AtomicU32) -> InvokeId {
    loop {
        let current = counter.fetch_add(1, Ordering::Relaxed);
        if current != 0 {
            return current;
        }
    }
}

/// Derives a default source AMS Net ID from the local IP, per the usual TwinCAT
/// convention of appending `.1.1` to the four IPv4 octets.
fn default_net_id(ip: std::net::IpAddr) -> AmsNetId {
    match ip {
        std::net::IpAddr::V4(v4) => {
            let [a, b, c, d] = v4.octets();
            AmsNetId::new(a, b, c, d, 1, 1)
        }
        std::net::IpAddr::V6(_) => AmsNetId::new(127, 0, 0, 1, 1, 1),
    }
}

async fn read_loop(
    mut reader: AmsReader<OwnedReadHalf>,
    pending: PendingMap,
    notifications: mpsc::UnboundedSender<RawNotification>,
    events: EventEmitter,
) {
    loop {
        let frame = match reader.read_frame().await {
            Ok(frame) => frame,
            Err(err) => {
                warn!(%err, "ADS read loop ended, connection lost");
                events.emit(ClientEvent::Error(Arc::new(ClientError::Io(err))));
                events.emit(ClientEvent::Closed { had_error: true });
                // Dropping each sender (rather than sending a dummy frame) makes every
                // in-flight request's oneshot receiver resolve to `RecvError`, which
                // `Connection::request` maps to `ClientError::Disconnected`.
                pending.lock().await.clear();
                return;
            }
        };

        let Ok((header, _rest)) = AdsHeader::parse_prefix(frame.payload()) else {
            error!("dropped frame with unparseable ADS header");
            continue;
        };

        if header.command_id() == tcads_core::ads::AdsCommand::AdsDeviceNotification {
            let _ = notifications.send(RawNotification(frame));
            continue;
        }

        let invoke_id = header.invoke_id();
        let mut pending = pending.lock().await;
        if let Some(tx) = pending.remove(&invoke_id) {
            let _ = tx.send(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_net_id_appends_1_1() {
        let id = default_net_id(std::net::IpAddr::V4(Ipv4Addr::new(192, 168, 1, 50)));
        assert_eq!(id.to_string(), "192.168.1.50.1.1");
    }

    #[test]
    fn invoke_id_counter_skips_zero_on_wrap() {
        let counter = AtomicU32::new(u32::MAX);
        assert_eq!(next_invoke_id_from(&counter), u32::MAX);
        assert_eq!(next_invoke_id_from(&counter), 1);
    }

    #[test]
    fn invoke_id_counter_increments_normally() {
        let counter = AtomicU32::new(5);
        assert_eq!(next_invoke_id_from(&counter), 5);
        assert_eq!(next_invoke_id_from(&counter), 6);
    }
}
