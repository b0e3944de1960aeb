//! The caller-visible façade: `connect`, `read_tag`, `write_tag`, `monitor_tag`, device
//! info/state, and the reconnect state machine that keeps the rest transparent.

use crate::config::ClientConfig;
use crate::connection::{Connection, RawNotification};
use crate::errors::ClientError;
use crate::events::{ClientEvent, EventEmitter};
use crate::notifications::{Callback, CallbackId, NotificationRegistry, RemoveOutcome};
use crate::resolver::{self, FindTag};
use crate::tables::{self, DataTypeTable, SymbolTable, UploadInfo};
use crate::value::{self, AdsValue};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tcads_core::ads::{AdsDeviceVersion, AdsState, AdsTransMode, DeviceState};
use tcads_core::ams::AmsAddr;
use tcads_core::protocol::{
    AdsAddDeviceNotificationRequest, AdsAddDeviceNotificationResponse,
    AdsDeleteDeviceNotificationRequest, AdsDeleteDeviceNotificationResponse,
    AdsReadDeviceInfoRequest, AdsReadDeviceInfoResponse, AdsReadRequest, AdsReadResponse,
    AdsReadStateRequest, AdsReadStateResponse, AdsReadWriteRequestOwned, AdsReadWriteResponse,
    AdsWriteRequestOwned, AdsWriteResponse, ReservedIndexGroup,
};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, error, info, warn};

/// How long an `AdsAddDeviceNotification` subscription buffers before forcing a send.
const DEFAULT_NOTIFICATION_MAX_DELAY_MS: u32 = 200;
/// How often the server checks a subscription for changes.
const DEFAULT_NOTIFICATION_CYCLE_TIME_MS: u32 = 50;
/// How long a freshly fetched [`UploadInfo`] is trusted before refetching.
const UPLOAD_INFO_TTL: Duration = Duration::from_secs(10);

struct UploadInfoCache {
    info: UploadInfo,
    fetched_at: Instant,
}

/// A live, reconnecting ADS client session.
///
/// Cloning shares the same connection, tables, and notification registry.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    connection: RwLock<Connection>,
    symbols: RwLock<SymbolTable>,
    types: RwLock<DataTypeTable>,
    upload_info: RwLock<Option<UploadInfoCache>>,
    notifications: NotificationRegistry,
    events: EventEmitter,
    notification_tx: mpsc::UnboundedSender<RawNotification>,
    /// Set by [`Client::close`]; makes the background dispatch and reconnect tasks exit
    /// promptly instead of lingering until the channel/event-stream naturally closes.
    closed: AtomicBool,
}

impl Client {
    /// Connects using `config`, preloading the symbol and data-type tables if requested,
    /// and starts the background notification-dispatch and reconnect tasks.
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let events = EventEmitter::new();
        let (notification_tx, notification_rx) = mpsc::unbounded_channel();

        let connection = Connection::connect(&config, events.clone(), notification_tx.clone()).await?;

        let client = Self {
            inner: Arc::new(ClientInner {
                config,
                connection: RwLock::new(connection),
                symbols: RwLock::new(SymbolTable::new()),
                types: RwLock::new(DataTypeTable::new()),
                upload_info: RwLock::new(None),
                notifications: NotificationRegistry::new(),
                events,
                notification_tx,
                closed: AtomicBool::new(false),
            }),
        };

        if client.inner.config.load_symbols {
            client.load_symbols().await?;
        }
        if client.inner.config.load_data_types {
            client.load_data_types().await?;
        }

        tokio::spawn(dispatch_notifications(client.clone(), notification_rx));
        if client.inner.config.reconnect {
            tokio::spawn(reconnect_loop(client.clone()));
        }

        info!("ADS client connected");
        client.inner.events.emit(ClientEvent::Connected);
        Ok(client)
    }

    /// Subscribes to this client's lifecycle/error event stream.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ClientEvent> {
        self.inner.events.subscribe()
    }

    async fn current_connection(&self) -> Connection {
        self.inner.connection.read().await.clone()
    }

    fn target_source(&self, connection: &Connection) -> (AmsAddr, AmsAddr) {
        (connection.target(), connection.source())
    }

    /// Fetches (refreshing if stale) the symbol/data-type table size record.
    async fn fetch_upload_info(&self) -> Result<UploadInfo, ClientError> {
        {
            let cache = self.inner.upload_info.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < UPLOAD_INFO_TTL {
                    return Ok(cached.info);
                }
            }
        }

        let connection = self.current_connection().await;
        let (target, source) = self.target_source(&connection);
        let invoke_id = connection.next_invoke_id();
        let request = AdsReadWriteRequestOwned::new(
            target,
            source,
            invoke_id,
            ReservedIndexGroup::SymUploadInfo2.into(),
            0,
            UploadInfo::WIRE_SIZE as u32,
            Vec::new(),
        );
        let frame = connection.request(invoke_id, &request.to_frame()).await?;
        let response = AdsReadWriteResponse::try_from_frame(&frame)?;
        if !response.result().is_success() {
            return Err(ClientError::AdsError(response.result()));
        }
        let info = tables::parse_upload_info(response.data())?;

        let mut cache = self.inner.upload_info.write().await;
        *cache = Some(UploadInfoCache {
            info,
            fetched_at: Instant::now(),
        });
        Ok(info)
    }

    /// Fetches the symbol table via `SYM_UPLOAD` and replaces the cached table.
    pub async fn load_symbols(&self) -> Result<(), ClientError> {
        let upload_info = self.fetch_upload_info().await?;
        let connection = self.current_connection().await;
        let (target, source) = self.target_source(&connection);
        let invoke_id = connection.next_invoke_id();
        let request = AdsReadWriteRequestOwned::new(
            target,
            source,
            invoke_id,
            ReservedIndexGroup::SymUpload.into(),
            0,
            upload_info.symbol_length,
            Vec::new(),
        );
        let frame = connection.request(invoke_id, &request.to_frame()).await?;
        let response = AdsReadWriteResponse::try_from_frame(&frame)?;
        if !response.result().is_success() {
            return Err(ClientError::AdsError(response.result()));
        }
        let symbols = tables::parse_symbol_table(response.data())?;
        *self.inner.symbols.write().await = symbols;
        Ok(())
    }

    /// Fetches the data-type table via `SYM_DT_UPLOAD` and replaces the cached table.
    pub async fn load_data_types(&self) -> Result<(), ClientError> {
        let upload_info = self.fetch_upload_info().await?;
        let connection = self.current_connection().await;
        let (target, source) = self.target_source(&connection);
        let invoke_id = connection.next_invoke_id();
        let request = AdsReadWriteRequestOwned::new(
            target,
            source,
            invoke_id,
            ReservedIndexGroup::SymDtUpload.into(),
            0,
            upload_info.data_type_length,
            Vec::new(),
        );
        let frame = connection.request(invoke_id, &request.to_frame()).await?;
        let response = AdsReadWriteResponse::try_from_frame(&frame)?;
        if !response.result().is_success() {
            return Err(ClientError::AdsError(response.result()));
        }
        let types = tables::parse_data_type_table(response.data())?;
        *self.inner.types.write().await = types;
        Ok(())
    }

    async fn resolve(&self, name: &str) -> Result<FindTag, ClientError> {
        let symbols = self.inner.symbols.read().await;
        let types = self.inner.types.read().await;
        resolver::resolve(name, &symbols, &types)
    }

    /// Reads and decodes the current value of `name`.
    pub async fn read_tag(&self, name: &str) -> Result<AdsValue, ClientError> {
        let tag = self.resolve(name).await?;
        let connection = self.current_connection().await;
        let (target, source) = self.target_source(&connection);
        let invoke_id = connection.next_invoke_id();
        let request = AdsReadRequest::new(target, source, invoke_id, tag.group, tag.offset, tag.size);
        let frame = connection.request(invoke_id, &request.to_frame()).await?;
        let response = AdsReadResponse::try_from_frame(&frame)?;
        if !response.result().is_success() {
            return Err(ClientError::AdsError(response.result()));
        }
        let types = self.inner.types.read().await;
        value::decode(tag.primitive_kind, &tag.type_name, response.data(), &*types)
    }

    /// Encodes and writes `value` to `name`.
    pub async fn write_tag(&self, name: &str, value: &AdsValue) -> Result<(), ClientError> {
        let tag = self.resolve(name).await?;
        let payload = {
            let types = self.inner.types.read().await;
            value::encode(tag.primitive_kind, &tag.type_name, tag.size as usize, value, &*types)?
        };
        if payload.len() != tag.size as usize {
            return Err(ClientError::ArrayShapeMismatch {
                expected: tag.size as usize,
                got: payload.len(),
            });
        }

        let connection = self.current_connection().await;
        let (target, source) = self.target_source(&connection);
        let invoke_id = connection.next_invoke_id();
        let request = AdsWriteRequestOwned::new(target, source, invoke_id, tag.group, tag.offset, payload);
        let frame = connection.request(invoke_id, &request.to_frame()).await?;
        let response = AdsWriteResponse::try_from_frame(&frame)?;
        if !response.result().is_success() {
            return Err(ClientError::AdsError(response.result()));
        }
        Ok(())
    }

    /// Subscribes `callback` to changes on `name`, registering a fresh server-side
    /// notification if this is the first subscriber for the tag.
    ///
    /// Returns a [`CallbackId`] to pass to [`stop_monitor_tag`](Self::stop_monitor_tag).
    pub async fn monitor_tag(&self, name: &str, callback: Callback) -> Result<CallbackId, ClientError> {
        let id = self.inner.notifications.next_callback_id();

        let callback = match self.inner.notifications.add_callback(name, id, callback).await {
            None => return Ok(id),
            Some(callback) => callback,
        };

        let tag = self.resolve(name).await?;
        let handle = self.add_device_notification(&tag).await?;
        self.inner
            .notifications
            .insert_new(name, tag, handle, id, callback)
            .await?;
        Ok(id)
    }

    /// Removes `id` from `name`'s subscribers, deleting the server-side subscription
    /// once no callbacks remain.
    pub async fn stop_monitor_tag(&self, name: &str, id: CallbackId) -> Result<(), ClientError> {
        match self.inner.notifications.remove_callback(name, id).await {
            RemoveOutcome::StillSubscribed | RemoveOutcome::NotFound => Ok(()),
            RemoveOutcome::LastCallbackRemoved { handle } => {
                let connection = self.current_connection().await;
                let (target, source) = self.target_source(&connection);
                let invoke_id = connection.next_invoke_id();
                let request = AdsDeleteDeviceNotificationRequest::new(target, source, invoke_id, handle);
                let frame = connection.request(invoke_id, &request.to_frame()).await?;
                let response = AdsDeleteDeviceNotificationResponse::try_from_frame(&frame)?;
                if !response.result().is_success() {
                    return Err(ClientError::AdsError(response.result()));
                }
                Ok(())
            }
        }
    }

    async fn add_device_notification(&self, tag: &FindTag) -> Result<tcads_core::ads::NotificationHandle, ClientError> {
        let connection = self.current_connection().await;
        let (target, source) = self.target_source(&connection);
        let invoke_id = connection.next_invoke_id();
        let request = AdsAddDeviceNotificationRequest::new(
            target,
            source,
            invoke_id,
            tag.group,
            tag.offset,
            tag.size,
            AdsTransMode::ClientOnChange,
            DEFAULT_NOTIFICATION_MAX_DELAY_MS,
            DEFAULT_NOTIFICATION_CYCLE_TIME_MS,
        );
        let frame = connection.request(invoke_id, &request.to_frame()).await?;
        let response = AdsAddDeviceNotificationResponse::try_from_frame(&frame)?;
        if !response.result().is_success() {
            return Err(ClientError::AdsError(response.result()));
        }
        Ok(response.handle())
    }

    /// Reads the target's device info (name and version).
    pub async fn device_info(&self) -> Result<AdsDeviceVersion, ClientError> {
        let connection = self.current_connection().await;
        let (target, source) = self.target_source(&connection);
        let invoke_id = connection.next_invoke_id();
        let request = AdsReadDeviceInfoRequest::new(target, source, invoke_id);
        let frame = connection.request(invoke_id, &request.to_frame()).await?;
        let response = AdsReadDeviceInfoResponse::try_from_frame(&frame)?;
        if !response.result().is_success() {
            return Err(ClientError::AdsError(response.result()));
        }
        Ok(response.version())
    }

    /// Reads the target's ADS/device state.
    pub async fn state(&self) -> Result<(AdsState, DeviceState), ClientError> {
        let connection = self.current_connection().await;
        let (target, source) = self.target_source(&connection);
        let invoke_id = connection.next_invoke_id();
        let request = AdsReadStateRequest::new(target, source, invoke_id);
        let frame = connection.request(invoke_id, &request.to_frame()).await?;
        let response = AdsReadStateResponse::try_from_frame(&frame)?;
        if !response.result().is_success() {
            return Err(ClientError::AdsError(response.result()));
        }
        Ok((response.ads_state(), response.device_state()))
    }

    /// Best-effort deletes every outstanding notification and tears down the event stream.
    pub async fn close(&self) -> Result<(), ClientError> {
        let tags = self.inner.notifications.all_tags().await;
        for (tag, _) in tags {
            if let Some((handle, _)) = self.inner.notifications.find(&tag).await {
                let connection = self.current_connection().await;
                let (target, source) = self.target_source(&connection);
                let invoke_id = connection.next_invoke_id();
                let request = AdsDeleteDeviceNotificationRequest::new(target, source, invoke_id, handle);
                if let Ok(frame) = connection.request(invoke_id, &request.to_frame()).await {
                    let _ = AdsDeleteDeviceNotificationResponse::try_from_frame(&frame);
                }
            }
        }
        debug!("ADS client closing");
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.events.emit(ClientEvent::Closed { had_error: false });
        Ok(())
    }
}

async fn dispatch_notifications(client: Client, mut rx: mpsc::UnboundedReceiver<RawNotification>) {
    loop {
        let RawNotification(frame) = tokio::select! {
            frame = rx.recv() => match frame {
                Some(frame) => frame,
                None => return,
            },
            _ = wait_for_close(&client) => return,
        };
        let types = client.inner.types.read().await;
        client
            .inner
            .notifications
            .dispatch(&frame, &types, &client.inner.events)
            .await;
    }
}

/// Polls the `closed` flag so the background tasks can be raced against it with
/// `tokio::select!` without needing a dedicated shutdown channel.
async fn wait_for_close(client: &Client) {
    loop {
        if client.inner.closed.load(Ordering::SeqCst) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

async fn reconnect_loop(client: Client) {
    let mut events = client.inner.events.subscribe();
    loop {
        if client.inner.closed.load(Ordering::SeqCst) {
            return;
        }

        let event = tokio::select! {
            event = events.recv() => event,
            _ = wait_for_close(&client) => return,
        };
        let event = match event {
            Ok(event) => event,
            Err(tokio::sync::broadcast::error::RecvError::Closed) => return,
            Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
        };

        let had_error = matches!(event, ClientEvent::Closed { had_error: true });
        if !had_error {
            continue;
        }

        warn!("ADS connection lost, reconnecting");
        client.inner.events.emit(ClientEvent::Reconnecting);
        tokio::time::sleep(Duration::from_millis(client.inner.config.reconnect_interval_ms)).await;
        if client.inner.closed.load(Ordering::SeqCst) {
            return;
        }

        let notification_tx = client.inner.notification_tx.clone();
        match Connection::connect(&client.inner.config, client.inner.events.clone(), notification_tx).await {
            Ok(new_connection) => {
                *client.inner.connection.write().await = new_connection;
                reload_tables_after_reconnect(&client).await;
                resubscribe_notifications(&client).await;
                info!("ADS connection restored");
                client.inner.events.emit(ClientEvent::Connected);
            }
            Err(err) => {
                error!(%err, "reconnect attempt failed");
                client.inner.events.emit(ClientEvent::Error(Arc::new(err)));
            }
        }
    }
}

/// Refreshes the symbol/data-type tables after a reconnect, since the PLC's running
/// project (and therefore its symbol addresses) may have changed while disconnected.
async fn reload_tables_after_reconnect(client: &Client) {
    *client.inner.upload_info.write().await = None;
    if client.inner.config.load_symbols {
        if let Err(err) = client.load_symbols().await {
            error!(%err, "failed to reload symbol table after reconnect");
            client.inner.events.emit(ClientEvent::Error(Arc::new(err)));
        }
    }
    if client.inner.config.load_data_types {
        if let Err(err) = client.load_data_types().await {
            error!(%err, "failed to reload data type table after reconnect");
            client.inner.events.emit(ClientEvent::Error(Arc::new(err)));
        }
    }
}

async fn resubscribe_notifications(client: &Client) {
    for (tag, _) in client.inner.notifications.all_tags().await {
        let find = match client.resolve(&tag).await {
            Ok(find) => find,
            Err(err) => {
                warn!(%tag, %err, "tag no longer resolves after reconnect, skipping re-subscription");
                client.inner.events.emit(ClientEvent::Error(Arc::new(err)));
                continue;
            }
        };
        match client.add_device_notification(&find).await {
            Ok(new_handle) => {
                client.inner.notifications.update_find(&tag, find).await;
                client.inner.notifications.rebind_handle(&tag, new_handle).await;
            }
            Err(err) => {
                error!(%tag, %err, "failed to re-subscribe notification after reconnect");
                client.inner.events.emit(ClientEvent::Error(Arc::new(err)));
            }
        }
    }
}
