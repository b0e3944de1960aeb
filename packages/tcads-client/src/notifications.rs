//! Notification registry and demultiplexer: tracks active subscriptions by tag name
//! and dispatches incoming [`AdsDeviceNotification`] samples to their callbacks.

use crate::errors::ClientError;
use crate::events::{ClientEvent, EventEmitter};
use crate::resolver::FindTag;
use crate::tables::DataTypeTable;
use crate::value::AdsValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tcads_core::ads::NotificationHandle;
use tcads_core::io::AmsFrame;
use tcads_core::protocol::AdsDeviceNotification;
use tokio::sync::Mutex;

/// Hard cap on simultaneously active server-side notification handles.
///
/// TwinCAT routers reject `AdsAddDeviceNotification` once a connection holds more than
/// this many handles; the client fails fast instead of forwarding a confusing `AdsError`.
pub const MAX_NOTIFICATION_HANDLES: usize = 550;

/// A registered callback, invoked with the decoded sample value and its server timestamp.
pub type Callback = Box<dyn FnMut(AdsValue, DateTime<Utc>) + Send>;

/// Identifies one callback registered against a tag, returned by
/// [`NotificationRegistry::next_callback_id`] so it can later be passed to
/// [`NotificationRegistry::remove_callback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

struct Subscription {
    tag: String,
    find: FindTag,
    handle: NotificationHandle,
    callbacks: Vec<(CallbackId, Callback)>,
}

#[derive(Default)]
struct State {
    by_tag: HashMap<String, Subscription>,
    by_handle: HashMap<NotificationHandle, String>,
}

/// What the caller should do with the server after [`NotificationRegistry::remove_callback`].
pub enum RemoveOutcome {
    /// Other callbacks remain subscribed to the tag; the server subscription stays open.
    StillSubscribed,
    /// The last callback was removed; the caller should issue `AdsDeleteDeviceNotification`
    /// for `handle`.
    LastCallbackRemoved { handle: NotificationHandle },
    /// No callback with that ID was registered against the tag.
    NotFound,
}

/// Tracks active tag subscriptions and demultiplexes incoming notification frames.
///
/// Cloning shares the same subscription table.
#[derive(Clone)]
pub struct NotificationRegistry {
    state: Arc<Mutex<State>>,
    next_id: Arc<AtomicU64>,
}

impl NotificationRegistry {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Allocates a fresh [`CallbackId`], unique for the lifetime of this registry.
    pub fn next_callback_id(&self) -> CallbackId {
        CallbackId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the server handle and resolved tag for an existing subscription, if any.
    pub async fn find(&self, tag: &str) -> Option<(NotificationHandle, FindTag)> {
        let state = self.state.lock().await;
        state
            .by_tag
            .get(tag)
            .map(|sub| (sub.handle, sub.find.clone()))
    }

    /// Appends `callback` to an existing subscription for `tag`.
    ///
    /// Returns the callback back (`Some`) if no subscription for `tag` exists yet, so
    /// the caller can register one via [`insert_new`](Self::insert_new) instead.
    pub async fn add_callback(&self, tag: &str, id: CallbackId, callback: Callback) -> Option<Callback> {
        let mut state = self.state.lock().await;
        match state.by_tag.get_mut(tag) {
            Some(sub) => {
                sub.callbacks.push((id, callback));
                None
            }
            None => Some(callback),
        }
    }

    /// Registers a brand new subscription, failing if the handle cap is already reached.
    pub async fn insert_new(
        &self,
        tag: &str,
        find: FindTag,
        handle: NotificationHandle,
        id: CallbackId,
        callback: Callback,
    ) -> Result<(), ClientError> {
        let mut state = self.state.lock().await;
        if state.by_tag.len() >= MAX_NOTIFICATION_HANDLES {
            return Err(ClientError::TooManyHandles {
                limit: MAX_NOTIFICATION_HANDLES,
            });
        }
        state.by_handle.insert(handle, tag.to_string());
        state.by_tag.insert(
            tag.to_string(),
            Subscription {
                tag: tag.to_string(),
                find,
                handle,
                callbacks: vec![(id, callback)],
            },
        );
        Ok(())
    }

    /// Removes the callback `id` from `tag`'s subscription.
    pub async fn remove_callback(&self, tag: &str, id: CallbackId) -> RemoveOutcome {
        let mut state = self.state.lock().await;
        let Some(sub) = state.by_tag.get_mut(tag) else {
            return RemoveOutcome::NotFound;
        };
        let before = sub.callbacks.len();
        sub.callbacks.retain(|(cid, _)| *cid != id);
        if sub.callbacks.len() == before {
            return RemoveOutcome::NotFound;
        }
        if sub.callbacks.is_empty() {
            let handle = sub.handle;
            state.by_tag.remove(tag);
            state.by_handle.remove(&handle);
            RemoveOutcome::LastCallbackRemoved { handle }
        } else {
            RemoveOutcome::StillSubscribed
        }
    }

    /// Returns `(tag, find)` for every active subscription, for reconnect-driven
    /// re-subscription.
    pub async fn all_tags(&self) -> Vec<(String, FindTag)> {
        let state = self.state.lock().await;
        state
            .by_tag
            .values()
            .map(|sub| (sub.tag.clone(), sub.find.clone()))
            .collect()
    }

    /// Updates the stored [`FindTag`] for `tag`, used after re-resolving against a
    /// reconnected connection's freshly loaded symbol/data-type tables.
    pub async fn update_find(&self, tag: &str, find: FindTag) {
        let mut state = self.state.lock().await;
        if let Some(sub) = state.by_tag.get_mut(tag) {
            sub.find = find;
        }
    }

    /// Updates the stored server handle for `tag` after re-subscribing post-reconnect.
    pub async fn rebind_handle(&self, tag: &str, new_handle: NotificationHandle) {
        let mut state = self.state.lock().await;
        if let Some(sub) = state.by_tag.get_mut(tag) {
            let old_handle = sub.handle;
            sub.handle = new_handle;
            state.by_handle.remove(&old_handle);
            state.by_handle.insert(new_handle, tag.to_string());
        }
    }

    /// Parses `frame` as an `AdsDeviceNotification` and dispatches every sample to its
    /// registered callbacks, decoding against `types`.
    ///
    /// A callback panic is caught and surfaced as [`ClientEvent::Error`] without
    /// interrupting dispatch to the remaining samples or callbacks.
    pub async fn dispatch(&self, frame: &AmsFrame, types: &DataTypeTable, events: &EventEmitter) {
        let notification = match AdsDeviceNotification::try_from_frame(frame) {
            Ok(n) => n,
            Err(err) => {
                events.emit(ClientEvent::Error(Arc::new(ClientError::Protocol(err))));
                return;
            }
        };

        let mut state = self.state.lock().await;
        for (timestamp, sample) in notification.iter_samples() {
            let Some(tag) = state.by_handle.get(&sample.handle()).cloned() else {
                continue;
            };
            let Some(sub) = state.by_tag.get_mut(&tag) else {
                continue;
            };

            let value = match crate::value::decode(
                sub.find.primitive_kind,
                &sub.find.type_name,
                sample.data(),
                types,
            ) {
                Ok(v) => v,
                Err(err) => {
                    events.emit(ClientEvent::Error(Arc::new(err)));
                    continue;
                }
            };
            let when: DateTime<Utc> = timestamp.into();

            for (_, callback) in sub.callbacks.iter_mut() {
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    callback(value.clone(), when);
                }));
                if let Err(panic) = result {
                    let message = panic_message(&panic);
                    events.emit(ClientEvent::Error(Arc::new(ClientError::DecodeInvalid(
                        format!("notification callback for {tag:?} panicked: {message}"),
                    ))));
                }
            }
        }
    }
}

impl Default for NotificationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::PrimitiveKind;
    use std::sync::atomic::AtomicUsize;
    use tcads_core::ads::WindowsFileTime;
    use tcads_core::ams::AmsNetId;
    use tcads_core::protocol::{AdsDeviceNotificationOwned, AdsNotificationSampleOwned, AdsStampHeaderOwned};

    fn make_addr(port: u16) -> tcads_core::ams::AmsAddr {
        tcads_core::ams::AmsAddr::new(AmsNetId::new(192, 168, 0, 1, 1, 1), port)
    }

    fn make_find() -> FindTag {
        FindTag {
            group: 0x4020,
            offset: 0,
            size: 4,
            type_name: "DINT".into(),
            primitive_kind: PrimitiveKind::Int32,
        }
    }

    fn notification_frame(handle: NotificationHandle, data: Vec<u8>) -> AmsFrame {
        let stamp = AdsStampHeaderOwned::new(
            WindowsFileTime::now(),
            vec![AdsNotificationSampleOwned::new(handle, data)],
        );
        AdsDeviceNotificationOwned::new(make_addr(851), make_addr(30000), vec![stamp]).into_frame()
    }

    #[tokio::test]
    async fn insert_new_then_dispatch_invokes_callback() {
        let registry = NotificationRegistry::new();
        let events = EventEmitter::new();
        let types = DataTypeTable::new();

        let handle = NotificationHandle::from(7);
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let id = registry.next_callback_id();
        registry
            .insert_new(
                "MAIN.nCount",
                make_find(),
                handle,
                id,
                Box::new(move |value, _ts| {
                    seen_clone.lock().unwrap().push(value);
                }),
            )
            .await
            .unwrap();

        let frame = notification_frame(handle, 99_i32.to_le_bytes().to_vec());
        registry.dispatch(&frame, &types, &events).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(matches!(seen[0], AdsValue::I32(99)));
    }

    #[tokio::test]
    async fn add_callback_to_existing_subscription_fans_out() {
        let registry = NotificationRegistry::new();
        let events = EventEmitter::new();
        let types = DataTypeTable::new();

        let handle = NotificationHandle::from(3);
        let count = Arc::new(AtomicUsize::new(0));

        let id1 = registry.next_callback_id();
        registry
            .insert_new("MAIN.x", make_find(), handle, id1, {
                let count = count.clone();
                Box::new(move |_, _| {
                    count.fetch_add(1, Ordering::SeqCst);
                })
            })
            .await
            .unwrap();

        let id2 = registry.next_callback_id();
        let rejected = registry
            .add_callback("MAIN.x", id2, {
                let count = count.clone();
                Box::new(move |_, _| {
                    count.fetch_add(1, Ordering::SeqCst);
                })
            })
            .await;
        assert!(rejected.is_none());

        let frame = notification_frame(handle, 1_i32.to_le_bytes().to_vec());
        registry.dispatch(&frame, &types, &events).await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn remove_last_callback_reports_handle_for_deletion() {
        let registry = NotificationRegistry::new();
        let handle = NotificationHandle::from(1);
        let id = registry.next_callback_id();
        registry
            .insert_new("MAIN.x", make_find(), handle, id, Box::new(|_, _| {}))
            .await
            .unwrap();

        match registry.remove_callback("MAIN.x", id).await {
            RemoveOutcome::LastCallbackRemoved { handle: h } => assert_eq!(h, handle),
            _ => panic!("expected LastCallbackRemoved"),
        }
        assert!(registry.find("MAIN.x").await.is_none());
    }

    #[tokio::test]
    async fn remove_one_of_two_callbacks_keeps_subscription() {
        let registry = NotificationRegistry::new();
        let handle = NotificationHandle::from(1);
        let id1 = registry.next_callback_id();
        registry
            .insert_new("MAIN.x", make_find(), handle, id1, Box::new(|_, _| {}))
            .await
            .unwrap();
        let id2 = registry.next_callback_id();
        registry
            .add_callback("MAIN.x", id2, Box::new(|_, _| {}))
            .await;

        match registry.remove_callback("MAIN.x", id1).await {
            RemoveOutcome::StillSubscribed => {}
            _ => panic!("expected StillSubscribed"),
        }
        assert!(registry.find("MAIN.x").await.is_some());
    }

    #[tokio::test]
    async fn handle_cap_is_enforced() {
        let registry = NotificationRegistry::new();
        for i in 0..MAX_NOTIFICATION_HANDLES {
            let id = registry.next_callback_id();
            registry
                .insert_new(
                    &format!("MAIN.t{i}"),
                    make_find(),
                    NotificationHandle::from(i as u32),
                    id,
                    Box::new(|_, _| {}),
                )
                .await
                .unwrap();
        }
        let id = registry.next_callback_id();
        let err = registry
            .insert_new(
                "MAIN.overflow",
                make_find(),
                NotificationHandle::from(9999),
                id,
                Box::new(|_, _| {}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::TooManyHandles { .. }));
    }

    #[tokio::test]
    async fn panicking_callback_does_not_stop_dispatch_to_other_callbacks() {
        let registry = NotificationRegistry::new();
        let events = EventEmitter::new();
        let types = DataTypeTable::new();
        let handle = NotificationHandle::from(1);

        let id1 = registry.next_callback_id();
        registry
            .insert_new(
                "MAIN.x",
                make_find(),
                handle,
                id1,
                Box::new(|_, _| panic!("boom")),
            )
            .await
            .unwrap();

        let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let ran_clone = ran.clone();
        let id2 = registry.next_callback_id();
        registry
            .add_callback(
                "MAIN.x",
                id2,
                Box::new(move |_, _| {
                    ran_clone.store(true, Ordering::SeqCst);
                }),
            )
            .await;

        let frame = notification_frame(handle, 1_i32.to_le_bytes().to_vec());
        registry.dispatch(&frame, &types, &events).await;

        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn update_find_replaces_stored_resolution() {
        let registry = NotificationRegistry::new();
        let handle = NotificationHandle::from(1);
        let id = registry.next_callback_id();
        registry
            .insert_new("MAIN.x", make_find(), handle, id, Box::new(|_, _| {}))
            .await
            .unwrap();

        let new_find = FindTag {
            offset: 40,
            ..make_find()
        };
        registry.update_find("MAIN.x", new_find.clone()).await;

        let (_, found) = registry.find("MAIN.x").await.unwrap();
        assert_eq!(found.offset, 40);
    }

    #[tokio::test]
    async fn rebind_handle_updates_reverse_index() {
        let registry = NotificationRegistry::new();
        let events = EventEmitter::new();
        let types = DataTypeTable::new();
        let old_handle = NotificationHandle::from(1);
        let new_handle = NotificationHandle::from(2);

        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        let id = registry.next_callback_id();
        registry
            .insert_new(
                "MAIN.x",
                make_find(),
                old_handle,
                id,
                Box::new(move |_, _| {
                    seen_clone.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .await
            .unwrap();

        registry.rebind_handle("MAIN.x", new_handle).await;

        let stale_frame = notification_frame(old_handle, 1_i32.to_le_bytes().to_vec());
        registry.dispatch(&stale_frame, &types, &events).await;
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        let fresh_frame = notification_frame(new_handle, 1_i32.to_le_bytes().to_vec());
        registry.dispatch(&fresh_frame, &types, &events).await;
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
