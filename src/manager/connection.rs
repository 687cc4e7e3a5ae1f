// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection manager for one processor.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::managed_device::{ConnectionSession, RetryTask};
use super::readiness::{Readiness, cancellable, wait_until_ready};
use super::{ConnectionPhase, ConnectionSettings, DeviceIdentity};
use crate::command::{Command, DeviceCommand};
use crate::entity::EntityId;
use crate::error::{CommandError, Error, ProtocolError};
use crate::event::{DeviceEvent, DeviceId, EventBus};
use crate::protocol::{Executor, Transport};
use crate::state::{AttributeUpdate, CachedDeviceState};
use crate::telemetry::{ConnectionStatus, DeviceSignal};
use crate::types::MediaState;

/// Result of [`TrinnovDevice::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The session opened immediately.
    Connected,
    /// The immediate attempt failed; a background probe loop is retrying.
    Retrying,
}

struct Inner<T: Transport> {
    identity: DeviceIdentity,
    settings: ConnectionSettings,
    transport: T,
    session: Mutex<ConnectionSession>,
    state: RwLock<CachedDeviceState>,
    events: EventBus,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Transport> Drop for Inner<T> {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get_mut().take() {
            listener.abort();
        }
        if let Some(task) = self.session.get_mut().retry.take() {
            task.token.cancel();
        }
    }
}

/// Connection manager and state cache for one processor.
///
/// Cheap to clone; clones share the same session. Creating one spawns the
/// task that consumes the transport's signals, so it must happen inside a
/// Tokio runtime.
///
/// Events go out on the device's [`EventBus`]: connection changes first,
/// then one [`DeviceEvent::Update`] per changed host attribute.
pub struct TrinnovDevice<T: Transport> {
    inner: Arc<Inner<T>>,
}

impl<T: Transport> Clone for TrinnovDevice<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> std::fmt::Debug for TrinnovDevice<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrinnovDevice")
            .field("id", &self.inner.identity.id)
            .field("ip", &self.inner.identity.ip)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> TrinnovDevice<T> {
    /// Creates a device with default connection settings.
    #[must_use]
    pub fn new(identity: DeviceIdentity, transport: T) -> Self {
        Self::with_settings(identity, transport, ConnectionSettings::default())
    }

    /// Creates a device with explicit connection settings.
    #[must_use]
    pub fn with_settings(identity: DeviceIdentity, transport: T, settings: ConnectionSettings) -> Self {
        let signals = transport.subscribe();
        let inner = Arc::new(Inner {
            identity,
            settings,
            transport,
            session: Mutex::new(ConnectionSession::new()),
            state: RwLock::new(CachedDeviceState::new()),
            events: EventBus::new(),
            listener: Mutex::new(None),
        });

        let handle = tokio::spawn(listen(Arc::downgrade(&inner), signals));
        *inner.listener.lock() = Some(handle);

        Self { inner }
    }

    /// Returns the device id.
    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.inner.identity.id
    }

    /// Returns the device identity.
    #[must_use]
    pub fn identity(&self) -> &DeviceIdentity {
        &self.inner.identity
    }

    /// Returns the connection settings.
    #[must_use]
    pub fn settings(&self) -> &ConnectionSettings {
        &self.inner.settings
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Returns the command executor.
    #[must_use]
    pub fn executor(&self) -> &T::Executor {
        self.inner.transport.executor()
    }

    /// Returns the event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Subscribes to this device's events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.inner.events.subscribe()
    }

    /// Returns the current connection phase.
    #[must_use]
    pub fn phase(&self) -> ConnectionPhase {
        self.inner.session.lock().phase
    }

    /// Returns `true` while the session is up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.session.lock().connected
    }

    /// Returns `true` while a probe or cooldown task is in flight.
    #[must_use]
    pub fn is_retrying(&self) -> bool {
        self.inner.session.lock().retry.is_some()
    }

    /// Returns a snapshot of the cached state.
    #[must_use]
    pub fn state(&self) -> CachedDeviceState {
        self.inner.state.read().clone()
    }

    /// Reads the cached state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&CachedDeviceState) -> R) -> R {
        f(&self.inner.state.read())
    }

    /// Connects to the device.
    ///
    /// Tears down any existing session or retry task first. If the immediate
    /// attempt fails with a timeout, refusal or network error, a background
    /// task keeps probing until the device is ready and then connects; the
    /// outcome of that shows up as a [`DeviceEvent::Connected`].
    pub async fn connect(&self) -> ConnectOutcome {
        let inner = &self.inner;
        let busy = inner.transport.has_session() || inner.session.lock().retry.is_some();
        if busy {
            tracing::debug!(device_id = %self.id(), "session or retry in place, disconnecting first");
            self.disconnect().await;
        }

        {
            let mut session = inner.session.lock();
            session.connected = false;
            session.connecting = true;
            session.phase = ConnectionPhase::Connecting;
        }
        inner.events.publish(DeviceEvent::Connecting {
            device_id: self.id().clone(),
        });
        tracing::debug!(
            device_id = %self.id(),
            host = %inner.identity.ip,
            port = inner.settings.protocol_port,
            "connecting"
        );

        match self.open_session().await {
            Ok(()) => {
                inner.session.lock().connecting = false;
                return ConnectOutcome::Connected;
            }
            Err(e) if e.is_network_unreachable() => {
                tracing::warn!(
                    device_id = %self.id(),
                    "network unreachable, check local connectivity; waiting for device"
                );
            }
            Err(e) => {
                tracing::warn!(device_id = %self.id(), error = %e, "immediate connect failed, waiting for device");
            }
        }

        self.spawn_probe_loop();
        ConnectOutcome::Retrying
    }

    /// Disconnects from the device.
    ///
    /// Marks the disconnect intentional so no reconnect follows, cancels and
    /// awaits any retry task, then closes the session. No-op when already
    /// disconnected.
    pub async fn disconnect(&self) {
        let inner = &self.inner;
        let retry = {
            let mut session = inner.session.lock();
            if !session.connected && session.retry.is_none() && !inner.transport.has_session() {
                tracing::debug!(device_id = %self.id(), "already disconnected");
                return;
            }
            session.intentional_disconnect = true;
            session.retry.take()
        };

        tracing::info!(device_id = %self.id(), host = %inner.identity.ip, "disconnecting");

        if let Some(task) = retry {
            tracing::debug!(device_id = %self.id(), "cancelling retry task");
            task.token.cancel();
            if let Err(e) = task.handle.await {
                tracing::debug!(device_id = %self.id(), error = %e, "retry task ended abnormally");
            }
        }

        inner.transport.close().await;

        let mut session = inner.session.lock();
        session.connecting = false;
        session.phase = ConnectionPhase::Disconnected;
    }

    /// Runs a command on the device.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` without a session,
    /// `CommandError::UnsupportedCapability` if the executor lacks the
    /// command, or the protocol error from delivery.
    pub async fn execute(&self, command: DeviceCommand) -> Result<(), Error> {
        if !self.is_connected() {
            tracing::error!(device_id = %self.id(), command = %command.name(), "connection not established");
            return Err(Error::NotConnected);
        }
        let name = command.name();
        if !self.executor().supports(&name) {
            tracing::warn!(device_id = %self.id(), command = %name, "no executor capability");
            return Err(CommandError::UnsupportedCapability(name).into());
        }

        tracing::debug!(device_id = %self.id(), command = %command.to_wire(), "executing");
        self.executor().execute(command).await?;
        Ok(())
    }

    /// Wakes the device if it is off. Otherwise does nothing.
    ///
    /// # Errors
    ///
    /// Returns the protocol error if the wake packet could not be sent.
    pub async fn power_on(&self) -> Result<(), Error> {
        let state = self.with_state(CachedDeviceState::state);
        if state == MediaState::Off {
            tracing::info!(device_id = %self.id(), mac = %self.inner.identity.mac, "waking device");
            self.inner.transport.wake(&self.inner.identity.mac).await?;
        } else {
            tracing::debug!(device_id = %self.id(), %state, "power on skipped");
        }
        Ok(())
    }

    /// Puts the device in standby if it is on. Otherwise does nothing.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub async fn power_off(&self) -> Result<(), Error> {
        let state = self.with_state(CachedDeviceState::state);
        if state == MediaState::On {
            self.execute(DeviceCommand::PowerOff).await
        } else {
            tracing::debug!(device_id = %self.id(), %state, "power off skipped");
            Ok(())
        }
    }

    async fn open_session(&self) -> Result<(), ProtocolError> {
        let inner = &self.inner;
        let timeout = inner.settings.connect_timeout;
        match tokio::time::timeout(
            timeout,
            inner
                .transport
                .open(&inner.identity.ip, inner.settings.protocol_port),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ProtocolError::Timeout(
                u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            )),
        }
    }

    fn spawn_probe_loop(&self) {
        let mut session = self.inner.session.lock();
        if let Some(stale) = session.retry.take() {
            stale.token.cancel();
        }
        let generation = session.next_generation();
        let token = CancellationToken::new();
        let handle = tokio::spawn(self.clone().probe_loop(token.clone(), generation));
        session.retry = Some(RetryTask {
            generation,
            token,
            handle,
        });
        session.phase = ConnectionPhase::Probing;
    }

    async fn probe_loop(self, token: CancellationToken, generation: u64) {
        let inner = &self.inner;
        loop {
            let readiness =
                wait_until_ready(&inner.transport, &inner.identity.ip, &inner.settings, &token)
                    .await;
            if readiness == Readiness::Cancelled {
                tracing::info!(device_id = %self.id(), "probe loop stopped");
                break;
            }

            match cancellable(&token, self.open_session()).await {
                None => break,
                Some(Ok(())) => {
                    tracing::debug!(device_id = %self.id(), "session opened after readiness probe");
                    break;
                }
                Some(Err(e)) if e.is_network_unreachable() => {
                    tracing::warn!(
                        device_id = %self.id(),
                        backoff = ?inner.settings.unreachable_backoff,
                        "network unreachable, retrying"
                    );
                    if cancellable(&token, sleep(inner.settings.unreachable_backoff))
                        .await
                        .is_none()
                    {
                        break;
                    }
                }
                Some(Err(e)) => {
                    tracing::debug!(device_id = %self.id(), error = %e, "connect failed, probing again");
                }
            }
        }

        let mut session = inner.session.lock();
        if session.release_retry(generation) {
            session.connecting = false;
            if session.phase == ConnectionPhase::Probing && !session.connected {
                session.phase = ConnectionPhase::Disconnected;
            }
        }
    }

    fn schedule_reconnect(&self) {
        let cooldown = self.inner.settings.reconnect_cooldown;
        let mut session = self.inner.session.lock();
        if session.retry.is_some() {
            tracing::debug!(device_id = %self.id(), "retry already in flight");
            return;
        }

        let generation = session.next_generation();
        let token = CancellationToken::new();
        let device = self.clone();
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            let elapsed = cancellable(&task_token, sleep(cooldown)).await.is_some();
            let owned = device.inner.session.lock().release_retry(generation);
            if elapsed && owned {
                tracing::info!(device_id = %device.id(), "reconnecting after unexpected disconnect");
                device.connect().await;
            }
        });
        session.retry = Some(RetryTask {
            generation,
            token,
            handle,
        });
        session.phase = ConnectionPhase::ReconnectWait;
    }

    fn publish_updates(&self, updates: Vec<AttributeUpdate>) {
        for update in updates {
            let entity_id = EntityId::new(update.kind, self.id().clone());
            self.inner
                .events
                .publish(DeviceEvent::update(entity_id, update.to_attributes()));
        }
    }

    fn on_connected(&self) {
        {
            let mut session = self.inner.session.lock();
            session.connected = true;
            session.connecting = false;
            session.intentional_disconnect = false;
            session.phase = ConnectionPhase::Connected;
        }
        tracing::info!(
            device_id = %self.id(),
            host = %self.inner.identity.ip,
            port = self.inner.settings.protocol_port,
            "connected"
        );

        let updates = self.inner.state.write().mark_connected();
        self.inner.events.publish(DeviceEvent::Connected {
            device_id: self.id().clone(),
        });
        self.publish_updates(updates);
    }

    fn on_disconnected(&self) {
        let intentional = {
            let mut session = self.inner.session.lock();
            session.connected = false;
            if session.phase == ConnectionPhase::Connected {
                session.phase = ConnectionPhase::Disconnected;
            }
            session.intentional_disconnect
        };

        let updates = self.inner.state.write().mark_disconnected();
        self.inner.events.publish(DeviceEvent::Disconnected {
            device_id: self.id().clone(),
        });
        self.publish_updates(updates);

        if intentional {
            tracing::info!(device_id = %self.id(), "intentional disconnect, not reconnecting");
        } else {
            tracing::warn!(
                device_id = %self.id(),
                cooldown = ?self.inner.settings.reconnect_cooldown,
                "unexpected disconnect, device may have been powered down"
            );
            self.schedule_reconnect();
        }
    }

    fn on_signal(&self, signal: DeviceSignal) {
        match signal {
            DeviceSignal::Connection(ConnectionStatus::Connected) => self.on_connected(),
            DeviceSignal::Connection(ConnectionStatus::Disconnected) => self.on_disconnected(),
            DeviceSignal::Connection(ConnectionStatus::Connecting) => {
                tracing::debug!(device_id = %self.id(), "session connecting");
            }
            DeviceSignal::Telemetry { signal, value } => {
                tracing::debug!(device_id = %self.id(), %signal, %value, "telemetry");
                match signal.parse(&value) {
                    Ok(change) => {
                        let updates = self.inner.state.write().apply(&change);
                        self.publish_updates(updates);
                    }
                    Err(e) => {
                        tracing::warn!(device_id = %self.id(), error = %e, "ignoring malformed telemetry");
                    }
                }
            }
        }
    }
}

async fn listen<T: Transport>(device: Weak<Inner<T>>, mut signals: broadcast::Receiver<DeviceSignal>) {
    loop {
        let signal = match signals.recv().await {
            Ok(signal) => signal,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "device signal listener lagged");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        let Some(inner) = device.upgrade() else {
            break;
        };
        TrinnovDevice { inner }.on_signal(signal);
    }
    tracing::debug!("device signal listener stopped");
}
