// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Glue between configured processors and the host platform.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::{DeviceConnectionState, HostPlatform};
use crate::command::{CommandDispatcher, Params, StatusCode};
use crate::entity::{
    Attributes, EntityDescriptor, EntityId, EntityKind, MediaPlayerAdapter, RemoteAdapter,
    SensorAdapter,
};
use crate::event::{DeviceEvent, DeviceId};
use crate::manager::{DeviceRegistry, TrinnovDevice};
use crate::protocol::Transport;

/// Adapters of the six entities of one device.
#[derive(Debug)]
struct DeviceEntities {
    media_player: MediaPlayerAdapter,
    remote: RemoteAdapter,
    sensors: BTreeMap<EntityKind, SensorAdapter>,
}

impl DeviceEntities {
    fn new(device_id: &DeviceId) -> Self {
        Self {
            media_player: MediaPlayerAdapter::new(device_id.clone()),
            remote: RemoteAdapter::new(device_id.clone()),
            sensors: EntityKind::SENSORS
                .into_iter()
                .map(|kind| (kind, SensorAdapter::new(kind, device_id.clone())))
                .collect(),
        }
    }

    fn filter(&mut self, kind: EntityKind, update: &Attributes) -> Attributes {
        match kind {
            EntityKind::MediaPlayer => self.media_player.filter_changed_attributes(update),
            EntityKind::Remote => self.remote.filter_changed_attributes(update),
            sensor => self
                .sensors
                .get_mut(&sensor)
                .map(|adapter| adapter.filter_changed_attributes(update))
                .unwrap_or_default(),
        }
    }
}

struct Shared<T: Transport, H: HostPlatform> {
    registry: Arc<DeviceRegistry<T>>,
    dispatcher: CommandDispatcher<T>,
    host: H,
    entities: Mutex<HashMap<DeviceId, DeviceEntities>>,
    pumps: Mutex<HashMap<DeviceId, JoinHandle<()>>>,
    subscribed: Mutex<HashSet<EntityId>>,
}

impl<T: Transport, H: HostPlatform> Drop for Shared<T, H> {
    fn drop(&mut self) {
        for (_, pump) in self.pumps.get_mut().drain() {
            pump.abort();
        }
    }
}

impl<T: Transport, H: HostPlatform> Shared<T, H> {
    fn handle_event(&self, event: DeviceEvent) {
        match event {
            DeviceEvent::Connecting { device_id } => {
                tracing::debug!(%device_id, "device connecting");
            }
            DeviceEvent::Connected { device_id } => {
                self.report_connection(&device_id, DeviceConnectionState::Connected);
            }
            DeviceEvent::Disconnected { device_id } => {
                self.report_connection(&device_id, DeviceConnectionState::Disconnected);
            }
            DeviceEvent::Update {
                entity_id,
                attributes,
            } => self.forward_update(&entity_id, &attributes),
        }
    }

    fn report_connection(&self, device_id: &DeviceId, state: DeviceConnectionState) {
        if !self.registry.contains(device_id) {
            tracing::warn!(%device_id, "device is not configured");
            return;
        }
        tracing::debug!(%device_id, %state, "device connection changed");
        self.host.set_device_connection_state(state);
    }

    fn forward_update(&self, entity_id: &EntityId, attributes: &Attributes) {
        if !self.subscribed.lock().contains(entity_id) {
            tracing::trace!(%entity_id, "entity not subscribed, update dropped");
            return;
        }

        let changed = {
            let mut entities = self.entities.lock();
            let Some(device) = entities.get_mut(entity_id.device_id()) else {
                tracing::debug!(%entity_id, "entity not found");
                return;
            };
            device.filter(entity_id.kind(), attributes)
        };

        if changed.is_empty() {
            tracing::debug!(%entity_id, "attributes not changed");
            return;
        }
        tracing::debug!(%entity_id, ?changed, "changed attributes");
        if !self.host.update_entity_attributes(entity_id, changed) {
            tracing::debug!(%entity_id, "host rejected attribute update");
        }
    }

    fn initial_attributes(&self, entity_id: &EntityId, device: &TrinnovDevice<T>) -> Attributes {
        let connected = device.is_connected();
        device.with_state(|state| match entity_id.kind() {
            EntityKind::MediaPlayer => MediaPlayerAdapter::initial_attributes(state),
            EntityKind::Remote => RemoteAdapter::initial_attributes(state),
            sensor => SensorAdapter::initial_attributes(sensor, state, connected),
        })
    }

    fn detach(&self, device_id: &DeviceId) {
        if let Some(pump) = self.pumps.lock().remove(device_id) {
            pump.abort();
        }
        self.entities.lock().remove(device_id);
        self.subscribed
            .lock()
            .retain(|entity_id| entity_id.device_id() != device_id);
    }
}

/// Drives the host entities of every configured processor.
///
/// One event task per device feeds [`DeviceEvent`]s through the entity
/// adapters; only attributes that actually changed reach the host, and only
/// for subscribed entities. Host commands are routed by entity kind to the
/// adapters and from there to the [`CommandDispatcher`].
///
/// Cheap to clone. Must be used inside a Tokio runtime.
pub struct Bridge<T: Transport, H: HostPlatform> {
    shared: Arc<Shared<T, H>>,
}

impl<T: Transport, H: HostPlatform> Clone for Bridge<T, H> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Transport, H: HostPlatform> std::fmt::Debug for Bridge<T, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("registry", &self.shared.registry)
            .field("subscribed", &self.shared.subscribed.lock().len())
            .finish_non_exhaustive()
    }
}

impl<T: Transport, H: HostPlatform> Bridge<T, H> {
    /// Creates a bridge with an empty registry.
    #[must_use]
    pub fn new(host: H) -> Self {
        Self::with_registry(Arc::new(DeviceRegistry::new()), host)
    }

    /// Creates a bridge over an existing registry.
    ///
    /// Devices already in the registry have no entities until they are
    /// passed to [`configure_device`](Self::configure_device).
    #[must_use]
    pub fn with_registry(registry: Arc<DeviceRegistry<T>>, host: H) -> Self {
        let dispatcher = CommandDispatcher::new(Arc::clone(&registry));
        Self {
            shared: Arc::new(Shared {
                registry,
                dispatcher,
                host,
                entities: Mutex::new(HashMap::new()),
                pumps: Mutex::new(HashMap::new()),
                subscribed: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Returns the registry of configured devices.
    #[must_use]
    pub fn registry(&self) -> &Arc<DeviceRegistry<T>> {
        &self.shared.registry
    }

    /// Returns the dispatcher that runs entity commands on the devices.
    #[must_use]
    pub fn dispatcher(&self) -> &CommandDispatcher<T> {
        &self.shared.dispatcher
    }

    /// Returns the host platform.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.shared.host
    }

    /// Returns `true` if the host subscribed to this entity.
    #[must_use]
    pub fn is_subscribed(&self, entity_id: &EntityId) -> bool {
        self.shared.subscribed.lock().contains(entity_id)
    }

    /// Registers a device, wires its events and registers its six entities.
    ///
    /// A device already configured under the same id is disconnected and
    /// replaced. With `connect`, a connection attempt is started in the
    /// background.
    pub async fn configure_device(&self, device: TrinnovDevice<T>, connect: bool) {
        let shared = &self.shared;
        let id = device.id().clone();
        tracing::debug!(device_id = %id, connect, "configuring device");

        if let Some(previous) = shared.registry.unregister(&id) {
            tracing::info!(device_id = %id, "replacing configured device");
            shared.detach(&id);
            previous.disconnect().await;
        }

        shared.dispatcher.validate(&device);
        let events = device.subscribe();
        shared.entities.lock().insert(id.clone(), DeviceEntities::new(&id));
        shared.registry.register(device.clone());
        let pump = tokio::spawn(run_event_pump(Arc::downgrade(shared), events));
        shared.pumps.lock().insert(id.clone(), pump);

        let connected = device.is_connected();
        let descriptors = device.with_state(|state| {
            EntityDescriptor::all(device.identity(), state, connected)
        });
        for descriptor in descriptors {
            shared.host.remove_entity(&descriptor.id);
            shared.host.register_entity(descriptor);
        }

        if connect {
            tokio::spawn(async move {
                device.connect().await;
            });
        }
    }

    /// Unregisters a device, removes its entities and disconnects it.
    ///
    /// Returns `false` if the device was not configured.
    pub async fn remove_device(&self, id: &DeviceId) -> bool {
        let shared = &self.shared;
        let Some(device) = shared.registry.unregister(id) else {
            tracing::debug!(device_id = %id, "no device found for removal");
            return false;
        };

        shared.detach(id);
        for kind in EntityKind::ALL {
            shared.host.remove_entity(&EntityId::new(kind, id.clone()));
        }
        device.disconnect().await;
        tracing::info!(device_id = %id, "device cleaned up");
        true
    }

    /// Removes every device and its entities.
    pub async fn clear(&self) {
        let shared = &self.shared;
        let devices = shared.registry.clear();
        tracing::info!(count = devices.len(), "clearing all devices");
        for device in devices {
            let id = device.id().clone();
            shared.detach(&id);
            for kind in EntityKind::ALL {
                shared.host.remove_entity(&EntityId::new(kind, id.clone()));
            }
            device.disconnect().await;
        }
    }

    /// Connects every configured device.
    pub async fn connect_all(&self) {
        self.shared.registry.connect_all().await;
    }

    /// Disconnects every configured device without reconnecting.
    pub async fn disconnect_all(&self) {
        self.shared.registry.disconnect_all().await;
    }

    /// The host connected to the integration.
    pub async fn on_host_connect(&self) {
        tracing::info!("host connected");
        self.shared
            .host
            .set_device_connection_state(DeviceConnectionState::Connected);
        self.connect_all().await;
    }

    /// The host disconnected from the integration.
    pub async fn on_host_disconnect(&self) {
        tracing::info!("host disconnected");
        self.shared
            .host
            .set_device_connection_state(DeviceConnectionState::Disconnected);
        self.disconnect_all().await;
    }

    /// The host entered standby.
    pub async fn on_enter_standby(&self) {
        tracing::debug!("host entering standby, disconnecting devices");
        self.disconnect_all().await;
    }

    /// The host left standby.
    pub async fn on_exit_standby(&self) {
        tracing::debug!("host leaving standby, connecting devices");
        self.connect_all().await;
    }

    /// Marks entities subscribed and pushes their full current attributes.
    ///
    /// Entities of unconfigured devices are skipped with an error log.
    pub fn subscribe_entities(&self, entity_ids: &[EntityId]) {
        let shared = &self.shared;
        tracing::debug!(?entity_ids, "subscribe entities");

        for entity_id in entity_ids {
            let Some(device) = shared.registry.get(entity_id.device_id()) else {
                tracing::error!(%entity_id, "no configuration found for entity");
                continue;
            };

            let attributes = shared.initial_attributes(entity_id, &device);
            if let Some(entities) = shared.entities.lock().get_mut(entity_id.device_id()) {
                entities.filter(entity_id.kind(), &attributes);
            }
            shared.subscribed.lock().insert(entity_id.clone());

            tracing::info!(%entity_id, "setting initial state");
            shared.host.update_entity_attributes(entity_id, attributes);
        }
    }

    /// Drops subscriptions and disconnects devices left without any.
    pub async fn unsubscribe_entities(&self, entity_ids: &[EntityId]) {
        let shared = &self.shared;
        tracing::debug!(?entity_ids, "unsubscribe entities");

        let unused: Vec<DeviceId> = {
            let mut subscribed = shared.subscribed.lock();
            for entity_id in entity_ids {
                subscribed.remove(entity_id);
            }
            let mut devices: Vec<DeviceId> = entity_ids
                .iter()
                .map(|entity_id| entity_id.device_id().clone())
                .filter(|device_id| !subscribed.iter().any(|e| e.device_id() == device_id))
                .collect();
            devices.sort();
            devices.dedup();
            devices
        };

        for device_id in unused {
            if let Some(device) = shared.registry.get(&device_id) {
                tracing::debug!(%device_id, "no subscribed entities left, disconnecting");
                device.disconnect().await;
            }
        }
    }

    /// Runs a host command on an entity.
    ///
    /// Sensors take no commands and answer `NOT_IMPLEMENTED`. Entities of
    /// unconfigured devices answer `SERVICE_UNAVAILABLE`.
    pub async fn command(&self, entity_id: &EntityId, command: &str, params: &Params) -> StatusCode {
        let shared = &self.shared;
        let dispatcher = &shared.dispatcher;

        match entity_id.kind() {
            EntityKind::MediaPlayer => {
                let adapter = self.with_entities(entity_id, |e| e.media_player.clone());
                match adapter {
                    Some(adapter) => adapter.handle_command(dispatcher, command, params).await,
                    None => unconfigured(entity_id),
                }
            }
            EntityKind::Remote => {
                let adapter = self.with_entities(entity_id, |e| e.remote.clone());
                match adapter {
                    Some(adapter) => adapter.handle_command(dispatcher, command, params).await,
                    None => unconfigured(entity_id),
                }
            }
            _ => {
                tracing::warn!(%entity_id, command, "sensors take no commands");
                StatusCode::NotImplemented
            }
        }
    }

    /// Feeds one device event through the adapters to the host.
    ///
    /// The per-device event tasks call this; it is public for hosts that
    /// replay events themselves.
    pub fn handle_event(&self, event: DeviceEvent) {
        self.shared.handle_event(event);
    }

    fn with_entities<R>(&self, entity_id: &EntityId, f: impl FnOnce(&DeviceEntities) -> R) -> Option<R> {
        self.shared.entities.lock().get(entity_id.device_id()).map(f)
    }
}

fn unconfigured(entity_id: &EntityId) -> StatusCode {
    tracing::warn!(%entity_id, "command for unconfigured device");
    StatusCode::ServiceUnavailable
}

async fn run_event_pump<T: Transport, H: HostPlatform>(
    shared: Weak<Shared<T, H>>,
    mut events: broadcast::Receiver<DeviceEvent>,
) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "device event pump lagged");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        let Some(shared) = shared.upgrade() else {
            break;
        };
        shared.handle_event(event);
    }
    tracing::debug!("device event pump stopped");
}
