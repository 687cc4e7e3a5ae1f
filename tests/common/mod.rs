// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::time::Instant;

use trinnov_bridge::bridge::{DeviceConnectionState, HostPlatform};
use trinnov_bridge::command::DeviceCommand;
use trinnov_bridge::entity::{Attributes, EntityDescriptor, EntityId};
use trinnov_bridge::error::ProtocolError;
use trinnov_bridge::event::DeviceEvent;
use trinnov_bridge::manager::DeviceIdentity;
use trinnov_bridge::protocol::{EthernetStatus, Executor, Transport};
use trinnov_bridge::telemetry::{ConnectionStatus, DeviceSignal, Signal};

pub const CONTROL_PORT: u16 = 80;
pub const PROTOCOL_PORT: u16 = 44100;

pub fn identity() -> DeviceIdentity {
    DeviceIdentity::new("X", "Altitude", "10.0.0.5", "AA:BB")
}

/// How a queued `open` should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFailure {
    Unreachable,
    Refused,
    Hang,
}

#[derive(Debug, Default)]
struct TransportState {
    failures: VecDeque<OpenFailure>,
    opens: usize,
    closes: usize,
    session: bool,
    open_ports: HashSet<u16>,
    port_checks: Vec<(u16, Instant)>,
    handshake_ready: bool,
    wakes: Vec<String>,
}

/// Scriptable device session. Clones share state.
#[derive(Debug, Clone)]
pub struct FakeTransport {
    state: Arc<Mutex<TransportState>>,
    signals: broadcast::Sender<DeviceSignal>,
    executor: FakeExecutor,
}

impl FakeTransport {
    pub fn new() -> Self {
        let (signals, _) = broadcast::channel(64);
        Self {
            state: Arc::new(Mutex::new(TransportState {
                handshake_ready: true,
                ..TransportState::default()
            })),
            signals,
            executor: FakeExecutor::default(),
        }
    }

    pub fn fail_next_open(&self, failure: OpenFailure) {
        self.state.lock().failures.push_back(failure);
    }

    pub fn open_port(&self, port: u16) {
        self.state.lock().open_ports.insert(port);
    }

    pub fn set_handshake_ready(&self, ready: bool) {
        self.state.lock().handshake_ready = ready;
    }

    pub fn opens(&self) -> usize {
        self.state.lock().opens
    }

    pub fn closes(&self) -> usize {
        self.state.lock().closes
    }

    pub fn port_checks(&self) -> Vec<(u16, Instant)> {
        self.state.lock().port_checks.clone()
    }

    pub fn clear_port_checks(&self) {
        self.state.lock().port_checks.clear();
    }

    pub fn wakes(&self) -> Vec<String> {
        self.state.lock().wakes.clone()
    }

    pub fn commands(&self) -> Vec<DeviceCommand> {
        self.executor.commands.lock().clone()
    }

    /// The device drops the session on its own.
    pub fn drop_session(&self) {
        self.state.lock().session = false;
        let _ = self
            .signals
            .send(DeviceSignal::Connection(ConnectionStatus::Disconnected));
    }

    pub fn emit(&self, signal: Signal, value: serde_json::Value) {
        let _ = self.signals.send(DeviceSignal::telemetry(signal, value));
    }
}

impl Transport for FakeTransport {
    type Executor = FakeExecutor;

    async fn open(&self, _host: &str, _port: u16) -> Result<(), ProtocolError> {
        let failure = {
            let mut state = self.state.lock();
            state.opens += 1;
            let failure = state.failures.pop_front();
            if failure.is_none() {
                state.session = true;
            }
            failure
        };

        match failure {
            None => {
                let _ = self
                    .signals
                    .send(DeviceSignal::Connection(ConnectionStatus::Connected));
                Ok(())
            }
            Some(OpenFailure::Unreachable) => Err(ProtocolError::NetworkUnreachable),
            Some(OpenFailure::Refused) => Err(ProtocolError::ConnectionRefused),
            Some(OpenFailure::Hang) => std::future::pending().await,
        }
    }

    async fn close(&self) {
        let had_session = {
            let mut state = self.state.lock();
            state.closes += 1;
            std::mem::replace(&mut state.session, false)
        };
        if had_session {
            let _ = self
                .signals
                .send(DeviceSignal::Connection(ConnectionStatus::Disconnected));
        }
    }

    fn has_session(&self) -> bool {
        self.state.lock().session
    }

    fn executor(&self) -> &FakeExecutor {
        &self.executor
    }

    fn subscribe(&self) -> broadcast::Receiver<DeviceSignal> {
        self.signals.subscribe()
    }

    async fn port_open(&self, _host: &str, port: u16, _timeout: Duration) -> bool {
        let mut state = self.state.lock();
        state.port_checks.push((port, Instant::now()));
        state.open_ports.contains(&port)
    }

    async fn probe_ethernet(&self, _host: &str) -> Result<EthernetStatus, ProtocolError> {
        if self.state.lock().handshake_ready {
            Ok(EthernetStatus {
                macaddr: "AA:BB".to_string(),
            })
        } else {
            Err(ProtocolError::Handshake("empty response".to_string()))
        }
    }

    async fn wake(&self, mac: &str) -> Result<(), ProtocolError> {
        self.state.lock().wakes.push(mac.to_string());
        Ok(())
    }
}

/// Records every command; supports every standard capability.
#[derive(Debug, Clone, Default)]
pub struct FakeExecutor {
    commands: Arc<Mutex<Vec<DeviceCommand>>>,
}

impl Executor for FakeExecutor {
    fn supports(&self, _capability: &str) -> bool {
        true
    }

    async fn execute(&self, command: DeviceCommand) -> Result<(), ProtocolError> {
        self.commands.lock().push(command);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct HostState {
    registered: Vec<EntityDescriptor>,
    removed: Vec<EntityId>,
    updates: Vec<(EntityId, Attributes)>,
    connection: Vec<DeviceConnectionState>,
}

/// Records everything pushed to the host. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeHost {
    state: Arc<Mutex<HostState>>,
}

impl FakeHost {
    pub fn registered(&self) -> Vec<EntityId> {
        self.state
            .lock()
            .registered
            .iter()
            .map(|d| d.id.clone())
            .collect()
    }

    pub fn removed(&self) -> Vec<EntityId> {
        self.state.lock().removed.clone()
    }

    pub fn updates(&self) -> Vec<(EntityId, Attributes)> {
        self.state.lock().updates.clone()
    }

    pub fn updates_for(&self, entity_id: &EntityId) -> Vec<Attributes> {
        self.state
            .lock()
            .updates
            .iter()
            .filter(|(id, _)| id == entity_id)
            .map(|(_, attributes)| attributes.clone())
            .collect()
    }

    pub fn clear_updates(&self) {
        self.state.lock().updates.clear();
    }

    pub fn connection_states(&self) -> Vec<DeviceConnectionState> {
        self.state.lock().connection.clone()
    }
}

impl HostPlatform for FakeHost {
    fn register_entity(&self, descriptor: EntityDescriptor) {
        self.state.lock().registered.push(descriptor);
    }

    fn remove_entity(&self, entity_id: &EntityId) {
        let mut state = self.state.lock();
        state.registered.retain(|d| &d.id != entity_id);
        state.removed.push(entity_id.clone());
    }

    fn update_entity_attributes(&self, entity_id: &EntityId, attributes: Attributes) -> bool {
        let mut state = self.state.lock();
        let known = state.registered.iter().any(|d| &d.id == entity_id);
        state.updates.push((entity_id.clone(), attributes));
        known
    }

    fn set_device_connection_state(&self, state: DeviceConnectionState) {
        self.state.lock().connection.push(state);
    }
}

/// Lets spawned tasks run without moving the clock noticeably.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// Drains every event already published.
pub fn drain(events: &mut broadcast::Receiver<DeviceEvent>) -> Vec<DeviceEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}
