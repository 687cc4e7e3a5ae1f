// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection manager lifecycle under a paused clock.

mod common;

use std::time::Duration;

use tokio::time::{Instant, sleep};
use trinnov_bridge::entity::{Attribute, AttributeValue, EntityKind};
use trinnov_bridge::event::DeviceEvent;
use trinnov_bridge::manager::{ConnectOutcome, ConnectionPhase, TrinnovDevice};
use trinnov_bridge::types::{MediaState, SensorState};

use common::{CONTROL_PORT, FakeTransport, OpenFailure, PROTOCOL_PORT, drain, identity, settle};

fn device(transport: &FakeTransport) -> TrinnovDevice<FakeTransport> {
    TrinnovDevice::new(identity(), transport.clone())
}

async fn connected(transport: &FakeTransport) -> TrinnovDevice<FakeTransport> {
    let device = device(transport);
    assert_eq!(device.connect().await, ConnectOutcome::Connected);
    settle().await;
    assert!(device.is_connected());
    device
}

// ============================================================================
// Immediate connect and readiness probe
// ============================================================================

mod connect {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn immediate_success() {
        let transport = FakeTransport::new();
        let device = connected(&transport).await;

        assert_eq!(device.phase(), ConnectionPhase::Connected);
        assert!(!device.is_retrying());
        assert_eq!(transport.opens(), 1);
        assert!(transport.port_checks().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_then_probe_until_ready() {
        let transport = FakeTransport::new();
        transport.fail_next_open(OpenFailure::Unreachable);
        let device = device(&transport);
        let mut events = device.subscribe();

        assert_eq!(device.connect().await, ConnectOutcome::Retrying);
        assert!(device.is_retrying());
        assert_eq!(device.phase(), ConnectionPhase::Probing);

        sleep(Duration::from_secs(25)).await;
        let checks = transport.port_checks();
        assert!(checks.len() >= 2);
        assert!(checks.iter().all(|(port, _)| *port == CONTROL_PORT));
        assert!(!device.is_connected());

        transport.open_port(CONTROL_PORT);
        transport.open_port(PROTOCOL_PORT);
        sleep(Duration::from_secs(15)).await;

        assert!(device.is_connected());
        assert_eq!(device.phase(), ConnectionPhase::Connected);
        assert!(!device.is_retrying());
        assert_eq!(transport.opens(), 2);

        let checks = transport.port_checks();
        let last_control = checks
            .iter()
            .filter(|(port, _)| *port == CONTROL_PORT)
            .map(|(_, at)| *at)
            .max()
            .unwrap();
        let first_protocol = checks
            .iter()
            .find(|(port, _)| *port == PROTOCOL_PORT)
            .map(|(_, at)| *at)
            .unwrap();
        assert!(first_protocol.duration_since(last_control) >= Duration::from_secs(2));

        let events = drain(&mut events);
        assert!(matches!(events[0], DeviceEvent::Connecting { .. }));
        let connected_at = events
            .iter()
            .position(|e| matches!(e, DeviceEvent::Connected { .. }))
            .unwrap();

        let baseline: Vec<_> = events[connected_at + 1..]
            .iter()
            .filter_map(|e| match e {
                DeviceEvent::Update {
                    entity_id,
                    attributes,
                } => Some((entity_id.kind(), attributes.get(&Attribute::State).cloned())),
                _ => None,
            })
            .collect();
        assert_eq!(baseline.len(), 6);
        assert!(baseline.contains(&(
            EntityKind::MediaPlayer,
            Some(AttributeValue::Media(MediaState::On))
        )));
        for kind in EntityKind::SENSORS {
            assert!(baseline.contains(&(kind, Some(AttributeValue::Sensor(SensorState::On)))));
        }
        assert!(baseline.iter().any(|(kind, _)| *kind == EntityKind::Remote));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_open_times_out_into_retry() {
        let transport = FakeTransport::new();
        transport.fail_next_open(OpenFailure::Hang);
        let device = device(&transport);

        let started = Instant::now();
        assert_eq!(device.connect().await, ConnectOutcome::Retrying);
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert!(device.is_retrying());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_handshake_keeps_polling() {
        let transport = FakeTransport::new();
        transport.fail_next_open(OpenFailure::Refused);
        transport.open_port(CONTROL_PORT);
        transport.open_port(PROTOCOL_PORT);
        transport.set_handshake_ready(false);
        let device = device(&transport);

        assert_eq!(device.connect().await, ConnectOutcome::Retrying);
        sleep(Duration::from_secs(20)).await;
        assert!(!device.is_connected());
        assert_eq!(transport.opens(), 1);
        let protocol_checks = transport
            .port_checks()
            .iter()
            .filter(|(port, _)| *port == PROTOCOL_PORT)
            .count();
        assert!(protocol_checks >= 2);

        transport.set_handshake_ready(true);
        sleep(Duration::from_secs(5)).await;
        assert!(device.is_connected());
        assert_eq!(transport.opens(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_in_probe_backs_off() {
        let transport = FakeTransport::new();
        transport.fail_next_open(OpenFailure::Refused);
        transport.fail_next_open(OpenFailure::Unreachable);
        transport.open_port(CONTROL_PORT);
        transport.open_port(PROTOCOL_PORT);
        let device = device(&transport);

        assert_eq!(device.connect().await, ConnectOutcome::Retrying);
        sleep(Duration::from_secs(8)).await;
        assert_eq!(transport.opens(), 2);
        assert!(!device.is_connected());

        sleep(Duration::from_secs(12)).await;
        assert_eq!(transport.opens(), 3);
        assert!(device.is_connected());
    }
}

// ============================================================================
// Task ownership
// ============================================================================

mod tasks {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn connect_twice_tears_down_once() {
        let transport = FakeTransport::new();
        let device = connected(&transport).await;

        assert_eq!(device.connect().await, ConnectOutcome::Connected);
        settle().await;

        assert_eq!(transport.closes(), 1);
        assert_eq!(transport.opens(), 2);
        assert!(device.is_connected());
        assert!(!device.is_retrying());

        sleep(Duration::from_secs(60)).await;
        assert_eq!(transport.opens(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn connect_while_probing_replaces_probe() {
        let transport = FakeTransport::new();
        transport.fail_next_open(OpenFailure::Refused);
        transport.fail_next_open(OpenFailure::Refused);
        let device = device(&transport);

        assert_eq!(device.connect().await, ConnectOutcome::Retrying);
        sleep(Duration::from_secs(5)).await;

        assert_eq!(device.connect().await, ConnectOutcome::Retrying);
        assert!(device.is_retrying());
        transport.clear_port_checks();

        sleep(Duration::from_secs(35)).await;
        let checks = transport.port_checks().len();
        assert!((3..=4).contains(&checks), "{checks} control port checks");
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_cancels_probe() {
        let transport = FakeTransport::new();
        transport.fail_next_open(OpenFailure::Refused);
        let device = device(&transport);

        assert_eq!(device.connect().await, ConnectOutcome::Retrying);
        device.disconnect().await;

        assert!(!device.is_retrying());
        assert_eq!(device.phase(), ConnectionPhase::Disconnected);

        transport.open_port(CONTROL_PORT);
        transport.open_port(PROTOCOL_PORT);
        sleep(Duration::from_secs(60)).await;
        assert_eq!(transport.opens(), 1);
        assert!(!device.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_when_idle_is_noop() {
        let transport = FakeTransport::new();
        let device = device(&transport);

        device.disconnect().await;
        assert_eq!(transport.closes(), 0);
        assert_eq!(device.phase(), ConnectionPhase::Disconnected);
    }
}

// ============================================================================
// Disconnect classification
// ============================================================================

mod reconnect {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn intentional_disconnect_does_not_reconnect() {
        let transport = FakeTransport::new();
        let device = connected(&transport).await;

        device.disconnect().await;
        settle().await;
        assert!(!device.is_connected());
        assert!(!device.is_retrying());

        transport.drop_session();
        settle().await;
        assert!(!device.is_retrying());

        sleep(Duration::from_secs(60)).await;
        assert_eq!(transport.opens(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unexpected_disconnect_reconnects_after_cooldown() {
        let transport = FakeTransport::new();
        let device = connected(&transport).await;
        let mut events = device.subscribe();

        transport.drop_session();
        settle().await;
        assert!(!device.is_connected());
        assert!(device.is_retrying());
        assert_eq!(device.phase(), ConnectionPhase::ReconnectWait);

        let disconnected = drain(&mut events);
        assert!(matches!(disconnected[0], DeviceEvent::Disconnected { .. }));
        assert!(disconnected.iter().any(|e| matches!(
            e,
            DeviceEvent::Update { entity_id, attributes }
                if entity_id.kind() == EntityKind::MediaPlayer
                    && attributes.get(&Attribute::State) == Some(&AttributeValue::Media(MediaState::Off))
        )));

        sleep(Duration::from_secs(15)).await;
        assert_eq!(transport.opens(), 1);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(transport.opens(), 2);
        assert!(device.is_connected());
        assert!(!device.is_retrying());
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_during_cooldown_cancels_reconnect() {
        let transport = FakeTransport::new();
        let device = connected(&transport).await;

        transport.drop_session();
        settle().await;
        assert!(device.is_retrying());

        device.disconnect().await;
        assert!(!device.is_retrying());

        sleep(Duration::from_secs(60)).await;
        assert_eq!(transport.opens(), 1);
    }
}
