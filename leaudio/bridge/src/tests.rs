// Copyright 2024, The Android Open Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{Bridge, BridgeConfig, ErrorKind, StackEndpoint};
use bt_leaudio_profiles::broadcast::{IsoSdu, SduStatus};
use bt_leaudio_profiles::media::{ReadTrackTitleParams, TitleRead};
use bt_leaudio_profiles::mic::MicTargetParams;
use bt_leaudio_profiles::sync::{
    AnnouncementReport, PaSyncPhase, PaSyncState, PaSyncTerminateParams, ScanStartParams,
};
use bt_leaudio_profiles::unicast::{PreferQos, QosPreference};
use bt_leaudio_profiles::volume::{SetAbsoluteVolumeParams, VolumeState};
use bt_leaudio_profiles::{
    ActionParams, Addr, AddrKind, BufferToken, Capabilities, EventBody, Group, HostStatus,
    ReentrantAnswer,
};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct StackSinkState {
    submitted: Vec<ActionParams>,
    acked: Vec<BufferToken>,
    confirms: mpsc::Receiver<ReentrantAnswer>,
}

struct StackSink {
    state: Mutex<StackSinkState>,
    confirm_tx: mpsc::Sender<ReentrantAnswer>,
    reject_next: Mutex<Option<HostStatus>>,
}

impl StackSink {
    fn new() -> Self {
        let (confirm_tx, confirm_rx) = mpsc::channel();
        StackSink {
            state: Mutex::new(StackSinkState {
                submitted: Default::default(),
                acked: Default::default(),
                confirms: confirm_rx,
            }),
            confirm_tx,
            reject_next: Mutex::new(None),
        }
    }

    fn reject_next_with(&self, status: HostStatus) {
        *self.reject_next.lock().unwrap() = Some(status);
    }
}

impl StackEndpoint for StackSink {
    fn submit(&self, params: &ActionParams) -> Result<(), HostStatus> {
        if let Some(status) = self.reject_next.lock().unwrap().take() {
            return Err(status);
        }
        self.state.lock().unwrap().submitted.push(params.clone());
        Ok(())
    }

    fn confirm(&self, answer: ReentrantAnswer) {
        self.confirm_tx.send(answer).expect("Sending confirm");
    }

    fn ack_buffer(&self, token: BufferToken) {
        self.state.lock().unwrap().acked.push(token);
    }
}

fn bridge_with(config: BridgeConfig) -> (Arc<StackSink>, Arc<Bridge>) {
    init();
    let sink = Arc::new(StackSink::new());
    let bridge = Arc::new(Bridge::new(sink.clone(), config));
    (sink, bridge)
}

fn bridge() -> (Arc<StackSink>, Arc<Bridge>) {
    bridge_with(BridgeConfig::default())
}

fn callback(bridge: &Bridge, body: EventBody, payload: Option<&[u8]>, token: Option<BufferToken>) {
    bridge.stack_callback(body.message_id(), body, payload, token);
}

fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        thread::sleep(Duration::from_millis(1));
    }
}

fn pa_terminated(sync_handle: u16, status: HostStatus) -> EventBody {
    EventBody::PaSyncState(PaSyncState { sync_handle, phase: PaSyncPhase::Terminated, status })
}

#[test]
fn pa_sync_terminate_unblocks_on_completion() {
    let (_, bridge) = bridge();

    let caller = {
        let bridge = bridge.clone();
        thread::spawn(move || {
            bridge.pa_sync_terminate(
                PaSyncTerminateParams { sync_handle: 7 },
                Duration::from_secs(1),
            )
        })
    };

    wait_until("command in flight", || bridge.in_flight() == 1);
    callback(&bridge, pa_terminated(7, HostStatus::Success), None, None);

    assert_eq!(caller.join().unwrap(), Ok(()));
    assert_eq!(bridge.in_flight(), 0);
    assert_eq!(bridge.counters().completions, 1);
}

#[test]
fn completion_output_reaches_caller() {
    let (_, bridge) = bridge();

    let caller = {
        let bridge = bridge.clone();
        thread::spawn(move || {
            bridge.set_absolute_volume(
                SetAbsoluteVolumeParams { conn_handle: 4, volume: 7 },
                Duration::from_secs(1),
            )
        })
    };

    wait_until("command in flight", || bridge.in_flight() == 1);
    callback(
        &bridge,
        EventBody::VolumeState(VolumeState {
            conn_handle: 4,
            volume: 7,
            muted: false,
            change_counter: 3,
        }),
        None,
        None,
    );

    let state = caller.join().unwrap().unwrap();
    assert_eq!(state.volume, 7);
    assert_eq!(state.change_counter, 3);
}

#[test]
fn failed_completion_surfaces_stack_status() {
    let (_, bridge) = bridge();

    let caller = {
        let bridge = bridge.clone();
        thread::spawn(move || {
            bridge.pa_sync_terminate(
                PaSyncTerminateParams { sync_handle: 9 },
                Duration::from_secs(1),
            )
        })
    };

    wait_until("command in flight", || bridge.in_flight() == 1);
    callback(&bridge, pa_terminated(9, HostStatus::Disallowed), None, None);

    assert_eq!(
        caller.join().unwrap(),
        Err(ErrorKind::LowerStackApi(HostStatus::Disallowed))
    );
}

#[test]
fn timeout_then_late_callback_is_absorbed() {
    let (_, bridge) = bridge();

    let started = Instant::now();
    let result = bridge
        .pa_sync_terminate(PaSyncTerminateParams { sync_handle: 2 }, Duration::from_millis(50));
    assert_eq!(result, Err(ErrorKind::Timeout));
    assert!(started.elapsed() >= Duration::from_millis(50));
    assert_eq!(bridge.in_flight(), 0);

    // The stack completes anyway; the orphan must not touch anything.
    callback(&bridge, pa_terminated(2, HostStatus::Success), None, None);
    assert_eq!(bridge.counters().orphaned, 1);
    assert_eq!(bridge.counters().completions, 0);
}

#[test]
fn duplicate_callback_completes_at_most_once() {
    let (_, bridge) = bridge();

    let caller = {
        let bridge = bridge.clone();
        thread::spawn(move || {
            bridge.pa_sync_terminate(
                PaSyncTerminateParams { sync_handle: 5 },
                Duration::from_secs(1),
            )
        })
    };

    wait_until("command in flight", || bridge.in_flight() == 1);
    callback(&bridge, pa_terminated(5, HostStatus::Success), None, None);
    callback(&bridge, pa_terminated(5, HostStatus::Success), None, None);

    assert_eq!(caller.join().unwrap(), Ok(()));
    let counters = bridge.counters();
    assert_eq!(counters.completions, 1);
    assert_eq!(counters.orphaned, 1);
}

#[test]
fn concurrent_same_key_is_busy() {
    let (_, bridge) = bridge();

    let caller = {
        let bridge = bridge.clone();
        thread::spawn(move || {
            bridge.pa_sync_terminate(
                PaSyncTerminateParams { sync_handle: 3 },
                Duration::from_secs(1),
            )
        })
    };
    wait_until("command in flight", || bridge.in_flight() == 1);

    let second = bridge
        .pa_sync_terminate(PaSyncTerminateParams { sync_handle: 3 }, Duration::from_millis(100));
    assert_eq!(second, Err(ErrorKind::Busy));

    // A different sync handle is a different key and goes through.
    let other = {
        let bridge = bridge.clone();
        thread::spawn(move || {
            bridge.pa_sync_terminate(
                PaSyncTerminateParams { sync_handle: 4 },
                Duration::from_secs(1),
            )
        })
    };
    wait_until("both in flight", || bridge.in_flight() == 2);

    callback(&bridge, pa_terminated(3, HostStatus::Success), None, None);
    callback(&bridge, pa_terminated(4, HostStatus::Success), None, None);
    assert_eq!(caller.join().unwrap(), Ok(()));
    assert_eq!(other.join().unwrap(), Ok(()));
}

#[test]
fn synchronous_reject_leaves_no_entry() {
    let (sink, bridge) = bridge();
    sink.reject_next_with(HostStatus::Disallowed);

    let result = bridge
        .pa_sync_terminate(PaSyncTerminateParams { sync_handle: 1 }, Duration::from_millis(100));
    assert_eq!(result, Err(ErrorKind::LowerStackApi(HostStatus::Disallowed)));
    assert_eq!(bridge.in_flight(), 0);

    // The same key is immediately usable again.
    let caller = {
        let bridge = bridge.clone();
        thread::spawn(move || {
            bridge.pa_sync_terminate(
                PaSyncTerminateParams { sync_handle: 1 },
                Duration::from_secs(1),
            )
        })
    };
    wait_until("command in flight", || bridge.in_flight() == 1);
    callback(&bridge, pa_terminated(1, HostStatus::Success), None, None);
    assert_eq!(caller.join().unwrap(), Ok(()));
}

#[test]
fn precondition_failures_never_touch_the_table() {
    let (sink, bridge) = bridge_with(BridgeConfig {
        capabilities: Capabilities::all() - Capabilities::MIC,
        ..Default::default()
    });

    // Window longer than interval fails validation.
    let result = bridge.scan_start(
        ScanStartParams { interval: 0x10, window: 0x20 },
        Duration::from_millis(100),
    );
    assert_eq!(result, Err(ErrorKind::ParamInvalid));

    // Capability bit absent.
    let result =
        bridge.mic_mute(MicTargetParams { conn_handle: 1 }, Duration::from_millis(100));
    assert_eq!(result, Err(ErrorKind::Unsupported));

    // Bridge disabled.
    bridge.set_enabled(false);
    let result = bridge.scan_stop(Duration::from_millis(100));
    assert_eq!(result, Err(ErrorKind::NotReady));

    assert_eq!(bridge.in_flight(), 0);
    assert!(sink.state.lock().unwrap().submitted.is_empty());
}

#[test]
fn indicated_payload_survives_stack_buffer_reuse() {
    let (_, bridge) = bridge();

    let (tx, rx) = mpsc::channel();
    bridge.register_event_handler(Group::Sync, move |event| {
        tx.send(event.payload().map(<[u8]>::to_vec)).expect("Forwarding payload");
    });

    let mut stack_buffer = vec![0x11, 0x22, 0x33, 0x44];
    callback(
        &bridge,
        EventBody::AnnouncementReport(AnnouncementReport {
            addr: Addr { kind: AddrKind::Public, val: [1, 2, 3, 4, 5, 6] },
            adv_sid: 2,
            broadcast_id: 0x123456,
            rssi: -40,
        }),
        Some(&stack_buffer),
        None,
    );
    // The stack reuses its buffer as soon as the callback returns.
    stack_buffer.fill(0xff);

    let delivered = rx.recv_timeout(Duration::from_secs(1)).expect("Receiving indication");
    assert_eq!(delivered, Some(vec![0x11, 0x22, 0x33, 0x44]));

    wait_until("event released", || bridge.counters().live_events == 0);
}

#[test]
fn iso_buffer_acknowledged_even_when_dropped() {
    let (sink, bridge) =
        bridge_with(BridgeConfig { max_live_events: 0, ..Default::default() });

    let sdu = EventBody::IsoSdu(IsoSdu {
        conn_handle: 0x20,
        seq_num: 9,
        timestamp: 1000,
        status: SduStatus::Valid,
    });
    callback(&bridge, sdu, Some(&[0xaa, 0xbb]), Some(BufferToken(77)));

    // Pool exhausted: the event is dropped, the stack still gets its
    // buffer back before dispatch returns.
    assert_eq!(sink.state.lock().unwrap().acked, vec![BufferToken(77)]);
    assert_eq!(bridge.counters().dropped, 1);
    assert_eq!(bridge.counters().live_events, 0);
}

#[test]
fn reentrant_without_opt_in_uses_fallback_and_indicates() {
    let (sink, bridge) = bridge();

    let qos = QosPreference {
        retransmission_number: 7,
        max_transport_latency: 35,
        presentation_delay: 15_000,
    };
    bridge.cache_preferred_qos(qos);

    let (tx, rx) = mpsc::channel();
    bridge.register_event_handler(Group::Unicast, move |event| {
        tx.send(event.body().clone()).expect("Forwarding indication");
    });

    let request = PreferQos {
        conn_handle: 1,
        ase_id: 2,
        direction: bt_leaudio_profiles::unicast::AseDirection::Sink,
    };
    callback(&bridge, EventBody::PreferQos(request), None, None);

    // The confirm was produced without any application handler, from
    // the cached fallback, before dispatch returned.
    let answer = sink
        .state
        .lock()
        .unwrap()
        .confirms
        .recv_timeout(Duration::from_millis(100))
        .expect("Receiving confirm");
    assert_eq!(answer, ReentrantAnswer::PreferredQos(qos));

    // The application still hears about the request asynchronously.
    let indicated = rx.recv_timeout(Duration::from_secs(1)).expect("Receiving indication");
    assert_eq!(indicated, EventBody::PreferQos(request));
}

#[test]
fn reentrant_opt_in_calls_handler_synchronously() {
    let (sink, bridge) = bridge();

    let custom = QosPreference {
        retransmission_number: 13,
        max_transport_latency: 100,
        presentation_delay: 5_000,
    };
    bridge.register_reentrant_handler(Group::Unicast, 0x02, move |view| {
        let EventBody::PreferQos(req) = view.body else { panic!("unexpected body") };
        assert_eq!(req.ase_id, 6);
        ReentrantAnswer::PreferredQos(custom)
    });
    bridge.set_direct_reentry_policy(Group::Unicast, 0x02, true);

    let (tx, rx) = mpsc::channel::<()>();
    bridge.register_event_handler(Group::Unicast, move |_| {
        tx.send(()).expect("Forwarding indication");
    });

    callback(
        &bridge,
        EventBody::PreferQos(PreferQos {
            conn_handle: 1,
            ase_id: 6,
            direction: bt_leaudio_profiles::unicast::AseDirection::Source,
        }),
        None,
        None,
    );

    let answer = sink
        .state
        .lock()
        .unwrap()
        .confirms
        .recv_timeout(Duration::from_millis(100))
        .expect("Receiving confirm");
    assert_eq!(answer, ReentrantAnswer::PreferredQos(custom));

    // Directly-called events are consumed in place, not indicated.
    assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
}

#[test]
fn unknown_message_is_rejected_and_acknowledged() {
    let (sink, bridge) = bridge();

    // Unknown group byte.
    bridge.stack_callback(
        0x7f01,
        pa_terminated(1, HostStatus::Success),
        None,
        Some(BufferToken(5)),
    );
    // Message id that contradicts the decoded body.
    bridge.stack_callback(0x0301, pa_terminated(1, HostStatus::Success), None, None);

    assert_eq!(bridge.counters().unknown, 2);
    assert_eq!(sink.state.lock().unwrap().acked, vec![BufferToken(5)]);
    assert_eq!(bridge.in_flight(), 0);
}

#[test]
fn full_indication_queue_drops_instead_of_blocking() {
    let (_, bridge) =
        bridge_with(BridgeConfig { event_queue_depth: 1, ..Default::default() });

    bridge.register_event_handler(Group::Sync, move |_| {
        thread::sleep(Duration::from_millis(100));
    });

    let report = EventBody::AnnouncementReport(AnnouncementReport {
        addr: Addr { kind: AddrKind::Random, val: [6; 6] },
        adv_sid: 0,
        broadcast_id: 1,
        rssi: -60,
    });
    let started = Instant::now();
    for _ in 0..3 {
        callback(&bridge, report.clone(), Some(&[0x01]), None);
    }
    // All three dispatches returned immediately, while the subscriber
    // is still sleeping on the first event.
    assert!(started.elapsed() < Duration::from_millis(100));

    wait_until("a drop is recorded", || bridge.counters().queue_dropped >= 1);
    wait_until("queue drains", || bridge.counters().live_events == 0);
}

#[test]
fn timeout_and_completion_race_resolves_to_one_outcome() {
    for round in 0..20u16 {
        let (_, bridge) = bridge();

        let caller = {
            let bridge = bridge.clone();
            thread::spawn(move || {
                bridge.pa_sync_terminate(
                    PaSyncTerminateParams { sync_handle: round },
                    Duration::from_millis(10),
                )
            })
        };

        wait_until("command in flight", || bridge.in_flight() == 1);
        // Aim the completion at the timeout instant.
        thread::sleep(Duration::from_millis(10));
        callback(&bridge, pa_terminated(round, HostStatus::Success), None, None);

        let outcome = caller.join().unwrap();
        assert!(
            outcome == Ok(()) || outcome == Err(ErrorKind::Timeout),
            "round {}: unexpected outcome {:?}",
            round,
            outcome
        );
        assert_eq!(bridge.in_flight(), 0, "round {}: dangling entry", round);

        let counters = bridge.counters();
        assert_eq!(counters.completions + counters.orphaned, 1, "round {}", round);
        if outcome.is_ok() {
            assert_eq!(counters.completions, 1, "round {}: Ok without completion", round);
        }
    }
}

#[test]
fn track_title_read_decodes_completion_payload() {
    let (_, bridge) = bridge();

    let caller = {
        let bridge = bridge.clone();
        thread::spawn(move || {
            bridge.media_read_track_title(
                ReadTrackTitleParams { conn_handle: 8 },
                Duration::from_secs(1),
            )
        })
    };

    wait_until("command in flight", || bridge.in_flight() == 1);
    callback(
        &bridge,
        EventBody::TitleRead(TitleRead { conn_handle: 8, status: HostStatus::Success }),
        Some(b"Moonlight Sonata"),
        None,
    );

    assert_eq!(caller.join().unwrap().unwrap(), "Moonlight Sonata");
}
