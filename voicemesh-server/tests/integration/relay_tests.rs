use voicemesh_core::{PeerId, ServerMessage, SignalPayload};

use crate::utils::{TestPeer, create_state, init_tracing};

#[test]
fn relay_delivers_to_addressee_only() {
    init_tracing();
    let state = create_state();
    let mut a = TestPeer::connect(&state);
    let mut b = TestPeer::connect(&state);
    let mut c = TestPeer::connect(&state);

    state.handle_signal(
        a.id.clone(),
        &b.id,
        SignalPayload::Offer { sdp: "v=0".into() },
    );

    let delivered = b.drain();
    assert_eq!(delivered.len(), 1);
    match &delivered[0] {
        ServerMessage::Signal { from, payload } => {
            assert_eq!(from, &a.id);
            assert_eq!(payload, &SignalPayload::Offer { sdp: "v=0".into() });
        }
        other => panic!("unexpected message: {other:?}"),
    }

    assert!(a.drain().is_empty());
    assert!(c.drain().is_empty());
}

#[test]
fn relay_to_unknown_peer_is_silently_dropped() {
    init_tracing();
    let state = create_state();
    let a = TestPeer::connect(&state);

    state.handle_signal(
        a.id.clone(),
        &PeerId::new(),
        SignalPayload::Answer { sdp: "v=0".into() },
    );
    // Nothing to assert beyond "no panic": fire-and-forget by contract.
}

#[test]
fn relay_preserves_per_pair_order() {
    init_tracing();
    let state = create_state();
    let a = TestPeer::connect(&state);
    let mut b = TestPeer::connect(&state);

    for i in 0..5 {
        state.handle_signal(
            a.id.clone(),
            &b.id,
            SignalPayload::IceCandidate {
                candidate: format!("candidate:{i}"),
                sdp_mid: None,
                sdp_m_line_index: None,
            },
        );
    }

    let candidates: Vec<String> = b
        .drain()
        .into_iter()
        .map(|msg| match msg {
            ServerMessage::Signal {
                payload: SignalPayload::IceCandidate { candidate, .. },
                ..
            } => candidate,
            other => panic!("unexpected message: {other:?}"),
        })
        .collect();

    let expected: Vec<String> = (0..5).map(|i| format!("candidate:{i}")).collect();
    assert_eq!(candidates, expected);
}
