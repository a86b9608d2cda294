use system::euclid::default::Point2D;
use system::{
    ClientCommand, ClientSyncAgent, Codec, Color, ConnectionId, Dispatch, DrawableObject,
    EncodedFrame, Room, RoomError, ShapesReadable,
};

/// Delivers every dispatch to the addressed agents, passing each event
/// through the codec the way a socket would.
fn deliver(
    codec: Codec,
    dispatches: Vec<Dispatch>,
    agents: &mut [(ConnectionId, &mut ClientSyncAgent)],
) {
    for dispatch in dispatches {
        let bytes = match codec.encode_event(&dispatch.event).expect("encode") {
            EncodedFrame::Text(text) => text.into_bytes(),
            EncodedFrame::Binary(bytes) => bytes,
        };
        for (id, agent) in agents.iter_mut() {
            if dispatch.to.contains(id) {
                let event = codec.decode_event(&bytes).expect("decode");
                agent.handle_server_event(event).expect("apply");
            }
        }
    }
}

fn send(
    codec: Codec,
    room: &mut Room,
    from: ConnectionId,
    command: ClientCommand,
) -> Result<Vec<Dispatch>, RoomError> {
    let bytes = match codec.encode_command(&command).expect("encode") {
        EncodedFrame::Text(text) => text.into_bytes(),
        EncodedFrame::Binary(bytes) => bytes,
    };
    room.handle_command(from, codec.decode_command(&bytes).expect("decode"))
}

fn rectangle() -> DrawableObject {
    DrawableObject::Rectangle {
        origin: Point2D::new(10.0, 10.0),
        width: 50.0,
        height: 50.0,
        stroke: Color::BLACK,
        stroke_width: 2.0,
        fill: None,
    }
}

fn ellipse() -> DrawableObject {
    DrawableObject::Ellipse {
        center: Point2D::new(100.0, 100.0),
        radius_x: 30.0,
        radius_y: 20.0,
        stroke: Color::BLACK,
        stroke_width: 2.0,
        fill: Some(Color::WHITE),
    }
}

#[test]
fn it_should_keep_peer_shapes_when_undoing_own_edit() {
    for codec in [Codec::Json, Codec::Bincode] {
        let mut room = Room::new();
        let mut a = ClientSyncAgent::new();
        let mut b = ClientSyncAgent::new();

        let dispatches = send(codec, &mut room, 1, a.join("A")).expect("join");
        deliver(codec, dispatches, &mut [(1, &mut a)]);
        assert!(a.is_ready());
        assert_eq!(a.shape_count(), 0);

        let command = a.apply_local_edit(rectangle()).expect("draw");
        let dispatches = send(codec, &mut room, 1, command).expect("draw");
        assert!(dispatches.iter().all(|d| d.to.is_empty()));
        assert_eq!(a.shape_count(), 1);
        assert_eq!(a.history_len(), 2);
        assert_eq!(a.history_cursor(), 1);

        let dispatches = send(codec, &mut room, 2, b.join("B")).expect("join");
        deliver(codec, dispatches, &mut [(1, &mut a), (2, &mut b)]);
        assert_eq!(b.snapshot_all(), vec![rectangle()]);
        let names = a
            .participants()
            .iter()
            .map(|p| p.display_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["A", "B"]);

        let command = b.apply_local_edit(ellipse()).expect("draw");
        let dispatches = send(codec, &mut room, 2, command).expect("draw");
        deliver(codec, dispatches, &mut [(1, &mut a), (2, &mut b)]);
        assert_eq!(a.snapshot_all(), vec![rectangle(), ellipse()]);
        assert_eq!(a.history_len(), 2);

        assert!(a.undo());
        assert_eq!(a.snapshot_all(), vec![ellipse()]);
        assert_eq!(a.history_cursor(), 0);
        assert_eq!(room.shape_log().shapes(), &[rectangle(), ellipse()]);
        assert_eq!(b.snapshot_all(), vec![rectangle(), ellipse()]);
    }
}

#[test]
fn it_should_converge_after_clear_and_drop_stale_draws() {
    let codec = Codec::Json;
    let mut room = Room::new();
    let mut a = ClientSyncAgent::new();
    let mut b = ClientSyncAgent::new();

    let dispatches = send(codec, &mut room, 1, a.join("A")).expect("join");
    deliver(codec, dispatches, &mut [(1, &mut a)]);
    let dispatches = send(codec, &mut room, 2, b.join("B")).expect("join");
    deliver(codec, dispatches, &mut [(1, &mut a), (2, &mut b)]);

    let command = a.apply_local_edit(rectangle()).expect("draw");
    let dispatches = send(codec, &mut room, 1, command).expect("draw");
    deliver(codec, dispatches, &mut [(1, &mut a), (2, &mut b)]);

    // A authors a draw while B's clear is already on its way to the hub.
    let stale = a.apply_local_edit(ellipse()).expect("draw");
    let dispatches = send(codec, &mut room, 2, b.request_clear()).expect("clear");
    assert!(matches!(
        send(codec, &mut room, 1, stale),
        Err(RoomError::StaleDraw {
            authored: 0,
            current: 1
        })
    ));
    deliver(codec, dispatches, &mut [(1, &mut a), (2, &mut b)]);

    assert_eq!(room.shape_log().len(), 0);
    for agent in [&a, &b] {
        assert_eq!(agent.shape_count(), 0);
        assert_eq!(agent.history_len(), 1);
        assert_eq!(agent.epoch(), Some(1));
        assert!(!agent.can_undo());
    }

    let command = b.apply_local_edit(ellipse()).expect("draw");
    let dispatches = send(codec, &mut room, 2, command).expect("draw");
    deliver(codec, dispatches, &mut [(1, &mut a), (2, &mut b)]);
    assert_eq!(a.snapshot_all(), room.shape_log().snapshot_all());
    assert_eq!(b.snapshot_all(), room.shape_log().snapshot_all());
}

#[test]
fn it_should_show_peer_cursors_with_their_names() {
    let codec = Codec::Bincode;
    let mut room = Room::new();
    let mut a = ClientSyncAgent::new();
    let mut b = ClientSyncAgent::new();

    let dispatches = send(codec, &mut room, 1, a.join("A")).expect("join");
    deliver(codec, dispatches, &mut [(1, &mut a)]);
    let dispatches = send(codec, &mut room, 2, b.join("B")).expect("join");
    deliver(codec, dispatches, &mut [(1, &mut a), (2, &mut b)]);

    let dispatches = send(codec, &mut room, 2, b.cursor_move(12.0, 34.0)).expect("cursor");
    deliver(codec, dispatches, &mut [(1, &mut a), (2, &mut b)]);

    let cursor = a.cursor(&2).expect("cursor of B");
    assert_eq!((cursor.x, cursor.y), (12.0, 34.0));
    assert_eq!(cursor.display_name, "B");
    assert!(b.cursor(&2).is_none());

    let dispatches = room.handle_disconnect(&2);
    deliver(codec, dispatches, &mut [(1, &mut a)]);
    assert!(a.cursor(&2).is_none());
    assert_eq!(a.participants().len(), 1);
}

#[test]
fn it_should_rebuild_replica_from_hub_after_reconnect() {
    let codec = Codec::Json;
    let mut room = Room::new();
    let mut a = ClientSyncAgent::new();
    let mut b = ClientSyncAgent::new();

    let dispatches = send(codec, &mut room, 1, a.join("A")).expect("join");
    deliver(codec, dispatches, &mut [(1, &mut a)]);
    let dispatches = send(codec, &mut room, 2, b.join("B")).expect("join");
    deliver(codec, dispatches, &mut [(1, &mut a), (2, &mut b)]);

    let command = a.apply_local_edit(rectangle()).expect("draw");
    let dispatches = send(codec, &mut room, 1, command).expect("draw");
    deliver(codec, dispatches, &mut [(1, &mut a), (2, &mut b)]);

    // A's socket drops; B keeps drawing while A is away.
    let dispatches = room.handle_disconnect(&1);
    deliver(codec, dispatches, &mut [(2, &mut b)]);
    a.on_disconnect();
    let command = b.apply_local_edit(ellipse()).expect("draw");
    let dispatches = send(codec, &mut room, 2, command).expect("draw");
    deliver(codec, dispatches, &mut [(2, &mut b)]);
    assert!(a.apply_local_edit(ellipse()).is_err());

    let dispatches = send(codec, &mut room, 3, a.join("A")).expect("rejoin");
    deliver(codec, dispatches, &mut [(3, &mut a), (2, &mut b)]);
    assert_eq!(a.snapshot_all(), vec![rectangle(), ellipse()]);
    assert_eq!(a.snapshot_all(), room.shape_log().snapshot_all());
    assert_eq!(a.history_len(), 1);
    assert_eq!(a.participants().len(), 2);
    assert_eq!(b.participants().len(), 2);
}
