use system::{RoomId, RoomMaterial};
use tokio::sync::oneshot::Sender;

/// Read-only inspection requests answered by the hub between connection commands.
#[derive(Debug)]
pub enum AdminCommand {
    ListRooms {
        tx: Sender<Vec<RoomMaterial>>,
    },
    DescribeRoom {
        room_id: RoomId,
        tx: Sender<Option<RoomMaterial>>,
    },
}
