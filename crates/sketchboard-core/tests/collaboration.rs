//! Two clients sharing one in-memory store.

use kurbo::Point;
use pollster::block_on;
use sketchboard_core::store::{BoardStore, StrokeStore};
use sketchboard_core::{
    BoardClient, BoardId, Color, LocalUser, ManualClock, MemoryStore, PointerEvent, SessionConfig,
    SharedClock, SyncOutcome, Timestamp, ToolKind,
};
use std::sync::Arc;
use std::time::Duration;

type Client = BoardClient<Arc<MemoryStore>>;

fn setup() -> (Arc<MemoryStore>, ManualClock, SharedClock) {
    let clock = ManualClock::new(Timestamp::from_millis(1_000_000));
    let shared: SharedClock = Arc::new(clock.clone());
    (Arc::new(MemoryStore::new(shared.clone())), clock, shared)
}

fn client(store: &Arc<MemoryStore>, clock: &SharedClock, id: &str) -> Client {
    let user = LocalUser {
        id: id.to_string(),
        name: id.to_string(),
        color: Color::BLACK,
    };
    BoardClient::new(store.clone(), user, SessionConfig::default(), clock.clone())
}

fn drag(client: &mut Client, tool: ToolKind, from: (f64, f64), to: (f64, f64)) {
    client.session_mut().unwrap().set_tool(tool);
    block_on(client.handle_pointer(PointerEvent::Down { position: from.into() }));
    block_on(client.handle_pointer(PointerEvent::Move { position: to.into() }));
    block_on(client.handle_pointer(PointerEvent::Up)).unwrap();
}

#[test]
fn strokes_flow_between_clients() {
    let (store, _, clock) = setup();
    let mut alice = client(&store, &clock, "alice");
    let mut bob = client(&store, &clock, "bob");

    let board = block_on(alice.open(None)).unwrap();
    block_on(alice.refresh()).unwrap();
    drag(&mut alice, ToolKind::Line, (0.0, 0.0), (50.0, 50.0));
    block_on(alice.flush()).unwrap();

    block_on(bob.open(Some(&board))).unwrap();
    assert_eq!(block_on(bob.refresh()).unwrap(), SyncOutcome::InitialLoad);
    assert_eq!(bob.session().unwrap().strokes().len(), 1);
    assert!(!bob.session().unwrap().can_undo());

    drag(&mut bob, ToolKind::Rectangle, (10.0, 10.0), (30.0, 20.0));
    block_on(bob.flush()).unwrap();

    assert_eq!(block_on(alice.refresh()).unwrap(), SyncOutcome::LiveUpdated);
    let alice_view = alice.session().unwrap().strokes().clone();
    assert_eq!(&alice_view, bob.session().unwrap().strokes());
    let orders: Vec<u32> = alice_view.iter().map(|s| s.order).collect();
    assert_eq!(orders, vec![0, 1]);

    // Alice's history is her own: one undo removes her line only locally.
    assert!(alice.session_mut().unwrap().undo());
    assert!(alice.session().unwrap().strokes().is_empty());
    assert_eq!(block_on(store.strokes(&board)).unwrap().len(), 2);
}

#[test]
fn cursors_expire_without_cleanup() {
    let (store, manual, clock) = setup();
    let mut alice = client(&store, &clock, "alice");
    let mut bob = client(&store, &clock, "bob");

    let board = block_on(alice.open(None)).unwrap();
    block_on(bob.open(Some(&board))).unwrap();

    assert!(block_on(bob.cursor_moved(Point::new(5.0, 5.0))));
    block_on(alice.refresh()).unwrap();
    assert_eq!(alice.presence().unwrap().remote_cursors().len(), 1);

    manual.advance(Duration::from_secs(6 * 60));
    assert!(alice.presence().unwrap().remote_cursors().is_empty());
    block_on(alice.refresh()).unwrap();
    assert!(alice.presence().unwrap().active().is_empty());
}

#[test]
fn switching_boards_starts_a_fresh_session() {
    let (store, _, clock) = setup();
    let mut alice = client(&store, &clock, "alice");

    let first = block_on(alice.open(None)).unwrap();
    block_on(alice.refresh()).unwrap();
    drag(&mut alice, ToolKind::Circle, (0.0, 0.0), (3.0, 4.0));
    let first_tag = alice.session().unwrap().tag();

    let second = block_on(store.create_board("Second", Color::WHITE)).unwrap();
    block_on(alice.switch_board(&second)).unwrap();
    let session = alice.session().unwrap();
    assert_ne!(session.tag(), first_tag);
    assert_eq!(session.board_id(), &second);
    assert!(!session.is_loaded());
    assert!(session.strokes().is_empty());

    // Work queued on the first board was flushed before switching.
    assert_eq!(block_on(store.strokes(&first)).unwrap().len(), 1);
}

#[test]
fn clear_empties_board_and_thumbnail() {
    let (store, _, clock) = setup();
    let mut alice = client(&store, &clock, "alice");
    let board = block_on(alice.open(None)).unwrap();
    block_on(alice.refresh()).unwrap();
    drag(&mut alice, ToolKind::Pencil, (0.0, 0.0), (1.0, 1.0));
    block_on(alice.flush()).unwrap();
    block_on(store.update_board(
        &board,
        sketchboard_core::BoardPatch::thumbnail("data:image/png;base64,AAAA"),
    ))
    .unwrap();

    alice.session_mut().unwrap().clear();
    block_on(alice.flush()).unwrap();

    assert!(block_on(store.strokes(&board)).unwrap().is_empty());
    let meta = block_on(store.board(&board)).unwrap().unwrap();
    assert_eq!(meta.thumbnail, None);
    assert!(alice.session().unwrap().can_undo());
}

#[test]
fn unknown_board_reference_creates_board() {
    let (store, _, clock) = setup();
    let mut alice = client(&store, &clock, "alice");
    let id = block_on(alice.open(Some(&BoardId::new("does-not-exist")))).unwrap();
    assert_ne!(id, BoardId::new("does-not-exist"));
    assert_eq!(block_on(store.list_boards()).unwrap().len(), 1);
}

#[test]
fn switching_mid_drag_drops_the_stroke() {
    let (store, _, clock) = setup();
    let mut alice = client(&store, &clock, "alice");

    let first = block_on(alice.open(None)).unwrap();
    block_on(alice.refresh()).unwrap();
    alice.session_mut().unwrap().set_tool(ToolKind::Pencil);
    block_on(alice.handle_pointer(PointerEvent::Down {
        position: Point::new(0.0, 0.0),
    }));
    block_on(alice.handle_pointer(PointerEvent::Move {
        position: Point::new(8.0, 8.0),
    }));
    assert!(alice.session().unwrap().drawing().candidate().is_some());

    let second = block_on(store.create_board("Second", Color::WHITE)).unwrap();
    block_on(alice.switch_board(&second)).unwrap();

    assert!(block_on(store.strokes(&first)).unwrap().is_empty());
    let session = alice.session().unwrap();
    assert!(session.drawing().candidate().is_none());
    assert!(!session.drawing().is_tracking());
    assert_eq!(block_on(alice.handle_pointer(PointerEvent::Up)), None);
    assert!(block_on(store.strokes(&second)).unwrap().is_empty());
}
