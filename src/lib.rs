//! Client-side engine for a kanban board.
//!
//! `cardwall` owns the in-memory state of a Trello-style board client:
//! columns and tasks ordered by dense integers, drag-and-drop reorders
//! applied locally first, and a persistence protocol that commits on
//! success or rolls back to server truth on failure. The crate is
//! rendering-agnostic: a view layer feeds gesture events in and renders
//! [`SyncCoordinator::board`] out; the real HTTP client lives behind the
//! [`BoardGateway`] trait.
//!
//! * [`model`]: typed ids, dense-ordered collections, the board tree.
//! * [`ops`]: pure move planning (reindex, cross-column moves, no-op
//!   detection).
//! * [`remote`]: wire records, the async gateway trait, an in-memory
//!   gateway for tests and examples.
//! * [`sync`]: the optimistic update coordinator and the board directory.
//! * [`session`]: the drag session state machine driving all of the above
//!   from one gesture stream.
//!
//! # Example
//!
//! ```
//! use cardwall::{
//!     BoardGateway, DragItem, DragTracker, DropTarget, GestureEvent, InMemoryGateway,
//!     LogNotifier, SyncCoordinator, SyncOptions, TaskDraft, TrackerOutcome,
//! };
//!
//! # let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # runtime.block_on(async {
//! // Stands in for the real board service.
//! let gateway = InMemoryGateway::new();
//! let summary = gateway.create_board("Sprint 12").await.unwrap();
//! let board_id = summary.id.clone();
//! let todo = gateway.create_column(&board_id, "Todo").await.unwrap();
//! let doing = gateway.create_column(&board_id, "Doing").await.unwrap();
//! let task = gateway
//!     .create_task(&board_id, &todo.id, &TaskDraft::titled("Write the docs"))
//!     .await
//!     .unwrap();
//!
//! let mut sync = SyncCoordinator::load(&board_id, gateway, LogNotifier, SyncOptions::default())
//!     .await
//!     .unwrap();
//! let mut tracker = DragTracker::new();
//!
//! // One drag gesture: pick the task up, drop it into "Doing".
//! tracker
//!     .handle(
//!         &mut sync,
//!         GestureEvent::Started(DragItem::Task {
//!             task: task.id.clone(),
//!             source: todo.id.clone(),
//!         }),
//!     )
//!     .await;
//! let outcome = tracker
//!     .handle(
//!         &mut sync,
//!         GestureEvent::Dropped(DropTarget::Column {
//!             column: doing.id.clone(),
//!             index: 0,
//!         }),
//!     )
//!     .await;
//!
//! assert_eq!(outcome, TrackerOutcome::Committed);
//! assert_eq!(sync.board().column(&doing.id).unwrap().tasks.len(), 1);
//! # });
//! ```

pub mod model;
pub mod ops;
pub mod remote;
pub mod session;
pub mod sync;

pub use model::{
    Board, BoardId, Column, ColumnId, OrderedCollection, OrderedEntity, ReindexOutcome, Task,
    TaskId, UserId,
};
pub use ops::{MoveError, MovePlan, PlacementUpdate, plan_column_move, plan_task_move};
pub use remote::{
    BoardGateway, BoardRecord, BoardSummary, ColumnRecord, GatewayError, InMemoryGateway,
    TaskDraft, TaskEdit, TaskRecord,
};
pub use session::{DragItem, DragTracker, DropTarget, GestureEvent, TrackerOutcome};
pub use sync::{
    BoardDirectory, LogNotifier, Notifier, SyncCoordinator, SyncError, SyncOptions, UserNotice,
};
