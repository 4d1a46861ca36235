use tracing::{debug, warn};

use crate::model::{Board, ColumnId, TaskId};
use crate::ops::{MoveError, MovePlan, plan_column_move, plan_task_move};
use crate::remote::BoardGateway;
use crate::sync::{Notifier, SyncCoordinator};

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragItem {
    Column(ColumnId),
    /// `source` is the column the task was picked up from.
    Task { task: TaskId, source: ColumnId },
}

/// Where a dragged item would land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// A slot in the board's column lane.
    Board { index: usize },
    /// A slot in one column's task list.
    Column { column: ColumnId, index: usize },
}

/// One event from the input layer's gesture stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureEvent {
    Started(DragItem),
    Hovered(DropTarget),
    Dropped(DropTarget),
    Cancelled,
}

/// What the tracker did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerOutcome {
    /// Consumed; at most the local preview changed.
    Tracking,
    /// Invalid in the current state; logged and dropped.
    Ignored,
    /// The drop was persisted.
    Committed,
    /// The drop resolved to the slot the gesture started from; nothing was
    /// written.
    NoChange,
    /// Persistence failed; the board rolled back to server truth.
    RolledBack,
    /// The gesture was cancelled and the pre-drag board restored.
    Cancelled,
}

enum SessionState {
    Idle,
    Active {
        item: DragItem,
        origin: DropTarget,
        snapshot: Board,
        last_hover: Option<DropTarget>,
    },
}

/// Tracks one drag gesture at a time and drives the move planner and the
/// coordinator from a single event stream.
///
/// Hovers are pure speculation: each one replans from the current render
/// state and previews locally, never touching the network. The network is
/// involved exactly once per gesture, at the drop, and only when the drop
/// resolves somewhere other than the slot the item was picked up from.
pub struct DragTracker {
    state: SessionState,
}

impl DragTracker {
    pub fn new() -> Self {
        DragTracker {
            state: SessionState::Idle,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    /// The item under drag, while a session is active.
    pub fn dragged_item(&self) -> Option<&DragItem> {
        match &self.state {
            SessionState::Active { item, .. } => Some(item),
            SessionState::Idle => None,
        }
    }

    /// The slot the gesture started from, while a session is active.
    pub fn origin(&self) -> Option<&DropTarget> {
        match &self.state {
            SessionState::Active { origin, .. } => Some(origin),
            SessionState::Idle => None,
        }
    }

    /// Feed one gesture event through the state machine.
    pub async fn handle<G: BoardGateway, N: Notifier>(
        &mut self,
        sync: &mut SyncCoordinator<G, N>,
        event: GestureEvent,
    ) -> TrackerOutcome {
        match event {
            GestureEvent::Started(item) => self.start(sync, item),
            GestureEvent::Hovered(target) => self.hover(sync, target),
            GestureEvent::Dropped(target) => self.drop_at(sync, target).await,
            GestureEvent::Cancelled => self.cancel(sync),
        }
    }

    fn start<G: BoardGateway, N: Notifier>(
        &mut self,
        sync: &mut SyncCoordinator<G, N>,
        item: DragItem,
    ) -> TrackerOutcome {
        if self.is_dragging() {
            // The input layer lost a drop somewhere. Unwind the stuck
            // session instead of wedging until a manual reset.
            warn!("drag started while a session is active, cancelling the old one");
            self.cancel(sync);
        }

        let Some(origin) = locate(sync.board(), &item) else {
            contract_violation(&format!("drag started on unknown item: {item:?}"));
            return TrackerOutcome::Ignored;
        };

        debug!("drag session started: {item:?} from {origin:?}");
        let snapshot = sync.begin_session();
        self.state = SessionState::Active {
            item,
            origin,
            snapshot,
            last_hover: None,
        };
        TrackerOutcome::Tracking
    }

    fn hover<G: BoardGateway, N: Notifier>(
        &mut self,
        sync: &mut SyncCoordinator<G, N>,
        target: DropTarget,
    ) -> TrackerOutcome {
        let SessionState::Active {
            item, last_hover, ..
        } = &mut self.state
        else {
            debug!("hover with no active drag session, ignoring");
            return TrackerOutcome::Ignored;
        };

        // Input layers re-fire hover on every mouse move; the same slot
        // twice in a row has nothing new to preview.
        if last_hover.as_ref() == Some(&target) {
            return TrackerOutcome::Tracking;
        }

        let plan = match plan_for(sync.board(), item, &target) {
            Ok(plan) => plan,
            Err(PlanRejection::Mismatch) => {
                debug!("hover target cannot take {item:?}, ignoring");
                return TrackerOutcome::Ignored;
            }
            Err(PlanRejection::Engine(error)) => {
                contract_violation(&format!("hover rejected by the move planner: {error}"));
                return TrackerOutcome::Ignored;
            }
        };

        *last_hover = Some(target);
        if let Some(plan) = plan {
            sync.apply_local(&plan);
        }
        TrackerOutcome::Tracking
    }

    async fn drop_at<G: BoardGateway, N: Notifier>(
        &mut self,
        sync: &mut SyncCoordinator<G, N>,
        target: DropTarget,
    ) -> TrackerOutcome {
        let state = std::mem::replace(&mut self.state, SessionState::Idle);
        let SessionState::Active { item, snapshot, .. } = state else {
            debug!("drop with no active drag session, ignoring");
            return TrackerOutcome::Ignored;
        };

        // Hover previews end here. The drop replans from the pre-drag
        // board, so the outcome depends only on where the item ends up,
        // not on the hover path that led there.
        sync.restore(snapshot);

        let outcome = match plan_for(sync.board(), &item, &target) {
            Ok(None) => {
                debug!("drop resolves to the gesture origin, nothing to persist");
                TrackerOutcome::NoChange
            }
            Ok(Some(plan)) => {
                debug!("drop commits {item:?} at {target:?}");
                match sync.commit_move(plan).await {
                    Ok(()) => TrackerOutcome::Committed,
                    Err(_) => TrackerOutcome::RolledBack,
                }
            }
            Err(PlanRejection::Mismatch) => {
                debug!("drop target cannot take {item:?}, cancelling the gesture");
                TrackerOutcome::Cancelled
            }
            Err(PlanRejection::Engine(error)) => {
                contract_violation(&format!("drop rejected by the move planner: {error}"));
                TrackerOutcome::Ignored
            }
        };
        sync.end_session();
        outcome
    }

    fn cancel<G: BoardGateway, N: Notifier>(
        &mut self,
        sync: &mut SyncCoordinator<G, N>,
    ) -> TrackerOutcome {
        let state = std::mem::replace(&mut self.state, SessionState::Idle);
        let SessionState::Active { item, snapshot, .. } = state else {
            debug!("cancel with no active drag session, ignoring");
            return TrackerOutcome::Ignored;
        };

        debug!("drag session cancelled: {item:?}");
        sync.restore(snapshot);
        sync.end_session();
        TrackerOutcome::Cancelled
    }
}

impl Default for DragTracker {
    fn default() -> Self {
        DragTracker::new()
    }
}

/// The slot `item` currently occupies on `board`.
fn locate(board: &Board, item: &DragItem) -> Option<DropTarget> {
    match item {
        DragItem::Column(column) => board
            .columns
            .position_of(column)
            .map(|index| DropTarget::Board { index }),
        DragItem::Task { task, source } => board
            .column(source)?
            .tasks
            .position_of(task)
            .map(|index| DropTarget::Column {
                column: source.clone(),
                index,
            }),
    }
}

enum PlanRejection {
    /// The target kind cannot take the dragged item (a column over a task
    /// list, a task over the board lane).
    Mismatch,
    Engine(MoveError),
}

fn plan_for(
    board: &Board,
    item: &DragItem,
    target: &DropTarget,
) -> Result<Option<MovePlan>, PlanRejection> {
    match (item, target) {
        (DragItem::Column(column), DropTarget::Board { index }) => {
            plan_column_move(board, column, *index).map_err(PlanRejection::Engine)
        }
        (DragItem::Task { task, .. }, DropTarget::Column { column, index }) => {
            // Replan from wherever the task sits now, which after a few
            // hovers is not necessarily the pickup column.
            let source = board
                .column_of_task(task)
                .map(|current| current.id.clone())
                .ok_or_else(|| PlanRejection::Engine(MoveError::UnknownTask(task.clone())))?;
            plan_task_move(board, task, &source, column, *index).map_err(PlanRejection::Engine)
        }
        _ => Err(PlanRejection::Mismatch),
    }
}

/// Contract violations are bugs in the embedding layer, not user input:
/// fatal in debug builds, a logged no-op in release builds.
fn contract_violation(message: &str) {
    warn!("contract violation: {message}");
    debug_assert!(false, "contract violation: {message}");
}
