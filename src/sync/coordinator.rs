use tracing::{debug, warn};

use super::notify::{Notifier, UserNotice};
use crate::model::{Board, BoardId, Column, ColumnId, Task, TaskId};
use crate::ops::{MovePlan, PlacementUpdate};
use crate::remote::{BoardGateway, GatewayError, TaskDraft, TaskEdit};

/// Settle behavior after a placement write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Refetch server truth after a successful write. Off by default: the
    /// optimistic result already matches what the idempotent write stored.
    pub refresh_on_success: bool,
    /// Refetch server truth after a rollback, so the next gesture starts
    /// from whatever the server actually holds.
    pub refresh_on_failure: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            refresh_on_success: false,
            refresh_on_failure: true,
        }
    }
}

/// Error type for coordinator calls.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A placement write failed. Local state has already been rolled back
    /// to the latest server-confirmed board; the error is advisory.
    #[error("move not saved, board restored: {source}")]
    RolledBack {
        #[source]
        source: GatewayError,
    },
    /// A non-optimistic call failed; local state was not touched.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Owns the board state pair and runs the optimistic update protocol.
///
/// `confirmed` is the last server-acknowledged board; `local` is what the
/// view renders and may run ahead of the server during a gesture. Every
/// mutation goes through `&mut self`, so at most one write is in flight per
/// coordinator; a second gesture cannot start a racing write through safe
/// code.
pub struct SyncCoordinator<G, N> {
    gateway: G,
    notifier: N,
    options: SyncOptions,
    confirmed: Board,
    local: Board,
    session_open: bool,
    pending_refresh: Option<Board>,
}

impl<G: BoardGateway, N: Notifier> SyncCoordinator<G, N> {
    /// Build a coordinator around an already-fetched board.
    pub fn new(board: Board, gateway: G, notifier: N, options: SyncOptions) -> Self {
        SyncCoordinator {
            gateway,
            notifier,
            options,
            local: board.clone(),
            confirmed: board,
            session_open: false,
            pending_refresh: None,
        }
    }

    /// Fetch `board` from the gateway and build a coordinator around it.
    pub async fn load(
        board: &BoardId,
        gateway: G,
        notifier: N,
        options: SyncOptions,
    ) -> Result<Self, SyncError> {
        let record = gateway.fetch_board(board).await?;
        Ok(SyncCoordinator::new(
            Board::from_record(record),
            gateway,
            notifier,
            options,
        ))
    }

    /// The board the view should render.
    pub fn board(&self) -> &Board {
        &self.local
    }

    /// The last server-acknowledged board.
    pub fn confirmed(&self) -> &Board {
        &self.confirmed
    }

    pub fn board_id(&self) -> &BoardId {
        &self.confirmed.id
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    // -----------------------------------------------------------------------
    // Speculation
    // -----------------------------------------------------------------------

    /// Replace the render state with a speculative board. Local only: no
    /// network, `confirmed` untouched. Used for hover previews.
    pub fn apply_local(&mut self, plan: &MovePlan) {
        self.local = plan.board.clone();
    }

    /// Restore a previously captured board as the render state.
    pub fn restore(&mut self, snapshot: Board) {
        self.local = snapshot;
    }

    /// Open a drag session: returns the pre-drag board and fences refreshes
    /// until [`end_session`](Self::end_session).
    pub(crate) fn begin_session(&mut self) -> Board {
        self.session_open = true;
        self.local.clone()
    }

    /// Close the drag session, absorbing any refresh that arrived while it
    /// was open.
    pub(crate) fn end_session(&mut self) {
        self.session_open = false;
        if let Some(parked) = self.pending_refresh.take() {
            debug!("absorbing refresh deferred during drag session");
            self.local = parked;
        }
    }

    // -----------------------------------------------------------------------
    // The optimistic protocol
    // -----------------------------------------------------------------------

    /// Persist a planned move optimistically.
    ///
    /// The plan becomes the render state immediately. On success it also
    /// becomes the confirmed state; on failure the render state rolls back
    /// to the latest confirmed board (not to a captured variable, so a
    /// refresh that landed mid-flight is kept) and the user is notified.
    /// Exactly one placement write per call.
    pub async fn commit_move(&mut self, plan: MovePlan) -> Result<(), SyncError> {
        // This gesture's settle decides the next state; a refresh parked by
        // an earlier event is stale now.
        self.pending_refresh = None;
        self.local = plan.board.clone();

        let written = match &plan.update {
            PlacementUpdate::Column { column, new_order } => self
                .gateway
                .persist_column_order(&self.confirmed.id, column, *new_order)
                .await
                .map(|_| ()),
            PlacementUpdate::Task {
                task,
                new_order,
                column,
            } => self
                .gateway
                .persist_task_order(&self.confirmed.id, task, *new_order, column)
                .await
                .map(|_| ()),
        };

        match written {
            Ok(()) => {
                debug!("placement persisted, board now {}", plan.board.layout());
                self.confirmed = plan.board;
                if self.options.refresh_on_success
                    && let Err(error) = self.refresh().await
                {
                    warn!("refresh after commit failed: {error}");
                }
                Ok(())
            }
            Err(error) => {
                warn!("placement write failed, rolling back: {error}");
                self.local = self.confirmed.clone();
                self.notifier
                    .notify(UserNotice::error(format!("Move not saved: {error}")));
                if self.options.refresh_on_failure
                    && let Err(refresh_error) = self.refresh().await
                {
                    warn!("refresh after rollback failed: {refresh_error}");
                }
                Err(SyncError::RolledBack { source: error })
            }
        }
    }

    /// Fetch the board and adopt server truth.
    ///
    /// Always replaces `confirmed`. Replaces the render state too, except
    /// while a drag session is open: then the fetched board is parked and
    /// absorbed when the session ends, so an active speculation is never
    /// clobbered mid-gesture.
    pub async fn refresh(&mut self) -> Result<(), SyncError> {
        let record = self.gateway.fetch_board(&self.confirmed.id).await?;
        let board = Board::from_record(record);
        self.confirmed = board.clone();
        if self.session_open {
            debug!("drag session open, deferring refresh");
            self.pending_refresh = Some(board);
        } else {
            self.local = board;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Column and task lifecycle
    // -----------------------------------------------------------------------
    //
    // These are pessimistic: the write is awaited, then the echoed record is
    // applied to both boards. Deletions close order gaps locally, so density
    // holds without waiting for a refetch.

    /// Create a column at the end of the board. Returns its id.
    pub async fn add_column(&mut self, title: &str) -> Result<ColumnId, SyncError> {
        let record = self.gateway.create_column(&self.confirmed.id, title).await?;
        let column = Column::from_record(record);
        let id = column.id.clone();
        self.confirmed.columns.push(column.clone());
        self.local.columns.push(column);
        Ok(id)
    }

    pub async fn rename_column(
        &mut self,
        column: &ColumnId,
        title: &str,
    ) -> Result<(), SyncError> {
        let record = self
            .gateway
            .rename_column(&self.confirmed.id, column, title)
            .await?;
        if let Some(target) = self.confirmed.column_mut(column) {
            target.title = record.title.clone();
        }
        if let Some(target) = self.local.column_mut(column) {
            target.title = record.title;
        }
        Ok(())
    }

    /// Delete a column and the tasks in it.
    pub async fn delete_column(&mut self, column: &ColumnId) -> Result<(), SyncError> {
        self.gateway
            .delete_column(&self.confirmed.id, column)
            .await?;
        self.confirmed.columns.remove(column);
        self.local.columns.remove(column);
        Ok(())
    }

    /// Create a task at the end of `column`. Returns its id.
    pub async fn add_task(
        &mut self,
        column: &ColumnId,
        draft: TaskDraft,
    ) -> Result<TaskId, SyncError> {
        let record = self
            .gateway
            .create_task(&self.confirmed.id, column, &draft)
            .await?;
        let task = Task::from_record(record);
        let id = task.id.clone();
        if let Some(target) = self.confirmed.column_mut(column) {
            target.tasks.push(task.clone());
        }
        if let Some(target) = self.local.column_mut(column) {
            target.tasks.push(task);
        }
        Ok(id)
    }

    /// Replace a task's fields (title, description, assignee).
    pub async fn edit_task(
        &mut self,
        column: &ColumnId,
        task: &TaskId,
        edit: TaskEdit,
    ) -> Result<(), SyncError> {
        let record = self
            .gateway
            .edit_task(&self.confirmed.id, column, task, &edit)
            .await?;
        for board in [&mut self.confirmed, &mut self.local] {
            if let Some(target) = board.column_mut(column)
                && let Some(stored) = target.tasks.get_mut(task)
            {
                stored.title = record.title.clone();
                stored.description = record.description.clone();
                stored.assignee = record.user_id.clone();
            }
        }
        Ok(())
    }

    pub async fn delete_task(&mut self, column: &ColumnId, task: &TaskId) -> Result<(), SyncError> {
        self.gateway
            .delete_task(&self.confirmed.id, column, task)
            .await?;
        for board in [&mut self.confirmed, &mut self.local] {
            if let Some(target) = board.column_mut(column) {
                target.tasks.remove(task);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::ops::{plan_column_move, plan_task_move};
    use crate::remote::{BoardRecord, ColumnRecord, InMemoryGateway, TaskRecord};

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        notices: Rc<RefCell<Vec<UserNotice>>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: UserNotice) {
            self.notices.borrow_mut().push(notice);
        }
    }

    fn task(id: &str, order: usize) -> TaskRecord {
        TaskRecord {
            id: id.into(),
            title: format!("Task {id}"),
            description: String::new(),
            order,
            user_id: None,
        }
    }

    fn sample_record() -> BoardRecord {
        BoardRecord {
            id: "board-1".into(),
            title: "Sprint".into(),
            description: String::new(),
            columns: vec![
                ColumnRecord {
                    id: "A".into(),
                    title: "Todo".into(),
                    order: 0,
                    tasks: vec![task("a", 0), task("b", 1), task("c", 2)],
                },
                ColumnRecord {
                    id: "B".into(),
                    title: "Doing".into(),
                    order: 1,
                    tasks: vec![task("d", 0)],
                },
            ],
        }
    }

    async fn sample_sync() -> (
        SyncCoordinator<InMemoryGateway, RecordingNotifier>,
        RecordingNotifier,
    ) {
        let gateway = InMemoryGateway::with_board(sample_record());
        let notifier = RecordingNotifier::default();
        let sync = SyncCoordinator::load(
            &"board-1".into(),
            gateway,
            notifier.clone(),
            SyncOptions::default(),
        )
        .await
        .unwrap();
        (sync, notifier)
    }

    #[tokio::test]
    async fn test_commit_promotes_plan_to_confirmed() {
        let (mut sync, _) = sample_sync().await;
        let plan = plan_task_move(sync.board(), &"b".into(), &"A".into(), &"B".into(), 1)
            .unwrap()
            .unwrap();
        let expected = plan.board.clone();

        sync.commit_move(plan).await.unwrap();
        assert_eq!(sync.board(), &expected);
        assert_eq!(sync.confirmed(), &expected);
        assert_eq!(sync.gateway().persist_calls(), 1);

        // Server-side truth matches what we rendered.
        let record = sync.gateway().board_record(&"board-1".into()).unwrap();
        assert_eq!(Board::from_record(record), expected);
    }

    #[tokio::test]
    async fn test_rollback_restores_confirmed_and_notifies() {
        let (mut sync, notifier) = sample_sync().await;
        let before = sync.confirmed().clone();
        let plan = plan_column_move(sync.board(), &"B".into(), 0)
            .unwrap()
            .unwrap();

        sync.gateway().fail_next(GatewayError::network("socket closed"));
        let result = sync.commit_move(plan).await;
        assert!(matches!(result, Err(SyncError::RolledBack { .. })));

        // Deep equality with the pre-gesture confirmed state.
        assert_eq!(sync.board(), &before);
        assert_eq!(sync.confirmed(), &before);
        let notices = notifier.notices.borrow();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message().contains("not saved"));
    }

    #[tokio::test]
    async fn test_conflict_rolls_back_like_any_failure() {
        let (mut sync, notifier) = sample_sync().await;
        let before = sync.confirmed().clone();
        let plan = plan_task_move(sync.board(), &"b".into(), &"A".into(), &"B".into(), 0)
            .unwrap()
            .unwrap();

        sync.gateway()
            .fail_next(GatewayError::Conflict("task b moved elsewhere".into()));
        let result = sync.commit_move(plan).await;
        assert!(matches!(result, Err(SyncError::RolledBack { .. })));
        assert_eq!(sync.board(), &before);
        assert_eq!(notifier.notices.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_rollback_refreshes_server_truth() {
        let (mut sync, _) = sample_sync().await;
        let fetches_before = sync.gateway().fetch_calls();
        let plan = plan_column_move(sync.board(), &"B".into(), 0)
            .unwrap()
            .unwrap();
        sync.gateway().fail_next(GatewayError::network("socket closed"));
        let _ = sync.commit_move(plan).await;
        assert_eq!(sync.gateway().fetch_calls(), fetches_before + 1);
    }

    #[tokio::test]
    async fn test_apply_local_leaves_confirmed_alone() {
        let (mut sync, _) = sample_sync().await;
        let before = sync.confirmed().clone();
        let plan = plan_column_move(sync.board(), &"B".into(), 0)
            .unwrap()
            .unwrap();
        sync.apply_local(&plan);
        assert_eq!(sync.board(), &plan.board);
        assert_eq!(sync.confirmed(), &before);
        assert_eq!(sync.gateway().persist_calls(), 0);
    }

    #[tokio::test]
    async fn test_refresh_is_deferred_while_session_open() {
        let (mut sync, _) = sample_sync().await;
        let snapshot = sync.begin_session();
        let plan = plan_column_move(sync.board(), &"B".into(), 0)
            .unwrap()
            .unwrap();
        sync.apply_local(&plan);
        let speculative = sync.board().clone();

        // Server truth moves on while the drag is open.
        sync.gateway()
            .insert_board(BoardRecord {
                title: "Renamed".into(),
                ..sample_record()
            });
        sync.refresh().await.unwrap();

        // The speculation still renders; confirmed already advanced.
        assert_eq!(sync.board(), &speculative);
        assert_eq!(sync.confirmed().title, "Renamed");

        sync.restore(snapshot);
        sync.end_session();
        assert_eq!(sync.board().title, "Renamed");
    }

    #[tokio::test]
    async fn test_commit_with_refresh_on_success() {
        let gateway = InMemoryGateway::with_board(sample_record());
        let options = SyncOptions {
            refresh_on_success: true,
            refresh_on_failure: true,
        };
        let mut sync = SyncCoordinator::load(
            &"board-1".into(),
            gateway,
            RecordingNotifier::default(),
            options,
        )
        .await
        .unwrap();

        let fetches_before = sync.gateway().fetch_calls();
        let plan = plan_task_move(sync.board(), &"a".into(), &"A".into(), &"B".into(), 0)
            .unwrap()
            .unwrap();
        sync.commit_move(plan).await.unwrap();
        assert_eq!(sync.gateway().fetch_calls(), fetches_before + 1);
        assert_eq!(sync.board(), sync.confirmed());
    }

    #[tokio::test]
    async fn test_lifecycle_ops_keep_density() {
        let (mut sync, _) = sample_sync().await;
        let id = sync.add_column("Review").await.unwrap();
        assert_eq!(sync.board().columns.len(), 3);
        assert!(sync.board().is_dense());

        sync.delete_column(&"A".into()).await.unwrap();
        assert!(sync.board().is_dense());
        assert!(sync.confirmed().is_dense());
        assert_eq!(sync.board().columns.position_of(&id), Some(1));
    }

    #[tokio::test]
    async fn test_task_lifecycle_roundtrip() {
        let (mut sync, _) = sample_sync().await;
        let draft = TaskDraft::titled("New card");
        let id = sync.add_task(&"B".into(), draft).await.unwrap();
        assert_eq!(
            sync.board().column(&"B".into()).unwrap().tasks.len(),
            2
        );

        let edit = TaskEdit {
            title: "Renamed card".into(),
            description: "details".into(),
            assignee: Some("user-1".into()),
        };
        sync.edit_task(&"B".into(), &id, edit).await.unwrap();
        let stored = sync.board().find_task(&id).unwrap();
        assert_eq!(stored.title, "Renamed card");
        assert_eq!(stored.assignee, Some("user-1".into()));

        sync.delete_task(&"B".into(), &id).await.unwrap();
        assert!(sync.board().find_task(&id).is_none());
        assert!(sync.board().is_dense());
    }
}
