use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use indexmap::IndexMap;

use super::gateway::{BoardGateway, GatewayError};
use super::records::{BoardRecord, BoardSummary, ColumnRecord, TaskDraft, TaskEdit, TaskRecord};
use crate::model::{BoardId, ColumnId, TaskId};

/// Gateway backed by process memory.
///
/// Mirrors the write semantics of the real board service: a placement write
/// is applied as remove plus clamped insert over the stored sibling group,
/// and every affected group is renumbered densely afterwards, whatever the
/// client sent. Ids are assigned sequentially (`col-1`, `task-2`).
///
/// Tests drive failure paths with [`fail_next`](Self::fail_next) and assert
/// call volume with the attempt counters. Cloning yields another handle to
/// the same store, so a directory and a board coordinator can share one
/// backend the way two screens share one HTTP client.
#[derive(Clone)]
pub struct InMemoryGateway {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    boards: IndexMap<BoardId, BoardRecord>,
    next_id: u64,
    fail_next: Option<GatewayError>,
    persist_calls: u64,
    fetch_calls: u64,
}

impl Inner {
    fn take_failure(&mut self) -> Result<(), GatewayError> {
        match self.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn assign_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn board_mut(&mut self, board: &BoardId) -> Result<&mut BoardRecord, GatewayError> {
        self.boards
            .get_mut(board)
            .ok_or_else(|| GatewayError::not_found(format!("board {board}")))
    }
}

fn renumber_columns(columns: &mut [ColumnRecord]) {
    for (index, column) in columns.iter_mut().enumerate() {
        column.order = index;
    }
}

fn renumber_tasks(tasks: &mut [TaskRecord]) {
    for (index, task) in tasks.iter_mut().enumerate() {
        task.order = index;
    }
}

fn column_mut<'a>(
    board: &'a mut BoardRecord,
    column: &ColumnId,
) -> Result<&'a mut ColumnRecord, GatewayError> {
    board
        .columns
        .iter_mut()
        .find(|c| c.id == *column)
        .ok_or_else(|| GatewayError::not_found(format!("column {column}")))
}

impl InMemoryGateway {
    pub fn new() -> Self {
        InMemoryGateway {
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Shorthand for a gateway seeded with one board.
    pub fn with_board(record: BoardRecord) -> Self {
        let gateway = InMemoryGateway::new();
        gateway.insert_board(record);
        gateway
    }

    /// Seed a board record verbatim, including non-dense orders.
    pub fn insert_board(&self, record: BoardRecord) {
        let mut inner = self.lock();
        inner.boards.insert(record.id.clone(), record);
    }

    /// Make the next gateway call fail with `error`. Consumed by that call.
    pub fn fail_next(&self, error: GatewayError) {
        self.lock().fail_next = Some(error);
    }

    /// Number of placement write attempts so far, failed ones included.
    pub fn persist_calls(&self) -> u64 {
        self.lock().persist_calls
    }

    /// Number of board fetch attempts so far.
    pub fn fetch_calls(&self) -> u64 {
        self.lock().fetch_calls
    }

    /// The stored record for `board`, i.e. current server-side truth.
    pub fn board_record(&self, board: &BoardId) -> Option<BoardRecord> {
        self.lock().boards.get(board).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        InMemoryGateway::new()
    }
}

#[async_trait]
impl BoardGateway for InMemoryGateway {
    async fn list_boards(&self) -> Result<Vec<BoardSummary>, GatewayError> {
        let mut inner = self.lock();
        inner.take_failure()?;
        Ok(inner
            .boards
            .values()
            .map(|board| BoardSummary {
                id: board.id.clone(),
                title: board.title.clone(),
            })
            .collect())
    }

    async fn create_board(&self, title: &str) -> Result<BoardSummary, GatewayError> {
        let mut inner = self.lock();
        inner.take_failure()?;
        let id = BoardId::from(inner.assign_id("board"));
        let record = BoardRecord {
            id: id.clone(),
            title: title.to_string(),
            description: String::new(),
            columns: Vec::new(),
        };
        inner.boards.insert(id.clone(), record);
        Ok(BoardSummary {
            id,
            title: title.to_string(),
        })
    }

    async fn delete_board(&self, board: &BoardId) -> Result<(), GatewayError> {
        let mut inner = self.lock();
        inner.take_failure()?;
        inner
            .boards
            .shift_remove(board)
            .ok_or_else(|| GatewayError::not_found(format!("board {board}")))?;
        Ok(())
    }

    async fn fetch_board(&self, board: &BoardId) -> Result<BoardRecord, GatewayError> {
        let mut inner = self.lock();
        inner.fetch_calls += 1;
        inner.take_failure()?;
        inner
            .boards
            .get(board)
            .cloned()
            .ok_or_else(|| GatewayError::not_found(format!("board {board}")))
    }

    async fn create_column(
        &self,
        board: &BoardId,
        title: &str,
    ) -> Result<ColumnRecord, GatewayError> {
        let mut inner = self.lock();
        inner.take_failure()?;
        let id = ColumnId::from(inner.assign_id("col"));
        let board = inner.board_mut(board)?;
        let record = ColumnRecord {
            id,
            title: title.to_string(),
            order: board.columns.len(),
            tasks: Vec::new(),
        };
        board.columns.push(record.clone());
        Ok(record)
    }

    async fn rename_column(
        &self,
        board: &BoardId,
        column: &ColumnId,
        title: &str,
    ) -> Result<ColumnRecord, GatewayError> {
        let mut inner = self.lock();
        inner.take_failure()?;
        let board = inner.board_mut(board)?;
        let column = column_mut(board, column)?;
        column.title = title.to_string();
        Ok(column.clone())
    }

    async fn delete_column(
        &self,
        board: &BoardId,
        column: &ColumnId,
    ) -> Result<(), GatewayError> {
        let mut inner = self.lock();
        inner.take_failure()?;
        let board = inner.board_mut(board)?;
        let index = board
            .columns
            .iter()
            .position(|c| c.id == *column)
            .ok_or_else(|| GatewayError::not_found(format!("column {column}")))?;
        board.columns.remove(index);
        renumber_columns(&mut board.columns);
        Ok(())
    }

    async fn persist_column_order(
        &self,
        board: &BoardId,
        column: &ColumnId,
        new_order: usize,
    ) -> Result<ColumnRecord, GatewayError> {
        let mut inner = self.lock();
        inner.persist_calls += 1;
        inner.take_failure()?;
        let board = inner.board_mut(board)?;
        let index = board
            .columns
            .iter()
            .position(|c| c.id == *column)
            .ok_or_else(|| GatewayError::not_found(format!("column {column}")))?;
        let moved = board.columns.remove(index);
        let at = new_order.min(board.columns.len());
        board.columns.insert(at, moved);
        renumber_columns(&mut board.columns);
        Ok(board.columns[at].clone())
    }

    async fn create_task(
        &self,
        board: &BoardId,
        column: &ColumnId,
        draft: &TaskDraft,
    ) -> Result<TaskRecord, GatewayError> {
        let mut inner = self.lock();
        inner.take_failure()?;
        let id = TaskId::from(inner.assign_id("task"));
        let board = inner.board_mut(board)?;
        let column = column_mut(board, column)?;
        let record = TaskRecord {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            order: column.tasks.len(),
            user_id: draft.assignee.clone(),
        };
        column.tasks.push(record.clone());
        Ok(record)
    }

    async fn edit_task(
        &self,
        board: &BoardId,
        column: &ColumnId,
        task: &TaskId,
        edit: &TaskEdit,
    ) -> Result<TaskRecord, GatewayError> {
        let mut inner = self.lock();
        inner.take_failure()?;
        let board = inner.board_mut(board)?;
        let column = column_mut(board, column)?;
        let record = column
            .tasks
            .iter_mut()
            .find(|t| t.id == *task)
            .ok_or_else(|| GatewayError::not_found(format!("task {task}")))?;
        record.title = edit.title.clone();
        record.description = edit.description.clone();
        record.user_id = edit.assignee.clone();
        Ok(record.clone())
    }

    async fn delete_task(
        &self,
        board: &BoardId,
        column: &ColumnId,
        task: &TaskId,
    ) -> Result<(), GatewayError> {
        let mut inner = self.lock();
        inner.take_failure()?;
        let board = inner.board_mut(board)?;
        let column = column_mut(board, column)?;
        let index = column
            .tasks
            .iter()
            .position(|t| t.id == *task)
            .ok_or_else(|| GatewayError::not_found(format!("task {task}")))?;
        column.tasks.remove(index);
        renumber_tasks(&mut column.tasks);
        Ok(())
    }

    async fn persist_task_order(
        &self,
        board: &BoardId,
        task: &TaskId,
        new_order: usize,
        column: &ColumnId,
    ) -> Result<TaskRecord, GatewayError> {
        let mut inner = self.lock();
        inner.persist_calls += 1;
        inner.take_failure()?;
        let board = inner.board_mut(board)?;

        // Validate the destination before mutating anything.
        if !board.columns.iter().any(|c| c.id == *column) {
            return Err(GatewayError::not_found(format!("column {column}")));
        }
        let source = board
            .columns
            .iter_mut()
            .find(|c| c.tasks.iter().any(|t| t.id == *task))
            .ok_or_else(|| GatewayError::not_found(format!("task {task}")))?;
        let index = source
            .tasks
            .iter()
            .position(|t| t.id == *task)
            .ok_or_else(|| GatewayError::not_found(format!("task {task}")))?;
        let moved = source.tasks.remove(index);
        renumber_tasks(&mut source.tasks);

        let dest = column_mut(board, column)?;
        let at = new_order.min(dest.tasks.len());
        dest.tasks.insert(at, moved);
        renumber_tasks(&mut dest.tasks);
        Ok(dest.tasks[at].clone())
    }
}
