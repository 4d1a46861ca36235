use async_trait::async_trait;

use super::records::{BoardRecord, BoardSummary, ColumnRecord, TaskDraft, TaskEdit, TaskRecord};
use crate::model::{BoardId, ColumnId, TaskId};

/// Error type for gateway calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// The request never completed (connectivity, timeout).
    #[error("network error: {0}")]
    Network(String),
    /// The service answered with a failure status.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    /// The write raced a newer server state. Treated like any other failed
    /// write: the optimistic result is rolled back and truth refetched.
    #[error("board changed on the server: {0}")]
    Conflict(String),
}

impl GatewayError {
    pub fn network(message: impl Into<String>) -> Self {
        GatewayError::Network(message.into())
    }

    pub fn not_found(what: impl std::fmt::Display) -> Self {
        GatewayError::Rejected {
            status: 404,
            message: format!("{what} not found"),
        }
    }
}

/// The persistence seam between the engine and the board service.
///
/// Placement writes (`persist_column_order`, `persist_task_order`) carry the
/// final placement rather than a delta, so they are idempotent: retrying
/// after an ambiguous failure cannot double-apply a move. The service
/// reindexes the affected sibling groups itself and answers with the moved
/// record.
#[async_trait]
pub trait BoardGateway {
    /// All boards visible to the current user.
    async fn list_boards(&self) -> Result<Vec<BoardSummary>, GatewayError>;

    async fn create_board(&self, title: &str) -> Result<BoardSummary, GatewayError>;

    async fn delete_board(&self, board: &BoardId) -> Result<(), GatewayError>;

    /// Authoritative snapshot of one board with all columns and tasks.
    async fn fetch_board(&self, board: &BoardId) -> Result<BoardRecord, GatewayError>;

    async fn create_column(
        &self,
        board: &BoardId,
        title: &str,
    ) -> Result<ColumnRecord, GatewayError>;

    async fn rename_column(
        &self,
        board: &BoardId,
        column: &ColumnId,
        title: &str,
    ) -> Result<ColumnRecord, GatewayError>;

    async fn delete_column(
        &self,
        board: &BoardId,
        column: &ColumnId,
    ) -> Result<(), GatewayError>;

    /// Persist a column placement. `new_order` is the column's final slot in
    /// the board lane.
    async fn persist_column_order(
        &self,
        board: &BoardId,
        column: &ColumnId,
        new_order: usize,
    ) -> Result<ColumnRecord, GatewayError>;

    async fn create_task(
        &self,
        board: &BoardId,
        column: &ColumnId,
        draft: &TaskDraft,
    ) -> Result<TaskRecord, GatewayError>;

    async fn edit_task(
        &self,
        board: &BoardId,
        column: &ColumnId,
        task: &TaskId,
        edit: &TaskEdit,
    ) -> Result<TaskRecord, GatewayError>;

    async fn delete_task(
        &self,
        board: &BoardId,
        column: &ColumnId,
        task: &TaskId,
    ) -> Result<(), GatewayError>;

    /// Persist a task placement. `column` is the destination column, so a
    /// cross-column move is a single call.
    async fn persist_task_order(
        &self,
        board: &BoardId,
        task: &TaskId,
        new_order: usize,
        column: &ColumnId,
    ) -> Result<TaskRecord, GatewayError>;
}
