use crate::model::{Board, ColumnId, ReindexOutcome, TaskId};

/// Error type for move planning.
///
/// These are local contract violations: the gesture named something the
/// board does not have, which means the view and the model disagree. The
/// caller decides whether that is fatal (debug builds) or a logged no-op.
#[derive(Debug, thiserror::Error)]
pub enum MoveError {
    #[error("column not found: {0}")]
    UnknownColumn(ColumnId),
    #[error("task not found: {0}")]
    UnknownTask(TaskId),
    #[error("task {task} is not in column {column}")]
    TaskNotInColumn { task: TaskId, column: ColumnId },
}

/// The one write that persists a planned move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementUpdate {
    Column {
        column: ColumnId,
        new_order: usize,
    },
    /// `column` is the destination; a cross-column move is still one write.
    Task {
        task: TaskId,
        new_order: usize,
        column: ColumnId,
    },
}

/// A fully planned move: the reindexed successor board plus the minimal
/// remote update that persists it.
#[derive(Debug, Clone)]
pub struct MovePlan {
    pub board: Board,
    pub update: PlacementUpdate,
}

// ---------------------------------------------------------------------------
// Column moves
// ---------------------------------------------------------------------------

/// Plan moving a column to `new_index` in the board lane.
///
/// Returns `Ok(None)` when the target resolves to the column's current slot;
/// a no-op plan must never reach the network. The input board is untouched;
/// the plan carries a reindexed copy (cheap, the storage is shared).
pub fn plan_column_move(
    board: &Board,
    column: &ColumnId,
    new_index: usize,
) -> Result<Option<MovePlan>, MoveError> {
    let mut next = board.clone();
    let outcome = next
        .columns
        .reindex_on_move(column, new_index)
        .ok_or_else(|| MoveError::UnknownColumn(column.clone()))?;

    match outcome {
        ReindexOutcome::Unchanged => Ok(None),
        ReindexOutcome::Moved { to, .. } => Ok(Some(MovePlan {
            board: next,
            update: PlacementUpdate::Column {
                column: column.clone(),
                new_order: to,
            },
        })),
    }
}

// ---------------------------------------------------------------------------
// Task moves
// ---------------------------------------------------------------------------

/// Plan moving a task to `new_index` in `dest`.
///
/// Within one column this is a directional reindex; across columns the task
/// leaves `source` (the gap closes behind it) and lands in `dest` at
/// `new_index` clamped to the column's length, an empty column taking it at
/// slot 0. Only a same-column drop on the task's own slot is a no-op: moving
/// to the same index value in a different column is a real move.
pub fn plan_task_move(
    board: &Board,
    task: &TaskId,
    source: &ColumnId,
    dest: &ColumnId,
    new_index: usize,
) -> Result<Option<MovePlan>, MoveError> {
    let source_column = board
        .column(source)
        .ok_or_else(|| MoveError::UnknownColumn(source.clone()))?;
    if !source_column.tasks.contains(task) {
        return Err(match board.find_task(task) {
            Some(_) => MoveError::TaskNotInColumn {
                task: task.clone(),
                column: source.clone(),
            },
            None => MoveError::UnknownTask(task.clone()),
        });
    }
    if board.column(dest).is_none() {
        return Err(MoveError::UnknownColumn(dest.clone()));
    }

    let mut next = board.clone();
    if source == dest {
        let outcome = {
            let column = next
                .column_mut(source)
                .ok_or_else(|| MoveError::UnknownColumn(source.clone()))?;
            column
                .tasks
                .reindex_on_move(task, new_index)
                .ok_or_else(|| MoveError::UnknownTask(task.clone()))?
        };
        return Ok(match outcome {
            ReindexOutcome::Unchanged => None,
            ReindexOutcome::Moved { to, .. } => Some(MovePlan {
                board: next,
                update: PlacementUpdate::Task {
                    task: task.clone(),
                    new_order: to,
                    column: dest.clone(),
                },
            }),
        });
    }

    // Cross-column: close the gap in the source, open one in the destination.
    let moved = {
        let column = next
            .column_mut(source)
            .ok_or_else(|| MoveError::UnknownColumn(source.clone()))?;
        column
            .tasks
            .remove(task)
            .ok_or_else(|| MoveError::UnknownTask(task.clone()))?
    };
    let landed = {
        let column = next
            .column_mut(dest)
            .ok_or_else(|| MoveError::UnknownColumn(dest.clone()))?;
        column.tasks.insert_at(moved, new_index)
    };

    Ok(Some(MovePlan {
        board: next,
        update: PlacementUpdate::Task {
            task: task.clone(),
            new_order: landed,
            column: dest.clone(),
        },
    }))
}
