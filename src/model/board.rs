use super::collection::{OrderedCollection, OrderedEntity};
use super::ids::{BoardId, ColumnId, TaskId, UserId};
use crate::remote::records::{BoardRecord, ColumnRecord, TaskRecord};

/// A card on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    /// Slot within the owning column. Maintained by the collection.
    pub order: usize,
    pub assignee: Option<UserId>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            order: 0,
            assignee: None,
        }
    }

    pub fn from_record(record: TaskRecord) -> Self {
        Task {
            id: record.id,
            title: record.title,
            description: record.description,
            order: record.order,
            assignee: record.user_id,
        }
    }
}

impl OrderedEntity for Task {
    type Id = TaskId;

    fn id(&self) -> &TaskId {
        &self.id
    }

    fn order(&self) -> usize {
        self.order
    }

    fn set_order(&mut self, order: usize) {
        self.order = order;
    }
}

/// A column holding an ordered list of tasks.
///
/// A task belongs to a column by being in its collection; there is no back
/// pointer to fall out of sync with.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    /// Slot within the board's column lane.
    pub order: usize,
    pub tasks: OrderedCollection<Task>,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Column {
            id: id.into(),
            title: title.into(),
            order: 0,
            tasks: OrderedCollection::new(),
        }
    }

    pub fn from_record(record: ColumnRecord) -> Self {
        let tasks = record.tasks.into_iter().map(Task::from_record).collect();
        Column {
            id: record.id,
            title: record.title,
            order: record.order,
            tasks: OrderedCollection::from_unsorted(tasks),
        }
    }
}

impl OrderedEntity for Column {
    type Id = ColumnId;

    fn id(&self) -> &ColumnId {
        &self.id
    }

    fn order(&self) -> usize {
        self.order
    }

    fn set_order(&mut self, order: usize) {
        self.order = order;
    }
}

/// The full client-side board state.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    pub description: String,
    pub columns: OrderedCollection<Column>,
}

impl Board {
    pub fn new(id: impl Into<BoardId>, title: impl Into<String>) -> Self {
        Board {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            columns: OrderedCollection::new(),
        }
    }

    /// Build the model from a server record, normalizing every sibling
    /// group: columns and tasks are sorted by their stored order and
    /// renumbered densely.
    pub fn from_record(record: BoardRecord) -> Self {
        let columns = record
            .columns
            .into_iter()
            .map(Column::from_record)
            .collect();
        Board {
            id: record.id,
            title: record.title,
            description: record.description,
            columns: OrderedCollection::from_unsorted(columns),
        }
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.get(id)
    }

    pub(crate) fn column_mut(&mut self, id: &ColumnId) -> Option<&mut Column> {
        self.columns.get_mut(id)
    }

    /// The column currently holding `task`, if any.
    pub fn column_of_task(&self, task: &TaskId) -> Option<&Column> {
        self.columns.iter().find(|column| column.tasks.contains(task))
    }

    pub fn find_task(&self, task: &TaskId) -> Option<&Task> {
        self.columns.iter().find_map(|column| column.tasks.get(task))
    }

    /// True when every sibling group on the board is densely ordered.
    pub fn is_dense(&self) -> bool {
        self.columns.is_dense() && self.columns.iter().all(|column| column.tasks.is_dense())
    }

    /// Compact one-line rendering of column and task ids in order, for logs
    /// and tests: `col-a[t-1,t-2] col-b[]`.
    pub fn layout(&self) -> String {
        let mut out = String::new();
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(column.id.as_str());
            out.push('[');
            for (j, task) in column.tasks.iter().enumerate() {
                if j > 0 {
                    out.push(',');
                }
                out.push_str(task.id.as_str());
            }
            out.push(']');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn task_record(id: &str, order: usize) -> TaskRecord {
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
                    id: "col-b".into(),
                    title: "Doing".into(),
                    order: 1,
                    tasks: vec![task_record("t-4", 0)],
                },
                ColumnRecord {
                    id: "col-a".into(),
                    title: "Todo".into(),
                    order: 0,
                    tasks: vec![
                        task_record("t-2", 5),
                        task_record("t-1", 2),
                        task_record("t-3", 9),
                    ],
                },
            ],
        }
    }

    #[test]
    fn test_from_record_sorts_and_renumbers() {
        let board = Board::from_record(sample_record());
        assert!(board.is_dense());
        assert_snapshot!(board.layout(), @"col-a[t-1,t-2,t-3] col-b[t-4]");
    }

    #[test]
    fn test_column_of_task() {
        let board = Board::from_record(sample_record());
        let column = board.column_of_task(&"t-4".into()).unwrap();
        assert_eq!(column.id, "col-b".into());
        assert!(board.column_of_task(&"t-99".into()).is_none());
    }

    #[test]
    fn test_find_task_keeps_fields() {
        let board = Board::from_record(sample_record());
        let task = board.find_task(&"t-3".into()).unwrap();
        assert_eq!(task.title, "Task t-3");
        assert_eq!(task.order, 2);
    }

    #[test]
    fn test_layout_of_empty_column() {
        let mut board = Board::new("board-1", "Sprint");
        board.columns.push(Column::new("col-a", "Todo"));
        assert_snapshot!(board.layout(), @"col-a[]");
    }
}
