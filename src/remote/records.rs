use serde::{Deserialize, Serialize};

use crate::model::{BoardId, ColumnId, TaskId, UserId};

/// Wire shape of a task, as the board service sends and receives it.
///
/// The service speaks camelCase JSON (`userId`); records keep that wire
/// format and stay serde-only. The invariant-enforcing model types are
/// built from records, never deserialized directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub order: usize,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Wire shape of a column with its tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRecord {
    pub id: ColumnId,
    pub title: String,
    pub order: usize,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

/// Wire shape of a full board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRecord {
    pub id: BoardId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub columns: Vec<ColumnRecord>,
}

impl BoardRecord {
    /// Decode a board from a JSON body.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Encode the board as a JSON body.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// One row of the board list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    pub id: BoardId,
    pub title: String,
}

/// Payload for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "userId")]
    pub assignee: Option<UserId>,
}

impl TaskDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        TaskDraft {
            title: title.into(),
            ..TaskDraft::default()
        }
    }
}

/// Payload for editing a task's fields. The service takes full values, not
/// deltas, so an edit carries the complete new field set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEdit {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "userId")]
    pub assignee: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Body shape as the board service emits it.
    const BOARD_JSON: &str = r#"{
        "id": "board-1",
        "title": "Sprint 12",
        "description": "March iteration",
        "columns": [
            {
                "id": "col-1",
                "title": "Todo",
                "order": 0,
                "tasks": [
                    {
                        "id": "task-1",
                        "title": "Write the plan",
                        "description": "",
                        "order": 0,
                        "userId": "user-7"
                    },
                    {
                        "id": "task-2",
                        "title": "Review",
                        "description": "after standup",
                        "order": 1
                    }
                ]
            },
            {
                "id": "col-2",
                "title": "Done",
                "order": 1,
                "tasks": []
            }
        ]
    }"#;

    #[test]
    fn test_decodes_service_json() {
        let record = BoardRecord::from_json(BOARD_JSON).unwrap();
        assert_eq!(record.id, "board-1".into());
        assert_eq!(record.columns.len(), 2);
        let task = &record.columns[0].tasks[0];
        assert_eq!(task.user_id, Some("user-7".into()));
        assert_eq!(record.columns[0].tasks[1].user_id, None);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let record = BoardRecord::from_json(r#"{"id": "b", "title": "Bare"}"#).unwrap();
        assert_eq!(record.description, "");
        assert!(record.columns.is_empty());
    }

    #[test]
    fn test_encodes_camel_case() {
        let draft = TaskDraft {
            title: "New card".into(),
            description: String::new(),
            assignee: Some("user-3".into()),
        };
        let json = serde_json::to_string(&draft).unwrap();
        assert!(json.contains(r#""userId":"user-3""#));
    }

    #[test]
    fn test_round_trips_through_json() {
        let record = BoardRecord::from_json(BOARD_JSON).unwrap();
        let json = record.to_json().unwrap();
        assert_eq!(BoardRecord::from_json(&json).unwrap(), record);
    }
}
