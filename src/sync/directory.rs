use indexmap::IndexMap;

use crate::model::BoardId;
use crate::remote::{BoardGateway, BoardSummary, GatewayError};

/// The board list behind a home screen.
///
/// Nothing optimistic here: creating and deleting boards are rare,
/// pessimistic calls, applied locally only once the server has answered.
pub struct BoardDirectory<G> {
    gateway: G,
    boards: IndexMap<BoardId, BoardSummary>,
}

impl<G: BoardGateway> BoardDirectory<G> {
    pub fn new(gateway: G) -> Self {
        BoardDirectory {
            gateway,
            boards: IndexMap::new(),
        }
    }

    /// Fetch the board list, replacing the cached one.
    pub async fn load(&mut self) -> Result<(), GatewayError> {
        let summaries = self.gateway.list_boards().await?;
        self.boards = summaries
            .into_iter()
            .map(|summary| (summary.id.clone(), summary))
            .collect();
        Ok(())
    }

    /// Cached summaries in server order.
    pub fn boards(&self) -> impl Iterator<Item = &BoardSummary> {
        self.boards.values()
    }

    pub fn get(&self, board: &BoardId) -> Option<&BoardSummary> {
        self.boards.get(board)
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub async fn create(&mut self, title: &str) -> Result<BoardSummary, GatewayError> {
        let summary = self.gateway.create_board(title).await?;
        self.boards.insert(summary.id.clone(), summary.clone());
        Ok(summary)
    }

    pub async fn remove(&mut self, board: &BoardId) -> Result<(), GatewayError> {
        self.gateway.delete_board(board).await?;
        self.boards.shift_remove(board);
        Ok(())
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::InMemoryGateway;

    #[tokio::test]
    async fn test_create_list_and_remove() {
        let mut directory = BoardDirectory::new(InMemoryGateway::new());
        directory.load().await.unwrap();
        assert!(directory.is_empty());

        let first = directory.create("Sprint 12").await.unwrap();
        let second = directory.create("Backlog grooming").await.unwrap();
        let titles: Vec<_> = directory.boards().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Sprint 12", "Backlog grooming"]);

        directory.remove(&first.id).await.unwrap();
        assert_eq!(directory.len(), 1);
        assert!(directory.get(&second.id).is_some());

        // A reload sees exactly what the server kept.
        directory.load().await.unwrap();
        assert_eq!(directory.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_unknown_board_keeps_cache() {
        let mut directory = BoardDirectory::new(InMemoryGateway::new());
        directory.create("Only board").await.unwrap();
        let result = directory.remove(&"board-nope".into()).await;
        assert!(result.is_err());
        assert_eq!(directory.len(), 1);
    }
}
