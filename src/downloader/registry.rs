//! In-memory task registry

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::types::{Phase, TaskId, TaskInfo};

/// Map from task id to task record, shared by submission, runners and queries
///
/// Each record has a single writer: its own runner. Lifecycle changes go
/// through [`TaskRegistry::advance`], which refuses anything other than the
/// next phase (or `failed`).
#[derive(Clone, Default)]
pub(crate) struct TaskRegistry {
    tasks: Arc<RwLock<HashMap<TaskId, TaskInfo>>>,
}

impl TaskRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a new task; fails if the id is already taken
    pub(crate) async fn insert(&self, info: TaskInfo) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&info.id) {
            return Err(Error::Duplicate(format!(
                "task id '{}' is already in use",
                info.id
            )));
        }
        tasks.insert(info.id.clone(), info);
        Ok(())
    }

    pub(crate) async fn get(&self, id: &TaskId) -> Option<TaskInfo> {
        self.tasks.read().await.get(id).cloned()
    }

    /// All records ordered by creation time
    pub(crate) async fn list(&self) -> Vec<TaskInfo> {
        let mut all: Vec<TaskInfo> = self.tasks.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        all
    }

    /// Move a task to `next`, applying `update` to the record in the same write
    ///
    /// Returns false (and logs) if the task is unknown or the transition is
    /// not the legal successor of the current phase.
    pub(crate) async fn advance(
        &self,
        id: &TaskId,
        next: Phase,
        update: impl FnOnce(&mut TaskInfo),
    ) -> bool {
        let mut tasks = self.tasks.write().await;
        let Some(info) = tasks.get_mut(id) else {
            tracing::warn!(task_id = %id, phase = ?next, "Transition for unknown task");
            return false;
        };

        if !info.phase.can_advance_to(next) {
            tracing::warn!(
                task_id = %id,
                from = ?info.phase,
                to = ?next,
                "Refused illegal phase transition"
            );
            return false;
        }

        info.phase = next;
        update(info);
        true
    }

    /// Number of tasks not yet in a terminal phase
    pub(crate) async fn active_count(&self) -> usize {
        self.tasks
            .read()
            .await
            .values()
            .filter(|t| !t.phase.is_terminal())
            .count()
    }
}
