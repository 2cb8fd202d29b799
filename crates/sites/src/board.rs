use serde::Serialize;

use crate::task::{Task, TaskStatus};

/// An obra's tasks grouped by kanban column.
///
/// Within a column, higher priority comes first, then older tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskBoard {
    pub todo: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub review: Vec<Task>,
    pub done: Vec<Task>,
}

impl TaskBoard {
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut board = Self::default();
        for task in tasks {
            board.column_mut(task.status).push(task);
        }
        for column in [
            &mut board.todo,
            &mut board.in_progress,
            &mut board.review,
            &mut board.done,
        ] {
            column.sort_by(|a, b| {
                b.priority
                    .cmp(&a.priority)
                    .then(a.created_at.cmp(&b.created_at))
            });
        }
        board
    }

    pub fn column(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Review => &self.review,
            TaskStatus::Done => &self.done,
        }
    }

    fn column_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Review => &mut self.review,
            TaskStatus::Done => &mut self.done,
        }
    }

    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.review.len() + self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{CreateTask, TaskPriority};
    use chrono::{Duration, Utc};
    use nexium_core::ObraId;

    fn task(title: &str, priority: TaskPriority, age_minutes: i64, status: TaskStatus) -> Task {
        let mut t = Task::create(
            ObraId::new(),
            CreateTask {
                title: title.to_string(),
                description: String::new(),
                priority,
                assignee: None,
            },
            Utc::now() - Duration::minutes(age_minutes),
        )
        .unwrap();
        t.move_to(status);
        t
    }

    #[test]
    fn groups_by_column_and_sorts_by_priority_then_age() {
        let board = TaskBoard::from_tasks(vec![
            task("Pintura", TaskPriority::Low, 30, TaskStatus::Todo),
            task("Fundação", TaskPriority::High, 10, TaskStatus::Todo),
            task("Alvenaria", TaskPriority::High, 20, TaskStatus::Todo),
            task("Projeto elétrico", TaskPriority::Medium, 5, TaskStatus::Done),
        ]);

        let titles: Vec<&str> = board.todo.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Alvenaria", "Fundação", "Pintura"]);
        assert_eq!(board.column(TaskStatus::Done).len(), 1);
        assert!(board.in_progress.is_empty());
        assert_eq!(board.len(), 4);
    }
}
