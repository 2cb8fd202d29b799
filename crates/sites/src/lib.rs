//! Obras (work sites) and their kanban tasks.
//!
//! Pure domain logic; storage lives in `nexium-infra`.

pub mod board;
pub mod obra;
pub mod task;

pub use board::TaskBoard;
pub use obra::{CreateObra, Obra, ObraStatus, UpdateObra};
pub use task::{CreateTask, Task, TaskPriority, TaskStatus};
