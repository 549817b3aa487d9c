// File: ./src/model/mod.rs
pub mod item;
pub mod matcher;
pub mod recurrence;

pub use item::{
    PendingRecurringTask, SourceCounts, SourceError, Task, TaskDataResult, TaskMoveResult,
    SourceKind,
};
pub use recurrence::{MergeMode, Periodicity, RecurringRule};
