pub mod error;
pub mod grades;
pub mod ipc;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod periods;
pub mod schedule;
pub mod session;
pub mod teachers;
pub mod timetable;

pub use error::{RunError, RunResult};
pub use grades::{MarkView, SubjectHistory};
pub use models::DiaryPayload;
pub use periods::{ClassPeriods, SelectablePeriod};
pub use schedule::{LessonView, ScheduleBatch};
pub use session::SessionContext;
pub use teachers::{TeacherMap, TeacherNames};
