//! Domain model (IDs, parameters, task descriptors, envelopes, replies, ...).
//!
//! I/O を一切持たない純粋な型だけを置きます。

pub mod envelope;
pub mod errors;
pub mod ids;
pub mod param;
pub mod reply;
pub mod state;
pub mod task;
pub mod task_type;

pub use self::envelope::SubmissionEnvelope;
pub use self::errors::{ErrorKind, SubmitError};
pub use self::ids::{ClientId, JobId, TaskId, WorkerId};
pub use self::param::{Array, ParamKind, ParamSet, ParamValue, Scalar};
pub use self::reply::{RetCode, SubmissionReply};
pub use self::state::SubmissionState;
pub use self::task::{Language, TaskDescriptor};
pub use self::task_type::{RegistryError, TaskType, TaskTypeEntry, TaskTypeRegistry};
