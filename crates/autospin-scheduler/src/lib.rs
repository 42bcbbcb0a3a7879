mod client;
pub use client::{JobSubmission, SchedulerClient, SystemInfo};

mod config;
pub use config::SchedulerConfig;

mod errors;
pub use errors::SchedulerError;

mod firecrest;
pub use firecrest::FirecrestClient;

#[cfg(any(test, feature = "testing"))]
mod memory;
#[cfg(any(test, feature = "testing"))]
pub use memory::MemoryScheduler;
