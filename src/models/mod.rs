// Domain models: memory samples, log findings, console metrics

mod console;
mod logs;
mod snapshot;

pub use console::{ConsoleDiagnosis, ConsoleMemory};
pub use logs::{GcLogStats, HeapTransition, WrapperLogReport};
pub use snapshot::{HeapBreakdown, MemorySnapshot, Mode, ProcessMemoryInfo, Sample, Series};
