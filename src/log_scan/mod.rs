// Operational log scanners (GC logs, service wrapper log)

mod gc_log;
mod wrapper_log;

pub use gc_log::{find_gc_logs, parse_gc_log, scan_gc_lines};
pub use wrapper_log::scan_wrapper_log;
