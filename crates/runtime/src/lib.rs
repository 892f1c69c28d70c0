pub mod barrier;
pub mod budget;
pub mod event_bus;
pub mod frame;
pub mod metrics;
pub mod throttle;
pub mod work_queue;

pub use barrier::*;
pub use budget::*;
pub use event_bus::*;
pub use frame::*;
pub use metrics::*;
pub use throttle::*;
pub use work_queue::*;
