mod clock;
mod engine;
mod mode;
mod outcome;
mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{TimerEngine, IDLE_STATUS};
pub use mode::Mode;
pub use outcome::{Outcome, Warning};
pub use session::{parse_minutes, Status, Timer};
