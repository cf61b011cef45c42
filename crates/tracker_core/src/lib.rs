pub mod activity;
pub mod clock;
pub mod csv_io;
pub mod import;
pub mod roster;
mod session;

pub use activity::ActivityLog;
pub use clock::{Clock, FixedClock, SystemClock};
pub use import::{ImportKind, ParsedImport, PendingImport};
pub use roster::{GridCell, Roster, PLAYER_BUTTONS_PER_ROW};
pub use session::{ImportOutcome, TrackerSession};
