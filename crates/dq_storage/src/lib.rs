pub mod backends;
pub mod change;

pub use backends::*;
pub use change::{fingerprint, ChangeDetector, ChangeStatus};

pub mod prelude {
    pub use super::backends::*;
    pub use super::change::{fingerprint, ChangeDetector, ChangeStatus};
    pub use dq_core::{TrackingRecord, TrackingStore};
}
