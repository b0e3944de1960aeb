pub mod blocking;
pub mod frame;
pub mod tokio;

pub use frame::{AMS_FRAME_MAX_LEN, AmsFrame};
