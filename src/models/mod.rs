mod coding;
mod session;

pub use coding::{CodingActivity, SessionCodingStats};
pub use session::{Phase, SessionRecord, SoundType};
