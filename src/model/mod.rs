use derive_new::new;
use serde::{Deserialize, Serialize};

pub use interval::*;
pub use progress::*;
pub use record::*;
pub use timestamp::*;
pub use video_id::*;

mod interval;
mod progress;
mod record;
mod timestamp;
mod video_id;
