//! Cross-context messaging: wire message types and frame codecs.

pub mod framing;
pub mod wire;

pub use framing::{read_frame, write_frame, MAX_FRAME_LEN};
pub use wire::{Request, Response, TabPush};
