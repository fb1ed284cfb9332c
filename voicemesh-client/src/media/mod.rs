mod local_media;
mod sink;

pub use local_media::*;
pub use sink::*;
