//! Media output: GIF assembly and on-disk still storage.

pub mod frame_store;
pub mod gif_assembler;

pub use frame_store::FrameStore;
pub use gif_assembler::{delay_centiseconds, AssembledGif, GifAssembler, GifOptions, TimedStill};
