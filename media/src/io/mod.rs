pub mod h264_reader;
pub mod h264_writer;
pub mod ivf_reader;
pub mod ivf_writer;
pub mod ogg_reader;
pub mod ogg_writer;
pub mod sample_builder;

use crate::error::Result;

/// Writer defines an interface to handle
/// the creation of media files
pub trait Writer {
    /// write_rtp adds a new packet and writes the appropriate headers for it
    fn write_rtp(&mut self, packet: &rtp::packet::Packet) -> Result<()>;
    /// close closes the underlying writer
    fn close(&mut self) -> Result<()>;
}

/// ResetFn is called by a reader's `reset_reader` method with the number of bytes
/// already consumed, and must return a fresh reader to resume from.
pub type ResetFn<R> = Box<dyn FnMut(u64) -> R>;
