pub mod capture;
pub mod chunk;
pub mod convert;
pub mod file;
pub mod microphone;
pub mod source;

pub use capture::{CaptureWorker, FrameStatus, WorkerChannels, WorkerCommand};
pub use chunk::{chunk_capacity, AudioChunk, ChunkBuffer, CHUNK_SECONDS};
pub use convert::{downmix_to_mono, pcm_to_le_bytes, sample_to_i16};
pub use file::AudioFile;
pub use microphone::{list_input_devices, CpalMicrophone};
pub use source::{AudioSource, StreamInfo};
