mod fft;
pub use fft::*;
mod mixer;
pub use mixer::*;
pub mod noise;
pub mod waveform;
