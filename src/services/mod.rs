pub mod audio;
pub mod synth;
