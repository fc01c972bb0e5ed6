pub mod remote;
pub mod tone;
