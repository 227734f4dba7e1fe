#![no_std]

pub use frostgate;
