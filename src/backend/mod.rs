//! Backend module - Go source generation

pub mod go;

pub use go::GoEmitter;
