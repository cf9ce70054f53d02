//! Ports consumed by the path condition feature

pub mod instruction_observer;

pub use instruction_observer::InstructionObserver;
