//! Smali text handling
//!
//! This module provides the pieces the injector composes:
//! - Line classification and the owned `TextUnit`
//! - Method lookup and parameter register accounting
//! - Register budgeting and insertion point selection
//! - Static initializer synthesis

pub mod class;
pub mod insertion;
pub mod line;
pub mod method;
pub mod payload;
pub mod registers;
pub mod signature;
pub mod unit;

pub use class::synthesize_static_initializer;
pub use insertion::find_insertion_point;
pub use method::{find_method, MethodSpan};
pub use payload::Payload;
pub use registers::{budget_registers, RegisterDirective, RegisterGrowth};
pub use signature::{MethodDecl, SlotCounting};
pub use unit::TextUnit;

/// File extension of a class disassembly
pub const SMALI_EXTENSION: &str = "smali";
