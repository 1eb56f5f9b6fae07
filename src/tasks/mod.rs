//! Background Tasks Module
//!
//! Contains the periodic garbage-collection task that drives bucket
//! retirement while a cache handle is alive.

mod gc;

pub use gc::spawn_gc_task;
