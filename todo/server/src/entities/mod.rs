//! sea-orm entities.

pub mod prelude;

pub mod task;
