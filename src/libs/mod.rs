pub mod anchor;
pub mod chaining;
pub mod efg;
pub mod error;
pub mod io;
pub mod pipeline;
