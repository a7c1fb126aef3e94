pub mod demo;
pub mod run;

pub use demo::*;
pub use run::*;
