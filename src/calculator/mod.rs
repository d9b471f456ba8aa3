//! Calculator - arithmetic engine and its REST API

mod ops;
mod server;

pub use ops::{Calculation, OperandPair, Operation, round_to, type_tag};
pub use server::build_app;
