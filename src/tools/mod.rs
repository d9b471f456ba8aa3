//! Tool System - descriptors, the registry, typed invocations and execution

mod backend;
mod definition;
mod executor;
mod invocation;
mod registry;

pub use backend::CalculatorClient;
pub use definition::{FieldKind, FieldSpec, ParameterSchema, ToolDescriptor};
pub use executor::{ExecutionOutcome, ToolExecutor, log_query, page_to_json};
pub use invocation::{LogSearchParams, RawInvocation, ToolInvocation};
pub use registry::{SCAN_LOGS, ToolRegistry};
