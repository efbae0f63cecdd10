//! Contract tests grouped by component.

mod adapter_contract;
mod binder_contract;
mod executor_contract;
