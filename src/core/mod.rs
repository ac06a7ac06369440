//! Core business logic: validation, table patching, and request
//! orchestration

pub mod patcher;
pub mod service;
pub mod validate;

pub use service::TariffService;
pub use validate::validate;
