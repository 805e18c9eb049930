pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod issuer;
pub mod state;
pub mod storage;

// Driver modules (point to project root drivers via path attribute) / 驱动模块
#[path = "../drivers/mod.rs"]
pub mod drivers;
