//! S3对象存储驱动 / S3 object store driver
//!
//! - 读取：完整缓冲对象后返回
//! - 写入：请求体流式转发到 put_object_stream
//! - 并发传输数由信号量限制，超出时排队而非报错

mod config;
mod driver;
mod factory;

pub use config::S3Options;
pub use driver::S3Store;
pub use factory::S3StoreFactory;
