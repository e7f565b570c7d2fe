pub mod moka_store;
pub mod redis_store;

pub use moka_store::MokaRecordStore;
pub use redis_store::RedisRecordStore;
