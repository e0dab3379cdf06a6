mod connect;
pub use connect::connect;
