pub mod dispatcher;
pub mod pool;
pub mod registry;
