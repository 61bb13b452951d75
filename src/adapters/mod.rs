pub mod authorizer;
pub mod checkers;
pub mod storage;
