pub mod credential;
pub mod policy;
