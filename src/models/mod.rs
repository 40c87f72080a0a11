pub mod tag;
pub mod todo;
pub mod token;
pub mod user;
