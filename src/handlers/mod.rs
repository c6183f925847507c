// HTTP request handlers

pub mod health;
pub mod push;
pub mod results;
