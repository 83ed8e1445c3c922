pub mod data;
pub mod fallback;
pub mod health;
pub mod pages;
pub mod register;
pub mod stats;
