pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod pagination;
pub mod repos;
pub mod services;
