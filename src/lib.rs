//! Notes over two protocols: a gRPC API and an HTTP/JSON gateway that
//! proxies onto it, sharing one in-memory store.

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod server;
pub mod service;
