//! 博客服务库
//! 凭证存储、无状态会话令牌、请求身份传递与资源所有权校验

pub mod auth;
pub mod config;
pub mod db;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
