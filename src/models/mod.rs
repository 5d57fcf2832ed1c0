//! 数据模型模块
//! 用户（凭证与资料）、文章，以及认证请求/响应

pub mod auth;
pub mod post;
pub mod user;
