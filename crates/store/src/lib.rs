#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`sqlite`]: `EventStore` + `QueryEngine` SQLite 구현
//! - [`schema`]: 테이블 DDL과 윈도우 쿼리 SQL

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteStore;
