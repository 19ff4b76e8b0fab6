#![forbid(unsafe_code)]

//! Storage backends for the course catalog and enrollment records.
//!
//! `repository` holds the backend-agnostic traits plus the in-memory
//! implementation; `sqlite` is the default durable backend; `rest` talks to
//! a hosted PostgREST-style store.

pub mod repository;
pub mod rest;
pub mod sqlite;
