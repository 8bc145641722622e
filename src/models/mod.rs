//! Request and Response models for the cache lab API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

pub use requests::{PolicyRequest, StartRequest, TestRequest};
pub use responses::{
    ActionResponse, CacheStatsResponse, FetchResponse, HealthResponse, PolicyResponse,
    StartResponse, StopResponse,
};
