//! Client-side admission control for a rate-limited downstream HTTP API.
//!
//! A [`RateGate`](sliding_window::RateGate) admits at most `limit` operations
//! within any trailing window of fixed length and rejects the rest
//! immediately. Nothing is queued, delayed or retried; a rejected caller gets
//! [`Admission::RateLimited`](sliding_window::Admission) back and decides
//! what to do next.
//!
//! # Algorithm Overview
//!
//! The gate keeps the instants of recently granted operations, oldest first.
//! On every inquiry it:
//! 1. evicts entries at least one window old from the front,
//! 2. grants and records `now` if fewer than `limit` entries remain,
//! 3. denies otherwise, leaving the record untouched.
//!
//! The window slides continuously, so unlike a fixed bucket that resets on
//! clock ticks it never admits a double burst around a bucket edge.
//!
//! # Safety & Concurrency
//! - The evict-and-append step runs under one mutex per gate; concurrent
//!   callers can never share a slot
//! - The lock is released before any network call
//! - No unsafe code
//!
//! # Basic Usage
//! ```no_run
//! use std::sync::Arc;
//!
//! use request_gate::sliding_window::{
//!     RateGate, RequestGuard, TimeUnit, WindowSettings,
//!     reqwest_integration::{ReqwestSubmitter, SubmitterConfig},
//! };
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), request_gate::Error> {
//! let settings = WindowSettings::builder().unit(TimeUnit::Seconds).limit(3).build();
//! let gate = Arc::new(RateGate::from_settings(&settings)?);
//! let guard = RequestGuard::new(gate, ReqwestSubmitter::new(SubmitterConfig::default())?);
//!
//! let result = guard.submit(json!({"doc_id": "0001"})).await;
//! # Ok(())
//! # }
//! ```
//!
//! # Tower
//! [`RateGateLayer`](sliding_window::RateGateLayer) puts the same gate in
//! front of any `tower::Service`.
//!
//! # Metrics
//! Emits `rate_gate_*` and `document_*` metrics through the `metrics` facade.
pub mod sliding_window;

#[macro_use]
extern crate tracing;

pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;
