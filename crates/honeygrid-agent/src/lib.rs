// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decoy network listener.
//!
//! Opens TCP sockets on a configured set of ports, captures the first buffer an intruder sends
//! on each accepted connection and forwards a structured [`event::EventRecord`] to a remote
//! collector. Records that cannot reach the collector are appended to a local newline-delimited
//! JSON backup file.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod agent;
pub mod backup;
pub mod collector;
pub mod config;
pub mod errors;
pub mod event;
pub mod handler;
pub mod http_utils;
pub mod listener;
pub mod logger;
