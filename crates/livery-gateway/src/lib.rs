// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway: the public quote/confirm/subscription surface and the
//! bearer-protected admin surface for segments, audiences, and
//! campaigns.

pub mod auth;
pub mod handlers;
pub mod server;

pub use server::{build_router, start_server, AppState};
