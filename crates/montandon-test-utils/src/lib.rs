// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Montandon integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockMessageGateway`] - Records sends, fails on scripted phones
//! - [`MockSearchGateway`] - Returns pre-configured candidates
//! - [`TestHarness`] - Temp SQLite storage wired to both mocks

pub mod harness;
pub mod mock_messaging;
pub mod mock_search;

pub use harness::TestHarness;
pub use mock_messaging::{MockMessageGateway, SentMessage};
pub use mock_search::MockSearchGateway;
