// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP API for Montandon.
//!
//! Exposes search, contact, template and campaign management over JSON,
//! hands new campaigns to the [`CampaignDispatcher`], and reports adapter
//! health.
//!
//! [`CampaignDispatcher`]: montandon_campaign::CampaignDispatcher

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, router, start_server};
