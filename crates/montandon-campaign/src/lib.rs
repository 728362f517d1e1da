// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template rendering and campaign dispatch for Montandon.
//!
//! [`template`] turns a template and a contact into a message body.
//! [`dispatcher`] drives a queued campaign through its targets.

pub mod dispatcher;
pub mod template;

pub use dispatcher::{CampaignDispatcher, DispatchConfig, DispatchOutcome};
pub use template::{TemplateError, render, validate_template};
