// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod messaging;
pub mod search;
pub mod storage;

pub use adapter::PluginAdapter;
pub use messaging::MessageGateway;
pub use search::SearchGateway;
pub use storage::StorageAdapter;
