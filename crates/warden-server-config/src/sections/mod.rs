// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.
//!
//! Each section pairs a resolved runtime struct with a partial layer that
//! supports merging across sources.

pub mod database;
pub mod directory;
pub mod logging;
pub mod provisioning;

pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use directory::{DirectoryConfig, DirectoryConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use provisioning::{ProvisioningConfig, ProvisioningConfigLayer};
