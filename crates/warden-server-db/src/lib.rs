// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database layer for Warden server.
//!
//! SQLite-backed repositories for the provisioning data model: users and
//! their email records, organizations and memberships, and per-user
//! options. Each repository pairs a concrete type with an `async_trait`
//! store trait so callers can substitute implementations at the seams.
//!
//! Uniqueness constraints live in the schema (see [`migrations`]); the
//! repositories assume them rather than re-checking.

pub mod error;
pub mod migrations;
pub mod option;
pub mod org;
pub mod pool;
pub mod testing;
pub mod user;

pub use error::{DbError, Result};
pub use migrations::run_migrations;
pub use option::{UserOptionRepository, UserOptionStore};
pub use org::{OrgRepository, OrgStore};
pub use pool::create_pool;
pub use user::{UserRepository, UserStore};
