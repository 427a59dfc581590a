// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity, role, and organization types for Warden.
//!
//! This crate provides the building blocks consumed by the provisioning
//! reconciler:
//!
//! - [`types`] - ID newtypes and the application role vocabulary
//! - [`user`] - local user records and their email addresses
//! - [`org`] - organizations and externally-managed memberships
//! - [`directory`] - directory identities as returned by the external
//!   directory client after a successful bind
//! - [`resolver`] - pure group-membership to role resolution

pub mod directory;
pub mod org;
pub mod resolver;
pub mod types;
pub mod user;

pub use directory::{normalize_username, DirectoryIdentity};
pub use org::{OrgMembership, Organization};
pub use resolver::{resolve_role, RoleMapping};
pub use types::{OrgId, Role, UserId};
pub use user::{User, UserEmail};
