// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use warden_server_db::DbError;

/// Errors that can occur during identity provisioning.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
	#[error("database error: {0}")]
	Database(#[from] DbError),
}
