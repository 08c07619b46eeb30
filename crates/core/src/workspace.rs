// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace identifier.

crate::define_id! {
    /// Identifier of a remote workspace whose lifecycle is being watched.
    ///
    /// Opaque to this crate; it is only compared for equality against the
    /// `workspace` field of incoming replies and embedded in exchange names.
    pub struct WorkspaceId;
}
