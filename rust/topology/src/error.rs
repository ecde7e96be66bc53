// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for topology operations.

/// Result type alias for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during topology operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Edge key not found in the arena.
    #[error("edge not found: {0:?}")]
    EdgeNotFound(crate::keys::EdgeKey),

    /// Coedge key not found in the arena.
    #[error("coedge not found: {0:?}")]
    CoedgeNotFound(crate::keys::CoedgeKey),

    /// Wire key not found in the arena.
    #[error("wire not found: {0:?}")]
    WireNotFound(crate::keys::WireKey),

    /// Face key not found in the arena.
    #[error("face not found: {0:?}")]
    FaceNotFound(crate::keys::FaceKey),

    /// Persistent edge ids must be unique within a model.
    #[error("duplicate edge id: {0}")]
    DuplicateEdgeId(String),

    /// Tags may not contain the name separator characters.
    #[error("invalid tag: {0}")]
    InvalidTag(String),

    /// A wire must have at least one coedge.
    #[error("wire must have at least one coedge")]
    EmptyWire,

    /// Coedges in a wire are not connected end-to-end.
    #[error("wire is not closed: coedge {0} endpoint does not match coedge {1} startpoint")]
    DisconnectedWire(usize, usize),

    /// Two coedges of the same edge cannot be placed in one wire.
    #[error("coedge already belongs to a wire")]
    CoedgeInUse,
}
