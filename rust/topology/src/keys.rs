// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology key types for arena-based storage.
//!
//! Each topology entity gets a unique, type-safe key for O(1) lookup in the
//! arena. Keys are created by `slotmap::SlotMap` and remain valid even after
//! other entities are removed (generational indices).

use slotmap::new_key_type;

new_key_type! {
    /// Key for an edge (a line or arc curve with two coedges).
    pub struct EdgeKey;

    /// Key for a coedge (one directed use of an edge).
    pub struct CoedgeKey;

    /// Key for a wire (closed chain of coedges).
    pub struct WireKey;

    /// Key for a face (region bounded by an outer wire and hole wires).
    pub struct FaceKey;
}
