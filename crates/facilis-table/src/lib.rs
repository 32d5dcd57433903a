// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Client-side table engine: column layout, sort, search, pagination and
//! selection over caller-owned rows.

pub mod cell;
pub mod column;
pub mod derive;
pub mod ids;
pub mod layout;
pub mod render;
pub mod sort;
pub mod state;
pub mod store;
pub mod table;

pub use cell::*;
pub use column::*;
pub use derive::*;
pub use ids::*;
pub use layout::*;
pub use render::*;
pub use sort::*;
pub use state::*;
pub use store::*;
pub use table::*;
