//! Sequence diagram layout.
//!
//! Horizontal coordinates are never computed directly. Tiles create lazy
//! [`Position`]s in a [`PositionArena`] and declare minimum gaps between
//! lifeline [`Anchor`]s in a [`ConstraintGraph`]; [`resolve`] then assigns
//! every position at once. Vertical coordinates come from a single top to
//! bottom pass over the tiles.

mod activation;
mod constraint;
mod lifeline;
mod position;
mod resolved;
mod resolver;
mod session;
mod stacker;
pub mod tile;

pub use activation::{ActivationBox, find_active_activation_box, message_endpoint_x};
pub use constraint::{Anchor, ConstraintGraph, GraphNode};
pub use lifeline::{Lifeline, LifelineAnchors, Lifelines};
pub use position::{Position, PositionArena};
pub use resolved::{ResolvedLayout, ResolvedLifeline, TilePlacement};
pub use resolver::{Resolution, resolve};
pub use session::LayoutSession;
pub use stacker::stack;
pub use tile::{DrawContext, LayoutTile, Tile, TileKind};
