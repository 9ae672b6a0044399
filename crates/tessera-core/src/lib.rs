//! Tessera Core Types and Contracts
//!
//! This crate provides the leaf-level building blocks shared by the Tessera
//! sequence layout engine and its consumers:
//!
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Identifiers**: String-interned participant identifiers ([`identifier::Id`])
//! - **Text**: The text measurement contract and its implementations ([`text`] module)
//! - **Draw**: The draw-sink contract and an SVG sink ([`draw`] module)

pub mod draw;
pub mod geometry;
pub mod identifier;
pub mod text;
