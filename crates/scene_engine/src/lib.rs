//! # Scene Engine
//!
//! A retained-mode scene description engine. A tree of declarative nodes is
//! walked by pluggable actions (rendering, picking, bounding boxes, search)
//! that accumulate state on the way down and restore it on the way up.
//!
//! ## Features
//!
//! - **Lazy State Stacks**: Per-category state that costs nothing until a
//!   category is actually changed at a level
//! - **Type-Based Dispatch**: Per-action handler tables with fallback along
//!   the node type hierarchy, extensible with new node types and handlers
//! - **Ray Picking**: Möller–Trumbore hit testing in each shape's local space
//! - **Backend Boundary**: Graphics side effects behind a small trait, with a
//!   recording implementation for tests and tools
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//! use scene_engine::prelude::*;
//!
//! let root: NodeRef = Rc::new(Group::with_children([
//!     Rc::new(TransformNode::from_translation(Vec3::new(0.0, 0.0, -2.0))) as NodeRef,
//!     Rc::new(Quad::unit()),
//! ]));
//!
//! let ray = Ray::new(Point3::new(0.5, 0.25, 5.0), Vec3::new(0.0, 0.0, -1.0));
//! let mut pick = PickAction::new(ray);
//! pick.apply(&root);
//!
//! let hit = pick.picked_point().expect("the quad is under the ray");
//! assert!((hit.t - 7.0).abs() < 1e-5);
//! ```

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;

pub mod action;
pub mod config;
pub mod foundation;
pub mod geometry;
pub mod render;
pub mod scene;
pub mod state;

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        action::{
            Action, BoundingBoxAction, PickAction, PickedPoint, RenderAction, SearchAction,
            SearchInterest, SearchTarget,
        },
        core::config::{Config, PickConfig, RenderConfig, SceneEngineConfig},
        foundation::math::{Mat4, Mat4Ext, Point3, Transform, Vec2, Vec3, Vec4},
        geometry::{Ray, AABB},
        render::{BlendMode, CullMode, RecordingBackend, RenderBackend, RenderCommand, Texture},
        scene::{
            BlendModeNode, CameraNode, CullModeNode, Group, IndexedTriangleSet, MaterialNode,
            Node, NodeRef, Path, Quad, Switch, SwitchChoice, TextureNode, TransformNode,
            TriangleSet, Vertex,
        },
        state::{StateDefaults, TraversalState},
    };
}
