//! Scene editing engine for the 2D game-authoring tool.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! interactive core of the scene editor: mapping pointer coordinates into scene
//! space, driving the per-tool gesture state machines, hit-testing objects,
//! and redrawing the scene every time it changes. Asset browsing, the property
//! inspector, docking chrome and project file I/O live in the host and talk to
//! the engine through [`engine::EditorCommand`] and [`engine::Action`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`scene`] | Scene graph: layers, typed objects, owning-layer index |
//! | [`camera`] | Zoom/pan camera and screen/scene conversions |
//! | [`snap`] | Grid and angle quantization |
//! | [`hit`] | Hit-testing and selection handle geometry |
//! | [`input`] | Tools, tool sessions, pointer/key/wheel input types |
//! | [`tools`] | Pointer handlers for each tool |
//! | [`render`] | Immediate-mode scene rendering onto a [`surface::Surface`] |
//! | [`surface`] | Drawing surface trait and its `Canvas2D` implementation |
//! | [`config`] | Editor settings (grid, snap, tile defaults) |
//! | [`error`] | Crate error type |
//! | [`consts`] | Shared numeric constants (zoom limits, handle sizes, etc.) |

pub mod camera;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod hit;
pub mod input;
pub mod render;
pub mod scene;
pub mod snap;
pub mod surface;
pub mod tools;
