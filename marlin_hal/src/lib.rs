// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned handles to resources of a native 3D subsystem.
//!
//! The native side is reached only through [`NativeBackend`], a narrow call
//! surface where every call takes opaque [`RawHandle`] values and plain data:
//! integers, floats, byte slices and row-major matrices. Nothing on that
//! surface is a pointer.
//!
//! On top of it, the hub types ([`Device`], [`Texture`], [`Shader`], [`Mesh`],
//! [`MeshView`], [`PhongMaterial`], [`RenderTarget`] and [`SwapChain`]) each
//! own one [`NativeHandle`]. A handle is released at most once, either
//! explicitly or when the wrapper is dropped, and is zeroed on release so it
//! can never be passed to the backend again.
//!
//! Ownership is not transitive. A resource created through a [`Device`] holds
//! its own handle; releasing the device leaves it alive, and each resource
//! must be released (or dropped) on its own.
//!
//! [`SimBackend`] is an in-process stand-in for the native subsystem.

// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(clippy::print_stdout, clippy::print_stderr)]

mod backend;
mod error;
mod format;
mod handle;
mod hub;
mod sim;
mod transform;

use thiserror::Error;

pub use backend::{HandleKind, NativeBackend, RawHandle, ABI_VERSION};
pub use error::Status;
pub use format::{
    BufferKind, CullMode, MapType, PixelBuffer, PixelBufferMut, PixelFormat, Region, TextureUsage,
};
pub use handle::NativeHandle;
pub use hub::{
    Device, Mesh, MeshIndices, MeshView, PhongMaterial, PointLight, RenderTarget, Shader,
    SwapChain, Texture, MAX_POINT_LIGHTS, VERTEX_FLOATS,
};
pub use sim::{DeviceSnapshot, MaterialSnapshot, MeshViewSnapshot, SimBackend};
pub use transform::Transform3D;

// Re-export our color and 2D geometry types.
pub use peniko;
pub use peniko::kurbo;
pub use peniko::Color;

/// Errors that can occur in `marlin_hal`.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The backend speaks a different version of the call surface.
    #[error("Native ABI version {found} does not match the expected version {expected}.")]
    AbiMismatch { expected: u32, found: u32 },
    /// A creation call failed on the native side.
    #[error("Native call {call} failed: {status}")]
    Native { call: &'static str, status: Status },
    /// A creation call reported success but produced no handle.
    #[error("Native call {0} returned a null handle.")]
    NullHandle(&'static str),
    /// The handle was already released.
    #[error("{0:?} handle used after release.")]
    Released(HandleKind),
    /// The backend has no code for the pixel format.
    #[error("Pixel format {0:?} has no backend equivalent.")]
    UnsupportedFormat(PixelFormat),
    /// The pixel buffer's element type can't carry the texture's pixels.
    #[error("A {kind:?} buffer cannot carry {format:?} pixels.")]
    UnsupportedBuffer {
        format: PixelFormat,
        kind: BufferKind,
    },
    /// The pixel buffer is shorter than the region it should cover.
    #[error("Pixel buffer holds {got} bytes, the region needs {needed}.")]
    BufferTooSmall { needed: usize, got: usize },
    /// The region is empty or extends past the texture.
    #[error("Region {region:?} does not fit a {width}x{height} texture.")]
    InvalidRegion {
        region: Region,
        width: u32,
        height: u32,
    },
    /// A resource was requested with a zero or oversized dimension.
    #[error("Invalid dimensions {width}x{height}.")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Shorthand for results with the crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
