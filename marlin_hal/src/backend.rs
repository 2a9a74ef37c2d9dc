// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The call surface to the native subsystem.

use crate::error::Status;

/// Version of the [`NativeBackend`] surface this crate was written against.
pub const ABI_VERSION: u32 = 1;

/// An opaque reference to a native resource.
///
/// Only the backend that produced a handle can interpret it. Zero is never a
/// valid handle; it stands for "no resource" wherever an optional resource is
/// passed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct RawHandle(pub u64);

impl RawHandle {
    pub const NONE: Self = Self(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// The kind of resource a handle refers to.
///
/// Passed back to the backend on release so it can pick the right teardown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum HandleKind {
    Device = 0,
    Texture = 1,
    RenderTarget = 2,
    Shader = 3,
    Mesh = 4,
    MeshView = 5,
    PhongMaterial = 6,
    SwapChain = 7,
}

/// The native side of the boundary.
///
/// Every method takes handles and plain data. Creation calls report failure
/// with a [`Status`]; configuration calls that can be refused return `false`;
/// the rest have no failure value. Calls are synchronous and blocking.
///
/// Implementations must tolerate any handle value, including released and
/// [`RawHandle::NONE`], without undefined behavior. The hub wrappers never
/// pass a handle they have released, but a backend is the last line of
/// defense.
pub trait NativeBackend: Send + Sync {
    /// The [`ABI_VERSION`] the backend implements.
    fn abi_version(&self) -> u32;

    /// Release a handle of any kind.
    fn release(&self, kind: HandleKind, handle: RawHandle);

    fn create_device(&self, adapter: u32) -> Result<RawHandle, Status>;

    /// Whether `format` (a backend format code) can be used for `usage`.
    fn check_format_support(&self, device: RawHandle, format: u32, usage: u32) -> bool;

    fn create_texture(
        &self,
        device: RawHandle,
        width: u32,
        height: u32,
        format: u32,
        usage: u32,
    ) -> Result<RawHandle, Status>;

    fn create_render_target(
        &self,
        device: RawHandle,
        width: u32,
        height: u32,
        format: u32,
        samples: u32,
    ) -> Result<RawHandle, Status>;

    fn create_shader(&self, device: RawHandle, bytecode: &[u8]) -> Result<RawHandle, Status>;

    fn create_mesh(&self, device: RawHandle) -> Result<RawHandle, Status>;

    fn create_mesh_view(&self, device: RawHandle, mesh: RawHandle) -> Result<RawHandle, Status>;

    fn create_phong_material(&self, device: RawHandle) -> Result<RawHandle, Status>;

    /// `window` is the platform window identifier.
    fn create_swap_chain(
        &self,
        device: RawHandle,
        window: u64,
        width: u32,
        height: u32,
    ) -> Result<RawHandle, Status>;

    /// `target` of [`RawHandle::NONE`] selects the default target.
    fn set_render_target(&self, device: RawHandle, target: RawHandle) -> bool;

    fn clear(&self, device: RawHandle, rgba: [f32; 4]);

    /// A row-major 4x4 matrix.
    fn set_world_transform(&self, device: RawHandle, matrix: &[f32; 16]);

    fn set_view_projection(&self, device: RawHandle, matrix: &[f32; 16], camera: [f32; 3]);

    fn set_texture(&self, device: RawHandle, unit: u32, texture: RawHandle) -> bool;

    fn set_shader(&self, device: RawHandle, shader: RawHandle) -> bool;

    fn render_mesh_view(&self, device: RawHandle, view: RawHandle) -> bool;

    /// `region` is `[x, y, width, height]`; `buffer_kind` is a
    /// [`BufferKind`](crate::BufferKind) code describing how `data` was typed
    /// on the caller's side.
    fn update_texture(
        &self,
        texture: RawHandle,
        region: [u32; 4],
        buffer_kind: u32,
        data: &[u8],
    ) -> bool;

    fn read_texture(
        &self,
        texture: RawHandle,
        region: [u32; 4],
        buffer_kind: u32,
        data: &mut [u8],
    ) -> bool;

    fn set_shader_constants_f32(&self, shader: RawHandle, name: &str, values: &[f32]) -> bool;

    fn set_shader_constants_i32(&self, shader: RawHandle, name: &str, values: &[i32]) -> bool;

    /// `indices` holds native-endian indices of `index_width` bytes (2 or 4).
    fn build_geometry(
        &self,
        mesh: RawHandle,
        vertices: &[f32],
        indices: &[u8],
        index_width: u32,
    ) -> bool;

    fn set_material(&self, view: RawHandle, material: RawHandle);

    fn set_cull_mode(&self, view: RawHandle, mode: u32);

    fn set_wireframe(&self, view: RawHandle, wireframe: bool);

    fn set_ambient_light(&self, view: RawHandle, rgba: [f32; 4]);

    /// `light` is `[x, y, z, r, g, b, a, range]`.
    fn set_point_light(&self, view: RawHandle, index: u32, light: [f32; 8]) -> bool;

    fn set_diffuse_color(&self, material: RawHandle, rgba: [f32; 4]);

    /// `enabled == false` turns specular highlights off.
    fn set_specular_color(&self, material: RawHandle, enabled: bool, rgba: [f32; 4]);

    fn set_map(&self, material: RawHandle, map_type: u32, texture: RawHandle) -> bool;

    fn present(&self, swap_chain: RawHandle) -> bool;

    fn resize_swap_chain(&self, swap_chain: RawHandle, width: u32, height: u32) -> bool;
}
