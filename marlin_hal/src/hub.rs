// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed wrappers over the native call surface.
//!
//! Each wrapper owns exactly one [`NativeHandle`] and validates its arguments
//! before anything crosses the boundary. Creation failures are errors.
//! Configuration calls the native side may refuse return `bool`, and so do
//! calls made with a released handle, which never reach the backend.

use std::sync::Arc;

use peniko::Color;

use crate::backend::{HandleKind, NativeBackend, RawHandle, ABI_VERSION};
use crate::format::{
    BufferKind, CullMode, MapType, PixelBuffer, PixelBufferMut, PixelFormat, Region, TextureUsage,
};
use crate::handle::NativeHandle;
use crate::transform::{rgba_f32, Transform3D};
use crate::{Error, Result};

/// Floats per mesh vertex: position, normal and texture coordinates.
pub const VERTEX_FLOATS: usize = 8;

/// Point lights a mesh view can hold.
pub const MAX_POINT_LIGHTS: u32 = 3;

/// Largest texture or target dimension accepted.
const MAX_DIMENSION: u32 = 16384;

macro_rules! owned_handle {
    ($ty:ident) => {
        impl $ty {
            pub fn handle(&self) -> &NativeHandle {
                &self.handle
            }

            /// Release the native resource now. Later calls do nothing;
            /// dropping the wrapper releases it otherwise.
            pub fn release(&self) -> bool {
                self.handle.release()
            }

            pub fn is_released(&self) -> bool {
                self.handle.is_released()
            }
        }
    };
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(Error::InvalidDimensions { width, height });
    }
    Ok(())
}

/// A native device, the factory for every other resource.
///
/// Resources created through a device own their own handles. Releasing the
/// device does not release them.
#[derive(Debug)]
pub struct Device {
    handle: NativeHandle,
}

owned_handle!(Device);

impl Device {
    /// Open a device on `adapter`.
    pub fn create(backend: Arc<dyn NativeBackend>, adapter: u32) -> Result<Self> {
        let found = backend.abi_version();
        if found != ABI_VERSION {
            return Err(Error::AbiMismatch {
                expected: ABI_VERSION,
                found,
            });
        }
        let result = backend.create_device(adapter);
        let handle =
            NativeHandle::from_creation(&backend, HandleKind::Device, "create_device", result)?;
        Ok(Self { handle })
    }

    fn backend(&self) -> &Arc<dyn NativeBackend> {
        self.handle.backend()
    }

    fn child(
        &self,
        kind: HandleKind,
        call: &'static str,
        result: core::result::Result<RawHandle, crate::Status>,
    ) -> Result<NativeHandle> {
        NativeHandle::from_creation(self.backend(), kind, call, result)
    }

    /// Whether the backend can use `format` for `usage`.
    ///
    /// Formats with no backend code are unsupported.
    pub fn check_format_support(&self, format: PixelFormat, usage: TextureUsage) -> bool {
        let Some(device) = self.handle.live_for("check_format_support") else {
            return false;
        };
        let Some(code) = format.backend_code() else {
            return false;
        };
        let supported = self.backend().check_format_support(device, code, usage as u32);
        if !supported {
            log::debug!("{format:?} not supported for {usage:?}");
        }
        supported
    }

    pub fn create_texture(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
        usage: TextureUsage,
    ) -> Result<Texture> {
        let device = self.handle.raw()?;
        check_dimensions(width, height)?;
        let code = format
            .backend_code()
            .ok_or(Error::UnsupportedFormat(format))?;
        let result = self
            .backend()
            .create_texture(device, width, height, code, usage as u32);
        Ok(Texture {
            handle: self.child(HandleKind::Texture, "create_texture", result)?,
            width,
            height,
            format,
            usage,
        })
    }

    /// `samples` of 0 is treated as 1.
    pub fn create_render_target(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
        samples: u32,
    ) -> Result<RenderTarget> {
        let device = self.handle.raw()?;
        check_dimensions(width, height)?;
        let code = format
            .backend_code()
            .ok_or(Error::UnsupportedFormat(format))?;
        let samples = samples.max(1);
        let result = self
            .backend()
            .create_render_target(device, width, height, code, samples);
        Ok(RenderTarget {
            handle: self.child(HandleKind::RenderTarget, "create_render_target", result)?,
            width,
            height,
            format,
            samples,
        })
    }

    /// Create a shader from compiled bytecode.
    pub fn create_shader(&self, bytecode: &[u8]) -> Result<Shader> {
        let device = self.handle.raw()?;
        let result = self.backend().create_shader(device, bytecode);
        Ok(Shader {
            handle: self.child(HandleKind::Shader, "create_shader", result)?,
        })
    }

    pub fn create_mesh(&self) -> Result<Mesh> {
        let device = self.handle.raw()?;
        let result = self.backend().create_mesh(device);
        Ok(Mesh {
            handle: self.child(HandleKind::Mesh, "create_mesh", result)?,
        })
    }

    /// Create a drawable view of `mesh`.
    ///
    /// The view refers to the mesh natively but does not own it.
    pub fn create_mesh_view(&self, mesh: &Mesh) -> Result<MeshView> {
        let device = self.handle.raw()?;
        let mesh = mesh.handle.raw()?;
        let result = self.backend().create_mesh_view(device, mesh);
        Ok(MeshView {
            handle: self.child(HandleKind::MeshView, "create_mesh_view", result)?,
        })
    }

    pub fn create_phong_material(&self) -> Result<PhongMaterial> {
        let device = self.handle.raw()?;
        let result = self.backend().create_phong_material(device);
        Ok(PhongMaterial {
            handle: self.child(HandleKind::PhongMaterial, "create_phong_material", result)?,
        })
    }

    /// Create a swap chain presenting to the platform window `window`.
    pub fn create_swap_chain(&self, window: u64, width: u32, height: u32) -> Result<SwapChain> {
        let device = self.handle.raw()?;
        check_dimensions(width, height)?;
        let result = self
            .backend()
            .create_swap_chain(device, window, width, height);
        Ok(SwapChain {
            handle: self.child(HandleKind::SwapChain, "create_swap_chain", result)?,
            width,
            height,
        })
    }

    /// Direct rendering to `target`, or to the default target for `None`.
    pub fn set_render_target(&self, target: Option<&RenderTarget>) -> bool {
        let Some(device) = self.handle.live_for("set_render_target") else {
            return false;
        };
        let Some(target) = NativeHandle::optional(target.map(|t| &t.handle), "set_render_target")
        else {
            return false;
        };
        self.backend().set_render_target(device, target)
    }

    pub fn clear(&self, color: Color) {
        if let Some(device) = self.handle.live_for("clear") {
            self.backend().clear(device, rgba_f32(color));
        }
    }

    pub fn set_world_transform(&self, transform: &Transform3D) {
        if let Some(device) = self.handle.live_for("set_world_transform") {
            self.backend()
                .set_world_transform(device, transform.to_row_major());
        }
    }

    /// Set the combined view and projection matrix, with the camera position
    /// in world space for lighting.
    pub fn set_view_projection(&self, view_projection: &Transform3D, camera: [f32; 3]) {
        if let Some(device) = self.handle.live_for("set_view_projection") {
            self.backend()
                .set_view_projection(device, view_projection.to_row_major(), camera);
        }
    }

    /// Bind `texture` to sampler `unit`, or unbind it with `None`.
    pub fn set_texture(&self, unit: u32, texture: Option<&Texture>) -> bool {
        let Some(device) = self.handle.live_for("set_texture") else {
            return false;
        };
        let Some(texture) = NativeHandle::optional(texture.map(|t| &t.handle), "set_texture")
        else {
            return false;
        };
        self.backend().set_texture(device, unit, texture)
    }

    /// Bind `shader`, or return to the fixed-function path with `None`.
    pub fn set_shader(&self, shader: Option<&Shader>) -> bool {
        let Some(device) = self.handle.live_for("set_shader") else {
            return false;
        };
        let Some(shader) = NativeHandle::optional(shader.map(|s| &s.handle), "set_shader") else {
            return false;
        };
        self.backend().set_shader(device, shader)
    }

    pub fn render_mesh_view(&self, view: &MeshView) -> bool {
        let (Some(device), Some(view)) = (
            self.handle.live_for("render_mesh_view"),
            view.handle.live_for("render_mesh_view"),
        ) else {
            return false;
        };
        self.backend().render_mesh_view(device, view)
    }
}

/// A sampled texture.
#[derive(Debug)]
pub struct Texture {
    handle: NativeHandle,
    width: u32,
    height: u32,
    format: PixelFormat,
    usage: TextureUsage,
}

owned_handle!(Texture);

impl Texture {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn usage(&self) -> TextureUsage {
        self.usage
    }

    /// Bytes of pixel data `region` covers, after checking that a buffer of
    /// `kind` can carry this texture's pixels.
    fn region_bytes(&self, region: Region, kind: BufferKind) -> Result<usize> {
        if !self.format.accepts(kind) {
            return Err(Error::UnsupportedBuffer {
                format: self.format,
                kind,
            });
        }
        if !region.fits(self.width, self.height) {
            return Err(Error::InvalidRegion {
                region,
                width: self.width,
                height: self.height,
            });
        }
        let bpp = self
            .format
            .bytes_per_pixel()
            .ok_or(Error::UnsupportedFormat(self.format))?;
        Ok(region.texels() * bpp)
    }

    /// Upload `pixels` into `region`, rows tightly packed.
    ///
    /// A buffer of the wrong element type, or one too short for the region,
    /// is an error and never reaches the backend. `Ok(false)` means the
    /// backend refused the upload.
    pub fn update(&self, region: Region, pixels: PixelBuffer<'_>) -> Result<bool> {
        let texture = self.handle.raw()?;
        let kind = pixels.kind();
        let needed = self.region_bytes(region, kind)?;
        let data = pixels.as_bytes();
        if data.len() < needed {
            return Err(Error::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        let accepted = self.handle.backend().update_texture(
            texture,
            region.to_raw(),
            kind as u32,
            &data[..needed],
        );
        if !accepted {
            log::debug!("update_texture refused for {region:?}");
        }
        Ok(accepted)
    }

    /// Read `region` back into `pixels`, rows tightly packed.
    ///
    /// Fails the same way as [`update`](Self::update).
    pub fn read_pixels(&self, region: Region, mut pixels: PixelBufferMut<'_>) -> Result<bool> {
        let texture = self.handle.raw()?;
        let kind = pixels.kind();
        let needed = self.region_bytes(region, kind)?;
        let data = pixels.as_bytes_mut();
        if data.len() < needed {
            return Err(Error::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        let accepted = self.handle.backend().read_texture(
            texture,
            region.to_raw(),
            kind as u32,
            &mut data[..needed],
        );
        if !accepted {
            log::debug!("read_texture refused for {region:?}");
        }
        Ok(accepted)
    }
}

/// An offscreen render target.
#[derive(Debug)]
pub struct RenderTarget {
    handle: NativeHandle,
    width: u32,
    height: u32,
    format: PixelFormat,
    samples: u32,
}

owned_handle!(RenderTarget);

impl RenderTarget {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Samples per pixel, at least 1.
    pub fn samples(&self) -> u32 {
        self.samples
    }
}

/// A compiled shader program.
#[derive(Debug)]
pub struct Shader {
    handle: NativeHandle,
}

owned_handle!(Shader);

impl Shader {
    /// Set the float constants called `name`. An unknown name, or more
    /// values than the constant holds, is refused.
    pub fn set_constants_f32(&self, name: &str, values: &[f32]) -> bool {
        let Some(shader) = self.handle.live_for("set_constants_f32") else {
            return false;
        };
        self.handle
            .backend()
            .set_shader_constants_f32(shader, name, values)
    }

    /// Set the integer constants called `name`.
    pub fn set_constants_i32(&self, name: &str, values: &[i32]) -> bool {
        let Some(shader) = self.handle.live_for("set_constants_i32") else {
            return false;
        };
        self.handle
            .backend()
            .set_shader_constants_i32(shader, name, values)
    }
}

/// Index data for [`Mesh::build_geometry`].
#[derive(Clone, Copy, Debug)]
pub enum MeshIndices<'a> {
    U16(&'a [u16]),
    U32(&'a [u32]),
}

impl MeshIndices<'_> {
    fn as_bytes(&self) -> (&[u8], u32) {
        match self {
            Self::U16(indices) => (bytemuck::cast_slice(indices), 2),
            Self::U32(indices) => (bytemuck::cast_slice(indices), 4),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::U16(indices) => indices.len(),
            Self::U32(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Triangle geometry.
#[derive(Debug)]
pub struct Mesh {
    handle: NativeHandle,
}

owned_handle!(Mesh);

impl Mesh {
    /// Replace the geometry. `vertices` holds [`VERTEX_FLOATS`] floats per
    /// vertex and `indices` three entries per triangle.
    pub fn build_geometry(&self, vertices: &[f32], indices: MeshIndices<'_>) -> bool {
        if vertices.len() % VERTEX_FLOATS != 0 || indices.len() % 3 != 0 {
            log::warn!(
                "build_geometry: {} floats, {} indices is not whole vertices and triangles",
                vertices.len(),
                indices.len()
            );
            return false;
        }
        let Some(mesh) = self.handle.live_for("build_geometry") else {
            return false;
        };
        let (bytes, width) = indices.as_bytes();
        self.handle
            .backend()
            .build_geometry(mesh, vertices, bytes, width)
    }
}

/// A point light attached to a [`MeshView`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: [f32; 3],
    pub color: Color,
    /// Distance at which the light's contribution reaches zero.
    pub range: f32,
}

impl PointLight {
    fn to_raw(self) -> [f32; 8] {
        let [x, y, z] = self.position;
        let [r, g, b, a] = rgba_f32(self.color);
        [x, y, z, r, g, b, a, self.range]
    }
}

/// A drawable instance of a [`Mesh`] with its material and lighting.
#[derive(Debug)]
pub struct MeshView {
    handle: NativeHandle,
}

owned_handle!(MeshView);

impl MeshView {
    /// Use `material`, or the default material for `None`. A released
    /// material is refused.
    pub fn set_material(&self, material: Option<&PhongMaterial>) -> bool {
        let Some(view) = self.handle.live_for("set_material") else {
            return false;
        };
        let Some(material) = NativeHandle::optional(material.map(|m| &m.handle), "set_material")
        else {
            return false;
        };
        self.handle.backend().set_material(view, material);
        true
    }

    pub fn set_cull_mode(&self, mode: CullMode) {
        if let Some(view) = self.handle.live_for("set_cull_mode") {
            self.handle.backend().set_cull_mode(view, mode as u32);
        }
    }

    pub fn set_wireframe(&self, wireframe: bool) {
        if let Some(view) = self.handle.live_for("set_wireframe") {
            self.handle.backend().set_wireframe(view, wireframe);
        }
    }

    pub fn set_ambient_light(&self, color: Color) {
        if let Some(view) = self.handle.live_for("set_ambient_light") {
            self.handle
                .backend()
                .set_ambient_light(view, rgba_f32(color));
        }
    }

    /// Set light `index`, which must be below [`MAX_POINT_LIGHTS`].
    pub fn set_point_light(&self, index: u32, light: PointLight) -> bool {
        if index >= MAX_POINT_LIGHTS {
            log::warn!("set_point_light: index {index} out of range");
            return false;
        }
        let Some(view) = self.handle.live_for("set_point_light") else {
            return false;
        };
        self.handle
            .backend()
            .set_point_light(view, index, light.to_raw())
    }
}

/// A Phong material.
#[derive(Debug)]
pub struct PhongMaterial {
    handle: NativeHandle,
}

owned_handle!(PhongMaterial);

impl PhongMaterial {
    pub fn set_diffuse_color(&self, color: Color) {
        if let Some(material) = self.handle.live_for("set_diffuse_color") {
            self.handle
                .backend()
                .set_diffuse_color(material, rgba_f32(color));
        }
    }

    /// `None` turns specular highlights off.
    pub fn set_specular_color(&self, color: Option<Color>) {
        if let Some(material) = self.handle.live_for("set_specular_color") {
            let rgba = rgba_f32(color.unwrap_or(Color::TRANSPARENT));
            self.handle
                .backend()
                .set_specular_color(material, color.is_some(), rgba);
        }
    }

    /// Bind `texture` as the `map_type` map, or clear it with `None`.
    pub fn set_map(&self, map_type: MapType, texture: Option<&Texture>) -> bool {
        let Some(material) = self.handle.live_for("set_map") else {
            return false;
        };
        let Some(texture) = NativeHandle::optional(texture.map(|t| &t.handle), "set_map") else {
            return false;
        };
        self.handle
            .backend()
            .set_map(material, map_type as u32, texture)
    }
}

/// A swap chain presenting to a platform window.
#[derive(Debug)]
pub struct SwapChain {
    handle: NativeHandle,
    width: u32,
    height: u32,
}

owned_handle!(SwapChain);

impl SwapChain {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn present(&self) -> bool {
        let Some(swap_chain) = self.handle.live_for("present") else {
            return false;
        };
        self.handle.backend().present(swap_chain)
    }

    /// Resize the buffers. The stored size only changes if the backend
    /// accepts.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if check_dimensions(width, height).is_err() {
            return false;
        }
        let Some(swap_chain) = self.handle.live_for("resize") else {
            return false;
        };
        let resized = self
            .handle
            .backend()
            .resize_swap_chain(swap_chain, width, height);
        if resized {
            self.width = width;
            self.height = height;
        }
        resized
    }
}
