// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-process stand-in for the native subsystem.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use smallvec::SmallVec;

use crate::backend::{HandleKind, NativeBackend, RawHandle, ABI_VERSION};
use crate::error::Status;
use crate::format::PixelFormat;
use crate::hub::{MAX_POINT_LIGHTS, VERTEX_FLOATS};

/// Handles are unique across every `SimBackend` in the process.
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

const TEXTURE_UNITS: u32 = 8;

/// A simulated native backend.
///
/// It keeps every object it creates in a table, records what it was told to
/// do, and checks each call the way a careful driver would: unknown or
/// released handles and out-of-range arguments are refused. Tests use the
/// inspection methods to look at the resulting state, and the `reject_*` and
/// `fail_*` knobs to provoke native failures.
pub struct SimBackend {
    abi_version: u32,
    calls: AtomicU64,
    state: Mutex<SimState>,
}

#[derive(Default)]
struct SimState {
    objects: HashMap<RawHandle, SimObject>,
    releases: HashMap<RawHandle, u32>,
    double_releases: u32,
    rejected_formats: HashSet<u32>,
    fail_device: Option<Status>,
}

enum SimObject {
    Device(DeviceSnapshot),
    Texture(SimTexture),
    RenderTarget,
    Shader(SmallVec<[ShaderConstant; 4]>),
    Mesh { triangles: usize },
    MeshView(MeshViewSnapshot),
    Material(MaterialSnapshot),
    SwapChain { presents: u32 },
}

impl SimObject {
    fn kind(&self) -> HandleKind {
        match self {
            Self::Device(_) => HandleKind::Device,
            Self::Texture(_) => HandleKind::Texture,
            Self::RenderTarget => HandleKind::RenderTarget,
            Self::Shader(_) => HandleKind::Shader,
            Self::Mesh { .. } => HandleKind::Mesh,
            Self::MeshView(_) => HandleKind::MeshView,
            Self::Material(_) => HandleKind::PhongMaterial,
            Self::SwapChain { .. } => HandleKind::SwapChain,
        }
    }
}

struct SimTexture {
    width: u32,
    height: u32,
    bpp: usize,
    pixels: Vec<u8>,
}

impl SimTexture {
    /// Byte ranges of each row of `region`, if it fits.
    fn rows(&self, region: [u32; 4]) -> Option<impl Iterator<Item = core::ops::Range<usize>>> {
        let [x, y, w, h] = region.map(|v| v as usize);
        let (width, height) = (self.width as usize, self.height as usize);
        if w == 0 || h == 0 || x + w > width || y + h > height {
            return None;
        }
        let bpp = self.bpp;
        Some((y..y + h).map(move |row| {
            let start = (row * width + x) * bpp;
            start..start + w * bpp
        }))
    }
}

struct ShaderConstant {
    name: String,
    count: usize,
    bits: SmallVec<[u32; 4]>,
}

/// What a simulated material was last told.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialSnapshot {
    pub diffuse: [f32; 4],
    /// `None` when specular highlights are off.
    pub specular: Option<[f32; 4]>,
    /// Bound maps by map type.
    pub maps: SmallVec<[(u32, RawHandle); 4]>,
}

/// What a simulated device was last told.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeviceSnapshot {
    pub adapter: u32,
    /// [`RawHandle::NONE`] for the default target.
    pub render_target: RawHandle,
    pub clear_color: [f32; 4],
    pub world: [f32; 16],
    pub view_projection: [f32; 16],
    pub camera: [f32; 3],
    pub shader: RawHandle,
    /// Bound textures by unit.
    pub textures: SmallVec<[(u32, RawHandle); 4]>,
    /// Successful `render_mesh_view` calls.
    pub draws: u32,
}

/// What a simulated mesh view was last told.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshViewSnapshot {
    pub mesh: RawHandle,
    pub material: RawHandle,
    pub cull_mode: u32,
    pub wireframe: bool,
    pub ambient: [f32; 4],
    pub lights: [Option<[f32; 8]>; MAX_POINT_LIGHTS as usize],
    /// Triangles in the viewed mesh, or 0 if it's gone.
    pub triangles: usize,
}

/// Bytes per pixel for the backend format codes the simulator knows.
fn bytes_per_pixel(format: u32) -> Option<usize> {
    match format {
        87 => Some(4),
        61 | 65 => Some(1),
        2 => Some(16),
        _ => None,
    }
}

fn parse_constants(bytecode: &[u8]) -> Option<SmallVec<[ShaderConstant; 4]>> {
    let text = core::str::from_utf8(bytecode).ok()?;
    let mut constants = SmallVec::new();
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let (name, count) = line.split_once(':')?;
        constants.push(ShaderConstant {
            name: name.trim().to_owned(),
            count: count.trim().parse().ok()?,
            bits: SmallVec::new(),
        });
    }
    if constants.is_empty() {
        return None;
    }
    Some(constants)
}

impl Default for SimBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBackend {
    pub fn new() -> Self {
        Self {
            abi_version: ABI_VERSION,
            calls: AtomicU64::new(0),
            state: Mutex::new(SimState::default()),
        }
    }

    /// Report a different ABI version.
    pub fn with_abi_version(mut self, version: u32) -> Self {
        self.abi_version = version;
        self
    }

    /// Refuse `format` in format checks and texture creation.
    pub fn reject_format(&self, format: PixelFormat) {
        if let Some(code) = format.backend_code() {
            self.lock().rejected_formats.insert(code);
        }
    }

    /// Make device creation fail with `status`, or succeed again with `None`.
    pub fn fail_device_creation(&self, status: Option<Status>) {
        self.lock().fail_device = status;
    }

    /// Number of calls made on the backend surface.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn live_handles(&self) -> usize {
        self.lock().objects.len()
    }

    pub fn is_live(&self, handle: RawHandle) -> bool {
        self.lock().objects.contains_key(&handle)
    }

    /// How many times `handle` was passed to `release`.
    pub fn release_count(&self, handle: RawHandle) -> u32 {
        self.lock().releases.get(&handle).copied().unwrap_or(0)
    }

    /// Releases of handles that were not live.
    pub fn double_releases(&self) -> u32 {
        self.lock().double_releases
    }

    pub fn device(&self, handle: RawHandle) -> Option<DeviceSnapshot> {
        match self.lock().objects.get(&handle) {
            Some(SimObject::Device(device)) => Some(device.clone()),
            _ => None,
        }
    }

    pub fn mesh_view(&self, handle: RawHandle) -> Option<MeshViewSnapshot> {
        let state = self.lock();
        let Some(SimObject::MeshView(view)) = state.objects.get(&handle) else {
            return None;
        };
        let triangles = match state.objects.get(&view.mesh) {
            Some(SimObject::Mesh { triangles }) => *triangles,
            _ => 0,
        };
        Some(MeshViewSnapshot {
            triangles,
            ..view.clone()
        })
    }

    /// The raw bits last stored in the shader constant `name`.
    pub fn shader_constants(&self, handle: RawHandle, name: &str) -> Option<Vec<u32>> {
        match self.lock().objects.get(&handle) {
            Some(SimObject::Shader(constants)) => constants
                .iter()
                .find(|constant| constant.name == name)
                .map(|constant| constant.bits.to_vec()),
            _ => None,
        }
    }

    pub fn material(&self, handle: RawHandle) -> Option<MaterialSnapshot> {
        match self.lock().objects.get(&handle) {
            Some(SimObject::Material(material)) => Some(material.clone()),
            _ => None,
        }
    }

    pub fn texture_pixels(&self, handle: RawHandle) -> Option<Vec<u8>> {
        match self.lock().objects.get(&handle) {
            Some(SimObject::Texture(texture)) => Some(texture.pixels.clone()),
            _ => None,
        }
    }

    pub fn presents(&self, handle: RawHandle) -> Option<u32> {
        match self.lock().objects.get(&handle) {
            Some(SimObject::SwapChain { presents }) => Some(*presents),
            _ => None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count a call and lock the state for it.
    fn enter(&self) -> MutexGuard<'_, SimState> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.lock()
    }

    fn create_child(
        &self,
        device: RawHandle,
        object: impl FnOnce(&SimState) -> Result<SimObject, Status>,
    ) -> Result<RawHandle, Status> {
        let mut state = self.enter();
        if !state.is(device, HandleKind::Device) {
            return Err(Status::E_INVALIDARG);
        }
        let object = object(&*state)?;
        Ok(state.insert(object))
    }
}

impl SimState {
    fn is(&self, handle: RawHandle, kind: HandleKind) -> bool {
        self.objects
            .get(&handle)
            .is_some_and(|object| object.kind() == kind)
    }

    /// `NONE`, or a live handle of `kind`.
    fn is_optional(&self, handle: RawHandle, kind: HandleKind) -> bool {
        handle.is_none() || self.is(handle, kind)
    }

    fn insert(&mut self, object: SimObject) -> RawHandle {
        let handle = RawHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed));
        log::trace!("sim: created {:?} {:#x}", object.kind(), handle.0);
        self.objects.insert(handle, object);
        handle
    }

    fn device_mut(&mut self, handle: RawHandle) -> Option<&mut DeviceSnapshot> {
        match self.objects.get_mut(&handle) {
            Some(SimObject::Device(device)) => Some(device),
            _ => None,
        }
    }

    fn view_mut(&mut self, handle: RawHandle) -> Option<&mut MeshViewSnapshot> {
        match self.objects.get_mut(&handle) {
            Some(SimObject::MeshView(view)) => Some(view),
            _ => None,
        }
    }

    fn material_mut(&mut self, handle: RawHandle) -> Option<&mut MaterialSnapshot> {
        match self.objects.get_mut(&handle) {
            Some(SimObject::Material(material)) => Some(material),
            _ => None,
        }
    }
}

/// Insert, replace, or with a `NONE` handle remove, the binding for `slot`.
fn bind(bindings: &mut SmallVec<[(u32, RawHandle); 4]>, slot: u32, handle: RawHandle) {
    bindings.retain(|(bound, _)| *bound != slot);
    if !handle.is_none() {
        bindings.push((slot, handle));
    }
}

impl NativeBackend for SimBackend {
    fn abi_version(&self) -> u32 {
        self.abi_version
    }

    fn release(&self, kind: HandleKind, handle: RawHandle) {
        let mut state = self.enter();
        *state.releases.entry(handle).or_default() += 1;
        match state.objects.remove(&handle) {
            Some(object) if object.kind() != kind => {
                log::warn!(
                    "sim: {:#x} released as {kind:?} but is {:?}",
                    handle.0,
                    object.kind()
                );
            }
            Some(_) => {}
            None => {
                log::warn!("sim: release of unknown {kind:?} {:#x}", handle.0);
                state.double_releases += 1;
            }
        }
    }

    fn create_device(&self, adapter: u32) -> Result<RawHandle, Status> {
        let mut state = self.enter();
        if let Some(status) = state.fail_device {
            return Err(status);
        }
        Ok(state.insert(SimObject::Device(DeviceSnapshot {
            adapter,
            world: *crate::Transform3D::IDENTITY.to_row_major(),
            view_projection: *crate::Transform3D::IDENTITY.to_row_major(),
            ..DeviceSnapshot::default()
        })))
    }

    fn check_format_support(&self, device: RawHandle, format: u32, _usage: u32) -> bool {
        let state = self.enter();
        state.is(device, HandleKind::Device)
            && bytes_per_pixel(format).is_some()
            && !state.rejected_formats.contains(&format)
    }

    fn create_texture(
        &self,
        device: RawHandle,
        width: u32,
        height: u32,
        format: u32,
        _usage: u32,
    ) -> Result<RawHandle, Status> {
        self.create_child(device, |state| {
            if state.rejected_formats.contains(&format) {
                return Err(Status::DXGI_ERROR_UNSUPPORTED);
            }
            let bpp = bytes_per_pixel(format).ok_or(Status::E_INVALIDARG)?;
            if width == 0 || height == 0 {
                return Err(Status::E_INVALIDARG);
            }
            Ok(SimObject::Texture(SimTexture {
                width,
                height,
                bpp,
                pixels: vec![0; width as usize * height as usize * bpp],
            }))
        })
    }

    fn create_render_target(
        &self,
        device: RawHandle,
        width: u32,
        height: u32,
        format: u32,
        samples: u32,
    ) -> Result<RawHandle, Status> {
        self.create_child(device, |state| {
            if state.rejected_formats.contains(&format) {
                return Err(Status::DXGI_ERROR_UNSUPPORTED);
            }
            if bytes_per_pixel(format).is_none() || width == 0 || height == 0 || samples == 0 {
                return Err(Status::E_INVALIDARG);
            }
            Ok(SimObject::RenderTarget)
        })
    }

    fn create_shader(&self, device: RawHandle, bytecode: &[u8]) -> Result<RawHandle, Status> {
        self.create_child(device, |_| {
            parse_constants(bytecode)
                .map(SimObject::Shader)
                .ok_or(Status::E_INVALIDARG)
        })
    }

    fn create_mesh(&self, device: RawHandle) -> Result<RawHandle, Status> {
        self.create_child(device, |_| Ok(SimObject::Mesh { triangles: 0 }))
    }

    fn create_mesh_view(&self, device: RawHandle, mesh: RawHandle) -> Result<RawHandle, Status> {
        self.create_child(device, |state| {
            if !state.is(mesh, HandleKind::Mesh) {
                return Err(Status::E_INVALIDARG);
            }
            Ok(SimObject::MeshView(MeshViewSnapshot {
                mesh,
                ..MeshViewSnapshot::default()
            }))
        })
    }

    fn create_phong_material(&self, device: RawHandle) -> Result<RawHandle, Status> {
        self.create_child(device, |_| {
            Ok(SimObject::Material(MaterialSnapshot {
                diffuse: [1.0; 4],
                ..MaterialSnapshot::default()
            }))
        })
    }

    fn create_swap_chain(
        &self,
        device: RawHandle,
        window: u64,
        width: u32,
        height: u32,
    ) -> Result<RawHandle, Status> {
        self.create_child(device, |_| {
            if window == 0 || width == 0 || height == 0 {
                return Err(Status::E_INVALIDARG);
            }
            Ok(SimObject::SwapChain { presents: 0 })
        })
    }

    fn set_render_target(&self, device: RawHandle, target: RawHandle) -> bool {
        let mut state = self.enter();
        if !state.is_optional(target, HandleKind::RenderTarget) {
            return false;
        }
        match state.device_mut(device) {
            Some(device) => {
                device.render_target = target;
                true
            }
            None => false,
        }
    }

    fn clear(&self, device: RawHandle, rgba: [f32; 4]) {
        if let Some(device) = self.enter().device_mut(device) {
            device.clear_color = rgba;
        }
    }

    fn set_world_transform(&self, device: RawHandle, matrix: &[f32; 16]) {
        if let Some(device) = self.enter().device_mut(device) {
            device.world = *matrix;
        }
    }

    fn set_view_projection(&self, device: RawHandle, matrix: &[f32; 16], camera: [f32; 3]) {
        if let Some(device) = self.enter().device_mut(device) {
            device.view_projection = *matrix;
            device.camera = camera;
        }
    }

    fn set_texture(&self, device: RawHandle, unit: u32, texture: RawHandle) -> bool {
        let mut state = self.enter();
        if unit >= TEXTURE_UNITS || !state.is_optional(texture, HandleKind::Texture) {
            return false;
        }
        match state.device_mut(device) {
            Some(device) => {
                bind(&mut device.textures, unit, texture);
                true
            }
            None => false,
        }
    }

    fn set_shader(&self, device: RawHandle, shader: RawHandle) -> bool {
        let mut state = self.enter();
        if !state.is_optional(shader, HandleKind::Shader) {
            return false;
        }
        match state.device_mut(device) {
            Some(device) => {
                device.shader = shader;
                true
            }
            None => false,
        }
    }

    fn render_mesh_view(&self, device: RawHandle, view: RawHandle) -> bool {
        let mut state = self.enter();
        let mesh = match state.objects.get(&view) {
            Some(SimObject::MeshView(view)) => view.mesh,
            _ => return false,
        };
        let has_triangles = matches!(
            state.objects.get(&mesh),
            Some(SimObject::Mesh { triangles }) if *triangles > 0
        );
        if !has_triangles {
            return false;
        }
        match state.device_mut(device) {
            Some(device) => {
                device.draws += 1;
                true
            }
            None => false,
        }
    }

    fn update_texture(
        &self,
        texture: RawHandle,
        region: [u32; 4],
        buffer_kind: u32,
        data: &[u8],
    ) -> bool {
        let mut state = self.enter();
        let Some(SimObject::Texture(texture)) = state.objects.get_mut(&texture) else {
            return false;
        };
        let Some(rows) = texture.rows(region) else {
            return false;
        };
        let rows: SmallVec<[_; 16]> = rows.collect();
        let row_len = rows.first().map_or(0, |row| row.len());
        if buffer_kind > 2 || data.len() != rows.len() * row_len {
            return false;
        }
        for (row, src) in rows.into_iter().zip(data.chunks_exact(row_len)) {
            texture.pixels[row].copy_from_slice(src);
        }
        true
    }

    fn read_texture(
        &self,
        texture: RawHandle,
        region: [u32; 4],
        buffer_kind: u32,
        data: &mut [u8],
    ) -> bool {
        let state = self.enter();
        let Some(SimObject::Texture(texture)) = state.objects.get(&texture) else {
            return false;
        };
        let Some(rows) = texture.rows(region) else {
            return false;
        };
        let rows: SmallVec<[_; 16]> = rows.collect();
        let row_len = rows.first().map_or(0, |row| row.len());
        if buffer_kind > 2 || data.len() != rows.len() * row_len {
            return false;
        }
        for (row, dst) in rows.into_iter().zip(data.chunks_exact_mut(row_len)) {
            dst.copy_from_slice(&texture.pixels[row]);
        }
        true
    }

    fn set_shader_constants_f32(&self, shader: RawHandle, name: &str, values: &[f32]) -> bool {
        set_constants(&mut self.enter(), shader, name, bytemuck::cast_slice(values))
    }

    fn set_shader_constants_i32(&self, shader: RawHandle, name: &str, values: &[i32]) -> bool {
        set_constants(&mut self.enter(), shader, name, bytemuck::cast_slice(values))
    }

    fn build_geometry(
        &self,
        mesh: RawHandle,
        vertices: &[f32],
        indices: &[u8],
        index_width: u32,
    ) -> bool {
        let mut state = self.enter();
        let Some(SimObject::Mesh { triangles }) = state.objects.get_mut(&mesh) else {
            return false;
        };
        let width = index_width as usize;
        if !(width == 2 || width == 4) || indices.len() % width != 0 {
            return false;
        }
        if vertices.len() % VERTEX_FLOATS != 0 {
            return false;
        }
        let vertex_count = vertices.len() / VERTEX_FLOATS;
        let count = indices.len() / width;
        let in_range = indices.chunks_exact(width).all(|index| {
            let index = match *index {
                [a, b] => u16::from_ne_bytes([a, b]) as usize,
                [a, b, c, d] => u32::from_ne_bytes([a, b, c, d]) as usize,
                _ => usize::MAX,
            };
            index < vertex_count
        });
        if !in_range || count % 3 != 0 {
            return false;
        }
        *triangles = count / 3;
        true
    }

    fn set_material(&self, view: RawHandle, material: RawHandle) {
        let mut state = self.enter();
        if !state.is_optional(material, HandleKind::PhongMaterial) {
            log::warn!("sim: set_material with unknown material {:#x}", material.0);
            return;
        }
        if let Some(view) = state.view_mut(view) {
            view.material = material;
        }
    }

    fn set_cull_mode(&self, view: RawHandle, mode: u32) {
        if let Some(view) = self.enter().view_mut(view) {
            view.cull_mode = mode;
        }
    }

    fn set_wireframe(&self, view: RawHandle, wireframe: bool) {
        if let Some(view) = self.enter().view_mut(view) {
            view.wireframe = wireframe;
        }
    }

    fn set_ambient_light(&self, view: RawHandle, rgba: [f32; 4]) {
        if let Some(view) = self.enter().view_mut(view) {
            view.ambient = rgba;
        }
    }

    fn set_point_light(&self, view: RawHandle, index: u32, light: [f32; 8]) -> bool {
        let mut state = self.enter();
        match state.view_mut(view) {
            Some(view) if index < MAX_POINT_LIGHTS => {
                view.lights[index as usize] = Some(light);
                true
            }
            _ => false,
        }
    }

    fn set_diffuse_color(&self, material: RawHandle, rgba: [f32; 4]) {
        if let Some(material) = self.enter().material_mut(material) {
            material.diffuse = rgba;
        }
    }

    fn set_specular_color(&self, material: RawHandle, enabled: bool, rgba: [f32; 4]) {
        if let Some(material) = self.enter().material_mut(material) {
            material.specular = enabled.then_some(rgba);
        }
    }

    fn set_map(&self, material: RawHandle, map_type: u32, texture: RawHandle) -> bool {
        let mut state = self.enter();
        if map_type > 3 || !state.is_optional(texture, HandleKind::Texture) {
            return false;
        }
        match state.material_mut(material) {
            Some(material) => {
                bind(&mut material.maps, map_type, texture);
                true
            }
            None => false,
        }
    }

    fn present(&self, swap_chain: RawHandle) -> bool {
        match self.enter().objects.get_mut(&swap_chain) {
            Some(SimObject::SwapChain { presents }) => {
                *presents += 1;
                true
            }
            _ => false,
        }
    }

    fn resize_swap_chain(&self, swap_chain: RawHandle, width: u32, height: u32) -> bool {
        let state = self.enter();
        let live = matches!(
            state.objects.get(&swap_chain),
            Some(SimObject::SwapChain { .. })
        );
        live && width > 0 && height > 0
    }
}

fn set_constants(state: &mut SimState, shader: RawHandle, name: &str, bits: &[u32]) -> bool {
    let Some(SimObject::Shader(constants)) = state.objects.get_mut(&shader) else {
        return false;
    };
    match constants.iter_mut().find(|constant| constant.name == name) {
        Some(constant) if bits.len() <= constant.count => {
            constant.bits = SmallVec::from_slice(bits);
            true
        }
        Some(constant) => {
            log::debug!(
                "sim: {} values for constant {name} of {}",
                bits.len(),
                constant.count
            );
            false
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_process_unique() {
        let a = SimBackend::new();
        let b = SimBackend::new();
        let x = a.create_device(0).unwrap();
        let y = b.create_device(0).unwrap();
        assert_ne!(x, y);
        assert!(!x.is_none());
    }

    #[test]
    fn unknown_release_counts_as_double() {
        let sim = SimBackend::new();
        let device = sim.create_device(0).unwrap();
        sim.release(HandleKind::Device, device);
        sim.release(HandleKind::Device, device);
        assert_eq!(sim.release_count(device), 2);
        assert_eq!(sim.double_releases(), 1);
    }

    #[test]
    fn rejected_formats() {
        let sim = SimBackend::new();
        let device = sim.create_device(0).unwrap();
        sim.reject_format(PixelFormat::FloatXyzw);
        assert!(!sim.check_format_support(device, 2, 0));
        assert!(sim.check_format_support(device, 87, 0));
        assert_eq!(
            sim.create_texture(device, 4, 4, 2, 0),
            Err(Status::DXGI_ERROR_UNSUPPORTED)
        );
        assert_eq!(
            sim.create_texture(RawHandle::NONE, 4, 4, 87, 0),
            Err(Status::E_INVALIDARG)
        );
    }

    #[test]
    fn shader_bytecode_must_declare_constants() {
        let sim = SimBackend::new();
        let device = sim.create_device(0).unwrap();
        assert_eq!(sim.create_shader(device, b""), Err(Status::E_INVALIDARG));
        assert_eq!(sim.create_shader(device, b"color"), Err(Status::E_INVALIDARG));
        assert_eq!(
            sim.create_shader(device, &[0xff, 0xfe]),
            Err(Status::E_INVALIDARG)
        );
        assert!(sim.create_shader(device, b" color : 4 \n\nscale:1").is_ok());
    }

    #[test]
    fn texture_rows() {
        let sim = SimBackend::new();
        let device = sim.create_device(0).unwrap();
        let texture = sim.create_texture(device, 3, 2, 61, 0).unwrap();
        assert!(sim.update_texture(texture, [1, 0, 2, 2], 0, &[1, 2, 3, 4]));
        assert_eq!(sim.texture_pixels(texture).unwrap(), [0, 1, 2, 0, 3, 4]);
        assert!(!sim.update_texture(texture, [2, 0, 2, 1], 0, &[1, 2]));
        assert!(!sim.update_texture(texture, [0, 0, 1, 1], 0, &[1, 2]));
    }
}
