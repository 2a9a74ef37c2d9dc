// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel formats, usages and the pixel buffers passed to texture calls.

/// Pixel formats understood by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 32-bit premultiplied ARGB, one `u32` per pixel.
    IntArgbPre,
    /// Premultiplied BGRA bytes.
    ByteBgraPre,
    /// Packed RGB bytes, no alpha.
    ByteRgb,
    /// One byte of luminance.
    ByteGray,
    /// One byte of coverage.
    ByteAlpha,
    /// Four `f32` components.
    FloatXyzw,
    /// Planar YCbCr 4:2:0 video frames.
    MultiYCbCr420,
}

impl PixelFormat {
    /// The backend format code (DXGI numbering), if the backend has one.
    pub fn backend_code(self) -> Option<u32> {
        match self {
            // DXGI_FORMAT_B8G8R8A8_UNORM; little-endian ARGB ints are BGRA
            // bytes in memory.
            Self::IntArgbPre | Self::ByteBgraPre => Some(87),
            // DXGI_FORMAT_R8_UNORM
            Self::ByteGray => Some(61),
            // DXGI_FORMAT_A8_UNORM
            Self::ByteAlpha => Some(65),
            // DXGI_FORMAT_R32G32B32A32_FLOAT
            Self::FloatXyzw => Some(2),
            Self::ByteRgb | Self::MultiYCbCr420 => None,
        }
    }

    /// Bytes per pixel, or `None` for planar formats.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            Self::IntArgbPre | Self::ByteBgraPre => Some(4),
            Self::ByteRgb => Some(3),
            Self::ByteGray | Self::ByteAlpha => Some(1),
            Self::FloatXyzw => Some(16),
            Self::MultiYCbCr420 => None,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::FloatXyzw)
    }

    /// Whether a buffer of `kind` can carry pixels of this format.
    ///
    /// Byte buffers carry any packed format. Int buffers carry 4-byte integer
    /// formats, one element per pixel. Float buffers carry float formats.
    pub fn accepts(self, kind: BufferKind) -> bool {
        let Some(bpp) = self.bytes_per_pixel() else {
            return false;
        };
        match kind {
            BufferKind::Bytes => true,
            BufferKind::Ints => bpp == 4 && !self.is_float(),
            BufferKind::Floats => self.is_float(),
        }
    }
}

/// How a texture will be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TextureUsage {
    /// Written once, sampled often.
    Static = 0,
    /// Updated from the CPU every few frames.
    Dynamic = 1,
    RenderTarget = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CullMode {
    None = 0,
    Back = 1,
    Front = 2,
}

/// The texture slot a material map binds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MapType {
    Diffuse = 0,
    Specular = 1,
    Bump = 2,
    SelfIllumination = 3,
}

/// The element type of a pixel buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BufferKind {
    Bytes = 0,
    Ints = 1,
    Floats = 2,
}

/// A rectangle of texels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The region covering a whole `width` by `height` texture.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Whether the region is non-empty and lies inside the bounds.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|r| r <= width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= height)
    }

    pub fn texels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub(crate) fn to_raw(self) -> [u32; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

/// Pixels to upload.
#[derive(Clone, Copy, Debug)]
pub enum PixelBuffer<'a> {
    Bytes(&'a [u8]),
    Ints(&'a [u32]),
    Floats(&'a [f32]),
}

impl PixelBuffer<'_> {
    pub fn kind(&self) -> BufferKind {
        match self {
            Self::Bytes(_) => BufferKind::Bytes,
            Self::Ints(_) => BufferKind::Ints,
            Self::Floats(_) => BufferKind::Floats,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Bytes(data) => data,
            Self::Ints(data) => bytemuck::cast_slice(data),
            Self::Floats(data) => bytemuck::cast_slice(data),
        }
    }
}

/// Destination for read-back pixels.
#[derive(Debug)]
pub enum PixelBufferMut<'a> {
    Bytes(&'a mut [u8]),
    Ints(&'a mut [u32]),
    Floats(&'a mut [f32]),
}

impl PixelBufferMut<'_> {
    pub fn kind(&self) -> BufferKind {
        match self {
            Self::Bytes(_) => BufferKind::Bytes,
            Self::Ints(_) => BufferKind::Ints,
            Self::Floats(_) => BufferKind::Floats,
        }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self {
            Self::Bytes(data) => data,
            Self::Ints(data) => bytemuck::cast_slice_mut(data),
            Self::Floats(data) => bytemuck::cast_slice_mut(data),
        }
    }
}
