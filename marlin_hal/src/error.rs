// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Status codes returned across the native boundary.
//!
//! These follow the HRESULT convention of the D3D12/DXGI stack: a negative
//! value is a failure, anything else is success.

use core::fmt;

/// A native status code.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(pub i32);

impl Status {
    pub const OK: Self = Self(0);
    pub const E_FAIL: Self = Self(0x8000_4005_u32 as i32);
    pub const E_INVALIDARG: Self = Self(0x8007_0057_u32 as i32);
    pub const E_OUTOFMEMORY: Self = Self(0x8007_000e_u32 as i32);
    pub const DXGI_ERROR_INVALID_CALL: Self = Self(0x887a_0001_u32 as i32);
    pub const DXGI_ERROR_NOT_FOUND: Self = Self(0x887a_0002_u32 as i32);
    pub const DXGI_ERROR_UNSUPPORTED: Self = Self(0x887a_0004_u32 as i32);
    pub const DXGI_ERROR_DEVICE_REMOVED: Self = Self(0x887a_0005_u32 as i32);
    pub const DXGI_ERROR_DEVICE_HUNG: Self = Self(0x887a_0006_u32 as i32);

    #[inline]
    pub fn is_success(self) -> bool {
        self.0 >= 0
    }

    /// The symbolic name of codes we're likely to see.
    ///
    /// See <https://docs.microsoft.com/en-us/windows/win32/direct3ddxgi/dxgi-error>
    pub fn name(self) -> Option<&'static str> {
        Some(match self.0 as u32 {
            0 => "S_OK",
            0x8000_4005 => "E_FAIL",
            0x8007_0057 => "E_INVALIDARG",
            0x8007_000e => "E_OUTOFMEMORY",
            0x887a_0001 => "DXGI_ERROR_INVALID_CALL",
            0x887a_0002 => "DXGI_ERROR_NOT_FOUND",
            0x887a_0004 => "DXGI_ERROR_UNSUPPORTED",
            0x887a_0005 => "DXGI_ERROR_DEVICE_REMOVED",
            0x887a_0006 => "DXGI_ERROR_DEVICE_HUNG",
            _ => return None,
        })
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name() {
            write!(f, "{:x} ({})", self.0, name)
        } else {
            write!(f, "{:x}", self.0)
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
