// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use marlin_hal::{
    BufferKind, Color, Device, Error, HandleKind, MapType, PixelBuffer, PixelBufferMut,
    PixelFormat, Region, SimBackend, Status, TextureUsage, Transform3D,
};
use marlin_tests::sim_device;

#[test]
fn rejected_format_check_is_false_not_an_error() {
    let (sim, device) = sim_device().unwrap();
    sim.reject_format(PixelFormat::FloatXyzw);
    let texture = device
        .create_texture(16, 16, PixelFormat::IntArgbPre, TextureUsage::Static)
        .unwrap();
    assert_eq!(texture.format(), PixelFormat::IntArgbPre);
    assert!(!device.check_format_support(PixelFormat::FloatXyzw, TextureUsage::Static));
    assert!(device.check_format_support(PixelFormat::IntArgbPre, TextureUsage::Static));

    // Creating the rejected format anyway is a construction failure.
    let err = device
        .create_texture(16, 16, PixelFormat::FloatXyzw, TextureUsage::Static)
        .unwrap_err();
    assert_eq!(
        err,
        Error::Native {
            call: "create_texture",
            status: Status::DXGI_ERROR_UNSUPPORTED
        }
    );
}

#[test]
fn double_release_makes_one_native_call() {
    let (sim, device) = sim_device().unwrap();
    let texture = device
        .create_texture(4, 4, PixelFormat::ByteAlpha, TextureUsage::Static)
        .unwrap();
    let raw = texture.handle().raw().unwrap();
    assert!(texture.release());
    assert!(!texture.release());
    drop(texture);
    assert_eq!(sim.release_count(raw), 1);

    let device_raw = device.handle().raw().unwrap();
    device.release();
    device.release();
    drop(device);
    assert_eq!(sim.release_count(device_raw), 1);
    assert_eq!(sim.double_releases(), 0);
    assert_eq!(sim.live_handles(), 0);
}

#[test]
fn unsupported_buffers_are_rejected() {
    let (sim, device) = sim_device().unwrap();
    let texture = device
        .create_texture(2, 2, PixelFormat::ByteBgraPre, TextureUsage::Dynamic)
        .unwrap();
    let before = sim.texture_pixels(texture.handle().raw().unwrap()).unwrap();

    let err = texture
        .update(Region::full(2, 2), PixelBuffer::Floats(&[1.0; 16]))
        .unwrap_err();
    assert_eq!(
        err,
        Error::UnsupportedBuffer {
            format: PixelFormat::ByteBgraPre,
            kind: BufferKind::Floats
        }
    );
    let mut out = [0.0_f32; 16];
    assert!(texture
        .read_pixels(Region::full(2, 2), PixelBufferMut::Floats(&mut out))
        .is_err());

    let after = sim.texture_pixels(texture.handle().raw().unwrap()).unwrap();
    assert_eq!(before, after);

    // The same pixels as ints are fine.
    assert!(texture
        .update(Region::full(2, 2), PixelBuffer::Ints(&[u32::MAX; 4]))
        .unwrap());
}

#[test]
fn ownership_is_not_transitive() {
    let (sim, device) = sim_device().unwrap();
    let texture = device
        .create_texture(8, 8, PixelFormat::ByteGray, TextureUsage::Static)
        .unwrap();
    let material = device.create_phong_material().unwrap();
    let mesh = device.create_mesh().unwrap();
    let view = device.create_mesh_view(&mesh).unwrap();
    assert_eq!(sim.live_handles(), 5);

    drop(device);
    assert_eq!(sim.live_handles(), 4);
    assert!(material.set_map(MapType::Diffuse, Some(&texture)));

    drop(view);
    drop(mesh);
    drop(material);
    drop(texture);
    assert_eq!(sim.live_handles(), 0);
    assert_eq!(sim.double_releases(), 0);
}

#[test]
fn absent_resources_map_to_the_null_handle() {
    let (sim, device) = sim_device().unwrap();
    let texture = device
        .create_texture(8, 8, PixelFormat::ByteGray, TextureUsage::Static)
        .unwrap();
    assert!(device.set_texture(2, Some(&texture)));
    assert!(device.set_texture(2, None));
    assert!(device.set_shader(None));
    let state = sim.device(device.handle().raw().unwrap()).unwrap();
    assert!(state.textures.is_empty());
    assert!(state.shader.is_none());
}

#[test]
fn failed_device_creation_propagates() {
    marlin_tests::init_logging();
    let sim = Arc::new(SimBackend::new());
    sim.fail_device_creation(Some(Status::DXGI_ERROR_NOT_FOUND));
    let err = Device::create(sim.clone(), 3).unwrap_err();
    assert!(matches!(err, Error::Native { call: "create_device", .. }));
    assert_eq!(sim.live_handles(), 0);

    sim.fail_device_creation(None);
    let device = Device::create(sim.clone(), 3).unwrap();
    let state = sim.device(device.handle().raw().unwrap()).unwrap();
    assert_eq!(state.adapter, 3);
}

#[test]
fn a_frame_of_draw_calls() {
    let (sim, device) = sim_device().unwrap();
    let target = device
        .create_render_target(320, 240, PixelFormat::IntArgbPre, 4)
        .unwrap();
    let shader = device.create_shader(b"light_dir:3\nexposure:1\n").unwrap();
    let mesh = device.create_mesh().unwrap();
    let vertices = [0.0_f32; marlin_hal::VERTEX_FLOATS * 3];
    assert!(mesh.build_geometry(&vertices, marlin_hal::MeshIndices::U32(&[0, 1, 2])));
    let view = device.create_mesh_view(&mesh).unwrap();

    assert!(device.set_render_target(Some(&target)));
    device.clear(Color::rgba8(0, 0, 0, 255));
    device.set_view_projection(&Transform3D::perspective(500.0), [0.0, 0.0, 0.0]);
    assert!(device.set_shader(Some(&shader)));
    assert!(shader.set_constants_f32("light_dir", &[0.0, -1.0, 0.0]));
    assert!(!shader.set_constants_f32("gamma", &[2.2]));
    for i in 0..3 {
        device.set_world_transform(&Transform3D::translate(i as f32, 0.0, -10.0));
        assert!(device.render_mesh_view(&view));
    }

    let state = sim.device(device.handle().raw().unwrap()).unwrap();
    assert_eq!(state.draws, 3);
    assert_eq!(state.shader, shader.handle().raw().unwrap());
    assert_eq!(state.world, *Transform3D::translate(2.0, 0.0, -10.0).to_row_major());

    let swap_chain = device.create_swap_chain(0xdead_beef, 320, 240).unwrap();
    assert!(swap_chain.present());
    assert_eq!(sim.presents(swap_chain.handle().raw().unwrap()), Some(1));

    // A released handle never reaches the backend again.
    view.release();
    assert!(!device.render_mesh_view(&view));
    assert_eq!(view.handle().kind(), HandleKind::MeshView);
    assert_eq!(
        view.handle().raw(),
        Err(Error::Released(HandleKind::MeshView))
    );
}
