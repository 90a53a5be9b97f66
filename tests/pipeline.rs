// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Producer, frame buffer and render loop together, drawing on the CPU.

use edge_viewer::ViewerSession;
use edge_viewer::capture::{LumaFrame, LumaToRgba, ProcessError, Processor, ProducerError};
use edge_viewer::frame::{Frame, Geometry};
use edge_viewer::images::software::SoftwareSurface;
use edge_viewer::images::{DrawOutcome, RenderConfig, TexCoordOrientation};
use std::time::{Duration, Instant};

fn surface(viewport: Geometry, orientation: TexCoordOrientation) -> SoftwareSurface {
    SoftwareSurface::new(
        viewport,
        RenderConfig {
            orientation,
            ..RenderConfig::default()
        },
    )
}

//luma ramp: row y is filled with y * 10
fn rows(width: u32, height: u32) -> LumaFrame {
    let data = (0..height).flat_map(|y| std::iter::repeat_n(y as u8 * 10, width as usize)).collect();
    LumaFrame::packed(data, width, height)
}

#[test]
fn frame_travels_from_sensor_to_viewport() {
    let session = ViewerSession::new();
    let mut producer = session.producer(LumaToRgba);
    let mut render_loop = session.render_loop(surface(Geometry::new(4, 3), TexCoordOrientation::Upright));

    producer.on_image_available(rows(4, 3)).unwrap();
    assert!(session.render_request().is_pending());
    assert_eq!(render_loop.draw_frame().unwrap(), DrawOutcome::Drew(Geometry::new(4, 3)));

    let viewport = render_loop.gpu().viewport();
    assert_eq!(viewport.pixel(0, 0), Some([0, 0, 0, 255]));
    assert_eq!(viewport.pixel(3, 2), Some([20, 20, 20, 255]));
}

#[test]
fn flipped_orientation_draws_first_row_at_bottom() {
    let session = ViewerSession::new();
    let mut producer = session.producer(LumaToRgba);
    let mut render_loop = session.render_loop(surface(Geometry::new(4, 3), TexCoordOrientation::FlipVertical));

    producer.on_image_available(rows(4, 3)).unwrap();
    render_loop.draw_frame().unwrap();
    let viewport = render_loop.gpu().viewport();
    assert_eq!(viewport.pixel(0, 0), Some([20, 20, 20, 255]));
    assert_eq!(viewport.pixel(0, 2), Some([0, 0, 0, 255]));
}

#[test]
fn nothing_pending_means_no_gpu_work() {
    let session = ViewerSession::new();
    let mut render_loop = session.render_loop(surface(Geometry::new(2, 2), TexCoordOrientation::Upright));
    for _ in 0..5 {
        assert_eq!(render_loop.draw_frame().unwrap(), DrawOutcome::Skipped);
    }
    let gpu = render_loop.gpu();
    assert_eq!((gpu.resizes(), gpu.uploads(), gpu.draws()), (0, 0, 0));
    assert_eq!(render_loop.reporter().skipped(), 5);
}

#[test]
fn texture_is_resized_only_when_geometry_changes() {
    let session = ViewerSession::new();
    let mut producer = session.producer(LumaToRgba);
    let mut render_loop = session.render_loop(surface(Geometry::new(8, 8), TexCoordOrientation::Upright));

    let sizes = [(4, 4), (4, 4), (4, 4), (2, 6), (2, 6), (4, 4)];
    for (width, height) in sizes {
        producer
            .on_image_available(LumaFrame::packed(vec![1; (width * height) as usize], width, height))
            .unwrap();
        render_loop.draw_frame().unwrap();
    }
    let gpu = render_loop.gpu();
    assert_eq!(gpu.resizes(), 3);
    assert_eq!(gpu.uploads(), 6);
    assert_eq!(gpu.draws(), 6);
    assert_eq!(render_loop.texture_geometry(), Some(Geometry::new(4, 4)));
    assert_eq!(gpu.texture_geometry(), Some(Geometry::new(4, 4)));
}

#[test]
fn processing_failure_keeps_last_good_frame_on_screen() {
    let session = ViewerSession::new();
    let mut fail_next = false;
    let mut producer = session.producer(move |luma: &[u8], w: u32, h: u32| {
        if std::mem::replace(&mut fail_next, true) {
            Err(ProcessError::Failed("detector crashed".to_string()))
        } else {
            LumaToRgba.process(luma, w, h)
        }
    });
    let mut render_loop = session.render_loop(surface(Geometry::new(2, 1), TexCoordOrientation::Upright));

    producer.on_image_available(LumaFrame::packed(vec![9, 9], 2, 1)).unwrap();
    render_loop.draw_frame().unwrap();
    let err = producer.on_image_available(LumaFrame::packed(vec![1, 1], 2, 1)).unwrap_err();
    assert!(matches!(err, ProducerError::Processing(_)));
    assert_eq!(render_loop.draw_frame().unwrap(), DrawOutcome::Skipped);
    assert_eq!(render_loop.gpu().viewport().pixel(1, 0), Some([9, 9, 9, 255]));
}

#[test]
fn strided_sensor_planes_are_compacted() {
    let session = ViewerSession::new();
    let mut producer = session.producer(LumaToRgba);
    //2x2 visible pixels, 2 bytes of padding per row, last row unpadded
    let image = LumaFrame {
        data: vec![1, 2, 0xEE, 0xEE, 3, 4],
        width: 2,
        height: 2,
        row_stride: 4,
    };
    producer.on_image_available(image).unwrap();
    let frame = session.frame_buffer().take_latest_copy().unwrap();
    let luma: Vec<u8> = frame.pixels().chunks(4).map(|p| p[0]).collect();
    assert_eq!(luma, [1, 2, 3, 4]);
}

#[test]
fn threaded_session_draws_latest_frame() {
    let session = ViewerSession::new();
    let render = session
        .spawn_render_loop(surface(Geometry::new(4, 4), TexCoordOrientation::Upright))
        .unwrap();
    let mut producer = session.producer(LumaToRgba);
    for value in 1..=50u8 {
        producer.on_image_available(LumaFrame::packed(vec![value; 16], 4, 4)).unwrap();
    }
    drop(producer);

    //wait for the render thread to catch up with the final frame
    let deadline = Instant::now() + Duration::from_secs(10);
    while session.frame_buffer().has_pending() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(1));
    }
    let reporter = render.reporter().clone();
    while reporter.drawn() < session.frame_buffer().stats().taken && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(1));
    }

    let stats = session.shutdown();
    let render_loop = render.join().unwrap();
    assert_eq!(stats.published, 50);
    assert_eq!(stats.taken + stats.dropped, 50);
    assert_eq!(render_loop.reporter().drawn(), stats.taken);
    assert_eq!(render_loop.reporter().last_geometry(), Some(Geometry::new(4, 4)));
    assert_eq!(render_loop.gpu().viewport().pixel(2, 2), Some([50, 50, 50, 255]));
}

#[test]
fn drawn_viewport_can_be_captured_as_png() {
    let session = ViewerSession::new();
    let mut producer = session.producer(LumaToRgba);
    let mut render_loop = session.render_loop(surface(Geometry::new(6, 5), TexCoordOrientation::Upright));
    producer.on_image_available(rows(3, 2)).unwrap();
    render_loop.draw_frame().unwrap();

    let viewport: Frame = render_loop.gpu().viewport();
    let mut png = Vec::new();
    viewport.write_png(&mut png).unwrap();
    let decoder = png::Decoder::new(std::io::Cursor::new(png));
    let reader = decoder.read_info().unwrap();
    assert_eq!((reader.info().width, reader.info().height), (6, 5));
}
