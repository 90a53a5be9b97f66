// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
#![cfg(not(target_arch = "wasm32"))]

use edge_viewer::FrameBuffer;
use edge_viewer::capture::LumaPlane;
use edge_viewer::frame::Geometry;
use proptest::prelude::*;

fn frames() -> impl Strategy<Value = (u32, u32, Vec<u8>)> {
    (1u32..=24, 1u32..=24).prop_flat_map(|(width, height)| {
        let len = width as usize * height as usize * 4;
        (Just(width), Just(height), proptest::collection::vec(any::<u8>(), len))
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn take_returns_exactly_what_was_published(sequence in proptest::collection::vec(frames(), 1..6)) {
        let fb = FrameBuffer::new();
        for (width, height, pixels) in &sequence {
            fb.publish(pixels, *width, *height).unwrap();
        }
        //only the last publish survives
        let (width, height, pixels) = sequence.last().unwrap();
        let view = fb.try_take_latest().unwrap();
        prop_assert_eq!(view.geometry(), Geometry::new(*width, *height));
        prop_assert_eq!(view.pixels(), pixels.as_slice());
        drop(view);
        prop_assert!(fb.try_take_latest().is_none());
    }

    #[test]
    fn interleaved_takes_see_every_frame(sequence in proptest::collection::vec(frames(), 1..6)) {
        let fb = FrameBuffer::new();
        for (width, height, pixels) in &sequence {
            fb.publish(pixels, *width, *height).unwrap();
            let view = fb.try_take_latest().unwrap();
            prop_assert_eq!(view.geometry(), Geometry::new(*width, *height));
            prop_assert_eq!(view.pixels(), pixels.as_slice());
        }
        prop_assert_eq!(fb.stats().dropped, 0);
    }

    #[test]
    fn stride_compaction_keeps_visible_bytes(
        width in 1u32..=16,
        height in 1u32..=16,
        padding in 0usize..=8,
        seed in any::<u8>(),
    ) {
        let stride = width as usize + padding;
        let data: Vec<u8> = (0..stride * height as usize).map(|i| (i as u8).wrapping_add(seed)).collect();
        let plane = LumaPlane { data: &data, width, height, row_stride: stride };
        let packed = plane.copy_packed().unwrap();
        prop_assert_eq!(packed.len(), width as usize * height as usize);
        for y in 0..height as usize {
            let row = &packed[y * width as usize..(y + 1) * width as usize];
            prop_assert_eq!(row, &data[y * stride..y * stride + width as usize]);
        }
    }
}
