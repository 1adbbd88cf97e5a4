use std::cell::RefCell;
use std::rc::Rc;

use super::*;

struct CountingDecoder {
    calls: Rc<RefCell<Vec<(u64, u32)>>>,
}

impl FrameDecoder for CountingDecoder {
    fn decode_batch(
        &mut self,
        info: &VideoInfo,
        start: u64,
        count: u32,
    ) -> TypemotionResult<Vec<Vec<u8>>> {
        self.calls.borrow_mut().push((start, count));
        Ok((0..count)
            .map(|i| vec![(start + u64::from(i)) as u8; info.frame_len()])
            .collect())
    }
}

fn info(frame_count: u64) -> VideoInfo {
    VideoInfo {
        path: PathBuf::from("bg.mp4"),
        width: 2,
        height: 2,
        fps: 10.0,
        frame_count,
    }
}

fn video(frame_count: u64, prefetch: u32) -> (VideoBackground, Rc<RefCell<Vec<(u64, u32)>>>) {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let decoder = CountingDecoder {
        calls: Rc::clone(&calls),
    };
    (
        VideoBackground::with_decoder(info(frame_count), Box::new(decoder), prefetch, 8),
        calls,
    )
}

#[test]
fn frame_index_floors_and_bounds() {
    let i = info(20);
    assert_eq!(i.frame_index(0.0), Some(0));
    assert_eq!(i.frame_index(0.19), Some(1));
    assert_eq!(i.frame_index(1.95), Some(19));
    assert_eq!(i.frame_index(2.0), None);
    assert_eq!(i.frame_index(-0.1), None);
    assert_eq!(i.frame_index(f64::NAN), None);
}

#[test]
fn sequential_reads_decode_once_per_batch() {
    let (mut bg, calls) = video(100, 4);
    for i in 0..8 {
        let f = bg.frame_at(f64::from(i) / 10.0).unwrap().unwrap();
        assert_eq!(f.data[0], i as u8);
    }
    assert_eq!(*calls.borrow(), vec![(0, 4), (4, 4)]);
}

#[test]
fn batch_is_clipped_at_end_of_video() {
    let (mut bg, calls) = video(6, 4);
    assert!(bg.frame_at(0.5).unwrap().is_some());
    assert_eq!(*calls.borrow(), vec![(5, 1)]);
    assert!(bg.frame_at(0.6).unwrap().is_none());
    assert!(bg.frame_at(100.0).unwrap().is_none());
}

#[test]
fn resize_matches_target() {
    let f = FrameRGBA::new(2, 2, vec![200; 16]).unwrap();
    let target = Resolution {
        width: 4,
        height: 3,
    };
    let out = resize_frame(f.clone(), target).unwrap();
    assert_eq!(out.resolution(), target);
    assert!(out.data.iter().all(|&v| v == 200));

    let same = resize_frame(f.clone(), f.resolution()).unwrap();
    assert_eq!(same, f);
}

#[test]
fn split_frames_rejects_partial_frames() {
    assert_eq!(split_frames(&[1; 32], 16, 8).unwrap().len(), 2);
    assert_eq!(split_frames(&[1; 32], 16, 1).unwrap().len(), 1);
    assert!(split_frames(&[1; 20], 16, 8).is_err());
    assert!(split_frames(&[], 0, 8).is_err());
}

#[test]
fn probe_json_uses_nb_frames_or_duration() {
    let json = br#"{
        "streams": [
            {"codec_type": "audio"},
            {"codec_type": "video", "width": 1280, "height": 720, "r_frame_rate": "30000/1001", "nb_frames": "300"}
        ],
        "format": {"duration": "10.01"}
    }"#;
    let i = parse_probe_json(Path::new("a.mp4"), json).unwrap();
    assert_eq!((i.width, i.height, i.frame_count), (1280, 720, 300));
    assert!((i.fps - 29.97).abs() < 0.01);

    let json = br#"{
        "streams": [{"codec_type": "video", "width": 8, "height": 8, "r_frame_rate": "25/1"}],
        "format": {"duration": "2.0"}
    }"#;
    assert_eq!(
        parse_probe_json(Path::new("b.webm"), json).unwrap().frame_count,
        50
    );

    let json = br#"{"streams": [{"codec_type": "audio"}]}"#;
    assert!(matches!(
        parse_probe_json(Path::new("c.mp3"), json),
        Err(TypemotionError::Encoding(_))
    ));
}

#[test]
fn image_background_is_constant() {
    let mut png = Vec::new();
    image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]))
        .write_to(
            &mut std::io::Cursor::new(&mut png),
            image::ImageFormat::Png,
        )
        .unwrap();
    let mut bg = ImageBackground::from_bytes(&png).unwrap();
    let f = bg.frame_at(12.5).unwrap().unwrap();
    assert_eq!(f.pixel(2, 1), Some([1, 2, 3, 255]));
    assert!(bg.frame_at(-1.0).unwrap().is_none());
}
