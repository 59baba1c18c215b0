use std::time::Instant;

use crate::capture::domain::frame_encoder::FrameEncoder;
use crate::render::domain::drawing_surface::DrawingSurface;
use crate::render::domain::scene::{build_scene, SceneInput};
use crate::shared::frame::Frame;
use crate::shared::region::Region;
use crate::stream::domain::image_detector::ImageDetector;
use crate::stream::domain::protocol::{parse_reply, remap_detections, DetectRequest, DetectorReply};
use crate::tracking::domain::detection::Detection;
use crate::tracking::domain::track::{Track, TrackIdGenerator};

use super::drive_loop::RenderOptions;

/// Single-image detection: encode whole frame → detect → remap → draw.
///
/// Boxes are drawn as reported, without score filtering or smoothing.
pub struct DetectImageUseCase {
    encoder: Box<dyn FrameEncoder>,
    detector: Box<dyn ImageDetector>,
    surface: Box<dyn DrawingSurface>,
    render: RenderOptions,
    target_width: u32,
}

impl DetectImageUseCase {
    pub fn new(
        encoder: Box<dyn FrameEncoder>,
        detector: Box<dyn ImageDetector>,
        surface: Box<dyn DrawingSurface>,
        render: RenderOptions,
        target_width: u32,
    ) -> Self {
        Self {
            encoder,
            detector,
            surface,
            render,
            target_width,
        }
    }

    /// Detects objects in `frame` and draws them once. Returns the
    /// detections in source pixels.
    pub fn execute(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let whole = Region::new(0.0, 0.0, f64::from(frame.width()), f64::from(frame.height()));
        let encoded = self.encoder.encode(frame, &whole, self.target_width)?;
        log::debug!(
            "Encoded {}x{} image as {}x{} ({} bytes)",
            frame.width(),
            frame.height(),
            encoded.width,
            encoded.height,
            encoded.payload.len()
        );

        let reply = self.detector.detect(&DetectRequest::from_encoded(&encoded))?;
        let detections = match parse_reply(&reply)? {
            DetectorReply::Detections(list) => remap_detections(list, &encoded.transform),
            DetectorReply::Error(message) => {
                return Err(format!("Detector error: {message}").into());
            }
        };

        let now = Instant::now();
        let mut ids = TrackIdGenerator::new();
        let tracks: Vec<Track> = detections
            .iter()
            .map(|d| Track::spawn(ids.next_id(), d, now))
            .collect();
        let scene = build_scene(
            &SceneInput {
                frame_index: frame.index(),
                frame_width: frame.width(),
                frame_height: frame.height(),
                tracks: &tracks,
                hands: &[],
            },
            &self.render.viewport_for(frame),
            &self.render.labels,
        );
        self.surface.draw(&scene)?;

        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use approx::assert_relative_eq;

    use crate::capture::domain::frame_encoder::{CropTransform, EncodeError, EncodedFrame};
    use crate::render::domain::label_table::LabelTable;
    use crate::render::domain::scene::RenderScene;
    use crate::shared::color::color_for_class;

    // --- Stubs ---

    struct StubEncoder {
        calls: Arc<Mutex<Vec<(Region, u32)>>>,
    }

    impl FrameEncoder for StubEncoder {
        fn encode(
            &self,
            _frame: &Frame,
            region: &Region,
            target_width: u32,
        ) -> Result<EncodedFrame, EncodeError> {
            self.calls.lock().unwrap().push((*region, target_width));
            Ok(EncodedFrame {
                payload: vec![0xFF, 0xD8],
                mime_type: "image/jpeg",
                width: target_width,
                height: target_width / 2,
                transform: CropTransform {
                    origin_x: 0.0,
                    origin_y: 0.0,
                    scale: 0.5,
                },
            })
        }
    }

    struct StubDetector {
        reply: String,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl ImageDetector for StubDetector {
        fn detect(&self, request: &DetectRequest) -> Result<String, Box<dyn std::error::Error>> {
            self.requests.lock().unwrap().push(request.image.clone());
            Ok(self.reply.clone())
        }
    }

    struct RecordingSurface {
        scenes: Arc<Mutex<Vec<RenderScene>>>,
    }

    impl DrawingSurface for RecordingSurface {
        fn draw(&mut self, scene: &RenderScene) -> Result<(), Box<dyn std::error::Error>> {
            self.scenes.lock().unwrap().push(scene.clone());
            Ok(())
        }
    }

    struct Harness {
        use_case: DetectImageUseCase,
        encodes: Arc<Mutex<Vec<(Region, u32)>>>,
        requests: Arc<Mutex<Vec<String>>>,
        scenes: Arc<Mutex<Vec<RenderScene>>>,
    }

    fn harness(reply: &str, labels: LabelTable) -> Harness {
        let encodes = Arc::new(Mutex::new(Vec::new()));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let scenes = Arc::new(Mutex::new(Vec::new()));
        let use_case = DetectImageUseCase::new(
            Box::new(StubEncoder {
                calls: encodes.clone(),
            }),
            Box::new(StubDetector {
                reply: reply.to_string(),
                requests: requests.clone(),
            }),
            Box::new(RecordingSurface {
                scenes: scenes.clone(),
            }),
            RenderOptions {
                labels,
                ..RenderOptions::default()
            },
            640,
        );
        Harness {
            use_case,
            encodes,
            requests,
            scenes,
        }
    }

    fn frame() -> Frame {
        Frame::new(vec![0u8; 1280 * 720 * 3], 1280, 720, 0)
    }

    // --- Tests ---

    #[test]
    fn test_encodes_the_whole_frame() {
        let mut h = harness("[]", LabelTable::default());

        let detections = h.use_case.execute(&frame()).unwrap();

        assert!(detections.is_empty());
        assert_eq!(
            *h.encodes.lock().unwrap(),
            vec![(Region::new(0.0, 0.0, 1280.0, 720.0), 640)]
        );
        let requests = h.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("data:image/jpeg;base64,"));
        assert_eq!(h.scenes.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_boxes_map_back_to_source_pixels() {
        let mut h = harness(
            r#"[{"x1":10,"y1":20,"x2":110,"y2":70,"score":0.87,"classId":0}]"#,
            LabelTable::new(vec!["Hand".into()]),
        );

        let detections = h.use_case.execute(&frame()).unwrap();

        assert_eq!(detections.len(), 1);
        let bbox = detections[0].bbox;
        assert_relative_eq!(bbox.x, 20.0);
        assert_relative_eq!(bbox.y, 40.0);
        assert_relative_eq!(bbox.width, 200.0);
        assert_relative_eq!(bbox.height, 100.0);

        let scenes = h.scenes.lock().unwrap();
        let item = &scenes[0].items[0];
        assert_eq!(item.label, "Hand (0.87)");
        assert_eq!(item.color, color_for_class(0));
        assert_relative_eq!(item.bbox.width, 200.0);
        assert_relative_eq!(scenes[0].viewport_width, 1280.0);
    }

    #[test]
    fn test_detector_class_name_wins_over_table() {
        let mut h = harness(
            r#"[{"x1":0,"y1":0,"x2":10,"y2":10,"score":0.5,"classId":0,"className":"palm"},
                {"x1":0,"y1":0,"x2":10,"y2":10,"score":0.5,"classId":7}]"#,
            LabelTable::new(vec!["Hand".into()]),
        );

        h.use_case.execute(&frame()).unwrap();

        let scenes = h.scenes.lock().unwrap();
        let labels: Vec<&str> = scenes[0].items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["palm (0.50)", "cls 7 (0.50)"]);
        assert_eq!(scenes[0].items[1].color, color_for_class(7));
    }

    #[test]
    fn test_error_reply_draws_nothing() {
        let mut h = harness(r#"{"error":"model not loaded"}"#, LabelTable::default());

        let err = h.use_case.execute(&frame()).unwrap_err();

        assert!(err.to_string().contains("model not loaded"));
        assert!(h.scenes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_inverted_boxes_are_not_drawn() {
        let mut h = harness(
            r#"[{"x1":30,"y1":30,"x2":10,"y2":10,"score":0.9,"classId":1}]"#,
            LabelTable::default(),
        );

        let detections = h.use_case.execute(&frame()).unwrap();

        assert!(detections.is_empty());
        assert!(h.scenes.lock().unwrap()[0].items.is_empty());
    }
}
