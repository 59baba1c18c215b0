use std::io::Write;

use serde::Serialize;

use crate::render::domain::drawing_surface::DrawingSurface;
use crate::render::domain::scene::RenderScene;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TrackRecord<'a> {
    id: u32,
    class_id: i32,
    #[serde(rename = "box")]
    bbox: [f64; 4],
    color: String,
    label: &'a str,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
enum Record<'a> {
    #[serde(rename_all = "camelCase")]
    Scene {
        frame: usize,
        viewport: [f64; 2],
        tracks: Vec<TrackRecord<'a>>,
        hands: &'a [Vec<(f64, f64)>],
    },
    Clear,
    #[serde(rename_all = "camelCase")]
    ConnectionFailed { message: &'a str },
}

/// Writes one JSON object per render tick to any byte sink.
///
/// Lets another process (or a test) composite the overlay:
/// `{"event":"scene","frame":3,"viewport":[w,h],"tracks":[...],"hands":[...]}`.
pub struct JsonLinesSurface {
    out: Box<dyn Write + Send>,
}

impl JsonLinesSurface {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    fn write_record(&mut self, record: &Record<'_>) -> Result<(), Box<dyn std::error::Error>> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

impl DrawingSurface for JsonLinesSurface {
    fn draw(&mut self, scene: &RenderScene) -> Result<(), Box<dyn std::error::Error>> {
        let tracks = scene
            .items
            .iter()
            .map(|item| TrackRecord {
                id: item.track_id,
                class_id: item.class_id,
                bbox: [item.bbox.x, item.bbox.y, item.bbox.width, item.bbox.height],
                color: item.color.to_hex(),
                label: &item.label,
            })
            .collect();
        self.write_record(&Record::Scene {
            frame: scene.frame_index,
            viewport: [scene.viewport_width, scene.viewport_height],
            tracks,
            hands: &scene.hands,
        })
    }

    fn clear(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.write_record(&Record::Clear)
    }

    fn connection_failed(&mut self, message: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.write_record(&Record::ConnectionFailed { message })
    }
}
