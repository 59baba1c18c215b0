use crate::render::domain::label_table::{caption, LabelTable};
use crate::render::domain::viewport::Viewport;
use crate::shared::color::{color_for_class, Hsl};
use crate::shared::landmarks::LandmarkSet;
use crate::shared::region::Region;
use crate::tracking::domain::track::Track;

/// One smoothed track, ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderItem {
    pub track_id: u32,
    pub class_id: i32,
    /// Viewport coordinates.
    pub bbox: Region,
    pub color: Hsl,
    pub label: String,
}

/// Everything the drawing surface needs for one render tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderScene {
    pub frame_index: usize,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub items: Vec<RenderItem>,
    /// Hand keypoints in viewport coordinates, one list per hand.
    pub hands: Vec<Vec<(f64, f64)>>,
}

pub struct SceneInput<'a> {
    pub frame_index: usize,
    pub frame_width: u32,
    pub frame_height: u32,
    pub tracks: &'a [Track],
    pub hands: &'a [LandmarkSet],
}

pub fn build_scene(input: &SceneInput<'_>, viewport: &Viewport, labels: &LabelTable) -> RenderScene {
    let (fw, fh) = (input.frame_width, input.frame_height);
    let items = input
        .tracks
        .iter()
        .map(|track| {
            let label = labels.resolve(track.class_name.as_deref(), track.class_id);
            RenderItem {
                track_id: track.id,
                class_id: track.class_id,
                bbox: viewport.project(fw, fh, &track.display),
                color: color_for_class(track.class_id),
                label: caption(&label, track.score),
            }
        })
        .collect();
    let hands = input
        .hands
        .iter()
        .map(|hand| {
            hand.iter()
                .map(|p| viewport.project_normalized(fw, fh, p.x, p.y))
                .collect()
        })
        .collect();

    RenderScene {
        frame_index: input.frame_index,
        viewport_width: viewport.width,
        viewport_height: viewport.height,
        items,
        hands,
    }
}
