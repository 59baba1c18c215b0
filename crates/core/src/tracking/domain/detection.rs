use crate::shared::region::Region;

/// One unassociated detector result, already in source-frame pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub class_id: i32,
    pub score: f64,
    pub bbox: Region,
    pub class_name: Option<String>,
}

impl Detection {
    pub fn new(class_id: i32, score: f64, bbox: Region) -> Self {
        Self {
            class_id,
            score,
            bbox,
            class_name: None,
        }
    }

    pub fn with_class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = Some(name.into());
        self
    }
}
