use std::path::Path;

/// Class names indexed by class id, used when the detector omits them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelTable {
    names: Vec<String>,
}

impl LabelTable {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Reads a JSON array of class names.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read labels {}: {e}", path.display()))?;
        let names: Vec<String> = serde_json::from_str(&text)
            .map_err(|e| format!("Invalid labels {}: {e}", path.display()))?;
        Ok(Self::new(names))
    }

    pub fn get(&self, class_id: i32) -> Option<&str> {
        usize::try_from(class_id)
            .ok()
            .and_then(|i| self.names.get(i))
            .map(String::as_str)
    }

    /// Detector-supplied name first, then the table, then `cls <id>`.
    pub fn resolve(&self, class_name: Option<&str>, class_id: i32) -> String {
        class_name
            .or_else(|| self.get(class_id))
            .map(str::to_string)
            .unwrap_or_else(|| format!("cls {class_id}"))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// `"<label> (0.87)"`.
pub fn caption(label: &str, score: f64) -> String {
    format!("{label} ({score:.2})")
}
