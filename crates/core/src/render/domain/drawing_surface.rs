use crate::render::domain::scene::RenderScene;

/// Domain interface for whatever composites the overlay.
///
/// Called once per render tick. A surface that can no longer accept output
/// returns an error, which ends the session.
pub trait DrawingSurface: Send {
    fn draw(&mut self, scene: &RenderScene) -> Result<(), Box<dyn std::error::Error>>;

    /// Removes the overlay, e.g. when the session is deactivated.
    fn clear(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    /// User-visible notice, at most once per failed connection episode.
    fn connection_failed(&mut self, _message: &str) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}
