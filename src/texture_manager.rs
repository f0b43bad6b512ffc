use std::collections::HashMap;
use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use thiserror::Error;

/// Errors that can occur during texture generation
#[derive(Error, Debug)]
pub enum TextureGenerationError {
    #[error("Invalid texture dimensions")]
    InvalidDimensions,
}

/// The GPU textures the app keeps alive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// The sketch canvas raster
    Canvas,
    /// Whatever is shown in the output image slot
    Output,
}

impl TextureSlot {
    fn name(self) -> &'static str {
        match self {
            Self::Canvas => "sketch_canvas",
            Self::Output => "output_image",
        }
    }
}

/// Keeps one texture per slot and re-uploads it only when the content version changes
#[derive(Default)]
pub struct TextureManager {
    textures: HashMap<TextureSlot, (u64, TextureHandle)>,
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the texture for `slot`, regenerating it if `version` is newer than what was uploaded
    pub fn get_or_update<F>(
        &mut self,
        slot: TextureSlot,
        version: u64,
        generator: F,
        ctx: &Context,
    ) -> Result<TextureId, TextureGenerationError>
    where
        F: FnOnce() -> Result<ColorImage, TextureGenerationError>,
    {
        if let Some((cached_version, handle)) = self.textures.get(&slot) {
            if *cached_version == version {
                return Ok(handle.id());
            }
        }

        let image = generator()?;
        if image.width() == 0 || image.height() == 0 {
            return Err(TextureGenerationError::InvalidDimensions);
        }

        match self.textures.get_mut(&slot) {
            Some((cached_version, handle)) => {
                handle.set(image, TextureOptions::LINEAR);
                *cached_version = version;
                Ok(handle.id())
            }
            None => {
                let handle = ctx.load_texture(slot.name(), image, TextureOptions::LINEAR);
                let id = handle.id();
                self.textures.insert(slot, (version, handle));
                Ok(id)
            }
        }
    }

    #[cfg(test)]
    pub fn cached_version(&self, slot: TextureSlot) -> Option<u64> {
        self.textures.get(&slot).map(|(version, _)| *version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn white() -> Result<ColorImage, TextureGenerationError> {
        Ok(ColorImage::new([10, 10], egui::Color32::WHITE))
    }

    #[test]
    fn test_same_version_hits_cache() {
        let ctx = Context::default();
        let mut manager = TextureManager::new();
        let calls = Cell::new(0);
        let generator = || {
            calls.set(calls.get() + 1);
            white()
        };

        let first = manager.get_or_update(TextureSlot::Canvas, 1, generator, &ctx).unwrap();
        let second = manager
            .get_or_update(TextureSlot::Canvas, 1, || panic!("should be cached"), &ctx)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_new_version_updates_in_place() {
        let ctx = Context::default();
        let mut manager = TextureManager::new();

        let first = manager.get_or_update(TextureSlot::Output, 1, white, &ctx).unwrap();
        let second = manager.get_or_update(TextureSlot::Output, 2, white, &ctx).unwrap();

        assert_eq!(first, second);
        assert_eq!(manager.cached_version(TextureSlot::Output), Some(2));
    }

    #[test]
    fn test_empty_images_are_rejected() {
        let ctx = Context::default();
        let mut manager = TextureManager::new();
        let result = manager.get_or_update(
            TextureSlot::Canvas,
            1,
            || Ok(ColorImage::new([0, 0], egui::Color32::WHITE)),
            &ctx,
        );
        assert!(matches!(result, Err(TextureGenerationError::InvalidDimensions)));
    }

    #[test]
    fn test_slots_are_cached_independently() {
        let ctx = Context::default();
        let mut manager = TextureManager::new();
        manager.get_or_update(TextureSlot::Canvas, 3, white, &ctx).unwrap();
        assert_eq!(manager.cached_version(TextureSlot::Canvas), Some(3));
        assert_eq!(manager.cached_version(TextureSlot::Output), None);
    }
}
