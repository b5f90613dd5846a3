use tracing::{info, warn};

use crate::models::GarmentType;

use super::{Notice, Services, ValidationError};

/// Garment capture: a photo plus the category to file it under.
#[derive(Debug, Default)]
pub struct CaptureScreen {
    photo: Option<Vec<u8>>,
    garment_type: Option<GarmentType>,
}

impl CaptureScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_photo(&mut self, image: Vec<u8>) {
        self.photo = Some(image);
    }

    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }

    pub fn select_type(&mut self, garment: GarmentType) {
        self.garment_type = Some(garment);
    }

    pub fn garment_type(&self) -> Option<GarmentType> {
        self.garment_type
    }

    /// Upload the photo. An expired access token is refreshed once on the
    /// way; the photo is cleared after a successful upload.
    pub async fn submit(&mut self, services: &Services) -> Result<(), Notice> {
        let photo = self
            .photo
            .as_deref()
            .ok_or(Notice::validation(ValidationError::MissingPhoto))?;
        let garment = self
            .garment_type
            .ok_or(Notice::validation(ValidationError::MissingGarmentType))?;

        let api = &*services.api;
        let result = services
            .session
            .call_with_refresh(api, |token| async move {
                api.upload_garment(&token, photo, garment).await
            })
            .await;

        match result {
            Ok(()) => {
                info!(garment = %garment, "Garment uploaded");
                self.photo = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Garment upload failed");
                Err(Notice::from_session("Upload failed", &e, "Please try again."))
            }
        }
    }
}
