//! Upload form state and client-side validation.
//!
//! File checks run when a file is picked; the full-submission check runs
//! before any remote call is issued. Every rejection carries the exact text
//! shown to the user.

use bytes::Bytes;
use validator::Validate;

use crate::error::CoreError;
use crate::format::{file_extension, ModelFormat, MODEL_EXTENSIONS};
use crate::print::{NewPrint, STATUS_PUBLISHED};
use crate::types::{DbId, Timestamp, UserId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Largest accepted model file (100 MiB).
pub const MAX_MODEL_FILE_BYTES: u64 = 100 * 1024 * 1024;

/// Largest accepted preview image (5 MiB).
pub const MAX_IMAGE_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// Content-type prefix every preview image must carry.
const IMAGE_CONTENT_TYPE_PREFIX: &str = "image/";

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Metadata of a picked file, as reported by the file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    /// Declared MIME type, e.g. `image/png`. May be empty.
    pub content_type: String,
    pub size_bytes: u64,
}

/// A picked file with its contents. Cloning shares the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    info: FileInfo,
    data: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        let data = Bytes::from(data);
        Self {
            info: FileInfo {
                name: name.into(),
                content_type: content_type.into(),
                size_bytes: data.len() as u64,
            },
            data,
        }
    }

    pub fn info(&self) -> &FileInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn content_type(&self) -> &str {
        &self.info.content_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.info.size_bytes
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Handle to the contents without copying them.
    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }

    /// Lowercase extension used for the storage object name. Falls back to
    /// the MIME subtype (`image/png` → `png`) when the name has none.
    pub fn storage_extension(&self) -> Option<String> {
        file_extension(&self.info.name)
            .or_else(|| self.info.content_type.split_once('/').map(|(_, sub)| sub))
            .filter(|ext| !ext.is_empty())
            .map(str::to_ascii_lowercase)
    }
}

/// Why a picked file was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FileRejection {
    #[error("Please upload a valid 3D model file (.stl, .obj, .gltf, .glb)")]
    UnsupportedModelType,
    #[error("File size must be less than 100MB")]
    ModelTooLarge,
    #[error("Please upload a valid image file")]
    NotAnImage,
    #[error("Image size must be less than 5MB")]
    ImageTooLarge,
}

impl From<FileRejection> for CoreError {
    fn from(rejection: FileRejection) -> Self {
        CoreError::Validation(rejection.to_string())
    }
}

/// Check a model file: extension first, then size.
pub fn validate_model_file(file: &FileInfo) -> Result<ModelFormat, FileRejection> {
    let format = file_extension(&file.name)
        .map(str::to_ascii_lowercase)
        .filter(|ext| MODEL_EXTENSIONS.contains(&ext.as_str()))
        .and_then(|ext| ModelFormat::from_tag(&ext).ok())
        .ok_or(FileRejection::UnsupportedModelType)?;

    if file.size_bytes > MAX_MODEL_FILE_BYTES {
        return Err(FileRejection::ModelTooLarge);
    }
    Ok(format)
}

/// Check a preview image: content type first, then size.
pub fn validate_image_file(file: &FileInfo) -> Result<(), FileRejection> {
    if !file.content_type.starts_with(IMAGE_CONTENT_TYPE_PREFIX) {
        return Err(FileRejection::NotAnImage);
    }
    if file.size_bytes > MAX_IMAGE_FILE_BYTES {
        return Err(FileRejection::ImageTooLarge);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Optional print settings entered on the form.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct PrintSettings {
    pub material: String,
    #[validate(range(min = 0.0, message = "Print time cannot be negative"))]
    pub print_time_hours: Option<f64>,
    #[validate(range(min = 0.01, message = "Layer height must be at least 0.01mm"))]
    pub layer_height_mm: Option<f64>,
    #[validate(range(min = 0, max = 100, message = "Infill must be between 0 and 100%"))]
    pub infill_percentage: Option<i32>,
    pub supports_required: bool,
}

/// Fields reported in this order when several settings are out of range.
const SETTINGS_FIELDS: &[&str] = &["print_time_hours", "layer_height_mm", "infill_percentage"];

impl PrintSettings {
    fn check(&self) -> Result<(), CoreError> {
        let Err(errors) = self.validate() else {
            return Ok(());
        };
        let field_errors = errors.field_errors();
        let message = SETTINGS_FIELDS
            .iter()
            .filter_map(|field| field_errors.get(*field))
            .flat_map(|errs| errs.iter())
            .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Invalid print settings".to_string());
        Err(CoreError::Validation(message))
    }
}

/// In-memory state of the upload form. Discarded when the user navigates
/// away; nothing is persisted until a successful submit.
#[derive(Debug, Clone, Default)]
pub struct UploadDraft {
    pub title: String,
    pub description: String,
    pub category_id: Option<DbId>,
    pub settings: PrintSettings,
    model: Option<(SelectedFile, ModelFormat)>,
    preview_image: Option<SelectedFile>,
}

impl UploadDraft {
    /// Pick a model file. A rejected file leaves the previous selection in
    /// place.
    pub fn select_model_file(&mut self, file: SelectedFile) -> Result<ModelFormat, FileRejection> {
        let format = validate_model_file(file.info())?;
        self.model = Some((file, format));
        Ok(format)
    }

    /// Pick a preview image. A rejected file leaves the previous selection
    /// in place.
    pub fn select_preview_image(&mut self, file: SelectedFile) -> Result<(), FileRejection> {
        validate_image_file(file.info())?;
        self.preview_image = Some(file);
        Ok(())
    }

    pub fn clear_preview_image(&mut self) {
        self.preview_image = None;
    }

    pub fn model_file(&self) -> Option<&SelectedFile> {
        self.model.as_ref().map(|(file, _)| file)
    }

    pub fn preview_image(&self) -> Option<&SelectedFile> {
        self.preview_image.as_ref()
    }

    /// Full-submission precondition. Checks run in a fixed order (title,
    /// category, model file, preview image, then print settings) and the
    /// first failure is returned.
    pub fn check_ready(&self) -> Result<ReadyUpload<'_>, CoreError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(CoreError::Validation("Title is required".into()));
        }
        let category_id = self
            .category_id
            .ok_or_else(|| CoreError::Validation("Please select a category".into()))?;
        let (model, model_format) = self
            .model
            .as_ref()
            .map(|(file, format)| (file, *format))
            .ok_or_else(|| CoreError::Validation("3D model file is required".into()))?;
        let image = self
            .preview_image
            .as_ref()
            .ok_or_else(|| CoreError::Validation("Preview image is required".into()))?;
        self.settings.check()?;

        Ok(ReadyUpload {
            title,
            description: non_empty_trimmed(&self.description),
            category_id,
            model,
            model_format,
            image,
            settings: &self.settings,
        })
    }
}

/// A draft that passed [`UploadDraft::check_ready`].
#[derive(Debug, Clone, Copy)]
pub struct ReadyUpload<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub category_id: DbId,
    pub model: &'a SelectedFile,
    pub model_format: ModelFormat,
    pub image: &'a SelectedFile,
    pub settings: &'a PrintSettings,
}

impl ReadyUpload<'_> {
    /// Build the `prints` row once both files have public URLs.
    pub fn to_new_print(
        &self,
        user_id: &UserId,
        model_file_url: String,
        preview_image_url: String,
        published_at: Timestamp,
    ) -> NewPrint {
        NewPrint {
            user_id: user_id.clone(),
            title: self.title.to_string(),
            description: self.description.map(str::to_string),
            category_id: self.category_id,
            model_file_url,
            preview_image_url,
            file_format: self.model_format,
            file_size_bytes: self.model.size_bytes(),
            material: non_empty_trimmed(&self.settings.material).map(str::to_string),
            print_time_hours: self.settings.print_time_hours,
            layer_height_mm: self.settings.layer_height_mm,
            infill_percentage: self.settings.infill_percentage,
            supports_required: self.settings.supports_required,
            status: STATUS_PUBLISHED,
            published_at,
        }
    }
}

fn non_empty_trimmed(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn info(name: &str, content_type: &str, size_bytes: u64) -> FileInfo {
        FileInfo {
            name: name.into(),
            content_type: content_type.into(),
            size_bytes,
        }
    }

    fn message(err: CoreError) -> String {
        match err {
            CoreError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn complete_draft() -> UploadDraft {
        let mut draft = UploadDraft {
            title: "  Benchy  ".into(),
            description: "   ".into(),
            category_id: Some(3),
            ..Default::default()
        };
        draft
            .select_model_file(SelectedFile::new("boat.stl", "model/stl", vec![1, 2, 3]))
            .unwrap();
        draft
            .select_preview_image(SelectedFile::new("boat.png", "image/png", vec![9; 16]))
            .unwrap();
        draft
    }

    // -- model files --

    #[test]
    fn model_at_size_limit_passes() {
        let format = validate_model_file(&info("part.STL", "", 104_857_600)).unwrap();
        assert_eq!(format, ModelFormat::Stl);
    }

    #[test]
    fn model_over_size_limit_fails_on_size() {
        assert_eq!(
            validate_model_file(&info("part.STL", "", 104_857_601)),
            Err(FileRejection::ModelTooLarge)
        );
    }

    #[test]
    fn unsupported_extension_fails_regardless_of_size() {
        assert_eq!(
            validate_model_file(&info("part.step", "", 10)),
            Err(FileRejection::UnsupportedModelType)
        );
        assert_eq!(
            validate_model_file(&info("part.step", "", 500 * 1024 * 1024)),
            Err(FileRejection::UnsupportedModelType)
        );
    }

    #[test]
    fn model_without_extension_is_rejected() {
        assert_eq!(
            validate_model_file(&info("stl", "", 10)),
            Err(FileRejection::UnsupportedModelType)
        );
    }

    #[test]
    fn every_supported_extension_passes() {
        for name in ["a.stl", "a.obj", "a.gltf", "a.glb", "a.GlB"] {
            assert!(validate_model_file(&info(name, "", 1)).is_ok(), "{name}");
        }
    }

    // -- images --

    #[test]
    fn image_checks_type_then_size() {
        assert_eq!(validate_image_file(&info("a.png", "image/png", 5_242_880)), Ok(()));
        assert_eq!(
            validate_image_file(&info("a.png", "image/png", 5_242_881)),
            Err(FileRejection::ImageTooLarge)
        );
        assert_eq!(
            validate_image_file(&info("a.pdf", "application/pdf", 10 * 1024 * 1024)),
            Err(FileRejection::NotAnImage)
        );
        assert_eq!(
            validate_image_file(&info("a.png", "", 1)),
            Err(FileRejection::NotAnImage)
        );
    }

    #[test]
    fn rejection_messages_are_user_facing() {
        assert_eq!(
            FileRejection::UnsupportedModelType.to_string(),
            "Please upload a valid 3D model file (.stl, .obj, .gltf, .glb)"
        );
        assert_eq!(FileRejection::ModelTooLarge.to_string(), "File size must be less than 100MB");
        assert_eq!(FileRejection::NotAnImage.to_string(), "Please upload a valid image file");
        assert_eq!(FileRejection::ImageTooLarge.to_string(), "Image size must be less than 5MB");
    }

    // -- draft --

    #[test]
    fn rejected_file_keeps_previous_selection() {
        let mut draft = complete_draft();
        let err = draft.select_model_file(SelectedFile::new("part.step", "", vec![0]));
        assert_eq!(err, Err(FileRejection::UnsupportedModelType));
        assert_eq!(draft.model_file().map(SelectedFile::name), Some("boat.stl"));

        let err = draft.select_preview_image(SelectedFile::new("x.txt", "text/plain", vec![0]));
        assert_eq!(err, Err(FileRejection::NotAnImage));
        assert_eq!(draft.preview_image().map(SelectedFile::name), Some("boat.png"));
    }

    #[test]
    fn clearing_preview_image() {
        let mut draft = complete_draft();
        draft.clear_preview_image();
        assert!(draft.preview_image().is_none());
        assert_eq!(message(draft.check_ready().unwrap_err()), "Preview image is required");
    }

    #[test]
    fn precondition_order_is_title_category_model_image() {
        let empty = UploadDraft::default();
        assert_eq!(message(empty.check_ready().unwrap_err()), "Title is required");

        let mut draft = UploadDraft {
            title: "   ".into(),
            ..Default::default()
        };
        assert_eq!(message(draft.check_ready().unwrap_err()), "Title is required");

        draft.title = "Cube".into();
        assert_eq!(message(draft.check_ready().unwrap_err()), "Please select a category");

        draft.category_id = Some(1);
        assert_eq!(message(draft.check_ready().unwrap_err()), "3D model file is required");

        draft
            .select_model_file(SelectedFile::new("cube.obj", "", vec![1]))
            .unwrap();
        assert_eq!(message(draft.check_ready().unwrap_err()), "Preview image is required");
    }

    #[test]
    fn ready_draft_trims_and_drops_blank_fields() {
        let draft = complete_draft();
        let ready = draft.check_ready().unwrap();
        assert_eq!(ready.title, "Benchy");
        assert_eq!(ready.description, None);
        assert_eq!(ready.category_id, 3);
        assert_eq!(ready.model_format, ModelFormat::Stl);
    }

    #[test]
    fn out_of_range_settings_are_rejected_after_required_fields() {
        let mut draft = complete_draft();
        draft.settings.infill_percentage = Some(120);
        assert_eq!(
            message(draft.check_ready().unwrap_err()),
            "Infill must be between 0 and 100%"
        );

        draft.settings.infill_percentage = Some(20);
        draft.settings.print_time_hours = Some(-1.0);
        draft.settings.layer_height_mm = Some(0.0);
        assert_eq!(message(draft.check_ready().unwrap_err()), "Print time cannot be negative");

        draft.settings.print_time_hours = Some(4.5);
        assert_eq!(
            message(draft.check_ready().unwrap_err()),
            "Layer height must be at least 0.01mm"
        );

        draft.settings.layer_height_mm = Some(0.2);
        assert_matches!(draft.check_ready(), Ok(_));
    }

    #[test]
    fn new_print_row_from_ready_draft() {
        let mut draft = complete_draft();
        draft.description = " A tiny boat ".into();
        draft.settings.material = " PLA ".into();
        draft.settings.supports_required = true;
        let ready = draft.check_ready().unwrap();

        let now = chrono::Utc::now();
        let row = ready.to_new_print(
            &"user-1".to_string(),
            "https://cdn/models/a.stl".into(),
            "https://cdn/images/a.png".into(),
            now,
        );

        assert_eq!(row.user_id, "user-1");
        assert_eq!(row.title, "Benchy");
        assert_eq!(row.description.as_deref(), Some("A tiny boat"));
        assert_eq!(row.material.as_deref(), Some("PLA"));
        assert_eq!(row.file_format, ModelFormat::Stl);
        assert_eq!(row.file_size_bytes, 3);
        assert_eq!(row.status, "published");
        assert!(row.supports_required);
        assert_eq!(row.published_at, now);

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["file_format"], "stl");
        assert!(json["print_time_hours"].is_null());
    }

    #[test]
    fn file_contents_are_shared_not_copied() {
        let file = SelectedFile::new("boat.stl", "model/stl", vec![7; 1024]);
        let handle = file.bytes();
        assert_eq!(handle.as_ptr(), file.data().as_ptr());
        assert_eq!(handle.len(), 1024);
    }

    #[test]
    fn storage_extension_falls_back_to_mime_subtype() {
        let named = SelectedFile::new("Photo.JPG", "image/jpeg", vec![]);
        assert_eq!(named.storage_extension().as_deref(), Some("jpg"));

        let unnamed = SelectedFile::new("clipboard", "image/png", vec![]);
        assert_eq!(unnamed.storage_extension().as_deref(), Some("png"));

        let bare = SelectedFile::new("blob", "", vec![]);
        assert_eq!(bare.storage_extension(), None);
    }
}
