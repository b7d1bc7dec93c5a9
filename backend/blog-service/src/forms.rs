//! Form payloads and their validation.
//!
//! Each form turns a raw submission into a cleaned input value or a set of
//! field-level errors that the handler renders back alongside the form.

use actix_multipart::form::{bytes::Bytes, text::Text, MultipartForm};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

pub const INVALID_IMAGE_MESSAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

const USERNAME_MAX_CHARS: usize = 150;
const PASSWORD_MIN_CHARS: usize = 8;

/// Machine-readable reason a field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    Required,
    InvalidChoice,
    /// Upload is not a decodable image
    InvalidImage,
    InvalidLength,
    InvalidCharacters,
    Mismatch,
    Duplicate,
    TooWeak,
    InvalidCredentials,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub code: FieldErrorKind,
    pub message: String,
}

/// Errors keyed by field name; `__all__` holds form-wide errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<FieldError>>);

impl FormErrors {
    pub const NON_FIELD: &'static str = "__all__";

    pub fn add(&mut self, field: &str, code: FieldErrorKind, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(FieldError {
            code,
            message: message.into(),
        });
    }

    pub fn single(field: &str, code: FieldErrorKind, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, code, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, name: &str) -> &[FieldError] {
        self.0.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, name: &str, code: FieldErrorKind) -> bool {
        self.field(name).iter().any(|e| e.code == code)
    }

    fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<validator::ValidationErrors> for FormErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut form_errors = FormErrors::default();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                form_errors.add(&field.to_string(), FieldErrorKind::InvalidLength, message);
            }
        }
        form_errors
    }
}

// =====================================================================
// Post form
// =====================================================================

/// Raw multipart submission of the post create/edit form.
#[derive(Debug, MultipartForm)]
pub struct PostUpload {
    pub text: Option<Text<String>>,
    pub group: Option<Text<String>>,
    pub image: Option<Bytes>,
}

/// Image that decoded successfully
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Cleaned post form
#[derive(Debug, Clone)]
pub struct PostInput {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<ImageUpload>,
}

/// Post form fields before cleaning, independent of the transport.
#[derive(Debug, Clone, Default)]
pub struct PostFormData {
    pub text: Option<String>,
    pub group: Option<String>,
    pub image: Option<(Option<String>, Vec<u8>)>,
}

impl From<PostUpload> for PostFormData {
    fn from(upload: PostUpload) -> Self {
        Self {
            text: upload.text.map(Text::into_inner),
            group: upload.group.map(Text::into_inner),
            image: upload
                .image
                .map(|file| (file.file_name, file.data.to_vec())),
        }
    }
}

impl PostFormData {
    /// Values to echo back when the form is re-rendered
    pub fn initial(&self) -> serde_json::Value {
        serde_json::json!({
            "text": self.text.clone().unwrap_or_default(),
            "group": self.group.clone().unwrap_or_default(),
        })
    }

    pub fn clean(self) -> Result<PostInput, FormErrors> {
        let mut errors = FormErrors::default();

        let text = self.text.unwrap_or_default();
        if text.trim().is_empty() {
            errors.add("text", FieldErrorKind::Required, REQUIRED_MESSAGE);
        }

        let group_id = match self.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("group", FieldErrorKind::InvalidChoice, INVALID_CHOICE_MESSAGE);
                    None
                }
            },
        };

        let image = match self.image {
            // Browsers submit an empty part when no file was picked
            Some((_, bytes)) if bytes.is_empty() => None,
            Some((file_name, bytes)) => {
                if image::load_from_memory(&bytes).is_ok() {
                    Some(ImageUpload {
                        file_name: file_name.unwrap_or_else(|| "upload".to_string()),
                        bytes,
                    })
                } else {
                    errors.add("image", FieldErrorKind::InvalidImage, INVALID_IMAGE_MESSAGE);
                    None
                }
            }
            None => None,
        };

        errors.into_result(PostInput {
            text,
            group_id,
            image,
        })
    }
}

// =====================================================================
// Comment form
// =====================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPayload {
    #[serde(default)]
    pub text: String,
}

impl CommentPayload {
    pub fn clean(self) -> Result<String, FormErrors> {
        if self.text.trim().is_empty() {
            Err(FormErrors::single("text", FieldErrorKind::Required, REQUIRED_MESSAGE))
        } else {
            Ok(self.text)
        }
    }
}

// =====================================================================
// Account forms
// =====================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignupPayload {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 150,
        message = "Username must be between 1 and 150 characters."
    ))]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

/// Cleaned sign-up form
#[derive(Debug, Clone)]
pub struct SignupInput {
    pub username: String,
    pub password: String,
}

impl SignupPayload {
    pub fn clean(self) -> Result<SignupInput, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::default(),
            Err(e) => FormErrors::from(e),
        };

        let username = self.username.trim().to_string();
        if username.chars().count() <= USERNAME_MAX_CHARS
            && !username.is_empty()
            && !username
                .chars()
                .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
        {
            errors.add(
                "username",
                FieldErrorKind::InvalidCharacters,
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            errors.add(
                "password",
                FieldErrorKind::TooWeak,
                "This password is too short. It must contain at least 8 characters.",
            );
        } else if self.password.chars().all(|c| c.is_ascii_digit()) {
            errors.add(
                "password",
                FieldErrorKind::TooWeak,
                "This password is entirely numeric.",
            );
        }

        if self.password != self.password_confirm {
            errors.add(
                "password_confirm",
                FieldErrorKind::Mismatch,
                "The two password fields didn't match.",
            );
        }

        errors.into_result(SignupInput {
            username,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// Field names and current values a client needs to draw a form
pub fn form_context(
    fields: &[&str],
    initial: serde_json::Value,
    errors: &FormErrors,
) -> serde_json::Value {
    serde_json::json!({
        "fields": fields,
        "initial": initial,
        "errors": errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(image::RgbImage::new(2, 2))
            .write_to(&mut buf, image::ImageOutputFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn post_form_requires_text() {
        let errors = PostFormData {
            text: Some("   ".into()),
            ..Default::default()
        }
        .clean()
        .unwrap_err();
        assert!(errors.has("text", FieldErrorKind::Required));
    }

    #[test]
    fn post_form_accepts_optional_group_and_image() {
        let input = PostFormData {
            text: Some("hello".into()),
            group: Some("7".into()),
            image: Some((Some("cat.png".into()), png_bytes())),
        }
        .clean()
        .unwrap();

        assert_eq!(input.group_id, Some(7));
        assert_eq!(input.image.unwrap().file_name, "cat.png");
    }

    #[test]
    fn post_form_empty_group_means_none() {
        let input = PostFormData {
            text: Some("hello".into()),
            group: Some(String::new()),
            image: Some((Some(String::new()), Vec::new())),
        }
        .clean()
        .unwrap();
        assert!(input.group_id.is_none());
        assert!(input.image.is_none());
    }

    #[test]
    fn post_form_rejects_non_image_upload() {
        let errors = PostFormData {
            text: Some("hello".into()),
            group: Some("abc".into()),
            image: Some((Some("small.aac".into()), b"GIF89a\x02\x00".to_vec())),
        }
        .clean()
        .unwrap_err();

        assert!(errors.has("image", FieldErrorKind::InvalidImage));
        assert_eq!(errors.field("image")[0].message, INVALID_IMAGE_MESSAGE);
        assert!(errors.has("group", FieldErrorKind::InvalidChoice));
    }

    #[test]
    fn comment_requires_text() {
        assert!(CommentPayload { text: "\n".into() }.clean().is_err());
        assert_eq!(
            CommentPayload { text: "nice".into() }.clean().unwrap(),
            "nice"
        );
    }

    #[test]
    fn signup_validates_every_field() {
        let errors = SignupPayload {
            username: "bad name!".into(),
            password: "12345678".into(),
            password_confirm: "87654321".into(),
        }
        .clean()
        .unwrap_err();

        assert!(errors.has("username", FieldErrorKind::InvalidCharacters));
        assert!(errors.has("password", FieldErrorKind::TooWeak));
        assert!(errors.has("password_confirm", FieldErrorKind::Mismatch));
    }

    #[test]
    fn signup_rejects_empty_and_long_usernames() {
        let empty = SignupPayload {
            username: String::new(),
            password: "correct horse".into(),
            password_confirm: "correct horse".into(),
        };
        assert!(empty.clean().unwrap_err().has("username", FieldErrorKind::InvalidLength));

        let long = SignupPayload {
            username: "a".repeat(151),
            password: "correct horse".into(),
            password_confirm: "correct horse".into(),
        };
        assert!(long.clean().unwrap_err().has("username", FieldErrorKind::InvalidLength));
    }

    #[test]
    fn signup_accepts_valid_input() {
        let input = SignupPayload {
            username: "leo.t+blog@x".into(),
            password: "correct horse".into(),
            password_confirm: "correct horse".into(),
        }
        .clean()
        .unwrap();
        assert_eq!(input.username, "leo.t+blog@x");
    }

    #[test]
    fn form_errors_serialize_by_field() {
        let errors = FormErrors::single("image", FieldErrorKind::InvalidImage, "bad");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["image"][0]["code"], "invalid_image");
        assert_eq!(json["image"][0]["message"], "bad");
    }
}
