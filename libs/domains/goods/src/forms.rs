use axum::extract::Multipart;
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::coordinator::ImageInput;
use crate::error::GoodResult;
use crate::images::{ImageUpload, MAX_IMAGE_BYTES};

/// The multipart form posted to create or update a good, before validation.
///
/// `img_urls` may be sent as `img_urls`, `img_urls[]` or `img_urls[n]`. File
/// parts become uploads; text parts are URLs of images the good already has.
#[derive(Debug, Clone, Default, Validate)]
pub struct GoodForm {
    #[validate(
        required(message = "The name field is required."),
        length(max = 50, message = "The name field must not be greater than 50 characters.")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "The content field is required."),
        length(max = 255, message = "The content field must not be greater than 255 characters.")
    )]
    pub content: Option<String>,

    #[validate(required(message = "The price field is required."))]
    pub price: Option<String>,

    #[validate(required(message = "The category id field is required."))]
    pub category_id: Option<String>,

    pub img_urls: Vec<ImageInput>,
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct GoodSubmission {
    pub name: String,
    pub content: String,
    pub price: f64,
    pub category_id: Uuid,
    pub images: Vec<ImageInput>,
}

impl GoodForm {
    /// Reads the form fields; unknown fields are ignored.
    pub async fn from_multipart(mut multipart: Multipart) -> GoodResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if is_image_field(&name) {
                if let Some(file_name) = field.file_name().map(str::to_owned) {
                    let content_type = field.content_type().map(str::to_owned);
                    let bytes = field.bytes().await?;
                    // an untouched file input still posts an empty part
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.img_urls.push(ImageInput::Upload(ImageUpload {
                        file_name: Some(file_name),
                        content_type,
                        bytes,
                    }));
                } else {
                    let url = field.text().await?;
                    if !url.trim().is_empty() {
                        form.img_urls.push(ImageInput::Existing(url.trim().to_string()));
                    }
                }
                continue;
            }

            let slot = match name.as_str() {
                "name" => &mut form.name,
                "content" => &mut form.content,
                "price" => &mut form.price,
                "category_id" => &mut form.category_id,
                _ => continue,
            };
            let value = field.text().await?;
            *slot = Some(value.trim().to_string()).filter(|v| !v.is_empty());
        }

        Ok(form)
    }

    /// Runs every field rule and collects all failures before giving up.
    pub fn into_submission(self) -> GoodResult<GoodSubmission> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        let price = match self.price.as_deref().map(str::parse::<f64>) {
            Some(Ok(value)) if value.is_finite() => Some(value),
            Some(_) => {
                errors.add(
                    "price",
                    field_error("numeric", "The price field must be a number."),
                );
                None
            }
            None => None,
        };

        let category_id = match self.category_id.as_deref().map(Uuid::parse_str) {
            Some(Ok(id)) => Some(id),
            Some(Err(_)) => {
                errors.add(
                    "category_id",
                    field_error("uuid", "The category id field must be a valid UUID."),
                );
                None
            }
            None => None,
        };

        for input in &self.img_urls {
            if let ImageInput::Upload(upload) = input {
                if upload.format().is_none() {
                    errors.add(
                        "img_urls",
                        field_error(
                            "mimes",
                            "The img_urls field must be a file of type: jpeg, png, jpg, gif.",
                        ),
                    );
                } else if upload.bytes.len() > MAX_IMAGE_BYTES {
                    errors.add(
                        "img_urls",
                        field_error(
                            "max",
                            "The img_urls field must not be greater than 2048 kilobytes.",
                        ),
                    );
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors.into());
        }

        match (self.name, self.content, price, category_id) {
            (Some(name), Some(content), Some(price), Some(category_id)) => Ok(GoodSubmission {
                name,
                content,
                price,
                category_id,
                images: self.img_urls,
            }),
            // required() already reported the missing field
            _ => Err(ValidationErrors::new().into()),
        }
    }
}

fn is_image_field(name: &str) -> bool {
    match name.strip_prefix("img_urls") {
        Some("") | Some("[]") => true,
        Some(rest) => rest
            .strip_prefix('[')
            .and_then(|r| r.strip_suffix(']'))
            .is_some_and(|index| index.chars().all(|c| c.is_ascii_digit())),
        None => false,
    }
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}
