//! Local validation of the forms a visitor fills in.
//!
//! A webhook payload can only be obtained from a form that passed
//! validation, so an invalid submission never reaches the network.

use std::{collections::BTreeMap, fmt, str::FromStr};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::webhook;

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Batch {
    #[display("71")]
    B71,
    #[display("73")]
    B73,
    #[display("75")]
    B75,
    #[display("foundation")]
    Foundation,
    #[display("CMJD")]
    Cmjd,
    #[display("other")]
    Other,
}

impl Batch {
    pub const ALL: [Self; 6] = [
        Self::B71,
        Self::B73,
        Self::B75,
        Self::Foundation,
        Self::Cmjd,
        Self::Other,
    ];
}

impl FromStr for Batch {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|batch| batch.to_string() == s)
            .ok_or(())
    }
}

/// Uploaded file as received from the browser.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attachment {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: content_type
                .unwrap_or("application/octet-stream")
                .to_string(),
            bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:<mime>;base64,<payload>`, the encoding the webhooks expect.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes),
        )
    }
}

#[derive(Debug, Default, Validate)]
pub struct PurchaseForm {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(custom(function = "known_batch"))]
    pub batch: String,
    pub bank_slip: Option<Attachment>,
}

impl PurchaseForm {
    pub fn into_purchase(self) -> Result<webhook::Purchase, Invalid> {
        let mut errors = self.validate().err().unwrap_or_default();
        require_attachment(
            &mut errors,
            "bank_slip",
            self.bank_slip.as_ref(),
            "Bank slip image is required",
        );
        if !errors.errors().is_empty() {
            return Err(errors.into());
        }
        Ok(webhook::Purchase {
            name: self.name,
            email: self.email,
            batch: self.batch,
            bank_slip: self
                .bank_slip
                .map(|slip| slip.to_data_url())
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ReferenceForm {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(custom(function = "known_batch"))]
    pub batch: String,
    #[serde(rename = "ref-name")]
    #[validate(length(min = 2, message = "Reference name is required"))]
    pub ref_name: String,
}

impl ReferenceForm {
    pub fn into_entry(self) -> Result<webhook::ReferenceEntry, Invalid> {
        self.validate()?;
        Ok(webhook::ReferenceEntry {
            name: self.name,
            email: self.email,
            batch: self.batch,
            ref_name: self.ref_name,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LookupForm {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
}

impl LookupForm {
    pub fn into_email(self) -> Result<String, Invalid> {
        self.validate()?;
        Ok(self.email)
    }
}

#[derive(Debug, Default)]
pub struct VerifyForm {
    pub image: Option<Attachment>,
}

impl VerifyForm {
    /// Data URL of the image to verify.
    pub fn into_image(self) -> Result<String, Invalid> {
        let mut errors = ValidationErrors::new();
        require_attachment(
            &mut errors,
            "image",
            self.image.as_ref(),
            "Image is required",
        );
        if !errors.errors().is_empty() {
            return Err(errors.into());
        }
        Ok(self
            .image
            .map(|image| image.to_data_url())
            .unwrap_or_default())
    }
}

/// Per-field messages of a rejected form, keyed by the browser's field name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Invalid(pub BTreeMap<String, Vec<String>>);

impl Invalid {
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}

impl From<ValidationErrors> for Invalid {
    fn from(errors: ValidationErrors) -> Self {
        Self(
            errors
                .field_errors()
                .into_iter()
                .map(|(field, errors)| {
                    let messages = errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(ToString::to_string)
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    (browser_field(&field).to_string(), messages)
                })
                .collect(),
        )
    }
}

impl fmt::Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

fn browser_field(field: &str) -> &str {
    match field {
        "bank_slip" => "bankSlip",
        "ref_name" => "ref-name",
        other => other,
    }
}

fn rejected(code: &'static str, message: &'static str) -> ValidationError {
    let mut e = ValidationError::new(code);
    e.message = Some(message.into());
    e
}

fn known_batch(batch: &str) -> Result<(), ValidationError> {
    batch
        .parse::<Batch>()
        .map(drop)
        .map_err(|()| rejected("batch", "Please select a batch"))
}

fn require_attachment(
    errors: &mut ValidationErrors,
    field: &'static str,
    attachment: Option<&Attachment>,
    message: &'static str,
) {
    if attachment.map_or(true, Attachment::is_empty) {
        errors.add(field, rejected(field, message));
    }
}
