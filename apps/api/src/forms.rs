//! Multipart form intake shared by both flows.
//!
//! The whole form is buffered before any validation runs, so a rejected
//! request never leaves files behind.

use std::collections::HashMap;

use axum::extract::multipart::{Multipart, MultipartError};

use crate::models::upload::Upload;

#[derive(Debug, Default)]
pub struct FormData {
    files: HashMap<String, Vec<Upload>>,
    fields: HashMap<String, String>,
}

impl FormData {
    /// Reads every part. File inputs left empty by the browser (a part with an
    /// empty filename) are dropped.
    pub async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match field.file_name().map(str::to_owned) {
                Some(file_name) => {
                    let bytes = field.bytes().await?;
                    if file_name.trim().is_empty() {
                        continue;
                    }
                    form.files
                        .entry(name)
                        .or_default()
                        .push(Upload::new(file_name, bytes));
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Removes and returns the files sent under `name`, in form order.
    pub fn take_files(&mut self, name: &str) -> Vec<Upload> {
        self.files.remove(name).unwrap_or_default()
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}
