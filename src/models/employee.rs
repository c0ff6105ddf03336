use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to an uploaded image. `data` holds the public URL.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeImage {
    #[serde(rename = "data")]
    pub url: String,
    pub content_type: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Employee {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "f_Name")]
    pub name: String,
    #[serde(rename = "f_Email")]
    pub email: String,
    #[serde(rename = "f_Mobile")]
    pub mobile: String,
    #[serde(rename = "f_Designation")]
    pub designation: String,
    #[serde(rename = "f_gender")]
    pub gender: String,
    #[serde(rename = "f_Course", default)]
    pub courses: Vec<String>,
    #[serde(rename = "f_Image")]
    pub image: EmployeeImage,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new record; the store assigns timestamps.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub id: String,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub designation: String,
    pub gender: String,
    pub courses: Vec<String>,
    pub image: EmployeeImage,
}

/// Full replacement of the mutable fields. `image: None` keeps the stored one.
#[derive(Debug, Clone)]
pub struct EmployeeChanges {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub designation: String,
    pub gender: String,
    pub courses: Vec<String>,
    pub image: Option<EmployeeImage>,
}

impl Employee {
    pub fn from_new(new: NewEmployee, now: DateTime<Utc>) -> Self {
        Employee {
            id: new.id,
            name: new.name,
            email: new.email,
            mobile: new.mobile,
            designation: new.designation,
            gender: new.gender,
            courses: new.courses,
            image: new.image,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: EmployeeChanges, now: DateTime<Utc>) {
        self.name = changes.name;
        self.email = changes.email;
        self.mobile = changes.mobile;
        self.designation = changes.designation;
        self.gender = changes.gender;
        self.courses = changes.courses;
        if let Some(image) = changes.image {
            self.image = image;
        }
        self.updated_at = now;
    }

    /// Case-insensitive literal substring match on the name.
    pub fn name_matches(&self, keyword: &str) -> bool {
        keyword.is_empty() || self.name.to_lowercase().contains(&keyword.to_lowercase())
    }
}
