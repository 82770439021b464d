// src/models/category.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::partitions;

/// The three administrator-managed category groups. Standard and special
/// test categories are structurally identical; the split only matters for
/// resolution priority and labeling. Slide categories carry a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryGroup {
    Tests,
    Special,
    Slides,
}

impl CategoryGroup {
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "tests" => Some(CategoryGroup::Tests),
            "special" => Some(CategoryGroup::Special),
            "slides" => Some(CategoryGroup::Slides),
            _ => None,
        }
    }

    /// The listing partition the group's category records live in.
    pub fn partition(self) -> &'static str {
        match self {
            CategoryGroup::Tests => partitions::TEST_CATEGORIES,
            CategoryGroup::Special => partitions::SPECIAL_CATEGORIES,
            CategoryGroup::Slides => partitions::SLIDE_CATEGORIES,
        }
    }
}

/// A category listing record. The `name` doubles as the partition holding
/// the category's tests or slides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDoc {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<i64>,
}

/// DTO for creating a category in any group. `grade` is required for the
/// slides group and rejected elsewhere (handler-enforced).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(range(min = 5, max = 8))]
    pub grade: Option<i64>,
}
