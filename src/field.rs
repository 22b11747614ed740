use std::path::{Path, PathBuf};

use anyhow::{Result, ensure};
use fieldsim_kinematics::{Collider, Rect};
use tracing::info;

use crate::config::FieldConfig;

/// A playing field: background image plus the obstacles robots collide with.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    image: Option<PathBuf>,
    obstacles: Vec<Rect>,
}

impl Field {
    pub fn new(name: impl Into<String>, image: Option<PathBuf>, obstacles: Vec<Rect>) -> Self {
        Field {
            name: name.into(),
            image,
            obstacles,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> Option<&Path> {
        self.image.as_deref()
    }

    pub fn obstacles(&self) -> &[Rect] {
        &self.obstacles
    }
}

impl From<&FieldConfig> for Field {
    fn from(config: &FieldConfig) -> Self {
        let FieldConfig {
            name,
            image,
            obstacles,
        } = config;
        Field::new(name.clone(), image.clone(), obstacles.clone())
    }
}

impl Collider for Field {
    fn collides(&self, bbox: &Rect) -> bool {
        self.obstacles.as_slice().collides(bbox)
    }
}

/// The configured fields and which one is in use.
#[derive(Debug, Clone)]
pub struct FieldSet {
    fields: Vec<Field>,
    current: usize,
}

impl FieldSet {
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        ensure!(!fields.is_empty(), "a field set needs at least one field");
        Ok(FieldSet { fields, current: 0 })
    }

    pub fn current(&self) -> &Field {
        &self.fields[self.current]
    }

    pub fn index(&self) -> usize {
        self.current
    }

    /// Switch to the next field, wrapping around.
    pub fn cycle(&mut self) -> &Field {
        self.current = (self.current + 1) % self.fields.len();
        let field = &self.fields[self.current];
        info!(field = field.name(), index = self.current, "Field changed");
        field
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}
