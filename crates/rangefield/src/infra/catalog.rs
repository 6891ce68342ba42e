//! Loading form definitions from TOML catalogs.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::app::form::Form;
use crate::app::range_field::RangeField;
use crate::domain::model::{Axis, RangeSection};

const DEMO_CATALOG: &str = include_str!("../../assets/demo-form.toml");

/// A set of range field declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FormCatalog {
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// Declaration of one range field. Sections are validated while deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub lower: Option<RangeSection>,
    #[serde(default)]
    pub upper: Option<RangeSection>,
    #[serde(default)]
    pub initial: InitialSelection,
}

impl FieldSpec {
    /// Title shown to users, falling back to the field key.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InitialSelection {
    #[serde(default)]
    pub lower: Option<String>,
    #[serde(default)]
    pub upper: Option<String>,
}

impl InitialSelection {
    fn get(&self, axis: Axis) -> Option<&str> {
        match axis {
            Axis::Lower => self.lower.as_deref(),
            Axis::Upper => self.upper.as_deref(),
        }
    }
}

impl FormCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read form catalog: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid form catalog in {}", path.display()))
    }

    pub fn from_str(contents: &str) -> Result<Self> {
        let catalog: FormCatalog =
            toml::from_str(contents).context("failed to parse form catalog")?;
        Ok(catalog)
    }

    /// Catalog bundled with the binary.
    pub fn demo() -> Result<Self> {
        Self::from_str(DEMO_CATALOG).context("bundled demo catalog is invalid")
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.key == key)
    }

    /// Build a clean form with every declared field and its initial selections applied.
    pub fn build_form(&self) -> Result<Form> {
        let mut form = Form::new();
        for spec in &self.fields {
            if spec.lower.is_none() && spec.upper.is_none() {
                bail!("field `{}` declares no ranges", spec.key);
            }

            let mut field = RangeField::new(spec.key.clone()).required(spec.required);
            if let Some(lower) = &spec.lower {
                field = field.with_lower(lower.clone());
            }
            if let Some(upper) = &spec.upper {
                field = field.with_upper(upper.clone());
            }
            for axis in Axis::ALL {
                if let Some(choice) = spec.initial.get(axis) {
                    field.set_selection(axis, choice).with_context(|| {
                        format!("invalid initial {axis} selection for field `{}`", spec.key)
                    })?;
                }
            }

            form.add_field(Box::new(field))
                .with_context(|| format!("cannot add field `{}`", spec.key))?;
        }
        tracing::debug!(fields = form.len(), "form built from catalog");
        form.mark_clean();
        Ok(form)
    }
}
