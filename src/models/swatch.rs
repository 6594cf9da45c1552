use factory_tint::{ParseColorError, TargetColor};
use serde::{Deserialize, Serialize};

/// Name used for colors that are not in the palette.
pub const CUSTOM_COLOR_NAME: &str = "Custom";

/// Name used for the no-tint choice when the palette does not name it.
pub const ORIGINAL_COLOR_NAME: &str = "Original";

/// A named color offered to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swatch {
    /// Display name (e.g. "Ferrari Red")
    pub name: String,
    /// Hex color, or "transparent" for no tint
    pub value: String,
}

impl Swatch {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse the swatch value
    pub fn color(&self) -> Result<TargetColor, ParseColorError> {
        self.value.parse()
    }

    /// File-name friendly form of the name ("Ferrari Red" -> "ferrari-red")
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

/// Ordered list of swatches
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(Vec<Swatch>);

impl Palette {
    pub fn new(swatches: Vec<Swatch>) -> Self {
        Self(swatches)
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Find a swatch by name (case-insensitive)
    pub fn find_by_name(&self, name: &str) -> Option<&Swatch> {
        let name = name.trim();
        self.0.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Find the first swatch painting `color`
    pub fn find_by_color(&self, color: TargetColor) -> Option<&Swatch> {
        self.0.iter().find(|s| s.color().ok() == Some(color))
    }

    /// Resolve client input: a swatch name, a hex color, or "transparent"
    pub fn resolve(&self, input: &str) -> Result<TargetColor, ParseColorError> {
        match self.find_by_name(input) {
            Some(swatch) => swatch.color(),
            None => input.parse(),
        }
    }

    /// Display name for `color`
    ///
    /// Unknown colors are "Custom"; no tint falls back to "Original".
    pub fn name_for(&self, color: TargetColor) -> String {
        match self.find_by_color(color) {
            Some(swatch) => swatch.name.clone(),
            None if color.is_no_tint() => ORIGINAL_COLOR_NAME.to_string(),
            None => CUSTOM_COLOR_NAME.to_string(),
        }
    }

    /// File-name slug for `color`
    pub fn slug_for(&self, color: TargetColor) -> String {
        slugify(&self.name_for(color))
    }
}

/// Lowercase ASCII alphanumerics joined by single dashes
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("color");
    }
    slug
}
