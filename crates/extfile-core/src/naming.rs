//! External file name derivation
//!
//! Turns a content holder's position in the project tree into a relative file
//! path. Derivation is pure: the same names, mode and selectors always give
//! the same path.

use std::fmt;
use std::str::FromStr;

use extfile_fs::ContentSuffix;

use crate::Error;

/// How a holder's external file name is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamingMode {
    /// Inline only, no file
    None,
    /// User-supplied path
    Manual,
    /// Derived from every name in the tree position
    Auto,
    /// Derived from a selected subset of names
    Composed,
}

impl NamingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Manual => "MANUAL",
            Self::Auto => "AUTO",
            Self::Composed => "COMPOSED",
        }
    }

    /// True for modes whose path is derived from tree names.
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::Auto | Self::Composed)
    }

    /// True for every mode that keeps content in a file.
    pub fn is_external(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for NamingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "MANUAL" => Ok(Self::Manual),
            "AUTO" => Ok(Self::Auto),
            "COMPOSED" => Ok(Self::Composed),
            _ => Err(Error::InvalidNamingMode {
                value: s.to_string(),
            }),
        }
    }
}

/// Name components of a tree position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComposeComponent {
    Project,
    Suite,
    Case,
    Step,
}

impl ComposeComponent {
    pub const ALL: [Self; 4] = [Self::Project, Self::Suite, Self::Case, Self::Step];

    /// Attribute persisting this selector.
    pub fn attribute(&self) -> &'static str {
        match self {
            Self::Project => "composeWithProjectName",
            Self::Suite => "composeWithTestSuiteName",
            Self::Case => "composeWithTestCaseName",
            Self::Step => "composeWithTestStepName",
        }
    }
}

impl FromStr for ComposeComponent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "project" => Ok(Self::Project),
            "suite" | "testsuite" => Ok(Self::Suite),
            "case" | "testcase" => Ok(Self::Case),
            "step" | "teststep" => Ok(Self::Step),
            _ => Err(Error::InvalidComposeComponent {
                value: s.to_string(),
            }),
        }
    }
}

/// Which names take part in a COMPOSED path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ComposeSelectors {
    pub project: bool,
    pub suite: bool,
    pub case: bool,
    pub step: bool,
}

impl ComposeSelectors {
    pub fn get(&self, component: ComposeComponent) -> bool {
        match component {
            ComposeComponent::Project => self.project,
            ComposeComponent::Suite => self.suite,
            ComposeComponent::Case => self.case,
            ComposeComponent::Step => self.step,
        }
    }

    pub fn set(&mut self, component: ComposeComponent, value: bool) {
        match component {
            ComposeComponent::Project => self.project = value,
            ComposeComponent::Suite => self.suite = value,
            ComposeComponent::Case => self.case = value,
            ComposeComponent::Step => self.step = value,
        }
    }
}

/// Lenient boolean parse: case-insensitive `true`, anything else is false.
pub fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// What a holder contains.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKind {
    pub category: ContentSuffix,
    /// Distinguishes several scripts attached to one node, e.g. `setupScript`
    pub script_category: Option<String>,
}

impl ContentKind {
    pub fn request() -> Self {
        Self {
            category: ContentSuffix::Request,
            script_category: None,
        }
    }

    pub fn script() -> Self {
        Self {
            category: ContentSuffix::Script,
            script_category: None,
        }
    }

    pub fn named_script(category: impl Into<String>) -> Self {
        Self {
            category: ContentSuffix::Script,
            script_category: Some(category.into()),
        }
    }

    fn category_suffix(&self) -> String {
        self.script_category
            .as_deref()
            .map(|cat| format!("-{cat}"))
            .unwrap_or_default()
    }
}

/// Names of the nodes enclosing a holder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TreePosition {
    pub project: String,
    pub suite: Option<String>,
    pub case: Option<String>,
    pub step: Option<String>,
    pub assertion: Option<String>,
}

impl TreePosition {
    pub fn project(name: impl Into<String>) -> Self {
        Self {
            project: name.into(),
            ..Self::default()
        }
    }

    pub fn with_suite(&self, name: impl Into<String>) -> Self {
        Self {
            suite: Some(name.into()),
            ..self.clone()
        }
    }

    pub fn with_case(&self, name: impl Into<String>) -> Self {
        Self {
            case: Some(name.into()),
            ..self.clone()
        }
    }

    pub fn with_step(&self, name: impl Into<String>) -> Self {
        Self {
            step: Some(name.into()),
            ..self.clone()
        }
    }

    pub fn with_assertion(&self, name: impl Into<String>) -> Self {
        Self {
            assertion: Some(name.into()),
            ..self.clone()
        }
    }

    /// Human-readable holder label, e.g. `P/S/C/T` or `P/S#setupScript`.
    pub fn label(&self, kind: &ContentKind) -> String {
        let mut label = std::iter::once(self.project.as_str())
            .chain(self.nested_names())
            .collect::<Vec<_>>()
            .join("/");
        if let Some(cat) = &kind.script_category {
            label.push('#');
            label.push_str(cat);
        }
        label
    }

    fn nested_names(&self) -> impl Iterator<Item = &str> {
        [&self.suite, &self.case, &self.step, &self.assertion]
            .into_iter()
            .filter_map(|name| name.as_deref())
    }
}

/// Derives relative file paths for one holder.
#[derive(Debug, Clone, Copy)]
pub struct PathBuilder<'a> {
    position: &'a TreePosition,
    kind: &'a ContentKind,
}

impl<'a> PathBuilder<'a> {
    pub fn new(position: &'a TreePosition, kind: &'a ContentKind) -> Self {
        Self { position, kind }
    }

    /// Path for `mode`, or `None` for inline-only content.
    pub fn derive(
        &self,
        mode: NamingMode,
        selectors: ComposeSelectors,
        manual: Option<&str>,
    ) -> Option<String> {
        match mode {
            NamingMode::None => None,
            NamingMode::Manual => Some(self.manual(manual.unwrap_or(""))),
            NamingMode::Auto => Some(self.auto()),
            NamingMode::Composed => Some(self.composed(selectors)),
        }
    }

    /// Every present name, outermost first.
    pub fn auto(&self) -> String {
        let names = std::iter::once(self.position.project.as_str()).chain(self.position.nested_names());
        self.finish(names, "new")
    }

    /// The selected names in fixed order, with the assertion name kept as the leaf.
    pub fn composed(&self, selectors: ComposeSelectors) -> String {
        let pos = self.position;
        let names = [
            (selectors.project, Some(pos.project.as_str())),
            (selectors.suite, pos.suite.as_deref()),
            (selectors.case, pos.case.as_deref()),
            (selectors.step, pos.step.as_deref()),
            (true, pos.assertion.as_deref()),
        ]
        .into_iter()
        .filter_map(|(selected, name)| if selected { name } else { None });
        self.finish(names, "new")
    }

    /// The user's path with each segment sanitized.
    ///
    /// A leading `/` is kept so absolute paths stay absolute.
    pub fn manual(&self, path: &str) -> String {
        let absolute = path.starts_with('/');
        let segments: Vec<String> = path
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty())
            .map(sanitize_segment)
            .collect();

        if segments.is_empty() {
            return format!(
                "unnamed{}{}",
                self.kind.category_suffix(),
                self.kind.category
            );
        }

        let joined = segments.join("/");
        if absolute { format!("/{joined}") } else { joined }
    }

    fn finish<'n>(&self, names: impl Iterator<Item = &'n str>, fallback: &str) -> String {
        let stem = names
            .filter(|name| !name.is_empty())
            .map(sanitize_segment)
            .collect::<Vec<_>>()
            .join("/");
        let stem = if stem.is_empty() { fallback.to_string() } else { stem };
        format!("{stem}{}{}", self.kind.category_suffix(), self.kind.category)
    }
}

/// Derive the relative path of a holder.
pub fn derive_path(
    mode: NamingMode,
    position: &TreePosition,
    kind: &ContentKind,
    selectors: ComposeSelectors,
    manual: Option<&str>,
) -> Option<String> {
    PathBuilder::new(position, kind).derive(mode, selectors, manual)
}

/// Replace characters that are unsafe in file names with `_`.
///
/// Segments made only of dots become underscores so they cannot walk up the
/// directory tree.
pub fn sanitize_segment(segment: &str) -> String {
    if !segment.is_empty() && segment.chars().all(|c| c == '.') {
        return "_".repeat(segment.len());
    }
    segment
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
