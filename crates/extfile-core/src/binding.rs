//! Bindings between holders and their XML configuration
//!
//! Four configuration shapes carry externalizable content:
//!
//! - **Request**: a request step's `con:config`. The synchronization
//!   attributes sit on the inner `con:request` (or `con:restRequest`) element
//!   and the body is the text of its `con:request` child.
//! - **ContainerScript**: a Groovy step's `con:config` with a nested `script`
//!   element.
//! - **AssertionScript**: a script assertion's `con:configuration` with a
//!   nested `scriptText` element.
//! - **BareScript**: a lifecycle script element such as `con:setupScript`.
//!
//! Values are read once on construction and staged; [`ContentBinding::commit`]
//! writes them back. Nested shapes rebuild their script element from scratch
//! on commit.

use crate::naming::{ComposeComponent, ComposeSelectors, NamingMode, parse_bool};
use crate::xml::XmlElement;
use crate::{Error, Result};

pub const EXTERNAL_FILENAME_ATTR: &str = "externalFilename";
pub const BUILD_MODE_ATTR: &str = "externalFilenameBuildMode";

const CONTAINER_SCRIPT_CHILD: &str = "script";
const ASSERTION_SCRIPT_CHILD: &str = "scriptText";
const REQUEST_ELEMENTS: [&str; 2] = ["request", "restRequest"];
const REQUEST_BODY: &str = "request";

/// Staged synchronization values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingValues {
    pub content: String,
    pub external_path: Option<String>,
    /// `None` when the attribute is absent
    pub naming_mode: Option<NamingMode>,
    /// Unrecognized mode attribute, written back while the mode is unchanged
    pub raw_mode: Option<String>,
    pub selectors: ComposeSelectors,
}

impl BindingValues {
    fn is_empty(&self) -> bool {
        self.content.is_empty() && self.external_path.is_none() && self.naming_mode.is_none()
    }
}

/// Which configuration shape a binding wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingShape {
    Request,
    ContainerScript,
    AssertionScript,
    BareScript,
}

/// The configuration element owned by a binding.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBinding {
    Request {
        config: Option<XmlElement>,
        values: BindingValues,
    },
    ContainerScript {
        config: Option<XmlElement>,
        /// Qualified name used when the config has to be created
        config_name: String,
        values: BindingValues,
    },
    AssertionScript {
        configuration: Option<XmlElement>,
        configuration_name: String,
        values: BindingValues,
    },
    BareScript {
        element: Option<XmlElement>,
        element_name: String,
        values: BindingValues,
    },
}

impl ContentBinding {
    pub fn request(config: Option<XmlElement>) -> Self {
        let values = config
            .as_ref()
            .and_then(request_element)
            .map(|request| {
                let mut values = read_attributes(request);
                values.content = request
                    .child(REQUEST_BODY)
                    .map(XmlElement::text)
                    .unwrap_or_default();
                values
            })
            .unwrap_or_default();
        Self::Request { config, values }
    }

    pub fn container_script(config: Option<XmlElement>, config_name: impl Into<String>) -> Self {
        let values = config
            .as_ref()
            .and_then(|config| config.child(CONTAINER_SCRIPT_CHILD))
            .map(read_script)
            .unwrap_or_default();
        Self::ContainerScript {
            config,
            config_name: config_name.into(),
            values,
        }
    }

    pub fn assertion_script(configuration: Option<XmlElement>, configuration_name: impl Into<String>) -> Self {
        let values = configuration
            .as_ref()
            .and_then(|configuration| configuration.child(ASSERTION_SCRIPT_CHILD))
            .map(read_script)
            .unwrap_or_default();
        Self::AssertionScript {
            configuration,
            configuration_name: configuration_name.into(),
            values,
        }
    }

    pub fn bare_script(element: Option<XmlElement>, element_name: impl Into<String>) -> Self {
        let values = element.as_ref().map(read_script).unwrap_or_default();
        Self::BareScript {
            element,
            element_name: element_name.into(),
            values,
        }
    }

    pub fn shape(&self) -> BindingShape {
        match self {
            Self::Request { .. } => BindingShape::Request,
            Self::ContainerScript { .. } => BindingShape::ContainerScript,
            Self::AssertionScript { .. } => BindingShape::AssertionScript,
            Self::BareScript { .. } => BindingShape::BareScript,
        }
    }

    fn values(&self) -> &BindingValues {
        match self {
            Self::Request { values, .. }
            | Self::ContainerScript { values, .. }
            | Self::AssertionScript { values, .. }
            | Self::BareScript { values, .. } => values,
        }
    }

    fn values_mut(&mut self) -> &mut BindingValues {
        match self {
            Self::Request { values, .. }
            | Self::ContainerScript { values, .. }
            | Self::AssertionScript { values, .. }
            | Self::BareScript { values, .. } => values,
        }
    }

    pub fn content(&self) -> &str {
        &self.values().content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.values_mut().content = content.into();
    }

    pub fn external_path(&self) -> Option<&str> {
        self.values().external_path.as_deref()
    }

    pub fn set_external_path(&mut self, path: Option<String>) {
        self.values_mut().external_path = path;
    }

    pub fn naming_mode(&self) -> Option<NamingMode> {
        self.values().naming_mode
    }

    pub fn set_naming_mode(&mut self, mode: Option<NamingMode>) {
        let values = self.values_mut();
        if values.naming_mode != mode {
            values.raw_mode = None;
        }
        values.naming_mode = mode;
    }

    pub fn compose_selectors(&self) -> ComposeSelectors {
        self.values().selectors
    }

    pub fn set_compose_selectors(&mut self, selectors: ComposeSelectors) {
        self.values_mut().selectors = selectors;
    }

    /// The owned configuration element, if any.
    pub fn element(&self) -> Option<&XmlElement> {
        match self {
            Self::Request { config, .. } | Self::ContainerScript { config, .. } => config.as_ref(),
            Self::AssertionScript { configuration, .. } => configuration.as_ref(),
            Self::BareScript { element, .. } => element.as_ref(),
        }
    }

    pub fn element_mut(&mut self) -> Option<&mut XmlElement> {
        match self {
            Self::Request { config, .. } | Self::ContainerScript { config, .. } => config.as_mut(),
            Self::AssertionScript { configuration, .. } => configuration.as_mut(),
            Self::BareScript { element, .. } => element.as_mut(),
        }
    }

    /// Write the staged values into the configuration element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigMissing`] for a request binding without a
    /// request configuration; nothing is written in that case.
    pub fn commit(&mut self) -> Result<()> {
        match self {
            Self::Request { config, values } => {
                let request = config
                    .as_mut()
                    .and_then(request_element_mut)
                    .ok_or_else(|| Error::ConfigMissing {
                        holder: "request step".to_string(),
                    })?;
                write_attributes(request, values);
                let body_name = request.qualify(REQUEST_BODY);
                request.child_or_insert(&body_name).set_text(&values.content);
            }
            Self::ContainerScript {
                config,
                config_name,
                values,
            } => commit_nested(config, config_name, CONTAINER_SCRIPT_CHILD, values),
            Self::AssertionScript {
                configuration,
                configuration_name,
                values,
            } => commit_nested(
                configuration,
                configuration_name,
                ASSERTION_SCRIPT_CHILD,
                values,
            ),
            Self::BareScript {
                element,
                element_name,
                values,
            } => {
                if element.is_none() && values.is_empty() {
                    return Ok(());
                }
                *element = Some(build_script(element_name, values));
            }
        }
        Ok(())
    }
}

/// The inner request element of a request step configuration.
pub fn request_element(config: &XmlElement) -> Option<&XmlElement> {
    config
        .elements()
        .find(|el| REQUEST_ELEMENTS.contains(&el.local_name()))
}

pub fn request_element_mut(config: &mut XmlElement) -> Option<&mut XmlElement> {
    let local = request_element(config)?.local_name().to_string();
    config.child_mut(&local)
}

fn commit_nested(
    container: &mut Option<XmlElement>,
    container_name: &str,
    script_name: &str,
    values: &BindingValues,
) {
    if container.is_none() && values.is_empty() {
        return;
    }
    let container = container.get_or_insert_with(|| {
        tracing::debug!(element = container_name, "Creating missing script configuration");
        XmlElement::new(container_name)
    });
    container.replace_child(build_script(script_name, values));
}

fn build_script(name: &str, values: &BindingValues) -> XmlElement {
    let mut script = XmlElement::new(name);
    write_attributes(&mut script, values);
    script.set_text(&values.content);
    script
}

fn read_script(element: &XmlElement) -> BindingValues {
    let mut values = read_attributes(element);
    values.content = element.text();
    values
}

fn read_attributes(element: &XmlElement) -> BindingValues {
    let mut raw_mode = None;
    let naming_mode = element.attr(BUILD_MODE_ATTR).map(|raw| {
        raw.parse().unwrap_or_else(|_| {
            tracing::warn!(value = raw, "Unknown naming mode, treating content as inline");
            raw_mode = Some(raw.to_string());
            NamingMode::None
        })
    });

    let mut selectors = ComposeSelectors::default();
    for component in ComposeComponent::ALL {
        let selected = element.attr(component.attribute()).is_some_and(parse_bool);
        selectors.set(component, selected);
    }

    BindingValues {
        content: String::new(),
        external_path: element
            .attr(EXTERNAL_FILENAME_ATTR)
            .filter(|path| !path.is_empty())
            .map(str::to_string),
        naming_mode,
        raw_mode,
        selectors,
    }
}

fn write_attributes(element: &mut XmlElement, values: &BindingValues) {
    match &values.external_path {
        Some(path) => element.set_attr(EXTERNAL_FILENAME_ATTR, path.as_str()),
        None => {
            element.remove_attr(EXTERNAL_FILENAME_ATTR);
        }
    }
    match (values.naming_mode, &values.raw_mode) {
        (Some(_), Some(raw)) => element.set_attr(BUILD_MODE_ATTR, raw.as_str()),
        (Some(mode), None) => element.set_attr(BUILD_MODE_ATTR, mode.as_str()),
        (None, _) => {
            element.remove_attr(BUILD_MODE_ATTR);
        }
    }
    for component in ComposeComponent::ALL {
        if values.naming_mode == Some(NamingMode::Composed) {
            element.set_attr(component.attribute(), values.selectors.get(component).to_string());
        } else {
            element.remove_attr(component.attribute());
        }
    }
}
