//! Typed project tree nodes
//!
//! Each node mirrors one element of the project document by ordinal
//! position among its same-named siblings and owns the engines of the
//! content holders attached to it.

use crate::binding::{ContentBinding, request_element, request_element_mut};
use crate::engine::SyncEngine;
use crate::naming::{ContentKind, TreePosition};
use crate::xml::XmlElement;

pub(crate) const PROJECT_SCRIPTS: [&str; 2] = ["afterLoadScript", "beforeSaveScript"];
pub(crate) const LIFECYCLE_SCRIPTS: [&str; 2] = ["setupScript", "tearDownScript"];

const SCRIPT_ASSERTION_TYPE: &str = "GroovyScriptAssertion";

pub(crate) type HolderVisitor<'a> = dyn FnMut(&TreePosition, &mut SyncEngine) + 'a;

pub(crate) fn name_of(element: &XmlElement) -> String {
    element.attr("name").unwrap_or_default().to_string()
}

/// Engines for the named lifecycle scripts of `element`.
pub(crate) fn build_scripts(element: &XmlElement, categories: &[&str]) -> Vec<SyncEngine> {
    categories
        .iter()
        .map(|category| {
            let binding =
                ContentBinding::bare_script(element.child(category).cloned(), element.qualify(category));
            SyncEngine::new(ContentKind::named_script(*category), binding)
        })
        .collect()
}

pub(crate) fn write_scripts(element: &mut XmlElement, scripts: &[SyncEngine]) {
    for script in scripts {
        if let Some(committed) = script.binding().element() {
            element.replace_child(committed.clone());
        }
    }
}

/// A `con:testSuite`.
#[derive(Debug, Clone)]
pub struct TestSuite {
    pub(crate) name: String,
    pub(crate) scripts: Vec<SyncEngine>,
    pub(crate) cases: Vec<TestCase>,
}

impl TestSuite {
    pub(crate) fn from_element(element: &XmlElement) -> Self {
        Self {
            name: name_of(element),
            scripts: build_scripts(element, &LIFECYCLE_SCRIPTS),
            cases: element.children_named("testCase").map(TestCase::from_element).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn scripts(&self) -> &[SyncEngine] {
        &self.scripts
    }

    pub(crate) fn position(&self, project: &TreePosition) -> TreePosition {
        project.with_suite(&self.name)
    }

    pub(crate) fn visit_mut(&mut self, project: &TreePosition, f: &mut HolderVisitor<'_>) {
        let pos = self.position(project);
        for script in &mut self.scripts {
            f(&pos, script);
        }
        for case in &mut self.cases {
            case.visit_mut(&pos, f);
        }
    }

    pub(crate) fn write(&self, element: &mut XmlElement) {
        element.set_attr("name", self.name.as_str());
        write_scripts(element, &self.scripts);
        for (idx, case) in self.cases.iter().enumerate() {
            if let Some(case_el) = element.nth_child_mut("testCase", idx) {
                case.write(case_el);
            }
        }
    }
}

/// A `con:testCase`.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub(crate) name: String,
    pub(crate) scripts: Vec<SyncEngine>,
    pub(crate) steps: Vec<TestStep>,
}

impl TestCase {
    pub(crate) fn from_element(element: &XmlElement) -> Self {
        Self {
            name: name_of(element),
            scripts: build_scripts(element, &LIFECYCLE_SCRIPTS),
            steps: element.children_named("testStep").map(TestStep::from_element).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[TestStep] {
        &self.steps
    }

    pub fn scripts(&self) -> &[SyncEngine] {
        &self.scripts
    }

    pub(crate) fn position(&self, suite: &TreePosition) -> TreePosition {
        suite.with_case(&self.name)
    }

    pub(crate) fn visit_mut(&mut self, suite: &TreePosition, f: &mut HolderVisitor<'_>) {
        let pos = self.position(suite);
        for script in &mut self.scripts {
            f(&pos, script);
        }
        for step in &mut self.steps {
            step.visit_mut(&pos, f);
        }
    }

    pub(crate) fn write(&self, element: &mut XmlElement) {
        element.set_attr("name", self.name.as_str());
        write_scripts(element, &self.scripts);
        for (idx, step) in self.steps.iter().enumerate() {
            if let Some(step_el) = element.nth_child_mut("testStep", idx) {
                step.write(step_el);
            }
        }
    }
}

/// A `con:testStep`. Groovy and request steps carry content.
#[derive(Debug, Clone)]
pub struct TestStep {
    pub(crate) name: String,
    pub(crate) step_type: String,
    pub(crate) engine: Option<SyncEngine>,
    pub(crate) assertions: Vec<Assertion>,
}

impl TestStep {
    pub(crate) fn from_element(element: &XmlElement) -> Self {
        let step_type = element.attr("type").unwrap_or_default().to_string();
        let config = element.child("config").cloned();

        let (engine, assertions) = match step_type.to_ascii_lowercase().as_str() {
            "groovy" => {
                let binding = ContentBinding::container_script(config, element.qualify("config"));
                (Some(SyncEngine::new(ContentKind::script(), binding)), Vec::new())
            }
            "request" | "restrequest" | "httprequest" => {
                let assertions = config
                    .as_ref()
                    .and_then(request_element)
                    .map(|request| {
                        request
                            .children_named("assertion")
                            .map(Assertion::from_element)
                            .collect()
                    })
                    .unwrap_or_default();
                let binding = ContentBinding::request(config);
                (Some(SyncEngine::new(ContentKind::request(), binding)), assertions)
            }
            _ => (None, Vec::new()),
        };

        Self {
            name: name_of(element),
            step_type,
            engine,
            assertions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn step_type(&self) -> &str {
        &self.step_type
    }

    pub fn engine(&self) -> Option<&SyncEngine> {
        self.engine.as_ref()
    }

    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    pub(crate) fn position(&self, case: &TreePosition) -> TreePosition {
        case.with_step(&self.name)
    }

    pub(crate) fn visit_mut(&mut self, case: &TreePosition, f: &mut HolderVisitor<'_>) {
        let pos = self.position(case);
        if let Some(engine) = &mut self.engine {
            f(&pos, engine);
        }
        for assertion in &mut self.assertions {
            assertion.visit_mut(&pos, f);
        }
    }

    /// Drop the `idx`th assertion from the request configuration.
    pub(crate) fn remove_assertion(&mut self, idx: usize) -> Assertion {
        if let Some(request) = self
            .engine
            .as_mut()
            .and_then(|engine| engine.binding_mut().element_mut())
            .and_then(request_element_mut)
        {
            request.remove_nth_child("assertion", idx);
        }
        self.assertions.remove(idx)
    }

    pub(crate) fn write(&self, element: &mut XmlElement) {
        element.set_attr("name", self.name.as_str());
        if let Some(config) = self.engine.as_ref().and_then(|engine| engine.binding().element()) {
            element.replace_child(config.clone());
        }

        let Some(request) = element.child_mut("config").and_then(request_element_mut) else {
            return;
        };
        if request.attr("name").is_some() {
            request.set_attr("name", self.name.as_str());
        }
        for (idx, assertion) in self.assertions.iter().enumerate() {
            if let Some(assertion_el) = request.nth_child_mut("assertion", idx) {
                assertion.write(assertion_el);
            }
        }
    }
}

/// A `con:assertion`. Only Groovy script assertions carry content.
#[derive(Debug, Clone)]
pub struct Assertion {
    pub(crate) name: String,
    pub(crate) assertion_type: String,
    pub(crate) engine: Option<SyncEngine>,
}

impl Assertion {
    pub(crate) fn from_element(element: &XmlElement) -> Self {
        let assertion_type = element.attr("type").unwrap_or_default().to_string();
        let engine = (assertion_type == SCRIPT_ASSERTION_TYPE).then(|| {
            let binding = ContentBinding::assertion_script(
                element.child("configuration").cloned(),
                element.qualify("configuration"),
            );
            SyncEngine::new(ContentKind::script(), binding)
        });
        Self {
            name: name_of(element),
            assertion_type,
            engine,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn assertion_type(&self) -> &str {
        &self.assertion_type
    }

    pub fn engine(&self) -> Option<&SyncEngine> {
        self.engine.as_ref()
    }

    pub(crate) fn position(&self, step: &TreePosition) -> TreePosition {
        step.with_assertion(&self.name)
    }

    pub(crate) fn visit_mut(&mut self, step: &TreePosition, f: &mut HolderVisitor<'_>) {
        let pos = self.position(step);
        if let Some(engine) = &mut self.engine {
            f(&pos, engine);
        }
    }

    pub(crate) fn write(&self, element: &mut XmlElement) {
        element.set_attr("name", self.name.as_str());
        if let Some(configuration) = self.engine.as_ref().and_then(|engine| engine.binding().element()) {
            element.replace_child(configuration.clone());
        }
    }
}
