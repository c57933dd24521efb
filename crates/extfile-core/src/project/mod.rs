//! Project document model
//!
//! A [`Project`] keeps the parsed document for everything it does not
//! understand and a typed tree of suites, cases, steps and assertions for the
//! content holders it does. Serializing writes the typed tree back into a copy
//! of the document, so unknown elements and attributes round-trip untouched.

mod node;

use std::path::Path;

use extfile_fs::{NormalizedPath, io};

use crate::engine::{LoadStatus, RenameOutcome, SyncEngine};
use crate::naming::TreePosition;
use crate::prompt::ConflictPrompter;
use crate::session::ProjectSession;
use crate::xml::XmlDocument;
use crate::{Error, Result};

pub use node::{Assertion, TestCase, TestStep, TestSuite};
use node::{PROJECT_SCRIPTS, build_scripts, name_of, write_scripts};

const PROJECT_ELEMENT: &str = "soapui-project";

/// A node addressed by tree indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    /// The project itself, addressed as `/`
    Project,
    Suite(usize),
    Case(usize, usize),
    Step(usize, usize, usize),
    Assertion(usize, usize, usize, usize),
}

/// A content holder seen by [`Project::holders`].
#[derive(Debug, Clone)]
pub struct HolderEntry<'a> {
    pub position: TreePosition,
    pub engine: &'a SyncEngine,
}

impl<'a> HolderEntry<'a> {
    fn new(position: &TreePosition, engine: &'a SyncEngine) -> Self {
        Self {
            position: position.clone(),
            engine,
        }
    }

    pub fn label(&self) -> String {
        self.position.label(self.engine.kind())
    }
}

/// An open project.
#[derive(Debug, Clone)]
pub struct Project {
    document: XmlDocument,
    path: Option<NormalizedPath>,
    name: String,
    scripts: Vec<SyncEngine>,
    suites: Vec<TestSuite>,
}

impl Project {
    /// Read and parse the project file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = NormalizedPath::new(path);
        let xml = io::read_text(&path)?;
        tracing::debug!(path = %path, "Opened project");
        Self::parse(&xml, Some(path))
    }

    /// Parse a project document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProject`] when the root element is not a
    /// project.
    pub fn parse(xml: &str, path: Option<NormalizedPath>) -> Result<Self> {
        let document = XmlDocument::parse(xml)?;
        let root = &document.root;
        if root.local_name() != PROJECT_ELEMENT {
            return Err(Error::InvalidProject {
                message: format!("root element is <{}>", root.name),
            });
        }

        let name = name_of(root);
        let scripts = build_scripts(root, &PROJECT_SCRIPTS);
        let suites = root
            .children_named("testSuite")
            .map(TestSuite::from_element)
            .collect();

        Ok(Self {
            document,
            path,
            name,
            scripts,
            suites,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&NormalizedPath> {
        self.path.as_ref()
    }

    pub fn set_path(&mut self, path: NormalizedPath) {
        self.path = Some(path);
    }

    pub fn suites(&self) -> &[TestSuite] {
        &self.suites
    }

    pub fn scripts(&self) -> &[SyncEngine] {
        &self.scripts
    }

    fn position(&self) -> TreePosition {
        TreePosition::project(&self.name)
    }

    /// Every content holder, depth first.
    pub fn holders(&self) -> Vec<HolderEntry<'_>> {
        let mut entries = Vec::new();
        let root = self.position();

        for script in &self.scripts {
            entries.push(HolderEntry::new(&root, script));
        }
        for suite in &self.suites {
            let suite_pos = suite.position(&root);
            for script in &suite.scripts {
                entries.push(HolderEntry::new(&suite_pos, script));
            }
            for case in &suite.cases {
                let case_pos = case.position(&suite_pos);
                for script in &case.scripts {
                    entries.push(HolderEntry::new(&case_pos, script));
                }
                for step in &case.steps {
                    let step_pos = step.position(&case_pos);
                    if let Some(engine) = &step.engine {
                        entries.push(HolderEntry::new(&step_pos, engine));
                    }
                    for assertion in &step.assertions {
                        if let Some(engine) = &assertion.engine {
                            entries.push(HolderEntry::new(&assertion.position(&step_pos), engine));
                        }
                    }
                }
            }
        }
        entries
    }

    /// Visit every content holder mutably, depth first.
    pub fn for_each_holder_mut(&mut self, mut f: impl FnMut(&TreePosition, &mut SyncEngine)) {
        let root = self.position();
        for script in &mut self.scripts {
            f(&root, script);
        }
        for suite in &mut self.suites {
            suite.visit_mut(&root, &mut f);
        }
    }

    pub fn holder(&self, label: &str) -> Option<HolderEntry<'_>> {
        self.holders().into_iter().find(|entry| entry.label() == label)
    }

    /// Apply `f` to the holder with `label`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when no holder has that label.
    pub fn with_holder_mut<T>(
        &mut self,
        label: &str,
        f: impl FnOnce(&TreePosition, &mut SyncEngine) -> T,
    ) -> Result<T> {
        let mut f = Some(f);
        let mut result = None;
        self.for_each_holder_mut(|position, engine| {
            if result.is_none()
                && position.label(engine.kind()) == label
                && let Some(f) = f.take()
            {
                result = Some(f(position, engine));
            }
        });
        result.ok_or_else(|| Error::NotFound(format!("holder '{label}'")))
    }

    /// Resolve a node path such as `Suite/Case/Step`, or `/` for the
    /// project.
    pub fn find_node(&self, path: &str) -> Result<NodeRef> {
        let not_found = || Error::NotFound(format!("node '{path}'"));
        let names: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if names.is_empty() && !path.is_empty() {
            return Ok(NodeRef::Project);
        }
        let (suite_name, rest) = names.split_first().ok_or_else(not_found)?;

        let s = self
            .suites
            .iter()
            .position(|suite| suite.name == *suite_name)
            .ok_or_else(not_found)?;
        let Some((case_name, rest)) = rest.split_first() else {
            return Ok(NodeRef::Suite(s));
        };

        let suite = &self.suites[s];
        let c = suite
            .cases
            .iter()
            .position(|case| case.name == *case_name)
            .ok_or_else(not_found)?;
        let Some((step_name, rest)) = rest.split_first() else {
            return Ok(NodeRef::Case(s, c));
        };

        let case = &suite.cases[c];
        let t = case
            .steps
            .iter()
            .position(|step| step.name == *step_name)
            .ok_or_else(not_found)?;
        let Some((assertion_name, rest)) = rest.split_first() else {
            return Ok(NodeRef::Step(s, c, t));
        };

        let a = case.steps[t]
            .assertions
            .iter()
            .position(|assertion| assertion.name == *assertion_name)
            .ok_or_else(not_found)?;
        if !rest.is_empty() {
            return Err(not_found());
        }
        Ok(NodeRef::Assertion(s, c, t, a))
    }

    /// Load every holder from its external file.
    ///
    /// Conflict answers remembered from an earlier open are forgotten first.
    pub fn load_external<P: ConflictPrompter>(
        &mut self,
        session: &mut ProjectSession<P>,
    ) -> Vec<(String, LoadStatus)> {
        session.reset_policy();
        let mut ctx = session.context();
        let mut results = Vec::new();
        self.for_each_holder_mut(|position, engine| {
            let status = engine.load(position, &mut ctx);
            if status != LoadStatus::NotLoaded {
                tracing::debug!(holder = %position.label(engine.kind()), ?status, "Loaded holder");
            }
            results.push((position.label(engine.kind()), status));
        });
        results
    }

    /// Rename the project, a suite, case, step or assertion and move the
    /// files of every holder beneath it.
    pub fn rename_node<P: ConflictPrompter>(
        &mut self,
        node: &str,
        new_name: &str,
        session: &mut ProjectSession<P>,
    ) -> Result<Vec<RenameOutcome>> {
        let node = self.find_node(node)?;
        let root = self.position();
        let mut ctx = session.context();
        let mut outcomes = Vec::new();
        let mut rename = |position: &TreePosition, engine: &mut SyncEngine| {
            outcomes.extend(engine.rename(position, &mut ctx));
        };

        match node {
            NodeRef::Project => {
                self.name = new_name.to_string();
                self.for_each_holder_mut(&mut rename);
            }
            NodeRef::Suite(s) => {
                let suite = &mut self.suites[s];
                suite.name = new_name.to_string();
                suite.visit_mut(&root, &mut rename);
            }
            NodeRef::Case(s, c) => {
                let suite = &mut self.suites[s];
                let suite_pos = suite.position(&root);
                let case = &mut suite.cases[c];
                case.name = new_name.to_string();
                case.visit_mut(&suite_pos, &mut rename);
            }
            NodeRef::Step(s, c, t) => {
                let suite = &mut self.suites[s];
                let case_pos = suite.cases[c].position(&suite.position(&root));
                let step = &mut suite.cases[c].steps[t];
                step.name = new_name.to_string();
                step.visit_mut(&case_pos, &mut rename);
            }
            NodeRef::Assertion(s, c, t, a) => {
                let suite = &mut self.suites[s];
                let case_pos = suite.cases[c].position(&suite.position(&root));
                let case = &mut suite.cases[c];
                let step_pos = case.steps[t].position(&case_pos);
                let assertion = &mut case.steps[t].assertions[a];
                assertion.name = new_name.to_string();
                assertion.visit_mut(&step_pos, &mut rename);
            }
        }

        tracing::info!(node = ?node, new_name, moved = outcomes.iter().filter(|o| o.moved).count(), "Renamed node");
        Ok(outcomes)
    }

    /// Remove a suite, case, step or assertion, deleting the external files
    /// of derived-mode holders beneath it.
    ///
    /// Returns the labels of holders whose files were deleted.
    pub fn remove_node<P: ConflictPrompter>(
        &mut self,
        node: &str,
        session: &mut ProjectSession<P>,
    ) -> Result<Vec<String>> {
        let node = self.find_node(node)?;
        let root = self.position();
        let store = session.store();
        let mut deleted = Vec::new();
        let mut delete = |position: &TreePosition, engine: &mut SyncEngine| {
            if engine.delete(position, store) {
                deleted.push(position.label(engine.kind()));
            }
        };

        let doc_root = &mut self.document.root;
        match node {
            NodeRef::Project => return Err(Error::CannotRemoveProject),
            NodeRef::Suite(s) => {
                self.suites[s].visit_mut(&root, &mut delete);
                self.suites.remove(s);
                doc_root.remove_nth_child("testSuite", s);
            }
            NodeRef::Case(s, c) => {
                let suite = &mut self.suites[s];
                let suite_pos = suite.position(&root);
                suite.cases[c].visit_mut(&suite_pos, &mut delete);
                suite.cases.remove(c);
                if let Some(suite_el) = doc_root.nth_child_mut("testSuite", s) {
                    suite_el.remove_nth_child("testCase", c);
                }
            }
            NodeRef::Step(s, c, t) => {
                let suite = &mut self.suites[s];
                let case_pos = suite.cases[c].position(&suite.position(&root));
                let case = &mut suite.cases[c];
                case.steps[t].visit_mut(&case_pos, &mut delete);
                case.steps.remove(t);
                if let Some(case_el) = doc_root
                    .nth_child_mut("testSuite", s)
                    .and_then(|suite_el| suite_el.nth_child_mut("testCase", c))
                {
                    case_el.remove_nth_child("testStep", t);
                }
            }
            NodeRef::Assertion(s, c, t, a) => {
                let suite = &mut self.suites[s];
                let case_pos = suite.cases[c].position(&suite.position(&root));
                let case = &mut suite.cases[c];
                let step_pos = case.steps[t].position(&case_pos);
                let step = &mut case.steps[t];
                step.assertions[a].visit_mut(&step_pos, &mut delete);
                step.remove_assertion(a);
            }
        }

        tracing::info!(node = ?node, deleted = deleted.len(), "Removed node");
        Ok(deleted)
    }

    /// Serialize the project, including every holder's committed values.
    pub fn to_xml(&self) -> Result<String> {
        let mut document = self.document.clone();
        let root = &mut document.root;
        root.set_attr("name", self.name.as_str());
        write_scripts(root, &self.scripts);
        for (idx, suite) in self.suites.iter().enumerate() {
            if let Some(suite_el) = root.nth_child_mut("testSuite", idx) {
                suite.write(suite_el);
            }
        }
        document.to_xml_string()
    }

    /// Write the serialized project atomically to `path`.
    pub fn write_to(&self, path: &NormalizedPath) -> Result<()> {
        let xml = self.to_xml()?;
        io::write_text(path, &xml)?;
        tracing::info!(path = %path, "Wrote project");
        Ok(())
    }
}
