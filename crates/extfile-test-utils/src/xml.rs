//! Builders for project documents.

const NAMESPACE: &str = "http://eviware.com/soapui/config";

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}

fn attrs(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!(" {k}=\"{}\"", escape_attr(v)))
        .collect()
}

fn script_element(tag: &str, content: &str, pairs: &[(&str, &str)]) -> String {
    format!("<{tag}{}><![CDATA[{content}]]></{tag}>", attrs(pairs))
}

/// A Groovy script assertion for [`CaseXml::request_step`].
pub fn script_assertion(name: &str, script: &str, pairs: &[(&str, &str)]) -> String {
    format!(
        "<con:assertion type=\"GroovyScriptAssertion\" name=\"{}\"><con:configuration>{}</con:configuration></con:assertion>",
        escape_attr(name),
        script_element("scriptText", script, pairs)
    )
}

/// A `con:testCase`.
#[derive(Debug, Clone, Default)]
pub struct CaseXml {
    name: String,
    body: Vec<String>,
}

impl CaseXml {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            body: Vec::new(),
        }
    }

    /// Add a lifecycle script such as `setupScript`.
    pub fn script(mut self, category: &str, content: &str, pairs: &[(&str, &str)]) -> Self {
        self.body
            .push(script_element(&format!("con:{category}"), content, pairs));
        self
    }

    pub fn groovy_step(mut self, name: &str, script: &str, pairs: &[(&str, &str)]) -> Self {
        self.body.push(format!(
            "<con:testStep type=\"groovy\" name=\"{}\"><con:config>{}</con:config></con:testStep>",
            escape_attr(name),
            script_element("script", script, pairs)
        ));
        self
    }

    /// A request step; `pairs` land on the inner `con:request` element.
    pub fn request_step(
        mut self,
        name: &str,
        body: &str,
        pairs: &[(&str, &str)],
        assertions: &[String],
    ) -> Self {
        self.body.push(format!(
            "<con:testStep type=\"request\" name=\"{n}\"><con:config><con:request name=\"{n}\"{a}><con:request><![CDATA[{body}]]></con:request>{asserts}</con:request></con:config></con:testStep>",
            n = escape_attr(name),
            a = attrs(pairs),
            asserts = assertions.concat(),
        ));
        self
    }

    /// A step without externalizable content.
    pub fn delay_step(mut self, name: &str) -> Self {
        self.body.push(format!(
            "<con:testStep type=\"delay\" name=\"{}\"><con:config><delay>100</delay></con:config></con:testStep>",
            escape_attr(name)
        ));
        self
    }

    fn render(&self) -> String {
        format!(
            "<con:testCase name=\"{}\">{}</con:testCase>",
            escape_attr(&self.name),
            self.body.concat()
        )
    }
}

/// A `con:testSuite`.
#[derive(Debug, Clone, Default)]
pub struct SuiteXml {
    name: String,
    body: Vec<String>,
}

impl SuiteXml {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            body: Vec::new(),
        }
    }

    pub fn script(mut self, category: &str, content: &str, pairs: &[(&str, &str)]) -> Self {
        self.body
            .push(script_element(&format!("con:{category}"), content, pairs));
        self
    }

    pub fn case(mut self, case: CaseXml) -> Self {
        self.body.push(case.render());
        self
    }

    fn render(&self) -> String {
        format!(
            "<con:testSuite name=\"{}\">{}</con:testSuite>",
            escape_attr(&self.name),
            self.body.concat()
        )
    }
}

/// A `con:soapui-project` document.
///
/// # Example
///
/// ```rust
/// use extfile_test_utils::{CaseXml, ProjectXml, SuiteXml};
///
/// let xml = ProjectXml::new("P")
///     .suite(SuiteXml::new("S").case(CaseXml::new("C").groovy_step("G", "log.info 1", &[])))
///     .render();
/// assert!(xml.contains("<con:testStep type=\"groovy\" name=\"G\">"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProjectXml {
    name: String,
    body: Vec<String>,
}

impl ProjectXml {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            body: Vec::new(),
        }
    }

    /// Add a project script such as `afterLoadScript`.
    pub fn script(mut self, category: &str, content: &str, pairs: &[(&str, &str)]) -> Self {
        self.body
            .push(script_element(&format!("con:{category}"), content, pairs));
        self
    }

    pub fn suite(mut self, suite: SuiteXml) -> Self {
        self.body.push(suite.render());
        self
    }

    /// Add an arbitrary fragment, e.g. an element the model does not know.
    pub fn raw(mut self, fragment: &str) -> Self {
        self.body.push(fragment.to_string());
        self
    }

    pub fn render(&self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<con:soapui-project name=\"{}\" xmlns:con=\"{NAMESPACE}\">{}</con:soapui-project>",
            escape_attr(&self.name),
            self.body.concat()
        )
    }
}
