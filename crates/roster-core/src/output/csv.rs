//! CSV output formatter
//!
//! Every export has a fixed header row whose titles are distinct from the
//! record field names.

use crate::model::{Application, Branch, Principal, Project, ReportRow, BRANCH_COLUMNS};

/// A header row plus data rows, ready to render as CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from records of one type
    #[must_use]
    pub fn from_records<T: Tabular>(records: &[T]) -> Self {
        Self {
            headers: T::headers(),
            rows: records.iter().flat_map(Tabular::rows).collect(),
        }
    }

    /// Render as CSV text; the header row is always present
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        push_line(&mut output, &self.headers);
        for row in &self.rows {
            push_line(&mut output, row);
        }
        output
    }
}

fn push_line(output: &mut String, fields: &[String]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            output.push(',');
        }
        output.push_str(&escape(field));
    }
    output.push('\n');
}

/// Quote a field if it contains a separator, quote or line break
fn escape(field: &str) -> std::borrow::Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\"")).into()
    } else {
        field.into()
    }
}

/// A record that flattens into one or more CSV rows
pub trait Tabular {
    /// Column titles, in output order
    fn headers() -> Vec<String>;

    /// Rows contributed by this record
    fn rows(&self) -> Vec<Vec<String>>;
}

fn titles(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

impl Tabular for Application {
    fn headers() -> Vec<String> {
        titles(&[
            "Application ID",
            "Application Name",
            "Description",
            "Project ID",
        ])
    }

    fn rows(&self) -> Vec<Vec<String>> {
        let row = |project_id: &str| {
            vec![
                self.id.clone(),
                self.name.clone(),
                self.description.clone(),
                project_id.to_string(),
            ]
        };
        if self.project_ids.is_empty() {
            return vec![row("")];
        }
        self.project_ids.iter().map(|id| row(id)).collect()
    }
}

impl Tabular for Project {
    fn headers() -> Vec<String> {
        titles(&[
            "Project ID",
            "Project Name",
            "Project Type",
            "Property Key",
            "Property Value",
        ])
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.properties
            .iter()
            .map(|(key, value)| {
                vec![
                    self.id.clone(),
                    self.name.clone(),
                    self.project_type.clone(),
                    key.clone(),
                    value.clone(),
                ]
            })
            .collect()
    }
}

impl Tabular for Branch {
    fn headers() -> Vec<String> {
        titles(&["Project ID", "Branch Name"])
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![vec![self.project_id.clone(), self.name.clone()]]
    }
}

impl Tabular for Principal {
    fn headers() -> Vec<String> {
        titles(&["Project ID", "Project Name", "Type", "Name", "Email"])
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.project_id.clone(),
            self.project_name.clone(),
            self.kind.as_str().to_string(),
            self.name.clone(),
            self.email.clone(),
        ]]
    }
}

impl Tabular for ReportRow {
    fn headers() -> Vec<String> {
        let mut headers = titles(&[
            "Application Name",
            "Project Name",
            "Project ID",
            "Type",
            "Name",
            "Email",
        ]);
        headers.extend((1..=BRANCH_COLUMNS).map(|n| format!("Branch Name {n}")));
        headers
    }

    fn rows(&self) -> Vec<Vec<String>> {
        let mut row = vec![
            self.application_name.clone(),
            self.project_name.clone(),
            self.project_id.clone(),
            self.principal_type.clone(),
            self.name.clone(),
            self.email.clone(),
        ];
        row.extend(self.branch_names.iter().cloned());
        vec![row]
    }
}
