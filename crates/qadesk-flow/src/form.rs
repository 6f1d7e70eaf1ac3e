// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Form state for the active report shape.
//!
//! Browser and environment accept only catalog values, and picking an
//! environment always rewrites the database field, which cannot be edited
//! directly.

use std::sync::Arc;

use qadesk_core::{Action, BugReport, Catalog, Project, QadeskError, ReportData, RetestReport, Solved};
use strum::{Display, EnumIter, EnumString};
use tracing::{debug, warn};

/// A named form field.
///
/// Parses from the camelCase record names and their snake_case spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum Field {
    #[strum(to_string = "bugCode", serialize = "bug_code")]
    BugCode,
    #[strum(to_string = "version")]
    Version,
    #[strum(to_string = "browser")]
    Browser,
    #[strum(to_string = "environment")]
    Environment,
    #[strum(to_string = "description")]
    Description,
    #[strum(to_string = "expectedResult", serialize = "expected_result")]
    ExpectedResult,
    #[strum(to_string = "obtainedResult", serialize = "obtained_result")]
    ObtainedResult,
    #[strum(to_string = "originalDescription", serialize = "original_description")]
    OriginalDescription,
    #[strum(to_string = "retestResults", serialize = "retest_results")]
    RetestResults,
    #[strum(to_string = "database")]
    Database,
    #[strum(to_string = "evidence")]
    Evidence,
    #[strum(to_string = "solved")]
    Solved,
}

const REPORT_FIELDS: &[Field] = &[
    Field::Version,
    Field::Browser,
    Field::Environment,
    Field::Description,
    Field::ExpectedResult,
    Field::ObtainedResult,
    Field::Database,
    Field::Evidence,
];

const RETEST_FIELDS: &[Field] = &[
    Field::BugCode,
    Field::Version,
    Field::Browser,
    Field::Environment,
    Field::OriginalDescription,
    Field::RetestResults,
    Field::Database,
    Field::Evidence,
    Field::Solved,
];

impl Field {
    /// Fields of a report shape, in prompting order.
    pub fn for_action(action: Action) -> &'static [Field] {
        match action {
            Action::Report => REPORT_FIELDS,
            Action::Retest => RETEST_FIELDS,
        }
    }

    /// Spanish label, matching the generated report layout.
    pub fn label(self) -> &'static str {
        match self {
            Field::BugCode => "Nombre del defecto original",
            Field::Version => "Versión",
            Field::Browser => "Navegador",
            Field::Environment => "Ambiente",
            Field::Description | Field::OriginalDescription => "Descripción",
            Field::ExpectedResult => "Resultado Esperado",
            Field::ObtainedResult => "Resultado Obtenido",
            Field::RetestResults => "Resultados del Retest",
            Field::Database => "Base de Datos",
            Field::Evidence => "Evidencia",
            Field::Solved => "Resultado del retest",
        }
    }

    /// Question asked when prompting for this field.
    pub fn question(self, action: Action) -> &'static str {
        match (action, self) {
            (Action::Report, Field::Version) => "¿Cuál es la versión de la aplicación?",
            (Action::Report, Field::Environment) => {
                "¿En qué ambiente estás probando? (ej: QA, staging, producción)"
            }
            (Action::Report, Field::Database) => "¿Qué base de datos se está utilizando?",
            (Action::Report, Field::Evidence) => {
                "Adjunta o describe la evidencia (captura, video, logs, etc.)"
            }
            (Action::Retest, Field::Version) => {
                "¿Cuál es la versión de la aplicación en la que hiciste el retest?"
            }
            (Action::Retest, Field::Environment) => "¿En qué ambiente estás probando?",
            (Action::Retest, Field::Database) => "¿Qué base de datos estás usando?",
            (Action::Retest, Field::Evidence) => "Adjunta o describe la evidencia del retest.",
            (_, Field::BugCode) => "¿Cuál es el nombre o código del bug original?",
            (_, Field::Browser) => "¿Qué navegador estás utilizando?",
            (_, Field::Description) => "Describe el problema que encontraste.",
            (_, Field::ExpectedResult) => "¿Qué resultado esperabas?",
            (_, Field::ObtainedResult) => "¿Qué resultado obtuviste?",
            (_, Field::OriginalDescription) => "Describe brevemente el problema original.",
            (_, Field::RetestResults) => "¿Qué resultados obtuviste al hacer el retest?",
            (_, Field::Solved) => "¿El bug fue solucionado? (Responde: Sí o No)",
        }
    }

    /// Whether the field is filled by a selection rather than free text.
    pub fn is_selection(self) -> bool {
        matches!(self, Field::Browser | Field::Environment | Field::Solved)
    }

    /// Whether the field is derived and cannot be set directly.
    pub fn is_derived(self) -> bool {
        self == Field::Database
    }
}

/// Editable state of one report form.
#[derive(Debug, Clone)]
pub struct FormState {
    catalog: Arc<Catalog>,
    project: Project,
    data: ReportData,
    show_error: bool,
}

impl FormState {
    /// Empty form of the shape that `action` needs.
    pub fn new(catalog: Arc<Catalog>, project: Project, action: Action) -> Self {
        Self {
            catalog,
            project,
            data: ReportData::empty(action),
            show_error: false,
        }
    }

    pub fn project(&self) -> Project {
        self.project
    }

    pub fn action(&self) -> Action {
        self.data.action()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Fields of the active shape.
    pub fn fields(&self) -> &'static [Field] {
        Field::for_action(self.action())
    }

    /// Sets a field by name.
    ///
    /// Selection fields are checked against the catalog and the derived
    /// database field is refused.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), QadeskError> {
        let field: Field = name
            .trim()
            .parse()
            .map_err(|_| QadeskError::UnknownField(name.to_string()))?;
        self.set(field, value)
    }

    /// Typed counterpart of [`set_field`](Self::set_field).
    pub fn set(&mut self, field: Field, value: &str) -> Result<(), QadeskError> {
        if !self.fields().contains(&field) {
            return Err(QadeskError::UnknownField(field.to_string()));
        }
        match field {
            Field::Database => Err(QadeskError::ReadOnlyField(field.to_string())),
            Field::Browser => self.select_browser(value),
            Field::Environment => self.select_environment(value),
            Field::Solved => {
                let solved = value.parse::<Solved>().map_err(|_| QadeskError::NotInCatalog {
                    field: field.to_string(),
                    value: value.to_string(),
                })?;
                self.set_solved(solved);
                Ok(())
            }
            _ => {
                if let Some(slot) = self.text_slot(field) {
                    *slot = value.to_string();
                }
                Ok(())
            }
        }
    }

    /// Picks a browser from the catalog. Matching ignores ASCII case and
    /// stores the catalog spelling.
    pub fn select_browser(&mut self, browser: &str) -> Result<(), QadeskError> {
        let wanted = browser.trim();
        let chosen = self
            .catalog
            .browsers()
            .iter()
            .find(|b| b.eq_ignore_ascii_case(wanted))
            .cloned()
            .ok_or_else(|| QadeskError::NotInCatalog {
                field: Field::Browser.to_string(),
                value: browser.to_string(),
            })?;
        if let Some(slot) = self.text_slot(Field::Browser) {
            *slot = chosen;
        }
        Ok(())
    }

    /// Picks an environment of the current project and derives the database.
    pub fn select_environment(&mut self, environment: &str) -> Result<(), QadeskError> {
        let wanted = environment.trim();
        let chosen = self
            .catalog
            .environments(self.project)
            .iter()
            .find(|e| e.eq_ignore_ascii_case(wanted))
            .cloned()
            .ok_or_else(|| QadeskError::NotInCatalog {
                field: Field::Environment.to_string(),
                value: environment.to_string(),
            })?;

        let database = match self.catalog.database_for(self.project, &chosen) {
            Some(db) => db.to_string(),
            None => {
                warn!(environment = %chosen, "environment has no database mapping");
                String::new()
            }
        };
        debug!(environment = %chosen, database = %database, "environment selected");

        if let Some(slot) = self.text_slot(Field::Environment) {
            *slot = chosen;
        }
        if let Some(slot) = self.text_slot(Field::Database) {
            *slot = database;
        }
        Ok(())
    }

    /// Sets the retest verdict. Ignored for bug reports.
    pub fn set_solved(&mut self, solved: Solved) {
        if let ReportData::Retest(retest) = &mut self.data {
            retest.solved = solved;
        }
    }

    /// Current value of a field, if it belongs to the active shape.
    pub fn value(&self, field: Field) -> Option<String> {
        match (&self.data, field) {
            (ReportData::Retest(r), Field::Solved) => Some(r.solved.label().to_string()),
            _ => self.text(field).map(str::to_string),
        }
    }

    /// Required fields that are empty after trimming.
    pub fn missing_fields(&self) -> Vec<Field> {
        self.fields()
            .iter()
            .copied()
            .filter(|f| self.is_blank(*f))
            .collect()
    }

    /// Checks that every field is filled and updates the error flag.
    pub fn validate(&mut self) -> bool {
        let valid = self.missing_fields().is_empty();
        self.show_error = !valid;
        valid
    }

    /// Whether the last validation failed and has not been cleared since.
    pub fn has_error(&self) -> bool {
        self.show_error
    }

    pub fn clear_error(&mut self) {
        self.show_error = false;
    }

    /// Whether a field should be highlighted as missing.
    pub fn is_highlighted(&self, field: Field) -> bool {
        self.show_error && self.fields().contains(&field) && self.is_blank(field)
    }

    /// Empties every field and clears the error flag. The shape is kept.
    pub fn reset(&mut self) {
        self.data = ReportData::empty(self.action());
        self.show_error = false;
    }

    /// Copy of the current values.
    pub fn snapshot(&self) -> ReportData {
        self.data.clone()
    }

    /// Replaces the values with a stored snapshot, which may change the shape.
    pub fn load(&mut self, data: ReportData) {
        self.data = data;
        self.show_error = false;
    }

    fn is_blank(&self, field: Field) -> bool {
        match field {
            Field::Solved => false,
            _ => self.text(field).is_none_or(|v| v.trim().is_empty()),
        }
    }

    fn text(&self, field: Field) -> Option<&str> {
        let value = match (&self.data, field) {
            (ReportData::Bug(b), Field::Version) => &b.version,
            (ReportData::Bug(b), Field::Browser) => &b.browser,
            (ReportData::Bug(b), Field::Environment) => &b.environment,
            (ReportData::Bug(b), Field::Description) => &b.description,
            (ReportData::Bug(b), Field::ExpectedResult) => &b.expected_result,
            (ReportData::Bug(b), Field::ObtainedResult) => &b.obtained_result,
            (ReportData::Bug(b), Field::Database) => &b.database,
            (ReportData::Bug(b), Field::Evidence) => &b.evidence,
            (ReportData::Retest(r), Field::BugCode) => &r.bug_code,
            (ReportData::Retest(r), Field::Version) => &r.version,
            (ReportData::Retest(r), Field::Browser) => &r.browser,
            (ReportData::Retest(r), Field::Environment) => &r.environment,
            (ReportData::Retest(r), Field::OriginalDescription) => &r.original_description,
            (ReportData::Retest(r), Field::RetestResults) => &r.retest_results,
            (ReportData::Retest(r), Field::Database) => &r.database,
            (ReportData::Retest(r), Field::Evidence) => &r.evidence,
            _ => return None,
        };
        Some(value)
    }

    fn text_slot(&mut self, field: Field) -> Option<&mut String> {
        let slot = match &mut self.data {
            ReportData::Bug(b) => bug_slot(b, field)?,
            ReportData::Retest(r) => retest_slot(r, field)?,
        };
        Some(slot)
    }
}

fn bug_slot(b: &mut BugReport, field: Field) -> Option<&mut String> {
    Some(match field {
        Field::Version => &mut b.version,
        Field::Browser => &mut b.browser,
        Field::Environment => &mut b.environment,
        Field::Description => &mut b.description,
        Field::ExpectedResult => &mut b.expected_result,
        Field::ObtainedResult => &mut b.obtained_result,
        Field::Database => &mut b.database,
        Field::Evidence => &mut b.evidence,
        _ => return None,
    })
}

fn retest_slot(r: &mut RetestReport, field: Field) -> Option<&mut String> {
    Some(match field {
        Field::BugCode => &mut r.bug_code,
        Field::Version => &mut r.version,
        Field::Browser => &mut r.browser,
        Field::Environment => &mut r.environment,
        Field::OriginalDescription => &mut r.original_description,
        Field::RetestResults => &mut r.retest_results,
        Field::Database => &mut r.database,
        Field::Evidence => &mut r.evidence,
        _ => return None,
    })
}
