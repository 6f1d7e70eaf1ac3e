// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt construction for bug and retest reports.
//!
//! The prompts pin the Spanish label layout that downstream exporters parse,
//! so label text here and in `qadesk-export` must stay in sync.

use qadesk_core::{BugReport, ReportData, RetestReport, Solved};

/// Substrings recognized in a browser name, mapped to the product name.
const BROWSER_NAMES: &[(&str, &str)] = &[
    ("chrome", "Google Chrome"),
    ("edge", "Microsoft Edge"),
    ("firefox", "Mozilla Firefox"),
    ("safari", "Apple Safari"),
    ("opera", "Opera Browser"),
    ("brave", "Brave Browser"),
];

/// Retest verdict when the defect is fixed.
pub const VERDICT_SOLVED: &str = "Solucionado";

/// Retest verdict when the defect is still present.
pub const VERDICT_REOPENED: &str = "No solucionado – Se reabre defecto";

/// Maps loose browser names ("chrome 120") to the full product name.
///
/// Unrecognized names are returned unchanged.
pub fn normalize_browser(browser: &str) -> String {
    let lower = browser.to_lowercase();
    BROWSER_NAMES
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| browser.to_string())
}

/// Fixed verdict line for a retest.
pub fn retest_verdict(solved: Solved) -> &'static str {
    match solved {
        Solved::Yes => VERDICT_SOLVED,
        Solved::No => VERDICT_REOPENED,
    }
}

/// Builds the prompt for either report shape.
pub fn build_prompt(report: &ReportData) -> String {
    match report {
        ReportData::Bug(bug) => bug_prompt(bug),
        ReportData::Retest(retest) => retest_prompt(retest),
    }
}

pub fn bug_prompt(data: &BugReport) -> String {
    format!(
        "Transform this bug information into a professional, technical format for Azure DevOps.
Browser normalization: {browser} should be mapped to common full names if applicable.

Data:
Version: {version}
Browser: {browser}
Environment: {environment}
Description: {description}
Expected: {expected}
Obtained: {obtained}
Database: {database}
Evidence: {evidence}

Return the result in this exact format (Spanish):
Versión: [value]
Navegador: [normalized value]
Ambiente: [value]
Descripción: [technical professional description]
Resultado Esperado: [technical professional value]
Resultado Obtenido: [technical professional value]
Base de Datos: [value]
Evidencia: [value]
Nombre sugerido para el bug:
1. [Brief name]
2. [Brief name]
3. [Brief name]",
        browser = data.browser,
        version = data.version,
        environment = data.environment,
        description = data.description,
        expected = data.expected_result,
        obtained = data.obtained_result,
        database = data.database,
        evidence = data.evidence,
    )
}

pub fn retest_prompt(data: &RetestReport) -> String {
    let browser = normalize_browser(&data.browser);
    let verdict = retest_verdict(data.solved);
    format!(
        "Transform this retest information into a professional, technical format for Azure DevOps.

Context:
Original Code: {bug_code}
Version: {version}
Browser: {browser}
Environment: {environment}
Original Issue: {description}
Retest Findings: {results}
DB: {database}
Evidence: {evidence}
Solved: {solved}

Specific Rule for \"Descripción\" field:
Must start with: \"El defecto original [bugCode]: [technical summary of original issue].\"

Return the result in this exact format (Spanish):
Nombre del defecto original: [bugCode]
Versión: [version]
Navegador: [normalizedBrowser]
Ambiente: [environment]
Descripción: [as specified above]
Resultados del Retest: [technical summary of retest results]
Base de Datos: [database]
Evidencia: [evidence]
Resultado del retest: {verdict}",
        bug_code = data.bug_code,
        version = data.version,
        environment = data.environment,
        description = data.original_description,
        results = data.retest_results,
        database = data.database,
        evidence = data.evidence,
        solved = data.solved.label(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_loose_browser_names() {
        assert_eq!(normalize_browser("chrome 120"), "Google Chrome");
        assert_eq!(normalize_browser("MS Edge"), "Microsoft Edge");
        assert_eq!(normalize_browser("FireFox ESR"), "Mozilla Firefox");
        assert_eq!(normalize_browser("Google Chrome"), "Google Chrome");
        assert_eq!(normalize_browser("Lynx"), "Lynx");
    }

    #[test]
    fn verdict_follows_solved_flag() {
        assert_eq!(retest_verdict(Solved::Yes), "Solucionado");
        assert_eq!(
            retest_verdict(Solved::No),
            "No solucionado – Se reabre defecto"
        );
    }

    #[test]
    fn bug_prompt_carries_every_field() {
        let bug = BugReport {
            version: "2.3.0".into(),
            browser: "Mozilla Firefox".into(),
            environment: "PayStudio - GETNET EVO".into(),
            description: "Error al exportar".into(),
            expected_result: "Descarga CSV".into(),
            obtained_result: "HTTP 500".into(),
            database: "pays_getnet_evo_bo".into(),
            evidence: "https://evid/1".into(),
        };
        let prompt = build_prompt(&ReportData::Bug(bug));
        for needle in [
            "Version: 2.3.0",
            "Expected: Descarga CSV",
            "Obtained: HTTP 500",
            "Database: pays_getnet_evo_bo",
            "Nombre sugerido para el bug:",
        ] {
            assert!(prompt.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn retest_prompt_normalizes_browser_and_fixes_verdict() {
        let retest = RetestReport {
            bug_code: "BUG-77".into(),
            browser: "safari 17".into(),
            solved: Solved::No,
            ..RetestReport::default()
        };
        let prompt = build_prompt(&ReportData::Retest(retest));
        assert!(prompt.contains("Browser: Apple Safari"));
        assert!(prompt.contains("Original Code: BUG-77"));
        assert!(prompt.contains("Solved: No"));
        assert!(prompt.ends_with("Resultado del retest: No solucionado – Se reabre defecto"));
    }
}
