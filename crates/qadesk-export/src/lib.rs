// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encodings of a generated report for pasting into a tracker.
//!
//! Reports are line-oriented `Label: value` text. Parsing is best-effort:
//! lines that match no pattern are skipped, never rejected.

use std::sync::LazyLock;

use qadesk_core::QadeskError;
use regex::Regex;
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Longest text accepted as a label before the first colon.
const MAX_LABEL_CHARS: usize = 60;

/// Markers that identify a generated report worth exporting.
const EXPORT_MARKERS: &[&str] = &["Versión:", "Nombre del defecto"];

static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+[.)]\s+(.*\S)\s*$").expect("static regex"));

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    /// The text exactly as generated.
    Plain,
    /// Labels wrapped in `**`.
    #[strum(serialize = "emphasized", serialize = "markdown")]
    Emphasized,
    /// A JSON object keyed by normalized labels.
    #[strum(serialize = "structured", serialize = "json")]
    Structured,
}

/// Encodes `text` in the requested format.
pub fn export(text: &str, format: ExportFormat) -> Result<String, QadeskError> {
    match format {
        ExportFormat::Plain => Ok(text.to_string()),
        ExportFormat::Emphasized => Ok(emphasize(text)),
        ExportFormat::Structured => serde_json::to_string_pretty(&to_structured(text))
            .map_err(|e| QadeskError::Internal(format!("failed to encode report: {e}"))),
    }
}

/// Whether the text looks like a generated report rather than a status
/// message.
pub fn is_exportable(text: &str) -> bool {
    EXPORT_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Rewrites each leading `Label:` as `**Label:**`.
pub fn emphasize(text: &str) -> String {
    text.lines()
        .map(|line| match split_label(line) {
            Some((label, rest)) if !NUMBERED_ITEM.is_match(line) => {
                let indent = &line[..line.len() - line.trim_start().len()];
                format!("{indent}**{label}:**{rest}")
            }
            _ => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses a report into an ordered JSON object.
///
/// A label with an empty value collects the numbered lines that follow it
/// into an array.
pub fn to_structured(text: &str) -> Value {
    let mut object = Map::new();
    let mut list_key: Option<String> = None;

    for line in text.lines() {
        if let Some(key) = &list_key
            && let Some(caps) = NUMBERED_ITEM.captures(line)
        {
            let item = Value::String(caps[1].to_string());
            match object.get_mut(key) {
                Some(Value::Array(items)) => items.push(item),
                _ => {
                    object.insert(key.clone(), Value::Array(vec![item]));
                }
            }
            continue;
        }

        let Some((label, rest)) = split_label(line) else {
            continue;
        };
        let key = normalize_key(label);
        if key.is_empty() {
            continue;
        }
        let value = rest.trim().trim_start_matches('*').trim();
        if value.is_empty() {
            list_key = Some(key.clone());
        } else {
            list_key = None;
        }
        object.insert(key, Value::String(value.to_string()));
    }

    Value::Object(object)
}

/// Lowercases, strips diacritics and joins words with `_`.
pub fn normalize_key(label: &str) -> String {
    let folded: String = label
        .trim_matches(|c: char| c == '*' || c.is_whitespace())
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Splits `Label: rest` at the first colon.
fn split_label(line: &str) -> Option<(&str, &str)> {
    let (head, rest) = line.split_once(':')?;
    let label = head.trim().trim_matches('*').trim();
    if label.is_empty() || label.chars().count() > MAX_LABEL_CHARS || rest.starts_with("//") {
        return None;
    }
    let rest = rest.strip_prefix("**").unwrap_or(rest);
    Some((label, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUG: &str = "Versión: 2.14.0
Navegador: Google Chrome
Ambiente: PayStudio - GETNET UAT
Descripción: Al confirmar el pago: la pantalla queda en blanco.
Resultado Esperado: Se muestra el comprobante
Resultado Obtenido: Pantalla en blanco
Base de Datos: pays_getnet_uat_bo
Evidencia: https://evidencias/123
Nombre sugerido para el bug:
1. Pantalla en blanco al confirmar pago
2. Comprobante no se genera
3. Falla en confirmación de pago";

    #[test]
    fn plain_is_verbatim() {
        assert_eq!(export(BUG, ExportFormat::Plain).unwrap(), BUG);
    }

    #[test]
    fn emphasized_wraps_labels_only() {
        let out = emphasize(BUG);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "**Versión:** 2.14.0");
        assert_eq!(
            lines[3],
            "**Descripción:** Al confirmar el pago: la pantalla queda en blanco."
        );
        assert_eq!(lines[7], "**Evidencia:** https://evidencias/123");
        assert_eq!(lines[8], "**Nombre sugerido para el bug:**");
        assert_eq!(lines[9], "1. Pantalla en blanco al confirmar pago");
    }

    #[test]
    fn structured_normalizes_keys_and_collects_lists() {
        let value = to_structured(BUG);
        let object = value.as_object().unwrap();
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "version",
                "navegador",
                "ambiente",
                "descripcion",
                "resultado_esperado",
                "resultado_obtenido",
                "base_de_datos",
                "evidencia",
                "nombre_sugerido_para_el_bug",
            ]
        );
        assert_eq!(value["version"], "2.14.0");
        assert_eq!(
            value["descripcion"],
            "Al confirmar el pago: la pantalla queda en blanco."
        );
        assert_eq!(value["evidencia"], "https://evidencias/123");
        assert_eq!(
            value["nombre_sugerido_para_el_bug"],
            serde_json::json!([
                "Pantalla en blanco al confirmar pago",
                "Comprobante no se genera",
                "Falla en confirmación de pago"
            ])
        );
    }

    #[test]
    fn structured_skips_unlabeled_lines() {
        let text = "Reporte generado\n\nVersión: 1\n3. suelto\nResultado del retest: Solucionado";
        let value = to_structured(text);
        assert_eq!(
            value,
            serde_json::json!({"version": "1", "resultado_del_retest": "Solucionado"})
        );
    }

    #[test]
    fn structured_accepts_emphasized_input() {
        let value = to_structured(&emphasize("Versión: 3.0\nAmbiente: QA"));
        assert_eq!(value, serde_json::json!({"version": "3.0", "ambiente": "QA"}));
    }

    #[test]
    fn normalize_key_folds_accents_and_spaces() {
        assert_eq!(normalize_key("Descripción"), "descripcion");
        assert_eq!(normalize_key("  Resultados   del Retest "), "resultados_del_retest");
        assert_eq!(normalize_key("**Versión**"), "version");
    }

    #[test]
    fn exportable_markers() {
        assert!(is_exportable(BUG));
        assert!(is_exportable("Nombre del defecto original: BUG-1"));
        assert!(!is_exportable(
            "Lo siento, ocurrió un error crítico al procesar tu solicitud."
        ));
    }

    #[test]
    fn formats_parse_with_aliases() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Structured);
        assert_eq!("Markdown".parse::<ExportFormat>().unwrap(), ExportFormat::Emphasized);
        assert_eq!("plain".parse::<ExportFormat>().unwrap(), ExportFormat::Plain);
    }

    #[test]
    fn structured_export_is_pretty_json() {
        let out = export("Versión: 1", ExportFormat::Structured).unwrap();
        assert_eq!(out, "{\n  \"version\": \"1\"\n}");
    }
}
