//! Docstring synthesis from a declaration's signature.

use super::style::DocStyle;
use crate::core::{Entity, ParamKind, Parameter};
use crate::rules::naming::split_words;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Function,
    Method,
    Class,
}

/// Signature facts a docstring is generated from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityInfo {
    pub name: String,
    pub kind: EntityKind,
    /// Caller-supplied parameters; receivers already removed
    pub params: Vec<Parameter>,
    pub return_annotation: Option<String>,
    pub returns_value: bool,
    pub raises: Vec<String>,
}

impl EntityInfo {
    pub fn from_entity(entity: &Entity) -> Self {
        match entity {
            Entity::Function(f) => Self {
                name: f.name.clone(),
                kind: if f.is_method() {
                    EntityKind::Method
                } else {
                    EntityKind::Function
                },
                params: f.signature_parameters().cloned().collect(),
                return_annotation: f.return_annotation.clone(),
                returns_value: f.returns_value,
                raises: f.raises.clone(),
            },
            Entity::Class(c) => Self {
                name: c.name.clone(),
                kind: EntityKind::Class,
                params: c.parameters.clone(),
                return_annotation: None,
                returns_value: false,
                raises: Vec::new(),
            },
        }
    }

    fn is_initializer(&self) -> bool {
        self.kind == EntityKind::Method && self.name == "__init__"
    }

    fn has_returns_section(&self) -> bool {
        self.kind != EntityKind::Class && !self.is_initializer()
    }
}

struct DocParam {
    name: String,
    type_name: String,
}

struct DocReturn {
    type_name: String,
    description: String,
}

fn summary_line(info: &EntityInfo) -> String {
    if info.is_initializer() {
        return "Initialize the instance.".to_string();
    }
    let words = split_words(info.name.trim_start_matches('_'));
    let lowered = words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    let mut chars = lowered.chars();
    let sentence = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => info.name.clone(),
    };
    match info.kind {
        EntityKind::Class => format!("{} class.", sentence),
        _ => format!("{}.", sentence),
    }
}

/// Best-effort type name from a default value's source text.
pub fn infer_type(default: &str) -> &'static str {
    let value = default.trim();
    let unprefixed = value.trim_start_matches(|c: char| "rRbBuUfF".contains(c));
    if value == "True" || value == "False" {
        "bool"
    } else if value == "None" {
        "Optional[Any]"
    } else if unprefixed.starts_with('"') || unprefixed.starts_with('\'') {
        if value.starts_with(['b', 'B']) {
            "bytes"
        } else {
            "str"
        }
    } else if value.parse::<i64>().is_ok() {
        "int"
    } else if value.starts_with(|c: char| c.is_ascii_digit() || ".+-".contains(c))
        && value.parse::<f64>().is_ok()
    {
        "float"
    } else if value.starts_with('[') {
        "list"
    } else if value.starts_with('{') {
        if value == "{}" || value.contains(':') {
            "dict"
        } else {
            "set"
        }
    } else if value.starts_with('(') {
        "tuple"
    } else {
        "Any"
    }
}

fn doc_params(info: &EntityInfo) -> Vec<DocParam> {
    info.params
        .iter()
        .map(|p| {
            let prefix = match p.kind {
                ParamKind::Regular => "",
                ParamKind::VarArgs => "*",
                ParamKind::KwArgs => "**",
            };
            let type_name = p
                .annotation
                .clone()
                .or_else(|| p.default.as_deref().map(|d| infer_type(d).to_string()))
                .unwrap_or_else(|| "Any".to_string());
            DocParam {
                name: format!("{}{}", prefix, p.name),
                type_name,
            }
        })
        .collect()
}

fn doc_return(info: &EntityInfo) -> Option<DocReturn> {
    if !info.has_returns_section() {
        return None;
    }
    let type_name = match (&info.return_annotation, info.returns_value) {
        (Some(annotation), _) => annotation.clone(),
        (None, true) => "Any".to_string(),
        (None, false) => "None".to_string(),
    };
    let description = if type_name == "None" {
        "Nothing.".to_string()
    } else {
        "Description of return value.".to_string()
    };
    Some(DocReturn {
        type_name,
        description,
    })
}

fn param_description(name: &str) -> String {
    format!("Description of {}.", name.trim_start_matches('*'))
}

fn raise_description(exception: &str) -> String {
    format!("If the {} condition occurs.", exception)
}

/// Render a docstring body (without quotes or indentation) for `info`.
///
/// The three styles carry identical content and differ only in markup.
pub fn generate(info: &EntityInfo, style: DocStyle) -> String {
    let params = doc_params(info);
    let returns = doc_return(info);
    let mut sections: Vec<String> = vec![summary_line(info)];

    match style {
        DocStyle::Google => {
            if !params.is_empty() {
                let mut section = String::from("Args:");
                for p in &params {
                    section.push_str(&format!(
                        "\n    {} ({}): {}",
                        p.name,
                        p.type_name,
                        param_description(&p.name)
                    ));
                }
                sections.push(section);
            }
            if let Some(ret) = &returns {
                sections.push(format!(
                    "Returns:\n    {}: {}",
                    ret.type_name, ret.description
                ));
            }
            if !info.raises.is_empty() {
                let mut section = String::from("Raises:");
                for exc in &info.raises {
                    section.push_str(&format!("\n    {}: {}", exc, raise_description(exc)));
                }
                sections.push(section);
            }
        }
        DocStyle::Numpy => {
            if !params.is_empty() {
                let mut section = String::from("Parameters\n----------");
                for p in &params {
                    section.push_str(&format!(
                        "\n{} : {}\n    {}",
                        p.name,
                        p.type_name,
                        param_description(&p.name)
                    ));
                }
                sections.push(section);
            }
            if let Some(ret) = &returns {
                sections.push(format!(
                    "Returns\n-------\n{}\n    {}",
                    ret.type_name, ret.description
                ));
            }
            if !info.raises.is_empty() {
                let mut section = String::from("Raises\n------");
                for exc in &info.raises {
                    section.push_str(&format!("\n{}\n    {}", exc, raise_description(exc)));
                }
                sections.push(section);
            }
        }
        DocStyle::Rest => {
            let mut fields: Vec<String> = Vec::new();
            for p in &params {
                fields.push(format!(":param {}: {}", p.name, param_description(&p.name)));
                fields.push(format!(":type {}: {}", p.name, p.type_name));
            }
            if let Some(ret) = &returns {
                fields.push(format!(":returns: {}", ret.description));
                fields.push(format!(":rtype: {}", ret.type_name));
            }
            for exc in &info.raises {
                fields.push(format!(":raises {}: {}", exc, raise_description(exc)));
            }
            if !fields.is_empty() {
                sections.push(fields.join("\n"));
            }
        }
    }

    sections.join("\n\n")
}
