//! Output naming

/// Replace every character outside `[A-Za-z0-9_-]` with `_`
pub fn sanitize_file_component(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<template id>_<sanitized version>.png`
pub fn output_file_name(template_id: &str, version: &str) -> String {
    format!("{}_{}.png", template_id, sanitize_file_component(version))
}
