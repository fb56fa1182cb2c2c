//! Deterministic clone folder naming.
//!
//! `(name, id) -> folder` must resolve the same project to the same path on
//! every run, and distinct projects to distinct folders: the display name is
//! sanitized and suffixed with the first 8 characters of the stable id.

/// Folder-safe name for a project's local clone.
pub fn folder_name_for(project_name: &str, project_id: &str) -> String {
    if project_name.is_empty() {
        return if project_id.is_empty() {
            "quill-project".to_owned()
        } else {
            project_id.to_owned()
        };
    }

    let base: String = project_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let base = collapse_dashes(&base);
    let base = base.trim_matches(|c| c == '-' || c == '.' || c == '_');

    let suffix: String = project_id.chars().take(8).collect();
    match (base.is_empty(), suffix.is_empty()) {
        (false, false) => format!("{base}-{suffix}"),
        (false, true) => base.to_owned(),
        (true, false) => suffix,
        (true, true) => "quill-project".to_owned(),
    }
}

fn collapse_dashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_dash = false;
    for c in s.chars() {
        if c == '-' {
            if !prev_dash {
                out.push(c);
            }
            prev_dash = true;
        } else {
            out.push(c);
            prev_dash = false;
        }
    }
    out
}
