//! Preload link generation.
//!
//! For every module touched during render, the manifest lists the files it
//! needs. Each file may itself be a manifest key (by URL pathname); those
//! dependencies are linked first, one level deep. A seen-set guarantees no
//! file is linked twice in one call.

use std::collections::HashSet;

use url::Url;

use crate::manifest::Manifest;

/// Build the preload `<link>` tags for `modules`.
pub fn render_preload_links<S: AsRef<str>>(modules: &[S], manifest: &Manifest) -> String {
    let mut links = String::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let base = Url::parse("http://localhost/").ok();

    for id in modules {
        let Some(files) = manifest.files(id.as_ref()) else {
            continue;
        };
        for file in files {
            if !seen.insert(file) {
                continue;
            }
            let pathname = base
                .as_ref()
                .and_then(|b| b.join(file).ok())
                .map(|u| u.path().to_string());
            if let Some(deps) = pathname.as_deref().and_then(|p| manifest.files(p)) {
                for dep in deps {
                    if seen.insert(dep) {
                        links.push_str(&render_preload_link(dep));
                    }
                }
            }
            links.push_str(&render_preload_link(file));
        }
    }
    links
}

/// Render the link tag for one asset; unknown types produce nothing.
pub fn render_preload_link(file: &str) -> String {
    let ext = file
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "js" => format!(r#"<link rel="modulepreload" crossorigin href="{file}">"#),
        "css" => format!(r#"<link rel="stylesheet" href="{file}">"#),
        "woff" | "woff2" => {
            format!(r#"<link rel="preload" as="font" type="font/{ext}" crossorigin href="{file}">"#)
        }
        "gif" | "jpg" | "jpeg" | "png" => {
            let mime = mime_guess::from_ext(&ext).first_or_octet_stream();
            format!(
                r#"<link rel="preload" as="image" type="{}" href="{file}">"#,
                mime.essence_str()
            )
        }
        _ => String::new(),
    }
}
