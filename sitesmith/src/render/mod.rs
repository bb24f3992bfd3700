//! Template rendering and packaging
//!
//! Applies the placeholder engine across a fetched file set and
//! produces the deliverables: a rendered file set for publishing, a
//! personalized README, and (via [`archive`]) a zip export.

pub mod archive;

use crate::form::{FieldValue, FormData};
use crate::github::TemplateFile;
use crate::placeholder::{self, FileKind};

/// Render every processable file in the set
///
/// Each file's [`FileKind`] is computed once from its display path;
/// opaque files (binary assets) pass through unchanged. The input set
/// is never mutated, so a later re-render starts from the original
/// fetched content.
#[must_use]
pub fn process_template_files(files: &[TemplateFile], data: &FormData) -> Vec<TemplateFile> {
    files
        .iter()
        .map(|file| {
            let kind = FileKind::from_path(&file.path);
            let content = if kind.is_processable() {
                placeholder::render(&file.content, data, kind)
            } else {
                file.content.clone()
            };
            TemplateFile {
                path: file.path.clone(),
                original_path: file.original_path.clone(),
                content,
                size: file.size,
            }
        })
        .collect()
}

/// Generate a personalized README for an exported or published site
#[must_use]
pub fn generate_readme(template_name: Option<&str>, data: &FormData) -> String {
    let site_name = text_value(data, "name").unwrap_or("My Website");
    let bio = text_value(data, "bio").unwrap_or("Personal website built with sitesmith");
    let template = template_name.unwrap_or("custom");

    format!(
        "# {site_name}\n\
         \n\
         {bio}\n\
         \n\
         Template: {template}\n\
         \n\
         ## Usage\n\
         \n\
         Open `index.html` in your browser or deploy to any static hosting service.\n\
         \n\
         ## Deploy to Free Hosting\n\
         \n\
         ### Vercel\n\
         1. Push this repository to GitHub\n\
         2. Go to [vercel.com](https://vercel.com)\n\
         3. Import your repository\n\
         4. Deploy!\n\
         \n\
         ### Netlify\n\
         1. Go to [netlify.com](https://netlify.com)\n\
         2. Drag and drop this folder\n\
         3. Your site is live!\n\
         \n\
         ### GitHub Pages\n\
         1. Push to GitHub\n\
         2. Go to repository Settings > Pages\n\
         3. Select branch and folder\n\
         4. Your site is live at `username.github.io/repo-name`\n\
         \n\
         ## Customization\n\
         \n\
         Edit the HTML, CSS, and JavaScript files directly.\n\
         \n\
         ## License\n\
         \n\
         MIT\n"
    )
}

fn text_value<'a>(data: &'a FormData, key: &str) -> Option<&'a str> {
    data.get(key)
        .and_then(FieldValue::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, content: &str) -> TemplateFile {
        TemplateFile {
            path: path.to_string(),
            original_path: path.to_string(),
            content: content.to_string(),
            size: None,
        }
    }

    fn data() -> FormData {
        let mut d = FormData::new();
        d.insert("name".to_string(), "Ada Lovelace".into());
        d.insert(
            "skills".to_string(),
            FieldValue::List(vec!["math".to_string(), "engines".to_string()]),
        );
        d
    }

    #[test]
    fn test_process_renders_by_kind() {
        let files = vec![
            file("index.html", "<h1>{{name}}</h1>"),
            file("src/App.jsx", "const skills = {{skills}};"),
            file("logo.png", "{{name}}"),
        ];

        let rendered = process_template_files(&files, &data());

        assert_eq!(rendered[0].content, "<h1>Ada Lovelace</h1>");
        assert_eq!(rendered[1].content, "const skills = [\"math\",\"engines\"];");
        // opaque files pass through untouched
        assert_eq!(rendered[2].content, "{{name}}");
    }

    #[test]
    fn test_process_leaves_input_untouched() {
        let files = vec![file("index.html", "<h1>{{name}}</h1>")];
        let _ = process_template_files(&files, &data());
        assert_eq!(files[0].content, "<h1>{{name}}</h1>");
    }

    #[test]
    fn test_generate_readme_personalized() {
        let readme = generate_readme(Some("Minimal Portfolio"), &data());
        assert!(readme.starts_with("# Ada Lovelace\n"));
        assert!(readme.contains("Template: Minimal Portfolio"));
        assert!(readme.contains("### GitHub Pages"));
    }

    #[test]
    fn test_generate_readme_fallbacks() {
        let readme = generate_readme(None, &FormData::new());
        assert!(readme.starts_with("# My Website\n"));
        assert!(readme.contains("Template: custom"));
    }
}
