//! Layouts shipped inside the binary under `templates/layouts/`.

use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;

use super::{Layout, Tree};
use crate::templates;

struct Builtin {
    name: &'static str,
    base: &'static str,
    template: &'static str,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "admin",
        base: "apps/admin",
        template: "layouts/admin.toml",
    },
    Builtin {
        name: "web",
        base: "apps/web",
        template: "layouts/web.toml",
    },
];

pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|builtin| builtin.name)
}

pub fn contains(name: &str) -> bool {
    BUILTINS.iter().any(|builtin| builtin.name == name)
}

pub fn load(name: &str) -> Result<Layout> {
    let Some(builtin) = BUILTINS.iter().find(|builtin| builtin.name == name) else {
        bail!(
            "unknown built-in layout `{name}` (available: {})",
            names().collect::<Vec<_>>().join(", ")
        );
    };

    let raw = templates::get_string(builtin.template)?;
    let tree = Tree::from_toml_str(&raw)
        .with_context(|| format!("parsing built-in layout `{}`", builtin.name))?;

    Ok(Layout {
        name: builtin.name.to_owned(),
        base: Utf8PathBuf::from(builtin.base),
        tree,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Node;

    fn is_file(tree: &Tree, path: &str) -> bool {
        matches!(tree.lookup(path), Some(Node::File(contents)) if contents.is_empty())
    }

    #[test]
    fn every_builtin_parses() {
        for name in names() {
            let layout = load(name).unwrap();
            assert_eq!(layout.name, name);
            assert!(!layout.tree.is_empty());
        }
    }

    #[test]
    fn admin_layout_has_expected_landmarks() {
        let layout = load("admin").unwrap();
        assert_eq!(layout.base, "apps/admin");

        let names: Vec<_> = layout.tree.iter().map(|(name, _)| name).collect();
        assert_eq!(names.first(), Some(&".env.example"));
        assert_eq!(&names[names.len() - 2..], ["public", "src"]);

        assert!(is_file(&layout.tree, "public/images/admin-bg.jpg"));
        assert!(is_file(&layout.tree, "src/app/auth/forgot-password/page.tsx"));
        assert!(is_file(&layout.tree, "src/app/content/posts/[id]/edit/page.tsx"));
        assert!(is_file(&layout.tree, "src/app/api/plugins/[slug]/uninstall/route.ts"));
        assert!(is_file(&layout.tree, "src/app/api/users/[id]/permissions/route.ts"));
        assert!(is_file(&layout.tree, "src/styles/admin.css"));
        assert!(is_file(&layout.tree, "src/lib/middleware.ts"));
    }

    #[test]
    fn web_layout_has_expected_landmarks() {
        let layout = load("web").unwrap();
        assert_eq!(layout.base, "apps/web");

        assert!(is_file(&layout.tree, "public/og-image.png"));
        assert!(is_file(&layout.tree, "src/app/blog/category/[category]/page.tsx"));
        assert!(is_file(&layout.tree, "src/app/api/plugins/[plugin]/[...path]/route.ts"));
        assert!(is_file(&layout.tree, "src/components/forms/contact-form.tsx"));
        assert!(is_file(&layout.tree, "src/types/api.ts"));
        assert!(layout.tree.lookup("src/styles/admin.css").is_none());
    }

    #[test]
    fn unknown_builtin_lists_choices() {
        let err = load("mobile").unwrap_err().to_string();
        assert!(err.contains("mobile"));
        assert!(err.contains("admin, web"));
        assert!(!contains("mobile"));
        assert!(contains("web"));
    }
}
