//! Text rendering of a resolved dependency tree.

use console::style;
use typings_core::{DependencyTree, SourceKind};

/// Render `tree` with box-drawing guides, one dependency per line.
///
/// `root` labels the first line. Children are listed per branch in manifest
/// order (dependencies, dev, ambient, ambient dev) and alphabetically within
/// a branch.
pub fn render_tree(root: &str, tree: &DependencyTree) -> String {
    let mut output = String::new();
    output.push_str(&style(root).bold().to_string());
    output.push('\n');
    render_children(tree, "", &mut output);
    output
}

fn render_children(tree: &DependencyTree, prefix: &str, output: &mut String) {
    let children: Vec<_> = tree
        .branches()
        .into_iter()
        .flat_map(|(field, branch)| branch.iter().map(move |(alias, child)| (field, alias, child)))
        .collect();

    let count = children.len();
    for (index, (field, alias, child)) in children.into_iter().enumerate() {
        let last = index + 1 == count;
        let (guide, indent) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };

        output.push_str(prefix);
        output.push_str(guide);
        output.push_str(&label(alias, field, child));
        output.push('\n');

        render_children(child, &format!("{prefix}{indent}"), output);
    }
}

fn label(alias: &str, field: &str, tree: &DependencyTree) -> String {
    let mut label = style(alias).to_string();

    if let Some(version) = &tree.version {
        label.push_str(&style(format!("@{version}")).dim().to_string());
    }

    let mut tags = Vec::new();
    if let Some(kind) = tree.kind.filter(|kind| *kind != SourceKind::Typings) {
        tags.push(kind_name(kind));
    }
    match field {
        "devDependencies" => tags.push("dev"),
        "ambientDependencies" => tags.push("ambient"),
        "ambientDevDependencies" => tags.push("ambient dev"),
        _ => {}
    }
    if !tags.is_empty() {
        label.push_str(&style(format!(" ({})", tags.join(", "))).cyan().to_string());
    }

    if tree.missing {
        label.push_str(&style(" [missing]").red().to_string());
    }

    label
}

fn kind_name(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Npm => "npm",
        SourceKind::Bower => "bower",
        SourceKind::Typings => "typings",
        SourceKind::File => "file",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn node(kind: SourceKind) -> DependencyTree {
        DependencyTree {
            kind: Some(kind),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_tree() {
        console::set_colors_enabled(false);

        let mut nested = node(SourceKind::Npm);
        nested.version = Some("1.0.0".to_string());
        nested.dependencies.insert("c".to_string(), Arc::new(node(SourceKind::Typings)));

        let mut missing = node(SourceKind::Bower);
        missing.missing = true;

        let mut root = node(SourceKind::Typings);
        root.dependencies.insert("a".to_string(), Arc::new(nested));
        root.dependencies.insert("b".to_string(), Arc::new(missing));
        root.dev_dependencies.insert("d".to_string(), Arc::new(node(SourceKind::File)));

        assert_eq!(
            render_tree("root", &root),
            "root\n\
             ├── a@1.0.0 (npm)\n\
             │   └── c\n\
             ├── b (bower) [missing]\n\
             └── d (file, dev)\n"
        );
    }

    #[test]
    fn test_render_empty_tree() {
        console::set_colors_enabled(false);
        assert_eq!(render_tree("root", &DependencyTree::default()), "root\n");
    }
}
