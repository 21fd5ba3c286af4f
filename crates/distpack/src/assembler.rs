use crate::loader::LoadedModule;

/// Marker prefix emitted before each module's content so readers of the
/// bundle can tell where one module ends and the next begins.
pub const FILE_MARKER: &str = "// FILE: ";

/// Concatenate resolved modules into a single bundle text.
///
/// For each module, in the given order: the marker line naming the module, a
/// blank line, the module's full content, then a trailing blank line. Content
/// is passed through byte-for-byte; identical input yields identical output.
pub fn assemble(modules: &[LoadedModule]) -> String {
    let mut bundle = String::new();
    for module in modules {
        bundle.push_str(FILE_MARKER);
        bundle.push_str(&module.reference);
        bundle.push_str("\n\n");
        bundle.push_str(&module.source);
        bundle.push_str("\n\n");
    }
    bundle
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::assemble;
    use crate::loader::LoadedModule;

    fn module(reference: &str, source: &str) -> LoadedModule {
        LoadedModule {
            reference: reference.to_owned(),
            source: source.to_owned(),
        }
    }

    #[test]
    fn frames_each_module_with_marker_and_blank_lines() {
        let bundle = assemble(&[module("a.js", "var a=1;"), module("b.js", "var b=2;")]);
        assert_eq!(bundle, "// FILE: a.js\n\nvar a=1;\n\n// FILE: b.js\n\nvar b=2;\n\n");
    }

    #[test]
    fn marker_sequence_follows_input_order() {
        let modules = [
            module("shapes/circle.js", ""),
            module("license.js", ""),
            module("world.js", ""),
        ];
        let bundle = assemble(&modules);

        let markers: Vec<&str> = bundle
            .lines()
            .filter(|line| line.starts_with("// FILE: "))
            .collect();
        assert_eq!(
            markers,
            vec![
                "// FILE: shapes/circle.js",
                "// FILE: license.js",
                "// FILE: world.js"
            ]
        );
    }

    #[test]
    fn assembly_is_byte_deterministic() {
        let modules = [module("a.js", "var a=1;\n"), module("b.js", "var b=2;")];
        assert_eq!(assemble(&modules), assemble(&modules));
    }

    #[test]
    fn empty_module_list_yields_empty_bundle() {
        assert_eq!(assemble(&[]), "");
    }
}
