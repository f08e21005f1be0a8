#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::discovery::SourceFile;
    use crate::error::{BindingKind, CompileError};
    use crate::extractor::{ComponentScriptExtractor, Dependency};
    use crate::identity::{component_identifier, HASH_LEN};
    use crate::test_support::*;
    use crate::tree::ParseNode;

    fn extract(tree: &ParseNode) -> crate::error::Result<Vec<crate::extractor::ComponentDescriptor>> {
        ComponentScriptExtractor::new().extract(tree, &tree.text, None)
    }

    #[test]
    fn test_ref_and_refall_share_one_namespace() {
        let tree = document(vec![component(
            "Form",
            vec![element(
                "form",
                vec![],
                vec![
                    self_closing("input", vec![kv("ref", quoted("'x'"))]),
                    self_closing("input", vec![kv("refall", quoted("'x'"))]),
                ],
            )],
        )]);
        match extract(&tree) {
            Err(CompileError::DuplicateBinding { name, kind, location, .. }) => {
                assert_eq!(name, "x");
                assert_eq!(kind, BindingKind::RefAll);
                assert_eq!(location.line, 2);
            }
            other => panic!("expected DuplicateBinding, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_ref_is_rejected() {
        let tree = document(vec![component(
            "Pair",
            vec![element(
                "div",
                vec![kv("ref", quoted("'a'"))],
                vec![self_closing("span", vec![kv("ref", client_embed("a"))])],
            )],
        )]);
        let err = extract(&tree).unwrap_err();
        assert_eq!(err.code(), crate::error::ERR_DUPLICATE_BINDING);
    }

    #[test]
    fn test_same_name_in_other_components_is_fine() {
        let tree = document(vec![
            component("One", vec![self_closing("p", vec![kv("ref", quoted("'x'"))])]),
            component("Two", vec![self_closing("p", vec![kv("ref", quoted("'x'"))])]),
        ]);
        let components = extract(&tree).unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].args, vec!["x".to_string()]);
    }

    #[test]
    fn test_import_is_hoisted_and_embeds_keep_order() {
        let tree = document(vec![component(
            "Clock",
            vec![with_script(
                element(
                    "div",
                    vec![kv("title", client_embed("label"))],
                    vec![text("now: "), client_embed("time.value")],
                ),
                web_script(
                    vec![],
                    vec![
                        script_code("\n"),
                        static_import("{ signal }", "'weft'"),
                        script_code("\nconst time = signal(Date.now());\nconst label = 'clock';\n"),
                    ],
                ),
            )],
        )]);
        let components = extract(&tree).unwrap();
        assert_eq!(components.len(), 1);
        let clock = &components[0];

        assert_eq!(clock.imports, vec!["import { signal } from 'weft';".to_string()]);
        assert_eq!(clock.embeds, vec!["label".to_string(), "time.value".to_string()]);
        assert!(!clock.script.contains("import"));

        let module = clock.render_module();
        let import_at = module.find("import { signal } from 'weft';").unwrap();
        let setup_at = module.find("export const setup = async function () {").unwrap();
        assert!(import_at < setup_at);
        assert_eq!(module.matches("import ").count(), 1);
        assert!(module.contains("this.weftEmbeds = [label, time.value];"));
    }

    #[test]
    fn test_joint_embed_contributes_client_part() {
        let tree = document(vec![component(
            "Badge",
            vec![element(
                "span",
                vec![kv("title", joint_embed("initial", "live.value"))],
                vec![joint_embed("count", "count.value")],
            )],
        )]);
        let components = extract(&tree).unwrap();
        assert_eq!(
            components[0].embeds,
            vec!["live.value".to_string(), "count.value".to_string()]
        );
    }

    #[test]
    fn test_script_attributes_become_arguments() {
        let tree = document(vec![component(
            "Counter",
            vec![with_script(
                self_closing("button", vec![kv("ref", quoted("'btn'")), kv("refall", quoted("'items'"))]),
                web_script(
                    vec![kv("start", server_embed("start")), novalue("step"), same_name("label")],
                    vec![script_code("btn.textContent = start;")],
                ),
            )],
        )]);
        let counter = extract(&tree).unwrap().remove(0);
        assert_eq!(counter.args, vec!["btn", "items", "start", "step", "label"]);
        assert!(counter
            .render_module()
            .contains("let { btn, items, start, step, label } = this.weftArgs;"));
    }

    #[test]
    fn test_two_script_blocks_are_rejected() {
        let tree = document(vec![component(
            "Twice",
            vec![
                with_script(self_closing("p", vec![]), web_script(vec![], vec![script_code("a()")])),
                with_script(self_closing("p", vec![]), web_script(vec![], vec![script_code("b()")])),
            ],
        )]);
        let err = extract(&tree).unwrap_err();
        assert_eq!(err.code(), crate::error::ERR_GRAMMAR);
    }

    #[test]
    fn test_presentational_component_emits_nothing() {
        let tree = document(vec![component(
            "Card",
            vec![element("div", vec![kv("class", quoted("'card'"))], vec![text("hi"), server_embed("title")])],
        )]);
        assert!(extract(&tree).unwrap().is_empty());
    }

    #[test]
    fn test_identifier_depends_on_name_and_bytes() {
        let a = component_identifier("Counter", "def Counter(): <p/>");
        let b = component_identifier("Counter", "def Counter(): <p />");
        assert_ne!(a, b);
        assert_eq!(a, component_identifier("Counter", "def Counter(): <p/>"));
        assert!(a.starts_with("counter_"));
        assert_eq!(a.len(), "counter_".len() + HASH_LEN);

        let first = extract(&document(vec![counter("Counter", "+1")])).unwrap();
        let same = extract(&document(vec![counter("Counter", "+1")])).unwrap();
        let changed = extract(&document(vec![counter("Counter", "+2")])).unwrap();
        assert_eq!(first[0].identifier, same[0].identifier);
        assert_ne!(first[0].identifier, changed[0].identifier);
        assert_eq!(first[0].file_name(), format!("{}.js", first[0].identifier));
    }

    #[test]
    fn test_relative_imports_register_dependencies() {
        let root = PathBuf::from("/project");
        let origin = SourceFile::new("/project/app/pages/home.weft", &root);
        let tree = document(vec![component(
            "Home",
            vec![with_script(
                self_closing("div", vec![]),
                web_script(
                    vec![],
                    vec![
                        static_import("{ a }", "'./local.js'"),
                        static_import("{ b }", "\"../shared/b.js\""),
                        static_import("{ c }", "'weft'"),
                    ],
                ),
            )],
        )]);
        let mut extractor = ComponentScriptExtractor::new();
        extractor.extract(&tree, &tree.text, Some(&origin)).unwrap();

        let deps = extractor.take_dependencies();
        assert_eq!(deps.len(), 2);
        assert!(deps.contains(&Dependency {
            dir: PathBuf::from("/project/app/pages"),
            root: root.clone(),
        }));
        assert!(deps.contains(&Dependency {
            dir: PathBuf::from("/project/app"),
            root,
        }));
        assert!(extractor.dependencies().is_empty());
    }

    #[test]
    fn test_state_resets_after_failure() {
        let bad = document(vec![component(
            "Bad",
            vec![
                self_closing("p", vec![kv("ref", quoted("'x'"))]),
                self_closing("p", vec![kv("ref", quoted("'x'"))]),
            ],
        )]);
        let good = document(vec![counter("Good", "ok")]);

        let mut extractor = ComponentScriptExtractor::new();
        assert!(extractor.extract(&bad, &bad.text, None).is_err());
        let components = extractor.extract(&good, &good.text, None).unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].args, vec!["btn".to_string()]);
    }

    #[test]
    fn test_empty_ref_is_a_grammar_error() {
        let tree = document(vec![component("Empty", vec![self_closing("p", vec![kv("ref", quoted("''"))])])]);
        let err = extract(&tree).unwrap_err();
        assert_eq!(err.code(), crate::error::ERR_GRAMMAR);
    }

    #[test]
    fn test_document_level_script_does_not_leak_into_components() {
        let tree = document(vec![
            with_script(
                self_closing("div", vec![kv("ref", quoted("'stray'"))]),
                web_script(vec![], vec![script_code("console.log('top');")]),
            ),
            host("\n"),
            counter("Counter", "+1"),
        ]);
        let components = extract(&tree).unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].name, "Counter");
        assert_eq!(components[0].args, vec!["btn".to_string()]);
        assert!(!components[0].script.contains("console.log"));
    }

    #[test]
    fn test_failed_file_registers_no_dependencies() {
        let root = PathBuf::from("/project");
        let origin = SourceFile::new("/project/app/home.weft", &root);
        let bad = document(vec![component(
            "Home",
            vec![
                with_script(
                    self_closing("p", vec![kv("ref", quoted("'x'"))]),
                    web_script(vec![], vec![static_import("{ a }", "'./local.js'")]),
                ),
                self_closing("p", vec![kv("ref", quoted("'x'"))]),
            ],
        )]);
        let mut extractor = ComponentScriptExtractor::new();
        assert!(extractor.extract(&bad, &bad.text, Some(&origin)).is_err());
        assert!(extractor.dependencies().is_empty());

        let good = document(vec![component(
            "Home",
            vec![with_script(
                self_closing("p", vec![]),
                web_script(vec![], vec![static_import("{ a }", "'./local.js'")]),
            )],
        )]);
        extractor.extract(&good, &good.text, Some(&origin)).unwrap();
        assert_eq!(extractor.dependencies().len(), 1);
    }

    #[test]
    fn test_identifier_stem_is_a_module_name() {
        use crate::discovery::is_component_module;

        for name in ["Counter", "Zähler", "2fa", "My-Widget", ""] {
            let identifier = component_identifier(name, "def X(): <p/>");
            let file = format!("{}.js", identifier);
            assert!(is_component_module(std::path::Path::new(&file)), "{}", file);
        }
        assert!(component_identifier("Zähler", "s").starts_with("z_hler_"));
        assert!(component_identifier("2fa", "s").starts_with("_2fa_"));
        assert_ne!(component_identifier("Zähler", "s"), component_identifier("Zxhler", "s"));
    }
}
