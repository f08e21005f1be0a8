#[cfg(test)]
mod tests {
    use crate::error::Result;
    use crate::test_support::*;
    use crate::tree::{rules, ParseNode};
    use crate::visitor::{default_handler, suppress, HandlerTable, Value};

    fn record(order: &mut Vec<String>, node: &ParseNode, children: Vec<Value<String>>) -> Result<Value<String>> {
        order.push(node.kind.to_string());
        Ok(default_handler(node, children))
    }

    #[test]
    fn test_visit_is_post_order() {
        let tree = document(vec![element("p", vec![], vec![text("hi")])]);
        let table: HandlerTable<Vec<String>, String> = HandlerTable::new()
            .on_all(&[rules::MARKUP_TEXT, rules::ELEMENT_CHILDREN, rules::PAIRED_ELEMENT, rules::DOCUMENT], record);
        let mut order = Vec::new();
        table.visit(&mut order, &tree).unwrap();
        assert_eq!(
            order,
            vec!["markup_text", "element_children", "paired_element", "document"]
        );
    }

    #[test]
    fn test_default_handler_passes_leaf_text() {
        let tree = element("p", vec![], vec![text("hi")]);
        let table: HandlerTable<(), String> = HandlerTable::new();
        let value = table.visit(&mut (), &tree).unwrap();
        assert_eq!(value.joined_text(), "<p>hi</p>");
    }

    #[test]
    fn test_suppress_hides_subtree() {
        let tree = element("p", vec![], vec![text("hi")]);
        let table: HandlerTable<(), String> = HandlerTable::new().on(rules::ELEMENT_CHILDREN, suppress);
        let value = table.visit(&mut (), &tree).unwrap();
        assert_eq!(value.joined_text(), "<p></p>");
    }

    #[test]
    fn test_tables_are_independent() {
        let items: HandlerTable<(), String> =
            HandlerTable::new().on(rules::MARKUP_TEXT, |_, node, _| Ok(Value::Item(node.text.to_uppercase())));
        let plain: HandlerTable<(), String> = HandlerTable::new();
        let tree = element("p", vec![], vec![text("hi")]);

        assert_eq!(items.visit(&mut (), &tree).unwrap().into_items(), vec!["HI".to_string()]);
        assert!(plain.visit(&mut (), &tree).unwrap().into_items().is_empty());
        assert!(items.handles(rules::MARKUP_TEXT));
        assert!(!plain.handles(rules::MARKUP_TEXT));
    }

    #[test]
    fn test_builders_keep_offsets_contiguous() {
        let tree = document(vec![text("ab"), element("p", vec![], vec![text("c")])]);
        fn check(node: &ParseNode) {
            let mut cursor = node.start;
            for child in &node.children {
                assert_eq!(child.start, cursor, "gap before {}", child.kind);
                cursor = child.end();
                check(child);
            }
            if !node.is_leaf() {
                assert_eq!(cursor, node.end());
            }
        }
        check(&tree);
        assert_eq!(tree.find(rules::ELEMENT_NAME).unwrap().start, 3);
    }

    fn enter(order: &mut Vec<String>, node: &ParseNode) -> Result<()> {
        order.push(format!("enter {}", node.kind));
        Ok(())
    }

    #[test]
    fn test_enter_hook_runs_before_children() {
        let tree = document(vec![element("p", vec![], vec![text("hi")])]);
        let table: HandlerTable<Vec<String>, String> = HandlerTable::new()
            .on_enter(rules::PAIRED_ELEMENT, enter)
            .on_all(&[rules::MARKUP_TEXT, rules::PAIRED_ELEMENT], record);
        let mut order = Vec::new();
        table.visit(&mut order, &tree).unwrap();
        assert_eq!(order, vec!["enter paired_element", "markup_text", "paired_element"]);
    }
}
