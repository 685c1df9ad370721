//! Canonical XML 1.0 (without comments) for digest input.
//!
//! Both entry points work on a duplicate of the document, so the tree being
//! signed is never touched. Whitespace-only text between elements is dropped
//! from the duplicate before serialization.
use libxml::{
    tree::{Document, Node, NodeType, c14n},
    xpath,
};

use super::constants::{DS_NS, node};
use super::document::strip_blank_text;
use super::signer::SigningError;

fn options() -> c14n::CanonicalizationOptions {
    c14n::CanonicalizationOptions {
        mode: c14n::CanonicalizationMode::Canonical1_0,
        inclusive_ns_prefixes: vec![],
        with_comments: false,
    }
}

/// Canonical form of the subtree rooted at `node`. Namespaces in scope from
/// ancestors are rendered on the apex element.
pub fn canonicalize_subtree(doc: &Document, node: &Node) -> Result<String, SigningError> {
    let path = path_from_root(node)?;
    let copy = doc
        .dup()
        .map_err(|e| SigningError::Encoding(format!("Failed to duplicate xml: {e:?}")))?;
    let root = copy
        .get_root_element()
        .ok_or_else(|| SigningError::Encoding("Duplicated document has no root".into()))?;
    let mut target = follow_path(&root, &path)?;
    strip_blank_text(&root);
    target.canonicalize(options()).map_err(|e| {
        SigningError::Encoding(format!(
            "Failed to canonicalize {}: {e:?}",
            node.get_name()
        ))
    })
}

/// Canonical form of the whole document with every `ds:Signature` removed.
pub fn canonicalize_document(doc: &Document) -> Result<String, SigningError> {
    let copy = doc
        .dup()
        .map_err(|e| SigningError::Encoding(format!("Failed to duplicate xml: {e:?}")))?;
    remove_signatures(&copy)?;
    let root = copy
        .get_root_element()
        .ok_or_else(|| SigningError::Encoding("Duplicated document has no root".into()))?;
    strip_blank_text(&root);
    copy.canonicalize(options(), None)
        .map_err(|e| SigningError::Encoding(format!("Failed to canonicalize xml: {e:?}")))
}

fn remove_signatures(doc: &Document) -> Result<(), SigningError> {
    let ctx = xpath::Context::new(doc)
        .map_err(|e| SigningError::Encoding(format!("XPath context error: {e:?}")))?;
    let expr = format!(
        "//*[local-name()='{}' and namespace-uri()='{DS_NS}']",
        node::SIGNATURE
    );
    let nodes = ctx
        .evaluate(&expr)
        .map_err(|e| SigningError::Encoding(format!("XPath context error: {e:?}")))?
        .get_nodes_as_vec();
    for mut node in nodes {
        node.unlink();
    }
    Ok(())
}

/// Child positions leading from the root element down to `node`.
fn path_from_root(node: &Node) -> Result<Vec<usize>, SigningError> {
    let mut path = Vec::new();
    let mut current = node.clone();
    loop {
        let Some(parent) = current.get_parent() else {
            return Err(SigningError::Encoding(format!(
                "{} is not attached to the document",
                node.get_name()
            )));
        };
        if matches!(parent.get_type(), Some(NodeType::DocumentNode)) {
            break;
        }
        let index = parent
            .get_child_nodes()
            .iter()
            .position(|child| child == &current)
            .ok_or_else(|| {
                SigningError::Encoding(format!("{} lost its parent link", node.get_name()))
            })?;
        path.push(index);
        current = parent;
    }
    path.reverse();
    Ok(path)
}

fn follow_path(root: &Node, path: &[usize]) -> Result<Node, SigningError> {
    let mut current = root.clone();
    for &index in path {
        current = current
            .get_child_nodes()
            .into_iter()
            .nth(index)
            .ok_or_else(|| SigningError::Encoding("Node missing from duplicated document".into()))?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xades::document::parse_xml;
    use libxml::parser::Parser;

    const NESTED: &str = "<r:Root xmlns:r=\"urn:root\" xmlns:o=\"urn:other\"><r:A b=\"2\" a=\"1\"><o:B/></r:A></r:Root>";

    fn first_element(node: &Node) -> Node {
        node.get_child_elements()
            .into_iter()
            .next()
            .expect("child element")
    }

    #[test]
    fn subtree_carries_inherited_namespaces() {
        let doc = parse_xml(NESTED).expect("parse");
        let root = doc.get_root_element().expect("root");
        let a = first_element(&root);
        let canonical = canonicalize_subtree(&doc, &a).expect("c14n");
        assert_eq!(
            canonical,
            "<r:A xmlns:o=\"urn:other\" xmlns:r=\"urn:root\" a=\"1\" b=\"2\"><o:B></o:B></r:A>"
        );
    }

    #[test]
    fn subtree_of_root_is_whole_element() {
        let doc = parse_xml("<Root><A/></Root>").expect("parse");
        let root = doc.get_root_element().expect("root");
        assert_eq!(
            canonicalize_subtree(&doc, &root).expect("c14n"),
            "<Root><A></A></Root>"
        );
    }

    #[test]
    fn whitespace_variants_canonicalize_identically() {
        let variants = [
            "<Root><A x=\"1\">text</A><B/></Root>",
            "<Root>\n  <A x=\"1\">text</A>\n  <B/>\n</Root>",
            "<Root>\t<A   x=\"1\"  >text</A>\t\t<B></B></Root>",
            "<?xml version=\"1.0\"?>\n<Root>\r\n    <A x='1'>text</A>\r\n    <B />\r\n</Root>\n",
        ];
        let outputs: Vec<String> = variants
            .iter()
            .map(|xml| {
                let doc = Parser::default().parse_string(xml).expect("parse");
                canonicalize_document(&doc).expect("c14n")
            })
            .collect();
        for output in &outputs {
            assert_eq!(output, &outputs[0]);
        }
        assert_eq!(outputs[0], "<Root><A x=\"1\">text</A><B></B></Root>");
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let doc = parse_xml(NESTED).expect("parse");
        let once = canonicalize_document(&doc).expect("c14n");
        let reparsed = parse_xml(&once).expect("reparse");
        assert_eq!(canonicalize_document(&reparsed).expect("c14n"), once);
    }

    #[test]
    fn document_form_excludes_signatures_without_touching_original() {
        let xml = format!(
            "<Root xmlns:ds=\"{DS_NS}\"><A/><ds:Signature Id=\"s\"><ds:SignedInfo/></ds:Signature></Root>"
        );
        let doc = parse_xml(&xml).expect("parse");
        let canonical = canonicalize_document(&doc).expect("c14n");
        assert_eq!(
            canonical,
            format!("<Root xmlns:ds=\"{DS_NS}\"><A></A></Root>")
        );
        assert!(doc.to_string().contains("ds:Signature"));
    }

    #[test]
    fn detached_node_is_an_encoding_error() {
        let doc = parse_xml("<Root/>").expect("parse");
        let detached = Node::new("Loose", None, &doc).expect("node");
        assert!(matches!(
            canonicalize_subtree(&doc, &detached),
            Err(SigningError::Encoding(_))
        ));
    }
}
