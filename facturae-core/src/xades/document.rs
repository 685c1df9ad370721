//! The XML tree being signed.
use libxml::{
    parser::Parser,
    tree::{Document, Namespace, Node},
    xpath,
};

use super::c14n;
use super::constants::{DS_NS, DS_PREFIX, XADES_NS, XADES_PREFIX};
use super::signer::SigningError;

/// Parses `xml` and drops whitespace-only text between elements.
///
/// Signing a document parsed this way keeps the serialized output consistent
/// with the digests, since those are computed without the indentation.
pub fn parse_xml(xml: &str) -> Result<Document, SigningError> {
    let doc = Parser::default()
        .parse_string(xml)
        .map_err(|e| SigningError::Xml(format!("XML parse error: {e:?}")))?;
    let root = doc
        .get_root_element()
        .ok_or_else(|| SigningError::Xml("Document has no root element".into()))?;
    strip_blank_text(&root);
    Ok(doc)
}

/// A borrowed document with the `ds` and `xades` namespaces bound on its root.
pub struct TargetDocument<'a> {
    doc: &'a Document,
    root: Node,
    ds: Namespace,
    xades: Namespace,
}

impl<'a> TargetDocument<'a> {
    /// Declares `ds` and `xades` on the root element unless the namespaces are
    /// already declared there under some prefix.
    pub fn new(doc: &'a Document) -> Result<Self, SigningError> {
        let mut root = doc
            .get_root_element()
            .ok_or_else(|| SigningError::Xml("Document has no root element".into()))?;
        let ds = ensure_namespace(&mut root, DS_PREFIX, DS_NS)?;
        let xades = ensure_namespace(&mut root, XADES_PREFIX, XADES_NS)?;
        Ok(Self {
            doc,
            root,
            ds,
            xades,
        })
    }

    pub fn document(&self) -> &Document {
        self.doc
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn ds(&self) -> &Namespace {
        &self.ds
    }

    pub fn xades(&self) -> &Namespace {
        &self.xades
    }

    /// Creates a detached element in this document.
    pub fn element(&self, ns: &Namespace, name: &str) -> Result<Node, SigningError> {
        Node::new(name, Some(ns.clone()), self.doc)
            .map_err(|e| SigningError::Xml(format!("Failed to create {name}: {e:?}")))
    }

    pub fn ds_element(&self, name: &str) -> Result<Node, SigningError> {
        self.element(&self.ds, name)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<Node>, SigningError> {
        let ctx = xpath::Context::new(self.doc)
            .map_err(|e| SigningError::Xml(format!("XPath context error: {e:?}")))?;
        let nodes = ctx
            .evaluate(&format!("//*[@Id='{id}']"))
            .map_err(|e| SigningError::Xml(format!("XPath error for Id {id}: {e:?}")))?
            .get_nodes_as_vec();
        Ok(nodes.into_iter().next())
    }

    pub fn canonicalize(&self, node: &Node) -> Result<String, SigningError> {
        c14n::canonicalize_subtree(self.doc, node)
    }

    pub fn canonicalize_document(&self) -> Result<String, SigningError> {
        c14n::canonicalize_document(self.doc)
    }
}

fn ensure_namespace(root: &mut Node, prefix: &str, href: &str) -> Result<Namespace, SigningError> {
    let declared = root.get_namespace_declarations();
    if let Some(ns) = declared.iter().find(|ns| ns.get_href() == href) {
        return Ok(ns.clone());
    }
    if declared.iter().any(|ns| ns.get_prefix() == prefix) {
        return Err(SigningError::Xml(format!(
            "Prefix {prefix} is already bound to another namespace on the root element"
        )));
    }
    Namespace::new(prefix, href, root)
        .map_err(|e| SigningError::Xml(format!("Failed to declare {prefix} namespace: {e:?}")))
}

/// Removes whitespace-only text nodes that sit next to element siblings.
pub(crate) fn strip_blank_text(node: &Node) {
    let children = node.get_child_nodes();
    let has_elements = children.iter().any(|child| child.is_element_node());
    for mut child in children {
        if child.is_element_node() {
            strip_blank_text(&child);
        } else if has_elements && child.is_text_node() && child.get_content().trim().is_empty() {
            child.unlink();
        }
    }
}

pub(crate) fn append_element(
    parent: &mut Node,
    ns: &Namespace,
    name: &str,
) -> Result<Node, SigningError> {
    parent
        .new_child(Some(ns.clone()), name)
        .map_err(|e| SigningError::Xml(format!("Failed to add {name}: {e:?}")))
}

pub(crate) fn append_text_element(
    parent: &mut Node,
    ns: &Namespace,
    name: &str,
    text: &str,
) -> Result<Node, SigningError> {
    parent
        .add_text_child(Some(ns.clone()), name, text)
        .map_err(|e| SigningError::Xml(format!("Failed to add {name}: {e:?}")))
}

pub(crate) fn attach(parent: &mut Node, child: &mut Node) -> Result<(), SigningError> {
    parent
        .add_child(child)
        .map_err(|e| SigningError::Xml(format!("Failed to attach {}: {e:?}", child.get_name())))
}

pub(crate) fn set_attribute(node: &mut Node, name: &str, value: &str) -> Result<(), SigningError> {
    node.set_attribute(name, value).map_err(|e| {
        SigningError::Xml(format!(
            "Failed to set {name} on {}: {e:?}",
            node.get_name()
        ))
    })
}

pub(crate) fn set_text(node: &mut Node, text: &str) -> Result<(), SigningError> {
    node.set_content(text)
        .map_err(|e| SigningError::Xml(format!("Failed to set {} text: {e:?}", node.get_name())))
}

pub(crate) fn is_element(node: &Node, ns_href: &str, name: &str) -> bool {
    node.is_element_node()
        && node.get_name() == name
        && node
            .get_namespace()
            .is_some_and(|ns| ns.get_href() == ns_href)
}

pub(crate) fn child_elements(node: &Node, ns_href: &str, name: &str) -> Vec<Node> {
    node.get_child_elements()
        .into_iter()
        .filter(|child| is_element(child, ns_href, name))
        .collect()
}

pub(crate) fn child_element(node: &Node, ns_href: &str, name: &str) -> Option<Node> {
    child_elements(node, ns_href, name).into_iter().next()
}
