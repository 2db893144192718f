use xmltree::{Element, XMLNode};

use crate::metadata_editor::constants::{CP_NS, DC_NS, DCTERMS_NS};

/// Describe la información necesaria para localizar un nodo en el XML de propiedades.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FieldSpec<'a> {
    pub(crate) prefix: Option<&'a str>,
    pub(crate) local_name: &'a str,
    pub(crate) namespace: Option<&'a str>,
}

/// Obtiene el campo correspondiente en `core.xml` a partir de su etiqueta `prefijo:nombre`.
pub(crate) fn core_field_spec(tag: &str) -> Option<FieldSpec<'static>> {
    let (prefix, local_name, namespace) = match tag {
        "dc:title" => ("dc", "title", DC_NS),
        "dc:subject" => ("dc", "subject", DC_NS),
        "dc:creator" => ("dc", "creator", DC_NS),
        "dc:description" => ("dc", "description", DC_NS),
        "cp:keywords" => ("cp", "keywords", CP_NS),
        "dcterms:created" => ("dcterms", "created", DCTERMS_NS),
        "dcterms:modified" => ("dcterms", "modified", DCTERMS_NS),
        _ => return None,
    };
    Some(FieldSpec {
        prefix: Some(prefix),
        local_name,
        namespace: Some(namespace),
    })
}

/// Inserta o sustituye el contenido de un elemento de metadata.
pub(crate) fn apply_update_to_element(
    root: &mut Element,
    spec: FieldSpec<'_>,
    new_value: &str,
) -> bool {
    for node in root.children.iter_mut() {
        if let XMLNode::Element(child) = node
            && element_matches(child, &spec)
        {
            return set_element_text(child, new_value);
        }
    }

    let mut new_child = Element::new(spec.local_name);
    new_child.prefix = spec.prefix.map(str::to_string);
    new_child.namespace = spec.namespace.map(str::to_string);
    if !new_value.is_empty() {
        new_child
            .children
            .push(XMLNode::Text(new_value.to_string()));
    }
    root.children.push(XMLNode::Element(new_child));
    true
}

pub(crate) fn element_matches(element: &Element, spec: &FieldSpec<'_>) -> bool {
    if element.name != spec.local_name {
        return false;
    }

    match (spec.namespace, element.namespace.as_deref()) {
        (Some(expected), Some(actual)) => expected == actual,
        (Some(_), None) => false,
        (None, _) => true,
    }
}

/// Sustituye el texto de un elemento si difiere del valor actual.
pub(crate) fn set_element_text(element: &mut Element, new_value: &str) -> bool {
    if element_text_content(element) == new_value {
        return false;
    }

    element
        .children
        .retain(|node| !matches!(node, XMLNode::Text(_) | XMLNode::CData(_)));

    if !new_value.is_empty() {
        element.children.push(XMLNode::Text(new_value.to_string()));
    }

    true
}

/// Devuelve el texto plano contenido dentro de un elemento.
pub(crate) fn element_text_content(element: &Element) -> String {
    let mut content = String::new();
    for node in &element.children {
        match node {
            XMLNode::Text(text) | XMLNode::CData(text) => content.push_str(text),
            _ => {}
        }
    }
    content.trim().to_string()
}

/// Texto del primer hijo directo que coincide con `spec`.
pub(crate) fn find_child_text(root: &Element, spec: &FieldSpec<'_>) -> Option<String> {
    root.children.iter().find_map(|node| match node {
        XMLNode::Element(child) if element_matches(child, spec) => {
            Some(element_text_content(child))
        }
        _ => None,
    })
}

/// Comprueba que el contenido almacenado en un elemento coincide con el valor esperado.
pub(crate) fn element_matches_expected_value(
    root: &Element,
    spec: FieldSpec<'_>,
    expected: &str,
) -> bool {
    match find_child_text(root, &spec) {
        Some(text) => text == expected,
        None => expected.is_empty(),
    }
}

/// Hijos directos con el nombre local indicado.
pub(crate) fn child_elements<'a>(
    root: &'a Element,
    local_name: &'a str,
) -> impl Iterator<Item = &'a Element> + 'a {
    root.children.iter().filter_map(move |node| match node {
        XMLNode::Element(child) if child.name == local_name => Some(child),
        _ => None,
    })
}
