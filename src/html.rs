//! Tree search over parsed portal pages.
//!
//! Searches run depth-first in document order and include the node they
//! start from. "Not found" is always `None`; the page parsers turn that
//! into a structural error.

use scraper::ElementRef;

/// A node handed to an [`each`] visitor.
#[derive(Debug, Clone, Copy)]
pub enum Visit<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
}

/// Visit `root` and its descendants in pre-order.
///
/// The visitor returns whether to descend into the node it was given;
/// returning `false` skips that node's subtree. Comments and other
/// non-element, non-text nodes are not visited.
pub fn each<'a, F>(root: ElementRef<'a>, visit: &mut F)
where
    F: FnMut(Visit<'a>) -> bool,
{
    if !visit(Visit::Element(root)) {
        return;
    }
    for child in root.children() {
        if let Some(element) = ElementRef::wrap(child) {
            each(element, visit);
        } else if let Some(text) = child.value().as_text() {
            visit(Visit::Text(text));
        }
    }
}

/// Visit every element named `name` under `root`.
///
/// Other nodes are always descended; for matching elements the visitor
/// decides, as with [`each`].
pub fn each_by_name<'a, F>(root: ElementRef<'a>, name: &str, visit: &mut F)
where
    F: FnMut(ElementRef<'a>) -> bool,
{
    each(root, &mut |node| match node {
        Visit::Element(element) if element.value().name() == name => visit(element),
        _ => true,
    });
}

/// First element, in document order, satisfying `pred`.
pub fn find<'a>(
    root: ElementRef<'a>,
    pred: &impl Fn(ElementRef<'a>) -> bool,
) -> Option<ElementRef<'a>> {
    if pred(root) {
        return Some(root);
    }
    root.children()
        .filter_map(ElementRef::wrap)
        .find_map(|child| find(child, pred))
}

/// First element carrying the attribute `key="value"`.
pub fn find_by_attr<'a>(root: ElementRef<'a>, key: &str, value: &str) -> Option<ElementRef<'a>> {
    find(root, &|element| element.value().attr(key) == Some(value))
}

/// First element with the given tag name.
pub fn find_by_name<'a>(root: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    find(root, &|element| element.value().name() == name)
}

/// Element children of `parent` with the given tag name, in order.
pub fn children_named<'a>(
    parent: ElementRef<'a>,
    name: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == name)
}

/// The text nodes below `root`, joined with single spaces.
pub fn text(root: ElementRef<'_>) -> String {
    let mut bits = Vec::new();
    each(root, &mut |node| {
        if let Visit::Text(text) = node {
            bits.push(text);
        }
        true
    });
    bits.join(" ")
}

pub fn attr<'a>(element: ElementRef<'a>, key: &str) -> Option<&'a str> {
    element.value().attr(key)
}

/// Markup of `element` itself, for error messages.
pub fn render(element: ElementRef<'_>) -> String {
    element.html()
}
