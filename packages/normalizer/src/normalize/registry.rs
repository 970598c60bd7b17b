//! Element handler trait and registry for block extraction.

use std::collections::{HashMap, HashSet};

use roxmltree::Node;

use super::Block;

/// Context threaded through block extraction.
#[derive(Debug, Default)]
pub struct NormalizeContext {
    /// Structural nesting depth (chapter containers increment it).
    pub depth: u8,
    /// Non-fatal anomalies observed while extracting.
    pub warnings: Vec<String>,
}

impl NormalizeContext {
    /// Create a fresh context at depth zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// What a handler produced for one element.
#[derive(Debug, Clone)]
pub enum Emit {
    /// Block-level output, already structured.
    Blocks(Vec<Block>),
    /// Inline text, to be absorbed by the enclosing block.
    Text(String),
    /// Nothing of interest.
    Nothing,
}

impl Emit {
    /// Convert to block form. Stray inline text at block level becomes a
    /// paragraph of its own rather than being dropped.
    #[must_use]
    pub fn into_blocks(self) -> Vec<Block> {
        match self {
            Emit::Blocks(blocks) => blocks,
            Emit::Text(text) if !text.is_empty() => vec![Block::Paragraph(text)],
            Emit::Text(_) | Emit::Nothing => Vec::new(),
        }
    }
}

/// Function type for recursive processing of child elements.
pub type RecurseFn<'a, 'input> = dyn Fn(Node<'a, 'input>, &mut NormalizeContext) -> Emit + 'a;

/// Trait for element handlers.
///
/// A handler processes one kind of element and emits blocks or inline text.
/// It receives a `recurse` function to process child elements.
pub trait BlockHandler: Send + Sync {
    /// Check if this handler can process the given element.
    ///
    /// Default implementation always returns true.
    fn can_handle(&self, _node: Node<'_, '_>, _context: &NormalizeContext) -> bool {
        true
    }

    /// Process the element.
    ///
    /// # Arguments
    /// * `node` - The XML element to process
    /// * `context` - Current extraction context
    /// * `recurse` - Function to call for recursive child processing
    fn handle<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        context: &mut NormalizeContext,
        recurse: &RecurseFn<'a, 'input>,
    ) -> Emit;
}

/// Registry mapping element names to handlers.
///
/// Tags can be registered with a handler or marked as skip; everything else
/// falls through to the engine's preserve-with-warning path.
pub struct BlockRegistry {
    handlers: HashMap<String, Box<dyn BlockHandler>>,
    skip_tags: HashSet<String>,
}

impl BlockRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            skip_tags: HashSet::new(),
        }
    }

    /// Register a handler for a specific tag name.
    pub fn register(&mut self, tag_name: impl Into<String>, handler: impl BlockHandler + 'static) {
        self.handlers.insert(tag_name.into(), Box::new(handler));
    }

    /// Mark tags as skip (don't process, emit nothing).
    pub fn skip(&mut self, tag_names: impl IntoIterator<Item = impl Into<String>>) {
        for tag in tag_names {
            self.skip_tags.insert(tag.into());
        }
    }

    /// Get the appropriate handler for an element.
    ///
    /// Returns `None` if the element has no handler willing to take it.
    pub fn get_handler(
        &self,
        node: Node<'_, '_>,
        context: &NormalizeContext,
    ) -> Option<&dyn BlockHandler> {
        self.handlers
            .get(node.tag_name().name())
            .filter(|h| h.can_handle(node, context))
            .map(|h| h.as_ref())
    }

    /// Check if a tag should be skipped.
    #[must_use]
    pub fn should_skip(&self, tag_name: &str) -> bool {
        self.skip_tags.contains(tag_name)
    }

    /// Check if a handler is registered for a tag.
    #[must_use]
    pub fn has_handler(&self, tag_name: &str) -> bool {
        self.handlers.contains_key(tag_name)
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    struct DummyHandler;

    impl BlockHandler for DummyHandler {
        fn handle<'a, 'input>(
            &self,
            _node: Node<'a, 'input>,
            _context: &mut NormalizeContext,
            _recurse: &RecurseFn<'a, 'input>,
        ) -> Emit {
            Emit::Text("dummy".to_string())
        }
    }

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = BlockRegistry::new();
        registry.register("p", DummyHandler);

        let doc = Document::parse("<p/>").unwrap();
        let context = NormalizeContext::new();

        assert!(registry.get_handler(doc.root_element(), &context).is_some());
    }

    #[test]
    fn test_registry_skip() {
        let mut registry = BlockRegistry::new();
        registry.skip(["head", "script"]);

        assert!(registry.should_skip("head"));
        assert!(registry.should_skip("script"));
        assert!(!registry.should_skip("p"));
    }

    #[test]
    fn test_emit_into_blocks() {
        let blocks = Emit::Text("stray".to_string()).into_blocks();
        assert_eq!(blocks.len(), 1);
        assert!(matches!(&blocks[0], Block::Paragraph(t) if t == "stray"));

        assert!(Emit::Nothing.into_blocks().is_empty());
        assert!(Emit::Text(String::new()).into_blocks().is_empty());
    }

    #[test]
    fn test_context_warn() {
        let mut ctx = NormalizeContext::new();
        ctx.warn("something odd");
        assert_eq!(ctx.warnings, vec!["something odd".to_string()]);
    }
}
